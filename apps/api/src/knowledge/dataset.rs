//! Occupation dataset records and their knowledge-document rendering.
//!
//! The dataset file holds either one record object or an array of them. Each
//! record carries its fields under `metadata`; every field is optional and
//! rendered as an empty section when absent.

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use super::IndexError;

/// A JSON value that may arrive as text or as a number (codes, levels, scores).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(s) => f.write_str(s),
            Scalar::Number(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompetencyLevel {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub level: Option<Scalar>,
    #[serde(default)]
    pub score: Option<Scalar>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OccupationMetadata {
    #[serde(default)]
    pub anzsco_code: Option<Scalar>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub core_competencies: Vec<CompetencyLevel>,
    #[serde(default)]
    pub specialist_tasks: Vec<String>,
    #[serde(default)]
    pub technology_tools: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OccupationRecord {
    #[serde(default)]
    pub metadata: OccupationMetadata,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DatasetFile {
    Many(Vec<OccupationRecord>),
    One(OccupationRecord),
}

/// Parses dataset JSON into records.
pub fn parse_dataset(json: &str) -> Result<Vec<OccupationRecord>, IndexError> {
    let file: DatasetFile =
        serde_json::from_str(json).map_err(|e| IndexError::Dataset(e.to_string()))?;
    Ok(match file {
        DatasetFile::Many(records) => records,
        DatasetFile::One(record) => vec![record],
    })
}

pub async fn load_dataset(path: &Path) -> Result<Vec<OccupationRecord>, IndexError> {
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| IndexError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    parse_dataset(&json)
}

impl OccupationRecord {
    pub fn anzsco_code(&self) -> String {
        self.metadata
            .anzsco_code
            .as_ref()
            .map(Scalar::to_string)
            .unwrap_or_else(|| "Unknown".to_string())
    }

    pub fn title(&self) -> &str {
        self.metadata.title.as_deref().unwrap_or("Unknown Title")
    }

    /// Markdown-flavoured text document uploaded to the index.
    pub fn document_text(&self) -> String {
        let m = &self.metadata;
        let competencies = m
            .core_competencies
            .iter()
            .filter(|c| !c.name.is_empty() && (c.level.is_some() || c.score.is_some()))
            .map(|c| {
                format!(
                    "{}: {} (score: {})",
                    c.name,
                    c.level.as_ref().map(Scalar::to_string).unwrap_or_default(),
                    c.score.as_ref().map(Scalar::to_string).unwrap_or_default()
                )
            })
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "# {title} (ANZSCO: {code})\n\n\
             ## Description\n{description}\n\n\
             ## Required Core Competencies\n{competencies}\n\n\
             ## Specialized Tasks\n{tasks}\n\n\
             ## Technology Tools\n{tools}\n",
            title = self.title(),
            code = self.anzsco_code(),
            description = m.description,
            tasks = m.specialist_tasks.join(", "),
            tools = m.technology_tools.join(", "),
        )
    }

    /// Stable file name; `position` disambiguates records without a code.
    pub fn file_name(&self, position: usize) -> String {
        let slug: String = self
            .title()
            .to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        let slug = slug
            .split('_')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("_");
        match &self.metadata.anzsco_code {
            Some(code) => format!("{code}_{slug}.txt"),
            None => format!("record_{position:04}_{slug}.txt"),
        }
    }
}
