//! ASC core competency catalogue and rating validation.

use serde::{Deserialize, Serialize};

/// Highest rating on the self-assessment scale. 0 means "not rated".
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Competency {
    pub name: &'static str,
    pub description: &'static str,
}

pub const CORE_COMPETENCIES: [Competency; 10] = [
    Competency {
        name: "Digital Literacy",
        description: "The ability to use digital technology, tools, and platforms to locate, evaluate, use and create information.",
    },
    Competency {
        name: "Teamwork",
        description: "The ability to work effectively with others towards a common goal or purpose.",
    },
    Competency {
        name: "Communication",
        description: "The ability to share and receive information effectively in different contexts.",
    },
    Competency {
        name: "Problem Solving",
        description: "The ability to identify problems and apply logical thinking to develop solutions.",
    },
    Competency {
        name: "Planning and Organisation",
        description: "The ability to plan and organize tasks, resources, and time efficiently.",
    },
    Competency {
        name: "Initiative and Innovation",
        description: "The ability to take action and develop innovative approaches to challenges.",
    },
    Competency {
        name: "Learning",
        description: "The ability to acquire knowledge and skills through study, experience, or being taught.",
    },
    Competency {
        name: "Numeracy",
        description: "The ability to understand and work with numbers and other mathematical concepts.",
    },
    Competency {
        name: "Reading",
        description: "The ability to comprehend written information in documents such as safety instructions, work requirements or procedures.",
    },
    Competency {
        name: "Writing",
        description: "The ability to communicate effectively in written form to a range of audiences.",
    },
];

/// Canonical catalogue name for `name`, matched case-insensitively.
pub fn canonical_name(name: &str) -> Option<&'static str> {
    let wanted = name.trim();
    CORE_COMPETENCIES
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(wanted))
        .map(|c| c.name)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetencyRating {
    pub name: String,
    pub rating: u8,
}

impl CompetencyRating {
    /// Validates against the catalogue and the 0–5 scale.
    pub fn new(name: &str, rating: u8) -> Result<Self, String> {
        let name = canonical_name(name)
            .ok_or_else(|| format!("'{}' is not a core competency", name.trim()))?;
        if rating > MAX_RATING {
            return Err(format!(
                "Rating for {name} must be between 0 and {MAX_RATING}, got {rating}"
            ));
        }
        Ok(Self {
            name: name.to_string(),
            rating,
        })
    }

    /// Unrated competencies are excluded from matching.
    pub fn is_rated(&self) -> bool {
        self.rating > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_names_are_unique() {
        let mut names: Vec<_> = CORE_COMPETENCIES.iter().map(|c| c.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 10);
    }

    #[test]
    fn test_rating_name_is_canonicalized() {
        let rating = CompetencyRating::new(" problem solving ", 4).unwrap();
        assert_eq!(rating.name, "Problem Solving");
        assert!(rating.is_rated());
    }

    #[test]
    fn test_out_of_range_rating_is_rejected() {
        assert!(CompetencyRating::new("Numeracy", 6).is_err());
        assert!(!CompetencyRating::new("Numeracy", 0).unwrap().is_rated());
    }

    #[test]
    fn test_unknown_competency_is_rejected() {
        let err = CompetencyRating::new("Juggling", 3).unwrap_err();
        assert!(err.contains("Juggling"));
    }
}
