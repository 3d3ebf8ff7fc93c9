//! SVG rendering of a `SkillLayout`.

use quick_xml::escape::escape;
use serde::Serialize;

use super::layout::{layout_skills, SkillLayout, ANCHOR_RADIUS, SKILL_RADIUS};
use crate::skills::{CategorizedSkills, SkillCategory};

/// Labels longer than this are shortened inside the bubble; the full name
/// stays in the `<title>` tooltip.
const MAX_LABEL_CHARS: usize = 12;

/// Rendered skill map with its explicit pixel size.
#[derive(Debug, Clone, Serialize)]
pub struct SkillMap {
    pub svg: String,
    pub width: u32,
    pub height: u32,
}

pub fn category_color(category: SkillCategory) -> &'static str {
    match category {
        SkillCategory::Technical => "#4285F4",
        SkillCategory::Soft => "#FBBC05",
        SkillCategory::Business => "#34A853",
        SkillCategory::Other => "#EA4335",
    }
}

/// Lays out and renders `categories` in one step.
pub fn render_skill_map(categories: &CategorizedSkills) -> SkillMap {
    let layout = layout_skills(categories);
    SkillMap {
        svg: render_svg(&layout),
        width: layout.width.ceil() as u32,
        height: layout.height.ceil() as u32,
    }
}

pub fn render_svg(layout: &SkillLayout) -> String {
    let width = layout.width.ceil() as u32;
    let height = layout.height.ceil() as u32;
    let mut out = String::with_capacity(1024);

    out.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}" font-family="Arial, sans-serif">"#
    ));
    out.push_str(&format!(
        r##"<rect width="{width}" height="{height}" fill="#f8f9fa" rx="10" ry="10"/>"##
    ));

    for cluster in &layout.clusters {
        let color = category_color(cluster.category);
        let label = cluster.category.label();
        let (ax, ay) = (cluster.anchor.x, cluster.anchor.y);

        out.push_str(&format!(r#"<g data-category="{label}">"#));
        for skill in &cluster.skills {
            out.push_str(&format!(
                r##"<line x1="{ax:.1}" y1="{ay:.1}" x2="{:.1}" y2="{:.1}" stroke="{color}" stroke-opacity="0.5" stroke-width="2"/>"##,
                skill.center.x, skill.center.y
            ));
        }
        out.push_str(&format!(
            r#"<circle class="anchor" cx="{ax:.1}" cy="{ay:.1}" r="{ANCHOR_RADIUS}" fill="{color}"/>"#
        ));
        out.push_str(&format!(
            r#"<text x="{ax:.1}" y="{ay:.1}" text-anchor="middle" dominant-baseline="middle" font-size="11" font-weight="bold" fill="white">{}</text>"#,
            anchor_caption(cluster.category)
        ));

        for skill in &cluster.skills {
            let (cx, cy) = (skill.center.x, skill.center.y);
            out.push_str(&format!(
                r#"<circle class="skill" data-category="{label}" cx="{cx:.1}" cy="{cy:.1}" r="{SKILL_RADIUS}" fill="{color}" fill-opacity="0.9"><title>{}</title></circle>"#,
                escape(skill.name.as_str())
            ));
            out.push_str(&format!(
                r#"<text x="{cx:.1}" y="{cy:.1}" text-anchor="middle" dominant-baseline="middle" font-size="10" fill="black">{}</text>"#,
                escape(short_label(&skill.name).as_str())
            ));
        }
        out.push_str("</g>");
    }

    out.push_str("</svg>");
    out
}

fn anchor_caption(category: SkillCategory) -> &'static str {
    match category {
        SkillCategory::Technical => "Technical",
        SkillCategory::Soft => "Soft",
        SkillCategory::Business => "Business",
        SkillCategory::Other => "Other",
    }
}

fn short_label(name: &str) -> String {
    if name.chars().count() <= MAX_LABEL_CHARS {
        name.to_string()
    } else {
        let head: String = name.chars().take(MAX_LABEL_CHARS - 1).collect();
        format!("{}…", head.trim_end())
    }
}
