// Skill map: categorized skills laid out as orbit clusters and rendered as a
// self-contained SVG. Pure geometry, no I/O.

pub mod layout;
pub mod svg;

pub use svg::{render_skill_map, SkillMap};
