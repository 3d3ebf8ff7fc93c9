//! Orbit layout for the skill map.
//!
//! Each category gets one anchor, placed at the centre of its cell in a 2×2
//! grid (Technical top-left, Soft top-right, Business bottom-left, Other
//! bottom-right). The N skills of a category sit on a circle around the anchor
//! of radius `MIN_ORBIT + N × ORBIT_STEP`, the first at twelve o'clock and the
//! rest every `360/N` degrees clockwise.
//!
//! Adjacent bubbles on an orbit are `2R·sin(π/N)` apart. With the constants
//! below that chord never drops under `2 × SKILL_RADIUS`, so skills of the same
//! category cannot overlap. Cells are sized from their own orbit, so the canvas
//! always fits its content.

use serde::Serialize;

use crate::skills::{CategorizedSkills, SkillCategory};

pub const MIN_ORBIT: f64 = 70.0;
pub const ORBIT_STEP: f64 = 12.0;
pub const SKILL_RADIUS: f64 = 28.0;
pub const ANCHOR_RADIUS: f64 = 40.0;
/// Padding around each cell's content.
pub const CELL_PADDING: f64 = 20.0;

// ────────────────────────────────────────────────────────────────────────────
// Layout types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn distance(self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlacedSkill {
    pub name: String,
    pub center: Point,
    /// Clockwise offset from twelve o'clock, in degrees.
    pub angle_deg: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryCluster {
    pub category: SkillCategory,
    pub anchor: Point,
    /// Zero when the category is empty.
    pub orbit_radius: f64,
    pub skills: Vec<PlacedSkill>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillLayout {
    pub width: f64,
    pub height: f64,
    /// Always four clusters, in `SkillCategory::ALL` order.
    pub clusters: Vec<CategoryCluster>,
}

// ────────────────────────────────────────────────────────────────────────────
// Geometry
// ────────────────────────────────────────────────────────────────────────────

/// Orbit radius for a category with `count` skills. Non-decreasing in `count`.
pub fn orbit_radius(count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        MIN_ORBIT + count as f64 * ORBIT_STEP
    }
}

/// Half the side of the square a cluster occupies, padding included.
fn cluster_extent(count: usize) -> f64 {
    let reach = if count == 0 {
        ANCHOR_RADIUS
    } else {
        orbit_radius(count) + SKILL_RADIUS
    };
    reach + CELL_PADDING
}

/// Lays out all four categories. Deterministic for a given input.
pub fn layout_skills(categories: &CategorizedSkills) -> SkillLayout {
    let counts: Vec<usize> = SkillCategory::ALL
        .iter()
        .map(|c| categories.get(*c).len())
        .collect();
    let extents: Vec<f64> = counts.iter().map(|n| cluster_extent(*n)).collect();

    // Grid positions: index 0 and 2 share the left column, 0 and 1 the top row.
    let left = extents[0].max(extents[2]);
    let right = extents[1].max(extents[3]);
    let top = extents[0].max(extents[1]);
    let bottom = extents[2].max(extents[3]);

    let anchors = [
        Point { x: left, y: top },
        Point { x: 2.0 * left + right, y: top },
        Point { x: left, y: 2.0 * top + bottom },
        Point { x: 2.0 * left + right, y: 2.0 * top + bottom },
    ];

    let clusters = SkillCategory::ALL
        .iter()
        .zip(anchors)
        .map(|(category, anchor)| place_cluster(*category, anchor, categories.get(*category)))
        .collect();

    SkillLayout {
        width: 2.0 * (left + right),
        height: 2.0 * (top + bottom),
        clusters,
    }
}

fn place_cluster(category: SkillCategory, anchor: Point, skills: &[String]) -> CategoryCluster {
    let radius = orbit_radius(skills.len());
    let step = if skills.is_empty() {
        0.0
    } else {
        360.0 / skills.len() as f64
    };

    let placed = skills
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let angle_deg = i as f64 * step;
            // Screen coordinates: y grows downward, so twelve o'clock is -90°.
            let theta = (angle_deg - 90.0).to_radians();
            PlacedSkill {
                name: name.clone(),
                center: Point {
                    x: anchor.x + radius * theta.cos(),
                    y: anchor.y + radius * theta.sin(),
                },
                angle_deg,
            }
        })
        .collect();

    CategoryCluster {
        category,
        anchor,
        orbit_radius: radius,
        skills: placed,
    }
}
