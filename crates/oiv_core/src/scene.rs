//! Flat projection of the 3D relationship scene.
//!
//! Complexes become circles, units become points and edges become line
//! segments, all in the x/z plane of the original scene coordinates.

use std::collections::HashMap;
use std::f64::consts::TAU;
use std::sync::Arc;

use crate::filter::FilteredDataset;
use crate::model::{Dataset, Position};
use crate::store::ViewSink;

const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;
const COMPLEX_RING_RADIUS: f64 = 150.0;
const DEFAULT_COMPLEX_RADIUS: f64 = 30.0;
const BOUNDS_MARGIN: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const GREY: Self = Self(128, 128, 128);
    pub const WHITE: Self = Self(255, 255, 255);
}

/// Parses `#rrggbb` or `#rgb`
pub fn parse_hex_color(value: &str) -> Option<Rgb> {
    let hex = value.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let channel = |text: &str| u8::from_str_radix(text, 16).ok();
    match hex.len() {
        6 => Some(Rgb(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        3 => {
            let expand = |index: usize| channel(&hex[index..=index]).map(|value| value * 17);
            Some(Rgb(expand(0)?, expand(1)?, expand(2)?))
        }
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneCircle {
    pub id: String,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub id: String,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub color: Rgb,
    pub linked_only: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneSegment {
    pub from: (f64, f64),
    pub to: (f64, f64),
    pub theme: String,
    pub color: Rgb,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: [f64; 2],
    pub y: [f64; 2],
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            x: [-100.0, 100.0],
            y: [-100.0, 100.0],
        }
    }
}

/// Graph view model, rebuilt on every filter change
#[derive(Debug, Clone)]
pub struct GraphScene {
    complex_centres: HashMap<String, (f64, f64, f64)>,
    unit_points: HashMap<String, (f64, f64)>,
    pub circles: Vec<SceneCircle>,
    pub nodes: Vec<SceneNode>,
    pub segments: Vec<SceneSegment>,
    pub bounds: Bounds,
}

impl GraphScene {
    /// Precomputes a stable position for every complex and unit so a unit
    /// keeps its place whichever filter is active.
    pub fn new(dataset: &Arc<Dataset>) -> Self {
        let complex_count = dataset.complexes().len().max(1);
        let complex_centres: HashMap<String, (f64, f64, f64)> = dataset
            .complexes()
            .iter()
            .enumerate()
            .map(|(index, complex)| {
                let (x, y) = complex.position.map_or_else(
                    || {
                        #[allow(clippy::cast_precision_loss)]
                        let angle = TAU * index as f64 / complex_count as f64;
                        (COMPLEX_RING_RADIUS * angle.cos(), COMPLEX_RING_RADIUS * angle.sin())
                    },
                    project,
                );
                let radius = if complex.radius > 0.0 {
                    complex.radius
                } else {
                    DEFAULT_COMPLEX_RADIUS
                };
                (complex.id.clone(), (x, y, radius))
            })
            .collect();

        let mut placed_per_complex: HashMap<&str, usize> = HashMap::new();
        let mut unit_points = HashMap::new();
        for unit in dataset.units() {
            let point = if let Some(position) = unit.position {
                project(position)
            } else {
                let slot = placed_per_complex.entry(unit.complex.as_str()).or_default();
                let (cx, cy, radius) = complex_centres
                    .get(&unit.complex)
                    .copied()
                    .unwrap_or((0.0, 0.0, DEFAULT_COMPLEX_RADIUS));
                #[allow(clippy::cast_precision_loss)]
                let k = *slot as f64;
                *slot += 1;
                let angle = k * GOLDEN_ANGLE;
                let distance = radius * 0.8 * ((k + 0.5) / (k + 1.5)).sqrt();
                (cx + distance * angle.cos(), cy + distance * angle.sin())
            };
            unit_points.insert(unit.id.clone(), point);
        }

        Self {
            complex_centres,
            unit_points,
            circles: Vec::new(),
            nodes: Vec::new(),
            segments: Vec::new(),
            bounds: Bounds::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.circles.is_empty() && self.nodes.is_empty()
    }

    pub fn point_of(&self, unit_id: &str) -> Option<(f64, f64)> {
        self.unit_points.get(unit_id).copied()
    }

    fn rebuild(&mut self, data: &FilteredDataset) {
        self.circles = data
            .complexes
            .iter()
            .filter_map(|complex| {
                let (x, y, radius) = *self.complex_centres.get(&complex.id)?;
                Some(SceneCircle {
                    id: complex.id.clone(),
                    name: complex.name.clone(),
                    x,
                    y,
                    radius,
                    color: parse_hex_color(&complex.color).unwrap_or(Rgb::GREY),
                })
            })
            .collect();

        self.nodes = data
            .visible_oiv()
            .filter_map(|unit| {
                let (x, y) = self.point_of(&unit.id)?;
                let color = data
                    .complex(&unit.complex)
                    .and_then(|complex| parse_hex_color(&complex.color))
                    .unwrap_or(Rgb::WHITE);
                Some(SceneNode {
                    id: unit.id.clone(),
                    label: unit
                        .short_name
                        .clone()
                        .unwrap_or_else(|| unit.display_name().to_string()),
                    x,
                    y,
                    color,
                    linked_only: data.is_linked_only(&unit.id),
                })
            })
            .collect();

        self.segments = data
            .edges
            .iter()
            .filter_map(|edge| {
                Some(SceneSegment {
                    from: self.point_of(&edge.source)?,
                    to: self.point_of(&edge.target)?,
                    theme: edge.theme.clone(),
                    color: data
                        .theme(&edge.theme)
                        .and_then(|theme| parse_hex_color(&theme.color))
                        .unwrap_or(Rgb::GREY),
                })
            })
            .collect();

        self.bounds = self.compute_bounds();
    }

    fn compute_bounds(&self) -> Bounds {
        let extents = self
            .circles
            .iter()
            .map(|circle| (circle.x, circle.y, circle.radius))
            .chain(self.nodes.iter().map(|node| (node.x, node.y, 0.0)));

        let mut bounds: Option<[f64; 4]> = None;
        for (x, y, reach) in extents {
            let [min_x, max_x, min_y, max_y] =
                bounds.get_or_insert([f64::MAX, f64::MIN, f64::MAX, f64::MIN]);
            *min_x = min_x.min(x - reach);
            *max_x = max_x.max(x + reach);
            *min_y = min_y.min(y - reach);
            *max_y = max_y.max(y + reach);
        }

        bounds.map_or_else(Bounds::default, |[min_x, max_x, min_y, max_y]| Bounds {
            x: [min_x - BOUNDS_MARGIN, max_x + BOUNDS_MARGIN],
            y: [min_y - BOUNDS_MARGIN, max_y + BOUNDS_MARGIN],
        })
    }
}

/// Scene x/z become the flat x/y
const fn project(position: Position) -> (f64, f64) {
    (position.x, position.z)
}

impl ViewSink for GraphScene {
    fn name(&self) -> &str {
        "graph"
    }

    fn on_filtered_data_changed(&mut self, data: &FilteredDataset) {
        self.rebuild(data);
        tracing::trace!(
            circles = self.circles.len(),
            nodes = self.nodes.len(),
            segments = self.segments.len(),
            "graph scene rebuilt"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::apply_filters;
    use crate::filter::tests::sample_dataset;
    use crate::model::{Catalogs, DataFile};
    use crate::selection::{FilterCategory, FilterSelection};

    fn scene_for(dataset: &Arc<Dataset>, category: FilterCategory, ids: &[&str]) -> GraphScene {
        let mut selection = FilterSelection::new();
        selection.set(category, ids.iter().copied());
        let mut scene = GraphScene::new(dataset);
        scene.on_filtered_data_changed(&apply_filters(dataset, &selection));
        scene
    }

    #[test]
    fn parses_long_and_short_hex() {
        assert_eq!(parse_hex_color("#ff8000"), Some(Rgb(255, 128, 0)));
        assert_eq!(parse_hex_color("#0f0"), Some(Rgb(0, 255, 0)));
        assert_eq!(parse_hex_color("red"), None);
        assert_eq!(parse_hex_color("#12345"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
    }

    #[test]
    fn empty_scene_has_default_bounds() {
        let dataset = Arc::new(sample_dataset());
        let mut scene = GraphScene::new(&dataset);
        scene.on_filtered_data_changed(&FilteredDataset::default());
        assert!(scene.is_empty());
        assert_eq!(scene.bounds, Bounds::default());
    }

    #[test]
    fn units_without_position_sit_inside_their_complex() {
        let dataset = Arc::new(sample_dataset());
        let scene = scene_for(&dataset, FilterCategory::Complex, &["complex1"]);

        let economy = scene.circles.iter().find(|circle| circle.id == "complex1").unwrap();
        for id in ["A", "B"] {
            let (x, y) = scene.point_of(id).unwrap();
            let distance = (x - economy.x).hypot(y - economy.y);
            assert!(distance < economy.radius, "{id} outside its complex");
        }
        assert_ne!(scene.point_of("A"), scene.point_of("B"));
    }

    #[test]
    fn segments_follow_kept_edges_with_theme_color() {
        let dataset = Arc::new(sample_dataset());
        let scene = scene_for(&dataset, FilterCategory::SourceOiv, &["A"]);

        assert_eq!(scene.segments.len(), 1);
        assert_eq!(scene.segments[0].color, Rgb(0, 0, 255));
        assert_eq!(scene.segments[0].from, scene.point_of("A").unwrap());
        assert_eq!(scene.nodes.len(), 2);
        assert_eq!(scene.circles.len(), 2);
    }

    #[test]
    fn explicit_positions_project_onto_x_z() {
        let data = DataFile::from_json(
            r##"{
                "complexes": [{"id": "c", "name": "C", "color": "#010203", "radius": 5,
                               "position": {"x": 10, "y": 99, "z": -20}}],
                "oiv": [{"id": "u", "name": "U", "complex": "c",
                         "position": {"x": 12, "y": 0, "z": -18}}]
            }"##,
        )
        .unwrap();
        let dataset = Arc::new(Dataset::from_parts(data, Catalogs::default()));
        let scene = scene_for(&dataset, FilterCategory::Complex, &["c"]);

        assert_eq!(scene.point_of("u"), Some((12.0, -18.0)));
        assert_eq!(scene.circles[0].color, Rgb(1, 2, 3));
        assert_eq!(scene.bounds.x, [-5.0, 25.0]);
        assert_eq!(scene.bounds.y, [-35.0, -5.0]);
    }
}
