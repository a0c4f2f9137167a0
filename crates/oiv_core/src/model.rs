use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

/// Errors raised while decoding the dataset files
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to parse {what}: {source}")]
    Parse {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{what}: expected a JSON object or array of entries")]
    Shape { what: String },
}

/// Point in the scene space of the original 3D view
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Position {
    #[serde(deserialize_with = "de_number_or_zero")]
    pub x: f64,
    #[serde(deserialize_with = "de_number_or_zero")]
    pub y: f64,
    #[serde(deserialize_with = "de_number_or_zero")]
    pub z: f64,
}

/// A government body (OIV), the primary filterable node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default, deserialize_with = "de_string_or_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "de_opt_string", skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(default, alias = "complexId", deserialize_with = "de_id_or_empty")]
    pub complex: String,
    #[serde(default, deserialize_with = "de_ids")]
    pub strategies: Vec<String>,
    #[serde(default, deserialize_with = "de_ids")]
    pub programs: Vec<String>,
    #[serde(default, deserialize_with = "de_ids")]
    pub projects: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl Unit {
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// A sector grouping units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Complex {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default, deserialize_with = "de_string_or_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "de_string_or_empty")]
    pub color: String,
    #[serde(default, deserialize_with = "de_number_or_zero")]
    pub radius: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

/// Directed themed relationship between two units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    #[serde(default, deserialize_with = "de_opt_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "de_id_or_empty")]
    pub source: String,
    #[serde(default, deserialize_with = "de_id_or_empty")]
    pub target: String,
    #[serde(default, deserialize_with = "de_string_or_empty")]
    pub theme: String,
    #[serde(default, alias = "description", deserialize_with = "de_string_or_empty")]
    pub label: String,
}

impl Edge {
    /// Stable string identity used by edge-id selections.
    ///
    /// Files that carry an explicit `id` keep it; otherwise the composite
    /// (source, target, theme, label) is joined with `|`.
    pub fn key(&self) -> String {
        self.id.clone().unwrap_or_else(|| {
            format!(
                "{}|{}|{}|{}",
                self.source, self.target, self.theme, self.label
            )
        })
    }
}

/// Topical tag carried by edges, matched by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    #[serde(default, deserialize_with = "de_id_or_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "de_string_or_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "de_string_or_empty")]
    pub color: String,
}

impl Theme {
    pub fn matches(&self, edge_theme: &str) -> bool {
        (!self.name.is_empty() && self.name == edge_theme)
            || (!self.id.is_empty() && self.id == edge_theme)
    }
}

/// Strategy, program or project record referenced from units by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default, alias = "title", deserialize_with = "de_string_or_empty")]
    pub name: String,
    #[serde(
        default,
        rename = "type",
        deserialize_with = "de_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<String>,
}

/// Shape of `data.json`.
///
/// Every array is optional and may be `null`. Entries that fail to decode
/// are skipped one by one instead of rejecting the file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DataFile {
    #[serde(deserialize_with = "de_entries")]
    pub complexes: Vec<Complex>,
    #[serde(alias = "units", deserialize_with = "de_entries")]
    pub oiv: Vec<Unit>,
    #[serde(deserialize_with = "de_entries")]
    pub edges: Vec<Edge>,
    #[serde(deserialize_with = "de_entries")]
    pub themes: Vec<Theme>,
    #[serde(deserialize_with = "de_entries")]
    pub strategies: Vec<CatalogEntry>,
    #[serde(deserialize_with = "de_entries")]
    pub programs: Vec<CatalogEntry>,
    #[serde(alias = "objects", deserialize_with = "de_entries")]
    pub projects: Vec<CatalogEntry>,
}

impl DataFile {
    pub fn from_json(text: &str) -> Result<Self, DatasetError> {
        serde_json::from_str(text).map_err(|source| DatasetError::Parse {
            what: "data.json".to_string(),
            source,
        })
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, DatasetError> {
        if !value.is_object() {
            return Err(DatasetError::Shape {
                what: "data.json".to_string(),
            });
        }
        serde_json::from_value(value).map_err(|source| DatasetError::Parse {
            what: "data.json".to_string(),
            source,
        })
    }
}

const CATALOG_WRAPPER_KEYS: [&str; 5] = ["strategies", "programs", "projects", "objects", "items"];

/// Decodes a catalog file (`strategies.json`, `programs.json`, `objects.json`).
///
/// Accepts a bare array or an object wrapping the array under one of the
/// usual keys. An object without a recognised key yields an empty list.
pub fn parse_catalog(text: &str, what: &str) -> Result<Vec<CatalogEntry>, DatasetError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|source| DatasetError::Parse {
            what: what.to_string(),
            source,
        })?;
    parse_catalog_value(value, what)
}

pub fn parse_catalog_value(
    value: serde_json::Value,
    what: &str,
) -> Result<Vec<CatalogEntry>, DatasetError> {
    let entries = match value {
        serde_json::Value::Array(_) => value,
        serde_json::Value::Object(mut map) => {
            let Some(inner) = CATALOG_WRAPPER_KEYS
                .iter()
                .find_map(|key| map.remove(*key))
            else {
                return Ok(Vec::new());
            };
            inner
        }
        serde_json::Value::Null => return Ok(Vec::new()),
        _ => {
            return Err(DatasetError::Shape {
                what: what.to_string(),
            })
        }
    };

    let serde_json::Value::Array(items) = entries else {
        return Err(DatasetError::Shape {
            what: what.to_string(),
        });
    };
    Ok(decode_entries(items))
}

/// Immutable snapshot of everything the views filter over
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    complexes: Vec<Complex>,
    oiv: Vec<Unit>,
    edges: Vec<Edge>,
    themes: Vec<Theme>,
    strategies: Vec<CatalogEntry>,
    programs: Vec<CatalogEntry>,
    projects: Vec<CatalogEntry>,
    unit_index: HashMap<String, usize>,
    complex_index: HashMap<String, usize>,
}

/// Catalog files that live next to `data.json`
#[derive(Debug, Clone, Default)]
pub struct Catalogs {
    pub strategies: Vec<CatalogEntry>,
    pub programs: Vec<CatalogEntry>,
    pub projects: Vec<CatalogEntry>,
}

impl Dataset {
    /// Builds the dataset; catalogs from separate files win over the ones
    /// embedded in `data.json` when they are non-empty.
    pub fn from_parts(data: DataFile, catalogs: Catalogs) -> Self {
        let pick = |external: Vec<CatalogEntry>, embedded: Vec<CatalogEntry>| {
            if external.is_empty() {
                embedded
            } else {
                external
            }
        };

        let unit_index = data
            .oiv
            .iter()
            .enumerate()
            .map(|(index, unit)| (unit.id.clone(), index))
            .collect();
        let complex_index = data
            .complexes
            .iter()
            .enumerate()
            .map(|(index, complex)| (complex.id.clone(), index))
            .collect();

        Self {
            complexes: data.complexes,
            oiv: data.oiv,
            edges: data.edges,
            themes: data.themes,
            strategies: pick(catalogs.strategies, data.strategies),
            programs: pick(catalogs.programs, data.programs),
            projects: pick(catalogs.projects, data.projects),
            unit_index,
            complex_index,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.oiv.is_empty() && self.edges.is_empty() && self.complexes.is_empty()
    }

    pub fn complexes(&self) -> &[Complex] {
        &self.complexes
    }

    pub fn units(&self) -> &[Unit] {
        &self.oiv
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }

    pub fn strategies(&self) -> &[CatalogEntry] {
        &self.strategies
    }

    pub fn programs(&self) -> &[CatalogEntry] {
        &self.programs
    }

    pub fn projects(&self) -> &[CatalogEntry] {
        &self.projects
    }

    pub fn unit(&self, id: &str) -> Option<&Unit> {
        self.unit_index.get(id).and_then(|index| self.oiv.get(*index))
    }

    pub fn complex(&self, id: &str) -> Option<&Complex> {
        self.complex_index
            .get(id)
            .and_then(|index| self.complexes.get(*index))
    }

    pub fn theme(&self, edge_theme: &str) -> Option<&Theme> {
        self.themes.iter().find(|theme| theme.matches(edge_theme))
    }

    pub fn strategy(&self, id: &str) -> Option<&CatalogEntry> {
        self.strategies.iter().find(|entry| entry.id == id)
    }

    pub fn program(&self, id: &str) -> Option<&CatalogEntry> {
        self.programs.iter().find(|entry| entry.id == id)
    }

    pub fn project(&self, id: &str) -> Option<&CatalogEntry> {
        self.projects.iter().find(|entry| entry.id == id)
    }

    /// Unit name for display, falling back to the raw id
    pub fn unit_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.unit(id).map_or(id, Unit::display_name)
    }

    pub fn complex_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.complex(id)
            .map(|complex| complex.name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or(id)
    }

    /// An edge is visible only when both endpoints exist
    pub fn is_resolvable(&self, edge: &Edge) -> bool {
        !edge.source.is_empty()
            && !edge.target.is_empty()
            && self.unit_index.contains_key(&edge.source)
            && self.unit_index.contains_key(&edge.target)
    }

    pub fn resolvable_edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.iter().filter(|edge| self.is_resolvable(edge))
    }

    /// Distinct theme names carried by visible edges, sorted
    pub fn theme_names(&self) -> BTreeSet<&str> {
        self.resolvable_edges()
            .map(|edge| edge.theme.as_str())
            .filter(|theme| !theme.is_empty())
            .collect()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(text) => text,
            RawId::Integer(value) => value.to_string(),
            #[allow(clippy::cast_possible_truncation)]
            RawId::Float(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
                (value as i64).to_string()
            }
            RawId::Float(value) => value.to_string(),
        }
    }
}

pub(crate) fn de_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    RawId::deserialize(deserializer).map(Into::into)
}

fn de_id_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Option::<RawId>::deserialize(deserializer).map(|raw| raw.map(Into::into).unwrap_or_default())
}

fn de_opt_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Option::<RawId>::deserialize(deserializer).map(|raw| raw.map(Into::into))
}

/// Text field that reads `null`, numbers and booleans without failing
fn de_string_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    de_opt_string(deserializer).map(Option::unwrap_or_default)
}

fn de_opt_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    serde_json::Value::deserialize(deserializer).map(|value| match value {
        serde_json::Value::String(text) => Some(text),
        serde_json::Value::Number(number) => Some(number.to_string()),
        serde_json::Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    })
}

fn de_number_or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    serde_json::Value::deserialize(deserializer).map(|value| match value {
        serde_json::Value::Number(number) => number.as_f64().unwrap_or_default(),
        serde_json::Value::String(text) => text.trim().parse().unwrap_or_default(),
        _ => 0.0,
    })
}

fn de_entries<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    Option::<Vec<serde_json::Value>>::deserialize(deserializer)
        .map(|raw| decode_entries(raw.unwrap_or_default()))
}

fn decode_entries<T: serde::de::DeserializeOwned>(items: Vec<serde_json::Value>) -> Vec<T> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| {
            serde_json::from_value(item)
                .map_err(|e| tracing::warn!(index, error = %e, "skipping malformed entry"))
                .ok()
        })
        .collect()
}

pub(crate) fn de_ids<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Option::<Vec<RawId>>::deserialize(deserializer)
        .map(|raw| raw.unwrap_or_default().into_iter().map(Into::into).collect())
}

pub(crate) fn de_id_set<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeSet<String>, D::Error> {
    de_ids(deserializer).map(|ids| ids.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_file_tolerates_missing_arrays() {
        let data = DataFile::from_json(r#"{"oiv": [{"id": "A", "name": "Alpha", "complex": "c1"}]}"#)
            .unwrap();
        assert_eq!(data.oiv.len(), 1);
        assert!(data.edges.is_empty());
        assert!(data.complexes.is_empty());
    }

    #[test]
    fn null_fields_and_arrays_do_not_reject_the_file() {
        let data = DataFile::from_json(
            r#"{"complexes": [{"id": "c1", "name": null, "color": null, "radius": null}],
                "oiv": [{"id": "A", "name": null, "complex": "c1"}, {"id": "B", "name": "Beta"}],
                "edges": [{"source": "A", "target": "B", "theme": null, "label": null}],
                "themes": null,
                "strategies": null}"#,
        )
        .unwrap();
        assert_eq!(data.complexes[0].name, "");
        assert!(data.complexes[0].radius.abs() < f64::EPSILON);
        assert_eq!(data.oiv[0].display_name(), "A");
        assert_eq!(data.edges[0].label, "");
        assert_eq!(data.edges[0].theme, "");
        assert!(data.themes.is_empty());

        let empty = DataFile::from_json(r#"{"oiv": [{"id": "A"}], "edges": null}"#).unwrap();
        assert!(empty.edges.is_empty());
        assert_eq!(empty.oiv.len(), 1);
    }

    #[test]
    fn edge_without_endpoint_is_invisible() {
        let data = DataFile::from_json(
            r#"{"oiv": [{"id": "A"}, {"id": "B"}],
                "edges": [{"source": "A", "theme": "T"},
                          {"target": "B", "theme": "T"},
                          {"source": "A", "target": null},
                          {"source": "A", "target": "B", "theme": "T"}]}"#,
        )
        .unwrap();
        assert_eq!(data.edges.len(), 4);
        let dataset = Dataset::from_parts(data, Catalogs::default());
        assert_eq!(dataset.units().len(), 2);
        assert_eq!(dataset.resolvable_edges().count(), 1);
    }

    #[test]
    fn malformed_entry_is_skipped_alone() {
        let data = DataFile::from_json(
            r#"{"oiv": [{"name": "no id"}, {"id": "A"}, 42],
                "edges": ["broken", {"source": "A", "target": "A"}]}"#,
        )
        .unwrap();
        assert_eq!(data.oiv.len(), 1);
        assert_eq!(data.oiv[0].id, "A");
        assert_eq!(data.edges.len(), 1);
    }

    #[test]
    fn numeric_ids_become_strings() {
        let data = DataFile::from_json(
            r#"{"oiv": [{"id": 7, "name": "Seven", "complexId": 2, "strategies": [1, "s2"], "programs": null}],
                "edges": [{"source": 7, "target": 8.0, "theme": "T"}]}"#,
        )
        .unwrap();
        let unit = &data.oiv[0];
        assert_eq!(unit.id, "7");
        assert_eq!(unit.complex, "2");
        assert_eq!(unit.strategies, vec!["1".to_string(), "s2".to_string()]);
        assert!(unit.programs.is_empty());
        assert_eq!(data.edges[0].target, "8");
    }

    #[test]
    fn edge_key_prefers_explicit_id() {
        let edge = Edge {
            id: None,
            source: "A".into(),
            target: "B".into(),
            theme: "T1".into(),
            label: "shared data".into(),
        };
        assert_eq!(edge.key(), "A|B|T1|shared data");

        let explicit = Edge {
            id: Some("e-1".into()),
            ..edge
        };
        assert_eq!(explicit.key(), "e-1");
    }

    #[test]
    fn catalog_accepts_wrapped_and_bare_arrays() {
        let bare = parse_catalog(r#"[{"id": "s1", "name": "Smart City", "type": "strategy"}]"#, "strategies.json")
            .unwrap();
        assert_eq!(bare[0].kind.as_deref(), Some("strategy"));

        let wrapped = parse_catalog(r#"{"programs": [{"id": 3, "title": "Roads"}]}"#, "programs.json").unwrap();
        assert_eq!(wrapped[0].id, "3");
        assert_eq!(wrapped[0].name, "Roads");

        let unknown = parse_catalog(r#"{"something": []}"#, "objects.json").unwrap();
        assert!(unknown.is_empty());

        let partial = parse_catalog(r#"[{"id": "p1", "name": null}, {"name": "no id"}]"#, "programs.json").unwrap();
        assert_eq!(partial.len(), 1);
        assert_eq!(partial[0].name, "");

        assert!(parse_catalog("42", "objects.json").is_err());
        assert!(parse_catalog("{", "objects.json").is_err());
    }

    #[test]
    fn dangling_edges_are_not_resolvable() {
        let data = DataFile::from_json(
            r#"{"oiv": [{"id": "A"}, {"id": "B"}],
                "edges": [{"source": "A", "target": "B", "theme": "T"},
                          {"source": "A", "target": "ghost", "theme": "T"}]}"#,
        )
        .unwrap();
        let dataset = Dataset::from_parts(data, Catalogs::default());
        assert_eq!(dataset.resolvable_edges().count(), 1);
        assert_eq!(dataset.unit_name("ghost"), "ghost");
        assert_eq!(dataset.unit_name("A"), "A");
    }

    #[test]
    fn external_catalogs_override_embedded_ones() {
        let data = DataFile::from_json(r#"{"strategies": [{"id": "embedded"}]}"#).unwrap();
        let dataset = Dataset::from_parts(
            data,
            Catalogs {
                strategies: vec![CatalogEntry {
                    id: "external".into(),
                    name: "External".into(),
                    kind: None,
                }],
                ..Catalogs::default()
            },
        );
        assert_eq!(dataset.strategies()[0].id, "external");
        assert!(dataset.strategy("embedded").is_none());
    }
}
