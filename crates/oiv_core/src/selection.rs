use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::model::de_id_set;

/// Filter categories in evaluation priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterCategory {
    SourceOiv,
    TargetOiv,
    Theme,
    Complex,
    Strategy,
    Program,
    Edge,
}

impl FilterCategory {
    /// First non-empty category in this order drives the filtered result
    pub const PRIORITY: [Self; 7] = [
        Self::SourceOiv,
        Self::TargetOiv,
        Self::Theme,
        Self::Complex,
        Self::Strategy,
        Self::Program,
        Self::Edge,
    ];

    /// Key used for this category in the persisted filter blob
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SourceOiv => "sourceOivIds",
            Self::TargetOiv => "targetOivIds",
            Self::Theme => "themes",
            Self::Complex => "complexes",
            Self::Strategy => "strategies",
            Self::Program => "programs",
            Self::Edge => "edges",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::SourceOiv => "Source OIV",
            Self::TargetOiv => "Target OIV",
            Self::Theme => "Themes",
            Self::Complex => "Complexes",
            Self::Strategy => "Strategies",
            Self::Program => "Programs",
            Self::Edge => "Connections",
        }
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::SourceOiv),
            1 => Some(Self::TargetOiv),
            2 => Some(Self::Theme),
            3 => Some(Self::Complex),
            4 => Some(Self::Strategy),
            5 => Some(Self::Program),
            6 => Some(Self::Edge),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::SourceOiv => 0,
            Self::TargetOiv => 1,
            Self::Theme => 2,
            Self::Complex => 3,
            Self::Strategy => 4,
            Self::Program => 5,
            Self::Edge => 6,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::PRIORITY
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(value))
    }

    /// Whether this category selects edges directly (units are derived
    /// from their endpoints) rather than selecting units
    pub const fn is_edge_driven(self) -> bool {
        matches!(
            self,
            Self::SourceOiv | Self::TargetOiv | Self::Theme | Self::Edge
        )
    }
}

/// User's current filter choice, one id set per category
///
/// Serialized form is the `dashboardFilters` storage blob.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSelection {
    #[serde(deserialize_with = "de_id_set")]
    pub source_oiv_ids: BTreeSet<String>,
    #[serde(deserialize_with = "de_id_set")]
    pub target_oiv_ids: BTreeSet<String>,
    #[serde(deserialize_with = "de_id_set")]
    pub themes: BTreeSet<String>,
    #[serde(deserialize_with = "de_id_set")]
    pub complexes: BTreeSet<String>,
    #[serde(deserialize_with = "de_id_set")]
    pub strategies: BTreeSet<String>,
    #[serde(deserialize_with = "de_id_set")]
    pub programs: BTreeSet<String>,
    #[serde(deserialize_with = "de_id_set")]
    pub edges: BTreeSet<String>,
    pub connections_only: bool,
}

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn ids(&self, category: FilterCategory) -> &BTreeSet<String> {
        match category {
            FilterCategory::SourceOiv => &self.source_oiv_ids,
            FilterCategory::TargetOiv => &self.target_oiv_ids,
            FilterCategory::Theme => &self.themes,
            FilterCategory::Complex => &self.complexes,
            FilterCategory::Strategy => &self.strategies,
            FilterCategory::Program => &self.programs,
            FilterCategory::Edge => &self.edges,
        }
    }

    pub fn ids_mut(&mut self, category: FilterCategory) -> &mut BTreeSet<String> {
        match category {
            FilterCategory::SourceOiv => &mut self.source_oiv_ids,
            FilterCategory::TargetOiv => &mut self.target_oiv_ids,
            FilterCategory::Theme => &mut self.themes,
            FilterCategory::Complex => &mut self.complexes,
            FilterCategory::Strategy => &mut self.strategies,
            FilterCategory::Program => &mut self.programs,
            FilterCategory::Edge => &mut self.edges,
        }
    }

    /// The category that drives filtering, if any
    pub fn active_category(&self) -> Option<FilterCategory> {
        FilterCategory::PRIORITY
            .into_iter()
            .find(|category| !self.ids(*category).is_empty())
    }

    /// True when no category has a selected id (the toggle is ignored)
    pub fn is_empty(&self) -> bool {
        self.active_category().is_none()
    }

    pub fn contains(&self, category: FilterCategory, id: &str) -> bool {
        self.ids(category).contains(id)
    }

    /// Flips membership of `id`; returns whether it is now selected
    pub fn toggle(&mut self, category: FilterCategory, id: &str) -> bool {
        let ids = self.ids_mut(category);
        if ids.remove(id) {
            false
        } else {
            ids.insert(id.to_string());
            true
        }
    }

    pub fn set<I, S>(&mut self, category: FilterCategory, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.ids_mut(category) = ids.into_iter().map(Into::into).collect();
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Number of selected ids per category, priority order
    pub fn counts(&self) -> Vec<(FilterCategory, usize)> {
        FilterCategory::PRIORITY
            .into_iter()
            .map(|category| (category, self.ids(category).len()))
            .collect()
    }

    /// Categories with selections that the priority chain ignores
    pub fn shadowed_categories(&self) -> Vec<FilterCategory> {
        let Some(active) = self.active_category() else {
            return Vec::new();
        };
        FilterCategory::PRIORITY
            .into_iter()
            .filter(|category| *category != active && !self.ids(*category).is_empty())
            .collect()
    }
}
