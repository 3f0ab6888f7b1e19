//! Classification of free-text relationship labels.
//!
//! Labels are typed by users, so the set is open. Known labels map through
//! [`RELATION_TABLE`]; anything else falls into the sibling bucket, which
//! renders as a plain connector and imposes no generation constraint.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Coarse edge type used for drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Marriage,
    Parent,
    Sibling,
}

impl EdgeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Marriage => "marriage",
            Self::Parent => "parent",
            Self::Sibling => "sibling",
        }
    }
}

/// What a label says about the target relative to the entry's owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineageRole {
    /// Target belongs to the previous generation (`padre`, `madre`).
    TargetIsElder,
    /// Target belongs to the next generation (`hijo`, `hija`).
    TargetIsYounger,
    /// Same generation by definition (`esposo`, `pareja`).
    Partner,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationKind {
    pub edge: EdgeKind,
    pub role: LineageRole,
}

impl RelationKind {
    const DEFAULT: Self = Self {
        edge: EdgeKind::Sibling,
        role: LineageRole::None,
    };
}

static RELATION_TABLE: Lazy<HashMap<&'static str, RelationKind>> = Lazy::new(|| {
    let marriage = RelationKind {
        edge: EdgeKind::Marriage,
        role: LineageRole::Partner,
    };
    let elder = RelationKind {
        edge: EdgeKind::Parent,
        role: LineageRole::TargetIsElder,
    };
    let younger = RelationKind {
        edge: EdgeKind::Parent,
        role: LineageRole::TargetIsYounger,
    };
    let mut table = HashMap::new();
    for label in ["esposo", "esposa", "pareja", "spouse", "husband", "wife", "partner"] {
        table.insert(label, marriage);
    }
    for label in ["padre", "madre", "father", "mother", "parent"] {
        table.insert(label, elder);
    }
    for label in ["hijo", "hija", "son", "daughter", "child"] {
        table.insert(label, younger);
    }
    table
});

/// Labels offered when recording a relationship.
pub const RELATION_LABELS: [&str; 18] = [
    "Padre", "Madre", "Hijo", "Hija", "Esposo", "Esposa", "Hermano", "Hermana", "Abuelo", "Abuela",
    "Nieto", "Nieta", "Tío", "Tía", "Sobrino", "Sobrina", "Primo", "Prima",
];

const MALE_CODES: [&str; 5] = ["m", "masculino", "male", "h", "hombre"];

pub fn classify(label: &str) -> RelationKind {
    let key = label.trim().to_lowercase();
    RELATION_TABLE
        .get(key.as_str())
        .copied()
        .unwrap_or(RelationKind::DEFAULT)
}

pub fn edge_kind(label: &str) -> EdgeKind {
    classify(label).edge
}

pub fn is_male_code(sex: Option<&str>) -> bool {
    sex.map(|code| code.trim().to_lowercase())
        .is_some_and(|code| MALE_CODES.contains(&code.as_str()))
}

/// The offered spelling of `label`, matched ignoring case and padding.
pub fn canonical_label(label: &str) -> Option<&'static str> {
    let key = label.trim().to_lowercase();
    RELATION_LABELS
        .iter()
        .copied()
        .find(|candidate| candidate.to_lowercase() == key)
}

/// The label to store on the target when `source` records `label` about it.
///
/// `source_sex` is the sex code of the member that owns the original entry:
/// if they record `Padre`, the mirror entry calls them `Hijo` or `Hija`.
/// Labels without a known inverse mirror to themselves, in their offered
/// spelling when they have one.
pub fn inverse_label(label: &str, source_sex: Option<&str>) -> String {
    let child = if is_male_code(source_sex) { "Hijo" } else { "Hija" };
    match label.trim().to_lowercase().as_str() {
        "padre" | "madre" => child.to_string(),
        "esposo" => "Esposa".to_string(),
        "esposa" => "Esposo".to_string(),
        _ => canonical_label(label).map_or_else(|| label.trim().to_string(), str::to_string),
    }
}
