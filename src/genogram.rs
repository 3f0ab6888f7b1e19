use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde_json::Value;

use crate::age::{age_from_str, today};
use crate::config::LayoutConfig;
use crate::ir::{Member, MemberId, parse_member_ids, parse_members_value};
use crate::layout::compute_genogram_layout;
use crate::relation::{EdgeKind, edge_kind, is_male_code};

/// Display shape of a person.
///
/// The source data reduces sex to two rendering buckets: the male codes
/// draw as rectangles and every other value, absent included, draws as a
/// circle. This is a drawing convention only; the raw code is kept on
/// [`GenogramNode::sex`] for consumers that want something richer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeShape {
    Rectangle,
    Circle,
}

impl NodeShape {
    pub fn from_sex(sex: Option<&str>) -> Self {
        if is_male_code(sex) {
            Self::Rectangle
        } else {
            Self::Circle
        }
    }

    /// Node type name used by node-graph front ends.
    pub fn node_type(self) -> &'static str {
        match self {
            Self::Rectangle => "maleNode",
            Self::Circle => "femaleNode",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenogramNode {
    pub id: MemberId,
    pub label: String,
    pub shape: NodeShape,
    pub sex: Option<String>,
    pub age: Option<u32>,
    pub marital_status: Option<String>,
    pub photo_url: Option<String>,
    pub generation: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenogramEdge {
    pub id: String,
    pub source: MemberId,
    pub target: MemberId,
    pub kind: EdgeKind,
    pub label: String,
    pub animated: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Genogram {
    pub nodes: Vec<GenogramNode>,
    pub edges: Vec<GenogramEdge>,
    pub width: f32,
    pub height: f32,
}

impl Genogram {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&GenogramNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn generation_count(&self) -> usize {
        self.nodes
            .iter()
            .map(|node| node.generation + 1)
            .max()
            .unwrap_or(0)
    }
}

/// Builds and lays out the genogram of one family, computing ages as of
/// the local current date.
pub fn build_genogram(family_ids: &[MemberId], members: &[Member], config: &LayoutConfig) -> Genogram {
    build_genogram_at(family_ids, members, config, today())
}

/// Like [`build_genogram`] with an explicit reference date for ages.
///
/// Ids that resolve to no member are skipped, as are relationship entries
/// without a target or pointing outside the resolved set. Every remaining
/// entry becomes its own edge; mirrored entries are not merged.
pub fn build_genogram_at(
    family_ids: &[MemberId],
    members: &[Member],
    config: &LayoutConfig,
    today: NaiveDate,
) -> Genogram {
    let mut by_id: HashMap<&str, &Member> = HashMap::new();
    for member in members {
        by_id.entry(member.id.as_str()).or_insert(member);
    }

    let mut resolved: Vec<&Member> = Vec::new();
    let mut included: HashSet<&str> = HashSet::new();
    for id in family_ids {
        let Some(member) = by_id.get(id.as_str()).copied() else {
            tracing::trace!(id = %id, "family member not found in snapshot");
            continue;
        };
        if included.insert(member.id.as_str()) {
            resolved.push(member);
        }
    }

    let nodes: Vec<GenogramNode> = resolved
        .iter()
        .map(|member| node_for(member, today, config))
        .collect();
    let edges = edges_for(&resolved, &included);

    let mut genogram = Genogram {
        nodes,
        edges,
        width: 0.0,
        height: 0.0,
    };
    compute_genogram_layout(&mut genogram, config);
    tracing::debug!(
        nodes = genogram.nodes.len(),
        edges = genogram.edges.len(),
        generations = genogram.generation_count(),
        "built genogram"
    );
    genogram
}

/// Entry point for loosely-typed callers (JSON, WASM). Either argument
/// being `null` or anything other than an array yields an empty genogram.
pub fn build_genogram_from_values(family_ids: &Value, members: &Value, config: &LayoutConfig) -> Genogram {
    let (Some(ids), Some(members)) = (parse_member_ids(family_ids), parse_members_value(members))
    else {
        return Genogram::default();
    };
    build_genogram(&ids, &members, config)
}

fn node_for(member: &Member, today: NaiveDate, config: &LayoutConfig) -> GenogramNode {
    GenogramNode {
        id: member.id.clone(),
        label: member.display_name(),
        shape: NodeShape::from_sex(member.sex.as_deref()),
        sex: member.sex.clone(),
        age: age_from_str(member.birth_date.as_deref(), today),
        marital_status: member.marital_status.clone(),
        photo_url: member.photo_url.clone(),
        generation: 0,
        x: 0.0,
        y: 0.0,
        width: config.node_width,
        height: config.node_height,
    }
}

fn edges_for(resolved: &[&Member], included: &HashSet<&str>) -> Vec<GenogramEdge> {
    let mut edges = Vec::new();
    let mut used_ids: HashSet<String> = HashSet::new();
    for member in resolved {
        for (index, rel) in member.relationships.iter().enumerate() {
            let Some(target) = rel.target_id.as_deref() else {
                continue;
            };
            if !included.contains(target) {
                continue;
            }
            let id = unique_edge_id(&member.id, target, index, &mut used_ids);
            edges.push(GenogramEdge {
                id,
                source: member.id.clone(),
                target: target.to_string(),
                kind: edge_kind(&rel.label),
                label: rel.label.clone(),
                animated: rel.cohabits,
            });
        }
    }
    edges
}

fn unique_edge_id(source: &str, target: &str, index: usize, used: &mut HashSet<String>) -> String {
    let base = format!("{source}-{target}");
    if used.insert(base.clone()) {
        return base;
    }
    let indexed = format!("{base}-{index}");
    if used.insert(indexed.clone()) {
        return indexed;
    }
    let mut counter = 1usize;
    loop {
        let candidate = format!("{indexed}-{counter}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Relationship;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn ids(list: &[&str]) -> Vec<MemberId> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn spouses_share_generation_zero() {
        let members = vec![
            Member::new("1")
                .with_name("Juan", "Pérez")
                .with_sex("M")
                .with_relationship(Relationship::new("2", "esposa")),
            Member::new("2").with_name("María", "López").with_sex("F"),
            Member::new("3"),
        ];
        let genogram = build_genogram_at(&ids(&["1", "2"]), &members, &LayoutConfig::default(), today());
        assert_eq!(genogram.nodes.len(), 2);
        assert_eq!(genogram.edges.len(), 1);
        assert_eq!(genogram.edges[0].kind, EdgeKind::Marriage);
        assert_eq!(genogram.edges[0].id, "1-2");
        assert!(genogram.nodes.iter().all(|n| n.generation == 0));
        assert_ne!(genogram.nodes[0].x, genogram.nodes[1].x);
        assert_eq!(genogram.nodes[0].label, "Juan Pérez");
        assert_eq!(genogram.nodes[0].shape, NodeShape::Rectangle);
        assert_eq!(genogram.nodes[1].shape, NodeShape::Circle);
    }

    #[test]
    fn unresolved_ids_and_dangling_targets_are_skipped() {
        let members = vec![
            Member::new("a")
                .with_relationship(Relationship::new("b", "Hijo"))
                .with_relationship(Relationship::new("gone", "Hija"))
                .with_relationship(Relationship::default()),
            Member::new("b"),
        ];
        let genogram = build_genogram_at(&ids(&["a", "missing", "b", "a"]), &members, &LayoutConfig::default(), today());
        assert_eq!(genogram.nodes.len(), 2);
        assert_eq!(genogram.edges.len(), 1);
        assert_eq!(genogram.edges[0].target, "b");
    }

    #[test]
    fn mirrored_entries_stay_separate_edges() {
        let members = vec![
            Member::new("p").with_relationship(Relationship::new("c", "Hijo")),
            Member::new("c").with_relationship(Relationship::new("p", "Padre")),
        ];
        let genogram = build_genogram_at(&ids(&["p", "c"]), &members, &LayoutConfig::default(), today());
        let edge_ids: Vec<&str> = genogram.edges.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(edge_ids, vec!["p-c", "c-p"]);
    }

    #[test]
    fn repeated_pairs_get_distinct_ids() {
        let members = vec![
            Member::new("x")
                .with_relationship(Relationship::new("y", "Esposo"))
                .with_relationship(Relationship::new("y", "Pareja"))
                .with_relationship(Relationship::new("y", "Pareja")),
            Member::new("y"),
        ];
        let genogram = build_genogram_at(&ids(&["x", "y"]), &members, &LayoutConfig::default(), today());
        let edge_ids: HashSet<&str> = genogram.edges.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(edge_ids.len(), 3);
        assert!(edge_ids.contains("x-y"));
        assert!(edge_ids.contains("x-y-1"));
        assert!(edge_ids.contains("x-y-2"));
    }

    #[test]
    fn cohabitation_drives_animation() {
        let members = vec![
            Member::new("a").with_relationship(Relationship::new("b", "Hermana").cohabiting()),
            Member::new("b").with_relationship(Relationship::new("a", "Hermano")),
        ];
        let genogram = build_genogram_at(&ids(&["a", "b"]), &members, &LayoutConfig::default(), today());
        assert!(genogram.edges[0].animated);
        assert!(!genogram.edges[1].animated);
        assert_eq!(genogram.edges[0].kind, EdgeKind::Sibling);
        assert_eq!(genogram.edges[0].label, "Hermana");
    }

    #[test]
    fn ages_and_missing_birth_dates() {
        let members = vec![
            Member::new("a").with_birth_date("1990-06-16"),
            Member::new("b").with_birth_date("no sé"),
            Member::new("c"),
        ];
        let genogram = build_genogram_at(&ids(&["a", "b", "c"]), &members, &LayoutConfig::default(), today());
        assert_eq!(genogram.node("a").unwrap().age, Some(33));
        assert_eq!(genogram.node("b").unwrap().age, None);
        assert_eq!(genogram.node("c").unwrap().age, None);
    }

    #[test]
    fn defensive_inputs_return_empty() {
        let config = LayoutConfig::default();
        let members = json!([{ "id": "1" }]);
        assert!(build_genogram_from_values(&Value::Null, &members, &config).is_empty());
        assert!(build_genogram_from_values(&json!(["1"]), &Value::Null, &config).is_empty());
        assert!(build_genogram_from_values(&json!("1"), &members, &config).is_empty());
        let empty = build_genogram_from_values(&json!([]), &json!([]), &config);
        assert!(empty.nodes.is_empty());
        assert!(empty.edges.is_empty());
        assert_eq!(empty.width, 0.0);
        assert_eq!(empty.height, 0.0);
    }

    #[test]
    fn json_members_lay_out() {
        let genogram = build_genogram_from_values(
            &json!([1, 2]),
            &json!([
                { "id": 1, "nombre": "Ana", "sexo": "F", "genograma": [{ "miembroId": 2, "relacion": "Hijo" }] },
                { "id": 2, "nombre": "Leo", "sexo": "M" }
            ]),
            &LayoutConfig::default(),
        );
        assert_eq!(genogram.nodes.len(), 2);
        assert_eq!(genogram.node("2").unwrap().generation, 1);
    }
}
