use std::collections::{HashMap, HashSet, VecDeque};

use serde::Serialize;

use crate::ir::{Member, MemberId};

/// One connected component of the relationship graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Family {
    pub id: String,
    pub members: Vec<MemberId>,
    pub size: usize,
}

impl Family {
    pub fn contains(&self, member_id: &str) -> bool {
        self.members.iter().any(|id| id == member_id)
    }
}

/// Undirected adjacency over the member snapshot. Stored entries are
/// directed and often unmirrored, so every entry contributes both
/// directions. Targets that are not in the snapshot are dropped.
struct Adjacency<'a> {
    neighbors: HashMap<&'a str, Vec<&'a str>>,
}

impl<'a> Adjacency<'a> {
    fn new(members: &'a [Member]) -> Self {
        let known: HashSet<&str> = members.iter().map(|m| m.id.as_str()).collect();
        let mut neighbors: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut seen_source: HashSet<&str> = HashSet::new();
        for member in members {
            if !seen_source.insert(member.id.as_str()) {
                continue;
            }
            for target in member.related_ids() {
                if !known.contains(target) {
                    tracing::trace!(source = %member.id, target, "dangling relationship target");
                    continue;
                }
                neighbors.entry(member.id.as_str()).or_default().push(target);
                neighbors.entry(target).or_default().push(member.id.as_str());
            }
        }
        Self { neighbors }
    }

    fn of(&self, id: &str) -> &[&'a str] {
        self.neighbors.get(id).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Partitions `members` into families by breadth-first traversal.
///
/// Families come out in the order their first member appears in the
/// input; member ids within a family follow discovery order. Duplicate
/// records for one id are folded into the first.
pub fn group_families(members: &[Member]) -> Vec<Family> {
    let adjacency = Adjacency::new(members);
    let mut visited: HashSet<&str> = HashSet::new();
    let mut families = Vec::new();

    for member in members {
        let start = member.id.as_str();
        if visited.contains(start) {
            continue;
        }
        let component = traverse(start, &adjacency, &mut visited);
        families.push(Family {
            id: format!("family-{}", families.len()),
            size: component.len(),
            members: component,
        });
    }

    tracing::debug!(
        members = members.len(),
        families = families.len(),
        "grouped members into families"
    );
    families
}

/// The family containing `member_id`, or `None` when no such member exists.
pub fn family_of(members: &[Member], member_id: &str) -> Option<Family> {
    group_families(members)
        .into_iter()
        .find(|family| family.contains(member_id))
}

fn traverse<'a>(
    start: &'a str,
    adjacency: &Adjacency<'a>,
    visited: &mut HashSet<&'a str>,
) -> Vec<MemberId> {
    let mut component = Vec::new();
    let mut queue = VecDeque::from([start]);
    visited.insert(start);
    while let Some(current) = queue.pop_front() {
        component.push(current.to_string());
        for &next in adjacency.of(current) {
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }
    component
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Relationship;
    use std::collections::BTreeSet;

    fn member(id: &str, targets: &[(&str, &str)]) -> Member {
        targets
            .iter()
            .fold(Member::new(id), |m, (target, label)| {
                m.with_relationship(Relationship::new(*target, label))
            })
    }

    fn sets(families: &[Family]) -> Vec<BTreeSet<String>> {
        families
            .iter()
            .map(|f| f.members.iter().cloned().collect())
            .collect()
    }

    #[test]
    fn spouse_pair_and_singleton() {
        let members = vec![
            member("1", &[("2", "esposa")]),
            member("2", &[]),
            member("3", &[]),
        ];
        let families = group_families(&members);
        assert_eq!(families.len(), 2);
        assert_eq!(families[0].id, "family-0");
        assert_eq!(families[0].members, vec!["1", "2"]);
        assert_eq!(families[0].size, 2);
        assert_eq!(families[1].members, vec!["3"]);
        assert_eq!(families[1].size, 1);
    }

    #[test]
    fn unmirrored_edge_found_from_target_side() {
        // Only the later member stores the entry; traversal from "a" must
        // still reach "b".
        let members = vec![member("a", &[]), member("b", &[("a", "Hijo")])];
        let families = group_families(&members);
        assert_eq!(families.len(), 1);
        assert_eq!(families[0].members, vec!["a", "b"]);
    }

    #[test]
    fn dangling_and_missing_targets_are_skipped() {
        let mut orphan = member("x", &[("ghost", "Padre")]);
        orphan.relationships.push(Relationship::default());
        let families = group_families(&[orphan, member("y", &[])]);
        assert_eq!(sets(&families).len(), 2);
        assert_eq!(families[0].members, vec!["x"]);
    }

    #[test]
    fn chains_merge_transitively() {
        let members = vec![
            member("p", &[]),
            member("q", &[]),
            member("c1", &[("p", "Padre")]),
            member("c2", &[("q", "Madre")]),
            member("q2", &[("c1", "Esposo"), ("c2", "Hermano")]),
        ];
        let families = group_families(&members);
        assert_eq!(families.len(), 1);
        assert_eq!(families[0].size, 5);
    }

    #[test]
    fn partition_covers_input_exactly_once() {
        let members = vec![
            member("1", &[("2", "hijo")]),
            member("2", &[("1", "padre")]),
            member("3", &[("4", "prima")]),
            member("4", &[]),
            member("5", &[("404", "tio")]),
            member("6", &[("3", "amiga")]),
        ];
        let families = group_families(&members);
        let mut seen = BTreeSet::new();
        for family in &families {
            assert_eq!(family.size, family.members.len());
            for id in &family.members {
                assert!(seen.insert(id.clone()), "{id} appears twice");
            }
        }
        let expected: BTreeSet<String> = members.iter().map(|m| m.id.clone()).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn grouping_is_idempotent() {
        let members = vec![
            member("a", &[("c", "esposa")]),
            member("b", &[]),
            member("c", &[("d", "hija")]),
            member("d", &[]),
        ];
        assert_eq!(sets(&group_families(&members)), sets(&group_families(&members)));
        assert_eq!(group_families(&members), group_families(&members));
    }

    #[test]
    fn duplicate_records_emit_once() {
        let members = vec![member("a", &[]), member("a", &[("b", "esposo")]), member("b", &[])];
        let families = group_families(&members);
        assert_eq!(families.len(), 2);
        assert_eq!(families[0].members, vec!["a"]);
    }

    #[test]
    fn empty_input() {
        assert!(group_families(&[]).is_empty());
    }

    #[test]
    fn family_of_finds_component() {
        let members = vec![member("a", &[]), member("b", &[("c", "hermana")]), member("c", &[])];
        let family = family_of(&members, "c").unwrap();
        assert_eq!(family.members, vec!["b", "c"]);
        assert!(family_of(&members, "zzz").is_none());
    }
}
