use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::config::GenerationOrientation;
use crate::genogram::GenogramEdge;
use crate::relation::{EdgeKind, LineageRole, classify};

/// `(upper, lower)` pairs implied by the `parent` edges.
pub(super) fn descent_pairs<'a>(
    edges: &'a [GenogramEdge],
    orientation: GenerationOrientation,
) -> Vec<(&'a str, &'a str)> {
    edges
        .iter()
        .filter(|edge| edge.kind == EdgeKind::Parent && edge.source != edge.target)
        .map(|edge| {
            let forward = (edge.source.as_str(), edge.target.as_str());
            match orientation {
                GenerationOrientation::EdgeDirection => forward,
                GenerationOrientation::RelationLabel => match classify(&edge.label).role {
                    LineageRole::TargetIsElder => (edge.target.as_str(), edge.source.as_str()),
                    _ => forward,
                },
            }
        })
        .collect()
}

pub(super) fn partner_pairs(edges: &[GenogramEdge]) -> Vec<(&str, &str)> {
    edges
        .iter()
        .filter(|edge| edge.kind == EdgeKind::Marriage && edge.source != edge.target)
        .map(|edge| (edge.source.as_str(), edge.target.as_str()))
        .collect()
}

/// Assigns a generation to every node.
///
/// Nodes are visited in topological order of `descent`, ties and cycles
/// resolved by position in `node_ids`. When a cycle blocks progress, the
/// earliest remaining node becomes a source and its unprocessed incoming
/// pairs are ignored. Each node gets the longest-path depth from a root,
/// which is the smallest generation satisfying every kept pair; nodes with
/// no pairs stay at 0.
///
/// With `partners`, an unconstrained node is lifted to its partners'
/// generation before depths are propagated again.
pub(super) fn compute_generations(
    node_ids: &[String],
    descent: &[(&str, &str)],
    partners: &[(&str, &str)],
) -> HashMap<String, usize> {
    let set: HashSet<&str> = node_ids.iter().map(String::as_str).collect();
    let mut adj: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut rev: HashMap<&str, Vec<&str>> = HashMap::new();
    for &(upper, lower) in descent {
        if set.contains(upper) && set.contains(lower) && upper != lower {
            adj.entry(upper).or_default().push(lower);
            rev.entry(lower).or_default().push(upper);
        }
    }

    let node_order: HashMap<&str, usize> = node_ids
        .iter()
        .enumerate()
        .map(|(idx, id)| (id.as_str(), idx))
        .collect();
    let order_key = |id: &str| -> usize { node_order.get(id).copied().unwrap_or(usize::MAX) };

    let mut indeg: HashMap<&str, usize> = HashMap::new();
    for &id in &set {
        indeg.insert(id, rev.get(id).map(Vec::len).unwrap_or(0));
    }

    let mut ready: BinaryHeap<Reverse<(usize, &str)>> = BinaryHeap::new();
    for &id in &set {
        if indeg.get(id).copied().unwrap_or(0) == 0 {
            ready.push(Reverse((order_key(id), id)));
        }
    }

    let mut order: Vec<&str> = Vec::with_capacity(set.len());
    let mut processed: HashSet<&str> = HashSet::new();
    loop {
        while let Some(Reverse((_key, id))) = ready.pop() {
            if !processed.insert(id) {
                continue;
            }
            order.push(id);
            if let Some(nexts) = adj.get(id) {
                for &next in nexts {
                    if processed.contains(next) {
                        continue;
                    }
                    if let Some(deg) = indeg.get_mut(next) {
                        *deg = deg.saturating_sub(1);
                        if *deg == 0 {
                            ready.push(Reverse((order_key(next), next)));
                        }
                    }
                }
            }
        }

        if processed.len() >= set.len() {
            break;
        }

        // Cycle: restart from the remaining node that comes first in input
        // order; its pending incoming pairs become back edges.
        let best = node_ids
            .iter()
            .map(String::as_str)
            .find(|id| !processed.contains(id));
        match best {
            Some(id) => ready.push(Reverse((order_key(id), id))),
            None => break,
        }
    }

    let order_index: HashMap<&str, usize> = order
        .iter()
        .enumerate()
        .map(|(idx, id)| (*id, idx))
        .collect();
    let forward = |from: &str, to: &str| -> bool {
        match (order_index.get(from), order_index.get(to)) {
            (Some(f), Some(t)) => t > f,
            _ => false,
        }
    };

    let mut generations: HashMap<&str, usize> = set.iter().map(|id| (*id, 0)).collect();
    propagate(&order, &adj, &forward, &mut generations);

    if !partners.is_empty() {
        let mut constrained: HashSet<&str> = HashSet::new();
        for (&from, nexts) in &adj {
            for &next in nexts {
                if forward(from, next) {
                    constrained.insert(next);
                }
            }
        }
        let mut partners_of: HashMap<&str, Vec<&str>> = HashMap::new();
        for &(a, b) in partners {
            if set.contains(a) && set.contains(b) {
                partners_of.entry(a).or_default().push(b);
                partners_of.entry(b).or_default().push(a);
            }
        }
        for id in node_ids.iter().map(String::as_str) {
            if constrained.contains(id) {
                continue;
            }
            let Some(list) = partners_of.get(id) else {
                continue;
            };
            let peak = list
                .iter()
                .filter_map(|p| generations.get(p).copied())
                .max()
                .unwrap_or(0);
            if let Some(current) = generations.get_mut(id) {
                *current = (*current).max(peak);
            }
        }
        propagate(&order, &adj, &forward, &mut generations);
    }

    generations
        .into_iter()
        .map(|(id, generation)| (id.to_string(), generation))
        .collect()
}

fn propagate<'a>(
    order: &[&'a str],
    adj: &HashMap<&'a str, Vec<&'a str>>,
    forward: &impl Fn(&str, &str) -> bool,
    generations: &mut HashMap<&'a str, usize>,
) {
    for &node in order {
        let rank = generations.get(node).copied().unwrap_or(0);
        let Some(nexts) = adj.get(node) else {
            continue;
        };
        for &next in nexts {
            if !forward(node, next) {
                continue;
            }
            let entry = generations.entry(next).or_insert(0);
            *entry = (*entry).max(rank + 1);
        }
    }
}

/// A run of nodes that always sit next to each other in a row: a single
/// person, or a person followed by their partners.
pub(super) type Block = Vec<String>;

/// Groups nodes into rows by generation, keeping input order. Each node's
/// partners in the same row join its block right after it.
pub(super) fn build_rows(
    node_ids: &[String],
    generations: &HashMap<String, usize>,
    partners: &[(&str, &str)],
) -> Vec<Vec<Block>> {
    let depth = generations.values().copied().max().map_or(0, |max| max + 1);
    let mut rows: Vec<Vec<String>> = vec![Vec::new(); depth];
    for id in node_ids {
        if let Some(&generation) = generations.get(id) {
            rows[generation].push(id.clone());
        }
    }

    let node_order: HashMap<&str, usize> = node_ids
        .iter()
        .enumerate()
        .map(|(idx, id)| (id.as_str(), idx))
        .collect();
    let mut partners_of: HashMap<&str, Vec<&str>> = HashMap::new();
    for &(a, b) in partners {
        partners_of.entry(a).or_default().push(b);
        partners_of.entry(b).or_default().push(a);
    }
    for list in partners_of.values_mut() {
        list.sort_by_key(|id| node_order.get(id).copied().unwrap_or(usize::MAX));
        list.dedup();
    }

    rows.into_iter()
        .map(|row| {
            let members: HashSet<&str> = row.iter().map(String::as_str).collect();
            let mut placed: HashSet<&str> = HashSet::new();
            let mut blocks = Vec::new();
            for id in &row {
                if !placed.insert(id.as_str()) {
                    continue;
                }
                let mut block = vec![id.clone()];
                for &partner in partners_of.get(id.as_str()).map(Vec::as_slice).unwrap_or(&[]) {
                    if members.contains(partner) && placed.insert(partner) {
                        block.push(partner.to_string());
                    }
                }
                blocks.push(block);
            }
            blocks
        })
        .collect()
}

/// Median sweeps down then up the rows. Each block moves as a unit, scored
/// by the median slot of its members' parents (downward) or children
/// (upward). Blocks with no neighbours keep their slot, and ties keep the
/// current order.
pub(super) fn order_rows(rows: &mut [Vec<Block>], descent: &[(&str, &str)], passes: usize) {
    if rows.len() <= 1 || passes == 0 {
        return;
    }
    let mut parents: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    for &(upper, lower) in descent {
        children.entry(upper).or_default().push(lower);
        parents.entry(lower).or_default().push(upper);
    }

    let mut slots = slot_index(rows);
    for _ in 0..passes {
        for rank in 1..rows.len() {
            if sort_row(&mut rows[rank], &parents, &slots) {
                slots = slot_index(rows);
            }
        }
        for rank in (0..rows.len() - 1).rev() {
            if sort_row(&mut rows[rank], &children, &slots) {
                slots = slot_index(rows);
            }
        }
    }
}

/// Flattens block rows into plain id rows.
pub(super) fn flatten_rows(rows: Vec<Vec<Block>>) -> Vec<Vec<String>> {
    rows.into_iter()
        .map(|row| row.into_iter().flatten().collect())
        .collect()
}

fn slot_index(rows: &[Vec<Block>]) -> HashMap<String, usize> {
    let mut slots = HashMap::new();
    for row in rows {
        for (slot, id) in row.iter().flatten().enumerate() {
            slots.insert(id.clone(), slot);
        }
    }
    slots
}

/// Reorders one row and reports whether anything moved.
fn sort_row(
    row: &mut Vec<Block>,
    neighbours: &HashMap<&str, Vec<&str>>,
    slots: &HashMap<String, usize>,
) -> bool {
    if row.len() <= 1 {
        return false;
    }
    let mut scored: Vec<(f32, Block)> = row
        .drain(..)
        .map(|block| (block_score(&block, neighbours, slots), block))
        .collect();
    let before: Vec<String> = scored.iter().map(|(_, block)| block[0].clone()).collect();
    scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    row.extend(scored.into_iter().map(|(_, block)| block));
    row.iter().map(|block| &block[0]).ne(before.iter())
}

fn block_score(
    block: &[String],
    neighbours: &HashMap<&str, Vec<&str>>,
    slots: &HashMap<String, usize>,
) -> f32 {
    let mut values: Vec<f32> = block
        .iter()
        .flat_map(|id| neighbours.get(id.as_str()).into_iter().flatten())
        .filter_map(|neighbour| slots.get(*neighbour))
        .map(|&slot| slot as f32)
        .collect();
    median(&mut values).unwrap_or_else(|| slots.get(&block[0]).copied().unwrap_or(0) as f32)
}

fn median(values: &mut [f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) * 0.5)
    }
}
