//! Generation-layered placement of genogram nodes and the family overview
//! grid.

mod overview;
mod ranking;

use std::collections::HashMap;

use crate::config::LayoutConfig;
use crate::genogram::Genogram;

pub use overview::{FamilyCard, compute_family_overview};

/// Assigns generations and coordinates to every node of `genogram`.
///
/// Rows are centred against the widest row. Within a row neighbours are
/// exactly `unit_x` apart and rows are `unit_y` apart, so the result never
/// overlaps and depends only on the node and edge lists.
pub fn compute_genogram_layout(genogram: &mut Genogram, config: &LayoutConfig) {
    if genogram.nodes.is_empty() {
        genogram.width = 0.0;
        genogram.height = 0.0;
        return;
    }

    let node_ids: Vec<String> = genogram.nodes.iter().map(|node| node.id.clone()).collect();
    let descent = ranking::descent_pairs(&genogram.edges, config.orientation);
    let partners = if config.align_partners {
        ranking::partner_pairs(&genogram.edges)
    } else {
        Vec::new()
    };

    let generations = ranking::compute_generations(&node_ids, &descent, &partners);
    let mut blocks = ranking::build_rows(&node_ids, &generations, &partners);
    ranking::order_rows(&mut blocks, &descent, config.ordering_passes);
    let rows = ranking::flatten_rows(blocks);

    let unit_x = config.unit_x();
    let unit_y = config.unit_y();
    let widest = rows.iter().map(Vec::len).max().unwrap_or(0);

    let mut positions: HashMap<&str, (usize, f32, f32)> = HashMap::new();
    for (generation, row) in rows.iter().enumerate() {
        let offset = (widest - row.len()) as f32 * unit_x / 2.0;
        let y = config.padding + generation as f32 * unit_y;
        for (slot, id) in row.iter().enumerate() {
            let x = config.padding + offset + slot as f32 * unit_x;
            positions.insert(id.as_str(), (generation, x, y));
        }
    }

    for node in &mut genogram.nodes {
        if let Some(&(generation, x, y)) = positions.get(node.id.as_str()) {
            node.generation = generation;
            node.x = x;
            node.y = y;
        }
        node.width = config.node_width;
        node.height = config.node_height;
    }

    let depth = rows.len().max(1);
    genogram.width = config.padding * 2.0 + (widest.max(1) - 1) as f32 * unit_x + config.node_width;
    genogram.height = config.padding * 2.0 + (depth - 1) as f32 * unit_y + config.node_height;
    tracing::debug!(
        generations = rows.len(),
        widest,
        width = genogram.width,
        height = genogram.height,
        "genogram laid out"
    );
}
