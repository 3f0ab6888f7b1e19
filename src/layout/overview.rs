use serde::Serialize;

use crate::config::LayoutConfig;
use crate::grouping::Family;
use crate::ir::MemberId;

/// One family placed on the overview grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FamilyCard {
    pub family_id: String,
    /// 1-based position, as shown to users ("Family 3").
    pub ordinal: usize,
    pub size: usize,
    pub members: Vec<MemberId>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

pub fn compute_family_overview(families: &[Family], config: &LayoutConfig) -> Vec<FamilyCard> {
    let grid = &config.overview;
    let columns = grid.columns.max(1);
    families
        .iter()
        .enumerate()
        .map(|(idx, family)| FamilyCard {
            family_id: family.id.clone(),
            ordinal: idx + 1,
            size: family.size,
            members: family.members.clone(),
            x: (idx % columns) as f32 * grid.column_spacing,
            y: (idx / columns) as f32 * grid.row_spacing,
            width: grid.card_width,
            height: grid.card_height,
        })
        .collect()
}
