use crate::config::RenderConfig;
use crate::genogram::{Genogram, GenogramEdge, GenogramNode, NodeShape};
use crate::layout::FamilyCard;
use crate::relation::EdgeKind;
use crate::theme::Theme;
use anyhow::Result;
use std::collections::HashMap;
use std::path::Path;

pub fn render_svg(genogram: &Genogram, theme: &Theme) -> String {
    let mut svg = String::new();
    let width = genogram.width.max(200.0);
    let height = genogram.height.max(200.0);

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        escape_xml(&theme.background)
    ));

    let centers: HashMap<&str, (f32, f32)> = genogram
        .nodes
        .iter()
        .map(|node| (node.id.as_str(), center(node)))
        .collect();

    for edge in &genogram.edges {
        let (Some(from), Some(to)) = (
            centers.get(edge.source.as_str()),
            centers.get(edge.target.as_str()),
        ) else {
            continue;
        };
        svg.push_str(&edge_svg(edge, *from, *to, theme));
    }

    for node in &genogram.nodes {
        svg.push_str(&node_svg(node, theme));
    }

    svg.push_str("</svg>");
    svg
}

/// Overview of all families as a grid of labelled cards.
pub fn render_overview_svg(cards: &[FamilyCard], theme: &Theme) -> String {
    let width = cards
        .iter()
        .map(|card| card.x + card.width)
        .fold(200.0_f32, f32::max);
    let height = cards
        .iter()
        .map(|card| card.y + card.height)
        .fold(200.0_f32, f32::max);
    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    );
    for card in cards {
        svg.push_str(&format!(
            "<g class=\"family-card\" data-family=\"{}\"><rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"6\" fill=\"{}\" stroke=\"{}\" stroke-width=\"2\"/>",
            escape_xml(&card.family_id),
            card.x,
            card.y,
            card.width,
            card.height,
            escape_xml(&theme.card_fill),
            escape_xml(&theme.card_stroke)
        ));
        let cx = card.x + card.width / 2.0;
        let cy = card.y + card.height / 2.0;
        svg.push_str(&format!(
            "<text x=\"{cx:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">Family {}</text>",
            cy - 4.0,
            escape_xml(&theme.font_family),
            theme.font_size + 2.0,
            escape_xml(&theme.card_text_color),
            card.ordinal
        ));
        let noun = if card.size == 1 { "member" } else { "members" };
        svg.push_str(&format!(
            "<text x=\"{cx:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{} {noun}</text></g>",
            cy + theme.font_size + 2.0,
            escape_xml(&theme.font_family),
            theme.font_size,
            escape_xml(&theme.card_text_color),
            card.size
        ));
    }
    svg.push_str("</svg>");
    svg
}

fn center(node: &GenogramNode) -> (f32, f32) {
    (node.x + node.width / 2.0, node.y + node.height / 2.0)
}

fn edge_svg(edge: &GenogramEdge, from: (f32, f32), to: (f32, f32), theme: &Theme) -> String {
    let (stroke, dash) = match edge.kind {
        EdgeKind::Marriage => (escape_xml(&theme.marriage_color), None),
        EdgeKind::Parent => (escape_xml(&theme.line_color), None),
        EdgeKind::Sibling => (escape_xml(&theme.line_color), Some("6 4")),
    };
    let dash = dash
        .map(|d| format!(" stroke-dasharray=\"{d}\""))
        .unwrap_or_default();
    let class = if edge.animated {
        format!("edge {} animated", edge.kind.as_str())
    } else {
        format!("edge {}", edge.kind.as_str())
    };
    let mut out = format!(
        "<line class=\"{class}\" data-edge=\"{}\" x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{stroke}\" stroke-width=\"2\"{dash}/>",
        escape_xml(&edge.id),
        from.0,
        from.1,
        to.0,
        to.1
    );
    if !edge.label.is_empty() {
        let mid_x = (from.0 + to.0) / 2.0;
        let mid_y = (from.1 + to.1) / 2.0;
        out.push_str(&format!(
            "<text x=\"{mid_x:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            mid_y - 4.0,
            escape_xml(&theme.font_family),
            theme.font_size - 2.0,
            escape_xml(&theme.muted_text_color),
            escape_xml(&edge.label)
        ));
    }
    out
}

fn node_svg(node: &GenogramNode, theme: &Theme) -> String {
    let (cx, cy) = center(node);
    let mut out = format!("<g class=\"genogram-node\" data-id=\"{}\">", escape_xml(&node.id));
    match node.shape {
        NodeShape::Rectangle => out.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"4\" fill=\"{}\" stroke=\"{}\" stroke-width=\"2\"/>",
            node.x,
            node.y,
            node.width,
            node.height,
            escape_xml(&theme.male_fill),
            escape_xml(&theme.male_stroke)
        )),
        NodeShape::Circle => out.push_str(&format!(
            "<circle cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"2\"/>",
            node.width.min(node.height) / 2.0,
            escape_xml(&theme.female_fill),
            escape_xml(&theme.female_stroke)
        )),
    }
    out.push_str(&format!(
        "<text x=\"{cx:.2}\" y=\"{cy:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" font-weight=\"bold\" fill=\"{}\">{}</text>",
        escape_xml(&theme.font_family),
        theme.font_size,
        escape_xml(&theme.text_color),
        escape_xml(&node.label)
    ));
    let mut details = Vec::new();
    if let Some(age) = node.age {
        details.push(format!("{age} años"));
    }
    if let Some(status) = node.marital_status.as_deref() {
        details.push(status.to_string());
    }
    if !details.is_empty() {
        out.push_str(&format!(
            "<text x=\"{cx:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            cy + theme.font_size + 2.0,
            escape_xml(&theme.font_family),
            theme.font_size - 2.0,
            escape_xml(&theme.muted_text_color),
            escape_xml(&details.join(" · "))
        ));
    }
    out.push_str("</g>");
    out
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .ok_or_else(|| anyhow::anyhow!("invalid render size"))?;
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;
    if let Some(color) = parse_hex_color(&render_cfg.background) {
        pixmap.fill(color);
    }

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

#[cfg(feature = "png")]
fn parse_hex_color(raw: &str) -> Option<resvg::tiny_skia::Color> {
    let hex = raw.trim().strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some(resvg::tiny_skia::Color::from_rgba8(
        channel(0..2)?,
        channel(2..4)?,
        channel(4..6)?,
        255,
    ))
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
