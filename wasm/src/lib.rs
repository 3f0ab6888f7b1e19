use genogram_layout::{
    GenerationOrientation, LayoutConfig, build_genogram_from_values, group_families,
    layout_dump::to_json_value, parse_members_value,
};
use serde::Deserialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenogramOptions {
    node_spacing: Option<f32>,
    rank_spacing: Option<f32>,
    ordering_passes: Option<usize>,
    align_partners: Option<bool>,
    orient_by_label: Option<bool>,
}

fn build_layout_config(options: GenogramOptions) -> LayoutConfig {
    let mut config = LayoutConfig::default();
    if let Some(v) = options.node_spacing {
        config.node_spacing = v;
    }
    if let Some(v) = options.rank_spacing {
        config.rank_spacing = v;
    }
    if let Some(v) = options.ordering_passes {
        config.ordering_passes = v;
    }
    if let Some(v) = options.align_partners {
        config.align_partners = v;
    }
    if options.orient_by_label == Some(true) {
        config.orientation = GenerationOrientation::RelationLabel;
    }
    config
}

/// Malformed or missing JSON reads as `null`, which the core treats as
/// "no input".
fn parse_or_null(raw: Option<String>) -> Value {
    raw.and_then(|text| serde_json::from_str(&text).ok())
        .unwrap_or(Value::Null)
}

fn families_json(members: Value) -> String {
    let members = parse_members_value(&members).unwrap_or_default();
    serde_json::to_string(&group_families(&members)).unwrap_or_else(|_| "[]".to_string())
}

fn genogram_json(family_ids: Value, members: Value, options: Option<String>) -> Result<String, String> {
    let options = match options {
        Some(raw) => serde_json::from_str::<GenogramOptions>(&raw).map_err(|error| error.to_string())?,
        None => GenogramOptions::default(),
    };
    let genogram = build_genogram_from_values(&family_ids, &members, &build_layout_config(options));
    serde_json::to_string(&to_json_value(&genogram)).map_err(|error| error.to_string())
}

#[wasm_bindgen]
pub fn group_families_json(members_json: Option<String>) -> String {
    families_json(parse_or_null(members_json))
}

#[wasm_bindgen]
pub fn build_genogram_json(
    family_ids_json: Option<String>,
    members_json: Option<String>,
    options_json: Option<String>,
) -> Result<String, JsValue> {
    genogram_json(
        parse_or_null(family_ids_json),
        parse_or_null(members_json),
        options_json,
    )
    .map_err(|error| JsValue::from_str(&error))
}
