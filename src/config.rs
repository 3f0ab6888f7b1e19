use crate::error::{GenogramError, Result};
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which way a `parent` edge points in the generation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GenerationOrientation {
    /// The edge source sits one generation above the target, whatever the
    /// label says.
    #[default]
    EdgeDirection,
    /// `padre`/`madre` entries put the target above the source and
    /// `hijo`/`hija` entries put it below.
    RelationLabel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverviewConfig {
    pub columns: usize,
    pub column_spacing: f32,
    pub row_spacing: f32,
    pub card_width: f32,
    pub card_height: f32,
}

impl Default for OverviewConfig {
    fn default() -> Self {
        Self {
            columns: 3,
            column_spacing: 300.0,
            row_spacing: 200.0,
            card_width: 200.0,
            card_height: 100.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub node_width: f32,
    pub node_height: f32,
    /// Horizontal distance between neighbours of one generation.
    pub node_spacing: f32,
    /// Vertical distance between generations.
    pub rank_spacing: f32,
    pub padding: f32,
    /// Median sweeps over the generation rows. Zero keeps input order.
    pub ordering_passes: usize,
    pub align_partners: bool,
    pub orientation: GenerationOrientation,
    pub overview: OverviewConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 150.0,
            node_height: 100.0,
            node_spacing: 180.0,
            rank_spacing: 150.0,
            padding: 50.0,
            ordering_passes: 0,
            align_partners: true,
            orientation: GenerationOrientation::EdgeDirection,
            overview: OverviewConfig::default(),
        }
    }
}

impl LayoutConfig {
    /// Horizontal step between slots; never smaller than a node.
    pub fn unit_x(&self) -> f32 {
        self.node_spacing.max(self.node_width).max(1.0)
    }

    /// Vertical step between generations; never smaller than a node.
    pub fn unit_y(&self) -> f32 {
        self.rank_spacing.max(self.node_height).max(1.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::classic();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    node_width: Option<f32>,
    node_height: Option<f32>,
    node_spacing: Option<f32>,
    rank_spacing: Option<f32>,
    padding: Option<f32>,
    ordering_passes: Option<usize>,
    align_partners: Option<bool>,
    orientation: Option<GenerationOrientation>,
    overview: Option<OverviewConfigFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OverviewConfigFile {
    columns: Option<usize>,
    column_spacing: Option<f32>,
    row_spacing: Option<f32>,
    card_width: Option<f32>,
    card_height: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeFile {
    font_family: Option<String>,
    font_size: Option<f32>,
    male_fill: Option<String>,
    male_stroke: Option<String>,
    female_fill: Option<String>,
    female_stroke: Option<String>,
    text_color: Option<String>,
    line_color: Option<String>,
    marriage_color: Option<String>,
    card_text_color: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeFile>,
    layout: Option<LayoutConfigFile>,
    width: Option<f32>,
    height: Option<f32>,
}

/// Loads a config file on top of the defaults. Files are JSON; JSON5 is
/// accepted as a fallback so hand-written files may carry comments.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path).map_err(|source| GenogramError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> Result<Config> {
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(_) => json5::from_str(contents)?,
    };
    Ok(apply_config_file(Config::default(), parsed))
}

fn apply_config_file(mut config: Config, parsed: ConfigFile) -> Config {
    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "modern" {
            config.theme = Theme::modern();
        } else if theme_name == "classic" || theme_name == "default" {
            config.theme = Theme::classic();
        }
        config.render.background = config.theme.background.clone();
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.male_fill {
            config.theme.male_fill = v;
        }
        if let Some(v) = vars.male_stroke {
            config.theme.male_stroke = v;
        }
        if let Some(v) = vars.female_fill {
            config.theme.female_fill = v;
        }
        if let Some(v) = vars.female_stroke {
            config.theme.female_stroke = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.marriage_color {
            config.theme.marriage_color = v;
        }
        if let Some(v) = vars.card_text_color {
            config.theme.card_text_color = v;
        }
        if let Some(v) = vars.background {
            config.render.background = v.clone();
            config.theme.background = v;
        }
    }

    if let Some(layout) = parsed.layout {
        let target = &mut config.layout;
        if let Some(v) = layout.node_width {
            target.node_width = v;
        }
        if let Some(v) = layout.node_height {
            target.node_height = v;
        }
        if let Some(v) = layout.node_spacing {
            target.node_spacing = v;
        }
        if let Some(v) = layout.rank_spacing {
            target.rank_spacing = v;
        }
        if let Some(v) = layout.padding {
            target.padding = v;
        }
        if let Some(v) = layout.ordering_passes {
            target.ordering_passes = v;
        }
        if let Some(v) = layout.align_partners {
            target.align_partners = v;
        }
        if let Some(v) = layout.orientation {
            target.orientation = v;
        }
        if let Some(overview) = layout.overview {
            if let Some(v) = overview.columns {
                target.overview.columns = v.max(1);
            }
            if let Some(v) = overview.column_spacing {
                target.overview.column_spacing = v;
            }
            if let Some(v) = overview.row_spacing {
                target.overview.row_spacing = v;
            }
            if let Some(v) = overview.card_width {
                target.overview.card_width = v;
            }
            if let Some(v) = overview.card_height {
                target.overview.card_height = v;
            }
        }
    }

    if let Some(v) = parsed.width {
        config.render.width = v;
    }
    if let Some(v) = parsed.height {
        config.render.height = v;
    }
    config
}
