use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub male_fill: String,
    pub male_stroke: String,
    pub female_fill: String,
    pub female_stroke: String,
    pub text_color: String,
    pub muted_text_color: String,
    pub line_color: String,
    pub marriage_color: String,
    pub card_fill: String,
    pub card_stroke: String,
    pub card_text_color: String,
    pub background: String,
}

impl Theme {
    /// Blue rectangles and pink circles on white.
    pub fn classic() -> Self {
        Self {
            font_family: "'trebuchet ms', verdana, arial, sans-serif".to_string(),
            font_size: 12.0,
            male_fill: "#90CAF9".to_string(),
            male_stroke: "#1976D2".to_string(),
            female_fill: "#F48FB1".to_string(),
            female_stroke: "#C2185B".to_string(),
            text_color: "#1C2430".to_string(),
            muted_text_color: "#4B5563".to_string(),
            line_color: "#333333".to_string(),
            marriage_color: "#E91E63".to_string(),
            card_fill: "#4F46E5".to_string(),
            card_stroke: "#312E81".to_string(),
            card_text_color: "#FFFFFF".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            male_fill: "#DBEAFE".to_string(),
            male_stroke: "#3B82F6".to_string(),
            female_fill: "#FCE7F3".to_string(),
            female_stroke: "#EC4899".to_string(),
            text_color: "#1C2430".to_string(),
            muted_text_color: "#6B7280".to_string(),
            line_color: "#7A8AA6".to_string(),
            marriage_color: "#DB2777".to_string(),
            card_fill: "#EEF2F8".to_string(),
            card_stroke: "#C7D2E5".to_string(),
            card_text_color: "#1C2430".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }
}
