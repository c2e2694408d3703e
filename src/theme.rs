use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub name_font_size: f32,
    pub id_font_size: f32,
    pub text_color: String,
    pub subtext_color: String,
    pub card_fill: String,
    pub card_border: String,
    pub root_fill: String,
    pub root_border: String,
    pub root_text_color: String,
    pub root_subtext_color: String,
    pub line_color: String,
    pub line_width: f32,
    pub board_background: String,
    pub caption_color: String,
}

impl Theme {
    pub fn emerald() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            name_font_size: 12.0,
            id_font_size: 10.0,
            text_color: "#0B0B0B".to_string(),
            subtext_color: "#6B7280".to_string(),
            card_fill: "#FFFFFF".to_string(),
            card_border: "#E5E7EB".to_string(),
            root_fill: "#10B981".to_string(),
            root_border: "#059669".to_string(),
            root_text_color: "#FFFFFF".to_string(),
            root_subtext_color: "#ECFDF5".to_string(),
            line_color: "#9AE6B4".to_string(),
            line_width: 2.5,
            board_background: "#F8FAFC".to_string(),
            caption_color: "#6B7280".to_string(),
        }
    }

    pub fn midnight() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            name_font_size: 12.0,
            id_font_size: 10.0,
            text_color: "#F9FAFB".to_string(),
            subtext_color: "#9CA3AF".to_string(),
            card_fill: "#1F2937".to_string(),
            card_border: "#374151".to_string(),
            root_fill: "#059669".to_string(),
            root_border: "#047857".to_string(),
            root_text_color: "#FFFFFF".to_string(),
            root_subtext_color: "#D1FAE5".to_string(),
            line_color: "#10B981".to_string(),
            line_width: 2.5,
            board_background: "#111827".to_string(),
            caption_color: "#9CA3AF".to_string(),
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "emerald" | "default" => Some(Self::emerald()),
            "midnight" | "dark" => Some(Self::midnight()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::emerald()
    }
}
