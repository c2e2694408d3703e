use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub node_width: f32,
    pub node_height: f32,
    /// Vertical distance between the centres of two consecutive levels.
    pub level_gap: f32,
    /// Horizontal distance between the centres of adjacent siblings.
    pub sibling_gap: f32,
    pub corner_radius: f32,
    pub name_max_chars: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 150.0,
            node_height: 64.0,
            level_gap: 140.0,
            sibling_gap: 160.0,
            corner_radius: 14.0,
            name_max_chars: 17,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportConfig {
    pub min_scale: f32,
    pub max_scale: f32,
    pub zoom_step: f32,
    /// Scene y at which the synthetic root is anchored.
    pub top_margin: f32,
    /// Extra scene width added to twice the viewport width so zooming does not clip.
    pub canvas_margin: f32,
    pub canvas_height: f32,
    pub container_padding: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.5,
            max_scale: 2.75,
            zoom_step: 1.2,
            top_margin: 80.0,
            canvas_margin: 80.0,
            canvas_height: 1000.0,
            container_padding: 40.0,
        }
    }
}

impl ViewportConfig {
    /// Scale bounds must be finite with `0 < min_scale <= max_scale`, and the
    /// button step finite and positive.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.min_scale.is_finite() || self.min_scale <= 0.0 {
            anyhow::bail!("viewport.minScale must be a positive number, got {}", self.min_scale);
        }
        if !self.max_scale.is_finite() {
            anyhow::bail!("viewport.maxScale must be finite, got {}", self.max_scale);
        }
        if self.min_scale > self.max_scale {
            anyhow::bail!(
                "viewport.minScale ({}) exceeds viewport.maxScale ({})",
                self.min_scale,
                self.max_scale
            );
        }
        if !self.zoom_step.is_finite() || self.zoom_step <= 0.0 {
            anyhow::bail!("viewport.zoomStep must be a positive number, got {}", self.zoom_step);
        }
        Ok(())
    }

    /// Never panics, even on bounds that fail [`ViewportConfig::validate`].
    pub fn clamp_scale(&self, scale: f32) -> f32 {
        scale.max(self.min_scale).min(self.max_scale)
    }

    pub fn canvas_width(&self, viewport_width: f32) -> f32 {
        viewport_width * 2.0 + self.canvas_margin
    }

    /// Width of the canvas container once its horizontal padding is removed.
    pub fn visible_width(&self, viewport_width: f32) -> f32 {
        (viewport_width - self.container_padding * 2.0).max(0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Device width in pixels.
    pub width: f32,
    /// Height of the canvas container in pixels.
    pub height: f32,
    pub show_sponsor: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 390.0,
            height: 520.0,
            show_sponsor: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub viewport: ViewportConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: Theme::emerald(),
            layout: LayoutConfig::default(),
            viewport: ViewportConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    name_font_size: Option<f32>,
    id_font_size: Option<f32>,
    text_color: Option<String>,
    subtext_color: Option<String>,
    card_fill: Option<String>,
    card_border: Option<String>,
    root_fill: Option<String>,
    root_border: Option<String>,
    line_color: Option<String>,
    line_width: Option<f32>,
    board_background: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    node_width: Option<f32>,
    node_height: Option<f32>,
    level_gap: Option<f32>,
    sibling_gap: Option<f32>,
    corner_radius: Option<f32>,
    name_max_chars: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ViewportConfigFile {
    min_scale: Option<f32>,
    max_scale: Option<f32>,
    zoom_step: Option<f32>,
    top_margin: Option<f32>,
    canvas_margin: Option<f32>,
    canvas_height: Option<f32>,
    container_padding: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    viewport: Option<ViewportConfigFile>,
    show_sponsor: Option<bool>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parses a JSON5 (or plain JSON) config document on top of the defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = json5::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        match Theme::by_name(theme_name) {
            Some(theme) => config.theme = theme,
            None => log::warn!("unknown theme {theme_name:?}, keeping default"),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.name_font_size {
            config.theme.name_font_size = v;
        }
        if let Some(v) = vars.id_font_size {
            config.theme.id_font_size = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.subtext_color {
            config.theme.subtext_color = v;
        }
        if let Some(v) = vars.card_fill {
            config.theme.card_fill = v;
        }
        if let Some(v) = vars.card_border {
            config.theme.card_border = v;
        }
        if let Some(v) = vars.root_fill {
            config.theme.root_fill = v;
        }
        if let Some(v) = vars.root_border {
            config.theme.root_border = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.line_width {
            config.theme.line_width = v;
        }
        if let Some(v) = vars.board_background {
            config.theme.board_background = v;
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.node_width {
            config.layout.node_width = v;
        }
        if let Some(v) = layout.node_height {
            config.layout.node_height = v;
        }
        if let Some(v) = layout.level_gap {
            config.layout.level_gap = v;
        }
        if let Some(v) = layout.sibling_gap {
            config.layout.sibling_gap = v;
        }
        if let Some(v) = layout.corner_radius {
            config.layout.corner_radius = v;
        }
        if let Some(v) = layout.name_max_chars {
            config.layout.name_max_chars = v;
        }
    }

    if let Some(viewport) = parsed.viewport {
        if let Some(v) = viewport.min_scale {
            config.viewport.min_scale = v;
        }
        if let Some(v) = viewport.max_scale {
            config.viewport.max_scale = v;
        }
        if let Some(v) = viewport.zoom_step {
            config.viewport.zoom_step = v;
        }
        if let Some(v) = viewport.top_margin {
            config.viewport.top_margin = v;
        }
        if let Some(v) = viewport.canvas_margin {
            config.viewport.canvas_margin = v;
        }
        if let Some(v) = viewport.canvas_height {
            config.viewport.canvas_height = v;
        }
        if let Some(v) = viewport.container_padding {
            config.viewport.container_padding = v;
        }
    }
    config.viewport.validate()?;

    if let Some(show) = parsed.show_sponsor {
        config.render.show_sponsor = show;
    }

    Ok(config)
}
