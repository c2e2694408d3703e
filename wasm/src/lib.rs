use serde::Deserialize;
use teamtree_canvas::{RenderOptions, Theme, render_with_options};
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TreeRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    width: Option<f32>,
    height: Option<f32>,
    show_sponsor: Option<bool>,
}

fn build_render_options(options: TreeRenderOptions) -> RenderOptions {
    let mut render_options = RenderOptions::emerald();
    if let Some(theme) = options.theme.as_deref().and_then(Theme::by_name) {
        render_options.config.theme = theme;
    }

    if let Some(font_family) = options.font_family {
        render_options.config.theme.font_family = font_family;
    }
    if let Some(width) = options.width {
        render_options.config.render.width = width;
    }
    if let Some(height) = options.height {
        render_options.config.render.height = height;
    }
    if let Some(show_sponsor) = options.show_sponsor {
        render_options.config.render.show_sponsor = show_sponsor;
    }

    render_options
}

#[wasm_bindgen]
pub fn render_tree_svg(tree_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<TreeRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        TreeRenderOptions::default()
    };

    let render_options = build_render_options(options);
    render_with_options(tree_json, render_options).map_err(|error| JsValue::from_str(&error.to_string()))
}
