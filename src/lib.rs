#[cfg(feature = "cli")]
pub mod cli;
pub mod api;
pub mod config;
pub mod layout;
pub mod layout_dump;
pub mod loader;
pub mod model;
pub mod progress;
pub mod render;
pub mod scene;
pub mod session;
pub mod theme;
pub mod viewport;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, ViewportConfig, load_config};
pub use layout::{LaidOutNode, layout_tree};
pub use model::{ParentNode, TreeNode, TreeResponse};
pub use render::render_svg;
pub use scene::Scene;
pub use theme::Theme;
pub use viewport::{ViewportController, ViewportSize, ViewportTransform};

use anyhow::Context;

/// Options for one-shot rendering of a tree payload.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub config: Config,
}

impl RenderOptions {
    pub fn emerald() -> Self {
        Self::default()
    }

    pub fn midnight() -> Self {
        let mut config = Config::default();
        config.theme = Theme::midnight();
        Self { config }
    }
}

/// Deepest bare tree `parse_tree_payload` accepts. Every level costs two
/// JSON nesting levels (the node object and its `children` array) against
/// serde_json's recursion limit of 128; a wrapped response spends one more.
pub const MAX_PAYLOAD_DEPTH: usize = 63;

/// Accepts either a full `TreeResponse` or a bare tree.
///
/// Trees nested deeper than [`MAX_PAYLOAD_DEPTH`] levels are rejected with an
/// error rather than parsed.
pub fn parse_tree_payload(input: &str) -> anyhow::Result<TreeResponse> {
    let value: serde_json::Value = serde_json::from_str(input).with_context(|| {
        format!("tree payload is not valid JSON or nests deeper than {MAX_PAYLOAD_DEPTH} levels")
    })?;
    if value.get("tree").is_some() {
        return Ok(serde_json::from_value(value)?);
    }
    let tree: TreeNode = serde_json::from_value(value)?;
    Ok(TreeResponse { tree, parent: None })
}

/// Renders the centred starting view of a tree payload.
pub fn render_with_options(input: &str, options: RenderOptions) -> anyhow::Result<String> {
    let response = parse_tree_payload(input)?;
    let config = options.config;
    let size = ViewportSize::new(config.render.width, config.render.height);
    let scene = Scene::from_response(response, size, &config);
    let viewport = scene.viewport();
    Ok(render_svg(&scene, &viewport, &config.theme, &config))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_json(levels: usize) -> String {
        let mut json = String::new();
        for level in 0..levels {
            json.push_str(&format!(r#"{{"userId":"u{level}","fullName":"U","children":["#));
        }
        for _ in 0..levels {
            json.push_str("]}");
        }
        json
    }

    #[test]
    fn deep_chains_parse_up_to_the_nesting_limit() {
        let response = parse_tree_payload(&chain_json(MAX_PAYLOAD_DEPTH)).expect("deep tree");
        assert_eq!(response.tree.depth(), MAX_PAYLOAD_DEPTH);

        let err = parse_tree_payload(&chain_json(MAX_PAYLOAD_DEPTH + 1)).unwrap_err();
        assert!(format!("{err:#}").contains("recursion limit"), "{err:#}");
        assert!(err.to_string().contains("nests deeper than 63 levels"));
    }

    #[test]
    fn bare_tree_and_wrapped_payload_both_parse() {
        let bare = parse_tree_payload(r#"{"userId":"me","fullName":"Me"}"#).expect("bare");
        assert_eq!(bare.tree.user_id, "me");
        assert!(bare.parent.is_none());

        let wrapped = parse_tree_payload(
            r#"{"tree":{"userId":"me","fullName":"Me"},"parent":{"userId":"p","fullName":"P"}}"#,
        )
        .expect("wrapped");
        assert_eq!(wrapped.parent.map(|p| p.user_id), Some("p".to_string()));
    }

    #[test]
    fn render_with_options_produces_svg() {
        let svg = render_with_options(
            r#"{"userId":"me","fullName":"Me","children":[{"userId":"k","fullName":"Kid"}]}"#,
            RenderOptions::midnight(),
        )
        .expect("svg");
        assert!(svg.contains("<svg"));
        assert!(svg.contains("ID k"));
        assert!(svg.contains(&Theme::midnight().board_background));
    }

    #[test]
    fn rejects_payload_without_tree_fields() {
        assert!(parse_tree_payload(r#"{"hello":1}"#).is_err());
        assert!(parse_tree_payload("nope").is_err());
    }
}
