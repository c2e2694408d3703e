use crate::config::Config;
use crate::layout::{LaidOutNode, SceneBounds, layout_tree};
use crate::model::{ParentNode, TreeNode, TreeResponse};
use crate::render::{DrawList, edges, nodes};
use crate::viewport::{ViewportController, ViewportSize};

/// The viewer's tree wrapped under the synthetic root, anchored on a canvas
/// sized for one viewport.
#[derive(Debug, Clone)]
pub struct Scene {
    root: TreeNode,
    sponsor: Option<ParentNode>,
    viewport: ViewportSize,
    canvas: (f32, f32),
    anchor: (f32, f32),
    config: Config,
}

impl Scene {
    pub fn compose(
        tree: TreeNode,
        sponsor: Option<ParentNode>,
        viewport: ViewportSize,
        config: &Config,
    ) -> Self {
        let canvas = (
            config.viewport.canvas_width(viewport.width),
            config.viewport.canvas_height,
        );
        let anchor = (canvas.0 / 2.0, config.viewport.top_margin);
        let root = tree.with_synthetic_root();
        log::debug!(
            "composed scene: {} nodes, {} levels, canvas {:.0}x{:.0}",
            root.node_count(),
            root.depth(),
            canvas.0,
            canvas.1
        );
        Self {
            root,
            sponsor,
            viewport,
            canvas,
            anchor,
            config: config.clone(),
        }
    }

    pub fn from_response(response: TreeResponse, viewport: ViewportSize, config: &Config) -> Self {
        Self::compose(response.tree, response.parent, viewport, config)
    }

    /// The synthetic root.
    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    /// The real tree, without the synthetic node.
    pub fn viewer(&self) -> &TreeNode {
        self.root.children.first().unwrap_or(&self.root)
    }

    pub fn into_viewer(self) -> TreeNode {
        self.root.strip_synthetic_root()
    }

    pub fn sponsor(&self) -> Option<&ParentNode> {
        self.sponsor.as_ref()
    }

    pub fn viewport_size(&self) -> ViewportSize {
        self.viewport
    }

    pub fn canvas_size(&self) -> (f32, f32) {
        self.canvas
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Scene position of the synthetic root; the layout anchors it here.
    pub fn root_position(&self) -> (f32, f32) {
        self.anchor
    }

    pub fn layout(&self) -> LaidOutNode<'_> {
        layout_tree(&self.root, self.anchor.0, self.anchor.1, &self.config.layout)
    }

    pub fn bounds(&self) -> SceneBounds {
        self.layout()
            .bounds(self.config.layout.node_width, self.config.layout.node_height)
    }

    pub fn draw_list(&self) -> DrawList {
        let laid = [self.layout()];
        DrawList {
            edges: edges(&laid, &self.config.layout),
            nodes: nodes(&laid, &self.config.layout),
        }
    }

    /// A fresh controller centred on the synthetic root.
    pub fn viewport(&self) -> ViewportController {
        ViewportController::new(self.root_position(), self.viewport, &self.config.viewport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SYNTHETIC_ROOT_ID;
    use crate::render::NodeStyle;

    fn viewer(children: usize) -> TreeNode {
        TreeNode::new("me", "Me").with_children(
            (0..children)
                .map(|i| TreeNode::new(format!("c{i}"), format!("Child {i}")))
                .collect(),
        )
    }

    #[test]
    fn synthetic_root_sits_on_top_margin_in_canvas_middle() {
        let config = Config::default();
        let scene = Scene::compose(viewer(0), None, ViewportSize::new(390.0, 520.0), &config);
        assert_eq!(scene.canvas_size(), (860.0, 1000.0));
        assert_eq!(scene.root_position(), (430.0, 80.0));
        let laid = scene.layout();
        assert_eq!((laid.x, laid.y), scene.root_position());
        assert_eq!(laid.node.user_id, SYNTHETIC_ROOT_ID);
        assert_eq!(laid.children[0].node.user_id, "me");
        assert_eq!((laid.children[0].x, laid.children[0].y), (430.0, 220.0));
    }

    #[test]
    fn draw_list_has_one_edge_per_child_and_one_box_per_node() {
        let scene = Scene::compose(
            viewer(6),
            None,
            ViewportSize::new(390.0, 520.0),
            &Config::default(),
        );
        let draw = scene.draw_list();
        assert_eq!(draw.nodes.len(), 8);
        assert_eq!(draw.edges.len(), 7);
        assert_eq!(draw.nodes[0].style, NodeStyle::SyntheticRoot);
        assert!(draw.nodes[1..].iter().all(|n| n.style == NodeStyle::Member));
    }

    #[test]
    fn viewer_never_includes_synthetic_node() {
        let scene = Scene::compose(
            viewer(2),
            Some(ParentNode {
                user_id: "sp".into(),
                full_name: "Sponsor".into(),
            }),
            ViewportSize::new(390.0, 520.0),
            &Config::default(),
        );
        assert_eq!(scene.viewer().user_id, "me");
        assert_eq!(scene.sponsor().map(|p| p.user_id.as_str()), Some("sp"));
        let back = scene.into_viewer();
        assert_eq!(back, viewer(2));
    }

    #[test]
    fn fresh_viewport_centres_the_root() {
        let scene = Scene::compose(
            viewer(3),
            None,
            ViewportSize::new(400.0, 520.0),
            &Config::default(),
        );
        let vp = scene.viewport();
        let screen = vp.transform().apply(scene.root_position(), vp.pivot());
        assert_eq!(screen, vp.pivot());
    }
}
