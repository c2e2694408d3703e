use crate::config::{Config, LayoutConfig, RenderConfig};
use crate::layout::LaidOutNode;
use crate::model::ParentNode;
use crate::scene::Scene;
use crate::theme::Theme;
use crate::viewport::ViewportController;
use anyhow::Result;
use std::path::Path;

/// Quadratic curve from the bottom centre of a parent box to the top centre
/// of a child box. The control point shares the parent's x, so the curve
/// only bends vertically.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeCurve {
    pub from: String,
    pub to: String,
    pub start: (f32, f32),
    pub control: (f32, f32),
    pub end: (f32, f32),
}

impl EdgeCurve {
    pub fn path_data(&self) -> String {
        format!(
            "M {:.2} {:.2} Q {:.2} {:.2} {:.2} {:.2}",
            self.start.0, self.start.1, self.control.0, self.control.1, self.end.0, self.end.1
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStyle {
    SyntheticRoot,
    Member,
}

/// Rounded rectangle centred on a laid-out node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeBox {
    pub id: String,
    pub center_x: f32,
    pub center_y: f32,
    pub width: f32,
    pub height: f32,
    pub corner_radius: f32,
    pub style: NodeStyle,
    pub title: String,
    /// `"ID <user id>"`; absent for the synthetic root.
    pub subtitle: Option<String>,
}

impl NodeBox {
    pub fn left(&self) -> f32 {
        self.center_x - self.width / 2.0
    }

    pub fn top(&self) -> f32 {
        self.center_y - self.height / 2.0
    }
}

/// Draw commands for one pass, edges underneath boxes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    pub edges: Vec<EdgeCurve>,
    pub nodes: Vec<NodeBox>,
}

pub fn edges(roots: &[LaidOutNode<'_>], config: &LayoutConfig) -> Vec<EdgeCurve> {
    let half_h = config.node_height / 2.0;
    let mut out = Vec::new();
    for root in roots {
        for parent in root.iter() {
            for child in &parent.children {
                let start = (parent.x, parent.y + half_h);
                let end = (child.x, child.y - half_h);
                out.push(EdgeCurve {
                    from: parent.node.user_id.clone(),
                    to: child.node.user_id.clone(),
                    start,
                    control: (start.0, (start.1 + end.1) / 2.0),
                    end,
                });
            }
        }
    }
    out
}

pub fn nodes(roots: &[LaidOutNode<'_>], config: &LayoutConfig) -> Vec<NodeBox> {
    let mut out = Vec::new();
    for root in roots {
        for laid in root.iter() {
            let synthetic = laid.node.is_synthetic_root();
            out.push(NodeBox {
                id: laid.node.user_id.clone(),
                center_x: laid.x,
                center_y: laid.y,
                width: config.node_width,
                height: config.node_height,
                corner_radius: config.corner_radius,
                style: if synthetic {
                    NodeStyle::SyntheticRoot
                } else {
                    NodeStyle::Member
                },
                title: truncate_name(&laid.node.full_name, config.name_max_chars),
                subtitle: (!synthetic).then(|| format!("ID {}", laid.node.user_id)),
            });
        }
    }
    out
}

/// Cuts `name` to `max_chars` characters plus an ellipsis when it is longer.
pub fn truncate_name(name: &str, max_chars: usize) -> String {
    if name.chars().count() <= max_chars {
        return name.to_string();
    }
    let mut out: String = name.chars().take(max_chars).collect();
    out.push('…');
    out
}

pub fn render_svg(
    scene: &Scene,
    viewport: &ViewportController,
    theme: &Theme,
    config: &Config,
) -> String {
    let mut svg = String::new();
    let size = scene.viewport_size();
    let width = size.width.max(1.0);
    let height = size.height.max(1.0);
    let padding = config.viewport.container_padding;

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<defs><clipPath id=\"board\"><rect width=\"{width}\" height=\"{height}\" rx=\"12\" ry=\"12\"/></clipPath></defs>"
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" rx=\"12\" ry=\"12\" fill=\"{}\"/>",
        theme.board_background
    ));

    svg.push_str("<g clip-path=\"url(#board)\">");
    svg.push_str(&format!("<g transform=\"translate({padding:.2} 0)\">"));
    svg.push_str(&format!(
        "<g transform=\"{}\">",
        viewport.transform().to_svg(viewport.pivot())
    ));

    let draw = scene.draw_list();
    for edge in &draw.edges {
        svg.push_str(&format!(
            "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"/>",
            edge.path_data(),
            theme.line_color,
            theme.line_width
        ));
    }
    for node in &draw.nodes {
        svg.push_str(&node_svg(node, theme));
    }

    svg.push_str("</g></g></g>");

    if config.render.show_sponsor {
        if let Some(sponsor) = scene.sponsor() {
            svg.push_str(&sponsor_caption_svg(sponsor, theme));
        }
    }

    svg.push_str("</svg>");
    svg
}

fn node_svg(node: &NodeBox, theme: &Theme) -> String {
    let (fill, stroke, text, subtext) = match node.style {
        NodeStyle::SyntheticRoot => (
            &theme.root_fill,
            &theme.root_border,
            &theme.root_text_color,
            &theme.root_subtext_color,
        ),
        NodeStyle::Member => (
            &theme.card_fill,
            &theme.card_border,
            &theme.text_color,
            &theme.subtext_color,
        ),
    };
    let mut out = String::new();
    out.push_str("<g>");
    out.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{r}\" ry=\"{r}\" fill=\"{fill}\" stroke=\"{stroke}\" stroke-width=\"2\"/>",
        node.left(),
        node.top(),
        node.width,
        node.height,
        r = node.corner_radius,
    ));
    let title_y = match node.subtitle {
        Some(_) => node.center_y - 2.0,
        None => node.center_y + theme.name_font_size / 3.0,
    };
    out.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{title_y:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" font-weight=\"700\" fill=\"{text}\">{}</text>",
        node.center_x,
        theme.font_family,
        theme.name_font_size,
        escape_xml(&node.title)
    ));
    if let Some(subtitle) = &node.subtitle {
        out.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" font-weight=\"500\" fill=\"{subtext}\">{}</text>",
            node.center_x,
            node.center_y + 15.0,
            theme.font_family,
            theme.id_font_size,
            escape_xml(subtitle)
        ));
    }
    out.push_str("</g>");
    out
}

fn sponsor_caption_svg(sponsor: &ParentNode, theme: &Theme) -> String {
    format!(
        "<text x=\"12\" y=\"20\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">Your Sponsor: {} (ID {})</text>",
        theme.font_family,
        theme.id_font_size,
        theme.caption_color,
        escape_xml(&sponsor.full_name),
        escape_xml(&sponsor.user_id)
    )
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
pub fn write_output_png(
    svg: &str,
    output: &Path,
    render_cfg: &RenderConfig,
    theme: &Theme,
) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = theme
        .font_family
        .split(',')
        .next()
        .map(|family| family.trim().trim_matches('"').to_string())
        .unwrap_or_else(|| "Inter".to_string());
    opt.fontdb_mut().load_system_fonts();
    if let Some(size) = usvg::Size::from_wh(render_cfg.width, render_cfg.height) {
        opt.default_size = size;
    }

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(
    _svg: &str,
    _output: &Path,
    _render_cfg: &RenderConfig,
    _theme: &Theme,
) -> Result<()> {
    anyhow::bail!("PNG output requires the `png` feature")
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
