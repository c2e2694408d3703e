use crate::scene::Scene;
use crate::viewport::ViewportTransform;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub bounds: BoundsDump,
    pub transform: TransformDump,
    pub sponsor: Option<String>,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
pub struct BoundsDump {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Serialize)]
pub struct TransformDump {
    pub scale: f32,
    pub translate_x: f32,
    pub translate_y: f32,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub name: String,
    pub depth: usize,
    pub x: f32,
    pub y: f32,
    pub package_usd: f64,
    pub synthetic: bool,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub from: String,
    pub to: String,
    pub points: Vec<[f32; 2]>,
}

impl LayoutDump {
    pub fn from_scene(scene: &Scene, transform: &ViewportTransform) -> Self {
        let laid = scene.layout();
        let mut nodes = Vec::new();
        let mut stack = vec![(&laid, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            nodes.push(NodeDump {
                id: node.node.user_id.clone(),
                name: node.node.full_name.clone(),
                depth,
                x: node.x,
                y: node.y,
                package_usd: node.node.package_usd,
                synthetic: node.node.is_synthetic_root(),
            });
            stack.extend(node.children.iter().rev().map(|child| (child, depth + 1)));
        }

        let edges = scene
            .draw_list()
            .edges
            .into_iter()
            .map(|edge| EdgeDump {
                from: edge.from,
                to: edge.to,
                points: vec![
                    [edge.start.0, edge.start.1],
                    [edge.control.0, edge.control.1],
                    [edge.end.0, edge.end.1],
                ],
            })
            .collect();

        let bounds = scene.bounds();
        let (canvas_width, canvas_height) = scene.canvas_size();
        LayoutDump {
            canvas_width,
            canvas_height,
            bounds: BoundsDump {
                min_x: bounds.min_x,
                min_y: bounds.min_y,
                max_x: bounds.max_x,
                max_y: bounds.max_y,
                width: bounds.width(),
                height: bounds.height(),
            },
            transform: TransformDump {
                scale: transform.scale,
                translate_x: transform.translate_x,
                translate_y: transform.translate_y,
            },
            sponsor: scene.sponsor().map(|p| p.user_id.clone()),
            nodes,
            edges,
        }
    }
}

pub fn write_layout_dump(path: &Path, scene: &Scene, transform: &ViewportTransform) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_scene(scene, transform);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
