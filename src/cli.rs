use crate::config::load_config;
use crate::layout_dump::write_layout_dump;
use crate::parse_tree_payload;
use crate::render::{render_svg, write_output_png, write_output_svg};
use crate::scene::Scene;
use crate::viewport::{GesturePhase, PanEvent, ViewportController, ViewportSize};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "teamtree", version, about = "Render a sponsor tree as an SVG/PNG canvas")]
pub struct Args {
    /// Tree JSON (team tree response or bare tree), or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config file (JSON or JSON5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Device width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Canvas container height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Press the zoom-in button this many times
    #[arg(long = "zoomIn", default_value_t = 0)]
    pub zoom_in: u32,

    /// Press the zoom-out button this many times
    #[arg(long = "zoomOut", default_value_t = 0)]
    pub zoom_out: u32,

    /// Pan the canvas by DX,DY pixels before rendering
    #[arg(long = "pan", value_parser = parse_pan, allow_hyphen_values = true)]
    pub pan: Option<(f32, f32)>,

    /// Write the laid-out scene as JSON to this path
    #[arg(long = "dumpLayout")]
    pub dump_layout: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }

    let input = read_input(args.input.as_deref())?;
    let response = parse_tree_payload(&input)?;
    let size = ViewportSize::new(config.render.width, config.render.height);
    let scene = Scene::from_response(response, size, &config);

    let mut viewport = scene.viewport();
    apply_view_commands(&mut viewport, &args);
    log::info!(
        "rendering {} nodes at scale {:.2}",
        scene.root().node_count(),
        viewport.transform().scale
    );

    if let Some(path) = args.dump_layout.as_deref() {
        write_layout_dump(path, &scene, &viewport.transform())?;
    }

    let svg = render_svg(&scene, &viewport, &config.theme, &config);
    match args.output_format {
        OutputFormat::Svg => {
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_output_png(&svg, &output, &config.render, &config.theme)?;
        }
    }
    Ok(())
}

fn apply_view_commands(viewport: &mut ViewportController, args: &Args) {
    for _ in 0..args.zoom_in {
        viewport.zoom_in();
    }
    for _ in 0..args.zoom_out {
        viewport.zoom_out();
    }
    if let Some((dx, dy)) = args.pan {
        viewport.on_pan(PanEvent {
            phase: GesturePhase::Began,
            translation_x: 0.0,
            translation_y: 0.0,
        });
        viewport.on_pan(PanEvent {
            phase: GesturePhase::Ended,
            translation_x: dx,
            translation_y: dy,
        });
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

fn parse_pan(raw: &str) -> std::result::Result<(f32, f32), String> {
    let (dx, dy) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected DX,DY, got {raw:?}"))?;
    let dx = dx.trim().parse::<f32>().map_err(|e| format!("bad DX: {e}"))?;
    let dy = dy.trim().parse::<f32>().map_err(|e| format!("bad DY: {e}"))?;
    Ok((dx, dy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::model::TreeNode;

    #[test]
    fn parses_pan_offsets() {
        assert_eq!(parse_pan("10,-5"), Ok((10.0, -5.0)));
        assert_eq!(parse_pan(" 1.5 , 2 "), Ok((1.5, 2.0)));
        assert!(parse_pan("10").is_err());
        assert!(parse_pan("a,b").is_err());
    }

    #[test]
    fn args_accept_negative_pan_and_zoom_counts() {
        let args = Args::try_parse_from(["teamtree", "--pan", "-20,4", "--zoomIn", "2", "-w", "400"])
            .expect("args");
        assert_eq!(args.pan, Some((-20.0, 4.0)));
        assert_eq!(args.zoom_in, 2);
        assert_eq!(args.width, Some(400.0));
    }

    #[test]
    fn view_commands_move_the_viewport() {
        let scene = Scene::compose(
            TreeNode::new("me", "Me"),
            None,
            ViewportSize::new(400.0, 520.0),
            &Config::default(),
        );
        let mut viewport = scene.viewport();
        let start = viewport.transform();
        let args = Args::try_parse_from(["teamtree", "--zoomIn", "1", "--pan", "10,-5"]).expect("args");
        apply_view_commands(&mut viewport, &args);
        let t = viewport.transform();
        assert!((t.scale - 1.2).abs() < 1e-5);
        assert_eq!(t.translate_x, start.translate_x + 10.0);
        assert_eq!(t.translate_y, start.translate_y - 5.0);
        assert!(!viewport.is_interacting());
    }
}
