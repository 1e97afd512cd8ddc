use std::fs;
use std::path::PathBuf;

use chart_embed::api::{
    ElementConfig, PipelineConfig, SceneStyle, build_element_scene, resolve_chart_data,
};
use chart_embed::render::{RasterEncoding, RasterPipeline};
use chart_embed::telemetry::init_default_tracing;
use chart_embed::ChartSchema;

const DEFAULT_OUTPUT_PATH: &str = "chart.png";

#[derive(Debug)]
struct CliArgs {
    schema_path: PathBuf,
    output_path: PathBuf,
    config_path: Option<PathBuf>,
    jpeg: bool,
}

fn main() {
    let _ = init_default_tracing();
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = parse_args()?;

    let raw = fs::read_to_string(&args.schema_path).map_err(|err| {
        format!(
            "failed to read schema `{}`: {err}",
            args.schema_path.display()
        )
    })?;
    let schema = ChartSchema::from_json_compat_str(&raw)
        .map_err(|err| format!("failed to parse schema: {err}"))?;

    let mut config = match &args.config_path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .map_err(|err| format!("failed to read config `{}`: {err}", path.display()))?;
            PipelineConfig::from_json_compat_str(&raw)
                .map_err(|err| format!("failed to parse config: {err}"))?
        }
        None => PipelineConfig::default(),
    };
    if args.jpeg {
        config = config.with_encoding(RasterEncoding::jpeg());
    }

    let data = resolve_chart_data(schema.kind, &schema.data, None);
    if data.is_sample() {
        println!("note: `{}` has no usable data, rendering sample data", schema.name);
    }
    let scene = build_element_scene(
        &data,
        &ElementConfig::from_schema(&schema),
        schema.scene_size(),
        &SceneStyle::default(),
    )
    .map_err(|err| format!("scene build failed: {err}"))?;

    let pipeline = RasterPipeline::with_resvg(config.raster);
    let payload = pipeline
        .scene_to_raster_payload(&scene)
        .map_err(|err| format!("conversion failed: {err}"))?;
    let bytes = payload
        .decode_bytes()
        .map_err(|err| format!("payload decode failed: {err}"))?;

    fs::write(&args.output_path, &bytes).map_err(|err| {
        format!(
            "failed to write image `{}`: {err}",
            args.output_path.display()
        )
    })?;
    println!(
        "rendered {} ({}x{} px, {} bytes) -> {}",
        schema.name,
        payload.viewport.width,
        payload.viewport.height,
        bytes.len(),
        args.output_path.display()
    );
    Ok(())
}

fn parse_args() -> Result<CliArgs, String> {
    let mut schema_path: Option<PathBuf> = None;
    let mut output_path = PathBuf::from(DEFAULT_OUTPUT_PATH);
    let mut config_path: Option<PathBuf> = None;
    let mut jpeg = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--output" | "-o" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --output".to_owned())?;
                output_path = PathBuf::from(value);
            }
            "--config" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --config".to_owned())?;
                config_path = Some(PathBuf::from(value));
            }
            "--jpeg" => jpeg = true,
            "--help" | "-h" => {
                println!("{}", usage_message());
                std::process::exit(0);
            }
            other if !other.starts_with('-') && schema_path.is_none() => {
                schema_path = Some(PathBuf::from(other));
            }
            _ => {
                return Err(format!("unknown argument `{arg}`\n\n{}", usage_message()));
            }
        }
    }

    let schema_path =
        schema_path.ok_or_else(|| format!("missing schema path\n\n{}", usage_message()))?;
    Ok(CliArgs {
        schema_path,
        output_path,
        config_path,
        jpeg,
    })
}

fn usage_message() -> String {
    format!(
        "Usage: cargo run --bin render_schema_png -- <schema.json> [options]\n\nOptions:\n  -o, --output <path>   Output image path (default: {DEFAULT_OUTPUT_PATH})\n  --config <path>       Pipeline config json (bare or versioned)\n  --jpeg                Encode as JPEG instead of PNG\n  -h, --help            Show this message"
    )
}
