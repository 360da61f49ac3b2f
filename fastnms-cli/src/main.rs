use clap::Parser;
use fastnms::{
    bf16, f16, fast_non_max_suppression_with, BoxesView, Element, NmsParams, OrderStrategy,
    Selection,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "FastNMS CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum DTypeConfig {
    Float16,
    Bfloat16,
    #[default]
    Float32,
    Float64,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum OrderConfig {
    #[default]
    Auto,
    Sort,
    Heap,
}

impl From<OrderConfig> for OrderStrategy {
    fn from(value: OrderConfig) -> Self {
        match value {
            OrderConfig::Auto => OrderStrategy::Auto,
            OrderConfig::Sort => OrderStrategy::Sort,
            OrderConfig::Heap => OrderStrategy::Heap,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct NmsConfigJson {
    max_output_size: i32,
    iou_threshold: f64,
    score_threshold: Option<f64>,
    order: OrderConfig,
    parallel: bool,
}

impl Default for NmsConfigJson {
    fn default() -> Self {
        let params = NmsParams::default();
        Self {
            max_output_size: params.max_output_size,
            iou_threshold: params.iou_threshold,
            score_threshold: None,
            order: OrderConfig::Auto,
            parallel: params.parallel,
        }
    }
}

impl From<&NmsConfigJson> for NmsParams {
    fn from(value: &NmsConfigJson) -> Self {
        NmsParams {
            max_output_size: value.max_output_size,
            iou_threshold: value.iou_threshold,
            score_threshold: value.score_threshold.unwrap_or(f64::NEG_INFINITY),
            order: value.order.into(),
            parallel: value.parallel,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    dtype: DTypeConfig,
    boxes: Vec<[f64; 4]>,
    scores: Vec<Option<f64>>,
    nms: NmsConfigJson,
    output_path: Option<String>,
}

#[derive(Debug, Serialize)]
struct SelectedRecord {
    index: i32,
    score: f64,
    #[serde(rename = "box")]
    bbox: [f64; 4],
}

#[derive(Debug, Serialize)]
struct StatsRecord {
    admitted: usize,
    visited: usize,
    suppressed: usize,
    degenerate: usize,
}

#[derive(Debug, Serialize)]
struct Output {
    selected_indices: Vec<i32>,
    selected: Vec<SelectedRecord>,
    stats: StatsRecord,
}

/// Runs suppression in element type `T` and describes the selected rows.
fn run_typed<T: Element>(
    config: &Config,
    params: &NmsParams,
) -> Result<(Selection, Vec<SelectedRecord>), Box<dyn std::error::Error>> {
    let boxes: Vec<T> = config
        .boxes
        .iter()
        .flatten()
        .map(|&v| T::from_f64(v))
        .collect();
    let scores: Vec<T> = config
        .scores
        .iter()
        .map(|s| T::from_f64(s.unwrap_or(f64::NAN)))
        .collect();
    let view = BoxesView::from_slice(&boxes, config.boxes.len())?;
    let selection = fast_non_max_suppression_with(view, &scores, params, None)?;
    let selected = selected_records(&selection.indices, &boxes, &scores);
    Ok((selection, selected))
}

/// Reports boxes and scores as the kernel saw them, after conversion to `T`.
fn selected_records<T: Element>(indices: &[i32], boxes: &[T], scores: &[T]) -> Vec<SelectedRecord> {
    indices
        .iter()
        .filter_map(|&index| {
            let i = usize::try_from(index).ok()?;
            let row = boxes.get(4 * i..4 * i + 4)?;
            Some(SelectedRecord {
                index,
                score: scores.get(i)?.to_f64(),
                bbox: [row[0].to_f64(), row[1].to_f64(), row[2].to_f64(), row[3].to_f64()],
            })
        })
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("fastnms=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.boxes.len() != config.scores.len() {
        return Err(format!(
            "boxes has {} rows but scores has {} entries",
            config.boxes.len(),
            config.scores.len()
        )
        .into());
    }

    let params = NmsParams::from(&config.nms);
    params.validate()?;
    tracing::info!(
        dtype = ?config.dtype,
        boxes = config.boxes.len(),
        max_output_size = params.max_output_size,
        "running suppression"
    );
    let (selection, selected) = match config.dtype {
        DTypeConfig::Float16 => run_typed::<f16>(&config, &params)?,
        DTypeConfig::Bfloat16 => run_typed::<bf16>(&config, &params)?,
        DTypeConfig::Float32 => run_typed::<f32>(&config, &params)?,
        DTypeConfig::Float64 => run_typed::<f64>(&config, &params)?,
    };

    let stats = selection.stats;
    tracing::info!(selected = selection.indices.len(), suppressed = stats.suppressed, "done");
    let output = Output {
        selected_indices: selection.indices,
        selected,
        stats: StatsRecord {
            admitted: stats.admitted,
            visited: stats.visited,
            suppressed: stats.suppressed,
            degenerate: stats.degenerate,
        },
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
