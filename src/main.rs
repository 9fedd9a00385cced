//! Caseline CLI.
//!
//! Consumes pre-computed segmentation output (JSON positioned elements),
//! writes the timeline exports and layout artifact, and optionally
//! renders one highlight annotation onto the case PDF.

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::Parser;
use tracing::{error, info};

use caseline::annotate::{page_dimensions, AnnotationRequest, PdfAnnotator};
use caseline::config::{DEFAULT_EVENT_WINDOW, LAYOUT_ARTIFACT_FILENAME};
use caseline::events::{export, DedupConfig};
use caseline::layout::{LayoutOptions, RowPlacement};
use caseline::segmentation::load_segmented_documents;
use caseline::{ProcessorConfig, RecordProcessor};

#[derive(Parser)]
#[command(
    name = "caseline",
    version,
    about = "Build a clinical event timeline from segmented medical records"
)]
struct Cli {
    /// Segmentation output to process (JSON array of segmented documents)
    #[arg(long)]
    elements: PathBuf,

    /// Original scanned case PDF (page width source; required to annotate)
    #[arg(long)]
    case_pdf: Option<PathBuf>,

    /// Directory for the timeline exports and layout artifact
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Context window for event descriptions, in characters
    #[arg(long, default_value_t = DEFAULT_EVENT_WINDOW)]
    max_event_length: usize,

    /// Row placement on the layout grid: per_element or scaled_y
    #[arg(long, default_value = "per_element")]
    row_placement: String,

    /// Drop events dated before this (YYYY-MM-DD)
    #[arg(long)]
    valid_from: Option<NaiveDate>,

    /// Drop events dated on or after this (YYYY-MM-DD)
    #[arg(long)]
    valid_until: Option<NaiveDate>,

    /// Caption for the highlight annotation (also names the output file)
    #[arg(long, requires_all = ["annotate_page", "annotate_coords", "case_pdf"])]
    query: Option<String>,

    /// 1-based page to annotate
    #[arg(long)]
    annotate_page: Option<usize>,

    /// Bounding box to highlight, as a serialized 4-point list
    #[arg(long)]
    annotate_coords: Option<String>,
}

fn main() -> ExitCode {
    caseline::init_tracing();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "caseline failed");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let row_placement = match cli.row_placement.as_str() {
        "per_element" => RowPlacement::PerElement,
        "scaled_y" => RowPlacement::ScaledY,
        other => return Err(format!("unknown row placement {other:?}").into()),
    };

    let documents = load_segmented_documents(&cli.elements)?;

    let target_page_width = match &cli.case_pdf {
        Some(pdf) => page_dimensions(pdf, 1)?.0,
        None => caseline::config::DEFAULT_PAGE_WIDTH_PTS,
    };

    let config = ProcessorConfig {
        max_event_length: cli.max_event_length,
        layout: LayoutOptions {
            target_page_width,
            row_placement,
            ..LayoutOptions::default()
        },
        dedup: DedupConfig {
            valid_from: cli.valid_from,
            valid_until: cli.valid_until,
        },
        layout_artifact: Some(cli.output_dir.join(LAYOUT_ARTIFACT_FILENAME)),
        ..ProcessorConfig::default()
    };

    let output = RecordProcessor::new(config).process(&documents)?;

    export::write_export(
        &cli.output_dir.join("timeline.csv"),
        &export::to_csv(&output.timeline),
    )?;
    export::write_export(
        &cli.output_dir.join("report.html"),
        &export::html_report(&output.timeline, cli.case_pdf.as_deref()),
    )?;

    println!("{}", serde_json::to_string_pretty(&output.summary)?);

    if let (Some(query), Some(page), Some(coords), Some(pdf)) = (
        &cli.query,
        cli.annotate_page,
        &cli.annotate_coords,
        &cli.case_pdf,
    ) {
        let request = AnnotationRequest {
            pdf_path: pdf,
            page,
            coordinates: coords,
            caption: query,
            output_dir: &cli.output_dir,
            identifier: query,
        };
        let source = caseline::segmentation::CoordinateSystem {
            width: output.layout.source_width,
            height: output.layout.source_height,
        };
        let written = PdfAnnotator::default().annotate(&request, source)?;
        info!(path = %written.display(), "annotation written");
    }

    Ok(())
}
