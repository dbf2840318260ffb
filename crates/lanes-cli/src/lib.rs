//! CLI logic for the Lanes timeline tool.
//!
//! Loads a scenario, validates its layout once and exports the visible
//! groups as SVG.

mod args;
mod config;
mod error;
mod export;
mod scenario;

pub use args::Args;
pub use error::CliError;
pub use scenario::Scenario;

use std::fs;

use log::{debug, info, trace};

use export::SvgExporter;

/// Run the Lanes CLI application
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `CliError` for:
/// - File I/O errors
/// - Configuration or scenario loading errors
/// - Layout errors
pub fn run(args: &Args) -> Result<(), CliError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing scenario"
    );

    let config = config::load_config(args.config.as_ref())?;
    let source = fs::read_to_string(&args.input)?;
    let graph = Scenario::parse(&source)?.into_graph(config)?;

    let groups = graph.groups()?;
    let summary = graph.logical_summary()?;
    info!(
        groups = groups.len(),
        visible = groups.iter().filter(|group| group.is_visible()).count(),
        pixel_height = graph.pixel_height()?,
        logical_low = summary.total_range().begin(),
        logical_high = summary.total_range().end();
        "Layout computed"
    );
    for group in &groups {
        trace!(
            group:% = group.key(),
            visible = group.is_visible(),
            bounds:? = group.bounds();
            "Group laid out"
        );
    }
    debug!(stats:? = graph.stats(); "Recompute statistics");

    let exporter = SvgExporter::new(&args.output);
    let doc = exporter.render(&graph)?;
    exporter.write_document(&doc)?;

    info!(output_file = args.output; "SVG exported successfully");

    Ok(())
}
