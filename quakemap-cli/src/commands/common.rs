//! Common arguments and helpers shared across CLI commands.

use clap::Args;
use quakemap::config::FilterSettings;
use quakemap::{EventFilter, EventRecord, PresentationAdapter, RegionFilter};

use crate::error::CliError;
use crate::view::{print_details, OutputMode, TerminalView};

/// Filter flags. Unset flags fall back to the `[filter]` config section.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Minimum magnitude (inclusive)
    #[arg(long)]
    pub min: Option<f64>,

    /// Maximum magnitude (inclusive)
    #[arg(long)]
    pub max: Option<f64>,

    /// Ignore magnitude bounds from flags and config
    #[arg(long, conflicts_with_all = ["min", "max"])]
    pub no_magnitude_filter: bool,

    /// Region name, e.g. "Asia", "north-america" or "all"
    #[arg(long)]
    pub region: Option<RegionFilter>,
}

impl FilterArgs {
    /// Merges the flags over the configured defaults.
    pub fn resolve(&self, defaults: &FilterSettings) -> Result<EventFilter, CliError> {
        let mut settings = *defaults;
        if self.no_magnitude_filter {
            settings.min_magnitude = None;
            settings.max_magnitude = None;
        } else {
            settings.min_magnitude = self.min.or(settings.min_magnitude);
            settings.max_magnitude = self.max.or(settings.max_magnitude);
        }
        if let Some(region) = self.region {
            settings.region = region;
        }
        settings
            .to_filter()
            .map_err(|e| CliError::Config(format!("Invalid magnitude filter: {}", e)))
    }
}

/// Output flags.
#[derive(Debug, Clone, Default, Args)]
pub struct OutputArgs {
    /// Show the details of the N-th listed event
    #[arg(long, value_name = "N")]
    pub select: Option<usize>,

    /// Print records as JSON
    #[arg(long)]
    pub json: bool,
}

impl OutputArgs {
    pub fn mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else {
            OutputMode::Table
        }
    }

    /// Builds a view wired to print details of selected markers.
    pub fn view(&self) -> TerminalView {
        let mode = self.mode();
        let mut view = TerminalView::new(mode);
        view.on_marker_selected(Box::new(move |record: &EventRecord| {
            let details = record.details();
            match mode {
                OutputMode::Table => print_details(&details),
                OutputMode::Json => match serde_json::to_string_pretty(&details) {
                    Ok(json) => println!("{}", json),
                    Err(e) => eprintln!("Failed to encode JSON: {}", e),
                },
            }
        }));
        view
    }

    /// Prints JSON output and handles `--select` once markers are rendered.
    pub fn finish(&self, view: &mut TerminalView) -> Result<(), CliError> {
        if self.json && self.select.is_none() && !view.markers().is_empty() {
            println!("{}", serde_json::to_string_pretty(view.markers())?);
        }
        if let Some(index) = self.select {
            if !view.select(index) {
                return Err(CliError::Config(format!(
                    "No event #{} (showing {} events)",
                    index,
                    view.markers().len()
                )));
            }
        }
        Ok(())
    }
}

/// Drives the view with an already-filtered batch.
pub fn show_records<P: PresentationAdapter + ?Sized>(view: &mut P, records: &[EventRecord]) {
    if records.is_empty() {
        view.show_no_results();
    } else {
        view.clear_markers();
        view.render_markers(records);
        view.fit_view_to_records(records);
    }
}
