//! Terminal presentation adapter.
//!
//! Renders markers as a table on stdout, the view extent as a bounding box,
//! and errors on stderr. A spinner covers the loading state.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use quakemap::filter::region_counts;
use quakemap::pipeline::MarkerSelectedCallback;
use quakemap::{EventDetails, EventRecord, GeoBounds, PresentationAdapter};

/// Output format of the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Table,
    /// Records and details as JSON on stdout; status text suppressed.
    Json,
}

/// Terminal rendition of the map.
pub struct TerminalView {
    mode: OutputMode,
    markers: Vec<EventRecord>,
    extent: Option<GeoBounds>,
    spinner: Option<ProgressBar>,
    on_select: Option<MarkerSelectedCallback>,
}

impl TerminalView {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            markers: Vec::new(),
            extent: None,
            spinner: None,
            on_select: None,
        }
    }

    pub fn markers(&self) -> &[EventRecord] {
        &self.markers
    }

    /// Selects the marker at `index` (1-based, as printed).
    ///
    /// Returns false if there is no such marker.
    pub fn select(&mut self, index: usize) -> bool {
        let Some(record) = index.checked_sub(1).and_then(|i| self.markers.get(i)) else {
            return false;
        };
        if let Some(callback) = self.on_select.as_mut() {
            callback(record);
        }
        true
    }

    fn is_table(&self) -> bool {
        self.mode == OutputMode::Table
    }
}

impl PresentationAdapter for TerminalView {
    fn render_markers(&mut self, records: &[EventRecord]) {
        let first = self.markers.len() + 1;
        self.markers.extend_from_slice(records);
        if !self.is_table() {
            return;
        }

        println!(
            "{}",
            style(format!(
                "{:>4}  {:>5}  {:>9}  {:>10}  {:<17}  {}",
                "#", "Mag", "Radius", "Depth", "Region", "Place"
            ))
            .bold()
        );
        for (offset, record) in records.iter().enumerate() {
            println!("{}", marker_line(first + offset, record));
        }
    }

    fn clear_markers(&mut self) {
        self.markers.clear();
        self.extent = None;
    }

    fn fit_view_to_records(&mut self, records: &[EventRecord]) {
        self.extent = GeoBounds::from_records(records);
        if !self.is_table() {
            return;
        }

        if let Some(bounds) = self.extent {
            let (lat, lon) = bounds.center();
            println!();
            println!(
                "View: lat {:.2}..{:.2}, lon {:.2}..{:.2} (center {:.2}, {:.2})",
                bounds.south, bounds.north, bounds.west, bounds.east, lat, lon
            );
        }
        let summary: Vec<String> = region_counts(records)
            .into_iter()
            .map(|(region, count)| format!("{} {}", region, count))
            .collect();
        if !summary.is_empty() {
            println!("By region: {}", summary.join(", "));
        }
    }

    fn on_marker_selected(&mut self, callback: MarkerSelectedCallback) {
        self.on_select = Some(callback);
    }

    fn show_error(&mut self, message: &str) {
        eprintln!("{} {}", style("Error:").red().bold(), message);
    }

    fn show_no_results(&mut self) {
        if self.is_table() {
            println!("{}", style("No earthquakes match the current filters.").yellow());
        } else {
            println!("[]");
        }
    }

    fn show_loading(&mut self) {
        if !console::Term::stderr().is_term() {
            return;
        }
        let spinner = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(spinner_style);
        }
        spinner.set_message("Loading earthquake data...");
        spinner.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(spinner);
    }

    fn hide_loading(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}

/// One table row for a marker.
pub fn marker_line(index: usize, record: &EventRecord) -> String {
    let details = record.details();
    let magnitude = match record.magnitude() {
        m if m >= 6.0 => style(details.magnitude).red().bold(),
        m if m >= 4.5 => style(details.magnitude).yellow(),
        _ => style(details.magnitude),
    };
    format!(
        "{:>4}  {:>5}  {:>9}  {:>10}  {:<17}  {}",
        index, magnitude, details.radius, details.depth, details.region, details.place
    )
}

/// Prints the details panel of a selected event.
pub fn print_details(details: &EventDetails) {
    println!();
    println!("{}", style(&details.place).bold().underlined());
    for (label, value) in details.rows().into_iter().skip(1) {
        println!("  {:<10} {}", format!("{}:", label), value);
    }
}
