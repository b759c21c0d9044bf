//! Integration tests for the earthquake pipeline.
//!
//! These tests drive the public API end to end:
//! - scripted HTTP responses → parser → filter → presentation adapter
//! - supersession of an in-flight request by a newer one
//! - error and empty states leaving earlier markers on screen
//!
//! Run with: `cargo test --test pipeline_integration`

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use quakemap::pipeline::MarkerSelectedCallback;
use quakemap::provider::{AsyncHttpClient, FeedProvider};
use quakemap::{
    EventFilter, EventRecord, FeedParser, GeoBounds, MagnitudeRange, ParserConfig, PipelineError,
    PipelineOutcome, PresentationAdapter, ProviderError, QuakePipeline, QueryRequest,
    RadiusFormula, Region, TimeWindow,
};

// ============================================================================
// Helper Types
// ============================================================================

const ENDPOINT: &str = "http://feed.test/all_{window}.quakeml";

/// HTTP client answering from a per-URL script, with an optional delay.
#[derive(Default)]
struct ScriptedClient {
    responses: Mutex<HashMap<String, Result<Vec<u8>, ProviderError>>>,
    delays: Mutex<HashMap<String, Duration>>,
    calls: AtomicUsize,
}

impl ScriptedClient {
    fn respond(self, window: TimeWindow, body: impl Into<Vec<u8>>) -> Self {
        self.responses
            .lock()
            .insert(url_for(window), Ok(body.into()));
        self
    }

    fn fail(self, window: TimeWindow, error: ProviderError) -> Self {
        self.responses.lock().insert(url_for(window), Err(error));
        self
    }

    fn delay(self, window: TimeWindow, delay: Duration) -> Self {
        self.delays.lock().insert(url_for(window), delay);
        self
    }
}

impl AsyncHttpClient for ScriptedClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.delays.lock().get(url).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let response = self.responses.lock().get(url).cloned();
        response.unwrap_or_else(|| {
            Err(ProviderError::Status {
                status: 404,
                url: url.to_string(),
            })
        })
    }
}

/// Adapter that keeps what a map widget would show.
#[derive(Default)]
struct MapView {
    markers: Vec<EventRecord>,
    extent: Option<GeoBounds>,
    messages: Vec<String>,
    loading_depth: i32,
    max_loading_depth: i32,
    on_select: Option<MarkerSelectedCallback>,
}

impl MapView {
    fn select(&mut self, index: usize) {
        let record = self.markers[index].clone();
        if let Some(callback) = self.on_select.as_mut() {
            callback(&record);
        }
    }
}

impl PresentationAdapter for MapView {
    fn render_markers(&mut self, records: &[EventRecord]) {
        self.markers.extend_from_slice(records);
    }

    fn clear_markers(&mut self) {
        self.markers.clear();
    }

    fn fit_view_to_records(&mut self, records: &[EventRecord]) {
        self.extent = GeoBounds::from_records(records);
    }

    fn on_marker_selected(&mut self, callback: MarkerSelectedCallback) {
        self.on_select = Some(callback);
    }

    fn show_error(&mut self, message: &str) {
        self.messages.push(format!("error: {}", message));
    }

    fn show_no_results(&mut self) {
        self.messages.push("no results".to_string());
    }

    fn show_loading(&mut self) {
        self.loading_depth += 1;
        self.max_loading_depth = self.max_loading_depth.max(self.loading_depth);
    }

    fn hide_loading(&mut self) {
        self.loading_depth -= 1;
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn url_for(window: TimeWindow) -> String {
    ENDPOINT.replace("{window}", window.token())
}

fn event(lat: f64, lon: f64, mag: f64, place: &str) -> String {
    format!(
        r#"<event publicID="quakeml:us.test/{place}">
      <description><text>{place}</text></description>
      <origin>
        <time><value>2024-05-02T08:15:00Z</value></time>
        <latitude><value>{lat}</value></latitude>
        <longitude><value>{lon}</value></longitude>
        <depth><value>35000</value></depth>
      </origin>
      <magnitude><mag><value>{mag}</value></mag></magnitude>
    </event>"#
    )
}

fn feed(events: &[String]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<q:quakeml xmlns:q="http://quakeml.org/xmlns/quakeml/1.2" xmlns="http://quakeml.org/xmlns/bed/1.2">
  <eventParameters publicID="quakeml:us.test/feed">
    {}
  </eventParameters>
</q:quakeml>"#,
        events.concat()
    )
}

/// A week of activity spread over several regions.
fn weekly_feed() -> String {
    feed(&[
        event(10.0, 30.0, 6.5, "Sudan"),
        event(35.7, 139.7, 5.4, "Tokyo"),
        event(-33.4, -70.6, 5.8, "Santiago"),
        event(61.2, -149.9, 3.1, "Anchorage"),
        event(-6.2, 35.7, 5.0, "Dodoma"),
    ])
}

fn pipeline(client: ScriptedClient) -> QuakePipeline<ScriptedClient> {
    QuakePipeline::new(
        FeedProvider::new(client, ENDPOINT),
        FeedParser::new(ParserConfig::default()),
    )
}

fn places(records: &[EventRecord]) -> Vec<&str> {
    records.iter().map(|r| r.place()).collect()
}

// ============================================================================
// Integration Tests
// ============================================================================

/// Fetch, filter on magnitude and region, and render the survivors.
#[tokio::test]
async fn test_filtered_week_renders_african_events() {
    let pipeline = pipeline(ScriptedClient::default().respond(TimeWindow::Week, weekly_feed()));
    let filter = EventFilter::all()
        .with_magnitude(MagnitudeRange::new(5.0, 6.0).unwrap())
        .with_region(Region::Africa);
    let request = QueryRequest::new(TimeWindow::Week).with_filter(filter);
    let mut view = MapView::default();

    let outcome = pipeline.present(&request, &mut view).await.unwrap();

    assert_eq!(places(outcome.records()), vec!["Dodoma"]);
    assert_eq!(places(&view.markers), vec!["Dodoma"]);
    let extent = view.extent.unwrap();
    assert_eq!(extent.center(), (-6.2, 35.7));
    assert_eq!(view.loading_depth, 0);
    assert!(view.messages.is_empty());
}

/// The disabled magnitude filter with region All is the identity.
#[tokio::test]
async fn test_pass_through_filter_keeps_every_event_in_order() {
    let pipeline = pipeline(ScriptedClient::default().respond(TimeWindow::Week, weekly_feed()));
    let request = QueryRequest::new(TimeWindow::Week);

    let outcome = pipeline.run(&request).await.unwrap();

    match &outcome {
        PipelineOutcome::Events(batch) => {
            assert_eq!(batch.total_parsed, 5);
            assert_eq!(batch.window, TimeWindow::Week);
        }
        other => panic!("expected events, got {other:?}"),
    }
    assert_eq!(
        places(outcome.records()),
        vec!["Sudan", "Tokyo", "Santiago", "Anchorage", "Dodoma"]
    );
    let regions: Vec<Region> = outcome.records().iter().map(|r| r.region()).collect();
    assert_eq!(
        regions,
        vec![
            Region::Africa,
            Region::Asia,
            Region::SouthAmerica,
            Region::NorthAmerica,
            Region::Africa
        ]
    );
}

/// Records carry the converted depth and the derived radius.
#[tokio::test]
async fn test_records_carry_derived_fields() {
    let pipeline = pipeline(ScriptedClient::default().respond(TimeWindow::Day, weekly_feed()));
    let outcome = pipeline.run(&QueryRequest::new(TimeWindow::Day)).await.unwrap();

    let sudan = &outcome.records()[0];
    assert_eq!(sudan.depth_km(), Some(35.0));
    assert!((sudan.display_radius_km() - 108.333_333).abs() < 1e-3);
    assert_eq!(sudan.details().region, "Africa");
    assert_eq!(sudan.details().time, "2024-05-02 08:15:00 UTC");
}

/// The stepped formula is selectable through the parser configuration.
#[tokio::test]
async fn test_stepped_formula_applies_to_whole_batch() {
    let client = ScriptedClient::default().respond(TimeWindow::Day, weekly_feed());
    let pipeline = QuakePipeline::new(
        FeedProvider::new(client, ENDPOINT),
        FeedParser::new(ParserConfig::default().with_radius_formula(RadiusFormula::Stepped)),
    );

    let outcome = pipeline.run(&QueryRequest::new(TimeWindow::Day)).await.unwrap();
    let radii: Vec<f64> = outcome
        .records()
        .iter()
        .map(|r| r.display_radius_km())
        .collect();

    assert_eq!(radii[0], RadiusFormula::Stepped.radius_km(6.5));
    assert_eq!(radii[3], RadiusFormula::Stepped.radius_km(3.1));
}

/// An empty result shows "no results" and keeps the previous markers.
#[tokio::test]
async fn test_empty_result_keeps_previous_markers() {
    let pipeline = pipeline(ScriptedClient::default().respond(TimeWindow::Week, weekly_feed()));
    let mut view = MapView::default();

    pipeline
        .present(&QueryRequest::new(TimeWindow::Week), &mut view)
        .await
        .unwrap();
    assert_eq!(view.markers.len(), 5);

    let impossible = EventFilter::all().with_magnitude(MagnitudeRange::new(9.5, 10.0).unwrap());
    let outcome = pipeline
        .present(
            &QueryRequest::new(TimeWindow::Week).with_filter(impossible),
            &mut view,
        )
        .await
        .unwrap();

    assert!(outcome.is_empty());
    assert_eq!(view.markers.len(), 5);
    assert_eq!(view.messages, vec!["no results"]);
}

/// A failed fetch reports an error and leaves the map untouched.
#[tokio::test]
async fn test_fetch_failure_shows_error() {
    let client = ScriptedClient::default()
        .respond(TimeWindow::Week, weekly_feed())
        .fail(TimeWindow::Hour, ProviderError::HttpError("connection reset".into()));
    let pipeline = pipeline(client);
    let mut view = MapView::default();

    pipeline
        .present(&QueryRequest::new(TimeWindow::Week), &mut view)
        .await
        .unwrap();
    let err = pipeline
        .present(&QueryRequest::new(TimeWindow::Hour), &mut view)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Fetch(_)));
    assert_eq!(view.markers.len(), 5);
    assert_eq!(view.messages.len(), 1);
    assert!(view.messages[0].starts_with("error: "));
    assert_eq!(view.loading_depth, 0);
}

/// Unconfigured URLs surface as HTTP status errors.
#[tokio::test]
async fn test_missing_feed_is_status_error() {
    let pipeline = pipeline(ScriptedClient::default());
    let err = pipeline
        .run(&QueryRequest::new(TimeWindow::Month))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        PipelineError::Fetch(ProviderError::Status {
            status: 404,
            url: "http://feed.test/all_month.quakeml".to_string(),
        })
    );
}

/// A truncated document is a decode error, not a partial batch.
#[tokio::test]
async fn test_malformed_document_shows_error() {
    let truncated = "<q:quakeml xmlns:q=\"http://quakeml.org/xmlns/quakeml/1.2\"><event>";
    let pipeline = pipeline(ScriptedClient::default().respond(TimeWindow::Day, truncated));
    let mut view = MapView::default();

    let err = pipeline
        .present(&QueryRequest::new(TimeWindow::Day), &mut view)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Decode(_)));
    assert!(view.markers.is_empty());
    assert_eq!(view.messages.len(), 1);
}

/// A newer request supersedes a slow one; only the newer one renders.
#[tokio::test]
async fn test_newer_request_supersedes_slow_one() {
    let client = ScriptedClient::default()
        .respond(TimeWindow::Month, feed(&[event(48.8, 2.3, 4.2, "Paris")]))
        .delay(TimeWindow::Month, Duration::from_millis(500))
        .respond(TimeWindow::Hour, feed(&[event(-41.3, 174.8, 4.9, "Wellington")]));
    let pipeline = Arc::new(pipeline(client));
    let view = Arc::new(tokio::sync::Mutex::new(MapView::default()));

    let slow = {
        let pipeline = Arc::clone(&pipeline);
        let view = Arc::clone(&view);
        tokio::spawn(async move {
            let mut view = view.lock().await;
            pipeline
                .present(&QueryRequest::new(TimeWindow::Month), &mut *view)
                .await
        })
    };

    // Let the slow request reach its fetch.
    for _ in 0..50 {
        if pipeline.is_busy() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(pipeline.is_busy());

    let fast = pipeline.run(&QueryRequest::new(TimeWindow::Hour)).await.unwrap();
    assert_eq!(places(fast.records()), vec!["Wellington"]);

    let slow_result = slow.await.unwrap();
    assert_eq!(slow_result.unwrap_err(), PipelineError::Superseded);

    let view = view.lock().await;
    assert!(view.markers.is_empty());
    assert!(view.messages.is_empty());
    assert_eq!(view.loading_depth, 0);
    assert!(!pipeline.is_busy());
}

/// Marker selection reaches the registered handler with the record details.
#[tokio::test]
async fn test_marker_selection_reports_details() {
    let pipeline = pipeline(ScriptedClient::default().respond(TimeWindow::Week, weekly_feed()));
    let mut view = MapView::default();
    let selected = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&selected);
    view.on_marker_selected(Box::new(move |record: &EventRecord| {
        sink.lock().push(record.details());
    }));

    pipeline
        .present(&QueryRequest::new(TimeWindow::Week), &mut view)
        .await
        .unwrap();
    view.select(1);

    let selected = selected.lock();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].place, "Tokyo");
    assert_eq!(selected[0].magnitude, "5.40");
    assert_eq!(selected[0].region, "Asia");
}
