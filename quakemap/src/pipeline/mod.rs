//! Fetch → parse → filter pipeline.
//!
//! A run has exactly one suspension point, the feed fetch. Every run takes
//! a fresh cancellation token and cancels the token of the run before it,
//! so a newer request supersedes an older one instead of racing it. A
//! superseded run returns [`PipelineError::Superseded`] and renders nothing.
//!
//! ```text
//! QueryRequest ──► FeedProvider::fetch ──► FeedParser::parse ──► EventFilter::apply
//!                      (await)                                        │
//!                                                                     ▼
//!                                    PipelineOutcome::{Events(QuakeBatch), Empty}
//! ```
//!
//! Each run returns a new [`QuakeBatch`] owned by the caller; nothing is
//! cached between runs.

mod presenter;

pub use presenter::{LoadingGuard, MarkerSelectedCallback, PresentationAdapter};

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::filter::EventFilter;
use crate::parser::{FeedParser, ParseError, ParserConfig};
use crate::provider::{
    AsyncHttpClient, AsyncReqwestClient, FeedProvider, ProviderError, TimeWindow,
    DEFAULT_TIMEOUT_SECS, USGS_FEED_ENDPOINT,
};
use crate::record::EventRecord;

/// Errors that abort a pipeline run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    /// The feed could not be fetched.
    #[error("failed to fetch earthquake feed: {0}")]
    Fetch(#[from] ProviderError),

    /// The feed was fetched but is not a readable document.
    #[error("failed to decode earthquake feed: {0}")]
    Decode(#[from] ParseError),

    /// A newer request was started before this one finished.
    #[error("request superseded by a newer request")]
    Superseded,
}

impl PipelineError {
    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Fetch(e) => format!("Error retrieving earthquake data: {}", e),
            Self::Decode(e) => format!("Earthquake data could not be read: {}", e),
            Self::Superseded => "Request replaced by a newer one".to_string(),
        }
    }
}

/// Pipeline wiring configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Feed URL template containing `{window}`.
    pub endpoint: String,

    /// HTTP request timeout.
    pub timeout: Duration,

    /// Feed decoding options.
    pub parser: ParserConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            endpoint: USGS_FEED_ENDPOINT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            parser: ParserConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Set the feed endpoint template.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the HTTP timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the decoding options.
    pub fn with_parser(mut self, parser: ParserConfig) -> Self {
        self.parser = parser;
        self
    }
}

/// What the caller asks one run for.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct QueryRequest {
    pub window: TimeWindow,
    pub filter: EventFilter,
}

impl QueryRequest {
    pub fn new(window: TimeWindow) -> Self {
        Self {
            window,
            filter: EventFilter::all(),
        }
    }

    pub fn with_filter(mut self, filter: EventFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// Records produced by one successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct QuakeBatch {
    pub window: TimeWindow,
    pub fetched_at: DateTime<Utc>,
    /// Records decoded before filtering.
    pub total_parsed: usize,
    /// Records that passed the filter, in feed order.
    pub records: Vec<EventRecord>,
}

/// Terminal state of a run that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// At least one record passed the filter.
    Events(QuakeBatch),
    /// The feed was read but nothing passed the filter.
    Empty {
        window: TimeWindow,
        total_parsed: usize,
    },
}

impl PipelineOutcome {
    /// Filtered records, empty for [`PipelineOutcome::Empty`].
    pub fn records(&self) -> &[EventRecord] {
        match self {
            Self::Events(batch) => &batch.records,
            Self::Empty { .. } => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty { .. })
    }
}

/// Registration of the current in-flight run.
///
/// Clears itself from the pipeline on drop if no newer run replaced it.
struct InFlight<'a> {
    slot: &'a Mutex<Option<(u64, CancellationToken)>>,
    id: u64,
    token: CancellationToken,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut slot = self.slot.lock();
        if matches!(&*slot, Some((id, _)) if *id == self.id) {
            *slot = None;
        }
    }
}

/// Earthquake feed pipeline.
pub struct QuakePipeline<C: AsyncHttpClient> {
    provider: FeedProvider<C>,
    parser: FeedParser,
    next_id: AtomicU64,
    in_flight: Mutex<Option<(u64, CancellationToken)>>,
}

impl QuakePipeline<AsyncReqwestClient> {
    /// Builds a pipeline with a reqwest client from configuration.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, PipelineError> {
        let client = AsyncReqwestClient::with_timeout(config.timeout)?;
        Ok(Self::new(
            FeedProvider::new(client, config.endpoint.clone()),
            FeedParser::new(config.parser.clone()),
        ))
    }
}

impl<C: AsyncHttpClient> QuakePipeline<C> {
    pub fn new(provider: FeedProvider<C>, parser: FeedParser) -> Self {
        Self {
            provider,
            parser,
            next_id: AtomicU64::new(1),
            in_flight: Mutex::new(None),
        }
    }

    pub fn provider(&self) -> &FeedProvider<C> {
        &self.provider
    }

    pub fn parser(&self) -> &FeedParser {
        &self.parser
    }

    /// Returns true while a run is waiting on its fetch.
    pub fn is_busy(&self) -> bool {
        self.in_flight.lock().is_some()
    }

    /// Cancels the in-flight run, if any.
    pub fn cancel(&self) {
        if let Some((id, token)) = self.in_flight.lock().take() {
            debug!(request = id, "Cancelling in-flight request");
            token.cancel();
        }
    }

    /// Registers a new run, superseding the previous one.
    fn begin(&self) -> InFlight<'_> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();

        let previous = self.in_flight.lock().replace((id, token.clone()));
        if let Some((old_id, old_token)) = previous {
            debug!(request = id, superseded = old_id, "Superseding in-flight request");
            old_token.cancel();
        }

        InFlight {
            slot: &self.in_flight,
            id,
            token,
        }
    }

    /// Runs one fetch → parse → filter cycle.
    pub async fn run(&self, request: &QueryRequest) -> Result<PipelineOutcome, PipelineError> {
        let ticket = self.begin();
        let window = request.window;

        let fetched = tokio::select! {
            biased;
            _ = ticket.token.cancelled() => Err(PipelineError::Superseded),
            result = self.provider.fetch(window) => result.map_err(PipelineError::from),
        };
        let raw = match fetched {
            Ok(raw) => raw,
            Err(PipelineError::Superseded) => {
                warn!(request = ticket.id, %window, "Request superseded during fetch");
                return Err(PipelineError::Superseded);
            }
            Err(e) => {
                warn!(request = ticket.id, %window, error = %e, "Feed fetch failed");
                return Err(e);
            }
        };
        if ticket.token.is_cancelled() {
            return Err(PipelineError::Superseded);
        }
        let fetched_at = Utc::now();

        let records = self.parser.parse(&raw).inspect_err(|e| {
            warn!(request = ticket.id, %window, error = %e, "Feed decode failed");
        })?;
        let total_parsed = records.len();
        let records = request.filter.apply(records);

        info!(
            request = ticket.id,
            %window,
            parsed = total_parsed,
            matched = records.len(),
            "Earthquake feed processed"
        );

        if records.is_empty() {
            Ok(PipelineOutcome::Empty {
                window,
                total_parsed,
            })
        } else {
            Ok(PipelineOutcome::Events(QuakeBatch {
                window,
                fetched_at,
                total_parsed,
                records,
            }))
        }
    }

    /// Runs the pipeline and drives a presentation adapter with the outcome.
    ///
    /// The adapter shows a loading state for the duration of the run. On
    /// success the previous markers are replaced and the view fitted to the
    /// new batch. On an empty result or an error the previous markers stay
    /// as they were.
    pub async fn present<P>(
        &self,
        request: &QueryRequest,
        adapter: &mut P,
    ) -> Result<PipelineOutcome, PipelineError>
    where
        P: PresentationAdapter + ?Sized,
    {
        let mut view = LoadingGuard::new(adapter);
        let result = self.run(request).await;

        match &result {
            Ok(PipelineOutcome::Events(batch)) => {
                view.clear_markers();
                view.render_markers(&batch.records);
                view.fit_view_to_records(&batch.records);
            }
            Ok(PipelineOutcome::Empty { .. }) => view.show_no_results(),
            Err(PipelineError::Superseded) => {}
            Err(e) => view.show_error(&e.user_message()),
        }

        result
    }
}
