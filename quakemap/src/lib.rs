//! QuakeMap - earthquake feed ingestion and filtering
//!
//! This library fetches a QuakeML earthquake feed, decodes it into
//! [`EventRecord`]s, tags each record with a geographic [`Region`] and a
//! display radius, filters the result set, and hands it to a
//! [`PresentationAdapter`] such as a map widget.
//!
//! # Quick start
//!
//! ```ignore
//! use quakemap::{EventFilter, MagnitudeRange, PipelineConfig, QueryRequest, QuakePipeline, Region, TimeWindow};
//!
//! let pipeline = QuakePipeline::from_config(&PipelineConfig::default())?;
//! let filter = EventFilter::all()
//!     .with_magnitude(MagnitudeRange::new(5.0, 10.0)?)
//!     .with_region(Region::Asia);
//! let outcome = pipeline.run(&QueryRequest::new(TimeWindow::Week).with_filter(filter)).await?;
//! for record in outcome.records() {
//!     println!("{} M{}", record.place(), record.magnitude());
//! }
//! ```

pub mod config;
pub mod filter;
pub mod geo;
pub mod logging;
pub mod parser;
pub mod pipeline;
pub mod provider;
pub mod radius;
pub mod record;

pub use filter::{filter, EventFilter, FilterError, MagnitudeRange};
pub use geo::{classify, GeoBounds, Region, RegionFilter};
pub use parser::{parse, FeedParser, ParseError, ParserConfig};
pub use pipeline::{
    PipelineConfig, PipelineError, PipelineOutcome, PresentationAdapter, QuakeBatch, QuakePipeline,
    QueryRequest,
};
pub use provider::{ProviderError, TimeWindow};
pub use radius::{radius, RadiusFormula};
pub use record::{EventDetails, EventRecord};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
