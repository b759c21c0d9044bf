//! Fetch command - download a feed window and show the filtered events.

use std::sync::Arc;

use quakemap::provider::{AsyncHttpClient, TimeWindow};
use quakemap::{PipelineError, QuakePipeline, QueryRequest};
use tracing::{debug, warn};

use super::common::{FilterArgs, OutputArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the fetch command.
pub struct FetchArgs {
    pub window: Option<TimeWindow>,
    pub filter: FilterArgs,
    pub output: OutputArgs,
}

/// Run the fetch command.
pub async fn run(runner: &CliRunner, args: FetchArgs) -> Result<(), CliError> {
    runner.log_startup("fetch");
    let config = runner.config();

    let window = args.window.unwrap_or(config.feed.default_window);
    let filter = args.filter.resolve(&config.filter)?;
    let request = QueryRequest::new(window).with_filter(filter);

    let pipeline = Arc::new(QuakePipeline::from_config(&config.pipeline_config())?);
    cancel_on_interrupt(&pipeline);

    let mut view = args.output.view();
    match pipeline.present(&request, &mut view).await {
        Ok(_) => args.output.finish(&mut view),
        Err(PipelineError::Superseded) => {
            eprintln!("Cancelled.");
            Err(CliError::Reported)
        }
        // Already shown by the view
        Err(_) => Err(CliError::Reported),
    }
}

/// Cancels the in-flight request on Ctrl-C.
fn cancel_on_interrupt<C>(pipeline: &Arc<QuakePipeline<C>>)
where
    C: AsyncHttpClient + 'static,
{
    let pipeline = Arc::clone(pipeline);
    let installed = ctrlc::set_handler(move || {
        debug!("Interrupt received");
        pipeline.cancel();
    });
    if let Err(e) = installed {
        warn!(error = %e, "Could not install Ctrl-C handler");
    }
}
