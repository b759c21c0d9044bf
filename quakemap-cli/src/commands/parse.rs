//! Parse command - decode a saved QuakeML file offline.

use std::path::{Path, PathBuf};

use quakemap::pipeline::LoadingGuard;
use quakemap::{EventFilter, EventRecord, FeedParser, ParserConfig, PresentationAdapter};
use tracing::info;

use super::common::{show_records, FilterArgs, OutputArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the parse command.
pub struct ParseArgs {
    pub file: PathBuf,
    pub filter: FilterArgs,
    pub output: OutputArgs,
}

/// Run the parse command.
pub fn run(runner: &CliRunner, args: ParseArgs) -> Result<(), CliError> {
    runner.log_startup("parse");
    let config = runner.config();
    let filter = args.filter.resolve(&config.filter)?;

    let mut view = args.output.view();
    {
        let mut view = LoadingGuard::new(&mut view);
        match load(&args.file, &config.parser, &filter) {
            Ok(records) => show_records(&mut *view, &records),
            Err(CliError::Pipeline(e)) => {
                view.show_error(&e.user_message());
                return Err(CliError::Reported);
            }
            Err(e) => return Err(e),
        }
    }
    args.output.finish(&mut view)
}

/// Reads, decodes and filters a feed document.
pub fn load(
    path: &Path,
    parser: &ParserConfig,
    filter: &EventFilter,
) -> Result<Vec<EventRecord>, CliError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = FeedParser::new(parser.clone())
        .parse(&raw)
        .map_err(|e| CliError::Pipeline(e.into()))?;
    let total = records.len();
    let records = filter.apply(records);
    info!(path = %path.display(), parsed = total, matched = records.len(), "Feed file processed");
    Ok(records)
}
