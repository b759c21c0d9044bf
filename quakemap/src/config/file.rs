//! INI-backed configuration file.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ini::{Ini, Properties};
use tracing::debug;

use super::{config_file_path, ConfigError};
use crate::filter::{EventFilter, MagnitudeRange};
use crate::geo::RegionFilter;
use crate::logging::LoggingConfig;
use crate::parser::ParserConfig;
use crate::pipeline::PipelineConfig;
use crate::provider::{TimeWindow, DEFAULT_TIMEOUT_SECS, USGS_FEED_ENDPOINT};
use crate::radius::RadiusFormula;

const SECTION_FEED: &str = "feed";
const SECTION_PARSER: &str = "parser";
const SECTION_FILTER: &str = "filter";
const SECTION_LOGGING: &str = "logging";

/// `[feed]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSettings {
    /// URL template containing `{window}`.
    pub endpoint: String,
    pub timeout_secs: u64,
    pub default_window: TimeWindow,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            endpoint: USGS_FEED_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            default_window: TimeWindow::default(),
        }
    }
}

/// `[filter]` section. Unset magnitude bounds are open.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FilterSettings {
    pub min_magnitude: Option<f64>,
    pub max_magnitude: Option<f64>,
    pub region: RegionFilter,
}

impl FilterSettings {
    /// Builds the filter described by these settings.
    ///
    /// With neither bound set the magnitude predicate is disabled. A single
    /// bound leaves the other side open.
    pub fn to_filter(&self) -> Result<EventFilter, ConfigError> {
        let filter = EventFilter::all().with_region(self.region);
        if self.min_magnitude.is_none() && self.max_magnitude.is_none() {
            return Ok(filter);
        }

        let min = self.min_magnitude.unwrap_or(f64::MIN);
        let max = self.max_magnitude.unwrap_or(f64::MAX);
        let range = MagnitudeRange::new(min, max).map_err(|e| ConfigError::InvalidValue {
            key: format!("{}.min_magnitude", SECTION_FILTER),
            value: format!("{}..{}", min, max),
            reason: e.to_string(),
        })?;
        Ok(filter.with_magnitude(range))
    }
}

/// Whole configuration file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigFile {
    pub feed: FeedSettings,
    pub parser: ParserConfig,
    pub filter: FilterSettings,
    pub logging: LoggingConfig,
}

impl ConfigFile {
    /// Loads the file at the default location. A missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_file_path();
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Loads the file at `path`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        debug!(path = %path.display(), "Loaded config file");
        Self::from_ini(&ini)
    }

    /// Parses INI text.
    pub fn from_ini_str(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(feed) = ini.section(Some(SECTION_FEED)) {
            if let Some(endpoint) = non_empty(feed, "endpoint") {
                config.feed.endpoint = endpoint.to_string();
            }
            if let Some(secs) = parse_value::<u64>(feed, SECTION_FEED, "timeout_secs")? {
                config.feed.timeout_secs = secs;
            }
            if let Some(window) = parse_value::<TimeWindow>(feed, SECTION_FEED, "default_window")? {
                config.feed.default_window = window;
            }
        }

        if let Some(parser) = ini.section(Some(SECTION_PARSER)) {
            if let Some(convert) = parse_bool(parser, SECTION_PARSER, "convert_depth_to_km")? {
                config.parser.convert_depth_to_km = convert;
            }
            if let Some(formula) =
                parse_value::<RadiusFormula>(parser, SECTION_PARSER, "radius_formula")?
            {
                config.parser.radius_formula = formula;
            }
            if let Some(strict) = parse_bool(parser, SECTION_PARSER, "strict_magnitude")? {
                config.parser.strict_magnitude = strict;
            }
            // Present but empty means local-name matching.
            if let Some(namespace) = parser.get("namespace") {
                let namespace = namespace.trim();
                config.parser.namespace = if namespace.is_empty() {
                    None
                } else {
                    Some(namespace.to_string())
                };
            }
        }

        if let Some(filter) = ini.section(Some(SECTION_FILTER)) {
            config.filter.min_magnitude =
                parse_value::<f64>(filter, SECTION_FILTER, "min_magnitude")?;
            config.filter.max_magnitude =
                parse_value::<f64>(filter, SECTION_FILTER, "max_magnitude")?;
            if let Some(region) = parse_value::<RegionFilter>(filter, SECTION_FILTER, "region")? {
                config.filter.region = region;
            }
            // Reject inverted bounds at load time.
            config.filter.to_filter()?;
        }

        if let Some(logging) = ini.section(Some(SECTION_LOGGING)) {
            if let Some(level) = non_empty(logging, "level") {
                config.logging.level = level.to_string();
            }
            config.logging.directory = non_empty(logging, "directory").map(PathBuf::from);
        }

        Ok(config)
    }

    /// Renders the configuration as INI.
    pub fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();

        ini.with_section(Some(SECTION_FEED))
            .set("endpoint", self.feed.endpoint.as_str())
            .set("timeout_secs", self.feed.timeout_secs.to_string())
            .set("default_window", self.feed.default_window.token());

        ini.with_section(Some(SECTION_PARSER))
            .set(
                "convert_depth_to_km",
                self.parser.convert_depth_to_km.to_string(),
            )
            .set("radius_formula", self.parser.radius_formula.as_str())
            .set("strict_magnitude", self.parser.strict_magnitude.to_string())
            .set(
                "namespace",
                self.parser.namespace.as_deref().unwrap_or_default(),
            );

        ini.with_section(Some(SECTION_FILTER))
            .set("min_magnitude", optional_number(self.filter.min_magnitude))
            .set("max_magnitude", optional_number(self.filter.max_magnitude))
            .set("region", self.filter.region.to_string());

        ini.with_section(Some(SECTION_LOGGING))
            .set("level", self.logging.level.as_str())
            .set(
                "directory",
                self.logging
                    .directory
                    .as_ref()
                    .map(|d| d.display().to_string())
                    .unwrap_or_default(),
            );

        ini
    }

    /// Writes the file at the default location.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = config_file_path();
        self.save_to(&path)?;
        Ok(path)
    }

    /// Writes the file at `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        self.to_ini().write_to_file(path).map_err(write_err)?;
        debug!(path = %path.display(), "Saved config file");
        Ok(())
    }

    /// Pipeline wiring derived from the `[feed]` and `[parser]` sections.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::default()
            .with_endpoint(self.feed.endpoint.clone())
            .with_timeout(Duration::from_secs(self.feed.timeout_secs))
            .with_parser(self.parser.clone())
    }

    /// Default filter from the `[filter]` section.
    pub fn default_filter(&self) -> Result<EventFilter, ConfigError> {
        self.filter.to_filter()
    }

    /// Flattened `section.key = value` pairs in file order.
    pub fn entries(&self) -> Vec<(String, String)> {
        let ini = self.to_ini();
        ini.iter()
            .filter_map(|(section, props)| section.map(|s| (s, props)))
            .flat_map(|(section, props)| {
                props
                    .iter()
                    .map(move |(key, value)| (format!("{}.{}", section, key), value.to_string()))
            })
            .collect()
    }
}

/// Returns the trimmed value of `key` unless it is missing or blank.
fn non_empty<'a>(props: &'a Properties, key: &str) -> Option<&'a str> {
    props.get(key).map(str::trim).filter(|v| !v.is_empty())
}

fn parse_value<T>(props: &Properties, section: &str, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty(props, key) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                key: format!("{}.{}", section, key),
                value: raw.to_string(),
                reason: e.to_string(),
            }),
    }
}

fn parse_bool(props: &Properties, section: &str, key: &str) -> Result<Option<bool>, ConfigError> {
    match non_empty(props, key) {
        None => Ok(None),
        Some(raw) => match raw.to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(Some(true)),
            "false" | "no" | "off" | "0" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidValue {
                key: format!("{}.{}", section, key),
                value: raw.to_string(),
                reason: "expected true or false".to_string(),
            }),
        },
    }
}

fn optional_number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
