//! QuakeML feed decoding.
//!
//! Turns the text of a QuakeML document into [`EventRecord`]s. Each `event`
//! block is decoded independently:
//!
//! - `origin` → `latitude/value`, `longitude/value` (required),
//!   `depth/value`, `time/value` (optional)
//! - `magnitude` → `mag/value` (required)
//! - `description` → `text` (required)
//!
//! An event missing any required piece, or with a non-numeric coordinate,
//! is skipped as a whole and logged at debug level. Sibling events are
//! unaffected. Output preserves document order.
//!
//! # Example
//!
//! ```ignore
//! use quakemap::parser::{FeedParser, ParserConfig};
//!
//! let parser = FeedParser::new(ParserConfig::default().with_strict_magnitude(false));
//! let records = parser.parse(&body)?;
//! ```

mod element;

use std::fmt;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use thiserror::Error;
use tracing::debug;

use crate::radius::RadiusFormula;
use crate::record::EventRecord;

use element::Element;

/// Namespace of QuakeML Basic Event Description elements.
pub const BED_NAMESPACE: &str = "http://quakeml.org/xmlns/bed/1.2";

/// Meters per kilometer, for depth conversion.
const METERS_PER_KM: f64 = 1000.0;

/// Errors that abort decoding of a whole document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The document is not well-formed XML.
    #[error("malformed feed document at byte {position}: {reason}")]
    Xml { position: u64, reason: String },
}

/// Decoding options.
#[derive(Debug, Clone, PartialEq)]
pub struct ParserConfig {
    /// Namespace event elements must belong to. `None` matches on local
    /// names only.
    pub namespace: Option<String>,

    /// Divide depth values by 1000 (feed meters to kilometers).
    pub convert_depth_to_km: bool,

    /// Formula for the display radius attached to each record.
    pub radius_formula: RadiusFormula,

    /// Drop events whose magnitude value does not parse. When false such
    /// events are kept with a NaN magnitude and radius.
    pub strict_magnitude: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            namespace: Some(BED_NAMESPACE.to_string()),
            convert_depth_to_km: true,
            radius_formula: RadiusFormula::Linear,
            strict_magnitude: true,
        }
    }
}

impl ParserConfig {
    /// Set the namespace to match, or `None` for local-name matching.
    pub fn with_namespace(mut self, namespace: Option<String>) -> Self {
        self.namespace = namespace;
        self
    }

    /// Enable or disable meter to kilometer depth conversion.
    pub fn with_depth_conversion(mut self, convert: bool) -> Self {
        self.convert_depth_to_km = convert;
        self
    }

    /// Set the display radius formula.
    pub fn with_radius_formula(mut self, formula: RadiusFormula) -> Self {
        self.radius_formula = formula;
        self
    }

    /// Enable or disable dropping events with unparseable magnitudes.
    pub fn with_strict_magnitude(mut self, strict: bool) -> Self {
        self.strict_magnitude = strict;
        self
    }
}

/// Why an event block contributed no record.
#[derive(Debug, Clone, PartialEq)]
enum SkipReason {
    Missing(&'static str),
    Invalid { field: &'static str, text: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(field) => write!(f, "missing {}", field),
            Self::Invalid { field, text } => write!(f, "invalid {} '{}'", field, text),
        }
    }
}

/// Running state of a decode pass.
#[derive(Debug, Default)]
struct Decoded {
    records: Vec<EventRecord>,
    seen: usize,
    skipped: usize,
}

/// Decoder for QuakeML event feeds.
#[derive(Debug, Clone, Default)]
pub struct FeedParser {
    config: ParserConfig,
}

impl FeedParser {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Decodes every well-formed event block of `raw`.
    pub fn parse(&self, raw: &str) -> Result<Vec<EventRecord>, ParseError> {
        // Text nodes stay untrimmed; fields are trimmed after concatenation
        let mut reader = NsReader::from_str(raw);

        let mut batch = Decoded::default();
        // Open elements of the event currently being collected
        let mut open: Vec<Element> = Vec::new();
        let mut depth = 0usize;

        loop {
            let (in_namespace, event) = match reader.read_resolved_event() {
                Ok((ns, event)) => (self.in_namespace(&ns), event),
                Err(e) => {
                    return Err(ParseError::Xml {
                        position: reader.error_position(),
                        reason: e.to_string(),
                    })
                }
            };

            match event {
                Event::Start(start) => {
                    depth += 1;
                    if let Some(element) = open_element(&start, in_namespace, !open.is_empty()) {
                        open.push(element);
                    }
                }
                Event::Empty(start) => {
                    if let Some(element) = open_element(&start, in_namespace, !open.is_empty()) {
                        self.close_element(element, &mut open, &mut batch);
                    }
                }
                Event::End(_) => {
                    depth = depth.saturating_sub(1);
                    if let Some(element) = open.pop() {
                        self.close_element(element, &mut open, &mut batch);
                    }
                }
                Event::Text(text) => {
                    if let Some(current) = open.last_mut() {
                        let text = text.unescape().map_err(|e| ParseError::Xml {
                            position: reader.buffer_position(),
                            reason: e.to_string(),
                        })?;
                        current.push_text(text.into_owned());
                    }
                }
                Event::CData(data) => {
                    if let Some(current) = open.last_mut() {
                        let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                        current.push_text(text);
                    }
                }
                Event::Eof if depth > 0 => {
                    return Err(ParseError::Xml {
                        position: reader.buffer_position(),
                        reason: format!("document ended with {} unclosed element(s)", depth),
                    })
                }
                Event::Eof => break,
                _ => {}
            }
        }

        debug!(
            parsed = batch.records.len(),
            skipped = batch.skipped,
            "Decoded feed document"
        );
        Ok(batch.records)
    }

    /// Returns true if a resolved element name belongs to the feed namespace.
    fn in_namespace(&self, ns: &ResolveResult<'_>) -> bool {
        match (&self.config.namespace, ns) {
            (None, _) => true,
            (Some(expected), ResolveResult::Bound(bound)) => {
                bound.0 == expected.as_bytes()
            }
            (Some(_), _) => false,
        }
    }

    /// Attaches a finished element to its parent, or decodes it if it was
    /// the event root.
    fn close_element(
        &self,
        element: Element,
        open: &mut [Element],
        batch: &mut Decoded,
    ) {
        if let Some(parent) = open.last_mut() {
            parent.push_element(element);
            return;
        }

        match self.extract(&element) {
            Ok(record) => batch.records.push(record),
            Err(reason) => {
                batch.skipped += 1;
                debug!(index = batch.seen, reason = %reason, "Skipping malformed event");
            }
        }
        batch.seen += 1;
    }

    /// Decodes one event block.
    fn extract(&self, event: &Element) -> Result<EventRecord, SkipReason> {
        let origin = event.find("origin").ok_or(SkipReason::Missing("origin"))?;
        let magnitude = event
            .find("magnitude")
            .ok_or(SkipReason::Missing("magnitude"))?;
        let description = event
            .find("description")
            .ok_or(SkipReason::Missing("description"))?;

        let latitude = origin
            .find_path("latitude", "value")
            .ok_or(SkipReason::Missing("latitude"))?;
        let longitude = origin
            .find_path("longitude", "value")
            .ok_or(SkipReason::Missing("longitude"))?;
        let mag_value = magnitude
            .find_path("mag", "value")
            .ok_or(SkipReason::Missing("magnitude value"))?;
        let place = description
            .find("text")
            .ok_or(SkipReason::Missing("place"))?;

        let latitude = required_number("latitude", &latitude.text_content())?;
        let longitude = required_number("longitude", &longitude.text_content())?;
        let magnitude = match required_number("magnitude", &mag_value.text_content()) {
            Ok(m) => m,
            Err(reason) if self.config.strict_magnitude => return Err(reason),
            Err(_) => f64::NAN,
        };

        let depth_km = origin
            .find_path("depth", "value")
            .and_then(|d| parse_number(&d.text_content()))
            .map(|depth| {
                if self.config.convert_depth_to_km {
                    depth / METERS_PER_KM
                } else {
                    depth
                }
            });
        let occurred_at = origin
            .find_path("time", "value")
            .map(|t| t.text_content().trim().to_string())
            .filter(|t| !t.is_empty());

        Ok(EventRecord::new(
            latitude,
            longitude,
            magnitude,
            place.text_content().trim(),
            depth_km,
            occurred_at,
            self.config.radius_formula,
        ))
    }
}

/// Starts an element if it is inside an event or opens a new event.
fn open_element(
    start: &BytesStart<'_>,
    in_namespace: bool,
    inside_event: bool,
) -> Option<Element> {
    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let element = Element::new(name, in_namespace);

    if inside_event || element.is("event") {
        Some(element)
    } else {
        None
    }
}

/// Parses a finite floating-point number, ignoring surrounding whitespace.
fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn required_number(field: &'static str, text: &str) -> Result<f64, SkipReason> {
    parse_number(text).ok_or_else(|| SkipReason::Invalid {
        field,
        text: text.to_string(),
    })
}

/// Decodes `raw` with the default [`ParserConfig`].
pub fn parse(raw: &str) -> Result<Vec<EventRecord>, ParseError> {
    FeedParser::default().parse(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Region;

    fn document(events: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<q:quakeml xmlns:q="http://quakeml.org/xmlns/quakeml/1.2" xmlns="http://quakeml.org/xmlns/bed/1.2" xmlns:catalog="http://anss.org/xmlns/catalog/0.1">
  <eventParameters publicID="quakeml:earthquake.usgs.gov/feed">
    {}
  </eventParameters>
</q:quakeml>"#,
            events
        )
    }

    fn event_block(lat: &str, lon: &str, mag: &str, depth: Option<&str>, place: &str) -> String {
        let depth = depth
            .map(|d| format!("<depth><value>{}</value><uncertainty>300</uncertainty></depth>", d))
            .unwrap_or_default();
        format!(
            r#"<event catalog:eventid="x">
      <description><type>earthquake name</type><text>{place}</text></description>
      <origin>
        <time><value>2024-03-01T12:30:00.040Z</value></time>
        <longitude><value>{lon}</value></longitude>
        <latitude><value>{lat}</value></latitude>
        {depth}
      </origin>
      <magnitude><mag><value>{mag}</value></mag><type>md</type></magnitude>
    </event>"#
        )
    }

    #[test]
    fn test_single_event_scenario() {
        let doc = document(&event_block("10", "30", "6.5", Some("10000"), "Test"));
        let records = parse(&doc).unwrap();

        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.latitude(), 10.0);
        assert_eq!(r.longitude(), 30.0);
        assert_eq!(r.magnitude(), 6.5);
        assert_eq!(r.place(), "Test");
        assert_eq!(r.depth_km(), Some(10.0));
        assert_eq!(r.occurred_at(), Some("2024-03-01T12:30:00.040Z"));
        assert_eq!(r.region(), Region::Africa);
        assert!((r.display_radius_km() - 100.0 * 6.5 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_events_keep_document_order() {
        let events: String = (0..5)
            .map(|i| event_block(&format!("{}", i * 10), "0", "4.5", None, &format!("E{}", i)))
            .collect();
        let records = parse(&document(&events)).unwrap();

        let places: Vec<_> = records.iter().map(|r| r.place()).collect();
        assert_eq!(places, vec!["E0", "E1", "E2", "E3", "E4"]);
    }

    #[test]
    fn test_missing_magnitude_block_skips_only_that_event() {
        let broken = r#"<event>
      <description><text>No magnitude</text></description>
      <origin><latitude><value>1</value></latitude><longitude><value>2</value></longitude></origin>
    </event>"#;
        let events = format!(
            "{}{}{}",
            event_block("1", "1", "5.0", None, "before"),
            broken,
            event_block("2", "2", "5.0", None, "after")
        );
        let records = parse(&document(&events)).unwrap();

        let places: Vec<_> = records.iter().map(|r| r.place()).collect();
        assert_eq!(places, vec!["before", "after"]);
    }

    #[test]
    fn test_missing_description_skips_event() {
        let broken = r#"<event>
      <origin><latitude><value>1</value></latitude><longitude><value>2</value></longitude></origin>
      <magnitude><mag><value>3.0</value></mag></magnitude>
    </event>"#;
        assert!(parse(&document(broken)).unwrap().is_empty());
    }

    #[test]
    fn test_missing_latitude_value_skips_event() {
        let broken = r#"<event>
      <description><text>No lat</text></description>
      <origin><latitude><uncertainty>1</uncertainty></latitude><longitude><value>2</value></longitude></origin>
      <magnitude><mag><value>3.0</value></mag></magnitude>
    </event>"#;
        assert!(parse(&document(broken)).unwrap().is_empty());
    }

    #[test]
    fn test_non_numeric_longitude_skips_event() {
        let doc = document(&event_block("1", "east", "5.0", None, "bad"));
        assert!(parse(&doc).unwrap().is_empty());
    }

    #[test]
    fn test_optional_fields_absent() {
        let block = r#"<event>
      <description><text>  Bare  </text></description>
      <origin><latitude><value>50</value></latitude><longitude><value>10</value></longitude></origin>
      <magnitude><mag><value>2.1</value></mag></magnitude>
    </event>"#;
        let records = parse(&document(block)).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].place(), "Bare");
        assert_eq!(records[0].depth_km(), None);
        assert_eq!(records[0].occurred_at(), None);
        assert_eq!(records[0].region(), Region::Europe);
    }

    #[test]
    fn test_unparseable_depth_is_absent() {
        let doc = document(&event_block("1", "1", "5.0", Some("deep"), "x"));
        let records = parse(&doc).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].depth_km(), None);
    }

    #[test]
    fn test_depth_conversion_can_be_disabled() {
        let doc = document(&event_block("1", "1", "5.0", Some("12500"), "x"));
        let parser = FeedParser::new(ParserConfig::default().with_depth_conversion(false));
        let records = parser.parse(&doc).unwrap();
        assert_eq!(records[0].depth_km(), Some(12500.0));
    }

    #[test]
    fn test_strict_magnitude_drops_event() {
        let doc = document(&event_block("1", "1", "big", None, "x"));
        assert!(parse(&doc).unwrap().is_empty());
    }

    #[test]
    fn test_lenient_magnitude_keeps_event() {
        let doc = document(&event_block("1", "1", "big", None, "x"));
        let parser = FeedParser::new(ParserConfig::default().with_strict_magnitude(false));
        let records = parser.parse(&doc).unwrap();

        assert_eq!(records.len(), 1);
        assert!(records[0].magnitude().is_nan());
        assert!(records[0].display_radius_km().is_nan());
    }

    #[test]
    fn test_stepped_radius_formula() {
        let doc = document(&event_block("1", "1", "6.5", None, "x"));
        let parser = FeedParser::new(ParserConfig::default().with_radius_formula(RadiusFormula::Stepped));
        assert_eq!(parser.parse(&doc).unwrap()[0].display_radius_km(), 100.0);
    }

    #[test]
    fn test_foreign_namespace_events_ignored() {
        let doc = r#"<root xmlns:o="urn:other"><o:event>
      <o:description><o:text>x</o:text></o:description>
      <o:origin><o:latitude><o:value>1</o:value></o:latitude><o:longitude><o:value>1</o:value></o:longitude></o:origin>
      <o:magnitude><o:mag><o:value>5</o:value></o:mag></o:magnitude>
    </o:event></root>"#;
        assert!(parse(doc).unwrap().is_empty());

        let parser = FeedParser::new(ParserConfig::default().with_namespace(None));
        assert_eq!(parser.parse(doc).unwrap().len(), 1);
    }

    #[test]
    fn test_cdata_and_entities_in_place() {
        let block = r#"<event>
      <description><text><![CDATA[10 km N of Tōkai & co]]></text></description>
      <origin><latitude><value>35</value></latitude><longitude><value>137</value></longitude></origin>
      <magnitude><mag><value>4.0</value></mag></magnitude>
    </event>
    <event>
      <description><text>Ridge &amp; rift</text></description>
      <origin><latitude><value>0</value></latitude><longitude><value>-30</value></longitude></origin>
      <magnitude><mag><value>4.0</value></mag></magnitude>
    </event>"#;
        let records = parse(&document(block)).unwrap();
        assert_eq!(records[0].place(), "10 km N of Tōkai & co");
        assert_eq!(records[1].place(), "Ridge & rift");
    }

    #[test]
    fn test_empty_document_yields_no_records() {
        assert!(parse(&document("")).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        let result = parse("<q:quakeml><eventParameters></q:quakeml>");
        assert!(matches!(result, Err(ParseError::Xml { .. })));
    }

    #[test]
    fn test_place_with_inline_markup_keeps_spacing() {
        let event = r#"<event>
      <description><text>  10 km <i>N</i> of Town </text></description>
      <origin><latitude><value> 1 </value></latitude><longitude><value>2</value></longitude></origin>
      <magnitude><mag><value>4.0</value></mag></magnitude>
    </event>"#;
        let records = parse(&document(event)).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].place(), "10 km N of Town");
        assert_eq!(records[0].latitude(), 1.0);
    }

    #[test]
    fn test_number_with_unit_suffix_is_rejected() {
        let doc = document(&event_block("10.5km", "30", "5.0", None, "Suffixed"));
        assert!(parse(&doc).unwrap().is_empty());
    }

    #[test]
    fn test_truncated_document_is_an_error() {
        let doc = document(&event_block("1", "1", "5.0", None, "cut"));
        let truncated = &doc[..doc.len() - "</q:quakeml>".len()];
        let err = parse(truncated).unwrap_err();
        assert!(err.to_string().contains("unclosed"));
    }
}
