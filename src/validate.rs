//! Normalization of raw text coming from the editor inputs.
//!
//! Over-length text is truncated to the platform limit, counted in Unicode scalar
//! values. Blank text (empty or whitespace only) means "unset".

use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, SubsecRound, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use crate::error::Validation;

pub const TITLE_LIMIT: usize = 256;
pub const DESCRIPTION_LIMIT: usize = 4096;
pub const FIELD_NAME_LIMIT: usize = 256;
pub const FIELD_VALUE_LIMIT: usize = 1024;
pub const FIELD_COUNT_LIMIT: usize = 25;
pub const AUTHOR_NAME_LIMIT: usize = 256;
pub const FOOTER_TEXT_LIMIT: usize = 2048;
pub const USERNAME_LIMIT: usize = 80;

const LOCAL_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// A 24 bit RGB color, sent as a plain integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Color(u32);

impl Color {
    pub const MAX: u32 = 0xFF_FF_FF;

    pub fn new(value: u32) -> Option<Self> {
        (value <= Self::MAX).then_some(Self(value))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Six lower-case hex digits, no marker.
    pub fn to_hex(self) -> String {
        format!("{:06x}", self.0)
    }

    pub fn to_css(self) -> String {
        format!("#{}", self.to_hex())
    }
}

impl TryFrom<u32> for Color {
    type Error = Validation;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| Validation::InvalidColor(value.to_string()))
    }
}

impl From<Color> for u32 {
    fn from(color: Color) -> Self {
        color.0
    }
}

/// A UTC instant with millisecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self(instant.trunc_subsecs(3))
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.0
    }

    /// `2024-05-01T10:30:00.000Z`
    pub fn to_iso(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|instant| Self::new(instant.with_timezone(&Utc)))
            .map_err(de::Error::custom)
    }
}

/// Parses a color picker or hand-typed value. Empty input clears the color.
pub fn color(raw: &str) -> Result<Option<Color>, Validation> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let digits = trimmed
        .strip_prefix('#')
        .or_else(|| trimmed.strip_prefix("0x"))
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.len() != 6 {
        return Err(Validation::InvalidColor(raw.to_string()));
    }
    let bytes = hex::decode(digits).map_err(|_| Validation::InvalidColor(raw.to_string()))?;
    let value = bytes
        .iter()
        .fold(0u32, |acc, byte| (acc << 8) | u32::from(*byte));
    Ok(Some(Color(value)))
}

/// Parses a local date-time in `offset`, or an RFC 3339 instant, into UTC.
/// Empty input clears the timestamp.
pub fn timestamp(raw: &str, offset: &FixedOffset) -> Result<Option<Timestamp>, Validation> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(Some(Timestamp::new(instant.with_timezone(&Utc))));
    }
    LOCAL_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .and_then(|naive| offset.from_local_datetime(&naive).single())
        .map(|local| Some(Timestamp::new(local.with_timezone(&Utc))))
        .ok_or_else(|| Validation::InvalidTimestamp(raw.to_string()))
}

/// Optional text: capped at `limit`, then cleared if what is left is blank.
pub fn text(raw: &str, limit: usize) -> Option<String> {
    let capped = truncate(raw, limit);
    (!capped.trim().is_empty()).then_some(capped)
}

/// URLs are kept as entered; only blank input is treated as unset.
pub fn url(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

pub fn truncate(raw: &str, limit: usize) -> String {
    match raw.char_indices().nth(limit) {
        Some((end, _)) => {
            debug!(limit, length = raw.chars().count(), "truncating over-length text");
            raw[..end].to_string()
        }
        None => raw.to_string(),
    }
}

/// The viewer's current UTC offset.
pub fn local_offset() -> FixedOffset {
    *chrono::Local::now().offset()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn color_accepts_markers_and_case() {
        assert_eq!(color("00ff00").unwrap(), Color::new(0x00FF00));
        assert_eq!(color("#00FF00").unwrap(), Color::new(0x00FF00));
        assert_eq!(color("0xABCDEF").unwrap(), Color::new(0xABCDEF));
        assert_eq!(color("  #5865f2 ").unwrap(), Color::new(0x5865F2));
    }

    #[test]
    fn color_rejects_malformed_input() {
        for raw in ["#fff", "gg0000", "#1234567", "red", "#12 456", "ééé"] {
            assert_eq!(
                color(raw),
                Err(Validation::InvalidColor(raw.to_string())),
                "{raw}"
            );
        }
    }

    #[test]
    fn empty_color_clears() {
        assert_eq!(color("").unwrap(), None);
        assert_eq!(color("   ").unwrap(), None);
    }

    #[test]
    fn color_bounds() {
        assert!(Color::new(0xFFFFFF).is_some());
        assert!(Color::new(0x1000000).is_none());
        assert!(Color::try_from(0x1000000).is_err());
        assert_eq!(Color::new(0x0000ff).unwrap().to_css(), "#0000ff");
    }

    #[test]
    fn local_datetime_is_converted_to_utc() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let stamp = timestamp("2024-05-01T12:30", &plus_two).unwrap().unwrap();
        assert_eq!(stamp.to_iso(), "2024-05-01T10:30:00.000Z");

        let stamp = timestamp("2024-05-01 12:30:15", &utc()).unwrap().unwrap();
        assert_eq!(stamp.to_iso(), "2024-05-01T12:30:15.000Z");
    }

    #[test]
    fn rfc3339_keeps_its_own_offset() {
        let minus_five = FixedOffset::west_opt(5 * 3600).unwrap();
        let stamp = timestamp("2024-05-01T12:30:00+01:00", &minus_five)
            .unwrap()
            .unwrap();
        assert_eq!(stamp.to_iso(), "2024-05-01T11:30:00.000Z");
    }

    #[test]
    fn empty_timestamp_clears_invalid_rejects() {
        assert_eq!(timestamp("", &utc()).unwrap(), None);
        assert_eq!(
            timestamp("yesterday", &utc()),
            Err(Validation::InvalidTimestamp("yesterday".into()))
        );
        assert!(timestamp("2024-13-01T00:00", &utc()).is_err());
    }

    #[test]
    fn timestamp_serializes_as_iso_string() {
        let stamp = timestamp("2024-01-02T03:04", &utc()).unwrap().unwrap();
        let json = serde_json::to_string(&stamp).unwrap();
        assert_eq!(json, "\"2024-01-02T03:04:00.000Z\"");
        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stamp);
    }

    #[test]
    fn text_truncates_by_code_point() {
        assert_eq!(text("héllo", 2).as_deref(), Some("hé"));
        assert_eq!(text("abc", 3).as_deref(), Some("abc"));
        assert_eq!(truncate("🦀🦀🦀", 1), "🦀");
    }

    #[test]
    fn text_blank_within_limit_clears() {
        let raw = format!("{}x", " ".repeat(TITLE_LIMIT));
        assert_eq!(text(&raw, TITLE_LIMIT), None);
        assert_eq!(text("\n\n ab", 3), None);
        assert_eq!(text("\n\nab", 3).as_deref(), Some("\n\na"));
    }

    #[test]
    fn blank_text_clears_but_newlines_survive() {
        assert_eq!(text(" \n\t", 10), None);
        assert_eq!(text("a\n\nb", 10).as_deref(), Some("a\n\nb"));
        assert_eq!(url(""), None);
        assert_eq!(url("not a url").as_deref(), Some("not a url"));
    }
}
