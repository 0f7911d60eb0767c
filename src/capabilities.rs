//! Printer capability descriptors as reported by the print service.
//!
//! Payloads arrive as loosely typed JSON. Decoding is lenient: a paper entry
//! that is not a pair of numbers or nulls is dropped instead of failing the
//! whole descriptor, so only well-formed data reaches the matcher.

use log::debug;
use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

use crate::error::Error;

/// Size of an advertised paper in tenths of a millimeter.
///
/// `None` on an axis means the printer does not constrain it (continuous feed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaperSize {
    pub width_tenths_mm: Option<u32>,
    pub height_tenths_mm: Option<u32>,
}

impl PaperSize {
    pub fn new(width_tenths_mm: Option<u32>, height_tenths_mm: Option<u32>) -> Self {
        PaperSize {
            width_tenths_mm,
            height_tenths_mm,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PrinterCapabilities {
    /// Advertised papers in the order the printer reported them.
    #[serde(default, deserialize_with = "deserialize_papers")]
    pub papers: Vec<(String, PaperSize)>,
    #[serde(default, deserialize_with = "deserialize_dpis")]
    pub dpis: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub supports_custom_paper_size: bool,
}

impl PrinterCapabilities {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let capabilities: PrinterCapabilities = serde_json::from_str(json)?;
        debug!(
            "decoded {} papers and {} dpi entries",
            capabilities.papers.len(),
            capabilities.dpis.len()
        );
        Ok(capabilities)
    }

    pub fn paper(&self, name: &str) -> Option<PaperSize> {
        self.papers
            .iter()
            .find(|(paper_name, _)| paper_name == name)
            .map(|(_, size)| *size)
    }

    /// Resolutions parsed from entries such as `"300"`, `"300dpi"` or `"300x600"`.
    ///
    /// For the `AxB` form the first axis is reported.
    pub fn dpi_values(&self) -> Vec<u32> {
        let mut values: Vec<u32> = self
            .dpis
            .iter()
            .filter_map(|entry| {
                let entry = entry.trim().to_ascii_lowercase();
                let first = entry.split('x').next()?.trim().trim_end_matches("dpi");
                first.trim().parse::<u32>().ok()
            })
            .collect();
        values.sort_unstable();
        values.dedup();
        values
    }

    /// An empty dpi list is treated as "anything goes".
    pub fn supports_dpi(&self, dpi: u32) -> bool {
        let values = self.dpi_values();
        values.is_empty() || values.contains(&dpi)
    }
}

fn axis(value: &Value) -> Result<Option<u32>, ()> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => match n.as_f64() {
            Some(v) if v.is_finite() && v > 0.0 && v <= u32::MAX as f64 => {
                Ok(Some(v.round() as u32))
            }
            _ => Err(()),
        },
        _ => Err(()),
    }
}

fn paper_size(value: &Value) -> Option<PaperSize> {
    match value {
        Value::Array(pair) if pair.len() == 2 => {
            let width = axis(&pair[0]).ok()?;
            let height = axis(&pair[1]).ok()?;
            Some(PaperSize::new(width, height))
        }
        _ => None,
    }
}

struct PapersVisitor;

impl<'de> Visitor<'de> for PapersVisitor {
    type Value = Vec<(String, PaperSize)>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of paper name to [width, height]")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut papers = Vec::new();
        while let Some((name, value)) = map.next_entry::<String, Value>()? {
            match paper_size(&value) {
                Some(size) => papers.push((name, size)),
                None => debug!("dropping malformed paper entry {:?}: {}", name, value),
            }
        }
        Ok(papers)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        while seq.next_element::<de::IgnoredAny>()?.is_some() {}
        Ok(Vec::new())
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Vec::new())
    }

    fn visit_bool<E>(self, _: bool) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Vec::new())
    }

    fn visit_i64<E>(self, _: i64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Vec::new())
    }

    fn visit_u64<E>(self, _: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Vec::new())
    }

    fn visit_f64<E>(self, _: f64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Vec::new())
    }

    fn visit_str<E>(self, _: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Vec::new())
    }
}

fn deserialize_papers<'de, D>(deserializer: D) -> Result<Vec<(String, PaperSize)>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(PapersVisitor)
}

fn deserialize_dpis<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let dpis = match value {
        Value::Array(entries) => entries
            .into_iter()
            .filter_map(|entry| match entry {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    Ok(dpis)
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(matches!(Value::deserialize(deserializer)?, Value::Bool(true)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_well_formed() {
        let caps = PrinterCapabilities::from_json(
            r#"{
                "papers": {
                    "29mm x 90mm": [290, 900],
                    "62mm": [620, null]
                },
                "dpis": ["300x300", "300x600"],
                "supports_custom_paper_size": true
            }"#,
        )
        .unwrap();

        assert_eq!(caps.papers.len(), 2);
        assert_eq!(
            caps.paper("29mm x 90mm"),
            Some(PaperSize::new(Some(290), Some(900)))
        );
        assert_eq!(caps.paper("62mm"), Some(PaperSize::new(Some(620), None)));
        assert_eq!(caps.dpi_values(), vec![300]);
        assert!(caps.supports_custom_paper_size);
    }

    #[test]
    fn test_malformed_entries_are_dropped() {
        let caps = PrinterCapabilities::from_json(
            r#"{
                "papers": {
                    "ok": [290, 900],
                    "string size": ["29", "90"],
                    "too short": [290],
                    "negative": [-1, 900],
                    "object": {"w": 290}
                },
                "dpis": [203, "300dpi", {"x": 1}],
                "supports_custom_paper_size": "yes"
            }"#,
        )
        .unwrap();

        assert_eq!(caps.papers.len(), 1);
        assert_eq!(caps.papers[0].0, "ok");
        assert_eq!(caps.dpi_values(), vec![203, 300]);
        assert!(!caps.supports_custom_paper_size);
    }

    #[test]
    fn test_papers_keep_reported_order() {
        let caps = PrinterCapabilities::from_json(
            r#"{"papers": {"z last": [1, 1], "a first": [2, 2], "m middle": [3, 3]}}"#,
        )
        .unwrap();
        let names: Vec<&str> = caps.papers.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["z last", "a first", "m middle"]);
    }

    #[test]
    fn test_missing_fields_default() {
        let caps = PrinterCapabilities::from_json(r#"{"papers": null}"#).unwrap();
        assert!(caps.papers.is_empty());
        assert!(caps.dpis.is_empty());
        assert!(caps.supports_dpi(300));
    }

    #[test]
    fn test_papers_not_a_map() {
        let json = r#"{"papers": ["29mm"], "dpis": "300"}"#;
        let caps = PrinterCapabilities::from_json(json).unwrap();
        assert!(caps.papers.is_empty());
        assert!(caps.dpis.is_empty());
    }

    #[test]
    fn test_not_an_object() {
        assert!(PrinterCapabilities::from_json(r#""a string""#).is_err());
        assert!(PrinterCapabilities::from_json("not json").is_err());
    }
}
