//! Resource requests and defensive usage-tag parsing

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// A resource to estimate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceRequest {
    pub provider: String,
    /// Free-form family name, normalized by `ServiceFamily::normalize`
    pub service_family: String,
    #[serde(default)]
    pub sku: String,
    pub region: String,
    /// Usage-dependent inputs (sizes, counts, durations), all as strings
    #[serde(default)]
    pub usage_tags: BTreeMap<String, String>,
    /// Caller-supplied correlation id, echoed in errors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

impl ResourceRequest {
    pub fn new(
        provider: impl Into<String>,
        service_family: impl Into<String>,
        sku: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            service_family: service_family.into(),
            sku: sku.into(),
            region: region.into(),
            ..Default::default()
        }
    }

    /// AWS request shorthand
    pub fn aws(service_family: &str, sku: &str, region: &str) -> Self {
        Self::new("aws", service_family, sku, region)
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.usage_tags.insert(key.into(), value.into());
        self
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.usage_tags.get(key).map(String::as_str)
    }
}

/// Reads typed values out of `usage_tags`, never failing.
///
/// Missing or unusable values fall back to the caller's default and the
/// field name is recorded so it can be reported in `defaulted_fields`.
#[derive(Debug)]
pub struct UsageReader<'a> {
    tags: &'a BTreeMap<String, String>,
    defaulted: BTreeSet<String>,
}

impl<'a> UsageReader<'a> {
    pub fn new(request: &'a ResourceRequest) -> Self {
        Self {
            tags: &request.usage_tags,
            defaulted: BTreeSet::new(),
        }
    }

    /// First non-blank tag among `keys`
    fn raw(&self, keys: &[&str]) -> Option<&'a str> {
        keys.iter().find_map(|k| {
            self.tags
                .get(*k)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        })
    }

    pub fn record_default(&mut self, field: &str) {
        self.defaulted.insert(field.to_string());
    }

    pub fn is_defaulted(&self, field: &str) -> bool {
        self.defaulted.contains(field)
    }

    /// Non-negative number; missing or invalid values use `default`.
    /// `keys[0]` names the field in `defaulted_fields`.
    pub fn number(&mut self, keys: &[&str], default: f64) -> f64 {
        let field = keys[0];
        match self.raw(keys) {
            None | Some("") => {
                self.record_default(field);
                default
            }
            Some(raw) => match parse_non_negative(raw) {
                Some(value) => value,
                None => {
                    warn!(
                        "Usage tag {}={:?} is not a non-negative number, using default {}",
                        field, raw, default
                    );
                    self.record_default(field);
                    default
                }
            },
        }
    }

    /// Number that only matters when present. Missing is silent,
    /// invalid values are recorded and read as `None`.
    pub fn optional_number(&mut self, keys: &[&str]) -> Option<f64> {
        let field = keys[0];
        let raw = self.raw(keys).filter(|r| !r.is_empty())?;
        match parse_non_negative(raw) {
            Some(value) => Some(value),
            None => {
                warn!("Usage tag {}={:?} is not a non-negative number, ignoring it", field, raw);
                self.record_default(field);
                None
            }
        }
    }

    /// Value parsed by `parse`; missing or unrecognized values use `default`
    pub fn choice<T, F>(&mut self, keys: &[&str], parse: F, default: T) -> T
    where
        F: Fn(&str) -> Option<T>,
    {
        let field = keys[0];
        match self.raw(keys) {
            None | Some("") => {
                self.record_default(field);
                default
            }
            Some(raw) => match parse(raw) {
                Some(value) => value,
                None => {
                    warn!("Usage tag {}={:?} is not recognized, using default", field, raw);
                    self.record_default(field);
                    default
                }
            },
        }
    }

    /// Like `choice`, but a missing tag is not recorded
    pub fn optional_choice<T, F>(&mut self, keys: &[&str], parse: F, default: T) -> T
    where
        F: Fn(&str) -> Option<T>,
    {
        match self.raw(keys) {
            None | Some("") => default,
            Some(_) => self.choice(keys, parse, default),
        }
    }

    pub fn flag(&mut self, keys: &[&str]) -> bool {
        self.optional_choice(keys, parse_bool, false)
    }

    pub fn into_defaulted(self) -> BTreeSet<String> {
        self.defaulted
    }

    pub fn defaulted(&self) -> &BTreeSet<String> {
        &self.defaulted
    }
}

/// Largest usage quantity accepted from a tag. Larger values are treated
/// as malformed and fall back to the field's default.
pub const MAX_USAGE_QUANTITY: f64 = 1e12;

/// Parse a non-negative number no larger than `MAX_USAGE_QUANTITY`
pub fn parse_non_negative(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| (0.0..=MAX_USAGE_QUANTITY).contains(v))
}

pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ResourceRequest {
        ResourceRequest::aws("ebs", "gp3", "us-east-1")
            .with_tag("size", "100")
            .with_tag("iops", "-5")
            .with_tag("throughput", "fast")
            .with_tag("multi_az", "yes")
    }

    #[test]
    fn test_present_value_not_recorded() {
        let req = request();
        let mut reader = UsageReader::new(&req);
        assert_eq!(reader.number(&["size", "size_gb"], 8.0), 100.0);
        assert!(reader.defaulted().is_empty());
    }

    #[test]
    fn test_missing_value_defaults_and_records() {
        let req = ResourceRequest::aws("ebs", "gp3", "us-east-1");
        let mut reader = UsageReader::new(&req);
        assert_eq!(reader.number(&["size", "size_gb"], 8.0), 8.0);
        assert!(reader.is_defaulted("size"));
    }

    #[test]
    fn test_alias_keys() {
        let req = ResourceRequest::aws("ebs", "gp3", "us-east-1").with_tag("size_gb", "50");
        let mut reader = UsageReader::new(&req);
        assert_eq!(reader.number(&["size", "size_gb"], 8.0), 50.0);
        assert!(!reader.is_defaulted("size"));
    }

    #[test]
    fn test_negative_and_garbage_values() {
        let req = request();
        let mut reader = UsageReader::new(&req);
        assert_eq!(reader.optional_number(&["iops"]), None);
        assert_eq!(reader.optional_number(&["throughput"]), None);
        assert_eq!(reader.optional_number(&["absent"]), None);
        let defaulted = reader.into_defaulted();
        assert!(defaulted.contains("iops"));
        assert!(defaulted.contains("throughput"));
        assert!(!defaulted.contains("absent"));
    }

    #[test]
    fn test_blank_tag_falls_through_to_alias() {
        let req = ResourceRequest::aws("ebs", "gp3", "us-east-1")
            .with_tag("size", "  ")
            .with_tag("size_gb", "100");
        let mut reader = UsageReader::new(&req);
        assert_eq!(reader.number(&["size", "size_gb"], 8.0), 100.0);
        assert!(!reader.is_defaulted("size"));
    }

    #[test]
    fn test_quantity_above_maximum_is_defaulted() {
        let req = ResourceRequest::aws("elb", "alb", "us-east-1")
            .with_tag("capacity_units", "1e308");
        let mut reader = UsageReader::new(&req);
        assert_eq!(reader.number(&["capacity_units"], 0.0), 0.0);
        assert!(reader.is_defaulted("capacity_units"));
    }

    #[test]
    fn test_flag() {
        let req = request();
        let mut reader = UsageReader::new(&req);
        assert!(reader.flag(&["multi_az"]));
        assert!(!reader.flag(&["missing_flag"]));
        assert!(reader.defaulted().is_empty());
    }

    #[test]
    fn test_parse_non_negative() {
        assert_eq!(parse_non_negative(" 1.5 "), Some(1.5));
        assert_eq!(parse_non_negative("0"), Some(0.0));
        assert_eq!(parse_non_negative("-1"), None);
        assert_eq!(parse_non_negative("NaN"), None);
        assert_eq!(parse_non_negative("inf"), None);
        assert_eq!(parse_non_negative("1e12"), Some(MAX_USAGE_QUANTITY));
        assert_eq!(parse_non_negative("1e13"), None);
    }
}
