// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Zone / temperature record extraction from normalized text

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, LazyLock};
use tracing::debug;

use super::policy::{ConfusablePolicy, DisplayFontPolicy};

/// Zone code: one of B/L/8, optional 'T', 1-2 digits
pub const ZONE_PATTERN: &str = r"(?i)\b[BL8]T?\d{1,2}\b";

/// Temperature: 2-3 digits, ',' or '.', one fractional digit, optional 'C'
pub const TEMPERATURE_PATTERN: &str = r"\b\d{2,3}[,.]\d\s*[Cc]?\b";

static ZONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ZONE_PATTERN).expect("zone pattern is valid"));

static TEMPERATURE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(TEMPERATURE_PATTERN).expect("temperature pattern is valid"));

/// Canonical zone identifier (e.g. "B12", "BT3")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneCode(String);

impl ZoneCode {
    /// Normalize a raw zone match: uppercase, then the policy's prefix fixes
    pub fn normalize(policy: &dyn ConfusablePolicy, raw: &str) -> Self {
        Self(policy.canonical_zone(&raw.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZoneCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Temperature reading with '.' as decimal separator and no unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemperatureValue(String);

impl TemperatureValue {
    /// Normalize a raw temperature match: drop unit, canonical separator, trim
    pub fn normalize(raw: &str) -> Self {
        Self(raw.replace(['C', 'c'], "").replace(',', ".").trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemperatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A zone paired with the temperature at the same list position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    #[serde(rename = "zona")]
    pub zone: ZoneCode,
    #[serde(rename = "valor")]
    pub value: TemperatureValue,
}

/// Scans normalized text for zone codes and temperatures and pairs them
///
/// The two patterns are scanned independently. Pairing is positional: the
/// i-th zone goes with the i-th temperature, and whatever is left over on the
/// longer side is dropped.
#[derive(Debug, Clone)]
pub struct RecordExtractor {
    policy: Arc<dyn ConfusablePolicy>,
}

impl Default for RecordExtractor {
    fn default() -> Self {
        Self::new(Arc::new(DisplayFontPolicy))
    }
}

impl RecordExtractor {
    pub fn new(policy: Arc<dyn ConfusablePolicy>) -> Self {
        Self { policy }
    }

    /// All zone matches in text order, normalized
    pub fn zone_codes(&self, text: &str) -> Vec<ZoneCode> {
        ZONE_REGEX
            .find_iter(text)
            .map(|m| ZoneCode::normalize(self.policy.as_ref(), m.as_str()))
            .collect()
    }

    /// All temperature matches in text order, normalized
    pub fn temperatures(&self, text: &str) -> Vec<TemperatureValue> {
        TEMPERATURE_REGEX
            .find_iter(text)
            .map(|m| TemperatureValue::normalize(m.as_str()))
            .collect()
    }

    /// Extract positionally paired records
    pub fn extract(&self, text: &str) -> Vec<ExtractedRecord> {
        let zones = self.zone_codes(text);
        let temperatures = self.temperatures(text);

        if zones.len() != temperatures.len() {
            debug!(
                "Zone/temperature count mismatch: {} zones, {} temperatures, dropping {}",
                zones.len(),
                temperatures.len(),
                zones.len().abs_diff(temperatures.len())
            );
        }

        zones
            .into_iter()
            .zip(temperatures)
            .map(|(zone, value)| ExtractedRecord { zone, value })
            .collect()
    }
}
