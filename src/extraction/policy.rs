// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Confusable-character correction policy
//!
//! The seven-segment style displays this service reads produce a small set of
//! recurring OCR misreads. Every correction for them lives here so the
//! normalizer and extractor stay policy-free.

/// Corrections applied to recognized text before and after pattern matching
pub trait ConfusablePolicy: std::fmt::Debug + Send + Sync {
    /// Rewrite raw joined text before character filtering
    fn scrub(&self, text: &str) -> String;

    /// Canonicalize an uppercased zone match
    fn canonical_zone(&self, zone: &str) -> String;
}

/// Default policy tuned for the panel displays the service was built against
///
/// - "ºC" / "°C" collapse to a bare "C"
/// - '|', 'l' and 'I' are blanked (they are misread digit strokes)
/// - zone prefixes '8' and 'L' are misread 'B'
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayFontPolicy;

/// Characters blanked out before filtering
const BLANKED: [char; 3] = ['|', 'l', 'I'];

/// Leading zone characters that are really a 'B'
const ZONE_PREFIX_MISREADS: [char; 2] = ['8', 'L'];

impl ConfusablePolicy for DisplayFontPolicy {
    fn scrub(&self, text: &str) -> String {
        text.replace("ºC", "C")
            .replace("°C", "C")
            .replace(BLANKED, " ")
    }

    fn canonical_zone(&self, zone: &str) -> String {
        let mut canonical = match zone.strip_prefix(ZONE_PREFIX_MISREADS) {
            Some(rest) => format!("B{}", rest),
            None => zone.to_string(),
        };

        // A substituted prefix in front of a real 'B'
        if canonical.starts_with("BB") {
            canonical.remove(0);
        }

        canonical
    }
}
