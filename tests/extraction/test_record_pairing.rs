// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Positional pairing properties and its known weak spots

use fabstir_ocr_node::extraction::{RecordExtractor, TextNormalizer};

const SAMPLES: &[&str] = &[
    "",
    "B1",
    "45.6",
    "B1 45.6",
    "B1 B2 B3 45.6",
    "45.6 46.7 47.8 B9",
    "B12 43,5 noise L7 89.0C",
    "BT3 101,2C BT4 99.9 c 8T5",
    "zone B1 reads 12.5 and zone B2 reads 130.0C",
    "L1 L2 L3 L4 L5 10.0 20.0",
];

#[test]
fn test_record_count_is_min_of_match_counts() {
    let extractor = RecordExtractor::default();
    for text in SAMPLES {
        let zones = extractor.zone_codes(text).len();
        let temps = extractor.temperatures(text).len();
        assert_eq!(
            extractor.extract(text).len(),
            zones.min(temps),
            "pairing count mismatch for {:?}",
            text
        );
    }
}

#[test]
fn test_pairs_follow_text_order() {
    let extractor = RecordExtractor::default();
    let records = extractor.extract("zone B1 reads 12.5 and zone B2 reads 130.0C");

    let pairs: Vec<(&str, &str)> = records
        .iter()
        .map(|r| (r.zone.as_str(), r.value.as_str()))
        .collect();
    assert_eq!(pairs, [("B1", "12.5"), ("B2", "130.0")]);
}

#[test]
fn test_surplus_zones_dropped() {
    let records = RecordExtractor::default().extract("L1 L2 L3 L4 L5 10.0 20.0");
    let zones: Vec<&str> = records.iter().map(|r| r.zone.as_str()).collect();
    assert_eq!(zones, ["B1", "B2"]);
}

#[test]
fn test_temperature_digits_also_match_as_zone() {
    // "89.0C" contains the token "89", which the zone pattern reads as "B9"
    let extractor = RecordExtractor::default();
    let zones: Vec<String> = extractor
        .zone_codes("B7 89.0C")
        .iter()
        .map(|z| z.to_string())
        .collect();
    assert_eq!(zones, ["B7", "B9"]);
    assert_eq!(extractor.extract("B7 89.0C").len(), 1);
}

#[test]
fn test_stray_temperature_shifts_later_pairs() {
    // An unlabelled reading before the first zone pairs with the wrong zone
    let records = RecordExtractor::default().extract("55.5 B1 20.0 B2 30.0");
    let pairs: Vec<(&str, &str)> = records
        .iter()
        .map(|r| (r.zone.as_str(), r.value.as_str()))
        .collect();
    assert_eq!(pairs, [("B1", "55.5"), ("B2", "20.0")]);
}

#[test]
fn test_normalized_output_is_stable_across_calls() {
    let normalizer = TextNormalizer::default();
    for text in SAMPLES {
        let fragments = [*text, "|x|", "°°C"];
        assert_eq!(normalizer.normalize(&fragments), normalizer.normalize(&fragments));
    }
}
