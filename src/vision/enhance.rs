// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing ahead of text recognition
//!
//! Order is fixed: grayscale, autocontrast, median filter. Swapping the
//! first two steps is not numerically equivalent on edge pixels.

use image::{DynamicImage, GrayImage};
use imageproc::contrast::stretch_contrast;
use imageproc::filter::median_filter;

/// Percentage of pixels clipped from each histogram tail
pub const AUTOCONTRAST_CUTOFF_PERCENT: u64 = 1;

/// Median window radius (1 => 3x3)
pub const MEDIAN_RADIUS: u32 = 1;

/// Normalize an arbitrary decoded image for recognition
///
/// `to_luma8` coerces every color type (palette, RGBA, 16-bit) so this never
/// fails. Output dimensions equal input dimensions.
pub fn preprocess(image: &DynamicImage) -> GrayImage {
    let gray = image.to_luma8();
    let stretched = autocontrast(&gray, AUTOCONTRAST_CUTOFF_PERCENT);
    median_filter(&stretched, MEDIAN_RADIUS, MEDIAN_RADIUS)
}

/// Stretch the histogram to the full 0-255 range
///
/// `cutoff_percent` of the pixel count is discarded from the dark end and
/// from the bright end before picking the new black and white points. An
/// image whose remaining histogram spans a single level is returned as is.
pub fn autocontrast(image: &GrayImage, cutoff_percent: u64) -> GrayImage {
    let mut histogram: [u64; 256] = match imageproc::stats::histogram(image).channels.first() {
        Some(levels) => levels.map(u64::from),
        None => return image.clone(),
    };

    let total: u64 = histogram.iter().sum();
    let cut = total * cutoff_percent / 100;

    clip_tail(histogram.iter_mut(), cut);
    clip_tail(histogram.iter_mut().rev(), cut);

    let lo = histogram.iter().position(|&count| count > 0);
    let hi = histogram.iter().rposition(|&count| count > 0);

    match (lo, hi) {
        (Some(lo), Some(hi)) if hi > lo => stretch_contrast(image, lo as u8, hi as u8, 0, 255),
        _ => image.clone(),
    }
}

fn clip_tail<'a>(bins: impl Iterator<Item = &'a mut u64>, mut remaining: u64) {
    for count in bins {
        if remaining == 0 {
            break;
        }
        let taken = remaining.min(*count);
        *count -= taken;
        remaining -= taken;
    }
}
