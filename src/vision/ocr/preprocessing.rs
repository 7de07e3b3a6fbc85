// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Tensor preparation for the PaddleOCR models
//!
//! Both models take 3-channel NCHW input. The service feeds them the
//! preprocessed grayscale image, so the luminance is replicated per channel.

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};
use ndarray::Array4;

/// Target size for PaddleOCR detection model
pub const OCR_INPUT_SIZE: u32 = 640;

/// Recognition model input height (PP-OCR English model uses 48)
pub const REC_INPUT_HEIGHT: u32 = 48;

/// Maximum width for recognition model input
pub const REC_MAX_WIDTH: u32 = 320;

/// Minimum width for recognition model input
pub const REC_MIN_WIDTH: u32 = 4;

/// Mean values for detection normalization (ImageNet)
pub const MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// Std values for detection normalization (ImageNet)
pub const STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Padding level used around resized detection input
const PAD_LEVEL: u8 = 128;

/// Scale and offsets applied by `resize_with_padding`
///
/// Used to map detection boxes back to original image coordinates.
#[derive(Debug, Clone, Copy)]
pub struct PreprocessInfo {
    /// Scale factor applied
    pub scale: f32,
    /// X offset from padding
    pub offset_x: u32,
    /// Y offset from padding
    pub offset_y: u32,
    /// Original image width
    pub original_width: u32,
    /// Original image height
    pub original_height: u32,
}

impl PreprocessInfo {
    pub fn new(width: u32, height: u32, target_size: u32) -> Self {
        if width == 0 || height == 0 {
            return Self {
                scale: 1.0,
                offset_x: 0,
                offset_y: 0,
                original_width: width,
                original_height: height,
            };
        }

        let scale = (target_size as f32 / width as f32).min(target_size as f32 / height as f32);
        let (new_w, new_h) = scaled_dimensions(width, height, scale);

        Self {
            scale,
            offset_x: (target_size - new_w) / 2,
            offset_y: (target_size - new_h) / 2,
            original_width: width,
            original_height: height,
        }
    }

    /// Map a coordinate from preprocessed space back to original image space
    ///
    /// The result is clamped to the original image bounds.
    pub fn map_to_original(&self, x: f32, y: f32) -> (f32, f32) {
        let orig_x = (x - self.offset_x as f32) / self.scale;
        let orig_y = (y - self.offset_y as f32) / self.scale;
        (
            orig_x.clamp(0.0, self.original_width as f32),
            orig_y.clamp(0.0, self.original_height as f32),
        )
    }
}

fn scaled_dimensions(width: u32, height: u32, scale: f32) -> (u32, u32) {
    let new_w = ((width as f32 * scale).round() as u32).max(1);
    let new_h = ((height as f32 * scale).round() as u32).max(1);
    (new_w, new_h)
}

/// Resize with aspect ratio preservation, centered on a gray square canvas
pub fn resize_with_padding(image: &GrayImage, target_size: u32) -> (GrayImage, PreprocessInfo) {
    let info = PreprocessInfo::new(image.width(), image.height(), target_size);
    let mut canvas = GrayImage::from_pixel(target_size, target_size, Luma([PAD_LEVEL]));

    if image.width() == 0 || image.height() == 0 {
        return (canvas, info);
    }

    let (new_w, new_h) = scaled_dimensions(image.width(), image.height(), info.scale);
    let resized = imageops::resize(image, new_w, new_h, FilterType::Lanczos3);
    imageops::replace(
        &mut canvas,
        &resized,
        info.offset_x as i64,
        info.offset_y as i64,
    );

    (canvas, info)
}

/// Build the detection tensor [1, 3, 640, 640]
///
/// Each channel is normalized with ImageNet mean/std: (pixel/255 - mean) / std
pub fn preprocess_for_detection(image: &GrayImage) -> (Array4<f32>, PreprocessInfo) {
    let (padded, info) = resize_with_padding(image, OCR_INPUT_SIZE);
    let size = OCR_INPUT_SIZE as usize;

    let tensor = Array4::from_shape_fn((1, 3, size, size), |(_, c, y, x)| {
        let value = padded.get_pixel(x as u32, y as u32)[0] as f32 / 255.0;
        (value - MEAN[c]) / STD[c]
    });

    (tensor, info)
}

/// Build the recognition tensor [1, 3, 48, W] for a cropped text region
///
/// Width follows the crop's aspect ratio, clamped to [4, 320].
/// Normalization is (pixel/255 - 0.5) / 0.5.
pub fn preprocess_for_recognition(crop: &GrayImage) -> Array4<f32> {
    let (orig_w, orig_h) = crop.dimensions();
    let scale = REC_INPUT_HEIGHT as f32 / orig_h.max(1) as f32;
    let width = ((orig_w as f32 * scale).round() as u32).clamp(REC_MIN_WIDTH, REC_MAX_WIDTH);

    let resized = imageops::resize(crop, width, REC_INPUT_HEIGHT, FilterType::Lanczos3);

    Array4::from_shape_fn(
        (1, 3, REC_INPUT_HEIGHT as usize, width as usize),
        |(_, _, y, x)| {
            let value = resized.get_pixel(x as u32, y as u32)[0] as f32 / 255.0;
            (value - 0.5) / 0.5
        },
    )
}
