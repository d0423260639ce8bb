use hue_atlas_core::prelude::*;
use hue_atlas_core::{classify, hue_bin, profile, rgb_to_hsv};
use image::{Rgba, RgbaImage};

fn solid(w: u32, h: u32, rgba: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(w, h, Rgba(rgba))
}

/// `n_first` pixels of `a` followed by `n_second` pixels of `b` in one row.
fn mixed(n_first: u32, a: [u8; 4], n_second: u32, b: [u8; 4]) -> RgbaImage {
    let mut img = RgbaImage::new(n_first + n_second, 1);
    for x in 0..n_first + n_second {
        let c = if x < n_first { a } else { b };
        img.put_pixel(x, 0, Rgba(c));
    }
    img
}

#[test]
fn fully_transparent_is_undefined() {
    let img = solid(8, 8, [255, 0, 0, 0]);
    assert_eq!(classify(&img, &ClassifierParams::default()), ColorClass::Undefined);
}

#[test]
fn alpha_threshold_skips_faint_pixels() {
    let img = solid(4, 4, [0, 0, 255, 10]);
    let mut params = ClassifierParams::default();
    params.alpha_threshold = 10;
    assert_eq!(classify(&img, &params), ColorClass::Undefined);
    params.alpha_threshold = 9;
    assert_eq!(classify(&img, &params), ColorClass::Hue(24));
}

#[test]
fn solid_red_is_first_hue_bin() {
    let img = solid(16, 16, [255, 0, 0, 255]);
    let params = ClassifierParams::default();
    assert_eq!(params.hue_bins, 36);
    assert_eq!(classify(&img, &params), ColorClass::Hue(0));
}

#[test]
fn primary_hues_land_in_expected_bins() {
    let params = ClassifierParams::default();
    assert_eq!(classify(&solid(4, 4, [0, 255, 0, 255]), &params), ColorClass::Hue(12));
    assert_eq!(classify(&solid(4, 4, [0, 0, 255, 255]), &params), ColorClass::Hue(24));
}

#[test]
fn achromatic_solids() {
    let params = ClassifierParams::default();
    assert_eq!(classify(&solid(4, 4, [128, 128, 128, 255]), &params), ColorClass::Gray);
    assert_eq!(classify(&solid(4, 4, [0, 0, 0, 255]), &params), ColorClass::Black);
    assert_eq!(classify(&solid(4, 4, [255, 255, 255, 255]), &params), ColorClass::White);
    // saturation 0.1 stays achromatic
    assert_eq!(classify(&solid(4, 4, [200, 190, 180, 255]), &params), ColorClass::Gray);
}

#[test]
fn achromatic_majority_is_tunable() {
    // 60% black, 40% red
    let img = mixed(6, [0, 0, 0, 255], 4, [255, 0, 0, 255]);
    let mut params = ClassifierParams::default();
    assert_eq!(classify(&img, &params), ColorClass::Black);
    params.achromatic_majority = 0.7;
    assert_eq!(classify(&img, &params), ColorClass::Hue(0));
}

#[test]
fn exactly_half_achromatic_is_not_a_majority() {
    let img = mixed(5, [255, 255, 255, 255], 5, [0, 0, 255, 255]);
    assert_eq!(classify(&img, &ClassifierParams::default()), ColorClass::Hue(24));
}

#[test]
fn hue_tie_prefers_lowest_bin() {
    let img = mixed(3, [0, 0, 255, 255], 3, [255, 0, 0, 255]);
    assert_eq!(classify(&img, &ClassifierParams::default()), ColorClass::Hue(0));
}

#[test]
fn achromatic_without_majority_picks_largest_share() {
    let mut img = RgbaImage::new(10, 1);
    for x in 0..10 {
        let c = match x {
            0..=3 => [128, 128, 128, 255],
            4..=6 => [0, 0, 0, 255],
            _ => [255, 255, 255, 255],
        };
        img.put_pixel(x, 0, Rgba(c));
    }
    assert_eq!(classify(&img, &ClassifierParams::default()), ColorClass::Gray);
}

#[test]
fn hsv_conversion() {
    let (h, s, v) = rgb_to_hsv(255, 0, 255);
    assert!((h - 300.0).abs() < 1e-3, "h={h}");
    assert!((s - 1.0).abs() < 1e-6);
    assert!((v - 1.0).abs() < 1e-6);

    let (h, s, v) = rgb_to_hsv(0, 0, 0);
    assert_eq!((h, s, v), (0.0, 0.0, 0.0));

    let (h, _, _) = rgb_to_hsv(255, 128, 0);
    assert!((h - 30.1).abs() < 0.2, "h={h}");
}

#[test]
fn hue_bin_clamps_to_last() {
    assert_eq!(hue_bin(0.0, 36), 0);
    assert_eq!(hue_bin(359.99, 36), 35);
    assert_eq!(hue_bin(360.0, 36), 35);
    assert_eq!(hue_bin(180.0, 4), 2);
}

#[test]
fn profile_histogram_is_normalized() {
    let img = mixed(3, [255, 0, 0, 255], 1, [0, 0, 0, 255]);
    let params = ClassifierParams::default();
    let prof = profile(&img, &params);
    assert_eq!(prof.class, ColorClass::Hue(0));
    assert_eq!(prof.counted, 4);
    assert_eq!(prof.histogram.len(), params.hue_bins as usize + 3);
    assert!((prof.histogram[0] - 0.75).abs() < 1e-9);
    assert!((prof.histogram[params.hue_bins as usize] - 0.25).abs() < 1e-9);
    let sum: f64 = prof.histogram.iter().sum();
    assert!((sum - 1.0).abs() < 1e-9);
}

#[test]
fn profile_of_transparent_image_is_all_zero() {
    let prof = profile(&solid(3, 3, [0, 0, 0, 0]), &ClassifierParams::default());
    assert_eq!(prof.class, ColorClass::Undefined);
    assert_eq!(prof.counted, 0);
    assert!(prof.histogram.iter().all(|v| *v == 0.0));
}

#[test]
fn bucket_index_mapping() {
    assert_eq!(ColorClass::Hue(3).bucket_index(7), Some(3));
    assert_eq!(ColorClass::Hue(7).bucket_index(7), None);
    assert_eq!(ColorClass::Black.bucket_index(7), Some(7));
    assert_eq!(ColorClass::White.bucket_index(7), Some(8));
    assert_eq!(ColorClass::Gray.bucket_index(7), Some(9));
    assert_eq!(ColorClass::Undefined.bucket_index(7), None);
}
