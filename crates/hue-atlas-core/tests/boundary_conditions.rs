use hue_atlas_core::config::AtlasConfig;
use hue_atlas_core::error::AtlasError;
use hue_atlas_core::{ColorClass, InputImage, LayoutItem, pack_images, pack_layout};
use image::{DynamicImage, Rgba, RgbaImage};

fn item(key: &str, w: u32, h: u32) -> LayoutItem<&str> {
    LayoutItem {
        key,
        w,
        h,
        class: ColorClass::Hue(0),
        features: None,
    }
}

/// Test zero-sized page dimensions
#[test]
fn test_zero_width() {
    let cfg = AtlasConfig {
        page_width: 0,
        page_height: 1024,
        ..Default::default()
    };

    match cfg.validate() {
        Err(AtlasError::InvalidDimensions { width, height }) => {
            assert_eq!(width, 0);
            assert_eq!(height, 1024);
        }
        other => panic!("Expected InvalidDimensions error, got {other:?}"),
    }
}

#[test]
fn test_zero_height() {
    let cfg = AtlasConfig {
        page_width: 1024,
        page_height: 0,
        ..Default::default()
    };
    assert!(matches!(
        cfg.validate(),
        Err(AtlasError::InvalidDimensions {
            width: 1024,
            height: 0
        })
    ));
}

#[test]
fn test_zero_hue_bins() {
    let cfg = AtlasConfig {
        hue_bins: 0,
        ..Default::default()
    };
    assert!(matches!(cfg.validate(), Err(AtlasError::InvalidConfig(_))));
}

#[test]
fn test_threshold_out_of_range() {
    let cfg = AtlasConfig::builder().low_saturation(1.5).build();
    assert!(matches!(cfg.validate(), Err(AtlasError::InvalidConfig(_))));

    let cfg = AtlasConfig::builder().dark_value(-0.1).build();
    assert!(matches!(cfg.validate(), Err(AtlasError::InvalidConfig(_))));
}

#[test]
fn test_dark_above_bright() {
    let cfg = AtlasConfig::builder().dark_value(0.9).bright_value(0.8).build();
    match cfg.validate() {
        Err(AtlasError::InvalidConfig(msg)) => assert!(msg.contains("dark_value")),
        other => panic!("Expected InvalidConfig error, got {other:?}"),
    }
}

#[test]
fn test_majority_and_fallback_must_be_below_one() {
    let cfg = AtlasConfig::builder().achromatic_majority(1.0).build();
    assert!(cfg.validate().is_err());
    let cfg = AtlasConfig::builder().fallback_rotation_fraction(1.0).build();
    assert!(cfg.validate().is_err());
    let cfg = AtlasConfig::builder()
        .achromatic_majority(0.0)
        .fallback_rotation_fraction(0.0)
        .build();
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_defaults_are_valid() {
    let cfg = AtlasConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!((cfg.page_width, cfg.page_height), (2048, 2048));
    assert_eq!(cfg.hue_bins, 36);
    assert_eq!(cfg.bucket_count(), 39);
    assert_eq!(cfg.alpha_threshold, 0);
    assert!((cfg.low_saturation - 0.15).abs() < 1e-6);
    assert!((cfg.dark_value - 0.05).abs() < 1e-6);
    assert!((cfg.bright_value - 0.95).abs() < 1e-6);
    assert!((cfg.achromatic_majority - 0.5).abs() < 1e-6);
    assert!((cfg.fallback_rotation_fraction - 0.95).abs() < 1e-6);
}

#[test]
fn test_config_deserializes_with_defaults() {
    let cfg: AtlasConfig =
        serde_json::from_str(r#"{"page_width": 512, "page_height": 256}"#).expect("parse");
    assert_eq!((cfg.page_width, cfg.page_height), (512, 256));
    assert_eq!(cfg.hue_bins, 36);
    assert!(cfg.keep_histograms);
}

#[test]
fn test_invalid_config_fails_before_packing() {
    let cfg = AtlasConfig::builder().with_page_size(0, 64).build();
    let res = pack_layout(vec![item("a", 8, 8)], &[], cfg);
    assert!(matches!(res, Err(AtlasError::InvalidDimensions { .. })));
}

#[test]
fn test_empty_input() {
    let cfg = AtlasConfig::default();
    let res = pack_layout(Vec::<LayoutItem<&str>>::new(), &[], cfg.clone());
    assert!(matches!(res, Err(AtlasError::Empty)));

    let res = pack_images(Vec::new(), &[], cfg);
    assert!(matches!(res, Err(AtlasError::Empty)));
}

#[test]
fn test_zero_size_item_is_rejected() {
    let cfg = AtlasConfig::builder().with_page_size(64, 64).build();
    let res = pack_layout(vec![item("a", 8, 8), item("flat", 8, 0)], &[], cfg);
    match res {
        Err(AtlasError::InvalidInput(msg)) => assert!(msg.contains("flat")),
        Err(e) => panic!("Expected InvalidInput error, got {e}"),
        Ok(_) => panic!("Expected InvalidInput error"),
    }
}

#[test]
fn test_zero_size_image_is_rejected() {
    let cfg = AtlasConfig::builder().with_page_size(64, 64).build();
    let inputs = vec![InputImage {
        key: "empty".into(),
        image: DynamicImage::ImageRgba8(RgbaImage::new(0, 4)),
    }];
    assert!(matches!(
        pack_images(inputs, &[], cfg),
        Err(AtlasError::InvalidInput(_))
    ));
}

#[test]
fn test_asset_exactly_page_sized() {
    let cfg = AtlasConfig::builder().with_page_size(64, 32).build();
    let out = pack_layout(vec![item("full", 64, 32)], &[], cfg).expect("pack");
    assert_eq!(out.atlas.pages.len(), 1);
    assert!(out.diagnostics.is_empty());
}

#[test]
fn test_single_pixel_over_is_skipped() {
    let cfg = AtlasConfig::builder().with_page_size(64, 32).build();
    let out = pack_layout(vec![item("wide", 65, 32), item("ok", 4, 4)], &[], cfg).expect("pack");
    assert_eq!(out.atlas.stats().num_placements, 1);
    assert_eq!(out.diagnostics.warning_count(), 1);
}

#[test]
fn test_all_inputs_dropped_gives_no_pages() {
    let cfg = AtlasConfig::builder().with_page_size(32, 32).build();
    let inputs = vec![InputImage {
        key: "clear".into(),
        image: DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 0]))),
    }];
    let out = pack_images(inputs, &[], cfg).expect("pack");
    assert!(out.pages.is_empty());
    assert_eq!(out.report.total_pages, 0);
    assert_eq!(out.profiles.len(), 1);
    assert_eq!(out.profiles[0].profile.class, ColorClass::Undefined);
}

#[test]
fn test_duplicate_keys_keep_first() {
    let cfg = AtlasConfig::builder().with_page_size(64, 64).build();
    let out = pack_layout(vec![item("a", 8, 8), item("a", 16, 16)], &[], cfg).expect("pack");
    let frames: Vec<_> = out.atlas.placements().map(|(_, p)| p.frame).collect();
    assert_eq!(frames.len(), 1);
    assert_eq!((frames[0].w, frames[0].h), (8, 8));
    assert_eq!(out.diagnostics.len(), 1);
}
