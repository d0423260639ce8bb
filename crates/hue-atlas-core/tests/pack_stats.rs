use hue_atlas_core::prelude::*;
use image::{DynamicImage, Rgba, RgbaImage};

fn red(key: &str, w: u32, h: u32) -> InputImage {
    InputImage {
        key: key.to_string(),
        image: DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([220, 20, 20, 255]))),
    }
}

#[test]
fn test_pack_stats_basic() {
    let cfg = AtlasConfig::builder().with_page_size(256, 256).build();

    // 4 textures of 64x64 fit on one row
    let inputs = (0..4).map(|i| red(&format!("tex_{i}"), 64, 64)).collect();

    let result = pack_images(inputs, &[], cfg).expect("packing should succeed");
    let stats = result.stats();

    assert_eq!(stats.num_placements, 4);
    assert_eq!(stats.num_pages, 1);
    assert_eq!(stats.used_area, 4 * 64 * 64);
    assert_eq!(stats.total_page_area, 256 * 256);
    assert!((stats.occupancy - 0.25).abs() < 1e-9, "Occupancy: {}", stats.occupancy);
    assert_eq!(stats.wasted_area(), 256 * 256 - 4 * 64 * 64);
    assert!((stats.waste_percentage() - 75.0).abs() < 1e-9);
}

#[test]
fn test_pack_stats_multiple_pages() {
    let cfg = AtlasConfig::builder().with_page_size(128, 128).build();
    let inputs = (0..6).map(|i| red(&format!("tex_{i}"), 100, 100)).collect();

    let result = pack_images(inputs, &[], cfg).expect("packing should succeed");
    let stats = result.stats();

    assert_eq!(stats.num_pages, 6);
    assert_eq!(stats.num_placements, 6);
    assert_eq!(stats.total_page_area, 6 * 128 * 128);
    assert_eq!(result.pages.len(), 6);
    for p in &result.pages {
        assert_eq!(p.rgba.dimensions(), (128, 128));
    }
}

#[test]
fn test_pack_stats_summary() {
    let cfg = AtlasConfig::builder().with_page_size(128, 128).build();
    let inputs = vec![red("a", 32, 32), red("b", 32, 32)];

    let result = pack_images(inputs, &[], cfg).expect("packing should succeed");
    let summary = result.stats().summary();

    assert!(summary.contains("Pages: 1"));
    assert!(summary.contains("Assets: 2"));
    assert!(summary.contains("Occupancy"));
}

#[test]
fn test_layout_stats_match_placements() {
    let cfg = AtlasConfig::builder().with_page_size(64, 64).hue_bins(4).build();
    let items: Vec<LayoutItem<&str>> = [("a", 40, 40), ("b", 40, 40), ("c", 20, 20)]
        .into_iter()
        .map(|(key, w, h)| LayoutItem {
            key,
            w,
            h,
            class: ColorClass::Hue(1),
            features: None,
        })
        .collect();
    let out = pack_layout(items, &[], cfg).expect("pack");
    let stats = out.atlas.stats();
    assert_eq!(stats.num_pages, out.atlas.pages.len());
    assert_eq!(stats.num_placements, 3);
    assert_eq!(stats.used_area, 40 * 40 * 2 + 20 * 20);
    assert!(stats.occupancy <= 1.0);
}
