use hue_atlas_core::prelude::*;
use image::{Rgba, RgbaImage};

fn layout() -> Atlas {
    let cfg = AtlasConfig::builder().with_page_size(64, 64).hue_bins(4).build();
    let items = vec![
        LayoutItem {
            key: "a",
            w: 32,
            h: 16,
            class: ColorClass::Hue(2),
            features: None,
        },
        LayoutItem {
            key: "b",
            w: 10,
            h: 10,
            class: ColorClass::Gray,
            features: None,
        },
    ];
    hue_atlas_core::pack_layout(items, &[], cfg).expect("pack").atlas
}

#[test]
fn export_json_array_smoke() {
    let atlas = layout();
    let ja = hue_atlas_core::to_json_array(&atlas);
    let obj = ja.as_object().expect("object");
    assert!(obj.contains_key("pages"));
    assert!(obj.contains_key("meta"));

    let pages = ja["pages"].as_array().expect("pages");
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0]["id"], 0);
    assert_eq!(pages[0]["width"], 64);
    let placements = pages[0]["placements"].as_array().expect("placements");
    assert_eq!(placements[0]["key"], "a");
    assert_eq!(placements[0]["bucket"], 2);
    assert_eq!(placements[0]["frame"]["w"], 32);
    assert_eq!(placements[1]["key"], "b");
    assert_eq!(placements[1]["bucket"], 6);
    assert_eq!(placements[1]["frame"]["x"], 32);

    let meta = &ja["meta"];
    assert_eq!(meta["app"], "hue-atlas");
    assert_eq!(meta["schema_version"], "1");
    assert_eq!(meta["hue_bins"], 4);
}

#[test]
fn export_json_hash_smoke() {
    let atlas = layout();
    let jh = hue_atlas_core::to_json_hash(&atlas);
    let obj = jh.as_object().expect("object");
    assert!(obj.contains_key("frames"));
    assert!(obj.contains_key("meta"));

    let frames = jh["frames"].as_object().expect("frames");
    assert_eq!(frames.len(), 2);
    assert_eq!(jh["frames"]["b"]["page"], 0);
    assert_eq!(jh["frames"]["b"]["pageSize"]["w"], 64);
    assert_eq!(jh["frames"]["a"]["frame"]["h"], 16);
}

#[test]
fn export_profiles_smoke() {
    let params = ClassifierParams::default();
    let img = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 255, 255]));
    let prof = hue_atlas_core::profile(&img, &params);
    let v = hue_atlas_core::profiles_to_json([("blue", (2, 2), &prof)]);

    let arr = v.as_array().expect("array");
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0]["id"], "blue");
    assert_eq!(arr[0]["class"]["hue"], 24);
    assert_eq!(arr[0]["counted"], 4);
    assert_eq!(
        arr[0]["histogram"].as_array().map(Vec::len),
        Some(params.hue_bins as usize + 3)
    );
}

#[test]
fn meta_round_trips_through_serde() {
    let atlas = layout();
    let s = serde_json::to_string(&atlas.meta).expect("serialize");
    let back: Meta = serde_json::from_str(&s).expect("deserialize");
    assert_eq!(back.page_size, (64, 64));
    assert_eq!(back.rotation_start, atlas.meta.rotation_start);
}
