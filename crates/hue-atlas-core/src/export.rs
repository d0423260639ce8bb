use crate::color::ColorProfile;
use crate::model::Atlas;
use serde_json::{Value, json};

/// Serialize the whole `Atlas` as a JSON object `{ pages, meta }` (array-of-pages style).
pub fn to_json_array<K: ToString>(atlas: &Atlas<K>) -> Value {
    let pages_val = atlas
        .pages
        .iter()
        .map(|p| {
            let placements: Vec<Value> = p
                .placements
                .iter()
                .map(|pl| {
                    json!({
                        "key": pl.key.to_string(),
                        "frame": {"x": pl.frame.x, "y": pl.frame.y, "w": pl.frame.w, "h": pl.frame.h},
                        "bucket": pl.bucket,
                    })
                })
                .collect();
            json!({
                "id": p.id,
                "width": p.width,
                "height": p.height,
                "placements": placements,
            })
        })
        .collect::<Vec<_>>();
    json!({"pages": pages_val, "meta": &atlas.meta})
}

/// Flatten placements keyed by asset id, with page id/size hints.
/// Shape: `{ frames: { key: { frame, bucket, page, pageSize } }, meta }`.
pub fn to_json_hash<K: ToString>(atlas: &Atlas<K>) -> Value {
    let mut frames = serde_json::Map::new();
    for page in &atlas.pages {
        for pl in &page.placements {
            frames.insert(
                pl.key.to_string(),
                json!({
                    "frame": {"x": pl.frame.x, "y": pl.frame.y, "w": pl.frame.w, "h": pl.frame.h},
                    "bucket": pl.bucket,
                    "page": page.id,
                    "pageSize": {"w": page.width, "h": page.height},
                }),
            );
        }
    }
    json!({ "frames": frames, "meta": &atlas.meta })
}

/// Per-asset classification dump: `[{ id, width, height, class, histogram }]`.
pub fn profiles_to_json<'a, I>(profiles: I) -> Value
where
    I: IntoIterator<Item = (&'a str, (u32, u32), &'a ColorProfile)>,
{
    let items: Vec<Value> = profiles
        .into_iter()
        .map(|(id, (w, h), prof)| {
            json!({
                "id": id,
                "width": w,
                "height": h,
                "class": prof.class,
                "counted": prof.counted,
                "histogram": prof.histogram,
            })
        })
        .collect();
    Value::Array(items)
}
