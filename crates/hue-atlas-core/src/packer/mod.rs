use crate::bucket::{BucketSet, ClassifiedAsset};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{AtlasError, Result};
use crate::model::{Page, Placement, Rect};
use std::collections::HashMap;
use tracing::debug;

pub mod rotation;
pub mod shelf;

pub use rotation::{Gap, RotationChoice, find_gaps, rotation_order, select_rotation};
pub use shelf::ShelfPacker;

/// A packer places rectangles into a page.
///
/// Implementations must ensure no overlaps and keep placements inside the page.
/// `pack` may return `None` if the rectangle cannot be placed on the current page.
pub trait Packer<K> {
    fn can_pack(&self, rect: &Rect) -> bool;
    fn pack(&mut self, key: K, rect: &Rect) -> Option<Placement<K>>;
}

/// Pages produced by [`pack_buckets`] and the rotation they were packed with.
#[derive(Debug, Clone)]
pub struct PackedPages {
    pub pages: Vec<Page>,
    pub rotation: RotationChoice,
}

/// Drops assets that can never fit a `page_width x page_height` page.
pub fn retain_packable(
    assets: Vec<ClassifiedAsset>,
    page_width: u32,
    page_height: u32,
    diags: &mut Diagnostics,
) -> Vec<ClassifiedAsset> {
    let empty_page = ShelfPacker::new(page_width, page_height);
    assets
        .into_iter()
        .filter(|a| {
            let fits = empty_page.can_pack(&Rect::new(0, 0, a.width, a.height));
            if !fits {
                diags.push(Diagnostic::Oversized {
                    key: a.key.clone(),
                    width: a.width,
                    height: a.height,
                    page_width,
                    page_height,
                });
            }
            fits
        })
        .collect()
}

/// Packs frozen buckets into fixed-size pages.
///
/// The hue buckets are rotated to start at [`select_rotation`]'s choice, the
/// achromatic buckets follow, and assets are shelf-packed in that order. Page
/// ids count up from 0 in emission order; empty pages are never emitted.
pub fn pack_buckets(
    buckets: BucketSet,
    sizes: &HashMap<String, (u32, u32)>,
    page_width: u32,
    page_height: u32,
    fallback_fraction: f64,
    diags: &mut Diagnostics,
) -> Result<PackedPages> {
    if page_width == 0 || page_height == 0 {
        return Err(AtlasError::InvalidDimensions {
            width: page_width,
            height: page_height,
        });
    }
    let mut shelf = ShelfPacker::new(page_width, page_height);

    let mut total_area = 0u64;
    for bucket in buckets.buckets() {
        for key in bucket {
            let (w, h) = size_of(sizes, key)?;
            if shelf.can_pack(&Rect::new(0, 0, w, h)) {
                total_area += w as u64 * h as u64;
            }
        }
    }
    let page_area = page_width as u64 * page_height as u64;
    let rotation = select_rotation(
        &buckets.hue_sizes(),
        total_area,
        page_area,
        fallback_fraction,
    );
    let order = rotation_order(buckets.hue_bins() as usize, rotation.start);
    debug!(
        start = rotation.start,
        gap = ?rotation.gap,
        min_pages = rotation.min_pages,
        "rotation selected"
    );

    let mut pages: Vec<Page> = Vec::new();
    let mut current: Page = Page::new(0, page_width, page_height);
    for b in order {
        for key in buckets.bucket(b) {
            let (w, h) = size_of(sizes, key)?;
            let rect = Rect::new(0, 0, w, h);
            if !shelf.can_pack(&rect) {
                diags.push(Diagnostic::Oversized {
                    key: key.clone(),
                    width: w,
                    height: h,
                    page_width,
                    page_height,
                });
                continue;
            }
            let placed = match shelf.pack(key.clone(), &rect) {
                Some(p) => p,
                None => {
                    if !current.is_empty() {
                        let next = Page::new(current.id + 1, page_width, page_height);
                        pages.push(std::mem::replace(&mut current, next));
                    }
                    shelf.reset();
                    shelf.pack(key.clone(), &rect).ok_or_else(|| {
                        AtlasError::Invariant(format!("'{key}' does not fit an empty page"))
                    })?
                }
            };
            current.placements.push(Placement { bucket: b, ..placed });
        }
    }
    if !current.is_empty() {
        pages.push(current);
    }

    verify_pages(&pages)?;
    Ok(PackedPages { pages, rotation })
}

fn size_of(sizes: &HashMap<String, (u32, u32)>, key: &str) -> Result<(u32, u32)> {
    match sizes.get(key) {
        Some(&(w, h)) if w > 0 && h > 0 => Ok((w, h)),
        Some(&(w, h)) => Err(AtlasError::InvalidInput(format!(
            "asset '{key}' has zero size {w}x{h}"
        ))),
        None => Err(AtlasError::Invariant(format!("no size recorded for '{key}'"))),
    }
}

/// Checks that every placement lies inside its page and that no two
/// placements on one page overlap.
pub fn verify_pages<K: std::fmt::Display>(pages: &[Page<K>]) -> Result<()> {
    for page in pages {
        let bounds = page.bounds();
        for (i, a) in page.placements.iter().enumerate() {
            if !bounds.contains(&a.frame) {
                return Err(AtlasError::Invariant(format!(
                    "'{}' at {:?} leaves page {}",
                    a.key, a.frame, page.id
                )));
            }
            for b in &page.placements[i + 1..] {
                if a.frame.overlaps(&b.frame) {
                    return Err(AtlasError::Invariant(format!(
                        "'{}' overlaps '{}' on page {}",
                        a.key, b.key, page.id
                    )));
                }
            }
        }
    }
    Ok(())
}
