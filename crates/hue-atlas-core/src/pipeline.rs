use crate::bucket::{BucketSet, ClassifiedAsset, ManualGroup};
use crate::color::{self, ColorClass, ColorProfile};
use crate::compositing::render_page;
use crate::config::AtlasConfig;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{AtlasError, Result};
use crate::model::{Atlas, Meta, Page};
use crate::packer::{pack_buckets, retain_packable};
use crate::quality::{self, QualityReport};
use image::{DynamicImage, RgbaImage};
use std::collections::{HashMap, HashSet};
use std::time::Instant;
use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// In-memory image to pack (key + decoded image).
pub struct InputImage {
    pub key: String,
    pub image: DynamicImage,
}

/// Layout-only input: size plus a precomputed class and optional feature vector.
#[derive(Debug, Clone)]
pub struct LayoutItem<K = String> {
    pub key: K,
    pub w: u32,
    pub h: u32,
    pub class: ColorClass,
    pub features: Option<Vec<f64>>,
}

/// Classification result for one input, in input order.
#[derive(Debug, Clone)]
pub struct AssetProfile {
    pub key: String,
    pub width: u32,
    pub height: u32,
    pub profile: ColorProfile,
}

/// Output RGBA page and its logical page record.
pub struct OutputPage {
    pub page: Page,
    pub rgba: RgbaImage,
}

/// Output of a packing run over images.
pub struct PackOutput {
    pub atlas: Atlas,
    pub pages: Vec<OutputPage>,
    pub profiles: Vec<AssetProfile>,
    pub report: QualityReport,
    pub diagnostics: Diagnostics,
}

impl PackOutput {
    /// Computes packing statistics for this output.
    pub fn stats(&self) -> crate::model::PackStats {
        self.atlas.stats()
    }
}

/// Output of a layout-only run.
pub struct LayoutOutput {
    pub atlas: Atlas,
    pub report: QualityReport,
    pub diagnostics: Diagnostics,
}

#[instrument(skip_all)]
/// Classifies, buckets, groups and packs `inputs`, then renders RGBA pages.
///
/// Notes:
/// - Output is deterministic: classification results keep input order even when parallel.
/// - Undefined, oversized and duplicate inputs are skipped and reported in `diagnostics`.
/// - `groups` are applied in declaration order before packing.
pub fn pack_images(
    inputs: Vec<InputImage>,
    groups: &[ManualGroup],
    cfg: AtlasConfig,
) -> Result<PackOutput> {
    cfg.validate()?;
    if inputs.is_empty() {
        return Err(AtlasError::Empty);
    }
    let start = Instant::now();
    let mut diags = Diagnostics::new();

    let mut keys: HashSet<String> = HashSet::with_capacity(inputs.len());
    let mut prepared: Vec<(String, RgbaImage)> = Vec::with_capacity(inputs.len());
    for inp in inputs {
        if !keys.insert(inp.key.clone()) {
            diags.push(Diagnostic::DuplicateAsset { key: inp.key });
            continue;
        }
        let rgba = inp.image.to_rgba8();
        let (w, h) = rgba.dimensions();
        if w == 0 || h == 0 {
            return Err(AtlasError::InvalidInput(format!(
                "image '{}' has zero size {w}x{h}",
                inp.key
            )));
        }
        prepared.push((inp.key, rgba));
    }

    let profiles = classify_all(&prepared, &cfg);
    let profiles: Vec<AssetProfile> = prepared
        .iter()
        .zip(profiles)
        .map(|((key, rgba), profile)| AssetProfile {
            key: key.clone(),
            width: rgba.width(),
            height: rgba.height(),
            profile,
        })
        .collect();
    for p in &profiles {
        debug!(key = %p.key, w = p.width, h = p.height, class = %p.profile.class, "classified");
    }

    let assets: Vec<ClassifiedAsset> = profiles
        .iter()
        .map(|p| ClassifiedAsset {
            key: p.key.clone(),
            width: p.width,
            height: p.height,
            class: p.profile.class,
        })
        .collect();
    let features: HashMap<String, Vec<f64>> = profiles
        .iter()
        .filter(|p| p.profile.counted > 0)
        .map(|p| (p.key.clone(), p.profile.histogram.clone()))
        .collect();

    let atlas = pack_classified(assets, groups, &cfg, &mut diags)?;
    let report = quality::report(&atlas.pages, &features, start.elapsed().as_secs_f64())?;

    let sources: HashMap<String, RgbaImage> = prepared.into_iter().collect();
    let pages: Vec<OutputPage> = atlas
        .pages
        .iter()
        .map(|page| OutputPage {
            page: page.clone(),
            rgba: render_page(page, &sources, cfg.outlines),
        })
        .collect();

    let profiles = if cfg.keep_histograms {
        profiles
    } else {
        profiles
            .into_iter()
            .map(|mut p| {
                p.profile.histogram.clear();
                p
            })
            .collect()
    };

    info!(
        pages = pages.len(),
        warnings = diags.warning_count(),
        "packing finished"
    );
    Ok(PackOutput {
        atlas,
        pages,
        profiles,
        report,
        diagnostics: diags,
    })
}

/// Classifies every prepared image; results keep input order.
fn classify_all(prepared: &[(String, RgbaImage)], cfg: &AtlasConfig) -> Vec<ColorProfile> {
    let params = cfg.classifier();

    #[cfg(feature = "parallel")]
    {
        if cfg.parallel {
            return prepared
                .par_iter()
                .map(|(_, rgba)| color::profile(rgba, &params))
                .collect();
        }
    }

    prepared
        .iter()
        .map(|(_, rgba)| color::profile(rgba, &params))
        .collect()
}

#[instrument(skip_all)]
/// Packs sizes with precomputed classes into pages without touching pixel data.
pub fn pack_layout<K: Into<String>>(
    items: Vec<LayoutItem<K>>,
    groups: &[ManualGroup],
    cfg: AtlasConfig,
) -> Result<LayoutOutput> {
    cfg.validate()?;
    if items.is_empty() {
        return Err(AtlasError::Empty);
    }
    let start = Instant::now();
    let mut diags = Diagnostics::new();

    let mut keys: HashSet<String> = HashSet::with_capacity(items.len());
    let mut assets: Vec<ClassifiedAsset> = Vec::with_capacity(items.len());
    let mut features: HashMap<String, Vec<f64>> = HashMap::new();
    for it in items {
        let key: String = it.key.into();
        if !keys.insert(key.clone()) {
            diags.push(Diagnostic::DuplicateAsset { key });
            continue;
        }
        if it.w == 0 || it.h == 0 {
            return Err(AtlasError::InvalidInput(format!(
                "item '{key}' has zero size {}x{}",
                it.w, it.h
            )));
        }
        if let Some(f) = it.features {
            features.insert(key.clone(), f);
        }
        assets.push(ClassifiedAsset {
            key,
            width: it.w,
            height: it.h,
            class: it.class,
        });
    }

    let atlas = pack_classified(assets, groups, &cfg, &mut diags)?;
    let report = quality::report(&atlas.pages, &features, start.elapsed().as_secs_f64())?;
    Ok(LayoutOutput {
        atlas,
        report,
        diagnostics: diags,
    })
}

/// Shared tail of both entry points: size filter, buckets, groups, packing.
fn pack_classified(
    assets: Vec<ClassifiedAsset>,
    groups: &[ManualGroup],
    cfg: &AtlasConfig,
    diags: &mut Diagnostics,
) -> Result<Atlas> {
    let assets = retain_packable(assets, cfg.page_width, cfg.page_height, diags);
    let sizes: HashMap<String, (u32, u32)> = assets
        .iter()
        .map(|a| (a.key.clone(), (a.width, a.height)))
        .collect();

    let mut buckets = BucketSet::build(&assets, cfg.hue_bins, diags);
    let accepted = buckets.apply_manual_groups(groups, &sizes, diags);
    debug!(
        assets = buckets.asset_count(),
        groups = groups.len(),
        accepted,
        "buckets ready"
    );

    let packed = pack_buckets(
        buckets,
        &sizes,
        cfg.page_width,
        cfg.page_height,
        cfg.fallback_rotation_fraction,
        diags,
    )?;

    let meta = Meta {
        schema_version: "1".into(),
        app: "hue-atlas".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        format: "RGBA8888".into(),
        page_size: (cfg.page_width, cfg.page_height),
        hue_bins: cfg.hue_bins,
        rotation_start: packed.rotation.start,
    };
    Ok(Atlas {
        pages: packed.pages,
        meta,
    })
}
