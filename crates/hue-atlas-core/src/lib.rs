//! Core library for packing images into fixed-size atlas pages grouped by color.
//!
//! - Classification: dominant hue bin, or black/white/gray for low-saturation assets
//! - Buckets: one per hue bin plus three achromatic buckets; manual groups move assets together
//! - Packing: the hue circle is cut at the largest empty run, then assets are shelf-packed
//! - Pipeline: `pack_images` takes in-memory images and returns pages, metadata and a quality report
//!
//! Quick example:
//! ```ignore
//! use image::ImageReader;
//! use hue_atlas_core::{AtlasConfig, InputImage, ManualGroup, pack_images};
//! # fn main() -> anyhow::Result<()> {
//! let a = ImageReader::open("a.png")?.decode()?;
//! let b = ImageReader::open("b.png")?.decode()?;
//! let inputs = vec![
//!   InputImage { key: "a".into(), image: a },
//!   InputImage { key: "b".into(), image: b },
//! ];
//! let groups = vec![ManualGroup::new(["a", "b"])];
//! let cfg = AtlasConfig { page_width: 1024, page_height: 1024, ..Default::default() };
//! let out = pack_images(inputs, &groups, cfg)?;
//! println!("pages: {}", out.pages.len());
//! # Ok(()) }
//! ```

pub mod bucket;
pub mod color;
pub mod compositing;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod export;
pub mod model;
pub mod packer;
pub mod pipeline;
pub mod quality;

pub use bucket::*;
pub use color::*;
pub use config::*;
pub use diagnostics::*;
pub use error::*;
pub use export::*;
pub use model::*;
pub use packer::*;
pub use pipeline::*;
pub use quality::*;

/// Convenience prelude for common types and functions.
/// Importing `hue_atlas_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::bucket::{BucketSet, ClassifiedAsset, GroupRejection, ManualGroup};
    pub use crate::color::{ClassifierParams, ColorClass, ColorProfile, PixelSource};
    pub use crate::config::{AtlasConfig, AtlasConfigBuilder};
    pub use crate::diagnostics::{Diagnostic, Diagnostics};
    pub use crate::model::{Atlas, Meta, PackStats, Page, Placement, Rect};
    pub use crate::packer::{Gap, Packer, RotationChoice, ShelfPacker};
    pub use crate::quality::{PageQuality, QualityReport};
    pub use crate::{
        AssetProfile, InputImage, LayoutItem, LayoutOutput, OutputPage, PackOutput, pack_images,
        pack_layout,
    };
}
