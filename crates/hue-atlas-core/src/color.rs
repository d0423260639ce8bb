//! Dominant-color classification.
//!
//! Every opaque pixel is converted to HSV. Low-saturation pixels count towards
//! one of the achromatic classes (black, white, gray); all others land in one of
//! `hue_bins` equal slices of the hue circle. The asset's class is the achromatic
//! class holding a strict majority, otherwise the most populated hue bin.

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a single asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorClass {
    /// Index of the dominant hue bin.
    Hue(u32),
    Black,
    White,
    Gray,
    /// No countable pixels (e.g. fully transparent).
    Undefined,
}

impl ColorClass {
    /// Bucket index for this class, `None` for `Undefined` or a hue index outside `hue_bins`.
    pub fn bucket_index(&self, hue_bins: u32) -> Option<usize> {
        let bins = hue_bins as usize;
        match *self {
            ColorClass::Hue(h) if h < hue_bins => Some(h as usize),
            ColorClass::Hue(_) => None,
            ColorClass::Black => Some(bins),
            ColorClass::White => Some(bins + 1),
            ColorClass::Gray => Some(bins + 2),
            ColorClass::Undefined => None,
        }
    }
}

impl fmt::Display for ColorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorClass::Hue(h) => write!(f, "hue {h}"),
            ColorClass::Black => f.write_str("black"),
            ColorClass::White => f.write_str("white"),
            ColorClass::Gray => f.write_str("gray"),
            ColorClass::Undefined => f.write_str("undefined"),
        }
    }
}

/// Read-only RGBA pixel access for the classifier.
pub trait PixelSource {
    fn dimensions(&self) -> (u32, u32);
    fn pixel(&self, x: u32, y: u32) -> [u8; 4];
}

impl PixelSource for RgbaImage {
    fn dimensions(&self) -> (u32, u32) {
        RgbaImage::dimensions(self)
    }
    fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.get_pixel(x, y).0
    }
}

impl<P: PixelSource + ?Sized> PixelSource for &P {
    fn dimensions(&self) -> (u32, u32) {
        (**self).dimensions()
    }
    fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        (**self).pixel(x, y)
    }
}

/// Thresholds used by [`classify`] and [`profile`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierParams {
    pub hue_bins: u32,
    pub alpha_threshold: u8,
    pub low_saturation: f32,
    pub dark_value: f32,
    pub bright_value: f32,
    pub achromatic_majority: f32,
}

impl Default for ClassifierParams {
    fn default() -> Self {
        crate::config::AtlasConfig::default().classifier()
    }
}

/// Classification plus the normalized histogram it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorProfile {
    pub class: ColorClass,
    /// `hue_bins` hue shares followed by black, white and gray shares.
    pub histogram: Vec<f64>,
    /// Number of pixels that were not skipped as transparent.
    pub counted: u64,
}

/// Converts 8-bit RGB to HSV: hue in degrees `[0, 360)`, saturation and value in `[0, 1]`.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    let rf = r as f32 / 255.0;
    let gf = g as f32 / 255.0;
    let bf = b as f32 / 255.0;

    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let d = max - min;
    let v = max;
    let s = if max == 0.0 { 0.0 } else { d / max };

    let h = if d == 0.0 {
        0.0
    } else if max == rf {
        60.0 * (((gf - bf) / d) % 6.0)
    } else if max == gf {
        60.0 * (((bf - rf) / d) + 2.0)
    } else {
        60.0 * (((rf - gf) / d) + 4.0)
    };
    let h = if h < 0.0 { h + 360.0 } else { h };
    // -0.0 % 6 style edge cases can land exactly on 360
    let h = if h >= 360.0 { h - 360.0 } else { h };
    (h, s, v)
}

/// Hue bin for a hue angle, clamped to the last bin.
pub fn hue_bin(hue: f32, hue_bins: u32) -> u32 {
    let bin = ((hue / 360.0) * hue_bins as f32).floor();
    if bin <= 0.0 {
        0
    } else {
        (bin as u32).min(hue_bins.saturating_sub(1))
    }
}

struct Counts {
    hue: Vec<u64>,
    black: u64,
    white: u64,
    gray: u64,
    counted: u64,
}

fn count_pixels<P: PixelSource + ?Sized>(pixels: &P, params: &ClassifierParams) -> Counts {
    let mut counts = Counts {
        hue: vec![0; params.hue_bins as usize],
        black: 0,
        white: 0,
        gray: 0,
        counted: 0,
    };
    if params.hue_bins == 0 {
        return counts;
    }
    let (w, h) = pixels.dimensions();
    for y in 0..h {
        for x in 0..w {
            let [r, g, b, a] = pixels.pixel(x, y);
            if a <= params.alpha_threshold {
                continue;
            }
            counts.counted += 1;
            let (hue, s, v) = rgb_to_hsv(r, g, b);
            if s <= params.low_saturation {
                if v <= params.dark_value {
                    counts.black += 1;
                } else if v >= params.bright_value {
                    counts.white += 1;
                } else {
                    counts.gray += 1;
                }
                continue;
            }
            counts.hue[hue_bin(hue, params.hue_bins) as usize] += 1;
        }
    }
    counts
}

fn decide(counts: &Counts, params: &ClassifierParams) -> ColorClass {
    if counts.counted == 0 {
        return ColorClass::Undefined;
    }
    let limit = counts.counted as f64 * params.achromatic_majority as f64;
    if counts.black as f64 > limit {
        return ColorClass::Black;
    }
    if counts.white as f64 > limit {
        return ColorClass::White;
    }
    if counts.gray as f64 > limit {
        return ColorClass::Gray;
    }

    // strict `>` keeps the lowest index on ties
    let mut best: Option<(usize, u64)> = None;
    for (i, &c) in counts.hue.iter().enumerate() {
        if c > 0 && best.is_none_or(|(_, bc)| c > bc) {
            best = Some((i, c));
        }
    }
    if let Some((i, _)) = best {
        return ColorClass::Hue(i as u32);
    }

    // only achromatic pixels, none with a majority
    let mut class = ColorClass::Black;
    let mut top = counts.black;
    if counts.white > top {
        class = ColorClass::White;
        top = counts.white;
    }
    if counts.gray > top {
        class = ColorClass::Gray;
    }
    class
}

/// Classifies one asset by its dominant color.
pub fn classify<P: PixelSource + ?Sized>(pixels: &P, params: &ClassifierParams) -> ColorClass {
    decide(&count_pixels(pixels, params), params)
}

/// Classifies one asset and keeps its normalized color histogram.
pub fn profile<P: PixelSource + ?Sized>(pixels: &P, params: &ClassifierParams) -> ColorProfile {
    let counts = count_pixels(pixels, params);
    let class = decide(&counts, params);
    let mut histogram: Vec<f64> = Vec::with_capacity(counts.hue.len() + 3);
    histogram.extend(counts.hue.iter().map(|&c| c as f64));
    histogram.extend([counts.black as f64, counts.white as f64, counts.gray as f64]);
    if counts.counted > 0 {
        let total = counts.counted as f64;
        for v in histogram.iter_mut() {
            *v /= total;
        }
    }
    ColorProfile {
        class,
        histogram,
        counted: counts.counted,
    }
}
