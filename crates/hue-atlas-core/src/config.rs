use serde::{Deserialize, Serialize};

/// Packing and classification configuration.
/// Key notes:
///   - `page_width`/`page_height` are the fixed size of every emitted page
///   - `hue_bins` slices the hue circle; three achromatic buckets are always appended
///   - the classifier thresholds are tunable, defaults are the documented contract
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtlasConfig {
    /// Page width in pixels.
    pub page_width: u32,
    /// Page height in pixels.
    pub page_height: u32,
    /// Number of equal-width hue slices.
    #[serde(default = "default_hue_bins")]
    pub hue_bins: u32,

    /// Pixels with alpha <= this value are skipped by the classifier.
    #[serde(default)]
    pub alpha_threshold: u8,
    /// Saturation at or below this is achromatic.
    #[serde(default = "default_low_saturation")]
    pub low_saturation: f32,
    /// Achromatic value at or below this is black.
    #[serde(default = "default_dark_value")]
    pub dark_value: f32,
    /// Achromatic value at or above this is white.
    #[serde(default = "default_bright_value")]
    pub bright_value: f32,
    /// An achromatic class wins when its share of counted pixels exceeds this fraction.
    #[serde(default = "default_achromatic_majority")]
    pub achromatic_majority: f32,

    /// Rotation start (as a fraction of `hue_bins`) used when no empty hue bucket exists.
    #[serde(default = "default_fallback_rotation_fraction")]
    pub fallback_rotation_fraction: f64,

    /// Keep normalized color histograms per asset for the quality report.
    #[serde(default = "default_keep_histograms")]
    pub keep_histograms: bool,
    /// Classify inputs in parallel when feature "parallel" is on.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    /// Draw red outlines on output pages (debug).
    #[serde(default)]
    pub outlines: bool,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            page_width: 2048,
            page_height: 2048,
            hue_bins: default_hue_bins(),
            alpha_threshold: 0,
            low_saturation: default_low_saturation(),
            dark_value: default_dark_value(),
            bright_value: default_bright_value(),
            achromatic_majority: default_achromatic_majority(),
            fallback_rotation_fraction: default_fallback_rotation_fraction(),
            keep_histograms: default_keep_histograms(),
            parallel: default_parallel(),
            outlines: false,
        }
    }
}

impl AtlasConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if:
    /// - Page dimensions are zero
    /// - `hue_bins` is zero
    /// - A threshold is outside `[0, 1]` or the dark/bright pair is inverted
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::AtlasError;

        if self.page_width == 0 || self.page_height == 0 {
            return Err(AtlasError::InvalidDimensions {
                width: self.page_width,
                height: self.page_height,
            });
        }
        if self.hue_bins == 0 {
            return Err(AtlasError::InvalidConfig("hue_bins must be at least 1".into()));
        }

        for (name, v) in [
            ("low_saturation", self.low_saturation),
            ("dark_value", self.dark_value),
            ("bright_value", self.bright_value),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(AtlasError::InvalidConfig(format!(
                    "{name} ({v}) must be within [0, 1]"
                )));
            }
        }
        if self.dark_value >= self.bright_value {
            return Err(AtlasError::InvalidConfig(format!(
                "dark_value ({}) must be below bright_value ({})",
                self.dark_value, self.bright_value
            )));
        }
        if !(0.0..1.0).contains(&self.achromatic_majority) {
            return Err(AtlasError::InvalidConfig(format!(
                "achromatic_majority ({}) must be within [0, 1)",
                self.achromatic_majority
            )));
        }
        if !(0.0..1.0).contains(&self.fallback_rotation_fraction) {
            return Err(AtlasError::InvalidConfig(format!(
                "fallback_rotation_fraction ({}) must be within [0, 1)",
                self.fallback_rotation_fraction
            )));
        }

        Ok(())
    }

    /// Total bucket count: one per hue bin plus black, white and gray.
    pub fn bucket_count(&self) -> usize {
        self.hue_bins as usize + 3
    }

    /// Classifier view of this configuration.
    pub fn classifier(&self) -> crate::color::ClassifierParams {
        crate::color::ClassifierParams {
            hue_bins: self.hue_bins,
            alpha_threshold: self.alpha_threshold,
            low_saturation: self.low_saturation,
            dark_value: self.dark_value,
            bright_value: self.bright_value,
            achromatic_majority: self.achromatic_majority,
        }
    }
}

fn default_hue_bins() -> u32 {
    36
}
fn default_low_saturation() -> f32 {
    0.15
}
fn default_dark_value() -> f32 {
    0.05
}
fn default_bright_value() -> f32 {
    0.95
}
fn default_achromatic_majority() -> f32 {
    0.5
}
fn default_fallback_rotation_fraction() -> f64 {
    0.95
}
fn default_keep_histograms() -> bool {
    true
}
fn default_parallel() -> bool {
    false
}

/// Builder for `AtlasConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct AtlasConfigBuilder {
    cfg: AtlasConfig,
}

impl AtlasConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: AtlasConfig::default(),
        }
    }
    pub fn with_page_size(mut self, w: u32, h: u32) -> Self {
        self.cfg.page_width = w;
        self.cfg.page_height = h;
        self
    }
    pub fn hue_bins(mut self, v: u32) -> Self {
        self.cfg.hue_bins = v;
        self
    }
    pub fn alpha_threshold(mut self, v: u8) -> Self {
        self.cfg.alpha_threshold = v;
        self
    }
    pub fn low_saturation(mut self, v: f32) -> Self {
        self.cfg.low_saturation = v;
        self
    }
    pub fn dark_value(mut self, v: f32) -> Self {
        self.cfg.dark_value = v;
        self
    }
    pub fn bright_value(mut self, v: f32) -> Self {
        self.cfg.bright_value = v;
        self
    }
    pub fn achromatic_majority(mut self, v: f32) -> Self {
        self.cfg.achromatic_majority = v;
        self
    }
    pub fn fallback_rotation_fraction(mut self, v: f64) -> Self {
        self.cfg.fallback_rotation_fraction = v;
        self
    }
    pub fn keep_histograms(mut self, v: bool) -> Self {
        self.cfg.keep_histograms = v;
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.cfg.parallel = v;
        self
    }
    pub fn outlines(mut self, v: bool) -> Self {
        self.cfg.outlines = v;
        self
    }
    pub fn build(self) -> AtlasConfig {
        self.cfg
    }
}

impl AtlasConfig {
    /// Create a fluent builder for `AtlasConfig`.
    pub fn builder() -> AtlasConfigBuilder {
        AtlasConfigBuilder::new()
    }
}
