//! Per-page color coherence metrics.
//!
//! Lower average distance means the assets sharing a page have more similar
//! color histograms. The report is diagnostic only.

use crate::error::{AtlasError, Result};
use crate::model::Page;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write as _;

/// Metrics for a single page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageQuality {
    pub page: usize,
    pub width: u32,
    pub height: u32,
    pub num_assets: usize,
    /// Number of asset pairs that both carried a feature vector.
    pub pairs: usize,
    /// Mean Euclidean distance over those pairs; 0 when there are none.
    pub avg_distance: f64,
}

/// Run-level metrics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QualityReport {
    pub total_pages: usize,
    pub build_time_secs: f64,
    pub pages: Vec<PageQuality>,
}

/// Euclidean distance between two feature vectors of equal length.
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(AtlasError::FeatureLengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt())
}

/// Average pairwise distance on one page; returns `(average, pairs)`.
pub fn page_distance<K>(page: &Page<K>, features: &HashMap<K, Vec<f64>>) -> Result<(f64, usize)>
where
    K: std::hash::Hash + Eq,
{
    let vectors: Vec<Option<&Vec<f64>>> = page
        .placements
        .iter()
        .map(|p| features.get(&p.key))
        .collect();
    let mut total = 0.0;
    let mut pairs = 0usize;
    for i in 0..vectors.len() {
        for j in (i + 1)..vectors.len() {
            if let (Some(a), Some(b)) = (vectors[i], vectors[j]) {
                total += euclidean_distance(a, b)?;
                pairs += 1;
            }
        }
    }
    let avg = if pairs > 0 { total / pairs as f64 } else { 0.0 };
    Ok((avg, pairs))
}

/// Builds the quality report for a finished set of pages.
pub fn report<K>(
    pages: &[Page<K>],
    features: &HashMap<K, Vec<f64>>,
    build_time_secs: f64,
) -> Result<QualityReport>
where
    K: std::hash::Hash + Eq,
{
    let mut out = Vec::with_capacity(pages.len());
    for page in pages {
        let (avg_distance, pairs) = page_distance(page, features)?;
        out.push(PageQuality {
            page: page.id,
            width: page.width,
            height: page.height,
            num_assets: page.placements.len(),
            pairs,
            avg_distance,
        });
    }
    Ok(QualityReport {
        total_pages: pages.len(),
        build_time_secs,
        pages: out,
    })
}

impl QualityReport {
    /// Mean of the per-page averages over pages that had at least one pair.
    pub fn mean_distance(&self) -> f64 {
        let scored: Vec<f64> = self
            .pages
            .iter()
            .filter(|p| p.pairs > 0)
            .map(|p| p.avg_distance)
            .collect();
        if scored.is_empty() {
            0.0
        } else {
            scored.iter().sum::<f64>() / scored.len() as f64
        }
    }

    pub fn summary(&self) -> String {
        let mut s = format!(
            "Total pages: {}\nBuild time (s): {:.2}\n",
            self.total_pages, self.build_time_secs
        );
        for p in &self.pages {
            let _ = writeln!(
                s,
                "Page {}: Size {}x{}, Assets: {}, Avg. histogram distance: {:.2}",
                p.page, p.width, p.height, p.num_assets, p.avg_distance
            );
        }
        s
    }
}
