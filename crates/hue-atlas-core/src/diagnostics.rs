use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

/// A recoverable problem or notable decision reported during a run.
/// None of these abort packing; the offending item is skipped.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// The same id appeared more than once in the input list; the later one was skipped.
    DuplicateAsset { key: String },
    /// No countable pixels; the asset is not packed.
    UndefinedColor { key: String },
    /// A hue class outside `0..hue_bins`.
    ClassOutOfRange { key: String, hue: u32, hue_bins: u32 },
    /// Asset larger than the page in at least one dimension.
    Oversized {
        key: String,
        width: u32,
        height: u32,
        page_width: u32,
        page_height: u32,
    },
    /// A manual group referenced an id that is not in any bucket.
    UnresolvedGroupMember { group: String, key: String },
    /// A manual group was skipped as a whole.
    GroupRejected { group: String, reason: String },
    /// A manual group moved its members into one bucket.
    GroupApplied {
        group: String,
        bucket: usize,
        members: usize,
    },
}

impl Diagnostic {
    /// Informational entries record decisions rather than skipped input.
    pub fn is_info(&self) -> bool {
        matches!(self, Diagnostic::GroupApplied { .. })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DuplicateAsset { key } => write!(f, "duplicate asset id '{key}' skipped"),
            Diagnostic::UndefinedColor { key } => {
                write!(f, "asset '{key}' has no classifiable pixels; not packed")
            }
            Diagnostic::ClassOutOfRange { key, hue, hue_bins } => write!(
                f,
                "asset '{key}' has hue bin {hue} outside 0..{hue_bins}; not packed"
            ),
            Diagnostic::Oversized {
                key,
                width,
                height,
                page_width,
                page_height,
            } => write!(
                f,
                "asset '{key}' ({width}x{height}) does not fit a {page_width}x{page_height} page; dropped"
            ),
            Diagnostic::UnresolvedGroupMember { group, key } => {
                write!(f, "group '{group}': unknown or dropped asset '{key}' ignored")
            }
            Diagnostic::GroupRejected { group, reason } => {
                write!(f, "group '{group}' rejected: {reason}")
            }
            Diagnostic::GroupApplied {
                group,
                bucket,
                members,
            } => write!(f, "group '{group}': {members} assets moved to bucket {bucket}"),
        }
    }
}

/// Collects diagnostics in emission order and mirrors each one to `tracing`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, d: Diagnostic) {
        if d.is_info() {
            info!(diagnostic = %d);
        } else {
            warn!(diagnostic = %d);
        }
        self.entries.push(d);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of warnings (entries that skipped input).
    pub fn warning_count(&self) -> usize {
        self.entries.iter().filter(|d| !d.is_info()).count()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;
    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
