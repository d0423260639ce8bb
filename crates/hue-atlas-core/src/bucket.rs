//! Color buckets and manual grouping.
//!
//! Buckets `0..hue_bins` hold assets by dominant hue; black, white and gray
//! follow at `hue_bins`, `hue_bins + 1` and `hue_bins + 2`. Every asset id lives
//! in exactly one bucket; manual groups move ids, they never copy them.

use crate::color::ColorClass;
use crate::diagnostics::{Diagnostic, Diagnostics};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

/// An asset after classification, as seen by the bucket builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedAsset {
    pub key: String,
    pub width: u32,
    pub height: u32,
    pub class: ColorClass,
}

/// Ids that must end up in the same bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualGroup {
    #[serde(default)]
    pub name: Option<String>,
    pub members: Vec<String>,
}

impl ManualGroup {
    pub fn new<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: None,
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    pub fn named<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: Some(name.into()),
            ..Self::new(members)
        }
    }

    /// Parses a comma separated id list, e.g. `"a, b c"` is `["a", "b c"]`.
    /// Ids are trimmed and empty entries are skipped.
    pub fn parse_list(s: &str) -> Self {
        Self::new(s.split(',').map(str::trim).filter(|t| !t.is_empty()))
    }

    /// Name used in diagnostics.
    pub fn label(&self) -> String {
        match &self.name {
            Some(n) => n.clone(),
            None => self.members.join(","),
        }
    }
}

/// Why a manual group was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupRejection {
    /// Fewer than two members resolved to bucketed assets.
    TooFewMembers { resolved: usize },
    /// A member was already moved by an earlier group.
    AlreadyGrouped { key: String },
}

impl fmt::Display for GroupRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupRejection::TooFewMembers { resolved } => {
                write!(f, "only {resolved} member(s) resolved, need at least 2")
            }
            GroupRejection::AlreadyGrouped { key } => {
                write!(f, "asset '{key}' already belongs to an earlier group")
            }
        }
    }
}

/// Ordered buckets of asset ids.
#[derive(Debug, Clone)]
pub struct BucketSet {
    hue_bins: u32,
    buckets: Vec<Vec<String>>,
    location: HashMap<String, usize>,
    grouped: HashSet<String>,
}

impl BucketSet {
    /// Empty set with `hue_bins + 3` buckets.
    pub fn new(hue_bins: u32) -> Self {
        Self {
            hue_bins,
            buckets: vec![Vec::new(); hue_bins as usize + 3],
            location: HashMap::new(),
            grouped: HashSet::new(),
        }
    }

    /// Builds buckets in input order. Undefined, out-of-range and duplicate
    /// assets are skipped with a diagnostic.
    pub fn build(assets: &[ClassifiedAsset], hue_bins: u32, diags: &mut Diagnostics) -> Self {
        let mut set = Self::new(hue_bins);
        for a in assets {
            set.insert(&a.key, a.class, diags);
        }
        set
    }

    /// Appends one asset to the bucket of its class. Returns false if skipped.
    pub fn insert(&mut self, key: &str, class: ColorClass, diags: &mut Diagnostics) -> bool {
        if self.location.contains_key(key) {
            diags.push(Diagnostic::DuplicateAsset { key: key.into() });
            return false;
        }
        let Some(idx) = class.bucket_index(self.hue_bins) else {
            match class {
                ColorClass::Hue(hue) => diags.push(Diagnostic::ClassOutOfRange {
                    key: key.into(),
                    hue,
                    hue_bins: self.hue_bins,
                }),
                _ => diags.push(Diagnostic::UndefinedColor { key: key.into() }),
            }
            return false;
        };
        self.buckets[idx].push(key.to_string());
        self.location.insert(key.to_string(), idx);
        true
    }

    pub fn hue_bins(&self) -> u32 {
        self.hue_bins
    }

    /// Number of buckets (`hue_bins + 3`).
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.location.is_empty()
    }

    pub fn bucket(&self, idx: usize) -> &[String] {
        &self.buckets[idx]
    }

    pub fn buckets(&self) -> &[Vec<String>] {
        &self.buckets
    }

    /// Bucket index holding `key`.
    pub fn bucket_of(&self, key: &str) -> Option<usize> {
        self.location.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.location.contains_key(key)
    }

    /// Total number of bucketed assets.
    pub fn asset_count(&self) -> usize {
        self.location.len()
    }

    /// Asset count per bucket.
    pub fn sizes(&self) -> Vec<usize> {
        self.buckets.iter().map(Vec::len).collect()
    }

    /// Asset count per hue bucket only.
    pub fn hue_sizes(&self) -> Vec<usize> {
        self.buckets[..self.hue_bins as usize]
            .iter()
            .map(Vec::len)
            .collect()
    }

    /// Moves every resolvable member of `group` into the bucket carrying the
    /// largest share of the group's pixel area (lowest index on ties), appended
    /// in declaration order. Returns the destination bucket.
    ///
    /// Members not present in any bucket are ignored with a diagnostic. The
    /// whole group is rejected if a member was already grouped or fewer than
    /// two members resolve.
    pub fn apply_manual_group(
        &mut self,
        group: &ManualGroup,
        sizes: &HashMap<String, (u32, u32)>,
        diags: &mut Diagnostics,
    ) -> Result<usize, GroupRejection> {
        let label = group.label();
        let mut seen: HashSet<&str> = HashSet::new();
        let members: Vec<&str> = group
            .members
            .iter()
            .map(String::as_str)
            .filter(|k| seen.insert(*k))
            .collect();

        let result = self.resolve_group(&label, &members, sizes, diags);
        let (dest, resolved) = match result {
            Ok(v) => v,
            Err(reason) => {
                diags.push(Diagnostic::GroupRejected {
                    group: label,
                    reason: reason.to_string(),
                });
                return Err(reason);
            }
        };

        // detach from origins, one retain per affected bucket
        let mut by_origin: BTreeMap<usize, HashSet<&str>> = BTreeMap::new();
        for &k in &resolved {
            if let Some(&origin) = self.location.get(k) {
                by_origin.entry(origin).or_default().insert(k);
            }
        }
        for (origin, keys) in &by_origin {
            self.buckets[*origin].retain(|k| !keys.contains(k.as_str()));
        }
        for &k in &resolved {
            self.buckets[dest].push(k.to_string());
            self.location.insert(k.to_string(), dest);
            self.grouped.insert(k.to_string());
        }

        diags.push(Diagnostic::GroupApplied {
            group: label,
            bucket: dest,
            members: resolved.len(),
        });
        Ok(dest)
    }

    fn resolve_group<'g>(
        &self,
        label: &str,
        members: &[&'g str],
        sizes: &HashMap<String, (u32, u32)>,
        diags: &mut Diagnostics,
    ) -> Result<(usize, Vec<&'g str>), GroupRejection> {
        if let Some(k) = members.iter().find(|k| self.grouped.contains(**k)) {
            return Err(GroupRejection::AlreadyGrouped {
                key: (*k).to_string(),
            });
        }

        let mut resolved: Vec<&str> = Vec::with_capacity(members.len());
        for &k in members {
            if self.location.contains_key(k) {
                resolved.push(k);
            } else {
                diags.push(Diagnostic::UnresolvedGroupMember {
                    group: label.to_string(),
                    key: k.to_string(),
                });
            }
        }
        if resolved.len() < 2 {
            return Err(GroupRejection::TooFewMembers {
                resolved: resolved.len(),
            });
        }

        let mut area_by_bucket: BTreeMap<usize, u64> = BTreeMap::new();
        for &k in &resolved {
            let area = sizes
                .get(k)
                .map(|&(w, h)| w as u64 * h as u64)
                .unwrap_or(0);
            if let Some(&b) = self.location.get(k) {
                *area_by_bucket.entry(b).or_default() += area;
            }
        }
        let mut dest: Option<(usize, u64)> = None;
        for (&b, &area) in &area_by_bucket {
            if dest.is_none_or(|(_, best)| area > best) {
                dest = Some((b, area));
            }
        }
        // resolved.len() >= 2 guarantees at least one bucket
        let dest = dest.map(|(b, _)| b).unwrap_or_default();
        Ok((dest, resolved))
    }

    /// Applies groups in declaration order; returns how many were accepted.
    pub fn apply_manual_groups(
        &mut self,
        groups: &[ManualGroup],
        sizes: &HashMap<String, (u32, u32)>,
        diags: &mut Diagnostics,
    ) -> usize {
        groups
            .iter()
            .filter(|g| self.apply_manual_group(g, sizes, diags).is_ok())
            .count()
    }
}
