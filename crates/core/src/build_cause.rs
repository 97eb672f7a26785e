// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build causes: the material changes that justified starting a job run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Visible characters of a revision id before it is trimmed for display.
pub const REVISION_DISPLAY_WIDTH: usize = 12;

/// A single change record from a material.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modification {
    pub revision: String,
    pub comment: String,
    pub user_name: String,
    pub modified_at_ms: u64,
}

crate::builder! {
    pub struct ModificationBuilder => Modification {
        into {
            revision: String = "rev-1",
            comment: String = "a change",
            user_name: String = "committer",
        }
        set {
            modified_at_ms: u64 = 1_000_000,
        }
    }
}

impl Modification {
    pub fn new(
        revision: impl Into<String>,
        comment: impl Into<String>,
        user_name: impl Into<String>,
        modified_at_ms: u64,
    ) -> Self {
        Self {
            revision: revision.into(),
            comment: comment.into(),
            user_name: user_name.into(),
            modified_at_ms,
        }
    }

    /// Revision id trimmed to the display width, with `...` when cut.
    pub fn display_revision(&self) -> String {
        let head = crate::id::short(&self.revision, REVISION_DISPLAY_WIDTH);
        if head.len() < self.revision.len() {
            format!("{head}...")
        } else {
            self.revision.clone()
        }
    }
}

/// A source of changes (a repository, an upstream pipeline).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Material {
    /// Optional user-facing name; empty when the material is unnamed.
    #[serde(default)]
    pub name: String,
    /// Identity of the material's configuration.
    pub fingerprint: String,
}

impl Material {
    pub fn new(name: impl Into<String>, fingerprint: impl Into<String>) -> Self {
        Self { name: name.into(), fingerprint: fingerprint.into() }
    }
}

/// Modifications of one material, latest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialRevision {
    pub material: Material,
    pub modifications: Vec<Modification>,
    /// Whether this material changed in the current evaluation pass.
    #[serde(default)]
    pub changed: bool,
}

impl MaterialRevision {
    pub fn new(material: Material, modifications: Vec<Modification>) -> Self {
        Self { material, modifications, changed: false }
    }

    pub fn changed(mut self, changed: bool) -> Self {
        self.changed = changed;
        self
    }

    pub fn latest_modification(&self) -> Option<&Modification> {
        self.modifications.first()
    }

    pub fn latest_revision(&self) -> Option<&str> {
        self.latest_modification().map(|m| m.revision.as_str())
    }

    /// Same material at the same head revision. Older history is ignored.
    pub fn is_same_as(&self, other: &MaterialRevision) -> bool {
        self.material == other.material && self.latest_revision() == other.latest_revision()
    }
}

/// Ordered set of material revisions feeding one build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialRevisions(pub Vec<MaterialRevision>);

impl MaterialRevisions {
    pub fn new(revisions: Vec<MaterialRevision>) -> Self {
        Self(revisions)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MaterialRevision> {
        self.0.iter()
    }

    pub fn num_changed(&self) -> usize {
        self.0.iter().filter(|r| r.changed).count()
    }

    /// Exactly one revision is flagged changed.
    pub fn has_single_changed(&self) -> bool {
        self.num_changed() == 1
    }

    /// Pairwise, order-sensitive comparison of materials and head revisions.
    pub fn is_same_as(&self, other: &MaterialRevisions) -> bool {
        self.0.len() == other.0.len()
            && self.0.iter().zip(&other.0).all(|(mine, theirs)| mine.is_same_as(theirs))
    }

    /// True when any material here is absent from `original` or sits at a
    /// different head. Material order does not matter.
    pub fn has_changed_since(&self, original: &MaterialRevisions) -> bool {
        self.0.iter().any(|current| {
            match original.0.iter().find(|o| o.material == current.material) {
                Some(previous) => previous.latest_revision() != current.latest_revision(),
                None => true,
            }
        })
    }

    /// The revision a build is attributed to: first changed, else first.
    fn cause_revision(&self) -> Option<&MaterialRevision> {
        self.0.iter().find(|r| r.changed).or_else(|| self.0.first())
    }

    fn cause_modification(&self) -> Option<&Modification> {
        self.cause_revision().and_then(MaterialRevision::latest_modification)
    }

    pub fn build_caused_by(&self) -> String {
        self.cause_modification().map(|m| m.user_name.clone()).unwrap_or_default()
    }

    pub fn build_cause_message(&self) -> String {
        match self.cause_modification() {
            Some(m) => format!("modified by {}", m.user_name),
            None => String::new(),
        }
    }

    pub fn latest_revision(&self) -> Option<&str> {
        self.cause_modification().map(|m| m.revision.as_str())
    }

    pub fn date_of_latest_modification(&self) -> Option<u64> {
        self.cause_modification().map(|m| m.modified_at_ms)
    }

    /// Head revision keyed by material name, skipping unnamed materials.
    pub fn named_revisions(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .filter(|r| !r.material.name.is_empty())
            .filter_map(|r| Some((r.material.name.clone(), r.latest_revision()?.to_string())))
            .collect()
    }

    /// Some material has no modifications recorded.
    pub fn is_missing_modifications(&self) -> bool {
        self.0.iter().any(|r| r.modifications.is_empty())
    }
}

/// Why a job run was started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildCause {
    pub material_revisions: MaterialRevisions,
    pub message: String,
    #[serde(default)]
    pub approver: String,
    #[serde(default)]
    pub forced: bool,
}

impl BuildCause {
    /// Triggered by material changes.
    pub fn create_with_modifications(revisions: MaterialRevisions, approver: impl Into<String>) -> Self {
        let message = revisions.build_cause_message();
        Self { material_revisions: revisions, message, approver: approver.into(), forced: false }
    }

    /// Triggered by a person, regardless of changes.
    pub fn create_manual_forced(revisions: MaterialRevisions, approver: impl Into<String>) -> Self {
        let approver = approver.into();
        let message = if approver.is_empty() {
            "Forced".to_string()
        } else {
            format!("Forced by {approver}")
        };
        Self { material_revisions: revisions, message, approver, forced: true }
    }

    /// Placeholder cause before any modification is known.
    pub fn create_with_empty_modifications() -> Self {
        Self {
            material_revisions: MaterialRevisions::empty(),
            message: String::new(),
            approver: String::new(),
            forced: false,
        }
    }

    /// Whether re-triggering with `other` would build the same thing.
    pub fn is_same(&self, other: &BuildCause) -> bool {
        self.forced == other.forced
            && self.approver == other.approver
            && self.material_revisions.is_same_as(&other.material_revisions)
    }

    pub fn has_single_changed(&self) -> bool {
        self.material_revisions.has_single_changed()
    }
}

#[cfg(test)]
#[path = "build_cause_tests.rs"]
mod tests;
