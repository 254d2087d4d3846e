//! # Resolution Engine
//!
//! Selects which model and inference client a station should run from an
//! already loaded [`Manifest`]. Every query here is a pure read: nothing
//! touches the network or the filesystem, and "no data" is reported as
//! `None`.
//!
//! ## Latest model policy
//!
//! 1. Flatten all families into one mapping keyed by effective revision.
//!    When two families produce the same revision, the family that comes
//!    later in the document wins, while the revision keeps the position of
//!    its first appearance.
//! 2. Group revisions by numeric signature (see [`crate::version`]).
//! 3. Take the group with the greatest signature.
//! 4. Within it prefer, in order: a revision containing `"4bit"`, a revision
//!    made only of digits and hyphens, the first revision encountered.
//!
//! ## Latest inference client policy
//!
//! The maximum version key under [`compare_versions`]; among equal versions
//! the first declared wins.

use crate::models::{LatestInferenceClient, Manifest, ModelEntry, ResolvedModel};
use crate::normalize::NameNormalizer;
use crate::version::{compare_versions, is_pure_numeric, is_quantized, numeric_signature};
use indexmap::IndexMap;
use std::cmp::Ordering;
use tracing::debug;

/// A model entry together with where it was found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatModel<'a> {
    pub family: &'a str,
    pub key: &'a str,
    pub entry: &'a ModelEntry,
}

/// Flattens the two-level `models` mapping into one keyed by effective
/// revision, with last-write-wins on collisions.
pub fn flatten_models(manifest: &Manifest) -> IndexMap<&str, FlatModel<'_>> {
    let mut flat = IndexMap::new();

    for (family, entries) in manifest.models() {
        for (key, entry) in entries {
            let revision = entry.effective_revision(key);
            let previous = flat.insert(
                revision,
                FlatModel {
                    family,
                    key,
                    entry,
                },
            );
            if let Some(previous) = previous {
                debug!(
                    "Revision '{}' in family '{}' shadows family '{}'",
                    revision, family, previous.family
                );
            }
        }
    }

    flat
}

/// Returns the effective revision and entry of the latest model.
pub fn latest_model_revision(manifest: &Manifest) -> Option<(&str, &ModelEntry)> {
    let flat = flatten_models(manifest);

    let mut groups: IndexMap<Vec<u64>, Vec<&str>> = IndexMap::new();
    for &revision in flat.keys() {
        groups
            .entry(numeric_signature(revision))
            .or_default()
            .push(revision);
    }

    let (signature, candidates) = groups.iter().max_by(|a, b| a.0.cmp(b.0))?;
    let chosen = pick_candidate(candidates)?;

    debug!(
        "Latest model revision '{}' (signature {:?}, {} candidates)",
        chosen,
        signature,
        candidates.len()
    );

    flat.get(chosen).map(|model| (chosen, model.entry))
}

/// Returns the latest model entry, or `None` when no models are declared.
pub fn latest_model(manifest: &Manifest) -> Option<&ModelEntry> {
    latest_model_revision(manifest).map(|(_, entry)| entry)
}

fn pick_candidate<'a>(candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .find(|rev| is_quantized(rev))
        .or_else(|| candidates.iter().find(|rev| is_pure_numeric(rev)))
        .or_else(|| candidates.first())
        .copied()
}

/// Returns the newest inference client, or `None` when none are declared.
pub fn latest_inference_client(manifest: &Manifest) -> Option<LatestInferenceClient<'_>> {
    let mut best: Option<LatestInferenceClient<'_>> = None;

    for (version, entry) in manifest.inference_clients() {
        let newer = match &best {
            Some(current) => compare_versions(version, current.version) == Ordering::Greater,
            None => true,
        };
        if newer {
            best = Some(LatestInferenceClient { version, entry });
        }
    }

    best
}

/// Looks a model up by exact effective revision across all families.
///
/// The stored model name is split by `normalizer`; when it carries no
/// revision of its own the effective revision is reported instead.
pub fn get_model<'a>(
    manifest: &'a Manifest,
    revision: &str,
    normalizer: &dyn NameNormalizer,
) -> Option<ResolvedModel<'a>> {
    let flat = flatten_models(manifest);
    let found = flat.get(revision)?;

    let (model_name, embedded) = normalizer.normalize(found.entry.model_name());
    debug!("Getting model {} with revision {}", model_name, embedded);

    let revision = if embedded.is_empty() {
        found.entry.effective_revision(found.key).to_string()
    } else {
        embedded
    };

    Some(ResolvedModel {
        revision,
        model: found.entry,
        model_name,
    })
}

impl Manifest {
    /// See [`latest_model`].
    pub fn latest_model(&self) -> Option<&ModelEntry> {
        latest_model(self)
    }

    /// See [`latest_inference_client`].
    pub fn latest_inference_client(&self) -> Option<LatestInferenceClient<'_>> {
        latest_inference_client(self)
    }

    /// See [`get_model`].
    pub fn get_model<'a>(
        &'a self,
        revision: &str,
        normalizer: &dyn NameNormalizer,
    ) -> Option<ResolvedModel<'a>> {
        get_model(self, revision, normalizer)
    }
}
