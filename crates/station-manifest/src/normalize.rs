//! Model name normalization.
//!
//! Manifest entries sometimes store the model name and revision as a single
//! string. Splitting it is owned by whoever publishes the naming scheme, so
//! the resolver takes the split as an injected [`NameNormalizer`].

/// Splits a stored model name into `(canonical_name, revision)`.
///
/// Implementations must be pure. An empty revision means the name carries
/// none.
pub trait NameNormalizer {
    fn normalize(&self, model_name: &str) -> (String, String);
}

impl<F> NameNormalizer for F
where
    F: Fn(&str) -> (String, String),
{
    fn normalize(&self, model_name: &str) -> (String, String) {
        self(model_name)
    }
}

/// Default normalizer for `name@revision` strings.
///
/// Splits at the last `@`. A name without one is returned whole with an
/// empty revision.
///
/// ```rust
/// use station_manifest::{NameNormalizer, RevisionSuffix};
///
/// let (name, revision) = RevisionSuffix.normalize("vikhyatk/moondream2@2025-01-09");
/// assert_eq!(name, "vikhyatk/moondream2");
/// assert_eq!(revision, "2025-01-09");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RevisionSuffix;

impl NameNormalizer for RevisionSuffix {
    fn normalize(&self, model_name: &str) -> (String, String) {
        match model_name.rsplit_once('@') {
            Some((name, revision)) => (name.to_string(), revision.to_string()),
            None => (model_name.to_string(), String::new()),
        }
    }
}
