//! # Version Comparator
//!
//! Pure ordering helpers for the two string formats the manifest uses:
//!
//! - **Model revisions** (`"2025-01-09"`, `"2025-04-14-4bit"`, `"v2-int8"`)
//!   are ordered by their *numeric signature*: every maximal run of ASCII
//!   digits, parsed as an integer, in order of appearance. Signatures compare
//!   as tuples, so `[2025, 4, 14]` beats `[2025, 1, 9]` and a prefix loses to
//!   any extension of itself. Revisions without digits have the empty
//!   signature, which sorts below everything else.
//!
//! - **Inference client versions** (`"1.2.0"`, `"v0.3.0-rc1"`) are parsed
//!   into [`Version`] components and compared component-wise, numerically
//!   when both sides are numeric and as text otherwise. Strings that do not
//!   parse order below every parseable version.
//!
//! ## Grammar
//!
//! ```text
//! version    := ["v" | "V"] component (separator component)*
//! separator  := "." | "-" | "+" | "_"
//! component  := [A-Za-z0-9]+
//! ```

use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

/// Substring that marks a quantized revision preferred by the tie-break.
pub const QUANTIZED_MARKER: &str = "4bit";

fn digit_runs() -> &'static Regex {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    DIGITS.get_or_init(|| Regex::new(r"[0-9]+").expect("digit run pattern is valid"))
}

/// Extracts the numeric signature of a revision string.
///
/// Runs too long for a `u64` saturate to `u64::MAX` so they still sort
/// above every representable value.
///
/// # Example
///
/// ```rust
/// use station_manifest::version::numeric_signature;
///
/// assert_eq!(numeric_signature("2025-04-14-4bit"), vec![2025, 4, 14, 4]);
/// assert!(numeric_signature("latest").is_empty());
/// ```
pub fn numeric_signature(revision: &str) -> Vec<u64> {
    digit_runs()
        .find_iter(revision)
        .map(|run| run.as_str().parse::<u64>().unwrap_or(u64::MAX))
        .collect()
}

/// Returns true if the revision carries the quantized marker.
pub fn is_quantized(revision: &str) -> bool {
    revision.contains(QUANTIZED_MARKER)
}

/// Returns true if the revision consists solely of digits and hyphens.
///
/// The empty string qualifies: it has no alphabetic qualifier.
pub fn is_pure_numeric(revision: &str) -> bool {
    revision.chars().all(|c| c.is_ascii_digit() || c == '-')
}

/// Compares two revisions by numeric signature only.
pub fn compare_revisions(a: &str, b: &str) -> Ordering {
    numeric_signature(a).cmp(&numeric_signature(b))
}

/// A single dot/dash separated piece of a [`Version`].
#[derive(Debug, Clone)]
enum Component {
    Numeric { value: u64, text: String },
    Text(String),
}

impl Component {
    fn parse(text: &str) -> Self {
        match text.parse::<u64>() {
            Ok(value) if text.bytes().all(|b| b.is_ascii_digit()) => Component::Numeric {
                value,
                text: text.to_string(),
            },
            _ => Component::Text(text.to_string()),
        }
    }

    fn as_str(&self) -> &str {
        match self {
            Component::Numeric { text, .. } => text,
            Component::Text(text) => text,
        }
    }
}

impl Ord for Component {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Component::Numeric { value: a, .. }, Component::Numeric { value: b, .. }) => a.cmp(b),
            _ => self.as_str().cmp(other.as_str()),
        }
    }
}

impl PartialOrd for Component {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Component {}

/// A parsed inference client version.
///
/// # Example
///
/// ```rust
/// use station_manifest::version::Version;
///
/// let a = Version::parse("1.10.0").unwrap();
/// let b = Version::parse("1.3.0").unwrap();
/// assert!(a > b);
/// ```
///
/// Equality follows the ordering: `"v1.2.0"` and `"1.2.0"` are equal.
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    components: Vec<Component>,
}

impl Version {
    /// Parses a version string, returning `None` when it does not follow
    /// the grammar in the module documentation.
    pub fn parse(raw: &str) -> Option<Self> {
        let body = raw
            .strip_prefix('v')
            .or_else(|| raw.strip_prefix('V'))
            .unwrap_or(raw);

        if body.is_empty() {
            return None;
        }

        let mut components = Vec::new();
        for piece in body.split(|c: char| matches!(c, '.' | '-' | '+' | '_')) {
            if piece.is_empty() || !piece.bytes().all(|b| b.is_ascii_alphanumeric()) {
                return None;
            }
            components.push(Component::parse(piece));
        }

        Some(Version {
            raw: raw.to_string(),
            components,
        })
    }

    /// The original string this version was parsed from.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.components.cmp(&other.components)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.components == other.components
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Total order over raw version strings.
///
/// Unparseable strings compare equal to each other and below every
/// parseable version.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    match (Version::parse(a), Version::parse(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}
