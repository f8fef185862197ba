//! Deterministic choice of a model from the provider listing.

/// Family used when nothing else is configured.
pub const DEFAULT_MODEL_FAMILY: &str = "gemini-";

/// Name fragments that mark unstable variants.
const UNSTABLE_MARKERS: &[&str] = &["exp", "preview"];

/// Pick the newest stable model of `family`.
///
/// Candidates must start with `family` and contain none of the unstable
/// markers; the reverse-lexically greatest name wins, so later dated or
/// versioned names come first.
#[must_use]
pub fn select_model<S: AsRef<str>>(available: &[S], family: &str) -> Option<String> {
    let family = family.to_lowercase();
    available
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| {
            let lower = name.to_lowercase();
            lower.starts_with(&family) && !UNSTABLE_MARKERS.iter().any(|m| lower.contains(m))
        })
        .max()
        .map(str::to_owned)
}
