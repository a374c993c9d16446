//! Version selection over an upstream candidate list.

/// Pick the version that satisfies a request.
///
/// With no target, the first candidate wins: the upstream list is treated
/// as most-relevant-first and version strings are never compared by order.
/// With a target, only an exact string match is accepted.
pub fn select<'a, S: AsRef<str>>(candidates: &'a [S], target: Option<&str>) -> Option<&'a str> {
    match target {
        None => candidates.first().map(AsRef::as_ref),
        Some(wanted) => candidates
            .iter()
            .map(AsRef::as_ref)
            .find(|candidate| *candidate == wanted),
    }
}
