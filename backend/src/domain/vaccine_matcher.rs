//! Fuzzy matching between booster schedule names and logged dose names.
//!
//! Vaccination records store the vaccine name as free text, so a booster
//! entry like "FVRCP Booster" has to find prior doses logged as "FVRCP",
//! "FVRCP (1st dose)" and so on. The heuristic is deliberately simple:
//! strip the booster suffix from the schedule name, then accept containment
//! in either direction.

/// Strip a trailing "Booster" (or Thai "บูสเตอร์") suffix and anything after
/// it, case-insensitively. "FVRCP Booster" and "FVRCP booster (annual)" both
/// reduce to "FVRCP"; names without the suffix come back unchanged.
pub fn base_name(vaccine_name: &str) -> &str {
    for suffix in ["booster", "บูสเตอร์"] {
        if let Some(pos) = find_suffix_ci(vaccine_name, suffix) {
            return vaccine_name[..pos].trim_end();
        }
    }
    vaccine_name.trim()
}

/// Byte offset of the first case-insensitive occurrence of `suffix`.
///
/// The search runs over the original string so the offset is always a char
/// boundary. Lowercasing a copy and searching that instead would yield byte
/// indexes that need not line up: case folding can change a char's encoded
/// length (U+1E9E is three bytes, its lowercase two).
fn find_suffix_ci(name: &str, suffix: &str) -> Option<usize> {
    name.char_indices()
        .map(|(i, _)| i)
        .find(|&i| starts_with_ci(&name[i..], suffix))
}

fn starts_with_ci(text: &str, prefix: &str) -> bool {
    let mut have = text.chars().flat_map(char::to_lowercase);
    prefix.chars().all(|want| have.next() == Some(want))
}

/// Bidirectional containment: a logged dose matches a base name when either
/// string contains the other. Both sides are non-empty after trimming or
/// there is no match.
pub fn names_match(base: &str, recorded: &str) -> bool {
    let base = base.trim();
    let recorded = recorded.trim();
    if base.is_empty() || recorded.is_empty() {
        return false;
    }
    recorded.contains(base) || base.contains(recorded)
}
