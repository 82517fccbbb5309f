//! Genre tag canonicalization.

pub const UNKNOWN_GENRE: &str = "Unknown Genre";

/// Maps a free-text catalog genre into the display vocabulary.
///
/// Hip hop and R&B variants collapse to a single label, everything else is
/// title-cased token by token (hyphenated parts included, so `k-pop`
/// becomes `K-Pop`). Never fails: blank input gives [`UNKNOWN_GENRE`].
pub fn normalize(raw_genre: Option<&str>) -> String {
    let raw = match raw_genre.map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return UNKNOWN_GENRE.to_string(),
    };

    let folded = raw.to_lowercase().replace(['-', '_'], " ");
    if folded.contains("hip hop") {
        return "Hip Hop".to_string();
    }
    if folded.contains("r&b") || folded.contains("rnb") {
        return "R&B".to_string();
    }

    raw.split_whitespace()
        .map(title_case_token)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case_token(token: &str) -> String {
    token
        .split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}
