//! Offer selection for `Accept`-family headers.
//!
//! The server lists what it can produce, best first; the client header is
//! walked left to right and the first entry that fits any offer decides.
//! Quality suffixes (`;q=0.8`) are stripped and otherwise ignored, so the
//! server's ordering is the only ranking. This is simpler than full RFC 9110
//! §12.5 negotiation and intentionally so.

/// Picks the offer that best fits the client's `header`.
///
/// - No offers: `""`.
/// - Empty header: the first offer.
/// - `*` and `*/*` take the first offer.
/// - Any other entry ending in `*` matches every offer that starts with what
///   precedes the star, so `text/*` takes the first `text/` one.
/// - Any other entry matches an offer it is a prefix of.
///
/// Returns `""` when no entry fits.
pub fn offer<'a>(header: &str, offers: &[&'a str]) -> &'a str {
    let Some(&first) = offers.first() else {
        return "";
    };
    if header.is_empty() {
        return first;
    }

    for entry in header.split(',') {
        let entry = entry.trim_matches(' ');
        let token = match entry.find(';') {
            Some(i) => &entry[..i],
            None => entry,
        };
        if token.is_empty() {
            continue;
        }

        let needle = match token {
            "*" | "*/*" => "",
            _ => token.strip_suffix('*').unwrap_or(token),
        };
        if let Some(&hit) = offers.iter().find(|offer| offer.starts_with(needle)) {
            return hit;
        }
    }

    ""
}
