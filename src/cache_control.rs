//! `Cache-Control` directive detection.

const NO_CACHE: &str = "no-cache";

/// Reports whether a `Cache-Control` value carries the `no-cache` directive.
///
/// Only the first occurrence is examined. It must start the value or follow
/// a space or comma, and must end the value or be followed by a comma, so
/// `x-no-cache` and `no-cache-please` do not count.
pub fn is_no_cache(cache_control: &str) -> bool {
    let Some(i) = cache_control.find(NO_CACHE) else {
        return false;
    };
    let bytes = cache_control.as_bytes();

    // Xno-cache
    if i > 0 && !matches!(bytes[i - 1], b' ' | b',') {
        return false;
    }

    // no-cacheX
    match bytes.get(i + NO_CACHE.len()) {
        None => true,
        Some(&next) => next == b',',
    }
}
