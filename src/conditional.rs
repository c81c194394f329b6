//! Conditional-request evaluation (`If-None-Match`, `If-Modified-Since`).
//!
//! Two comparisons live here and they are not the same:
//!
//! - [`evaluate`] decides whether a freshly tagged response can collapse to
//!   `304`. It is permissive: a strong client value *containing* the tag
//!   matches, so quoting or list framing around the tag is tolerated.
//! - [`is_stale`] walks an `If-None-Match` list token by token and uses the
//!   weak comparison of RFC 9110 §8.8.3.2, where `W/` on either side is
//!   ignored.

use std::time::SystemTime;

use crate::cache_control::is_no_cache;
use crate::etag::WEAK_PREFIX;
use crate::header;
use crate::request::Request;
use crate::response::Response;

/// Result of comparing a computed tag with the client's validator.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// The client copy is current: answer `304` with no body.
    NotModified,
    /// Send the full response with the computed tag.
    Modified,
}

/// Compares the server's `computed` tag with the raw `If-None-Match` value.
pub fn evaluate(computed: &str, if_none_match: Option<&str>) -> Outcome {
    let Some(client) = if_none_match else {
        return Outcome::Modified;
    };

    if let Some(rest) = client.strip_prefix(WEAK_PREFIX) {
        // W/1 == 1, W/1 == W/1
        let computed_bare = computed.strip_prefix(WEAK_PREFIX).unwrap_or(computed);
        return if rest == computed || rest == computed_bare {
            Outcome::NotModified
        } else {
            Outcome::Modified
        };
    }

    if client.contains(computed) {
        Outcome::NotModified
    } else {
        Outcome::Modified
    }
}

/// Weak equality: equal outright, or equal once `W/` is put in front of
/// either side.
fn tags_match(token: &[u8], etag: &[u8]) -> bool {
    let weak = WEAK_PREFIX.as_bytes();
    token == etag
        || etag.strip_prefix(weak) == Some(token)
        || token.strip_prefix(weak) == Some(etag)
}

/// Reports whether `etag` is absent from the comma-separated `if_none_match`
/// list.
///
/// Leading spaces of each entry are skipped; spaces inside an entry are kept.
/// An empty list has one empty entry, which never matches, so it is stale.
pub fn is_stale(etag: &str, if_none_match: &str) -> bool {
    let list = if_none_match.as_bytes();
    let etag = etag.as_bytes();
    let (mut start, mut end) = (0, 0);

    for (i, &b) in list.iter().enumerate() {
        match b {
            b' ' => {
                if start == end {
                    start = i + 1;
                    end = i + 1;
                }
            }
            b',' => {
                if tags_match(&list[start..end], etag) {
                    return false;
                }
                start = i + 1;
                end = i + 1;
            }
            _ => end = i + 1,
        }
    }

    !tags_match(&list[start..end], etag)
}

/// Reports whether the client's cached copy of `response` is still usable.
///
/// The request must carry `If-None-Match` or `If-Modified-Since` and must not
/// ask for `no-cache`. An `If-None-Match` other than `*` needs a response
/// `Etag` that appears in the list. When the client also sent
/// `If-Modified-Since` and the response has `Last-Modified`, the resource must
/// predate the client's copy; an unparseable date on either side means stale.
pub fn is_fresh(request: &Request, response: &Response) -> bool {
    let modified_since = request.header(header::IF_MODIFIED_SINCE);
    let none_match = request.header(header::IF_NONE_MATCH);
    if modified_since.is_none() && none_match.is_none() {
        return false;
    }

    if request.header(header::CACHE_CONTROL).is_some_and(is_no_cache) {
        return false;
    }

    if let Some(none_match) = none_match.filter(|v| *v != "*") {
        let Some(etag) = response.header(header::ETAG) else {
            return false;
        };
        if is_stale(etag, none_match) {
            return false;
        }
    }

    match (modified_since, response.header(header::LAST_MODIFIED)) {
        (Some(since), Some(last)) => match (parse_date(last), parse_date(since)) {
            (Some(last), Some(since)) => last < since,
            _ => false,
        },
        _ => true,
    }
}

fn parse_date(value: &str) -> Option<SystemTime> {
    httpdate::parse_http_date(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAG: &str = "\"5-3303331774\"";

    #[test]
    fn absent_validator_is_not_conditional() {
        assert_eq!(evaluate(TAG, None), Outcome::Modified);
    }

    #[test]
    fn identical_tag_is_not_modified() {
        assert_eq!(evaluate(TAG, Some(TAG)), Outcome::NotModified);
    }

    #[test]
    fn weak_client_tag_matches_strong_and_weak_server_tags() {
        let weak_client = format!("W/{TAG}");
        assert_eq!(evaluate(TAG, Some(&weak_client)), Outcome::NotModified);
        assert_eq!(evaluate(&weak_client, Some(&weak_client)), Outcome::NotModified);
    }

    #[test]
    fn weak_client_tag_for_other_content_is_modified() {
        assert_eq!(evaluate(TAG, Some("W/\"5-1\"")), Outcome::Modified);
    }

    #[test]
    fn strong_comparison_accepts_surrounding_framing() {
        let list = format!("\"1-1\", {TAG}");
        assert_eq!(evaluate(TAG, Some(&list)), Outcome::NotModified);
        assert_eq!(evaluate(TAG, Some("")), Outcome::Modified);
    }

    #[test]
    fn stale_list_finds_a_middle_entry() {
        assert!(!is_stale("\"abc\"", "\"x\", \"abc\", \"y\""));
    }

    #[test]
    fn stale_list_finds_the_trailing_entry() {
        assert!(!is_stale("\"abc\"", "\"abc\""));
        assert!(!is_stale("\"abc\"", "\"x\",\"abc\""));
    }

    #[test]
    fn empty_list_is_stale() {
        assert!(is_stale("\"abc\"", ""));
        assert!(is_stale("\"abc\"", "  "));
    }

    #[test]
    fn stale_list_uses_weak_comparison() {
        assert!(!is_stale("W/\"abc\"", "\"abc\""));
        assert!(!is_stale("\"abc\"", "  W/\"abc\" , \"y\""));
        assert!(is_stale("\"abc\"", "\"abcd\", \"ab\""));
    }

    #[test]
    fn inner_spaces_are_part_of_the_token() {
        assert!(!is_stale("\"a b\"", "\"x\", \"a b\" "));
        assert!(is_stale("\"ab\"", "\"a b\""));
    }

    fn request(headers: &[(&str, &str)]) -> Request {
        Request::from_parts(
            crate::Method::Get,
            "/",
            headers.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect(),
        )
    }

    fn tagged(etag: &str) -> Response {
        let mut res = Response::text("hello");
        res.set_header(header::ETAG, etag);
        res
    }

    #[test]
    fn unconditional_request_is_never_fresh() {
        assert!(!is_fresh(&request(&[]), &tagged(TAG)));
    }

    #[test]
    fn matching_validator_is_fresh() {
        assert!(is_fresh(&request(&[("if-none-match", TAG)]), &tagged(TAG)));
        assert!(is_fresh(&request(&[("if-none-match", "*")]), &Response::text("x")));
    }

    #[test]
    fn no_cache_forces_revalidation() {
        let req = request(&[("if-none-match", TAG), ("cache-control", "max-age=0, no-cache")]);
        assert!(!is_fresh(&req, &tagged(TAG)));
    }

    #[test]
    fn untagged_response_is_not_fresh() {
        assert!(!is_fresh(&request(&[("if-none-match", TAG)]), &Response::text("hello")));
    }

    #[test]
    fn modification_dates_must_predate_the_client_copy() {
        let mut res = Response::text("hello");
        res.set_header(header::LAST_MODIFIED, "Sun, 06 Nov 1994 08:49:37 GMT");

        let newer = request(&[("if-modified-since", "Mon, 07 Nov 1994 08:49:37 GMT")]);
        assert!(is_fresh(&newer, &res));

        let same = request(&[("if-modified-since", "Sun, 06 Nov 1994 08:49:37 GMT")]);
        assert!(!is_fresh(&same, &res));

        let garbage = request(&[("if-modified-since", "yesterday")]);
        assert!(!is_fresh(&garbage, &res));
    }
}
