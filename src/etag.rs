//! Entity-tag generation.
//!
//! A tag is `"<body length>-<crc>"`, where the CRC is a reflected CRC-32 over
//! the full body with the Q polynomial (`0xD5828281` reversed, `0x814141AB`
//! normal), initial value and final XOR of all ones. Weak tags carry a `W/`
//! prefix. Tags are pure functions of the body bytes; nothing is stored.

use crc::{Algorithm, Crc};
use http::StatusCode;
use tracing::debug;

use crate::conditional::{self, Outcome};
use crate::header;
use crate::response::Response;

const TAG_ALGORITHM: Algorithm<u32> = Algorithm {
    width: 32,
    poly: 0x8141_41ab,
    init: 0xffff_ffff,
    refin: true,
    refout: true,
    xorout: 0xffff_ffff,
    check: 0xa9cc_8179,
    residue: 0x4ac2_a509,
};

static TAG_CRC: Crc<u32> = Crc::<u32>::new(&TAG_ALGORITHM);

/// Marker that opens a weak validator.
pub const WEAK_PREFIX: &str = "W/";

/// Computes the entity tag for `body`. Defined for every byte sequence.
pub fn generate(body: &[u8], weak: bool) -> String {
    let tag = format!("\"{}-{}\"", body.len(), TAG_CRC.checksum(body));
    if weak { format!("{WEAK_PREFIX}{tag}") } else { tag }
}

/// Tags `response` and answers the client's `If-None-Match` against it.
///
/// Only `200 OK` responses with a non-empty body are tagged; anything else is
/// left untouched. On a validator match the response becomes
/// `304 Not Modified` with an empty body, otherwise it gains an `Etag`
/// header. Returns `true` when the response was turned into a 304.
pub fn apply(if_none_match: Option<&str>, response: &mut Response, weak: bool) -> bool {
    if response.status_code() != StatusCode::OK || response.body().is_empty() {
        return false;
    }

    let tag = generate(response.body(), weak);
    match conditional::evaluate(&tag, if_none_match) {
        Outcome::NotModified => {
            debug!(etag = %tag, "validator matched, answering 304");
            response.set_status(StatusCode::NOT_MODIFIED);
            response.reset_body();
            true
        }
        Outcome::Modified => {
            response.set_header(header::ETAG, &tag);
            false
        }
    }
}
