//! Header names the engine reads or writes.
//!
//! Lookups are case-insensitive everywhere, so these are the spellings perch
//! *writes*. `Etag` is deliberately not `ETag`: it is the canonical
//! `Word-Word` casing that HTTP/1 header normalisation produces.

pub const ACCEPT: &str = "Accept";
pub const ACCEPT_CHARSET: &str = "Accept-Charset";
pub const ACCEPT_ENCODING: &str = "Accept-Encoding";
pub const ACCEPT_LANGUAGE: &str = "Accept-Language";
pub const ALLOW: &str = "Allow";
pub const CACHE_CONTROL: &str = "Cache-Control";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const ETAG: &str = "Etag";
pub const IF_MODIFIED_SINCE: &str = "If-Modified-Since";
pub const IF_NONE_MATCH: &str = "If-None-Match";
pub const LAST_MODIFIED: &str = "Last-Modified";
