//! Per-request routing state.
//!
//! A [`RouteContext`] is created for one request, moved into the router's
//! scans, and dropped with the request. The route tables it walks are shared
//! and read-only; everything mutable during a scan lives here.

use crate::config::Config;
use crate::method::Method;

/// Length of the path prefix used to pick a route group.
pub(crate) const GROUP_KEY_LEN: usize = 3;

/// Derives the group key for a path: its first three bytes, or `""` when
/// the path is shorter (or the cut would split a character).
pub(crate) fn group_key(path: &str) -> &str {
    if path.len() < GROUP_KEY_LEN {
        return "";
    }
    path.get(..GROUP_KEY_LEN).unwrap_or("")
}

/// Position of a scan inside one route group.
///
/// `None` means "before the first route"; [`next`](ScanCursor::next)
/// advances and yields the route at the new position.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ScanCursor(Option<usize>);

impl ScanCursor {
    pub fn reset(&mut self) {
        self.0 = None;
    }

    pub fn position(&self) -> Option<usize> {
        self.0
    }

    pub(crate) fn next<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        let next = self.0.map_or(0, |i| i + 1);
        let item = items.get(next)?;
        self.0 = Some(next);
        Some(item)
    }
}

/// Everything the router needs to know about one request's target.
#[derive(Debug)]
pub struct RouteContext {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) detection_path: String,
    pub(crate) group_key: String,
    pub(crate) cursor: ScanCursor,
}

impl RouteContext {
    pub fn new(method: Method, path: &str, config: &Config) -> Self {
        let detection_path = config.detection_path(path);
        let group_key = group_key(&detection_path).to_owned();
        Self {
            method,
            path: path.to_owned(),
            detection_path,
            group_key,
            cursor: ScanCursor::default(),
        }
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn detection_path(&self) -> &str { &self.detection_path }
    pub fn group_key(&self) -> &str { &self.group_key }
    pub fn cursor(&self) -> ScanCursor { self.cursor }
}
