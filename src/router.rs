//! Request router.
//!
//! Routes are registered on a [`Router`] and frozen into a [`RouteTable`]
//! when the server starts. The table has one stack per method, and each stack
//! is split into groups keyed by the first three bytes of the path, so a
//! lookup only walks the routes that could share the request's prefix. Routes
//! whose static head is shorter than that live in the `""` group, which is
//! also merged (in registration order) into every other group.
//!
//! Once frozen the table is never written again; concurrent requests read it
//! through an `Arc` and keep their scan position in their own
//! [`RouteContext`].

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use matchit::Router as MatchitRouter;
use tracing::debug;

use crate::config::Config;
use crate::context::{RouteContext, group_key};
use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::request::Params;

// ── Route ─────────────────────────────────────────────────────────────────────

enum Matcher {
    /// A single-entry radix tree for the normalised pattern.
    Pattern(MatchitRouter<()>),
    /// A mount point: the prefix itself and anything below it.
    Prefix(String),
}

/// A registered route. Identity matters: the same `Route` is shared by every
/// method it was registered for.
pub struct Route {
    path: String,
    position: usize,
    mount: bool,
    static_prefix: String,
    matcher: Matcher,
    pub(crate) handler: BoxedHandler,
}

impl Route {
    fn new(reg: Registration, position: usize, config: &Config) -> Self {
        let pattern = normalize_pattern(&reg.path, config);
        let static_prefix = match pattern.find('{') {
            Some(i) => pattern[..i].to_owned(),
            None => pattern.clone(),
        };
        let matcher = if reg.mount {
            Matcher::Prefix(pattern)
        } else {
            let mut tree = MatchitRouter::new();
            tree.insert(pattern.as_str(), ())
                .unwrap_or_else(|e| panic!("invalid route `{}`: {e}", reg.path));
            Matcher::Pattern(tree)
        };
        Self { path: reg.path, position, mount: reg.mount, static_prefix, matcher, handler: reg.handler }
    }

    /// The path as it was registered.
    pub fn path(&self) -> &str { &self.path }

    /// Mount points answer requests but never count toward `Allow`.
    pub fn is_mount(&self) -> bool { self.mount }

    /// Tests `detection_path` against this route. On a match `params` holds
    /// the captured parameters, cut from the original `path` so they keep
    /// their case.
    pub fn matches(&self, detection_path: &str, path: &str, params: &mut Params) -> bool {
        params.clear();
        match &self.matcher {
            Matcher::Prefix(prefix) => match detection_path.strip_prefix(prefix.as_str()) {
                Some(rest) => rest.is_empty() || rest.starts_with('/') || prefix.ends_with('/'),
                None => false,
            },
            Matcher::Pattern(tree) => {
                let Ok(matched) = tree.at(detection_path) else {
                    return false;
                };
                // Detection only folds ASCII case and drops trailing slashes,
                // so byte offsets carry over to the original path.
                let base = detection_path.as_ptr() as usize;
                for (key, value) in matched.params.iter() {
                    let raw = (value.as_ptr() as usize)
                        .checked_sub(base)
                        .and_then(|start| path.get(start..start + value.len()))
                        .unwrap_or(value);
                    params.insert(key.to_owned(), raw.to_owned());
                }
                true
            }
        }
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("path", &self.path)
            .field("position", &self.position)
            .field("mount", &self.mount)
            .finish()
    }
}

/// Lowercases the static parts of a pattern (parameter names keep their
/// case) and drops trailing slashes, mirroring [`Config::detection_path`].
fn normalize_pattern(path: &str, config: &Config) -> String {
    let mut out = String::with_capacity(path.len());
    let mut depth = 0usize;
    for c in path.chars() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if depth == 0 && !config.case_sensitive {
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    if !config.strict_routing {
        while out.len() > 1 && out.ends_with('/') {
            out.pop();
        }
    }
    out
}

/// Drops repeated routes, keeping the first occurrence of each and the order
/// they were first seen in. Two entries are the same route only if they are
/// the same allocation.
pub fn unique_routes<T>(stack: impl IntoIterator<Item = Arc<T>>) -> Vec<Arc<T>> {
    let mut seen = HashSet::new();
    stack.into_iter()
        .filter(|route| seen.insert(Arc::as_ptr(route)))
        .collect()
}

// ── Router ────────────────────────────────────────────────────────────────────

struct Registration {
    methods: Vec<Method>,
    path: String,
    mount: bool,
    handler: BoxedHandler,
}

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Each registration returns `self` so calls chain naturally.
pub struct Router {
    registrations: Vec<Registration>,
    prefix: String,
}

/// Joins a group `prefix` and a route `path` registered inside it.
///
/// An empty path or `/` is the prefix itself; otherwise the path gains a
/// leading `/` if it lacks one and is appended to the prefix with its
/// trailing slashes removed.
pub fn group_path(prefix: &str, path: &str) -> String {
    if path.is_empty() || path == "/" {
        return prefix.to_owned();
    }
    let prefix = prefix.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{prefix}{path}")
    } else {
        format!("{prefix}/{path}")
    }
}

impl Router {
    pub fn new() -> Self {
        Self { registrations: Vec::new(), prefix: String::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax, catch-alls `{*name}`:
    ///
    /// ```rust,no_run
    /// # use perch::{Method, Request, Response, Router};
    /// # async fn get_user(_: Request) -> Response { Response::text("") }
    /// # async fn create_user(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::Get,  "/users/{id}", get_user)
    ///     .on(Method::Post, "/users",      create_user);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route pattern.
    pub fn on(self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.add(vec![method], path, false, handler)
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Get, path, handler)
    }

    pub fn head(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Head, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Post, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Put, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Delete, path, handler)
    }

    pub fn options(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Options, path, handler)
    }

    pub fn patch(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Patch, path, handler)
    }

    /// Register one handler for `path` under every method.
    pub fn all(self, path: &str, handler: impl Handler) -> Self {
        self.add(Method::ALL.to_vec(), path, false, handler)
    }

    /// Hand everything at or below `prefix` to `handler`, whatever the method.
    ///
    /// Mount points are matched in registration order like any other route,
    /// but a mount never makes a method appear in a `405`'s `Allow` header.
    ///
    /// # Panics
    ///
    /// Panics if `prefix` does not start with `/`.
    pub fn mount(self, prefix: &str, handler: impl Handler) -> Self {
        self.add(Method::ALL.to_vec(), prefix, true, handler)
    }

    /// Register every route `build` adds beneath `prefix`.
    ///
    /// Paths inside the group are joined with [`group_path`], so `""` and
    /// `"/"` name the prefix itself and `"users"` becomes `"{prefix}/users"`.
    /// Groups nest.
    ///
    /// ```rust,no_run
    /// # use perch::{Request, Response, Router};
    /// # async fn list(_: Request) -> Response { Response::text("") }
    /// # async fn show(_: Request) -> Response { Response::text("") }
    /// Router::new().group("/api/v1", |api| {
    ///     api.get("/", list)
    ///        .get("users/{id}", show)
    /// });
    /// ```
    pub fn group(mut self, prefix: &str, build: impl FnOnce(Router) -> Router) -> Self {
        let inner = build(Router {
            registrations: Vec::new(),
            prefix: self.joined(prefix),
        });
        self.registrations.extend(inner.registrations);
        self
    }

    fn joined(&self, path: &str) -> String {
        if self.prefix.is_empty() {
            path.to_owned()
        } else {
            group_path(&self.prefix, path)
        }
    }

    fn add(mut self, methods: Vec<Method>, path: &str, mount: bool, handler: impl Handler) -> Self {
        let path = self.joined(path);
        if mount {
            assert!(path.starts_with('/'), "invalid mount prefix `{path}`: must start with `/`");
        } else {
            MatchitRouter::new()
                .insert(path.as_str(), ())
                .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        }
        self.registrations.push(Registration {
            methods,
            path,
            mount,
            handler: handler.into_boxed_handler(),
        });
        self
    }

    /// Builds the read-only table requests are routed against.
    pub fn freeze(self, config: &Config) -> RouteTable {
        let mut stacks: [HashMap<String, Vec<Arc<Route>>>; Method::COUNT] =
            std::array::from_fn(|_| HashMap::new());

        let count = self.registrations.len();
        for (position, mut reg) in self.registrations.into_iter().enumerate() {
            let methods = std::mem::take(&mut reg.methods);
            let route = Arc::new(Route::new(reg, position, config));
            let key = group_key(&route.static_prefix).to_owned();
            for method in methods {
                stacks[method.index()]
                    .entry(key.clone())
                    .or_default()
                    .push(Arc::clone(&route));
            }
        }

        for stack in &mut stacks {
            let fallback = stack.entry(String::new()).or_default().clone();
            for (key, routes) in stack.iter_mut() {
                if key.is_empty() {
                    continue;
                }
                routes.extend(fallback.iter().cloned());
                routes.sort_by_key(|r| r.position);
            }
        }

        debug!(routes = count, "route table frozen");
        RouteTable { stacks }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

// ── RouteTable ────────────────────────────────────────────────────────────────

/// A route that matched, with its captured parameters.
pub struct Matched {
    pub route: Arc<Route>,
    pub params: Params,
}

/// Frozen routes, one grouped stack per method.
pub struct RouteTable {
    stacks: [HashMap<String, Vec<Arc<Route>>>; Method::COUNT],
}

impl RouteTable {
    /// The routes `method` scans for a request in group `key`; unknown keys
    /// fall back to the `""` group.
    fn group(&self, method: Method, key: &str) -> &[Arc<Route>] {
        let stack = &self.stacks[method.index()];
        stack.get(key)
            .or_else(|| stack.get(""))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Finds the next route for the request's own method, continuing after
    /// the context's cursor.
    pub fn lookup(&self, ctx: &mut RouteContext) -> Option<Matched> {
        let routes = self.group(ctx.method, &ctx.group_key);
        let mut params = Params::new();
        while let Some(route) = ctx.cursor.next(routes) {
            if route.matches(&ctx.detection_path, &ctx.path, &mut params) {
                return Some(Matched { route: Arc::clone(route), params });
            }
        }
        None
    }

    /// Lists every *other* method with a non-mount route matching the
    /// request's path, in method order. Empty means the path is unknown
    /// (`404`); anything else means the method is wrong (`405`).
    pub fn allowed_methods(&self, ctx: &mut RouteContext) -> Vec<Method> {
        let mut allowed = Vec::new();
        let mut params = Params::new();
        for method in Method::ALL {
            if method == ctx.method {
                continue;
            }
            ctx.cursor.reset();
            let routes = self.group(method, &ctx.group_key);
            while let Some(route) = ctx.cursor.next(routes) {
                if route.is_mount() {
                    continue;
                }
                if route.matches(&ctx.detection_path, &ctx.path, &mut params) {
                    allowed.push(method);
                    break;
                }
            }
        }
        allowed
    }

    /// Every route registered for `method`, once each, fallback group first
    /// and then the other groups in key order.
    pub fn routes(&self, method: Method) -> Vec<Arc<Route>> {
        let stack = &self.stacks[method.index()];
        let mut keys: Vec<&String> = stack.keys().collect();
        keys.sort();
        unique_routes(keys.into_iter().flat_map(|k| stack[k].iter().cloned()))
    }

    /// Every route in the table once, in method order; a route registered
    /// for several methods appears at its first one.
    pub fn all_routes(&self) -> Vec<Arc<Route>> {
        unique_routes(Method::ALL.into_iter().flat_map(|m| self.routes(m)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Request, Response};

    async fn ok(_: Request) -> Response { Response::text("ok") }

    fn paths(routes: &[Arc<Route>]) -> Vec<&str> {
        routes.iter().map(|r| r.path()).collect()
    }

    fn table(router: Router) -> RouteTable {
        router.freeze(&Config::default())
    }

    #[test]
    fn lookup_matches_params_and_keeps_their_case() {
        let table = table(Router::new().get("/users/{id}", ok));
        let mut ctx = RouteContext::new(Method::Get, "/Users/AbC/", &Config::default());
        let matched = table.lookup(&mut ctx).expect("route should match");
        assert_eq!(matched.route.path(), "/users/{id}");
        assert_eq!(matched.params.get("id").map(String::as_str), Some("AbC"));
    }

    #[test]
    fn strict_case_sensitive_routing_is_exact() {
        let config = Config::default().case_sensitive(true).strict_routing(true);
        let table = Router::new().get("/Users", ok).freeze(&config);
        assert!(table.lookup(&mut RouteContext::new(Method::Get, "/Users", &config)).is_some());
        assert!(table.lookup(&mut RouteContext::new(Method::Get, "/users", &config)).is_none());
        assert!(table.lookup(&mut RouteContext::new(Method::Get, "/Users/", &config)).is_none());
    }

    #[test]
    fn fallback_routes_are_merged_into_groups_in_order() {
        let table = table(
            Router::new()
                .get("/{*rest}", ok)
                .get("/users", ok)
                .get("/x", ok),
        );
        let mut ctx = RouteContext::new(Method::Get, "/users", &Config::default());
        assert_eq!(ctx.group_key(), "/us");
        let matched = table.lookup(&mut ctx).unwrap();
        // Registered first, so the catch-all wins even inside the `/us` group.
        assert_eq!(matched.route.path(), "/{*rest}");
        let next = table.lookup(&mut ctx).unwrap();
        assert_eq!(next.route.path(), "/users");
        assert!(table.lookup(&mut ctx).is_none());
    }

    #[test]
    fn unknown_group_falls_back_to_the_empty_key() {
        let table = table(Router::new().get("/{name}", ok).get("/users", ok));
        let mut ctx = RouteContext::new(Method::Get, "/zebra", &Config::default());
        let matched = table.lookup(&mut ctx).unwrap();
        assert_eq!(matched.params.get("name").map(String::as_str), Some("zebra"));
    }

    #[test]
    fn allowed_methods_lists_other_matching_methods() {
        let table = table(Router::new().get("/x", ok).post("/x", ok).post("/x", ok));
        let mut ctx = RouteContext::new(Method::Delete, "/x", &Config::default());
        assert!(table.lookup(&mut ctx).is_none());
        assert_eq!(table.allowed_methods(&mut ctx), vec![Method::Get, Method::Post]);
    }

    #[test]
    fn allowed_methods_is_empty_for_unknown_paths() {
        let table = table(Router::new().get("/x", ok).post("/x", ok));
        let mut ctx = RouteContext::new(Method::Delete, "/y", &Config::default());
        assert!(table.allowed_methods(&mut ctx).is_empty());
    }

    #[test]
    fn allowed_methods_skips_the_request_method() {
        let table = table(Router::new().get("/x", ok));
        let mut ctx = RouteContext::new(Method::Get, "/x", &Config::default());
        assert!(table.allowed_methods(&mut ctx).is_empty());
    }

    #[test]
    fn mounts_route_requests_but_are_never_allowed() {
        let table = table(Router::new().mount("/static", ok).get("/api/users", ok));

        let mut ctx = RouteContext::new(Method::Put, "/static/css/site.css", &Config::default());
        assert!(table.lookup(&mut ctx).is_some());

        let mut ctx = RouteContext::new(Method::Get, "/staticfoo", &Config::default());
        assert!(table.lookup(&mut ctx).is_none());

        let mut ctx = RouteContext::new(Method::Post, "/api/users", &Config::default());
        assert!(table.lookup(&mut ctx).is_none());
        assert_eq!(table.allowed_methods(&mut ctx), vec![Method::Get]);
    }

    #[test]
    fn group_path_joins_prefix_and_path() {
        assert_eq!(group_path("/api", ""), "/api");
        assert_eq!(group_path("/api", "/"), "/api");
        assert_eq!(group_path("/api/", "/"), "/api/");
        assert_eq!(group_path("/api", "users"), "/api/users");
        assert_eq!(group_path("/api", "/users"), "/api/users");
        assert_eq!(group_path("/api/", "/users"), "/api/users");
        assert_eq!(group_path("/api//", "users"), "/api/users");
    }

    #[test]
    fn grouped_routes_are_registered_under_the_prefix() {
        let table = table(
            Router::new()
                .get("/health", ok)
                .group("/api", |api| {
                    api.get("", ok)
                        .post("users", ok)
                        .group("v1", |v1| v1.get("/items/{id}", ok))
                }),
        );
        assert_eq!(
            paths(&table.all_routes()),
            vec!["/api", "/api/v1/items/{id}", "/health", "/api/users"]
        );

        let mut ctx = RouteContext::new(Method::Get, "/api/v1/items/7", &Config::default());
        let matched = table.lookup(&mut ctx).expect("grouped route should match");
        assert_eq!(matched.params.get("id").map(String::as_str), Some("7"));

        let mut ctx = RouteContext::new(Method::Get, "/api/users", &Config::default());
        assert!(table.lookup(&mut ctx).is_none());
        assert_eq!(table.allowed_methods(&mut ctx), vec![Method::Post]);
    }

    #[test]
    fn mounts_inside_a_group_are_prefixed() {
        let table = table(Router::new().group("/assets", |a| a.mount("/", ok)));
        let mut ctx = RouteContext::new(Method::Get, "/assets/app.js", &Config::default());
        assert_eq!(table.lookup(&mut ctx).map(|m| m.route.path().to_owned()), Some("/assets".to_owned()));
    }

    #[test]
    fn root_mount_catches_everything() {
        let table = table(Router::new().mount("/", ok));
        let mut ctx = RouteContext::new(Method::Patch, "/any/where", &Config::default());
        assert!(table.lookup(&mut ctx).is_some());
    }

    #[test]
    fn unique_routes_keeps_first_seen_order() {
        let (r1, r2, r3) = (Arc::new("a"), Arc::new("b"), Arc::new("a"));
        let stack = vec![r1.clone(), r2.clone(), r1.clone(), r3.clone()];
        let unique = unique_routes(stack);
        assert_eq!(unique.len(), 3);
        assert!(Arc::ptr_eq(&unique[0], &r1));
        assert!(Arc::ptr_eq(&unique[1], &r2));
        assert!(Arc::ptr_eq(&unique[2], &r3));
    }

    #[test]
    fn routes_lists_each_registration_once() {
        let table = table(
            Router::new()
                .get("/{*rest}", ok)
                .get("/users", ok)
                .get("/orders", ok)
                .post("/orders", ok),
        );
        assert_eq!(paths(&table.routes(Method::Get)), ["/{*rest}", "/orders", "/users"]);
        assert_eq!(paths(&table.routes(Method::Post)), ["/orders"]);
        assert!(table.routes(Method::Trace).is_empty());
    }

    #[test]
    fn shared_routes_appear_once_across_methods() {
        let table = table(Router::new().all("/ping", ok).delete("/items/{id}", ok));
        assert_eq!(paths(&table.all_routes()), ["/ping", "/items/{id}"]);
    }

    #[test]
    #[should_panic(expected = "invalid route")]
    fn invalid_pattern_panics_at_registration() {
        let _ = Router::new().get("/files/{*path}/raw", ok);
    }
}
