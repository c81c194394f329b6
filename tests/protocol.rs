use perch::cache_control::is_no_cache;
use perch::conditional::{Outcome, evaluate, is_stale};
use perch::negotiate::offer;
use perch::{Config, Method, Request, Response, RouteContext, Router, etag, unique_routes};

async fn ok(_: Request) -> Response {
    Response::text("ok")
}

#[test]
fn etag_matches_its_own_if_none_match() {
    let body = b"<h1>hello</h1>";
    let strong = etag::generate(body, false);
    assert_eq!(strong, "\"14-4112879222\"");
    assert_eq!(etag::generate(body, true), format!("W/{strong}"));

    assert_eq!(evaluate(&strong, Some(&strong)), Outcome::NotModified);
    assert_eq!(evaluate(&strong, Some(&format!("W/{strong}"))), Outcome::NotModified);
    assert_eq!(evaluate(&strong, Some("W/\"14-1\"")), Outcome::Modified);
}

#[test]
fn if_none_match_lists() {
    assert!(!is_stale("\"abc\"", "\"x\", \"abc\", \"y\""));
    assert!(!is_stale("\"abc\"", "\"abc\""));
    assert!(is_stale("\"abc\"", ""));
}

#[test]
fn accept_headers() {
    assert_eq!(offer("", &["json", "xml"]), "json");
    assert_eq!(offer("text/*", &["json", "text/html"]), "text/html");
    assert_eq!(offer("application/json;q=0.9", &["xml", "json"]), "");
    assert_eq!(offer("application/json;q=0.9", &["xml", "application/json"]), "application/json");
}

#[test]
fn cache_control_no_cache() {
    assert!(is_no_cache("no-cache, no-store"));
    assert!(is_no_cache("no-cache"));
    assert!(!is_no_cache("x-no-cache"));
}

#[test]
fn allowance_scan_drives_404_versus_405() {
    let config = Config::default();
    let table = Router::new().get("/x", ok).post("/x", ok).freeze(&config);

    let mut wrong_method = RouteContext::new(Method::Delete, "/x", &config);
    assert!(table.lookup(&mut wrong_method).is_none());
    assert_eq!(table.allowed_methods(&mut wrong_method), [Method::Get, Method::Post]);

    let mut unknown_path = RouteContext::new(Method::Delete, "/y", &config);
    assert!(table.lookup(&mut unknown_path).is_none());
    assert!(table.allowed_methods(&mut unknown_path).is_empty());
}

#[test]
fn table_introspection_is_deduplicated() {
    let table = Router::new()
        .all("/health", ok)
        .get("/{*rest}", ok)
        .get("/users", ok)
        .freeze(&Config::default());

    let get: Vec<_> = table.routes(Method::Get).iter().map(|r| r.path().to_owned()).collect();
    assert_eq!(get, ["/{*rest}", "/health", "/users"]);

    let all = table.all_routes();
    assert_eq!(all.len(), 3);
    assert_eq!(unique_routes(all.iter().cloned().chain(all.iter().cloned())).len(), 3);
}
