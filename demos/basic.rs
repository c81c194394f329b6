//! Minimal perch example — negotiated responses, entity tags and 405s.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:3000/users/42
//!   curl -i -H 'if-none-match: "27-…"' http://localhost:3000/users/42   ← 304
//!   curl -i -H 'accept: text/*' http://localhost:3000/users/42
//!   curl -i -X DELETE http://localhost:3000/users                       ← 405, Allow: POST
//!   curl -i http://localhost:3000/nowhere                               ← 404

use perch::{Config, Request, Response, Router, Server, Status};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let app = Router::new()
        .get("/users/{id}",    get_user)
        .post("/users",        create_user)
        .delete("/users/{id}", delete_user)
        .mount("/static",      assets);

    Server::bind("0.0.0.0:3000")
        .config(Config::default().etag(true))
        .serve(app)
        .await
        .expect("server error");
}

// GET /users/{id}, as JSON or plain text depending on `Accept`.
async fn get_user(req: Request) -> Response {
    let id = req.param("id").unwrap_or("unknown");
    match req.accepts(&["application/json", "text/plain"]) {
        "text/plain" => Response::text(format!("user {id}: alice")),
        _ => Response::json(format!(r#"{{"id":"{id}","name":"alice"}}"#).into_bytes()),
    }
}

// POST /users
async fn create_user(req: Request) -> Response {
    if req.body().is_empty() {
        return Response::status(Status::BAD_REQUEST);
    }
    Response::builder()
        .status(Status::CREATED)
        .header("location", "/users/99")
        .json(r#"{"id":"99","name":"new_user"}"#.to_owned().into_bytes())
}

// DELETE /users/{id} → 204 No Content
async fn delete_user(_req: Request) -> Status {
    Status::NO_CONTENT
}

// Anything under /static, any method.
async fn assets(req: Request) -> Response {
    Response::text(format!("asset {}", req.path()))
}
