//! # perch
//!
//! A small HTTP framework that gets the protocol corners right: `405` with a
//! correct `Allow` header instead of a blanket `404`, entity tags and
//! `304 Not Modified`, `Cache-Control: no-cache`, and `Accept`-family
//! negotiation.
//!
//! ## Routing
//!
//! Routes are registered per method and frozen into a read-only table when
//! the server starts. When a path exists but not under the requested
//! method, the other methods' routes are scanned and the ones that would
//! have matched are listed in `Allow`.
//!
//! ## Conditional responses
//!
//! With [`Config::etag`] on, every `200 OK` response with a body is tagged
//! `"<length>-<crc32>"` and compared with the client's `If-None-Match`; a
//! match becomes `304 Not Modified` with an empty body. The pieces are also
//! available on their own in [`etag`], [`conditional`], [`negotiate`] and
//! [`cache_control`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use perch::{Config, Request, Response, Router, Server, Status};
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new()
//!         .get("/users/{id}", get_user)
//!         .post("/users",     create_user);
//!
//!     Server::bind("0.0.0.0:3000")
//!         .config(Config::default().etag(true))
//!         .serve(app)
//!         .await
//!         .unwrap();
//! }
//!
//! async fn get_user(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#).into_bytes())
//! }
//!
//! async fn create_user(req: Request) -> Response {
//!     if req.body().is_empty() {
//!         return Response::status(Status::BAD_REQUEST);
//!     }
//!     Response::builder()
//!         .status(Status::CREATED)
//!         .header("location", "/users/99")
//!         .no_body()
//! }
//! ```

mod config;
mod context;
mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;

pub mod cache_control;
pub mod conditional;
pub mod etag;
pub mod header;
pub mod negotiate;

pub use config::Config;
pub use context::{RouteContext, ScanCursor};
pub use error::Error;
pub use handler::Handler;
pub use http::StatusCode as Status;
pub use method::{Method, UnknownMethod};
pub use request::{Params, Request};
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use router::{Matched, Route, RouteTable, Router, group_path, unique_routes};
pub use server::Server;
