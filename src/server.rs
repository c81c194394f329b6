//! HTTP server, request dispatch and graceful shutdown.
//!
//! # Dispatch
//!
//! 1. Methods outside [`Method::ALL`] get `501 Not Implemented`.
//! 2. The path is looked up in the request method's route stack.
//! 3. A hit runs the handler; with [`Config::etag`] on, the response is then
//!    tagged and may collapse to `304 Not Modified`.
//! 4. A miss scans the *other* methods' stacks. If any of them would have
//!    matched the answer is `405` with an `Allow` header, otherwise `404`.
//!
//! # Graceful shutdown
//!
//! On SIGTERM or Ctrl-C the server stops accepting, lets every in-flight
//! connection finish, and only then returns from [`Server::serve`].

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::context::RouteContext;
use crate::error::Error;
use crate::etag;
use crate::header;
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use crate::router::{Matched, RouteTable, Router};

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
    config: Config,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// # Panics
    ///
    /// Panics if `addr` is not a valid `host:port` string.
    ///
    /// ```rust
    /// use perch::Server;
    /// let server = Server::bind("0.0.0.0:3000");
    /// ```
    pub fn bind(addr: &str) -> Self {
        let addr: SocketAddr = addr.parse().expect("invalid socket address");
        Self { addr, config: Config::default() }
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Freezes `router`, then accepts connections until a shutdown signal
    /// arrives and every in-flight connection has finished.
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        let listener = TcpListener::bind(self.addr)
            .await
            .map_err(|source| Error::Bind { addr: self.addr, source })?;

        let app = Arc::new(App::new(router, self.config));

        info!(addr = %self.addr, "perch listening");

        let mut tasks = tokio::task::JoinSet::new();

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // Shutdown is checked first so a signal stops accepting even
                // while connections are still queued.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let app = Arc::clone(&app);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        let svc = service_fn(move |req| {
                            let app = Arc::clone(&app);
                            async move { dispatch(app, req).await }
                        });

                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet does not grow
                // without bound on long-running servers.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("perch stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// The frozen route table plus the configuration it was frozen with.
pub(crate) struct App {
    table: RouteTable,
    config: Config,
}

impl App {
    pub(crate) fn new(router: Router, config: Config) -> Self {
        Self { table: router.freeze(&config), config }
    }

    /// Routes one request and produces one response.
    pub(crate) async fn respond(&self, request: Request) -> Response {
        let mut ctx = RouteContext::new(request.method(), request.path(), &self.config);

        let Some(Matched { route, params }) = self.table.lookup(&mut ctx) else {
            return self.unmatched(ctx);
        };

        let if_none_match = request.header(header::IF_NONE_MATCH).map(str::to_owned);
        let mut response = route.handler.call(request.with_params(params)).await;
        if self.config.etag {
            etag::apply(if_none_match.as_deref(), &mut response, self.config.etag_weak);
        }
        response
    }

    /// `405` with `Allow` when another method would have matched, else `404`.
    fn unmatched(&self, mut ctx: RouteContext) -> Response {
        let allowed = self.table.allowed_methods(&mut ctx);
        if allowed.is_empty() {
            debug!(method = %ctx.method(), path = ctx.path(), "no route");
            return Response::status(StatusCode::NOT_FOUND);
        }

        let mut response = Response::status(StatusCode::METHOD_NOT_ALLOWED);
        for method in &allowed {
            response.append_header(header::ALLOW, method.as_str());
        }
        debug!(
            method = %ctx.method(),
            path = ctx.path(),
            allow = response.header(header::ALLOW).unwrap_or(""),
            "method not allowed"
        );
        response
    }
}

/// Adapts a hyper request to [`App::respond`].
///
/// The error type is [`Infallible`]: every failure becomes a response, so
/// hyper never sees an error.
async fn dispatch(
    app: Arc<App>,
    req: hyper::Request<Incoming>,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();

    let method = match Method::try_from(&parts.method) {
        Ok(m) => m,
        Err(e) => {
            debug!(path = parts.uri.path(), "{e}");
            return Ok(Response::status(StatusCode::NOT_IMPLEMENTED).into_inner());
        }
    };

    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes().to_vec(),
        Err(e) => {
            warn!(path = parts.uri.path(), "failed to read request body: {e}");
            return Ok(Response::status(StatusCode::BAD_REQUEST).into_inner());
        }
    };

    let headers = parts.headers.iter()
        .filter_map(|(name, value)| {
            value.to_str().ok().map(|v| (name.as_str().to_owned(), v.to_owned()))
        })
        .collect();

    let request = Request::from_parts(method, parts.uri.path(), headers).with_body(body);
    Ok(app.respond(request).await.into_inner())
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on SIGTERM (Unix) or Ctrl-C, whichever comes first.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
