//! # manila
//!
//! A minimal HTTP framework with one opinion: every request is wrapped,
//! every result ships in an envelope.
//!
//! ## The contract
//!
//! Two pieces do the real work, and both are deliberately small:
//!
//! - **The request adapter** runs first on every inbound request. It wraps
//!   the raw request in exactly one [`Request`] decorator and forwards it
//!   into the middleware chain exactly once. No filtering, no branching.
//! - **The response envelope** wraps whatever your handler returns in a
//!   fixed-shape JSON object, `{"body": <result>}`, and answers `200 OK`.
//!   The status is unconditional; see [`Envelope`] for what that implies.
//!
//! Everything else (router, middleware chain, server loop) exists so those
//! two pieces have a pipeline to live in.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use manila::{middleware, Envelope, Request, Router, Server};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct User {
//!     id: u32,
//!     name: &'static str,
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new()
//!         .layer(middleware::trace)
//!         .get("/users/{id}", get_user);
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! // GET /users/1  →  200 OK  {"body":{"id":1,"name":"alice"}}
//! async fn get_user(req: Request) -> Envelope<User> {
//!     let id = req.param("id").and_then(|v| v.parse().ok()).unwrap_or(0);
//!     Envelope::new(User { id, name: "alice" })
//! }
//! ```
//!
//! ## Middleware
//!
//! A middleware is any `async fn(Request, Next) -> impl IntoResponse`.
//! The built-in [`middleware::trace`] logs one line per request. See the
//! [`middleware`] module for the chaining rules.

mod adapter;
mod envelope;
mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod health;
pub mod middleware;

pub use envelope::Envelope;
pub use error::Error;
pub use handler::Handler;
pub use middleware::{Middleware, Next};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;

// Method and status types come straight from the `http` crate; re-exported
// so applications rarely need to depend on it directly.
pub use http::{Method, StatusCode};
