//! Minimal manila example: enveloped JSON endpoints and health checks.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/users/42
//!   curl -X POST http://localhost:3000/users \
//!        -H 'content-type: application/json' \
//!        -d '{"name":"alice"}'
//!   curl http://localhost:3000/healthz

use manila::{health, middleware, Envelope, Request, Response, Router, Server, StatusCode};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct User {
    id: u32,
    name: String,
}

#[derive(Deserialize)]
struct CreateUser {
    name: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let app = Router::new()
        .layer(middleware::trace)
        .get("/users/{id}", get_user)
        .post("/users", create_user)
        .get("/healthz", health::liveness)
        .get("/readyz", health::readiness);

    Server::bind("0.0.0.0:3000")
        .serve(app)
        .await
        .expect("server error");
}

// GET /users/{id}  →  200 OK  {"body":{"id":42,"name":"alice"}}
async fn get_user(req: Request) -> Envelope<User> {
    let id = req.param("id").and_then(|v| v.parse().ok()).unwrap_or(0);
    Envelope::new(User { id, name: "alice".to_owned() })
}

// POST /users
//
// The envelope always answers 200, so validation failures are built as
// plain responses instead.
async fn create_user(req: Request) -> Response {
    let Ok(input) = serde_json::from_slice::<CreateUser>(req.body()) else {
        return Response::status(StatusCode::BAD_REQUEST);
    };

    let user = User { id: 99, name: input.name };
    match Envelope::new(user).to_response() {
        Ok(res) => res,
        Err(_) => Response::status(StatusCode::INTERNAL_SERVER_ERROR),
    }
}
