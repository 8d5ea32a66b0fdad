//! Radix-tree request router and middleware registration.
//!
//! One tree per HTTP method, O(path-length) lookup. The router also owns
//! the middleware stack: stages appended with [`Router::layer`] run in
//! registration order around every matched handler.

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use matchit::Router as PathTree;

use crate::handler::{BoxedHandler, Handler};
use crate::middleware::{BoxedMiddleware, Middleware};

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Each registration returns `self` so calls chain naturally.
pub struct Router {
    routes: HashMap<Method, PathTree<BoxedHandler>>,
    middleware: Vec<BoxedMiddleware>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), middleware: Vec::new() }
    }

    /// Register a handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves
    /// them.
    ///
    /// # Panics
    ///
    /// Panics on a malformed or conflicting route pattern. Routes are
    /// registered at startup, so this surfaces immediately.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::GET, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::POST, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::PUT, path, handler)
    }

    pub fn patch(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::PATCH, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::DELETE, path, handler)
    }

    /// Append a middleware stage. Stages wrap every route on this router
    /// and run in the order they were layered.
    pub fn layer(mut self, middleware: impl Middleware) -> Self {
        self.middleware.push(middleware.into_boxed_middleware());
        self
    }

    pub(crate) fn lookup(
        &self,
        method: &Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched
            .params
            .iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }

    /// The middleware stack, frozen for sharing across connection tasks.
    pub(crate) fn middleware_stack(&self) -> Arc<[BoxedMiddleware]> {
        Arc::from(self.middleware.as_slice())
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::*;
    use crate::Response;

    async fn ok(_req: crate::Request) -> Response {
        Response::status(StatusCode::OK)
    }

    #[test]
    fn lookup_matches_method_and_path() {
        let router = Router::new().get("/users/{id}", ok);

        let (_, params) = router.lookup(&Method::GET, "/users/42").unwrap();
        assert_eq!(params["id"], "42");

        assert!(router.lookup(&Method::POST, "/users/42").is_none());
        assert!(router.lookup(&Method::GET, "/users").is_none());
    }

    #[test]
    fn layers_accumulate_in_order() {
        async fn noop(req: crate::Request, next: crate::Next) -> Response {
            next.run(req).await
        }

        let router = Router::new().layer(noop).layer(noop);
        assert_eq!(router.middleware_stack().len(), 2);
    }

    #[test]
    #[should_panic(expected = "invalid route")]
    fn conflicting_routes_panic_at_registration() {
        let _ = Router::new().get("/users/{id}", ok).get("/users/{name}", ok);
    }
}
