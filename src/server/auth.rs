//! Authentication middleware for the server
//!
//! Validates Bearer tokens on API requests. The submission endpoint is
//! exempt: its credential arrives in the request body (`authToken`) and is
//! checked by the handler itself, so the same token travels one of two ways
//! but is verified exactly once per request.

use axum::{
    body::Body,
    extract::Request,
    http::{header::AUTHORIZATION, Method, StatusCode},
    response::Response,
};
use std::sync::Arc;
use tower::Layer;

/// Authentication layer that validates Bearer tokens on `/api/` paths
#[derive(Clone)]
pub struct AuthLayer {
    token: Arc<String>,
}

impl AuthLayer {
    pub fn new(token: String) -> Self {
        Self {
            token: Arc::new(token),
        }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            token: self.token.clone(),
        }
    }
}

/// The actual middleware service
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    token: Arc<String>,
}

/// Routes whose credential is carried in the request body instead of the
/// Authorization header
fn is_body_authenticated(method: &Method, path: &str) -> bool {
    *method == Method::POST && path == "/api/research"
}

impl<S> tower::Service<Request> for AuthMiddleware<S>
where
    S: tower::Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let token = self.token.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let path = req.uri().path();
            let method = req.method().clone();

            // CORS preflight requests pass through unauthenticated
            if method == Method::OPTIONS {
                return inner.call(req).await;
            }

            // Health, version and anything outside /api/ are public
            if !req.uri().path().starts_with("/api/") {
                return inner.call(req).await;
            }

            // The submission route authenticates via its body field
            if is_body_authenticated(&method, path) {
                return inner.call(req).await;
            }

            if let Some(auth_header) = req.headers().get(AUTHORIZATION) {
                if let Ok(auth_str) = auth_header.to_str() {
                    if let Some(provided) = auth_str.strip_prefix("Bearer ") {
                        if provided == token.as_str() {
                            return inner.call(req).await;
                        }
                    }
                }
            }

            Ok(Response::builder()
                .status(StatusCode::UNAUTHORIZED)
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"error":"Unauthorized: invalid or missing auth token"}"#,
                ))
                .unwrap())
        })
    }
}

/// Generate a secure random auth token (16 random bytes, hex-encoded)
pub fn generate_auth_token() -> String {
    use rand::Rng;
    let bytes: [u8; 16] = rand::thread_rng().gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
