//! HTTP middleware: rate limiting, security headers, request IDs

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::header::{self, HeaderName, HeaderValue};
use axum::http::{Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::infrastructure::ratelimit::IpRateLimiter;

use super::extractors::AuthState;
use super::models::ErrorResponse;

static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Resolve the client IP for rate limiting.
///
/// Proxy headers take precedence over the socket address so limits apply to
/// the real client rather than the load balancer. Only trust these headers
/// when the service sits behind a proxy that strips them from inbound traffic.
pub fn client_ip(request: &Request) -> String {
    if let Some(forwarded) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
    {
        // First entry is the originating client
        if let Some(ip) = forwarded.split(',').next() {
            let ip = ip.trim();
            if !ip.is_empty() {
                return ip.to_string();
            }
        }
    }

    if let Some(real_ip) = request
        .headers()
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
    {
        let ip = real_ip.trim();
        if !ip.is_empty() {
            return ip.to_string();
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Per-IP rate limiting for general API traffic
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<IpRateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let ip = client_ip(&request);
    if !limiter.allow(&ip) {
        tracing::warn!(client_ip = %ip, path = %request.uri().path(), "Rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorResponse::new(
                "RATE_LIMIT_EXCEEDED",
                "Rate limit exceeded",
                Some("Too many requests from your IP address".to_string()),
            )),
        )
            .into_response();
    }
    next.run(request).await
}

/// Stricter per-IP rate limiting for authentication endpoints.
///
/// Runs in addition to the general limiter; a request to an auth route must
/// pass both.
pub async fn auth_rate_limit_middleware(
    State(limiter): State<Arc<IpRateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let ip = client_ip(&request);
    if !limiter.allow(&ip) {
        tracing::warn!(client_ip = %ip, path = %request.uri().path(), "Auth rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorResponse::new(
                "AUTH_RATE_LIMIT_EXCEEDED",
                "Authentication rate limit exceeded",
                Some("Too many authentication attempts from your IP address".to_string()),
            )),
        )
            .into_response();
    }
    next.run(request).await
}

/// Reject write requests that do not declare a JSON body.
///
/// Applies to POST, PUT and PATCH; a charset parameter on the media type is
/// accepted. Keeps malformed submissions on the error envelope instead of
/// the extractor's bare rejection.
pub async fn validate_content_type_middleware(request: Request, next: Next) -> Response {
    let method = request.method();
    if method == Method::POST || method == Method::PUT || method == Method::PATCH {
        let is_json = request
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.trim().starts_with("application/json"))
            .unwrap_or(false);

        if !is_json {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(
                    "BAD_REQUEST",
                    "Invalid Content-Type",
                    Some("Content-Type must be application/json".to_string()),
                )),
            )
                .into_response();
        }
    }
    next.run(request).await
}

/// Make the token validation use case available to the `AuthUser` extractor
pub async fn inject_auth_state_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    request.extensions_mut().insert(auth_state);
    next.run(request).await
}

/// Attach an `X-Request-ID` to every request and echo it on the response.
/// Reuses the caller's value when present so IDs survive proxy hops.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        request.headers_mut().insert(X_REQUEST_ID.clone(), value);
    }

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(X_REQUEST_ID.clone(), value);
    }
    response
}

/// Add standard security headers to every response
pub async fn security_headers_middleware(
    State(security): State<Arc<SecurityConfig>>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "x-xss-protection",
        HeaderValue::from_static("1; mode=block"),
    );
    headers.insert(
        "referrer-policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
    );

    let hsts = if security.hsts_include_subdomains {
        format!("max-age={}; includeSubDomains", security.hsts_max_age)
    } else {
        format!("max-age={}", security.hsts_max_age)
    };
    if let Ok(value) = HeaderValue::from_str(&hsts) {
        headers.insert("strict-transport-security", value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;

    fn request_with_headers(headers: &[(&str, &str)]) -> Request {
        let mut builder = HttpRequest::builder().uri("/api/v1/protected");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn forwarded_for_takes_precedence() {
        let request = request_with_headers(&[
            ("x-forwarded-for", "203.0.113.7, 10.0.0.1"),
            ("x-real-ip", "10.0.0.2"),
        ]);
        assert_eq!(client_ip(&request), "203.0.113.7");
    }

    #[test]
    fn real_ip_used_when_no_forwarded_for() {
        let request = request_with_headers(&[("x-real-ip", "198.51.100.23")]);
        assert_eq!(client_ip(&request), "198.51.100.23");
    }

    #[test]
    fn falls_back_to_socket_address() {
        let mut request = request_with_headers(&[]);
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 1], 4242))));
        assert_eq!(client_ip(&request), "192.0.2.1");
    }

    #[test]
    fn unknown_when_nothing_available() {
        let request = request_with_headers(&[]);
        assert_eq!(client_ip(&request), "unknown");
    }

    #[test]
    fn empty_forwarded_for_is_skipped() {
        let request =
            request_with_headers(&[("x-forwarded-for", "  "), ("x-real-ip", "198.51.100.9")]);
        assert_eq!(client_ip(&request), "198.51.100.9");
    }
}
