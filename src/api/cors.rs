//! CORS layer built from configured origins.
//!
//! Origins are either exact (`https://huggingface.co`) or a subdomain
//! wildcard (`https://*.hf.space`). Methods and headers are mirrored
//! from the preflight request, and credentials are allowed.

use axum::http::request::Parts;
use axum::http::HeaderValue;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginPattern {
    Exact(String),
    /// `scheme://*.suffix` — `suffix` keeps its leading dot.
    Subdomain { scheme: String, suffix: String },
}

impl OriginPattern {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim().trim_end_matches('/').to_ascii_lowercase();
        if let Some((scheme, rest)) = raw.split_once("://") {
            if let Some(domain) = rest.strip_prefix('*') {
                if domain.starts_with('.') {
                    return OriginPattern::Subdomain {
                        scheme: format!("{scheme}://"),
                        suffix: domain.to_string(),
                    };
                }
            }
        }
        OriginPattern::Exact(raw)
    }

    pub fn matches(&self, origin: &str) -> bool {
        let origin = origin.to_ascii_lowercase();
        match self {
            OriginPattern::Exact(exact) => origin == *exact,
            OriginPattern::Subdomain { scheme, suffix } => origin
                .strip_prefix(scheme.as_str())
                .and_then(|host| host.strip_suffix(suffix.as_str()))
                .is_some_and(|sub| {
                    !sub.is_empty()
                        && !sub.starts_with('.')
                        && sub
                            .chars()
                            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
                }),
        }
    }
}

/// `None` when no origins are configured (no CORS headers at all).
pub fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    if origins.is_empty() {
        return None;
    }
    let patterns: Vec<OriginPattern> = origins.iter().map(|o| OriginPattern::parse(o)).collect();

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::predicate(
                move |origin: &HeaderValue, _parts: &Parts| {
                    origin
                        .to_str()
                        .map(|o| patterns.iter().any(|p| p.matches(o)))
                        .unwrap_or(false)
                },
            ))
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true),
    )
}
