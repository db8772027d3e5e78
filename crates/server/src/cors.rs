//! CORS layer built from `[server.cors]`.
//!
//! botchat only serves `GET` routes, so the policy is just "which origins".

use axum::http::{header, HeaderValue, Method};
use bc_domain::config::CorsConfig;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Resolved origin rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginPolicy {
    /// `"*"` appears in the list: every origin is accepted.
    Open,
    /// Only these exact origins. Unparseable entries are left out.
    Exact(Vec<HeaderValue>),
}

pub fn origin_policy(cors: &CorsConfig) -> OriginPolicy {
    if cors.allowed_origins.iter().any(|o| o == "*") {
        return OriginPolicy::Open;
    }
    let origins = cors
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "invalid CORS origin, skipping");
                None
            }
        })
        .collect();
    OriginPolicy::Exact(origins)
}

pub fn build_cors_layer(cors: &CorsConfig) -> CorsLayer {
    let allow_origin = match origin_policy(cors) {
        OriginPolicy::Open => {
            tracing::info!("CORS open to all origins");
            AllowOrigin::from(Any)
        }
        OriginPolicy::Exact(origins) => {
            tracing::info!(count = origins.len(), "CORS restricted to listed origins");
            AllowOrigin::list(origins)
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cors(origins: &[&str]) -> CorsConfig {
        CorsConfig {
            allowed_origins: origins.iter().map(|o| o.to_string()).collect(),
        }
    }

    #[test]
    fn default_is_open() {
        assert_eq!(origin_policy(&CorsConfig::default()), OriginPolicy::Open);
    }

    #[test]
    fn star_anywhere_opens_the_policy() {
        assert_eq!(
            origin_policy(&cors(&["http://localhost:3000", "*"])),
            OriginPolicy::Open
        );
    }

    #[test]
    fn exact_origins_skip_invalid_entries() {
        assert_eq!(
            origin_policy(&cors(&["http://localhost:3000", "bad\norigin"])),
            OriginPolicy::Exact(vec![HeaderValue::from_static("http://localhost:3000")])
        );
    }

    #[test]
    fn empty_list_allows_nothing() {
        assert_eq!(origin_policy(&cors(&[])), OriginPolicy::Exact(Vec::new()));
        let _layer = build_cors_layer(&cors(&[]));
    }
}
