//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, header
//! extraction, and handing the blocking asset work to tokio's blocking pool.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;

use http_body_util::Full;
use hyper::body::{Body as _, Bytes};
use hyper::header::IF_MODIFIED_SINCE;
use hyper::{Method, Request, Response};
use tracing::{error, warn};

use crate::config::AppState;
use crate::http;
use crate::logger;

/// Request context encapsulating information needed for request processing
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub path: String,
    pub is_head: bool,
    pub if_modified_since: Option<String>,
}

impl RequestContext {
    pub fn from_request<B>(req: &Request<B>) -> Self {
        Self {
            path: req.uri().path().to_string(),
            is_head: req.method() == Method::HEAD,
            if_modified_since: req
                .headers()
                .get(IF_MODIFIED_SINCE)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string),
        }
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method().clone();

    let response = match check_http_method(&method) {
        Some(resp) => resp,
        None => serve_asset(RequestContext::from_request(&req), &state).await,
    };

    if state.access_log {
        logger::log_access(
            &method,
            req.uri().path(),
            response.status(),
            response.body().size_hint().exact().unwrap_or(0),
            started.elapsed(),
        );
    }

    Ok(response)
}

/// Return 405 for anything but GET/HEAD
fn check_http_method(method: &Method) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        _ => {
            warn!(%method, "method not allowed");
            Some(http::build_405_response())
        }
    }
}

/// Resolve and copy on the blocking pool, then build the hyper response
async fn serve_asset(ctx: RequestContext, state: &Arc<AppState>) -> Response<Full<Bytes>> {
    let is_head = ctx.is_head;
    let path = ctx.path.clone();
    let state = Arc::clone(state);

    match tokio::task::spawn_blocking(move || state.assets.serve(&ctx)).await {
        Ok(Some(Ok(served))) => http::build_asset_response(served.outcome, served.body, is_head),
        Ok(Some(Err(e))) => {
            error!(path = %path, error = %e, "failed to copy resource");
            http::build_500_response()
        }
        Ok(None) => http::build_404_response(),
        Err(e) => {
            error!(path = %path, error = %e, "asset task failed");
            http::build_500_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::{MemoryProvider, ProviderChain};
    use crate::config::{
        AssetsConfig, Config, LoggingConfig, PerformanceConfig, PrefixList, ServerConfig,
    };
    use crate::handler::AssetService;
    use crate::http::cache::CachePolicy;
    use crate::http::decode::Charset;
    use crate::resolver::Resolver;
    use chrono::{Duration, Utc};
    use http_body_util::BodyExt;
    use hyper::header::{CONTENT_LENGTH, CONTENT_TYPE, EXPIRES, LAST_MODIFIED};
    use hyper::StatusCode;

    fn config() -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                workers: None,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                access_log: false,
            },
            performance: PerformanceConfig {
                keep_alive: true,
                request_timeout: 30,
                max_connections: None,
            },
            assets: AssetsConfig {
                packages: "assets/".to_string(),
                disable_cache: "false".to_string(),
                encoding: "UTF-8".to_string(),
                expires: "3600".to_string(),
                overlay_dir: None,
            },
        }
    }

    fn state() -> Arc<AppState> {
        let resolver = Resolver::new(
            PrefixList::parse("assets/").unwrap(),
            Charset::default(),
            ProviderChain::new()
                .with(MemoryProvider::new("bundle").with_resource("assets/app.js", "console.log(1);")),
        );
        let policy = CachePolicy::new(false, 3600, Utc::now() - Duration::hours(1));
        Arc::new(AppState::from_parts(config(), AssetService::new(resolver, policy)))
    }

    fn request(method: Method, path: &str) -> Request<()> {
        Request::builder().method(method).uri(path).body(()).unwrap()
    }

    async fn body_bytes(response: Response<Full<Bytes>>) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_get_bundled_script() {
        let response = handle_request(request(Method::GET, "/app.js"), state())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "application/javascript"
        );
        assert_eq!(response.headers().get(CONTENT_LENGTH).unwrap(), "15");
        assert!(response.headers().contains_key(LAST_MODIFIED));
        assert_eq!(body_bytes(response).await, "console.log(1);");
    }

    #[tokio::test]
    async fn test_query_string_is_ignored() {
        let response = handle_request(request(Method::GET, "/app.js?v=3"), state())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_is_404() {
        let response = handle_request(request(Method::GET, "/missing.js"), state())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_head_has_headers_but_no_body() {
        let response = handle_request(request(Method::HEAD, "/app.js"), state())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(CONTENT_LENGTH).unwrap(), "15");
        assert!(body_bytes(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_conditional_get() {
        let since = crate::http::cache::format_http_date(Utc::now() - Duration::hours(2));
        let req = Request::builder()
            .uri("/app.js")
            .header("If-Modified-Since", since)
            .body(())
            .unwrap();
        let response = handle_request(req, state()).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(response.headers().len(), 1);
        assert!(response.headers().contains_key(EXPIRES));
        assert!(body_bytes(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_post_is_rejected() {
        let response = handle_request(request(Method::POST, "/app.js"), state())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get("Allow").unwrap(), "GET, HEAD");
    }
}
