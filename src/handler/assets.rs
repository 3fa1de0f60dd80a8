//! Bundled asset responses
//!
//! Given a resolved resource, decides between a 304 short-circuit and a full
//! response, and copies the resource into the response body.
//!
//! The resource is consumed by value: whichever way [`ResponseBuilder::build`]
//! returns, the stream has been released exactly once.

use std::io::{self, Read, Write};
use std::sync::Arc;

use hyper::header::HeaderName;
use tracing::debug;

use crate::handler::router::RequestContext;
use crate::http::cache::{format_http_date, CachePolicy, Clock, SystemClock};
use crate::http::mime::{self, ContentTypeFn};
use crate::resolver::{ResolvedResource, Resolver};

/// Buffer size used when copying a resource into the body
pub const COPY_BUFFER_SIZE: usize = 4096;

/// What to send back for a resolved resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseOutcome {
    /// 304 with only an `Expires` header
    NotModified { expires: String },
    /// 200 with the resource bytes written to the body sink
    Content {
        content_type: Option<String>,
        headers: Vec<(HeaderName, String)>,
        bytes_sent: u64,
    },
}

/// Builds responses for resolved resources under one cache policy
#[derive(Clone)]
pub struct ResponseBuilder {
    policy: CachePolicy,
    clock: Arc<dyn Clock>,
    content_type: ContentTypeFn,
}

impl ResponseBuilder {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            clock: Arc::new(SystemClock),
            content_type: mime::content_type_for,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_content_types(mut self, content_type: ContentTypeFn) -> Self {
        self.content_type = content_type;
        self
    }

    pub const fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    /// Answer a request for `resource`
    ///
    /// Content responses copy the whole resource into `body`. Errors from that
    /// copy are returned as-is; by then part of the body may already be
    /// written.
    pub fn build<W: Write + ?Sized>(
        &self,
        resource: ResolvedResource,
        request_path: &str,
        if_modified_since: Option<&str>,
        body: &mut W,
    ) -> io::Result<ResponseOutcome> {
        let now = self.clock.now();
        let expires = self.policy.expires_at(now);

        if self.policy.is_not_modified(if_modified_since) {
            resource.close();
            return Ok(ResponseOutcome::NotModified {
                expires: format_http_date(expires),
            });
        }

        let content_type = (self.content_type)(request_path);
        let headers = self.policy.content_headers(now);
        let bytes_sent = copy_resource(resource, body)?;

        Ok(ResponseOutcome::Content {
            content_type,
            headers,
            bytes_sent,
        })
    }
}

/// Copy a resource into `out` and flush; returns the number of bytes copied
pub fn copy_resource<W: Write + ?Sized>(
    mut resource: ResolvedResource,
    out: &mut W,
) -> io::Result<u64> {
    let mut buffer = [0u8; COPY_BUFFER_SIZE];
    let mut copied: u64 = 0;
    loop {
        let n = match resource.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        out.write_all(&buffer[..n])?;
        copied += n as u64;
    }
    out.flush()?;
    debug!(qualified = resource.qualified_path(), bytes = copied, "copied resource");
    Ok(copied)
}

/// A fully answered request: the outcome plus the body bytes
#[derive(Debug)]
pub struct ServedAsset {
    pub outcome: ResponseOutcome,
    pub body: Vec<u8>,
}

/// Resolver and response builder wired together
#[derive(Clone)]
pub struct AssetService {
    resolver: Resolver,
    responder: ResponseBuilder,
}

impl AssetService {
    pub fn new(resolver: Resolver, policy: CachePolicy) -> Self {
        Self::with_responder(resolver, ResponseBuilder::new(policy))
    }

    pub const fn with_responder(resolver: Resolver, responder: ResponseBuilder) -> Self {
        Self {
            resolver,
            responder,
        }
    }

    pub const fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub const fn responder(&self) -> &ResponseBuilder {
        &self.responder
    }

    /// Resolve and answer one request
    ///
    /// `None` means no prefix produced a resource; the caller answers 404.
    /// This blocks on resource I/O.
    pub fn serve(&self, ctx: &RequestContext) -> Option<io::Result<ServedAsset>> {
        let resource = self.resolver.resolve(&ctx.path)?;
        let mut body = Vec::new();
        let result = self
            .responder
            .build(
                resource,
                &ctx.path,
                ctx.if_modified_since.as_deref(),
                &mut body,
            )
            .map(|outcome| ServedAsset { outcome, body });
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::{MemoryProvider, ProviderChain, ResourceStream};
    use crate::config::PrefixList;
    use crate::http::cache::DEFAULT_EXPIRES_SECS;
    use crate::http::decode::Charset;
    use chrono::{DateTime, TimeZone, Utc};
    use hyper::header::{CACHE_CONTROL, DATE, EXPIRES, LAST_MODIFIED, PRAGMA, RETRY_AFTER};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    /// Counts how many times the wrapped stream is dropped
    struct DropCounted<R> {
        inner: R,
        drops: Arc<AtomicUsize>,
    }

    impl<R: Read> Read for DropCounted<R> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.inner.read(buf)
        }
    }

    impl<R> Drop for DropCounted<R> {
        fn drop(&mut self) {
            self.drops.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Yields some bytes, then fails
    struct FailingReader {
        served: bool,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.served {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
            }
            self.served = true;
            let n = buf.len().min(10);
            buf[..n].fill(b'x');
            Ok(n)
        }
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "client went away"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn deployed_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 2, 8, 0, 0).unwrap()
    }

    fn builder(cache_disabled: bool) -> ResponseBuilder {
        ResponseBuilder::new(CachePolicy::new(cache_disabled, 86_400, deployed_at()))
            .with_clock(Arc::new(FixedClock(now())))
    }

    fn resource(path: &str, stream: impl Read + Send + 'static) -> ResolvedResource {
        let stream: ResourceStream = Box::new(stream);
        ResolvedResource::new(path.to_string(), format!("memory:/{path}"), stream)
    }

    fn counted(
        path: &str,
        content: &'static [u8],
        drops: &Arc<AtomicUsize>,
    ) -> ResolvedResource {
        resource(
            path,
            DropCounted {
                inner: content,
                drops: Arc::clone(drops),
            },
        )
    }

    fn header<'a>(headers: &'a [(HeaderName, String)], name: &HeaderName) -> Option<&'a str> {
        headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_not_modified_releases_stream_unread() {
        let drops = Arc::new(AtomicUsize::new(0));
        let mut body = Vec::new();
        let outcome = builder(false)
            .build(
                counted("assets/app.js", b"console.log(1);", &drops),
                "/app.js",
                Some("Fri, 01 Mar 2024 12:00:00 GMT"),
                &mut body,
            )
            .unwrap();

        assert_eq!(
            outcome,
            ResponseOutcome::NotModified {
                expires: "Sun, 03 Mar 2024 08:00:00 GMT".to_string()
            }
        );
        assert!(body.is_empty());
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stale_client_copy_gets_content() {
        let mut body = Vec::new();
        let outcome = builder(false)
            .build(
                resource("assets/app.js", &b"console.log(1);"[..]),
                "/app.js",
                Some("Fri, 01 Mar 2024 12:00:01 GMT"),
                &mut body,
            )
            .unwrap();
        assert!(matches!(outcome, ResponseOutcome::Content { .. }));
        assert_eq!(body, b"console.log(1);");
    }

    #[test]
    fn test_epoch_and_absent_header_are_unconditional() {
        for header_value in [None, Some("Thu, 01 Jan 1970 00:00:00 GMT"), Some("yesterday")] {
            let mut body = Vec::new();
            let outcome = builder(false)
                .build(resource("assets/a.css", &b"a{}"[..]), "/a.css", header_value, &mut body)
                .unwrap();
            assert!(
                matches!(outcome, ResponseOutcome::Content { bytes_sent: 3, .. }),
                "{header_value:?}"
            );
        }
    }

    #[test]
    fn test_caching_headers() {
        let mut body = Vec::new();
        let outcome = builder(false)
            .build(resource("assets/site.css", &b"body{}"[..]), "/site.css", None, &mut body)
            .unwrap();

        let ResponseOutcome::Content {
            content_type,
            headers,
            bytes_sent,
        } = outcome
        else {
            panic!("expected content");
        };
        assert_eq!(content_type.as_deref(), Some("text/css"));
        assert_eq!(bytes_sent, 6);
        assert_eq!(header(&headers, &DATE), Some("Sat, 02 Mar 2024 08:00:00 GMT"));
        assert_eq!(header(&headers, &EXPIRES), Some("Sun, 03 Mar 2024 08:00:00 GMT"));
        assert_eq!(header(&headers, &RETRY_AFTER), Some("Sun, 03 Mar 2024 08:00:00 GMT"));
        assert_eq!(header(&headers, &CACHE_CONTROL), Some("public"));
        assert_eq!(header(&headers, &LAST_MODIFIED), Some("Fri, 01 Mar 2024 12:00:00 GMT"));
    }

    #[test]
    fn test_disabled_cache_headers() {
        let mut body = Vec::new();
        let outcome = builder(true)
            .build(resource("assets/site.css", &b"body{}"[..]), "/site.css", None, &mut body)
            .unwrap();

        let ResponseOutcome::Content { headers, .. } = outcome else {
            panic!("expected content");
        };
        let mut names: Vec<&str> = headers.iter().map(|(n, _)| n.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, ["cache-control", "expires", "pragma"]);
        assert_eq!(header(&headers, &CACHE_CONTROL), Some("no-cache"));
        assert_eq!(header(&headers, &PRAGMA), Some("no-cache"));
        assert_eq!(header(&headers, &EXPIRES), Some("-1"));
    }

    #[test]
    fn test_disabled_cache_still_honours_if_modified_since() {
        let mut body = Vec::new();
        let outcome = builder(true)
            .build(
                resource("assets/site.css", &b"body{}"[..]),
                "/site.css",
                Some("Fri, 01 Mar 2024 11:00:00 GMT"),
                &mut body,
            )
            .unwrap();
        assert!(matches!(outcome, ResponseOutcome::NotModified { .. }));
    }

    #[test]
    fn test_unknown_extension_has_no_content_type() {
        let mut body = Vec::new();
        let outcome = builder(false)
            .build(resource("assets/LICENSE", &b"MIT"[..]), "/LICENSE", None, &mut body)
            .unwrap();
        assert!(matches!(
            outcome,
            ResponseOutcome::Content {
                content_type: None,
                ..
            }
        ));
    }

    #[test]
    fn test_injected_content_types() {
        fn everything_is_text(_: &str) -> Option<String> {
            Some("text/plain".to_string())
        }

        let mut body = Vec::new();
        let outcome = builder(false)
            .with_content_types(everything_is_text)
            .build(resource("assets/LICENSE", &b"MIT"[..]), "/LICENSE", None, &mut body)
            .unwrap();
        assert!(matches!(
            outcome,
            ResponseOutcome::Content { content_type: Some(ref t), .. } if t == "text/plain"
        ));
    }

    #[test]
    fn test_body_round_trip_sizes() {
        for size in [
            0,
            1,
            COPY_BUFFER_SIZE - 1,
            COPY_BUFFER_SIZE,
            COPY_BUFFER_SIZE + 1,
            COPY_BUFFER_SIZE * 5,
        ] {
            let content: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
            let mut body = Vec::new();
            let outcome = builder(false)
                .build(
                    resource("assets/blob.bin", io::Cursor::new(content.clone())),
                    "/blob.bin",
                    None,
                    &mut body,
                )
                .unwrap();
            assert!(
                matches!(outcome, ResponseOutcome::Content { bytes_sent, .. } if bytes_sent == size as u64)
            );
            assert_eq!(body, content, "size {size}");
        }
    }

    #[test]
    fn test_content_releases_stream_once() {
        let drops = Arc::new(AtomicUsize::new(0));
        let mut body = Vec::new();
        builder(false)
            .build(counted("assets/app.js", b"console.log(1);", &drops), "/app.js", None, &mut body)
            .unwrap();
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_read_failure_propagates_and_releases() {
        let drops = Arc::new(AtomicUsize::new(0));
        let failing = resource(
            "assets/big.bin",
            DropCounted {
                inner: FailingReader { served: false },
                drops: Arc::clone(&drops),
            },
        );
        let mut body = Vec::new();
        let err = builder(false)
            .build(failing, "/big.bin", None, &mut body)
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
        assert_eq!(body.len(), 10);
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_write_failure_propagates_and_releases() {
        let drops = Arc::new(AtomicUsize::new(0));
        let err = builder(false)
            .build(
                counted("assets/app.js", b"console.log(1);", &drops),
                "/app.js",
                None,
                &mut FailingWriter,
            )
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    fn service() -> AssetService {
        let resolver = Resolver::new(
            PrefixList::parse("assets/").unwrap(),
            Charset::default(),
            ProviderChain::new()
                .with(MemoryProvider::new("bundle").with_resource("assets/app.js", "console.log(1);")),
        );
        AssetService::with_responder(
            resolver,
            ResponseBuilder::new(CachePolicy::new(false, DEFAULT_EXPIRES_SECS, deployed_at()))
                .with_clock(Arc::new(FixedClock(now()))),
        )
    }

    fn get(path: &str) -> RequestContext {
        RequestContext {
            path: path.to_string(),
            is_head: false,
            if_modified_since: None,
        }
    }

    #[test]
    fn test_serve_script() {
        let served = service().serve(&get("/app.js")).unwrap().unwrap();
        assert_eq!(served.body, b"console.log(1);");
        assert!(matches!(
            served.outcome,
            ResponseOutcome::Content { content_type: Some(ref t), .. } if t == "application/javascript"
        ));
    }

    #[test]
    fn test_serve_missing() {
        assert!(service().serve(&get("/missing.js")).is_none());
    }
}
