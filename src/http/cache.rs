//! HTTP cache control module
//!
//! Conditional GET via `If-Modified-Since` and the `Expires`/`Cache-Control`
//! header sets sent with bundled content.
//!
//! Bundled resources carry no modification time of their own, so the whole
//! bundle shares one `Last-Modified` instant: the moment the process started.

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use hyper::header::{
    HeaderName, CACHE_CONTROL, DATE, EXPIRES, LAST_MODIFIED, PRAGMA, RETRY_AFTER,
};

/// Default `expires` delta: 365 days
pub const DEFAULT_EXPIRES_SECS: i64 = 31_536_000;

const IMF_FIXDATE: &str = "%a, %d %b %Y %H:%M:%S GMT";
const RFC_850: &str = "%A, %d-%b-%y %H:%M:%S GMT";
const ASCTIME: &str = "%a %b %e %H:%M:%S %Y";

/// Wall-clock source
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// [`Clock`] backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Cache policy shared by every bundled resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Send `no-cache` headers instead of the caching set
    pub cache_disabled: bool,
    /// Seconds added to "now" for `Expires`/`Retry-After`
    pub expires_delta_secs: i64,
    /// Fixed at startup, never per resource
    pub last_modified: DateTime<Utc>,
}

impl CachePolicy {
    pub const fn new(
        cache_disabled: bool,
        expires_delta_secs: i64,
        last_modified: DateTime<Utc>,
    ) -> Self {
        Self {
            cache_disabled,
            expires_delta_secs,
            last_modified,
        }
    }

    /// `now + expires_delta_secs`, saturating at the representable bounds
    pub fn expires_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        TimeDelta::try_seconds(self.expires_delta_secs)
            .and_then(|delta| now.checked_add_signed(delta))
            .unwrap_or(if self.expires_delta_secs < 0 {
                DateTime::<Utc>::MIN_UTC
            } else {
                DateTime::<Utc>::MAX_UTC
            })
    }

    /// Whether a request carrying this `If-Modified-Since` value can be answered
    /// with 304
    ///
    /// Absent or unparsable values count as 0, which never matches.
    pub fn is_not_modified(&self, if_modified_since: Option<&str>) -> bool {
        let since = if_modified_since
            .and_then(parse_http_date)
            .map_or(0, |t| t.timestamp_millis());
        since > 0 && since <= self.last_modified.timestamp_millis()
    }

    /// Headers for a full content response
    pub fn content_headers(&self, now: DateTime<Utc>) -> Vec<(HeaderName, String)> {
        if self.cache_disabled {
            return vec![
                (CACHE_CONTROL, "no-cache".to_string()),
                (PRAGMA, "no-cache".to_string()),
                (EXPIRES, "-1".to_string()),
            ];
        }

        let expires = format_http_date(self.expires_at(now));
        vec![
            (DATE, format_http_date(now)),
            (EXPIRES, expires.clone()),
            (RETRY_AFTER, expires),
            (CACHE_CONTROL, "public".to_string()),
            (LAST_MODIFIED, format_http_date(self.last_modified)),
        ]
    }
}

/// Format a timestamp as an HTTP date (`Sun, 06 Nov 1994 08:49:37 GMT`)
pub fn format_http_date(time: DateTime<Utc>) -> String {
    time.format(IMF_FIXDATE).to_string()
}

/// Parse an HTTP date in any of the three forms RFC 9110 requires recipients
/// to accept
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc2822(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    // asctime pads single-digit days with a space
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
    [IMF_FIXDATE, RFC_850, ASCTIME]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&collapsed, format).ok())
        .map(|naive| naive.and_utc())
}
