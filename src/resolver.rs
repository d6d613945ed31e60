//! Publication date resolution.
//!
//! A resource's publication date comes from the `Last-Modified` header of a
//! HEAD request. The probe is best effort: when it times out, fails, or the
//! header is missing or unparseable, the current UTC date is used instead.

use crate::http::Transport;
use crate::models::{DateSource, ResolvedDate};
use crate::utils::utc_today;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::{debug, instrument, warn};

/// Resolve the publication date for `url`. Never fails.
#[instrument(level = "debug", skip(transport))]
pub async fn resolve_publication_date<T: Transport>(transport: &T, url: &str) -> ResolvedDate {
    let reason = match transport.last_modified(url).await {
        Ok(Some(raw)) => match parse_http_date(&raw) {
            Some(date) => {
                debug!(%date, last_modified = %raw, "Using server publication date");
                return ResolvedDate {
                    date,
                    source: DateSource::LastModified,
                };
            }
            None => format!("unparseable Last-Modified value {:?}", raw),
        },
        Ok(None) => "server did not report Last-Modified".to_string(),
        Err(e) => format!("could not fetch headers: {}", e),
    };

    let date = utc_today();
    warn!(%url, %reason, fallback = %date, "Falling back to today's UTC date");
    ResolvedDate {
        date,
        source: DateSource::Fallback { reason },
    }
}

/// Parse an HTTP date header into the calendar date it names.
///
/// Accepts the three formats HTTP/1.1 recipients must handle
/// (IMF-fixdate, obsolete RFC 850, ANSI C `asctime`) plus RFC 3339. The
/// date is taken in the timezone stated by the value itself.
pub fn parse_http_date(value: &str) -> Option<NaiveDate> {
    let value = value.split_whitespace().collect::<Vec<_>>().join(" ");

    if let Ok(dt) = DateTime::parse_from_rfc2822(&value) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(&value) {
        return Some(dt.date_naive());
    }
    const NAIVE_FORMATS: [&str; 2] = [
        "%A, %d-%b-%y %H:%M:%S GMT", // RFC 850
        "%a %b %d %H:%M:%S %Y",      // asctime
    ];
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&value, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| parse_lenient(&value))
}

/// Last resort for servers that send a wrong weekday or a `UTC`/`UT`/`Z`
/// zone name: drop both and read the remaining date and time.
fn parse_lenient(value: &str) -> Option<NaiveDate> {
    let rest = match value.split_once(", ") {
        Some((weekday, rest)) if weekday.chars().all(|c| c.is_ascii_alphabetic()) => rest,
        _ => value,
    };
    let rest = match rest.rsplit_once(' ') {
        Some((head, zone)) if matches!(zone, "GMT" | "UTC" | "UT" | "Z") => head,
        _ => rest,
    };
    const LENIENT_FORMATS: [&str; 2] = ["%d %b %Y %H:%M:%S", "%d-%b-%y %H:%M:%S"];
    LENIENT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(rest, fmt).ok())
        .map(|dt| dt.date())
}
