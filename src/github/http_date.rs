// HTTP date formatting for conditional requests.

use std::time::SystemTime;

use chrono::{DateTime, Utc};

/// Format a timestamp as an RFC 1123 date in GMT, as used by `If-Modified-Since`.
pub fn format_http_date(time: SystemTime) -> String {
    let time: DateTime<Utc> = time.into();
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
