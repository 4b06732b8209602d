use chrono::{DateTime, SecondsFormat, Utc};

/// RFC 3339 timestamp with second precision
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Payload for blob `sequence`, unique per iteration.
pub fn blob_payload(sequence: u32, now: DateTime<Utc>) -> Vec<u8> {
    format!(
        "Hello from BlobCell! Message #{sequence} at {}",
        format_timestamp(now)
    )
    .into_bytes()
}
