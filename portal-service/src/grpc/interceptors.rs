//! gRPC interceptors for cross-cutting concerns

use std::time::Duration;

use tonic::metadata::MetadataMap;
use tonic::{Request, Status};
use uuid::Uuid;

/// Metadata key carrying the correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request ID interceptor
///
/// Keeps the caller's `x-request-id` or generates one, so every handler can read it
/// back from metadata.
pub fn request_id_interceptor<T>(mut req: Request<T>) -> Result<Request<T>, Status> {
    let request_id = request_id(req.metadata()).unwrap_or_else(|| Uuid::new_v4().to_string());

    req.metadata_mut().insert(
        REQUEST_ID_HEADER,
        request_id
            .parse()
            .map_err(|_| Status::internal("Failed to parse request ID"))?,
    );

    Ok(req)
}

/// Non-empty `x-request-id` value, if present
pub fn request_id(metadata: &MetadataMap) -> Option<String> {
    metadata
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Client deadline from the `grpc-timeout` header
///
/// The value is at most eight digits followed by a unit: `H`, `M`, `S`, `m` (millis),
/// `u` (micros) or `n` (nanos).
pub fn grpc_timeout(metadata: &MetadataMap) -> Option<Duration> {
    let raw = metadata.get("grpc-timeout")?.to_str().ok()?;
    if raw.len() < 2 || raw.len() > 9 {
        return None;
    }
    let (digits, unit) = raw.split_at(raw.len() - 1);
    let value: u64 = digits.parse().ok()?;

    Some(match unit {
        "H" => Duration::from_secs(value * 60 * 60),
        "M" => Duration::from_secs(value * 60),
        "S" => Duration::from_secs(value),
        "m" => Duration::from_millis(value),
        "u" => Duration::from_micros(value),
        "n" => Duration::from_nanos(value),
        _ => return None,
    })
}
