//! Import identifier parsing

use skyport_cloud::CloudError;

/// Split a `/`-separated import identifier into exactly `N` non-empty parts.
///
/// `format` is echoed back in the error, e.g. `"<namespace>/<name>"`.
pub fn parse_import_id<const N: usize>(id: &str, format: &str) -> Result<[String; N], CloudError> {
    let invalid = || CloudError::validation("import identifier", format, id);

    let parts: Vec<String> = id.split('/').map(|p| p.trim().to_string()).collect();
    if parts.iter().any(|p| p.is_empty()) {
        return Err(invalid());
    }
    parts.try_into().map_err(|_| invalid())
}
