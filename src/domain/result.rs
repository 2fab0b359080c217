//! Result type alias for pimbridge

use super::errors::SyncError;

/// Result type alias for pimbridge operations
///
/// This is a convenience type alias that uses `SyncError` as the error type.
///
/// # Examples
///
/// ```
/// use pimbridge::domain::result::Result;
/// use pimbridge::domain::errors::SyncError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(SyncError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_alias() {
        let ok: Result<u8> = Ok(1);
        assert!(ok.is_ok());

        let err: Result<u8> = Err(SyncError::Other("boom".to_string()));
        assert_eq!(err.unwrap_err().to_string(), "boom");
    }
}
