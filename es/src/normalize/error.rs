//! Normalizer error types

use thiserror::Error;

/// Tool call data whose shape does not fit the tool kind's contract
///
/// These are logic errors in the caller; no event is produced.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("{tool}: arguments must be a JSON object, got {found}")]
    ArgsNotObject { tool: String, found: &'static str },

    #[error("{tool}: expected a structured tool result")]
    UnstructuredResult { tool: String },

    #[error("{tool}: invalid argument '{field}': {reason}")]
    InvalidArgument { tool: String, field: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_not_object_message() {
        let err = NormalizeError::ArgsNotObject {
            tool: "bash".to_string(),
            found: "string",
        };

        let msg = err.to_string();
        assert!(msg.contains("bash"));
        assert!(msg.contains("string"));
    }

    #[test]
    fn test_invalid_argument_message() {
        let err = NormalizeError::InvalidArgument {
            tool: "browser_use".to_string(),
            field: "index".to_string(),
            reason: "invalid type".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("browser_use"));
        assert!(msg.contains("'index'"));
    }
}
