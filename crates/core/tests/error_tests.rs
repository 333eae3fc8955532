// ═══════════════════════════════════════════════════════════════════
// Error Tests — CoreError variants, Display formatting, classification,
// From impls
// ═══════════════════════════════════════════════════════════════════

use portfolio_tracker_core::errors::CoreError;

fn all_variants() -> Vec<CoreError> {
    vec![
        CoreError::Timeout("t".into()),
        CoreError::Network("n".into()),
        CoreError::Api {
            provider: "p".into(),
            message: "m".into(),
        },
        CoreError::InvalidResponse("r".into()),
        CoreError::Storage("s".into()),
        CoreError::InvalidFileFormat("f".into()),
        CoreError::UnsupportedVersion(2),
        CoreError::Serialization("s".into()),
        CoreError::Deserialization("d".into()),
        CoreError::NoDataAvailable("none".into()),
        CoreError::ValidationError("v".into()),
        CoreError::Cancelled,
    ]
}

// ── Display formatting ──────────────────────────────────────────────

mod display {
    use super::*;

    #[test]
    fn timeout() {
        let err = CoreError::Timeout("30s elapsed".into());
        assert_eq!(err.to_string(), "Request timed out: 30s elapsed");
    }

    #[test]
    fn network() {
        let err = CoreError::Network("connection refused".into());
        assert_eq!(err.to_string(), "Network error: connection refused");
    }

    #[test]
    fn api_error() {
        let err = CoreError::Api {
            provider: "HoldingsApi".into(),
            message: "HTTP 404".into(),
        };
        assert_eq!(err.to_string(), "API error (HoldingsApi): HTTP 404");
    }

    #[test]
    fn invalid_response() {
        let err = CoreError::InvalidResponse("missing field `data`".into());
        assert_eq!(err.to_string(), "Invalid response: missing field `data`");
    }

    #[test]
    fn storage() {
        let err = CoreError::Storage("permission denied".into());
        assert_eq!(err.to_string(), "Storage error: permission denied");
    }

    #[test]
    fn invalid_file_format() {
        let err = CoreError::InvalidFileFormat("bad header".into());
        assert_eq!(err.to_string(), "Invalid cache file format: bad header");
    }

    #[test]
    fn unsupported_version() {
        let err = CoreError::UnsupportedVersion(99);
        assert_eq!(err.to_string(), "Unsupported cache schema version: 99");
    }

    #[test]
    fn serialization() {
        let err = CoreError::Serialization("buffer overflow".into());
        assert_eq!(err.to_string(), "Serialization error: buffer overflow");
    }

    #[test]
    fn deserialization() {
        let err = CoreError::Deserialization("unexpected EOF".into());
        assert_eq!(err.to_string(), "Deserialization error: unexpected EOF");
    }

    #[test]
    fn no_data_available_is_the_bare_message() {
        let err = CoreError::NoDataAvailable("No internet connection and no cached data available".into());
        assert_eq!(
            err.to_string(),
            "No internet connection and no cached data available"
        );
    }

    #[test]
    fn validation_error() {
        let err = CoreError::ValidationError("retry multiplier must be >= 1".into());
        assert_eq!(err.to_string(), "Validation failed: retry multiplier must be >= 1");
    }

    #[test]
    fn cancelled() {
        assert_eq!(CoreError::Cancelled.to_string(), "Operation cancelled");
    }
}

// ── Classification ──────────────────────────────────────────────────

mod classification {
    use super::*;

    #[test]
    fn only_timeouts_and_network_errors_are_transient() {
        let transient: Vec<bool> = all_variants().iter().map(CoreError::is_transient).collect();
        assert_eq!(
            transient,
            vec![true, true, false, false, false, false, false, false, false, false, false, false]
        );
    }

    #[test]
    fn only_cancelled_is_cancellation() {
        let cancellations = all_variants()
            .iter()
            .filter(|e| e.is_cancellation())
            .count();
        assert_eq!(cancellations, 1);
        assert!(CoreError::Cancelled.is_cancellation());
        assert!(!CoreError::Cancelled.is_transient());
    }
}

// ── From impls ──────────────────────────────────────────────────────

mod conversions {
    use super::*;

    #[test]
    fn from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only filesystem");
        let err: CoreError = io.into();
        assert!(matches!(err, CoreError::Storage(ref m) if m.contains("read-only filesystem")));
    }

    #[test]
    fn from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{ invalid").unwrap_err();
        let err: CoreError = json_err.into();
        assert!(matches!(err, CoreError::Deserialization(_)));
    }

    #[test]
    fn from_bincode_error() {
        let bin_err = bincode::deserialize::<String>(&[0xFF]).unwrap_err();
        let err: CoreError = bin_err.into();
        assert!(matches!(err, CoreError::Serialization(_)));
    }

    #[test]
    fn question_mark_converts() {
        fn read_missing() -> Result<Vec<u8>, CoreError> {
            Ok(std::fs::read("/definitely/not/here/holdings.cache")?)
        }
        assert!(matches!(read_missing(), Err(CoreError::Storage(_))));
    }
}

// ── Debug trait ─────────────────────────────────────────────────────

mod debug_trait {
    use super::*;

    #[test]
    fn all_variants_are_debug() {
        for err in all_variants() {
            assert!(!format!("{err:?}").is_empty());
        }
    }

    #[test]
    fn implements_std_error() {
        fn assert_error<E: std::error::Error + Send + Sync + 'static>(_: &E) {}
        assert_error(&CoreError::Cancelled);
    }
}
