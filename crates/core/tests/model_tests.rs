// ═══════════════════════════════════════════════════════════════════
// Model Tests — holdings mapper, summary, settings, UI state
// ═══════════════════════════════════════════════════════════════════

use portfolio_tracker_core::mapper::{cached_to_item, item_to_cached, raw_to_item, try_raw_to_item};
use portfolio_tracker_core::models::holding::{CachedHolding, PortfolioItem, RawHolding};
use portfolio_tracker_core::models::settings::{Settings, DEFAULT_ENDPOINT_URL};
use portfolio_tracker_core::models::summary::PortfolioSummary;
use portfolio_tracker_core::presentation::ui_state::{PortfolioTab, PortfolioUiState};
use portfolio_tracker_core::errors::CoreError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::time::Duration;

fn raw(symbol: &str, quantity: u64, ltp: f64, avg_price: f64, close: f64) -> RawHolding {
    RawHolding {
        symbol: symbol.into(),
        quantity,
        ltp,
        avg_price,
        close,
    }
}

// ═══════════════════════════════════════════════════════════════════
// Mapper
// ═══════════════════════════════════════════════════════════════════

mod mapper {
    use super::*;

    #[test]
    fn derives_pnl_and_percentage() {
        let item = raw_to_item(&raw("TEST", 10, 100.0, 90.0, 95.0));
        assert_eq!(item.symbol, "TEST");
        assert_eq!(item.quantity, 10);
        assert_eq!(item.ltp, dec!(100.00));
        assert_eq!(item.avg_price, dec!(90.00));
        assert_eq!(item.close, dec!(95.00));
        assert_eq!(item.pnl, dec!(100.00));
        assert_eq!(item.pnl_percentage, dec!(11.11));
    }

    #[test]
    fn loss_is_negative() {
        let item = raw_to_item(&raw("B", 10, 100.0, 110.0, 105.0));
        assert_eq!(item.pnl, dec!(-100.00));
        assert_eq!(item.pnl_percentage, dec!(-9.09));
    }

    #[test]
    fn pnl_is_exact_on_float_prices() {
        // 0.1 and 0.3 have no exact binary form; the decimal path keeps them exact.
        let item = raw_to_item(&raw("X", 3, 0.3, 0.1, 0.2));
        assert_eq!(item.pnl, dec!(0.60));
        assert_eq!(item.pnl_percentage, dec!(200.00));
    }

    #[test]
    fn prices_are_rounded_half_up_to_two_places() {
        let item = raw_to_item(&raw("R", 1, 10.125, 10.005, 9.994));
        assert_eq!(item.ltp, dec!(10.13));
        assert_eq!(item.avg_price, dec!(10.01));
        assert_eq!(item.close, dec!(9.99));
        assert_eq!(item.pnl, dec!(0.12));
    }

    #[test]
    fn zero_avg_price_gives_zero_percentage() {
        let item = raw_to_item(&raw("FREE", 50, 123.45, 0.0, 120.0));
        assert_eq!(item.pnl_percentage, Decimal::ZERO);
        assert_eq!(item.pnl, dec!(6172.50));
    }

    #[test]
    fn zero_avg_price_percentage_ignores_quantity_and_ltp() {
        for (quantity, ltp) in [(0, 0.0), (1, 1.0), (1_000, 99_999.99)] {
            let item = raw_to_item(&raw("FREE", quantity, ltp, 0.0, 0.0));
            assert_eq!(item.pnl_percentage, Decimal::ZERO);
        }
    }

    #[test]
    fn negative_avg_price_gives_zero_percentage() {
        let item = raw_to_item(&raw("NEG", 1, 10.0, -5.0, 10.0));
        assert_eq!(item.pnl_percentage, Decimal::ZERO);
        assert_eq!(item.pnl, dec!(15.00));
    }

    #[test]
    fn zero_quantity_gives_zero_pnl() {
        let item = raw_to_item(&raw("NONE", 0, 120.0, 100.0, 110.0));
        assert_eq!(item.pnl, Decimal::ZERO);
        assert_eq!(item.pnl_percentage, dec!(20.00));
    }

    #[test]
    fn non_finite_price_maps_to_zero() {
        let item = raw_to_item(&raw("NAN", 2, f64::NAN, 1.0, 1.0));
        assert_eq!(item.ltp, Decimal::ZERO);
        assert_eq!(item.pnl, dec!(-2.00));
    }

    #[test]
    fn overflowing_pnl_maps_to_zero() {
        let item = raw_to_item(&raw("HUGE", 1_000_000_000_000, 1e20, 1.0, 1.0));
        assert_eq!(item.ltp, dec!(100000000000000000000.00));
        assert_eq!(item.pnl, Decimal::ZERO);
        assert_eq!(item.pnl.scale(), 2);
    }

    #[test]
    fn strict_mapping_rejects_overflowing_pnl() {
        let err = try_raw_to_item(&raw("HUGE", 1_000_000_000_000, 1e20, 1.0, 1.0)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidResponse(ref m) if m.contains("HUGE")));
    }

    #[test]
    fn strict_mapping_rejects_non_finite_price() {
        let err = try_raw_to_item(&raw("NAN", 2, 1.0, f64::INFINITY, 1.0)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidResponse(ref m) if m.contains("avgPrice")));
    }

    #[test]
    fn strict_mapping_agrees_with_lenient_on_valid_input() {
        let source = raw("TEST", 10, 100.0, 90.0, 95.0);
        assert_eq!(try_raw_to_item(&source).unwrap(), raw_to_item(&source));
    }

    #[test]
    fn from_impl_matches_function() {
        let source = raw("TEST", 10, 100.0, 90.0, 95.0);
        assert_eq!(PortfolioItem::from(&source), raw_to_item(&source));
    }

    #[test]
    fn cache_row_keeps_prices_and_timestamp() {
        let item = raw_to_item(&raw("TEST", 10, 100.0, 90.0, 95.0));
        let row = item_to_cached(&item, 1_700_000_000_000);
        assert_eq!(row.symbol, "TEST");
        assert_eq!(row.quantity, 10);
        assert_eq!(row.ltp, dec!(100.00));
        assert_eq!(row.avg_price, dec!(90.00));
        assert_eq!(row.close, dec!(95.00));
        assert_eq!(row.timestamp, 1_700_000_000_000);
    }

    #[test]
    fn cache_row_back_to_item_recomputes_derived_fields() {
        let item = raw_to_item(&raw("TEST", 10, 100.0, 90.0, 95.0));
        let row = item_to_cached(&item, 0);
        assert_eq!(cached_to_item(&row), item);
    }

    #[test]
    fn cache_row_with_extra_precision_is_normalized() {
        let row = CachedHolding {
            symbol: "P".into(),
            quantity: 2,
            ltp: dec!(10.005),
            avg_price: dec!(5),
            close: dec!(9.994),
            timestamp: 0,
        };
        let item = PortfolioItem::from(&row);
        assert_eq!(item.ltp.to_string(), "10.01");
        assert_eq!(item.avg_price.to_string(), "5.00");
        assert_eq!(item.close.to_string(), "9.99");
        assert_eq!(item.pnl, dec!(10.02));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Holdings wire shape
// ═══════════════════════════════════════════════════════════════════

mod raw_holding {
    use super::*;

    #[test]
    fn deserializes_camel_case() {
        let json = r#"{"symbol":"HDFC","quantity":7,"ltp":2497.2,"avgPrice":2400.5,"close":2500}"#;
        let holding: RawHolding = serde_json::from_str(json).unwrap();
        assert_eq!(holding, raw("HDFC", 7, 2497.2, 2400.5, 2500.0));
    }

    #[test]
    fn rejects_negative_quantity() {
        let json = r#"{"symbol":"HDFC","quantity":-1,"ltp":1,"avgPrice":1,"close":1}"#;
        assert!(serde_json::from_str::<RawHolding>(json).is_err());
    }

    #[test]
    fn item_serializes_camel_case() {
        let item = raw_to_item(&raw("TEST", 10, 100.0, 90.0, 95.0));
        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("avgPrice").is_some());
        assert!(json.get("pnlPercentage").is_some());
        assert!(json.get("avg_price").is_none());
    }
}

// ═══════════════════════════════════════════════════════════════════
// PortfolioSummary
// ═══════════════════════════════════════════════════════════════════

mod summary {
    use super::*;

    #[test]
    fn empty_is_all_zero_at_scale_two() {
        let s = PortfolioSummary::empty();
        for value in [
            s.current_value,
            s.total_investment,
            s.total_pnl,
            s.total_pnl_percentage,
            s.today_pnl,
        ] {
            assert_eq!(value, Decimal::ZERO);
            assert_eq!(value.to_string(), "0.00");
        }
    }

    #[test]
    fn default_is_empty() {
        assert_eq!(PortfolioSummary::default(), PortfolioSummary::empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Settings
// ═══════════════════════════════════════════════════════════════════

mod settings {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.endpoint_url, DEFAULT_ENDPOINT_URL);
        assert_eq!(s.request_timeout(), Duration::from_secs(30));
        assert_eq!(s.connect_timeout(), Duration::from_secs(30));
        assert_eq!(s.probe_timeout(), Duration::from_millis(1_500));
        assert!(s.cache_path.is_none());
        assert_eq!(s.retry.max_retries, 3);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn empty_object_and_unknown_keys_take_defaults() {
        assert_eq!(Settings::from_json("{}").unwrap(), Settings::default());
        let s = Settings::from_json(r#"{"theme":"dark"}"#).unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn json_overrides() {
        let s = Settings::from_json(
            r#"{
                "endpoint_url": "http://localhost:8080/holdings",
                "probe_timeout_ms": 200,
                "cache_path": "/tmp/holdings.cache",
                "retry": { "max_retries": 5 }
            }"#,
        )
        .unwrap();
        assert_eq!(s.endpoint_url, "http://localhost:8080/holdings");
        assert_eq!(s.probe_timeout(), Duration::from_millis(200));
        assert_eq!(s.cache_path.as_deref(), Some(std::path::Path::new("/tmp/holdings.cache")));
        assert_eq!(s.retry.max_retries, 5);
        assert_eq!(s.retry.initial_delay_ms, 1_000);
        assert_eq!(s.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = Settings::from_json("{ not json").unwrap_err();
        assert!(matches!(err, CoreError::Deserialization(_)));
    }

    #[test]
    fn rejects_non_http_scheme() {
        let s = Settings {
            endpoint_url: "ftp://example.com/holdings".into(),
            ..Settings::default()
        };
        assert!(matches!(s.validate(), Err(CoreError::ValidationError(_))));
    }

    #[test]
    fn rejects_unparseable_url() {
        let s = Settings {
            endpoint_url: "not a url".into(),
            ..Settings::default()
        };
        assert!(matches!(s.validate(), Err(CoreError::ValidationError(_))));
    }

    #[test]
    fn rejects_zero_timeouts() {
        let s = Settings {
            request_timeout_ms: 0,
            ..Settings::default()
        };
        assert!(matches!(s.validate(), Err(CoreError::ValidationError(_))));

        let s = Settings {
            probe_timeout_ms: 0,
            ..Settings::default()
        };
        assert!(matches!(s.validate(), Err(CoreError::ValidationError(_))));
    }

    #[test]
    fn rejects_shrinking_multiplier() {
        let mut s = Settings::default();
        s.retry.multiplier = 0.5;
        assert!(matches!(s.validate(), Err(CoreError::ValidationError(_))));

        s.retry.multiplier = f64::NAN;
        assert!(s.validate().is_err());
    }

    #[test]
    fn load_from_missing_file_fails() {
        let err = Settings::load_from_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"connect_timeout_ms": 5000}"#).unwrap();

        let s = Settings::load_from_file(&path).unwrap();
        assert_eq!(s.connect_timeout(), Duration::from_secs(5));
    }
}

// ═══════════════════════════════════════════════════════════════════
// UI state
// ═══════════════════════════════════════════════════════════════════

mod ui_state {
    use super::*;

    #[test]
    fn default_is_loading() {
        let state = PortfolioUiState::default();
        assert!(state.is_loading());
        assert!(state.holdings().is_none());
        assert!(state.summary().is_none());
        assert!(state.error_message().is_none());
    }

    #[test]
    fn success_accessors() {
        let holdings = vec![raw_to_item(&raw("TEST", 10, 100.0, 90.0, 95.0))];
        let state = PortfolioUiState::Success {
            holdings: holdings.clone(),
            summary: PortfolioSummary::empty(),
            is_expanded: false,
        };
        assert!(state.is_success());
        assert_eq!(state.holdings(), Some(holdings.as_slice()));
        assert_eq!(state.summary(), Some(&PortfolioSummary::empty()));
    }

    #[test]
    fn error_accessors() {
        let state = PortfolioUiState::Error {
            message: "boom".into(),
        };
        assert!(state.is_error());
        assert_eq!(state.error_message(), Some("boom"));
    }

    #[test]
    fn serializes_with_status_tag() {
        let json = serde_json::to_value(PortfolioUiState::Loading).unwrap();
        assert_eq!(json["status"], "loading");

        let json = serde_json::to_value(PortfolioUiState::Success {
            holdings: vec![],
            summary: PortfolioSummary::empty(),
            is_expanded: true,
        })
        .unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["isExpanded"], true);
    }

    #[test]
    fn default_tab_is_holdings() {
        assert_eq!(PortfolioTab::default(), PortfolioTab::Holdings);
    }
}
