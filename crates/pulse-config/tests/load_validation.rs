//! Config load validation tests for pulse-config.
// crates/pulse-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards and semantic validation.
// Purpose: Ensure config input handling is strict and fail-closed.
// =============================================================================

use std::io::Write;
use std::path::Path;

use pulse_config::ConfigError;
use pulse_config::PulseConfig;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

const VALID_CONFIG: &str = r#"
[server]
bind_addr = "127.0.0.1:8080"

[store]
path = "pulse.db"

[[plan.objectives]]
id = "obj-growth"
title = "Grow recurring revenue"

[[plan.objectives.key_results]]
id = "kr-mrr"
title = "Reach 1.34M MRR"
metric_key = "mrr_active"

[plan.objectives.key_results.targets]
Q1 = 1340000.0
"#;

fn assert_invalid(result: Result<PulseConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    let path = Path::new(&long_path);
    assert_invalid(PulseConfig::load(Some(path)), "config path exceeds max length")?;
    Ok(())
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    let path = Path::new(&long_component);
    assert_invalid(PulseConfig::load(Some(path)), "config path component too long")?;
    Ok(())
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    let payload = vec![b'a'; 1_048_577];
    file.write_all(&payload).map_err(|err| err.to_string())?;
    assert_invalid(PulseConfig::load(Some(file.path())), "config file exceeds size limit")?;
    Ok(())
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(&[0xFF, 0xFE, 0xFF]).map_err(|err| err.to_string())?;
    assert_invalid(PulseConfig::load(Some(file.path())), "config file must be utf-8")?;
    Ok(())
}

#[test]
fn load_accepts_valid_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(VALID_CONFIG.as_bytes()).map_err(|err| err.to_string())?;
    let config = PulseConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    assert_eq!(config.server.bind_addr, "127.0.0.1:8080");
    assert_eq!(config.cache.ttl_secs, 300);
    assert_eq!(config.calendar.fiscal_year_start_month, 1);
    assert_eq!(config.plan.objectives.len(), 1);
    Ok(())
}

#[test]
fn parse_rejects_unknown_keys() -> TestResult {
    let text = format!("unknown_key = true\n{VALID_CONFIG}");
    assert_invalid(PulseConfig::from_toml_str(&text), "unknown")?;
    Ok(())
}

#[test]
fn validate_rejects_bad_bind_addr() -> TestResult {
    let text = VALID_CONFIG.replace("127.0.0.1:8080", "not-a-socket");
    assert_invalid(PulseConfig::from_toml_str(&text), "bind_addr must be a socket address")?;
    Ok(())
}

#[test]
fn validate_rejects_zero_cache_ttl() -> TestResult {
    let text = format!("{VALID_CONFIG}\n[cache]\nttl_secs = 0\n");
    assert_invalid(PulseConfig::from_toml_str(&text), "cache ttl_secs must be positive")?;
    Ok(())
}

#[test]
fn validate_rejects_fiscal_start_month_out_of_range() -> TestResult {
    let text = format!("{VALID_CONFIG}\n[calendar]\nfiscal_year_start_month = 13\n");
    assert_invalid(PulseConfig::from_toml_str(&text), "fiscal_year_start_month must be 1..=12")?;
    Ok(())
}

#[test]
fn validate_rejects_plan_with_unknown_metric() -> TestResult {
    let text = VALID_CONFIG.replace("mrr_active", "mrr_actve");
    assert_invalid(PulseConfig::from_toml_str(&text), "mrr_actve")?;
    Ok(())
}

#[test]
fn catalog_merges_metric_extensions() -> TestResult {
    let text = format!(
        "{VALID_CONFIG}\n\
         [[metrics]]\n\
         key = \"nps\"\n\
         title = \"Net Promoter Score\"\n\
         unit = \"count\"\n\
         direction = \"higher_is_better\"\n\
         period_kind = \"stock\"\n"
    );
    let config = PulseConfig::from_toml_str(&text).map_err(|err| err.to_string())?;
    let catalog = config.catalog().map_err(|err| err.to_string())?;
    assert!(catalog.contains(&pulse_core::MetricKey::new("nps")));
    assert!(catalog.contains(&pulse_core::MetricKey::new("mrr_active")));
    Ok(())
}

#[test]
fn catalog_rejects_duplicate_extension_key() -> TestResult {
    let text = format!(
        "{VALID_CONFIG}\n\
         [[metrics]]\n\
         key = \"mrr_active\"\n\
         title = \"Duplicate\"\n\
         unit = \"currency\"\n\
         direction = \"higher_is_better\"\n\
         period_kind = \"flow\"\n"
    );
    assert_invalid(PulseConfig::from_toml_str(&text), "duplicate metric key")?;
    Ok(())
}
