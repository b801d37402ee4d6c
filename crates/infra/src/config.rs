//! Configuration loading and representation.
//!
//! Read from environment variables; anything unset or unparsable falls back to
//! a default with a warning.

use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;

use laundry_chemicals::DEFAULT_LOW_STOCK_THRESHOLD;
use laundry_linens::ThrownPolicy;

pub const DATA_DIR_VAR: &str = "LAUNDRY_DATA_DIR";
pub const REPORT_DIR_VAR: &str = "LAUNDRY_REPORT_DIR";
pub const LOW_STOCK_THRESHOLD_VAR: &str = "LAUNDRY_LOW_STOCK_THRESHOLD";
pub const THROWN_POLICY_VAR: &str = "LAUNDRY_THROWN_POLICY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaundryConfig {
    /// Where the ledger collections are stored.
    pub data_dir: PathBuf,
    /// Where exported reports are written.
    pub report_dir: PathBuf,
    pub low_stock_threshold: Decimal,
    pub thrown_policy: ThrownPolicy,
}

impl Default for LaundryConfig {
    fn default() -> Self {
        Self::with_data_dir(default_data_dir())
    }
}

impl LaundryConfig {
    /// Defaults rooted at `data_dir`; reports go to `{data_dir}/reports`.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            report_dir: data_dir.join("reports"),
            data_dir,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            thrown_policy: ThrownPolicy::default(),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source (the process env in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let data_dir = lookup(DATA_DIR_VAR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);
        let mut config = Self::with_data_dir(data_dir);

        if let Some(dir) = lookup(REPORT_DIR_VAR).filter(|v| !v.trim().is_empty()) {
            config.report_dir = PathBuf::from(dir);
        }

        config.low_stock_threshold = parse_or_default(
            LOW_STOCK_THRESHOLD_VAR,
            lookup(LOW_STOCK_THRESHOLD_VAR),
            config.low_stock_threshold,
        );
        if config.low_stock_threshold < Decimal::ZERO {
            tracing::warn!(
                var = LOW_STOCK_THRESHOLD_VAR,
                "negative low-stock threshold; using default"
            );
            config.low_stock_threshold = DEFAULT_LOW_STOCK_THRESHOLD;
        }

        config.thrown_policy =
            parse_or_default(THROWN_POLICY_VAR, lookup(THROWN_POLICY_VAR), config.thrown_policy);

        config
    }
}

fn parse_or_default<T>(var: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr + core::fmt::Debug,
{
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(var, value = %raw, ?default, "unparsable setting; using default");
            default
        }
    }
}

/// `{OS data dir}/laundry`, e.g. `~/.local/share/laundry` on Linux.
pub fn default_data_dir() -> PathBuf {
    let base = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .unwrap_or_else(|| {
            tracing::warn!("could not resolve a data directory; using the working directory");
            PathBuf::from(".")
        });
    base.join("laundry")
}
