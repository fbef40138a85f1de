//! Service configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use bakepay_crypto::Address;
use bakepay_payout::{AssemblerConfig, EarningsOrder, FailurePolicy, PayoutFilter};
use bakepay_types::{FeeRate, OperationParams};

use crate::NodeError;

/// Environment variable that overrides `wallet_secret`.
pub const WALLET_SECRET_ENV: &str = "BAKEPAY_WALLET_SECRET";

/// Configuration for a bakepay service.
///
/// Can be loaded from a TOML file via [`BakepayConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BakepayConfig {
    /// Node RPC endpoint.
    #[serde(default = "default_host_node")]
    pub host_node: String,

    /// The baker whose rewards are distributed.
    #[serde(default)]
    pub delegate: String,

    /// Base58 secret key of the paying wallet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_secret: Option<String>,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub payout: PayoutSection,

    #[serde(default)]
    pub operation: OperationSection,

    #[serde(default)]
    pub scheduler: SchedulerSection,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PayoutSection {
    /// Fraction of gross rewards kept by the baker, in `[0, 1]`.
    #[serde(default = "default_baker_fee")]
    pub baker_fee: f64,

    /// Net rewards below this many mutez are not paid.
    #[serde(default)]
    pub minimum_payment: u64,

    #[serde(default)]
    pub blacklist: Vec<String>,

    /// Pay `new_cycle − preserved_cycles` instead of the new cycle.
    #[serde(default)]
    pub wait_for_unfreeze: bool,

    #[serde(default)]
    pub failure_policy: FailurePolicy,

    #[serde(default)]
    pub earnings_order: EarningsOrder,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OperationSection {
    #[serde(default = "default_network_fee")]
    pub network_fee: u64,

    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,

    #[serde(default)]
    pub storage_limit: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SchedulerSection {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_host_node() -> String {
    "http://127.0.0.1:8732".to_string()
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_baker_fee() -> f64 {
    0.05
}

fn default_network_fee() -> u64 {
    OperationParams::default().fee
}

fn default_gas_limit() -> u64 {
    OperationParams::default().gas_limit
}

fn default_poll_interval_secs() -> u64 {
    30
}

fn default_call_timeout_secs() -> u64 {
    10
}

impl Default for PayoutSection {
    fn default() -> Self {
        Self {
            baker_fee: default_baker_fee(),
            minimum_payment: 0,
            blacklist: Vec::new(),
            wait_for_unfreeze: false,
            failure_policy: FailurePolicy::default(),
            earnings_order: EarningsOrder::default(),
        }
    }
}

impl Default for OperationSection {
    fn default() -> Self {
        Self {
            network_fee: default_network_fee(),
            gas_limit: default_gas_limit(),
            storage_limit: 0,
        }
    }
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            call_timeout_secs: default_call_timeout_secs(),
        }
    }
}

// ── Impl ───────────────────────────────────────────────────────────────

impl BakepayConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, NodeError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| NodeError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Check every field that would otherwise fail later, at payout time.
    pub fn validate(&self) -> Result<(), NodeError> {
        if !(self.host_node.starts_with("http://") || self.host_node.starts_with("https://")) {
            return Err(NodeError::Config(format!(
                "host_node must be an http(s) URL, got {:?}",
                self.host_node
            )));
        }
        match Address::parse(&self.delegate) {
            Ok(address) if address.is_implicit() => {}
            Ok(_) => {
                return Err(NodeError::Config(format!(
                    "delegate {} is an originated contract",
                    self.delegate
                )))
            }
            Err(e) => return Err(NodeError::Config(format!("delegate {:?}: {e}", self.delegate))),
        }
        for address in &self.payout.blacklist {
            Address::parse(address)
                .map_err(|e| NodeError::Config(format!("blacklist entry {address:?}: {e}")))?;
        }
        self.fee_rate()?;
        if self.scheduler.poll_interval_secs == 0 {
            return Err(NodeError::Config("poll_interval_secs must be positive".into()));
        }
        if self.scheduler.call_timeout_secs == 0 {
            return Err(NodeError::Config("call_timeout_secs must be positive".into()));
        }
        Ok(())
    }

    pub fn fee_rate(&self) -> Result<FeeRate, NodeError> {
        FeeRate::from_f64(self.payout.baker_fee)
            .map_err(|e| NodeError::Config(format!("baker_fee: {e}")))
    }

    pub fn operation_params(&self) -> OperationParams {
        OperationParams {
            fee: self.operation.network_fee,
            gas_limit: self.operation.gas_limit,
            storage_limit: self.operation.storage_limit,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.scheduler.poll_interval_secs)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.scheduler.call_timeout_secs)
    }

    pub fn assembler_config(&self) -> Result<AssemblerConfig, NodeError> {
        let mut config = AssemblerConfig::new(self.delegate.clone(), self.fee_rate()?);
        config.failure_policy = self.payout.failure_policy;
        config.earnings_order = self.payout.earnings_order;
        config.call_timeout = self.call_timeout();
        Ok(config)
    }

    pub fn payout_filter(&self) -> PayoutFilter {
        PayoutFilter::new(
            self.delegate.clone(),
            self.payout.minimum_payment,
            self.payout.blacklist.iter().cloned(),
        )
    }

    /// The wallet secret, preferring [`WALLET_SECRET_ENV`] over the file.
    pub fn wallet_secret(&self) -> Result<String, NodeError> {
        self.wallet_secret_with(std::env::var(WALLET_SECRET_ENV).ok())
    }

    fn wallet_secret_with(&self, from_env: Option<String>) -> Result<String, NodeError> {
        from_env
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.wallet_secret.clone())
            .ok_or_else(|| {
                NodeError::Config(format!(
                    "no wallet secret: set wallet_secret or {WALLET_SECRET_ENV}"
                ))
            })
    }
}

impl Default for BakepayConfig {
    fn default() -> Self {
        Self {
            host_node: default_host_node(),
            delegate: String::new(),
            wallet_secret: None,
            log_format: default_log_format(),
            log_level: default_log_level(),
            payout: PayoutSection::default(),
            operation: OperationSection::default(),
            scheduler: SchedulerSection::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DELEGATE: &str = "tz1SUgyRB8T5jXgXAwS33pgRHAKrafyg87Yc";

    fn valid() -> BakepayConfig {
        BakepayConfig {
            delegate: DELEGATE.to_string(),
            ..BakepayConfig::default()
        }
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = valid();
        let toml_str = config.to_toml_string().unwrap();
        let parsed = BakepayConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.delegate, config.delegate);
        assert_eq!(parsed.scheduler.poll_interval_secs, 30);
        assert!(parsed.wallet_secret.is_none());
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = BakepayConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.host_node, "http://127.0.0.1:8732");
        assert_eq!(config.payout.baker_fee, 0.05);
        assert_eq!(config.payout.failure_policy, FailurePolicy::FailFast);
        assert_eq!(config.payout.earnings_order, EarningsOrder::Sorted);
        assert_eq!(config.operation_params(), OperationParams::default());
        assert_eq!(config.call_timeout(), Duration::from_secs(10));
        assert_eq!(config.log_format, "human");
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            delegate = "tz1SUgyRB8T5jXgXAwS33pgRHAKrafyg87Yc"

            [payout]
            baker_fee = 0.1
            minimum_payment = 5000
            blacklist = ["tz1Qr9uevaimfiPS6X1otehsKrwvZjX7bsyL"]
            wait_for_unfreeze = true
            failure_policy = "skip_failed"
            earnings_order = "listing"

            [scheduler]
            poll_interval_secs = 5
        "#;
        let config = BakepayConfig::from_toml_str(toml).expect("should parse");
        config.validate().unwrap();
        assert_eq!(config.fee_rate().unwrap().ppb(), 100_000_000);
        assert!(config.payout.wait_for_unfreeze);
        assert_eq!(config.payout.failure_policy, FailurePolicy::SkipFailed);
        assert_eq!(config.payout.earnings_order, EarningsOrder::Listing);
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.scheduler.call_timeout_secs, 10); // default
        let assembler = config.assembler_config().unwrap();
        assert_eq!(assembler.failure_policy, FailurePolicy::SkipFailed);
    }

    #[test]
    fn validation_rejects_bad_fields() {
        let mut config = valid();
        config.payout.baker_fee = 1.5;
        assert!(matches!(config.validate(), Err(NodeError::Config(_))));

        let mut config = valid();
        config.delegate = "tz1nope".into();
        assert!(config.validate().is_err());

        let mut config = valid();
        config.payout.blacklist.push("garbage".into());
        assert!(config.validate().is_err());

        let mut config = valid();
        config.scheduler.poll_interval_secs = 0;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.host_node = "127.0.0.1:8732".into();
        assert!(config.validate().is_err());

        assert!(valid().validate().is_ok());
    }

    #[test]
    fn env_secret_takes_precedence() {
        let mut config = valid();
        config.wallet_secret = Some("edsk-from-file".into());
        let from_env = config.wallet_secret_with(Some("edsk-from-env".into())).unwrap();
        assert_eq!(from_env, "edsk-from-env");
        assert_eq!(config.wallet_secret_with(Some("  ".into())).unwrap(), "edsk-from-file");
        assert_eq!(config.wallet_secret_with(None).unwrap(), "edsk-from-file");
        config.wallet_secret = None;
        assert!(config.wallet_secret_with(None).is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "delegate = \"{DELEGATE}\"\nlog_level = \"debug\"").unwrap();
        let config = BakepayConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.delegate, DELEGATE);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = BakepayConfig::from_toml_file("/nonexistent/bakepay.toml");
        assert!(matches!(result, Err(NodeError::Config(_))));
    }
}
