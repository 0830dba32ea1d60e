//! Run configuration
//!
//! One `ProbeConfig` is built per test run and handed to everything that needs
//! endpoints, compute defaults or wait budgets. Nothing below reads flags or
//! environment variables on its own.
//!
//! Stored in `~/.config/cloudprobe/config.yaml` by default:
//!
//! ```yaml
//! globalUrl: https://api.example.com
//! regionalUrl: https://compute-us-dev-1.example.com
//! compute:
//!   instanceType: vm-spr-sml
//!   machineImage: ubuntu-2204-jammy-v20230122
//! account:
//!   accountType: ACCOUNT_TYPE_PREMIUM
//! waits:
//!   instanceReady: { interval: 10s, timeout: 15m }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{CoreError, Result};
use crate::poll::Poller;

/// Top-level run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeConfig {
    /// Base URL of global services (cloud accounts, billing, catalog)
    #[serde(default = "default_global_url")]
    pub global_url: String,

    /// Base URL of regional services (compute)
    #[serde(default = "default_regional_url")]
    pub regional_url: String,

    /// Defaults used when creating compute fixtures
    #[serde(default)]
    pub compute: ComputeDefaults,

    /// Identity of the account under test
    #[serde(default)]
    pub account: AccountSettings,

    /// Poll budgets per kind of wait
    #[serde(default)]
    pub waits: WaitConfig,
}

fn default_global_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_regional_url() -> String {
    "http://localhost:8081".to_string()
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            global_url: default_global_url(),
            regional_url: default_regional_url(),
            compute: ComputeDefaults::default(),
            account: AccountSettings::default(),
            waits: WaitConfig::default(),
        }
    }
}

impl ProbeConfig {
    /// Load configuration from the default location, falling back to built-ins
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get default configuration path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| CoreError::InvalidConfig {
            message: "Could not determine config directory".to_string(),
        })?;
        Ok(config_dir.join("cloudprobe").join("config.yaml"))
    }

    /// Check URLs and wait budgets
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("globalUrl", &self.global_url),
            ("regionalUrl", &self.regional_url),
        ] {
            url::Url::parse(value).map_err(|e| CoreError::InvalidConfig {
                message: format!("{field} '{value}' is not a valid URL: {e}"),
            })?;
        }

        for (name, wait) in self.waits.iter() {
            if wait.interval.is_zero() {
                return Err(CoreError::InvalidConfig {
                    message: format!("waits.{name}.interval must be greater than zero"),
                });
            }
        }

        Ok(())
    }

    /// Global URL without a trailing slash
    pub fn global_base(&self) -> &str {
        self.global_url.trim_end_matches('/')
    }

    /// Regional URL without a trailing slash
    pub fn regional_base(&self) -> &str {
        self.regional_url.trim_end_matches('/')
    }
}

/// Defaults for compute fixtures
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeDefaults {
    #[serde(default = "default_instance_type")]
    pub instance_type: String,

    #[serde(default = "default_machine_image")]
    pub machine_image: String,

    #[serde(default = "default_availability_zone")]
    pub availability_zone: String,

    #[serde(default = "default_region")]
    pub region: String,

    /// Public key registered for created instances
    #[serde(default)]
    pub ssh_public_key: String,

    #[serde(default = "default_prefix_length")]
    pub vnet_prefix_length: u8,

    #[serde(default = "default_run_strategy")]
    pub run_strategy: String,
}

fn default_instance_type() -> String {
    "vm-spr-sml".to_string()
}

fn default_machine_image() -> String {
    "ubuntu-2204-jammy-v20230122".to_string()
}

fn default_availability_zone() -> String {
    "us-dev-1a".to_string()
}

fn default_region() -> String {
    "us-dev-1".to_string()
}

fn default_prefix_length() -> u8 {
    24
}

fn default_run_strategy() -> String {
    "RerunOnFailure".to_string()
}

impl Default for ComputeDefaults {
    fn default() -> Self {
        Self {
            instance_type: default_instance_type(),
            machine_image: default_machine_image(),
            availability_zone: default_availability_zone(),
            region: default_region(),
            ssh_public_key: String::new(),
            vnet_prefix_length: default_prefix_length(),
            run_strategy: default_run_strategy(),
        }
    }
}

/// Cloud account type as the platform names it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AccountType {
    #[serde(rename = "ACCOUNT_TYPE_STANDARD")]
    #[default]
    Standard,
    #[serde(rename = "ACCOUNT_TYPE_PREMIUM")]
    Premium,
    #[serde(rename = "ACCOUNT_TYPE_ENTERPRISE")]
    Enterprise,
    #[serde(rename = "ACCOUNT_TYPE_INTEL")]
    Intel,
    #[serde(rename = "ACCOUNT_TYPE_MEMBER")]
    Member,
    #[serde(rename = "ACCOUNT_TYPE_ENTERPRISE_PENDING")]
    EnterprisePending,
    #[serde(rename = "ACCOUNT_TYPE_UNSPECIFIED")]
    Unspecified,
    /// Any type this client does not know yet
    #[serde(other)]
    Unknown,
}

impl AccountType {
    /// Wire name of the account type
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Standard => "ACCOUNT_TYPE_STANDARD",
            AccountType::Premium => "ACCOUNT_TYPE_PREMIUM",
            AccountType::Enterprise => "ACCOUNT_TYPE_ENTERPRISE",
            AccountType::Intel => "ACCOUNT_TYPE_INTEL",
            AccountType::Member => "ACCOUNT_TYPE_MEMBER",
            AccountType::EnterprisePending => "ACCOUNT_TYPE_ENTERPRISE_PENDING",
            AccountType::Unspecified | AccountType::Unknown => "ACCOUNT_TYPE_UNSPECIFIED",
        }
    }

    /// Internal accounts are billed differently and skip payment flows
    pub fn is_internal(&self) -> bool {
        matches!(self, AccountType::Intel)
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account under test
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSettings {
    /// Owner e-mail used when creating cloud accounts
    #[serde(default)]
    pub owner: String,

    #[serde(default)]
    pub account_type: AccountType,
}

/// Interval and timeout for one kind of wait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitSettings {
    #[serde(with = "humantime_serde")]
    pub interval: Duration,

    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl WaitSettings {
    pub const fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    /// Build the poller for this budget
    pub fn poller(&self) -> Result<Poller> {
        Poller::new(self.interval, self.timeout)
    }
}

/// Wait budgets for each awaited condition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitConfig {
    #[serde(default = "default_instance_ready")]
    pub instance_ready: WaitSettings,

    #[serde(default = "default_instance_deleted")]
    pub instance_deleted: WaitSettings,

    #[serde(default = "default_ssh_key_deleted")]
    pub ssh_key_deleted: WaitSettings,

    #[serde(default = "default_bmh_state")]
    pub bmh_state: WaitSettings,
}

fn default_instance_ready() -> WaitSettings {
    WaitSettings::new(Duration::from_secs(10), Duration::from_secs(15 * 60))
}

fn default_instance_deleted() -> WaitSettings {
    WaitSettings::new(Duration::from_secs(30), Duration::from_secs(5 * 60))
}

fn default_ssh_key_deleted() -> WaitSettings {
    WaitSettings::new(Duration::from_secs(5), Duration::from_secs(60))
}

fn default_bmh_state() -> WaitSettings {
    WaitSettings::new(Duration::from_secs(30), Duration::from_secs(15 * 60))
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            instance_ready: default_instance_ready(),
            instance_deleted: default_instance_deleted(),
            ssh_key_deleted: default_ssh_key_deleted(),
            bmh_state: default_bmh_state(),
        }
    }
}

impl WaitConfig {
    /// Iterate over `(name, settings)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &WaitSettings)> {
        [
            ("instanceReady", &self.instance_ready),
            ("instanceDeleted", &self.instance_deleted),
            ("sshKeyDeleted", &self.ssh_key_deleted),
            ("bmhState", &self.bmh_state),
        ]
        .into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ProbeConfig::default();
        assert_eq!(config.compute.vnet_prefix_length, 24);
        assert_eq!(config.account.account_type, AccountType::Standard);
        assert_eq!(config.waits.instance_ready.interval, Duration::from_secs(10));
        assert_eq!(config.waits.instance_deleted.timeout, Duration::from_secs(300));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            r#"
globalUrl: https://global.example.com/
regionalUrl: https://us-dev-1.example.com
compute:
  instanceType: bm-spr-pvc-1550-8
account:
  owner: tester@example.com
  accountType: ACCOUNT_TYPE_INTEL
waits:
  bmhState:
    interval: 1m
    timeout: 1h 30m
"#,
        )
        .unwrap();

        let config = ProbeConfig::load_from(&path).unwrap();
        assert_eq!(config.global_base(), "https://global.example.com");
        assert_eq!(config.compute.instance_type, "bm-spr-pvc-1550-8");
        assert_eq!(config.compute.machine_image, default_machine_image());
        assert!(config.account.account_type.is_internal());
        assert_eq!(config.waits.bmh_state.interval, Duration::from_secs(60));
        assert_eq!(config.waits.bmh_state.timeout, Duration::from_secs(5400));
        assert_eq!(config.waits.ssh_key_deleted, default_ssh_key_deleted());
    }

    #[test]
    fn test_account_type_wire_names() {
        let parsed: Vec<AccountType> = serde_yaml::from_str(
            "[ACCOUNT_TYPE_ENTERPRISE_PENDING, ACCOUNT_TYPE_UNSPECIFIED, ACCOUNT_TYPE_SOMETHING_NEW]",
        )
        .unwrap();

        assert_eq!(
            parsed,
            vec![
                AccountType::EnterprisePending,
                AccountType::Unspecified,
                AccountType::Unknown
            ]
        );
        assert_eq!(
            AccountType::EnterprisePending.to_string(),
            "ACCOUNT_TYPE_ENTERPRISE_PENDING"
        );
    }

    #[test]
    fn test_invalid_url_rejected() {
        let config = ProbeConfig {
            regional_url: "not a url".to_string(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("regionalUrl"));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = ProbeConfig::default();
        config.waits.instance_deleted.interval = Duration::ZERO;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("waits.instanceDeleted.interval"));
    }

    #[test]
    fn test_wait_settings_poller() {
        let poller = default_instance_ready().poller().unwrap();
        assert_eq!(poller.max_attempts(), 91);
    }
}
