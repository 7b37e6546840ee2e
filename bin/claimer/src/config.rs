use config::{ConfigError, ContractAddresses, Deployments};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};
use withdrawal::{message::MultiMessagePolicy, rpc::RpcSettings};

/// Top-level claimer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// L1 RPC endpoint url
    pub l1_rpc_url: String,

    /// L2 RPC endpoint url
    pub l2_rpc_url: String,

    /// Name of the deployment whose contracts to use
    #[serde(default = "default_deployment")]
    pub deployment: String,

    /// Additional or overriding deployments, keyed by name
    #[serde(default)]
    pub deployments: Option<Deployments>,

    /// Timeout and retries for every RPC call
    #[serde(default)]
    pub rpc: RpcConfig,

    /// Seconds between resolution attempts while waiting for a checkpoint
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Port of the Prometheus exporter, disabled when unset
    #[serde(default)]
    pub metrics_port: Option<u16>,

    /// Resolve and print the withdrawal without submitting it
    #[serde(default)]
    pub dry_run: bool,

    /// How to treat receipts with several SentMessage events
    #[serde(default)]
    pub multi_message_policy: MultiMessagePolicy,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RpcConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

impl RpcConfig {
    pub const fn settings(&self) -> RpcSettings {
        RpcSettings {
            timeout: Duration::from_secs(self.timeout_secs),
            max_retries: self.max_retries,
        }
    }
}

fn default_deployment() -> String {
    "devnet".to_string()
}

const fn default_poll_interval_secs() -> u64 {
    30
}

const fn default_timeout_secs() -> u64 {
    10
}

const fn default_max_retries() -> usize {
    3
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;

        Ok(config)
    }

    /// Contract addresses of the selected deployment.
    ///
    /// Deployments from the config file take precedence over the built-in ones.
    pub fn contract_addresses(&self) -> Result<ContractAddresses, ConfigError> {
        let mut deployments = Deployments::builtin();
        if let Some(custom) = &self.deployments {
            deployments.extend(custom.clone());
        }
        deployments.get(&self.deployment)
    }

    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}
