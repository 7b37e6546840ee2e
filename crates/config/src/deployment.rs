//! Deployment configuration for withdrawal finalization.
//!
//! Provides the contract addresses the resolver needs for each known
//! deployment (mainnet, sepolia, local devnet), and a registry that maps a
//! deployment name to its address set.

use alloy_primitives::{address, Address};
use binding::{messenger::L2_CROSS_DOMAIN_MESSENGER_ADDRESS, opstack::MESSAGE_PASSER_ADDRESS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// No address set registered under this name
    #[error("Unknown deployment: {0}")]
    UnknownDeployment(String),

    /// Error parsing a deployments file
    #[error("Invalid deployments file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Contract addresses involved in an L2→L1 withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractAddresses {
    /// L2CrossDomainMessenger (emits SentMessage)
    #[serde(default = "default_l2_messenger")]
    pub l2_cross_domain_messenger: Address,
    /// L2ToL1MessagePasser (emits MessagePassed)
    #[serde(default = "default_message_passer")]
    pub l2_to_l1_message_passer: Address,
    /// L1CrossDomainMessenger proxy (target of the finalized withdrawal)
    pub l1_cross_domain_messenger: Address,
    /// L2OutputOracle proxy
    pub l2_output_oracle: Address,
    /// OptimismPortal proxy
    pub optimism_portal: Address,
}

const fn default_l2_messenger() -> Address {
    L2_CROSS_DOMAIN_MESSENGER_ADDRESS
}

const fn default_message_passer() -> Address {
    MESSAGE_PASSER_ADDRESS
}

impl ContractAddresses {
    /// OP Mainnet configuration.
    pub const fn mainnet() -> Self {
        Self {
            l2_cross_domain_messenger: L2_CROSS_DOMAIN_MESSENGER_ADDRESS,
            l2_to_l1_message_passer: MESSAGE_PASSER_ADDRESS,
            // https://etherscan.io/address/0x25ace71c97B33Cc4729CF772ae268934F7ab5fA1
            l1_cross_domain_messenger: address!("0x25ace71c97B33Cc4729CF772ae268934F7ab5fA1"),
            l2_output_oracle: address!("0xdfe97868233d1aa22e815a266982f2cf17685a27"),
            optimism_portal: address!("0xbEb5Fc579115071764c7423A4f12eDde41f106Ed"),
        }
    }

    /// OP Sepolia configuration.
    pub const fn sepolia() -> Self {
        Self {
            l2_cross_domain_messenger: L2_CROSS_DOMAIN_MESSENGER_ADDRESS,
            l2_to_l1_message_passer: MESSAGE_PASSER_ADDRESS,
            l1_cross_domain_messenger: address!("0x58Cc85b8D04EA49cC6DBd3CbFFd00B4B8D6cb3ef"),
            l2_output_oracle: address!("0x90E9c4f8a994a250F6aEfd61CAFb4F2e895D458F"),
            optimism_portal: address!("0x16Fc5058F25648194471939df75CF27A2fdC48BC"),
        }
    }

    /// Local devnet configuration (default deploy script addresses).
    pub const fn devnet() -> Self {
        Self {
            l2_cross_domain_messenger: L2_CROSS_DOMAIN_MESSENGER_ADDRESS,
            l2_to_l1_message_passer: MESSAGE_PASSER_ADDRESS,
            l1_cross_domain_messenger: address!("0xe25e55006E03Fd658Ab27AE5E6024558Ce54714E"),
            l2_output_oracle: address!("0x5bCa1AC46bdcD9812638f12aD32686cB674bF1F8"),
            optimism_portal: address!("0xa7f5460Ce599366dcC770084DD219443EC3dA2F6"),
        }
    }
}

/// Builder for custom address sets.
#[derive(Debug, Clone)]
pub struct ContractAddressesBuilder {
    addresses: ContractAddresses,
}

impl ContractAddressesBuilder {
    /// Start from an existing address set.
    pub const fn from(addresses: ContractAddresses) -> Self {
        Self { addresses }
    }

    /// Override the L1CrossDomainMessenger address.
    pub const fn l1_cross_domain_messenger(mut self, address: Address) -> Self {
        self.addresses.l1_cross_domain_messenger = address;
        self
    }

    /// Override the L2OutputOracle address.
    pub const fn l2_output_oracle(mut self, address: Address) -> Self {
        self.addresses.l2_output_oracle = address;
        self
    }

    /// Override the OptimismPortal address.
    pub const fn optimism_portal(mut self, address: Address) -> Self {
        self.addresses.optimism_portal = address;
        self
    }

    /// Override the L2CrossDomainMessenger address.
    pub const fn l2_cross_domain_messenger(mut self, address: Address) -> Self {
        self.addresses.l2_cross_domain_messenger = address;
        self
    }

    /// Override the L2ToL1MessagePasser address.
    pub const fn l2_to_l1_message_passer(mut self, address: Address) -> Self {
        self.addresses.l2_to_l1_message_passer = address;
        self
    }

    /// Build the address set.
    pub const fn build(self) -> ContractAddresses {
        self.addresses
    }
}

/// Registry of named deployments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Deployments(BTreeMap<String, ContractAddresses>);

impl Default for Deployments {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Deployments {
    /// Registry with the built-in `mainnet`, `sepolia` and `devnet` presets.
    pub fn builtin() -> Self {
        let mut map = BTreeMap::new();
        map.insert("mainnet".to_string(), ContractAddresses::mainnet());
        map.insert("sepolia".to_string(), ContractAddresses::sepolia());
        map.insert("devnet".to_string(), ContractAddresses::devnet());
        Self(map)
    }

    /// Parse deployments from a TOML document of `[name]` tables.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Merge `other` into this registry; entries in `other` win.
    pub fn extend(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    /// Look up a deployment by name.
    pub fn get(&self, name: &str) -> Result<ContractAddresses, ConfigError> {
        self.0
            .get(name)
            .copied()
            .ok_or_else(|| ConfigError::UnknownDeployment(name.to_string()))
    }

    /// Names of all registered deployments.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}
