//! Configuration types for the withdrawal claimer.
//!
//! This crate provides:
//! - Contract address sets per deployment (mainnet, sepolia, local devnet)
//! - A registry mapping deployment names to address sets
//! - Loading custom deployments from TOML

pub mod deployment;

pub use deployment::{ConfigError, ContractAddresses, ContractAddressesBuilder, Deployments};
