//! Contract bindings for all external contracts.
//!
//! This crate consolidates the Solidity interfaces the withdrawal resolver talks to:
//! - Cross-domain messenger events and relay calls (L2CrossDomainMessenger)
//! - OP Stack Bedrock contracts (L2ToL1MessagePasser, L2OutputOracle, OptimismPortal)
//!
//! All bindings are generated using alloy's `sol!` macro.

pub mod messenger;
pub mod opstack;
