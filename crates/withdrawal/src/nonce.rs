//! Versioned message nonces.
//!
//! The messenger packs a 2-byte version into the top of its 256-bit nonce:
//! `nonce = version << 240 | sequence`.

use alloy_primitives::U256;

/// Bit offset of the version inside the nonce.
pub const VERSION_SHIFT: usize = 240;

/// Legacy (pre-Bedrock) message encoding.
pub const MESSAGE_VERSION_V0: u16 = 0;

/// Current (Bedrock) message encoding.
pub const MESSAGE_VERSION_V1: u16 = 1;

/// A nonce split into its sequence number and version tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionedNonce {
    pub sequence: U256,
    pub version: u16,
}

impl VersionedNonce {
    /// Largest sequence number that fits below the version bits.
    pub const MAX_SEQUENCE: U256 = U256::from_limbs([u64::MAX, u64::MAX, u64::MAX, 0xffff_ffff_ffff]);

    /// Pair a sequence number with a version.
    ///
    /// Returns `None` if the sequence would overlap the version bits.
    pub fn new(sequence: U256, version: u16) -> Option<Self> {
        (sequence <= Self::MAX_SEQUENCE).then_some(Self { sequence, version })
    }

    /// Split a raw nonce. Every 256-bit value decodes; the version is not validated.
    pub fn decode(nonce: U256) -> Self {
        Self {
            sequence: nonce & Self::MAX_SEQUENCE,
            version: (nonce >> VERSION_SHIFT).to::<u16>(),
        }
    }

    /// Pack back into a raw nonce.
    pub fn encode(&self) -> U256 {
        (U256::from(self.version) << VERSION_SHIFT) | self.sequence
    }
}

impl From<U256> for VersionedNonce {
    fn from(nonce: U256) -> Self {
        Self::decode(nonce)
    }
}
