//! Network-specific constants.

pub mod mainnet;
pub mod testnet;

/// The length in bytes of the HASH160 payload carried by P2PKH and P2SH addresses.
pub const HASH160_LEN: usize = 20;
