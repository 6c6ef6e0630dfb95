//! Constants for the Meowcoin test network.

/// The name under which the test network parameters are registered.
pub const NETWORK_NAME: &str = "test";

/// The message-start magic of the test network.
pub const NETWORK_MAGIC: u32 = 0x6377656d;

/// The prefix for a Base58Check-encoded testnet `PublicKeyHash`.
pub const B58_PUBKEY_ADDRESS_PREFIX: [u8; 1] = [109];

/// The prefix for a Base58Check-encoded testnet `ScriptHash`.
pub const B58_SCRIPT_ADDRESS_PREFIX: [u8; 1] = [124];
