//! Constants for the Meowcoin main network.

/// The name under which the main network parameters are registered.
pub const NETWORK_NAME: &str = "main";

/// The message-start magic of the main network.
pub const NETWORK_MAGIC: u32 = 0x4357454d;

/// The prefix for a Base58Check-encoded mainnet `PublicKeyHash`.
pub const B58_PUBKEY_ADDRESS_PREFIX: [u8; 1] = [50];

/// The prefix for a Base58Check-encoded mainnet `ScriptHash`.
pub const B58_SCRIPT_ADDRESS_PREFIX: [u8; 1] = [122];
