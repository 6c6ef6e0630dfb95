//! Network parameters.

use std::cmp::{Ord, Ordering};
use std::fmt;
use std::sync::Arc;

use crate::constants::{mainnet, testnet};

/// A block height on a Bitcoin-derived chain.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockHeight(u32);

/// The height of the genesis block on a network.
pub const H0: BlockHeight = BlockHeight(0);

impl BlockHeight {
    pub const fn from_u32(v: u32) -> BlockHeight {
        BlockHeight(v)
    }
}

impl fmt::Display for BlockHeight {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, formatter)
    }
}

impl Ord for BlockHeight {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl PartialOrd for BlockHeight {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<u32> for BlockHeight {
    fn from(value: u32) -> Self {
        BlockHeight(value)
    }
}

impl From<BlockHeight> for u32 {
    fn from(value: BlockHeight) -> u32 {
        value.0
    }
}

impl From<BlockHeight> for u64 {
    fn from(value: BlockHeight) -> u64 {
        value.0 as u64
    }
}

/// The constants that bind the address and transaction codecs to one network.
///
/// Implementations must be immutable: every method returns the same value for the
/// lifetime of the implementing instance, which makes a `Parameters` value safe to share
/// between any number of concurrent codec users.
pub trait Parameters {
    /// The name under which this network is known, e.g. `"main"`.
    fn network_name(&self) -> &str;

    /// The four-byte message-start value of the network's peer protocol.
    fn network_magic(&self) -> u32;

    /// Returns the Base58Check version prefix for P2PKH addresses.
    fn b58_pubkey_address_prefix(&self) -> &[u8];

    /// Returns the Base58Check version prefix for P2SH addresses.
    fn b58_script_address_prefix(&self) -> &[u8];
}

impl<P: Parameters + ?Sized> Parameters for &P {
    fn network_name(&self) -> &str {
        (*self).network_name()
    }

    fn network_magic(&self) -> u32 {
        (*self).network_magic()
    }

    fn b58_pubkey_address_prefix(&self) -> &[u8] {
        (*self).b58_pubkey_address_prefix()
    }

    fn b58_script_address_prefix(&self) -> &[u8] {
        (*self).b58_script_address_prefix()
    }
}

impl<P: Parameters + ?Sized> Parameters for Arc<P> {
    fn network_name(&self) -> &str {
        self.as_ref().network_name()
    }

    fn network_magic(&self) -> u32 {
        self.as_ref().network_magic()
    }

    fn b58_pubkey_address_prefix(&self) -> &[u8] {
        self.as_ref().b58_pubkey_address_prefix()
    }

    fn b58_script_address_prefix(&self) -> &[u8] {
        self.as_ref().b58_script_address_prefix()
    }
}

/// Marker enum for the built-in Meowcoin networks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Network {
    MainNetwork,
    TestNetwork,
}

impl Network {
    /// Selects the built-in network for a chain name.
    ///
    /// `"test"` selects the test network; every other name selects the main network.
    pub fn for_chain(chain: &str) -> Self {
        match chain {
            testnet::NETWORK_NAME => Network::TestNetwork,
            _ => Network::MainNetwork,
        }
    }
}

impl Parameters for Network {
    fn network_name(&self) -> &str {
        match self {
            Network::MainNetwork => mainnet::NETWORK_NAME,
            Network::TestNetwork => testnet::NETWORK_NAME,
        }
    }

    fn network_magic(&self) -> u32 {
        match self {
            Network::MainNetwork => mainnet::NETWORK_MAGIC,
            Network::TestNetwork => testnet::NETWORK_MAGIC,
        }
    }

    fn b58_pubkey_address_prefix(&self) -> &[u8] {
        match self {
            Network::MainNetwork => &mainnet::B58_PUBKEY_ADDRESS_PREFIX,
            Network::TestNetwork => &testnet::B58_PUBKEY_ADDRESS_PREFIX,
        }
    }

    fn b58_script_address_prefix(&self) -> &[u8] {
        match self {
            Network::MainNetwork => &mainnet::B58_SCRIPT_ADDRESS_PREFIX,
            Network::TestNetwork => &testnet::B58_SCRIPT_ADDRESS_PREFIX,
        }
    }
}

/// An owned parameter set for a single network.
///
/// This is the form in which parameters are published through a
/// [`ParamsRegistry`](crate::registry::ParamsRegistry). Fields are private so that a
/// published set can never be modified.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NetworkParams {
    name: String,
    magic: u32,
    pubkey_address_prefix: Vec<u8>,
    script_address_prefix: Vec<u8>,
}

impl NetworkParams {
    /// Constructs a parameter set from its constituent parts.
    pub fn new(
        name: impl Into<String>,
        magic: u32,
        pubkey_address_prefix: impl Into<Vec<u8>>,
        script_address_prefix: impl Into<Vec<u8>>,
    ) -> Self {
        NetworkParams {
            name: name.into(),
            magic,
            pubkey_address_prefix: pubkey_address_prefix.into(),
            script_address_prefix: script_address_prefix.into(),
        }
    }
}

impl From<Network> for NetworkParams {
    fn from(network: Network) -> Self {
        NetworkParams::new(
            network.network_name(),
            network.network_magic(),
            network.b58_pubkey_address_prefix(),
            network.b58_script_address_prefix(),
        )
    }
}

impl Parameters for NetworkParams {
    fn network_name(&self) -> &str {
        &self.name
    }

    fn network_magic(&self) -> u32 {
        self.magic
    }

    fn b58_pubkey_address_prefix(&self) -> &[u8] {
        &self.pubkey_address_prefix
    }

    fn b58_script_address_prefix(&self) -> &[u8] {
        &self.script_address_prefix
    }
}
