//! A codec bound to the parameters of a single network.

use coinpack_protocol::consensus::{BlockHeight, Parameters};
use transparent::{
    address::Script,
    encoding::{self, AddressError},
};

use crate::transaction::{packed, Error, Transaction};

/// Address and transaction encodings for the network described by `P`.
///
/// A `TxCodec` holds no state beyond its parameters, so a single instance may be shared
/// between any number of threads.
///
/// # Examples
///
/// ```
/// use coinpack_primitives::{codec::TxCodec, consensus::Network};
///
/// let codec = TxCodec::new(Network::MainNetwork);
/// let script = codec.decode_address("MPyNGZSSZ4rbjkVJRLn3v64pMcktpEYJnU").unwrap();
/// assert_eq!(
///     codec.encode_address(&script.0).as_deref(),
///     Some("MPyNGZSSZ4rbjkVJRLn3v64pMcktpEYJnU"),
/// );
/// ```
#[derive(Clone, Debug)]
pub struct TxCodec<P> {
    params: P,
}

impl<P: Parameters> TxCodec<P> {
    pub fn new(params: P) -> Self {
        TxCodec { params }
    }

    /// Returns the network parameters this codec is bound to.
    pub fn params(&self) -> &P {
        &self.params
    }

    /// Parses a transaction from its canonical wire serialization.
    pub fn parse_wire(&self, bytes: &[u8]) -> Result<Transaction, Error> {
        Transaction::from_wire(bytes, &self.params)
    }

    /// Packs a transaction into its storage record. See [`packed::pack`].
    pub fn pack(
        &self,
        tx: &Transaction,
        height: BlockHeight,
        block_time: i64,
    ) -> Result<Vec<u8>, Error> {
        packed::pack(tx, height, block_time, &self.params)
    }

    /// Unpacks a storage record. See [`packed::unpack`].
    pub fn unpack(&self, buf: &[u8]) -> Result<(Transaction, BlockHeight), Error> {
        packed::unpack(buf, &self.params)
    }

    /// Decodes an address into the locking script it corresponds to.
    pub fn decode_address(&self, address: &str) -> Result<Script, AddressError> {
        encoding::decode_address(&self.params, address)
    }

    /// Returns the address text of a P2PKH or P2SH locking script.
    pub fn encode_address(&self, script: &[u8]) -> Option<String> {
        encoding::encode_address(&self.params, script)
    }

    /// Derives the addresses an output with the given locking script is indexed under.
    pub fn script_addresses(&self, script: &[u8]) -> Vec<String> {
        encoding::script_addresses(&self.params, script)
    }
}
