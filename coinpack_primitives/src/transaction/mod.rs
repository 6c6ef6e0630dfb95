//! Structs and methods for handling transactions.

pub mod packed;
mod sha256d;


use std::error;
use std::fmt;
use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use coinpack_encoding::{Array, CompactSize, Vector};
use coinpack_protocol::{consensus::Parameters, value::Amount, TxId};
use tracing::debug;

use transparent::{
    address::Script,
    bundle::{TxIn, TxOut},
    encoding::script_addresses,
};

use self::sha256d::HashWriter;

/// The segregated-witness flag that follows the empty-input marker.
const WITNESS_FLAG: u8 = 0x01;

/// Errors that can occur while parsing or packing a transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// A packed record ended before a field it requires.
    TruncatedRecord,
    /// The input is not a well-formed transaction or packed record.
    MalformedTransaction(String),
    /// A packed record starts with a schema tag this version does not understand.
    UnsupportedSchemaVersion(u8),
    /// The transaction violates an invariant required to pack it.
    EncodingError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::TruncatedRecord => write!(f, "Packed transaction record is truncated"),
            Error::MalformedTransaction(e) => write!(f, "Malformed transaction: {}", e),
            Error::UnsupportedSchemaVersion(v) => {
                write!(f, "Unsupported packed record schema version {}", v)
            }
            Error::EncodingError(e) => write!(f, "Cannot encode transaction: {}", e),
        }
    }
}

impl error::Error for Error {}

/// A transaction output, annotated with its position and derived addresses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vout {
    /// The index of this output within its transaction.
    pub n: u32,
    pub value: Amount,
    pub script_pubkey: Script,
    /// The addresses this output is indexed under, derived from `script_pubkey`.
    pub addresses: Vec<String>,
}

impl Vout {
    /// Annotates a wire output at position `n` with the addresses derived from its script.
    pub fn from_txout<P: Parameters>(n: u32, txout: &TxOut, params: &P) -> Self {
        Vout {
            n,
            value: txout.value().clone(),
            script_pubkey: txout.script_pubkey().clone(),
            addresses: script_addresses(params, &txout.script_pubkey().0),
        }
    }

    /// Returns the wire form of this output.
    pub fn to_txout(&self) -> TxOut {
        TxOut::new(self.value.clone(), self.script_pubkey.clone())
    }
}

/// A transaction together with its canonical wire bytes and chain position timestamps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub txid: TxId,
    /// The canonical wire serialization, including any witness data.
    pub hex: Vec<u8>,
    pub version: i32,
    pub lock_time: u32,
    pub time: i64,
    pub block_time: i64,
    pub vin: Vec<TxIn>,
    pub vout: Vec<Vout>,
}

impl Transaction {
    /// Parses a transaction from its canonical wire serialization.
    ///
    /// Both the legacy layout and the segregated-witness layout are accepted; witness data is
    /// validated for structure and then discarded. The transaction carries no timestamps
    /// until [`Transaction::with_block_time`] is applied.
    pub fn from_wire<P: Parameters>(bytes: &[u8], params: &P) -> Result<Self, Error> {
        let mut reader = bytes;
        let tx = Self::read(&mut reader, params)
            .map_err(|e| Error::MalformedTransaction(e.to_string()))?;
        if !reader.is_empty() {
            debug!(
                trailing = reader.len(),
                "Rejecting transaction with trailing bytes"
            );
            return Err(Error::MalformedTransaction(format!(
                "{} trailing bytes after transaction",
                reader.len()
            )));
        }
        Ok(Transaction {
            hex: bytes.to_vec(),
            ..tx
        })
    }

    /// Parses a transaction from the hex encoding of its wire serialization.
    pub fn from_hex<P: Parameters>(s: &str, params: &P) -> Result<Self, Error> {
        let bytes = hex::decode(s).map_err(|e| Error::MalformedTransaction(e.to_string()))?;
        Self::from_wire(&bytes, params)
    }

    /// Reads a transaction from the given reader.
    ///
    /// The returned transaction's `hex` field holds the non-witness serialization; use
    /// [`Transaction::from_wire`] to retain the bytes exactly as given.
    pub fn read<R: Read, P: Parameters>(mut reader: R, params: &P) -> io::Result<Self> {
        let version = reader.read_i32::<LittleEndian>()?;

        let mut has_witness = false;
        let vin_count: usize = CompactSize::read_t(&mut reader)?;
        let (vin, vout) = if vin_count == 0 {
            match reader.read_u8()? {
                // An empty input list followed by an empty output list.
                0 => (vec![], vec![]),
                WITNESS_FLAG => {
                    has_witness = true;
                    (
                        Vector::read(&mut reader, TxIn::read)?,
                        Vector::read(&mut reader, TxOut::read)?,
                    )
                }
                flag => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("unknown transaction optional data flag {:#04x}", flag),
                    ))
                }
            }
        } else {
            (
                Array::read(&mut reader, vin_count, TxIn::read)?,
                Vector::read(&mut reader, TxOut::read)?,
            )
        };

        if has_witness {
            Self::skip_witnesses(&mut reader, vin.len())?;
        }

        let lock_time = reader.read_u32::<LittleEndian>()?;

        let vout = vout
            .iter()
            .enumerate()
            .map(|(n, txout)| {
                u32::try_from(n)
                    .map(|n| Vout::from_txout(n, txout, params))
                    .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "too many outputs"))
            })
            .collect::<io::Result<Vec<_>>>()?;

        let mut tx = Transaction {
            txid: TxId::from_bytes([0; 32]),
            hex: vec![],
            version,
            lock_time,
            time: 0,
            block_time: 0,
            vin,
            vout,
        };
        let mut hex = vec![];
        tx.write(&mut hex)?;
        let mut writer = HashWriter::default();
        writer.write_all(&hex)?;
        tx.txid = TxId::from_bytes(writer.into_hash());
        tx.hex = hex;
        Ok(tx)
    }

    fn skip_witnesses<R: Read>(mut reader: R, inputs: usize) -> io::Result<()> {
        let mut any_witness = false;
        for _ in 0..inputs {
            #[allow(clippy::redundant_closure)]
            let stack: Vec<Vec<u8>> = Vector::read(&mut reader, |r| Vector::read_bytes(r))?;
            any_witness |= !stack.is_empty();
        }
        if any_witness {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "superfluous witness record",
            ))
        }
    }

    /// Writes the non-witness serialization of this transaction, from which its txid is
    /// computed.
    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_i32::<LittleEndian>(self.version)?;
        Vector::write(&mut writer, &self.vin, |w, e| e.write(w))?;
        Vector::write(&mut writer, &self.vout, |w, e| e.to_txout().write(w))?;
        writer.write_u32::<LittleEndian>(self.lock_time)
    }

    /// Sets both timestamps of this transaction to the time of the block that mined it.
    pub fn with_block_time(self, block_time: i64) -> Self {
        Transaction {
            time: block_time,
            block_time,
            ..self
        }
    }

    pub fn txid(&self) -> TxId {
        self.txid
    }

    /// Returns `true` if this transaction matches the definition of a coinbase transaction.
    pub fn is_coinbase(&self) -> bool {
        // From `CTransaction::IsCoinBase()`:
        //   return (vin.size() == 1 && vin[0].prevout.IsNull());
        matches!(&self.vin[..], [input] if input.is_coinbase())
    }

    /// Returns the sum of this transaction's output values.
    pub fn value_out(&self) -> Amount {
        self.vout.iter().map(|out| &out.value).sum()
    }
}

#[cfg(any(test, feature = "test-dependencies"))]
pub mod testing {
    use proptest::collection::vec;
    use proptest::prelude::*;

    use coinpack_protocol::consensus::Network;
    use transparent::bundle::testing::{arb_txin, arb_txout};

    use super::Transaction;

    prop_compose! {
        /// Transactions in the legacy wire layout, built by parsing their own serialization
        /// so that every derived field is consistent.
        pub fn arb_tx(network: Network)(
            version in any::<i32>(),
            vin in vec(arb_txin(), 1..10),
            vout in vec(arb_txout(), 0..10),
            lock_time in any::<u32>(),
        ) -> Transaction {
            let mut bytes = vec![];
            bytes.extend_from_slice(&version.to_le_bytes());
            coinpack_encoding::Vector::write(&mut bytes, &vin, |w, e| e.write(w)).unwrap();
            coinpack_encoding::Vector::write(&mut bytes, &vout, |w, e| e.write(w)).unwrap();
            bytes.extend_from_slice(&lock_time.to_le_bytes());
            Transaction::from_wire(&bytes, &network).unwrap()
        }
    }
}
