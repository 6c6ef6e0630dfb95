use std::fmt;
use std::io::{self, Read, Write};
use std::str::FromStr;

/// The identifier for a transaction.
///
/// This is a double-SHA-256 hash of the encoded transaction (excluding any segregated
/// witness data). It is stored in internal byte order and displayed byte-reversed, the
/// way node RPC interfaces and block explorers present it.
#[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct TxId([u8; 32]);

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The (byte-flipped) hex string is more useful than the raw bytes, because we can
        // look that up in RPC methods and block explorers.
        let txid_str = self.to_string();
        f.debug_tuple("TxId").field(&txid_str).finish()
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut data = self.0;
        data.reverse();
        formatter.write_str(&hex::encode(data))
    }
}

impl FromStr for TxId {
    type Err = hex::FromHexError;

    /// Parses the byte-reversed hex form produced by [`TxId`]'s `Display` impl.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut data = [0u8; 32];
        hex::decode_to_slice(s, &mut data)?;
        data.reverse();
        Ok(TxId(data))
    }
}

impl AsRef<[u8; 32]> for TxId {
    fn as_ref(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<TxId> for [u8; 32] {
    fn from(value: TxId) -> Self {
        value.0
    }
}

impl TxId {
    /// Wraps the given byte array as a TxId value
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        TxId(bytes)
    }

    /// Reads a 32-byte txid directly from the provided reader.
    pub fn read<R: Read>(mut reader: R) -> io::Result<Self> {
        let mut hash = [0u8; 32];
        reader.read_exact(&mut hash)?;
        Ok(TxId::from_bytes(hash))
    }

    /// Writes the 32-byte payload directly to the provided writer.
    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(&self.0)?;
        Ok(())
    }

    /// Returns true when the txid consists of all zeros; this only occurs in the outpoint
    /// of a coinbase input.
    pub fn is_null(&self) -> bool {
        self.0 == [0u8; 32]
    }
}
