//! Structs representing the transparent components within transactions.

use std::io::{self, Read, Write};

use coinpack_protocol::{value::Amount, TxId};

use crate::address::{Script, TransparentAddress};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OutPoint {
    hash: TxId,
    n: u32,
}

impl OutPoint {
    /// Constructs an `OutPoint` for the output at index `n` in the transaction
    /// with txid `hash`.
    pub fn new(hash: [u8; 32], n: u32) -> Self {
        OutPoint {
            hash: TxId::from_bytes(hash),
            n,
        }
    }

    /// Constructs the null `OutPoint` referenced by coinbase inputs.
    pub const fn null() -> Self {
        OutPoint {
            hash: TxId::from_bytes([0u8; 32]),
            n: u32::MAX,
        }
    }

    /// Constructs a fake `OutPoint` for use in tests.
    #[cfg(any(test, feature = "test-dependencies"))]
    pub const fn fake() -> Self {
        OutPoint {
            hash: TxId::from_bytes([1u8; 32]),
            n: 1,
        }
    }

    pub fn read<R: Read>(mut reader: R) -> io::Result<Self> {
        let mut hash = [0u8; 32];
        reader.read_exact(&mut hash)?;
        let mut n = [0; 4];
        reader.read_exact(&mut n)?;
        Ok(OutPoint::new(hash, u32::from_le_bytes(n)))
    }

    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(self.hash.as_ref())?;
        writer.write_all(&self.n.to_le_bytes())
    }

    /// Returns `true` if this `OutPoint` is "null" in the Bitcoin sense: it has txid set to
    /// all-zeroes and output index set to `u32::MAX`.
    pub fn is_null(&self) -> bool {
        self.hash.is_null() && self.n == u32::MAX
    }

    /// Returns the output index of this `OutPoint`.
    pub fn n(&self) -> u32 {
        self.n
    }

    /// Returns the byte representation of the txid of the transaction containing this `OutPoint`.
    pub fn hash(&self) -> &[u8; 32] {
        self.hash.as_ref()
    }

    /// Returns the txid of the transaction containing this `OutPoint`.
    pub fn txid(&self) -> &TxId {
        &self.hash
    }
}

/// A transaction input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxIn {
    prevout: OutPoint,
    script_sig: Script,
    sequence: u32,
}

impl TxIn {
    /// Constructs a new [`TxIn`] from its constituent parts.
    pub fn from_parts(prevout: OutPoint, script_sig: Script, sequence: u32) -> Self {
        TxIn {
            prevout,
            script_sig,
            sequence,
        }
    }

    pub fn read<R: Read>(mut reader: &mut R) -> io::Result<Self> {
        let prevout = OutPoint::read(&mut reader)?;
        let script_sig = Script::read(&mut reader)?;
        let sequence = {
            let mut sequence = [0; 4];
            reader.read_exact(&mut sequence)?;
            u32::from_le_bytes(sequence)
        };

        Ok(TxIn {
            prevout,
            script_sig,
            sequence,
        })
    }

    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        self.prevout.write(&mut writer)?;
        self.script_sig.write(&mut writer)?;
        writer.write_all(&self.sequence.to_le_bytes())
    }

    /// Accessor for the previous transparent output that this input spends.
    pub fn prevout(&self) -> &OutPoint {
        &self.prevout
    }

    /// The unlocking script of the input.
    pub fn script_sig(&self) -> &Script {
        &self.script_sig
    }

    /// The sequence number of the input.
    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Returns `true` if this input spends the null outpoint, as coinbase inputs do.
    pub fn is_coinbase(&self) -> bool {
        self.prevout.is_null()
    }
}

/// A transaction output as it appears on the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxOut {
    value: Amount,
    script_pubkey: Script,
}

impl TxOut {
    // Constructs a new `TxOut` from its constituent parts.
    pub fn new(value: Amount, script_pubkey: Script) -> Self {
        TxOut {
            value,
            script_pubkey,
        }
    }

    /// Reads an output, rejecting negative values.
    pub fn read<R: Read>(mut reader: &mut R) -> io::Result<Self> {
        let value = {
            let mut tmp = [0u8; 8];
            reader.read_exact(&mut tmp)?;
            Amount::from_nonnegative_i64_le_bytes(tmp)
        }
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let script_pubkey = Script::read(&mut reader)?;

        Ok(TxOut {
            value,
            script_pubkey,
        })
    }

    /// Writes the output in the wire format, which carries values as a signed 64-bit
    /// integer. Fails if the value does not fit.
    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        let value = self
            .value
            .to_u64()
            .and_then(|v| i64::try_from(v).ok())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "output value exceeds the range of the wire format",
                )
            })?;
        writer.write_all(&value.to_le_bytes())?;
        self.script_pubkey.write(&mut writer)
    }

    /// Returns the address to which the TxOut was sent, if this is a valid P2SH or P2PKH output.
    pub fn recipient_address(&self) -> Option<TransparentAddress> {
        TransparentAddress::from_script(&self.script_pubkey.0)
    }

    pub fn value(&self) -> &Amount {
        &self.value
    }

    pub fn script_pubkey(&self) -> &Script {
        &self.script_pubkey
    }
}

#[cfg(any(test, feature = "test-dependencies"))]
pub mod testing {
    use proptest::collection::vec;
    use proptest::prelude::*;

    use coinpack_protocol::value::testing::arb_wire_amount;

    use super::{OutPoint, TxIn, TxOut};
    use crate::address::{testing::arb_output_script, Script};

    pub const VALID_OPCODES: [u8; 8] = [
        0x00, // OP_FALSE,
        0x51, // OP_1,
        0x52, // OP_2,
        0x53, // OP_3,
        0xac, // OP_CHECKSIG,
        0x63, // OP_IF,
        0x65, // OP_VERIF,
        0x6a, // OP_RETURN,
    ];

    prop_compose! {
        pub fn arb_outpoint()(hash in prop::array::uniform32(0u8..), n in 0..100u32) -> OutPoint {
            OutPoint::new(hash, n)
        }
    }

    prop_compose! {
        pub fn arb_script()(v in vec(prop::sample::select(&VALID_OPCODES[..]), 1..256)) -> Script {
            Script(v)
        }
    }

    prop_compose! {
        pub fn arb_txin()(
            prevout in arb_outpoint(),
            script_sig in arb_script(),
            sequence in any::<u32>()
        ) -> TxIn {
            TxIn::from_parts(prevout, script_sig, sequence)
        }
    }

    prop_compose! {
        pub fn arb_txout()(value in arb_wire_amount(), script_pubkey in arb_output_script()) -> TxOut {
            TxOut::new(value, script_pubkey)
        }
    }
}
