//! Support for transparent addresses and scripts.

use std::fmt;
use std::io::{self, Read, Write};

use coinpack_encoding::Vector;
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::{
    opcodes::op,
    solver::{self, ScriptKind},
};

/// A serialized script, used inside transparent inputs and outputs of a transaction.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Script(pub Vec<u8>);

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Script")
            .field(&hex::encode(&self.0))
            .finish()
    }
}

impl Script {
    pub fn read<R: Read>(reader: R) -> io::Result<Self> {
        Vector::read_bytes(reader).map(Script)
    }

    pub fn write<W: Write>(&self, writer: W) -> io::Result<()> {
        Vector::write_bytes(writer, &self.0)
    }

    /// Returns the length of this script as encoded (including the initial CompactSize).
    pub fn serialized_size(&self) -> usize {
        Vector::serialized_size_of_u8_vec(&self.0)
    }

    /// Returns the address this script pays to, if it is a P2PKH or P2SH script.
    pub fn address(&self) -> Option<TransparentAddress> {
        TransparentAddress::from_script(&self.0)
    }
}

impl AsRef<[u8]> for Script {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Script {
    fn from(value: Vec<u8>) -> Self {
        Script(value)
    }
}

/// Computes `RIPEMD160(SHA256(data))`.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    *Ripemd160::digest(Sha256::digest(data)).as_ref()
}

/// A transparent address corresponding to either a public key hash or a script hash.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TransparentAddress {
    PublicKeyHash([u8; 20]),
    ScriptHash([u8; 20]),
}

impl fmt::Debug for TransparentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PublicKeyHash(arg0) => f
                .debug_tuple("PublicKeyHash")
                .field(&hex::encode(arg0))
                .finish(),
            Self::ScriptHash(arg0) => f
                .debug_tuple("ScriptHash")
                .field(&hex::encode(arg0))
                .finish(),
        }
    }
}

impl TransparentAddress {
    /// Returns the address that this Script contains, if any.
    pub fn from_script(script: &[u8]) -> Option<Self> {
        match solver::standard(script) {
            ScriptKind::PubKeyHash { hash } => Some(TransparentAddress::PublicKeyHash(hash)),
            ScriptKind::ScriptHash { hash } => Some(TransparentAddress::ScriptHash(hash)),
            _ => None,
        }
    }

    /// Derives the P2PKH address corresponding to the given serialized public key.
    ///
    /// The key is hashed exactly as given, so the compressed and uncompressed forms of the
    /// same key yield different addresses.
    pub fn from_pubkey_bytes(pubkey: &[u8]) -> Self {
        TransparentAddress::PublicKeyHash(hash160(pubkey))
    }

    /// Generate the `scriptPubKey` corresponding to this address.
    pub fn script(&self) -> Script {
        let mut script = Vec::with_capacity(25);
        match self {
            TransparentAddress::PublicKeyHash(key_id) => {
                // P2PKH script
                script.extend_from_slice(&[op::OP_DUP, op::OP_HASH160, 0x14]);
                script.extend_from_slice(key_id);
                script.extend_from_slice(&[op::OP_EQUALVERIFY, op::OP_CHECKSIG]);
            }
            TransparentAddress::ScriptHash(script_id) => {
                // P2SH script
                script.extend_from_slice(&[op::OP_HASH160, 0x14]);
                script.extend_from_slice(script_id);
                script.push(op::OP_EQUAL);
            }
        }
        Script(script)
    }
}

#[cfg(any(test, feature = "test-dependencies"))]
pub mod testing {
    use proptest::prelude::{any, prop_compose, prop_oneof, Strategy};

    use super::{Script, TransparentAddress};

    prop_compose! {
        pub fn arb_p2pkh_addr()(v in proptest::array::uniform20(any::<u8>())) -> TransparentAddress {
            TransparentAddress::PublicKeyHash(v)
        }
    }

    prop_compose! {
        pub fn arb_p2sh_addr()(v in proptest::array::uniform20(any::<u8>())) -> TransparentAddress {
            TransparentAddress::ScriptHash(v)
        }
    }

    pub fn arb_transparent_addr() -> impl Strategy<Value = TransparentAddress> {
        prop_oneof![arb_p2pkh_addr(), arb_p2sh_addr()]
    }

    prop_compose! {
        /// Arbitrary script bytes; most will classify as non-standard.
        pub fn arb_script()(v in proptest::collection::vec(any::<u8>(), 0..100)) -> Script {
            Script(v)
        }
    }

    /// Scripts that are either standard address scripts or arbitrary bytes.
    pub fn arb_output_script() -> impl Strategy<Value = Script> {
        prop_oneof![
            arb_transparent_addr().prop_map(|addr| addr.script()),
            arb_script(),
        ]
    }
}
