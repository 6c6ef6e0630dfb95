//! Classification of locking scripts against the standard templates.

use secp256k1::PublicKey;

use crate::opcodes::{op, parse_operations, Operation};

/// The standard template a locking script matches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScriptKind {
    PubKeyHash { hash: [u8; 20] },
    ScriptHash { hash: [u8; 20] },
    /// A bare public key, either compressed (33 bytes) or uncompressed (65 bytes). Keys
    /// that are not points on the curve make the script [`ScriptKind::Unknown`].
    PubKey { key: Vec<u8> },
    /// Bare `m`-of-`n` multisig, with the keys in script order.
    MultiSig { required: u8, pubkeys: Vec<Vec<u8>> },
    /// An unspendable `OP_RETURN` output. `data` is the script following the `OP_RETURN`.
    NullData { data: Vec<u8> },
    /// Any script that matches none of the templates above.
    Unknown,
}

/// Returns `true` if `key` is a serialized secp256k1 point: compressed, uncompressed or
/// hybrid, with the length implied by its header byte.
fn is_valid_pubkey(key: &[u8]) -> bool {
    PublicKey::from_slice(key).is_ok()
}

fn match_pubkey_hash(script: &[u8]) -> Option<ScriptKind> {
    match script {
        [op::OP_DUP, op::OP_HASH160, 0x14, hash @ .., op::OP_EQUALVERIFY, op::OP_CHECKSIG]
            if hash.len() == 20 =>
        {
            hash.try_into()
                .ok()
                .map(|hash| ScriptKind::PubKeyHash { hash })
        }
        _ => None,
    }
}

fn match_script_hash(script: &[u8]) -> Option<ScriptKind> {
    match script {
        [op::OP_HASH160, 0x14, hash @ .., op::OP_EQUAL] if hash.len() == 20 => hash
            .try_into()
            .ok()
            .map(|hash| ScriptKind::ScriptHash { hash }),
        _ => None,
    }
}

fn match_pubkey(script: &[u8]) -> Option<ScriptKind> {
    match script {
        [len, key @ .., op::OP_CHECKSIG]
            if usize::from(*len) == key.len() && is_valid_pubkey(key) =>
        {
            Some(ScriptKind::PubKey { key: key.to_vec() })
        }
        _ => None,
    }
}

fn match_null_data(script: &[u8]) -> Option<ScriptKind> {
    match script.split_first() {
        Some((&op::OP_RETURN, data)) => parse_operations(data)
            .ok()
            .filter(|ops| ops.iter().all(Operation::is_push))
            .map(|_| ScriptKind::NullData {
                data: data.to_vec(),
            }),
        _ => None,
    }
}

fn match_multisig(script: &[u8]) -> Option<ScriptKind> {
    let ops = parse_operations(script).ok()?;
    match &ops[..] {
        [first, keys @ .., last, Operation::Opcode(op::OP_CHECKMULTISIG)] => {
            let required = first.small_int()?;
            let total = last.small_int()?;
            if required > total || usize::from(total) != keys.len() {
                return None;
            }
            let pubkeys = keys
                .iter()
                .map(|key| match key {
                    Operation::PushBytes(key) if is_valid_pubkey(key) => Some(key.to_vec()),
                    _ => None,
                })
                .collect::<Option<Vec<_>>>()?;
            Some(ScriptKind::MultiSig { required, pubkeys })
        }
        _ => None,
    }
}

/// Classifies a locking script.
///
/// Never fails: scripts that are valid on chain but match no template, including scripts
/// containing truncated pushes, classify as [`ScriptKind::Unknown`].
pub fn standard(script: &[u8]) -> ScriptKind {
    match_pubkey_hash(script)
        .or_else(|| match_script_hash(script))
        .or_else(|| match_pubkey(script))
        .or_else(|| match_null_data(script))
        .or_else(|| match_multisig(script))
        .unwrap_or(ScriptKind::Unknown)
}
