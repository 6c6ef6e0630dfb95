//! Encoding and decoding functions for Base58Check transparent addresses.
//!
//! Address version prefixes are taken from a [`Parameters`] value, so the same functions
//! serve every network that shares the Base58Check address format.

use std::error;
use std::fmt;

use bs58::decode::Error as Bs58Error;
use coinpack_protocol::{consensus::Parameters, constants::HASH160_LEN};

use crate::{
    address::{Script, TransparentAddress},
    solver::{self, ScriptKind},
};

/// Errors that can occur while decoding an address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressError {
    /// The string is not valid Base58, or the decoded payload has the wrong length.
    MalformedAddress,
    /// The trailing checksum disagrees with the one computed over the decoded payload.
    ChecksumMismatch,
    /// The version prefix matches neither of the network's address versions.
    UnknownAddressVersion,
}

impl fmt::Display for AddressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressError::MalformedAddress => {
                write!(f, "Address is not a valid Base58Check string")
            }
            AddressError::ChecksumMismatch => write!(f, "Address checksum does not match"),
            AddressError::UnknownAddressVersion => {
                write!(f, "Address version is not recognized for this network")
            }
        }
    }
}

impl error::Error for AddressError {}

impl From<Bs58Error> for AddressError {
    fn from(e: Bs58Error) -> Self {
        match e {
            Bs58Error::InvalidChecksum { .. } => AddressError::ChecksumMismatch,
            _ => AddressError::MalformedAddress,
        }
    }
}

/// A trait for encoding and decoding address types against a set of network parameters.
pub trait AddressCodec<P>
where
    Self: std::marker::Sized,
{
    type Error;

    /// Encode a Rust value of type [`Self`] to its Base58Check string representation.
    fn encode(&self, params: &P) -> String;

    /// Decodes a value of type [`Self`] from its Base58Check string representation.
    fn decode(params: &P, address: &str) -> Result<Self, Self::Error>;
}

impl<P: Parameters> AddressCodec<P> for TransparentAddress {
    type Error = AddressError;

    fn encode(&self, params: &P) -> String {
        encode_transparent_address(
            params.b58_pubkey_address_prefix(),
            params.b58_script_address_prefix(),
            self,
        )
    }

    fn decode(params: &P, address: &str) -> Result<TransparentAddress, AddressError> {
        decode_transparent_address(
            params.b58_pubkey_address_prefix(),
            params.b58_script_address_prefix(),
            address,
        )
    }
}

/// Writes a [`TransparentAddress`] as a Base58Check-encoded string using the given
/// version prefixes.
///
/// # Examples
///
/// ```
/// use coinpack_protocol::consensus::{Network, Parameters};
/// use coinpack_transparent::{address::TransparentAddress, encoding::encode_transparent_address};
///
/// let network = Network::MainNetwork;
/// assert_eq!(
///     encode_transparent_address(
///         network.b58_pubkey_address_prefix(),
///         network.b58_script_address_prefix(),
///         &TransparentAddress::PublicKeyHash([0; 20]),
///     ),
///     "M7uAERuQW2AotfyLDyewFGcLUDtAYu9v5V",
/// );
/// ```
pub fn encode_transparent_address(
    pubkey_version: &[u8],
    script_version: &[u8],
    addr: &TransparentAddress,
) -> String {
    let (version, hash) = match addr {
        TransparentAddress::PublicKeyHash(key_id) => (pubkey_version, key_id),
        TransparentAddress::ScriptHash(script_id) => (script_version, script_id),
    };
    let mut decoded = Vec::with_capacity(version.len() + HASH160_LEN);
    decoded.extend_from_slice(version);
    decoded.extend_from_slice(hash);
    bs58::encode(decoded).with_check().into_string()
}

/// Decodes a [`TransparentAddress`] from a Base58Check-encoded string.
///
/// The string must match exactly; surrounding whitespace is not trimmed.
///
/// # Examples
///
/// ```
/// use coinpack_protocol::consensus::{Network, Parameters};
/// use coinpack_transparent::{
///     address::TransparentAddress,
///     encoding::{decode_transparent_address, AddressError},
/// };
///
/// let network = Network::MainNetwork;
/// assert_eq!(
///     decode_transparent_address(
///         network.b58_pubkey_address_prefix(),
///         network.b58_script_address_prefix(),
///         "r6Eb8FN9d1Xtmt1ZzBdtAJCynYS5jpWCRq",
///     ),
///     Ok(TransparentAddress::ScriptHash([0; 20])),
/// );
///
/// let test = Network::TestNetwork;
/// assert_eq!(
///     decode_transparent_address(
///         test.b58_pubkey_address_prefix(),
///         test.b58_script_address_prefix(),
///         "r6Eb8FN9d1Xtmt1ZzBdtAJCynYS5jpWCRq",
///     ),
///     Err(AddressError::UnknownAddressVersion),
/// );
/// ```
pub fn decode_transparent_address(
    pubkey_version: &[u8],
    script_version: &[u8],
    s: &str,
) -> Result<TransparentAddress, AddressError> {
    let decoded = bs58::decode(s).with_check(None).into_vec()?;

    // A prefix is accepted only if exactly one hash follows it, so that a version which is
    // itself a prefix of the other version does not shadow it.
    let payload = |version: &[u8]| -> Option<[u8; HASH160_LEN]> {
        decoded
            .strip_prefix(version)
            .and_then(|hash| hash.try_into().ok())
    };

    if let Some(hash) = payload(pubkey_version) {
        Ok(TransparentAddress::PublicKeyHash(hash))
    } else if let Some(hash) = payload(script_version) {
        Ok(TransparentAddress::ScriptHash(hash))
    } else if decoded.is_empty()
        || decoded.starts_with(pubkey_version)
        || decoded.starts_with(script_version)
    {
        Err(AddressError::MalformedAddress)
    } else {
        Err(AddressError::UnknownAddressVersion)
    }
}

/// Decodes an address into the locking script that funds sent to it must be spent through.
pub fn decode_address<P: Parameters>(params: &P, address: &str) -> Result<Script, AddressError> {
    TransparentAddress::decode(params, address).map(|addr| addr.script())
}

/// Returns the address text of a P2PKH or P2SH locking script.
///
/// Returns `None` for every other script; such scripts are valid but have no canonical
/// address form.
pub fn encode_address<P: Parameters>(params: &P, script: &[u8]) -> Option<String> {
    TransparentAddress::from_script(script).map(|addr| addr.encode(params))
}

/// Derives the addresses an output with the given locking script is indexed under.
///
/// P2PKH and P2SH scripts yield their own address. Bare public keys, alone or within a
/// multisig script, yield the P2PKH address of each key in script order. A bare key that
/// is not a point on the curve disqualifies its script, which then yields no addresses,
/// as does every other script.
pub fn script_addresses<P: Parameters>(params: &P, script: &[u8]) -> Vec<String> {
    match solver::standard(script) {
        ScriptKind::PubKeyHash { hash } => {
            vec![TransparentAddress::PublicKeyHash(hash).encode(params)]
        }
        ScriptKind::ScriptHash { hash } => {
            vec![TransparentAddress::ScriptHash(hash).encode(params)]
        }
        ScriptKind::PubKey { key } => {
            vec![TransparentAddress::from_pubkey_bytes(&key).encode(params)]
        }
        ScriptKind::MultiSig { pubkeys, .. } => pubkeys
            .iter()
            .map(|key| TransparentAddress::from_pubkey_bytes(key).encode(params))
            .collect(),
        ScriptKind::NullData { .. } | ScriptKind::Unknown => vec![],
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    use coinpack_protocol::consensus::{Network, NetworkParams, Parameters};

    use super::{
        decode_address, decode_transparent_address, encode_address, script_addresses,
        AddressCodec, AddressError,
    };
    use crate::address::{testing::arb_transparent_addr, Script, TransparentAddress};

    const MAIN: Network = Network::MainNetwork;
    const TEST: Network = Network::TestNetwork;

    fn hash(s: &str) -> [u8; 20] {
        hex::decode(s).unwrap().try_into().unwrap()
    }

    #[test]
    fn reference_vectors() {
        let vectors = [
            (
                "MPyNGZSSZ4rbjkVJRLn3v64pMcktpEYJnU",
                "76a914b04db9611672485161d38b4ee215e7a8c57d944988ac",
            ),
            (
                "MQwkVp9SVLtcNHckGw3iavmyDxD99c7zTz",
                "76a914baf792cbe04d58ed0770c5fe73065322fa4ceb4d88ac",
            ),
            (
                "rLAWjiJv3kY6fXCFUw3R8jXc21wkvhPzSL",
                "a91498cc6f0a954dfafb081d7e991c501ee0688bda9a87",
            ),
            (
                "rJr8Cd3bEyyZsaEyauxrb4tnA8Jw9XSjLd",
                "a9148a5a022dfa5c3ba85dc02074df17492f40be05c487",
            ),
        ];

        for (address, script) in vectors {
            let decoded = decode_address(&MAIN, address).unwrap();
            assert_eq!(hex::encode(&decoded.0), script);
            assert_eq!(encode_address(&MAIN, &decoded.0).as_deref(), Some(address));
            assert_eq!(script_addresses(&MAIN, &decoded.0), vec![address.to_owned()]);
        }
    }

    #[test]
    fn zero_hash_addresses() {
        for (network, p2pkh, p2sh) in [
            (
                MAIN,
                "M7uAERuQW2AotfyLDyewFGcLUDtAYu9v5V",
                "r6Eb8FN9d1Xtmt1ZzBdtAJCynYS5jpWCRq",
            ),
            (
                TEST,
                "krqkKqVQPfWW9FCSfjJjrffkbz5pYzx3eg",
                "rtuo6Txj3NTeQkHk32JX8YkZ3YwyE5uSav",
            ),
        ] {
            assert_eq!(TransparentAddress::PublicKeyHash([0; 20]).encode(&network), p2pkh);
            assert_eq!(TransparentAddress::ScriptHash([0; 20]).encode(&network), p2sh);
        }
    }

    #[test]
    fn version_gating() {
        assert_eq!(
            TransparentAddress::decode(&TEST, "MPyNGZSSZ4rbjkVJRLn3v64pMcktpEYJnU"),
            Err(AddressError::UnknownAddressVersion)
        );
        assert_eq!(
            TransparentAddress::decode(&TEST, "m8uxMy2SSiCHzKiQs6RrXV8EVNxYnxwBTy"),
            Ok(TransparentAddress::PublicKeyHash(hash(
                "b04db9611672485161d38b4ee215e7a8c57d9449"
            )))
        );
        assert_eq!(
            TransparentAddress::decode(&MAIN, "m8uxMy2SSiCHzKiQs6RrXV8EVNxYnxwBTy"),
            Err(AddressError::UnknownAddressVersion)
        );
    }

    #[test]
    fn checksum_mutations() {
        let raw = bs58::decode("rLAWjiJv3kY6fXCFUw3R8jXc21wkvhPzSL")
            .into_vec()
            .unwrap();
        let checksum_start = raw.len() - 4;
        for i in checksum_start..raw.len() {
            for delta in 1..=255u8 {
                let mut mutated = raw.clone();
                mutated[i] ^= delta;
                let s = bs58::encode(&mutated).into_string();
                assert_eq!(
                    TransparentAddress::decode(&MAIN, &s),
                    Err(AddressError::ChecksumMismatch)
                );
            }
        }
    }

    #[test]
    fn malformed() {
        // '0', 'O', 'I' and 'l' are not in the Base58 alphabet.
        assert_eq!(
            TransparentAddress::decode(&MAIN, "M0yNGZSSZ4rbjkVJRLn3v64pMcktpEYJnU"),
            Err(AddressError::MalformedAddress)
        );
        assert_eq!(
            TransparentAddress::decode(&MAIN, ""),
            Err(AddressError::MalformedAddress)
        );
        // Whitespace is significant.
        assert_eq!(
            TransparentAddress::decode(&MAIN, " MPyNGZSSZ4rbjkVJRLn3v64pMcktpEYJnU"),
            Err(AddressError::MalformedAddress)
        );

        // A correctly checksummed string with a 19-byte payload.
        let mut short = vec![50u8];
        short.extend_from_slice(&[0x11; 19]);
        let s = bs58::encode(short).with_check().into_string();
        assert_eq!(
            TransparentAddress::decode(&MAIN, &s),
            Err(AddressError::MalformedAddress)
        );

        // A correctly checksummed string with an empty payload.
        let s = bs58::encode(Vec::<u8>::new()).with_check().into_string();
        assert_eq!(
            TransparentAddress::decode(&MAIN, &s),
            Err(AddressError::MalformedAddress)
        );
    }

    #[test]
    fn custom_network_versions() {
        let params = NetworkParams::new("regtest", 0xdab5bffa, [0x0f, 0x25], [0x0f, 0x26]);
        let addr = TransparentAddress::ScriptHash([3; 20]);
        let encoded = addr.encode(&params);
        assert_eq!(TransparentAddress::decode(&params, &encoded), Ok(addr));
        assert_matches!(
            decode_transparent_address(
                params.b58_pubkey_address_prefix(),
                params.b58_script_address_prefix(),
                "MPyNGZSSZ4rbjkVJRLn3v64pMcktpEYJnU",
            ),
            Err(AddressError::UnknownAddressVersion)
        );
    }

    #[test]
    fn nested_version_prefixes() {
        // The pubkey version is itself a prefix of the script version.
        let params = NetworkParams::new("nested", 0x01020304, [0x1c], [0x1c, 0xbd]);

        let p2sh = TransparentAddress::ScriptHash([7; 20]);
        let encoded = p2sh.encode(&params);
        assert_eq!(encoded, "t3KCn5Vnmu49zQ967TmLc1uxVMzumyMyaAx");
        assert_eq!(TransparentAddress::decode(&params, &encoded), Ok(p2sh));

        let p2pkh = TransparentAddress::PublicKeyHash([7; 20]);
        let encoded = p2pkh.encode(&params);
        assert_eq!(encoded, "CH73ifEGFt2YcUFD5zBp2z7fawePVQYGRr");
        assert_eq!(TransparentAddress::decode(&params, &encoded), Ok(p2pkh));

        // A known version followed by a payload of the wrong length.
        let mut short = vec![0x1c, 0xbd];
        short.extend_from_slice(&[7; 5]);
        let s = bs58::encode(short).with_check().into_string();
        assert_eq!(
            TransparentAddress::decode(&params, &s),
            Err(AddressError::MalformedAddress)
        );

        // No known version.
        assert_eq!(
            TransparentAddress::decode(&params, "MPyNGZSSZ4rbjkVJRLn3v64pMcktpEYJnU"),
            Err(AddressError::UnknownAddressVersion)
        );
    }

    #[test]
    fn off_curve_pubkey() {
        let mut p2pk = vec![0x21, 0x02];
        p2pk.extend_from_slice(&[0; 31]);
        p2pk.push(0x05);
        p2pk.push(0xac);
        assert!(script_addresses(&MAIN, &p2pk).is_empty());
        assert_eq!(encode_address(&MAIN, &p2pk), None);
    }

    #[test]
    fn pubkey_scripts() {
        let uncompressed = hex::decode(
            "04678afdb0fe5548271967f1a67130b7105cd6a828e03909a67962e0ea1f61deb649f6bc3f4cef38c4f35504e51ec112de5c384df7ba0b8d578a4c702b6bf11d5f",
        )
        .unwrap();
        let compressed =
            hex::decode("0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798")
                .unwrap();

        let mut p2pk = vec![0x41];
        p2pk.extend_from_slice(&uncompressed);
        p2pk.push(0xac);
        assert_eq!(
            script_addresses(&MAIN, &p2pk),
            vec!["MGv9cSYnaRSTZNzYaN7bhbgmozoGkKBvCn".to_owned()]
        );
        assert_eq!(
            script_addresses(&TEST, &p2pk),
            vec!["m1rjhr8nU4n9oxDf27mQJzkBwkzvfWq11H".to_owned()]
        );
        // A bare public key has no canonical address form of its own.
        assert_eq!(encode_address(&MAIN, &p2pk), None);

        let mut multisig = vec![0x51, 0x21];
        multisig.extend_from_slice(&compressed);
        multisig.push(0x41);
        multisig.extend_from_slice(&uncompressed);
        multisig.extend_from_slice(&[0x52, 0xae]);
        assert_eq!(
            script_addresses(&MAIN, &multisig),
            vec![
                "MJaRnao1s62a2zAKSkmG582KbLKianqb7v".to_owned(),
                "MGv9cSYnaRSTZNzYaN7bhbgmozoGkKBvCn".to_owned(),
            ]
        );
        assert_eq!(encode_address(&MAIN, &multisig), None);
    }

    #[test]
    fn addressless_scripts() {
        let null_data = Script(hex::decode("6a0b68656c6c6f20776f726c64").unwrap());
        assert!(script_addresses(&MAIN, &null_data.0).is_empty());
        assert_eq!(encode_address(&MAIN, &null_data.0), None);
        assert!(script_addresses(&MAIN, &[0x51, 0x87]).is_empty());
    }

    proptest! {
        #[test]
        fn address_determinism(addr in arb_transparent_addr()) {
            for network in [MAIN, TEST] {
                let encoded = addr.encode(&network);
                let script = decode_address(&network, &encoded).unwrap();
                prop_assert_eq!(encode_address(&network, &script.0), Some(encoded.clone()));
                prop_assert_eq!(TransparentAddress::decode(&network, &encoded), Ok(addr));
            }
        }

        #[test]
        fn cross_network_rejection(addr in arb_transparent_addr()) {
            let encoded = addr.encode(&MAIN);
            prop_assert_eq!(
                TransparentAddress::decode(&TEST, &encoded),
                Err(AddressError::UnknownAddressVersion)
            );
        }
    }
}
