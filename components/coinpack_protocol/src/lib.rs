//! *Network constants and value types for Bitcoin-derived chains.*
//!
//! `coinpack_protocol` contains the per-network parameter sets consumed by the address and
//! transaction codecs, a registry through which those parameter sets are published, and the
//! value types shared by the other coinpack crates: transaction identifiers and
//! arbitrary-precision output amounts.

#![cfg_attr(docsrs, feature(doc_cfg))]
// Catch documentation errors caused by code changes.
#![deny(rustdoc::broken_intra_doc_links)]

pub mod consensus;
pub mod constants;
pub mod registry;
pub mod value;

mod txid;
pub use txid::TxId;
