//! *General transaction primitives for Bitcoin-derived chains.*
//!
//! `coinpack_primitives` is a library that parses transactions from their canonical wire
//! format and converts them to and from the packed record used to index them, annotating
//! each output with the addresses derived from its locking script.

#![cfg_attr(docsrs, feature(doc_cfg))]
// Catch documentation errors caused by code changes.
#![deny(rustdoc::broken_intra_doc_links)]

pub mod codec;
pub mod transaction;

pub use coinpack_protocol::{consensus, value};
