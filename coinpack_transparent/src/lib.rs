//! # Transparent scripts and addresses for Bitcoin-derived chains
//!
//! This crate maps between output locking scripts and their Base58Check address text,
//! classifies scripts against the standard templates, and provides the wire encodings of
//! transaction inputs and outputs.

pub mod address;
pub mod bundle;
pub mod encoding;
pub mod opcodes;
pub mod solver;
