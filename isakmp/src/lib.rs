//! # isakmp
//!
//! Low level wire definitions and codecs for IKEv2 (RFC 7296) and its
//! message fragmentation extension (RFC 7383).

#![warn(missing_docs, clippy::unwrap_used, clippy::expect_used)]

pub mod v2;
mod wire;

pub use wire::{GenericPayloadHeader, Header};
pub use zerocopy;
