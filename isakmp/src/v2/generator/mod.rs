//! Implementations for the associated function `build`/`try_build` of various
//! IKEv2 packet types that converts high-level Rust structs into network-encoded
//! byte arrays

mod attribute;
mod delete;
mod fragment;
mod key_exchange;
mod notification;
mod packet;
mod payload;
mod proposal;
mod security_association;
mod transform;

use thiserror::Error;

/// Rough average payload size used to pre-size the output buffer; avoids a
/// handful of reallocations without being exact about it
pub(crate) const ESTIMATED_PAYLOAD_LENGTH: usize = 64;
/// Rough average proposal size used to pre-size the output buffer
pub(crate) const ESTIMATED_PROPOSAL_LENGTH: usize = 32;

/// Failure while building network-level bytes from an [crate::v2::definitions::IKEv2] packet
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum GeneratorError {
    #[error("Too many payloads to fit in a single message")]
    TooManyPayloads,
    #[error("Too many proposals to fit in a single Security Association")]
    TooManyProposals,
    #[error("Nonce length must be between 16 and 256 octets")]
    InvalidNonceLength,
    #[error("SPI is too long to encode")]
    SpiTooLong,
    #[error("Too many SPIs to fit in a single Delete payload")]
    TooManySpis,
}
