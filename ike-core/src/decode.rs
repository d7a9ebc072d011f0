//! Payload Decoder: turn a wire-parsed [IKEv2] message into a classified
//! [MessageDigest]
//!
//! The byte-level walk (descriptor lookup, critical-bit handling, generic
//! payload skip) already lives in `isakmp::v2::parser::packet`, grounded on
//! the teacher's `ike-parser::v1::parse_packet` walking loop; this module's
//! job is the classification pass the spec calls out separately: turning the
//! already-typed payload chain into the `seen`/`repeated` bitsets and
//! detecting the one condition the decode step itself must report upward,
//! an unsupported critical payload.

use crate::digest::{MessageDigest, NotificationOutcome, PayloadSummary, PayloadTypeSet};
use isakmp::v2::definitions::params::PayloadType;
use isakmp::v2::definitions::{IKEv2, Payload};
use isakmp::v2::parser::ParserError;
use std::net::SocketAddr;
use thiserror::Error;
use tracing::trace;

/// Upper bound on payloads accepted in a single chain (outer or inner)
///
/// Enforced mid-walk by `isakmp::v2::parser::packet::parse_chain` itself, so
/// a hostile chain is rejected without decoding the rest of it; mirrored here
/// only so this crate's own tests and docs have a name for the same number.
pub const MAX_PAYLOADS_PER_MESSAGE: usize = 20;

/// Failure while decoding and classifying an incoming message
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The datagram is shorter than the fixed header, or declares a wrong IKE version
    #[error("message is too small or not IKEv2")]
    Malformed,
    /// The payload chain exceeds [MAX_PAYLOADS_PER_MESSAGE]
    #[error("message carries more than {MAX_PAYLOADS_PER_MESSAGE} payloads")]
    TooManyPayloads,
    /// A critical payload of an unrecognized type was encountered
    ///
    /// Carries the raw numeric type, as RFC 7296 section 2.5 requires it be
    /// echoed in the `UNSUPPORTED_CRITICAL_PAYLOAD` notification.
    #[error("unsupported critical payload: type {0}")]
    UnsupportedCriticalPayload(u8),
    /// Any other structural parse failure (bad lengths, malformed sub-structures)
    #[error("invalid syntax: {0}")]
    InvalidSyntax(ParserError),
}

impl From<ParserError> for DecodeError {
    fn from(value: ParserError) -> Self {
        match value {
            ParserError::BufferTooSmall | ParserError::WrongProtocol => DecodeError::Malformed,
            ParserError::UnsupportedCriticalPayload(ty) => {
                DecodeError::UnsupportedCriticalPayload(ty)
            }
            ParserError::TooManyPayloads => DecodeError::TooManyPayloads,
            other => DecodeError::InvalidSyntax(other),
        }
    }
}

/// Decode the outer (cleartext) chain of a datagram and classify it
pub fn decode(buf: &[u8], peer: SocketAddr) -> Result<MessageDigest, DecodeError> {
    let ike = IKEv2::try_parse(buf)?;
    let message_payloads = summarize(&ike.payloads)?;
    trace!(
        exchange = ?ike.exchange_type,
        msgid = ike.message_id,
        payloads = ike.payloads.len(),
        "decoded outer payload chain"
    );
    Ok(MessageDigest {
        initiator_spi: ike.initiator_spi,
        responder_spi: ike.responder_spi,
        exchange_type: ike.exchange_type,
        initiator_flag: ike.initiator,
        response_flag: ike.response,
        message_id: ike.message_id,
        peer,
        payloads: ike.payloads,
        message_payloads,
        encrypted: None,
        encrypted_payloads: None,
    })
}

/// Decode and classify a reassembled, decrypted SK/SKF body, filling in
/// `digest.encrypted` / `digest.encrypted_payloads`
pub fn decode_inner(
    digest: &mut MessageDigest,
    plaintext: &[u8],
    first_payload: PayloadType,
) -> Result<(), DecodeError> {
    let inner = IKEv2::try_parse_chain(plaintext, first_payload)?;
    let summary = summarize(&inner)?;
    trace!(payloads = inner.len(), "decoded inner payload chain");
    digest.encrypted = Some(inner);
    digest.encrypted_payloads = Some(summary);
    Ok(())
}

fn summarize(chain: &[Payload]) -> Result<PayloadSummary, DecodeError> {
    // The chain was already walked under `MAX_PAYLOADS_PER_MESSAGE` by
    // `isakmp::v2::parser::packet::parse_chain`; nothing left to cap here.
    let mut seen = PayloadTypeSet::empty();
    let mut repeated = PayloadTypeSet::empty();
    for payload in chain {
        let ty = PayloadType::from(payload);
        if seen.insert(ty) {
            repeated.insert(ty);
        }
    }
    Ok(PayloadSummary {
        parsed: true,
        seen,
        repeated,
        notification: NotificationOutcome::NothingWrong,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use isakmp::v2::definitions::params::ExchangeType;
    use isakmp::v2::definitions::{IKEv2, SecurityAssociation};

    fn peer() -> SocketAddr {
        "127.0.0.1:500".parse().unwrap()
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn decodes_and_classifies() {
        let ike = IKEv2 {
            initiator_spi: 1,
            responder_spi: 0,
            exchange_type: ExchangeType::IkeSaInit,
            initiator: true,
            response: false,
            message_id: 0,
            payloads: vec![
                Payload::SecurityAssociation(SecurityAssociation { proposals: vec![] }),
                Payload::Nonce(vec![0; 16]),
            ],
        };
        let buf = ike.try_build().unwrap();
        let digest = decode(&buf, peer()).unwrap();
        assert!(digest
            .message_payloads
            .seen
            .contains(PayloadType::SecurityAssociation));
        assert!(digest.message_payloads.seen.contains(PayloadType::Nonce));
        assert!(digest.message_payloads.repeated.is_empty());
    }

    #[test]
    fn rejects_truncated_buffer() {
        assert!(matches!(decode(&[0u8; 4], peer()), Err(DecodeError::Malformed)));
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn repeated_payload_is_tracked() {
        let ike = IKEv2 {
            initiator_spi: 1,
            responder_spi: 2,
            exchange_type: ExchangeType::Informational,
            initiator: true,
            response: false,
            message_id: 1,
            payloads: vec![
                Payload::VendorID(vec![1]),
                Payload::VendorID(vec![2]),
            ],
        };
        let buf = ike.try_build().unwrap();
        let digest = decode(&buf, peer()).unwrap();
        assert!(digest.message_payloads.repeated.contains(PayloadType::VendorID));
    }
}
