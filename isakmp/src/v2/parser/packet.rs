use crate::v2::definitions::params::{ExchangeType, PayloadType};
use crate::v2::definitions::{
    Delete, Fragment, IKEv2, KeyExchange, Notification, Payload, SecurityAssociation,
};
use crate::v2::parser::{ParserError, ParserResult};
use crate::v2::IKE_2_VERSION_VALUE;
use crate::wire::{GenericPayloadHeader, Header, FLAG_INITIATOR, FLAG_RESPONSE};
use log::warn;
use zerocopy::FromBytes;

impl IKEv2 {
    /// Parse a buffer into an [IKEv2] packet, if possible.
    ///
    /// Walks the chained payload list per RFC 7296 section 3.2 until a
    /// payload declares `PayloadType::NoNextPayload` as its successor,
    /// exactly mirroring [IKEv2::try_build]'s own chaining. A payload type
    /// this crate does not model is decoded only as far as its generic
    /// header: the critical bit then decides whether the whole message is
    /// rejected (RFC 7296 section 2.5) or the payload is skipped and
    /// logged.
    pub fn try_parse(buf: &[u8]) -> Result<Self, ParserError> {
        let header = Header::ref_from_prefix(buf).ok_or(ParserError::BufferTooSmall)?;
        if header.version != IKE_2_VERSION_VALUE {
            return Err(ParserError::WrongProtocol);
        }
        if header.length.get() as usize != buf.len() {
            warn!("buffer length does not match the length carried in the IKE header");
        }

        let payloads = parse_chain(&buf[size_of::<Header>()..], header.next_payload)?;

        Ok(Self {
            initiator_spi: header.initiator_spi.get(),
            responder_spi: header.responder_spi.get(),
            exchange_type: ExchangeType::try_from(header.exchange_type)?,
            initiator: header.flags & FLAG_INITIATOR == FLAG_INITIATOR,
            response: header.flags & FLAG_RESPONSE == FLAG_RESPONSE,
            message_id: header.message_id.get(),
            payloads,
        })
    }

    /// Parse a plaintext payload chain that does not start at an IKE header.
    ///
    /// Used to decode the body of a decrypted SK/SKF payload: once the
    /// cryptographic interface has authenticated-decrypted the ciphertext,
    /// the result is itself a chain of ordinary payloads, walked exactly
    /// like the top-level one, starting from the type recorded in
    /// `Fragment::first_payload` / the SK payload's own `first_payload`.
    pub fn try_parse_chain(buf: &[u8], first_payload: PayloadType) -> Result<Vec<Payload>, ParserError> {
        parse_chain(buf, first_payload as u8)
    }
}

/// Upper bound on payloads accepted in a single chained list, enforced
/// mid-walk so a hostile chain is rejected before the rest of it is decoded
pub(crate) const MAX_CHAIN_PAYLOADS: usize = 20;

/// Walk a chained payload list starting at `next`, as found either right
/// after the IKE header or at the start of a decrypted SK/SKF body.
fn parse_chain(buf: &[u8], first_next: u8) -> Result<Vec<Payload>, ParserError> {
    let mut offset = 0;
    let mut next: u8 = first_next;
    let mut payloads = vec![];
    let mut steps = 0usize;

    while next != PayloadType::NoNextPayload as u8 {
        if steps >= MAX_CHAIN_PAYLOADS {
            return Err(ParserError::TooManyPayloads);
        }
        steps += 1;
        let remaining = buf.get(offset..).ok_or(ParserError::BufferTooSmall)?;

        let payload_type = match PayloadType::try_from(next) {
            Ok(pt) => pt,
            Err(_) => {
                let (consumed, following) = skip_unrecognized(remaining, next)?;
                offset += consumed;
                next = following;
                continue;
            }
        };

        let (payload, consumed, following): (Payload, usize, PayloadType) = match payload_type {
            PayloadType::NoNextPayload => unreachable!("loop condition excludes this"),
            PayloadType::SecurityAssociation => {
                let (v, l, n) = try_parse_generic(remaining)?;
                let sa = SecurityAssociation::try_parse(&v)?;
                (Payload::SecurityAssociation(sa), l, n)
            }
            PayloadType::KeyExchange => {
                let (v, l, n) = try_parse_generic(remaining)?;
                (Payload::KeyExchange(KeyExchange::try_parse(&v)?), l, n)
            }
            PayloadType::IdentificationInitiaor => {
                let (v, l, n) = try_parse_generic(remaining)?;
                (Payload::IdentificationInitiator(v), l, n)
            }
            PayloadType::IdentificationResponder => {
                let (v, l, n) = try_parse_generic(remaining)?;
                (Payload::IdentificationResponder(v), l, n)
            }
            PayloadType::Certificate => {
                let (v, l, n) = try_parse_generic(remaining)?;
                (Payload::Certificate(v), l, n)
            }
            PayloadType::CertificateRequest => {
                let (v, l, n) = try_parse_generic(remaining)?;
                (Payload::CertificateRequest(v), l, n)
            }
            PayloadType::Authentication => {
                let (v, l, n) = try_parse_generic(remaining)?;
                (Payload::Authentication(v), l, n)
            }
            PayloadType::Nonce => {
                let (v, l, n) = try_parse_generic(remaining)?;
                (Payload::Nonce(v), l, n)
            }
            PayloadType::Notify => {
                let (v, l, n) = try_parse_generic(remaining)?;
                (Payload::Notify(Notification::try_parse(&v)?), l, n)
            }
            PayloadType::Delete => {
                let (v, l, n) = try_parse_generic(remaining)?;
                (Payload::Delete(Delete::try_parse(&v)?), l, n)
            }
            PayloadType::VendorID => {
                let (v, l, n) = try_parse_generic(remaining)?;
                (Payload::VendorID(v), l, n)
            }
            PayloadType::TrafficSelectorInitiator => {
                let (v, l, n) = try_parse_generic(remaining)?;
                (Payload::TrafficSelectorInitiator(v), l, n)
            }
            PayloadType::TrafficSelectorResponder => {
                let (v, l, n) = try_parse_generic(remaining)?;
                (Payload::TrafficSelectorResponder(v), l, n)
            }
            PayloadType::EncryptedAndAuthenticated => {
                let (v, l, n) = try_parse_generic(remaining)?;
                (
                    Payload::EncryptedAndAuthenticated {
                        first_payload: n,
                        data: v,
                    },
                    l,
                    PayloadType::NoNextPayload,
                )
            }
            PayloadType::Configuration => {
                let (v, l, n) = try_parse_generic(remaining)?;
                (Payload::Configuration(v), l, n)
            }
            PayloadType::ExtensibleAuthentication => {
                let (v, l, n) = try_parse_generic(remaining)?;
                (Payload::ExtensibleAuthentication(v), l, n)
            }
            PayloadType::EncryptedAndAuthenticatedFragment => {
                let (v, l, n) = try_parse_generic(remaining)?;
                (
                    Payload::EncryptedAndAuthenticatedFragment(Fragment::try_parse(&v, n)?),
                    l,
                    PayloadType::NoNextPayload,
                )
            }
            // Assigned by IANA but not modeled as a structured payload by this crate;
            // fall back to the same critical-bit check an unrecognized type gets.
            PayloadType::GenericSecurePasswordMethod
            | PayloadType::GroupIdentification
            | PayloadType::GroupSecureAssociation
            | PayloadType::KeyDownload
            | PayloadType::PuzzleSolution => {
                let (consumed, following) = skip_unrecognized(remaining, next)?;
                offset += consumed;
                next = following;
                continue;
            }
        };

        offset += consumed;
        next = following as u8;
        payloads.push(payload);
    }

    Ok(payloads)
}

/// Decode only as far as the generic payload header, for a payload type this
/// crate does not know how to parse further.
///
/// Returns `Err(UnsupportedCriticalPayload)` if the critical bit is set
/// (RFC 7296 section 2.5 mandates rejecting the whole message); otherwise
/// the payload is skipped and its size and declared successor are returned
/// so the caller can keep walking the chain.
fn skip_unrecognized(buf: &[u8], payload_type: u8) -> Result<(usize, u8), ParserError> {
    let header = GenericPayloadHeader::ref_from_prefix(buf).ok_or(ParserError::BufferTooSmall)?;
    if header.is_critical() {
        return Err(ParserError::UnsupportedCriticalPayload(payload_type));
    }
    warn!("skipping unknown non-critical payload type {payload_type}");
    let consumed = header.payload_length.get() as usize;
    if consumed < size_of::<GenericPayloadHeader>() || consumed > buf.len() {
        return Err(ParserError::BufferTooSmall);
    }
    Ok((consumed, header.next_payload))
}

/// Helper to parse all payloads that only have a generic header
fn try_parse_generic(buf: &[u8]) -> ParserResult<Vec<u8>> {
    let header = GenericPayloadHeader::ref_from_prefix(buf).ok_or(ParserError::BufferTooSmall)?;
    let consumed = header.payload_length.get() as usize;
    if consumed < size_of::<GenericPayloadHeader>() || consumed > buf.len() {
        return Err(ParserError::BufferTooSmall);
    }
    Ok((
        buf[size_of::<GenericPayloadHeader>()..consumed].to_vec(),
        consumed,
        PayloadType::try_from(header.next_payload)?,
    ))
}

#[cfg(test)]
mod tests {
    use crate::v2::definitions::params::ExchangeType;
    use crate::v2::definitions::{IKEv2, Payload, SecurityAssociation};

    #[test]
    #[allow(clippy::unwrap_used)]
    fn parse_empty_packet() {
        let buff = vec![
            0x00, 0x04, 0xc0, 0x1d, 0xb4, 0x00, 0xb0, 0xc9, // initiator
            0x00, 0x00, 0x00, 0x00, 0x11, 0xf1, 0x5b, 0xa3, // responder
            0x00, // next payload
            0x20, // version
            0x25, // exchange type
            0x20, // flags, 0b00100000
            0x3b, 0x9a, 0xc9, 0xff, // message ID
            0x00, 0x00, 0x00, 0x1c, // length
        ];
        let packet = IKEv2::try_parse(buff.as_slice()).unwrap();
        assert_eq!(packet.initiator_spi, 1337133713371337);
        assert_eq!(packet.responder_spi, 301030307);
        assert_eq!(packet.message_id, 0x3b9ac9ff);
        assert_eq!(packet.exchange_type, ExchangeType::Informational);
        assert!(packet.response);
        assert_eq!(packet.payloads.len(), 0);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn parse_empty_sa_in_packet() {
        let buff = vec![
            0x00, 0x04, 0xc0, 0x1d, 0xb4, 0x00, 0xb0, 0xc9, // initiator
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // responder
            0x21, // next payload, Security Association
            0x20, // version
            0x22, // exchange type
            0x08, // flags, 0b00001000
            0x1b, 0xad, 0xc9, 0xee, // message ID
            0x00, 0x00, 0x00, 0x1c, // length
            0x00, 0x00, 0x00, 0x04, // Security Association (generic payload) header
        ];
        let packet = IKEv2::try_parse(buff.as_slice()).unwrap();
        assert_eq!(packet.initiator_spi, 1337133713371337);
        assert_eq!(packet.responder_spi, 0);
        assert_eq!(packet.message_id, 0x1badc9ee);
        assert_eq!(packet.exchange_type, ExchangeType::IkeSaInit);
        assert!(!packet.response);
        assert!(packet.initiator);
        assert_eq!(packet.payloads.len(), 1);
        assert_eq!(
            packet.payloads[0],
            Payload::SecurityAssociation(SecurityAssociation { proposals: vec![] })
        );
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn unsupported_critical_payload_is_rejected() {
        // next payload 0x80 (=128, private use) with the critical bit set
        let buff = vec![
            0x00, 0x04, 0xc0, 0x1d, 0xb4, 0x00, 0xb0, 0xc9, // initiator
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // responder
            0x80, // next payload: private-use, unknown to this crate
            0x20, // version
            0x22, // exchange type
            0x08, // flags
            0x00, 0x00, 0x00, 0x00, // message ID
            0x00, 0x00, 0x00, 0x20, // length
            0x00, 0x80, 0x00, 0x04, // generic header: no next, critical bit set
        ];
        let err = IKEv2::try_parse(buff.as_slice()).unwrap_err();
        assert!(matches!(
            err,
            crate::v2::parser::ParserError::UnsupportedCriticalPayload(128)
        ));
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn unsupported_noncritical_payload_is_skipped() {
        let buff = vec![
            0x00, 0x04, 0xc0, 0x1d, 0xb4, 0x00, 0xb0, 0xc9, // initiator
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // responder
            0x80, // next payload: private-use, unknown to this crate
            0x20, // version
            0x22, // exchange type
            0x08, // flags
            0x00, 0x00, 0x00, 0x00, // message ID
            0x00, 0x00, 0x00, 0x20, // length
            0x00, 0x00, 0x00, 0x04, // generic header: no next, critical bit clear
        ];
        let packet = IKEv2::try_parse(buff.as_slice()).unwrap();
        assert_eq!(packet.payloads.len(), 0);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn chain_longer_than_the_limit_fails_fast_without_decoding_the_rest() {
        const VENDOR_ID: u8 = 43;
        let mut body = vec![];
        // One more than MAX_CHAIN_PAYLOADS minimal (4-byte) Vendor ID payloads.
        for i in 0..=super::MAX_CHAIN_PAYLOADS {
            let next = if i == super::MAX_CHAIN_PAYLOADS { 0x00 } else { VENDOR_ID };
            body.extend_from_slice(&[next, 0x00, 0x00, 0x04]);
        }
        let mut buff = vec![
            0x00, 0x04, 0xc0, 0x1d, 0xb4, 0x00, 0xb0, 0xc9, // initiator
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // responder
            VENDOR_ID, // next payload: Vendor ID
            0x20, // version
            0x22, // exchange type
            0x08, // flags
            0x00, 0x00, 0x00, 0x00, // message ID
            0x00, 0x00, 0x00, 0x00, // length, fixed up below
        ];
        buff.extend_from_slice(&body);
        let total_len = buff.len() as u32;
        buff[24..28].copy_from_slice(&total_len.to_be_bytes());

        let err = IKEv2::try_parse(buff.as_slice()).unwrap_err();
        assert!(matches!(err, crate::v2::parser::ParserError::TooManyPayloads));
    }
}
