//! Fixed-size network-level header structures shared by every IKEv2 message
//!
//! Both structs are a direct mapping of RFC 7296 section 3.1 (the IKE
//! header) and section 3.2 (the generic payload header) onto memory, so
//! they can be read and written with zerocopy instead of hand-rolled
//! bit-shifting.

use zerocopy::network_endian::{U16, U32, U64};
use zerocopy::{AsBytes, FromBytes, FromZeroes, Unaligned};

/// Bit 3 of the header flags octet: set by whichever peer started the IKE SA
pub const FLAG_INITIATOR: u8 = 0b0000_1000;
/// Bit 4 of the header flags octet: reserved for the IKE major version
pub const FLAG_VERSION: u8 = 0b0001_0000;
/// Bit 5 of the header flags octet: set on responses, clear on requests
pub const FLAG_RESPONSE: u8 = 0b0010_0000;

/// Bit 0x80 of a generic payload header's "reserved" octet: the critical bit
///
/// RFC 7296 section 2.5: if set and the receiver does not recognize the
/// payload type, the message MUST be rejected.
pub const FLAG_CRITICAL: u8 = 0b1000_0000;

/// The fixed 28-octet IKE header that begins every message
///
///                          1                   2                   3
///      0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
///     +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///     |                       IKE SA Initiator's SPI                 |
///     +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///     |                       IKE SA Responder's SPI                 |
///     +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///     |  Next Payload | MjVer | MnVer | Exchange Type |     Flags     |
///     +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///     |                          Message ID                          |
///     +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///     |                            Length                            |
///     +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
#[derive(Debug, FromBytes, FromZeroes, AsBytes, Unaligned, Copy, Clone)]
#[repr(C, packed)]
pub struct Header {
    /// SPI chosen by the party that started the IKE SA
    pub initiator_spi: U64,
    /// SPI chosen by the responding party; zero until it has responded
    pub responder_spi: U64,
    /// Type of the first payload following this header, see `PayloadType`
    pub next_payload: u8,
    /// Major/minor version in 4 bits each; IKEv2 is `0b0010_0000`
    pub version: u8,
    /// Type of exchange this message belongs to, see `ExchangeType`
    pub exchange_type: u8,
    /// `FLAG_INITIATOR` / `FLAG_VERSION` / `FLAG_RESPONSE`
    pub flags: u8,
    /// Message ID for this direction of this IKE SA
    pub message_id: U32,
    /// Total length of the message in octets, including this header
    pub length: U32,
}

/// The 4-octet header prefixing every payload except the fixed IKE header
///
///                          1                   2                   3
///      0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
///     +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///     | Next Payload  |C|  RESERVED   |         Payload Length        |
///     +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
#[derive(Debug, FromBytes, FromZeroes, AsBytes, Unaligned, Copy, Clone)]
#[repr(C, packed)]
pub struct GenericPayloadHeader {
    /// Type of the payload following this one, or `PayloadType::NoNextPayload`
    pub next_payload: u8,
    /// Top bit is `FLAG_CRITICAL`; remaining bits are reserved and must be zero
    pub reserved: u8,
    /// Length of this payload in octets, including this 4-octet header
    pub payload_length: U16,
}

impl GenericPayloadHeader {
    /// Whether the critical bit is set for this payload
    pub fn is_critical(&self) -> bool {
        self.reserved & FLAG_CRITICAL == FLAG_CRITICAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zerocopy::FromBytes;

    #[test]
    fn header_size_is_28_octets() {
        assert_eq!(size_of::<Header>(), 28);
    }

    #[test]
    fn generic_payload_header_size_is_4_octets() {
        assert_eq!(size_of::<GenericPayloadHeader>(), 4);
    }

    #[test]
    fn critical_bit_roundtrip() {
        let header = GenericPayloadHeader {
            next_payload: 0,
            reserved: FLAG_CRITICAL,
            payload_length: U16::from(4),
        };
        assert!(header.is_critical());
        let header = GenericPayloadHeader::ref_from_prefix(&[0, 0, 0, 4]).unwrap();
        assert!(!header.is_critical());
    }
}
