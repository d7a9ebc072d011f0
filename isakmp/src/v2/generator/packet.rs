use crate::v2::definitions::params::PayloadType;
use crate::v2::definitions::{Header, IKEv2};
use crate::v2::generator::{GeneratorError, ESTIMATED_PAYLOAD_LENGTH};
use crate::wire::{FLAG_INITIATOR, FLAG_RESPONSE};
use zerocopy::network_endian::{U32, U64};
use zerocopy::AsBytes;

impl IKEv2 {
    /// Convert an [IKEv2] packet into its network-level byte representation
    pub fn try_build(&self) -> Result<Vec<u8>, GeneratorError> {
        if self.payloads.len() >= 255 {
            return Err(GeneratorError::TooManyPayloads);
        }
        let mut payloads = Vec::with_capacity(ESTIMATED_PAYLOAD_LENGTH * self.payloads.len());
        for (i, payload) in self.payloads.iter().enumerate() {
            payloads.extend(payload.try_build(match self.payloads.get(i + 1) {
                None => PayloadType::NoNextPayload,
                Some(next) => next.into(),
            })?);
        }

        let packet_length = 28 + payloads.len() as u32;
        let header = Header {
            initiator_spi: U64::from(self.initiator_spi),
            responder_spi: U64::from(self.responder_spi),
            next_payload: match self.payloads.first() {
                None => PayloadType::NoNextPayload,
                Some(t) => t.into(),
            } as u8,
            version: crate::v2::IKE_2_VERSION_VALUE,
            exchange_type: self.exchange_type as u8,
            flags: (if self.initiator { FLAG_INITIATOR } else { 0 })
                | (if self.response { FLAG_RESPONSE } else { 0 }),
            message_id: U32::from(self.message_id),
            length: U32::from(packet_length),
        };

        let mut packet = Vec::with_capacity(packet_length as usize);
        packet.extend_from_slice(header.as_bytes());
        packet.extend(payloads);
        Ok(packet)
    }
}
