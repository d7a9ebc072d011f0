use crate::v2::definitions::header::DeleteHeader;
use crate::v2::definitions::params::PayloadType;
use crate::v2::definitions::Delete;
use crate::v2::generator::GeneratorError;
use crate::wire::GenericPayloadHeader;
use zerocopy::network_endian::U16;
use zerocopy::AsBytes;

impl Delete {
    /// Build a network-level packet from a [Delete] payload
    pub fn try_build(&self, next_payload: PayloadType) -> Result<Vec<u8>, GeneratorError> {
        if self.spis.len() >= 65536 {
            return Err(GeneratorError::TooManySpis);
        }
        let spi_size = self.spis.first().map(Vec::len).unwrap_or(0);
        if self.spis.iter().any(|spi| spi.len() != spi_size) {
            return Err(GeneratorError::SpiTooLong);
        }

        let spis: Vec<u8> = self.spis.iter().flatten().copied().collect();
        let packet_length = 8 + spis.len() as u16;
        let generic_header = GenericPayloadHeader {
            next_payload: next_payload as u8,
            reserved: 0,
            payload_length: U16::from(packet_length),
        };
        let delete_header = DeleteHeader {
            protocol_id: self.protocol as u8,
            spi_size: spi_size as u8,
            num_spis: U16::from(self.spis.len() as u16),
        };

        let mut packet = Vec::with_capacity(packet_length as usize);
        packet.extend_from_slice(generic_header.as_bytes());
        packet.extend_from_slice(delete_header.as_bytes());
        packet.extend(spis);
        Ok(packet)
    }
}

#[cfg(test)]
mod tests {
    use crate::v2::definitions::params::{PayloadType, SecurityProtocol};
    use crate::v2::definitions::Delete;

    #[test]
    #[allow(clippy::unwrap_used)]
    fn single_child_sa() {
        let delete = Delete {
            protocol: SecurityProtocol::EncapsulatingSecurityPayload,
            spis: vec![vec![0x13, 0x37, 0x13, 0x37]],
        };
        assert_eq!(
            delete.try_build(PayloadType::NoNextPayload).unwrap(),
            vec![
                0x00, 0x00, 0x00, 0x0c, // generic payload header
                0x03, 0x04, 0x00, 0x01, // delete header
                0x13, 0x37, 0x13, 0x37, // SPI
            ]
        );
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn ike_sa_has_no_spi() {
        let delete = Delete {
            protocol: SecurityProtocol::InternetKeyExchange,
            spis: vec![],
        };
        assert_eq!(
            delete.try_build(PayloadType::NoNextPayload).unwrap(),
            vec![0x00, 0x00, 0x00, 0x08, 0x01, 0x00, 0x00, 0x00]
        );
    }
}
