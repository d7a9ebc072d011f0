use crate::v2::definitions::header::NotifyHeader;
use crate::v2::definitions::params::{NotificationType, PayloadType};
use crate::v2::definitions::Notification;
use crate::v2::generator::GeneratorError;
use crate::wire::GenericPayloadHeader;
use zerocopy::network_endian::U16;
use zerocopy::AsBytes;

impl Notification {
    /// Build a network-level packet from a [Notification]
    pub fn try_build(&self, next_payload: PayloadType) -> Result<Vec<u8>, GeneratorError> {
        let notification_type = match self.variant {
            NotificationType::Error(e) => e as u16,
            NotificationType::Status(s) => s as u16,
        };

        let spi_len = match &self.spi {
            Some(spi) if spi.len() < 256 => spi.len() as u8,
            Some(_) => return Err(GeneratorError::SpiTooLong),
            None => 0,
        };
        let generic_header = GenericPayloadHeader {
            next_payload: next_payload as u8,
            reserved: 0,
            payload_length: U16::from(8 + spi_len as u16 + self.data.len() as u16),
        };
        let notify_header = NotifyHeader {
            protocol_id: self.protocol as u8,
            spi_size: spi_len,
            notify_message_type: U16::from(notification_type),
        };

        let mut packet = Vec::with_capacity(self.data.len() + 8);
        packet.extend_from_slice(generic_header.as_bytes());
        packet.extend_from_slice(notify_header.as_bytes());
        if let Some(spi) = &self.spi {
            packet.extend_from_slice(spi);
        }
        packet.extend_from_slice(&self.data);
        Ok(packet)
    }
}

#[cfg(test)]
mod tests {
    use crate::v2::definitions::params::{NotifyErrorMessage, PayloadType, SecurityProtocol};
    use crate::v2::definitions::{Notification, NotificationType};

    #[test]
    fn no_proposal_chosen() {
        let notification = Notification {
            variant: NotificationType::Error(NotifyErrorMessage::NoProposalChosen),
            protocol: SecurityProtocol::Reserved,
            spi: None,
            data: vec![],
        };
        assert_eq!(
            notification.try_build(PayloadType::NoNextPayload).unwrap(),
            vec![0x00, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x0e]
        );
    }
}
