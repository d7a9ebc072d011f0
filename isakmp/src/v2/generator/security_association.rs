use crate::v2::definitions::params::PayloadType;
use crate::v2::definitions::SecurityAssociation;
use crate::v2::generator::{GeneratorError, ESTIMATED_PROPOSAL_LENGTH};
use crate::wire::GenericPayloadHeader;
use zerocopy::AsBytes;

impl SecurityAssociation {
    /// Build a network-level packet from a [SecurityAssociation]
    ///
    /// This might fail if the packet would not conform to the standard, for
    /// example if a proposal doesn't provide all details required to build it,
    /// or if too many of a certain type of structure is required
    pub fn try_build(&self, next_payload: PayloadType) -> Result<Vec<u8>, GeneratorError> {
        if self.proposals.len() >= 255 {
            return Err(GeneratorError::TooManyProposals);
        }
        let mut proposals = Vec::with_capacity(ESTIMATED_PROPOSAL_LENGTH * self.proposals.len());
        for (i, proposal) in self.proposals.iter().enumerate() {
            proposals.extend(proposal.build(i as u8 + 1, i == self.proposals.len() - 1));
        }

        let packet_length = 4 + proposals.len() as u16;
        let header = GenericPayloadHeader {
            next_payload: next_payload as u8,
            reserved: 0,
            payload_length: packet_length.into(),
        };
        let mut packet = Vec::with_capacity(packet_length.into());
        packet.extend_from_slice(header.as_bytes());
        packet.extend(proposals);
        Ok(packet)
    }
}
