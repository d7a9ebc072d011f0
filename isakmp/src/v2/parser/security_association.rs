use crate::v2::definitions::header::ProposalHeader;
use crate::v2::definitions::{Proposal, SecurityAssociation};
use crate::v2::parser::ParserError;
use zerocopy::FromBytes;

impl SecurityAssociation {
    /// Parses a buffer into a [SecurityAssociation]. The buffer must not contain the
    /// generic payload header, it should only contain the list of proposals. The buffer
    /// length is not checked, but will yield an error if too small. Larger buffers
    /// than necessary are ignored.
    pub(crate) fn try_parse(buf: &[u8]) -> Result<Self, ParserError> {
        if buf.is_empty() {
            return Ok(Self { proposals: vec![] });
        }

        let mut offset = 0;
        let mut proposals = vec![];
        let mut expected_num = 1u8;

        loop {
            let header = ProposalHeader::ref_from_prefix(&buf[offset..])
                .ok_or(ParserError::BufferTooSmall)?;
            let proposal_len = header.proposal_length.get() as usize;
            if proposal_len < size_of::<ProposalHeader>() || offset + proposal_len > buf.len() {
                return Err(ParserError::BufferTooSmall);
            }
            if header.proposal_num != expected_num {
                return Err(if expected_num == 1 {
                    ParserError::InvalidProposalNumberingStart
                } else {
                    ParserError::InvalidProposalNumbering
                });
            }

            let proposal = Proposal::try_parse(header, &buf[offset..offset + proposal_len])?;
            let last = header.last_substruct == 0;
            proposals.push(proposal);
            offset += proposal_len;
            expected_num += 1;

            if last {
                break;
            }
            if offset >= buf.len() {
                return Err(ParserError::BufferTooSmall);
            }
        }

        Ok(Self { proposals })
    }
}
