use crate::v2::definitions::header::{ProposalHeader, TransformHeader};
use crate::v2::definitions::params::{
    EncryptionAlgorithm, IntegrityAlgorithm, KeyExchangeMethod, PseudorandomFunction,
    SecurityProtocol, SequenceNumber, TransformType,
};
use crate::v2::definitions::{Attribute, Proposal};
use crate::v2::parser::ParserError;
use zerocopy::FromBytes;

impl Proposal {
    /// Parses a single proposal, starting at its own [ProposalHeader].
    ///
    /// `header` has already been read from the front of `buf` by the
    /// caller (which also validates proposal numbering across the whole
    /// Security Association); `buf` spans exactly this proposal, header
    /// included.
    pub(crate) fn try_parse(header: &ProposalHeader, buf: &[u8]) -> Result<Self, ParserError> {
        let header_len = size_of::<ProposalHeader>();
        let spi_len = header.spi_size as usize;
        let proposal_len = header.proposal_length.get() as usize;
        if proposal_len < header_len + spi_len || proposal_len > buf.len() {
            return Err(ParserError::BufferTooSmall);
        }
        let spi = Vec::from(&buf[header_len..header_len + spi_len]);
        let protocol = SecurityProtocol::try_from(header.protocol_id)?;

        let mut encryption_algorithms = vec![];
        let mut pseudo_random_functions = vec![];
        let mut integrity_algorithms = vec![];
        let mut key_exchange_methods = vec![];
        let mut sequence_numbers = vec![];

        let mut offset = header_len + spi_len;
        for i in 0..header.num_transforms {
            let theader = TransformHeader::ref_from_prefix(&buf[offset..])
                .ok_or(ParserError::BufferTooSmall)?;
            let transform_len = theader.transform_length.get() as usize;
            if transform_len < size_of::<TransformHeader>() || offset + transform_len > buf.len() {
                return Err(ParserError::BufferTooSmall);
            }
            let last = theader.last_substruct == 0;
            if last != (i + 1 == header.num_transforms) {
                return Err(ParserError::ProtocolViolation);
            }

            let ttype = TransformType::try_from(theader.transform_type)?;
            let tid = theader.transform_id.get();
            let attr_buf = &buf[offset + size_of::<TransformHeader>()..offset + transform_len];

            match ttype {
                TransformType::EncryptionAlgorithm => {
                    let algorithm = EncryptionAlgorithm::try_from(tid)?;
                    let key_length = if attr_buf.is_empty() {
                        None
                    } else {
                        match Attribute::try_parse(attr_buf)? {
                            Attribute::KeyLength(l) => Some(l),
                        }
                    };
                    encryption_algorithms.push((algorithm, key_length));
                }
                TransformType::PseudoRandomFunction => {
                    pseudo_random_functions.push(PseudorandomFunction::try_from(tid)?);
                }
                TransformType::IntegrityAlgorithm => {
                    integrity_algorithms.push(IntegrityAlgorithm::try_from(tid)?);
                }
                TransformType::KeyExchangeMethod => {
                    key_exchange_methods.push(KeyExchangeMethod::try_from(tid)?);
                }
                TransformType::SequenceNumber => {
                    sequence_numbers.push(SequenceNumber::try_from(tid)?);
                }
                // Additional Key Exchange, Key Wrap and GCAM transform types are not
                // negotiated by anything this crate builds; ignore rather than fail
                // the whole proposal, mirroring the unknown-non-critical-payload rule.
                _ => {}
            }

            offset += transform_len;
        }

        Ok(Self {
            protocol,
            spi,
            encryption_algorithms,
            pseudo_random_functions,
            integrity_algorithms,
            key_exchange_methods,
            sequence_numbers,
        })
    }
}
