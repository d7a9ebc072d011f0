use crate::v2::definitions::header::DeleteHeader;
use crate::v2::definitions::params::SecurityProtocol;
use crate::v2::definitions::Delete;
use crate::v2::parser::ParserError;
use zerocopy::FromBytes;

impl Delete {
    /// Parses a buffer into a [Delete]. The buffer must not contain the
    /// generic payload header.
    pub(crate) fn try_parse(buf: &[u8]) -> Result<Self, ParserError> {
        let header = DeleteHeader::ref_from_prefix(buf).ok_or(ParserError::BufferTooSmall)?;
        let protocol = SecurityProtocol::try_from(header.protocol_id)?;
        let spi_size = header.spi_size as usize;
        let num_spis = header.num_spis.get() as usize;
        let body = &buf[size_of::<DeleteHeader>()..];

        let mut spis = Vec::with_capacity(num_spis);
        if spi_size > 0 {
            if body.len() < spi_size * num_spis {
                return Err(ParserError::BufferTooSmall);
            }
            for chunk in body.chunks_exact(spi_size).take(num_spis) {
                spis.push(chunk.to_vec());
            }
        }

        Ok(Self { protocol, spis })
    }
}

#[cfg(test)]
mod tests {
    use crate::v2::definitions::params::{PayloadType, SecurityProtocol};
    use crate::v2::definitions::Delete;

    #[test]
    #[allow(clippy::unwrap_used)]
    fn single_child_sa_roundtrip() {
        let delete = Delete {
            protocol: SecurityProtocol::EncapsulatingSecurityPayload,
            spis: vec![vec![0x13, 0x37, 0x13, 0x37]],
        };
        let built = delete.try_build(PayloadType::NoNextPayload).unwrap();
        let parsed = Delete::try_parse(&built[4..]).unwrap();
        assert_eq!(delete, parsed);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn ike_sa_has_no_spi_roundtrip() {
        let delete = Delete {
            protocol: SecurityProtocol::InternetKeyExchange,
            spis: vec![],
        };
        let built = delete.try_build(PayloadType::NoNextPayload).unwrap();
        let parsed = Delete::try_parse(&built[4..]).unwrap();
        assert_eq!(delete, parsed);
    }
}
