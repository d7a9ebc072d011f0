use crate::v2::definitions::header::KeyExchangeHeader;
use crate::v2::definitions::params::KeyExchangeMethod;
use crate::v2::definitions::KeyExchange;
use crate::v2::parser::ParserError;
use zerocopy::FromBytes;

impl KeyExchange {
    /// Parses a buffer into a [KeyExchange]. The buffer must not contain the
    /// generic payload header.
    pub(crate) fn try_parse(buf: &[u8]) -> Result<Self, ParserError> {
        let header = KeyExchangeHeader::ref_from_prefix(buf).ok_or(ParserError::BufferTooSmall)?;
        let dh_group = KeyExchangeMethod::try_from(header.dh_group_num.get())?;
        let data = buf[size_of::<KeyExchangeHeader>()..].to_vec();
        Ok(Self { dh_group, data })
    }
}

#[cfg(test)]
mod tests {
    use crate::v2::definitions::params::{KeyExchangeMethod, PayloadType};
    use crate::v2::definitions::KeyExchange;

    #[test]
    #[allow(clippy::unwrap_used)]
    fn roundtrip() {
        let ke = KeyExchange {
            dh_group: KeyExchangeMethod::Curve25519,
            data: vec![0x01, 0x02, 0x03, 0x04],
        };
        let built = ke.build(PayloadType::NoNextPayload);
        let parsed = KeyExchange::try_parse(&built[4..]).unwrap();
        assert_eq!(ke, parsed);
    }
}
