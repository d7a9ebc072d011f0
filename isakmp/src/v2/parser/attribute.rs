use crate::v2::definitions::header::AttributeHeader;
use crate::v2::definitions::params::{AttributeType, FLAG_ATTRIBUTE_FORMAT};
use crate::v2::definitions::Attribute;
use crate::v2::parser::ParserError;
use zerocopy::FromBytes;

impl Attribute {
    /// Parse a single Transform Attribute in its fixed-length (TV) encoding
    ///
    /// RFC 7296 only defines the Key Length attribute, always sent TV; a
    /// variable-length (TLV) attribute is not something this project's
    /// negotiated transforms ever carry, so it is rejected here rather
    /// than modeled.
    pub(crate) fn try_parse(buf: &[u8]) -> Result<Self, ParserError> {
        let header = AttributeHeader::ref_from_prefix(buf).ok_or(ParserError::BufferTooSmall)?;
        if !header.is_fixed_length() {
            return Err(ParserError::InvalidAttribute);
        }
        let raw_type = u16::from(header.attribute_type) & !FLAG_ATTRIBUTE_FORMAT;
        match AttributeType::try_from(raw_type)? {
            AttributeType::KeyLength => Ok(Attribute::KeyLength(header.attribute_value.get())),
        }
    }
}
