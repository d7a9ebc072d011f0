use crate::v2::definitions::header::FragmentHeader;
use crate::v2::definitions::params::PayloadType;
use crate::v2::definitions::Fragment;
use crate::v2::parser::ParserError;
use zerocopy::FromBytes;

impl Fragment {
    /// Parses a buffer into a [Fragment]. The buffer must not contain the
    /// generic payload header. The integrity checksum data trailing the
    /// last fragment, if any, is left inside `data` as opaque ciphertext;
    /// the fragment reassembler is the one that knows which fragment is last.
    ///
    /// `first_payload` is the generic payload header's `next_payload` field,
    /// already decoded by the caller since it is plaintext wire metadata.
    pub(crate) fn try_parse(buf: &[u8], first_payload: PayloadType) -> Result<Self, ParserError> {
        let header = FragmentHeader::ref_from_prefix(buf).ok_or(ParserError::BufferTooSmall)?;
        let data = buf[size_of::<FragmentHeader>()..].to_vec();
        Ok(Self {
            fragment_number: header.fragment_number.get(),
            total_fragments: header.total_fragments.get(),
            first_payload,
            data,
        })
    }
}
