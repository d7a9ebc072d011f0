use crate::v2::definitions::header::FragmentHeader;
use crate::v2::definitions::params::PayloadType;
use crate::v2::definitions::Fragment;
use crate::wire::GenericPayloadHeader;
use zerocopy::network_endian::U16;
use zerocopy::AsBytes;

impl Fragment {
    /// Build a network-level packet from a [Fragment] payload
    ///
    /// The caller is responsible for the Integrity Checksum Data that
    /// RFC 7383 requires appended to the last fragment; this crate treats
    /// the fragment body as opaque encrypted bytes.
    ///
    /// SKF is always the last payload in the outer chain, so `next_payload`
    /// as understood by every other payload's `build`/`try_build` does not
    /// apply here: the generic header's `next_payload` field instead names
    /// the type of the first payload inside the reassembled plaintext
    /// (RFC 7383 section 2.5), carried as [Fragment::first_payload].
    pub fn build(&self, _next_payload: PayloadType) -> Vec<u8> {
        let generic_header = GenericPayloadHeader {
            next_payload: self.first_payload as u8,
            reserved: 0,
            payload_length: U16::from(8 + self.data.len() as u16),
        };
        let fragment_header = FragmentHeader {
            fragment_number: U16::from(self.fragment_number),
            total_fragments: U16::from(self.total_fragments),
        };

        let mut packet = Vec::with_capacity(self.data.len() + 8);
        packet.extend_from_slice(generic_header.as_bytes());
        packet.extend_from_slice(fragment_header.as_bytes());
        packet.extend_from_slice(&self.data);
        packet
    }
}
