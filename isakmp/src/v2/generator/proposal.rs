use crate::v2::definitions::Proposal;
use zerocopy::network_endian::U16;
use zerocopy::AsBytes;

impl Proposal {
    /// Convert a [Proposal] into a network-level vector of bytes
    ///
    /// The argument `num` defines the number of the proposal in the list of
    /// proposals in a Security Association.
    ///
    /// The argument `last` defines if any proposal is following this proposal (false)
    /// or if this proposal is the last proposal in the Security Association payload (true).
    pub fn build(&self, num: u8, last: bool) -> Vec<u8> {
        let count = self.len();
        let mut transforms = Vec::with_capacity(12 * count);
        for (i, transform) in self.transforms().enumerate() {
            transforms.extend(transform.build(i == count - 1));
        }

        let packet_length = 8 + self.spi.len() as u16 + transforms.len() as u16;
        let mut packet = Vec::with_capacity(packet_length as usize);
        packet.push(if last { 0 } else { 2 });
        packet.push(0);
        packet.extend_from_slice(U16::from(packet_length).as_bytes());
        packet.push(num);
        packet.push(self.protocol as u8);
        packet.push(self.spi.len() as u8);
        packet.push(count as u8);
        packet.extend(self.spi.clone());
        packet.extend(transforms);
        packet
    }
}
