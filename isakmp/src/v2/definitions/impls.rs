use crate::v2::definitions::params::{PayloadType, SecurityProtocol};
use crate::v2::definitions::{Payload, Proposal, Transform};

impl Proposal {
    /// Return the length of the [Proposal] as sum of the number of all its transforms
    pub fn len(&self) -> usize {
        self.encryption_algorithms.len()
            + self.pseudo_random_functions.len()
            + self.integrity_algorithms.len()
            + self.key_exchange_methods.len()
            + self.sequence_numbers.len()
    }

    /// Check whether the [Proposal] has no transforms at all
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add a number of transforms to the [Proposal], grouping by the correct transform type
    pub fn add(&mut self, transforms: Vec<Transform>) {
        for transform in transforms {
            match transform {
                Transform::Encryption(a, o) => self.encryption_algorithms.push((a, o)),
                Transform::PseudoRandomFunction(p) => self.pseudo_random_functions.push(p),
                Transform::Integrity(i) => self.integrity_algorithms.push(i),
                Transform::KeyExchange(k) => self.key_exchange_methods.push(k),
                Transform::SequenceNumber(s) => self.sequence_numbers.push(s),
            }
        }
    }

    /// Easily construct a new empty [Proposal] with the supplied protocol and SPI
    pub fn new_empty(protocol: SecurityProtocol, spi: Option<Vec<u8>>) -> Self {
        Self {
            protocol,
            spi: spi.unwrap_or_default(),
            encryption_algorithms: vec![],
            pseudo_random_functions: vec![],
            integrity_algorithms: vec![],
            key_exchange_methods: vec![],
            sequence_numbers: vec![],
        }
    }

    /// Iterate over the transforms of the proposal, in their canonical wire order
    ///
    /// RFC 7296's own examples, and every interoperable implementation, lay
    /// transforms out grouped by type in the order encryption, PRF,
    /// integrity, key exchange, sequence numbers.
    pub fn transforms(&self) -> impl Iterator<Item = Transform> + '_ {
        self.encryption_algorithms
            .iter()
            .map(|(a, o)| Transform::Encryption(*a, *o))
            .chain(
                self.pseudo_random_functions
                    .iter()
                    .copied()
                    .map(Transform::PseudoRandomFunction),
            )
            .chain(
                self.integrity_algorithms
                    .iter()
                    .copied()
                    .map(Transform::Integrity),
            )
            .chain(
                self.key_exchange_methods
                    .iter()
                    .copied()
                    .map(Transform::KeyExchange),
            )
            .chain(
                self.sequence_numbers
                    .iter()
                    .copied()
                    .map(Transform::SequenceNumber),
            )
    }
}

impl From<&Payload> for PayloadType {
    fn from(value: &Payload) -> Self {
        match value {
            Payload::SecurityAssociation(_) => PayloadType::SecurityAssociation,
            Payload::KeyExchange(_) => PayloadType::KeyExchange,
            Payload::IdentificationInitiator(_) => PayloadType::IdentificationInitiaor,
            Payload::IdentificationResponder(_) => PayloadType::IdentificationResponder,
            Payload::Certificate(_) => PayloadType::Certificate,
            Payload::CertificateRequest(_) => PayloadType::CertificateRequest,
            Payload::Authentication(_) => PayloadType::Authentication,
            Payload::Nonce(_) => PayloadType::Nonce,
            Payload::Notify(_) => PayloadType::Notify,
            Payload::Delete(_) => PayloadType::Delete,
            Payload::VendorID(_) => PayloadType::VendorID,
            Payload::TrafficSelectorInitiator(_) => PayloadType::TrafficSelectorInitiator,
            Payload::TrafficSelectorResponder(_) => PayloadType::TrafficSelectorResponder,
            Payload::EncryptedAndAuthenticated { .. } => PayloadType::EncryptedAndAuthenticated,
            Payload::Configuration(_) => PayloadType::Configuration,
            Payload::ExtensibleAuthentication(_) => PayloadType::ExtensibleAuthentication,
            Payload::EncryptedAndAuthenticatedFragment(_) => {
                PayloadType::EncryptedAndAuthenticatedFragment
            }
        }
    }
}
