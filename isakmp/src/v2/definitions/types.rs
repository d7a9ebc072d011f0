//! High level structs and enums making up the body of an [IKEv2] message
//!
//! These are the owned, already-decoded counterparts of the wire-level
//! headers in [crate::wire] and [super::header]; parsers build them,
//! generators consume them.

use super::params::{
    EncryptionAlgorithm, ExchangeType, IntegrityAlgorithm, KeyExchangeMethod, NotifyErrorMessage,
    NotifyStatusMessage, PayloadType, PseudorandomFunction, SecurityProtocol, SequenceNumber,
};

/// A fully decoded or yet-to-be-encoded IKEv2 message
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct IKEv2 {
    /// SPI chosen by the party that started the IKE SA
    pub initiator_spi: u64,
    /// SPI chosen by the responding party; zero until it has responded
    pub responder_spi: u64,
    pub exchange_type: ExchangeType,
    /// Whether this message was sent by whichever peer started the IKE SA
    pub initiator: bool,
    /// Whether this message is a response to a previous request
    pub response: bool,
    pub message_id: u32,
    pub payloads: Vec<Payload>,
}

/// A single payload inside an [IKEv2] message
///
/// Payload kinds whose content this crate has no use for beyond
/// passing it along (identification, certificates, traffic selectors,
/// configuration attributes, ...) are kept as their raw body bytes
/// rather than being broken down further.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Payload {
    SecurityAssociation(SecurityAssociation),
    KeyExchange(KeyExchange),
    IdentificationInitiator(Vec<u8>),
    IdentificationResponder(Vec<u8>),
    Certificate(Vec<u8>),
    CertificateRequest(Vec<u8>),
    Authentication(Vec<u8>),
    Nonce(Vec<u8>),
    Notify(Notification),
    Delete(Delete),
    VendorID(Vec<u8>),
    TrafficSelectorInitiator(Vec<u8>),
    TrafficSelectorResponder(Vec<u8>),
    /// Encrypted and Authenticated (SK) payload
    ///
    /// `first_payload` is the generic payload header's own `next_payload`
    /// field, which RFC 7296 section 3.14 repurposes for SK to name the
    /// type of the first payload inside the (as yet undecrypted) body
    /// rather than a sibling in the outer chain, since SK is always last.
    EncryptedAndAuthenticated {
        #[allow(missing_docs)]
        first_payload: PayloadType,
        #[allow(missing_docs)]
        data: Vec<u8>,
    },
    Configuration(Vec<u8>),
    ExtensibleAuthentication(Vec<u8>),
    EncryptedAndAuthenticatedFragment(Fragment),
}

/// Body of a Security Association payload: an ordered list of proposals
///
/// The responder picks exactly one [Proposal] (or none, if it rejects the
/// whole negotiation) and echoes it back in its own Security Association
/// payload with that single proposal's transforms.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SecurityAssociation {
    /// Candidate proposals, numbered implicitly by their position plus one
    pub proposals: Vec<Proposal>,
}

/// A single proposal inside a [SecurityAssociation]
///
/// Transforms are grouped by type rather than kept in the order they were
/// added: RFC 7296's own proposal examples, and this crate's wire encoding,
/// lay transforms out in the fixed order encryption, PRF, integrity, key
/// exchange, sequence numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    /// Protocol this proposal negotiates; always [SecurityProtocol::InternetKeyExchange] here
    pub protocol: SecurityProtocol,
    /// SPI of the proposal; empty for the first IKE SA negotiation
    pub spi: Vec<u8>,
    /// Candidate encryption algorithms, each with an optional key length attribute
    pub encryption_algorithms: Vec<(EncryptionAlgorithm, Option<u16>)>,
    /// Candidate pseudorandom functions
    pub pseudo_random_functions: Vec<PseudorandomFunction>,
    /// Candidate integrity algorithms
    pub integrity_algorithms: Vec<IntegrityAlgorithm>,
    /// Candidate key exchange (Diffie-Hellman) groups
    pub key_exchange_methods: Vec<KeyExchangeMethod>,
    /// Candidate extended sequence number settings
    pub sequence_numbers: Vec<SequenceNumber>,
}

/// A single transform, tagged by its transform type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Transform {
    /// Encryption algorithm, with an optional key length attribute
    Encryption(EncryptionAlgorithm, Option<u16>),
    PseudoRandomFunction(PseudorandomFunction),
    Integrity(IntegrityAlgorithm),
    KeyExchange(KeyExchangeMethod),
    SequenceNumber(SequenceNumber),
}

/// A single Transform Attribute
///
/// RFC 7296 only defines the Key Length attribute, always carried in the
/// fixed-length TV form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    /// Key length in bits
    KeyLength(u16),
}

/// Body of a Key Exchange payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyExchange {
    /// Diffie-Hellman / key exchange group the data below was computed in
    pub dh_group: KeyExchangeMethod,
    /// Public key exchange data
    pub data: Vec<u8>,
}

/// Whether a [Notification]'s message type signals an error or a status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum NotificationType {
    Error(NotifyErrorMessage),
    Status(NotifyStatusMessage),
}

/// Body of a Notify payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Error or status type carried by this notification
    pub variant: NotificationType,
    /// Protocol the notification concerns; [SecurityProtocol::Reserved] if `spi` is `None`
    pub protocol: SecurityProtocol,
    /// SPI of the SA this notification concerns, if any
    pub spi: Option<Vec<u8>>,
    /// Message-type specific notification data
    pub data: Vec<u8>,
}

/// Body of a Delete payload: a request (or acknowledgement) to remove SAs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delete {
    /// Protocol of the SA(s) to delete
    pub protocol: SecurityProtocol,
    /// SPIs of the SA(s) to delete, each `spi_size` octets long; empty when deleting the IKE SA
    pub spis: Vec<Vec<u8>>,
}

/// Body of an Encrypted and Authenticated Fragment payload (RFC 7383 SKF)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// One-based index of this fragment
    pub fragment_number: u16,
    /// Total number of fragments the original message was split into
    pub total_fragments: u16,
    /// Type of the first payload in the reassembled message
    ///
    /// Taken from the generic payload header's `next_payload` field, per
    /// RFC 7383 section 2.5. Only meaningful when `fragment_number == 1`;
    /// carried for every fragment for simplicity, ignored by the
    /// reassembler otherwise.
    pub first_payload: PayloadType,
    /// Encrypted fragment data, still opaque ciphertext at this layer
    pub data: Vec<u8>,
}
