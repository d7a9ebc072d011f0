//! IKEv2 parameters and their parsers as defined in the IANA IKEv2 list
//! found at https://www.iana.org/assignments/ikev2-parameters/ikev2-parameters.xhtml

use super::UnparseableParameter;

/// Type of the exchanged being used
///
/// This constrains the payloads sent in each message in an exchange.
/// Notably, values 0-33 are reserved, 45-239 are currently unassigned
/// and 240-255 reserved for private use. Also see [UnparseableParameter].
#[derive(Debug, Ord, PartialOrd, Eq, PartialEq, Copy, Clone)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum ExchangeType {
    // RFC 7296
    IkeSaInit = 34,
    // RFC 7296
    IkeAuth = 35,
    // RFC 7296
    CreateChildSa = 36,
    // RFC 7296
    Informational = 37,
    // RFC5723
    IkeSessionResume = 38,
    // draft-ietf-ipsecme-g-ikev2-22
    GsaAuth = 39,
    // draft-ietf-ipsecme-g-ikev2-22
    GsaRegistration = 40,
    // draft-ietf-ipsecme-g-ikev2-22
    GsaRekey = 41,
    // draft-ietf-ipsecme-g-ikev2-22
    GsaInbandRekey = 42,
    // RFC9242
    IkeIntermediate = 43,
    // RFC9370
    IkeFollowupKeyExchange = 44,
}

impl TryFrom<u8> for ExchangeType {
    type Error = UnparseableParameter;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0..=33 => Err(UnparseableParameter::Reserved),
            34 => Ok(ExchangeType::IkeSaInit),
            35 => Ok(ExchangeType::IkeAuth),
            36 => Ok(ExchangeType::CreateChildSa),
            37 => Ok(ExchangeType::Informational),
            38 => Ok(ExchangeType::IkeSessionResume),
            39 => Ok(ExchangeType::GsaAuth),
            40 => Ok(ExchangeType::GsaRegistration),
            41 => Ok(ExchangeType::GsaRekey),
            42 => Ok(ExchangeType::GsaInbandRekey),
            43 => Ok(ExchangeType::IkeIntermediate),
            44 => Ok(ExchangeType::IkeFollowupKeyExchange),
            45..=239 => Err(UnparseableParameter::Unassigned),
            240..=255 => Err(UnparseableParameter::PrivateUse),
        }
    }
}

/// Type of the payload being used
///
/// This constrains the payloads sent in each message in an exchange.
/// Refer to https://www.iana.org/assignments/ikev2-parameters/ikev2-parameters.xhtml
/// for details. Notably, values 1-33 are reserved, 55-127 are currently unassigned
/// and 128-255 reserved for private use. Also see [UnparseableParameter].
#[derive(Debug, Ord, PartialOrd, Eq, PartialEq, Copy, Clone)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum PayloadType {
    // RFC 7296, this also matches the IKEv1 value while all other values do not
    NoNextPayload = 0,
    // RFC 7296, includes GM supported transforms as per draft-ietf-ipsecme-g-ikev2-22
    SecurityAssociation = 33,
    // RFC 7296
    KeyExchange = 34,
    // RFC 7296
    IdentificationInitiaor = 35,
    // RFC 7296
    IdentificationResponder = 36,
    // RFC 7296
    Certificate = 37,
    // RFC 7296
    CertificateRequest = 38,
    // RFC 7296
    Authentication = 39,
    // RFC 7296
    Nonce = 40,
    // RFC 7296
    Notify = 41,
    // RFC 7296
    Delete = 42,
    // RFC 7296
    VendorID = 43,
    // RFC 7296
    TrafficSelectorInitiator = 44,
    // RFC 7296
    TrafficSelectorResponder = 45,
    // RFC 7296
    EncryptedAndAuthenticated = 46,
    // RFC 7296
    Configuration = 47,
    // RFC 7296
    ExtensibleAuthentication = 48,
    // RFC 6467
    GenericSecurePasswordMethod = 49,
    // draft-ietf-ipsecme-g-ikev2-22
    GroupIdentification = 50,
    // draft-ietf-ipsecme-g-ikev2-22
    GroupSecureAssociation = 51,
    // draft-ietf-ipsecme-g-ikev2-22
    KeyDownload = 52,
    // RFC 7383
    EncryptedAndAuthenticatedFragment = 53,
    // RFC 8019
    PuzzleSolution = 54,
}

impl TryFrom<u8> for PayloadType {
    type Error = UnparseableParameter;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PayloadType::NoNextPayload),
            1..=32 => Err(UnparseableParameter::Reserved),
            33 => Ok(PayloadType::SecurityAssociation),
            34 => Ok(PayloadType::KeyExchange),
            35 => Ok(PayloadType::IdentificationInitiaor),
            36 => Ok(PayloadType::IdentificationResponder),
            37 => Ok(PayloadType::Certificate),
            38 => Ok(PayloadType::CertificateRequest),
            39 => Ok(PayloadType::Authentication),
            40 => Ok(PayloadType::Nonce),
            41 => Ok(PayloadType::Notify),
            42 => Ok(PayloadType::Delete),
            43 => Ok(PayloadType::VendorID),
            44 => Ok(PayloadType::TrafficSelectorInitiator),
            45 => Ok(PayloadType::TrafficSelectorResponder),
            46 => Ok(PayloadType::EncryptedAndAuthenticated),
            47 => Ok(PayloadType::Configuration),
            48 => Ok(PayloadType::ExtensibleAuthentication),
            49 => Ok(PayloadType::GenericSecurePasswordMethod),
            50 => Ok(PayloadType::GroupIdentification),
            51 => Ok(PayloadType::GroupSecureAssociation),
            52 => Ok(PayloadType::KeyDownload),
            53 => Ok(PayloadType::EncryptedAndAuthenticatedFragment),
            54 => Ok(PayloadType::PuzzleSolution),
            55..=127 => Err(UnparseableParameter::Unassigned),
            128..=255 => Err(UnparseableParameter::PrivateUse),
        }
    }
}

/// Type of the transform being used
///
/// Value 0 is reserved, 15-240 is unassigned and 241-255 is
/// reserved for private use. Also see [UnparseableParameter].
///
/// The "Key Exchange Method (KE)" transform type was originally
/// named "Diffie-Hellman Group (D-H)" and was referenced by
/// that name in a number of RFCs published prior
/// to RFC 9370, which gave it the current title.
///
/// All "Additional Key Exchange (ADDKE)" entries use the same
/// "Transform Type 4 - Key Exchange Method Transform IDs"
/// registry as the "Key Exchange Method (KE)" entry.
///
/// "Sequence Numbers (SN)" transform type was originally named
/// "Extended Sequence Numbers (ESN)" and was referenced by
/// that name in a number of RFCs published before RFC 9370.
#[derive(Debug, Ord, PartialOrd, Eq, PartialEq, Copy, Clone)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum TransformType {
    EncryptionAlgorithm = 1,
    PseudoRandomFunction = 2,
    IntegrityAlgorithm = 3,
    KeyExchangeMethod = 4,
    SequenceNumber = 5,
    AdditionalKeyExchange1 = 6,
    AdditionalKeyExchange2 = 7,
    AdditionalKeyExchange3 = 8,
    AdditionalKeyExchange4 = 9,
    AdditionalKeyExchange5 = 10,
    AdditionalKeyExchange6 = 11,
    AdditionalKeyExchange7 = 12,
    KeyWrapAlgorithm = 13,
    GroupControllerAuthenticationMethod = 14,
}

impl TryFrom<u8> for TransformType {
    type Error = UnparseableParameter;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Err(UnparseableParameter::Reserved),
            1 => Ok(TransformType::EncryptionAlgorithm),
            2 => Ok(TransformType::PseudoRandomFunction),
            3 => Ok(TransformType::IntegrityAlgorithm),
            4 => Ok(TransformType::KeyExchangeMethod),
            5 => Ok(TransformType::SequenceNumber),
            6 => Ok(TransformType::AdditionalKeyExchange1),
            7 => Ok(TransformType::AdditionalKeyExchange2),
            8 => Ok(TransformType::AdditionalKeyExchange3),
            9 => Ok(TransformType::AdditionalKeyExchange4),
            10 => Ok(TransformType::AdditionalKeyExchange5),
            11 => Ok(TransformType::AdditionalKeyExchange6),
            12 => Ok(TransformType::AdditionalKeyExchange7),
            13 => Ok(TransformType::KeyWrapAlgorithm),
            14 => Ok(TransformType::GroupControllerAuthenticationMethod),
            15..=240 => Err(UnparseableParameter::Unassigned),
            241..=255 => Err(UnparseableParameter::PrivateUse),
        }
    }
}

// TODO: IKEv2 Transform Attribute Types
// TODO: Transform Type 1 - Encryption Algorithm Transform IDs
// TODO: Transform Type 2 - Pseudorandom Function Transform IDs
// TODO: Transform Type 3 - Integrity Algorithm Transform IDs
// TODO: Transform Type 4 - Key Exchange Method Transform IDs
// TODO: Transform Type 5 - Sequence Numbers Transform IDs
// TODO: Transform Type 13 - Key Wrap Algorithm Transform IDs
// TODO: Transform Type 14 - Group Controller Authentication Method Transform IDs

// TODO: IKEv2 Identification Payload ID Types

/// Indicator for the encoding of certificates and related data
///
/// Values 0 and 5 are reserved, 16-200 are unassigned and 201-255 are reserved for private use.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Copy)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum CertificateEncoding {
    PKCS7WrappedX509Certificate = 1,
    PGPCertificate = 2,
    DNSSignedKey = 3,
    X509CertificateSignature = 4,
    KerberosTokens = 6,
    CertificateRevocationList = 7,
    AuthorityRevocationList = 8,
    SPKICertificate = 9,
    X509CertificateAttribute = 10,
    RawRSAKey = 11, // deprecated
    HashUrlX509Certificate = 12,
    HashUrlX509Bundle = 13,
    OCSPContent = 14,
    RawPublicKey = 15,
}

impl TryFrom<u8> for CertificateEncoding {
    type Error = UnparseableParameter;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Err(UnparseableParameter::Reserved),
            1 => Ok(CertificateEncoding::PKCS7WrappedX509Certificate),
            2 => Ok(CertificateEncoding::PGPCertificate),
            3 => Ok(CertificateEncoding::DNSSignedKey),
            4 => Ok(CertificateEncoding::X509CertificateSignature),
            5 => Err(UnparseableParameter::Reserved),
            6 => Ok(CertificateEncoding::KerberosTokens),
            7 => Ok(CertificateEncoding::CertificateRevocationList),
            8 => Ok(CertificateEncoding::AuthorityRevocationList),
            9 => Ok(CertificateEncoding::SPKICertificate),
            10 => Ok(CertificateEncoding::X509CertificateAttribute),
            11 => Ok(CertificateEncoding::RawRSAKey),
            12 => Ok(CertificateEncoding::HashUrlX509Certificate),
            13 => Ok(CertificateEncoding::HashUrlX509Bundle),
            14 => Ok(CertificateEncoding::OCSPContent),
            15 => Ok(CertificateEncoding::RawPublicKey),
            16..=200 => Err(UnparseableParameter::Unassigned),
            201..=255 => Err(UnparseableParameter::PrivateUse),
        }
    }
}

/// Type of authentication method being used
///
/// Value 0 is reserved, values 4-8 and 15-200 are unassigned and
/// values 201-255 are reserved for private use.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Copy)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum AuthenticationMethod {
    RSADigitalSignature = 1,
    SharedKeyMessageIntegrityCode = 2,
    DSSDigitalSignature = 3,
    ECDSAWithSHA256 = 9,  // with P-256 curve
    ECDSAWithSHA384 = 10, // with P-384 curve
    ECDSAWithSHA512 = 11, // with P-521 curve
    GenericSecurePassword = 12,
    NULLAuthentication = 13,
    DigitalSignature = 14,
}

impl TryFrom<u8> for AuthenticationMethod {
    type Error = UnparseableParameter;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Err(UnparseableParameter::Reserved),
            1 => Ok(AuthenticationMethod::RSADigitalSignature),
            2 => Ok(AuthenticationMethod::SharedKeyMessageIntegrityCode),
            3 => Ok(AuthenticationMethod::DSSDigitalSignature),
            4..=8 => Err(UnparseableParameter::Unassigned),
            9 => Ok(AuthenticationMethod::ECDSAWithSHA256),
            10 => Ok(AuthenticationMethod::ECDSAWithSHA384),
            11 => Ok(AuthenticationMethod::ECDSAWithSHA512),
            12 => Ok(AuthenticationMethod::GenericSecurePassword),
            13 => Ok(AuthenticationMethod::NULLAuthentication),
            14 => Ok(AuthenticationMethod::DigitalSignature),
            15..=200 => Err(UnparseableParameter::Unassigned),
            201..=255 => Err(UnparseableParameter::PrivateUse),
        }
    }
}

/// Error notification types as per RFC 7296 section 3.10.1
///
/// Values below 16384 signal an error. An implementation receiving a
/// Notify payload with one of these types that it does not recognize
/// in a response MUST assume the corresponding request has failed.
#[derive(Debug, Ord, PartialOrd, Eq, PartialEq, Copy, Clone)]
#[repr(u16)]
#[allow(missing_docs)]
pub enum NotifyErrorMessage {
    UnsupportedCriticalPayload = 1,
    InvalidIkeSpi = 4,
    InvalidMajorVersion = 5,
    InvalidSyntax = 7,
    InvalidMessageId = 9,
    InvalidSpi = 11,
    NoProposalChosen = 14,
    InvalidKeyExchangePayload = 17,
    AuthenticationFailed = 24,
    SinglePairRequired = 34,
    NoAdditionalSas = 35,
    InternalAddressFailure = 36,
    FailedCpRequired = 37,
    TsUnacceptable = 38,
    InvalidSelectors = 39,
    UnacceptableAddresses = 40,
    UnexpectedNatDetected = 41,
    UseAssignedHoA = 42,
    TemporaryFailure = 43,
    ChildSaNotFound = 44,
    InvalidGroupId = 45,
    AuthorizationFailed = 46,
    StateNotFound = 47,
    TsMaxQueue = 48,
    RegistrationFailed = 49,
}

impl TryFrom<u16> for NotifyErrorMessage {
    type Error = UnparseableParameter;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Err(UnparseableParameter::Reserved),
            1 => Ok(NotifyErrorMessage::UnsupportedCriticalPayload),
            2..=3 => Err(UnparseableParameter::Reserved),
            4 => Ok(NotifyErrorMessage::InvalidIkeSpi),
            5 => Ok(NotifyErrorMessage::InvalidMajorVersion),
            6 => Err(UnparseableParameter::Reserved),
            7 => Ok(NotifyErrorMessage::InvalidSyntax),
            8 => Err(UnparseableParameter::Reserved),
            9 => Ok(NotifyErrorMessage::InvalidMessageId),
            10 => Err(UnparseableParameter::Reserved),
            11 => Ok(NotifyErrorMessage::InvalidSpi),
            12..=13 => Err(UnparseableParameter::Reserved),
            14 => Ok(NotifyErrorMessage::NoProposalChosen),
            15..=16 => Err(UnparseableParameter::Reserved),
            17 => Ok(NotifyErrorMessage::InvalidKeyExchangePayload),
            18..=23 => Err(UnparseableParameter::Reserved),
            24 => Ok(NotifyErrorMessage::AuthenticationFailed),
            25..=33 => Err(UnparseableParameter::Reserved),
            34 => Ok(NotifyErrorMessage::SinglePairRequired),
            35 => Ok(NotifyErrorMessage::NoAdditionalSas),
            36 => Ok(NotifyErrorMessage::InternalAddressFailure),
            37 => Ok(NotifyErrorMessage::FailedCpRequired),
            38 => Ok(NotifyErrorMessage::TsUnacceptable),
            39 => Ok(NotifyErrorMessage::InvalidSelectors),
            40 => Ok(NotifyErrorMessage::UnacceptableAddresses),
            41 => Ok(NotifyErrorMessage::UnexpectedNatDetected),
            42 => Ok(NotifyErrorMessage::UseAssignedHoA),
            43 => Ok(NotifyErrorMessage::TemporaryFailure),
            44 => Ok(NotifyErrorMessage::ChildSaNotFound),
            45 => Ok(NotifyErrorMessage::InvalidGroupId),
            46 => Ok(NotifyErrorMessage::AuthorizationFailed),
            47 => Ok(NotifyErrorMessage::StateNotFound),
            48 => Ok(NotifyErrorMessage::TsMaxQueue),
            49 => Ok(NotifyErrorMessage::RegistrationFailed),
            50..=8191 => Err(UnparseableParameter::Unassigned),
            8192..=16383 => Err(UnparseableParameter::PrivateUse),
            16384..=65535 => Err(UnparseableParameter::OutOfRange),
        }
    }
}

/// Status/capability notification types as per RFC 7296 section 3.10.1
///
/// Values are 16384 and above; unlike error types, an unrecognized status
/// type MUST be ignored rather than treated as a failure.
#[derive(Debug, Ord, PartialOrd, Eq, PartialEq, Copy, Clone)]
#[repr(u16)]
#[allow(missing_docs)]
pub enum NotifyStatusMessage {
    InitialContact = 16384,
    SetWindowSize = 16385,
    AdditionalTsPossible = 16386,
    IpcompSupported = 16387,
    NatDetectionSourceIp = 16388,
    NatDetectionDestinationIp = 16389,
    Cookie = 16390,
    UseTransportMode = 16391,
    HttpCertLookupSupported = 16392,
    RekeySa = 16393,
    EspTfcPaddingNotSupported = 16394,
    NonFirstFragmentsAlso = 16395,
    MobikeSupported = 16396,
    Ikev2FragmentationSupported = 16430,
    SignatureHashAlgorithms = 16431,
}

impl TryFrom<u16> for NotifyStatusMessage {
    type Error = UnparseableParameter;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0..=16383 => Err(UnparseableParameter::OutOfRange),
            16384 => Ok(NotifyStatusMessage::InitialContact),
            16385 => Ok(NotifyStatusMessage::SetWindowSize),
            16386 => Ok(NotifyStatusMessage::AdditionalTsPossible),
            16387 => Ok(NotifyStatusMessage::IpcompSupported),
            16388 => Ok(NotifyStatusMessage::NatDetectionSourceIp),
            16389 => Ok(NotifyStatusMessage::NatDetectionDestinationIp),
            16390 => Ok(NotifyStatusMessage::Cookie),
            16391 => Ok(NotifyStatusMessage::UseTransportMode),
            16392 => Ok(NotifyStatusMessage::HttpCertLookupSupported),
            16393 => Ok(NotifyStatusMessage::RekeySa),
            16394 => Ok(NotifyStatusMessage::EspTfcPaddingNotSupported),
            16395 => Ok(NotifyStatusMessage::NonFirstFragmentsAlso),
            16396 => Ok(NotifyStatusMessage::MobikeSupported),
            16430 => Ok(NotifyStatusMessage::Ikev2FragmentationSupported),
            16431 => Ok(NotifyStatusMessage::SignatureHashAlgorithms),
            _ => Err(UnparseableParameter::Unassigned),
        }
    }
}

/// Identifier for the protocol an SA, Notify or Delete payload concerns
///
/// Value 0 is reserved and only legal when no SPI is present (i.e. the
/// payload concerns the IKE SA itself, which has no separate SPI field).
#[derive(Debug, Ord, PartialOrd, Eq, PartialEq, Copy, Clone)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum SecurityProtocol {
    Reserved = 0,
    InternetKeyExchange = 1,
    AuthenticationHeader = 2,
    EncapsulatingSecurityPayload = 3,
}

impl TryFrom<u8> for SecurityProtocol {
    type Error = UnparseableParameter;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SecurityProtocol::Reserved),
            1 => Ok(SecurityProtocol::InternetKeyExchange),
            2 => Ok(SecurityProtocol::AuthenticationHeader),
            3 => Ok(SecurityProtocol::EncapsulatingSecurityPayload),
            4..=255 => Err(UnparseableParameter::Unassigned),
        }
    }
}

/// Top bit of a Transform Attribute's type field: set when the attribute
/// uses the fixed-length TV encoding rather than the variable-length TLV one
pub const FLAG_ATTRIBUTE_FORMAT: u16 = 0x8000;

/// Identifier for the kind of value carried by a Transform Attribute
///
/// RFC 7296 only defines one attribute type; all others are reserved.
#[derive(Debug, Ord, PartialOrd, Eq, PartialEq, Copy, Clone)]
#[repr(u16)]
#[allow(missing_docs)]
pub enum AttributeType {
    KeyLength = 14,
}

impl TryFrom<u16> for AttributeType {
    type Error = UnparseableParameter;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            14 => Ok(AttributeType::KeyLength),
            _ => Err(UnparseableParameter::Unassigned),
        }
    }
}

/// Transform Type 1: Encryption Algorithm Transform IDs
#[derive(Debug, Ord, PartialOrd, Eq, PartialEq, Copy, Clone)]
#[repr(u16)]
#[allow(missing_docs)]
pub enum EncryptionAlgorithm {
    Des = 2,
    TripleDes = 3,
    Rc5 = 4,
    Idea = 5,
    Cast = 6,
    Blowfish = 7,
    TripleIdea = 8,
    Null = 11,
    AesCbc = 12,
    AesCtr = 13,
    AesCcm8 = 14,
    AesCcm12 = 15,
    AesCcm16 = 16,
    AesGcm8 = 18,
    AesGcm12 = 19,
    AesGcm16 = 20,
    NullAuthAesGmac = 21,
    CamelliaCbc = 23,
    CamelliaCtr = 24,
    CamelliaCcm8 = 25,
    CamelliaCcm12 = 26,
    CamelliaCcm16 = 27,
    ChaCha20Poly1305 = 28,
}

impl TryFrom<u16> for EncryptionAlgorithm {
    type Error = UnparseableParameter;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(EncryptionAlgorithm::Des),
            3 => Ok(EncryptionAlgorithm::TripleDes),
            4 => Ok(EncryptionAlgorithm::Rc5),
            5 => Ok(EncryptionAlgorithm::Idea),
            6 => Ok(EncryptionAlgorithm::Cast),
            7 => Ok(EncryptionAlgorithm::Blowfish),
            8 => Ok(EncryptionAlgorithm::TripleIdea),
            11 => Ok(EncryptionAlgorithm::Null),
            12 => Ok(EncryptionAlgorithm::AesCbc),
            13 => Ok(EncryptionAlgorithm::AesCtr),
            14 => Ok(EncryptionAlgorithm::AesCcm8),
            15 => Ok(EncryptionAlgorithm::AesCcm12),
            16 => Ok(EncryptionAlgorithm::AesCcm16),
            18 => Ok(EncryptionAlgorithm::AesGcm8),
            19 => Ok(EncryptionAlgorithm::AesGcm12),
            20 => Ok(EncryptionAlgorithm::AesGcm16),
            21 => Ok(EncryptionAlgorithm::NullAuthAesGmac),
            23 => Ok(EncryptionAlgorithm::CamelliaCbc),
            24 => Ok(EncryptionAlgorithm::CamelliaCtr),
            25 => Ok(EncryptionAlgorithm::CamelliaCcm8),
            26 => Ok(EncryptionAlgorithm::CamelliaCcm12),
            27 => Ok(EncryptionAlgorithm::CamelliaCcm16),
            28 => Ok(EncryptionAlgorithm::ChaCha20Poly1305),
            _ => Err(UnparseableParameter::Unassigned),
        }
    }
}

/// Transform Type 2: Pseudorandom Function Transform IDs
#[derive(Debug, Ord, PartialOrd, Eq, PartialEq, Copy, Clone)]
#[repr(u16)]
#[allow(missing_docs)]
pub enum PseudorandomFunction {
    HmacMd5 = 1,
    HmacSha1 = 2,
    HmacTiger = 3,
    Aes128Xcbc = 4,
    HmacSha2_256 = 5,
    HmacSha2_384 = 6,
    HmacSha2_512 = 7,
    Aes128Cmac = 8,
}

impl TryFrom<u16> for PseudorandomFunction {
    type Error = UnparseableParameter;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(PseudorandomFunction::HmacMd5),
            2 => Ok(PseudorandomFunction::HmacSha1),
            3 => Ok(PseudorandomFunction::HmacTiger),
            4 => Ok(PseudorandomFunction::Aes128Xcbc),
            5 => Ok(PseudorandomFunction::HmacSha2_256),
            6 => Ok(PseudorandomFunction::HmacSha2_384),
            7 => Ok(PseudorandomFunction::HmacSha2_512),
            8 => Ok(PseudorandomFunction::Aes128Cmac),
            _ => Err(UnparseableParameter::Unassigned),
        }
    }
}

/// Transform Type 3: Integrity Algorithm Transform IDs
#[derive(Debug, Ord, PartialOrd, Eq, PartialEq, Copy, Clone)]
#[repr(u16)]
#[allow(missing_docs)]
pub enum IntegrityAlgorithm {
    HmacMd5_96 = 1,
    HmacSha1_96 = 2,
    DesMac = 3,
    KpdkMd5 = 4,
    AesXcbc96 = 5,
    HmacMd5_128 = 6,
    HmacSha1_160 = 7,
    AesCmac96 = 8,
    Aes128Gmac = 9,
    Aes192Gmac = 10,
    Aes256Gmac = 11,
    HmacSha2_256_128 = 12,
    HmacSha2_384_192 = 13,
    HmacSha2_512_256 = 14,
}

impl TryFrom<u16> for IntegrityAlgorithm {
    type Error = UnparseableParameter;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(IntegrityAlgorithm::HmacMd5_96),
            2 => Ok(IntegrityAlgorithm::HmacSha1_96),
            3 => Ok(IntegrityAlgorithm::DesMac),
            4 => Ok(IntegrityAlgorithm::KpdkMd5),
            5 => Ok(IntegrityAlgorithm::AesXcbc96),
            6 => Ok(IntegrityAlgorithm::HmacMd5_128),
            7 => Ok(IntegrityAlgorithm::HmacSha1_160),
            8 => Ok(IntegrityAlgorithm::AesCmac96),
            9 => Ok(IntegrityAlgorithm::Aes128Gmac),
            10 => Ok(IntegrityAlgorithm::Aes192Gmac),
            11 => Ok(IntegrityAlgorithm::Aes256Gmac),
            12 => Ok(IntegrityAlgorithm::HmacSha2_256_128),
            13 => Ok(IntegrityAlgorithm::HmacSha2_384_192),
            14 => Ok(IntegrityAlgorithm::HmacSha2_512_256),
            _ => Err(UnparseableParameter::Unassigned),
        }
    }
}

/// Transform Type 4: Key Exchange Method Transform IDs
///
/// Named "Diffie-Hellman Group (D-H)" prior to RFC 9370.
#[derive(Debug, Ord, PartialOrd, Eq, PartialEq, Copy, Clone)]
#[repr(u16)]
#[allow(missing_docs)]
pub enum KeyExchangeMethod {
    Modp768 = 1,
    Modp1024 = 2,
    Modp1536 = 5,
    Modp2048 = 14,
    Modp3072 = 15,
    Modp4096 = 16,
    ModP6144 = 17,
    Modp8192 = 18,
    Ecp256 = 19,
    Ecp384 = 20,
    Ecp521 = 21,
    Modp1024S160 = 22,
    Modp2048S224 = 23,
    Modp2048S256 = 24,
    Ecp192 = 25,
    Ecp224 = 26,
    BrainpoolP224r1 = 27,
    BrainpoolP256r1 = 28,
    BrainpoolP384r1 = 29,
    BrainpoolP512r1 = 30,
    Curve25519 = 31,
    Curve448 = 32,
}

impl TryFrom<u16> for KeyExchangeMethod {
    type Error = UnparseableParameter;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(KeyExchangeMethod::Modp768),
            2 => Ok(KeyExchangeMethod::Modp1024),
            5 => Ok(KeyExchangeMethod::Modp1536),
            14 => Ok(KeyExchangeMethod::Modp2048),
            15 => Ok(KeyExchangeMethod::Modp3072),
            16 => Ok(KeyExchangeMethod::Modp4096),
            17 => Ok(KeyExchangeMethod::ModP6144),
            18 => Ok(KeyExchangeMethod::Modp8192),
            19 => Ok(KeyExchangeMethod::Ecp256),
            20 => Ok(KeyExchangeMethod::Ecp384),
            21 => Ok(KeyExchangeMethod::Ecp521),
            22 => Ok(KeyExchangeMethod::Modp1024S160),
            23 => Ok(KeyExchangeMethod::Modp2048S224),
            24 => Ok(KeyExchangeMethod::Modp2048S256),
            25 => Ok(KeyExchangeMethod::Ecp192),
            26 => Ok(KeyExchangeMethod::Ecp224),
            27 => Ok(KeyExchangeMethod::BrainpoolP224r1),
            28 => Ok(KeyExchangeMethod::BrainpoolP256r1),
            29 => Ok(KeyExchangeMethod::BrainpoolP384r1),
            30 => Ok(KeyExchangeMethod::BrainpoolP512r1),
            31 => Ok(KeyExchangeMethod::Curve25519),
            32 => Ok(KeyExchangeMethod::Curve448),
            _ => Err(UnparseableParameter::Unassigned),
        }
    }
}

/// Transform Type 5: Sequence Numbers Transform IDs
///
/// Named "Extended Sequence Numbers (ESN)" prior to RFC 9370.
#[derive(Debug, Ord, PartialOrd, Eq, PartialEq, Copy, Clone)]
#[repr(u16)]
#[allow(missing_docs)]
pub enum SequenceNumber {
    NoEsn = 0,
    Esn = 1,
}

impl TryFrom<u16> for SequenceNumber {
    type Error = UnparseableParameter;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SequenceNumber::NoEsn),
            1 => Ok(SequenceNumber::Esn),
            _ => Err(UnparseableParameter::Unassigned),
        }
    }
}

// TODO: IKEv2 Traffic Selector Types

// TODO: IKEv2 Configuration Payload CFG Types

// TODO: IKEv2 Configuration Payload Attribute Types
