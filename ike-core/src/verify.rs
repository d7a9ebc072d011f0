//! Payload Verifier: match a decoded [PayloadSummary] against an expected signature

use crate::digest::{MessageDigest, PayloadSummary, PayloadTypeSet};
use isakmp::v2::definitions::params::{NotifyErrorMessage, PayloadType};

/// Payload types allowed to appear more than once in a chain
pub fn repeatable_payloads() -> PayloadTypeSet {
    PayloadTypeSet::of(&[
        PayloadType::Notify,
        PayloadType::Delete,
        PayloadType::Configuration,
        PayloadType::VendorID,
        PayloadType::Certificate,
        PayloadType::CertificateRequest,
    ])
}

/// Payload types tolerated in any message regardless of what a transition row expects
pub fn everywhere_payloads() -> PayloadTypeSet {
    PayloadTypeSet::of(&[PayloadType::Notify, PayloadType::VendorID])
}

/// The payload-set shape a [crate::transition::TransitionRow] expects from one chain
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpectedPayloads {
    /// Payload types that must be present
    pub required: PayloadTypeSet,
    /// Payload types that may be present
    pub optional: PayloadTypeSet,
    /// A specific Notify error code that must be present among the Notify chain, if any
    pub notification: Option<NotifyErrorMessage>,
}

impl ExpectedPayloads {
    /// An expectation with no required or optional payloads and no notification requirement
    pub const fn none() -> Self {
        Self {
            required: PayloadTypeSet::empty(),
            optional: PayloadTypeSet::empty(),
            notification: None,
        }
    }
}

/// Result of matching a [PayloadSummary] against an [ExpectedPayloads]
#[derive(Debug, Clone, Copy, Default)]
pub struct PayloadErrors {
    /// Required payload types that were not present
    pub missing: PayloadTypeSet,
    /// Payload types present that were neither required, optional, nor everywhere-allowed
    pub unexpected: PayloadTypeSet,
    /// Payload types repeated beyond what [repeatable_payloads] allows
    pub excessive: PayloadTypeSet,
    /// Whether a required specific notification code was absent
    pub missing_notification: bool,
}

impl PayloadErrors {
    /// Whether any of the four error categories is non-empty
    pub fn is_bad(&self) -> bool {
        !self.missing.is_empty()
            || !self.unexpected.is_empty()
            || !self.excessive.is_empty()
            || self.missing_notification
    }
}

/// Check whether `summary` satisfies `expected`, given the full message
/// digest (needed to scan the Notify chain for a specific required code)
pub fn verify(summary: &PayloadSummary, expected: &ExpectedPayloads, digest: &MessageDigest) -> PayloadErrors {
    // SKF aliases SK: a reassembling chain is treated as if the aggregate SK
    // payload were present, since the transition table never names SKF itself.
    let mut seen = summary.seen;
    if seen.contains(PayloadType::EncryptedAndAuthenticatedFragment)
        && !seen.contains(PayloadType::EncryptedAndAuthenticated)
    {
        seen.insert(PayloadType::EncryptedAndAuthenticated);
    }

    let missing = expected.required.difference(&seen);
    let allowed = expected.required.union(&expected.optional).union(&everywhere_payloads());
    let unexpected = seen.difference(&allowed);
    let excessive = summary.repeated.difference(&repeatable_payloads());

    let missing_notification = match expected.notification {
        None => false,
        Some(code) => !digest.has_error_notify(code),
    };

    PayloadErrors {
        missing,
        unexpected,
        excessive,
        missing_notification,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use isakmp::v2::definitions::params::ExchangeType;
    use std::net::SocketAddr;

    fn empty_digest() -> MessageDigest {
        MessageDigest {
            initiator_spi: 0,
            responder_spi: 0,
            exchange_type: ExchangeType::IkeSaInit,
            initiator_flag: true,
            response_flag: false,
            message_id: 0,
            peer: "127.0.0.1:500".parse::<SocketAddr>().unwrap(),
            payloads: vec![],
            message_payloads: PayloadSummary::empty(),
            encrypted: None,
            encrypted_payloads: None,
        }
    }

    #[test]
    fn missing_required_is_reported() {
        let mut summary = PayloadSummary::empty();
        summary.seen.insert(PayloadType::Nonce);
        let expected = ExpectedPayloads {
            required: PayloadTypeSet::of(&[PayloadType::SecurityAssociation, PayloadType::Nonce]),
            optional: PayloadTypeSet::empty(),
            notification: None,
        };
        let errors = verify(&summary, &expected, &empty_digest());
        assert!(errors.missing.contains(PayloadType::SecurityAssociation));
        assert!(errors.is_bad());
    }

    #[test]
    fn skf_aliases_sk_for_matching() {
        let mut summary = PayloadSummary::empty();
        summary.seen.insert(PayloadType::EncryptedAndAuthenticatedFragment);
        let expected = ExpectedPayloads {
            required: PayloadTypeSet::of(&[PayloadType::EncryptedAndAuthenticated]),
            optional: PayloadTypeSet::empty(),
            notification: None,
        };
        let errors = verify(&summary, &expected, &empty_digest());
        assert!(!errors.is_bad());
    }

    #[test]
    fn everywhere_payloads_are_never_unexpected() {
        let mut summary = PayloadSummary::empty();
        summary.seen.insert(PayloadType::VendorID);
        let errors = verify(&summary, &ExpectedPayloads::none(), &empty_digest());
        assert!(!errors.is_bad());
    }

    #[test]
    fn repeated_non_repeatable_payload_is_excessive() {
        let mut summary = PayloadSummary::empty();
        summary.seen.insert(PayloadType::Nonce);
        summary.repeated.insert(PayloadType::Nonce);
        let expected = ExpectedPayloads {
            required: PayloadTypeSet::of(&[PayloadType::Nonce]),
            optional: PayloadTypeSet::empty(),
            notification: None,
        };
        let errors = verify(&summary, &expected, &empty_digest());
        assert!(errors.excessive.contains(PayloadType::Nonce));
    }
}
