//! Bitset-based bookkeeping for payload types seen in one message
//!
//! The payload type numbers this crate cares about (RFC 7296 + RFC 7383)
//! all fit under 64, so a `u64` bitset tracks "seen" / "repeated" payload
//! types without allocating, mirroring how `isakmp`'s own parameter enums
//! are small closed sets rather than open-ended collections.

use isakmp::v2::definitions::params::PayloadType;
use isakmp::v2::definitions::{NotificationType, Payload};
use std::net::SocketAddr;

/// A set of [PayloadType] values, represented as a bitmask
///
/// Only payload types with a numeric value `< 64` can be stored; the
/// decoder rejects messages carrying a type outside that range before a
/// [PayloadTypeSet] is ever constructed from them (spec: "reject types
/// outside the supported range at the decoder boundary").
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PayloadTypeSet(u64);

impl PayloadTypeSet {
    /// The empty set
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Build a set out of a fixed list of payload types
    pub fn of(types: &[PayloadType]) -> Self {
        let mut set = Self::empty();
        for ty in types {
            set.insert(*ty);
        }
        set
    }

    /// Insert a payload type, returning whether it was already present
    pub fn insert(&mut self, ty: PayloadType) -> bool {
        let bit = 1u64 << (ty as u8);
        let already = self.0 & bit != 0;
        self.0 |= bit;
        already
    }

    /// Whether `ty` is a member of this set
    pub fn contains(&self, ty: PayloadType) -> bool {
        self.0 & (1u64 << (ty as u8)) != 0
    }

    /// Whether the set has no members
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Set union
    pub fn union(&self, other: &Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Set difference (`self` minus `other`)
    pub fn difference(&self, other: &Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Set intersection
    pub fn intersection(&self, other: &Self) -> Self {
        Self(self.0 & other.0)
    }
}

/// Outcome of the critical/non-critical check for a message's Notify chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// No notification-worthy condition was observed while decoding
    NothingWrong,
    /// The decoder observed an unsupported critical payload of this numeric type
    UnsupportedCriticalPayload(u8),
}

/// Per-message classification result produced by the Payload Decoder
///
/// `seen` and `repeated` are bitsets over the payload types actually
/// present in the chain; `notification` carries the one condition the
/// decode pass itself can detect (an unsupported critical payload).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadSummary {
    /// Whether decoding reached the end of the chain without a fatal error
    pub parsed: bool,
    /// Every payload type that occurred at least once
    pub seen: PayloadTypeSet,
    /// Every payload type that occurred more than once
    pub repeated: PayloadTypeSet,
    /// The notification-worthy condition observed while decoding, if any
    pub notification: NotificationOutcome,
}

impl PayloadSummary {
    /// A summary for a chain that decoded cleanly with no payloads at all
    pub fn empty() -> Self {
        Self {
            parsed: true,
            seen: PayloadTypeSet::empty(),
            repeated: PayloadTypeSet::empty(),
            notification: NotificationOutcome::NothingWrong,
        }
    }
}

/// Everything known about one incoming message, from header through to the
/// (possibly still encrypted) payload chain
///
/// Built once per datagram by [crate::decode::decode] and threaded through
/// the rest of the dispatcher; the encrypted fields are filled in once the
/// SK/SKF payload has been reassembled and decrypted.
#[derive(Debug, Clone)]
pub struct MessageDigest {
    /// Initiator SPI from the IKE header
    pub initiator_spi: u64,
    /// Responder SPI from the IKE header
    pub responder_spi: u64,
    /// Exchange type from the IKE header
    pub exchange_type: isakmp::v2::definitions::params::ExchangeType,
    /// Whether the `I` (initiator) flag was set
    pub initiator_flag: bool,
    /// Whether the `R` (response) flag was set
    pub response_flag: bool,
    /// Message ID from the IKE header
    pub message_id: u32,
    /// Address the datagram arrived from (or is destined to, for outbound use)
    pub peer: SocketAddr,
    /// The outer (cleartext) payload chain
    pub payloads: Vec<Payload>,
    /// Classification of the outer chain
    pub message_payloads: PayloadSummary,
    /// The inner chain, once the SK/SKF payload has been decrypted and reassembled
    pub encrypted: Option<Vec<Payload>>,
    /// Classification of the inner chain, once available
    pub encrypted_payloads: Option<PayloadSummary>,
}

impl MessageDigest {
    /// First occurrence of `ty` in the outer chain, if any
    pub fn first_outer(&self, ty: PayloadType) -> Option<&Payload> {
        find_payload(&self.payloads, ty)
    }

    /// First occurrence of `ty` in the inner (decrypted) chain, if any
    pub fn first_inner(&self, ty: PayloadType) -> Option<&Payload> {
        self.encrypted.as_deref().and_then(|c| find_payload(c, ty))
    }

    /// Every Notify payload in the inner chain carrying the given error code
    pub fn has_error_notify(&self, code: isakmp::v2::definitions::params::NotifyErrorMessage) -> bool {
        let chains = [self.payloads.as_slice(), self.encrypted.as_deref().unwrap_or(&[])];
        chains.into_iter().flatten().any(|p| {
            matches!(
                p,
                Payload::Notify(n) if n.variant == NotificationType::Error(code)
            )
        })
    }
}

fn find_payload(chain: &[Payload], ty: PayloadType) -> Option<&Payload> {
    chain.iter().find(|p| PayloadType::from(*p) == ty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_insert_reports_repeat() {
        let mut set = PayloadTypeSet::empty();
        assert!(!set.insert(PayloadType::Notify));
        assert!(set.insert(PayloadType::Notify));
        assert!(set.contains(PayloadType::Notify));
    }

    #[test]
    fn set_algebra() {
        let a = PayloadTypeSet::of(&[PayloadType::Notify, PayloadType::VendorID]);
        let b = PayloadTypeSet::of(&[PayloadType::Notify]);
        assert_eq!(a.difference(&b), PayloadTypeSet::of(&[PayloadType::VendorID]));
        assert!(a.intersection(&b).contains(PayloadType::Notify));
        assert!(!a.intersection(&b).contains(PayloadType::VendorID));
    }
}
