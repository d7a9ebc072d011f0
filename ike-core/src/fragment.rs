//! Fragment Reassembler: collect RFC 7383 SKF payloads into a plaintext SK body
//!
//! One [FragmentCollector] lives per IKE SA (mirrors how `ikebuster::lib::scan`
//! keeps one `open: HashMap<u64, Vec<Transform>>` slot per in-flight
//! correlation id, generalized here to a single reassembly buffer per SA
//! rather than a table, since fragments only ever belong to one SA).

use isakmp::v2::definitions::params::PayloadType;
use isakmp::v2::definitions::Fragment;
use thiserror::Error;

/// Upper bound on the number of fragments a single message may be split into
pub const MAX_IKE_FRAGMENTS: u16 = 32;

/// Rejection reasons for an incoming SKF fragment
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FragmentError {
    /// The peer sent a fragment without having advertised, or without policy allowing, fragmentation
    #[error("fragmentation is not permitted for this SA")]
    NotAllowed,
    /// `number == 0`, `number > total`, or `total > MAX_IKE_FRAGMENTS`
    #[error("fragment number {number} of {total} is out of range")]
    InvalidNumber {
        /// The fragment number that was rejected
        number: u16,
        /// The total fragment count it was rejected against
        total: u16,
    },
    /// `(number == 1) XOR (first_payload != NoNextPayload)` was violated
    #[error("first-fragment / first-payload consistency check failed")]
    FirstPayloadInconsistent,
}

/// Result of feeding one fragment to a [FragmentCollector]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentOutcome {
    /// The reassembly is not yet complete; nothing further to do right now
    Pending,
    /// All fragments have arrived; here is the concatenated plaintext and
    /// the first payload type fragment 1 declared
    Complete {
        /// Type of the first payload inside `plaintext`
        first_payload: PayloadType,
        /// Concatenated ciphertext/plaintext body, ready for AEAD decryption
        plaintext: Vec<u8>,
    },
}

#[derive(Debug, Clone)]
struct Reassembly {
    total: u16,
    first_payload: PayloadType,
    slots: Vec<Option<Vec<u8>>>,
    received: u16,
}

impl Reassembly {
    fn new(total: u16) -> Self {
        Self {
            total,
            first_payload: PayloadType::NoNextPayload,
            slots: vec![None; total as usize],
            received: 0,
        }
    }
}

/// Per-SA fragment reassembly buffer
#[derive(Debug, Default, Clone)]
pub struct FragmentCollector {
    state: Option<Reassembly>,
}

impl FragmentCollector {
    /// A collector with no reassembly in progress
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a reassembly is currently in progress
    pub fn in_progress(&self) -> bool {
        self.state.is_some()
    }

    /// Drop any partial reassembly in progress, e.g. when its SA is torn down
    pub fn reset(&mut self) {
        self.state = None;
    }

    /// Feed one SKF fragment into the collector
    pub fn accept(
        &mut self,
        fragment: &Fragment,
        fragmentation_allowed: bool,
    ) -> Result<FragmentOutcome, FragmentError> {
        if !fragmentation_allowed {
            return Err(FragmentError::NotAllowed);
        }

        let number = fragment.fragment_number;
        let total = fragment.total_fragments;
        if number == 0 || number > total || total > MAX_IKE_FRAGMENTS {
            return Err(FragmentError::InvalidNumber { number, total });
        }

        let is_first = number == 1;
        let declares_first_payload = fragment.first_payload != PayloadType::NoNextPayload;
        if is_first != declares_first_payload {
            return Err(FragmentError::FirstPayloadInconsistent);
        }

        if let Some(existing) = &self.state {
            if total > existing.total {
                // Peer restarted with a smaller MTU; the old, larger-total
                // reassembly is stale.
                self.state = Some(Reassembly::new(total));
            } else if total < existing.total {
                return Ok(FragmentOutcome::Pending);
            }
        } else {
            self.state = Some(Reassembly::new(total));
        }

        let reassembly = self.state.as_mut().expect("populated above");
        let slot = (number - 1) as usize;
        if reassembly.slots[slot].is_some() {
            return Ok(FragmentOutcome::Pending);
        }
        reassembly.slots[slot] = Some(fragment.data.clone());
        reassembly.received += 1;
        if is_first {
            reassembly.first_payload = fragment.first_payload;
        }

        if reassembly.received < reassembly.total {
            return Ok(FragmentOutcome::Pending);
        }

        let first_payload = reassembly.first_payload;
        let mut plaintext = Vec::new();
        for slot in &reassembly.slots {
            plaintext.extend_from_slice(slot.as_deref().expect("all slots filled by count check"));
        }
        self.state = None;
        Ok(FragmentOutcome::Complete {
            first_payload,
            plaintext,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frag(number: u16, total: u16, first_payload: PayloadType, data: &[u8]) -> Fragment {
        Fragment {
            fragment_number: number,
            total_fragments: total,
            first_payload,
            data: data.to_vec(),
        }
    }

    #[test]
    fn out_of_order_arrival_reassembles_correctly() {
        let mut c = FragmentCollector::new();
        assert_eq!(
            c.accept(&frag(2, 3, PayloadType::NoNextPayload, b"BB"), true),
            Ok(FragmentOutcome::Pending)
        );
        assert_eq!(
            c.accept(&frag(3, 3, PayloadType::NoNextPayload, b"CC"), true),
            Ok(FragmentOutcome::Pending)
        );
        let outcome = c
            .accept(&frag(1, 3, PayloadType::SecurityAssociation, b"AA"), true)
            .unwrap();
        assert_eq!(
            outcome,
            FragmentOutcome::Complete {
                first_payload: PayloadType::SecurityAssociation,
                plaintext: b"AABBCC".to_vec(),
            }
        );
    }

    #[test]
    fn larger_total_supersedes_smaller() {
        let mut c = FragmentCollector::new();
        c.accept(&frag(1, 3, PayloadType::SecurityAssociation, b"A"), true)
            .unwrap();
        // Peer restarts with a 5-fragment split; the 3-fragment attempt is stale.
        for n in 1..=5u16 {
            let outcome = c
                .accept(&frag(n, 5, PayloadType::KeyExchange, b"X"), true)
                .unwrap();
            if n < 5 {
                assert_eq!(outcome, FragmentOutcome::Pending);
            } else {
                assert_eq!(
                    outcome,
                    FragmentOutcome::Complete {
                        first_payload: PayloadType::KeyExchange,
                        plaintext: b"XXXXX".to_vec(),
                    }
                );
            }
        }
    }

    #[test]
    fn smaller_total_is_dropped_keeping_stored() {
        let mut c = FragmentCollector::new();
        c.accept(&frag(1, 5, PayloadType::SecurityAssociation, b"A"), true)
            .unwrap();
        let outcome = c
            .accept(&frag(1, 3, PayloadType::SecurityAssociation, b"Z"), true)
            .unwrap();
        assert_eq!(outcome, FragmentOutcome::Pending);
        assert!(c.in_progress());
    }

    #[test]
    fn duplicate_fragment_is_dropped() {
        let mut c = FragmentCollector::new();
        c.accept(&frag(1, 2, PayloadType::SecurityAssociation, b"A"), true)
            .unwrap();
        let outcome = c
            .accept(&frag(1, 2, PayloadType::SecurityAssociation, b"DUP"), true)
            .unwrap();
        assert_eq!(outcome, FragmentOutcome::Pending);
    }

    #[test]
    fn zero_number_is_rejected() {
        let mut c = FragmentCollector::new();
        assert!(matches!(
            c.accept(&frag(0, 3, PayloadType::NoNextPayload, b""), true),
            Err(FragmentError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn non_first_fragment_with_first_payload_set_is_rejected() {
        let mut c = FragmentCollector::new();
        assert!(matches!(
            c.accept(&frag(2, 3, PayloadType::SecurityAssociation, b""), true),
            Err(FragmentError::FirstPayloadInconsistent)
        ));
    }

    #[test]
    fn fragmentation_disallowed_is_rejected() {
        let mut c = FragmentCollector::new();
        assert!(matches!(
            c.accept(&frag(1, 2, PayloadType::SecurityAssociation, b""), false),
            Err(FragmentError::NotAllowed)
        ));
    }
}
