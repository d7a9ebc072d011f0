//! Transition Row (microcode) and the Transition Selector
//!
//! Rows are kept as a flat, ordered list and scanned linearly, same shape as
//! the source the spec describes; rows for the same `from_state` are tried
//! in declaration order so a more specific row (e.g. one requiring a
//! particular notification) can win over a more generic one (spec §9).

use crate::digest::{MessageDigest, PayloadSummary};
use crate::handler::Handler;
use crate::sa::FiniteState;
use crate::verify::{verify, ExpectedPayloads};
use isakmp::v2::definitions::params::ExchangeType;
use std::sync::Arc;

/// A constraint on one of the IKE header's single-bit flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagConstraint {
    /// The flag must be set
    Set,
    /// The flag must be clear
    Clear,
    /// Either value is acceptable
    DontCare,
}

impl FlagConstraint {
    /// Whether `flag` satisfies this constraint
    pub fn matches(&self, flag: bool) -> bool {
        match self {
            FlagConstraint::Set => flag,
            FlagConstraint::Clear => !flag,
            FlagConstraint::DontCare => true,
        }
    }
}

/// What the Completion Path should schedule for this SA once a transition finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutEvent {
    /// Resend the last packet after a backoff interval
    Retransmit,
    /// Replace (rekey) this SA before its lifetime expires
    SaReplace,
    /// Tear the SA down after a grace period, absorbing peer retransmits
    Discard,
    /// Keep whatever timer is already running
    Retain,
    /// No timer needed
    None,
}

/// One admissible arc of the state machine
pub struct TransitionRow {
    /// State this row applies to, unless `recv_exchange_type` is `CreateChildSa`
    /// (spec §4.6 rule 1: the CREATE_CHILD_SA family bypasses the `from_state`
    /// check because rekey-IKE, rekey-child, and new-child share one exchange
    /// type and state; they are told apart by the encrypted payload signature)
    pub from_state: FiniteState,
    /// State to move to on success
    pub next_state: FiniteState,
    /// Constraint on the header's `I` (initiator) bit
    pub ike_i: FlagConstraint,
    /// Constraint on the header's `R` (response) bit
    pub msg_r: FlagConstraint,
    /// Whether a successful transition sends a reply packet
    pub send_on_success: bool,
    /// Whether this row only applies before SKEYSEED is available (the
    /// pre-key-derivation responder path)
    pub requires_no_skeyseed: bool,
    /// Exchange type this row answers
    pub recv_exchange_type: ExchangeType,
    /// Expected outer (cleartext) payload signature
    pub expected_message_payloads: ExpectedPayloads,
    /// Expected inner (decrypted) payload signature, checked once available
    pub expected_encrypted_payloads: ExpectedPayloads,
    /// Handler invoked when this row is selected and its encrypted-payload check (if any) passes
    pub handler: Arc<dyn Handler + Send + Sync>,
    /// Timer to arm on successful completion
    pub timeout_event: TimeoutEvent,
}

/// The ordered list of [TransitionRow]s making up the state machine
#[derive(Default)]
pub struct TransitionTable {
    rows: Vec<TransitionRow>,
}

impl TransitionTable {
    /// An empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row; declaration order is selection priority
    pub fn push(&mut self, row: TransitionRow) {
        self.rows.push(row);
    }

    /// Select the first row matching the clear-payload shape of an incoming message
    ///
    /// Encrypted-payload verification (rule 6) is applied separately by the
    /// dispatcher once decryption is possible, since it may require
    /// reassembling fragments first; this keeps the selector itself a pure
    /// function of already-available data.
    pub fn select(
        &self,
        current_state: FiniteState,
        skeyseed_available: bool,
        exchange_type: ExchangeType,
        ike_i: bool,
        msg_r: bool,
        message_payloads: &PayloadSummary,
        digest: &MessageDigest,
    ) -> Option<(usize, &TransitionRow)> {
        self.rows.iter().enumerate().find(|(_, row)| {
            let bypass_from_state = row.recv_exchange_type == ExchangeType::CreateChildSa;
            if !bypass_from_state && row.from_state != current_state {
                return false;
            }
            if row.recv_exchange_type != exchange_type {
                return false;
            }
            if row.requires_no_skeyseed && skeyseed_available {
                return false;
            }
            if !row.ike_i.matches(ike_i) || !row.msg_r.matches(msg_r) {
                return false;
            }
            !verify(message_payloads, &row.expected_message_payloads, digest).is_bad()
        })
    }

    /// Fetch a row by the index [Self::select] returned
    pub fn row(&self, index: usize) -> &TransitionRow {
        &self.rows[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::PayloadSummary;
    use crate::handler::{FnHandler, TransitionResult};
    use isakmp::v2::definitions::params::PayloadType;
    use std::net::SocketAddr;

    fn digest() -> MessageDigest {
        MessageDigest {
            initiator_spi: 1,
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

    fn noop_handler() -> Arc<dyn Handler + Send + Sync> {
        Arc::new(FnHandler(|_, _, _| TransitionResult::Ok {
            response: None,
            emancipate: None,
        }))
    }

    #[test]
    fn first_matching_row_wins() {
        let mut table = TransitionTable::new();
        table.push(TransitionRow {
            from_state: FiniteState::R0,
            next_state: FiniteState::R1,
            ike_i: FlagConstraint::Set,
            msg_r: FlagConstraint::Clear,
            send_on_success: true,
            requires_no_skeyseed: false,
            recv_exchange_type: ExchangeType::IkeSaInit,
            expected_message_payloads: ExpectedPayloads::none(),
            expected_encrypted_payloads: ExpectedPayloads::none(),
            handler: noop_handler(),
            timeout_event: TimeoutEvent::None,
        });
        table.push(TransitionRow {
            from_state: FiniteState::R0,
            next_state: FiniteState::R1,
            ike_i: FlagConstraint::Set,
            msg_r: FlagConstraint::Clear,
            send_on_success: true,
            requires_no_skeyseed: false,
            recv_exchange_type: ExchangeType::IkeSaInit,
            expected_message_payloads: ExpectedPayloads::none(),
            expected_encrypted_payloads: ExpectedPayloads::none(),
            handler: noop_handler(),
            timeout_event: TimeoutEvent::Discard,
        });
        let mut summary = PayloadSummary::empty();
        summary.seen.insert(PayloadType::SecurityAssociation);
        let (index, row) = table
            .select(FiniteState::R0, false, ExchangeType::IkeSaInit, true, false, &summary, &digest())
            .unwrap();
        assert_eq!(index, 0);
        assert_eq!(row.timeout_event, TimeoutEvent::None);
    }

    #[test]
    fn create_child_sa_bypasses_from_state_check() {
        let mut table = TransitionTable::new();
        table.push(TransitionRow {
            from_state: FiniteState::I3,
            next_state: FiniteState::RekeyChildI,
            ike_i: FlagConstraint::DontCare,
            msg_r: FlagConstraint::Clear,
            send_on_success: true,
            requires_no_skeyseed: false,
            recv_exchange_type: ExchangeType::CreateChildSa,
            expected_message_payloads: ExpectedPayloads::none(),
            expected_encrypted_payloads: ExpectedPayloads::none(),
            handler: noop_handler(),
            timeout_event: TimeoutEvent::None,
        });
        let summary = PayloadSummary::empty();
        // current_state is R2, not I3, yet the row still matches.
        let selected = table.select(
            FiniteState::R2,
            true,
            ExchangeType::CreateChildSa,
            true,
            false,
            &summary,
            &digest(),
        );
        assert!(selected.is_some());
    }
}
