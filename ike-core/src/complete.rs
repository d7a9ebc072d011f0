//! Completion Path: the uniform post-handler step every transition funnels through
//!
//! Spec §4.8. Every [TransitionResult] variant is handled here, and here
//! alone; the dispatcher never mutates SA state itself after invoking a
//! handler.

use crate::handler::TransitionResult;
use crate::sa::{SaSerial, StateCategory};
use crate::stats::Stats;
use crate::table::SaTable;
use crate::transition::{TimeoutEvent, TransitionRow};
use tracing::{info, warn};

/// What the dispatcher's caller (the event loop) must do as a result of one completed transition
#[derive(Debug, Default, Clone)]
pub struct Completion {
    /// A packet to send to the peer, if any
    pub send: Option<Vec<u8>>,
    /// A timer to (re-)arm for the named SA
    pub timer: Option<(SaSerial, TimeoutEvent)>,
    /// An SA that was destroyed as part of this completion
    pub destroy: Option<SaSerial>,
    /// Set when the destruction was due to an internal error worth paging an operator about
    pub fatal: bool,
    /// Set when the SA just reached `EstablishedChild` and DPD is configured for it
    pub start_liveness: bool,
}

impl Completion {
    /// A completion with no side effects: nothing to send, no timer, nothing destroyed
    pub fn none() -> Self {
        Self::default()
    }
}

/// Apply a handler's [TransitionResult] to the SA table and report what the caller must do
///
/// `dpd_configured` mirrors the per-connection liveness policy the handler
/// layer would otherwise resolve (spec §4.8, SPEC_FULL's DPD supplement).
#[allow(clippy::too_many_arguments)]
pub fn complete(
    table: &mut SaTable,
    stats: &mut Stats,
    sa_serial: SaSerial,
    child_serial: Option<SaSerial>,
    row: &TransitionRow,
    result: TransitionResult,
    incoming_msgid: u32,
    incoming_is_response: bool,
    dpd_configured: bool,
    fail_response: Option<Vec<u8>>,
) -> Completion {
    stats.record_handler_result(&result);
    match result {
        TransitionResult::Ok { response, emancipate } => {
            complete_ok(table, stats, sa_serial, child_serial, row, response, emancipate, incoming_msgid, incoming_is_response, dpd_configured)
        }
        TransitionResult::Suspend => {
            // Caller is responsible for attaching the owned Message Digest to
            // `sa.suspended` before this is reached; here we only mark busy.
            if let Some(sa) = table.ike_sa_mut(sa_serial) {
                sa.busy = true;
            }
            Completion::none()
        }
        TransitionResult::Ignore => {
            if let Some(sa) = table.ike_sa_mut(sa_serial) {
                sa.busy = false;
            }
            Completion::none()
        }
        TransitionResult::Drop => {
            table.remove_ike_sa(sa_serial);
            stats.sas_destroyed += 1;
            Completion {
                destroy: Some(sa_serial),
                ..Completion::none()
            }
        }
        TransitionResult::Fatal => {
            warn!(sa = sa_serial, "transition handler reported a fatal internal error");
            table.remove_ike_sa(sa_serial);
            stats.sas_destroyed += 1;
            Completion {
                destroy: Some(sa_serial),
                fatal: true,
                ..Completion::none()
            }
        }
        TransitionResult::Fail(_code) => {
            // The peer-visible Notify packet is built by `dispatch`, which
            // has the raw header fields (SPI pair, exchange type, msgid)
            // this path does not; it is passed in as `fail_response`.
            if incoming_is_response {
                table.remove_ike_sa(sa_serial);
                stats.sas_destroyed += 1;
                Completion {
                    destroy: Some(sa_serial),
                    ..Completion::none()
                }
            } else if row.recv_exchange_type == isakmp::v2::definitions::params::ExchangeType::IkeSaInit {
                table.remove_ike_sa(sa_serial);
                stats.sas_destroyed += 1;
                Completion {
                    send: fail_response,
                    destroy: Some(sa_serial),
                    timer: None,
                    ..Completion::none()
                }
            } else {
                if let Some(sa) = table.ike_sa_mut(sa_serial) {
                    sa.busy = false;
                }
                Completion {
                    send: fail_response,
                    timer: Some((sa_serial, TimeoutEvent::Discard)),
                    ..Completion::none()
                }
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn complete_ok(
    table: &mut SaTable,
    stats: &mut Stats,
    sa_serial: SaSerial,
    child_serial: Option<SaSerial>,
    row: &TransitionRow,
    response: Option<Vec<u8>>,
    emancipate: Option<crate::handler::Emancipation>,
    incoming_msgid: u32,
    incoming_is_response: bool,
    dpd_configured: bool,
) -> Completion {
    let mut target = sa_serial;
    let mut emancipated = false;

    if let Some(em) = emancipate {
        if let Some(new_serial) = table.emancipate(sa_serial, em.new_initiator_spi, em.new_responder_spi) {
            stats.emancipations += 1;
            info!(old = sa_serial, new = new_serial, "IKE SA rekey emancipated");
            target = new_serial;
            emancipated = true;
        }
    } else if child_serial.is_none() {
        if let Some(sa) = table.ike_sa_mut(sa_serial) {
            sa.state = row.next_state;
        }
    }

    if let Some(child) = child_serial {
        if let Some(child_sa) = table.child_sa_mut(child) {
            child_sa.state = row.next_state;
        }
    }

    let mut start_liveness = false;
    if let Some(sa) = table.ike_sa_mut(target) {
        sa.busy = false;
        // An emancipated SA's tracker was just reset to its post-rekey
        // defaults by `table.emancipate()`; the msgid that closes out this
        // round belongs to the *old* SPI pair, not the new one, so it must
        // not be recorded against `target` (spec §8 scenario 6).
        if !emancipated {
            if incoming_is_response {
                sa.msgid.commit_response(incoming_msgid);
            } else {
                sa.msgid.commit_request(incoming_msgid);
                if row.send_on_success {
                    sa.msgid.commit_reply(incoming_msgid);
                }
            }
        }
        if let Some(bytes) = &response {
            sa.last_sent = Some(bytes.clone());
            sa.retransmit_count = 0;
        }
        #[cfg(debug_assertions)]
        sa.msgid.check_invariants();
    }

    if dpd_configured
        && child_serial.is_some_and(|child| {
            table.child_sa(child).is_some_and(|c| c.state.category() == StateCategory::EstablishedChild)
        })
    {
        start_liveness = true;
    }

    let timer = match row.timeout_event {
        TimeoutEvent::None => None,
        other => Some((target, other)),
    };

    Completion {
        send: response,
        timer,
        destroy: None,
        fatal: false,
        start_liveness,
    }
}
