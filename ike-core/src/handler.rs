//! Handler interface: the contract exchange-specific logic is called through
//!
//! This crate specifies the *contract*, not the body (spec §1 "the
//! exchange-specific transition handlers themselves... we specify their
//! contract, not their body"). Concrete handlers (computing an IKE_AUTH
//! reply, running the DH exchange, etc.) are external collaborators plugged
//! in by `iked` or a test harness.

use crate::digest::MessageDigest;
use crate::sa::{ChildSa, IkeSa};
use isakmp::v2::definitions::params::NotifyErrorMessage;

/// The Notify error code a handler asks the Completion Path to emit on `Fail`
pub type NotificationCode = NotifyErrorMessage;

/// The new SPI pair an IKE-rekey handler asks the Completion Path to
/// emancipate the in-progress CHILD SA into (spec §4.8, §8 scenario 6)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Emancipation {
    /// SPI of whichever peer initiated the rekey
    pub new_initiator_spi: u64,
    /// SPI chosen by the responder of the rekey
    pub new_responder_spi: u64,
}

/// Outcome of invoking a transition's handler (spec §9 "Exception-like
/// control flow" replacing the source's `STF_*` sentinels with a sum type)
#[derive(Debug)]
pub enum TransitionResult {
    /// The transition succeeded; advance state
    ///
    /// `response`, if present, is a fully built packet the Completion Path
    /// records for retransmission and sends. `emancipate`, if present,
    /// tells the Completion Path this was the exchange that completes an
    /// IKE SA rekey, and which new SPI pair the promoted CHILD SA should
    /// take on (spec §4.8 "emancipate the in-progress CHILD SA").
    Ok {
        #[allow(missing_docs)]
        response: Option<Vec<u8>>,
        #[allow(missing_docs)]
        emancipate: Option<Emancipation>,
    },
    /// The handler kicked off asynchronous work (DH, signature, kernel
    /// upcall) and will re-enter the dispatcher with this Message Digest later
    Suspend,
    /// No state change; the Message Digest is discarded
    Ignore,
    /// Destroy the SA silently, no notification sent
    Drop,
    /// Destroy the SA and notify the admin channel
    Fatal,
    /// The transition failed with a specific, peer-visible reason
    Fail(NotificationCode),
}

/// The contract every exchange-specific transition handler implements
///
/// `child` is `Some` when the transition table resolved (or is creating) a
/// CHILD SA for this exchange (AUTH, CREATE_CHILD_SA); `None` for exchanges
/// that only ever touch the IKE SA itself (SA_INIT, IKE-level INFORMATIONAL).
pub trait Handler {
    /// Advance `sa` (and, if present, `child`) according to `msg`
    fn handle(&self, sa: &mut IkeSa, child: Option<&mut ChildSa>, msg: &MessageDigest) -> TransitionResult;
}

/// A [Handler] built from a plain closure, for tests and simple wiring
pub struct FnHandler<F>(pub F)
where
    F: Fn(&mut IkeSa, Option<&mut ChildSa>, &MessageDigest) -> TransitionResult;

impl<F> Handler for FnHandler<F>
where
    F: Fn(&mut IkeSa, Option<&mut ChildSa>, &MessageDigest) -> TransitionResult,
{
    fn handle(&self, sa: &mut IkeSa, child: Option<&mut ChildSa>, msg: &MessageDigest) -> TransitionResult {
        (self.0)(sa, child, msg)
    }
}
