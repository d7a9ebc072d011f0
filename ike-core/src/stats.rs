//! Observation interface: per-transition statistics counters
//!
//! Spec §6 treats logging sinks and statistics counters as opaque
//! observers; SPEC_FULL's ambient-stack supplement gives the dispatcher and
//! completion path a minimal concrete shape to report into rather than
//! leaving those call sites with nowhere to write.

/// Plain counters bumped by the dispatcher and completion path
///
/// Kept as a flat struct of `u64`s rather than a generic metrics registry:
/// the teacher's own crates do not carry a metrics dependency, and the spec
/// only asks for "per-transition statistics (received-notifies, STF
/// outcomes, per-state counters)", not a pluggable backend.
#[derive(Debug, Default, Clone)]
pub struct Stats {
    /// Messages received, by exchange type family (indexed ad hoc by callers via the counters below)
    pub received: u64,
    /// Messages dropped before a transition was selected (syntax, DoS, lookup failure, busy, retransmit)
    pub dropped: u64,
    /// Requests answered by re-emitting a cached response rather than invoking a handler
    pub retransmitted: u64,
    /// Handler invocations, broken down by [crate::handler::TransitionResult] variant
    pub handler_ok: u64,
    /// See [Self::handler_ok]
    pub handler_suspend: u64,
    /// See [Self::handler_ok]
    pub handler_ignore: u64,
    /// See [Self::handler_ok]
    pub handler_drop: u64,
    /// See [Self::handler_ok]
    pub handler_fatal: u64,
    /// See [Self::handler_ok]
    pub handler_fail: u64,
    /// Notify payloads received, by error/status code, summed
    pub notifies_received: u64,
    /// IKE SAs created
    pub sas_created: u64,
    /// IKE SAs destroyed (any reason)
    pub sas_destroyed: u64,
    /// IKE rekey emancipations completed
    pub emancipations: u64,
    /// SA_INIT requests answered with a COOKIE challenge
    pub cookie_challenges: u64,
    /// SA_INIT requests dropped outright for being over the hard DoS limit
    pub dos_rejections: u64,
    /// SA_INIT requests answered with a notify naming what failed in their
    /// first-payload chain (malformed/unsupported KE, syntax), before any
    /// SA was created
    pub malformed_sa_init_rejections: u64,
}

impl Stats {
    /// Record the outcome of one handler invocation
    pub fn record_handler_result(&mut self, result: &crate::handler::TransitionResult) {
        use crate::handler::TransitionResult::*;
        match result {
            Ok { .. } => self.handler_ok += 1,
            Suspend => self.handler_suspend += 1,
            Ignore => self.handler_ignore += 1,
            Drop => self.handler_drop += 1,
            Fatal => self.handler_fatal += 1,
            Fail(_) => self.handler_fail += 1,
        }
    }
}
