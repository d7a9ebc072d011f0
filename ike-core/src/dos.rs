//! DoS gating: half-open accounting and the cookie challenge
//!
//! Mirrors the shape of the teacher's own half-open bookkeeping
//! (`ikebuster::lib::scan` caps concurrent in-flight probes with a bounded
//! channel); here the bound is on half-open *responder* IKE SAs rather than
//! outbound probes, gated by a stateless cookie instead of backpressure.

use crate::sa::StateCategory;
use crate::table::SaTable;

/// Soft/hard half-open thresholds controlling the cookie challenge (spec §4.7 step 2, §7)
#[derive(Debug, Clone, Copy)]
pub struct DosThresholds {
    /// Below this many half-open responder IKE SAs, no cookie is demanded
    pub soft_limit: usize,
    /// At or above this many, new SA_INIT requests without a valid cookie are dropped outright
    pub hard_limit: usize,
}

impl Default for DosThresholds {
    fn default() -> Self {
        Self {
            soft_limit: 1000,
            hard_limit: 10_000,
        }
    }
}

/// Disposition of an incoming, not-yet-cookie-verified SA_INIT request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionDecision {
    /// Load is low; proceed with full SA_INIT processing
    Admit,
    /// Load is elevated; reply with COOKIE and demand the peer echo it
    ChallengeWithCookie,
    /// Load is past the hard limit and this request carries no valid cookie; drop
    Reject,
}

/// Decide whether to admit, cookie-challenge, or reject a new half-open request
///
/// `cookie_verified` reflects whether the peer already echoed a valid cookie
/// on this request (spec §4.7 step 2: a verified cookie always admits,
/// regardless of load, since verifying it already cost the peer a round trip).
pub fn admit(table: &SaTable, thresholds: &DosThresholds, cookie_verified: bool) -> AdmissionDecision {
    if cookie_verified {
        return AdmissionDecision::Admit;
    }
    let half_open = table.count_in_category(StateCategory::HalfOpenIke);
    if half_open >= thresholds.hard_limit {
        AdmissionDecision::Reject
    } else if half_open >= thresholds.soft_limit {
        AdmissionDecision::ChallengeWithCookie
    } else {
        AdmissionDecision::Admit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sa::{FiniteState, SaRole};

    fn table_with_half_open(count: usize) -> SaTable {
        let mut table = SaTable::new();
        for i in 0..count {
            let serial = table.insert_ike_sa(SaRole::Responder, i as u64, "default".into());
            if let Some(sa) = table.ike_sa_mut(serial) {
                sa.state = FiniteState::R1;
            }
        }
        table
    }

    #[test]
    fn verified_cookie_always_admits() {
        let table = table_with_half_open(50_000);
        let thresholds = DosThresholds::default();
        assert_eq!(admit(&table, &thresholds, true), AdmissionDecision::Admit);
    }

    #[test]
    fn low_load_admits_without_challenge() {
        let table = table_with_half_open(5);
        let thresholds = DosThresholds::default();
        assert_eq!(admit(&table, &thresholds, false), AdmissionDecision::Admit);
    }

    #[test]
    fn soft_limit_triggers_cookie_challenge() {
        let thresholds = DosThresholds { soft_limit: 2, hard_limit: 10 };
        let table = table_with_half_open(2);
        assert_eq!(admit(&table, &thresholds, false), AdmissionDecision::ChallengeWithCookie);
    }

    #[test]
    fn hard_limit_rejects_unverified_requests() {
        let thresholds = DosThresholds { soft_limit: 2, hard_limit: 4 };
        let table = table_with_half_open(4);
        assert_eq!(admit(&table, &thresholds, false), AdmissionDecision::Reject);
    }
}
