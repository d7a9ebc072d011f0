//! IKE SA / CHILD SA data model and the finite state machine's state enum

use crate::digest::MessageDigest;
use crate::fragment::FragmentCollector;
use crate::msgid::MessageIdState;
use std::collections::VecDeque;
use std::time::Duration;

/// Opaque handle identifying an SA inside the [crate::table::SaTable]
///
/// Children reference their parent by this serial rather than a direct
/// reference, breaking the parent/child reference cycle (spec §9 "Cyclic
/// IKE↔Child references"); all lookups go back through the table.
pub type SaSerial = u64;

/// Which side of the exchange created an SA
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaRole {
    /// This side sent the first SA_INIT / CREATE_CHILD_SA request
    Initiator,
    /// This side answered it
    Responder,
}

/// DoS-accounting category of a [FiniteState]
///
/// Used by [crate::dos] to count half-open responder SAs separately from
/// established ones, per SPEC_FULL's "half-open accounting by state
/// category" supplement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateCategory {
    /// Transient pre-SA bookkeeping state; not yet worth counting
    Ignore,
    /// Authentication has not yet completed
    HalfOpenIke,
    /// A CHILD or IKE rekey negotiation is in flight under an established IKE SA
    OpenIke,
    /// The IKE SA itself is fully established
    EstablishedIke,
    /// A CHILD SA has completed negotiation
    EstablishedChild,
    /// A Delete/Informational exchange is in flight
    Informational,
}

/// Enumerated states of the combined IKE SA / CHILD SA state machine (spec §4.9)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum FiniteState {
    // Initiator IKE SA establishment
    I0,
    I1,
    I2,
    I3,
    // Responder IKE SA establishment
    R0,
    R1,
    R2,
    // Child rekey
    RekeyChildI0,
    RekeyChildI,
    IpsecI,
    CreateR,
    IpsecR,
    // IKE rekey (emancipation)
    RekeyIkeI0,
    RekeyIkeI,
    RekeyIkeR,
    // Deletion
    IkesaDel,
    ChildsaDel,
}

impl FiniteState {
    /// The DoS-accounting category this state belongs to
    pub fn category(&self) -> StateCategory {
        use FiniteState::*;
        match self {
            I0 => StateCategory::Ignore,
            I1 | I2 | R1 => StateCategory::HalfOpenIke,
            R0 => StateCategory::Ignore,
            I3 | R2 => StateCategory::EstablishedIke,
            RekeyChildI0 | RekeyChildI | CreateR | RekeyIkeI0 | RekeyIkeI | RekeyIkeR => {
                StateCategory::OpenIke
            }
            IpsecI | IpsecR => StateCategory::EstablishedChild,
            IkesaDel | ChildsaDel => StateCategory::Informational,
        }
    }

    /// Whether this state belongs to an IKE-rekey exchange whose success
    /// triggers emancipation rather than an in-place state change
    pub fn is_ike_rekey(&self) -> bool {
        matches!(self, FiniteState::RekeyIkeI0 | FiniteState::RekeyIkeI | FiniteState::RekeyIkeR)
    }
}

/// The policy/connection handle a real daemon would resolve identities and
/// proposals against; out of scope per spec §1, carried here as an opaque name
pub type ConnectionName = String;

/// A pending outbound request waiting for window space (spec §3, §4.4)
#[derive(Debug, Clone)]
pub struct PendingRequest {
    /// Pre-built packet bytes (or fragment list) ready to send once minted a Message ID
    pub packet: Vec<u8>,
}

/// The long-lived, authenticated control-plane association between two IKE peers
#[derive(Debug, Clone)]
pub struct IkeSa {
    /// This SA's handle inside the [crate::table::SaTable]
    pub serial: SaSerial,
    /// SPI chosen by whichever peer started this IKE SA
    pub initiator_spi: u64,
    /// SPI chosen by the responder; zero until learned
    pub responder_spi: u64,
    /// Whether this side was the initiator or responder at creation
    pub role: SaRole,
    /// Current finite state
    pub state: FiniteState,
    /// Message-ID counters for this SA
    pub msgid: MessageIdState,
    /// Whether SKEYSEED (and therefore all derived keys) is available yet
    pub skeyseed_available: bool,
    /// Set while a transition is in progress; no new transition may start (spec invariant 2)
    pub busy: bool,
    /// Fragment reassembly buffer, exclusively owned by this SA
    pub fragments: FragmentCollector,
    /// Last packet(s) sent, retained for retransmission
    pub last_sent: Option<Vec<u8>>,
    /// Number of times the last packet has been retransmitted
    pub retransmit_count: u32,
    /// Policy/connection handle
    pub connection: ConnectionName,
    /// Outbound requests waiting for request-window space
    pub pending_requests: VecDeque<PendingRequest>,
    /// A suspended handler's Message Digest, owned by this SA until resumed (spec §5, §9)
    pub suspended: Option<MessageDigest>,
    /// Serials of CHILD SAs belonging to this IKE SA
    pub children: Vec<SaSerial>,
    /// Whether the peer has completed the DoS cookie challenge for this SA
    pub cookie_verified: bool,
    /// Whether the peer advertised, and policy allows, IKE fragmentation
    pub fragmentation_allowed: bool,
}

impl IkeSa {
    /// Construct a freshly-created SA in its initial state
    pub fn new(serial: SaSerial, role: SaRole, initiator_spi: u64, connection: ConnectionName) -> Self {
        let state = match role {
            SaRole::Initiator => FiniteState::I0,
            SaRole::Responder => FiniteState::R0,
        };
        Self {
            serial,
            initiator_spi,
            responder_spi: 0,
            role,
            state,
            msgid: MessageIdState::default(),
            skeyseed_available: false,
            busy: false,
            fragments: FragmentCollector::new(),
            last_sent: None,
            retransmit_count: 0,
            connection,
            pending_requests: VecDeque::new(),
            suspended: None,
            children: vec![],
            cookie_verified: false,
            fragmentation_allowed: true,
        }
    }

    /// The (initiator SPI, responder SPI) identity pair once both are known
    pub fn spi_pair(&self) -> (u64, u64) {
        (self.initiator_spi, self.responder_spi)
    }
}

/// A data-plane ESP/AH association negotiated under an [IkeSa]
#[derive(Debug, Clone)]
pub struct ChildSa {
    /// This SA's handle inside the [crate::table::SaTable]
    pub serial: SaSerial,
    /// Serial of the IKE SA that created and owns this CHILD SA
    pub parent: SaSerial,
    /// Message ID of the exchange that is creating (or created) this CHILD SA
    pub creating_msgid: u32,
    /// Which side initiated the negotiation
    pub role: SaRole,
    /// Current finite state
    pub state: FiniteState,
    /// Initiator traffic selector payload bytes, opaque at this layer
    pub traffic_selectors_i: Vec<u8>,
    /// Responder traffic selector payload bytes, opaque at this layer
    pub traffic_selectors_r: Vec<u8>,
    /// IPComp Compression Parameter Index, if negotiated
    pub ipcomp_cpi: Option<u16>,
    /// How long to wait before discarding this SA absent a completing response
    pub discard_timeout: Option<Duration>,
}

impl ChildSa {
    /// Construct a freshly-created CHILD SA under `parent`
    pub fn new(serial: SaSerial, parent: SaSerial, creating_msgid: u32, role: SaRole) -> Self {
        let state = match role {
            SaRole::Initiator => FiniteState::RekeyChildI0,
            SaRole::Responder => FiniteState::CreateR,
        };
        Self {
            serial,
            parent,
            creating_msgid,
            role,
            state,
            traffic_selectors_i: vec![],
            traffic_selectors_r: vec![],
            ipcomp_cpi: None,
            discard_timeout: None,
        }
    }
}
