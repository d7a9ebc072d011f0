//! Exchange Dispatcher: the orchestrator tying every other module together
//!
//! Spec §4.7. [Dispatcher::dispatch] is the single entry point the event
//! loop (`iked`) calls for every inbound datagram; [Dispatcher::resume] is
//! the matching entry point for an asynchronous continuation completing a
//! previously [crate::handler::TransitionResult::Suspend]ed transition.

use crate::crypto::{CookieSecret, IkeCrypto};
use crate::decode;
use crate::digest::MessageDigest;
use crate::dos::{self, AdmissionDecision, DosThresholds};
use crate::fragment::FragmentOutcome;
use crate::handler::TransitionResult;
use crate::msgid::{RequestOutcome, ResponseOutcome};
use crate::sa::{ConnectionName, SaRole, SaSerial};
use crate::stats::Stats;
use crate::table::SaTable;
use crate::transition::TransitionTable;
use crate::{complete, verify};
use isakmp::v2::definitions::params::{
    ExchangeType, NotifyErrorMessage, NotifyStatusMessage, PayloadType, SecurityProtocol,
};
use isakmp::v2::definitions::{IKEv2, Notification, NotificationType, Payload};
use isakmp::v2::parser::ParserError;
use isakmp::zerocopy::network_endian::{U16, U32, U64};
use isakmp::zerocopy::{AsBytes, FromBytes};
use isakmp::Header;
use std::net::SocketAddr;
use tracing::warn;

/// Which notification policy governs a Transition Selector no-match (spec §9 Open Question 2)
///
/// Only [NoMatchPolicy::SaferSpiless] is wired up: before SK authentication
/// succeeds, a no-match is either silently dropped (response direction) or
/// answered with a fresh, state-free notify carrying no echoed SPI material
/// beyond what the peer already sent (request direction, IKE_SA_INIT only);
/// after SK authentication succeeds, `INVALID_SYNTAX` is used uniformly. The
/// spec's alternative, a uniform `INVALID_IKE_SPI` regardless of auth state,
/// would be a one-line change to [Dispatcher::no_match], not a redesign.
#[derive(Debug, Clone, Copy)]
enum NoMatchPolicy {
    SaferSpiless,
}

/// The Exchange Dispatcher: owns the SA table and every collaborator it drives
pub struct Dispatcher {
    /// Process-wide SA state, see [crate::table::SaTable]
    pub table: SaTable,
    /// The ordered transition rows making up the state machine
    pub transitions: TransitionTable,
    /// Half-open/cookie thresholds, see [crate::dos]
    pub thresholds: DosThresholds,
    /// AEAD encrypt/decrypt for SK/SKF payload bodies
    pub crypto: Box<dyn IkeCrypto + Send + Sync>,
    /// Stateless DoS cookie derivation
    pub cookies: Box<dyn CookieSecret + Send + Sync>,
    /// Per-transition counters
    pub stats: Stats,
    /// Whether this node's policy allows message fragmentation at all
    pub fragmentation_allowed: bool,
    /// Whether DPD/liveness probing is configured for SAs reaching `EstablishedChild`
    pub dpd_configured: bool,
    /// Connection name assigned to newly created responder SAs
    pub default_connection: ConnectionName,
    no_match_policy: NoMatchPolicy,
}

impl Dispatcher {
    /// Construct a dispatcher around its external collaborators
    pub fn new(
        transitions: TransitionTable,
        thresholds: DosThresholds,
        crypto: Box<dyn IkeCrypto + Send + Sync>,
        cookies: Box<dyn CookieSecret + Send + Sync>,
        fragmentation_allowed: bool,
        dpd_configured: bool,
        default_connection: ConnectionName,
    ) -> Self {
        Self {
            table: SaTable::new(),
            transitions,
            thresholds,
            crypto,
            cookies,
            stats: Stats::default(),
            fragmentation_allowed,
            dpd_configured,
            default_connection,
            no_match_policy: NoMatchPolicy::SaferSpiless,
        }
    }

    /// Process one inbound datagram from `peer`
    pub fn dispatch(&mut self, buf: &[u8], peer: SocketAddr) -> complete::Completion {
        self.stats.received += 1;
        let total_len = buf.len() as u32;
        let digest = match decode::decode(buf, peer) {
            Ok(digest) => digest,
            Err(err) => return self.reject_or_drop_undecodable(buf, err),
        };

        if digest.exchange_type == ExchangeType::IkeSaInit && !digest.response_flag {
            return self.dispatch_sa_init_request(digest, total_len);
        }

        let sa_serial = match self.resolve_sa(&digest) {
            Some(serial) => serial,
            None => {
                self.stats.dropped += 1;
                return complete::Completion::none();
            }
        };

        self.dispatch_established(sa_serial, digest, total_len)
    }

    /// Handle a datagram whose outer payload chain failed to decode (spec §4.7 step 2)
    ///
    /// Nothing about the datagram can be trusted yet, not even that its SPIs
    /// belong to a real SA, so the default is to drop it silently. The one
    /// exception the spec carves out: a message whose *raw header* has the
    /// unmistakable shape of a fresh IKE_SA_INIT request (version, exchange
    /// type, the I bit, a zero Message ID, a zero responder SPI) still gets
    /// an eager reply naming what failed in its first-payload chain — most
    /// commonly an unsupported/malformed KE payload — without ever creating
    /// state for it.
    fn reject_or_drop_undecodable(&mut self, buf: &[u8], err: decode::DecodeError) -> complete::Completion {
        let Some(header) = Header::ref_from_prefix(buf) else {
            self.stats.dropped += 1;
            warn!(?err, "dropped undecodable datagram");
            return complete::Completion::none();
        };
        let looks_like_sa_init_request = header.version == isakmp::v2::IKE_2_VERSION_VALUE
            && header.exchange_type == ExchangeType::IkeSaInit as u8
            && header.flags & 0b0000_1000 != 0
            && header.flags & 0b0010_0000 == 0
            && header.message_id.get() == 0
            && header.responder_spi.get() == 0;
        if !looks_like_sa_init_request {
            self.stats.dropped += 1;
            warn!(?err, "dropped undecodable datagram");
            return complete::Completion::none();
        }

        self.stats.malformed_sa_init_rejections += 1;
        warn!(?err, "rejecting malformed SA_INIT request without creating state");
        let code = match &err {
            decode::DecodeError::UnsupportedCriticalPayload(_) => NotifyErrorMessage::UnsupportedCriticalPayload,
            decode::DecodeError::InvalidSyntax(ParserError::UnparseableParameter(_)) => {
                NotifyErrorMessage::InvalidKeyExchangePayload
            }
            _ => NotifyErrorMessage::InvalidSyntax,
        };
        complete::Completion {
            send: self.build_notify(header.initiator_spi.get(), 0, ExchangeType::IkeSaInit, 0, code),
            ..complete::Completion::none()
        }
    }

    /// Re-enter the dispatcher for a transition whose handler previously returned `Suspend`
    ///
    /// `result` is whatever the asynchronous continuation (DH exponentiation,
    /// signature verification, kernel upcall) produced in place of a
    /// synchronous handler return; the Message Digest is restored from the
    /// SA, which has owned it since suspension (spec §5).
    pub fn resume(&mut self, sa_serial: SaSerial, result: TransitionResult) -> complete::Completion {
        let Some(digest) = self
            .table
            .ike_sa_mut(sa_serial)
            .and_then(|sa| sa.suspended.take())
        else {
            return complete::Completion::none();
        };

        let Some((row_index, child_serial)) = self.select_row(sa_serial, &digest) else {
            // The selected row, or the SA itself, no longer matches (e.g. the
            // SA was deleted while the continuation was in flight); the spec
            // requires a resumed handler to observe deletion and no-op.
            return complete::Completion::none();
        };

        self.complete_with_result(sa_serial, child_serial, row_index, digest, result)
    }

    fn dispatch_sa_init_request(&mut self, digest: MessageDigest, total_len: u32) -> complete::Completion {
        if digest.message_id != 0 || !digest.initiator_flag || digest.responder_spi != 0 {
            self.stats.dropped += 1;
            return complete::Completion::none();
        }

        if let Some(existing) = self.table.by_initiator_spi(digest.initiator_spi) {
            let serial = existing.serial;
            return self.dispatch_established(serial, digest, total_len);
        }

        let cookie_verified = self.verify_cookie(&digest);
        match dos::admit(&self.table, &self.thresholds, cookie_verified) {
            AdmissionDecision::Reject => {
                self.stats.dos_rejections += 1;
                complete::Completion::none()
            }
            AdmissionDecision::ChallengeWithCookie => {
                self.stats.cookie_challenges += 1;
                complete::Completion {
                    send: self.build_cookie_challenge(&digest),
                    ..complete::Completion::none()
                }
            }
            AdmissionDecision::Admit => {
                let serial =
                    self.table
                        .insert_ike_sa(SaRole::Responder, digest.initiator_spi, self.default_connection.clone());
                if cookie_verified {
                    if let Some(sa) = self.table.ike_sa_mut(serial) {
                        sa.cookie_verified = true;
                    }
                }
                self.stats.sas_created += 1;
                self.dispatch_established(serial, digest, total_len)
            }
        }
    }

    /// Locate the SA a non-SA_INIT-request message belongs to (spec §4.5)
    fn resolve_sa(&mut self, digest: &MessageDigest) -> Option<SaSerial> {
        if digest.exchange_type == ExchangeType::IkeSaInit {
            // SA_INIT response: locate by initiator SPI, then learn the
            // responder SPI now that it has arrived in cleartext.
            let serial = self.table.by_initiator_spi(digest.initiator_spi)?.serial;
            self.table.learn_responder_spi(serial, digest.responder_spi);
            return Some(serial);
        }
        Some(self.table.by_spi_pair(digest.initiator_spi, digest.responder_spi)?.serial)
    }

    fn verify_cookie(&self, digest: &MessageDigest) -> bool {
        let Some(Payload::Notify(notify)) = digest
            .payloads
            .iter()
            .find(|p| matches!(p, Payload::Notify(n) if n.variant == NotificationType::Status(NotifyStatusMessage::Cookie)))
        else {
            return false;
        };
        let Some(Payload::Nonce(ni)) = digest.first_outer(PayloadType::Nonce) else {
            return false;
        };
        notify.data == self.cookies.compute(digest.peer, digest.initiator_spi, ni).to_vec()
    }

    fn build_cookie_challenge(&self, digest: &MessageDigest) -> Option<Vec<u8>> {
        let Some(Payload::Nonce(ni)) = digest.first_outer(PayloadType::Nonce) else {
            return None;
        };
        let token = self.cookies.compute(digest.peer, digest.initiator_spi, ni);
        let notify = Payload::Notify(Notification {
            variant: NotificationType::Status(NotifyStatusMessage::Cookie),
            protocol: SecurityProtocol::Reserved,
            spi: None,
            data: token.to_vec(),
        });
        IKEv2 {
            initiator_spi: digest.initiator_spi,
            responder_spi: 0,
            exchange_type: ExchangeType::IkeSaInit,
            initiator: false,
            response: true,
            message_id: 0,
            payloads: vec![notify],
        }
        .try_build()
        .ok()
    }

    fn build_notify(
        &self,
        initiator_spi: u64,
        responder_spi: u64,
        exchange_type: ExchangeType,
        message_id: u32,
        code: NotifyErrorMessage,
    ) -> Option<Vec<u8>> {
        let notify = Payload::Notify(Notification {
            variant: NotificationType::Error(code),
            protocol: SecurityProtocol::Reserved,
            spi: None,
            data: vec![],
        });
        IKEv2 {
            initiator_spi,
            responder_spi,
            exchange_type,
            initiator: false,
            response: true,
            message_id,
            payloads: vec![notify],
        }
        .try_build()
        .ok()
    }

    fn no_match(&mut self, sa_serial: SaSerial, digest: &MessageDigest) -> complete::Completion {
        self.stats.dropped += 1;
        if digest.response_flag {
            return complete::Completion::none();
        }
        let NoMatchPolicy::SaferSpiless = self.no_match_policy;
        let skeyseed_available = self
            .table
            .ike_sa(sa_serial)
            .map(|sa| sa.skeyseed_available)
            .unwrap_or(false);
        let respond = skeyseed_available || digest.exchange_type == ExchangeType::IkeSaInit;
        if !respond {
            return complete::Completion::none();
        }
        // Both the pre-auth (IKE_SA_INIT only) and post-auth cases answer
        // with the same code; only whether to answer at all differs.
        let send = self.build_notify(
            digest.initiator_spi,
            digest.responder_spi,
            digest.exchange_type,
            digest.message_id,
            NotifyErrorMessage::InvalidSyntax,
        );
        complete::Completion {
            send,
            ..complete::Completion::none()
        }
    }

    /// The encrypted-payload signature tells the dispatcher which CREATE_CHILD_SA
    /// sub-flow this is (spec §4.7 step 10); resolve or create the [crate::sa::ChildSa]
    /// this exchange attaches to, or `None` for an IKE SA rekey (no CHILD SA row involved)
    fn resolve_child(&mut self, sa_serial: SaSerial, digest: &MessageDigest) -> Option<SaSerial> {
        if digest.exchange_type != ExchangeType::CreateChildSa {
            return None;
        }
        let inner = digest.encrypted.as_deref().unwrap_or(&[]);
        let has_rekey_sa = inner
            .iter()
            .any(|p| matches!(p, Payload::Notify(n) if n.variant == NotificationType::Status(NotifyStatusMessage::RekeySa)));
        let has_ke = digest
            .encrypted_payloads
            .as_ref()
            .is_some_and(|s| s.seen.contains(PayloadType::KeyExchange));
        let is_ike_rekey = has_ke && !has_rekey_sa;
        if is_ike_rekey {
            return None;
        }
        if digest.response_flag {
            return self.table.child_by_msgid(sa_serial, digest.message_id).map(|c| c.serial);
        }
        Some(self.table.insert_child_sa(sa_serial, digest.message_id, SaRole::Responder))
    }

    /// Steps 6-10: select a transition row and, for CREATE_CHILD_SA, the
    /// child it applies to; shared between [Self::dispatch_established] and [Self::resume]
    fn select_row(&mut self, sa_serial: SaSerial, digest: &MessageDigest) -> Option<(usize, Option<SaSerial>)> {
        let sa = self.table.ike_sa(sa_serial)?;
        let selected = self.transitions.select(
            sa.state,
            sa.skeyseed_available,
            digest.exchange_type,
            digest.initiator_flag,
            digest.response_flag,
            &digest.message_payloads,
            digest,
        );
        let (row_index, _) = selected?;
        let child_serial = self.resolve_child(sa_serial, digest);
        Some((row_index, child_serial))
    }

    fn dispatch_established(&mut self, sa_serial: SaSerial, mut digest: MessageDigest, total_len: u32) -> complete::Completion {
        let Some((role, busy, state, skeyseed_available, fragmentation_allowed_sa)) =
            self.table.ike_sa(sa_serial).map(|sa| (sa.role, sa.busy, sa.state, sa.skeyseed_available, sa.fragmentation_allowed))
        else {
            self.stats.dropped += 1;
            return complete::Completion::none();
        };

        // Step 3: IKE-role consistency. The I bit names the SA's original
        // initiator, not the sender, so a responder-role SA expects it set.
        let expected_initiator_flag = role == SaRole::Responder;
        if digest.initiator_flag != expected_initiator_flag {
            warn!(sa = sa_serial, "dropped message with inconsistent IKE_I flag");
            self.stats.dropped += 1;
            return complete::Completion::none();
        }

        // Step 4: busy check.
        if busy {
            self.stats.dropped += 1;
            return complete::Completion::none();
        }

        // Step 5: retransmit check, request direction only.
        if !digest.response_flag {
            let fragment_number = incoming_fragment_number(&digest);
            let outcome = self
                .table
                .ike_sa(sa_serial)
                .map(|sa| sa.msgid.on_request(digest.message_id, fragment_number))
                .unwrap_or(RequestOutcome::Drop);
            match outcome {
                RequestOutcome::Drop => {
                    self.stats.dropped += 1;
                    return complete::Completion::none();
                }
                RequestOutcome::Retransmit => {
                    self.stats.retransmitted += 1;
                    let send = self.table.ike_sa(sa_serial).and_then(|sa| sa.last_sent.clone());
                    return complete::Completion {
                        send,
                        ..complete::Completion::none()
                    };
                }
                RequestOutcome::Fresh => {}
            }
        } else {
            let outcome = self
                .table
                .ike_sa(sa_serial)
                .map(|sa| sa.msgid.on_response(digest.message_id))
                .unwrap_or(ResponseOutcome::OldDuplicate);
            if outcome != ResponseOutcome::Fresh {
                self.stats.dropped += 1;
                return complete::Completion::none();
            }
        }

        // Step 6: select a transition row from the clear payload shape.
        let Some((row_index, _)) = self.transitions.select(
            state,
            skeyseed_available,
            digest.exchange_type,
            digest.initiator_flag,
            digest.response_flag,
            &digest.message_payloads,
            &digest,
        ) else {
            return self.no_match(sa_serial, &digest);
        };
        let requires_no_skeyseed = self.transitions.row(row_index).requires_no_skeyseed;

        // Steps 7-9: fragment reassembly, decryption, encrypted-payload verification.
        if !requires_no_skeyseed {
            let has_sk = digest.message_payloads.seen.contains(PayloadType::EncryptedAndAuthenticated);
            let has_skf = digest
                .message_payloads
                .seen
                .contains(PayloadType::EncryptedAndAuthenticatedFragment);

            let reassembled = if has_skf {
                let fragment = digest.payloads.iter().find_map(|p| match p {
                    Payload::EncryptedAndAuthenticatedFragment(f) => Some(f.clone()),
                    _ => None,
                });
                let Some(fragment) = fragment else {
                    self.stats.dropped += 1;
                    return complete::Completion::none();
                };
                let outcome = match self.table.ike_sa_mut(sa_serial) {
                    Some(sa) => sa.fragments.accept(&fragment, fragmentation_allowed_sa && self.fragmentation_allowed),
                    None => return complete::Completion::none(),
                };
                match outcome {
                    Err(err) => {
                        warn!(sa = sa_serial, ?err, "rejected SKF fragment");
                        self.stats.dropped += 1;
                        return complete::Completion::none();
                    }
                    Ok(FragmentOutcome::Pending) => return complete::Completion::none(),
                    Ok(FragmentOutcome::Complete { first_payload, plaintext }) => Some((first_payload, plaintext)),
                }
            } else if has_sk {
                digest.payloads.iter().find_map(|p| match p {
                    Payload::EncryptedAndAuthenticated { first_payload, data } => Some((*first_payload, data.clone())),
                    _ => None,
                })
            } else {
                None
            };

            if let Some((first_payload, ciphertext)) = reassembled {
                let associated_data = associated_data_for(&digest, total_len, first_payload, ciphertext.len());
                let plaintext = {
                    let Some(sa) = self.table.ike_sa(sa_serial) else {
                        return complete::Completion::none();
                    };
                    self.crypto.decrypt(sa, &associated_data, &ciphertext)
                };
                let plaintext = match plaintext {
                    Ok(plaintext) => plaintext,
                    Err(_) => {
                        // Never reveal which key failed (spec §7): silent drop, no teardown.
                        self.stats.dropped += 1;
                        return complete::Completion::none();
                    }
                };
                if decode::decode_inner(&mut digest, &plaintext, first_payload).is_err() {
                    return self.encrypted_failure(sa_serial, &digest);
                }
                let row = self.transitions.row(row_index);
                let errors = verify::verify(
                    digest.encrypted_payloads.as_ref().expect("decode_inner set this"),
                    &row.expected_encrypted_payloads,
                    &digest,
                );
                if errors.is_bad() {
                    return self.encrypted_failure(sa_serial, &digest);
                }
            }
        }

        // Step 10: CREATE_CHILD_SA morphing.
        let child_serial = self.resolve_child(sa_serial, &digest);

        self.finish(sa_serial, child_serial, row_index, digest)
    }

    /// Tear down an SA whose encrypted-payload signature failed to verify or decode (spec §4.7 step 9)
    fn encrypted_failure(&mut self, sa_serial: SaSerial, digest: &MessageDigest) -> complete::Completion {
        self.stats.dropped += 1;
        let send = if !digest.response_flag {
            self.build_notify(
                digest.initiator_spi,
                digest.responder_spi,
                digest.exchange_type,
                digest.message_id,
                NotifyErrorMessage::InvalidSyntax,
            )
        } else {
            None
        };
        self.table.remove_ike_sa(sa_serial);
        self.stats.sas_destroyed += 1;
        complete::Completion {
            send,
            destroy: Some(sa_serial),
            fatal: true,
            ..complete::Completion::none()
        }
    }

    /// Steps 11-12: invoke the row's handler and hand its result to the Completion Path
    fn finish(
        &mut self,
        sa_serial: SaSerial,
        child_serial: Option<SaSerial>,
        row_index: usize,
        digest: MessageDigest,
    ) -> complete::Completion {
        let handler = self.transitions.row(row_index).handler.clone();
        let result = {
            let (ike_sa, child_sa) = self.table.ike_and_child_mut(sa_serial, child_serial);
            let Some(ike_sa) = ike_sa else {
                return complete::Completion::none();
            };
            handler.handle(ike_sa, child_sa, &digest)
        };

        self.complete_with_result(sa_serial, child_serial, row_index, digest, result)
    }

    /// Step 12: hand a [TransitionResult] (synchronous or resumed) to the Completion Path
    fn complete_with_result(
        &mut self,
        sa_serial: SaSerial,
        child_serial: Option<SaSerial>,
        row_index: usize,
        digest: MessageDigest,
        result: TransitionResult,
    ) -> complete::Completion {
        let fail_code = match &result {
            TransitionResult::Fail(code) => Some(*code),
            _ => None,
        };
        let fail_response = match fail_code {
            Some(code) if !digest.response_flag => {
                self.build_notify(digest.initiator_spi, digest.responder_spi, digest.exchange_type, digest.message_id, code)
            }
            _ => None,
        };
        let is_suspend = matches!(result, TransitionResult::Suspend);

        let completion = complete::complete(
            &mut self.table,
            &mut self.stats,
            sa_serial,
            child_serial,
            self.transitions.row(row_index),
            result,
            digest.message_id,
            digest.response_flag,
            self.dpd_configured,
            fail_response,
        );

        if is_suspend {
            if let Some(sa) = self.table.ike_sa_mut(sa_serial) {
                sa.suspended = Some(digest);
            }
        }

        completion
    }
}

/// Fragment number of the incoming message's first (or only) SKF fragment, if any
fn incoming_fragment_number(digest: &MessageDigest) -> Option<u16> {
    digest.payloads.iter().find_map(|p| match p {
        Payload::EncryptedAndAuthenticatedFragment(f) => Some(f.fragment_number),
        _ => None,
    })
}

/// Reconstruct the AEAD associated data (IKE header + SK generic payload header,
/// RFC 7296 section 5.1) from already-decoded fields rather than the raw
/// datagram, since the decoder does not retain byte offsets into it; both
/// halves are bit-exact reconstructions of what the generator would have
/// produced for the same fields.
fn associated_data_for(digest: &MessageDigest, total_len: u32, first_payload: PayloadType, plaintext_len: usize) -> Vec<u8> {
    let next_payload = digest
        .payloads
        .first()
        .map(PayloadType::from)
        .unwrap_or(PayloadType::NoNextPayload);
    let header = Header {
        initiator_spi: U64::from(digest.initiator_spi),
        responder_spi: U64::from(digest.responder_spi),
        next_payload: next_payload as u8,
        version: isakmp::v2::IKE_2_VERSION_VALUE,
        exchange_type: digest.exchange_type as u8,
        flags: (if digest.initiator_flag { 0b0000_1000 } else { 0 }) | (if digest.response_flag { 0b0010_0000 } else { 0 }),
        message_id: U32::from(digest.message_id),
        length: U32::from(total_len),
    };
    let sk_header = isakmp::GenericPayloadHeader {
        next_payload: first_payload as u8,
        reserved: 0,
        payload_length: U16::from(plaintext_len as u16 + 4),
    };
    let mut ad = Vec::with_capacity(32);
    ad.extend_from_slice(header.as_bytes());
    ad.extend_from_slice(sk_header.as_bytes());
    ad
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sa::{FiniteState, IkeSa};
    use crate::transition::{ExpectedPayloads, FlagConstraint, TimeoutEvent, TransitionRow};
    use isakmp::v2::definitions::SecurityAssociation;
    use std::sync::Arc;

    struct IdentityCrypto;

    impl IkeCrypto for IdentityCrypto {
        fn decrypt(&self, _sa: &IkeSa, _associated_data: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, crate::crypto::CryptoError> {
            Ok(ciphertext.to_vec())
        }

        fn encrypt(&self, _sa: &IkeSa, _associated_data: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, crate::crypto::CryptoError> {
            Ok(plaintext.to_vec())
        }
    }

    struct FixedCookie;

    impl CookieSecret for FixedCookie {
        fn compute(&self, _peer: SocketAddr, _initiator_spi: u64, _ni: &[u8]) -> [u8; 32] {
            [0x42; 32]
        }
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:500".parse().unwrap()
    }

    fn sa_init_row(timeout_event: TimeoutEvent) -> TransitionRow {
        TransitionRow {
            from_state: FiniteState::R0,
            next_state: FiniteState::R1,
            ike_i: FlagConstraint::Set,
            msg_r: FlagConstraint::Clear,
            send_on_success: true,
            requires_no_skeyseed: true,
            recv_exchange_type: ExchangeType::IkeSaInit,
            expected_message_payloads: ExpectedPayloads {
                required: crate::digest::PayloadTypeSet::of(&[PayloadType::Nonce]),
                optional: crate::digest::PayloadTypeSet::of(&[PayloadType::SecurityAssociation, PayloadType::KeyExchange]),
                notification: None,
            },
            expected_encrypted_payloads: ExpectedPayloads::none(),
            handler: Arc::new(crate::handler::FnHandler(|_, _, _| crate::handler::TransitionResult::Ok {
                response: Some(b"ack".to_vec()),
                emancipate: None,
            })),
            timeout_event,
        }
    }

    fn dispatcher_with(table: TransitionTable, thresholds: DosThresholds) -> Dispatcher {
        Dispatcher::new(
            table,
            thresholds,
            Box::new(IdentityCrypto),
            Box::new(FixedCookie),
            true,
            false,
            "default".into(),
        )
    }

    fn sa_init_request(initiator_spi: u64, nonce: Vec<u8>, extra: Vec<Payload>) -> Vec<u8> {
        let mut payloads = vec![Payload::Nonce(nonce)];
        payloads.extend(extra);
        IKEv2 {
            initiator_spi,
            responder_spi: 0,
            exchange_type: ExchangeType::IkeSaInit,
            initiator: true,
            response: false,
            message_id: 0,
            payloads,
        }
        .try_build()
        .unwrap()
    }

    #[test]
    fn clean_sa_init_creates_sa_and_returns_handler_response() {
        let mut table = TransitionTable::new();
        table.push(sa_init_row(TimeoutEvent::Retransmit));
        let mut dispatcher = dispatcher_with(table, DosThresholds::default());

        let buf = sa_init_request(1, vec![0xaa; 16], vec![]);
        let completion = dispatcher.dispatch(&buf, peer());

        assert_eq!(completion.send, Some(b"ack".to_vec()));
        assert_eq!(dispatcher.stats.sas_created, 1);
        let sa = dispatcher.table.by_initiator_spi(1).unwrap();
        assert_eq!(sa.state, FiniteState::R1);
    }

    #[test]
    fn soft_limit_triggers_cookie_challenge_with_no_sa_created() {
        let mut table = TransitionTable::new();
        table.push(sa_init_row(TimeoutEvent::None));
        let thresholds = DosThresholds { soft_limit: 0, hard_limit: 10 };
        let mut dispatcher = dispatcher_with(table, thresholds);

        let buf = sa_init_request(1, vec![0xaa; 16], vec![]);
        let completion = dispatcher.dispatch(&buf, peer());

        assert!(completion.send.is_some());
        assert_eq!(dispatcher.stats.cookie_challenges, 1);
        assert!(dispatcher.table.by_initiator_spi(1).is_none());
    }

    #[test]
    fn verified_cookie_admits_despite_soft_limit() {
        let mut table = TransitionTable::new();
        table.push(sa_init_row(TimeoutEvent::None));
        let thresholds = DosThresholds { soft_limit: 0, hard_limit: 10 };
        let mut dispatcher = dispatcher_with(table, thresholds);

        let ni = vec![0xaa; 16];
        let token = FixedCookie.compute(peer(), 1, &ni);
        let cookie_notify = Payload::Notify(Notification {
            variant: NotificationType::Status(NotifyStatusMessage::Cookie),
            protocol: SecurityProtocol::Reserved,
            spi: None,
            data: token.to_vec(),
        });
        let buf = sa_init_request(1, ni, vec![cookie_notify]);
        let completion = dispatcher.dispatch(&buf, peer());

        assert_eq!(completion.send, Some(b"ack".to_vec()));
        assert_eq!(dispatcher.stats.sas_created, 1);
    }

    #[test]
    fn malformed_sa_init_request_gets_a_notify_without_creating_state() {
        let mut table = TransitionTable::new();
        table.push(sa_init_row(TimeoutEvent::Retransmit));
        let mut dispatcher = dispatcher_with(table, DosThresholds::default());

        // A well-formed IKE header shaped like a fresh SA_INIT request, whose
        // sole payload is an unrecognized type with the critical bit set, so
        // the outer chain fails to decode before any SA can be created.
        let mut buf = vec![
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x07, 0xd0, // initiator SPI = 2000
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // responder SPI = 0
            0xc8, // next payload: unrecognized type 200
            0x20, // version
            0x22, // exchange type: IKE_SA_INIT (34)
            0x08, // flags: I bit set, R bit clear
            0x00, 0x00, 0x00, 0x00, // message ID = 0
            0x00, 0x00, 0x00, 0x00, // length, fixed up below
            0x00, 0x80, 0x00, 0x04, // generic header: next=none, critical bit set, length=4
        ];
        let total_len = buf.len() as u32;
        buf[24..28].copy_from_slice(&total_len.to_be_bytes());

        let completion = dispatcher.dispatch(&buf, peer());

        assert!(completion.send.is_some());
        assert_eq!(dispatcher.stats.malformed_sa_init_rejections, 1);
        assert_eq!(dispatcher.stats.sas_created, 0);
        assert!(dispatcher.table.by_initiator_spi(2000).is_none());
    }

    #[test]
    fn unrelated_undecodable_datagram_is_dropped_with_no_reply() {
        let mut table = TransitionTable::new();
        table.push(sa_init_row(TimeoutEvent::Retransmit));
        let mut dispatcher = dispatcher_with(table, DosThresholds::default());

        let completion = dispatcher.dispatch(&[0u8; 4], peer());

        assert!(completion.send.is_none());
        assert_eq!(dispatcher.stats.dropped, 1);
        assert_eq!(dispatcher.stats.malformed_sa_init_rejections, 0);
    }

    #[test]
    fn duplicate_request_after_reply_is_retransmitted_from_cache() {
        let mut table = TransitionTable::new();
        table.push(sa_init_row(TimeoutEvent::Retransmit));
        let mut dispatcher = dispatcher_with(table, DosThresholds::default());

        let buf = sa_init_request(1, vec![0xaa; 16], vec![]);
        let first = dispatcher.dispatch(&buf, peer());
        let second = dispatcher.dispatch(&buf, peer());

        assert_eq!(first.send, second.send);
        assert_eq!(dispatcher.stats.retransmitted, 1);
        assert_eq!(dispatcher.stats.sas_created, 1);
    }

    #[test]
    fn suspended_transition_resumes_and_advances_state() {
        let mut table = TransitionTable::new();
        table.push(TransitionRow {
            handler: Arc::new(crate::handler::FnHandler(|_, _, _| crate::handler::TransitionResult::Suspend)),
            ..sa_init_row(TimeoutEvent::None)
        });
        let mut dispatcher = dispatcher_with(table, DosThresholds::default());

        let buf = sa_init_request(1, vec![0xaa; 16], vec![]);
        let suspended = dispatcher.dispatch(&buf, peer());
        assert!(suspended.send.is_none());
        let serial = dispatcher.table.by_initiator_spi(1).unwrap().serial;
        assert!(dispatcher.table.ike_sa(serial).unwrap().busy);
        assert!(dispatcher.table.ike_sa(serial).unwrap().suspended.is_some());

        let resumed = dispatcher.resume(
            serial,
            TransitionResult::Ok {
                response: Some(b"resumed".to_vec()),
                emancipate: None,
            },
        );
        assert_eq!(resumed.send, Some(b"resumed".to_vec()));
        let sa = dispatcher.table.ike_sa(serial).unwrap();
        assert_eq!(sa.state, FiniteState::R1);
        assert!(!sa.busy);
        assert!(sa.suspended.is_none());
    }

    #[test]
    fn encrypted_exchange_decrypts_and_dispatches_inner_payloads() {
        let mut dispatcher = dispatcher_with(TransitionTable::new(), DosThresholds::default());
        let serial = dispatcher.table.insert_ike_sa(SaRole::Responder, 10, "default".into());
        dispatcher.table.learn_responder_spi(serial, 20);
        if let Some(sa) = dispatcher.table.ike_sa_mut(serial) {
            sa.state = FiniteState::R2;
            sa.skeyseed_available = true;
        }

        dispatcher.transitions.push(TransitionRow {
            from_state: FiniteState::R2,
            next_state: FiniteState::IkesaDel,
            ike_i: FlagConstraint::Set,
            msg_r: FlagConstraint::Clear,
            send_on_success: false,
            requires_no_skeyseed: false,
            recv_exchange_type: ExchangeType::Informational,
            expected_message_payloads: ExpectedPayloads {
                required: crate::digest::PayloadTypeSet::of(&[PayloadType::EncryptedAndAuthenticated]),
                optional: crate::digest::PayloadTypeSet::empty(),
                notification: None,
            },
            expected_encrypted_payloads: ExpectedPayloads {
                required: crate::digest::PayloadTypeSet::of(&[PayloadType::Delete]),
                optional: crate::digest::PayloadTypeSet::empty(),
                notification: None,
            },
            handler: Arc::new(crate::handler::FnHandler(|_, _, msg| {
                assert!(msg.first_inner(PayloadType::Delete).is_some());
                crate::handler::TransitionResult::Ok {
                    response: None,
                    emancipate: None,
                }
            })),
            timeout_event: TimeoutEvent::None,
        });

        let inner = IKEv2 {
            initiator_spi: 0,
            responder_spi: 0,
            exchange_type: ExchangeType::Informational,
            initiator: true,
            response: false,
            message_id: 0,
            payloads: vec![Payload::Delete(isakmp::v2::definitions::Delete {
                protocol: SecurityProtocol::InternetKeyExchange,
                spis: vec![],
            })],
        }
        .try_build()
        .unwrap();
        let plaintext = inner[28..].to_vec();
        let first_payload = PayloadType::Delete;

        let outer = IKEv2 {
            initiator_spi: 10,
            responder_spi: 20,
            exchange_type: ExchangeType::Informational,
            initiator: true,
            response: false,
            message_id: 0,
            payloads: vec![Payload::EncryptedAndAuthenticated {
                first_payload,
                data: plaintext,
            }],
        }
        .try_build()
        .unwrap();

        let completion = dispatcher.dispatch(&outer, peer());
        assert!(completion.send.is_none());
        assert!(dispatcher.table.ike_sa(serial).is_some());
    }

    #[test]
    fn resolve_child_classifies_ike_rekey_without_a_child_row() {
        let mut dispatcher = dispatcher_with(TransitionTable::new(), DosThresholds::default());
        let serial = dispatcher.table.insert_ike_sa(SaRole::Responder, 1, "default".into());

        let mut digest = bare_digest(ExchangeType::CreateChildSa);
        digest.encrypted = Some(vec![Payload::KeyExchange(isakmp::v2::definitions::KeyExchange {
            dh_group: isakmp::v2::definitions::params::KeyExchangeMethod::Modp2048,
            data: vec![],
        })]);
        let mut summary = crate::digest::PayloadSummary::empty();
        summary.seen.insert(PayloadType::KeyExchange);
        digest.encrypted_payloads = Some(summary);

        assert_eq!(dispatcher.resolve_child(serial, &digest), None);
    }

    #[test]
    fn resolve_child_creates_a_child_sa_for_a_fresh_request() {
        let mut dispatcher = dispatcher_with(TransitionTable::new(), DosThresholds::default());
        let serial = dispatcher.table.insert_ike_sa(SaRole::Responder, 1, "default".into());

        let mut digest = bare_digest(ExchangeType::CreateChildSa);
        digest.encrypted = Some(vec![Payload::SecurityAssociation(SecurityAssociation { proposals: vec![] })]);
        let mut summary = crate::digest::PayloadSummary::empty();
        summary.seen.insert(PayloadType::SecurityAssociation);
        digest.encrypted_payloads = Some(summary);

        let child = dispatcher.resolve_child(serial, &digest);
        assert!(child.is_some());
        assert_eq!(dispatcher.table.child_sa(child.unwrap()).unwrap().parent, serial);
    }

    #[test]
    fn resolve_child_looks_up_existing_child_for_a_response() {
        let mut dispatcher = dispatcher_with(TransitionTable::new(), DosThresholds::default());
        let serial = dispatcher.table.insert_ike_sa(SaRole::Initiator, 1, "default".into());
        let child = dispatcher.table.insert_child_sa(serial, 5, SaRole::Initiator);

        let mut digest = bare_digest(ExchangeType::CreateChildSa);
        digest.response_flag = true;
        digest.message_id = 5;
        digest.encrypted = Some(vec![]);
        digest.encrypted_payloads = Some(crate::digest::PayloadSummary::empty());

        assert_eq!(dispatcher.resolve_child(serial, &digest), Some(child));
    }

    fn bare_digest(exchange_type: ExchangeType) -> MessageDigest {
        MessageDigest {
            initiator_spi: 1,
            responder_spi: 2,
            exchange_type,
            initiator_flag: true,
            response_flag: false,
            message_id: 0,
            peer: peer(),
            payloads: vec![],
            message_payloads: crate::digest::PayloadSummary::empty(),
            encrypted: None,
            encrypted_payloads: None,
        }
    }

    #[test]
    fn associated_data_matches_the_generators_own_header_encoding() {
        let digest = MessageDigest {
            initiator_spi: 1337133713371337,
            responder_spi: 301030307,
            exchange_type: ExchangeType::IkeSaInit,
            initiator_flag: true,
            response_flag: false,
            message_id: 999999999,
            peer: peer(),
            payloads: vec![],
            message_payloads: crate::digest::PayloadSummary::empty(),
            encrypted: None,
            encrypted_payloads: None,
        };
        let ad = associated_data_for(&digest, 28, PayloadType::NoNextPayload, 0);
        assert_eq!(
            &ad[..28],
            &[
                0x00, 0x04, 0xc0, 0x1d, 0xb4, 0x00, 0xb0, 0xc9, // initiator
                0x00, 0x00, 0x00, 0x00, 0x11, 0xf1, 0x5b, 0xa3, // responder
                0x00, // next payload
                0x20, // version
                0x22, // exchange type
                0x08, // flags
                0x3b, 0x9a, 0xc9, 0xff, // message ID
                0x00, 0x00, 0x00, 0x1c, // length
            ]
        );
        assert_eq!(&ad[28..], &[0x00, 0x00, 0x00, 0x04]);
    }
}
