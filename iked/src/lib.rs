//! # iked
//!
//! The single-threaded cooperative event loop binding `ike-core`'s Exchange
//! Dispatcher to a UDP socket: the receive task, the retransmit/replace/
//! discard timer wheel, and the glue that turns a
//! [ike_core::complete::Completion] into actual socket I/O. This is the
//! "external collaborator" layer the core's crypto/handler seams are built
//! around made concrete enough to exercise the engine end to end, not a
//! production VPN gateway: [crypto::PlaceholderCrypto] does no real
//! cryptography and the transition handlers in [transitions] do no real
//! proposal negotiation.

#![warn(missing_docs, clippy::unwrap_used, clippy::expect_used)]

pub mod config;
pub mod crypto;
mod recv;
pub mod timers;
pub mod transitions;

use crate::config::Config;
use crate::timers::{Expiry, TimerWheel};
use ike_core::complete::Completion;
use ike_core::dispatch::Dispatcher;
use ike_core::sa::SaSerial;
use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::UdpSocket;
use tokio::select;
use tokio::sync::mpsc;
use tracing::{error, info, instrument, warn};

/// Failures that can end the event loop
#[derive(Debug, Error)]
pub enum EngineError {
    /// Could not bind the listening socket
    #[error("could not bind {0}: {1}")]
    Bind(SocketAddr, #[source] io::Error),
}

/// Run the IKEv2 event loop until the receive task ends
#[instrument(skip(config), fields(listen = %config.listen))]
pub async fn run(config: Config) -> Result<(), EngineError> {
    let socket = Arc::new(
        UdpSocket::bind(config.listen)
            .await
            .map_err(|err| EngineError::Bind(config.listen, err))?,
    );
    info!("iked listening");

    let (tx, mut rx) = mpsc::unbounded_channel();
    tokio::spawn(recv::handle_receive(socket.clone(), tx));

    let mut dispatcher = Dispatcher::new(
        transitions::build(),
        config.dos.into(),
        Box::new(crypto::PlaceholderCrypto),
        Box::new(crypto::LocalSecretCookie::new(rand::random())),
        config.fragmentation_allowed,
        config.dpd_configured,
        config.default_connection.clone(),
    );
    let mut wheel = TimerWheel::new(config.retransmit);
    // Last known peer address per SA, used to address timer-triggered
    // sends; the dispatcher itself only ever sees one inbound datagram at
    // a time, so tracking "where does SA N live" across turns is the event
    // loop's job, not the core's.
    let mut peers: HashMap<SaSerial, SocketAddr> = HashMap::new();

    loop {
        select! {
            datagram = rx.recv() => {
                let Some(datagram) = datagram else {
                    info!("receive task ended, stopping event loop");
                    return Ok(());
                };
                let completion = dispatcher.dispatch(&datagram.bytes, datagram.peer);
                apply_completion(&socket, &mut wheel, &mut peers, datagram.peer, completion).await;
            }
            (sa, expiry) = wheel.next_fired() => {
                handle_expiry(&socket, &mut dispatcher, &mut wheel, &mut peers, sa, expiry).await;
            }
        }
    }
}

/// Apply the Completion Path's verdict for one just-processed datagram: send
/// whatever reply was built, (re-)arm the named timer, and forget any
/// destroyed SA's address
async fn apply_completion(
    socket: &UdpSocket,
    wheel: &mut TimerWheel,
    peers: &mut HashMap<SaSerial, SocketAddr>,
    peer: SocketAddr,
    completion: Completion,
) {
    if let Some(bytes) = &completion.send {
        send_to(socket, peer, bytes).await;
    }
    if let Some((sa, event)) = completion.timer {
        peers.insert(sa, peer);
        wheel.arm(sa, event);
    }
    if let Some(sa) = completion.destroy {
        peers.remove(&sa);
        wheel.cancel(sa);
    }
    if completion.fatal {
        error!("SA destroyed due to an internal error");
    }
    if completion.start_liveness {
        // Building and addressing an actual liveness probe needs the same
        // connection/policy and packet-encoding layer the transition
        // handlers in `transitions` intentionally stop short of; wiring a
        // real probe sender in here is the next seam a deployment fills.
        info!("liveness probing would start for this SA");
    }
}

/// React to a timer firing: retransmit, begin a replace, or discard the SA
async fn handle_expiry(
    socket: &UdpSocket,
    dispatcher: &mut Dispatcher,
    wheel: &mut TimerWheel,
    peers: &mut HashMap<SaSerial, SocketAddr>,
    sa: SaSerial,
    expiry: Expiry,
) {
    match expiry {
        Expiry::Retransmit { attempt } => {
            let Some(peer) = peers.get(&sa).copied() else {
                warn!(sa, "no known peer address for a retransmit, dropping the SA");
                dispatcher.table.remove_ike_sa(sa);
                return;
            };
            let last_sent = dispatcher.table.ike_sa(sa).and_then(|ike_sa| ike_sa.last_sent.clone());
            match last_sent {
                Some(bytes) => {
                    send_to(socket, peer, &bytes).await;
                    if !wheel.retry_retransmit(sa, attempt) {
                        warn!(sa, "retransmit budget exhausted, discarding SA");
                        dispatcher.table.remove_ike_sa(sa);
                        peers.remove(&sa);
                    }
                }
                None => {
                    peers.remove(&sa);
                }
            }
        }
        Expiry::Replace => {
            // Initiating a rekey is a connection/policy decision (what
            // proposal to offer, when) that stays behind the same seam as
            // the rest of this crate's handlers; the event loop only logs
            // that the SA's lifetime has elapsed.
            info!(sa, "SA lifetime elapsed, a rekey should be initiated");
        }
        Expiry::Discard => {
            dispatcher.table.remove_ike_sa(sa);
            peers.remove(&sa);
        }
    }
}

async fn send_to(socket: &UdpSocket, peer: SocketAddr, bytes: &[u8]) {
    if let Err(err) = socket.send_to(bytes, peer).await {
        error!(%peer, "udp send failed: {err}");
    }
}
