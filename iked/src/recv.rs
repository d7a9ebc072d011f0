//! UDP receive task
//!
//! Grounded in the teacher's `ikebuster::lib::scan` pattern: a dedicated
//! task owns `recv_from` and forwards every datagram to the main loop over
//! an unbounded channel, rather than the older `Mutex<HashMap>`-sharing
//! style `ikebuster::recv` used before `lib.rs` settled on the channel.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tracing::{error, trace};

const MAX_DATAGRAM_SIZE: usize = 65_507;

/// One inbound datagram, tagged with the peer it arrived from
#[derive(Debug)]
pub struct Datagram {
    /// Address the datagram arrived from
    pub peer: SocketAddr,
    /// Raw datagram bytes
    pub bytes: Vec<u8>,
}

/// Receive datagrams from `socket` forever, forwarding each to `tx`
///
/// Returns once the socket itself errors or the receiver side of `tx` is
/// dropped (the event loop shutting down); a single malformed datagram is
/// still forwarded as-is, since [ike_core::decode] is the layer responsible
/// for rejecting it.
pub async fn handle_receive(socket: Arc<UdpSocket>, tx: mpsc::UnboundedSender<Datagram>) {
    let mut buf = [0u8; MAX_DATAGRAM_SIZE];
    loop {
        let (len, peer) = match socket.recv_from(&mut buf).await {
            Ok(v) => v,
            Err(err) => {
                error!("udp recv failed: {err}");
                continue;
            }
        };
        trace!(%peer, len, "received datagram");
        if tx.send(Datagram { peer, bytes: buf[..len].to_vec() }).is_err() {
            break;
        }
    }
}
