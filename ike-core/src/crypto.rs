//! Cryptographic and cookie-derivation interfaces consumed by the dispatcher
//!
//! Spec §1 scopes AEAD/PRF/DH/integrity primitives out of this core entirely;
//! §6 lists the "Cryptographic interface (consumed)" this crate drives
//! without implementing. These two traits are the seam: real key material,
//! DH exponentiation, and MAC/signature verification live behind them.

use crate::sa::IkeSa;
use std::net::SocketAddr;
use thiserror::Error;

/// Failure reported by an [IkeCrypto] implementation
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CryptoError {
    /// AEAD integrity check failed; per spec §7 this must be a silent drop,
    /// never a peer-visible notification (never reveal which key failed)
    #[error("integrity check failed")]
    AuthenticationFailed,
    /// SKEYSEED has not been derived yet for this SA
    #[error("keys not yet available for this SA")]
    KeysUnavailable,
}

/// AEAD encrypt/decrypt for the SK/SKF payload body, consumed by the dispatcher
///
/// Associated data is the IKE header plus the SK payload's own generic
/// header, per RFC 7296 section 5.1; the dispatcher assembles it from the
/// raw datagram bytes it already holds rather than asking this trait to.
pub trait IkeCrypto {
    /// Authenticated-decrypt `ciphertext`, returning the plaintext payload chain bytes
    fn decrypt(&self, sa: &IkeSa, associated_data: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Authenticated-encrypt `plaintext` for inclusion in an outbound SK payload
    fn encrypt(&self, sa: &IkeSa, associated_data: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError>;
}

/// Derives the stateless DoS cookie token (spec §4.7 step 2, §7)
///
/// `(peer-ip, peer-SPIi, Ni, local-secret)` in, a fixed-size token out; the
/// local secret and its rotation schedule are this trait's business, not
/// the dispatcher's.
pub trait CookieSecret {
    /// Compute the 32-byte cookie token for one SA_INIT request
    fn compute(&self, peer: SocketAddr, initiator_spi: u64, ni: &[u8]) -> [u8; 32];
}
