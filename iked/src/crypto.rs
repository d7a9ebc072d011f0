//! Placeholder implementations of the core's crypto seam
//!
//! Spec §1 scopes real AEAD/PRF/DH/signature primitives out of `ike-core`
//! entirely; this module is the minimum needed to exercise the dispatcher
//! end to end without them. Nothing here is a real cipher — swapping in an
//! actual AEAD and a keyed PRF behind [ike_core::crypto::IkeCrypto] and
//! [ike_core::crypto::CookieSecret] is the only change a real deployment
//! would need to make to this layer.

use ike_core::crypto::{CookieSecret, CryptoError, IkeCrypto};
use ike_core::sa::IkeSa;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::net::SocketAddr;

/// An `IkeCrypto` that reversibly XORs against a stream derived from the SA
/// serial, standing in for a real AEAD until keys are negotiated for real
///
/// This preserves length and is trivially invertible; it exists so the
/// dispatcher's decrypt/verify/reassemble path can be driven without a real
/// negotiated key, not to provide any confidentiality or integrity.
#[derive(Debug, Default)]
pub struct PlaceholderCrypto;

impl PlaceholderCrypto {
    fn keystream(sa: &IkeSa, len: usize) -> Vec<u8> {
        let mut hasher = DefaultHasher::new();
        sa.serial.hash(&mut hasher);
        let mut seed = hasher.finish();
        let mut out = Vec::with_capacity(len);
        while out.len() < len {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            out.extend_from_slice(&seed.to_le_bytes());
        }
        out.truncate(len);
        out
    }
}

impl IkeCrypto for PlaceholderCrypto {
    fn decrypt(&self, sa: &IkeSa, _associated_data: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if !sa.skeyseed_available {
            return Err(CryptoError::KeysUnavailable);
        }
        let ks = Self::keystream(sa, ciphertext.len());
        Ok(ciphertext.iter().zip(ks).map(|(c, k)| c ^ k).collect())
    }

    fn encrypt(&self, sa: &IkeSa, _associated_data: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if !sa.skeyseed_available {
            return Err(CryptoError::KeysUnavailable);
        }
        let ks = Self::keystream(sa, plaintext.len());
        Ok(plaintext.iter().zip(ks).map(|(p, k)| p ^ k).collect())
    }
}

/// A `CookieSecret` keyed by a process-local value, rotated by restarting `iked`
///
/// A production deployment would rotate this on a timer and zero it on
/// drop; out of scope here per the same §1 boundary as [PlaceholderCrypto].
pub struct LocalSecretCookie {
    secret: u64,
}

impl LocalSecretCookie {
    /// Build a cookie secret from caller-supplied entropy (e.g. `rand::random()`)
    pub fn new(secret: u64) -> Self {
        Self { secret }
    }
}

impl CookieSecret for LocalSecretCookie {
    fn compute(&self, peer: SocketAddr, initiator_spi: u64, ni: &[u8]) -> [u8; 32] {
        let mut hasher = DefaultHasher::new();
        self.secret.hash(&mut hasher);
        peer.hash(&mut hasher);
        initiator_spi.hash(&mut hasher);
        ni.hash(&mut hasher);
        let half = hasher.finish().to_le_bytes();
        let mut token = [0u8; 32];
        for (i, chunk) in token.chunks_mut(8).enumerate() {
            let mut h = DefaultHasher::new();
            (i as u64).hash(&mut h);
            half.hash(&mut h);
            chunk.copy_from_slice(&h.finish().to_le_bytes());
        }
        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ike_core::sa::SaRole;

    #[test]
    fn decrypt_undoes_encrypt() {
        let crypto = PlaceholderCrypto;
        let mut sa = IkeSa::new(1, SaRole::Responder, 7, "default".into());
        sa.skeyseed_available = true;
        let plaintext = b"hello ike".to_vec();
        let ciphertext = crypto.encrypt(&sa, b"ad", &plaintext).unwrap();
        assert_ne!(ciphertext, plaintext);
        let roundtrip = crypto.decrypt(&sa, b"ad", &ciphertext).unwrap();
        assert_eq!(roundtrip, plaintext);
    }

    #[test]
    fn keys_unavailable_before_skeyseed() {
        let crypto = PlaceholderCrypto;
        let sa = IkeSa::new(1, SaRole::Responder, 7, "default".into());
        assert_eq!(crypto.encrypt(&sa, b"ad", b"x").unwrap_err(), CryptoError::KeysUnavailable);
    }

    #[test]
    fn cookie_is_stable_for_the_same_inputs() {
        let cookies = LocalSecretCookie::new(42);
        let peer: SocketAddr = "127.0.0.1:500".parse().unwrap();
        let a = cookies.compute(peer, 1, b"ni");
        let b = cookies.compute(peer, 1, b"ni");
        assert_eq!(a, b);
        let c = cookies.compute(peer, 2, b"ni");
        assert_ne!(a, c);
    }
}
