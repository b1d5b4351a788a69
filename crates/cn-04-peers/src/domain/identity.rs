//! # Peer Identity
//!
//! Ed25519 keypair plus the derived peer id.
//!
//! `bits` sizes the entropy drawn from the OS: `bits / 8` random bytes are
//! hashed down to the 32-byte secret seed. Entropy and seed buffers are
//! zeroized when dropped.

use std::fmt;

use cn_01_repository::IdentityRecord;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use rand::RngCore;
use shared_types::{sha256, PeerId};
use zeroize::Zeroizing;

use super::errors::PeerError;

/// Key size used when init is not given one.
pub const DEFAULT_KEY_BITS: u32 = 2048;

/// Smallest accepted key size.
pub const MIN_KEY_BITS: u32 = 256;

/// Largest accepted key size.
pub const MAX_KEY_BITS: u32 = 16384;

/// The node's keypair.
pub struct PeerIdentity {
    signing_key: SigningKey,
    peer_id: PeerId,
    key_bits: u32,
}

impl PeerIdentity {
    /// Fresh identity from `bits` of OS entropy. CPU-bound for large sizes.
    pub fn generate(bits: u32) -> Result<Self, PeerError> {
        if !(MIN_KEY_BITS..=MAX_KEY_BITS).contains(&bits) || bits % 8 != 0 {
            return Err(PeerError::InvalidKeySize {
                bits,
                min: MIN_KEY_BITS,
                max: MAX_KEY_BITS,
            });
        }
        let mut entropy = Zeroizing::new(vec![0u8; (bits / 8) as usize]);
        OsRng.fill_bytes(&mut entropy);
        let seed = Zeroizing::new(sha256(&entropy));
        Ok(Self::from_seed(&seed, bits))
    }

    /// Identity for a known 32-byte seed.
    pub fn from_seed(seed: &[u8; 32], key_bits: u32) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        let peer_id = PeerId::from_public_key(signing_key.verifying_key().as_bytes());
        Self {
            signing_key,
            peer_id,
            key_bits,
        }
    }

    /// Rebuild from a persisted record, checking the stored peer id.
    pub fn from_record(record: &IdentityRecord) -> Result<Self, PeerError> {
        let raw = Zeroizing::new(
            hex::decode(&record.priv_key)
                .map_err(|e| PeerError::IdentityCorrupt(format!("private key: {e}")))?,
        );
        let seed: Zeroizing<[u8; 32]> = Zeroizing::new(
            raw.as_slice()
                .try_into()
                .map_err(|_| PeerError::IdentityCorrupt("private key must be 32 bytes".into()))?,
        );
        let identity = Self::from_seed(&seed, record.key_bits);

        let stored: PeerId = record
            .peer_id
            .parse()
            .map_err(|e| PeerError::IdentityCorrupt(format!("peer id: {e}")))?;
        if stored != identity.peer_id {
            return Err(PeerError::IdentityCorrupt(format!(
                "peer id {} does not match key (derived {})",
                stored.short(),
                identity.peer_id.short()
            )));
        }
        Ok(identity)
    }

    /// Record for persistence inside the config document.
    pub fn to_record(&self) -> IdentityRecord {
        let seed = Zeroizing::new(self.signing_key.to_bytes());
        IdentityRecord {
            peer_id: self.peer_id.to_string(),
            priv_key: hex::encode(seed.as_slice()),
            key_bits: self.key_bits,
        }
    }

    pub fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    pub fn key_bits(&self) -> u32 {
        self.key_bits
    }

    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }

    /// Check `signature` over `message` against `public_key`.
    pub fn verify(
        public_key: &[u8; 32],
        message: &[u8],
        signature: &[u8; 64],
    ) -> Result<(), PeerError> {
        let key = VerifyingKey::from_bytes(public_key).map_err(|_| PeerError::InvalidPublicKey)?;
        key.verify(message, &Signature::from_bytes(signature))
            .map_err(|_| PeerError::BadSignature)
    }
}

impl fmt::Debug for PeerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeerIdentity")
            .field("peer_id", &self.peer_id)
            .field("key_bits", &self.key_bits)
            .finish()
    }
}
