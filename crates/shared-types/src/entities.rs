//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Content**: [`Codec`], [`ContentId`], [`Block`]
//! - **Networking**: [`PeerId`], [`PeerAddr`]

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::ParseError;

/// A 32-byte SHA-256 digest.
pub type Hash = [u8; 32];

/// Compute the SHA-256 digest of `data`.
pub fn sha256(data: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

// =============================================================================
// CLUSTER A: CONTENT
// =============================================================================

/// Payload encoding a content identifier points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Codec {
    /// Opaque bytes.
    Raw,
    /// A linked-data node (data + named links).
    DagNode,
}

impl Codec {
    /// Multicodec code of this codec.
    pub const fn code(self) -> u8 {
        match self {
            Codec::Raw => 0x55,
            Codec::DagNode => 0x70,
        }
    }

    /// Look up a codec by its multicodec code.
    pub fn from_code(code: u8) -> Result<Self, ParseError> {
        match code {
            0x55 => Ok(Codec::Raw),
            0x70 => Ok(Codec::DagNode),
            other => Err(ParseError::UnsupportedCodec(other)),
        }
    }
}

/// Hash-derived address naming an immutable block by its content.
///
/// Binary layout: `[version=1][codec][0x12 (sha2-256)][0x20][digest; 32]`.
/// Text layout: `f` followed by the lowercase hex of the binary layout.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentId {
    codec: Codec,
    digest: Hash,
}

impl ContentId {
    /// Identifier version.
    pub const VERSION: u8 = 1;
    /// Multihash code for SHA-256.
    pub const SHA2_256: u8 = 0x12;
    /// Length of the binary form.
    pub const ENCODED_LEN: usize = 4 + 32;
    /// Multibase prefix of the text form (base16).
    const MULTIBASE_HEX: char = 'f';

    /// Derive the identifier for `data` under `codec`.
    pub fn for_data(codec: Codec, data: &[u8]) -> Self {
        Self {
            codec,
            digest: sha256(data),
        }
    }

    /// Build an identifier from an already computed digest.
    pub fn from_digest(codec: Codec, digest: Hash) -> Self {
        Self { codec, digest }
    }

    /// Codec of the addressed payload.
    pub fn codec(&self) -> Codec {
        self.codec
    }

    /// SHA-256 digest of the addressed payload.
    pub fn digest(&self) -> &Hash {
        &self.digest
    }

    /// Check that `data` hashes to this identifier.
    pub fn matches(&self, data: &[u8]) -> bool {
        sha256(data) == self.digest
    }

    /// Binary form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::ENCODED_LEN);
        out.push(Self::VERSION);
        out.push(self.codec.code());
        out.push(Self::SHA2_256);
        out.push(32);
        out.extend_from_slice(&self.digest);
        out
    }

    /// Decode the binary form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParseError> {
        if bytes.len() != Self::ENCODED_LEN {
            return Err(ParseError::InvalidContentId(format!(
                "expected {} bytes, got {}",
                Self::ENCODED_LEN,
                bytes.len()
            )));
        }
        if bytes[0] != Self::VERSION {
            return Err(ParseError::InvalidContentId(format!(
                "unsupported version {}",
                bytes[0]
            )));
        }
        let codec = Codec::from_code(bytes[1])?;
        if bytes[2] != Self::SHA2_256 || bytes[3] != 32 {
            return Err(ParseError::InvalidContentId(
                "only sha2-256 digests are supported".to_string(),
            ));
        }
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&bytes[4..]);
        Ok(Self { codec, digest })
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::MULTIBASE_HEX, hex::encode(self.to_bytes()))
    }
}

impl fmt::Debug for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentId({})", self)
    }
}

impl FromStr for ContentId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s.strip_prefix(Self::MULTIBASE_HEX).ok_or_else(|| {
            ParseError::InvalidContentId(format!("missing multibase prefix in {s:?}"))
        })?;
        let bytes = hex::decode(body).map_err(|e| ParseError::InvalidContentId(e.to_string()))?;
        Self::from_bytes(&bytes)
    }
}

/// Atomic unit of content-addressed storage.
///
/// The payload is immutable and reference counted. `Block::new` and
/// `Block::with_codec` derive the identifier; `Block::from_parts` keeps a
/// claimed identifier as-is so it can be verified by whoever persists it.
#[derive(Clone, PartialEq, Eq)]
pub struct Block {
    cid: ContentId,
    data: Arc<[u8]>,
}

impl Block {
    /// Raw block whose identifier is derived from `data`.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self::with_codec(Codec::Raw, data)
    }

    /// Block with an explicit codec; the identifier is derived from `data`.
    pub fn with_codec(codec: Codec, data: impl Into<Vec<u8>>) -> Self {
        let data: Vec<u8> = data.into();
        let data: Arc<[u8]> = data.into();
        Self {
            cid: ContentId::for_data(codec, &data),
            data,
        }
    }

    /// Block with a claimed identifier. Not verified.
    pub fn from_parts(cid: ContentId, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            cid,
            data: data.into(),
        }
    }

    /// Claimed identifier.
    pub fn cid(&self) -> &ContentId {
        &self.cid
    }

    /// Payload bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Shared handle on the payload.
    pub fn shared_data(&self) -> Arc<[u8]> {
        Arc::clone(&self.data)
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True for a zero-length payload.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Re-derive the identifier from the payload.
    ///
    /// Returns the computed identifier on mismatch.
    pub fn verify(&self) -> Result<(), ContentId> {
        let computed = ContentId::for_data(self.cid.codec(), &self.data);
        if computed == self.cid {
            Ok(())
        } else {
            Err(computed)
        }
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("cid", &self.cid)
            .field("len", &self.data.len())
            .finish()
    }
}

// =============================================================================
// CLUSTER B: NETWORKING
// =============================================================================

/// 256-bit peer identifier: SHA-256 of the peer's public key.
///
/// Equality is constant-time so peer ids can be compared against
/// untrusted input without leaking the position of the first difference.
#[allow(clippy::derived_hash_with_manual_eq)]
#[derive(Clone, Copy, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeerId([u8; 32]);

impl PartialEq for PeerId {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        let mut result = 0u8;
        for (a, b) in self.0.iter().zip(other.0.iter()) {
            result |= a ^ b;
        }
        result == 0
    }
}

impl Eq for PeerId {}

impl PeerId {
    /// Wrap raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Derive the peer id bound to `public_key`.
    pub fn from_public_key(public_key: &[u8]) -> Self {
        Self(sha256(public_key))
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Abbreviated form for log lines.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..6])
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PeerId({})", self.short())
    }
}

impl FromStr for PeerId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| ParseError::InvalidPeerId(e.to_string()))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| ParseError::InvalidPeerId(format!("expected 32 bytes in {s:?}")))?;
        Ok(Self(bytes))
    }
}

/// Multiaddr-style peer address: `/<transport>/<addr>[/p2p/<peer-id>]`.
///
/// `/ipfs/<peer-id>` is accepted as an alias of the `/p2p/` suffix.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PeerAddr {
    transport: String,
    peer: Option<PeerId>,
}

impl PeerAddr {
    /// Address without a peer id component.
    pub fn new(transport: impl Into<String>) -> Self {
        Self {
            transport: transport.into(),
            peer: None,
        }
    }

    /// Attach (or replace) the peer id component.
    pub fn with_peer(mut self, peer: PeerId) -> Self {
        self.peer = Some(peer);
        self
    }

    /// Transport part, e.g. `/memory/4001`.
    pub fn transport(&self) -> &str {
        &self.transport
    }

    /// Peer id component, if any.
    pub fn peer(&self) -> Option<&PeerId> {
        self.peer.as_ref()
    }

    /// The address with the peer id component removed.
    pub fn without_peer(&self) -> Self {
        Self::new(self.transport.clone())
    }

    /// First protocol segment (`memory` for `/memory/4001`).
    pub fn protocol(&self) -> &str {
        self.transport
            .trim_start_matches('/')
            .split('/')
            .next()
            .unwrap_or_default()
    }
}

impl fmt::Display for PeerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.peer {
            Some(peer) => write!(f, "{}/p2p/{}", self.transport, peer),
            None => f.write_str(&self.transport),
        }
    }
}

impl fmt::Debug for PeerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PeerAddr({})", self)
    }
}

impl FromStr for PeerAddr {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !s.starts_with('/') || s.len() < 2 {
            return Err(ParseError::InvalidPeerAddr(format!(
                "address must start with '/': {s:?}"
            )));
        }

        let split = s
            .rfind("/p2p/")
            .map(|i| (i, "/p2p/".len()))
            .or_else(|| s.rfind("/ipfs/").map(|i| (i, "/ipfs/".len())));

        let (transport, peer) = match split {
            Some((idx, tag_len)) => {
                let peer: PeerId = s[idx + tag_len..]
                    .parse()
                    .map_err(|e: ParseError| ParseError::InvalidPeerAddr(e.to_string()))?;
                (&s[..idx], Some(peer))
            }
            None => (s, None),
        };

        if transport.is_empty() || transport.split('/').skip(1).any(str::is_empty) {
            return Err(ParseError::InvalidPeerAddr(format!(
                "empty segment in {s:?}"
            )));
        }

        Ok(Self {
            transport: transport.to_string(),
            peer,
        })
    }
}

impl TryFrom<String> for PeerAddr {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PeerAddr> for String {
    fn from(addr: PeerAddr) -> Self {
        addr.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_id_text_round_trip() {
        let cid = ContentId::for_data(Codec::Raw, b"hello");
        let text = cid.to_string();
        assert!(text.starts_with("f01551220"));
        assert_eq!(text.parse::<ContentId>().unwrap(), cid);
    }

    #[test]
    fn test_content_id_depends_on_codec() {
        let raw = ContentId::for_data(Codec::Raw, b"same");
        let dag = ContentId::for_data(Codec::DagNode, b"same");
        assert_ne!(raw, dag);
        assert_eq!(raw.digest(), dag.digest());
    }

    #[test]
    fn test_content_id_rejects_garbage() {
        assert!("zabc".parse::<ContentId>().is_err());
        assert!("f0155".parse::<ContentId>().is_err());

        let mut bytes = vec![1, 0x99, 0x12, 0x20];
        bytes.extend_from_slice(&[0u8; 32]);
        assert!(matches!(
            ContentId::from_bytes(&bytes),
            Err(ParseError::UnsupportedCodec(0x99))
        ));
    }

    #[test]
    fn test_block_verify_detects_tampering() {
        let good = Block::new(b"payload".to_vec());
        assert!(good.verify().is_ok());

        let forged = Block::from_parts(*good.cid(), b"other".to_vec());
        let computed = forged.verify().unwrap_err();
        assert_eq!(computed, ContentId::for_data(Codec::Raw, b"other"));
    }

    #[test]
    fn test_block_shares_payload() {
        let block = Block::new(vec![1, 2, 3]);
        let copy = block.clone();
        assert!(Arc::ptr_eq(&block.shared_data(), &copy.shared_data()));
    }

    #[test]
    fn test_peer_id_text_round_trip() {
        let peer = PeerId::from_public_key(&[7u8; 32]);
        assert_eq!(peer.to_string().parse::<PeerId>().unwrap(), peer);
        assert!("abcd".parse::<PeerId>().is_err());
    }

    #[test]
    fn test_peer_addr_parse_with_peer() {
        let peer = PeerId::new([0xAB; 32]);
        let text = format!("/memory/4001/p2p/{peer}");
        let addr: PeerAddr = text.parse().unwrap();
        assert_eq!(addr.transport(), "/memory/4001");
        assert_eq!(addr.peer(), Some(&peer));
        assert_eq!(addr.protocol(), "memory");
        assert_eq!(addr.to_string(), text);
    }

    #[test]
    fn test_peer_addr_accepts_ipfs_alias() {
        let peer = PeerId::new([0x01; 32]);
        let addr: PeerAddr = format!("/ip4/127.0.0.1/tcp/4001/ipfs/{peer}").parse().unwrap();
        assert_eq!(addr.transport(), "/ip4/127.0.0.1/tcp/4001");
        assert_eq!(addr.peer(), Some(&peer));
    }

    #[test]
    fn test_peer_addr_rejects_malformed() {
        assert!("memory/1".parse::<PeerAddr>().is_err());
        assert!("/".parse::<PeerAddr>().is_err());
        assert!("/memory//1".parse::<PeerAddr>().is_err());
        assert!("/memory/1/p2p/nothex".parse::<PeerAddr>().is_err());
    }

    #[test]
    fn test_peer_addr_serde_as_string() {
        let addr: PeerAddr = "/memory/7".parse().unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"/memory/7\"");
        let back: PeerAddr = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
