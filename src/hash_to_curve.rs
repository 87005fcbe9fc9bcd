//! Deterministic mapping of arbitrary secrets onto secp256k1.
//!
//! Both strategies hash towards an x coordinate and try it as the even-y
//! point `0x02 || x`. Roughly half of all x coordinates lie on the curve, so
//! a point is found after a couple of attempts, and the search is capped at
//! [`MAX_ATTEMPTS`].

use crate::error::{Error, Result};
use crate::keys::PublicKey;
use sha2::{Digest, Sha256};
use tracing::trace;

/// Domain separation tag prepended to every secret by the current strategy.
pub const DOMAIN_SEPARATOR: &[u8] = b"Secp256k1_HashToCurve_Cashu_";

/// Upper bound on candidate x coordinates tried per secret.
pub const MAX_ATTEMPTS: u32 = 1 << 16;

const EVEN_Y_PREFIX: u8 = 0x02;

/// Hash-to-curve strategy.
///
/// Signatures made under one strategy never verify under the other, so the
/// caller always picks one explicitly; there is no fallback between them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HashToCurve {
    /// `SHA256(SHA256(DOMAIN_SEPARATOR || secret) || counter_le32)`
    #[default]
    Current,
    /// Pre-domain-separation variant that rehashes its own digest until a
    /// point is found. Only for checking signatures issued before the
    /// upgrade; never use it to blind new secrets.
    Legacy,
}

impl HashToCurve {
    #[allow(deprecated)]
    pub fn hash_to_curve(&self, secret: &[u8]) -> Result<PublicKey> {
        match self {
            Self::Current => hash_to_curve(secret),
            Self::Legacy => hash_to_curve_deprecated(secret),
        }
    }
}

/// Maps `secret` to a curve point `Y` using the domain-separated search.
pub fn hash_to_curve(secret: &[u8]) -> Result<PublicKey> {
    let msg_hash = Sha256::new()
        .chain_update(DOMAIN_SEPARATOR)
        .chain_update(secret)
        .finalize();

    for counter in 0..MAX_ATTEMPTS {
        let candidate = Sha256::new()
            .chain_update(msg_hash)
            .chain_update(counter.to_le_bytes())
            .finalize();
        if let Some(point) = even_y_point(&candidate) {
            trace!(attempts = counter + 1, "hash_to_curve found point");
            return Ok(point);
        }
    }

    Err(Error::HashToCurveExhausted(MAX_ATTEMPTS))
}

/// Legacy mapping: `SHA256(secret)`, then `SHA256` of the previous digest
/// until `0x02 || digest` decodes.
#[deprecated(note = "only for verifying signatures issued with the legacy mapping")]
pub fn hash_to_curve_deprecated(secret: &[u8]) -> Result<PublicKey> {
    let mut digest = Sha256::digest(secret);

    for attempt in 0..MAX_ATTEMPTS {
        if let Some(point) = even_y_point(&digest) {
            trace!(attempts = attempt + 1, "legacy hash_to_curve found point");
            return Ok(point);
        }
        digest = Sha256::digest(digest);
    }

    Err(Error::HashToCurveExhausted(MAX_ATTEMPTS))
}

fn even_y_point(x: &[u8]) -> Option<PublicKey> {
    let mut encoded = [0u8; 33];
    encoded[0] = EVEN_Y_PREFIX;
    encoded[1..].copy_from_slice(x);
    PublicKey::from_slice(&encoded).ok()
}
