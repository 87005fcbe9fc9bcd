//! Discrete-log-equality proofs binding a signer's key to a blinded signature.
//!
//! Given `A = a*G` and `C_ = a*B_` the signer proves both share the same `a`
//! without revealing it:
//! 1. Signer picks a random nonce `k` and computes `R1 = k*G`, `R2 = k*B_`
//! 2. Challenge `e = hash_e(R1, R2, A, C_)`
//! 3. Response `s = k + e*a`
//! 4. Verifier recomputes `R1 = s*G - e*A`, `R2 = s*B_ - e*C_` and checks the
//!    challenge matches.

use crate::error::Result;
use crate::hash_to_curve::HashToCurve;
use crate::keys::{BlindingFactor, PrivateKey, PublicKey, SCALAR_LENGTH};
use crate::utils::{
    blind, hex_scalar, reblind, scalar_from_be_bytes, scalar_from_hex, scalar_to_be_bytes,
    sign_point,
};
use k256::elliptic_curve::ops::Reduce;
use k256::elliptic_curve::rand_core::CryptoRngCore;
use k256::{NonZeroScalar, ProjectivePoint, Scalar, U256};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

/// Fiat-Shamir challenge over an ordered list of points.
///
/// Each point is written as the lowercase hex of its uncompressed encoding,
/// the strings are concatenated and hashed, and the digest is reduced modulo
/// the curve order. Prover and verifiers must pass the same points in the
/// same order.
pub fn hash_e(points: &[PublicKey]) -> Scalar {
    let mut hasher = Sha256::new();
    for p in points {
        hasher.update(hex::encode(p.to_uncompressed_bytes()).as_bytes());
    }
    <Scalar as Reduce<U256>>::reduce_bytes(&hasher.finalize())
}

// Single-use proof nonce. Only constructible from a cryptographic RNG and
// consumed by value, so it cannot be supplied by a caller or reused.
struct Nonce(NonZeroScalar);

impl Nonce {
    fn random(rng: &mut impl CryptoRngCore) -> Self {
        Self(NonZeroScalar::random(rng))
    }

    fn into_scalar(self) -> Scalar {
        *self.0
    }
}

/// A DLEQ proof `(e, s)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DleqProof {
    #[serde(with = "hex_scalar")]
    e: Scalar,
    #[serde(with = "hex_scalar")]
    s: Scalar,
}

impl DleqProof {
    /// Parses `e` and `s` from 32 byte big-endian encodings.
    pub fn from_bytes(e: &[u8], s: &[u8]) -> Result<Self> {
        Ok(Self {
            e: scalar_from_be_bytes(e)?,
            s: scalar_from_be_bytes(s)?,
        })
    }

    pub fn from_hex(e: &str, s: &str) -> Result<Self> {
        Ok(Self {
            e: scalar_from_hex(e)?,
            s: scalar_from_hex(s)?,
        })
    }

    pub fn e(&self) -> [u8; SCALAR_LENGTH] {
        scalar_to_be_bytes(&self.e)
    }

    pub fn s(&self) -> [u8; SCALAR_LENGTH] {
        scalar_to_be_bytes(&self.s)
    }
}

/// Generates a proof that `C_ = a*B_` with a nonce from the OS RNG.
pub fn step2_bob_dleq(b_: &PublicKey, a: &PrivateKey) -> Result<DleqProof> {
    step2_bob_dleq_with_rng(b_, a, &mut OsRng)
}

pub fn step2_bob_dleq_with_rng(
    b_: &PublicKey,
    a: &PrivateKey,
    rng: &mut impl CryptoRngCore,
) -> Result<DleqProof> {
    let k = Nonce::random(rng).into_scalar();
    let r1 = PublicKey::from_projective(ProjectivePoint::GENERATOR * k)?;
    let r2 = sign_point(*b_, &k)?;
    let c_ = sign_point(*b_, &a.scalar())?;

    let e = hash_e(&[r1, r2, a.public_key(), c_]);
    let s = k + e * a.scalar();

    Ok(DleqProof { e, s })
}

/// Requester-side check, run on the blinded pair before unblinding.
pub fn alice_verify_dleq(
    b_: &PublicKey,
    c_: &PublicKey,
    proof: &DleqProof,
    a: &PublicKey,
) -> bool {
    let DleqProof { e, s } = *proof;
    let r1 = ProjectivePoint::GENERATOR * s - a.to_projective() * e;
    let r2 = b_.to_projective() * s - c_.to_projective() * e;

    // an identity commitment can only come from a forged proof
    let (Ok(r1), Ok(r2)) = (
        PublicKey::from_projective(r1),
        PublicKey::from_projective(r2),
    ) else {
        debug!("dleq rejected: commitment is the point at infinity");
        return false;
    };

    let valid = hash_e(&[r1, r2, *a, *c_]) == e;
    if !valid {
        debug!(signer = %a, "dleq rejected: challenge mismatch");
    }
    valid
}

/// Verifier-side check on an unblinded signature `C`.
///
/// Rebuilds `B_ = Y + r*G` and `C_ = C + r*A` from the secret and the
/// blinding factor, then runs [`alice_verify_dleq`].
pub fn carol_verify_dleq(
    secret: &[u8],
    c: &PublicKey,
    r: &BlindingFactor,
    proof: &DleqProof,
    a: &PublicKey,
) -> Result<bool> {
    carol_verify_dleq_with(HashToCurve::Current, secret, c, r, proof, a)
}

/// [`carol_verify_dleq`] for signatures issued over the legacy mapping.
/// Never tried implicitly.
#[deprecated(note = "only for proofs issued with the legacy mapping")]
pub fn carol_verify_dleq_deprecated(
    secret: &[u8],
    c: &PublicKey,
    r: &BlindingFactor,
    proof: &DleqProof,
    a: &PublicKey,
) -> Result<bool> {
    carol_verify_dleq_with(HashToCurve::Legacy, secret, c, r, proof, a)
}

/// [`carol_verify_dleq`] with an explicitly chosen hash-to-curve strategy.
pub fn carol_verify_dleq_with(
    strategy: HashToCurve,
    secret: &[u8],
    c: &PublicKey,
    r: &BlindingFactor,
    proof: &DleqProof,
    a: &PublicKey,
) -> Result<bool> {
    let y = strategy.hash_to_curve(secret)?;
    let b_ = blind(y, &r.scalar())?;
    let c_ = reblind(*c, &r.scalar(), *a)?;
    Ok(alice_verify_dleq(&b_, &c_, proof, a))
}
