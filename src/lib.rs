//! Blind Diffie-Hellman key exchange (BDHKE) over secp256k1.
//!
//! A requester blinds a secret, a signer signs the blinded point and proves
//! with a DLEQ proof which key it used, and the requester unblinds the
//! result into a signature over the original secret.

mod blind_sigs;
mod dleq;
mod error;
mod hash_to_curve;
mod keys;
mod utils;

#[allow(deprecated)]
pub use crate::blind_sigs::{
    step1_alice, step1_alice_deprecated, step2_bob, step3_alice, verify, verify_deprecated,
    BlindedMessage, BlindedSignature, Proof, ProofDleq, Requester, Secret, Signer,
};
#[allow(deprecated)]
pub use crate::dleq::{
    alice_verify_dleq, carol_verify_dleq, carol_verify_dleq_deprecated, carol_verify_dleq_with,
    hash_e, step2_bob_dleq, step2_bob_dleq_with_rng, DleqProof,
};
pub use crate::error::{BlindSignatureError, Error, Result};
#[allow(deprecated)]
pub use crate::hash_to_curve::{
    hash_to_curve, hash_to_curve_deprecated, HashToCurve, DOMAIN_SEPARATOR, MAX_ATTEMPTS,
};
pub use crate::keys::{
    BlindingFactor, PrivateKey, PublicKey, COMPRESSED_PUBLIC_KEY_LENGTH, SCALAR_LENGTH,
    UNCOMPRESSED_PUBLIC_KEY_LENGTH,
};
