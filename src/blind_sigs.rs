use crate::dleq::{
    alice_verify_dleq, carol_verify_dleq_with, step2_bob_dleq, DleqProof,
};
use crate::error::{Error, Result};
use crate::hash_to_curve::HashToCurve;
use crate::keys::{BlindingFactor, PrivateKey, PublicKey};
use crate::utils::{blind, sign_point, unblind, utf8_secret};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The message being blind-signed. Opaque bytes.
pub type Secret = Vec<u8>;

/// `B_ = hash_to_curve(secret) + r*G`
///
/// Draws a fresh blinding factor when `r` is `None`. The returned factor
/// is needed again to unblind.
pub fn step1_alice(
    secret: &[u8],
    r: Option<BlindingFactor>,
) -> Result<(PublicKey, BlindingFactor)> {
    step1_alice_with(HashToCurve::Current, secret, r)
}

/// [`step1_alice`] over the legacy hash-to-curve mapping.
#[deprecated(note = "only for re-deriving blinded messages issued with the legacy mapping")]
pub fn step1_alice_deprecated(
    secret: &[u8],
    r: Option<BlindingFactor>,
) -> Result<(PublicKey, BlindingFactor)> {
    step1_alice_with(HashToCurve::Legacy, secret, r)
}

fn step1_alice_with(
    strategy: HashToCurve,
    secret: &[u8],
    r: Option<BlindingFactor>,
) -> Result<(PublicKey, BlindingFactor)> {
    let r = r.unwrap_or_default();
    let b_ = blind_secret(strategy, secret, &r)?;
    Ok((b_, r))
}

fn blind_secret(strategy: HashToCurve, secret: &[u8], r: &BlindingFactor) -> Result<PublicKey> {
    blind(strategy.hash_to_curve(secret)?, &r.scalar())
}

/// Signs a blinded message, `C_ = a*B_`, and proves it with a fresh DLEQ proof.
pub fn step2_bob(b_: &PublicKey, a: &PrivateKey) -> Result<(PublicKey, DleqProof)> {
    let c_ = sign_point(*b_, &a.scalar())?;
    let proof = step2_bob_dleq(b_, a)?;
    debug!(blinded_message = %b_, signer = %a.public_key(), "signed blinded message");
    Ok((c_, proof))
}

/// `C = C_ - r*A`
pub fn step3_alice(c_: &PublicKey, r: &BlindingFactor, a: &PublicKey) -> Result<PublicKey> {
    unblind(*c_, &r.scalar(), *a)
}

/// Signer-side check that `C == a*hash_to_curve(secret)`.
///
/// Needs the private key. Third parties use
/// [`carol_verify_dleq`](crate::carol_verify_dleq) instead.
pub fn verify(a: &PrivateKey, c: &PublicKey, secret: &[u8]) -> Result<bool> {
    verify_with(HashToCurve::Current, a, c, secret)
}

/// [`verify`] over the legacy hash-to-curve mapping. Never tried implicitly.
#[deprecated(note = "only for signatures issued with the legacy mapping")]
pub fn verify_deprecated(a: &PrivateKey, c: &PublicKey, secret: &[u8]) -> Result<bool> {
    verify_with(HashToCurve::Legacy, a, c, secret)
}

fn verify_with(
    strategy: HashToCurve,
    a: &PrivateKey,
    c: &PublicKey,
    secret: &[u8],
) -> Result<bool> {
    let y = strategy.hash_to_curve(secret)?;
    Ok(sign_point(y, &a.scalar())? == *c)
}

/// Represents the party that owns a Secret and
/// gets it signed without revealing it.
///
/// One Requester blinds exactly one Secret with its own blinding factor,
/// so two blinded messages never share `r` and cannot be linked.
#[derive(Clone, Debug)]
pub struct Requester {
    secret: Secret,
    blinding_factor: BlindingFactor,
    message: BlindedMessage,
}

impl Requester {
    /// Blinds `secret` under a fresh blinding factor.
    pub fn new(secret: Secret) -> Result<Self> {
        Self::with_blinding_factor(secret, BlindingFactor::new())
    }

    /// Restores a session whose blinding factor is already known.
    pub fn with_blinding_factor(secret: Secret, blinding_factor: BlindingFactor) -> Result<Self> {
        let message = blind_secret(HashToCurve::Current, &secret, &blinding_factor)?.into();
        Ok(Self {
            secret,
            blinding_factor,
            message,
        })
    }

    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    pub fn blinding_factor(&self) -> &BlindingFactor {
        &self.blinding_factor
    }

    pub fn blinded_message(&self) -> BlindedMessage {
        self.message
    }

    /// Checks the signer's DLEQ proof against this session's `B_` before
    /// anything is unblinded.
    pub fn verify_blinded_signature(
        &self,
        signed: &BlindedSignature,
        pk: &PublicKey,
    ) -> Result<()> {
        if alice_verify_dleq(
            &self.message.blinded_msg(),
            &signed.signature,
            &signed.dleq,
            pk,
        ) {
            Ok(())
        } else {
            Err(Error::ProofInvalid)
        }
    }

    pub fn unblind(&self, signed: &BlindedSignature, pk: &PublicKey) -> Result<PublicKey> {
        step3_alice(&signed.signature, &self.blinding_factor, pk)
    }

    /// Verifies the blinded signature, unblinds it and packages the result
    /// together with everything a third party needs to check the DLEQ proof.
    pub fn into_proof(self, signed: &BlindedSignature, pk: &PublicKey) -> Result<Proof> {
        self.verify_blinded_signature(signed, pk)?;
        let c = self.unblind(signed, pk)?;
        Ok(Proof {
            secret: self.secret,
            c,
            dleq: Some(ProofDleq {
                proof: signed.dleq,
                r: self.blinding_factor,
            }),
        })
    }
}

/// A blinded message `B_`. Reveals nothing about the Secret it hides.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlindedMessage {
    blinded_msg: PublicKey,
}

impl BlindedMessage {
    pub fn blinded_msg(&self) -> PublicKey {
        self.blinded_msg
    }
}

impl From<PublicKey> for BlindedMessage {
    fn from(blinded_msg: PublicKey) -> Self {
        Self { blinded_msg }
    }
}

impl TryFrom<&[u8]> for BlindedMessage {
    type Error = Error;

    fn try_from(b: &[u8]) -> Result<Self> {
        PublicKey::from_slice(b).map(Self::from)
    }
}

/// A BlindedMessage signed by the Signer, `C_ = a*B_`,
/// always paired with the DLEQ proof made alongside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlindedSignature {
    pub message: BlindedMessage,
    signature: PublicKey,
    dleq: DleqProof,
}

impl BlindedSignature {
    pub fn new(message: BlindedMessage, signature: PublicKey, dleq: DleqProof) -> Self {
        Self {
            message,
            signature,
            dleq,
        }
    }

    /// Rebuilds a signature received from the signer: `C_` as SEC1 bytes,
    /// `e` and `s` as 32 byte big-endian scalars.
    pub fn from_bytes(
        message: BlindedMessage,
        signature: &[u8],
        e: &[u8],
        s: &[u8],
    ) -> Result<Self> {
        Ok(Self::new(
            message,
            PublicKey::from_slice(signature)?,
            DleqProof::from_bytes(e, s)?,
        ))
    }

    pub fn signature_for_message(&self) -> &PublicKey {
        &self.signature
    }

    pub fn dleq(&self) -> &DleqProof {
        &self.dleq
    }
}

/// Represents the party that signs BlindedMessages
/// without learning the Secret inside.
#[derive(Clone, Debug, Default)]
pub struct Signer {
    key: PrivateKey,
}

impl Signer {
    pub fn new() -> Self {
        Self {
            key: PrivateKey::new(),
        }
    }

    pub fn public_key(&self) -> PublicKey {
        self.key.public_key()
    }

    pub fn sign(&self, message: BlindedMessage) -> Result<BlindedSignature> {
        let (signature, dleq) = step2_bob(&message.blinded_msg(), &self.key)?;
        Ok(BlindedSignature::new(message, signature, dleq))
    }

    /// Checks a redeemed Proof with the private key.
    pub fn verify_proof(&self, proof: &Proof) -> Result<()> {
        if verify(&self.key, &proof.c, &proof.secret)? {
            Ok(())
        } else {
            Err(Error::SignatureMismatch)
        }
    }
}

impl From<PrivateKey> for Signer {
    fn from(key: PrivateKey) -> Self {
        Self { key }
    }
}

/// DLEQ proof carried by a Proof, with the blinding factor needed to
/// rebuild `B_` and `C_`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofDleq {
    #[serde(flatten)]
    pub proof: DleqProof,
    pub r: BlindingFactor,
}

/// An unblinded signature over a Secret, as held by whoever owns the token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    #[serde(with = "utf8_secret")]
    pub secret: Secret,
    #[serde(rename = "C")]
    pub c: PublicKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dleq: Option<ProofDleq>,
}

impl Proof {
    /// Runs the verifier-side DLEQ check. A Proof without DLEQ data
    /// cannot be checked and yields `false`.
    pub fn verify_dleq(&self, pk: &PublicKey) -> Result<bool> {
        self.verify_dleq_with(HashToCurve::Current, pk)
    }

    /// [`Proof::verify_dleq`] for a Proof issued under an explicitly chosen
    /// hash-to-curve strategy.
    pub fn verify_dleq_with(&self, strategy: HashToCurve, pk: &PublicKey) -> Result<bool> {
        match &self.dleq {
            Some(dleq) => {
                carol_verify_dleq_with(strategy, &self.secret, &self.c, &dleq.r, &dleq.proof, pk)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dleq::carol_verify_dleq;
    use crate::hash_to_curve::hash_to_curve;
    use crate::keys::COMPRESSED_PUBLIC_KEY_LENGTH;

    const ONE: &str = "0000000000000000000000000000000000000000000000000000000000000001";

    #[test]
    fn single_signer() -> Result<()> {
        let mint = Signer::from(PrivateKey::from_bytes(b"********************************")?);

        let wallet = Requester::with_blinding_factor(
            b"I vote for mickey mouse".to_vec(),
            BlindingFactor::from_bytes(b"11111111111111111111111111111111")?,
        )?;

        let signed = mint.sign(wallet.blinded_message())?;
        let proof = wallet.into_proof(&signed, &mint.public_key())?;

        assert!(proof.verify_dleq(&mint.public_key())?);
        mint.verify_proof(&proof)?;

        Ok(())
    }

    #[test]
    fn round_trip_matches_direct_signature() -> Result<()> {
        for secret in [&b""[..], &b"test_message"[..], &[0xffu8; 100][..]] {
            let a = PrivateKey::new();

            let (b_, r) = step1_alice(secret, None)?;
            let (c_, _) = step2_bob(&b_, &a)?;
            let c = step3_alice(&c_, &r, &a.public_key())?;

            assert_eq!(c, sign_point(hash_to_curve(secret)?, &a.scalar())?);
            assert!(verify(&a, &c, secret)?);
        }
        Ok(())
    }

    #[test]
    fn known_answer_scenario() -> Result<()> {
        let a = PrivateKey::from_hex(ONE)?;
        let r = BlindingFactor::from_hex(ONE)?;
        let secret = b"test_message";

        assert_eq!(
            a.public_key().to_hex(),
            "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );

        let (b_, r) = step1_alice(secret, Some(r))?;
        let (c_, proof) = step2_bob(&b_, &a)?;
        let c = step3_alice(&c_, &r, &a.public_key())?;

        assert!(alice_verify_dleq(&b_, &c_, &proof, &a.public_key()));
        assert!(carol_verify_dleq(secret, &c, &r, &proof, &a.public_key())?);
        assert!(verify(&a, &c, secret)?);
        Ok(())
    }

    #[test]
    fn verify_rejects_wrong_key_and_secret() -> Result<()> {
        let a = PrivateKey::new();
        let (b_, r) = step1_alice(b"right", None)?;
        let (c_, _) = step2_bob(&b_, &a)?;
        let c = step3_alice(&c_, &r, &a.public_key())?;

        assert!(verify(&a, &c, b"right")?);
        assert!(!verify(&a, &c, b"wrong")?);
        assert!(!verify(&PrivateKey::new(), &c, b"right")?);
        Ok(())
    }

    #[test]
    #[allow(deprecated)]
    fn legacy_mapping_is_never_implicit() -> Result<()> {
        let a = PrivateKey::new();
        let (b_, r) = step1_alice_deprecated(b"old token", None)?;
        let (c_, _) = step2_bob(&b_, &a)?;
        let c = step3_alice(&c_, &r, &a.public_key())?;

        assert!(verify_deprecated(&a, &c, b"old token")?);
        assert!(!verify(&a, &c, b"old token")?);
        Ok(())
    }

    #[test]
    fn invalid_blinded_message_bytes() {
        let zeros = [0u8; COMPRESSED_PUBLIC_KEY_LENGTH];
        assert!(matches!(
            BlindedMessage::try_from(&zeros[..]),
            Err(Error::InvalidPoint)
        ));
    }

    #[test]
    fn signature_from_other_signer_is_rejected() -> Result<()> {
        let mint = Signer::new();
        let impostor = Signer::new();
        let wallet = Requester::new(b"secret".to_vec())?;

        let signed = impostor.sign(wallet.blinded_message())?;
        assert!(matches!(
            wallet.verify_blinded_signature(&signed, &mint.public_key()),
            Err(Error::ProofInvalid)
        ));
        assert!(matches!(
            wallet.into_proof(&signed, &mint.public_key()),
            Err(Error::ProofInvalid)
        ));
        Ok(())
    }

    #[test]
    fn tampered_proof_is_rejected() -> Result<()> {
        let mint = Signer::new();
        let wallet = Requester::new(b"spend me".to_vec())?;
        let signed = mint.sign(wallet.blinded_message())?;
        let mut proof = wallet.into_proof(&signed, &mint.public_key())?;

        proof.secret = b"spend me twice".to_vec();
        assert!(!proof.verify_dleq(&mint.public_key())?);
        assert!(matches!(
            mint.verify_proof(&proof),
            Err(Error::SignatureMismatch)
        ));

        proof.dleq = None;
        assert!(!proof.verify_dleq(&mint.public_key())?);
        Ok(())
    }

    #[test]
    fn proof_survives_json() -> Result<()> {
        let mint = Signer::new();
        let wallet = Requester::new(b"json".to_vec())?;
        let signed = mint.sign(wallet.blinded_message())?;
        let proof = wallet.into_proof(&signed, &mint.public_key())?;

        let json = serde_json::to_value(&proof).unwrap();
        for field in ["e", "s", "r"] {
            assert!(json["dleq"][field].is_string());
        }
        assert_eq!(json["C"], proof.c.to_hex());
        assert_eq!(json["secret"], "json");

        let back: Proof = serde_json::from_value(json).unwrap();
        assert_eq!(back, proof);
        assert!(back.verify_dleq(&mint.public_key())?);
        Ok(())
    }

    #[test]
    fn requesters_do_not_share_blinding_factors() -> Result<()> {
        let first = Requester::new(b"m1".to_vec())?;
        let second = Requester::new(b"m2".to_vec())?;
        assert_ne!(first.blinding_factor(), second.blinding_factor());

        // with a shared r the difference of the blinded messages would
        // equal the difference of the unblinded points
        let b_diff = first.blinded_message().blinded_msg().to_projective()
            - second.blinded_message().blinded_msg().to_projective();
        let y_diff =
            hash_to_curve(b"m1")?.to_projective() - hash_to_curve(b"m2")?.to_projective();
        assert_ne!(b_diff.to_affine(), y_diff.to_affine());
        Ok(())
    }

    #[test]
    fn signature_rebuilt_from_bytes() -> Result<()> {
        let mint = Signer::new();
        let wallet = Requester::new(b"over the wire".to_vec())?;
        let wire = wallet.blinded_message().blinded_msg().to_bytes();
        let message = BlindedMessage::try_from(&wire[..])?;

        let signed = mint.sign(message)?;
        let received = BlindedSignature::from_bytes(
            wallet.blinded_message(),
            &signed.signature_for_message().to_bytes(),
            &signed.dleq().e(),
            &signed.dleq().s(),
        )?;
        assert_eq!(received, signed);

        let proof = wallet.into_proof(&received, &mint.public_key())?;
        assert!(proof.verify_dleq(&mint.public_key())?);
        mint.verify_proof(&proof)?;

        let (e, s) = (signed.dleq().e(), signed.dleq().s());
        assert!(matches!(
            BlindedSignature::from_bytes(message, &[0u8; 33], &e, &s),
            Err(Error::InvalidPoint)
        ));
        Ok(())
    }

    #[test]
    #[allow(deprecated)]
    fn legacy_proof_checked_only_on_request() -> Result<()> {
        let a = PrivateKey::new();
        let secret = b"old token".to_vec();
        let (b_, r) = step1_alice_deprecated(&secret, None)?;
        let (c_, dleq) = step2_bob(&b_, &a)?;
        let proof = Proof {
            c: step3_alice(&c_, &r, &a.public_key())?,
            secret,
            dleq: Some(ProofDleq { proof: dleq, r }),
        };

        assert!(proof.verify_dleq_with(HashToCurve::Legacy, &a.public_key())?);
        assert!(!proof.verify_dleq(&a.public_key())?);
        Ok(())
    }

    #[test]
    fn non_utf8_secret_does_not_serialize() -> Result<()> {
        let a = PrivateKey::new();
        let secret = vec![0xff, 0xfe];
        let (b_, r) = step1_alice(&secret, None)?;
        let (c_, _) = step2_bob(&b_, &a)?;
        let proof = Proof {
            c: step3_alice(&c_, &r, &a.public_key())?,
            secret,
            dleq: None,
        };
        assert!(serde_json::to_string(&proof).is_err());
        Ok(())
    }
}
