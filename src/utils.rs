use crate::error::{Error, Result};
use crate::keys::{PublicKey, SCALAR_LENGTH};
use k256::{FieldBytes, NonZeroScalar, ProjectivePoint, Scalar};

// Parses a 32 byte big-endian scalar, rejecting zero and values >= n.
pub(crate) fn scalar_from_be_bytes(bytes: &[u8]) -> Result<Scalar> {
    let bytes: [u8; SCALAR_LENGTH] = bytes.try_into()?;
    Option::<NonZeroScalar>::from(NonZeroScalar::from_repr(FieldBytes::from(bytes)))
        .map(|s| *s)
        .ok_or(Error::InvalidScalar)
}

pub(crate) fn scalar_to_be_bytes(s: &Scalar) -> [u8; SCALAR_LENGTH] {
    s.to_bytes().into()
}

pub(crate) fn scalar_from_hex(hex: &str) -> Result<Scalar> {
    scalar_from_be_bytes(&hex::decode(hex)?)
}

// B_ = Y + r*G
pub(crate) fn blind(y: PublicKey, r: &Scalar) -> Result<PublicKey> {
    PublicKey::from_projective(y.to_projective() + ProjectivePoint::GENERATOR * r)
}

// C = C_ - r*A
pub(crate) fn unblind(c_: PublicKey, r: &Scalar, a: PublicKey) -> Result<PublicKey> {
    PublicKey::from_projective(c_.to_projective() - a.to_projective() * r)
}

// C_ = C + r*A, the inverse of `unblind`
pub(crate) fn reblind(c: PublicKey, r: &Scalar, a: PublicKey) -> Result<PublicKey> {
    PublicKey::from_projective(c.to_projective() + a.to_projective() * r)
}

// Multiplying by a non-zero scalar keeps a point off the identity
// since the group has prime order.
pub(crate) fn sign_point(p: PublicKey, a: &Scalar) -> Result<PublicKey> {
    PublicKey::from_projective(p.to_projective() * a)
}

/// Serde adapter writing a scalar as 64 lowercase hex characters.
pub(crate) mod hex_scalar {
    use super::*;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        s: &Scalar,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(scalar_to_be_bytes(s)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Scalar, D::Error> {
        let hex = String::deserialize(deserializer)?;
        scalar_from_hex(&hex).map_err(D::Error::custom)
    }
}

/// Serde adapter writing a secret as a UTF-8 string. Secrets that are not
/// valid UTF-8 cannot be serialized.
pub(crate) mod utf8_secret {
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        secret: &[u8],
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        let text = std::str::from_utf8(secret).map_err(S::Error::custom)?;
        serializer.serialize_str(text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Vec<u8>, D::Error> {
        String::deserialize(deserializer).map(String::into_bytes)
    }
}
