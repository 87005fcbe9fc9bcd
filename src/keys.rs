use crate::error::{Error, Result};
use k256::elliptic_curve::rand_core::CryptoRngCore;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{FieldBytes, ProjectivePoint, Scalar, SecretKey};
use rand::rngs::OsRng;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::Zeroizing;

/// Length of a compressed SEC1 point.
pub const COMPRESSED_PUBLIC_KEY_LENGTH: usize = 33;
/// Length of an uncompressed SEC1 point.
pub const UNCOMPRESSED_PUBLIC_KEY_LENGTH: usize = 65;
/// Length of a big-endian scalar.
pub const SCALAR_LENGTH: usize = 32;

/// A secp256k1 point that is never the point at infinity.
///
/// Used for public keys as well as every intermediate point of the
/// protocol (`Y`, `B_`, `C_`, `C`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKey(k256::PublicKey);

impl PublicKey {
    /// Parses a compressed (33 byte) or uncompressed (65 byte) SEC1 encoding.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        k256::PublicKey::from_sec1_bytes(bytes)
            .map(Self)
            .map_err(|_| Error::InvalidPoint)
    }

    pub fn from_hex(hex: &str) -> Result<Self> {
        Self::from_slice(&hex::decode(hex)?)
    }

    /// Compressed SEC1 encoding, the default wire form.
    pub fn to_bytes(&self) -> [u8; COMPRESSED_PUBLIC_KEY_LENGTH] {
        let mut bytes = [0u8; COMPRESSED_PUBLIC_KEY_LENGTH];
        bytes.copy_from_slice(self.0.to_encoded_point(true).as_bytes());
        bytes
    }

    pub fn to_uncompressed_bytes(&self) -> [u8; UNCOMPRESSED_PUBLIC_KEY_LENGTH] {
        let mut bytes = [0u8; UNCOMPRESSED_PUBLIC_KEY_LENGTH];
        bytes.copy_from_slice(self.0.to_encoded_point(false).as_bytes());
        bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub(crate) fn from_projective(point: ProjectivePoint) -> Result<Self> {
        k256::PublicKey::from_affine(point.to_affine())
            .map(Self)
            .map_err(|_| Error::InvalidPoint)
    }

    pub(crate) fn to_projective(self) -> ProjectivePoint {
        self.0.to_projective()
    }
}

impl TryFrom<&[u8]> for PublicKey {
    type Error = Error;

    fn try_from(b: &[u8]) -> Result<Self> {
        Self::from_slice(b)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(D::Error::custom)
    }
}

/// A non-zero scalar below the curve order together with its public key.
///
/// The public key is derived once at construction and never changes.
#[derive(Clone)]
pub struct PrivateKey {
    secret: SecretKey,
    public_key: PublicKey,
}

impl PrivateKey {
    /// Draws a fresh key from the operating system RNG.
    pub fn new() -> Self {
        Self::random(&mut OsRng)
    }

    pub fn random(rng: &mut impl CryptoRngCore) -> Self {
        Self::from(SecretKey::random(rng))
    }

    /// Parses a 32 byte big-endian scalar. Zero and values at or above the
    /// curve order are rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; SCALAR_LENGTH] = bytes.try_into()?;
        let secret =
            SecretKey::from_bytes(&FieldBytes::from(bytes)).map_err(|_| Error::InvalidScalar)?;
        Ok(Self::from(secret))
    }

    pub fn from_hex(hex: &str) -> Result<Self> {
        let bytes = Zeroizing::new(hex::decode(hex)?);
        Self::from_bytes(&bytes)
    }

    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }

    pub fn to_bytes(&self) -> [u8; SCALAR_LENGTH] {
        self.secret.to_bytes().into()
    }

    pub fn to_hex(&self) -> String {
        let bytes = Zeroizing::new(self.to_bytes());
        hex::encode(&*bytes)
    }

    pub(crate) fn scalar(&self) -> Scalar {
        *self.secret.to_nonzero_scalar()
    }
}

impl Default for PrivateKey {
    fn default() -> Self {
        Self::new()
    }
}

impl From<SecretKey> for PrivateKey {
    fn from(secret: SecretKey) -> Self {
        let public_key = PublicKey(secret.public_key());
        Self { secret, public_key }
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.secret == other.secret
    }
}

impl Eq for PrivateKey {}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

/// The requester's per-session blinding scalar `r`.
///
/// Fresh values come from a cryptographic RNG. `from_bytes` exists for
/// restoring a session (e.g. deterministic wallet recovery) and must never
/// be fed a value that was already used for another secret.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlindingFactor(PrivateKey);

impl BlindingFactor {
    pub fn new() -> Self {
        Self(PrivateKey::new())
    }

    pub fn random(rng: &mut impl CryptoRngCore) -> Self {
        Self(PrivateKey::random(rng))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        PrivateKey::from_bytes(bytes).map(Self)
    }

    pub fn from_hex(hex: &str) -> Result<Self> {
        PrivateKey::from_hex(hex).map(Self)
    }

    /// `r·G`
    pub fn public_key(&self) -> PublicKey {
        self.0.public_key()
    }

    pub fn to_bytes(&self) -> [u8; SCALAR_LENGTH] {
        self.0.to_bytes()
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }

    pub(crate) fn scalar(&self) -> Scalar {
        self.0.scalar()
    }
}

impl From<PrivateKey> for BlindingFactor {
    fn from(key: PrivateKey) -> Self {
        Self(key)
    }
}

impl Serialize for BlindingFactor {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for BlindingFactor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let hex = Zeroizing::new(String::deserialize(deserializer)?);
        Self::from_hex(&hex).map_err(D::Error::custom)
    }
}
