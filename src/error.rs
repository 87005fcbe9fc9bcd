use std::array::TryFromSliceError;
use thiserror::Error;

/// Specialisation of `std::Result`.
pub type Result<T, E = BlindSignatureError> = std::result::Result<T, E>;
pub type Error = BlindSignatureError;

#[derive(Error, Debug)]
/// error variants.
pub enum BlindSignatureError {
    #[error("bytes do not encode a valid secp256k1 point")]
    InvalidPoint,

    #[error("bytes do not encode a non-zero scalar below the curve order")]
    InvalidScalar,

    #[error("no curve point found after {0} hash-to-curve attempts")]
    HashToCurveExhausted(u32),

    #[error("DLEQ proof does not verify")]
    ProofInvalid,

    #[error("signature does not match secret")]
    SignatureMismatch,

    #[error("deserialization from bytes failed")]
    InvalidBytes(#[from] TryFromSliceError),

    #[error("hex decoding failed")]
    Hex(#[from] hex::FromHexError),
}
