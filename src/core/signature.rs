//! HMAC signature checks for a single candidate key.
//!
//! Maps the header `alg` onto an HMAC-SHA2 variant and verifies a
//! token's signature bytes against a candidate secret. Comparison goes
//! through [`Mac::verify_slice`], which is constant-time.

use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};

type HmacSha256 = Hmac<Sha256>;
type HmacSha384 = Hmac<Sha384>;
type HmacSha512 = Hmac<Sha512>;

/// Prefix shared by every symmetric (HMAC) JWS algorithm name.
pub const HMAC_PREFIX: &str = "HS";

/// The HMAC-SHA2 algorithms a token can be verified with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HmacAlgorithm {
    Hs256,
    Hs384,
    Hs512,
}

/// How the header `alg` relates to the HMAC family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmFamily {
    /// A supported HMAC variant.
    Hmac(HmacAlgorithm),
    /// `HS`-prefixed, but not a variant this crate can compute.
    UnsupportedHmac,
    /// Anything else: asymmetric, `none`, or unknown.
    NonSymmetric,
}

impl HmacAlgorithm {
    /// Exact, case-sensitive lookup; no algorithm substitution.
    pub fn from_name(alg: &str) -> Option<Self> {
        match alg {
            "HS256" => Some(Self::Hs256),
            "HS384" => Some(Self::Hs384),
            "HS512" => Some(Self::Hs512),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Hs256 => "HS256",
            Self::Hs384 => "HS384",
            Self::Hs512 => "HS512",
        }
    }

    /// Signature length in bytes.
    pub fn output_len(self) -> usize {
        match self {
            Self::Hs256 => 32,
            Self::Hs384 => 48,
            Self::Hs512 => 64,
        }
    }

    /// Check `signature` over `signing_input` using `secret` as the key.
    ///
    /// Returns `true` only for an exact match.
    pub fn verify(self, signing_input: &[u8], signature: &[u8], secret: &[u8]) -> bool {
        match self {
            Self::Hs256 => verify_with::<HmacSha256>(signing_input, signature, secret),
            Self::Hs384 => verify_with::<HmacSha384>(signing_input, signature, secret),
            Self::Hs512 => verify_with::<HmacSha512>(signing_input, signature, secret),
        }
    }

    /// Compute the raw HMAC tag. Used to mint fixtures in tests.
    pub fn sign(self, signing_input: &[u8], secret: &[u8]) -> Vec<u8> {
        match self {
            Self::Hs256 => sign_with::<HmacSha256>(signing_input, secret),
            Self::Hs384 => sign_with::<HmacSha384>(signing_input, secret),
            Self::Hs512 => sign_with::<HmacSha512>(signing_input, secret),
        }
    }
}

/// Classify a header `alg` value by algorithm family.
pub fn classify(alg: &str) -> AlgorithmFamily {
    match HmacAlgorithm::from_name(alg) {
        Some(hmac) => AlgorithmFamily::Hmac(hmac),
        None if alg.starts_with(HMAC_PREFIX) => AlgorithmFamily::UnsupportedHmac,
        None => AlgorithmFamily::NonSymmetric,
    }
}

fn verify_with<M: Mac + hmac::digest::KeyInit>(
    signing_input: &[u8],
    signature: &[u8],
    secret: &[u8],
) -> bool {
    // HMAC accepts keys of any length, so this never fails in practice.
    let Ok(mut mac) = <M as Mac>::new_from_slice(secret) else {
        return false;
    };
    mac.update(signing_input);
    mac.verify_slice(signature).is_ok()
}

fn sign_with<M: Mac + hmac::digest::KeyInit>(signing_input: &[u8], secret: &[u8]) -> Vec<u8> {
    match <M as Mac>::new_from_slice(secret) {
        Ok(mut mac) => {
            mac.update(signing_input);
            mac.finalize().into_bytes().to_vec()
        }
        Err(_) => Vec::new(),
    }
}
