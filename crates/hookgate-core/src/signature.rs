//! Payload signature verification for `X-Hub-Signature` (HMAC-SHA1) and
//! `X-Hub-Signature-256` (HMAC-SHA256).

use crate::error::{HookError, Result};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha1 = Hmac<Sha1>;
type HmacSha256 = Hmac<Sha256>;

pub const SHA1_HEADER: &str = "X-Hub-Signature";
pub const SHA256_HEADER: &str = "X-Hub-Signature-256";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Sha1,
    Sha256,
}

impl Algorithm {
    pub fn header(self) -> &'static str {
        match self {
            Algorithm::Sha1 => SHA1_HEADER,
            Algorithm::Sha256 => SHA256_HEADER,
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            Algorithm::Sha1 => "sha1",
            Algorithm::Sha256 => "sha256",
        }
    }
}

/// Hex HMAC digest of `body` under `key`.
pub fn compute(algorithm: Algorithm, key: &[u8], body: &[u8]) -> String {
    match algorithm {
        Algorithm::Sha1 => {
            let mut mac = HmacSha1::new_from_slice(key).expect("HMAC accepts keys of any length");
            mac.update(body);
            hex::encode(mac.finalize().into_bytes())
        }
        Algorithm::Sha256 => {
            let mut mac =
                HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
            mac.update(body);
            hex::encode(mac.finalize().into_bytes())
        }
    }
}

/// Header value (`<algo>=<hex>`) a sender holding `key` would attach.
pub fn sign(algorithm: Algorithm, key: &[u8], body: &[u8]) -> String {
    format!("{}={}", algorithm.prefix(), compute(algorithm, key, body))
}

/// Verify a signature header value against `body`.
///
/// `header` is `None` when the request did not carry the header at all.
pub fn verify(algorithm: Algorithm, key: &[u8], body: &[u8], header: Option<&str>) -> Result<()> {
    let name = algorithm.header();
    let value = header.ok_or(HookError::MissingSignature(name))?;
    let (prefix, digest) = value
        .split_once('=')
        .ok_or_else(|| HookError::MalformedSignature {
            header: name,
            reason: "expected '<algorithm>=<hex digest>'".into(),
        })?;
    if !prefix.eq_ignore_ascii_case(algorithm.prefix()) {
        return Err(HookError::MalformedSignature {
            header: name,
            reason: format!("unexpected algorithm '{prefix}'"),
        });
    }

    let expected = compute(algorithm, key, body);
    let supplied = digest.trim().to_ascii_lowercase();
    if bool::from(expected.as_bytes().ct_eq(supplied.as_bytes())) {
        Ok(())
    } else {
        Err(HookError::SignatureMismatch(name))
    }
}
