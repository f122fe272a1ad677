//! ECDSA P-256 signing via `ring::signature`.
//!
//! Peers reject signatures whose `s` lies in the upper half of the curve order,
//! so every signature is normalized to low-S before it leaves this module.

use ring::rand::SystemRandom;
use ring::signature::{EcdsaKeyPair, KeyPair, ECDSA_P256_SHA256_ASN1_SIGNING};
use shard_core::{LedgerError, Result};

/// Order of the P-256 group, big-endian.
const P256_ORDER: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xbc, 0xe6, 0xfa, 0xad, 0xa7, 0x17, 0x9e, 0x84, 0xf3, 0xb9, 0xca, 0xc2, 0xfc, 0x63, 0x25, 0x51,
];

/// Half of [`P256_ORDER`], rounded down.
const P256_HALF_ORDER: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0x80, 0x00, 0x00, 0x00, 0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xde, 0x73, 0x7d, 0x56, 0xd3, 0x8b, 0xcf, 0x42, 0x79, 0xdc, 0xe5, 0x61, 0x7e, 0x31, 0x92, 0xa8,
];

/// Signs messages with a PKCS#8 P-256 private key.
pub struct Signer {
    key_pair: EcdsaKeyPair,
    rng: SystemRandom,
}

impl Signer {
    /// Load a signer from a PEM encoded PKCS#8 private key
    pub fn from_pkcs8_pem(pem_text: &str) -> Result<Self> {
        let parsed = pem::parse(pem_text)
            .map_err(|e| LedgerError::Credential(format!("private key is not valid PEM: {e}")))?;

        if parsed.tag() != "PRIVATE KEY" {
            return Err(LedgerError::Credential(format!(
                "expected a PKCS#8 PRIVATE KEY block, found {}",
                parsed.tag()
            )));
        }

        Self::from_pkcs8_der(parsed.contents())
    }

    /// Load a signer from DER encoded PKCS#8 bytes
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self> {
        let rng = SystemRandom::new();
        let key_pair = EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, der, &rng)
            .map_err(|e| LedgerError::Credential(format!("unsupported private key: {e}")))?;

        Ok(Self { key_pair, rng })
    }

    /// Sign a message, returning an ASN.1 DER signature with low-S
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        let signature = self
            .key_pair
            .sign(&self.rng, message)
            .map_err(|_| LedgerError::Credential("signing failed".to_string()))?;

        normalize_low_s(signature.as_ref())
    }

    /// Uncompressed public key point
    #[must_use]
    pub fn public_key(&self) -> &[u8] {
        self.key_pair.public_key().as_ref()
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("public_key", &hex::encode(self.public_key()))
            .finish_non_exhaustive()
    }
}

/// Rewrite `s` as `n - s` when it is above half the group order.
fn normalize_low_s(der: &[u8]) -> Result<Vec<u8>> {
    let (r, s) = parse_der_signature(der)?;
    let s = to_fixed(s)?;

    if s > P256_HALF_ORDER {
        let low = sub_be(&P256_ORDER, &s);
        Ok(encode_der_signature(r, &low))
    } else {
        Ok(der.to_vec())
    }
}

fn malformed() -> LedgerError {
    LedgerError::Credential("malformed ECDSA signature".to_string())
}

/// Split a DER `SEQUENCE { INTEGER r, INTEGER s }` into its integers.
fn parse_der_signature(der: &[u8]) -> Result<(&[u8], &[u8])> {
    match der {
        [0x30, len, body @ ..] if usize::from(*len) == body.len() => {
            let (r, rest) = read_integer(body)?;
            let (s, rest) = read_integer(rest)?;
            if rest.is_empty() {
                Ok((r, s))
            } else {
                Err(malformed())
            }
        }
        _ => Err(malformed()),
    }
}

fn read_integer(input: &[u8]) -> Result<(&[u8], &[u8])> {
    match input {
        [0x02, len, rest @ ..] if usize::from(*len) <= rest.len() => {
            Ok(rest.split_at(usize::from(*len)))
        }
        _ => Err(malformed()),
    }
}

/// Left-pad an unsigned big-endian integer to 32 bytes.
fn to_fixed(value: &[u8]) -> Result<[u8; 32]> {
    let start = value.iter().position(|b| *b != 0).unwrap_or(value.len());
    let digits = &value[start..];
    if digits.len() > 32 {
        return Err(malformed());
    }

    let mut out = [0u8; 32];
    out[32 - digits.len()..].copy_from_slice(digits);
    Ok(out)
}

/// `a - b` for big-endian 256-bit integers with `a >= b`.
fn sub_be(a: &[u8; 32], b: &[u8; 32]) -> [u8; 32] {
    let mut out = [0u8; 32];
    let mut borrow = 0i16;
    for i in (0..32).rev() {
        let mut diff = i16::from(a[i]) - i16::from(b[i]) - borrow;
        borrow = i16::from(diff < 0);
        if diff < 0 {
            diff += 256;
        }
        out[i] = u8::try_from(diff).unwrap_or_default();
    }
    out
}

fn encode_integer(out: &mut Vec<u8>, value: &[u8]) {
    let start = value.iter().position(|b| *b != 0).unwrap_or(value.len() - 1);
    let digits = &value[start..];
    let pad = digits[0] & 0x80 != 0;

    out.push(0x02);
    out.push(u8::try_from(digits.len() + usize::from(pad)).unwrap_or(u8::MAX));
    if pad {
        out.push(0);
    }
    out.extend_from_slice(digits);
}

fn encode_der_signature(r: &[u8], s: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(72);
    encode_integer(&mut body, r);
    encode_integer(&mut body, s);

    let mut out = Vec::with_capacity(body.len() + 2);
    out.push(0x30);
    out.push(u8::try_from(body.len()).unwrap_or(u8::MAX));
    out.extend(body);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_key_pem;
    use ring::signature::{UnparsedPublicKey, ECDSA_P256_SHA256_ASN1};

    #[test]
    fn test_signatures_verify_and_are_low_s() {
        let signer = Signer::from_pkcs8_pem(&test_key_pem()).unwrap();
        let verifier = UnparsedPublicKey::new(&ECDSA_P256_SHA256_ASN1, signer.public_key().to_vec());

        // enough samples that roughly half start out high-S
        for i in 0..32u8 {
            let message = [i; 16];
            let signature = signer.sign(&message).unwrap();
            verifier.verify(&message, &signature).unwrap();

            let (_, s) = parse_der_signature(&signature).unwrap();
            assert!(to_fixed(s).unwrap() <= P256_HALF_ORDER);
        }
    }

    #[test]
    fn test_high_s_is_flipped() {
        let r = [0x11u8; 32];
        let mut high = P256_ORDER;
        high[31] -= 1; // n - 1
        let der = encode_der_signature(&r, &high);

        let normalized = normalize_low_s(&der).unwrap();
        let (r_out, s_out) = parse_der_signature(&normalized).unwrap();
        assert_eq!(r_out, &r[..]);
        assert_eq!(to_fixed(s_out).unwrap()[31], 1);
        assert!(to_fixed(s_out).unwrap()[..31].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_rejects_non_pkcs8_pem() {
        let pem_text = pem::encode(&pem::Pem::new("EC PRIVATE KEY", vec![1, 2, 3]));
        let err = Signer::from_pkcs8_pem(&pem_text).unwrap_err();
        assert!(matches!(err, LedgerError::Credential(_)));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(Signer::from_pkcs8_pem("not a key").is_err());
        assert!(parse_der_signature(&[0x30, 0x02, 0x02, 0x00]).is_err());
    }
}
