//! Default backend built on the RustCrypto crates: `hmac`/`sha2` for the HS
//! family, `rsa` for RS/PS, the NIST and Koblitz curve crates for ES, and
//! `ed25519-dalek` for EdDSA.

use crate::algorithm::Algorithm;
use crate::base64url;
use crate::crypto::{CryptoProvider, KeyHandle};
use crate::error::{Error, Result};
use crate::jwks::{EcCurve, JwkItem, KeyMaterial, KeyProvider, OkpCurve};
use hmac::{Hmac, Mac};
use pkcs8::{EncodePublicKey, LineEnding};
use rand::rngs::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use serde_json::{Map, Value};
use sha2::digest::const_oid::AssociatedOid;
use sha2::digest::FixedOutputReset;
use sha2::{Digest, Sha256, Sha384, Sha512};
use signature::{RandomizedSigner, SignatureEncoding, Signer, Verifier};

const PROVIDER_NAME: &str = "rustcrypto";

pub struct RustCryptoProvider;

enum RustCryptoKey {
    P256Signing(p256::ecdsa::SigningKey),
    P256Verifying(p256::ecdsa::VerifyingKey),
    P384Signing(p384::ecdsa::SigningKey),
    P384Verifying(p384::ecdsa::VerifyingKey),
    P521Signing(p521::ecdsa::SigningKey),
    P521Verifying(p521::ecdsa::VerifyingKey),
    K256Signing(k256::ecdsa::SigningKey),
    K256Verifying(k256::ecdsa::VerifyingKey),
    RsaPrivate(RsaPrivateKey),
    RsaPublic(RsaPublicKey),
    Ed25519Signing(ed25519_dalek::SigningKey),
    Ed25519Verifying(ed25519_dalek::VerifyingKey),
}

impl CryptoProvider for RustCryptoProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn supports_jwk(&self) -> bool {
        true
    }

    fn process_ec(&self, jwk: &Map<String, Value>, item: &mut JwkItem) {
        if let Err(err) = import_ec(jwk, item) {
            item.write_error(err);
        }
    }

    fn process_rsa(&self, jwk: &Map<String, Value>, item: &mut JwkItem) {
        if let Err(err) = import_rsa(jwk, item) {
            item.write_error(err);
        }
    }

    fn process_eddsa(&self, jwk: &Map<String, Value>, item: &mut JwkItem) {
        if let Err(err) = import_eddsa(jwk, item) {
            item.write_error(err);
        }
    }

    fn sign(&self, alg: Algorithm, key: &JwkItem, message: &[u8]) -> Result<Vec<u8>> {
        if key.error() {
            return Err(Error::key_invalid("key is in an error state"));
        }

        match alg {
            Algorithm::None => Err(Error::invalid("alg 'none' produces no signature")),
            Algorithm::Hs256 | Algorithm::Hs384 | Algorithm::Hs512 => {
                hmac_sign(alg, oct_secret(key, alg)?, message)
            }
            Algorithm::Rs256 => rsa_pkcs1_sign::<Sha256>(rsa_private(key, alg)?, message),
            Algorithm::Rs384 => rsa_pkcs1_sign::<Sha384>(rsa_private(key, alg)?, message),
            Algorithm::Rs512 => rsa_pkcs1_sign::<Sha512>(rsa_private(key, alg)?, message),
            Algorithm::Ps256 => rsa_pss_sign::<Sha256>(rsa_private(key, alg)?, message),
            Algorithm::Ps384 => rsa_pss_sign::<Sha384>(rsa_private(key, alg)?, message),
            Algorithm::Ps512 => rsa_pss_sign::<Sha512>(rsa_private(key, alg)?, message),
            Algorithm::Es256 => match handle(key, alg)? {
                RustCryptoKey::P256Signing(signing) => {
                    let sig: p256::ecdsa::Signature = signing
                        .try_sign(message)
                        .map_err(|e| Error::crypto(format!("ES256 signing failed: {e}")))?;
                    Ok(sig.to_bytes().to_vec())
                }
                RustCryptoKey::P256Verifying(_) => Err(private_required()),
                _ => Err(curve_mismatch(alg)),
            },
            Algorithm::Es256K => match handle(key, alg)? {
                RustCryptoKey::K256Signing(signing) => {
                    let sig: k256::ecdsa::Signature = signing
                        .try_sign(message)
                        .map_err(|e| Error::crypto(format!("ES256K signing failed: {e}")))?;
                    Ok(sig.to_bytes().to_vec())
                }
                RustCryptoKey::K256Verifying(_) => Err(private_required()),
                _ => Err(curve_mismatch(alg)),
            },
            Algorithm::Es384 => match handle(key, alg)? {
                RustCryptoKey::P384Signing(signing) => {
                    let sig: p384::ecdsa::Signature = signing
                        .try_sign(message)
                        .map_err(|e| Error::crypto(format!("ES384 signing failed: {e}")))?;
                    Ok(sig.to_bytes().to_vec())
                }
                RustCryptoKey::P384Verifying(_) => Err(private_required()),
                _ => Err(curve_mismatch(alg)),
            },
            Algorithm::Es512 => match handle(key, alg)? {
                RustCryptoKey::P521Signing(signing) => {
                    let sig: p521::ecdsa::Signature = signing
                        .try_sign(message)
                        .map_err(|e| Error::crypto(format!("ES512 signing failed: {e}")))?;
                    Ok(sig.to_bytes().to_vec())
                }
                RustCryptoKey::P521Verifying(_) => Err(private_required()),
                _ => Err(curve_mismatch(alg)),
            },
            Algorithm::EdDsa => match handle(key, alg)? {
                RustCryptoKey::Ed25519Signing(signing) => {
                    let sig: ed25519_dalek::Signature = signing
                        .try_sign(message)
                        .map_err(|e| Error::crypto(format!("EdDSA signing failed: {e}")))?;
                    Ok(sig.to_bytes().to_vec())
                }
                RustCryptoKey::Ed25519Verifying(_) => Err(private_required()),
                _ => Err(curve_mismatch(alg)),
            },
        }
    }

    fn verify(
        &self,
        alg: Algorithm,
        key: &JwkItem,
        message: &[u8],
        signature: &[u8],
    ) -> Result<()> {
        if key.error() {
            return Err(Error::key_invalid("key is in an error state"));
        }

        match alg {
            Algorithm::None => Err(Error::invalid("alg 'none' carries no signature")),
            Algorithm::Hs256 | Algorithm::Hs384 | Algorithm::Hs512 => {
                hmac_verify(alg, oct_secret(key, alg)?, message, signature)
            }
            Algorithm::Rs256 => rsa_pkcs1_verify::<Sha256>(rsa_public(key, alg)?, message, signature),
            Algorithm::Rs384 => rsa_pkcs1_verify::<Sha384>(rsa_public(key, alg)?, message, signature),
            Algorithm::Rs512 => rsa_pkcs1_verify::<Sha512>(rsa_public(key, alg)?, message, signature),
            Algorithm::Ps256 => rsa_pss_verify::<Sha256>(rsa_public(key, alg)?, message, signature),
            Algorithm::Ps384 => rsa_pss_verify::<Sha384>(rsa_public(key, alg)?, message, signature),
            Algorithm::Ps512 => rsa_pss_verify::<Sha512>(rsa_public(key, alg)?, message, signature),
            Algorithm::Es256 => match handle(key, alg)? {
                RustCryptoKey::P256Signing(signing) => {
                    p256_verify(signing.verifying_key(), message, signature)
                }
                RustCryptoKey::P256Verifying(verifying) => p256_verify(verifying, message, signature),
                _ => Err(curve_mismatch(alg)),
            },
            Algorithm::Es256K => match handle(key, alg)? {
                RustCryptoKey::K256Signing(signing) => {
                    k256_verify(signing.verifying_key(), message, signature)
                }
                RustCryptoKey::K256Verifying(verifying) => k256_verify(verifying, message, signature),
                _ => Err(curve_mismatch(alg)),
            },
            Algorithm::Es384 => match handle(key, alg)? {
                RustCryptoKey::P384Signing(signing) => {
                    p384_verify(signing.verifying_key(), message, signature)
                }
                RustCryptoKey::P384Verifying(verifying) => p384_verify(verifying, message, signature),
                _ => Err(curve_mismatch(alg)),
            },
            Algorithm::Es512 => match handle(key, alg)? {
                RustCryptoKey::P521Signing(signing) => {
                    p521_verify(&p521::ecdsa::VerifyingKey::from(signing), message, signature)
                }
                RustCryptoKey::P521Verifying(verifying) => p521_verify(verifying, message, signature),
                _ => Err(curve_mismatch(alg)),
            },
            Algorithm::EdDsa => match handle(key, alg)? {
                RustCryptoKey::Ed25519Signing(signing) => {
                    ed25519_verify(&signing.verifying_key(), message, signature)
                }
                RustCryptoKey::Ed25519Verifying(verifying) => {
                    ed25519_verify(verifying, message, signature)
                }
                _ => Err(curve_mismatch(alg)),
            },
        }
    }
}

fn import_ec(obj: &Map<String, Value>, item: &mut JwkItem) -> Result<()> {
    let crv = obj
        .get("crv")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::key_invalid("Invalid JWK: missing `crv`"))?;

    let curve = match crv {
        "P-256" => EcCurve::P256,
        "P-384" => EcCurve::P384,
        "P-521" => EcCurve::P521,
        "secp256k1" => EcCurve::Secp256k1,
        other => {
            return Err(Error::key_invalid(format!(
                "Invalid JWK: unsupported EC curve '{other}'"
            )))
        }
    };

    let width = curve.field_len();
    let d = if obj.get("d").and_then(Value::as_str).is_some() {
        Some(field_bytes(obj, "d", width)?)
    } else {
        None
    };

    let handle = match curve {
        EcCurve::P256 => {
            if let Some(d) = d {
                let signing = p256::ecdsa::SigningKey::from_slice(&d)
                    .map_err(|e| Error::key_invalid(format!("Invalid JWK: bad EC key: {e}")))?;
                item.pem = signing
                    .verifying_key()
                    .to_public_key_pem(LineEnding::LF)
                    .ok();
                item.private = true;
                RustCryptoKey::P256Signing(signing)
            } else {
                let x = field_bytes(obj, "x", width)?;
                let y = field_bytes(obj, "y", width)?;
                let point = p256::EncodedPoint::from_affine_coordinates(
                    p256::FieldBytes::from_slice(&x),
                    p256::FieldBytes::from_slice(&y),
                    false,
                );
                let verifying = p256::ecdsa::VerifyingKey::from_encoded_point(&point)
                    .map_err(|_| not_on_curve())?;
                item.pem = verifying.to_public_key_pem(LineEnding::LF).ok();
                RustCryptoKey::P256Verifying(verifying)
            }
        }
        EcCurve::P384 => {
            if let Some(d) = d {
                let signing = p384::ecdsa::SigningKey::from_slice(&d)
                    .map_err(|e| Error::key_invalid(format!("Invalid JWK: bad EC key: {e}")))?;
                item.pem = signing
                    .verifying_key()
                    .to_public_key_pem(LineEnding::LF)
                    .ok();
                item.private = true;
                RustCryptoKey::P384Signing(signing)
            } else {
                let x = field_bytes(obj, "x", width)?;
                let y = field_bytes(obj, "y", width)?;
                let point = p384::EncodedPoint::from_affine_coordinates(
                    p384::FieldBytes::from_slice(&x),
                    p384::FieldBytes::from_slice(&y),
                    false,
                );
                let verifying = p384::ecdsa::VerifyingKey::from_encoded_point(&point)
                    .map_err(|_| not_on_curve())?;
                item.pem = verifying.to_public_key_pem(LineEnding::LF).ok();
                RustCryptoKey::P384Verifying(verifying)
            }
        }
        EcCurve::P521 => {
            if let Some(d) = d {
                let signing = p521::ecdsa::SigningKey::from_slice(&d)
                    .map_err(|e| Error::key_invalid(format!("Invalid JWK: bad EC key: {e}")))?;
                let verifying = p521::ecdsa::VerifyingKey::from(&signing);
                item.pem = p521_verifying_key_pem(&verifying);
                item.private = true;
                RustCryptoKey::P521Signing(signing)
            } else {
                let x = field_bytes(obj, "x", width)?;
                let y = field_bytes(obj, "y", width)?;
                let point = p521::EncodedPoint::from_affine_coordinates(
                    p521::FieldBytes::from_slice(&x),
                    p521::FieldBytes::from_slice(&y),
                    false,
                );
                let verifying = p521::ecdsa::VerifyingKey::from_encoded_point(&point)
                    .map_err(|_| not_on_curve())?;
                item.pem = p521_verifying_key_pem(&verifying);
                RustCryptoKey::P521Verifying(verifying)
            }
        }
        EcCurve::Secp256k1 => {
            if let Some(d) = d {
                let signing = k256::ecdsa::SigningKey::from_slice(&d)
                    .map_err(|e| Error::key_invalid(format!("Invalid JWK: bad EC key: {e}")))?;
                item.pem = signing
                    .verifying_key()
                    .to_public_key_pem(LineEnding::LF)
                    .ok();
                item.private = true;
                RustCryptoKey::K256Signing(signing)
            } else {
                let x = field_bytes(obj, "x", width)?;
                let y = field_bytes(obj, "y", width)?;
                let point = k256::EncodedPoint::from_affine_coordinates(
                    k256::FieldBytes::from_slice(&x),
                    k256::FieldBytes::from_slice(&y),
                    false,
                );
                let verifying = k256::ecdsa::VerifyingKey::from_encoded_point(&point)
                    .map_err(|_| not_on_curve())?;
                item.pem = verifying.to_public_key_pem(LineEnding::LF).ok();
                RustCryptoKey::K256Verifying(verifying)
            }
        }
    };

    item.bits = curve.bits();
    item.provider = Some(KeyProvider::Backend(PROVIDER_NAME));
    item.material = Some(KeyMaterial::Ec {
        curve,
        handle: KeyHandle::new(handle),
    });

    Ok(())
}

fn import_rsa(obj: &Map<String, Value>, item: &mut JwkItem) -> Result<()> {
    let n = rsa_uint(obj, "n")?;
    let e = rsa_uint(obj, "e")?;

    let public = RsaPublicKey::new(n.clone(), e.clone())
        .map_err(|e| Error::key_invalid(format!("Invalid JWK: RSA key rejected: {e}")))?;

    item.bits = public.size() * 8;
    item.pem = public.to_public_key_pem(LineEnding::LF).ok();

    let handle = if obj.get("d").and_then(Value::as_str).is_some() {
        let d = rsa_uint(obj, "d")?;
        // CRT parameters are optional; the rsa crate recovers the primes
        // from (n, e, d) when they are absent.
        let primes = match (rsa_uint_opt(obj, "p")?, rsa_uint_opt(obj, "q")?) {
            (Some(p), Some(q)) => vec![p, q],
            _ => Vec::new(),
        };
        let private = RsaPrivateKey::from_components(n, e, d, primes)
            .map_err(|e| Error::key_invalid(format!("Invalid JWK: RSA key rejected: {e}")))?;
        item.private = true;
        RustCryptoKey::RsaPrivate(private)
    } else {
        RustCryptoKey::RsaPublic(public)
    };

    item.provider = Some(KeyProvider::Backend(PROVIDER_NAME));
    item.material = Some(KeyMaterial::Rsa {
        handle: KeyHandle::new(handle),
    });

    Ok(())
}

fn import_eddsa(obj: &Map<String, Value>, item: &mut JwkItem) -> Result<()> {
    let crv = obj
        .get("crv")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::key_invalid("Invalid JWK: missing `crv`"))?;

    match crv {
        "Ed25519" => {}
        "Ed448" => {
            return Err(Error::key_invalid(
                "Ed448 is not supported by the rustcrypto provider",
            ))
        }
        other => {
            return Err(Error::key_invalid(format!(
                "Invalid JWK: unsupported OKP curve '{other}'"
            )))
        }
    }

    let x = okp_bytes(obj, "x")?;

    let handle = if obj.get("d").and_then(Value::as_str).is_some() {
        let d = okp_bytes(obj, "d")?;
        let signing = ed25519_dalek::SigningKey::from_bytes(&d);
        if signing.verifying_key().as_bytes() != &x {
            return Err(Error::key_invalid(
                "Invalid JWK: `x` does not match the private key",
            ));
        }
        item.pem = signing
            .verifying_key()
            .to_public_key_pem(LineEnding::LF)
            .ok();
        item.private = true;
        RustCryptoKey::Ed25519Signing(signing)
    } else {
        let verifying = ed25519_dalek::VerifyingKey::from_bytes(&x)
            .map_err(|_| Error::key_invalid("Invalid JWK: bad Ed25519 public key"))?;
        item.pem = verifying.to_public_key_pem(LineEnding::LF).ok();
        RustCryptoKey::Ed25519Verifying(verifying)
    };

    item.bits = 256;
    item.provider = Some(KeyProvider::Backend(PROVIDER_NAME));
    item.material = Some(KeyMaterial::Okp {
        curve: OkpCurve::Ed25519,
        handle: KeyHandle::new(handle),
    });

    Ok(())
}

fn field_bytes(obj: &Map<String, Value>, field: &str, width: usize) -> Result<Vec<u8>> {
    let text = obj
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::key_invalid(format!("Invalid JWK: missing `{field}`")))?;
    let bytes = base64url::decode(text)
        .map_err(|_| Error::key_invalid(format!("Invalid JWK: failed to decode `{field}`")))?;
    if bytes.len() > width {
        return Err(Error::key_invalid(format!(
            "Invalid JWK: `{field}` is too long for the curve"
        )));
    }
    if bytes.len() == width {
        return Ok(bytes);
    }
    let mut out = vec![0u8; width - bytes.len()];
    out.extend_from_slice(&bytes);
    Ok(out)
}

fn okp_bytes(obj: &Map<String, Value>, field: &str) -> Result<[u8; 32]> {
    let text = obj
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::key_invalid(format!("Invalid JWK: missing `{field}`")))?;
    let bytes = base64url::decode(text)
        .map_err(|_| Error::key_invalid(format!("Invalid JWK: failed to decode `{field}`")))?;
    <[u8; 32]>::try_from(bytes.as_slice())
        .map_err(|_| Error::key_invalid(format!("Invalid JWK: `{field}` must be 32 bytes")))
}

fn rsa_uint(obj: &Map<String, Value>, field: &str) -> Result<BigUint> {
    rsa_uint_opt(obj, field)?
        .ok_or_else(|| Error::key_invalid(format!("Invalid JWK: missing `{field}`")))
}

fn rsa_uint_opt(obj: &Map<String, Value>, field: &str) -> Result<Option<BigUint>> {
    let Some(text) = obj.get(field).and_then(Value::as_str) else {
        return Ok(None);
    };
    let bytes = base64url::decode(text)
        .map_err(|_| Error::key_invalid(format!("Invalid JWK: failed to decode `{field}`")))?;
    Ok(Some(BigUint::from_bytes_be(&bytes)))
}

fn oct_secret<'a>(key: &'a JwkItem, alg: Algorithm) -> Result<&'a [u8]> {
    key.oct_secret()
        .ok_or_else(|| Error::alg_mismatch(format!("{alg} requires an oct key")))
}

fn rsa_private<'a>(key: &'a JwkItem, alg: Algorithm) -> Result<&'a RsaPrivateKey> {
    match handle(key, alg)? {
        RustCryptoKey::RsaPrivate(private) => Ok(private),
        RustCryptoKey::RsaPublic(_) => Err(private_required()),
        _ => Err(curve_mismatch(alg)),
    }
}

fn rsa_public(key: &JwkItem, alg: Algorithm) -> Result<RsaPublicKey> {
    match handle(key, alg)? {
        RustCryptoKey::RsaPrivate(private) => Ok(private.to_public_key()),
        RustCryptoKey::RsaPublic(public) => Ok(public.clone()),
        _ => Err(curve_mismatch(alg)),
    }
}

fn handle<'a>(key: &'a JwkItem, alg: Algorithm) -> Result<&'a RustCryptoKey> {
    let material = key
        .material()
        .ok_or_else(|| Error::key_invalid("key holds no material"))?;
    let handle = match material {
        KeyMaterial::Ec { handle, .. }
        | KeyMaterial::Rsa { handle }
        | KeyMaterial::Okp { handle, .. } => handle,
        KeyMaterial::Oct { .. } => {
            return Err(Error::alg_mismatch(format!("{alg} cannot use an oct key")))
        }
    };
    handle
        .downcast_ref::<RustCryptoKey>()
        .ok_or_else(|| Error::crypto("key was imported by another provider"))
}

fn private_required() -> Error {
    Error::key_invalid("signing requires a private key")
}

fn curve_mismatch(alg: Algorithm) -> Error {
    Error::alg_mismatch(format!("key type does not match {alg}"))
}

fn not_on_curve() -> Error {
    Error::key_invalid("Invalid JWK: EC point is not on the curve")
}

fn hmac_sign(alg: Algorithm, secret: &[u8], message: &[u8]) -> Result<Vec<u8>> {
    match alg {
        Algorithm::Hs256 => {
            let mut mac = Hmac::<Sha256>::new_from_slice(secret)
                .map_err(|e| Error::crypto(format!("HMAC init failed: {e}")))?;
            mac.update(message);
            Ok(mac.finalize().into_bytes().to_vec())
        }
        Algorithm::Hs384 => {
            let mut mac = Hmac::<Sha384>::new_from_slice(secret)
                .map_err(|e| Error::crypto(format!("HMAC init failed: {e}")))?;
            mac.update(message);
            Ok(mac.finalize().into_bytes().to_vec())
        }
        Algorithm::Hs512 => {
            let mut mac = Hmac::<Sha512>::new_from_slice(secret)
                .map_err(|e| Error::crypto(format!("HMAC init failed: {e}")))?;
            mac.update(message);
            Ok(mac.finalize().into_bytes().to_vec())
        }
        _ => Err(Error::invalid("not an HMAC algorithm")),
    }
}

fn hmac_verify(alg: Algorithm, secret: &[u8], message: &[u8], signature: &[u8]) -> Result<()> {
    match alg {
        Algorithm::Hs256 => {
            let mut mac = Hmac::<Sha256>::new_from_slice(secret)
                .map_err(|e| Error::crypto(format!("HMAC init failed: {e}")))?;
            mac.update(message);
            mac.verify_slice(signature)
                .map_err(|_| Error::bad_signature("HMAC mismatch"))
        }
        Algorithm::Hs384 => {
            let mut mac = Hmac::<Sha384>::new_from_slice(secret)
                .map_err(|e| Error::crypto(format!("HMAC init failed: {e}")))?;
            mac.update(message);
            mac.verify_slice(signature)
                .map_err(|_| Error::bad_signature("HMAC mismatch"))
        }
        Algorithm::Hs512 => {
            let mut mac = Hmac::<Sha512>::new_from_slice(secret)
                .map_err(|e| Error::crypto(format!("HMAC init failed: {e}")))?;
            mac.update(message);
            mac.verify_slice(signature)
                .map_err(|_| Error::bad_signature("HMAC mismatch"))
        }
        _ => Err(Error::invalid("not an HMAC algorithm")),
    }
}

fn rsa_pkcs1_sign<D>(private: &RsaPrivateKey, message: &[u8]) -> Result<Vec<u8>>
where
    D: Digest + AssociatedOid,
{
    let signing = rsa::pkcs1v15::SigningKey::<D>::new(private.clone());
    let sig = signing
        .try_sign(message)
        .map_err(|e| Error::crypto(format!("RSA signing failed: {e}")))?;
    Ok(sig.to_vec())
}

fn rsa_pkcs1_verify<D>(public: RsaPublicKey, message: &[u8], signature: &[u8]) -> Result<()>
where
    D: Digest + AssociatedOid,
{
    let verifying = rsa::pkcs1v15::VerifyingKey::<D>::new(public);
    let sig = rsa::pkcs1v15::Signature::try_from(signature)
        .map_err(|_| Error::bad_signature("malformed RSA signature"))?;
    verifying
        .verify(message, &sig)
        .map_err(|_| Error::bad_signature("RSA signature verification failed"))
}

// Salt length equals the digest length, which is what SigningKey::new picks.
fn rsa_pss_sign<D>(private: &RsaPrivateKey, message: &[u8]) -> Result<Vec<u8>>
where
    D: Digest + FixedOutputReset,
{
    let signing = rsa::pss::SigningKey::<D>::new(private.clone());
    let sig = signing
        .try_sign_with_rng(&mut OsRng, message)
        .map_err(|e| Error::crypto(format!("RSA-PSS signing failed: {e}")))?;
    Ok(sig.to_vec())
}

fn rsa_pss_verify<D>(public: RsaPublicKey, message: &[u8], signature: &[u8]) -> Result<()>
where
    D: Digest + FixedOutputReset,
{
    let verifying = rsa::pss::VerifyingKey::<D>::new(public);
    let sig = rsa::pss::Signature::try_from(signature)
        .map_err(|_| Error::bad_signature("malformed RSA-PSS signature"))?;
    verifying
        .verify(message, &sig)
        .map_err(|_| Error::bad_signature("RSA-PSS signature verification failed"))
}

fn p256_verify(key: &p256::ecdsa::VerifyingKey, message: &[u8], signature: &[u8]) -> Result<()> {
    let sig = p256::ecdsa::Signature::from_slice(signature)
        .map_err(|_| Error::bad_signature("malformed ECDSA signature"))?;
    key.verify(message, &sig)
        .map_err(|_| Error::bad_signature("ECDSA signature verification failed"))
}

fn p384_verify(key: &p384::ecdsa::VerifyingKey, message: &[u8], signature: &[u8]) -> Result<()> {
    let sig = p384::ecdsa::Signature::from_slice(signature)
        .map_err(|_| Error::bad_signature("malformed ECDSA signature"))?;
    key.verify(message, &sig)
        .map_err(|_| Error::bad_signature("ECDSA signature verification failed"))
}

fn p521_verify(key: &p521::ecdsa::VerifyingKey, message: &[u8], signature: &[u8]) -> Result<()> {
    let sig = p521::ecdsa::Signature::from_slice(signature)
        .map_err(|_| Error::bad_signature("malformed ECDSA signature"))?;
    key.verify(message, &sig)
        .map_err(|_| Error::bad_signature("ECDSA signature verification failed"))
}

fn p521_verifying_key_pem(key: &p521::ecdsa::VerifyingKey) -> Option<String> {
    p521::elliptic_curve::PublicKey::<p521::NistP521>::from_affine(*key.as_affine())
        .ok()?
        .to_public_key_pem(LineEnding::LF)
        .ok()
}

fn k256_verify(key: &k256::ecdsa::VerifyingKey, message: &[u8], signature: &[u8]) -> Result<()> {
    let sig = k256::ecdsa::Signature::from_slice(signature)
        .map_err(|_| Error::bad_signature("malformed ECDSA signature"))?;
    key.verify(message, &sig)
        .map_err(|_| Error::bad_signature("ECDSA signature verification failed"))
}

fn ed25519_verify(
    key: &ed25519_dalek::VerifyingKey,
    message: &[u8],
    signature: &[u8],
) -> Result<()> {
    let sig = ed25519_dalek::Signature::from_slice(signature)
        .map_err(|_| Error::bad_signature("malformed EdDSA signature"))?;
    key.verify(message, &sig)
        .map_err(|_| Error::bad_signature("EdDSA signature verification failed"))
}

#[cfg(test)]
mod tests {
    use super::RustCryptoProvider;
    use crate::crypto::CryptoProvider;
    use crate::error::ErrorKind;
    use crate::jwks::{JwkItem, JwkSet};
    use crate::Algorithm;

    // RFC 7515 A.3 key.
    const EC_P256_JWK: &str = r#"{"kty":"EC","crv":"P-256",
        "x":"f83OJ3D2xF1Bg8vub9tLe1gHMzV76e8Tus9uPHvRVEU",
        "y":"x_FEzRu9m36HLN_tue659LNpXW6pCyStikYjKIWI5a0",
        "d":"jpsQnnGQmL-YBIffH1136cspYG6-0iY7X1fCE9-E9LI"}"#;

    fn ec_item() -> JwkItem {
        let mut set = JwkSet::parse_with_provider(Some(EC_P256_JWK), &RustCryptoProvider);
        assert!(!set.get(0).expect("item").error(), "EC key should import");
        set.take(0).expect("item")
    }

    #[test]
    fn hmac_signature_lengths_follow_the_digest() {
        let provider = RustCryptoProvider;
        let key = JwkItem::from_oct_secret(&[0x0b; 32]);
        let message = b"jwtkit hmac test";
        for (alg, len) in [
            (Algorithm::Hs256, 32),
            (Algorithm::Hs384, 48),
            (Algorithm::Hs512, 64),
        ] {
            let sig = provider.sign(alg, &key, message).expect("sign");
            assert_eq!(sig.len(), len);
            provider.verify(alg, &key, message, &sig).expect("verify");
        }
    }

    #[test]
    fn hmac_rejects_a_tampered_message() {
        let provider = RustCryptoProvider;
        let key = JwkItem::from_oct_secret(b"top secret");
        let sig = provider
            .sign(Algorithm::Hs256, &key, b"payload")
            .expect("sign");
        let err = provider
            .verify(Algorithm::Hs256, &key, b"payload2", &sig)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::BadSignature);
    }

    #[test]
    fn ecdsa_signatures_are_fixed_width() {
        let provider = RustCryptoProvider;
        let key = ec_item();
        let sig = provider
            .sign(Algorithm::Es256, &key, b"message")
            .expect("sign");
        assert_eq!(sig.len(), 64);
        provider
            .verify(Algorithm::Es256, &key, b"message", &sig)
            .expect("verify");
    }

    #[test]
    fn hmac_with_an_ec_key_is_a_mismatch() {
        let provider = RustCryptoProvider;
        let key = ec_item();
        let err = provider.sign(Algorithm::Hs256, &key, b"m").unwrap_err();
        assert_eq!(err.kind, ErrorKind::AlgMismatch);

        let oct = JwkItem::from_oct_secret(b"secret");
        let err = provider.sign(Algorithm::Es256, &oct, b"m").unwrap_err();
        assert_eq!(err.kind, ErrorKind::AlgMismatch);
    }
}
