//! JWK and JWKS handling per RFC 7517. A set is parsed leniently: a broken
//! entry is kept in place with its error recorded so indices stay stable and
//! the neighbours stay usable.

use crate::algorithm::Algorithm;
use crate::base64url;
use crate::crypto::{self, CryptoProvider, KeyHandle};
use crate::error::{Error, Result};
use bitflags::bitflags;
use serde_json::{Map, Value};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    Ec,
    Rsa,
    Okp,
    Oct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyUse {
    Signature,
    Encryption,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcCurve {
    P256,
    P384,
    P521,
    Secp256k1,
}

impl EcCurve {
    pub fn name(self) -> &'static str {
        match self {
            EcCurve::P256 => "P-256",
            EcCurve::P384 => "P-384",
            EcCurve::P521 => "P-521",
            EcCurve::Secp256k1 => "secp256k1",
        }
    }

    /// Width of one signature half, in bytes.
    pub fn field_len(self) -> usize {
        match self {
            EcCurve::P256 | EcCurve::Secp256k1 => 32,
            EcCurve::P384 => 48,
            EcCurve::P521 => 66,
        }
    }

    pub fn bits(self) -> usize {
        match self {
            EcCurve::P256 | EcCurve::Secp256k1 => 256,
            EcCurve::P384 => 384,
            EcCurve::P521 => 521,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OkpCurve {
    Ed25519,
    Ed448,
}

/// Which backend owns the key material. Symmetric keys are raw bytes and any
/// backend can use them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyProvider {
    Any,
    Backend(&'static str),
}

bitflags! {
    /// RFC 7517 4.3 `key_ops` values.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct KeyOps: u16 {
        const SIGN = 0x0001;
        const VERIFY = 0x0002;
        const ENCRYPT = 0x0004;
        const DECRYPT = 0x0008;
        const WRAP_KEY = 0x0010;
        const UNWRAP_KEY = 0x0020;
        const DERIVE_KEY = 0x0040;
        const DERIVE_BITS = 0x0080;
    }
}

#[derive(Debug)]
pub enum KeyMaterial {
    Ec { curve: EcCurve, handle: KeyHandle },
    Rsa { handle: KeyHandle },
    Okp { curve: OkpCurve, handle: KeyHandle },
    Oct { secret: Vec<u8> },
}

/// One key out of a JWKS. Immutable once the parser is done with it; an item
/// whose `error` is set holds no usable key material.
#[derive(Debug, Default)]
pub struct JwkItem {
    pub(crate) kty: Option<KeyType>,
    pub(crate) alg: Option<Algorithm>,
    pub(crate) private: bool,
    pub(crate) bits: usize,
    pub(crate) key_use: Option<KeyUse>,
    pub(crate) key_ops: KeyOps,
    pub(crate) kid: Option<String>,
    pub(crate) pem: Option<String>,
    pub(crate) provider: Option<KeyProvider>,
    pub(crate) error: Option<Error>,
    pub(crate) material: Option<KeyMaterial>,
}

impl JwkItem {
    /// Wraps a raw symmetric secret as a usable `oct` descriptor.
    pub fn from_oct_secret(secret: &[u8]) -> Self {
        Self {
            kty: Some(KeyType::Oct),
            private: true,
            bits: secret.len() * 8,
            provider: Some(KeyProvider::Any),
            material: Some(KeyMaterial::Oct {
                secret: secret.to_vec(),
            }),
            ..Self::default()
        }
    }

    pub fn kty(&self) -> Option<KeyType> {
        self.kty
    }

    pub fn alg(&self) -> Option<Algorithm> {
        self.alg
    }

    pub fn is_private(&self) -> bool {
        self.private
    }

    pub fn bits(&self) -> usize {
        self.bits
    }

    pub fn key_use(&self) -> Option<KeyUse> {
        self.key_use
    }

    pub fn key_ops(&self) -> KeyOps {
        self.key_ops
    }

    pub fn kid(&self) -> Option<&str> {
        self.kid.as_deref()
    }

    /// PEM of the public half, when the importer was able to rebuild it.
    pub fn pem(&self) -> Option<&str> {
        self.pem.as_deref()
    }

    pub fn provider(&self) -> Option<KeyProvider> {
        self.provider
    }

    pub fn error(&self) -> bool {
        self.error.is_some()
    }

    pub fn error_msg(&self) -> Option<&str> {
        self.error.as_ref().map(|err| err.message.as_str())
    }

    pub fn error_detail(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    pub fn material(&self) -> Option<&KeyMaterial> {
        self.material.as_ref()
    }

    pub fn oct_secret(&self) -> Option<&[u8]> {
        match self.material {
            Some(KeyMaterial::Oct { ref secret }) => Some(secret),
            _ => None,
        }
    }

    /// Records a failure on the item. The first error wins and any imported
    /// key material is dropped so a broken item can never sign or verify.
    pub(crate) fn write_error(&mut self, error: Error) {
        self.material = None;
        self.provider = None;
        if self.error.is_none() {
            self.error = Some(error);
        }
    }
}

#[derive(Debug, Default)]
pub struct JwkSet {
    items: Vec<JwkItem>,
    error: Option<Error>,
}

impl JwkSet {
    /// Parses JWKS JSON with the process default provider. `None` yields an
    /// empty set. This never fails: problems are recorded on the set or on
    /// the individual items.
    pub fn parse(json: Option<&str>) -> Self {
        Self::parse_with_provider(json, crypto::default_provider())
    }

    pub fn parse_with_provider(json: Option<&str>, provider: &dyn CryptoProvider) -> Self {
        let mut set = Self::default();

        let Some(json) = json else {
            return set;
        };

        let root: Value = match serde_json::from_str(json) {
            Ok(value) => value,
            Err(err) => {
                set.error = Some(Error::parse(err.to_string()));
                return set;
            }
        };

        match root.get("keys") {
            Some(keys) => {
                // A JWKS proper. Anything under "keys" that is not an array
                // contributes no items.
                for entry in keys.as_array().into_iter().flatten() {
                    set.add(process_one(entry, provider));
                }
            }
            None => {
                // A single JWK object.
                set.add(process_one(&root, provider));
            }
        }

        set
    }

    pub fn get(&self, index: usize) -> Option<&JwkItem> {
        self.items.get(index)
    }

    pub fn add(&mut self, item: JwkItem) {
        if let Some(err) = item.error.as_ref() {
            debug!(error = %err, "JWK entry rejected");
        }
        self.items.push(item);
    }

    /// Removes the item at `index`, shifting later items down. Indices are
    /// positional at time of call.
    pub fn remove(&mut self, index: usize) -> bool {
        self.take(index).is_some()
    }

    /// Removes and returns the item at `index`, for handing it to another
    /// set or binding it to a token on its own.
    pub fn take(&mut self, index: usize) -> Option<JwkItem> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &JwkItem> {
        self.items.iter()
    }

    pub fn error(&self) -> bool {
        self.error.is_some()
    }

    pub fn error_msg(&self) -> Option<&str> {
        self.error.as_ref().map(|err| err.message.as_str())
    }
}

fn process_one(jwk: &Value, provider: &dyn CryptoProvider) -> JwkItem {
    let mut item = JwkItem::default();

    let obj = match jwk.as_object() {
        Some(obj) => obj,
        None => {
            item.write_error(Error::key_invalid("Invalid JWK: missing kty value"));
            return item;
        }
    };

    let kty = match obj.get("kty").and_then(Value::as_str) {
        Some(kty) => kty,
        None => {
            item.write_error(Error::key_invalid("Invalid JWK: missing kty value"));
            return item;
        }
    };

    match kty {
        "EC" => {
            item.kty = Some(KeyType::Ec);
            provider.process_ec(obj, &mut item);
        }
        "RSA" => {
            item.kty = Some(KeyType::Rsa);
            provider.process_rsa(obj, &mut item);
        }
        "OKP" => {
            item.kty = Some(KeyType::Okp);
            provider.process_eddsa(obj, &mut item);
        }
        "oct" => {
            item.kty = Some(KeyType::Oct);
            process_octet(obj, &mut item);
        }
        other => {
            item.write_error(Error::key_invalid(format!(
                "Unknown or unsupported kty type '{other}'"
            )));
            return item;
        }
    }

    process_values(obj, &mut item);

    item
}

fn process_octet(obj: &Map<String, Value>, item: &mut JwkItem) {
    let k = match obj.get("k") {
        Some(Value::String(k)) => k,
        _ => {
            item.write_error(Error::key_invalid("Invalid JWK: missing `k`"));
            return;
        }
    };

    if k.is_empty() {
        item.write_error(Error::key_invalid("Invalid JWK: invalid `k`"));
        return;
    }

    let secret = match base64url::decode(k) {
        Ok(secret) => secret,
        Err(_) => {
            item.write_error(Error::key_invalid("Invalid JWK: failed to decode `k`"));
            return;
        }
    };

    item.private = true;
    item.provider = Some(KeyProvider::Any);
    item.bits = secret.len() * 8;
    item.material = Some(KeyMaterial::Oct { secret });
}

/// RFC 7517 4.2 through 4.5, shared by every key type.
fn process_values(obj: &Map<String, Value>, item: &mut JwkItem) {
    if let Some(alg) = obj.get("alg").and_then(Value::as_str) {
        // Unknown names, and "none", leave the algorithm unset.
        match Algorithm::from_name(alg) {
            Ok(Algorithm::None) | Err(_) => {}
            Ok(alg) => item.alg = Some(alg),
        }
    }

    if let Some(key_use) = obj.get("use").and_then(Value::as_str) {
        match key_use {
            "sig" => item.key_use = Some(KeyUse::Signature),
            "enc" => item.key_use = Some(KeyUse::Encryption),
            _ => {}
        }
    }

    if let Some(ops) = obj.get("key_ops").and_then(Value::as_array) {
        for op in ops {
            match key_op_value(op) {
                KeyOpValue::Recognized(bits) => item.key_ops |= bits,
                KeyOpValue::Foreign => {}
                KeyOpValue::Invalid => {
                    item.write_error(Error::invalid("JWK has an invalid value in key_op"));
                }
            }
        }
    }

    if let Some(kid) = obj.get("kid").and_then(Value::as_str) {
        if !kid.is_empty() {
            item.kid = Some(kid.to_string());
        }
    }
}

enum KeyOpValue {
    Recognized(KeyOps),
    /// A string the RFC lets applications define; ignored.
    Foreign,
    Invalid,
}

fn key_op_value(op: &Value) -> KeyOpValue {
    let Some(op) = op.as_str() else {
        return KeyOpValue::Invalid;
    };

    match op {
        "sign" => KeyOpValue::Recognized(KeyOps::SIGN),
        "verify" => KeyOpValue::Recognized(KeyOps::VERIFY),
        "encrypt" => KeyOpValue::Recognized(KeyOps::ENCRYPT),
        "decrypt" => KeyOpValue::Recognized(KeyOps::DECRYPT),
        "wrapKey" => KeyOpValue::Recognized(KeyOps::WRAP_KEY),
        "unwrapKey" => KeyOpValue::Recognized(KeyOps::UNWRAP_KEY),
        "deriveKey" => KeyOpValue::Recognized(KeyOps::DERIVE_KEY),
        "deriveBits" => KeyOpValue::Recognized(KeyOps::DERIVE_BITS),
        _ => KeyOpValue::Foreign,
    }
}
