//! Parsing and verification of compact tokens. The caller states its policy
//! up front: which algorithms are acceptable, which key or key set to use,
//! and how lenient time validation may be. `alg: none` is never accepted
//! unless the policy opts in.

use crate::algorithm::Algorithm;
use crate::base64url;
use crate::crypto::{self, CryptoProvider};
use crate::document::Document;
use crate::error::{Error, Result};
use crate::jwks::{JwkItem, JwkSet};
use crate::token::Jwt;
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Verification policy. An empty `algorithms` list accepts any known
/// algorithm except `none`.
#[derive(Clone)]
pub struct Validation<'k> {
    pub algorithms: Vec<Algorithm>,
    /// Accept unsecured (`alg: none`) tokens. Off unless the caller opts in.
    pub allow_none: bool,
    pub key: Option<&'k JwkItem>,
    pub keys: Option<&'k JwkSet>,
    /// Seconds of slack applied to `exp` and `nbf`.
    pub leeway: i64,
    /// Injected clock, seconds since the epoch. System time when `None`.
    pub now: Option<i64>,
    pub validate_exp: bool,
    pub validate_nbf: bool,
    pub provider: Option<&'k dyn CryptoProvider>,
}

impl<'k> Validation<'k> {
    pub fn new(alg: Algorithm) -> Self {
        Self {
            algorithms: vec![alg],
            ..Self::default()
        }
    }

    pub fn with_key(key: &'k JwkItem, alg: Algorithm) -> Self {
        Self {
            algorithms: vec![alg],
            key: Some(key),
            ..Self::default()
        }
    }

    pub fn with_keys(keys: &'k JwkSet) -> Self {
        Self {
            keys: Some(keys),
            ..Self::default()
        }
    }
}

impl Default for Validation<'_> {
    fn default() -> Self {
        Self {
            algorithms: Vec::new(),
            allow_none: false,
            key: None,
            keys: None,
            leeway: 0,
            now: None,
            validate_exp: true,
            validate_nbf: true,
            provider: None,
        }
    }
}

pub fn decode<'k>(token: &str, validation: &Validation<'k>) -> Result<Jwt<'k>> {
    let token = token.trim();
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(Error::malformed("token must have 3 dot-separated segments"));
    }

    let headers = parse_segment(parts[0], "header")?;
    let grants = parse_segment(parts[1], "claims")?;

    let alg_name = headers
        .get_str("alg")
        .map_err(|_| Error::malformed("header is missing `alg`"))?;
    let alg = Algorithm::from_name(alg_name)?;

    if alg == Algorithm::None {
        if !validation.allow_none {
            return Err(Error::alg_disallowed(
                "alg 'none' is rejected unless the policy allows it",
            ));
        }
    } else if !validation.algorithms.is_empty() && !validation.algorithms.contains(&alg) {
        return Err(Error::alg_disallowed(format!(
            "{alg} is not in the allowed algorithm set"
        )));
    }

    let mut selected: Option<&'k JwkItem> = None;

    if alg == Algorithm::None {
        if !parts[2].is_empty() {
            return Err(Error::malformed("unsecured token carries a signature"));
        }
    } else {
        let key = match (validation.key, validation.keys) {
            (Some(key), _) => key,
            (None, Some(keys)) => select_key(keys, headers.get_str("kid").ok(), alg)?,
            (None, None) => {
                return Err(Error::key_missing(format!(
                    "verifying {alg} requires a key or key set"
                )))
            }
        };

        if key.error() {
            return Err(Error::key_invalid(
                "selected key is in an error state and cannot verify",
            ));
        }
        if let Some(key_alg) = key.alg() {
            if key_alg != alg {
                return Err(Error::alg_mismatch(format!(
                    "key is for {key_alg}, token is signed with {alg}"
                )));
            }
        }

        let signature = base64url::decode(parts[2])?;
        let signed_len = parts[0].len() + 1 + parts[1].len();
        let message = &token.as_bytes()[..signed_len];

        let provider = validation
            .provider
            .unwrap_or_else(|| crypto::default_provider());
        provider.verify(alg, key, message, &signature).map_err(|err| {
            debug!(%err, %alg, "token verification failed");
            err
        })?;

        selected = Some(key);
    }

    validate_time_claims(&grants, validation)?;

    Ok(Jwt::from_parts(headers, grants, alg, selected))
}

fn parse_segment(segment: &str, what: &str) -> Result<Document> {
    let bytes = base64url::decode(segment)?;
    let value: Value = serde_json::from_slice(&bytes)
        .map_err(|e| Error::malformed(format!("{what} is not valid JSON: {e}")))?;
    match value {
        Value::Object(map) => Ok(Document::from_map(map)),
        _ => Err(Error::malformed(format!("{what} is not a JSON object"))),
    }
}

/// Picks the one key the token can be checked against: by `kid` when the
/// header names one, otherwise the unique entry compatible with `alg`.
fn select_key<'k>(keys: &'k JwkSet, kid: Option<&str>, alg: Algorithm) -> Result<&'k JwkItem> {
    if let Some(kid) = kid {
        return keys
            .iter()
            .find(|item| item.kid() == Some(kid))
            .ok_or_else(|| Error::key_missing(format!("no key in the set has kid '{kid}'")));
    }

    let mut candidates = keys
        .iter()
        .filter(|item| !item.error() && compatible(item, alg));

    let first = candidates
        .next()
        .ok_or_else(|| Error::key_missing(format!("no key in the set matches {alg}")))?;
    if candidates.next().is_some() {
        return Err(Error::key_ambiguous(format!(
            "several keys in the set match {alg}; the token needs a kid"
        )));
    }

    Ok(first)
}

fn compatible(item: &JwkItem, alg: Algorithm) -> bool {
    match item.alg() {
        Some(key_alg) => key_alg == alg,
        None => item.kty() == alg.expected_kty(),
    }
}

fn validate_time_claims(grants: &Document, validation: &Validation<'_>) -> Result<()> {
    if !validation.validate_exp && !validation.validate_nbf {
        return Ok(());
    }

    let now = validation.now.unwrap_or_else(now_epoch);

    if validation.validate_exp {
        match grants.get_int("exp") {
            Ok(exp) => {
                if now > exp.saturating_add(validation.leeway) {
                    return Err(Error::invalid_claims("token has expired"));
                }
            }
            Err(err) if err.kind == crate::ErrorKind::NotFound => {}
            Err(_) => return Err(Error::invalid_claims("`exp` claim is not an integer")),
        }
    }

    if validation.validate_nbf {
        match grants.get_int("nbf") {
            Ok(nbf) => {
                if now.saturating_add(validation.leeway) < nbf {
                    return Err(Error::invalid_claims("token is not valid yet"));
                }
            }
            Err(err) if err.kind == crate::ErrorKind::NotFound => {}
            Err(_) => return Err(Error::invalid_claims("`nbf` claim is not an integer")),
        }
    }

    Ok(())
}

fn now_epoch() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

#[cfg(test)]
mod tests {
    use super::{decode, Validation};
    use crate::{base64url, ErrorKind};

    #[test]
    fn rejects_wrong_segment_counts() {
        let policy = Validation::default();
        for bad in ["", "a.b", "a.b.c.d"] {
            let err = decode(bad, &policy).unwrap_err();
            assert_eq!(err.kind, ErrorKind::Malformed, "input {bad:?}");
        }
    }

    #[test]
    fn rejects_foreign_bytes_in_segments() {
        let err = decode("$$$.@@@.###", &Validation::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::BadEncoding);
    }

    #[test]
    fn rejects_non_object_header() {
        let head = base64url::encode(b"[1,2]");
        let body = base64url::encode(b"{}");
        let err = decode(&format!("{head}.{body}."), &Validation::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Malformed);
    }

    #[test]
    fn rejects_unknown_algorithms() {
        let head = base64url::encode(br#"{"alg":"XS256"}"#);
        let body = base64url::encode(b"{}");
        let err = decode(&format!("{head}.{body}.sig"), &Validation::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownAlg);
    }

    #[test]
    fn none_needs_an_explicit_opt_in() {
        let head = base64url::encode(br#"{"alg":"none"}"#);
        let body = base64url::encode(br#"{"a":1}"#);
        let token = format!("{head}.{body}.");

        let err = decode(&token, &Validation::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::AlgDisallowed);

        let policy = Validation {
            allow_none: true,
            ..Validation::default()
        };
        let jwt = decode(&token, &policy).expect("decode");
        assert_eq!(jwt.get_grant_int("a").expect("grant"), 1);
        assert!(jwt.was_decoded());
    }

    #[test]
    fn unsecured_token_must_not_carry_a_signature() {
        let head = base64url::encode(br#"{"alg":"none"}"#);
        let body = base64url::encode(b"{}");
        let policy = Validation {
            allow_none: true,
            ..Validation::default()
        };
        let err = decode(&format!("{head}.{body}.c2ln"), &policy).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Malformed);
    }
}
