//! The token object: a header document, a claims ("grants") document, the
//! selected algorithm, and an optional borrowed signing key. The key lives
//! in its [`JwkSet`](crate::JwkSet) (or on its own); the borrow keeps the
//! token from outliving it.

use crate::algorithm::Algorithm;
use crate::document::Document;
use crate::error::Result;
use crate::jwks::JwkItem;

/// Creation-time settings. The default is an unsecured token with no key.
#[derive(Debug, Clone, Copy, Default)]
pub struct JwtConfig<'k> {
    pub alg: Algorithm,
    pub key: Option<&'k JwkItem>,
}

#[derive(Debug, Clone, Default)]
pub struct Jwt<'k> {
    pub(crate) headers: Document,
    pub(crate) grants: Document,
    pub(crate) alg: Algorithm,
    pub(crate) key: Option<&'k JwkItem>,
    pub(crate) decoded: bool,
}

impl<'k> Jwt<'k> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: JwtConfig<'k>) -> Self {
        Self {
            alg: config.alg,
            key: config.key,
            ..Self::default()
        }
    }

    pub(crate) fn from_parts(
        headers: Document,
        grants: Document,
        alg: Algorithm,
        key: Option<&'k JwkItem>,
    ) -> Self {
        Self {
            headers,
            grants,
            alg,
            key,
            decoded: true,
        }
    }

    pub fn alg(&self) -> Algorithm {
        self.alg
    }

    pub fn key(&self) -> Option<&'k JwkItem> {
        self.key
    }

    /// True for tokens produced by [`decode`](crate::decode), false for
    /// freshly built ones.
    pub fn was_decoded(&self) -> bool {
        self.decoded
    }

    pub fn grants(&self) -> &Document {
        &self.grants
    }

    pub fn headers(&self) -> &Document {
        &self.headers
    }

    pub fn add_grant(&mut self, key: &str, value: &str) -> Result<()> {
        self.grants.add_str(key, value)
    }

    pub fn add_grant_int(&mut self, key: &str, value: i64) -> Result<()> {
        self.grants.add_int(key, value)
    }

    pub fn add_grant_bool(&mut self, key: &str, value: bool) -> Result<()> {
        self.grants.add_bool(key, value)
    }

    pub fn add_grants_json(&mut self, json: &str) -> Result<()> {
        self.grants.add_json(json)
    }

    pub fn get_grant(&self, key: &str) -> Result<&str> {
        self.grants.get_str(key)
    }

    pub fn get_grant_int(&self, key: &str) -> Result<i64> {
        self.grants.get_int(key)
    }

    pub fn get_grant_bool(&self, key: &str) -> Result<bool> {
        self.grants.get_bool(key)
    }

    pub fn get_grants_json(&self, key: Option<&str>) -> Result<String> {
        self.grants.get_json(key)
    }

    pub fn del_grants(&mut self, key: Option<&str>) {
        self.grants.del(key)
    }

    pub fn add_header(&mut self, key: &str, value: &str) -> Result<()> {
        self.headers.add_str(key, value)
    }

    pub fn add_header_int(&mut self, key: &str, value: i64) -> Result<()> {
        self.headers.add_int(key, value)
    }

    pub fn add_header_bool(&mut self, key: &str, value: bool) -> Result<()> {
        self.headers.add_bool(key, value)
    }

    pub fn add_headers_json(&mut self, json: &str) -> Result<()> {
        self.headers.add_json(json)
    }

    pub fn get_header(&self, key: &str) -> Result<&str> {
        self.headers.get_str(key)
    }

    pub fn get_header_int(&self, key: &str) -> Result<i64> {
        self.headers.get_int(key)
    }

    pub fn get_header_bool(&self, key: &str) -> Result<bool> {
        self.headers.get_bool(key)
    }

    pub fn get_headers_json(&self, key: Option<&str>) -> Result<String> {
        self.headers.get_json(key)
    }

    pub fn del_headers(&mut self, key: Option<&str>) {
        self.headers.del(key)
    }
}
