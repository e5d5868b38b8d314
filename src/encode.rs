//! Compact serialization and signing, plus the readable dump forms. Both
//! paths run the same header materialization: `typ` defaults to `JWT` for
//! secured tokens and `alg` is rewritten to match the token.

use crate::algorithm::Algorithm;
use crate::base64url;
use crate::crypto::{self, CryptoProvider};
use crate::error::{Error, Result};
use crate::token::Jwt;

impl<'k> Jwt<'k> {
    /// Serializes the header, inserting `typ: "JWT"` for secured tokens when
    /// absent and forcing `alg` to the selected algorithm. A `typ` the
    /// caller set is left alone, whatever its value.
    fn write_head(&mut self, pretty: bool) -> Result<String> {
        if self.alg != Algorithm::None && !self.headers.contains("typ") {
            self.headers.add_str("typ", "JWT")?;
        }

        self.headers.del(Some("alg"));
        self.headers.add_str("alg", self.alg.name())?;

        self.headers.serialize(pretty)
    }

    /// Readable `header.claims` form, without base64 or a signature. Runs
    /// the same header materialization as [`encode`](Self::encode).
    pub fn dump(&mut self, pretty: bool) -> Result<String> {
        let head = self.write_head(pretty)?;
        let body = self.grants.serialize(pretty)?;
        Ok(format!("{head}.{body}"))
    }

    /// The claims document alone.
    pub fn dump_grants(&self, pretty: bool) -> Result<String> {
        self.grants.serialize(pretty)
    }

    /// Compact serialization, signed with the bound key through the process
    /// default provider.
    pub fn encode(&mut self) -> Result<String> {
        self.encode_with_provider(crypto::default_provider())
    }

    pub fn encode_with_provider(&mut self, provider: &dyn CryptoProvider) -> Result<String> {
        let head = self.write_head(false)?;
        let body = self.grants.serialize(false)?;

        let mut out = format!(
            "{}.{}",
            base64url::encode(head.as_bytes()),
            base64url::encode(body.as_bytes())
        );

        if self.alg == Algorithm::None {
            out.push('.');
            return Ok(out);
        }

        let key = self
            .key
            .ok_or_else(|| Error::key_missing(format!("{} requires a key", self.alg)))?;
        if key.error() {
            return Err(Error::key_invalid(
                "bound key is in an error state and cannot sign",
            ));
        }
        if let Some(key_alg) = key.alg() {
            if key_alg != self.alg {
                return Err(Error::alg_mismatch(format!(
                    "key is for {key_alg}, token wants {}",
                    self.alg
                )));
            }
        }

        let signature = provider.sign(self.alg, key, out.as_bytes())?;
        out.push('.');
        out.push_str(&base64url::encode(&signature));

        Ok(out)
    }
}
