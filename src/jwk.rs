// Copyright 2020 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Public JSON Web Keys and their RFC 7638 thumbprints.

use std::collections::BTreeMap;

use base64::prelude::*;
use jwt_simple::prelude::RS256PublicKey;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{JwksError, Result};

/// Public key members, tagged by `kty`.
///
/// No variant carries `d` or the CRT parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kty")]
pub enum KeyParameters {
    #[serde(rename = "RSA")]
    Rsa { n: String, e: String },
    #[serde(rename = "EC")]
    Ec { crv: String, x: String, y: String },
    #[serde(rename = "OKP")]
    Okp { crv: String, x: String },
}

impl KeyParameters {
    pub fn rsa(n: &[u8], e: &[u8]) -> Self {
        KeyParameters::Rsa {
            n: BASE64_URL_SAFE_NO_PAD.encode(strip_leading_zeros(n)),
            e: BASE64_URL_SAFE_NO_PAD.encode(strip_leading_zeros(e)),
        }
    }

    pub fn ec(crv: &str, x: &[u8], y: &[u8]) -> Self {
        KeyParameters::Ec {
            crv: crv.to_string(),
            x: BASE64_URL_SAFE_NO_PAD.encode(x),
            y: BASE64_URL_SAFE_NO_PAD.encode(y),
        }
    }

    pub fn okp(crv: &str, x: &[u8]) -> Self {
        KeyParameters::Okp {
            crv: crv.to_string(),
            x: BASE64_URL_SAFE_NO_PAD.encode(x),
        }
    }

    pub fn kty(&self) -> &'static str {
        match self {
            KeyParameters::Rsa { .. } => "RSA",
            KeyParameters::Ec { .. } => "EC",
            KeyParameters::Okp { .. } => "OKP",
        }
    }

    /// RFC 7638 thumbprint: SHA-256 over the required members, sorted, no
    /// whitespace, encoded as unpadded base64url.
    pub fn thumbprint(&self) -> Result<String> {
        let kty = self.kty();
        let required: BTreeMap<&str, &str> = match self {
            KeyParameters::Rsa { n, e } => [("e", e.as_str()), ("kty", kty), ("n", n.as_str())].into(),
            KeyParameters::Ec { crv, x, y } => [
                ("crv", crv.as_str()),
                ("kty", kty),
                ("x", x.as_str()),
                ("y", y.as_str()),
            ]
            .into(),
            KeyParameters::Okp { crv, x } => {
                [("crv", crv.as_str()), ("kty", kty), ("x", x.as_str())].into()
            }
        };

        let canonical = serde_json::to_string(&required)?;
        Ok(BASE64_URL_SAFE_NO_PAD.encode(Sha256::digest(canonical.as_bytes())))
    }
}

/// A public JWK with its key id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    #[serde(flatten)]
    pub params: KeyParameters,
    pub kid: String,
}

impl Jwk {
    /// Builds the JWK, using the thumbprint as `kid`.
    pub fn new(params: KeyParameters) -> Result<Self> {
        let kid = params.thumbprint()?;
        Ok(Jwk { params, kid })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Rebuilds the RSA public key described by `n` and `e`.
    pub fn rsa_public_key(&self) -> Result<RS256PublicKey> {
        let KeyParameters::Rsa { n, e } = &self.params else {
            return Err(JwksError::unsupported(format!(
                "{} JWK is not an RSA key",
                self.params.kty()
            )));
        };

        let n = BASE64_URL_SAFE_NO_PAD
            .decode(n.as_bytes())
            .map_err(|e| JwksError::parse(format!("invalid modulus: {e}")))?;
        let e = BASE64_URL_SAFE_NO_PAD
            .decode(e.as_bytes())
            .map_err(|e| JwksError::parse(format!("invalid exponent: {e}")))?;

        RS256PublicKey::from_components(&n, &e).map_err(|e| JwksError::parse(e.to_string()))
    }
}

fn strip_leading_zeros(bytes: &[u8]) -> &[u8] {
    let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    &bytes[first..]
}
