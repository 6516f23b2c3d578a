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

use std::fmt::Display;
use std::fs;
use std::path::Path;

use jwt_simple::prelude::*;
use log;

use crate::error::{JwksError, Result};
use crate::jwk::{Jwk, KeyParameters};
use crate::pem::{self, KeyAlgorithm, KeyKind, PemBlock, PKCS1_PUBLIC_LABEL, SEC1_LABEL};

/// A private key loaded from PEM.
pub enum PrivateKey {
    Rsa(RS256KeyPair),
    EcP256(ES256KeyPair),
    EcP384(ES384KeyPair),
    Ed25519(Ed25519KeyPair),
}

/// A public key, either loaded from PEM or derived from a [`PrivateKey`].
pub enum PublicKey {
    Rsa(RS256PublicKey),
    EcP256(ES256PublicKey),
    EcP384(ES384PublicKey),
    Ed25519(Ed25519PublicKey),
}

/// Whatever key the PEM file held.
pub enum Key {
    Private(PrivateKey),
    Public(PublicKey),
}

fn parsed<T, E: Display>(result: std::result::Result<T, E>, algorithm: KeyAlgorithm) -> Result<T> {
    result.map_err(|e| JwksError::parse(format!("invalid {algorithm} key: {e}")))
}

impl Key {
    /// Reads and parses the PEM file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|source| JwksError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("read {} bytes from {}", bytes.len(), path.display());

        let text = String::from_utf8(bytes).map_err(|_| {
            JwksError::parse(format!(
                "{} is not PEM text, binary DER keys are not supported",
                path.display()
            ))
        })?;

        Self::from_pem(&text)
    }

    pub fn from_pem(text: &str) -> Result<Self> {
        let (kind, block) = pem::key_block(text)?;
        let algorithm = block.algorithm()?;
        log::debug!("found {} key in \"{}\" block", algorithm, block.label);

        match kind {
            KeyKind::Private => PrivateKey::from_block(&block, algorithm).map(Key::Private),
            KeyKind::Public => PublicKey::from_block(&block, algorithm).map(Key::Public),
        }
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        match self {
            Key::Private(key) => key.algorithm(),
            Key::Public(key) => key.algorithm(),
        }
    }

    pub fn is_private(&self) -> bool {
        matches!(self, Key::Private(_))
    }

    /// Derives the public JWK, keyed by its thumbprint.
    pub fn public_jwk(&self) -> Result<Jwk> {
        match self {
            Key::Private(key) => key.public_key().to_jwk(),
            Key::Public(key) => key.to_jwk(),
        }
    }
}

impl PrivateKey {
    fn from_block(block: &PemBlock<'_>, algorithm: KeyAlgorithm) -> Result<Self> {
        let pem = block.text;
        let sec1 = block.label == SEC1_LABEL;

        match algorithm {
            KeyAlgorithm::Rsa => parsed(RS256KeyPair::from_pem(pem), algorithm).map(PrivateKey::Rsa),
            KeyAlgorithm::EcP256 if sec1 => {
                parsed(ES256KeyPair::from_bytes(block.sec1_secret()?), algorithm).map(PrivateKey::EcP256)
            }
            KeyAlgorithm::EcP256 => parsed(ES256KeyPair::from_pem(pem), algorithm).map(PrivateKey::EcP256),
            KeyAlgorithm::EcP384 if sec1 => {
                parsed(ES384KeyPair::from_bytes(block.sec1_secret()?), algorithm).map(PrivateKey::EcP384)
            }
            KeyAlgorithm::EcP384 => parsed(ES384KeyPair::from_pem(pem), algorithm).map(PrivateKey::EcP384),
            KeyAlgorithm::Ed25519 => {
                parsed(Ed25519KeyPair::from_pem(pem), algorithm).map(PrivateKey::Ed25519)
            }
        }
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        match self {
            PrivateKey::Rsa(_) => KeyAlgorithm::Rsa,
            PrivateKey::EcP256(_) => KeyAlgorithm::EcP256,
            PrivateKey::EcP384(_) => KeyAlgorithm::EcP384,
            PrivateKey::Ed25519(_) => KeyAlgorithm::Ed25519,
        }
    }

    pub fn public_key(&self) -> PublicKey {
        match self {
            PrivateKey::Rsa(key_pair) => PublicKey::Rsa(key_pair.public_key()),
            PrivateKey::EcP256(key_pair) => PublicKey::EcP256(key_pair.public_key()),
            PrivateKey::EcP384(key_pair) => PublicKey::EcP384(key_pair.public_key()),
            PrivateKey::Ed25519(key_pair) => PublicKey::Ed25519(key_pair.public_key()),
        }
    }
}

impl PublicKey {
    fn from_block(block: &PemBlock<'_>, algorithm: KeyAlgorithm) -> Result<Self> {
        let pem = block.text;

        match algorithm {
            KeyAlgorithm::Rsa if block.label == PKCS1_PUBLIC_LABEL => {
                let key = parsed(pkcs1::RsaPublicKey::try_from(block.der.as_slice()), algorithm)?;
                let n = key.modulus.as_bytes();
                let e = key.public_exponent.as_bytes();
                parsed(RS256PublicKey::from_components(n, e), algorithm).map(PublicKey::Rsa)
            }
            KeyAlgorithm::Rsa => parsed(RS256PublicKey::from_pem(pem), algorithm).map(PublicKey::Rsa),
            KeyAlgorithm::EcP256 => parsed(ES256PublicKey::from_pem(pem), algorithm).map(PublicKey::EcP256),
            KeyAlgorithm::EcP384 => parsed(ES384PublicKey::from_pem(pem), algorithm).map(PublicKey::EcP384),
            KeyAlgorithm::Ed25519 => {
                parsed(Ed25519PublicKey::from_pem(pem), algorithm).map(PublicKey::Ed25519)
            }
        }
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        match self {
            PublicKey::Rsa(_) => KeyAlgorithm::Rsa,
            PublicKey::EcP256(_) => KeyAlgorithm::EcP256,
            PublicKey::EcP384(_) => KeyAlgorithm::EcP384,
            PublicKey::Ed25519(_) => KeyAlgorithm::Ed25519,
        }
    }

    pub fn to_jwk(&self) -> Result<Jwk> {
        let params = match self {
            PublicKey::Rsa(key) => {
                let comps = key.to_components();
                KeyParameters::rsa(&comps.n, &comps.e)
            }
            PublicKey::EcP256(key) => {
                ec_parameters("P-256", &key.public_key().to_bytes_uncompressed())?
            }
            PublicKey::EcP384(key) => {
                ec_parameters("P-384", &key.public_key().to_bytes_uncompressed())?
            }
            PublicKey::Ed25519(key) => KeyParameters::okp("Ed25519", &key.to_bytes()),
        };

        Jwk::new(params)
    }
}

/// Splits an uncompressed SEC1 point (`0x04 || x || y`) into its coordinates.
fn ec_parameters(crv: &str, point: &[u8]) -> Result<KeyParameters> {
    match point {
        [0x04, coords @ ..] if !coords.is_empty() && coords.len() % 2 == 0 => {
            let (x, y) = coords.split_at(coords.len() / 2);
            Ok(KeyParameters::ec(crv, x, y))
        }
        _ => Err(JwksError::parse(format!("unexpected {crv} public key encoding"))),
    }
}
