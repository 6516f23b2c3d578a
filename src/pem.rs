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

//! Locating the key block in a PEM file and identifying its algorithm.

use std::fmt;

use log;
use pkcs8::PrivateKeyInfo;
use sec1::EcPrivateKey;
use spki::{AlgorithmIdentifierRef, ObjectIdentifier, SubjectPublicKeyInfoRef};

use crate::error::{JwksError, Result};

const BEGIN: &str = "-----BEGIN ";
const DASHES: &str = "-----";

pub const SEC1_LABEL: &str = "EC PRIVATE KEY";
pub const PKCS1_PUBLIC_LABEL: &str = "RSA PUBLIC KEY";

const RSA_ENCRYPTION: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");
const EC_PUBLIC_KEY: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");
const PRIME256V1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");
const SECP384R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.34");
const ED25519: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.112");

const KNOWN_UNSUPPORTED: &[(ObjectIdentifier, &str)] = &[
    (ObjectIdentifier::new_unwrap("1.2.840.10040.4.1"), "DSA"),
    (ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.10"), "RSASSA-PSS"),
    (ObjectIdentifier::new_unwrap("1.3.101.110"), "X25519"),
    (ObjectIdentifier::new_unwrap("1.3.101.111"), "X448"),
    (ObjectIdentifier::new_unwrap("1.3.101.113"), "Ed448"),
];

/// Algorithms that can be exported as a public JWK.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAlgorithm {
    Rsa,
    EcP256,
    EcP384,
    Ed25519,
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyAlgorithm::Rsa => "RSA",
            KeyAlgorithm::EcP256 => "EC P-256",
            KeyAlgorithm::EcP384 => "EC P-384",
            KeyAlgorithm::Ed25519 => "Ed25519",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Private,
    Public,
}

/// One decoded PEM block, borrowing its text from the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PemBlock<'a> {
    pub label: &'a str,
    /// The block from its BEGIN line through its END line.
    pub text: &'a str,
    pub der: Vec<u8>,
}

impl<'a> PemBlock<'a> {
    pub fn kind(&self) -> Option<KeyKind> {
        if self.label.ends_with("PRIVATE KEY") {
            Some(KeyKind::Private)
        } else if self.label.ends_with("PUBLIC KEY") {
            Some(KeyKind::Public)
        } else {
            None
        }
    }

    /// Identifies the key algorithm from the label and DER body.
    pub fn algorithm(&self) -> Result<KeyAlgorithm> {
        match self.label {
            "RSA PRIVATE KEY" | PKCS1_PUBLIC_LABEL => Ok(KeyAlgorithm::Rsa),
            SEC1_LABEL => {
                let key = EcPrivateKey::try_from(self.der.as_slice())
                    .map_err(|e| JwksError::parse(format!("malformed SEC1 key: {e}")))?;
                let curve = key
                    .parameters
                    .and_then(|params| params.named_curve())
                    .ok_or_else(|| JwksError::unsupported("EC key without a named curve"))?;
                curve_algorithm(curve)
            }
            "PRIVATE KEY" => {
                let info = PrivateKeyInfo::try_from(self.der.as_slice())
                    .map_err(|e| JwksError::parse(format!("malformed PKCS#8 key: {e}")))?;
                identify(info.algorithm)
            }
            "PUBLIC KEY" => {
                let spki = SubjectPublicKeyInfoRef::try_from(self.der.as_slice())
                    .map_err(|e| JwksError::parse(format!("malformed public key: {e}")))?;
                identify(spki.algorithm)
            }
            "DSA PRIVATE KEY" => Err(JwksError::unsupported("DSA")),
            "OPENSSH PRIVATE KEY" => Err(JwksError::unsupported(
                "OpenSSH private key format, convert it to PKCS#8 first",
            )),
            "ENCRYPTED PRIVATE KEY" => Err(JwksError::parse(
                "passphrase protected keys are not supported",
            )),
            other => Err(JwksError::parse(format!(
                "unrecognized \"{other}\" PEM block"
            ))),
        }
    }

    /// The raw private scalar of a SEC1 `EC PRIVATE KEY`.
    pub fn sec1_secret(&self) -> Result<&[u8]> {
        EcPrivateKey::try_from(self.der.as_slice())
            .map(|key| key.private_key)
            .map_err(|e| JwksError::parse(format!("malformed SEC1 key: {e}")))
    }
}

/// Picks the key to export: the first private key block, or failing that
/// the first public key block. Other blocks (certificates, EC parameters)
/// are skipped.
pub fn key_block(text: &str) -> Result<(KeyKind, PemBlock<'_>)> {
    let mut public = None;

    for block in blocks(text) {
        let block = block?;
        match block.kind() {
            Some(KeyKind::Private) => return Ok((KeyKind::Private, block)),
            Some(KeyKind::Public) if public.is_none() => public = Some(block),
            Some(KeyKind::Public) => {}
            None => log::debug!("skipping \"{}\" PEM block", block.label),
        }
    }

    public
        .map(|block| (KeyKind::Public, block))
        .ok_or_else(|| JwksError::parse("no private or public key PEM block found"))
}

fn blocks(text: &str) -> impl Iterator<Item = Result<PemBlock<'_>>> {
    let mut rest = text;
    std::iter::from_fn(move || {
        let start = rest.find(BEGIN)?;
        let candidate = &rest[start..];
        match block_len(candidate) {
            Ok(len) => {
                rest = &candidate[len..];
                Some(decode(&candidate[..len]))
            }
            Err(e) => {
                rest = "";
                Some(Err(e))
            }
        }
    })
}

/// Length of the block starting at `candidate`, through its END line and the
/// line break after it.
fn block_len(candidate: &str) -> Result<usize> {
    let label = candidate[BEGIN.len()..]
        .split_once(DASHES)
        .map(|(label, _)| label)
        .filter(|label| !label.is_empty() && !label.contains('\n'))
        .ok_or_else(|| JwksError::parse("malformed PEM BEGIN line"))?;

    let end_line = format!("-----END {label}{DASHES}");
    let end = candidate
        .find(&end_line)
        .map(|pos| pos + end_line.len())
        .ok_or_else(|| {
            JwksError::parse(format!("missing \"{end_line}\", the key file looks truncated"))
        })?;

    let eol = ["\r\n", "\n"]
        .into_iter()
        .find(|eol| candidate[end..].starts_with(eol))
        .map_or(0, str::len);
    Ok(end + eol)
}

fn decode(text: &str) -> Result<PemBlock<'_>> {
    let (label, der) = pem_rfc7468::decode_vec(text.as_bytes())
        .map_err(|e| JwksError::parse(format!("invalid PEM encoding: {e}")))?;
    Ok(PemBlock { label, text, der })
}

fn identify(algorithm: AlgorithmIdentifierRef<'_>) -> Result<KeyAlgorithm> {
    if algorithm.oid == RSA_ENCRYPTION {
        Ok(KeyAlgorithm::Rsa)
    } else if algorithm.oid == ED25519 {
        Ok(KeyAlgorithm::Ed25519)
    } else if algorithm.oid == EC_PUBLIC_KEY {
        let curve = algorithm
            .parameters_oid()
            .map_err(|_| JwksError::unsupported("EC key without a named curve"))?;
        curve_algorithm(curve)
    } else {
        Err(JwksError::unsupported(algorithm_name(algorithm.oid)))
    }
}

fn curve_algorithm(curve: ObjectIdentifier) -> Result<KeyAlgorithm> {
    if curve == PRIME256V1 {
        Ok(KeyAlgorithm::EcP256)
    } else if curve == SECP384R1 {
        Ok(KeyAlgorithm::EcP384)
    } else {
        Err(JwksError::unsupported(format!("EC curve {curve}")))
    }
}

fn algorithm_name(oid: ObjectIdentifier) -> String {
    KNOWN_UNSUPPORTED
        .iter()
        .find(|(known, _)| *known == oid)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| format!("OID {oid}"))
}
