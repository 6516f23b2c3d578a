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

//! Derives the public JWK of a PEM private or public key, optionally
//! publishing it as a JWKS document, and reports the key id.

pub mod cli;
pub mod error;
pub mod jwk;
pub mod jwks;
pub mod key;
pub mod pem;

use log;

pub use cli::Args;
pub use error::{JwksError, Result};
pub use jwk::{Jwk, KeyParameters};
pub use jwks::Jwks;
pub use key::{Key, PrivateKey, PublicKey};
pub use pem::{KeyAlgorithm, KeyKind};

/// Loads the key, writes the JWKS if asked to, and returns the key id.
pub fn run(args: &Args) -> Result<String> {
    let key = Key::load(&args.key)?;
    let jwk = key.public_jwk()?;
    log::debug!(
        "derived {} JWK with kid {} from a {} key",
        key.algorithm(),
        jwk.kid,
        if key.is_private() { "private" } else { "public" }
    );

    match &args.jwks {
        Some(path) => jwks::write(path, &jwk)?,
        None => log::debug!("no JWKS path given, skipping output file"),
    }

    Ok(jwk.kid)
}
