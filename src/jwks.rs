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

//! JWKS documents: rendering and writing a single-key set.

use std::io::Write;
use std::path::Path;

use log;
use serde::{Deserialize, Serialize};
use serde_json::from_slice;
use tempfile::NamedTempFile;

use crate::error::{JwksError, Result};
use crate::jwk::Jwk;

const ENVELOPE_PREFIX: &str = "{ \"keys\":[ ";
const ENVELOPE_SUFFIX: &str = "]}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwks {
    pub keys: Vec<Jwk>,
}

impl Jwks {
    pub fn from_slice(data: &[u8]) -> Result<Self> {
        Ok(from_slice(data)?)
    }
}

/// Wraps the JWK in a one-element `keys` array.
pub fn render(jwk: &Jwk) -> Result<String> {
    let jwk = jwk.to_json()?;
    Ok(format!("{ENVELOPE_PREFIX}{jwk}{ENVELOPE_SUFFIX}"))
}

/// Replaces `path` with the rendered JWKS.
///
/// The document goes to a temporary file next to `path` which is renamed over
/// it once fully written, so `path` either holds the complete new document or
/// is left as it was.
pub fn write(path: &Path, jwk: &Jwk) -> Result<()> {
    let document = render(jwk)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| JwksError::write(path, e))?;
    log::debug!("staging JWKS in {}", tmp.path().display());

    tmp.write_all(document.as_bytes())
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| JwksError::write(path, e))?;
    set_public_permissions(tmp.as_file()).map_err(|e| JwksError::write(path, e))?;

    tmp.persist(path).map_err(|e| JwksError::write(path, e.error))?;
    log::info!("wrote JWKS for kid {} to {}", jwk.kid, path.display());
    Ok(())
}

#[cfg(unix)]
fn set_public_permissions(file: &std::fs::File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    file.set_permissions(std::fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_public_permissions(_file: &std::fs::File) -> std::io::Result<()> {
    Ok(())
}
