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

//! Error types for the key loading and JWKS writing pipeline.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, JwksError>;

#[derive(Debug, Error)]
pub enum JwksError {
    /// The key file could not be opened or read.
    #[error("cannot read key file {}: {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The key file is not a well-formed PEM private key.
    #[error("failed to parse key: {0}")]
    KeyParse(String),

    /// The key parsed, but its algorithm has no JWK export here.
    #[error("unsupported key type for JWK export: {0}")]
    UnsupportedKeyType(String),

    /// The JWKS output could not be written.
    #[error("cannot write JWKS file {}: {source}", .path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize JWK: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl JwksError {
    pub(crate) fn parse(msg: impl Into<String>) -> Self {
        JwksError::KeyParse(msg.into())
    }

    pub(crate) fn unsupported(msg: impl Into<String>) -> Self {
        JwksError::UnsupportedKeyType(msg.into())
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        JwksError::FileWrite {
            path: path.into(),
            source,
        }
    }
}
