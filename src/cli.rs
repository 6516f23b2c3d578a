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

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

/// Prints the key id of a PEM private or public key and optionally writes
/// its public JWK as a JWKS document.
///
/// Example:
///   jwks-gen key.pem --jwks jwks.json
#[derive(Debug, Parser)]
#[command(name = "jwks-gen", version, verbatim_doc_comment)]
pub struct Args {
    /// The path to the key pem file. The key can be generated with openssl
    /// command: `openssl genrsa -out key.pem 2048`
    pub key: PathBuf,

    /// Path to the output file for JWKS.
    #[arg(long, value_name = "PATH")]
    pub jwks: Option<PathBuf>,
}

impl Args {
    /// Parses the process arguments, accepting the single-dash `-jwks` form.
    pub fn from_env() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }
}

/// Rewrites `-jwks` and `-jwks=PATH` to their `--jwks` equivalents.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| match arg.to_str() {
            Some("-jwks") => OsString::from("--jwks"),
            Some(s) if s.starts_with("-jwks=") => OsString::from(format!("-{s}")),
            _ => arg,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(normalize_args(args.iter().map(OsString::from)))
    }

    #[test]
    fn key_only() {
        let args = parse(&["jwks-gen", "key.pem"]).unwrap();
        assert_eq!(args.key, PathBuf::from("key.pem"));
        assert!(args.jwks.is_none());
    }

    #[test]
    fn long_flag() {
        let args = parse(&["jwks-gen", "key.pem", "--jwks", "out.json"]).unwrap();
        assert_eq!(args.jwks, Some(PathBuf::from("out.json")));

        let args = parse(&["jwks-gen", "--jwks=out.json", "key.pem"]).unwrap();
        assert_eq!(args.jwks, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn single_dash_flag() {
        let args = parse(&["jwks-gen", "key.pem", "-jwks", "out.json"]).unwrap();
        assert_eq!(args.jwks, Some(PathBuf::from("out.json")));

        let args = parse(&["jwks-gen", "-jwks=out.json", "key.pem"]).unwrap();
        assert_eq!(args.jwks, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn key_is_required() {
        assert!(parse(&["jwks-gen"]).is_err());
        assert!(parse(&["jwks-gen", "--jwks", "out.json"]).is_err());
    }

    #[test]
    fn leaves_other_arguments_alone() {
        let args: Vec<OsString> = ["jwks-gen", "-jwksx", "key.pem"]
            .iter()
            .map(OsString::from)
            .collect();
        assert_eq!(normalize_args(args.clone()), args);
    }
}
