// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use std::fmt;
use std::process::ExitCode;

pub type ForknetResult = Result<(), ForknetError>;

/// The simulator or a fork source is missing.
const SETUP_EXIT_CODE: u8 = 2;
/// The node failed to start or died while serving.
const NODE_EXIT_CODE: u8 = 3;

#[derive(Debug)]
pub struct ForknetError {
    error: eyre::Error,
    code: u8,
}

impl ForknetError {
    fn failure(error: impl Into<eyre::Error>) -> Self {
        Self {
            error: error.into(),
            code: 1,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.code)
    }
}

impl fmt::Display for ForknetError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.error.fmt(f)
    }
}

impl From<std::io::Error> for ForknetError {
    fn from(err: std::io::Error) -> Self {
        Self::failure(err)
    }
}

impl From<eyre::Error> for ForknetError {
    fn from(error: eyre::Error) -> Self {
        Self::failure(error)
    }
}

impl From<forknet::Error> for ForknetError {
    fn from(err: forknet::Error) -> Self {
        use forknet::Error::*;
        let code = match err {
            MissingSimulator { .. } | MissingForking | MissingEnvVar(_) => SETUP_EXIT_CODE,
            NodeExited(_) | NodeNotReady => NODE_EXIT_CODE,
            _ => 1,
        };
        Self {
            error: err.into(),
            code,
        }
    }
}
