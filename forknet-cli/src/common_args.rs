// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use std::path::PathBuf;

use forknet::Config;

#[derive(Debug, clap::Args)]
pub struct ConfigArgs {
    /// Path to the configuration file (defaults to $FORKNET_CONFIG, then ./forknet.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

impl ConfigArgs {
    pub fn load(&self) -> forknet::Result<Config> {
        match &self.config {
            Some(path) => Config::load(path),
            None => Config::discover(),
        }
    }
}
