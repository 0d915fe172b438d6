// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! `forknet.toml` configuration.

use std::{env, fs, path::Path, str::FromStr, time::Duration};

use alloy::primitives::U256;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::Deserialize;

use crate::error::{Error, Result};

/// Filename for forknet.toml configuration files
pub const FILENAME: &str = "forknet.toml";

/// Environment variable overriding the configuration path.
pub const CONFIG_VAR: &str = "FORKNET_CONFIG";

pub const DEFAULT_MNEMONIC: &str = "test test test test test test test test test test test junk";
pub const DEFAULT_PATH: &str = "m/44'/60'/0'/0";
pub const DEFAULT_COUNT: usize = 20;
pub const DEFAULT_BALANCE: &str = "10000000000000000000000";
pub const DEFAULT_BASE_PORT: u16 = 8545;
pub const DEFAULT_WORKER_ID_VAR: &str = "FORKNET_WORKER_ID";

lazy_static! {
    static ref ENV_REFERENCE: Regex = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap();
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    pub network: NetworkConfig,
    pub node: NodeSettings,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct NetworkConfig {
    pub chain_id: Option<u64>,
    pub forking: Option<ForkingConfig>,
    pub accounts: AccountsConfig,
    pub logging_enabled: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            chain_id: None,
            forking: None,
            accounts: AccountsConfig::HdWallet(HdWalletConfig::default()),
            logging_enabled: false,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ForkingConfig {
    /// Upstream JSON-RPC url to fork from.
    pub url: String,
    /// Block to fork at; the upstream head when unset.
    pub block_number: Option<u64>,
}

/// Either explicit private keys, or an HD wallet to derive them from.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AccountsConfig {
    PrivateKeys(Vec<PrivateKeyConfig>),
    HdWallet(HdWalletConfig),
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PrivateKeyConfig {
    pub private_key: String,
    #[serde(default = "default_balance")]
    pub balance: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct HdWalletConfig {
    pub mnemonic: String,
    pub passphrase: String,
    pub path: String,
    pub count: usize,
    pub initial_index: u32,
    pub accounts_balance: String,
}

impl Default for HdWalletConfig {
    fn default() -> Self {
        Self {
            mnemonic: DEFAULT_MNEMONIC.into(),
            passphrase: String::new(),
            path: DEFAULT_PATH.into(),
            count: DEFAULT_COUNT,
            initial_index: 0,
            accounts_balance: DEFAULT_BALANCE.into(),
        }
    }
}

/// Settings for the simulator process.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct NodeSettings {
    pub program: String,
    pub host: String,
    pub base_port: u16,
    pub worker_id_var: String,
    pub polling_interval_ms: u64,
    /// Extra arguments passed verbatim to the simulator.
    pub args: Vec<String>,
}

impl Default for NodeSettings {
    fn default() -> Self {
        Self {
            program: "anvil".into(),
            host: "127.0.0.1".into(),
            base_port: DEFAULT_BASE_PORT,
            worker_id_var: DEFAULT_WORKER_ID_VAR.into(),
            polling_interval_ms: 250,
            args: Vec::new(),
        }
    }
}

impl NodeSettings {
    pub fn polling_interval(&self) -> Duration {
        Duration::from_millis(self.polling_interval_ms)
    }
}

impl Config {
    /// Loads the configuration from `FORKNET_CONFIG`, or `forknet.toml` in the working directory.
    ///
    /// A missing file yields the default configuration.
    pub fn discover() -> Result<Self> {
        match env::var_os(CONFIG_VAR) {
            Some(path) => Self::load(path),
            None if Path::new(FILENAME).exists() => Self::load(FILENAME),
            None => Ok(Self::default()),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        contents.parse()
    }
}

impl FromStr for Config {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(s)?;
        if let Some(forking) = &mut config.network.forking {
            forking.url = expand_env(&forking.url)?;
        }
        Ok(config)
    }
}

impl AccountsConfig {
    /// Initial balance of each derived account, in derivation order.
    pub fn balances(&self) -> Result<Vec<U256>> {
        match self {
            Self::PrivateKeys(keys) => keys.iter().map(|key| parse_balance(&key.balance)).collect(),
            Self::HdWallet(hd) => Ok(vec![parse_balance(&hd.accounts_balance)?; hd.count]),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::PrivateKeys(keys) => keys.len(),
            Self::HdWallet(hd) => hd.count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn default_balance() -> String {
    DEFAULT_BALANCE.into()
}

fn parse_balance(balance: &str) -> Result<U256> {
    U256::from_str(balance.trim()).map_err(|_| Error::InvalidBalance(balance.into()))
}

/// Replaces `${VAR}` references with the value of the environment variable.
fn expand_env(value: &str) -> Result<String> {
    let mut missing = None;
    let expanded = ENV_REFERENCE.replace_all(value, |captures: &Captures| {
        let name = &captures[1];
        env::var(name).unwrap_or_else(|_| {
            missing.get_or_insert_with(|| name.to_string());
            String::new()
        })
    });
    match missing {
        Some(name) => Err(Error::MissingEnvVar(name)),
        None => Ok(expanded.into_owned()),
    }
}
