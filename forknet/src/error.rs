// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use std::{process::ExitStatus, sync::Arc};

use alloy::primitives::{Address, TxHash};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("toml deserialize error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),
    #[error("task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("rpc error: {0}")]
    Rpc(#[from] alloy::transports::RpcError<alloy::transports::TransportErrorKind>),
    #[error("{0}")]
    Contract(#[from] alloy::contract::Error),
    #[error("signer error: {0}")]
    Signer(#[from] alloy::signers::local::LocalSignerError),
    #[error("units error: {0}")]
    Units(#[from] alloy::primitives::utils::UnitsError),
    #[error("invalid url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error(
        "`forknet` requires the `{program}` simulator to be installed.\n\
         See https://book.getfoundry.sh/getting-started/installation to install anvil."
    )]
    MissingSimulator { program: String },
    #[error(
        "`forking` must be specified to use `forknet`.\n\
         Add a `[network.forking]` table with the upstream JSON-RPC `url` to forknet.toml."
    )]
    MissingForking,
    #[error("environment variable `{0}` referenced by the configuration is not set")]
    MissingEnvVar(String),
    #[error("negative amount {0}; currency amounts are unsigned")]
    NegativeAmount(String),
    #[error("invalid balance `{0}`")]
    InvalidBalance(String),
    #[error("at least one account must be configured")]
    NoAccounts,

    #[error("Could not fund {amount} {symbol} from any whales")]
    Funding {
        amount: String,
        symbol: String,
        #[source]
        source: alloy::contract::Error,
    },
    #[error("failed to impersonate {whale}: {source}")]
    Impersonation {
        whale: Address,
        #[source]
        source: Arc<Error>,
    },

    #[error("transaction {0} reverted")]
    TransactionReverted(TxHash),

    #[error("node exited before it was stopped ({0})")]
    NodeExited(ExitStatus),
    #[error("node stopped before reporting a listening address")]
    NodeNotReady,
    #[error("polling for {0} was cancelled")]
    PollingCancelled(TxHash),
}
