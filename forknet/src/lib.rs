// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Forked Ethereum networks as test fixtures.
//!
//! [`setup()`] boots an `anvil` node forked from an upstream chain on a port unique to the
//! current test worker, derives the configured accounts and installs a [`Hardhat`] handle
//! for funding and inspecting them. The returned [`Teardown`] stops it again.

pub mod accounts;
pub mod config;
pub mod connection;
pub mod currency;
pub mod environment;
pub mod erc20;
mod error;
pub mod global;
pub mod hardhat;
pub mod node;
pub mod provider;
pub mod setup;
#[cfg(test)]
mod testing;
pub mod whales;

pub use accounts::{derive_accounts, DerivedAccount};
pub use config::Config;
pub use currency::{Currency, CurrencyAmount, NativeCurrency, Token};
pub use error::{Error, Result};
pub use global::hardhat;
pub use hardhat::{Account, AddressLike, Approval, Hardhat, OneOrMany};
pub use setup::{setup, Phase, Teardown};
