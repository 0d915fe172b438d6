// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

#![allow(dead_code)]

use alloy::primitives::{address, Address};
use forknet::{Config, Currency, Token};
use tokio::sync::{Mutex, MutexGuard};

pub const CHAIN_ID: u64 = 1;
pub const UNI: Address = address!("0x1f9840a85d5aF5bf1D1762F925BDADdC4201F984");
pub const USDT: Address = address!("0xdAC17F958D2ee523a2206206994597C13D831ec7");
pub const USDT_TREASURY: Address = address!("0x5754284f345afc66a98fbb0a0afe71e0f007b949");

/// Networks in one test binary share a port.
static NETWORK: Mutex<()> = Mutex::const_new(());

pub async fn exclusive() -> MutexGuard<'static, ()> {
    NETWORK.lock().await
}

/// The workspace `forknet.toml`: mainnet at block 13582625 through `JSON_RPC_PROVIDER`.
pub fn config() -> eyre::Result<Config> {
    Ok(Config::load(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../forknet.toml"
    ))?)
}

pub fn eth() -> Currency {
    Currency::ether(CHAIN_ID)
}

pub fn uni() -> Token {
    Token::new(CHAIN_ID, UNI, 18, "UNI")
}

pub fn usdt() -> Token {
    Token::new(CHAIN_ID, USDT, 6, "USDT")
}
