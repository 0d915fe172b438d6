// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Known mainnet addresses holding large token balances.

use alloy::primitives::{address, Address};

/// Default funding sources for ERC-20 transfers, in the order they are tried.
#[rustfmt::skip]
pub const WHALES: &[Address] = &[
    address!("0xBE0eB53F46cd790Cd13851d5EFf43D12404d33E8"), // Binance 7
    address!("0xF977814e90dA44bFA03b6295A0616a897441aceC"), // Binance 8
    address!("0x28C6c06298d514Db089934071355E5743bf21d60"), // Binance 14
    address!("0x47ac0Fb4F2D84898e4D9E7b4DaB3C24507a6D503"), // Binance
    address!("0x5754284f345afc66a98fbb0a0afe71e0f007b949"), // Tether treasury
];
