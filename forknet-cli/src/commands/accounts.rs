// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use forknet::{derive_accounts, Currency, CurrencyAmount};

use crate::{
    common_args::ConfigArgs,
    error::ForknetResult,
    utils::{BOLD, DIM},
};

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Also print each account's private key
    #[arg(long)]
    private_keys: bool,

    #[command(flatten)]
    config: ConfigArgs,
}

pub fn exec(args: Args) -> ForknetResult {
    let config = args.config.load()?;
    let accounts = derive_accounts(&config.network.accounts)?;
    let balances = config.network.accounts.balances()?;
    let ether = Currency::ether(config.network.chain_id.unwrap_or_default());
    for (index, (account, balance)) in accounts.iter().zip(balances).enumerate() {
        let balance = CurrencyAmount::from_raw(ether.clone(), balance);
        println!(
            "{BOLD}({index}){BOLD:#} {} {DIM}({balance}){DIM:#}",
            account.address()
        );
        if args.private_keys {
            println!("    {}", account.private_key_hex());
        }
    }
    Ok(())
}
