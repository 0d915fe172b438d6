// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Derives signing accounts from an accounts configuration.

use alloy::{
    primitives::{Address, B256},
    signers::local::{coins_bip39::English, LocalSignerError, MnemonicBuilder, PrivateKeySigner},
};

use crate::{
    config::{AccountsConfig, HdWalletConfig, PrivateKeyConfig},
    error::Result,
};

/// An externally owned account: an address and the private key controlling it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DerivedAccount {
    address: Address,
    private_key: B256,
}

impl DerivedAccount {
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn private_key(&self) -> B256 {
        self.private_key
    }

    /// Lowercase, `0x`-prefixed address.
    pub fn address_hex(&self) -> String {
        format!("{:#x}", self.address)
    }

    /// Lowercase, `0x`-prefixed private key.
    pub fn private_key_hex(&self) -> String {
        format!("{:#x}", self.private_key)
    }

    /// A local signer for this account.
    pub fn signer(&self) -> Result<PrivateKeySigner> {
        Ok(PrivateKeySigner::from_bytes(&self.private_key).map_err(LocalSignerError::from)?)
    }
}

impl From<PrivateKeySigner> for DerivedAccount {
    fn from(signer: PrivateKeySigner) -> Self {
        Self {
            address: signer.address(),
            private_key: signer.to_bytes(),
        }
    }
}

/// Derives accounts (ie private keys and addresses) from an accounts configuration.
pub fn derive_accounts(config: &AccountsConfig) -> Result<Vec<DerivedAccount>> {
    match config {
        AccountsConfig::PrivateKeys(keys) => keys.iter().map(from_private_key).collect(),
        AccountsConfig::HdWallet(hd) => from_hd_wallet(hd),
    }
}

fn from_private_key(config: &PrivateKeyConfig) -> Result<DerivedAccount> {
    let signer: PrivateKeySigner = config.private_key.trim().parse()?;
    Ok(signer.into())
}

fn from_hd_wallet(config: &HdWalletConfig) -> Result<Vec<DerivedAccount>> {
    let prefix = if config.path.ends_with('/') {
        config.path.clone()
    } else {
        format!("{}/", config.path)
    };
    (0..config.count)
        .map(|i| {
            let index = config.initial_index as usize + i;
            let signer = MnemonicBuilder::<English>::default()
                .phrase(config.mnemonic.as_str())
                .password(config.passphrase.as_str())
                .derivation_path(format!("{prefix}{index}"))?
                .build()?;
            Ok(signer.into())
        })
        .collect()
}
