// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Providers and signers bound to a single account.

use alloy::{
    primitives::Address,
    providers::{Provider, ProviderCall, RootProvider},
    rpc::client::NoParams,
};

use crate::connection::Connection;

/// A provider over the shared connection that only knows about one account.
///
/// `get_accounts` lists only that account and [`AccountProvider::get_signer`] signs as it;
/// every other call goes to the shared connection unchanged.
#[derive(Clone, Debug)]
pub struct AccountProvider {
    address: Address,
    connection: Connection,
}

impl AccountProvider {
    pub fn new(address: Address, connection: Connection) -> Self {
        Self {
            address,
            connection,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn get_signer(&self) -> JsonRpcSigner {
        self.connection.signer(self.address)
    }
}

impl Provider for AccountProvider {
    fn root(&self) -> &RootProvider {
        self.connection.root()
    }

    fn get_accounts(&self) -> ProviderCall<NoParams, Vec<Address>> {
        ProviderCall::ready(Ok(vec![self.address]))
    }
}

/// Signs by asking the node to send transactions from an unlocked or impersonated address.
#[derive(Clone, Debug)]
pub struct JsonRpcSigner {
    address: Address,
    connection: Connection,
}

impl JsonRpcSigner {
    pub fn new(address: Address, connection: Connection) -> Self {
        Self {
            address,
            connection,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn provider(&self) -> &RootProvider {
        self.connection.root()
    }
}
