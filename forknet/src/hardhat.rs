// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Scripted control of a forked network: forking, funding, balances and approvals.

use std::sync::Arc;

use alloy::{
    network::{EthereumWallet, ReceiptResponse},
    primitives::{Address, TxHash, U256},
    providers::{Provider, ProviderBuilder},
    signers::Signer,
};
use futures_util::{
    future::{try_join_all, BoxFuture, Shared},
    FutureExt,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::{
    accounts::DerivedAccount,
    config::ForkingConfig,
    connection::Connection,
    currency::{Currency, CurrencyAmount, NativeCurrency, Token},
    erc20::erc20,
    error::{Error, Result},
    provider::{AccountProvider, JsonRpcSigner},
    whales::WHALES,
};

/// A single item, or a sequence of them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(items: Vec<T>) -> Self {
        Self::Many(items)
    }
}

impl<T, const N: usize> From<[T; N]> for OneOrMany<T> {
    fn from(items: [T; N]) -> Self {
        Self::Many(items.into())
    }
}

macro_rules! one_of {
    ($($from:ty => $to:ty),* $(,)?) => {
        $(
            impl From<$from> for OneOrMany<$to> {
                fn from(item: $from) -> Self {
                    Self::One(item.into())
                }
            }
        )*
    };
}

one_of! {
    CurrencyAmount => CurrencyAmount,
    Currency => Currency,
    NativeCurrency => Currency,
    Token => Currency,
    Approval => Approval,
    Currency => Approval,
    Token => Approval,
    CurrencyAmount => Approval,
}

/// Anything with an address.
pub trait AddressLike {
    fn to_address(&self) -> Address;
}

impl AddressLike for Address {
    fn to_address(&self) -> Address {
        *self
    }
}

impl AddressLike for DerivedAccount {
    fn to_address(&self) -> Address {
        self.address()
    }
}

impl AddressLike for JsonRpcSigner {
    fn to_address(&self) -> Address {
        self.address()
    }
}

impl AddressLike for AccountProvider {
    fn to_address(&self) -> Address {
        self.address()
    }
}

impl AddressLike for Account {
    fn to_address(&self) -> Address {
        match self {
            Self::Raw(account) => account.address(),
            Self::Signer(signer) => signer.address(),
        }
    }
}

impl<T: AddressLike + ?Sized> AddressLike for &T {
    fn to_address(&self) -> Address {
        (**self).to_address()
    }
}

/// The owner of an approval.
#[derive(Clone, Debug)]
pub enum Account {
    /// Signs locally with its private key.
    Raw(DerivedAccount),
    /// Signs through the node.
    Signer(JsonRpcSigner),
}

impl From<DerivedAccount> for Account {
    fn from(account: DerivedAccount) -> Self {
        Self::Raw(account)
    }
}

impl From<&DerivedAccount> for Account {
    fn from(account: &DerivedAccount) -> Self {
        Self::Raw(*account)
    }
}

impl From<JsonRpcSigner> for Account {
    fn from(signer: JsonRpcSigner) -> Self {
        Self::Signer(signer)
    }
}

/// An allowance to grant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Approval {
    /// Unlimited.
    Currency(Currency),
    Amount(CurrencyAmount),
}

impl Approval {
    pub fn currency(&self) -> &Currency {
        match self {
            Self::Currency(currency) => currency,
            Self::Amount(amount) => amount.currency(),
        }
    }

    pub fn limit(&self) -> U256 {
        match self {
            Self::Currency(_) => U256::MAX,
            Self::Amount(amount) => amount.raw(),
        }
    }
}

impl From<Currency> for Approval {
    fn from(currency: Currency) -> Self {
        Self::Currency(currency)
    }
}

impl From<Token> for Approval {
    fn from(token: Token) -> Self {
        Self::Currency(token.into())
    }
}

impl From<CurrencyAmount> for Approval {
    fn from(amount: CurrencyAmount) -> Self {
        Self::Amount(amount)
    }
}

type Impersonation = Shared<BoxFuture<'static, Result<(), Arc<Error>>>>;

#[derive(Serialize)]
struct ResetParams<'a> {
    forking: ForkParams<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ForkParams<'a> {
    json_rpc_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    block_number: Option<u64>,
}

/// Handle to a running forked network and its derived accounts.
#[derive(Debug)]
pub struct Hardhat {
    url: String,
    accounts: Vec<DerivedAccount>,
    balances: Vec<U256>,
    providers: Vec<AccountProvider>,
    connection: Connection,
    forking: ForkingConfig,
}

impl Hardhat {
    /// `balances[i]` is the balance `accounts[i]` is seeded with.
    pub fn new(
        url: impl Into<String>,
        accounts: Vec<DerivedAccount>,
        balances: Vec<U256>,
        connection: Connection,
        forking: ForkingConfig,
    ) -> Result<Self> {
        if accounts.is_empty() {
            return Err(Error::NoAccounts);
        }
        let providers = accounts
            .iter()
            .map(|account| AccountProvider::new(account.address(), connection.clone()))
            .collect();
        Ok(Self {
            url: url.into(),
            accounts,
            balances,
            providers,
            connection,
            forking,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The first account.
    pub fn account(&self) -> &DerivedAccount {
        &self.accounts[0]
    }

    /// The first account's provider.
    pub fn provider(&self) -> &AccountProvider {
        &self.providers[0]
    }

    pub fn accounts(&self) -> &[DerivedAccount] {
        &self.accounts
    }

    pub fn providers(&self) -> &[AccountProvider] {
        &self.providers
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Resets the fork to `block_number`, or the configured block.
    pub async fn fork(&self, block_number: Option<u64>) -> Result<()> {
        let params = ResetParams {
            forking: ForkParams {
                json_rpc_url: &self.forking.url,
                block_number: block_number.or(self.forking.block_number),
            },
        };
        self.send("hardhat_reset", vec![serde_json::to_value(params)?])
            .await?;
        self.seed_accounts().await
    }

    pub async fn fork_and_fund(
        &self,
        address: impl AddressLike,
        amounts: impl Into<OneOrMany<CurrencyAmount>>,
    ) -> Result<()> {
        self.fork(None).await?;
        self.fund(address, amounts, None).await
    }

    pub async fn get_balance(
        &self,
        address: impl AddressLike,
        currency: &Currency,
    ) -> Result<CurrencyAmount> {
        let address = address.to_address();
        let raw = match currency {
            Currency::Native(_) => self.connection.root().get_balance(address).await?,
            Currency::Token(token) => {
                erc20(token, self.connection.root())
                    .balanceOf(address)
                    .call()
                    .await?
            }
        };
        Ok(CurrencyAmount::from_raw(currency.clone(), raw))
    }

    pub async fn get_balances(
        &self,
        address: impl AddressLike,
        currencies: impl Into<OneOrMany<Currency>>,
    ) -> Result<Vec<CurrencyAmount>> {
        let address = address.to_address();
        let currencies = currencies.into().into_vec();
        try_join_all(
            currencies
                .iter()
                .map(|currency| self.get_balance(address, currency)),
        )
        .await
    }

    /// Same as [`Hardhat::fund`].
    pub async fn set_balance(
        &self,
        address: impl AddressLike,
        amounts: impl Into<OneOrMany<CurrencyAmount>>,
        whales: Option<&[Address]>,
    ) -> Result<()> {
        self.fund(address, amounts, whales).await
    }

    /// Funds `address` with each amount.
    ///
    /// Native amounts are set outright. Tokens are transferred from the first of `whales`
    /// (default [`WHALES`]) after impersonating it. An empty whale list skips tokens.
    pub async fn fund(
        &self,
        address: impl AddressLike,
        amounts: impl Into<OneOrMany<CurrencyAmount>>,
        whales: Option<&[Address]>,
    ) -> Result<()> {
        let address = address.to_address();
        let amounts = amounts.into().into_vec();
        let whales = whales.unwrap_or(WHALES);
        let impersonations: Vec<Impersonation> = if amounts.iter().any(|a| !a.currency().is_native()) {
            whales.iter().map(|&whale| self.impersonate(whale)).collect()
        } else {
            Vec::new()
        };
        try_join_all(
            amounts
                .iter()
                .map(|amount| self.fund_amount(address, amount, whales, &impersonations)),
        )
        .await?;
        Ok(())
    }

    async fn fund_amount(
        &self,
        address: Address,
        amount: &CurrencyAmount,
        whales: &[Address],
        impersonations: &[Impersonation],
    ) -> Result<()> {
        let token = match amount.currency() {
            Currency::Native(_) => return self.set_native_balance(address, amount.raw()).await,
            Currency::Token(token) => token,
        };
        let (Some(&whale), Some(impersonation)) = (whales.first(), impersonations.first()) else {
            return Ok(());
        };
        impersonation
            .clone()
            .await
            .map_err(|source| Error::Impersonation { whale, source })?;
        let signer = self.connection.signer(whale);
        let pending = erc20(token, signer.provider())
            .transfer(address, amount.raw())
            .from(signer.address())
            .send()
            .await
            .map_err(|source| Error::Funding {
                amount: amount.to_exact(),
                symbol: token.symbol.clone(),
                source,
            })?;
        self.confirm(*pending.tx_hash()).await
    }

    /// Waits for `hash` to be mined and fails if it reverted.
    async fn confirm(&self, hash: TxHash) -> Result<()> {
        let receipt = self.connection.wait_for_transaction(hash).await?;
        if !receipt.status() {
            return Err(Error::TransactionReverted(hash));
        }
        Ok(())
    }

    /// Grants `spender` an allowance from `account` for each approval. Native currencies are skipped.
    pub async fn approve(
        &self,
        account: impl Into<Account>,
        spender: impl AddressLike,
        approvals: impl Into<OneOrMany<Approval>>,
    ) -> Result<()> {
        let spender = spender.to_address();
        let approvals = approvals.into().into_vec();
        match account.into() {
            Account::Raw(account) => {
                let chain_id = self.connection.chain_id().await?;
                let wallet = EthereumWallet::from(account.signer()?.with_chain_id(Some(chain_id)));
                let provider = ProviderBuilder::new()
                    .wallet(wallet)
                    .connect_provider(self.connection.root().clone());
                for approval in &approvals {
                    self.approve_with(&provider, account.address(), spender, approval)
                        .await?;
                }
            }
            Account::Signer(signer) => {
                for approval in &approvals {
                    self.approve_with(signer.provider(), signer.address(), spender, approval)
                        .await?;
                }
            }
        }
        Ok(())
    }

    async fn approve_with<P: Provider>(
        &self,
        provider: P,
        owner: Address,
        spender: Address,
        approval: &Approval,
    ) -> Result<()> {
        let Currency::Token(token) = approval.currency() else {
            return Ok(());
        };
        let pending = erc20(token, provider)
            .approve(spender, approval.limit())
            .from(owner)
            .send()
            .await?;
        self.confirm(*pending.tx_hash()).await
    }

    /// Sends a raw JSON-RPC request to the node.
    pub async fn send(&self, method: &str, params: Vec<Value>) -> Result<Value> {
        self.connection.request(method, params).await
    }

    /// Lets the node sign for every derived account and restores its seed balance.
    pub async fn seed_accounts(&self) -> Result<()> {
        try_join_all(
            self.accounts
                .iter()
                .zip(&self.balances)
                .map(|(account, &balance)| async move {
                    self.send("hardhat_impersonateAccount", vec![json!(account.address())])
                        .await?;
                    self.set_native_balance(account.address(), balance).await
                }),
        )
        .await?;
        Ok(())
    }

    async fn set_native_balance(&self, address: Address, balance: U256) -> Result<()> {
        self.send(
            "hardhat_setBalance",
            vec![json!(address), json!(format!("{balance:#x}"))],
        )
        .await?;
        Ok(())
    }

    fn impersonate(&self, whale: Address) -> Impersonation {
        let connection = self.connection.clone();
        let task = tokio::spawn(async move {
            connection
                .request("hardhat_impersonateAccount", vec![json!(whale)])
                .await
        });
        async move {
            match task.await {
                Ok(Ok(_)) => Ok(()),
                Ok(Err(err)) => Err(Arc::new(err)),
                Err(err) => Err(Arc::new(err.into())),
            }
        }
        .boxed()
        .shared()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use alloy::primitives::address;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        accounts::derive_accounts,
        config::{AccountsConfig, HdWalletConfig},
        testing::stub_node,
    };

    const UNI: Address = address!("0x1f9840a85d5aF5bf1D1762F925BDADdC4201F984");

    fn uni() -> Token {
        Token::new(1, UNI, 18, "UNI")
    }

    fn hardhat(count: usize) -> Result<Hardhat> {
        hardhat_at("http://127.0.0.1:8545", count)
    }

    fn hardhat_at(url: &str, count: usize) -> Result<Hardhat> {
        let accounts = derive_accounts(&AccountsConfig::HdWallet(HdWalletConfig {
            count,
            ..Default::default()
        }))?;
        let balances = vec![U256::ZERO; accounts.len()];
        let connection = Connection::new(url, Duration::from_millis(10))?;
        let forking = ForkingConfig {
            url: "http://upstream".into(),
            block_number: Some(13582625),
        };
        Hardhat::new(url, accounts, balances, connection, forking)
    }

    #[test]
    fn binds_one_provider_per_account() -> eyre::Result<()> {
        let hardhat = hardhat(3)?;
        let addresses: Vec<_> = hardhat.accounts().iter().map(DerivedAccount::address).collect();
        let bound: Vec<_> = hardhat.providers().iter().map(AccountProvider::address).collect();
        assert_eq!(bound, addresses);
        assert_eq!(hardhat.account(), &hardhat.accounts()[0]);
        assert_eq!(hardhat.provider().address(), addresses[0]);
        assert_eq!(hardhat.providers()[2].get_signer().address(), addresses[2]);
        Ok(())
    }

    #[test]
    fn requires_an_account() {
        assert!(matches!(hardhat(0), Err(Error::NoAccounts)));
    }

    #[test]
    fn wraps_single_items() {
        let amount = CurrencyAmount::from_raw(uni(), U256::from(1));
        assert_eq!(
            OneOrMany::<CurrencyAmount>::from(amount.clone()).into_vec(),
            vec![amount.clone()]
        );
        assert_eq!(
            OneOrMany::<Currency>::from([Currency::ether(1), uni().into()]).into_vec().len(),
            2
        );
        assert_eq!(
            OneOrMany::<Approval>::from(amount.clone()).into_vec(),
            vec![Approval::Amount(amount)]
        );
        assert_eq!(
            OneOrMany::<Approval>::from(uni()).into_vec(),
            vec![Approval::Currency(uni().into())]
        );
    }

    #[test]
    fn approval_limits() {
        assert_eq!(Approval::from(uni()).limit(), U256::MAX);
        let amount = CurrencyAmount::from_raw(uni(), U256::from(7));
        assert_eq!(Approval::from(amount).limit(), U256::from(7));
        assert!(Approval::from(Currency::ether(1)).currency().is_native());
    }

    #[test]
    fn resolves_addresses() -> eyre::Result<()> {
        let hardhat = hardhat(2)?;
        let account = *hardhat.account();
        assert_eq!(account.to_address(), account.address());
        assert_eq!(hardhat.provider().to_address(), account.address());
        assert_eq!(hardhat.provider().get_signer().to_address(), account.address());
        assert_eq!(Account::from(&account).to_address(), account.address());
        assert_eq!(UNI.to_address(), UNI);
        Ok(())
    }

    #[test]
    fn serializes_reset_params() -> eyre::Result<()> {
        let params = ResetParams {
            forking: ForkParams {
                json_rpc_url: "http://upstream",
                block_number: Some(3991688),
            },
        };
        assert_eq!(
            serde_json::to_value(params)?,
            json!({ "forking": { "jsonRpcUrl": "http://upstream", "blockNumber": 3991688 } })
        );
        let params = ResetParams {
            forking: ForkParams {
                json_rpc_url: "http://upstream",
                block_number: None,
            },
        };
        assert_eq!(
            serde_json::to_value(params)?,
            json!({ "forking": { "jsonRpcUrl": "http://upstream" } })
        );
        Ok(())
    }

    #[tokio::test]
    async fn skips_tokens_without_whales() -> eyre::Result<()> {
        let hardhat = hardhat(1)?;
        let amount = CurrencyAmount::from_raw(uni(), U256::from(1));
        hardhat.fund(UNI, amount, Some(&[][..])).await?;
        Ok(())
    }

    #[tokio::test]
    async fn skips_native_approvals() -> eyre::Result<()> {
        let hardhat = hardhat(1)?;
        let signer = hardhat.provider().get_signer();
        hardhat.approve(signer, UNI, Currency::ether(1)).await?;
        Ok(())
    }

    const TX: TxHash = TxHash::repeat_byte(0x11);

    /// A node that accepts any transaction and mines it with `status`.
    async fn mining(status: &'static str) -> String {
        stub_node(move |method| match method {
            "eth_sendTransaction" => json!(TX),
            "eth_getTransactionReceipt" => json!({
                "type": "0x2",
                "status": status,
                "cumulativeGasUsed": "0xb44c",
                "logs": [],
                "logsBloom": format!("0x{}", "00".repeat(256)),
                "transactionHash": TX,
                "transactionIndex": "0x0",
                "blockHash": TxHash::repeat_byte(0x22),
                "blockNumber": "0xcf4b21",
                "gasUsed": "0xb44c",
                "effectiveGasPrice": "0x3b9aca00",
                "from": Address::repeat_byte(0x33),
                "to": UNI,
                "contractAddress": null,
            }),
            _ => Value::Null,
        })
        .await
    }

    #[tokio::test]
    async fn approves_through_the_node() -> eyre::Result<()> {
        let hardhat = hardhat_at(&mining("0x1").await, 1)?;
        let signer = hardhat.provider().get_signer();
        hardhat.approve(signer, UNI, uni()).await?;
        Ok(())
    }

    #[tokio::test]
    async fn reports_reverted_approvals() -> eyre::Result<()> {
        let hardhat = hardhat_at(&mining("0x0").await, 1)?;
        let signer = hardhat.provider().get_signer();
        let err = hardhat.approve(signer, UNI, uni()).await.unwrap_err();
        assert!(matches!(err, Error::TransactionReverted(hash) if hash == TX));
        Ok(())
    }
}
