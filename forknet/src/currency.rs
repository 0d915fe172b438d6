// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Currencies and decimal-aware amounts.

use std::fmt;

use alloy::primitives::{
    utils::{parse_units, ParseUnits},
    Address, U256,
};

use crate::error::{Error, Result};

/// Either the chain's native coin or an ERC-20 token.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Currency {
    Native(NativeCurrency),
    Token(Token),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NativeCurrency {
    pub chain_id: u64,
    pub symbol: String,
    pub decimals: u8,
}

impl NativeCurrency {
    pub fn ether(chain_id: u64) -> Self {
        Self {
            chain_id,
            symbol: "ETH".into(),
            decimals: 18,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Token {
    pub chain_id: u64,
    pub address: Address,
    pub decimals: u8,
    pub symbol: String,
}

impl Token {
    pub fn new(chain_id: u64, address: Address, decimals: u8, symbol: impl Into<String>) -> Self {
        Self {
            chain_id,
            address,
            decimals,
            symbol: symbol.into(),
        }
    }
}

impl Currency {
    pub fn ether(chain_id: u64) -> Self {
        Self::Native(NativeCurrency::ether(chain_id))
    }

    pub fn decimals(&self) -> u8 {
        match self {
            Self::Native(native) => native.decimals,
            Self::Token(token) => token.decimals,
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            Self::Native(native) => &native.symbol,
            Self::Token(token) => &token.symbol,
        }
    }

    pub fn chain_id(&self) -> u64 {
        match self {
            Self::Native(native) => native.chain_id,
            Self::Token(token) => token.chain_id,
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native(_))
    }
}

impl From<NativeCurrency> for Currency {
    fn from(native: NativeCurrency) -> Self {
        Self::Native(native)
    }
}

impl From<Token> for Currency {
    fn from(token: Token) -> Self {
        Self::Token(token)
    }
}

/// A raw integer amount of a currency.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CurrencyAmount {
    currency: Currency,
    raw: U256,
}

impl CurrencyAmount {
    pub fn from_raw(currency: impl Into<Currency>, raw: U256) -> Self {
        Self {
            currency: currency.into(),
            raw,
        }
    }

    /// Parses a decimal string (eg. `"1.5"`) in units of the currency.
    ///
    /// Amounts are unsigned, so a negative string is rejected.
    pub fn from_exact(currency: impl Into<Currency>, exact: &str) -> Result<Self> {
        let currency = currency.into();
        let raw = match parse_units(exact, currency.decimals())? {
            ParseUnits::U256(raw) => raw,
            ParseUnits::I256(raw) if !raw.is_negative() => raw.into_raw(),
            ParseUnits::I256(_) => return Err(Error::NegativeAmount(exact.into())),
        };
        Ok(Self { currency, raw })
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn raw(&self) -> U256 {
        self.raw
    }

    /// Scales the raw amount, saturating at `U256::MAX`.
    pub fn multiply(&self, factor: U256) -> Self {
        Self {
            currency: self.currency.clone(),
            raw: self.raw.saturating_mul(factor),
        }
    }

    /// The amount in whole units, without trailing zeros.
    pub fn to_exact(&self) -> String {
        let decimals = self.currency.decimals();
        let digits = self.raw.to_string();
        if decimals == 0 {
            return digits;
        }
        let decimals = decimals as usize;
        let padded = format!("{digits:0>width$}", width = decimals + 1);
        let (whole, fraction) = padded.split_at(padded.len() - decimals);
        let fraction = fraction.trim_end_matches('0');
        if fraction.is_empty() {
            whole.to_string()
        } else {
            format!("{whole}.{fraction}")
        }
    }
}

impl fmt::Display for CurrencyAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.to_exact(), self.currency.symbol())
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;

    use super::*;

    fn usdt() -> Token {
        Token::new(
            1,
            address!("0xdAC17F958D2ee523a2206206994597C13D831ec7"),
            6,
            "USDT",
        )
    }

    #[test]
    fn formats_exact_amounts() {
        let eth = Currency::ether(1);
        assert_eq!(CurrencyAmount::from_raw(eth.clone(), U256::from(0)).to_exact(), "0");
        assert_eq!(CurrencyAmount::from_raw(eth.clone(), U256::from(1)).to_exact(), "0.000000000000000001");
        assert_eq!(
            CurrencyAmount::from_raw(eth, U256::from(6_000_000u64) * U256::from(10u64).pow(U256::from(18u64)))
                .to_exact(),
            "6000000"
        );
        assert_eq!(CurrencyAmount::from_raw(usdt(), U256::from(1_500_000)).to_exact(), "1.5");
    }

    #[test]
    fn formats_zero_decimals() {
        let token = Token::new(1, Address::ZERO, 0, "NFT");
        assert_eq!(CurrencyAmount::from_raw(token, U256::from(42)).to_exact(), "42");
    }

    #[test]
    fn parses_exact_amounts() {
        let amount = CurrencyAmount::from_exact(usdt(), "10000").unwrap();
        assert_eq!(amount.raw(), U256::from(10_000_000_000u64));
        assert_eq!(amount.to_string(), "10000 USDT");

        let amount = CurrencyAmount::from_exact(Currency::ether(1), "2296896.400432088050687197").unwrap();
        assert_eq!(amount.to_exact(), "2296896.400432088050687197");
    }

    #[test]
    fn rejects_negative_amounts() {
        let err = CurrencyAmount::from_exact(usdt(), "-5").unwrap_err();
        assert!(matches!(err, Error::NegativeAmount(ref exact) if exact == "-5"));
        assert_eq!(err.to_string(), "negative amount -5; currency amounts are unsigned");
    }

    #[test]
    fn multiplies() {
        let amount = CurrencyAmount::from_raw(usdt(), U256::from(1)).multiply(U256::from(2));
        assert_eq!(amount.raw(), U256::from(2u64));
        assert_eq!(
            CurrencyAmount::from_raw(usdt(), U256::MAX).multiply(U256::from(2)).raw(),
            U256::MAX
        );
    }
}
