//! Prices
//!
//! Listing prices travel as base-10 integers in the payment token's smallest
//! unit. [`Price`] keeps that representation and converts to display units
//! only when rendering.

use std::fmt::{Display, Formatter, Result as FmtResult};

use ethers::types::U256;
use thiserror::Error;

/// Decimal scale of the payment token's display unit.
pub const TOKEN_DECIMALS: usize = 18;

/// Errors constructing a [`Price`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriceError {
    /// The literal is not a base-10 smallest-unit amount.
    #[error("invalid price literal {0:?}")]
    InvalidLiteral(String),
}

/// A price in the payment token's smallest unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(U256);

impl Price {
    /// Wrap a smallest-unit amount.
    #[must_use]
    pub const fn from_wei(wei: U256) -> Self {
        Price(wei)
    }

    /// The smallest-unit amount.
    #[must_use]
    pub const fn as_wei(&self) -> U256 {
        self.0
    }

    /// Whether the price is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Parse a base-10 smallest-unit literal, the contract's own encoding.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::InvalidLiteral`] if the literal is not a
    /// base-10 integer that fits 256 bits.
    pub fn from_dec_str(literal: &str) -> Result<Self, PriceError> {
        match U256::from_dec_str(literal) {
            Ok(wei) => Ok(Price(wei)),
            Err(_parse_error) => Err(PriceError::InvalidLiteral(literal.to_owned())),
        }
    }

    /// Render in display units with the given decimal scale.
    ///
    /// Trailing fractional zeros are trimmed but at least one fractional
    /// digit is kept, so one whole token renders as `"1.0"`. A scale wider
    /// than 77 digits exceeds 256 bits, leaving no whole part at all.
    #[must_use]
    pub fn display_units(&self, decimals: usize) -> String {
        let scale = U256::from(10_u64).checked_pow(U256::from(decimals));
        let (whole, remainder) = match scale {
            Some(scale) => (self.0 / scale, self.0 % scale),
            None => (U256::zero(), self.0),
        };

        if remainder.is_zero() {
            return format!("{whole}.0");
        }

        let fraction = format!("{remainder:0>decimals$}");
        let trimmed = fraction.trim_end_matches('0');

        format!("{whole}.{trimmed}")
    }
}

impl Display for Price {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.display_units(TOKEN_DECIMALS))
    }
}

impl From<U256> for Price {
    fn from(wei: U256) -> Self {
        Price(wei)
    }
}

impl From<Price> for U256 {
    fn from(price: Price) -> Self {
        price.0
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn one_whole_token_renders_with_single_zero() -> TestResult {
        let price = Price::from_dec_str("1000000000000000000")?;

        assert_eq!(price.to_string(), "1.0");

        Ok(())
    }

    #[test]
    fn fractional_part_is_trimmed() -> TestResult {
        let price = Price::from_dec_str("1500000000000000000")?;

        assert_eq!(price.to_string(), "1.5");

        Ok(())
    }

    #[test]
    fn zero_price_renders_as_zero_point_zero() {
        let price = Price::from_wei(U256::zero());

        assert_eq!(price.to_string(), "0.0");
    }

    #[test]
    fn single_wei_keeps_full_scale() -> TestResult {
        let price = Price::from_dec_str("1")?;

        assert_eq!(price.to_string(), "0.000000000000000001");

        Ok(())
    }

    #[test]
    fn sub_token_amounts_keep_leading_zero() -> TestResult {
        let price = Price::from_dec_str("500000000000000000")?;

        assert_eq!(price.to_string(), "0.5");

        Ok(())
    }

    #[test]
    fn amounts_beyond_u128_render() -> TestResult {
        // 123 * 10^36 wei: the whole part alone exceeds u64.
        let price = Price::from_dec_str("123000000000000000000000000000000000000")?;

        assert_eq!(price.to_string(), "123000000000000000000.0");

        Ok(())
    }

    #[test]
    fn display_units_honours_other_scales() -> TestResult {
        let price = Price::from_dec_str("1230000")?;

        assert_eq!(price.display_units(6), "1.23");

        Ok(())
    }

    #[test]
    fn scales_beyond_256_bits_are_purely_fractional() {
        let single = Price::from_wei(U256::one());
        let max = Price::from_wei(U256::MAX);

        assert_eq!(single.display_units(78), format!("0.{}1", "0".repeat(77)));
        assert!(max.display_units(100).starts_with("0.0"));
    }

    #[test]
    fn invalid_literal_is_rejected() {
        let result = Price::from_dec_str("12-34");

        assert_eq!(result, Err(PriceError::InvalidLiteral("12-34".to_owned())));
    }

    #[test]
    fn wei_roundtrip() {
        let wei = U256::from(42_u64);
        let price = Price::from_wei(wei);

        assert_eq!(price.as_wei(), wei);
        assert_eq!(U256::from(price), wei);
    }
}
