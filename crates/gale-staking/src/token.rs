// crates/gale-staking/src/token.rs
//
// Base-unit amounts and the WIND display type.
//
// Both the stake asset and the reward asset use 18 decimals. The smallest
// unit is the "wei"; 1 WIND = 10^18 wei. All ledger arithmetic is integer
// wei, so no fixed-point or floating-point division ever happens.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use gale_core::GaleError;

/// Number of decimal places of both ledger assets.
pub const DECIMALS: u32 = 18;

/// Number of wei in one WIND. 1 WIND = 10^18 wei.
pub const WEI_PER_WIND: u128 = 10u128.pow(DECIMALS);

/// Type alias for wei, the smallest unit of either asset.
pub type Wei = u128;

/// A token amount.
///
/// Wraps an amount in wei and renders it as a decimal WIND value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Wind {
    /// Amount in wei (1 WIND = 10^18 wei).
    pub wei: Wei,
}

impl Wind {
    /// Create an amount from a wei value.
    pub fn from_wei(wei: Wei) -> Self {
        Self { wei }
    }

    /// Create an amount from a whole number of tokens.
    ///
    /// Saturates at `u128::MAX` wei.
    pub fn from_whole(tokens: u64) -> Self {
        Self {
            wei: (tokens as u128).saturating_mul(WEI_PER_WIND),
        }
    }

    /// Returns zero.
    pub fn zero() -> Self {
        Self { wei: 0 }
    }
}

impl FromStr for Wind {
    type Err = GaleError;

    /// Parse a decimal token amount such as `"12"`, `"0.1"` or `"1_000.5"`.
    ///
    /// # Example
    /// ```
    /// use gale_staking::token::Wind;
    /// let amount: Wind = "0.1".parse().unwrap();
    /// assert_eq!(amount.wei, 100_000_000_000_000_000);
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned: String = s.trim().chars().filter(|c| *c != '_').collect();
        let (whole, frac) = match cleaned.split_once('.') {
            Some((w, f)) => (w, f),
            None => (cleaned.as_str(), ""),
        };

        let invalid = || GaleError::InvalidAmount(format!("Cannot parse token amount {:?}", s));

        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if frac.len() > DECIMALS as usize {
            return Err(GaleError::InvalidAmount(format!(
                "Token amount {:?} has more than {} decimal places",
                s, DECIMALS
            )));
        }
        if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let whole_wei = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<u128>()
                .map_err(|_| invalid())?
                .checked_mul(WEI_PER_WIND)
                .ok_or_else(invalid)?
        };
        let frac_wei = if frac.is_empty() {
            0
        } else {
            let padded = format!("{:0<width$}", frac, width = DECIMALS as usize);
            padded.parse::<u128>().map_err(|_| invalid())?
        };

        let wei = whole_wei.checked_add(frac_wei).ok_or_else(invalid)?;
        Ok(Self { wei })
    }
}

impl Add for Wind {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            wei: self.wei.saturating_add(rhs.wei),
        }
    }
}

impl Sub for Wind {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            wei: self.wei.saturating_sub(rhs.wei),
        }
    }
}

impl fmt::Display for Wind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.wei / WEI_PER_WIND;
        let frac = self.wei % WEI_PER_WIND;
        if frac == 0 {
            write!(f, "{} WIND", whole)
        } else {
            // Up to 18 decimal places, trailing zeros trimmed
            let frac_str = format!("{:018}", frac);
            let trimmed = frac_str.trim_end_matches('0');
            write!(f, "{}.{} WIND", whole, trimmed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wei_per_wind() {
        assert_eq!(WEI_PER_WIND, 1_000_000_000_000_000_000);
    }

    #[test]
    fn test_parse_whole_and_fraction() {
        let amount: Wind = "1000".parse().unwrap();
        assert_eq!(amount, Wind::from_whole(1000));

        let amount: Wind = "0.1".parse().unwrap();
        assert_eq!(amount.wei, WEI_PER_WIND / 10);

        let amount: Wind = ".5".parse().unwrap();
        assert_eq!(amount.wei, WEI_PER_WIND / 2);

        let amount: Wind = "1_000.000000000000000001".parse().unwrap();
        assert_eq!(amount.wei, 1000 * WEI_PER_WIND + 1);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<Wind>().is_err());
        assert!(".".parse::<Wind>().is_err());
        assert!("1.2.3".parse::<Wind>().is_err());
        assert!("-1".parse::<Wind>().is_err());
        assert!("0.0000000000000000001".parse::<Wind>().is_err());
    }

    #[test]
    fn test_add_sub() {
        let a = Wind::from_whole(3);
        let b: Wind = "1.5".parse().unwrap();
        assert_eq!((a - b).wei, 3 * WEI_PER_WIND / 2);
        assert_eq!((a + b).wei, 9 * WEI_PER_WIND / 2);
    }

    #[test]
    fn test_sub_saturating() {
        let c = Wind::from_whole(1) - Wind::from_whole(2);
        assert_eq!(c, Wind::zero());
    }

    #[test]
    fn test_display() {
        assert_eq!(Wind::from_whole(42).to_string(), "42 WIND");
        assert_eq!(Wind::from_wei(WEI_PER_WIND / 10).to_string(), "0.1 WIND");
        assert_eq!(Wind::from_wei(1).to_string(), "0.000000000000000001 WIND");
        assert_eq!(Wind::zero().to_string(), "0 WIND");
    }
}
