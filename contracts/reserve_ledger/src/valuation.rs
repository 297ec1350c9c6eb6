use crate::error::Error;
use crate::storage::Valuation;
use soroban_sdk::{vec, Address, Env, IntoVal, Symbol};

/// Maps an asset amount to ledger units. Implementations must be pure for
/// a given ledger state: no storage writes, no token movements.
pub trait ValuationStrategy {
    fn value(&self, env: &Env, asset: &Address, amount: i128) -> Result<i128, Error>;
}

impl ValuationStrategy for Valuation {
    fn value(&self, env: &Env, asset: &Address, amount: i128) -> Result<i128, Error> {
        match self {
            Valuation::Normalize(asset_decimals, unit_decimals) => {
                normalize(amount, *asset_decimals, *unit_decimals)
            }
            Valuation::Calculator(calculator) => {
                let value: i128 = env.invoke_contract(
                    calculator,
                    &Symbol::new(env, "valuation"),
                    vec![env, asset.into_val(env), amount.into_val(env)],
                );
                if value < 0 {
                    return Err(Error::InvalidParameters);
                }
                Ok(value)
            }
        }
    }
}

/// Rescale `amount` from `from_decimals` to `to_decimals`, rounding down
///
/// Example: 1,000 USDC (6 decimals) into 9-decimal ledger units
/// = 1_000_000_000 × 10^3 = 1_000_000_000_000
pub fn normalize(amount: i128, from_decimals: u32, to_decimals: u32) -> Result<i128, Error> {
    if amount < 0 {
        return Err(Error::InvalidParameters);
    }

    if to_decimals >= from_decimals {
        let factor = 10i128
            .checked_pow(to_decimals - from_decimals)
            .ok_or(Error::InvalidParameters)?;
        amount.checked_mul(factor).ok_or(Error::InvalidParameters)
    } else {
        let factor = 10i128
            .checked_pow(from_decimals - to_decimals)
            .ok_or(Error::InvalidParameters)?;
        Ok(amount / factor)
    }
}
