#![no_std]

mod error;
mod events;
mod permissions;
mod storage;
mod valuation;

#[cfg(test)]
mod test;

pub use error::Error;
pub use storage::{LedgerState, Role, Valuation};
pub use valuation::ValuationStrategy;

use events::*;
use permissions::Permissions;
use storage::DataKey;

use soroban_sdk::{contract, contractimpl, token, vec, Address, Env, IntoVal, Symbol};

#[contract]
pub struct ReserveLedger;

#[contractimpl]
impl ReserveLedger {
    // ============================================
    // INITIALIZATION & GOVERNANCE
    // ============================================

    /// Initialize the ledger against the protocol token it mints
    ///
    /// # Errors
    /// - `AlreadyInitialized`: Contract already initialized
    pub fn initialize(env: Env, governor: Address, protocol_token: Address) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::AlreadyInitialized);
        }

        governor.require_auth();

        let decimals = token::Client::new(&env, &protocol_token).decimals();

        env.storage().instance().set(&DataKey::Initialized, &true);
        env.storage().instance().set(&DataKey::Governor, &governor);
        env.storage().instance().set(&DataKey::Token, &protocol_token);
        env.storage().instance().set(&DataKey::TokenDecimals, &decimals);
        env.storage().instance().set(
            &DataKey::State,
            &LedgerState {
                total_reserves: 0,
                total_debt: 0,
            },
        );

        Ok(())
    }

    /// Grant `role` to `principal`. Asset roles also register the asset's
    /// valuation strategy: reserve tokens default to decimal normalization,
    /// liquidity tokens must name a calculator.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidParameters`: Liquidity token enabled without a calculator
    pub fn enable(
        env: Env,
        role: Role,
        principal: Address,
        calculator: Option<Address>,
    ) -> Result<(), Error> {
        Self::governor(&env)?.require_auth();

        match role {
            Role::ReserveToken => {
                let valuation = match calculator {
                    Some(calculator) => Valuation::Calculator(calculator),
                    None => {
                        let asset_decimals = token::Client::new(&env, &principal).decimals();
                        Valuation::Normalize(asset_decimals, Self::token_decimals(&env)?)
                    }
                };
                env.storage()
                    .persistent()
                    .set(&DataKey::Valuation(principal.clone()), &valuation);
            }
            Role::LiquidityToken => {
                let calculator = calculator.ok_or(Error::InvalidParameters)?;
                env.storage().persistent().set(
                    &DataKey::Valuation(principal.clone()),
                    &Valuation::Calculator(calculator),
                );
            }
            _ => {}
        }

        Permissions::grant(&env, role, &principal);

        env.events().publish(
            (Symbol::new(&env, "permission_changed"), principal.clone()),
            PermissionChangedEvent {
                role,
                principal,
                enabled: true,
            },
        );

        Ok(())
    }

    /// Revoke `role` from `principal`
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    pub fn disable(env: Env, role: Role, principal: Address) -> Result<(), Error> {
        Self::governor(&env)?.require_auth();

        Permissions::revoke(&env, role, &principal);

        if matches!(role, Role::ReserveToken | Role::LiquidityToken)
            && Permissions::depositor_role_for(&env, &principal).is_none()
        {
            env.storage()
                .persistent()
                .remove(&DataKey::Valuation(principal.clone()));
        }

        env.events().publish(
            (Symbol::new(&env, "permission_changed"), principal.clone()),
            PermissionChangedEvent {
                role,
                principal,
                enabled: false,
            },
        );

        Ok(())
    }

    /// Set how much a debtor may borrow, in ledger units
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidParameters`: Negative limit
    pub fn set_debt_limit(env: Env, debtor: Address, limit: i128) -> Result<(), Error> {
        Self::governor(&env)?.require_auth();

        if limit < 0 {
            return Err(Error::InvalidParameters);
        }

        env.storage()
            .persistent()
            .set(&DataKey::DebtLimit(debtor), &limit);
        Ok(())
    }

    // ============================================
    // DEPOSITS & WITHDRAWALS
    // ============================================

    /// Deposit a reserve or liquidity asset, minting `declared_value`
    /// protocol tokens to the depositor
    ///
    /// The appraisal `value` is added to reserves in full; the part not
    /// minted (`value - declared_value`) is protocol profit.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidParameters`: Non-positive amount, negative or excessive declared value
    /// - `PermissionDenied`: Asset not enabled, or depositor lacks the matching role
    pub fn deposit(
        env: Env,
        depositor: Address,
        asset: Address,
        amount: i128,
        declared_value: i128,
    ) -> Result<i128, Error> {
        let protocol_token = Self::protocol_token(&env)?;

        if amount <= 0 || declared_value < 0 {
            return Err(Error::InvalidParameters);
        }

        depositor.require_auth();

        let role =
            Permissions::depositor_role_for(&env, &asset).ok_or(Error::PermissionDenied)?;
        if !Permissions::is_granted(&env, role, &depositor) {
            return Err(Error::PermissionDenied);
        }

        let value = Self::appraise(&env, &asset, amount)?;
        if declared_value > value {
            return Err(Error::InvalidParameters);
        }

        let mut state = Self::state(env.clone());
        state.total_reserves = state
            .total_reserves
            .checked_add(value)
            .ok_or(Error::InvalidParameters)?;

        token::Client::new(&env, &asset).transfer(
            &depositor,
            &env.current_contract_address(),
            &amount,
        );

        if declared_value > 0 {
            Self::mint_to(&env, &protocol_token, &depositor, declared_value);
        }

        env.storage().instance().set(&DataKey::State, &state);

        env.events().publish(
            (Symbol::new(&env, "deposit"), asset.clone()),
            DepositEvent {
                depositor,
                asset,
                amount,
                value,
                payout: declared_value,
                profit: value - declared_value,
            },
        );

        Ok(declared_value)
    }

    /// Burn protocol tokens worth the appraisal of `amount` and release
    /// that amount of a reserve asset to the spender
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidParameters`: Non-positive amount or zero appraisal
    /// - `PermissionDenied`: Asset not a reserve token, or spender lacks `ReserveSpender`
    /// - `InsufficientReserves`: Appraisal exceeds total reserves
    pub fn withdraw(env: Env, spender: Address, asset: Address, amount: i128) -> Result<i128, Error> {
        let protocol_token = Self::protocol_token(&env)?;

        if amount <= 0 {
            return Err(Error::InvalidParameters);
        }

        spender.require_auth();

        if !Permissions::is_granted(&env, Role::ReserveToken, &asset)
            || !Permissions::is_granted(&env, Role::ReserveSpender, &spender)
        {
            return Err(Error::PermissionDenied);
        }

        let value = Self::appraise(&env, &asset, amount)?;
        if value == 0 {
            return Err(Error::InvalidParameters);
        }

        let mut state = Self::state(env.clone());
        if value > state.total_reserves {
            return Err(Error::InsufficientReserves);
        }
        state.total_reserves -= value;

        Self::burn_from(&env, &protocol_token, &spender, value);
        token::Client::new(&env, &asset).transfer(&env.current_contract_address(), &spender, &amount);

        env.storage().instance().set(&DataKey::State, &state);

        env.events().publish(
            (Symbol::new(&env, "withdrawal"), asset.clone()),
            WithdrawalEvent {
                spender,
                asset,
                amount,
                value,
            },
        );

        Ok(value)
    }

    // ============================================
    // DEBT
    // ============================================

    /// Borrow reserves against the debtor's limit
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidParameters`: Non-positive amount or zero appraisal
    /// - `PermissionDenied`: Asset not a reserve token, or debtor lacks `ReserveDebtor`
    /// - `InsufficientReserves`: Over the debt limit or the excess reserves
    pub fn incur_debt(env: Env, debtor: Address, asset: Address, amount: i128) -> Result<i128, Error> {
        if amount <= 0 {
            return Err(Error::InvalidParameters);
        }

        debtor.require_auth();

        if !Permissions::is_granted(&env, Role::ReserveToken, &asset)
            || !Permissions::is_granted(&env, Role::ReserveDebtor, &debtor)
        {
            return Err(Error::PermissionDenied);
        }

        let value = Self::appraise(&env, &asset, amount)?;
        if value == 0 {
            return Err(Error::InvalidParameters);
        }

        let outstanding = Self::debt_of(env.clone(), debtor.clone())
            .checked_add(value)
            .ok_or(Error::InvalidParameters)?;
        if outstanding > Self::debt_limit(env.clone(), debtor.clone()) {
            return Err(Error::InsufficientReserves);
        }

        let mut state = Self::state(env.clone());
        if value > Self::excess_reserves(env.clone())? || value > state.total_reserves {
            return Err(Error::InsufficientReserves);
        }
        state.total_reserves -= value;
        state.total_debt += value;

        token::Client::new(&env, &asset).transfer(&env.current_contract_address(), &debtor, &amount);

        env.storage().instance().set(&DataKey::State, &state);
        env.storage()
            .persistent()
            .set(&DataKey::Debt(debtor.clone()), &outstanding);

        env.events().publish(
            (Symbol::new(&env, "debt_incurred"), debtor.clone()),
            DebtEvent {
                debtor,
                asset,
                amount,
                value,
                outstanding,
            },
        );

        Ok(value)
    }

    /// Debt-repaying deposit: the asset goes back into reserves and the
    /// debtor's outstanding debt drops by its appraisal. Nothing is minted.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidParameters`: Non-positive amount, or appraisal above outstanding debt
    /// - `PermissionDenied`: Asset not a reserve token
    pub fn repay_debt(env: Env, debtor: Address, asset: Address, amount: i128) -> Result<i128, Error> {
        Self::protocol_token(&env)?;

        if amount <= 0 {
            return Err(Error::InvalidParameters);
        }

        debtor.require_auth();

        if !Permissions::is_granted(&env, Role::ReserveToken, &asset) {
            return Err(Error::PermissionDenied);
        }

        let value = Self::appraise(&env, &asset, amount)?;
        let current = Self::debt_of(env.clone(), debtor.clone());
        if value > current {
            return Err(Error::InvalidParameters);
        }
        let outstanding = current - value;

        let mut state = Self::state(env.clone());
        state.total_reserves = state
            .total_reserves
            .checked_add(value)
            .ok_or(Error::InvalidParameters)?;
        state.total_debt -= value;

        token::Client::new(&env, &asset).transfer(&debtor, &env.current_contract_address(), &amount);

        env.storage().instance().set(&DataKey::State, &state);
        if outstanding == 0 {
            env.storage()
                .persistent()
                .remove(&DataKey::Debt(debtor.clone()));
        } else {
            env.storage()
                .persistent()
                .set(&DataKey::Debt(debtor.clone()), &outstanding);
        }

        env.events().publish(
            (Symbol::new(&env, "debt_repaid"), debtor.clone()),
            DebtEvent {
                debtor,
                asset,
                amount,
                value,
                outstanding,
            },
        );

        Ok(value)
    }

    // ============================================
    // REWARDS
    // ============================================

    /// Mint unbacked protocol tokens out of excess reserves
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidParameters`: Non-positive amount
    /// - `PermissionDenied`: Manager lacks `RewardManager`
    /// - `InsufficientReserves`: Amount exceeds excess reserves
    pub fn mint_rewards(
        env: Env,
        manager: Address,
        recipient: Address,
        amount: i128,
    ) -> Result<(), Error> {
        let protocol_token = Self::protocol_token(&env)?;

        if amount <= 0 {
            return Err(Error::InvalidParameters);
        }

        manager.require_auth();

        if !Permissions::is_granted(&env, Role::RewardManager, &manager) {
            return Err(Error::PermissionDenied);
        }

        if amount > Self::excess_reserves(env.clone())? {
            return Err(Error::InsufficientReserves);
        }

        Self::mint_to(&env, &protocol_token, &recipient, amount);

        env.events().publish(
            (Symbol::new(&env, "rewards_minted"), recipient.clone()),
            RewardsMintedEvent {
                manager,
                recipient,
                amount,
            },
        );

        Ok(())
    }

    // ============================================
    // VIEW FUNCTIONS
    // ============================================

    /// Reserves beyond what backs the circulating supply
    ///
    /// Formula: excess = total_reserves - (total_supply - total_debt), floored at 0
    pub fn excess_reserves(env: Env) -> Result<i128, Error> {
        let protocol_token = Self::protocol_token(&env)?;
        let state = Self::state(env.clone());

        let supply: i128 = env.invoke_contract(
            &protocol_token,
            &Symbol::new(&env, "total_supply"),
            vec![&env],
        );

        let required = supply.saturating_sub(state.total_debt);
        Ok(state.total_reserves.saturating_sub(required).max(0))
    }

    /// Appraise `amount` of an enabled asset in ledger units
    pub fn token_value(env: Env, asset: Address, amount: i128) -> Result<i128, Error> {
        Self::appraise(&env, &asset, amount)
    }

    pub fn is_permitted(env: Env, role: Role, principal: Address) -> bool {
        Permissions::is_granted(&env, role, &principal)
    }

    pub fn valuation_of(env: Env, asset: Address) -> Option<Valuation> {
        env.storage().persistent().get(&DataKey::Valuation(asset))
    }

    pub fn state(env: Env) -> LedgerState {
        env.storage()
            .instance()
            .get(&DataKey::State)
            .unwrap_or(LedgerState {
                total_reserves: 0,
                total_debt: 0,
            })
    }

    pub fn total_reserves(env: Env) -> i128 {
        Self::state(env).total_reserves
    }

    pub fn total_debt(env: Env) -> i128 {
        Self::state(env).total_debt
    }

    pub fn debt_of(env: Env, debtor: Address) -> i128 {
        env.storage()
            .persistent()
            .get(&DataKey::Debt(debtor))
            .unwrap_or(0)
    }

    pub fn debt_limit(env: Env, debtor: Address) -> i128 {
        env.storage()
            .persistent()
            .get(&DataKey::DebtLimit(debtor))
            .unwrap_or(0)
    }

    // ============================================
    // INTERNAL HELPERS
    // ============================================

    fn governor(env: &Env) -> Result<Address, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Governor)
            .ok_or(Error::NotInitialized)
    }

    fn protocol_token(env: &Env) -> Result<Address, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Token)
            .ok_or(Error::NotInitialized)
    }

    fn token_decimals(env: &Env) -> Result<u32, Error> {
        env.storage()
            .instance()
            .get(&DataKey::TokenDecimals)
            .ok_or(Error::NotInitialized)
    }

    fn appraise(env: &Env, asset: &Address, amount: i128) -> Result<i128, Error> {
        let valuation: Valuation = env
            .storage()
            .persistent()
            .get(&DataKey::Valuation(asset.clone()))
            .ok_or(Error::PermissionDenied)?;
        valuation.value(env, asset, amount)
    }

    fn mint_to(env: &Env, protocol_token: &Address, to: &Address, amount: i128) {
        env.invoke_contract::<()>(
            protocol_token,
            &Symbol::new(env, "mint"),
            vec![
                env,
                env.current_contract_address().into_val(env),
                to.into_val(env),
                amount.into_val(env),
            ],
        );
    }

    fn burn_from(env: &Env, protocol_token: &Address, from: &Address, amount: i128) {
        env.invoke_contract::<()>(
            protocol_token,
            &Symbol::new(env, "burn"),
            vec![
                env,
                env.current_contract_address().into_val(env),
                from.into_val(env),
                amount.into_val(env),
            ],
        );
    }
}
