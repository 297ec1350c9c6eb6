#![no_std]

mod conversion;
mod error;
mod events;
mod storage;


pub use error::Error;
pub use storage::{StakePosition, VaultState};

use events::*;
use storage::{DataKey, SCALE};

use soroban_sdk::{contract, contractimpl, log, token, Address, Env, Symbol};

#[contract]
pub struct StakingVault;

#[contractimpl]
impl StakingVault {
    // ============================================
    // INITIALIZATION & ADMIN
    // ============================================

    /// Initialize the vault for the protocol token
    ///
    /// # Errors
    /// - `AlreadyInitialized`: Contract already initialized
    pub fn initialize(
        env: Env,
        governor: Address,
        protocol_token: Address,
        warmup_length: u64,
    ) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::AlreadyInitialized);
        }

        governor.require_auth();

        env.storage().instance().set(&DataKey::Initialized, &true);
        env.storage().instance().set(&DataKey::Governor, &governor);
        env.storage().instance().set(&DataKey::Token, &protocol_token);
        env.storage()
            .instance()
            .set(&DataKey::WarmupLength, &warmup_length);
        env.storage().instance().set(
            &DataKey::State,
            &VaultState {
                index: SCALE,
                total_shares: 0,
                pending_reward: 0,
                last_rebase: env.ledger().timestamp(),
            },
        );

        Ok(())
    }

    /// Set the emission controller allowed to credit rewards
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    pub fn set_controller(env: Env, controller: Address) -> Result<(), Error> {
        Self::governor(&env)?.require_auth();
        env.storage()
            .instance()
            .set(&DataKey::Controller, &controller);
        Ok(())
    }

    /// Applies to stakes made afterwards
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    pub fn set_warmup_length(env: Env, seconds: u64) -> Result<(), Error> {
        Self::governor(&env)?.require_auth();
        env.storage()
            .instance()
            .set(&DataKey::WarmupLength, &seconds);
        Ok(())
    }

    // ============================================
    // STAKING
    // ============================================

    /// Stake protocol tokens for shares at the current index
    ///
    /// Staking again adds to the position and restarts its warmup.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidParameters`: Non-positive amount or less than one share
    pub fn stake(
        env: Env,
        depositor: Address,
        amount: i128,
        auto_compound: bool,
    ) -> Result<i128, Error> {
        let protocol_token = Self::protocol_token(&env)?;

        if amount <= 0 {
            return Err(Error::InvalidParameters);
        }

        depositor.require_auth();

        let mut state = Self::apply_rebase(&env)?;
        let shares = conversion::to_shares(amount, state.index).ok_or(Error::InvalidParameters)?;
        if shares == 0 {
            return Err(Error::InvalidParameters);
        }

        token::Client::new(&env, &protocol_token).transfer(
            &depositor,
            &env.current_contract_address(),
            &amount,
        );

        let warmup_end = env.ledger().timestamp() + Self::warmup_length(&env);
        let mut position = Self::position(env.clone(), depositor.clone()).unwrap_or(StakePosition {
            shares: 0,
            principal: 0,
            warmup_end,
            auto_compound,
        });
        position.shares = position
            .shares
            .checked_add(shares)
            .ok_or(Error::InvalidParameters)?;
        position.principal = position
            .principal
            .checked_add(amount)
            .ok_or(Error::InvalidParameters)?;
        position.warmup_end = warmup_end;
        position.auto_compound = auto_compound;

        state.total_shares = state
            .total_shares
            .checked_add(shares)
            .ok_or(Error::InvalidParameters)?;

        Self::save_position(&env, &depositor, &position);
        Self::save_state(&env, &state);

        env.events().publish(
            (Symbol::new(&env, "staked"), depositor.clone()),
            StakedEvent {
                owner: depositor,
                amount,
                shares,
                index: state.index,
                warmup_end,
            },
        );

        Ok(shares)
    }

    /// Burn `shares` and pay out their base value at the fresh index
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidParameters`: Non-positive shares
    /// - `NoPosition`: Claimant has no stake
    /// - `InsufficientVesting`: Warmup not over
    /// - `InsufficientBalance`: More shares than held
    pub fn unstake(env: Env, claimant: Address, shares: i128) -> Result<i128, Error> {
        let protocol_token = Self::protocol_token(&env)?;

        if shares <= 0 {
            return Err(Error::InvalidParameters);
        }

        claimant.require_auth();

        let mut position =
            Self::position(env.clone(), claimant.clone()).ok_or(Error::NoPosition)?;
        if env.ledger().timestamp() < position.warmup_end {
            return Err(Error::InsufficientVesting);
        }
        if shares > position.shares {
            return Err(Error::InsufficientBalance);
        }

        let mut state = Self::apply_rebase(&env)?;
        let amount = conversion::to_base(shares, state.index).ok_or(Error::InvalidParameters)?;

        let principal_released = position
            .principal
            .checked_mul(shares)
            .and_then(|v| v.checked_div(position.shares))
            .ok_or(Error::InvalidParameters)?;
        position.principal -= principal_released;
        position.shares -= shares;
        state.total_shares -= shares;

        if position.shares == 0 {
            env.storage()
                .persistent()
                .remove(&DataKey::Position(claimant.clone()));
        } else {
            Self::save_position(&env, &claimant, &position);
        }
        Self::save_state(&env, &state);

        if amount > 0 {
            token::Client::new(&env, &protocol_token).transfer(
                &env.current_contract_address(),
                &claimant,
                &amount,
            );
        }

        env.events().publish(
            (Symbol::new(&env, "unstaked"), claimant.clone()),
            UnstakedEvent {
                owner: claimant,
                shares,
                amount,
                index: state.index,
            },
        );

        Ok(amount)
    }

    /// Abandon a stake during warmup: the principal comes back and any
    /// reward it earned returns to the pending pool
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `NoPosition`: Claimant has no stake
    /// - `InvalidParameters`: Warmup already over, use `unstake`
    pub fn forfeit(env: Env, claimant: Address) -> Result<i128, Error> {
        let protocol_token = Self::protocol_token(&env)?;

        claimant.require_auth();

        let position = Self::position(env.clone(), claimant.clone()).ok_or(Error::NoPosition)?;
        if env.ledger().timestamp() >= position.warmup_end {
            return Err(Error::InvalidParameters);
        }

        let mut state = Self::apply_rebase(&env)?;
        let value = conversion::to_base(position.shares, state.index).ok_or(Error::InvalidParameters)?;

        // share rounding at stake time can leave value a hair under principal
        let returned = position.principal.min(value);
        let recredited = value - returned;

        state.total_shares -= position.shares;
        state.pending_reward = state
            .pending_reward
            .checked_add(recredited)
            .ok_or(Error::InvalidParameters)?;

        env.storage()
            .persistent()
            .remove(&DataKey::Position(claimant.clone()));
        Self::save_state(&env, &state);

        if returned > 0 {
            token::Client::new(&env, &protocol_token).transfer(
                &env.current_contract_address(),
                &claimant,
                &returned,
            );
        }

        env.events().publish(
            (Symbol::new(&env, "forfeited"), claimant.clone()),
            ForfeitedEvent {
                owner: claimant,
                returned,
                recredited,
            },
        );

        Ok(returned)
    }

    /// Switch a position to the fixed-shares wrapped view
    ///
    /// # Errors
    /// - `NoPosition`: Owner has no stake
    pub fn wrap(env: Env, owner: Address) -> Result<i128, Error> {
        Self::set_auto_compound(&env, owner, false)
    }

    /// Switch a position back to the rebasing balance view. Returns the
    /// share count, which wrapping never changes.
    ///
    /// # Errors
    /// - `NoPosition`: Owner has no stake
    pub fn unwrap(env: Env, owner: Address) -> Result<i128, Error> {
        Self::set_auto_compound(&env, owner, true)
    }

    // ============================================
    // REWARDS
    // ============================================

    /// Fold pending rewards into the index. Returns the index.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    pub fn rebase(env: Env) -> Result<i128, Error> {
        Self::protocol_token(&env)?;
        let state = Self::apply_rebase(&env)?;
        Ok(state.index)
    }

    /// Record `amount` of reward already minted into the vault
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `PermissionDenied`: Caller is not the configured controller
    /// - `InvalidParameters`: Non-positive amount
    /// - `InsufficientBalance`: Vault holds fewer tokens than it would owe
    pub fn credit_reward(env: Env, controller: Address, amount: i128) -> Result<(), Error> {
        let protocol_token = Self::protocol_token(&env)?;

        controller.require_auth();

        let configured: Option<Address> = env.storage().instance().get(&DataKey::Controller);
        if configured != Some(controller.clone()) {
            return Err(Error::PermissionDenied);
        }
        if amount <= 0 {
            return Err(Error::InvalidParameters);
        }

        let mut state = Self::state(env.clone());
        state.pending_reward = state
            .pending_reward
            .checked_add(amount)
            .ok_or(Error::InvalidParameters)?;

        let owed = conversion::to_base(state.total_shares, state.index)
            .and_then(|v| v.checked_add(state.pending_reward))
            .ok_or(Error::InvalidParameters)?;
        let held = token::Client::new(&env, &protocol_token).balance(&env.current_contract_address());
        if held < owed {
            return Err(Error::InsufficientBalance);
        }

        Self::save_state(&env, &state);

        env.events().publish(
            (Symbol::new(&env, "reward_credited"), controller.clone()),
            RewardCreditedEvent {
                controller,
                amount,
                pending: state.pending_reward,
            },
        );

        Ok(())
    }

    // ============================================
    // VIEW FUNCTIONS
    // ============================================

    pub fn index(env: Env) -> i128 {
        Self::state(env).index
    }

    /// Base units the owner could withdraw at the current index
    pub fn balance_of(env: Env, owner: Address) -> i128 {
        let index = Self::state(env.clone()).index;
        Self::position(env, owner)
            .and_then(|p| conversion::to_base(p.shares, index))
            .unwrap_or(0)
    }

    /// Shares held, unaffected by rebases
    pub fn wrapped_balance_of(env: Env, owner: Address) -> i128 {
        Self::position(env, owner).map(|p| p.shares).unwrap_or(0)
    }

    pub fn to_wrapped(env: Env, amount: i128) -> Result<i128, Error> {
        conversion::to_shares(amount, Self::state(env).index).ok_or(Error::InvalidParameters)
    }

    pub fn from_wrapped(env: Env, shares: i128) -> Result<i128, Error> {
        conversion::to_base(shares, Self::state(env).index).ok_or(Error::InvalidParameters)
    }

    pub fn position(env: Env, owner: Address) -> Option<StakePosition> {
        env.storage().persistent().get(&DataKey::Position(owner))
    }

    pub fn total_shares(env: Env) -> i128 {
        Self::state(env).total_shares
    }

    pub fn pending_reward(env: Env) -> i128 {
        Self::state(env).pending_reward
    }

    pub fn state(env: Env) -> VaultState {
        env.storage()
            .instance()
            .get(&DataKey::State)
            .unwrap_or(VaultState {
                index: SCALE,
                total_shares: 0,
                pending_reward: 0,
                last_rebase: 0,
            })
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

    fn warmup_length(env: &Env) -> u64 {
        env.storage()
            .instance()
            .get(&DataKey::WarmupLength)
            .unwrap_or(0)
    }

    fn save_state(env: &Env, state: &VaultState) {
        env.storage().instance().set(&DataKey::State, state);
    }

    fn save_position(env: &Env, owner: &Address, position: &StakePosition) {
        env.storage()
            .persistent()
            .set(&DataKey::Position(owner.clone()), position);
    }

    /// Apply pending rewards and persist. With no stakers, or a reward
    /// too small to move the index, the reward stays pending.
    fn apply_rebase(env: &Env) -> Result<VaultState, Error> {
        let mut state = Self::state(env.clone());

        let increment = conversion::index_increment(state.pending_reward, state.total_shares)
            .ok_or(Error::InvalidParameters)?;
        if increment == 0 {
            return Ok(state);
        }

        let old_index = state.index;
        state.index = old_index
            .checked_add(increment)
            .ok_or(Error::InvalidParameters)?;

        // Only what the index now owes leaves pending; the rounding
        // remainder waits for the next rebase
        let owed_before = conversion::to_base(state.total_shares, old_index)
            .ok_or(Error::InvalidParameters)?;
        let owed_after = conversion::to_base(state.total_shares, state.index)
            .ok_or(Error::InvalidParameters)?;
        let distributed = (owed_after - owed_before).min(state.pending_reward);
        state.pending_reward -= distributed;
        state.last_rebase = env.ledger().timestamp();
        Self::save_state(env, &state);

        log!(env, "rebase", old_index, state.index, distributed);
        env.events().publish(
            (Symbol::new(env, "rebased"), state.last_rebase),
            RebasedEvent {
                distributed,
                old_index,
                new_index: state.index,
                total_shares: state.total_shares,
            },
        );

        Ok(state)
    }

    fn set_auto_compound(env: &Env, owner: Address, auto_compound: bool) -> Result<i128, Error> {
        owner.require_auth();

        let mut position = Self::position(env.clone(), owner.clone()).ok_or(Error::NoPosition)?;
        if position.auto_compound != auto_compound {
            position.auto_compound = auto_compound;
            Self::save_position(env, &owner, &position);

            env.events().publish(
                (Symbol::new(env, "wrap_changed"), owner.clone()),
                WrapChangedEvent {
                    owner,
                    shares: position.shares,
                    auto_compound,
                },
            );
        }

        Ok(position.shares)
    }
}
