#![no_std]

mod error;
mod events;
mod schedule;
mod storage;


pub use error::Error;
pub use storage::{Epoch, RewardPool};

use events::*;
use storage::{DataKey, BASIS_POINTS, RATE_DENOMINATOR};

use soroban_sdk::{contract, contractimpl, log, vec, Address, Env, IntoVal, Symbol, Vec};

#[contract]
pub struct EmissionController;

#[contractimpl]
impl EmissionController {
    // ============================================
    // INITIALIZATION & ADMIN
    // ============================================

    /// Initialize the controller
    ///
    /// The ledger must grant this contract `RewardManager`, and the vault
    /// must name it as its controller.
    ///
    /// # Errors
    /// - `AlreadyInitialized`: Contract already initialized
    /// - `InvalidParameters`: Zero epoch length, or rate above max rate, or
    ///   max rate above 100%
    #[allow(clippy::too_many_arguments)]
    pub fn initialize(
        env: Env,
        governor: Address,
        ledger: Address,
        protocol_token: Address,
        vault: Address,
        epoch_length: u64,
        first_distribution: u64,
        rate: i128,
        max_rate: i128,
    ) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::AlreadyInitialized);
        }

        governor.require_auth();

        if epoch_length == 0 || rate < 0 || rate > max_rate || max_rate > RATE_DENOMINATOR {
            return Err(Error::InvalidParameters);
        }

        env.storage().instance().set(&DataKey::Initialized, &true);
        env.storage().instance().set(&DataKey::Governor, &governor);
        env.storage().instance().set(&DataKey::Ledger, &ledger);
        env.storage().instance().set(&DataKey::Token, &protocol_token);
        env.storage().instance().set(&DataKey::Vault, &vault);
        env.storage().instance().set(&DataKey::Rate, &rate);
        env.storage().instance().set(&DataKey::MaxRate, &max_rate);
        env.storage().instance().set(&DataKey::Bounty, &0i128);
        env.storage()
            .instance()
            .set(&DataKey::Pools, &Vec::<RewardPool>::new(&env));
        env.storage().instance().set(
            &DataKey::Epoch,
            &Epoch {
                number: 1,
                length: epoch_length,
                next_distribution: first_distribution,
            },
        );

        Ok(())
    }

    /// Set the per-epoch rate, in millionths of total supply
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidParameters`: Negative or above max rate
    pub fn set_rate(env: Env, rate: i128) -> Result<(), Error> {
        Self::governor(&env)?.require_auth();

        let max_rate: i128 = env
            .storage()
            .instance()
            .get(&DataKey::MaxRate)
            .unwrap_or(0);
        if rate < 0 || rate > max_rate {
            return Err(Error::InvalidParameters);
        }

        let old_rate = Self::rate(env.clone());
        env.storage().instance().set(&DataKey::Rate, &rate);

        env.events().publish(
            (Symbol::new(&env, "rate_changed"),),
            RateChangedEvent {
                old_rate,
                new_rate: rate,
            },
        );
        Ok(())
    }

    /// Set the keeper bounty paid to each successful `distribute` caller
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidParameters`: Negative amount
    pub fn set_bounty(env: Env, amount: i128) -> Result<(), Error> {
        Self::governor(&env)?.require_auth();

        if amount < 0 {
            return Err(Error::InvalidParameters);
        }

        let old_bounty = Self::bounty(env.clone());
        env.storage().instance().set(&DataKey::Bounty, &amount);

        env.events().publish(
            (Symbol::new(&env, "bounty_changed"),),
            BountyChangedEvent {
                old_bounty,
                new_bounty: amount,
            },
        );
        Ok(())
    }

    /// Replace the reward pools
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidParameters`: Weights sum above 10,000 basis points
    pub fn set_pools(env: Env, pools: Vec<RewardPool>) -> Result<(), Error> {
        Self::governor(&env)?.require_auth();

        let mut total_weight_bps: u32 = 0;
        for pool in pools.iter() {
            total_weight_bps = total_weight_bps
                .checked_add(pool.weight_bps)
                .ok_or(Error::InvalidParameters)?;
        }
        if total_weight_bps > BASIS_POINTS {
            return Err(Error::InvalidParameters);
        }

        env.storage().instance().set(&DataKey::Pools, &pools);

        env.events().publish(
            (Symbol::new(&env, "pools_changed"),),
            PoolsChangedEvent {
                pools,
                total_weight_bps,
            },
        );
        Ok(())
    }

    // ============================================
    // DISTRIBUTION
    // ============================================

    /// Emit rewards for every epoch that has come due. Anyone may call;
    /// the caller earns the bounty.
    ///
    /// Returns the total minted.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `TooEarly`: Next distribution time not reached
    /// - `InsufficientReserves`: Emission plus bounty exceeds excess reserves
    /// - `InvalidParameters`: Arithmetic overflow
    /// - `LedgerRejected`: Reserve ledger refused the query or a mint
    /// - `VaultRejected`: Vault refused the reward credit
    pub fn distribute(env: Env, caller: Address) -> Result<i128, Error> {
        let ledger = Self::ledger(&env)?;
        let vault = Self::vault(&env)?;

        caller.require_auth();

        let mut epoch = Self::epoch(env.clone())?;
        let now = env.ledger().timestamp();
        let due = schedule::epochs_due(now, epoch.next_distribution, epoch.length);
        if due == 0 {
            return Err(Error::TooEarly);
        }
        let due_epochs = u32::try_from(due).map_err(|_| Error::InvalidParameters)?;

        let supply = Self::total_supply(&env)?;
        let emission = schedule::calculate_emission(supply, Self::rate(env.clone()), due)
            .ok_or(Error::InvalidParameters)?;
        let bounty = Self::bounty(env.clone());
        let remainder = emission.saturating_sub(bounty).max(0);

        let total = bounty
            .checked_add(remainder)
            .ok_or(Error::InvalidParameters)?;
        let excess = match env.try_invoke_contract::<i128, Error>(
            &ledger,
            &Symbol::new(&env, "excess_reserves"),
            vec![&env],
        ) {
            Ok(Ok(excess)) => excess,
            _ => return Err(Error::LedgerRejected),
        };
        if total > excess {
            return Err(Error::InsufficientReserves);
        }

        if bounty > 0 {
            Self::mint_rewards(&env, &ledger, &caller, bounty)?;
        }

        let mut to_pools: i128 = 0;
        for pool in Self::pools(env.clone()).iter() {
            let share =
                schedule::pool_share(remainder, pool.weight_bps).ok_or(Error::InvalidParameters)?;
            if share > 0 {
                Self::mint_rewards(&env, &ledger, &pool.recipient, share)?;
                to_pools += share;
            }
        }

        let to_vault = remainder - to_pools;
        if to_vault > 0 {
            Self::mint_rewards(&env, &ledger, &vault, to_vault)?;
            let credited = env.try_invoke_contract::<(), Error>(
                &vault,
                &Symbol::new(&env, "credit_reward"),
                vec![
                    &env,
                    env.current_contract_address().into_val(&env),
                    to_vault.into_val(&env),
                ],
            );
            if !matches!(credited, Ok(Ok(()))) {
                return Err(Error::VaultRejected);
            }
        }

        epoch.number = epoch
            .number
            .checked_add(due_epochs)
            .ok_or(Error::InvalidParameters)?;
        epoch.next_distribution = due
            .checked_mul(epoch.length)
            .and_then(|v| v.checked_add(epoch.next_distribution))
            .ok_or(Error::InvalidParameters)?;
        env.storage().instance().set(&DataKey::Epoch, &epoch);

        if due > 1 {
            log!(&env, "caught up epochs", due, epoch.number);
        }

        env.events().publish(
            (Symbol::new(&env, "distributed"), epoch.number),
            DistributedEvent {
                caller,
                epoch: epoch.number,
                epochs_due: due,
                emission,
                bounty,
                to_pools,
                to_vault,
            },
        );

        Ok(total)
    }

    // ============================================
    // VIEW FUNCTIONS
    // ============================================

    pub fn epoch(env: Env) -> Result<Epoch, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Epoch)
            .ok_or(Error::NotInitialized)
    }

    pub fn rate(env: Env) -> i128 {
        env.storage().instance().get(&DataKey::Rate).unwrap_or(0)
    }

    pub fn bounty(env: Env) -> i128 {
        env.storage().instance().get(&DataKey::Bounty).unwrap_or(0)
    }

    pub fn pools(env: Env) -> Vec<RewardPool> {
        env.storage()
            .instance()
            .get(&DataKey::Pools)
            .unwrap_or(Vec::new(&env))
    }

    /// Emission for a single epoch at the current supply
    pub fn next_reward(env: Env) -> Result<i128, Error> {
        let supply = Self::total_supply(&env)?;
        schedule::calculate_emission(supply, Self::rate(env), 1).ok_or(Error::InvalidParameters)
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

    fn ledger(env: &Env) -> Result<Address, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Ledger)
            .ok_or(Error::NotInitialized)
    }

    fn vault(env: &Env) -> Result<Address, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Vault)
            .ok_or(Error::NotInitialized)
    }

    fn total_supply(env: &Env) -> Result<i128, Error> {
        let protocol_token: Address = env
            .storage()
            .instance()
            .get(&DataKey::Token)
            .ok_or(Error::NotInitialized)?;
        Ok(env.invoke_contract(
            &protocol_token,
            &Symbol::new(env, "total_supply"),
            vec![env],
        ))
    }

    fn mint_rewards(
        env: &Env,
        ledger: &Address,
        recipient: &Address,
        amount: i128,
    ) -> Result<(), Error> {
        let minted = env.try_invoke_contract::<(), Error>(
            ledger,
            &Symbol::new(env, "mint_rewards"),
            vec![
                env,
                env.current_contract_address().into_val(env),
                recipient.into_val(env),
                amount.into_val(env),
            ],
        );
        match minted {
            Ok(Ok(())) => Ok(()),
            _ => Err(Error::LedgerRejected),
        }
    }
}
