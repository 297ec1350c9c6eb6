#![no_std]

mod error;
mod events;
mod storage;

use error::Error;
use events::{BurnEvent, MintEvent, TransferEvent};
use storage::DataKey;

use soroban_sdk::{contract, contractimpl, Address, Env, Symbol};

#[contract]
pub struct ProtocolToken;

#[contractimpl]
impl ProtocolToken {
    /// Initialize the token contract
    ///
    /// # Errors
    /// - `AlreadyInitialized`: Contract already initialized
    pub fn initialize(env: Env, admin: Address, decimals: u32) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::AlreadyInitialized);
        }

        admin.require_auth();

        env.storage().instance().set(&DataKey::Initialized, &true);
        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage().instance().set(&DataKey::Decimals, &decimals);
        env.storage().instance().set(&DataKey::TotalSupply, &0i128);

        Ok(())
    }

    /// Add an operator (reserve ledger) allowed to mint and burn
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    pub fn add_operator(env: Env, operator: Address) -> Result<(), Error> {
        let admin: Address = env
            .storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(Error::NotInitialized)?;
        admin.require_auth();

        env.storage()
            .persistent()
            .set(&DataKey::Operators(operator), &true);

        Ok(())
    }

    /// Remove an operator
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    pub fn remove_operator(env: Env, operator: Address) -> Result<(), Error> {
        let admin: Address = env
            .storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(Error::NotInitialized)?;
        admin.require_auth();

        env.storage()
            .persistent()
            .remove(&DataKey::Operators(operator));

        Ok(())
    }

    /// Mint tokens (only operators)
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `NotOperator`: Caller is not a registered operator
    /// - `InvalidAmount`: Amount <= 0
    pub fn mint(env: Env, operator: Address, to: Address, amount: i128) -> Result<(), Error> {
        Self::check_operator(&env, &operator)?;

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        let new_balance = Self::balance(env.clone(), to.clone())
            .checked_add(amount)
            .ok_or(Error::InvalidAmount)?;
        let new_supply = Self::total_supply(env.clone())
            .checked_add(amount)
            .ok_or(Error::InvalidAmount)?;

        Self::write_balance(&env, &to, new_balance);
        env.storage()
            .instance()
            .set(&DataKey::TotalSupply, &new_supply);

        env.events().publish(
            (Symbol::new(&env, "mint"), to.clone()),
            MintEvent {
                operator,
                to,
                amount,
            },
        );

        Ok(())
    }

    /// Burn tokens held by `from` (only operators, `from` must authorize)
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `NotOperator`: Caller is not a registered operator
    /// - `InvalidAmount`: Amount <= 0
    /// - `InsufficientBalance`: Not enough balance
    pub fn burn(env: Env, operator: Address, from: Address, amount: i128) -> Result<(), Error> {
        Self::check_operator(&env, &operator)?;

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        from.require_auth();

        let current_balance = Self::balance(env.clone(), from.clone());
        if current_balance < amount {
            return Err(Error::InsufficientBalance);
        }

        Self::write_balance(&env, &from, current_balance - amount);
        let supply = Self::total_supply(env.clone());
        env.storage()
            .instance()
            .set(&DataKey::TotalSupply, &(supply - amount));

        env.events().publish(
            (Symbol::new(&env, "burn"), from.clone()),
            BurnEvent {
                operator,
                from,
                amount,
            },
        );

        Ok(())
    }

    /// Transfer tokens between holders
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidAmount`: Amount <= 0
    /// - `InsufficientBalance`: Not enough balance
    pub fn transfer(env: Env, from: Address, to: Address, amount: i128) -> Result<(), Error> {
        if !env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::NotInitialized);
        }

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        from.require_auth();

        let from_balance = Self::balance(env.clone(), from.clone());
        if from_balance < amount {
            return Err(Error::InsufficientBalance);
        }

        let to_balance = Self::balance(env.clone(), to.clone());
        let new_to_balance = to_balance
            .checked_add(amount)
            .ok_or(Error::InvalidAmount)?;

        Self::write_balance(&env, &from, from_balance - amount);
        Self::write_balance(&env, &to, new_to_balance);

        env.events().publish(
            (Symbol::new(&env, "transfer"), from.clone()),
            TransferEvent { from, to, amount },
        );

        Ok(())
    }

    /// Get balance of a holder
    pub fn balance(env: Env, id: Address) -> i128 {
        env.storage()
            .persistent()
            .get::<DataKey, i128>(&DataKey::Balance(id))
            .unwrap_or(0)
    }

    /// Total tokens in circulation
    pub fn total_supply(env: Env) -> i128 {
        env.storage()
            .instance()
            .get::<DataKey, i128>(&DataKey::TotalSupply)
            .unwrap_or(0)
    }

    pub fn decimals(env: Env) -> u32 {
        env.storage()
            .instance()
            .get::<DataKey, u32>(&DataKey::Decimals)
            .unwrap_or(7)
    }

    /// Check if address is an operator
    pub fn is_operator(env: Env, address: Address) -> bool {
        env.storage()
            .persistent()
            .get::<DataKey, bool>(&DataKey::Operators(address))
            .unwrap_or(false)
    }

    fn check_operator(env: &Env, operator: &Address) -> Result<(), Error> {
        if !env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::NotInitialized);
        }

        operator.require_auth();

        if !Self::is_operator(env.clone(), operator.clone()) {
            return Err(Error::NotOperator);
        }
        Ok(())
    }

    fn write_balance(env: &Env, holder: &Address, amount: i128) {
        let key = DataKey::Balance(holder.clone());
        if amount == 0 {
            env.storage().persistent().remove(&key);
        } else {
            env.storage().persistent().set(&key, &amount);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use soroban_sdk::{testutils::Address as _, Address, Env};

    const SCALE: i128 = 10_000_000;

    fn setup(env: &Env) -> (ProtocolTokenClient<'_>, Address) {
        let contract_id = env.register_contract(None, ProtocolToken);
        let client = ProtocolTokenClient::new(env, &contract_id);

        let admin = Address::generate(env);
        let operator = Address::generate(env);
        client.initialize(&admin, &7);
        client.add_operator(&operator);

        (client, operator)
    }

    #[test]
    fn test_initialize() {
        let env = Env::default();
        env.mock_all_auths();

        let contract_id = env.register_contract(None, ProtocolToken);
        let client = ProtocolTokenClient::new(&env, &contract_id);

        let admin = Address::generate(&env);
        client.initialize(&admin, &7);
        assert_eq!(client.decimals(), 7);

        let result = client.try_initialize(&admin, &7);
        assert_eq!(result, Err(Ok(Error::AlreadyInitialized)));
    }

    #[test]
    fn test_mint_tracks_supply() {
        let env = Env::default();
        env.mock_all_auths();
        let (client, operator) = setup(&env);

        let user1 = Address::generate(&env);
        let user2 = Address::generate(&env);

        client.mint(&operator, &user1, &(1000 * SCALE));
        client.mint(&operator, &user2, &(250 * SCALE));

        assert_eq!(client.balance(&user1), 1000 * SCALE);
        assert_eq!(client.total_supply(), 1250 * SCALE);
    }

    #[test]
    fn test_mint_requires_operator() {
        let env = Env::default();
        env.mock_all_auths();
        let (client, _) = setup(&env);

        let stranger = Address::generate(&env);
        let user = Address::generate(&env);

        let result = client.try_mint(&stranger, &user, &SCALE);
        assert_eq!(result, Err(Ok(Error::NotOperator)));
        assert_eq!(client.total_supply(), 0);
    }

    #[test]
    fn test_transfer() {
        let env = Env::default();
        env.mock_all_auths();
        let (client, operator) = setup(&env);

        let user1 = Address::generate(&env);
        let user2 = Address::generate(&env);

        client.mint(&operator, &user1, &(1000 * SCALE));
        client.transfer(&user1, &user2, &(500 * SCALE));

        assert_eq!(client.balance(&user1), 500 * SCALE);
        assert_eq!(client.balance(&user2), 500 * SCALE);
        assert_eq!(client.total_supply(), 1000 * SCALE);
    }

    #[test]
    fn test_burn_reduces_supply() {
        let env = Env::default();
        env.mock_all_auths();
        let (client, operator) = setup(&env);

        let user = Address::generate(&env);

        client.mint(&operator, &user, &(1000 * SCALE));
        client.burn(&operator, &user, &(400 * SCALE));

        assert_eq!(client.balance(&user), 600 * SCALE);
        assert_eq!(client.total_supply(), 600 * SCALE);
    }

    #[test]
    fn test_insufficient_balance_error() {
        let env = Env::default();
        env.mock_all_auths();
        let (client, operator) = setup(&env);

        let user1 = Address::generate(&env);
        let user2 = Address::generate(&env);

        client.mint(&operator, &user1, &(1000 * SCALE));

        let result = client.try_transfer(&user1, &user2, &(1500 * SCALE));
        assert_eq!(result, Err(Ok(Error::InsufficientBalance)));
    }
}
