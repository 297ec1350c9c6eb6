#![no_std]

mod error;
mod events;
mod pricing;
mod storage;
mod validation;
mod vesting;


pub use error::Error;
pub use storage::{Adjustment, Market, MarketParams, MarketStatus, Note, Schedule, Terms};

use events::*;
use storage::DataKey;

use soroban_sdk::{
    auth::{ContractContext, InvokerContractAuthEntry, SubContractInvocation},
    contract, contractimpl, log, token, vec, Address, Env, IntoVal, Symbol, Vec,
};

#[contract]
pub struct BondMarket;

#[contractimpl]
impl BondMarket {
    // ============================================
    // INITIALIZATION & ADMIN
    // ============================================

    /// Initialize the market contract
    ///
    /// `ledger` must grant this contract `ReserveDepositor` and enable every
    /// quote asset as a reserve or liquidity token.
    ///
    /// # Errors
    /// - `AlreadyInitialized`: Contract already initialized
    pub fn initialize(
        env: Env,
        governor: Address,
        ledger: Address,
        protocol_token: Address,
    ) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::AlreadyInitialized);
        }

        governor.require_auth();

        env.storage().instance().set(&DataKey::Initialized, &true);
        env.storage().instance().set(&DataKey::Governor, &governor);
        env.storage().instance().set(&DataKey::Ledger, &ledger);
        env.storage().instance().set(&DataKey::Token, &protocol_token);
        env.storage().instance().set(&DataKey::MarketCounter, &0u32);
        env.storage().instance().set(&DataKey::NoteCounter, &0u64);

        Ok(())
    }

    /// Open a new bond market (governor only)
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidParameters`: Parameters rejected or sizing overflowed
    pub fn create_market(env: Env, params: MarketParams) -> Result<u32, Error> {
        Self::governor(&env)?.require_auth();

        let now = env.ledger().timestamp();
        validation::validate_market_params(&params, now)?;

        let duration = params.conclusion - now;
        let target_total = validation::calculate_target_total(
            params.capacity,
            params.capacity_in_quote,
            params.initial_price,
        )
        .ok_or(Error::InvalidParameters)?;
        let max_payout =
            validation::calculate_max_payout(target_total, duration, params.deposit_interval)
                .ok_or(Error::InvalidParameters)?;
        let max_debt = validation::calculate_max_debt(target_total, params.debt_buffer_bps)
            .ok_or(Error::InvalidParameters)?;

        let decay_window = if params.linear_vesting {
            params.vesting
        } else {
            duration
        };
        let baseline_debt =
            validation::calculate_baseline_debt(target_total, decay_window, duration)
                .ok_or(Error::InvalidParameters)?;
        if target_total <= 0 || max_payout <= 0 || baseline_debt <= 0 {
            return Err(Error::InvalidParameters);
        }

        let market_id: u32 = env
            .storage()
            .instance()
            .get(&DataKey::MarketCounter)
            .unwrap_or(0);

        let market = Market {
            id: market_id,
            quote_asset: params.quote_asset.clone(),
            capacity: params.capacity,
            capacity_in_quote: params.capacity_in_quote,
            total_debt: baseline_debt,
            baseline_debt,
            target_total,
            sold: 0,
            purchased: 0,
            max_payout,
            status: MarketStatus::Active,
            terms: Terms {
                control_variable: params.initial_price,
                base_control_variable: params.initial_price,
                linear_vesting: params.linear_vesting,
                vesting: params.vesting,
                conclusion: params.conclusion,
                max_debt,
            },
            schedule: Schedule {
                start: now,
                deposit_interval: params.deposit_interval,
                tune_interval: params.tune_interval,
                decay_window: decay_window.min(duration),
                last_decay: now,
                next_tune: now + params.tune_interval,
            },
            adjustment: Adjustment::idle(now),
        };

        Self::save_market(&env, &market);
        env.storage()
            .instance()
            .set(&DataKey::MarketCounter, &(market_id + 1));

        env.events().publish(
            (Symbol::new(&env, "market_created"), market_id),
            MarketCreatedEvent {
                market_id,
                quote_asset: params.quote_asset,
                capacity: params.capacity,
                capacity_in_quote: params.capacity_in_quote,
                initial_price: params.initial_price,
                max_payout,
                max_debt,
                conclusion: params.conclusion,
            },
        );

        Ok(market_id)
    }

    /// Close a market ahead of its conclusion (governor only)
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `MarketNotFound`: Market doesn't exist
    pub fn close_market(env: Env, market_id: u32) -> Result<(), Error> {
        Self::governor(&env)?.require_auth();

        let mut market = Self::load_market(&env, market_id)?;
        if market.status == MarketStatus::Concluded {
            return Ok(());
        }

        market.capacity = 0;
        Self::finish(&env, &mut market);
        Ok(())
    }

    // ============================================
    // BONDING
    // ============================================

    /// Buy a bond: pay `quote_amount`, receive a vesting note for the payout
    ///
    /// The quote asset moves into the reserve ledger, which mints exactly
    /// the payout to this contract; the note releases it over time.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidParameters`: Non-positive amount, zero payout, or quote
    ///   appraised at zero
    /// - `MarketNotFound`: Market doesn't exist
    /// - `MarketConcluded`: Market concluded or past its conclusion
    /// - `SlippageExceeded`: Price above `max_price`
    /// - `CapacityExceeded`: Over remaining capacity, max payout, or max debt
    /// - `LedgerRejected`: Ledger refused to appraise or take the quote
    pub fn deposit(
        env: Env,
        market_id: u32,
        depositor: Address,
        quote_amount: i128,
        max_price: i128,
    ) -> Result<(i128, u64), Error> {
        let ledger = Self::ledger(&env)?;

        if quote_amount <= 0 {
            return Err(Error::InvalidParameters);
        }

        depositor.require_auth();

        let mut market = Self::load_market(&env, market_id)?;
        let now = env.ledger().timestamp();

        if market.status == MarketStatus::Concluded
            || now >= market.terms.conclusion
            || market.capacity == 0
        {
            return Err(Error::MarketConcluded);
        }

        Self::advance(&env, &mut market, now)?;

        let price = Self::deposit_price(&env, &ledger, &market, quote_amount)?;
        if price > max_price {
            return Err(Error::SlippageExceeded);
        }

        let payout =
            pricing::calculate_payout(quote_amount, price).ok_or(Error::InvalidParameters)?;
        if payout == 0 {
            return Err(Error::InvalidParameters);
        }

        let used = if market.capacity_in_quote {
            quote_amount
        } else {
            payout
        };
        if used > market.capacity || payout > market.max_payout {
            return Err(Error::CapacityExceeded);
        }

        let new_debt = market
            .total_debt
            .checked_add(payout)
            .ok_or(Error::InvalidParameters)?;
        if new_debt > market.terms.max_debt {
            return Err(Error::CapacityExceeded);
        }

        market.capacity -= used;
        market.total_debt = new_debt;
        market.sold += payout;
        market.purchased += quote_amount;

        // Quote asset: depositor -> market -> reserve ledger
        let this = env.current_contract_address();
        token::Client::new(&env, &market.quote_asset).transfer(&depositor, &this, &quote_amount);

        env.authorize_as_current_contract(vec![
            &env,
            InvokerContractAuthEntry::Contract(SubContractInvocation {
                context: ContractContext {
                    contract: market.quote_asset.clone(),
                    fn_name: Symbol::new(&env, "transfer"),
                    args: (this.clone(), ledger.clone(), quote_amount).into_val(&env),
                },
                sub_invocations: vec![&env],
            }),
        ]);

        let minted = env.try_invoke_contract::<i128, Error>(
            &ledger,
            &Symbol::new(&env, "deposit"),
            vec![
                &env,
                this.into_val(&env),
                market.quote_asset.into_val(&env),
                quote_amount.into_val(&env),
                payout.into_val(&env),
            ],
        );
        if !matches!(minted, Ok(Ok(amount)) if amount == payout) {
            return Err(Error::LedgerRejected);
        }

        let vesting_end = if market.terms.linear_vesting {
            now + market.terms.vesting
        } else {
            market.terms.conclusion
        };

        let note_id: u64 = env
            .storage()
            .instance()
            .get(&DataKey::NoteCounter)
            .unwrap_or(0);
        let note = Note {
            id: note_id,
            market_id,
            owner: depositor.clone(),
            payout,
            start: now,
            vesting_end,
            linear: market.terms.linear_vesting,
            redeemed: 0,
        };

        Self::save_note(&env, &note);
        env.storage()
            .instance()
            .set(&DataKey::NoteCounter, &(note_id + 1));

        let mut owned = Self::notes_of(env.clone(), depositor.clone());
        owned.push_back(note_id);
        env.storage()
            .persistent()
            .set(&DataKey::OwnerNotes(depositor.clone()), &owned);

        env.events().publish(
            (Symbol::new(&env, "bonded"), market_id),
            BondedEvent {
                market_id,
                note_id,
                depositor,
                quote_amount,
                payout,
                price,
                vesting_end,
            },
        );

        if market.capacity == 0 {
            Self::finish(&env, &mut market);
        } else {
            Self::save_market(&env, &market);
        }

        Ok((payout, note_id))
    }

    // ============================================
    // REDEMPTION
    // ============================================

    /// Release whatever has vested on a note. Returns 0 when nothing new
    /// has vested.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `NoteNotFound`: Note doesn't exist
    /// - `PermissionDenied`: Claimant does not own the note
    pub fn redeem(env: Env, note_id: u64, claimant: Address) -> Result<i128, Error> {
        let protocol_token = Self::protocol_token(&env)?;

        claimant.require_auth();

        let mut note = Self::load_note(&env, note_id)?;
        if note.owner != claimant {
            return Err(Error::PermissionDenied);
        }

        let released = vesting::releasable(&note, env.ledger().timestamp());
        if released == 0 {
            return Ok(0);
        }

        Self::release(&env, &protocol_token, &mut note, released);
        Ok(released)
    }

    /// Release the rest of a note once fully vested
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `NoteNotFound`: Note doesn't exist
    /// - `PermissionDenied`: Claimant does not own the note
    /// - `InsufficientVesting`: Vesting end not reached
    pub fn redeem_matured(env: Env, note_id: u64, claimant: Address) -> Result<i128, Error> {
        let protocol_token = Self::protocol_token(&env)?;

        claimant.require_auth();

        let mut note = Self::load_note(&env, note_id)?;
        if note.owner != claimant {
            return Err(Error::PermissionDenied);
        }

        if env.ledger().timestamp() < note.vesting_end {
            return Err(Error::InsufficientVesting);
        }

        let released = note.payout - note.redeemed;
        if released > 0 {
            Self::release(&env, &protocol_token, &mut note, released);
        }
        Ok(released)
    }

    // ============================================
    // LIFECYCLE
    // ============================================

    /// Mark a market concluded once its conclusion time has passed.
    /// Anyone may call.
    ///
    /// # Errors
    /// - `MarketNotFound`: Market doesn't exist
    /// - `TooEarly`: Conclusion not reached and capacity remains
    pub fn conclude_market(env: Env, market_id: u32) -> Result<(), Error> {
        let mut market = Self::load_market(&env, market_id)?;
        if market.status == MarketStatus::Concluded {
            return Ok(());
        }

        if env.ledger().timestamp() < market.terms.conclusion && market.capacity > 0 {
            return Err(Error::TooEarly);
        }

        Self::finish(&env, &mut market);
        Ok(())
    }

    // ============================================
    // VIEW FUNCTIONS
    // ============================================

    pub fn market(env: Env, market_id: u32) -> Result<Market, Error> {
        Self::load_market(&env, market_id)
    }

    /// Curve price now, without changing state. Deposits pay at least the
    /// ledger's backing price for their quote, which may be higher.
    pub fn market_price(env: Env, market_id: u32) -> Result<i128, Error> {
        let mut market = Self::load_market(&env, market_id)?;
        pricing::decay_and_tune(&mut market, env.ledger().timestamp())?;
        pricing::market_price(&market)
    }

    /// Payout `quote_amount` would buy now
    pub fn payout_for(env: Env, market_id: u32, quote_amount: i128) -> Result<i128, Error> {
        let ledger = Self::ledger(&env)?;
        let mut market = Self::load_market(&env, market_id)?;
        pricing::decay_and_tune(&mut market, env.ledger().timestamp())?;

        let price = Self::deposit_price(&env, &ledger, &market, quote_amount)?;
        pricing::calculate_payout(quote_amount, price).ok_or(Error::InvalidParameters)
    }

    pub fn note(env: Env, note_id: u64) -> Result<Note, Error> {
        Self::load_note(&env, note_id)
    }

    pub fn notes_of(env: Env, owner: Address) -> Vec<u64> {
        env.storage()
            .persistent()
            .get(&DataKey::OwnerNotes(owner))
            .unwrap_or(Vec::new(&env))
    }

    /// Amount `redeem` would release now
    pub fn pending_for(env: Env, note_id: u64) -> Result<i128, Error> {
        let note = Self::load_note(&env, note_id)?;
        Ok(vesting::releasable(&note, env.ledger().timestamp()))
    }

    /// Markets currently accepting deposits
    pub fn live_markets(env: Env) -> Vec<u32> {
        let now = env.ledger().timestamp();
        let count: u32 = env
            .storage()
            .instance()
            .get(&DataKey::MarketCounter)
            .unwrap_or(0);

        let mut live = Vec::new(&env);
        for market_id in 0..count {
            if let Ok(market) = Self::load_market(&env, market_id) {
                if market.status == MarketStatus::Active
                    && now < market.terms.conclusion
                    && market.capacity > 0
                {
                    live.push_back(market_id);
                }
            }
        }
        live
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

    fn protocol_token(env: &Env) -> Result<Address, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Token)
            .ok_or(Error::NotInitialized)
    }

    fn load_market(env: &Env, market_id: u32) -> Result<Market, Error> {
        env.storage()
            .persistent()
            .get(&DataKey::Market(market_id))
            .ok_or(Error::MarketNotFound)
    }

    fn save_market(env: &Env, market: &Market) {
        env.storage()
            .persistent()
            .set(&DataKey::Market(market.id), market);
    }

    fn load_note(env: &Env, note_id: u64) -> Result<Note, Error> {
        env.storage()
            .persistent()
            .get(&DataKey::Note(note_id))
            .ok_or(Error::NoteNotFound)
    }

    fn save_note(env: &Env, note: &Note) {
        env.storage().persistent().set(&DataKey::Note(note.id), note);
    }

    /// Curve price, raised to the backing price when the curve has fallen
    /// below what the ledger appraises the quote at
    fn deposit_price(
        env: &Env,
        ledger: &Address,
        market: &Market,
        quote_amount: i128,
    ) -> Result<i128, Error> {
        let price = pricing::market_price(market)?;

        let appraised = env.try_invoke_contract::<i128, Error>(
            ledger,
            &Symbol::new(env, "token_value"),
            vec![
                env,
                market.quote_asset.into_val(env),
                quote_amount.into_val(env),
            ],
        );
        let value = match appraised {
            Ok(Ok(value)) => value,
            _ => return Err(Error::LedgerRejected),
        };

        let floor = pricing::backing_price(quote_amount, value).ok_or(Error::InvalidParameters)?;
        if floor > price {
            log!(env, "price at backing floor", market.id, price, floor);
        }
        Ok(price.max(floor))
    }

    /// Decay and tune, publishing a tune event when one happens
    fn advance(env: &Env, market: &mut Market, now: u64) -> Result<(), Error> {
        let old_control_variable = market.terms.control_variable;
        if pricing::decay_and_tune(market, now)? {
            log!(
                env,
                "market tuned",
                market.id,
                market.terms.control_variable,
                market.max_payout
            );
            env.events().publish(
                (Symbol::new(env, "tuned"), market.id),
                TunedEvent {
                    market_id: market.id,
                    old_control_variable,
                    new_control_variable: market.terms.control_variable,
                    max_payout: market.max_payout,
                },
            );
        }
        Ok(())
    }

    fn finish(env: &Env, market: &mut Market) {
        market.status = MarketStatus::Concluded;
        Self::save_market(env, market);

        env.events().publish(
            (Symbol::new(env, "market_concluded"), market.id),
            MarketConcludedEvent {
                market_id: market.id,
                sold: market.sold,
                purchased: market.purchased,
            },
        );
    }

    fn release(env: &Env, protocol_token: &Address, note: &mut Note, amount: i128) {
        note.redeemed += amount;
        Self::save_note(env, note);

        token::Client::new(env, protocol_token).transfer(
            &env.current_contract_address(),
            &note.owner,
            &amount,
        );

        env.events().publish(
            (Symbol::new(env, "note_redeemed"), note.id),
            NoteRedeemedEvent {
                note_id: note.id,
                owner: note.owner.clone(),
                released: amount,
                redeemed: note.redeemed,
            },
        );
    }
}
