//! Storage layout.
//!
//! - `instance()`: Admin, Token, Coordinator, Config and the singleton
//!   `CompetitionState`. All share one ledger entry and TTL.
//! - `persistent()`: one entry per bet, per investor and per player, plus the
//!   winner candidate list. Each write bumps the entry TTL.

use soroban_sdk::{contracttype, Address, Env, Vec};

use crate::{
    Bet, CompetitionConfig, CompetitionError, CompetitionState, Investment, PlayerAccount,
};

// Ledger rate is approximately 5 seconds per ledger on Stellar
const LEDGER_RATE_SECS: u32 = 5;

// TTL expressed in human-readable time units (30 days)
const TTL_SECONDS: u32 = 30 * 24 * 60 * 60; // 2,592,000 seconds

/// TTL for competition storage in ledgers: 30 * 24 * 60 * 60 / 5 = 518,400 ledgers
pub(crate) const TTL_LEDGERS: u32 = TTL_SECONDS / LEDGER_RATE_SECS;

#[contracttype]
#[derive(Clone)]
enum StorageKey {
    Admin,
    Token,
    Coordinator,
    Config,
    State,
    /// Nearest-point candidate indexes submitted to `find_winner`.
    Candidates,
    Bet(u32),
    Investor(Address),
    Player(Address),
}

// ─── Configuration ─────────────────────────────────────────────────────────

pub(crate) fn init(
    env: &Env,
    admin: &Address,
    token: &Address,
    coordinator: &Address,
    config: &CompetitionConfig,
    state: &CompetitionState,
) {
    let instance = env.storage().instance();
    instance.set(&StorageKey::Admin, admin);
    instance.set(&StorageKey::Token, token);
    instance.set(&StorageKey::Coordinator, coordinator);
    instance.set(&StorageKey::Config, config);
    write_state(env, state);
}

pub(crate) fn load_admin(env: &Env) -> Result<Address, CompetitionError> {
    env.storage()
        .instance()
        .get(&StorageKey::Admin)
        .ok_or(CompetitionError::AdminNotSet)
}

pub(crate) fn load_token(env: &Env) -> Result<Address, CompetitionError> {
    env.storage()
        .instance()
        .get(&StorageKey::Token)
        .ok_or(CompetitionError::NotInitialized)
}

pub(crate) fn load_coordinator(env: &Env) -> Result<Address, CompetitionError> {
    env.storage()
        .instance()
        .get(&StorageKey::Coordinator)
        .ok_or(CompetitionError::NotInitialized)
}

pub(crate) fn load_config(env: &Env) -> Result<CompetitionConfig, CompetitionError> {
    env.storage()
        .instance()
        .get(&StorageKey::Config)
        .ok_or(CompetitionError::NotInitialized)
}

// ─── Singleton state ───────────────────────────────────────────────────────

pub(crate) fn read_state(env: &Env) -> Result<CompetitionState, CompetitionError> {
    env.storage()
        .instance()
        .get(&StorageKey::State)
        .ok_or(CompetitionError::NotInitialized)
}

pub(crate) fn write_state(env: &Env, state: &CompetitionState) {
    env.storage().instance().set(&StorageKey::State, state);
    env.storage()
        .instance()
        .extend_ttl(TTL_LEDGERS, TTL_LEDGERS);
}

// ─── Ledgers ───────────────────────────────────────────────────────────────

pub(crate) fn read_bet(env: &Env, index: u32) -> Result<Bet, CompetitionError> {
    env.storage()
        .persistent()
        .get(&StorageKey::Bet(index))
        .ok_or(CompetitionError::BetNotFound)
}

pub(crate) fn write_bet(env: &Env, index: u32, bet: &Bet) {
    write_persistent(env, &StorageKey::Bet(index), bet);
}

pub(crate) fn read_investment(env: &Env, investor: &Address) -> Investment {
    env.storage()
        .persistent()
        .get(&StorageKey::Investor(investor.clone()))
        .unwrap_or(Investment {
            amount: 0,
            claimed: false,
        })
}

pub(crate) fn write_investment(env: &Env, investor: &Address, investment: &Investment) {
    write_persistent(env, &StorageKey::Investor(investor.clone()), investment);
}

pub(crate) fn read_player(env: &Env, player: &Address) -> PlayerAccount {
    env.storage()
        .persistent()
        .get(&StorageKey::Player(player.clone()))
        .unwrap_or(PlayerAccount {
            tickets: 0,
            spent: 0,
            contributed: 0,
            refunded: false,
        })
}

pub(crate) fn write_player(env: &Env, player: &Address, account: &PlayerAccount) {
    write_persistent(env, &StorageKey::Player(player.clone()), account);
}

pub(crate) fn read_candidates(env: &Env) -> Vec<u32> {
    env.storage()
        .persistent()
        .get(&StorageKey::Candidates)
        .unwrap_or_else(|| Vec::new(env))
}

pub(crate) fn write_candidates(env: &Env, candidates: &Vec<u32>) {
    write_persistent(env, &StorageKey::Candidates, candidates);
}

/// Write a persistent entry and extend its TTL in one step.
fn write_persistent<V>(env: &Env, key: &StorageKey, value: &V)
where
    V: soroban_sdk::IntoVal<Env, soroban_sdk::Val>,
{
    env.storage().persistent().set(key, value);
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_LEDGERS, TTL_LEDGERS);
}
