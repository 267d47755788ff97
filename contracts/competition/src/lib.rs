#![no_std]

//! # Spot the Ball
//!
//! A single-round pooled prize competition. Players buy bets on (x, y) points
//! of a 5001 × 5001 grid, investors fund the prize-purchase pool, and two
//! oracle draws first place the ball and then pick one winner among the bets
//! nearest to it.
//!
//! ## Flow
//! 1. The operator deploys with `commit_hash = keccak256(be32(x) || be32(y))`
//!    of the secret target point. The point is fixed before any money moves.
//! 2. Investors `invest` and players `place_bets` until the combined total
//!    reaches `funding_cap`. Betting stays open for `FUNDING_PERIOD_SECS`
//!    after that moment.
//! 3. `finish_game(x, y)` reveals the target and requests two oracle words.
//!    The ball lands within `CENTER_MAX_SHIFT` of the target on each axis.
//! 4. `find_winner(candidates)` takes the indexes of the bets nearest the
//!    ball (see `nearest_candidates`) and requests one word that picks the
//!    winner among them.
//! 5. `withdraw_prize_purchase_funds` pays the prize and the house profit to
//!    the admin and fixes the pool investors claim from.
//!
//! `emergency_terminate` is the escape hatch from any unsettled stage. It
//! opens flat refunds of investment principal and ticket contributions.
//!
//! ## Referrals
//! An address that invested or spent at least `referral_threshold` may be
//! named as referrer: the player gets `REFERRAL_DISCOUNT_PERCENT` off and the
//! referrer receives `REFERRAL_REWARD_PERCENT` of the undiscounted payment.

use soroban_sdk::{
    contract, contractclient, contracterror, contractevent, contractimpl, contracttype, log,
    panic_with_error, token, Address, BytesN, Env, Vec, U256,
};

mod commitment;
mod draw;
mod geometry;
mod settlement;
mod storage;

// ═══════════════════════════════════════════════════════════════════════════════
//  Contract Events
// ═══════════════════════════════════════════════════════════════════════════════

#[contractevent]
pub struct EvInvested {
    #[topic]
    pub investor: Address,
    pub amount: i128,
}

#[contractevent]
pub struct EvBetPlaced {
    #[topic]
    pub player: Address,
    pub bet_index: u32,
    pub prize_id: u32,
    pub x: u32,
    pub y: u32,
}

/// Aggregate for one `place_bets` call. `charge` is what the player paid.
#[contractevent]
pub struct EvTotalBetPlaced {
    #[topic]
    pub player: Address,
    pub count: u32,
    pub charge: i128,
}

#[contractevent]
pub struct EvReferralRewarded {
    #[topic]
    pub referrer: Address,
    pub player: Address,
    pub reward: i128,
}

#[contractevent]
pub struct EvPaused {
    pub admin: Address,
}

#[contractevent]
pub struct EvUnpaused {
    pub admin: Address,
}

#[contractevent]
pub struct EvGameFinished {
    pub total_investment: i128,
    pub total_sales: i128,
}

#[contractevent]
pub struct EvRandomnessRequested {
    #[topic]
    pub request_id: u64,
    pub num_words: u32,
}

#[contractevent]
pub struct EvBallPositionFound {
    pub x: u32,
    pub y: u32,
}

#[contractevent]
pub struct EvWinningBetFound {
    #[topic]
    pub bet_index: u32,
    pub player: Address,
    pub prize_id: u32,
}

/// Emitted once the prize purchase and house profit leave the pool.
#[contractevent]
pub struct EvPrizeFundsWithdrawn {
    pub prize_amount: i128,
    pub house_profit: i128,
}

#[contractevent]
pub struct EvInvestmentClaimed {
    #[topic]
    pub investor: Address,
    pub amount: i128,
}

#[contractevent]
pub struct EvInvestmentClaimedEmergency {
    #[topic]
    pub investor: Address,
    pub amount: i128,
}

#[contractevent]
pub struct EvTicketsClaimedEmergency {
    #[topic]
    pub player: Address,
    pub amount: i128,
}

#[contractevent]
pub struct EvGameTerminated {
    pub total_investment: i128,
    pub total_sales: i128,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  External trait interfaces
// ═══════════════════════════════════════════════════════════════════════════════

/// Verifiable randomness coordinator.
///
/// `request_random` returns a request id synchronously. The coordinator later
/// calls `fulfill_random(coordinator, request_id, words)` on the consumer.
#[contractclient(name = "VrfCoordinatorClient")]
pub trait VrfCoordinator {
    fn request_random(
        env: Env,
        consumer: Address,
        key_hash: BytesN<32>,
        subscription_id: u64,
        num_words: u32,
    ) -> u64;
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Errors
// ═══════════════════════════════════════════════════════════════════════════════

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum CompetitionError {
    NotAuthorized = 1,
    InappropriateState = 2,
    Paused = 3,
    AlreadyPaused = 4,
    NotPaused = 5,
    TimeoutNotReached = 6,
    BettingTimedOut = 7,
    AlreadyExecuted = 8,
    CommitMismatch = 9,
    EmptyBetList = 10,
    InvalidPrizeId = 11,
    XOutOfRange = 12,
    YOutOfRange = 13,
    ZeroCoordinates = 14,
    TooManyBets = 15,
    SelfReferral = 16,
    PaymentTooSmall = 17,
    EmptyCandidates = 18,
    InvalidCandidate = 19,
    NothingToClaim = 20,
    UnknownRequest = 21,
    AlreadyFulfilled = 22,
    InvalidRandomness = 23,
    InvalidAmount = 24,
    InvalidConfig = 25,
    Overflow = 26,
    AdminNotSet = 27,
    NotInitialized = 28,
    BetNotFound = 29,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Lifecycle stages (compact u32 encoding for storage efficiency)
// ═══════════════════════════════════════════════════════════════════════════════

pub(crate) type Stage = u32;

/// Investment and betting accepted.
pub const STAGE_OPEN: Stage = 1;
/// Target revealed, ball draw pending.
pub const STAGE_FINISHED: Stage = 2;
pub const STAGE_BALL_FOUND: Stage = 3;
pub const STAGE_WINNER_FOUND: Stage = 4;
/// Prize funds withdrawn, investor claims open.
pub const STAGE_SETTLED: Stage = 5;

// ═══════════════════════════════════════════════════════════════════════════════
//  Constants
// ═══════════════════════════════════════════════════════════════════════════════

pub const X_MAX: u32 = 5000;
pub const Y_MAX: u32 = 5000;
pub const MAX_TICKETS_PER_PLAYER: u32 = 150;

/// Betting window after the funding cap is reached: 7 days.
pub const FUNDING_PERIOD_SECS: u64 = 7 * 24 * 60 * 60;

/// Maximum distance between the committed target and the ball, per axis.
pub const CENTER_MAX_SHIFT: u32 = 50;

pub const INVESTORS_PERCENT: i128 = 60;
pub const REFERRAL_DISCOUNT_PERCENT: i128 = 5;
pub const REFERRAL_REWARD_PERCENT: i128 = 20;

const BALL_WORDS: u32 = 2;
const WINNER_WORDS: u32 = 1;

// ═══════════════════════════════════════════════════════════════════════════════
//  Types
// ═══════════════════════════════════════════════════════════════════════════════

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Prize {
    pub collection: Address,
    pub price: i128,
    pub ticket_price: i128,
}

/// Construction parameters. Immutable after deployment.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CompetitionConfig {
    pub commit_hash: BytesN<32>,
    pub key_hash: BytesN<32>,
    pub subscription_id: u64,
    /// Prize id `p` refers to `prizes[p - 1]`.
    pub prizes: Vec<Prize>,
    pub funding_cap: i128,
    pub referral_threshold: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BetRequest {
    pub prize_id: u32,
    pub x: u32,
    pub y: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Bet {
    pub player: Address,
    pub prize_id: u32,
    pub x: u32,
    pub y: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Investment {
    pub amount: i128,
    pub claimed: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PlayerAccount {
    pub tickets: u32,
    /// Total paid by the player, after referral discounts.
    pub spent: i128,
    /// Share of `spent` that stayed in the pool (referral rewards excluded).
    pub contributed: i128,
    pub refunded: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Draw {
    Idle,
    Pending(u64),
    Fulfilled(u64),
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CompetitionState {
    pub stage: u32,
    pub paused: bool,
    pub terminated: bool,
    pub total_investment: i128,
    /// Ticket payments kept by the pool. Referral rewards are excluded, so this
    /// is less than the sum of `EvTotalBetPlaced.charge` when referrals apply.
    pub total_sales: i128,
    /// Ledger timestamp at which the funding cap was first reached.
    pub funded_at: Option<u64>,
    pub bet_count: u32,
    // Revealed target, reduced onto the grid
    pub commit_x: Option<u32>,
    pub commit_y: Option<u32>,
    // Ball position
    pub center_x: Option<u32>,
    pub center_y: Option<u32>,
    pub ball_draw: Draw,
    pub winner_draw: Draw,
    pub winning_bet: Option<u32>,
    pub claimable_investment: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SettlementSplit {
    pub prize_amount: i128,
    pub house_profit: i128,
    pub investor_profit: i128,
    pub claimable_investment: i128,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Contract
// ═══════════════════════════════════════════════════════════════════════════════

#[contract]
pub struct CompetitionContract;

#[contractimpl]
impl CompetitionContract {
    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Constructor
    // ───────────────────────────────────────────────────────────────────────────

    pub fn __constructor(
        env: Env,
        admin: Address,
        token: Address,
        coordinator: Address,
        config: CompetitionConfig,
    ) {
        if !Self::config_is_valid(&config) {
            panic_with_error!(&env, CompetitionError::InvalidConfig);
        }
        let state = CompetitionState {
            stage: STAGE_OPEN,
            paused: false,
            terminated: false,
            total_investment: 0,
            total_sales: 0,
            funded_at: None,
            bet_count: 0,
            commit_x: None,
            commit_y: None,
            center_x: None,
            center_y: None,
            ball_draw: Draw::Idle,
            winner_draw: Draw::Idle,
            winning_bet: None,
            claimable_investment: 0,
        };
        storage::init(&env, &admin, &token, &coordinator, &config, &state);
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Investment ledger
    // ───────────────────────────────────────────────────────────────────────────

    /// Invest up to the remaining room under the funding cap.
    ///
    /// Only the accepted part is pulled from `investor`; it is returned.
    pub fn invest(env: Env, investor: Address, amount: i128) -> Result<i128, CompetitionError> {
        investor.require_auth();
        if amount <= 0 {
            return Err(CompetitionError::InvalidAmount);
        }
        let config = storage::load_config(&env)?;
        let mut state = storage::read_state(&env)?;
        Self::ensure_investment_open(&state, &config)?;

        let accepted = amount.min(Self::remaining_room(&state, &config)?);
        let mut record = storage::read_investment(&env, &investor);
        record.amount = record
            .amount
            .checked_add(accepted)
            .ok_or(CompetitionError::Overflow)?;
        state.total_investment = state
            .total_investment
            .checked_add(accepted)
            .ok_or(CompetitionError::Overflow)?;
        Self::mark_funded(&env, &mut state, &config);

        Self::token_client(&env)?.transfer(&investor, &env.current_contract_address(), &accepted);
        storage::write_investment(&env, &investor, &record);
        storage::write_state(&env, &state);

        EvInvested {
            investor,
            amount: accepted,
        }
        .publish(&env);
        Ok(accepted)
    }

    /// Pro-rata share of the claimable pool after settlement.
    pub fn claim_investment(env: Env, investor: Address) -> Result<i128, CompetitionError> {
        investor.require_auth();
        let state = storage::read_state(&env)?;
        if state.stage != STAGE_SETTLED {
            return Err(CompetitionError::InappropriateState);
        }
        let mut record = storage::read_investment(&env, &investor);
        if record.claimed || record.amount <= 0 {
            return Err(CompetitionError::NothingToClaim);
        }
        let payout = settlement::investor_share(
            state.claimable_investment,
            record.amount,
            state.total_investment,
        )?;
        record.claimed = true;
        storage::write_investment(&env, &investor, &record);
        Self::pay_out(&env, &investor, payout)?;

        EvInvestmentClaimed {
            investor,
            amount: payout,
        }
        .publish(&env);
        Ok(payout)
    }

    /// Refund of the investor's principal after termination.
    pub fn claim_investment_emergency(
        env: Env,
        investor: Address,
    ) -> Result<i128, CompetitionError> {
        investor.require_auth();
        let state = storage::read_state(&env)?;
        if !state.terminated {
            return Err(CompetitionError::InappropriateState);
        }
        let mut record = storage::read_investment(&env, &investor);
        if record.claimed || record.amount <= 0 {
            return Err(CompetitionError::NothingToClaim);
        }
        record.claimed = true;
        storage::write_investment(&env, &investor, &record);
        Self::pay_out(&env, &investor, record.amount)?;

        EvInvestmentClaimedEmergency {
            investor,
            amount: record.amount,
        }
        .publish(&env);
        Ok(record.amount)
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Bet ledger
    // ───────────────────────────────────────────────────────────────────────────

    /// Buy one ticket per entry in `bets`. Returns the amount charged.
    ///
    /// `max_payment` is the most the player accepts to pay; the call fails
    /// with `PaymentTooSmall` if the charge exceeds it.
    pub fn place_bets(
        env: Env,
        player: Address,
        bets: Vec<BetRequest>,
        referrer: Option<Address>,
        max_payment: i128,
    ) -> Result<i128, CompetitionError> {
        player.require_auth();
        let config = storage::load_config(&env)?;
        let mut state = storage::read_state(&env)?;
        Self::ensure_betting_open(&env, &state)?;

        if bets.is_empty() {
            return Err(CompetitionError::EmptyBetList);
        }
        let mut payment: i128 = 0;
        for bet in bets.iter() {
            let prize = Self::validate_bet(&config, &bet)?;
            payment = payment
                .checked_add(prize.ticket_price)
                .ok_or(CompetitionError::Overflow)?;
        }

        let mut account = storage::read_player(&env, &player);
        let tickets = account
            .tickets
            .checked_add(bets.len())
            .ok_or(CompetitionError::Overflow)?;
        if tickets > MAX_TICKETS_PER_PLAYER {
            return Err(CompetitionError::TooManyBets);
        }
        if referrer.as_ref() == Some(&player) {
            return Err(CompetitionError::SelfReferral);
        }

        let referrer = match referrer {
            Some(r) if Self::referral_valid(&env, &config, &r) => Some(r),
            _ => None,
        };
        let quote = settlement::quote_tickets(payment, referrer.is_some())?;
        if max_payment < quote.charge {
            return Err(CompetitionError::PaymentTooSmall);
        }
        let retained = quote.charge - quote.reward;

        // Record
        for bet in bets.iter() {
            let index = state.bet_count;
            storage::write_bet(
                &env,
                index,
                &Bet {
                    player: player.clone(),
                    prize_id: bet.prize_id,
                    x: bet.x,
                    y: bet.y,
                },
            );
            state.bet_count = index.checked_add(1).ok_or(CompetitionError::Overflow)?;
            EvBetPlaced {
                player: player.clone(),
                bet_index: index,
                prize_id: bet.prize_id,
                x: bet.x,
                y: bet.y,
            }
            .publish(&env);
        }
        account.tickets = tickets;
        account.spent = account
            .spent
            .checked_add(quote.charge)
            .ok_or(CompetitionError::Overflow)?;
        account.contributed = account
            .contributed
            .checked_add(retained)
            .ok_or(CompetitionError::Overflow)?;
        state.total_sales = state
            .total_sales
            .checked_add(retained)
            .ok_or(CompetitionError::Overflow)?;
        Self::mark_funded(&env, &mut state, &config);
        storage::write_player(&env, &player, &account);
        storage::write_state(&env, &state);

        // Settle payment
        let token = Self::token_client(&env)?;
        token.transfer(&player, &env.current_contract_address(), &quote.charge);
        if let Some(referrer) = referrer {
            if quote.reward > 0 {
                token.transfer(&env.current_contract_address(), &referrer, &quote.reward);
                EvReferralRewarded {
                    referrer,
                    player: player.clone(),
                    reward: quote.reward,
                }
                .publish(&env);
            }
        }

        EvTotalBetPlaced {
            player,
            count: bets.len(),
            charge: quote.charge,
        }
        .publish(&env);
        Ok(quote.charge)
    }

    /// Refund of the player's pool contribution after termination.
    pub fn claim_tickets_emergency(env: Env, player: Address) -> Result<i128, CompetitionError> {
        player.require_auth();
        let state = storage::read_state(&env)?;
        if !state.terminated {
            return Err(CompetitionError::InappropriateState);
        }
        let mut account = storage::read_player(&env, &player);
        if account.refunded || account.contributed <= 0 {
            return Err(CompetitionError::NothingToClaim);
        }
        account.refunded = true;
        storage::write_player(&env, &player, &account);
        Self::pay_out(&env, &player, account.contributed)?;

        EvTicketsClaimedEmergency {
            player,
            amount: account.contributed,
        }
        .publish(&env);
        Ok(account.contributed)
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Settlement
    // ───────────────────────────────────────────────────────────────────────────

    /// Reveal the committed target and request the ball draw.
    pub fn finish_game(env: Env, admin: Address, x: U256, y: U256) -> Result<(), CompetitionError> {
        Self::require_admin(&env, &admin)?;
        let config = storage::load_config(&env)?;
        let mut state = storage::read_state(&env)?;
        if state.terminated {
            return Err(CompetitionError::InappropriateState);
        }
        if state.stage != STAGE_OPEN {
            return Err(CompetitionError::AlreadyExecuted);
        }
        let funded_at = state.funded_at.ok_or(CompetitionError::InappropriateState)?;
        if env.ledger().timestamp() < funded_at.saturating_add(FUNDING_PERIOD_SECS) {
            return Err(CompetitionError::TimeoutNotReached);
        }
        let (commit_x, commit_y) = commitment::reveal(&env, &config.commit_hash, &x, &y)?;

        let request_id = Self::request_draw(&env, &config, BALL_WORDS)?;
        state.commit_x = Some(commit_x);
        state.commit_y = Some(commit_y);
        state.ball_draw = Draw::Pending(request_id);
        state.stage = STAGE_FINISHED;
        storage::write_state(&env, &state);

        log!(&env, "finished: target {} {}, ball request {}", commit_x, commit_y, request_id);
        EvGameFinished {
            total_investment: state.total_investment,
            total_sales: state.total_sales,
        }
        .publish(&env);
        Ok(())
    }

    /// Request the winner draw among `candidates` (bet indexes).
    ///
    /// The list is expected to be the nearest-point set for the ball
    /// position; indexes are checked for range and uniqueness only.
    pub fn find_winner(env: Env, admin: Address, candidates: Vec<u32>) -> Result<(), CompetitionError> {
        Self::require_admin(&env, &admin)?;
        let config = storage::load_config(&env)?;
        let mut state = storage::read_state(&env)?;
        if state.terminated || state.stage != STAGE_BALL_FOUND || state.winner_draw != Draw::Idle {
            return Err(CompetitionError::InappropriateState);
        }
        if candidates.is_empty() {
            return Err(CompetitionError::EmptyCandidates);
        }
        let mut seen: Vec<u32> = Vec::new(&env);
        for index in candidates.iter() {
            if index >= state.bet_count || seen.contains(index) {
                return Err(CompetitionError::InvalidCandidate);
            }
            seen.push_back(index);
        }

        let request_id = Self::request_draw(&env, &config, WINNER_WORDS)?;
        storage::write_candidates(&env, &candidates);
        state.winner_draw = Draw::Pending(request_id);
        storage::write_state(&env, &state);
        log!(&env, "winner request {} over {} candidates", request_id, candidates.len());
        Ok(())
    }

    /// Oracle callback for both draws.
    pub fn fulfill_random(
        env: Env,
        coordinator: Address,
        request_id: u64,
        words: Vec<u64>,
    ) -> Result<(), CompetitionError> {
        Self::require_coordinator(&env, &coordinator)?;
        let mut state = storage::read_state(&env)?;
        if state.terminated {
            return Err(CompetitionError::InappropriateState);
        }

        if state.ball_draw == Draw::Pending(request_id) {
            Self::resolve_ball(&env, &mut state, &words)?;
            state.ball_draw = Draw::Fulfilled(request_id);
        } else if state.winner_draw == Draw::Pending(request_id) {
            Self::resolve_winner(&env, &mut state, &words)?;
            state.winner_draw = Draw::Fulfilled(request_id);
        } else if state.ball_draw == Draw::Fulfilled(request_id)
            || state.winner_draw == Draw::Fulfilled(request_id)
        {
            return Err(CompetitionError::AlreadyFulfilled);
        } else {
            return Err(CompetitionError::UnknownRequest);
        }
        storage::write_state(&env, &state);
        Ok(())
    }

    /// Pay the prize purchase and house profit to the admin.
    ///
    /// The prize debit never exceeds the won prize's price, whatever
    /// `purchase_amount` reports.
    pub fn withdraw_prize_purchase_funds(
        env: Env,
        admin: Address,
        purchase_amount: i128,
    ) -> Result<SettlementSplit, CompetitionError> {
        Self::require_admin(&env, &admin)?;
        let config = storage::load_config(&env)?;
        let mut state = storage::read_state(&env)?;
        if state.terminated || state.stage != STAGE_WINNER_FOUND {
            return Err(CompetitionError::InappropriateState);
        }
        let prize = Self::prize_of_winner(&env, &state, &config)?;
        let split = settlement::split(
            state.total_investment,
            state.total_sales,
            config.funding_cap,
            prize.price,
            purchase_amount,
        )?;

        state.claimable_investment = split.claimable_investment;
        state.stage = STAGE_SETTLED;
        storage::write_state(&env, &state);

        let payout = split
            .prize_amount
            .checked_add(split.house_profit)
            .ok_or(CompetitionError::Overflow)?;
        Self::pay_out(&env, &admin, payout)?;

        log!(&env, "settled: claimable {}", split.claimable_investment);
        EvPrizeFundsWithdrawn {
            prize_amount: split.prize_amount,
            house_profit: split.house_profit,
        }
        .publish(&env);
        Ok(split)
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Admin
    // ───────────────────────────────────────────────────────────────────────────

    pub fn emergency_terminate(env: Env, admin: Address) -> Result<(), CompetitionError> {
        Self::require_admin(&env, &admin)?;
        let mut state = storage::read_state(&env)?;
        if state.terminated || state.stage == STAGE_SETTLED {
            return Err(CompetitionError::InappropriateState);
        }
        state.terminated = true;
        storage::write_state(&env, &state);

        log!(&env, "terminated at stage {}", state.stage);
        EvGameTerminated {
            total_investment: state.total_investment,
            total_sales: state.total_sales,
        }
        .publish(&env);
        Ok(())
    }

    pub fn pause(env: Env, admin: Address) -> Result<(), CompetitionError> {
        Self::require_admin(&env, &admin)?;
        let mut state = storage::read_state(&env)?;
        if state.paused {
            return Err(CompetitionError::AlreadyPaused);
        }
        state.paused = true;
        storage::write_state(&env, &state);
        EvPaused { admin }.publish(&env);
        Ok(())
    }

    pub fn unpause(env: Env, admin: Address) -> Result<(), CompetitionError> {
        Self::require_admin(&env, &admin)?;
        let mut state = storage::read_state(&env)?;
        if !state.paused {
            return Err(CompetitionError::NotPaused);
        }
        state.paused = false;
        storage::write_state(&env, &state);
        EvUnpaused { admin }.publish(&env);
        Ok(())
    }

    pub fn get_admin(env: Env) -> Result<Address, CompetitionError> {
        storage::load_admin(&env)
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Queries
    // ───────────────────────────────────────────────────────────────────────────

    pub fn get_state(env: Env) -> Result<CompetitionState, CompetitionError> {
        storage::read_state(&env)
    }

    pub fn total_investment(env: Env) -> Result<i128, CompetitionError> {
        Ok(storage::read_state(&env)?.total_investment)
    }

    pub fn total_sales(env: Env) -> Result<i128, CompetitionError> {
        Ok(storage::read_state(&env)?.total_sales)
    }

    pub fn bet_count(env: Env) -> Result<u32, CompetitionError> {
        Ok(storage::read_state(&env)?.bet_count)
    }

    pub fn all_bets(env: Env) -> Result<Vec<Bet>, CompetitionError> {
        let state = storage::read_state(&env)?;
        Self::load_bets(&env, state.bet_count)
    }

    pub fn investment_of(env: Env, investor: Address) -> i128 {
        storage::read_investment(&env, &investor).amount
    }

    pub fn tickets_of(env: Env, player: Address) -> u32 {
        storage::read_player(&env, &player).tickets
    }

    pub fn player_of(env: Env, player: Address) -> PlayerAccount {
        storage::read_player(&env, &player)
    }

    pub fn prizes(env: Env) -> Result<Vec<Prize>, CompetitionError> {
        Ok(storage::load_config(&env)?.prizes)
    }

    pub fn funding_cap(env: Env) -> Result<i128, CompetitionError> {
        Ok(storage::load_config(&env)?.funding_cap)
    }

    pub fn commit_hash(env: Env) -> Result<BytesN<32>, CompetitionError> {
        Ok(storage::load_config(&env)?.commit_hash)
    }

    pub fn is_investment_allowed(env: Env) -> Result<bool, CompetitionError> {
        let config = storage::load_config(&env)?;
        let state = storage::read_state(&env)?;
        Ok(Self::ensure_investment_open(&state, &config).is_ok())
    }

    pub fn is_placing_bets_allowed(env: Env) -> Result<bool, CompetitionError> {
        let state = storage::read_state(&env)?;
        Ok(Self::ensure_betting_open(&env, &state).is_ok())
    }

    pub fn is_paused(env: Env) -> Result<bool, CompetitionError> {
        Ok(storage::read_state(&env)?.paused)
    }

    pub fn is_game_terminated(env: Env) -> Result<bool, CompetitionError> {
        Ok(storage::read_state(&env)?.terminated)
    }

    pub fn is_finish_executed(env: Env) -> Result<bool, CompetitionError> {
        Ok(storage::read_state(&env)?.stage >= STAGE_FINISHED)
    }

    pub fn is_ball_found(env: Env) -> Result<bool, CompetitionError> {
        Ok(storage::read_state(&env)?.stage >= STAGE_BALL_FOUND)
    }

    pub fn is_winner_found(env: Env) -> Result<bool, CompetitionError> {
        Ok(storage::read_state(&env)?.stage >= STAGE_WINNER_FOUND)
    }

    pub fn is_claim_investment_allowed(env: Env) -> Result<bool, CompetitionError> {
        Ok(storage::read_state(&env)?.stage == STAGE_SETTLED)
    }

    /// Revealed target on the grid, once `finish_game` succeeded.
    pub fn commit_position(env: Env) -> Result<Option<Position>, CompetitionError> {
        let state = storage::read_state(&env)?;
        Ok(state
            .commit_x
            .zip(state.commit_y)
            .map(|(x, y)| Position { x, y }))
    }

    /// Ball position, once the ball draw is fulfilled.
    pub fn center_position(env: Env) -> Result<Option<Position>, CompetitionError> {
        let state = storage::read_state(&env)?;
        Ok(state
            .center_x
            .zip(state.center_y)
            .map(|(x, y)| Position { x, y }))
    }

    pub fn winning_bet(env: Env) -> Result<Bet, CompetitionError> {
        let state = storage::read_state(&env)?;
        let index = state.winning_bet.ok_or(CompetitionError::InappropriateState)?;
        storage::read_bet(&env, index)
    }

    pub fn won_prize(env: Env) -> Result<Prize, CompetitionError> {
        let config = storage::load_config(&env)?;
        let state = storage::read_state(&env)?;
        Self::prize_of_winner(&env, &state, &config)
    }

    pub fn claimable_investment(env: Env) -> Result<i128, CompetitionError> {
        Ok(storage::read_state(&env)?.claimable_investment)
    }

    pub fn is_referral_valid(env: Env, address: Address) -> Result<bool, CompetitionError> {
        let config = storage::load_config(&env)?;
        Ok(Self::referral_valid(&env, &config, &address))
    }

    /// Indexes of the bets nearest the ball, ties kept. Input for `find_winner`.
    pub fn nearest_candidates(env: Env) -> Result<Vec<u32>, CompetitionError> {
        let state = storage::read_state(&env)?;
        let (cx, cy) = state
            .center_x
            .zip(state.center_y)
            .ok_or(CompetitionError::InappropriateState)?;
        let bets = Self::load_bets(&env, state.bet_count)?;
        Ok(geometry::nearest_indexes(&env, &bets, cx, cy))
    }

    // ═══════════════════════════════════════════════════════════════════════════
    //  Internal: Guards
    // ═══════════════════════════════════════════════════════════════════════════

    fn require_admin(env: &Env, caller: &Address) -> Result<(), CompetitionError> {
        let admin = storage::load_admin(env)?;
        caller.require_auth();
        if *caller != admin {
            return Err(CompetitionError::NotAuthorized);
        }
        Ok(())
    }

    fn require_coordinator(env: &Env, caller: &Address) -> Result<(), CompetitionError> {
        let coordinator = storage::load_coordinator(env)?;
        caller.require_auth();
        if *caller != coordinator {
            return Err(CompetitionError::NotAuthorized);
        }
        Ok(())
    }

    fn ensure_investment_open(
        state: &CompetitionState,
        config: &CompetitionConfig,
    ) -> Result<(), CompetitionError> {
        if state.terminated {
            return Err(CompetitionError::InappropriateState);
        }
        if state.paused {
            return Err(CompetitionError::Paused);
        }
        if state.stage != STAGE_OPEN || Self::remaining_room(state, config)? <= 0 {
            return Err(CompetitionError::InappropriateState);
        }
        Ok(())
    }

    fn ensure_betting_open(env: &Env, state: &CompetitionState) -> Result<(), CompetitionError> {
        if state.terminated {
            return Err(CompetitionError::InappropriateState);
        }
        if state.paused {
            return Err(CompetitionError::Paused);
        }
        if state.stage != STAGE_OPEN {
            return Err(CompetitionError::InappropriateState);
        }
        if let Some(funded_at) = state.funded_at {
            if env.ledger().timestamp() >= funded_at.saturating_add(FUNDING_PERIOD_SECS) {
                return Err(CompetitionError::BettingTimedOut);
            }
        }
        Ok(())
    }

    fn validate_bet(config: &CompetitionConfig, bet: &BetRequest) -> Result<Prize, CompetitionError> {
        if bet.prize_id == 0 {
            return Err(CompetitionError::InvalidPrizeId);
        }
        let prize = config
            .prizes
            .get(bet.prize_id - 1)
            .ok_or(CompetitionError::InvalidPrizeId)?;
        if bet.x > X_MAX {
            return Err(CompetitionError::XOutOfRange);
        }
        if bet.y > Y_MAX {
            return Err(CompetitionError::YOutOfRange);
        }
        if bet.x == 0 && bet.y == 0 {
            return Err(CompetitionError::ZeroCoordinates);
        }
        Ok(prize)
    }

    fn config_is_valid(config: &CompetitionConfig) -> bool {
        if config.prizes.is_empty() || config.funding_cap <= 0 || config.referral_threshold <= 0 {
            return false;
        }
        config.prizes.iter().all(|p| {
            p.price > 0 && p.ticket_price > 0 && p.price <= config.funding_cap
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    //  Internal: Ledger helpers
    // ═══════════════════════════════════════════════════════════════════════════

    fn remaining_room(
        state: &CompetitionState,
        config: &CompetitionConfig,
    ) -> Result<i128, CompetitionError> {
        config
            .funding_cap
            .checked_sub(state.total_investment)
            .and_then(|v| v.checked_sub(state.total_sales))
            .ok_or(CompetitionError::Overflow)
    }

    fn mark_funded(env: &Env, state: &mut CompetitionState, config: &CompetitionConfig) {
        if state.funded_at.is_some() {
            return;
        }
        let raised = state.total_investment.saturating_add(state.total_sales);
        if raised >= config.funding_cap {
            let now = env.ledger().timestamp();
            state.funded_at = Some(now);
            log!(env, "funding cap reached at {}", now);
        }
    }

    fn referral_valid(env: &Env, config: &CompetitionConfig, address: &Address) -> bool {
        storage::read_investment(env, address).amount >= config.referral_threshold
            || storage::read_player(env, address).spent >= config.referral_threshold
    }

    fn load_bets(env: &Env, count: u32) -> Result<Vec<Bet>, CompetitionError> {
        let mut bets = Vec::new(env);
        for index in 0..count {
            bets.push_back(storage::read_bet(env, index)?);
        }
        Ok(bets)
    }

    fn prize_of_winner(
        env: &Env,
        state: &CompetitionState,
        config: &CompetitionConfig,
    ) -> Result<Prize, CompetitionError> {
        let index = state.winning_bet.ok_or(CompetitionError::InappropriateState)?;
        let bet = storage::read_bet(env, index)?;
        config
            .prizes
            .get(bet.prize_id.saturating_sub(1))
            .ok_or(CompetitionError::InvalidPrizeId)
    }

    fn token_client(env: &Env) -> Result<token::TokenClient<'_>, CompetitionError> {
        Ok(token::TokenClient::new(env, &storage::load_token(env)?))
    }

    fn pay_out(env: &Env, to: &Address, amount: i128) -> Result<(), CompetitionError> {
        if amount > 0 {
            Self::token_client(env)?.transfer(&env.current_contract_address(), to, &amount);
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    //  Internal: Randomness
    // ═══════════════════════════════════════════════════════════════════════════

    fn request_draw(
        env: &Env,
        config: &CompetitionConfig,
        num_words: u32,
    ) -> Result<u64, CompetitionError> {
        let coordinator = VrfCoordinatorClient::new(env, &storage::load_coordinator(env)?);
        let request_id = coordinator.request_random(
            &env.current_contract_address(),
            &config.key_hash,
            &config.subscription_id,
            &num_words,
        );
        EvRandomnessRequested {
            request_id,
            num_words,
        }
        .publish(env);
        Ok(request_id)
    }

    fn resolve_ball(
        env: &Env,
        state: &mut CompetitionState,
        words: &Vec<u64>,
    ) -> Result<(), CompetitionError> {
        if words.len() < BALL_WORDS {
            return Err(CompetitionError::InvalidRandomness);
        }
        let (commit_x, commit_y) = state
            .commit_x
            .zip(state.commit_y)
            .ok_or(CompetitionError::InappropriateState)?;
        let wx = words.get(0).ok_or(CompetitionError::InvalidRandomness)?;
        let wy = words.get(1).ok_or(CompetitionError::InvalidRandomness)?;
        let x = draw::shifted_coordinate(commit_x, wx, X_MAX);
        let y = draw::shifted_coordinate(commit_y, wy, Y_MAX);
        state.center_x = Some(x);
        state.center_y = Some(y);
        state.stage = STAGE_BALL_FOUND;

        log!(env, "ball at {} {}", x, y);
        EvBallPositionFound { x, y }.publish(env);
        Ok(())
    }

    fn resolve_winner(
        env: &Env,
        state: &mut CompetitionState,
        words: &Vec<u64>,
    ) -> Result<(), CompetitionError> {
        let word = words.get(0).ok_or(CompetitionError::InvalidRandomness)?;
        let candidates = storage::read_candidates(env);
        let index = draw::pick_candidate(&candidates, word)?;
        let bet = storage::read_bet(env, index)?;
        state.winning_bet = Some(index);
        state.stage = STAGE_WINNER_FOUND;

        log!(env, "winning bet {}", index);
        EvWinningBetFound {
            bet_index: index,
            player: bet.player,
            prize_id: bet.prize_id,
        }
        .publish(env);
        Ok(())
    }
}
