//! Fund split and pro-rata arithmetic. All money math is checked.

use crate::{
    CompetitionError, SettlementSplit, INVESTORS_PERCENT, REFERRAL_DISCOUNT_PERCENT,
    REFERRAL_REWARD_PERCENT,
};

/// What the player pays and what the referrer receives for one `place_bets` call.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct TicketQuote {
    pub charge: i128,
    pub reward: i128,
}

fn percent_of(amount: i128, percent: i128) -> Result<i128, CompetitionError> {
    amount
        .checked_mul(percent)
        .map(|v| v / 100)
        .ok_or(CompetitionError::Overflow)
}

pub(crate) fn quote_tickets(payment: i128, referral_valid: bool) -> Result<TicketQuote, CompetitionError> {
    if !referral_valid {
        return Ok(TicketQuote {
            charge: payment,
            reward: 0,
        });
    }
    Ok(TicketQuote {
        charge: percent_of(payment, 100 - REFERRAL_DISCOUNT_PERCENT)?,
        reward: percent_of(payment, REFERRAL_REWARD_PERCENT)?,
    })
}

/// Split pooled sales between the prize purchase, investors and the house.
///
/// The prize debit is capped at `prize_price`. When sales cover the prize,
/// investors take `INVESTORS_PERCENT` of the profit scaled by how much of the
/// cap they funded; otherwise they absorb the shortfall.
pub(crate) fn split(
    total_investment: i128,
    total_sales: i128,
    funding_cap: i128,
    prize_price: i128,
    purchase_amount: i128,
) -> Result<SettlementSplit, CompetitionError> {
    if purchase_amount < 0 {
        return Err(CompetitionError::InvalidAmount);
    }
    if funding_cap <= 0 {
        return Err(CompetitionError::InvalidConfig);
    }
    let prize_amount = purchase_amount.min(prize_price);

    if total_sales >= prize_amount {
        let profit = total_sales - prize_amount;
        let investor_profit = profit
            .checked_mul(INVESTORS_PERCENT)
            .and_then(|v| v.checked_mul(total_investment))
            .map(|v| v / funding_cap / 100)
            .ok_or(CompetitionError::Overflow)?;
        let claimable_investment = total_investment
            .checked_add(investor_profit)
            .ok_or(CompetitionError::Overflow)?;
        Ok(SettlementSplit {
            prize_amount,
            house_profit: profit - investor_profit,
            investor_profit,
            claimable_investment,
        })
    } else {
        let claimable_investment = total_investment
            .checked_add(total_sales)
            .map(|v| v - prize_amount)
            .ok_or(CompetitionError::Overflow)?;
        Ok(SettlementSplit {
            prize_amount,
            house_profit: 0,
            investor_profit: 0,
            claimable_investment,
        })
    }
}

/// `claimable * amount / total_investment`, floored.
pub(crate) fn investor_share(
    claimable: i128,
    amount: i128,
    total_investment: i128,
) -> Result<i128, CompetitionError> {
    if total_investment <= 0 {
        return Err(CompetitionError::NothingToClaim);
    }
    claimable
        .checked_mul(amount)
        .map(|v| v / total_investment)
        .ok_or(CompetitionError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_without_referral_is_full_price() {
        assert_eq!(
            quote_tickets(70, false),
            Ok(TicketQuote {
                charge: 70,
                reward: 0
            })
        );
    }

    #[test]
    fn quote_with_referral_discounts_and_rewards() {
        assert_eq!(
            quote_tickets(70, true),
            Ok(TicketQuote {
                charge: 66,
                reward: 14
            })
        );
        assert_eq!(
            quote_tickets(1_000, true),
            Ok(TicketQuote {
                charge: 950,
                reward: 200
            })
        );
    }

    #[test]
    fn split_with_profit() {
        let s = split(930, 240, 1000, 150, 200).unwrap();
        assert_eq!(s.prize_amount, 150);
        assert_eq!(s.investor_profit, 50);
        assert_eq!(s.house_profit, 40);
        assert_eq!(s.claimable_investment, 980);
    }

    #[test]
    fn split_caps_purchase_at_price() {
        let capped = split(500, 500, 1000, 100, 10_000).unwrap();
        let exact = split(500, 500, 1000, 100, 100).unwrap();
        assert_eq!(capped, exact);
        assert_eq!(capped.prize_amount, 100);
        // 400 * 60 * 500 / 1000 / 100 = 120
        assert_eq!(capped.investor_profit, 120);
        assert_eq!(capped.house_profit, 280);
    }

    #[test]
    fn cheaper_purchase_is_honoured() {
        let s = split(1000, 0, 1000, 100, 0).unwrap();
        assert_eq!(s.prize_amount, 0);
        assert_eq!(s.claimable_investment, 1000);
        assert_eq!(s.house_profit, 0);
    }

    #[test]
    fn investors_absorb_shortfall() {
        let s = split(1000, 20, 1000, 100, 100).unwrap();
        assert_eq!(s.prize_amount, 100);
        assert_eq!(s.house_profit, 0);
        assert_eq!(s.investor_profit, 0);
        assert_eq!(s.claimable_investment, 920);
    }

    #[test]
    fn split_rejects_negative_purchase() {
        assert_eq!(
            split(1000, 20, 1000, 100, -1),
            Err(CompetitionError::InvalidAmount)
        );
    }

    #[test]
    fn split_overflow_is_reported() {
        assert_eq!(
            split(i128::MAX, i128::MAX, 1, 1, 1),
            Err(CompetitionError::Overflow)
        );
    }

    #[test]
    fn shares_leave_at_most_dust() {
        let a = investor_share(980, 400, 930).unwrap();
        let b = investor_share(980, 530, 930).unwrap();
        assert_eq!(a, 421);
        assert_eq!(b, 558);
        assert!(980 - a - b <= 1);
    }
}
