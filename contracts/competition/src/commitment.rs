//! Commit-reveal binding of the target point.
//!
//! `commit_hash = keccak256(be32(x) || be32(y))`. Revealed values may carry a
//! salt in their high part (`salt * X_MAX + x`); the on-grid coordinate is the
//! revealed value modulo `X_MAX` (`Y_MAX` for y).

use soroban_sdk::{Bytes, BytesN, Env, U256};

use crate::{CompetitionError, X_MAX, Y_MAX};

pub(crate) fn digest(env: &Env, x: &U256, y: &U256) -> BytesN<32> {
    let mut preimage = Bytes::new(env);
    preimage.append(&x.to_be_bytes());
    preimage.append(&y.to_be_bytes());
    env.crypto().keccak256(&preimage).into()
}

/// Check a reveal against the stored digest and return the grid point.
pub(crate) fn reveal(
    env: &Env,
    commit_hash: &BytesN<32>,
    x: &U256,
    y: &U256,
) -> Result<(u32, u32), CompetitionError> {
    if digest(env, x, y) != *commit_hash {
        return Err(CompetitionError::CommitMismatch);
    }
    Ok((to_grid(env, x, X_MAX)?, to_grid(env, y, Y_MAX)?))
}

fn to_grid(env: &Env, value: &U256, modulus: u32) -> Result<u32, CompetitionError> {
    value
        .rem_euclid(&U256::from_u32(env, modulus))
        .to_u128()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or(CompetitionError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reveal_accepts_committed_pair() {
        let env = Env::default();
        let x = U256::from_u32(&env, 2500);
        let y = U256::from_u32(&env, 1234);
        let hash = digest(&env, &x, &y);
        assert_eq!(reveal(&env, &hash, &x, &y), Ok((2500, 1234)));
    }

    #[test]
    fn reveal_rejects_swapped_coordinates() {
        let env = Env::default();
        let x = U256::from_u32(&env, 10);
        let y = U256::from_u32(&env, 20);
        let hash = digest(&env, &x, &y);
        assert_eq!(
            reveal(&env, &hash, &y, &x),
            Err(CompetitionError::CommitMismatch)
        );
    }

    #[test]
    fn salted_reveal_reduces_onto_grid() {
        let env = Env::default();
        let salt = U256::from_u128(&env, 987_654_321_987_654_321);
        let x = salt
            .mul(&U256::from_u32(&env, X_MAX))
            .add(&U256::from_u32(&env, 4999));
        let y = salt
            .mul(&U256::from_u32(&env, Y_MAX))
            .add(&U256::from_u32(&env, 7));
        let hash = digest(&env, &x, &y);
        assert_eq!(reveal(&env, &hash, &x, &y), Ok((4999, 7)));
    }

    #[test]
    fn unsalted_reveal_maps_onto_itself() {
        let env = Env::default();
        let x = U256::from_u32(&env, X_MAX - 1);
        let y = U256::from_u32(&env, 1);
        let hash = digest(&env, &x, &y);
        assert_eq!(reveal(&env, &hash, &x, &y), Ok((X_MAX - 1, 1)));
    }

    #[test]
    fn salt_uses_axis_maximum_as_modulus() {
        let env = Env::default();
        let x = U256::from_u32(&env, 77 * X_MAX + 1234);
        let y = U256::from_u32(&env, 77 * Y_MAX + 4321);
        let hash = digest(&env, &x, &y);
        assert_eq!(reveal(&env, &hash, &x, &y), Ok((1234, 4321)));
    }
}
