//! Fixed-point unit conventions and identifiers
//!
//! All position and price arithmetic mirrors the on-chain convention:
//! 18-decimals fixed point (`Wad`) for deltas, prices and pool-denominated
//! values, 6-decimals fixed point (`Usdc`) for collateral amounts.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 18-decimals fixed-point quantity (deltas, normalized prices, values)
pub type Wad = i128;

/// 6-decimals fixed-point collateral amount
pub type Usdc = i128;

/// One unit in wad terms (1e18)
pub const WAD: i128 = 1_000_000_000_000_000_000;

/// One unit in collateral terms (1e6)
pub const USDC_SCALE: i128 = 1_000_000;

/// Conversion factor from wad (e18) to collateral (e6)
pub const WAD_TO_USDC: i128 = 1_000_000_000_000;

/// Full scale in basis points
pub const MAX_BPS: i128 = 10_000;

/// Multiply two wad quantities, result in wad.
///
/// Decomposed into whole and fractional parts so the intermediate
/// product stays within i128 for any realistic price * size pair.
pub fn wad_mul(a: Wad, b: Wad) -> Wad {
    let (qa, ra) = (a / WAD, a % WAD);
    let (qb, rb) = (b / WAD, b % WAD);
    qa * qb * WAD + qa * rb + qb * ra + ra * rb / WAD
}

/// Divide two wad quantities, result in wad.
///
/// The remainder is scaled in two 1e9 steps so the intermediate stays
/// within i128 even for large denominators such as e18 prices.
pub fn wad_div(a: Wad, b: Wad) -> Wad {
    const HALF_SCALE: i128 = 1_000_000_000;
    let q = a / b;
    let r = a % b;
    let r1 = r * HALF_SCALE / b;
    let r2 = (r * HALF_SCALE % b) * HALF_SCALE / b;
    q * WAD + r1 * HALF_SCALE + r2
}

/// Convert a wad quantity to collateral decimals, truncating toward zero
pub fn wad_to_usdc(amount: Wad) -> Usdc {
    amount / WAD_TO_USDC
}

/// Convert a collateral amount to wad decimals
pub fn usdc_to_wad(amount: Usdc) -> Wad {
    amount * WAD_TO_USDC
}

/// Take a basis-points fraction of an amount
pub fn bps_of(amount: i128, bps: i128) -> i128 {
    amount * bps / MAX_BPS
}

/// Unique identifier for a balance-holding party (pool, reactor, venue, keeper)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub Uuid);

impl AccountId {
    /// Create a new random AccountId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an AccountId from an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id() {
        let a = AccountId::new();
        let b = AccountId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_wad_mul() {
        // 2.0 * 2500.0 = 5000.0
        assert_eq!(wad_mul(2 * WAD, 2500 * WAD), 5000 * WAD);
        // signs carry through
        assert_eq!(wad_mul(-2 * WAD, 2500 * WAD), -5000 * WAD);
        // fractional sizes stay exact
        assert_eq!(wad_mul(WAD / 2, 2500 * WAD), 1250 * WAD);
    }

    #[test]
    fn test_wad_div() {
        assert_eq!(wad_div(5000 * WAD, 2 * WAD), 2500 * WAD);
        assert_eq!(wad_div(WAD, 4 * WAD), WAD / 4);
        // large denominators must not overflow
        assert_eq!(wad_div(4000 * WAD, 2000 * WAD), 2 * WAD);
        assert_eq!(wad_div(500 * WAD, 900 * WAD), 555_555_555_555_555_555);
    }

    #[test]
    fn test_wad_usdc_round_trip() {
        let amount = 1234 * WAD;
        assert_eq!(wad_to_usdc(amount), 1234 * USDC_SCALE);
        assert_eq!(usdc_to_wad(wad_to_usdc(amount)), amount);
    }

    #[test]
    fn test_bps_of() {
        assert_eq!(bps_of(50_000 * USDC_SCALE, 5_000), 25_000 * USDC_SCALE);
        assert_eq!(bps_of(100, MAX_BPS), 100);
    }
}
