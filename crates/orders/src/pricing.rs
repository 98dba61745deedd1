//! Order pricing in integer currency units.

use serde::{Deserialize, Serialize};

use bazaar_core::{DomainError, DomainResult};

/// Platform fee charged once per order when nothing else is configured.
pub const DEFAULT_PLATFORM_FEE: u64 = 2_000;

/// Fixed additive charge applied once per order, regardless of line count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlatformFee(u64);

impl PlatformFee {
    pub const fn new(amount: u64) -> Self {
        Self(amount)
    }

    pub fn amount(self) -> u64 {
        self.0
    }
}

impl Default for PlatformFee {
    fn default() -> Self {
        Self(DEFAULT_PLATFORM_FEE)
    }
}

/// `unit_price * quantity`.
pub fn subtotal(unit_price: u64, quantity: i64) -> DomainResult<u64> {
    if quantity <= 0 {
        return Err(DomainError::InvalidQuantity(quantity));
    }
    unit_price
        .checked_mul(quantity as u64)
        .ok_or_else(|| DomainError::invariant("line subtotal overflows"))
}

/// Sum of subtotals plus the platform fee.
pub fn grand_total(
    subtotals: impl IntoIterator<Item = u64>,
    fee: PlatformFee,
) -> DomainResult<u64> {
    subtotals
        .into_iter()
        .try_fold(fee.amount(), u64::checked_add)
        .ok_or_else(|| DomainError::invariant("order total overflows"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worked_example() {
        let sub = subtotal(1000, 3).unwrap();
        assert_eq!(sub, 3000);
        assert_eq!(grand_total([sub], PlatformFee::new(50)).unwrap(), 3050);
    }

    #[test]
    fn fee_applies_once_regardless_of_line_count() {
        let total = grand_total([100, 200, 300], PlatformFee::new(10)).unwrap();
        assert_eq!(total, 610);
        assert_eq!(grand_total([], PlatformFee::new(10)).unwrap(), 10);
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        assert_eq!(subtotal(10, 0), Err(DomainError::InvalidQuantity(0)));
        assert_eq!(subtotal(10, -4), Err(DomainError::InvalidQuantity(-4)));
    }

    #[test]
    fn overflow_is_an_error_not_a_wrap() {
        assert!(matches!(
            subtotal(u64::MAX, 2),
            Err(DomainError::InvariantViolation(_))
        ));
        assert!(matches!(
            grand_total([u64::MAX], PlatformFee::new(1)),
            Err(DomainError::InvariantViolation(_))
        ));
    }

    #[test]
    fn default_fee() {
        assert_eq!(PlatformFee::default().amount(), DEFAULT_PLATFORM_FEE);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                ..ProptestConfig::default()
            })]

            #[test]
            fn grand_total_is_sum_of_subtotals_plus_fee(
                lines in proptest::collection::vec((0u64..1_000_000, 1i64..1_000), 0..20),
                fee in 0u64..100_000
            ) {
                let subtotals: Vec<u64> = lines
                    .iter()
                    .map(|(price, qty)| subtotal(*price, *qty).unwrap())
                    .collect();
                let expected: u64 = lines.iter().map(|(p, q)| p * (*q as u64)).sum::<u64>() + fee;
                prop_assert_eq!(grand_total(subtotals, PlatformFee::new(fee)).unwrap(), expected);
            }
        }
    }
}
