//! Splitting requested demand into an allocated part and a backordered part.

use serde::{Deserialize, Serialize};

/// Outcome of allocating a requested quantity against available stock.
///
/// `allocated` is what gets deducted from stock (and billed); `backorder` is the
/// shortfall, which is neither deducted nor billed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub requested: u64,
    pub allocated: u64,
    pub backorder: u64,
}

impl Allocation {
    /// `backorder = max(0, requested - available)`, `allocated = requested - backorder`.
    pub fn compute(requested: u64, available: u64) -> Self {
        let backorder = requested.saturating_sub(available);
        Self {
            requested,
            allocated: requested - backorder,
            backorder,
        }
    }

    pub fn is_fully_allocated(&self) -> bool {
        self.backorder == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn shortfall_becomes_backorder() {
        let a = Allocation::compute(15, 10);
        assert_eq!(a.allocated, 10);
        assert_eq!(a.backorder, 5);
        assert!(!a.is_fully_allocated());
    }

    #[test]
    fn enough_stock_allocates_everything() {
        let a = Allocation::compute(4, 10);
        assert_eq!(a.allocated, 4);
        assert_eq!(a.backorder, 0);
        assert!(a.is_fully_allocated());
    }

    #[test]
    fn empty_stock_backorders_everything() {
        let a = Allocation::compute(3, 0);
        assert_eq!(a.allocated, 0);
        assert_eq!(a.backorder, 3);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            ..ProptestConfig::default()
        })]

        /// Property: allocation splits demand exactly and never exceeds stock.
        #[test]
        fn allocation_conserves_demand(requested in 0u64..1_000_000, available in 0u64..1_000_000) {
            let a = Allocation::compute(requested, available);
            prop_assert_eq!(a.allocated + a.backorder, requested);
            prop_assert!(a.allocated <= available);
            prop_assert_eq!(a.allocated, requested.min(available));
        }
    }
}
