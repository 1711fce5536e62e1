//! Request-scoped allocation state.
//!
//! One [`AllocationState`] is created per engine call and dropped when it
//! returns. Slots are indexed by claimant position in the request, which is
//! the claimant's identity for the length of the call.

use rust_decimal::Decimal;

/// Running state for one claimant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClaimantState {
    /// Amount held so far (exact, not yet rounded)
    pub allocated: Decimal,

    /// Fixed at the requested amount. Only ever goes false → true.
    pub capped: bool,
}

/// Per-claimant state plus the number of passes run so far
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationState {
    slots: Vec<ClaimantState>,
    passes: usize,
}

impl AllocationState {
    /// Fresh state: nothing allocated, nobody capped
    pub fn new(claimant_count: usize) -> Self {
        Self {
            slots: vec![ClaimantState::default(); claimant_count],
            passes: 0,
        }
    }

    /// State for claimant `index`
    #[inline]
    pub fn get(&self, index: usize) -> Option<&ClaimantState> {
        self.slots.get(index)
    }

    /// All slots in claimant order
    #[inline]
    pub fn slots(&self) -> &[ClaimantState] {
        &self.slots
    }

    /// Amount currently held by claimant `index`
    #[inline]
    pub fn allocated(&self, index: usize) -> Decimal {
        self.slots[index].allocated
    }

    /// Check if claimant `index` is capped
    #[inline]
    pub fn is_capped(&self, index: usize) -> bool {
        self.slots[index].capped
    }

    /// Indices of claimants still open to redistribution, in claimant order
    pub fn uncapped_indices(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| !slot.capped)
            .map(|(index, _)| index)
            .collect()
    }

    /// Check if any claimant is still uncapped
    pub fn has_uncapped(&self) -> bool {
        self.slots.iter().any(|slot| !slot.capped)
    }

    /// Sum held by capped claimants
    pub fn capped_total(&self) -> Decimal {
        self.slots
            .iter()
            .filter(|slot| slot.capped)
            .map(|slot| slot.allocated)
            .sum()
    }

    /// Fix claimant `index` at `amount` for the rest of the run
    pub fn cap(&mut self, index: usize, amount: Decimal) {
        let slot = &mut self.slots[index];
        debug_assert!(!slot.capped, "claimant {index} capped twice");
        slot.allocated = amount;
        slot.capped = true;
    }

    /// Give claimant `index` a provisional amount
    pub fn set_tentative(&mut self, index: usize, amount: Decimal) {
        let slot = &mut self.slots[index];
        debug_assert!(!slot.capped, "claimant {index} is capped");
        slot.allocated = amount;
    }

    /// Count a new pass and return its number (1-based)
    pub fn begin_pass(&mut self) -> usize {
        self.passes += 1;
        self.passes
    }

    /// Passes run so far
    #[inline]
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Number of claimants
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if the state tracks no claimants
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_new() {
        let state = AllocationState::new(3);

        assert_eq!(state.len(), 3);
        assert_eq!(state.passes(), 0);
        assert!(state.has_uncapped());
        assert_eq!(state.uncapped_indices(), vec![0, 1, 2]);
        assert_eq!(state.capped_total(), Decimal::ZERO);
    }

    #[test]
    fn test_cap_and_tentative() {
        let mut state = AllocationState::new(3);

        state.cap(1, Decimal::from(10));
        state.set_tentative(0, Decimal::from(45));

        assert!(state.is_capped(1));
        assert!(!state.is_capped(0));
        assert_eq!(state.allocated(0), Decimal::from(45));
        assert_eq!(state.uncapped_indices(), vec![0, 2]);
        assert_eq!(state.capped_total(), Decimal::from(10));
    }

    #[test]
    fn test_all_capped() {
        let mut state = AllocationState::new(2);
        state.cap(0, Decimal::from(1));
        state.cap(1, Decimal::from(2));

        assert!(!state.has_uncapped());
        assert!(state.uncapped_indices().is_empty());
        assert_eq!(state.capped_total(), Decimal::from(3));
    }

    #[test]
    fn test_pass_counter() {
        let mut state = AllocationState::new(1);
        assert_eq!(state.begin_pass(), 1);
        assert_eq!(state.begin_pass(), 2);
        assert_eq!(state.passes(), 2);
    }

    #[test]
    fn test_empty_state() {
        let state = AllocationState::new(0);
        assert!(state.is_empty());
        assert!(!state.has_uncapped());
        assert!(state.get(0).is_none());
    }
}
