//! Gold balance of the session.

/// Gold balance with afford, spend and add primitives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Ledger {
    gold: u32,
}

impl Ledger {
    pub(crate) const fn new(gold: u32) -> Self {
        Self { gold }
    }

    pub(crate) const fn gold(&self) -> u32 {
        self.gold
    }

    pub(crate) const fn can_afford(&self, amount: u32) -> bool {
        self.gold >= amount
    }

    /// Deducts `amount` when affordable; otherwise leaves the balance alone.
    pub(crate) fn spend(&mut self, amount: u32) -> bool {
        if !self.can_afford(amount) {
            return false;
        }
        self.gold -= amount;
        true
    }

    pub(crate) fn add(&mut self, amount: u32) {
        self.gold = self.gold.saturating_add(amount);
    }
}
