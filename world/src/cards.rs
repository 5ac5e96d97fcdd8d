//! Card offers and the pending placement they grant.

use road_defence_core::{Card, CardError, RandomSource};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct CardState {
    choices: Vec<Card>,
    pending: Option<Card>,
}

impl CardState {
    /// Replaces the offered choices with `count` cards drawn with replacement.
    pub(crate) fn draw(&mut self, random: &mut dyn RandomSource, count: usize) -> &[Card] {
        self.choices = (0..count).map(|_| card_for(random.next_unit())).collect();
        &self.choices
    }

    /// Makes the card at `index` pending and withdraws the offer.
    pub(crate) fn choose(&mut self, index: usize) -> Result<Card, CardError> {
        let card = *self.choices.get(index).ok_or(CardError::OutOfRange)?;
        self.choices.clear();
        self.pending = Some(card);
        Ok(card)
    }

    pub(crate) fn choices(&self) -> &[Card] {
        &self.choices
    }

    pub(crate) const fn pending(&self) -> Option<Card> {
        self.pending
    }

    pub(crate) fn consume_pending(&mut self) {
        self.pending = None;
    }

    pub(crate) fn clear(&mut self) {
        self.choices.clear();
        self.pending = None;
    }
}

fn card_for(sample: f32) -> Card {
    let last = Card::ALL.len() - 1;
    let index = (sample * Card::ALL.len() as f32) as usize;
    Card::ALL[index.min(last)]
}
