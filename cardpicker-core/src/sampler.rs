//! Uniform random sampling of fetched cards.
//!
//! A sample is drawn by shuffling the whole set and keeping a prefix, so
//! every card has the same `n / len` chance of being kept. The kept cards
//! are then sorted by id for display.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::model::CardRecord;

/// Default number of cards in a sample.
pub const DEFAULT_SAMPLE_SIZE: usize = 10;

/// Sample `n` cards using the thread-local RNG.
pub fn sample(cards: Vec<CardRecord>, n: usize) -> Vec<CardRecord> {
    sample_with_rng(cards, n, &mut rand::thread_rng())
}

/// Sample `n` cards using the given RNG.
///
/// Returns every card when there are `n` or fewer. The result is always
/// sorted ascending by id.
pub fn sample_with_rng<R: Rng + ?Sized>(
    mut cards: Vec<CardRecord>,
    n: usize,
    rng: &mut R,
) -> Vec<CardRecord> {
    if cards.len() > n {
        cards.shuffle(rng);
        cards.truncate(n);
    }
    // Stable, so equal ids keep their shuffled order.
    cards.sort_by_key(|card| card.id);
    cards
}
