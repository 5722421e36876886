use std::collections::VecDeque;

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use rand_pcg::Pcg32;

use crate::PieceKind;

/// Produces the piece sequence using the 7-bag randomization algorithm.
///
/// Each "bag" holds all seven piece kinds in shuffled order; pieces are drawn from the
/// front and a new shuffled bag is appended once seven or fewer remain. Every aligned group
/// of seven draws therefore contains each kind exactly once.
///
/// # Example
///
/// ```
/// use evotris_engine::{PieceBuffer, PieceSeed};
///
/// let mut a = PieceBuffer::with_seed(PieceSeed::from(42));
/// let mut b = PieceBuffer::with_seed(PieceSeed::from(42));
/// assert_eq!(a.peek_next(), b.peek_next());
/// assert_eq!(a.pop_next(), b.pop_next());
/// ```
#[derive(Debug, Clone)]
pub struct PieceBuffer {
    rng: Pcg32,
    bag: VecDeque<PieceKind>,
}

impl Default for PieceBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Seed for deterministic piece generation.
///
/// A 128-bit seed for the `Pcg32` generator behind [`PieceBuffer`]. The same seed always
/// produces the same piece sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceSeed([u8; 16]);

impl From<u64> for PieceSeed {
    fn from(value: u64) -> Self {
        Self(u128::from(value).to_be_bytes())
    }
}

impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

impl PieceBuffer {
    /// Creates a new piece buffer with a random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        let mut this = Self {
            rng: Pcg32::from_seed(seed.0),
            bag: VecDeque::with_capacity(PieceKind::LEN * 2),
        };
        this.fill_bag();
        this
    }

    fn fill_bag(&mut self) {
        while self.bag.len() <= PieceKind::LEN {
            let mut new_bag = PieceKind::ALL;
            new_bag.shuffle(&mut self.rng);
            self.bag.extend(new_bag);
        }
    }

    /// Draws the next piece, refilling the bag as needed.
    pub fn pop_next(&mut self) -> PieceKind {
        let next = self.peek_next();
        self.bag.pop_front();
        self.fill_bag();
        next
    }

    /// Returns the piece [`Self::pop_next`] would return.
    #[must_use]
    pub fn peek_next(&self) -> PieceKind {
        // fill_bag keeps more than seven pieces queued
        self.bag[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_piece_generation() {
        let seed = PieceSeed([
            0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66,
            0x77, 0x88,
        ]);

        let mut buffer1 = PieceBuffer::with_seed(seed);
        let mut buffer2 = PieceBuffer::with_seed(seed);
        for _ in 0..20 {
            assert_eq!(buffer1.pop_next(), buffer2.pop_next());
        }
    }

    #[test]
    fn test_each_bag_holds_every_kind_once() {
        let mut buffer = PieceBuffer::with_seed(PieceSeed::from(3));
        for _ in 0..5 {
            let mut bag: Vec<_> = (0..PieceKind::LEN).map(|_| buffer.pop_next()).collect();
            bag.sort_by_key(|kind| kind.index());
            assert_eq!(bag, PieceKind::ALL);
        }
    }

    #[test]
    fn test_peek_matches_pop() {
        let mut buffer = PieceBuffer::with_seed(PieceSeed::from(11));
        for _ in 0..30 {
            let peeked = buffer.peek_next();
            assert_eq!(buffer.pop_next(), peeked);
        }
    }

    #[test]
    fn test_seed_from_u64_is_stable() {
        assert_eq!(PieceSeed::from(5), PieceSeed::from(5));
        assert_ne!(PieceSeed::from(5), PieceSeed::from(6));
    }
}
