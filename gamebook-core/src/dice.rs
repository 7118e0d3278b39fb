//! Six-sided dice.
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const DIE_FACES: u8 = 6;

/// A pair of dice as stored on the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiceRoll {
    pub roll1: u8,
    pub roll2: u8,
    pub sum: u8,
}

impl DiceRoll {
    #[must_use]
    pub const fn new(roll1: u8, roll2: u8) -> Self {
        Self {
            roll1,
            roll2,
            sum: roll1 + roll2,
        }
    }

    #[must_use]
    pub fn total(self) -> i32 {
        i32::from(self.sum)
    }
}

/// Source of die faces. Rules code only ever rolls through this trait so tests
/// can pin every outcome.
pub trait DiceRoller {
    /// Roll one die, returning a value in `1..=6`.
    fn roll_die(&mut self) -> u8;

    /// Roll two independent dice.
    fn roll_dice_two(&mut self) -> DiceRoll {
        let roll1 = self.roll_die();
        let roll2 = self.roll_die();
        DiceRoll::new(roll1, roll2)
    }
}

/// Uniform dice backed by ChaCha20.
#[derive(Debug, Clone)]
pub struct RandomDice {
    rng: ChaCha20Rng,
}

impl RandomDice {
    /// Dice seeded from operating system entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha20Rng::from_entropy(),
        }
    }

    /// Reproducible dice for a given seed.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomDice {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl DiceRoller for RandomDice {
    fn roll_die(&mut self) -> u8 {
        self.rng.gen_range(1..=DIE_FACES)
    }
}

/// Replays a fixed sequence of faces, starting over once it runs out.
///
/// Faces outside `1..=6` are clamped. An empty script always rolls `1`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    script: Vec<u8>,
    queue: VecDeque<u8>,
}

impl ScriptedDice {
    #[must_use]
    pub fn new(faces: impl IntoIterator<Item = u8>) -> Self {
        let script: Vec<u8> = faces
            .into_iter()
            .map(|face| face.clamp(1, DIE_FACES))
            .collect();
        Self {
            queue: script.iter().copied().collect(),
            script,
        }
    }

    /// Number of faces left before the script wraps around.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl DiceRoller for ScriptedDice {
    fn roll_die(&mut self) -> u8 {
        if self.queue.is_empty() {
            self.queue.extend(self.script.iter().copied());
        }
        self.queue.pop_front().unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_dice_stay_in_range() {
        let mut dice = RandomDice::from_seed(0x00C0_FFEE);
        for _ in 0..500 {
            let face = dice.roll_die();
            assert!((1..=6).contains(&face));
            let pair = dice.roll_dice_two();
            assert_eq!(pair.sum, pair.roll1 + pair.roll2);
            assert!((2..=12).contains(&pair.sum));
        }
    }

    #[test]
    fn random_dice_cover_every_face() {
        let mut dice = RandomDice::from_seed(7);
        let mut seen = [false; 6];
        for _ in 0..600 {
            seen[usize::from(dice.roll_die() - 1)] = true;
        }
        assert!(seen.iter().all(|hit| *hit));
    }

    #[test]
    fn seeded_dice_are_reproducible() {
        let mut one = RandomDice::from_seed(42);
        let mut two = RandomDice::from_seed(42);
        let a: Vec<u8> = (0..20).map(|_| one.roll_die()).collect();
        let b: Vec<u8> = (0..20).map(|_| two.roll_die()).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn scripted_dice_replay_and_wrap() {
        let mut dice = ScriptedDice::new([3, 4, 9]);
        assert_eq!(dice.roll_dice_two(), DiceRoll::new(3, 4));
        assert_eq!(dice.roll_die(), 6);
        assert_eq!(dice.remaining(), 0);
        assert_eq!(dice.roll_die(), 3);
    }

    #[test]
    fn empty_script_rolls_ones() {
        let mut dice = ScriptedDice::default();
        assert_eq!(dice.roll_dice_two(), DiceRoll::new(1, 1));
    }
}
