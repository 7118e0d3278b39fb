//! Fighting Fantasy combat and luck rules.
//!
//! Everything here is pure: no dice, no state. The orchestration in
//! [`crate::game_master`] rolls and writes; these functions only decide.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stamina lost by the loser of an attack round.
pub const BASE_DAMAGE: i32 = 2;
/// Stamina restored by eating one meal.
pub const MEAL_HEALING: i32 = 4;

/// Result of comparing attack strengths for one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CombatOutcome {
    HeroWins,
    MonsterWins,
    Tie,
}

impl CombatOutcome {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HeroWins => "heroWins",
            Self::MonsterWins => "monsterWins",
            Self::Tie => "tie",
        }
    }

    #[must_use]
    pub const fn is_decisive(self) -> bool {
        !matches!(self, Self::Tie)
    }

    /// Translation key for the round summary.
    #[must_use]
    pub const fn message_key(self) -> &'static str {
        match self {
            Self::HeroWins => "fight.heroWins",
            Self::MonsterWins => "fight.monsterWins",
            Self::Tie => "fight.tie",
        }
    }
}

impl fmt::Display for CombatOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a whole fight ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FightOutcome {
    Won,
    Lost,
}

impl FightOutcome {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Won => "won",
            Self::Lost => "lost",
        }
    }
}

impl fmt::Display for FightOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Health changes produced by testing luck after a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LuckEffect {
    pub hero_health_delta: i32,
    pub monster_health_delta: i32,
}

#[must_use]
pub const fn is_lucky(roll_sum: i32, current_luck: i32) -> bool {
    roll_sum <= current_luck
}

#[must_use]
pub const fn can_test_luck(current_luck: i32) -> bool {
    current_luck > 0
}

#[must_use]
pub const fn resolve_combat(hero_total: i32, monster_total: i32) -> CombatOutcome {
    if hero_total > monster_total {
        CombatOutcome::HeroWins
    } else if monster_total > hero_total {
        CombatOutcome::MonsterWins
    } else {
        CombatOutcome::Tie
    }
}

/// Damage dealt by the winner of a round.
///
/// Constant for now; the winner is passed so weapon or monster specific
/// damage can slot in without touching callers.
#[must_use]
pub const fn calculate_damage(_winner: CombatOutcome) -> i32 {
    BASE_DAMAGE
}

/// Health deltas for a luck test made after a round.
///
/// When the hero won, luck turns the wound into a graze or a deeper cut on
/// the monster. When the monster won, luck softens the blow by restoring one
/// point, never above `max_health` when a maximum is known.
#[must_use]
pub fn calculate_luck_effect(
    hero_won: bool,
    lucky: bool,
    current_health: i32,
    max_health: Option<i32>,
) -> LuckEffect {
    match (hero_won, lucky) {
        (true, true) => LuckEffect {
            hero_health_delta: 0,
            monster_health_delta: -1,
        },
        (true, false) => LuckEffect {
            hero_health_delta: 0,
            monster_health_delta: 1,
        },
        (false, true) => LuckEffect {
            hero_health_delta: capped_gain(current_health, 1, max_health),
            monster_health_delta: 0,
        },
        (false, false) => LuckEffect {
            hero_health_delta: -1,
            monster_health_delta: 0,
        },
    }
}

/// Checks the monster first, so a double knockout counts as a win.
#[must_use]
pub const fn check_fight_end(hero_health: i32, monster_health: i32) -> Option<FightOutcome> {
    if monster_health <= 0 {
        Some(FightOutcome::Won)
    } else if hero_health <= 0 {
        Some(FightOutcome::Lost)
    } else {
        None
    }
}

/// Largest gain up to `amount` that keeps `current` at or below `max`.
#[must_use]
pub fn capped_gain(current: i32, amount: i32, max: Option<i32>) -> i32 {
    match max {
        Some(max) => amount.min(max.saturating_sub(current)).max(0),
        None => amount,
    }
}

/// Apply a delta and floor the result at zero.
#[must_use]
pub fn apply_floored(current: i32, delta: i32) -> i32 {
    current.saturating_add(delta).max(0)
}
