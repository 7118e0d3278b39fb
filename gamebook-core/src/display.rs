//! Transient feedback requests for the host UI.
//!
//! The coordinator never renders anything. It turns rule outcomes into
//! [`DisplayEvent`]s for subscribers and forwards sound cues to the host.
use smallvec::SmallVec;
use std::fmt;

use crate::dice::DiceRoll;
use crate::observer::{Observers, Subscription};
use crate::sound::{SoundCue, SoundCues};

pub const LUCKY_MESSAGE: &str = "luck.lucky";
pub const UNLUCKY_MESSAGE: &str = "luck.unlucky";

/// Sheet fields a badge can float over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatField {
    HeroSkill,
    HeroHealth,
    HeroLuck,
    MaxLuck,
    MonsterHealth,
    Coins,
    Meals,
}

impl StatField {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HeroSkill => "skill",
            Self::HeroHealth => "health",
            Self::HeroLuck => "luck",
            Self::MaxLuck => "maxLuck",
            Self::MonsterHealth => "monsterHealth",
            Self::Coins => "coins",
            Self::Meals => "meals",
        }
    }
}

impl fmt::Display for StatField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A "+1"/"-2" marker next to a field that just changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldBadge {
    pub field: StatField,
    pub delta: i32,
}

impl FieldBadge {
    #[must_use]
    pub const fn new(field: StatField, delta: i32) -> Self {
        Self { field, delta }
    }

    #[must_use]
    pub fn label(&self) -> String {
        format!("{:+}", self.delta)
    }
}

pub type Badges = SmallVec<[FieldBadge; 4]>;

/// Badge list for the non-zero deltas among `changes`.
#[must_use]
pub fn badges_for(changes: &[(StatField, i32)]) -> Badges {
    changes
        .iter()
        .filter(|(_, delta)| *delta != 0)
        .map(|&(field, delta)| FieldBadge::new(field, delta))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayEvent {
    DiceRolling,
    DiceResult {
        hero: DiceRoll,
        monster: Option<DiceRoll>,
    },
    LuckTest {
        lucky: bool,
        message_key: &'static str,
    },
    /// A new roll replaced a luck message that was still showing.
    LuckTestCleared,
    YouDied,
    Badges(Badges),
    Celebrate,
}

pub struct DisplayCoordinator {
    sounds: Box<dyn SoundCues>,
    observers: Observers<DisplayEvent>,
    luck_message_showing: bool,
}

impl fmt::Debug for DisplayCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisplayCoordinator")
            .field("observers", &self.observers)
            .field("luck_message_showing", &self.luck_message_showing)
            .finish_non_exhaustive()
    }
}

impl DisplayCoordinator {
    #[must_use]
    pub fn new(sounds: Box<dyn SoundCues>) -> Self {
        Self {
            sounds,
            observers: Observers::new(),
            luck_message_showing: false,
        }
    }

    pub fn subscribe(&self, listener: impl FnMut(&DisplayEvent) + 'static) -> Subscription {
        self.observers.subscribe(listener)
    }

    #[must_use]
    pub const fn luck_message_showing(&self) -> bool {
        self.luck_message_showing
    }

    pub fn show_dice_rolling(&mut self) {
        self.supersede_luck_message();
        self.observers.notify(&DisplayEvent::DiceRolling);
    }

    pub fn show_dice_result(&mut self, hero: DiceRoll, monster: Option<DiceRoll>) {
        self.supersede_luck_message();
        self.observers
            .notify(&DisplayEvent::DiceResult { hero, monster });
    }

    pub fn show_luck_result(&mut self, lucky: bool) {
        let message_key = if lucky { LUCKY_MESSAGE } else { UNLUCKY_MESSAGE };
        self.luck_message_showing = true;
        self.observers
            .notify(&DisplayEvent::LuckTest { lucky, message_key });
    }

    pub fn show_you_died(&mut self) {
        self.observers.notify(&DisplayEvent::YouDied);
    }

    /// Skipped when nothing changed.
    pub fn show_badges(&mut self, badges: &Badges) {
        if !badges.is_empty() {
            self.observers.notify(&DisplayEvent::Badges(badges.clone()));
        }
    }

    pub fn celebrate(&mut self) {
        self.observers.notify(&DisplayEvent::Celebrate);
    }

    pub fn play(&mut self, cue: SoundCue) {
        log::trace!("sound cue {cue:?}");
        self.sounds.play(cue);
    }

    fn supersede_luck_message(&mut self) {
        if self.luck_message_showing {
            self.luck_message_showing = false;
            self.observers.notify(&DisplayEvent::LuckTestCleared);
        }
    }
}
