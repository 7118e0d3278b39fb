//! Sound decisions. Playback belongs to the host.
use std::cell::RefCell;
use std::rc::Rc;

use crate::rules::FightOutcome;
use crate::state::{Channel, GameState, Metadata};

/// One-shot effects the rules ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    MonsterDamage,
    PlayerDamage,
    Lucky,
}

/// Host side of the action sounds. The core calls these whenever a rule
/// warrants a cue; muting is up to the implementation.
pub trait SoundCues {
    fn play_monster_damage_sound(&mut self);
    fn play_player_damage_sound(&mut self);
    fn play_lucky_sound(&mut self);

    fn play(&mut self, cue: SoundCue) {
        match cue {
            SoundCue::MonsterDamage => self.play_monster_damage_sound(),
            SoundCue::PlayerDamage => self.play_player_damage_sound(),
            SoundCue::Lucky => self.play_lucky_sound(),
        }
    }
}

/// Whether action cues should be audible under the sheet's flags.
#[must_use]
pub const fn cues_enabled(metadata: &Metadata) -> bool {
    metadata.action_sounds_enabled && !metadata.all_sounds_muted
}

/// Channel that should be playing for the current sheet.
///
/// A finished fight plays its victory or defeat track; an exchange in
/// progress plays battle music; everything else is ambience.
#[must_use]
pub fn ambient_channel(state: &GameState) -> Channel {
    match state.fight.fight_outcome {
        Some(FightOutcome::Lost) => Channel::Defeat,
        Some(FightOutcome::Won) => Channel::Victory,
        None if state.fight.is_fighting || state.fight.fight_result.is_some() => Channel::Battle,
        None => Channel::Ambience,
    }
}

/// Cue sink that plays nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentCues;

impl SoundCues for SilentCues {
    fn play_monster_damage_sound(&mut self) {}
    fn play_player_damage_sound(&mut self) {}
    fn play_lucky_sound(&mut self) {}
}

/// Remembers every cue in order. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct CueLog {
    played: Rc<RefCell<Vec<SoundCue>>>,
}

impl CueLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn played(&self) -> Vec<SoundCue> {
        self.played.borrow().clone()
    }
}

impl SoundCues for CueLog {
    fn play_monster_damage_sound(&mut self) {
        self.played.borrow_mut().push(SoundCue::MonsterDamage);
    }

    fn play_player_damage_sound(&mut self) {
        self.played.borrow_mut().push(SoundCue::PlayerDamage);
    }

    fn play_lucky_sound(&mut self) {
        self.played.borrow_mut().push(SoundCue::Lucky);
    }
}
