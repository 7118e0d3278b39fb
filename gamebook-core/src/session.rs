//! One player's sheet with its rules, wired together.
use std::rc::Rc;

use crate::autosave::Clock;
use crate::config::SheetConfig;
use crate::dice::{DiceRoller, RandomDice};
use crate::files::FilePersistence;
use crate::game_master::{
    FightReport, GameMaster, LuckReport, LuckTestReport, MealReport, PotionReport,
    PurchaseReport, RulesError,
};
use crate::manager::GameStateManager;
use crate::sound::SoundCues;
use crate::state::Channel;
use crate::storage::StateStorage;

/// Host collaborators for a session.
pub struct SessionHost {
    pub storage: Box<dyn StateStorage>,
    pub files: Box<dyn FilePersistence>,
    pub sounds: Box<dyn SoundCues>,
    pub clock: Rc<dyn Clock>,
}

/// Composition root owning one state manager and one game master.
/// Sessions share nothing, so several can live side by side.
#[derive(Debug)]
pub struct SheetSession {
    store: GameStateManager,
    master: GameMaster,
}

impl SheetSession {
    #[must_use]
    pub const fn new(store: GameStateManager, master: GameMaster) -> Self {
        Self { store, master }
    }

    /// Build a session from configuration, seeding dice when a seed is set.
    #[must_use]
    pub fn from_config(config: &SheetConfig, host: SessionHost) -> Self {
        let dice: Box<dyn DiceRoller> = match config.seed {
            Some(seed) => Box::new(RandomDice::from_seed(seed)),
            None => Box::new(RandomDice::from_entropy()),
        };
        Self::with_dice(config, host, dice)
    }

    #[must_use]
    pub fn with_dice(config: &SheetConfig, host: SessionHost, dice: Box<dyn DiceRoller>) -> Self {
        let store =
            GameStateManager::new(host.storage, host.clock, config).with_files(host.files);
        Self::new(store, GameMaster::new(dice, host.sounds))
    }

    /// Restore the autosaved sheet, if any.
    pub fn restore(&mut self) -> bool {
        self.store.load_from_storage()
    }

    #[must_use]
    pub const fn store(&self) -> &GameStateManager {
        &self.store
    }

    pub const fn store_mut(&mut self) -> &mut GameStateManager {
        &mut self.store
    }

    #[must_use]
    pub const fn master(&self) -> &GameMaster {
        &self.master
    }

    pub fn action_fight(&mut self) -> FightReport {
        self.master.action_fight(&mut self.store)
    }

    /// # Errors
    ///
    /// See [`GameMaster::action_use_luck`].
    pub fn action_use_luck(&mut self) -> Result<LuckReport, RulesError> {
        self.master.action_use_luck(&mut self.store)
    }

    pub fn action_test_luck(&mut self) -> LuckTestReport {
        self.master.action_test_luck(&mut self.store)
    }

    pub fn action_eat_meal(&mut self) -> Option<MealReport> {
        self.master.action_eat_meal(&mut self.store)
    }

    /// # Errors
    ///
    /// See [`GameMaster::action_use_potion`].
    pub fn action_use_potion(&mut self) -> Result<PotionReport, RulesError> {
        self.master.action_use_potion(&mut self.store)
    }

    /// # Errors
    ///
    /// See [`GameMaster::action_purchase`].
    pub fn action_purchase(&mut self) -> Result<PurchaseReport, RulesError> {
        self.master.action_purchase(&mut self.store)
    }

    #[must_use]
    pub fn ambient_channel(&self) -> Channel {
        self.master.ambient_channel(&self.store)
    }

    /// Write any pending autosave; call before the host shuts down.
    pub fn close(&mut self) -> bool {
        self.store.flush_autosave()
    }
}
