//! The sheet's single source of truth.
//!
//! [`GameStateManager`] owns the current [`GameState`]. Every mutation goes
//! through a named setter that edits one sub-record, notifies subscribers with
//! the new state and restarts the autosave debounce. Persistence collaborators
//! are injected so the manager runs the same in a browser host, a terminal or
//! a test.
use serde_json::Value;
use std::fmt;
use std::rc::Rc;

use crate::autosave::{Clock, Debounce};
use crate::config::SheetConfig;
use crate::dice::DiceRoll;
use crate::files::{FileError, FilePersistence, NoFiles};
use crate::migration::migrate_state;
use crate::numbers::{clamp_volume, parse_stat_or_zero};
use crate::observer::{Observers, Subscription};
use crate::rules::FightOutcome;
use crate::state::{
    CURRENT_VERSION, Channel, CustomSound, DEFAULT_VOLUME, Fight, FightResult, GameState,
    PotionType, Section, SectionsExpanded, build_state_object,
};
use crate::storage::StateStorage;
use crate::trail::{Annotation, TrailEntry, normalize_trail};

/// What [`GameStateManager::clear_fight_results`] does with the creature name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CreaturePreserve {
    #[default]
    Blank,
    Current,
    Named(String),
}

impl From<bool> for CreaturePreserve {
    fn from(keep: bool) -> Self {
        if keep { Self::Current } else { Self::Blank }
    }
}

impl From<&str> for CreaturePreserve {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<String> for CreaturePreserve {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

pub struct GameStateManager {
    state: GameState,
    observers: Observers<GameState>,
    storage: Box<dyn StateStorage>,
    files: Box<dyn FilePersistence>,
    clock: Rc<dyn Clock>,
    debounce: Debounce,
    storage_key: String,
}

impl fmt::Debug for GameStateManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameStateManager")
            .field("storage_key", &self.storage_key)
            .field("debounce", &self.debounce)
            .field("observers", &self.observers)
            .finish_non_exhaustive()
    }
}

/// Generates one getter and one setter per leaf field. Getters hand out
/// copies; setters go through [`GameStateManager::update`].
macro_rules! sheet_fields {
    ($($getter:ident / $setter:ident : $ty:ty => $($path:ident).+;)*) => {
        #[allow(clippy::clone_on_copy)]
        impl GameStateManager {
            $(
                #[must_use]
                pub fn $getter(&self) -> $ty {
                    self.state.$($path).+.clone()
                }

                pub fn $setter(&mut self, value: impl Into<$ty>) {
                    let value = value.into();
                    self.update(|state| state.$($path).+ = value);
                }
            )*
        }
    };
}

sheet_fields! {
    version / set_version: String => metadata.version;
    last_saved / set_last_saved: Option<String> => metadata.last_saved;
    book_name / set_book_name: String => metadata.book_name;
    theme / set_theme: String => metadata.theme;
    action_sounds_enabled / set_action_sounds_enabled: bool => metadata.action_sounds_enabled;
    all_sounds_muted / set_all_sounds_muted: bool => metadata.all_sounds_muted;

    character_name / set_character_name: String => character.name;
    skill / set_skill: String => character.skill;
    health / set_health: String => character.health;
    luck / set_luck: String => character.luck;
    max_skill / set_max_skill: Option<i32> => character.max_skill;
    max_health / set_max_health: Option<i32> => character.max_health;
    max_luck / set_max_luck: Option<i32> => character.max_luck;
    is_locked / set_is_locked: bool => character.is_locked;

    coins / set_coins: String => consumables.coins;
    meals / set_meals: String => consumables.meals;
    transaction_object / set_transaction_object: String => consumables.transaction_object;
    transaction_cost / set_transaction_cost: String => consumables.transaction_cost;
    potion_type / set_potion_type: PotionType => consumables.potion_type;
    potion_used / set_potion_used: bool => consumables.potion_used;

    inventory / set_inventory: String => inventory;
    notes / set_notes: String => notes;

    monster_creature / set_monster_creature: String => fight.monster_creature;
    monster_skill / set_monster_skill: String => fight.monster_skill;
    monster_health / set_monster_health: String => fight.monster_health;
    graveyard / set_graveyard: String => fight.graveyard;
    show_use_luck / set_show_use_luck: bool => fight.show_use_luck;
    luck_used / set_luck_used: bool => fight.luck_used;
    is_fighting / set_is_fighting: bool => fight.is_fighting;
    fight_result / set_fight_result: Option<FightResult> => fight.fight_result;
    fight_outcome / set_fight_outcome: Option<FightOutcome> => fight.fight_outcome;
    hero_dice_rolls / set_hero_dice_rolls: Option<DiceRoll> => fight.hero_dice_rolls;
    monster_dice_rolls / set_monster_dice_rolls: Option<DiceRoll> => fight.monster_dice_rolls;

    sections_expanded / set_sections_expanded: SectionsExpanded => sections_expanded;
    custom_sounds / set_custom_sounds: Vec<CustomSound> => custom_sounds;
}

impl GameStateManager {
    #[must_use]
    pub fn new(storage: Box<dyn StateStorage>, clock: Rc<dyn Clock>, config: &SheetConfig) -> Self {
        Self {
            state: GameState::default(),
            observers: Observers::new(),
            storage,
            files: Box::new(NoFiles),
            clock,
            debounce: Debounce::new(config.autosave_delay_ms),
            storage_key: config.storage_key.clone(),
        }
    }

    #[must_use]
    pub fn with_files(mut self, files: Box<dyn FilePersistence>) -> Self {
        self.files = files;
        self
    }

    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Copy of the whole sheet.
    #[must_use]
    pub fn snapshot(&self) -> GameState {
        self.state.clone()
    }

    /// Borrow the sheet for reading.
    #[must_use]
    pub const fn view(&self) -> &GameState {
        &self.state
    }

    /// Call `listener` with the full state after every mutation, load and reset.
    pub fn subscribe(&self, listener: impl FnMut(&GameState) + 'static) -> Subscription {
        self.observers.subscribe(listener)
    }

    /// Apply `edit`, notify, and restart the autosave timer.
    pub fn update(&mut self, edit: impl FnOnce(&mut GameState)) {
        edit(&mut self.state);
        self.notify();
        self.schedule_autosave();
    }

    fn replace(&mut self, state: GameState) {
        self.state = state;
        self.notify();
    }

    fn notify(&self) {
        self.observers.notify(&self.state);
    }

    // Trail

    #[must_use]
    pub fn trail(&self) -> Vec<TrailEntry> {
        self.state.trail.clone()
    }

    /// Store `entries` with chapter 1 forced to the front.
    pub fn set_trail_sequence(&mut self, entries: Vec<TrailEntry>) {
        let trail = normalize_trail(entries);
        self.update(|state| state.trail = trail);
    }

    pub fn add_trail_entry(&mut self, number: u32) {
        let mut entries = self.trail();
        entries.push(TrailEntry::new(number, None));
        self.set_trail_sequence(entries);
    }

    /// Annotate the entry at `index`. The starting entry stays blank.
    pub fn set_trail_annotation(&mut self, index: usize, annotation: Option<Annotation>) -> bool {
        if index == 0 || index >= self.state.trail.len() {
            return false;
        }
        let mut entries = self.trail();
        entries[index].annotation = annotation;
        self.set_trail_sequence(entries);
        true
    }

    /// Remove the entry at `index`. The starting entry cannot be removed.
    pub fn remove_trail_entry(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.state.trail.len() {
            return false;
        }
        let mut entries = self.trail();
        entries.remove(index);
        self.set_trail_sequence(entries);
        true
    }

    // Fight

    /// Start a clean encounter, optionally keeping a creature name.
    pub fn clear_fight_results(&mut self, preserve: impl Into<CreaturePreserve>) {
        let creature = match preserve.into() {
            CreaturePreserve::Blank => String::new(),
            CreaturePreserve::Current => self.state.fight.monster_creature.clone(),
            CreaturePreserve::Named(name) => name,
        };
        let graveyard = self.state.fight.graveyard.clone();
        self.update(|state| {
            state.fight = Fight {
                graveyard,
                ..Fight::with_creature(creature)
            };
        });
    }

    /// Newline-append `name` to the graveyard. Blank names are skipped.
    pub fn append_to_graveyard(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            log::debug!("not burying a nameless creature");
            return;
        }
        self.update(|state| {
            let graveyard = &mut state.fight.graveyard;
            if !graveyard.is_empty() {
                graveyard.push('\n');
            }
            graveyard.push_str(name);
        });
    }

    // Character

    /// Freeze the current stats as their maximums.
    pub fn lock_character(&mut self) {
        self.update(|state| {
            let character = &mut state.character;
            character.max_skill = Some(parse_stat_or_zero(&character.skill));
            character.max_health = Some(parse_stat_or_zero(&character.health));
            character.max_luck = Some(parse_stat_or_zero(&character.luck));
            character.is_locked = true;
        });
    }

    pub fn unlock_character(&mut self) {
        self.update(|state| {
            let character = &mut state.character;
            character.max_skill = None;
            character.max_health = None;
            character.max_luck = None;
            character.is_locked = false;
        });
    }

    // Sounds

    #[must_use]
    pub fn sound_url(&self, channel: Channel) -> String {
        self.state.sounds.channel(channel).url.clone()
    }

    pub fn set_sound_url(&mut self, channel: Channel, url: impl Into<String>) {
        let url = url.into();
        self.update(|state| state.sounds.channel_mut(channel).url = url);
    }

    #[must_use]
    pub fn sound_volume(&self, channel: Channel) -> u8 {
        self.state.sounds.channel(channel).volume
    }

    /// Clamped to 0-100.
    pub fn set_sound_volume(&mut self, channel: Channel, volume: f64) {
        let volume = clamp_volume(volume);
        self.update(|state| state.sounds.channel_mut(channel).volume = volume);
    }

    /// Add a track and return its generated id.
    pub fn add_custom_sound(&mut self, label: impl Into<String>, url: impl Into<String>) -> String {
        let id = self.next_custom_sound_id();
        let sound = CustomSound {
            id: id.clone(),
            label: label.into(),
            url: url.into(),
        };
        self.update(|state| state.custom_sounds.push(sound));
        id
    }

    pub fn update_custom_sound(
        &mut self,
        id: &str,
        label: impl Into<String>,
        url: impl Into<String>,
    ) -> bool {
        let Some(index) = self.custom_sound_index(id) else {
            return false;
        };
        let (label, url) = (label.into(), url.into());
        self.update(|state| {
            let sound = &mut state.custom_sounds[index];
            sound.label = label;
            sound.url = url;
        });
        true
    }

    /// Remove a track together with its volume.
    pub fn remove_custom_sound(&mut self, id: &str) -> bool {
        let Some(index) = self.custom_sound_index(id) else {
            return false;
        };
        self.update(|state| {
            state.custom_sounds.remove(index);
            state.sounds.custom_volumes.remove(id);
        });
        true
    }

    #[must_use]
    pub fn custom_sound_volume(&self, id: &str) -> u8 {
        self.state
            .sounds
            .custom_volumes
            .get(id)
            .copied()
            .unwrap_or(DEFAULT_VOLUME)
    }

    pub fn set_custom_sound_volume(&mut self, id: &str, volume: f64) {
        let volume = clamp_volume(volume);
        let id = id.to_string();
        self.update(|state| {
            state.sounds.custom_volumes.insert(id, volume);
        });
    }

    fn custom_sound_index(&self, id: &str) -> Option<usize> {
        self.state.custom_sounds.iter().position(|sound| sound.id == id)
    }

    fn next_custom_sound_id(&self) -> String {
        let stamp = self.clock.now().timestamp_millis();
        let mut id = format!("custom-{stamp}");
        let mut suffix = 1;
        while self.custom_sound_index(&id).is_some() {
            id = format!("custom-{stamp}-{suffix}");
            suffix += 1;
        }
        id
    }

    // Sections

    #[must_use]
    pub fn section_expanded(&self, section: Section) -> bool {
        self.state.sections_expanded.get(section)
    }

    pub fn set_section_expanded(&mut self, section: Section, expanded: bool) {
        self.update(|state| state.sections_expanded.set(section, expanded));
    }

    pub fn toggle_section(&mut self, section: Section) {
        let expanded = !self.section_expanded(section);
        self.set_section_expanded(section, expanded);
    }

    // Persistence

    /// Replace the sheet with whatever is stored under the storage key.
    ///
    /// Returns `false` without touching the sheet when nothing usable is
    /// stored. Loading does not schedule an autosave.
    pub fn load_from_storage(&mut self) -> bool {
        let raw = match self.storage.get_item(&self.storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return false,
            Err(err) => {
                log::warn!("could not read `{}`: {err}", self.storage_key);
                return false;
            }
        };
        let parsed = match serde_json::from_str::<Value>(&raw) {
            Ok(parsed) => parsed,
            Err(err) => {
                log::warn!("stored sheet is not valid JSON, keeping defaults: {err}");
                return false;
            }
        };
        let Some(state) = Self::restore(parsed) else {
            log::warn!("stored sheet is not an object, keeping defaults");
            return false;
        };
        self.replace(state);
        true
    }

    /// Start over from defaults.
    pub fn reset(&mut self) {
        self.update(|state| *state = GameState::default());
    }

    /// Replace the sheet with an export picked through the file collaborator.
    pub async fn load_from_file(&mut self) -> bool {
        let Some(document) = self.files.load_from_file().await else {
            return false;
        };
        let Some(state) = Self::restore(document) else {
            log::warn!("imported document could not be migrated");
            return false;
        };
        self.replace(state);
        self.schedule_autosave();
        true
    }

    /// Export the current sheet.
    ///
    /// # Errors
    ///
    /// Returns an error if no file collaborator is configured or the export
    /// cannot be written.
    pub fn save_to_file(&self, book: &str, character: &str) -> Result<(), FileError> {
        self.files.save_to_file(&self.state, book, character)
    }

    /// Migrate first, then lay the result over defaults.
    fn restore(raw: Value) -> Option<GameState> {
        let migrated = migrate_state(raw)?;
        let mut state = build_state_object(&migrated);
        state.metadata.version = CURRENT_VERSION.to_string();
        Some(state)
    }

    // Autosave

    #[must_use]
    pub const fn autosave_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    /// Write if the debounce window has passed since the last mutation.
    pub fn poll_autosave(&mut self) -> bool {
        let now = self.clock.now();
        self.debounce.fire_if_due(now) && self.write_to_storage()
    }

    /// Write a pending save now.
    pub fn flush_autosave(&mut self) -> bool {
        self.debounce.take() && self.write_to_storage()
    }

    fn schedule_autosave(&mut self) {
        self.debounce.touch(self.clock.now());
        log::debug!("autosave due at {:?}", self.debounce.deadline());
    }

    /// Stamps `lastSaved`, writes, then notifies so subscribers hold the
    /// snapshot that was persisted. The stamp alone never schedules a save.
    fn write_to_storage(&mut self) -> bool {
        let saved_at = self.clock.now().to_rfc3339();
        self.state.metadata.last_saved = Some(saved_at);
        let written = serde_json::to_string(&self.state)
            .map_err(Into::into)
            .and_then(|json| self.storage.set_item(&self.storage_key, &json));
        self.notify();
        match written {
            Ok(()) => {
                log::debug!("sheet saved under `{}`", self.storage_key);
                true
            }
            Err(err) => {
                log::warn!("autosave failed: {err}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autosave::ManualClock;
    use crate::storage::MemoryStorage;
    use serde_json::json;
    use std::cell::RefCell;

    fn manager_with(storage: MemoryStorage) -> (GameStateManager, ManualClock) {
        let clock = ManualClock::default();
        let manager = GameStateManager::new(
            Box::new(storage),
            Rc::new(clock.clone()),
            &SheetConfig::default(),
        );
        (manager, clock)
    }

    fn manager() -> GameStateManager {
        manager_with(MemoryStorage::new()).0
    }

    #[test]
    fn setters_notify_with_full_state() {
        let mut manager = manager();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let _sub = manager.subscribe(move |state: &GameState| {
            sink.borrow_mut().push(state.character.skill.clone());
        });

        manager.set_skill("11");
        manager.set_health("18");
        assert_eq!(*seen.borrow(), vec!["11".to_string(), "11".to_string()]);
        assert_eq!(manager.health(), "18");
        assert!(manager.autosave_pending());
    }

    #[test]
    fn getters_hand_out_copies() {
        let mut manager = manager();
        let mut trail = manager.trail();
        trail.push(TrailEntry::new(99, None));
        assert_eq!(manager.trail().len(), 1);
        manager.set_max_health(20);
        assert_eq!(manager.max_health(), Some(20));
        manager.set_max_health(None::<i32>);
        assert_eq!(manager.max_health(), None);
    }

    #[test]
    fn unsubscribed_listener_goes_quiet() {
        let mut manager = manager();
        let calls = Rc::new(RefCell::new(0));
        let counter = calls.clone();
        let sub = manager.subscribe(move |_| *counter.borrow_mut() += 1);
        manager.set_notes("one");
        sub.unsubscribe();
        manager.set_notes("two");
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn trail_sequence_is_normalized() {
        let mut manager = manager();
        manager.set_trail_sequence(vec![
            TrailEntry::new(14, Some(Annotation::Good)),
            TrailEntry::new(1, Some(Annotation::Bad)),
            TrailEntry::new(200, None),
        ]);
        assert_eq!(
            manager.trail(),
            vec![
                TrailEntry::start(),
                TrailEntry::new(14, Some(Annotation::Good)),
                TrailEntry::new(200, None),
            ]
        );

        manager.set_trail_sequence(vec![
            TrailEntry::new(1, Some(Annotation::Good)),
            TrailEntry::new(1, Some(Annotation::Bad)),
        ]);
        assert_eq!(
            manager.trail(),
            vec![TrailEntry::start(), TrailEntry::new(1, Some(Annotation::Bad))]
        );

        manager.set_trail_sequence(Vec::new());
        assert_eq!(manager.trail(), vec![TrailEntry::start()]);
    }

    #[test]
    fn trail_editing_protects_the_start() {
        let mut manager = manager();
        manager.add_trail_entry(42);
        manager.add_trail_entry(7);
        assert!(manager.set_trail_annotation(1, Some(Annotation::Died)));
        assert!(!manager.set_trail_annotation(0, Some(Annotation::Good)));
        assert!(!manager.remove_trail_entry(0));
        assert!(!manager.remove_trail_entry(9));
        assert!(manager.remove_trail_entry(2));
        assert_eq!(
            manager.trail(),
            vec![TrailEntry::start(), TrailEntry::new(42, Some(Annotation::Died))]
        );
    }

    #[test]
    fn clear_fight_results_variants() {
        let mut manager = manager();
        manager.set_monster_creature("Orc");
        manager.set_monster_health("4");
        manager.set_show_use_luck(true);
        manager.set_graveyard("Rat");

        manager.clear_fight_results(true);
        assert_eq!(manager.monster_creature(), "Orc");
        assert_eq!(manager.monster_health(), "");
        assert!(!manager.show_use_luck());
        assert_eq!(manager.graveyard(), "Rat");

        manager.clear_fight_results("Troll");
        assert_eq!(manager.monster_creature(), "Troll");

        manager.clear_fight_results(false);
        assert_eq!(manager.monster_creature(), "");
        assert!(manager.fight_result().is_none());
    }

    #[test]
    fn graveyard_appends_lines() {
        let mut manager = manager();
        manager.append_to_graveyard("Goblin");
        manager.append_to_graveyard("  ");
        manager.append_to_graveyard("Orc");
        assert_eq!(manager.graveyard(), "Goblin\nOrc");
    }

    #[test]
    fn locking_captures_maximums() {
        let mut manager = manager();
        manager.set_skill("11");
        manager.set_health("20");
        manager.set_luck("");
        manager.lock_character();
        assert!(manager.is_locked());
        assert_eq!(manager.max_skill(), Some(11));
        assert_eq!(manager.max_health(), Some(20));
        assert_eq!(manager.max_luck(), Some(0));
        manager.unlock_character();
        assert!(!manager.is_locked());
        assert_eq!(manager.max_skill(), None);
    }

    #[test]
    fn channels_and_custom_sounds() {
        let mut manager = manager();
        manager.set_sound_url(Channel::Ambience, "https://rain");
        manager.set_sound_volume(Channel::Ambience, 250.0);
        assert_eq!(manager.sound_url(Channel::Ambience), "https://rain");
        assert_eq!(manager.sound_volume(Channel::Ambience), 100);
        assert_eq!(manager.sound_volume(Channel::Battle), DEFAULT_VOLUME);

        let first = manager.add_custom_sound("Drip", "https://drip");
        let second = manager.add_custom_sound("Wind", "https://wind");
        assert_ne!(first, second);
        manager.set_custom_sound_volume(&first, -5.0);
        assert_eq!(manager.custom_sound_volume(&first), 0);
        assert_eq!(manager.custom_sound_volume(&second), DEFAULT_VOLUME);

        assert!(manager.update_custom_sound(&second, "Gale", "https://gale"));
        assert!(!manager.update_custom_sound("missing", "x", "y"));
        assert!(manager.remove_custom_sound(&first));
        assert!(!manager.view().sounds.custom_volumes.contains_key(&first));
        assert_eq!(manager.custom_sounds().len(), 1);
        assert_eq!(manager.custom_sounds()[0].label, "Gale");
    }

    #[test]
    fn sections_toggle() {
        let mut manager = manager();
        assert!(!manager.section_expanded(Section::Fight));
        manager.toggle_section(Section::Fight);
        assert!(manager.section_expanded(Section::Fight));
        manager.set_section_expanded(Section::Map, false);
        assert!(!manager.sections_expanded().map);
    }

    #[test]
    fn load_from_empty_storage_changes_nothing() {
        let mut manager = manager();
        manager.set_notes("keep");
        assert!(!manager.load_from_storage());
        assert_eq!(manager.notes(), "keep");
    }

    #[test]
    fn malformed_storage_is_ignored() {
        let (mut manager, _) = manager_with(MemoryStorage::with_item("gamebook.sheet", "{oops"));
        assert!(!manager.load_from_storage());
        assert_eq!(manager.snapshot(), GameState::default());

        let (mut manager, _) = manager_with(MemoryStorage::with_item("gamebook.sheet", "[1]"));
        assert!(!manager.load_from_storage());
    }

    #[test]
    fn storage_load_migrates_and_merges() {
        let legacy = json!({
            "allSoundsMuted": true,
            "character": { "name": "Ivy", "skill": 9 },
            "inventory": ["Sword", "Rope"],
            "trail": [5, { "number": 9, "color": "success" }],
        });
        let storage = MemoryStorage::with_item("gamebook.sheet", &legacy.to_string());
        let (mut manager, _) = manager_with(storage.clone());
        let notified = Rc::new(RefCell::new(0));
        let counter = notified.clone();
        let _sub = manager.subscribe(move |_| *counter.borrow_mut() += 1);

        assert!(manager.load_from_storage());
        assert_eq!(*notified.borrow(), 1);
        assert_eq!(manager.character_name(), "Ivy");
        assert_eq!(manager.skill(), "9");
        assert_eq!(manager.meals(), "10");
        assert_eq!(manager.inventory(), "Sword\nRope");
        assert!(manager.all_sounds_muted());
        assert_eq!(manager.version(), CURRENT_VERSION);
        assert_eq!(
            manager.trail(),
            vec![
                TrailEntry::start(),
                TrailEntry::new(5, None),
                TrailEntry::new(9, Some(Annotation::Good)),
            ]
        );
        assert!(!manager.autosave_pending());
        assert_eq!(storage.write_count(), 0);
    }

    #[test]
    fn reset_restores_defaults_and_schedules() {
        let storage = MemoryStorage::new();
        let (mut manager, _) = manager_with(storage.clone());
        manager.set_coins("30");
        manager.flush_autosave();
        manager.reset();
        assert_eq!(manager.coins(), "0");
        assert!(manager.autosave_pending());
        assert!(manager.flush_autosave());
        assert_eq!(storage.write_count(), 2);
    }

    #[test]
    fn autosave_stamps_last_saved() {
        let storage = MemoryStorage::new();
        let (mut manager, clock) = manager_with(storage.clone());
        manager.set_book_name("Deathtrap Dungeon");
        clock.advance_ms(1_000);
        assert!(manager.poll_autosave());
        let saved: Value =
            serde_json::from_str(&storage.peek("gamebook.sheet").unwrap()).unwrap();
        assert_eq!(saved["metadata"]["bookName"], json!("Deathtrap Dungeon"));
        assert_eq!(
            saved["metadata"]["lastSaved"],
            json!(clock.now().to_rfc3339())
        );
        assert!(!manager.poll_autosave());
    }

    #[test]
    fn subscribers_see_the_saved_stamp() {
        let storage = MemoryStorage::new();
        let (mut manager, clock) = manager_with(storage.clone());
        let stamps = Rc::new(RefCell::new(Vec::new()));
        let sink = stamps.clone();
        let _sub = manager.subscribe(move |state: &GameState| {
            sink.borrow_mut().push(state.metadata.last_saved.clone());
        });

        manager.set_notes("the rope is frayed");
        clock.advance_ms(1_000);
        assert!(manager.poll_autosave());

        let saved: Value =
            serde_json::from_str(&storage.peek("gamebook.sheet").unwrap()).unwrap();
        let last = stamps.borrow().last().cloned().flatten();
        assert_eq!(stamps.borrow().len(), 2);
        assert_eq!(last.as_deref(), saved["metadata"]["lastSaved"].as_str());
        assert!(!manager.autosave_pending());
    }

    #[test]
    fn file_save_without_collaborator_fails() {
        let manager = manager();
        assert!(matches!(
            manager.save_to_file("book", "hero"),
            Err(FileError::Unavailable)
        ));
        let mut manager = manager;
        assert!(!futures::executor::block_on(manager.load_from_file()));
    }
}
