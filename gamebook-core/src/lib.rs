//! Gamebook Companion Core
//!
//! Platform-agnostic state and rules for a Fighting Fantasy style companion
//! sheet: the persisted sheet schema and its migrations, an observable state
//! manager with debounced autosave, and the combat rules engine.
//! Storage, files, sound and time are collaborators the host injects.

pub mod autosave;
pub mod config;
pub mod dice;
pub mod display;
pub mod files;
pub mod game_master;
pub mod manager;
pub mod migration;
pub mod numbers;
pub mod observer;
pub mod rules;
pub mod session;
pub mod sound;
pub mod state;
pub mod storage;
pub mod trail;

// Re-export commonly used types
pub use autosave::{Clock, DEFAULT_AUTOSAVE_DELAY_MS, Debounce, ManualClock, SystemClock};
pub use config::SheetConfig;
pub use dice::{DiceRoll, DiceRoller, RandomDice, ScriptedDice};
pub use display::{Badges, DisplayCoordinator, DisplayEvent, FieldBadge, StatField};
pub use files::{
    FileError, FilePersistence, NoFiles, SAVE_EXTENSION, decode_document, encode_document,
    generate_filename,
};
pub use game_master::{
    FightReport, GameMaster, LuckReport, LuckTestReport, MealReport, PotionReport,
    PurchaseReport, RulesError,
};
pub use manager::{CreaturePreserve, GameStateManager};
pub use migration::{SchemaVersion, compare_versions, migrate_state};
pub use numbers::{format_stat, parse_stat_or_zero};
pub use observer::{Observers, Subscription};
pub use rules::{
    CombatOutcome, FightOutcome, LuckEffect, calculate_damage, calculate_luck_effect,
    can_test_luck, check_fight_end, is_lucky, resolve_combat,
};
pub use session::{SessionHost, SheetSession};
pub use sound::{CueLog, SilentCues, SoundCue, SoundCues, ambient_channel, cues_enabled};
pub use state::{
    CURRENT_VERSION, Channel, ChannelSettings, Character, Consumables, CustomSound, Fight,
    FightResult, GameState, Metadata, PotionType, Section, SectionsExpanded, Sounds,
    build_state_object, default_state,
};
pub use storage::{DEFAULT_STORAGE_KEY, MemoryStorage, StateStorage, StorageError};
pub use trail::{
    Annotation, ColoredTrailEntry, TrailColor, TrailEntry, annotation_to_color,
    color_to_annotation, normalize_trail,
};
