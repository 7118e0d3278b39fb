//! Persisted sheet schema and its defaults.
//!
//! Field names serialize in camelCase so the storage record and export files
//! keep the shape players already have on disk.
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::dice::DiceRoll;
use crate::rules::{CombatOutcome, FightOutcome};
use crate::trail::{TrailEntry, normalize_trail};

/// Schema version written by this build.
pub const CURRENT_VERSION: &str = "1.3.0";
pub const DEFAULT_VOLUME: u8 = 25;
pub const DEFAULT_COINS: &str = "0";
pub const DEFAULT_MEALS: &str = "10";
pub const DEFAULT_THEME: &str = "light";
pub const DEFAULT_BATTLE_URL: &str = "https://www.youtube.com/watch?v=Xs0Lxif1u9E";
pub const DEFAULT_VICTORY_URL: &str = "https://www.youtube.com/watch?v=hAk1HMOVBc4";
pub const DEFAULT_DEFEAT_URL: &str = "https://www.youtube.com/watch?v=Kn4LcXLHSjw";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Metadata {
    pub version: String,
    pub last_saved: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub book_name: String,
    #[serde(deserialize_with = "lenient::string")]
    pub theme: String,
    pub action_sounds_enabled: bool,
    pub all_sounds_muted: bool,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION.to_string(),
            last_saved: None,
            book_name: String::new(),
            theme: DEFAULT_THEME.to_string(),
            action_sounds_enabled: true,
            all_sounds_muted: false,
        }
    }
}

/// The hero. Stats are kept as the text the player typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Character {
    #[serde(deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(deserialize_with = "lenient::string")]
    pub skill: String,
    #[serde(deserialize_with = "lenient::string")]
    pub health: String,
    #[serde(deserialize_with = "lenient::string")]
    pub luck: String,
    #[serde(deserialize_with = "lenient::optional_int")]
    pub max_skill: Option<i32>,
    #[serde(deserialize_with = "lenient::optional_int")]
    pub max_health: Option<i32>,
    #[serde(deserialize_with = "lenient::optional_int")]
    pub max_luck: Option<i32>,
    pub is_locked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PotionType {
    #[default]
    #[serde(rename = "")]
    None,
    Skill,
    Health,
    Luck,
}

impl PotionType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Skill => "skill",
            Self::Health => "health",
            Self::Luck => "luck",
        }
    }
}

impl fmt::Display for PotionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PotionType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(Self::None),
            "skill" => Ok(Self::Skill),
            "health" => Ok(Self::Health),
            "luck" => Ok(Self::Luck),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Consumables {
    #[serde(deserialize_with = "lenient::string")]
    pub coins: String,
    #[serde(deserialize_with = "lenient::string")]
    pub meals: String,
    #[serde(deserialize_with = "lenient::string")]
    pub transaction_object: String,
    #[serde(deserialize_with = "lenient::string")]
    pub transaction_cost: String,
    #[serde(deserialize_with = "lenient::potion")]
    pub potion_type: PotionType,
    pub potion_used: bool,
}

impl Default for Consumables {
    fn default() -> Self {
        Self {
            coins: DEFAULT_COINS.to_string(),
            meals: DEFAULT_MEALS.to_string(),
            transaction_object: String::new(),
            transaction_cost: String::new(),
            potion_type: PotionType::None,
            potion_used: false,
        }
    }
}

/// Summary of the latest attack round, kept so a luck test can refer back to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FightResult {
    #[serde(rename = "type")]
    pub kind: CombatOutcome,
    pub message: String,
    pub hero_total: i32,
    pub monster_total: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Fight {
    #[serde(deserialize_with = "lenient::string")]
    pub monster_creature: String,
    #[serde(deserialize_with = "lenient::string")]
    pub monster_skill: String,
    #[serde(deserialize_with = "lenient::string")]
    pub monster_health: String,
    #[serde(deserialize_with = "lenient::string")]
    pub graveyard: String,
    pub show_use_luck: bool,
    pub luck_used: bool,
    pub is_fighting: bool,
    pub fight_result: Option<FightResult>,
    pub fight_outcome: Option<FightOutcome>,
    pub hero_dice_rolls: Option<DiceRoll>,
    pub monster_dice_rolls: Option<DiceRoll>,
}

impl Fight {
    /// A fresh encounter that remembers only the creature name.
    #[must_use]
    pub fn with_creature(monster_creature: String) -> Self {
        Self {
            monster_creature,
            ..Self::default()
        }
    }
}

/// The four fixed audio channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Ambience,
    Battle,
    Victory,
    Defeat,
}

impl Channel {
    pub const ALL: [Self; 4] = [Self::Ambience, Self::Battle, Self::Victory, Self::Defeat];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ambience => "ambience",
            Self::Battle => "battle",
            Self::Victory => "victory",
            Self::Defeat => "defeat",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|channel| channel.as_str() == s)
            .ok_or(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelSettings {
    #[serde(deserialize_with = "lenient::string")]
    pub url: String,
    #[serde(deserialize_with = "lenient::volume")]
    pub volume: u8,
}

impl ChannelSettings {
    #[must_use]
    pub fn with_url(url: &str) -> Self {
        Self {
            url: url.to_string(),
            volume: DEFAULT_VOLUME,
        }
    }
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self::with_url("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Sounds {
    pub ambience: ChannelSettings,
    pub battle: ChannelSettings,
    pub victory: ChannelSettings,
    pub defeat: ChannelSettings,
    #[serde(deserialize_with = "lenient::volume_map")]
    pub custom_volumes: BTreeMap<String, u8>,
}

impl Sounds {
    #[must_use]
    pub const fn channel(&self, channel: Channel) -> &ChannelSettings {
        match channel {
            Channel::Ambience => &self.ambience,
            Channel::Battle => &self.battle,
            Channel::Victory => &self.victory,
            Channel::Defeat => &self.defeat,
        }
    }

    pub const fn channel_mut(&mut self, channel: Channel) -> &mut ChannelSettings {
        match channel {
            Channel::Ambience => &mut self.ambience,
            Channel::Battle => &mut self.battle,
            Channel::Victory => &mut self.victory,
            Channel::Defeat => &mut self.defeat,
        }
    }
}

impl Default for Sounds {
    fn default() -> Self {
        Self {
            ambience: ChannelSettings::default(),
            battle: ChannelSettings::with_url(DEFAULT_BATTLE_URL),
            victory: ChannelSettings::with_url(DEFAULT_VICTORY_URL),
            defeat: ChannelSettings::with_url(DEFAULT_DEFEAT_URL),
            custom_volumes: BTreeMap::new(),
        }
    }
}

/// A player supplied track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CustomSound {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(deserialize_with = "lenient::string")]
    pub label: String,
    #[serde(deserialize_with = "lenient::string")]
    pub url: String,
}

/// Collapsible sections of the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Section {
    Game,
    Character,
    Consumables,
    DiceRolls,
    Inventory,
    Map,
    Fight,
    Notes,
}

impl Section {
    pub const ALL: [Self; 8] = [
        Self::Game,
        Self::Character,
        Self::Consumables,
        Self::DiceRolls,
        Self::Inventory,
        Self::Map,
        Self::Fight,
        Self::Notes,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Game => "game",
            Self::Character => "character",
            Self::Consumables => "consumables",
            Self::DiceRolls => "diceRolls",
            Self::Inventory => "inventory",
            Self::Map => "map",
            Self::Fight => "fight",
            Self::Notes => "notes",
        }
    }
}

impl FromStr for Section {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|section| section.as_str() == s)
            .ok_or(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SectionsExpanded {
    pub game: bool,
    pub character: bool,
    pub consumables: bool,
    pub dice_rolls: bool,
    pub inventory: bool,
    pub map: bool,
    pub fight: bool,
    pub notes: bool,
}

impl SectionsExpanded {
    #[must_use]
    pub const fn get(&self, section: Section) -> bool {
        match section {
            Section::Game => self.game,
            Section::Character => self.character,
            Section::Consumables => self.consumables,
            Section::DiceRolls => self.dice_rolls,
            Section::Inventory => self.inventory,
            Section::Map => self.map,
            Section::Fight => self.fight,
            Section::Notes => self.notes,
        }
    }

    pub const fn set(&mut self, section: Section, expanded: bool) {
        let slot = match section {
            Section::Game => &mut self.game,
            Section::Character => &mut self.character,
            Section::Consumables => &mut self.consumables,
            Section::DiceRolls => &mut self.dice_rolls,
            Section::Inventory => &mut self.inventory,
            Section::Map => &mut self.map,
            Section::Fight => &mut self.fight,
            Section::Notes => &mut self.notes,
        };
        *slot = expanded;
    }
}

impl Default for SectionsExpanded {
    fn default() -> Self {
        Self {
            game: true,
            character: true,
            consumables: true,
            dice_rolls: true,
            inventory: true,
            map: true,
            fight: false,
            notes: false,
        }
    }
}

/// Everything the sheet persists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameState {
    pub metadata: Metadata,
    pub character: Character,
    pub consumables: Consumables,
    pub inventory: String,
    pub fight: Fight,
    pub sounds: Sounds,
    pub notes: String,
    pub trail: Vec<TrailEntry>,
    pub sections_expanded: SectionsExpanded,
    pub custom_sounds: Vec<CustomSound>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            metadata: Metadata::default(),
            character: Character::default(),
            consumables: Consumables::default(),
            inventory: String::new(),
            fight: Fight::default(),
            sounds: Sounds::default(),
            notes: String::new(),
            trail: vec![TrailEntry::start()],
            sections_expanded: SectionsExpanded::default(),
            custom_sounds: Vec::new(),
        }
    }
}

/// Fresh defaults for a new sheet.
#[must_use]
pub fn default_state() -> GameState {
    GameState::default()
}

/// Build a full state by laying each sub-record of `partial` over its defaults.
///
/// Each sub-record is decoded on its own: missing fields inside it take their
/// default, and a sub-record that cannot be decoded at all is replaced by its
/// defaults without affecting the others. The trail is normalized.
#[must_use]
pub fn build_state_object(partial: &Value) -> GameState {
    let defaults = GameState::default();
    GameState {
        metadata: section(partial, "metadata").unwrap_or(defaults.metadata),
        character: section(partial, "character").unwrap_or(defaults.character),
        consumables: section(partial, "consumables").unwrap_or(defaults.consumables),
        inventory: text_section(partial, "inventory").unwrap_or(defaults.inventory),
        fight: section(partial, "fight").unwrap_or(defaults.fight),
        sounds: section(partial, "sounds").unwrap_or(defaults.sounds),
        notes: text_section(partial, "notes").unwrap_or(defaults.notes),
        trail: normalize_trail(section(partial, "trail").unwrap_or(defaults.trail)),
        sections_expanded: section(partial, "sectionsExpanded")
            .unwrap_or(defaults.sections_expanded),
        custom_sounds: section(partial, "customSounds").unwrap_or(defaults.custom_sounds),
    }
}

fn section<T: DeserializeOwned>(partial: &Value, key: &str) -> Option<T> {
    let value = partial.get(key).filter(|value| !value.is_null())?;
    match T::deserialize(value) {
        Ok(decoded) => Some(decoded),
        Err(err) => {
            log::warn!("ignoring malformed `{key}` record, using defaults: {err}");
            None
        }
    }
}

fn text_section(partial: &Value, key: &str) -> Option<String> {
    partial.get(key).and_then(lenient::text_of)
}

mod lenient {
    //! Forgiving decoders for values older sheets or hand-edited exports store
    //! in slightly different shapes.
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;
    use std::collections::BTreeMap;

    use super::{DEFAULT_VOLUME, PotionType};
    use crate::numbers::{clamp_volume, saturate_i64_to_i32};

    pub fn text_of(value: &Value) -> Option<String> {
        match value {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            Value::Bool(flag) => Some(flag.to_string()),
            _ => None,
        }
    }

    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(text_of(&value).unwrap_or_default())
    }

    pub fn optional_int<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<i32>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Number(number) => number
                .as_i64()
                .map(saturate_i64_to_i32)
                .or_else(|| number.as_f64().map(|f| saturate_i64_to_i32(f.round() as i64))),
            Value::String(text) => text.trim().parse::<i64>().ok().map(saturate_i64_to_i32),
            _ => None,
        })
    }

    pub fn volume_of(value: &Value) -> u8 {
        match value {
            Value::Number(number) => number.as_f64().map_or(DEFAULT_VOLUME, clamp_volume),
            Value::String(text) => text
                .trim()
                .parse::<f64>()
                .map_or(DEFAULT_VOLUME, clamp_volume),
            _ => DEFAULT_VOLUME,
        }
    }

    pub fn volume<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(volume_of(&value))
    }

    pub fn volume_map<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<String, u8>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(value
            .as_object()
            .map(|map| {
                map.iter()
                    .map(|(id, volume)| (id.clone(), volume_of(volume)))
                    .collect()
            })
            .unwrap_or_default())
    }

    pub fn potion<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PotionType, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(value
            .as_str()
            .and_then(|name| name.parse().ok())
            .unwrap_or_default())
    }
}
