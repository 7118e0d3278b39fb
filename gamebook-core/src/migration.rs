//! Upgrades stored or exported sheets to the current schema.
//!
//! Each step owns one schema change and is listed with the version that
//! introduced it. A sheet runs every step whose version is newer than its
//! own, in order. Steps must accept input that already has their shape.
use serde_json::{Map, Value, json};
use std::cmp::Ordering;
use std::fmt;

use crate::state::{CURRENT_VERSION, Channel, SectionsExpanded};
use crate::trail::color_to_annotation;

/// Version assumed for sheets written before versioning existed.
pub const UNVERSIONED: &str = "0.0.0";

type Transform = fn(&mut Map<String, Value>);

/// Ordered migration chain. Append new steps; never edit shipped ones.
const MIGRATIONS: &[(&str, Transform)] = &[
    ("1.2.0", migrate_to_1_2_0),
    ("1.3.0", migrate_to_1_3_0),
];

const STAT_FIELDS: &[(&str, &[&str])] = &[
    ("character", &["skill", "health", "luck"]),
    ("consumables", &["coins", "meals", "transactionCost"]),
    ("fight", &["monsterSkill", "monsterHealth"]),
];

/// Dotted `major.minor.patch` version compared numerically per segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SchemaVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl SchemaVersion {
    /// Parse leniently: missing or non-numeric segments count as zero.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut segments = raw.trim().split('.').map(|segment| {
            let digits: String = segment.chars().take_while(char::is_ascii_digit).collect();
            digits.parse::<u64>().unwrap_or(0)
        });
        Self {
            major: segments.next().unwrap_or(0),
            minor: segments.next().unwrap_or(0),
            patch: segments.next().unwrap_or(0),
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Compare two dotted version strings.
#[must_use]
pub fn compare_versions(left: &str, right: &str) -> Ordering {
    SchemaVersion::parse(left).cmp(&SchemaVersion::parse(right))
}

/// Version a raw sheet claims to be: `metadata.version`, then the legacy
/// top-level `version`, then [`UNVERSIONED`].
#[must_use]
pub fn source_version(raw: &Value) -> String {
    raw.get("metadata")
        .and_then(|metadata| metadata.get("version"))
        .and_then(Value::as_str)
        .or_else(|| raw.get("version").and_then(Value::as_str))
        .unwrap_or(UNVERSIONED)
        .to_string()
}

/// Bring a raw sheet up to [`CURRENT_VERSION`].
///
/// `null` and non-object input yield `None`. Sheets already at or beyond the
/// current version come back unchanged.
#[must_use]
pub fn migrate_state(raw: Value) -> Option<Value> {
    migrate_to(raw, CURRENT_VERSION)
}

fn migrate_to(raw: Value, target: &str) -> Option<Value> {
    let from = source_version(&raw);
    let Value::Object(mut map) = raw else {
        return None;
    };
    if compare_versions(&from, target) != Ordering::Less {
        return Some(Value::Object(map));
    }

    let from_version = SchemaVersion::parse(&from);
    let target_version = SchemaVersion::parse(target);
    for (threshold, transform) in MIGRATIONS {
        let threshold = SchemaVersion::parse(threshold);
        if from_version < threshold && threshold <= target_version {
            log::debug!("migrating sheet from {from_version} past {threshold}");
            transform(&mut map);
        }
    }

    map.remove("version");
    ensure_object(&mut map, "metadata").insert("version".into(), json!(target));
    Some(Value::Object(map))
}

fn ensure_object<'a>(map: &'a mut Map<String, Value>, key: &str) -> &'a mut Map<String, Value> {
    let slot = map
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(inner) => inner,
        _ => unreachable!("slot was just made an object"),
    }
}

/// Lists that became free text, and numbers that became text fields.
fn migrate_to_1_2_0(map: &mut Map<String, Value>) {
    if let Some(inventory) = map.get_mut("inventory") {
        join_lines(inventory);
    }
    if let Some(graveyard) = map
        .get_mut("fight")
        .and_then(Value::as_object_mut)
        .and_then(|fight| fight.get_mut("graveyard"))
    {
        join_lines(graveyard);
    }
    for (record, fields) in STAT_FIELDS {
        let Some(record) = map.get_mut(*record).and_then(Value::as_object_mut) else {
            continue;
        };
        for field in *fields {
            let text = match record.get(*field) {
                Some(Value::Number(number)) => number.to_string(),
                _ => continue,
            };
            record.insert((*field).to_string(), Value::String(text));
        }
    }
}

fn join_lines(value: &mut Value) {
    if let Value::Array(items) = value {
        let lines: Vec<String> = items
            .iter()
            .filter_map(|item| match item {
                Value::String(text) => Some(text.clone()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect();
        *value = Value::String(lines.join("\n"));
    }
}

/// Sound flags into metadata, unified sound record, annotated trail,
/// section flags.
fn migrate_to_1_3_0(map: &mut Map<String, Value>) {
    absorb_sound_flags(map);
    unify_sounds(map);
    annotate_trail(map);
    if !map.contains_key("sectionsExpanded") {
        map.insert(
            "sectionsExpanded".into(),
            serde_json::to_value(SectionsExpanded::default()).unwrap_or(Value::Null),
        );
    }
}

fn absorb_sound_flags(map: &mut Map<String, Value>) {
    let flags: Vec<(&str, Value)> = ["actionSoundsEnabled", "allSoundsMuted"]
        .into_iter()
        .filter_map(|key| map.remove(key).map(|value| (key, value)))
        .collect();
    let metadata = ensure_object(map, "metadata");
    for (key, value) in flags {
        metadata.entry(key.to_string()).or_insert(value);
    }
}

fn unify_sounds(map: &mut Map<String, Value>) {
    let legacy_urls = map.remove("soundUrls");
    let legacy_volumes = map.remove("soundVolumes");
    let sounds = ensure_object(map, "sounds");

    for channel in Channel::ALL {
        let key = channel.as_str();
        let mut settings = match sounds.remove(key) {
            Some(Value::Object(existing)) => existing,
            Some(Value::String(url)) => {
                let mut settings = Map::new();
                settings.insert("url".into(), Value::String(url));
                settings
            }
            _ => Map::new(),
        };
        if let Some(url) = legacy_urls.as_ref().and_then(|urls| urls.get(key)) {
            settings.entry("url".to_string()).or_insert(url.clone());
        }
        if let Some(volume) = legacy_volumes.as_ref().and_then(|vols| vols.get(key)) {
            settings.entry("volume".to_string()).or_insert(volume.clone());
        }
        if !settings.is_empty() {
            sounds.insert(key.into(), Value::Object(settings));
        }
    }

    if let Some(Value::Object(volumes)) = legacy_volumes {
        let custom: Map<String, Value> = volumes
            .into_iter()
            .filter(|(id, _)| id.parse::<Channel>().is_err())
            .collect();
        if !custom.is_empty() {
            let target = ensure_object(sounds, "customVolumes");
            for (id, volume) in custom {
                target.entry(id).or_insert(volume);
            }
        }
    }
}

fn annotate_trail(map: &mut Map<String, Value>) {
    let Some(Value::Array(entries)) = map.get_mut("trail") else {
        return;
    };
    let migrated: Vec<Value> = entries.iter().filter_map(annotated_entry).collect();
    *entries = migrated;
}

fn annotated_entry(entry: &Value) -> Option<Value> {
    match entry {
        Value::Number(_) => Some(json!({ "number": entry, "annotation": null })),
        Value::String(text) => text
            .trim()
            .parse::<u32>()
            .ok()
            .map(|number| json!({ "number": number, "annotation": null })),
        Value::Object(fields) => {
            let number = match fields.get("number")? {
                Value::String(text) => json!(text.trim().parse::<u32>().ok()?),
                other => other.clone(),
            };
            if fields.contains_key("annotation") {
                let annotation = fields.get("annotation").cloned().unwrap_or(Value::Null);
                return Some(json!({ "number": number, "annotation": annotation }));
            }
            let annotation = color_to_annotation(fields.get("color").and_then(Value::as_str));
            Some(json!({ "number": number, "annotation": annotation }))
        }
        _ => None,
    }
}
