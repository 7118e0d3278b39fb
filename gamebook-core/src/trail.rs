//! Chapter trail and its annotation/colour mapping.
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Chapter every trail starts from.
pub const FIRST_CHAPTER: u32 = 1;

/// What the player noted about a visited chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Annotation {
    Died,
    Question,
    Good,
    Bad,
    Important,
}

impl Annotation {
    pub const ALL: [Self; 5] = [
        Self::Died,
        Self::Question,
        Self::Good,
        Self::Bad,
        Self::Important,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Died => "died",
            Self::Question => "question",
            Self::Good => "good",
            Self::Bad => "bad",
            Self::Important => "important",
        }
    }

    #[must_use]
    pub const fn color(self) -> TrailColor {
        match self {
            Self::Died => TrailColor::Dark,
            Self::Question => TrailColor::Info,
            Self::Good => TrailColor::Success,
            Self::Bad => TrailColor::Danger,
            Self::Important => TrailColor::Warning,
        }
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Annotation {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "died" => Ok(Self::Died),
            "question" => Ok(Self::Question),
            "good" => Ok(Self::Good),
            "bad" => Ok(Self::Bad),
            "important" => Ok(Self::Important),
            _ => Err(()),
        }
    }
}

/// Presentation colour of a trail chip. `Light` means "nothing noted".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TrailColor {
    Dark,
    Info,
    Success,
    Danger,
    Warning,
    #[default]
    Light,
}

impl TrailColor {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Info => "info",
            Self::Success => "success",
            Self::Danger => "danger",
            Self::Warning => "warning",
            Self::Light => "light",
        }
    }

    #[must_use]
    pub const fn annotation(self) -> Option<Annotation> {
        match self {
            Self::Dark => Some(Annotation::Died),
            Self::Info => Some(Annotation::Question),
            Self::Success => Some(Annotation::Good),
            Self::Danger => Some(Annotation::Bad),
            Self::Warning => Some(Annotation::Important),
            Self::Light => None,
        }
    }
}

impl fmt::Display for TrailColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrailColor {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dark" => Ok(Self::Dark),
            "info" => Ok(Self::Info),
            "success" => Ok(Self::Success),
            "danger" => Ok(Self::Danger),
            "warning" => Ok(Self::Warning),
            "light" => Ok(Self::Light),
            _ => Err(()),
        }
    }
}

/// Colour for an annotation name; unknown or missing names have none.
#[must_use]
pub fn annotation_to_color(annotation: Option<&str>) -> Option<TrailColor> {
    annotation
        .and_then(|name| name.parse::<Annotation>().ok())
        .map(Annotation::color)
}

/// Annotation for a colour name; `light`, unknown or missing colours have none.
#[must_use]
pub fn color_to_annotation(color: Option<&str>) -> Option<Annotation> {
    color
        .and_then(|name| name.parse::<TrailColor>().ok())
        .and_then(TrailColor::annotation)
}

/// One visited chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrailEntry {
    pub number: u32,
    #[serde(default, deserialize_with = "lenient_annotation")]
    pub annotation: Option<Annotation>,
}

impl TrailEntry {
    #[must_use]
    pub const fn new(number: u32, annotation: Option<Annotation>) -> Self {
        Self { number, annotation }
    }

    #[must_use]
    pub const fn start() -> Self {
        Self::new(FIRST_CHAPTER, None)
    }
}

/// A trail entry in the form the map view draws it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColoredTrailEntry {
    pub number: u32,
    pub color: TrailColor,
}

impl From<TrailEntry> for ColoredTrailEntry {
    fn from(entry: TrailEntry) -> Self {
        Self {
            number: entry.number,
            color: entry.annotation.map(Annotation::color).unwrap_or_default(),
        }
    }
}

impl From<ColoredTrailEntry> for TrailEntry {
    fn from(entry: ColoredTrailEntry) -> Self {
        Self {
            number: entry.number,
            annotation: entry.color.annotation(),
        }
    }
}

/// Enforce the trail invariant: the first entry is always chapter 1 without
/// an annotation.
///
/// A leading chapter-1 entry is replaced by the canonical one and everything
/// after it is kept untouched. Otherwise the canonical entry is prepended and
/// every chapter-1 entry is dropped from the rest, preserving order.
#[must_use]
pub fn normalize_trail(entries: Vec<TrailEntry>) -> Vec<TrailEntry> {
    let mut entries = entries.into_iter();
    match entries.next() {
        None => vec![TrailEntry::start()],
        Some(first) if first.number == FIRST_CHAPTER => {
            std::iter::once(TrailEntry::start()).chain(entries).collect()
        }
        Some(first) => std::iter::once(TrailEntry::start())
            .chain(std::iter::once(first).chain(entries).filter(|e| e.number != FIRST_CHAPTER))
            .collect(),
    }
}

fn lenient_annotation<'de, D>(deserializer: D) -> Result<Option<Annotation>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|name| name.parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_annotations_roundtrip_through_colors() {
        for annotation in Annotation::ALL {
            let color = annotation_to_color(Some(annotation.as_str())).unwrap();
            assert_eq!(color_to_annotation(Some(color.as_str())), Some(annotation));
        }
    }

    #[test]
    fn unknown_values_map_to_nothing() {
        assert_eq!(annotation_to_color(None), None);
        assert_eq!(annotation_to_color(Some("spooky")), None);
        assert_eq!(color_to_annotation(None), None);
        assert_eq!(color_to_annotation(Some("light")), None);
        assert_eq!(color_to_annotation(Some("magenta")), None);
    }

    #[test]
    fn table_matches_palette() {
        assert_eq!(annotation_to_color(Some("died")), Some(TrailColor::Dark));
        assert_eq!(annotation_to_color(Some("question")), Some(TrailColor::Info));
        assert_eq!(annotation_to_color(Some("good")), Some(TrailColor::Success));
        assert_eq!(annotation_to_color(Some("bad")), Some(TrailColor::Danger));
        assert_eq!(annotation_to_color(Some("important")), Some(TrailColor::Warning));
    }

    #[test]
    fn entry_conversion_defaults_to_light() {
        let plain = ColoredTrailEntry::from(TrailEntry::new(42, None));
        assert_eq!(plain.color, TrailColor::Light);
        let back = TrailEntry::from(plain);
        assert_eq!(back, TrailEntry::new(42, None));

        let marked = ColoredTrailEntry::from(TrailEntry::new(7, Some(Annotation::Bad)));
        assert_eq!(marked.color, TrailColor::Danger);
        assert_eq!(TrailEntry::from(marked).annotation, Some(Annotation::Bad));
    }

    #[test]
    fn unknown_annotation_deserializes_as_none() {
        let entry: TrailEntry =
            serde_json::from_str(r#"{"number": 12, "annotation": "sparkly"}"#).unwrap();
        assert_eq!(entry, TrailEntry::new(12, None));
        let entry: TrailEntry = serde_json::from_str(r#"{"number": 3}"#).unwrap();
        assert_eq!(entry.annotation, None);
    }

    #[test]
    fn empty_trail_gets_start() {
        assert_eq!(normalize_trail(Vec::new()), vec![TrailEntry::start()]);
    }

    #[test]
    fn missing_start_is_prepended_and_duplicates_dropped() {
        let input = vec![
            TrailEntry::new(40, Some(Annotation::Good)),
            TrailEntry::new(1, Some(Annotation::Bad)),
            TrailEntry::new(12, None),
        ];
        assert_eq!(
            normalize_trail(input),
            vec![
                TrailEntry::start(),
                TrailEntry::new(40, Some(Annotation::Good)),
                TrailEntry::new(12, None),
            ]
        );
    }

    #[test]
    fn leading_start_is_replaced_and_later_ones_kept() {
        let input = vec![
            TrailEntry::new(1, Some(Annotation::Good)),
            TrailEntry::new(1, Some(Annotation::Bad)),
        ];
        assert_eq!(
            normalize_trail(input),
            vec![TrailEntry::start(), TrailEntry::new(1, Some(Annotation::Bad))]
        );
    }

    #[test]
    fn normalizing_twice_changes_nothing() {
        let input = vec![TrailEntry::new(9, None), TrailEntry::new(22, None)];
        let once = normalize_trail(input);
        assert_eq!(normalize_trail(once.clone()), once);
    }
}
