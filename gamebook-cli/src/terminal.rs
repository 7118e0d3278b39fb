//! Terminal stand-ins for audio and on-screen feedback.
use colored::{ColoredString, Colorize};
use gamebook_core::{
    Channel, DisplayEvent, GameState, GameStateManager, SoundCues, StatField, Subscription,
    TrailColor, TrailEntry, cues_enabled,
};
use std::cell::Cell;
use std::rc::Rc;

/// Prints cues while the sheet's sound flags allow them.
#[derive(Debug, Clone)]
pub struct TerminalCues {
    enabled: Rc<Cell<bool>>,
}

impl TerminalCues {
    pub fn new() -> Self {
        Self {
            enabled: Rc::new(Cell::new(true)),
        }
    }

    /// Track the mute flags of `store` from now on.
    pub fn follow(&self, store: &GameStateManager) -> Subscription {
        self.enabled.set(cues_enabled(&store.view().metadata));
        let enabled = self.enabled.clone();
        store.subscribe(move |state: &GameState| enabled.set(cues_enabled(&state.metadata)))
    }

    fn cue(&self, text: &str) {
        if self.enabled.get() {
            println!("{}", format!("♪ {text}").magenta());
        }
    }
}

impl Default for TerminalCues {
    fn default() -> Self {
        Self::new()
    }
}

impl SoundCues for TerminalCues {
    fn play_monster_damage_sound(&mut self) {
        self.cue("the blow lands");
    }

    fn play_player_damage_sound(&mut self) {
        self.cue("you are wounded");
    }

    fn play_lucky_sound(&mut self) {
        self.cue("fortune smiles");
    }
}

pub fn print_display_event(event: &DisplayEvent) {
    match event {
        DisplayEvent::DiceRolling | DisplayEvent::LuckTestCleared => {}
        DisplayEvent::DiceResult { hero, monster } => {
            let mut line = format!("🎲 you rolled {} + {} = {}", hero.roll1, hero.roll2, hero.sum);
            if let Some(monster) = monster {
                line.push_str(&format!(
                    ", the monster rolled {} + {} = {}",
                    monster.roll1, monster.roll2, monster.sum
                ));
            }
            println!("{line}");
        }
        DisplayEvent::LuckTest { lucky: true, .. } => println!("{}", "You are lucky!".green().bold()),
        DisplayEvent::LuckTest { lucky: false, .. } => println!("{}", "You are unlucky.".red().bold()),
        DisplayEvent::YouDied => println!("{}", "☠  YOU DIED".red().bold()),
        DisplayEvent::Badges(badges) => {
            let labels: Vec<String> = badges
                .iter()
                .map(|badge| {
                    let text = format!("{} {}", field_label(badge.field), badge.label());
                    if badge.delta < 0 {
                        text.red().to_string()
                    } else {
                        text.green().to_string()
                    }
                })
                .collect();
            println!("   {}", labels.join("  "));
        }
        DisplayEvent::Celebrate => println!("{}", "🎉 Victory!".yellow().bold()),
    }
}

const fn field_label(field: StatField) -> &'static str {
    match field {
        StatField::HeroSkill => "skill",
        StatField::HeroHealth => "health",
        StatField::HeroLuck => "luck",
        StatField::MaxLuck => "max luck",
        StatField::MonsterHealth => "monster health",
        StatField::Coins => "coins",
        StatField::Meals => "meals",
    }
}

fn paint(text: &str, color: TrailColor) -> ColoredString {
    match color {
        TrailColor::Dark => text.bright_black(),
        TrailColor::Info => text.cyan(),
        TrailColor::Success => text.green(),
        TrailColor::Danger => text.red(),
        TrailColor::Warning => text.yellow(),
        TrailColor::Light => text.normal(),
    }
}

pub fn format_trail(trail: &[TrailEntry]) -> String {
    trail
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let color = entry.annotation.map_or(TrailColor::Light, |a| a.color());
            let label = match entry.annotation {
                Some(annotation) => format!("[{index}] {} ({annotation})", entry.number),
                None => format!("[{index}] {}", entry.number),
            };
            paint(&label, color).to_string()
        })
        .collect::<Vec<_>>()
        .join(" → ")
}

fn stat(current: &str, max: Option<i32>) -> String {
    let current = if current.is_empty() { "-" } else { current };
    match max {
        Some(max) => format!("{current}/{max}"),
        None => current.to_string(),
    }
}

pub fn print_sheet(state: &GameState, playing: Channel) {
    let c = &state.character;
    let title = if state.metadata.book_name.is_empty() {
        "Adventure Sheet".to_string()
    } else {
        state.metadata.book_name.clone()
    };
    println!("{}", title.bright_cyan().bold());
    println!("{}", "=".repeat(30).cyan());
    let name = if c.name.is_empty() { "(unnamed)" } else { c.name.as_str() };
    let lock = if c.is_locked { " 🔒" } else { "" };
    println!("{}{lock}", name.bold());
    println!(
        "  skill {}  health {}  luck {}",
        stat(&c.skill, c.max_skill),
        stat(&c.health, c.max_health),
        stat(&c.luck, c.max_luck)
    );
    let consumables = &state.consumables;
    let potion = if consumables.potion_type.as_str().is_empty() {
        "none".to_string()
    } else if consumables.potion_used {
        format!("{} (used)", consumables.potion_type)
    } else {
        consumables.potion_type.to_string()
    };
    println!(
        "  coins {}  meals {}  potion {potion}",
        consumables.coins, consumables.meals
    );

    if !state.inventory.is_empty() {
        println!("{}", "Inventory".yellow().bold());
        for item in state.inventory.lines() {
            println!("  • {item}");
        }
    }

    let fight = &state.fight;
    if !fight.monster_creature.is_empty() || fight.fight_result.is_some() {
        println!("{}", "Fight".red().bold());
        println!(
            "  {} skill {} health {}",
            if fight.monster_creature.is_empty() { "monster" } else { fight.monster_creature.as_str() },
            stat(&fight.monster_skill, None),
            stat(&fight.monster_health, None)
        );
        if let Some(result) = &fight.fight_result {
            println!(
                "  last round: {} ({} vs {})",
                result.kind, result.hero_total, result.monster_total
            );
        }
        if let Some(outcome) = fight.fight_outcome {
            println!("  outcome: {outcome}");
        }
        if fight.show_use_luck && !fight.luck_used {
            println!("  {}", "you may test your luck".italic());
        }
    }
    if !fight.graveyard.is_empty() {
        println!("{} {}", "Graveyard:".bright_black(), fight.graveyard.replace('\n', ", "));
    }

    println!("{} {}", "Trail:".bold(), format_trail(&state.trail));
    if !state.notes.is_empty() {
        println!("{}", "Notes".bold());
        println!("  {}", state.notes.replace('\n', "\n  "));
    }
    if state.metadata.all_sounds_muted {
        println!("{}", "♪ muted".bright_black());
    } else {
        let url = state.sounds.channel(playing).url.as_str();
        let url = if url.is_empty() { "(no track)" } else { url };
        println!("{} {playing}: {url}", "♪".magenta());
    }
}
