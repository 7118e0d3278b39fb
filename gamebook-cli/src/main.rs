mod fs_files;
mod fs_storage;
mod terminal;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use gamebook_core::{
    Annotation, Channel, PotionType, SessionHost, SheetConfig, SheetSession, SystemClock,
    can_test_luck, parse_stat_or_zero,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use fs_files::DirectoryFiles;
use fs_storage::JsonFileStorage;
use terminal::{TerminalCues, format_trail, print_display_event, print_sheet};

#[derive(Debug, Parser)]
#[command(name = "gamebook", version)]
#[command(about = "Companion adventure sheet for solo gamebooks")]
struct Args {
    /// Directory holding the autosaved sheet and exports
    #[arg(long, global = true, default_value = ".gamebook")]
    data_dir: PathBuf,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Fixed dice seed (overrides the config file)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the adventure sheet
    Show,
    /// Start a new sheet from defaults
    Reset,
    /// Name the book being played
    Book { name: String },
    /// Edit the hero
    Character {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        skill: Option<String>,
        #[arg(long)]
        health: Option<String>,
        #[arg(long)]
        luck: Option<String>,
    },
    /// Freeze current stats as their maximums
    Lock,
    /// Drop the stat maximums
    Unlock,
    /// Set coins and meals
    Supplies {
        #[arg(long)]
        coins: Option<String>,
        #[arg(long)]
        meals: Option<String>,
    },
    /// Choose the starting potion
    Potion { choice: PotionArg },
    /// Drink the chosen potion
    Drink,
    /// Buy an item
    Buy { item: String, cost: String },
    /// Eat a meal
    Eat,
    /// Add a line to the inventory
    Item { text: String },
    /// Add a line to the notes
    Note { text: String },
    /// Start a new encounter
    Monster {
        /// Creature name; omitted keeps the current one
        creature: Option<String>,
        #[arg(long)]
        skill: Option<String>,
        #[arg(long)]
        health: Option<String>,
    },
    /// Fight one attack round
    Fight,
    /// Test luck on the last attack round
    Luck,
    /// Test luck outside combat
    TestLuck,
    /// Record a visited chapter
    Chapter {
        number: u32,
        #[arg(long, value_enum)]
        annotate: Option<AnnotationArg>,
    },
    /// Annotate a trail entry by index
    Annotate {
        index: usize,
        #[arg(value_enum)]
        annotation: AnnotationArg,
    },
    /// Remove a trail entry by index
    Backtrack { index: usize },
    /// Configure an audio channel
    Sound {
        #[arg(value_enum)]
        channel: ChannelArg,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        volume: Option<f64>,
    },
    /// Mute or unmute everything
    Mute {
        #[arg(value_enum)]
        state: Switch,
    },
    /// Enable or disable action sound cues
    ActionSounds {
        #[arg(value_enum)]
        state: Switch,
    },
    /// Export the sheet as YAML
    Export {
        #[arg(long)]
        book: Option<String>,
        #[arg(long)]
        name: Option<String>,
    },
    /// Import a YAML export (the newest one when no path is given)
    Import { path: Option<PathBuf> },
    /// List exports
    Exports,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PotionArg {
    Skill,
    Health,
    Luck,
}

impl From<PotionArg> for PotionType {
    fn from(arg: PotionArg) -> Self {
        match arg {
            PotionArg::Skill => Self::Skill,
            PotionArg::Health => Self::Health,
            PotionArg::Luck => Self::Luck,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ChannelArg {
    Ambience,
    Battle,
    Victory,
    Defeat,
}

impl From<ChannelArg> for Channel {
    fn from(arg: ChannelArg) -> Self {
        match arg {
            ChannelArg::Ambience => Self::Ambience,
            ChannelArg::Battle => Self::Battle,
            ChannelArg::Victory => Self::Victory,
            ChannelArg::Defeat => Self::Defeat,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AnnotationArg {
    None,
    Died,
    Question,
    Good,
    Bad,
    Important,
}

impl From<AnnotationArg> for Option<Annotation> {
    fn from(arg: AnnotationArg) -> Self {
        match arg {
            AnnotationArg::None => None,
            AnnotationArg::Died => Some(Annotation::Died),
            AnnotationArg::Question => Some(Annotation::Question),
            AnnotationArg::Good => Some(Annotation::Good),
            AnnotationArg::Bad => Some(Annotation::Bad),
            AnnotationArg::Important => Some(Annotation::Important),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Switch {
    On,
    Off,
}

impl Switch {
    const fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(args.config.as_deref())?.with_seed(args.seed);
    fs::create_dir_all(&args.data_dir)
        .with_context(|| format!("creating data directory {}", args.data_dir.display()))?;

    let selection = import_selection(&args)?;
    let cues = TerminalCues::new();
    let host = SessionHost {
        storage: Box::new(JsonFileStorage::in_dir(&args.data_dir)),
        files: Box::new(DirectoryFiles::in_dir(&args.data_dir).with_selection(selection)),
        sounds: Box::new(cues.clone()),
        clock: Rc::new(SystemClock),
    };
    let mut session = SheetSession::from_config(&config, host);
    if session.restore() {
        log::debug!("restored sheet from {}", args.data_dir.display());
    }
    let _cue_gate = cues.follow(session.store());
    let _feedback = session.master().subscribe_display(print_display_event);

    let outcome = run(&mut session, args.command, &args.data_dir).await;
    session.close();
    outcome
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn load_config(path: Option<&Path>) -> Result<SheetConfig> {
    let Some(path) = path else {
        return Ok(SheetConfig::default_config());
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
    SheetConfig::from_json(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn import_selection(args: &Args) -> Result<Option<PathBuf>> {
    let Command::Import { path } = &args.command else {
        return Ok(None);
    };
    if let Some(path) = path {
        return Ok(Some(path.clone()));
    }
    let exports = DirectoryFiles::in_dir(&args.data_dir)
        .list()
        .context("listing exports")?;
    Ok(exports.into_iter().next())
}

async fn run(session: &mut SheetSession, command: Command, data_dir: &Path) -> Result<()> {
    match command {
        Command::Show => {}
        Command::Reset => {
            session.store_mut().reset();
            println!("{}", "Fresh sheet.".green());
        }
        Command::Book { name } => session.store_mut().set_book_name(name),
        Command::Character {
            name,
            skill,
            health,
            luck,
        } => {
            let store = session.store_mut();
            if let Some(name) = name {
                store.set_character_name(name);
            }
            if let Some(skill) = skill {
                store.set_skill(skill);
            }
            if let Some(health) = health {
                store.set_health(health);
            }
            if let Some(luck) = luck {
                store.set_luck(luck);
            }
        }
        Command::Lock => session.store_mut().lock_character(),
        Command::Unlock => session.store_mut().unlock_character(),
        Command::Supplies { coins, meals } => {
            let store = session.store_mut();
            if let Some(coins) = coins {
                store.set_coins(coins);
            }
            if let Some(meals) = meals {
                store.set_meals(meals);
            }
        }
        Command::Potion { choice } => session.store_mut().set_potion_type(PotionType::from(choice)),
        Command::Drink => {
            let report = session.action_use_potion()?;
            println!("You drink the potion of {}.", report.potion);
        }
        Command::Buy { item, cost } => {
            let store = session.store_mut();
            store.set_transaction_object(item);
            store.set_transaction_cost(cost);
            let report = session.action_purchase()?;
            println!(
                "Bought {} for {} coins, {} left.",
                report.item.bold(),
                report.cost,
                report.coins_left
            );
        }
        Command::Eat => match session.action_eat_meal() {
            Some(meal) => println!("You eat. {} meals left.", meal.meals_left),
            None => bail!("no meals left"),
        },
        Command::Item { text } => {
            let store = session.store_mut();
            let mut inventory = store.inventory();
            if !inventory.is_empty() {
                inventory.push('\n');
            }
            inventory.push_str(&text);
            store.set_inventory(inventory);
        }
        Command::Note { text } => {
            let store = session.store_mut();
            let mut notes = store.notes();
            if !notes.is_empty() {
                notes.push('\n');
            }
            notes.push_str(&text);
            store.set_notes(notes);
        }
        Command::Monster {
            creature,
            skill,
            health,
        } => {
            let store = session.store_mut();
            match creature {
                Some(name) => store.clear_fight_results(name),
                None => store.clear_fight_results(true),
            }
            if let Some(skill) = skill {
                store.set_monster_skill(skill);
            }
            if let Some(health) = health {
                store.set_monster_health(health);
            }
        }
        Command::Fight => {
            ensure_fight_open(session)?;
            let round = session.action_fight();
            println!(
                "{} ({} vs {})",
                round.outcome.to_string().bold(),
                round.hero_total,
                round.monster_total
            );
        }
        Command::Luck => {
            let fight = &session.store().view().fight;
            if !fight.show_use_luck || fight.luck_used {
                bail!("there is no round to test luck on");
            }
            ensure_luck_left(session)?;
            session.action_use_luck()?;
        }
        Command::TestLuck => {
            ensure_luck_left(session)?;
            session.action_test_luck();
        }
        Command::Chapter { number, annotate } => {
            let store = session.store_mut();
            store.add_trail_entry(number);
            if let Some(annotation) = annotate {
                let last = store.trail().len() - 1;
                store.set_trail_annotation(last, annotation.into());
            }
            println!("{}", format_trail(&store.trail()));
        }
        Command::Annotate { index, annotation } => {
            if !session
                .store_mut()
                .set_trail_annotation(index, annotation.into())
            {
                bail!("trail entry {index} cannot be annotated");
            }
        }
        Command::Backtrack { index } => {
            if !session.store_mut().remove_trail_entry(index) {
                bail!("trail entry {index} cannot be removed");
            }
        }
        Command::Sound {
            channel,
            url,
            volume,
        } => {
            let store = session.store_mut();
            let channel = Channel::from(channel);
            if let Some(url) = url {
                store.set_sound_url(channel, url);
            }
            if let Some(volume) = volume {
                store.set_sound_volume(channel, volume);
            }
            println!(
                "{channel}: {} at {}",
                store.sound_url(channel),
                store.sound_volume(channel)
            );
        }
        Command::Mute { state } => session.store_mut().set_all_sounds_muted(state.is_on()),
        Command::ActionSounds { state } => {
            session.store_mut().set_action_sounds_enabled(state.is_on());
        }
        Command::Export { book, name } => {
            let store = session.store();
            let book = book.unwrap_or_else(|| store.book_name());
            let name = name.unwrap_or_else(|| store.character_name());
            store.save_to_file(&book, &name).context("exporting sheet")?;
            println!("{}", "Sheet exported.".green());
        }
        Command::Import { .. } => {
            if !session.store_mut().load_from_file().await {
                bail!("nothing was imported");
            }
            println!("{}", "Sheet imported.".green());
        }
        Command::Exports => {
            for path in DirectoryFiles::in_dir(data_dir).list()? {
                println!("{}", path.display());
            }
            return Ok(());
        }
    }

    print_sheet(session.store().view(), session.ambient_channel());
    Ok(())
}

fn ensure_fight_open(session: &SheetSession) -> Result<()> {
    let state = session.store().view();
    if state.fight.fight_outcome.is_some() {
        bail!("this fight is over; start a new one with `gamebook monster`");
    }
    if parse_stat_or_zero(&state.fight.monster_health) <= 0 {
        bail!("no monster to fight");
    }
    if parse_stat_or_zero(&state.character.health) <= 0 {
        bail!("you are in no state to fight");
    }
    Ok(())
}

fn ensure_luck_left(session: &SheetSession) -> Result<()> {
    if !can_test_luck(parse_stat_or_zero(&session.store().luck())) {
        bail!("you have no luck left to test");
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn scratch_dir(label: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default();
    let dir = std::env::temp_dir().join(format!(
        "gamebook-{label}-{}-{nanos}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).unwrap();
    dir
}
