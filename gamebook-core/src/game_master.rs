//! Rule orchestration: roll, decide, write, give feedback.
//!
//! The game master trusts its caller for *when* an action is allowed (an
//! engaged monster, numeric stats, luck left to test). It only fails on the
//! preconditions listed in [`RulesError`].
use crate::dice::{DiceRoll, DiceRoller};
use crate::display::{Badges, DisplayCoordinator, DisplayEvent, StatField, badges_for};
use crate::manager::GameStateManager;
use crate::numbers::{format_stat, parse_stat_or_zero};
use crate::observer::Subscription;
use crate::rules::{
    CombatOutcome, FightOutcome, MEAL_HEALING, apply_floored, calculate_damage,
    calculate_luck_effect, capped_gain, check_fight_end, is_lucky, resolve_combat,
};
use crate::sound::{SoundCue, SoundCues, ambient_channel};
use crate::state::{Channel, FightResult, PotionType};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RulesError {
    #[error("there is no attack round to test luck against")]
    NoFightResult,
    #[error("stats must be locked before drinking a potion")]
    CharacterUnlocked,
    #[error("no potion selected")]
    NoPotion,
    #[error("the potion has already been drunk")]
    PotionUsed,
    #[error("nothing to buy")]
    NothingToBuy,
    #[error("costs {cost} coins but only {coins} are left")]
    InsufficientCoins { cost: i32, coins: i32 },
}

/// What one attack round did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FightReport {
    pub outcome: CombatOutcome,
    pub hero_total: i32,
    pub monster_total: i32,
    pub hero_rolls: DiceRoll,
    pub monster_rolls: DiceRoll,
    pub badges: Badges,
    pub fight_ended: Option<FightOutcome>,
    pub show_use_luck: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LuckReport {
    pub roll1: u8,
    pub roll2: u8,
    pub is_lucky: bool,
    pub badges: Badges,
    pub fight_ended: Option<FightOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LuckTestReport {
    pub roll: DiceRoll,
    pub is_lucky: bool,
    pub badges: Badges,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealReport {
    pub healed: i32,
    pub meals_left: i32,
    pub badges: Badges,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PotionReport {
    pub potion: PotionType,
    pub badges: Badges,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseReport {
    pub item: String,
    pub cost: i32,
    pub coins_left: i32,
    pub badges: Badges,
}

pub struct GameMaster {
    dice: Box<dyn DiceRoller>,
    display: DisplayCoordinator,
}

impl std::fmt::Debug for GameMaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameMaster")
            .field("display", &self.display)
            .finish_non_exhaustive()
    }
}

impl GameMaster {
    #[must_use]
    pub fn new(dice: Box<dyn DiceRoller>, sounds: Box<dyn SoundCues>) -> Self {
        Self {
            dice,
            display: DisplayCoordinator::new(sounds),
        }
    }

    pub fn subscribe_display(
        &self,
        listener: impl FnMut(&DisplayEvent) + 'static,
    ) -> Subscription {
        self.display.subscribe(listener)
    }

    #[must_use]
    pub const fn display(&self) -> &DisplayCoordinator {
        &self.display
    }

    /// Channel the host should be playing right now.
    #[must_use]
    pub fn ambient_channel(&self, store: &GameStateManager) -> Channel {
        ambient_channel(store.view())
    }

    /// Roll one attack round between the hero and the engaged monster.
    pub fn action_fight(&mut self, store: &mut GameStateManager) -> FightReport {
        store.set_is_fighting(true);
        self.display.show_dice_rolling();

        let hero_rolls = self.dice.roll_dice_two();
        let monster_rolls = self.dice.roll_dice_two();

        let view = store.view();
        let hero_total = hero_rolls
            .total()
            .saturating_add(parse_stat_or_zero(&view.character.skill));
        let monster_total = monster_rolls
            .total()
            .saturating_add(parse_stat_or_zero(&view.fight.monster_skill));
        let outcome = resolve_combat(hero_total, monster_total);

        let hero_health = parse_stat_or_zero(&view.character.health);
        let monster_health = parse_stat_or_zero(&view.fight.monster_health);
        let damage = calculate_damage(outcome);
        let (new_hero, new_monster) = match outcome {
            CombatOutcome::HeroWins => (hero_health, apply_floored(monster_health, -damage)),
            CombatOutcome::MonsterWins => (apply_floored(hero_health, -damage), monster_health),
            CombatOutcome::Tie => (hero_health, monster_health),
        };

        store.update(|state| {
            state.fight.hero_dice_rolls = Some(hero_rolls);
            state.fight.monster_dice_rolls = Some(monster_rolls);
            if new_hero != hero_health {
                state.character.health = format_stat(new_hero);
            }
            if new_monster != monster_health {
                state.fight.monster_health = format_stat(new_monster);
            }
        });

        let badges = badges_for(&[
            (StatField::HeroHealth, new_hero.saturating_sub(hero_health)),
            (StatField::MonsterHealth, new_monster.saturating_sub(monster_health)),
        ]);
        self.display.show_dice_result(hero_rolls, Some(monster_rolls));
        self.display.show_badges(&badges);
        match outcome {
            CombatOutcome::HeroWins => self.display.play(SoundCue::MonsterDamage),
            CombatOutcome::MonsterWins => self.display.play(SoundCue::PlayerDamage),
            CombatOutcome::Tie => {}
        }

        let fight_ended = check_fight_end(new_hero, new_monster);
        let show_use_luck = fight_ended.is_none() && outcome.is_decisive();
        match fight_ended {
            Some(ending) => self.end_fight(store, ending),
            None => store.update(|state| {
                state.fight.show_use_luck = show_use_luck;
                state.fight.fight_result = Some(FightResult {
                    kind: outcome,
                    message: outcome.message_key().to_string(),
                    hero_total,
                    monster_total,
                });
            }),
        }

        // a new round is a new chance to test luck
        store.update(|state| {
            state.fight.luck_used = false;
            state.fight.is_fighting = false;
        });

        log::debug!("attack round {hero_total} vs {monster_total}: {outcome}");
        FightReport {
            outcome,
            hero_total,
            monster_total,
            hero_rolls,
            monster_rolls,
            badges,
            fight_ended,
            show_use_luck,
        }
    }

    /// Test luck against the last attack round.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::NoFightResult`] when no round has been fought.
    pub fn action_use_luck(&mut self, store: &mut GameStateManager) -> Result<LuckReport, RulesError> {
        let Some(last_round) = store.view().fight.fight_result.clone() else {
            return Err(RulesError::NoFightResult);
        };
        self.display.show_dice_rolling();
        let roll = self.dice.roll_dice_two();

        let view = store.view();
        let luck = parse_stat_or_zero(&view.character.luck);
        let lucky = is_lucky(roll.total(), luck);
        let hero_health = parse_stat_or_zero(&view.character.health);
        let monster_health = parse_stat_or_zero(&view.fight.monster_health);
        let effect = calculate_luck_effect(
            last_round.kind == CombatOutcome::HeroWins,
            lucky,
            hero_health,
            view.character.max_health,
        );
        let new_hero = apply_floored(hero_health, effect.hero_health_delta);
        let new_monster = apply_floored(monster_health, effect.monster_health_delta);
        let new_luck = apply_floored(luck, -1);

        store.update(|state| {
            if new_hero != hero_health {
                state.character.health = format_stat(new_hero);
            }
            if new_monster != monster_health {
                state.fight.monster_health = format_stat(new_monster);
            }
            state.character.luck = format_stat(new_luck);
            state.fight.luck_used = true;
        });

        let badges = badges_for(&[
            (StatField::HeroHealth, new_hero.saturating_sub(hero_health)),
            (StatField::MonsterHealth, new_monster.saturating_sub(monster_health)),
            (StatField::HeroLuck, new_luck.saturating_sub(luck)),
        ]);
        self.display.show_dice_result(roll, None);
        self.display.show_luck_result(lucky);
        self.display.show_badges(&badges);
        if effect.monster_health_delta < 0 {
            self.display.play(SoundCue::MonsterDamage);
        }
        if effect.hero_health_delta < 0 {
            self.display.play(SoundCue::PlayerDamage);
        }

        let fight_ended = check_fight_end(new_hero, new_monster);
        if let Some(ending) = fight_ended {
            self.end_fight(store, ending);
        }

        Ok(LuckReport {
            roll1: roll.roll1,
            roll2: roll.roll2,
            is_lucky: lucky,
            badges,
            fight_ended,
        })
    }

    /// Test luck outside combat. Costs one luck point either way.
    pub fn action_test_luck(&mut self, store: &mut GameStateManager) -> LuckTestReport {
        self.display.show_dice_rolling();
        let roll = self.dice.roll_dice_two();
        let luck = parse_stat_or_zero(&store.view().character.luck);
        let lucky = is_lucky(roll.total(), luck);
        let new_luck = apply_floored(luck, -1);
        store.update(|state| state.character.luck = format_stat(new_luck));

        let badges = badges_for(&[(StatField::HeroLuck, new_luck.saturating_sub(luck))]);
        self.display.show_dice_result(roll, None);
        self.display.show_luck_result(lucky);
        self.display.show_badges(&badges);
        if lucky {
            self.display.play(SoundCue::Lucky);
        }
        LuckTestReport {
            roll,
            is_lucky: lucky,
            badges,
        }
    }

    /// Eat one meal. `None` when the pack is empty.
    pub fn action_eat_meal(&mut self, store: &mut GameStateManager) -> Option<MealReport> {
        let view = store.view();
        let meals = parse_stat_or_zero(&view.consumables.meals);
        if meals <= 0 {
            return None;
        }
        let health = parse_stat_or_zero(&view.character.health);
        let healed = capped_gain(health, MEAL_HEALING, view.character.max_health);
        let meals_left = meals.saturating_sub(1);
        store.update(|state| {
            state.consumables.meals = format_stat(meals_left);
            state.character.health = format_stat(health.saturating_add(healed));
        });

        let badges = badges_for(&[(StatField::Meals, -1), (StatField::HeroHealth, healed)]);
        self.display.show_badges(&badges);
        Some(MealReport {
            healed,
            meals_left,
            badges,
        })
    }

    /// Drink the selected potion.
    ///
    /// # Errors
    ///
    /// Fails when stats are not locked, no potion is selected, or the potion
    /// was already drunk.
    pub fn action_use_potion(
        &mut self,
        store: &mut GameStateManager,
    ) -> Result<PotionReport, RulesError> {
        let view = store.view();
        let character = &view.character;
        if !character.is_locked {
            return Err(RulesError::CharacterUnlocked);
        }
        let potion = view.consumables.potion_type;
        if potion == PotionType::None {
            return Err(RulesError::NoPotion);
        }
        if view.consumables.potion_used {
            return Err(RulesError::PotionUsed);
        }

        let skill = parse_stat_or_zero(&character.skill);
        let health = parse_stat_or_zero(&character.health);
        let luck = parse_stat_or_zero(&character.luck);
        let (max_skill, max_health, max_luck) =
            (character.max_skill, character.max_health, character.max_luck);
        let changes = match potion {
            PotionType::Skill => {
                let restored = max_skill.unwrap_or(skill);
                store.update(|state| state.character.skill = format_stat(restored));
                vec![(StatField::HeroSkill, restored.saturating_sub(skill))]
            }
            PotionType::Health => {
                let restored = max_health.unwrap_or(health);
                store.update(|state| state.character.health = format_stat(restored));
                vec![(StatField::HeroHealth, restored.saturating_sub(health))]
            }
            PotionType::Luck => {
                let old_max = max_luck.unwrap_or(luck);
                let new_max = old_max.saturating_add(1);
                store.update(|state| {
                    state.character.max_luck = Some(new_max);
                    state.character.luck = format_stat(new_max);
                });
                vec![
                    (StatField::MaxLuck, new_max.saturating_sub(old_max)),
                    (StatField::HeroLuck, new_max.saturating_sub(luck)),
                ]
            }
            PotionType::None => Vec::new(),
        };
        store.set_potion_used(true);

        let badges = badges_for(&changes);
        self.display.show_badges(&badges);
        Ok(PotionReport { potion, badges })
    }

    /// Buy the drafted item.
    ///
    /// # Errors
    ///
    /// Fails when no item is drafted or the hero cannot afford it.
    pub fn action_purchase(
        &mut self,
        store: &mut GameStateManager,
    ) -> Result<PurchaseReport, RulesError> {
        let view = store.view();
        let item = view.consumables.transaction_object.trim().to_string();
        if item.is_empty() {
            return Err(RulesError::NothingToBuy);
        }
        let cost = parse_stat_or_zero(&view.consumables.transaction_cost).max(0);
        let coins = parse_stat_or_zero(&view.consumables.coins);
        if cost > coins {
            return Err(RulesError::InsufficientCoins { cost, coins });
        }
        let coins_left = coins.saturating_sub(cost);
        let bought = item.clone();
        store.update(|state| {
            state.consumables.coins = format_stat(coins_left);
            state.consumables.transaction_object.clear();
            state.consumables.transaction_cost.clear();
            if !state.inventory.is_empty() && !state.inventory.ends_with('\n') {
                state.inventory.push('\n');
            }
            state.inventory.push_str(&bought);
        });

        let badges = badges_for(&[(StatField::Coins, -cost)]);
        self.display.show_badges(&badges);
        Ok(PurchaseReport {
            item,
            cost,
            coins_left,
            badges,
        })
    }

    fn end_fight(&mut self, store: &mut GameStateManager, ending: FightOutcome) {
        match ending {
            FightOutcome::Won => {
                let creature = store.view().fight.monster_creature.clone();
                store.append_to_graveyard(&creature);
                self.display.celebrate();
            }
            FightOutcome::Lost => self.display.show_you_died(),
        }
        store.update(|state| {
            state.fight.fight_outcome = Some(ending);
            state.fight.show_use_luck = false;
        });
        log::info!("fight {ending}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autosave::ManualClock;
    use crate::config::SheetConfig;
    use crate::dice::ScriptedDice;
    use crate::sound::CueLog;
    use crate::storage::MemoryStorage;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn store() -> GameStateManager {
        GameStateManager::new(
            Box::new(MemoryStorage::new()),
            Rc::new(ManualClock::default()),
            &SheetConfig::default(),
        )
    }

    fn master(faces: &[u8]) -> (GameMaster, CueLog) {
        let cues = CueLog::new();
        let master = GameMaster::new(
            Box::new(ScriptedDice::new(faces.iter().copied())),
            Box::new(cues.clone()),
        );
        (master, cues)
    }

    fn hero(store: &mut GameStateManager, skill: &str, health: &str, luck: &str) {
        store.set_skill(skill);
        store.set_health(health);
        store.set_luck(luck);
    }

    fn monster(store: &mut GameStateManager, name: &str, skill: &str, health: &str) {
        store.set_monster_creature(name);
        store.set_monster_skill(skill);
        store.set_monster_health(health);
    }

    #[test]
    fn hero_wins_round() {
        let mut store = store();
        hero(&mut store, "10", "20", "5");
        monster(&mut store, "Goblin", "8", "15");
        let (mut gm, cues) = master(&[3, 4, 1, 1]);

        let report = gm.action_fight(&mut store);
        assert_eq!(report.hero_total, 17);
        assert_eq!(report.monster_total, 10);
        assert_eq!(report.outcome, CombatOutcome::HeroWins);
        assert!(report.show_use_luck);
        assert!(report.fight_ended.is_none());
        assert_eq!(store.monster_health(), "13");
        assert_eq!(store.health(), "20");
        assert_eq!(store.hero_dice_rolls(), Some(DiceRoll::new(3, 4)));
        assert_eq!(store.monster_dice_rolls(), Some(DiceRoll::new(1, 1)));
        assert_eq!(cues.played(), vec![SoundCue::MonsterDamage]);
        assert!(!store.is_fighting());
        assert!(!store.luck_used());
        let result = store.fight_result().unwrap();
        assert_eq!(result.kind, CombatOutcome::HeroWins);
        assert_eq!(result.message, "fight.heroWins");
    }

    #[test]
    fn tie_deals_no_damage() {
        let mut store = store();
        hero(&mut store, "8", "12", "5");
        monster(&mut store, "Rat", "8", "4");
        store.set_show_use_luck(true);
        let (mut gm, cues) = master(&[3, 3, 2, 4]);

        let report = gm.action_fight(&mut store);
        assert_eq!(report.outcome, CombatOutcome::Tie);
        assert!(report.badges.is_empty());
        assert!(!report.show_use_luck);
        assert!(!store.show_use_luck());
        assert_eq!(store.health(), "12");
        assert_eq!(store.monster_health(), "4");
        assert!(cues.played().is_empty());
    }

    #[test]
    fn monster_hit_floors_hero_and_ends_fight() {
        let mut store = store();
        hero(&mut store, "1", "1", "5");
        monster(&mut store, "Troll", "12", "10");
        let (mut gm, cues) = master(&[1, 1, 6, 6]);
        let died = Rc::new(RefCell::new(false));
        let flag = died.clone();
        let _sub = gm.subscribe_display(move |event| {
            if *event == DisplayEvent::YouDied {
                *flag.borrow_mut() = true;
            }
        });

        let report = gm.action_fight(&mut store);
        assert_eq!(report.fight_ended, Some(FightOutcome::Lost));
        assert_eq!(store.health(), "0");
        assert_eq!(store.fight_outcome(), Some(FightOutcome::Lost));
        assert!(!store.show_use_luck());
        assert!(*died.borrow());
        assert_eq!(cues.played(), vec![SoundCue::PlayerDamage]);
        assert_eq!(gm.ambient_channel(&store), Channel::Defeat);
    }

    #[test]
    fn killing_blow_buries_the_creature() {
        let mut store = store();
        hero(&mut store, "10", "20", "5");
        monster(&mut store, "Goblin", "5", "2");
        store.set_graveyard("Rat");
        let (mut gm, _) = master(&[6, 6, 1, 1]);

        let report = gm.action_fight(&mut store);
        assert_eq!(report.fight_ended, Some(FightOutcome::Won));
        assert!(!report.show_use_luck);
        assert_eq!(store.monster_health(), "0");
        assert_eq!(store.graveyard(), "Rat\nGoblin");
        assert_eq!(store.fight_outcome(), Some(FightOutcome::Won));
        assert_eq!(gm.ambient_channel(&store), Channel::Victory);
    }

    #[test]
    fn use_luck_requires_a_round() {
        let mut store = store();
        let (mut gm, _) = master(&[1]);
        assert_eq!(
            gm.action_use_luck(&mut store).unwrap_err(),
            RulesError::NoFightResult
        );
    }

    #[test]
    fn unlucky_after_losing_round_hurts_more() {
        let mut store = store();
        hero(&mut store, "6", "10", "3");
        monster(&mut store, "Orc", "10", "8");
        let (mut gm, cues) = master(&[1, 1, 5, 5, 6, 6]);

        gm.action_fight(&mut store);
        assert_eq!(store.health(), "8");
        let luck = gm.action_use_luck(&mut store).unwrap();
        assert!(!luck.is_lucky);
        assert_eq!(store.health(), "7");
        assert_eq!(store.luck(), "2");
        assert!(store.luck_used());
        assert_eq!(
            cues.played(),
            vec![SoundCue::PlayerDamage, SoundCue::PlayerDamage]
        );
        assert_eq!(luck.badges.len(), 2);
    }

    #[test]
    fn lucky_after_losing_round_heals_within_max() {
        let mut store = store();
        hero(&mut store, "6", "20", "12");
        store.lock_character();
        monster(&mut store, "Orc", "10", "8");
        let (mut gm, _) = master(&[1, 1, 5, 5, 1, 1]);

        gm.action_fight(&mut store);
        assert_eq!(store.health(), "18");
        let luck = gm.action_use_luck(&mut store).unwrap();
        assert!(luck.is_lucky);
        assert_eq!(store.health(), "19");
        assert_eq!(store.luck(), "11");
    }

    #[test]
    fn standalone_luck_test_costs_a_point() {
        let mut store = store();
        store.set_luck("1");
        let (mut gm, cues) = master(&[1, 1, 1, 1]);
        assert!(!gm.action_test_luck(&mut store).is_lucky);
        assert_eq!(store.luck(), "0");
        let report = gm.action_test_luck(&mut store);
        assert!(!report.is_lucky);
        assert_eq!(store.luck(), "0");
        assert!(report.badges.is_empty());
        assert!(cues.played().is_empty());

        store.set_luck("9");
        assert!(gm.action_test_luck(&mut store).is_lucky);
        assert_eq!(cues.played(), vec![SoundCue::Lucky]);
    }

    #[test]
    fn meals_heal_up_to_max() {
        let mut store = store();
        hero(&mut store, "10", "18", "5");
        store.lock_character();
        store.set_health("17");
        store.set_meals("1");
        let (mut gm, _) = master(&[1]);

        let meal = gm.action_eat_meal(&mut store).unwrap();
        assert_eq!(meal.healed, 1);
        assert_eq!(store.health(), "18");
        assert_eq!(store.meals(), "0");
        assert!(gm.action_eat_meal(&mut store).is_none());
    }

    #[test]
    fn potions_need_lock_selection_and_one_use() {
        let mut store = store();
        hero(&mut store, "10", "20", "9");
        let (mut gm, _) = master(&[1]);
        assert_eq!(
            gm.action_use_potion(&mut store).unwrap_err(),
            RulesError::CharacterUnlocked
        );
        store.lock_character();
        assert_eq!(gm.action_use_potion(&mut store).unwrap_err(), RulesError::NoPotion);

        store.set_potion_type(PotionType::Luck);
        store.set_luck("4");
        let report = gm.action_use_potion(&mut store).unwrap();
        assert_eq!(report.potion, PotionType::Luck);
        assert_eq!(store.max_luck(), Some(10));
        assert_eq!(store.luck(), "10");
        assert!(store.potion_used());
        assert_eq!(gm.action_use_potion(&mut store).unwrap_err(), RulesError::PotionUsed);
    }

    #[test]
    fn health_potion_restores_to_max() {
        let mut store = store();
        hero(&mut store, "10", "20", "9");
        store.lock_character();
        store.set_health("6");
        store.set_potion_type(PotionType::Health);
        let (mut gm, _) = master(&[1]);
        let report = gm.action_use_potion(&mut store).unwrap();
        assert_eq!(store.health(), "20");
        assert_eq!(report.badges[0].delta, 14);
    }

    #[test]
    fn purchases_spend_coins_and_fill_inventory() {
        let mut store = store();
        store.set_coins("10");
        store.set_inventory("Sword");
        store.set_transaction_object("Lantern");
        store.set_transaction_cost("4");
        let (mut gm, _) = master(&[1]);

        let report = gm.action_purchase(&mut store).unwrap();
        assert_eq!(report.coins_left, 6);
        assert_eq!(store.coins(), "6");
        assert_eq!(store.inventory(), "Sword\nLantern");
        assert_eq!(store.transaction_object(), "");
        assert_eq!(store.transaction_cost(), "");

        store.set_transaction_object("Horse");
        store.set_transaction_cost("40");
        assert_eq!(
            gm.action_purchase(&mut store).unwrap_err(),
            RulesError::InsufficientCoins { cost: 40, coins: 6 }
        );
        assert_eq!(store.coins(), "6");

        store.set_transaction_object("  ");
        assert_eq!(gm.action_purchase(&mut store).unwrap_err(), RulesError::NothingToBuy);
    }
    #[test]
    fn extreme_stats_saturate_instead_of_overflowing() {
        let mut store = store();
        hero(&mut store, "99999999999", "-99999999999", "2147483647");
        monster(&mut store, "Titan", "-99999999999", "15");
        let (mut gm, _) = master(&[6, 6, 1, 1, 1, 1]);

        let round = gm.action_fight(&mut store);
        assert_eq!(round.hero_total, i32::MAX);
        assert_eq!(round.monster_total, i32::MIN + 2);
        assert_eq!(store.monster_health(), "13");
        assert_eq!(round.fight_ended, Some(FightOutcome::Lost));

        let test = gm.action_test_luck(&mut store);
        assert!(test.is_lucky);
        assert_eq!(store.luck(), (i32::MAX - 1).to_string());
    }

    #[test]
    fn meals_and_potions_saturate_at_the_stat_limits() {
        let mut store = store();
        hero(&mut store, "10", "2147483647", "5");
        store.set_meals("3");
        let (mut gm, _) = master(&[1]);

        let meal = gm.action_eat_meal(&mut store).unwrap();
        assert_eq!(meal.healed, MEAL_HEALING);
        assert_eq!(store.health(), i32::MAX.to_string());

        store.lock_character();
        store.set_max_health(Some(i32::MAX));
        store.set_health("-5");
        store.set_potion_type(PotionType::Health);
        let report = gm.action_use_potion(&mut store).unwrap();
        assert_eq!(store.health(), i32::MAX.to_string());
        assert_eq!(report.badges[0].delta, i32::MAX);
    }

    #[test]
    fn huge_negative_health_floors_without_panicking() {
        let mut store = store();
        hero(&mut store, "0", "-99999999999", "5");
        monster(&mut store, "Ogre", "12", "10");
        let (mut gm, _) = master(&[1, 1, 6, 6]);

        let round = gm.action_fight(&mut store);
        assert_eq!(round.outcome, CombatOutcome::MonsterWins);
        assert_eq!(store.health(), "0");
        assert_eq!(round.badges[0].delta, i32::MAX);
    }
}
