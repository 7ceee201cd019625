//! One-action transactions over a cloned [`GameState`].

use crate::config::RulesConfig;
use crate::rng::{GameRng, SeededRng, mix_seed_stream};
use crate::state::GameState;
use crate::types::Direction;

use super::action::{Action, GameEvent, Transition};

/// Whether an action used up the hero's turn and lets enemies respond.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Turn {
    Taken,
    Free,
}

pub(super) struct Resolver<'a> {
    pub(super) state: GameState,
    pub(super) rules: &'a RulesConfig,
    pub(super) rng: &'a mut dyn GameRng,
    pub(super) events: Vec<GameEvent>,
}

impl<'a> Resolver<'a> {
    fn new(state: GameState, rules: &'a RulesConfig, rng: &'a mut dyn GameRng) -> Self {
        Self { state, rules, rng, events: Vec::new() }
    }

    pub(super) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    fn apply(&mut self, action: &Action) {
        if self.state.is_over() {
            return;
        }
        let turn = match *action {
            Action::Move(direction) => self.move_player(direction),
            Action::UseFood => self.use_food(),
            Action::UsePotion => self.use_potion(),
            Action::ThrowRock => self.throw_rock(),
            Action::ThrowRune => self.throw_rune(),
            Action::Interact => self.interact(),
            Action::ToggleTorch => self.toggle_torch(),
        };
        if turn == Turn::Taken {
            self.state.turn += 1;
            if !self.state.is_over() {
                self.enemy_turn();
            }
        }
        if self.state.is_dead() {
            self.emit(GameEvent::HeroDied);
        }
        tracing::trace!(?action, ?turn, turn_count = self.state.turn, "action resolved");
    }

    fn toggle_torch(&mut self) -> Turn {
        self.state.hero.torch_lit = !self.state.hero.torch_lit;
        self.emit(GameEvent::TorchToggled { lit: self.state.hero.torch_lit });
        Turn::Free
    }

    fn finish(self) -> Transition {
        Transition { state: self.state, events: self.events }
    }
}

/// Resolves one action. Finished games come back unchanged.
pub fn apply_action(
    state: &GameState,
    action: &Action,
    rules: &RulesConfig,
    rng: &mut dyn GameRng,
) -> Transition {
    let mut resolver = Resolver::new(state.clone(), rules, rng);
    resolver.apply(action);
    resolver.finish()
}

pub fn move_player(
    state: &GameState,
    direction: Direction,
    rules: &RulesConfig,
    rng: &mut dyn GameRng,
) -> GameState {
    apply_action(state, &Action::Move(direction), rules, rng).state
}

/// Item actions draw no random rolls of their own. Enemies acting afterwards
/// still get a generator derived from the turn so results stay reproducible.
fn apply_with_turn_rng(state: &GameState, action: Action, rules: &RulesConfig) -> GameState {
    let mut rng = SeededRng::new(mix_seed_stream(state.turn, u64::from(state.floor_index)));
    apply_action(state, &action, rules, &mut rng).state
}

pub fn perform_use_food(state: &GameState, rules: &RulesConfig) -> GameState {
    apply_with_turn_rng(state, Action::UseFood, rules)
}

pub fn perform_use_potion(state: &GameState, rules: &RulesConfig) -> GameState {
    apply_with_turn_rng(state, Action::UsePotion, rules)
}

pub fn perform_throw_rock(state: &GameState, rules: &RulesConfig) -> GameState {
    apply_with_turn_rng(state, Action::ThrowRock, rules)
}

pub fn perform_throw_rune(state: &GameState, rules: &RulesConfig) -> GameState {
    apply_with_turn_rng(state, Action::ThrowRune, rules)
}
