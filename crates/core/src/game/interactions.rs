//! NPC interaction queue fed by bumps and explicit interaction.

use std::mem;

use crate::entities::{InteractionTrigger, NpcInteractionEvent};
use crate::state::GameState;

use super::action::GameEvent;
use super::resolver::{Resolver, Turn};

impl Resolver<'_> {
    /// Talks to the NPC the hero is facing. Never costs a turn.
    pub(super) fn interact(&mut self) -> Turn {
        let target = self.state.player.step(self.state.player_direction);
        match self.state.npc_index_at(target) {
            Some(index) => self.queue_npc_interaction(index, InteractionTrigger::Interact),
            None => self.emit(GameEvent::NothingToInteract),
        }
        Turn::Free
    }

    pub(super) fn queue_npc_interaction(&mut self, index: usize, trigger: InteractionTrigger) {
        let Some(npc) = self.state.npcs.get(index) else {
            return;
        };
        let event = npc.interaction_event(trigger, self.state.turn);
        let npc_id = event.npc_id.clone();
        self.state.npc_interaction_queue.push(event);
        self.emit(GameEvent::NpcInteraction { npc_id });
    }
}

/// Hands every queued interaction to the caller, oldest first.
pub fn drain_npc_interactions(state: &mut GameState) -> Vec<NpcInteractionEvent> {
    mem::take(&mut state.npc_interaction_queue)
}
