//! Fixed-tick world update.
//!
//! One call to [`tick`] advances every player timer by one tick, moves dashing
//! players and projectiles, resolves projectile hits and expires timed effects.
//! Players are visited in identifier order so a tick is deterministic for a
//! given seed.

use crate::game::GameState;
use log::trace;
use shared::geometry::{circles_overlap, clamp_to_arena, is_beyond_margin, is_outside_arena};
use shared::{
    Dash, EnhancedAttack, Invisibility, PiercingShotMode, Player, PlayerId, RoleTuning,
    ServerMessage, Shield, MANA_REGEN_PER_TICK, PROJECTILE_CULL_MARGIN,
};

/// A status effect with a countdown measured in ticks.
trait TimedEffect {
    fn remaining_mut(&mut self) -> &mut u32;
}

macro_rules! timed_effect {
    ($($effect:ty),*) => {
        $(impl TimedEffect for $effect {
            fn remaining_mut(&mut self) -> &mut u32 {
                &mut self.remaining
            }
        })*
    };
}

timed_effect!(Dash, Shield, EnhancedAttack, PiercingShotMode, Invisibility);

/// Counts an effect down by one tick and clears it when it runs out.
fn expire<T: TimedEffect>(slot: &mut Option<T>) {
    let finished = match slot.as_mut() {
        Some(effect) => {
            let remaining = effect.remaining_mut();
            *remaining = remaining.saturating_sub(1);
            *remaining == 0
        }
        None => false,
    };
    if finished {
        *slot = None;
    }
}

/// Advances the whole world by one tick.
pub fn tick(state: &mut GameState) {
    state.tick += 1;
    update_players(state);
    update_projectiles(state);
}

fn update_players(state: &mut GameState) {
    let mut volleys: Vec<(PlayerId, f32)> = Vec::new();
    let mut respawns: Vec<PlayerId> = Vec::new();

    for player in state.players.values_mut() {
        if player.is_defeated() {
            player.respawn_timer = player.respawn_timer.saturating_sub(1);
            if player.respawn_timer == 0 {
                respawns.push(player.id);
            }
            continue;
        }

        player.restore_mana(MANA_REGEN_PER_TICK);
        player.tick_cooldowns();
        advance_dash(player);
        expire(&mut player.shield);
        expire(&mut player.enhanced_attack);
        if let Some(damage) = advance_piercing_mode(player) {
            volleys.push((player.id, damage));
        }
        expire(&mut player.invisibility);
    }

    for (owner, damage) in volleys {
        fire_at_random_point(state, owner, damage);
    }
    for id in respawns {
        state.respawn_player(id);
    }
}

/// Moves a dashing player one step and ends the dash on timeout or arrival.
fn advance_dash(player: &mut Player) {
    let Some(dash) = player.dash.as_mut() else {
        return;
    };

    player.position = clamp_to_arena(player.position.add(&dash.velocity), player.radius);
    dash.remaining = dash.remaining.saturating_sub(1);

    // A zero-length charge still ends on the next tick.
    let step = dash.velocity.magnitude().max(player.speed);
    let remaining_distance = dash.target.distance(&player.position);
    if dash.remaining == 0 || remaining_distance < step {
        trace!("Player {} dash finished", player.id);
        player.dash = None;
    }
}

/// Returns the damage of a piercing arrow to fire this tick, if any.
fn advance_piercing_mode(player: &mut Player) -> Option<f32> {
    let RoleTuning::Ranged(tuning) = &player.role.parameters().tuning else {
        player.piercing_shot_mode = None;
        return None;
    };
    let mode = player.piercing_shot_mode.as_mut()?;

    mode.remaining = mode.remaining.saturating_sub(1);
    mode.fire_timer = mode.fire_timer.saturating_sub(1);

    let volley = if mode.fire_timer == 0 {
        mode.fire_timer = tuning.piercing_shot_interval;
        Some(tuning.piercing_arrow_damage)
    } else {
        None
    };
    if mode.remaining == 0 {
        player.piercing_shot_mode = None;
    }
    volley
}

fn fire_at_random_point(state: &mut GameState, owner: PlayerId, damage: f32) {
    let Some(origin) = state.get_player(owner).map(|p| p.position) else {
        return;
    };
    let mut target = state.random_arena_point();
    if target == origin {
        target.x += 1.0;
    }
    state.fire_piercing_arrow(owner, origin, target.sub(&origin), damage);
}

fn update_projectiles(state: &mut GameState) {
    let projectiles = std::mem::take(&mut state.projectiles);
    let mut survivors = Vec::with_capacity(projectiles.len());

    for mut projectile in projectiles {
        projectile.advance();

        if is_outside_arena(projectile.position, projectile.radius) {
            if projectile.explosive {
                state.notify(ServerMessage::ExplosionEffect {
                    x: projectile.position.x,
                    y: projectile.position.y,
                });
            }
            if projectile.piercing
                && !is_beyond_margin(projectile.position, PROJECTILE_CULL_MARGIN)
            {
                survivors.push(projectile);
            }
            continue;
        }

        let targets: Vec<PlayerId> = state
            .players
            .values()
            .filter(|p| p.id != projectile.owner_id && !p.is_defeated())
            .filter(|p| {
                circles_overlap(projectile.position, projectile.radius, p.position, p.radius)
            })
            .map(|p| p.id)
            .collect();

        if projectile.piercing {
            for target in targets {
                state.damage_player(target, projectile.damage, Some(projectile.owner_id));
            }
            survivors.push(projectile);
        } else if let Some(&target) = targets.first() {
            state.damage_player(target, projectile.damage, Some(projectile.owner_id));
        } else {
            survivors.push(projectile);
        }
    }

    state.projectiles = survivors;
}
