//! Applies client actions to the authoritative state.
//!
//! Every action first passes a generic gate (player present and alive, slot off
//! cooldown, enough mana). Only then is the role-specific effect dispatched
//! through [`RoleBehavior`]. Actions that fail the gate change nothing and
//! report nothing to the client.

use crate::game::GameState;
use log::{debug, info};
use shared::roles::{AssassinTuning, MeleeTuning, RangedTuning};
use shared::{
    AssassinStab, ClientMessage, Dash, EnhancedAttack, Invisibility, MeleeSwing,
    PiercingShotMode, Player, PlayerId, Role, RoleParameters, RoleTuning, ServerMessage, Shield,
    Vector2, MELEE_REACH, STAB_HEIGHT, STAB_REACH, STAB_WIDTH, VISUAL_EFFECT_TICKS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MovementInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackInput {
    pub direction: Vector2,
    /// Aim angle in radians, used when `direction` is zero.
    pub angle: f32,
}

impl AttackInput {
    fn aim(&self) -> Vector2 {
        let direction = self.direction.normalize();
        if direction == Vector2::ZERO {
            Vector2::from_angle(self.angle)
        } else {
            direction
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkillInput {
    pub target: Vector2,
    pub angle: f32,
}

/// Result of handling one inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A player was created for the connection.
    Joined(Player),
    /// The action passed its preconditions and was applied.
    Applied,
    /// Preconditions failed or the player does not exist.
    Ignored,
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    BasicAttack,
    Skill1,
    Skill2,
}

/// Role-specific effects of the three action slots.
///
/// Implementations run after mana and cooldown have been paid.
pub trait RoleBehavior {
    fn basic_attack(
        &self,
        state: &mut GameState,
        attacker: PlayerId,
        params: &RoleParameters,
        input: AttackInput,
    );
    fn skill1(&self, state: &mut GameState, caster: PlayerId, input: SkillInput);
    fn skill2(&self, state: &mut GameState, caster: PlayerId, input: SkillInput);
}

/// Behaviour for roles without implemented effects.
struct Passive;

pub fn behavior_for(tuning: &RoleTuning) -> &dyn RoleBehavior {
    match tuning {
        RoleTuning::Melee(melee) => melee,
        RoleTuning::Ranged(ranged) => ranged,
        RoleTuning::Assassin(assassin) => assassin,
        RoleTuning::Passive => &Passive,
    }
}

/// Dispatches a decoded client message.
pub fn handle_message(state: &mut GameState, id: PlayerId, message: ClientMessage) -> Outcome {
    let applied = match message {
        ClientMessage::Init { nickname, role } => {
            return Outcome::Joined(handle_init(state, id, nickname, role.as_deref()));
        }
        ClientMessage::Movement {
            up,
            down,
            left,
            right,
        } => handle_movement(
            state,
            id,
            MovementInput {
                up,
                down,
                left,
                right,
            },
        ),
        ClientMessage::BasicAttack {
            direction_x,
            direction_y,
            angle,
        } => handle_basic_attack(
            state,
            id,
            AttackInput {
                direction: Vector2::new(direction_x, direction_y),
                angle,
            },
        ),
        ClientMessage::UseSkill1 {
            target_x,
            target_y,
            angle,
        } => handle_skill1(
            state,
            id,
            SkillInput {
                target: Vector2::new(target_x, target_y),
                angle,
            },
        ),
        ClientMessage::UseSkill2 {
            target_x,
            target_y,
            angle,
        } => handle_skill2(
            state,
            id,
            SkillInput {
                target: Vector2::new(target_x, target_y),
                angle,
            },
        ),
    };

    if applied {
        Outcome::Applied
    } else {
        Outcome::Ignored
    }
}

/// Creates (or recreates) the player bound to a connection.
pub fn handle_init(
    state: &mut GameState,
    id: PlayerId,
    nickname: Option<String>,
    role: Option<&str>,
) -> Player {
    let role = Role::parse_or_default(role);
    let nickname = nickname.unwrap_or_else(|| format!("Guest_{}", id));
    let position = state.random_spawn_point();

    if state.remove_player(id).is_some() {
        debug!("Player {} re-initialised", id);
    }
    let player = Player::new(id, nickname, role, position);
    state.add_player(player.clone());
    player
}

/// Moves by `speed` along each pressed axis. Diagonals are not normalised.
pub fn handle_movement(state: &mut GameState, id: PlayerId, input: MovementInput) -> bool {
    let Some(player) = state.get_player_mut(id) else {
        return false;
    };
    if player.is_defeated() || player.is_dashing() {
        return false;
    }

    let mut delta = Vector2::ZERO;
    if input.up {
        delta.y -= player.speed;
    }
    if input.down {
        delta.y += player.speed;
    }
    if input.left {
        delta.x -= player.speed;
    }
    if input.right {
        delta.x += player.speed;
    }
    player.set_position(player.position.add(&delta));
    true
}

pub fn handle_basic_attack(state: &mut GameState, id: PlayerId, input: AttackInput) -> bool {
    let Some(params) = try_activate(state, id, Slot::BasicAttack) else {
        return false;
    };
    behavior_for(&params.tuning).basic_attack(state, id, params, input);
    true
}

pub fn handle_skill1(state: &mut GameState, id: PlayerId, input: SkillInput) -> bool {
    let Some(params) = try_activate(state, id, Slot::Skill1) else {
        return false;
    };
    debug!("Player {} used {}", id, params.skill1.name);
    behavior_for(&params.tuning).skill1(state, id, input);
    true
}

pub fn handle_skill2(state: &mut GameState, id: PlayerId, input: SkillInput) -> bool {
    let Some(params) = try_activate(state, id, Slot::Skill2) else {
        return false;
    };
    debug!("Player {} used {}", id, params.skill2.name);
    behavior_for(&params.tuning).skill2(state, id, input);
    true
}

/// Pays mana and starts the cooldown for `slot` when both are available.
fn try_activate(
    state: &mut GameState,
    id: PlayerId,
    slot: Slot,
) -> Option<&'static RoleParameters> {
    let player = state.get_player_mut(id)?;
    if player.is_defeated() {
        return None;
    }

    let params = player.role.parameters();
    let (cooldown, mana_cost, reset) = match slot {
        Slot::BasicAttack => (
            &mut player.basic_attack_cooldown,
            params.basic_attack.mana_cost,
            params.basic_attack.cooldown,
        ),
        Slot::Skill1 => (
            &mut player.skill1_cooldown,
            params.skill1.mana_cost,
            params.skill1.cooldown,
        ),
        Slot::Skill2 => (
            &mut player.skill2_cooldown,
            params.skill2.mana_cost,
            params.skill2.cooldown,
        ),
    };
    if *cooldown > 0 || player.mana < mana_cost {
        return None;
    }

    *cooldown = reset;
    player.spend_mana(mana_cost);
    Some(params)
}

impl RoleBehavior for MeleeTuning {
    fn basic_attack(
        &self,
        state: &mut GameState,
        attacker: PlayerId,
        params: &RoleParameters,
        input: AttackInput,
    ) {
        let Some(player) = state.get_player(attacker) else {
            return;
        };
        let (position, reach) = (player.position, player.radius + MELEE_REACH);

        let swing = MeleeSwing {
            id: state.next_entity_id(),
            owner_id: attacker,
            position,
            angle: input.angle,
            radius: MELEE_REACH,
            duration: VISUAL_EFFECT_TICKS,
        };
        state.melee_attacks.push(swing);
        state.strike_area(attacker, position, reach, params.basic_attack.damage);
    }

    fn skill1(&self, state: &mut GameState, caster: PlayerId, input: SkillInput) {
        let Some(player) = state.get_player_mut(caster) else {
            return;
        };

        let offset = input.target.sub(&player.position);
        let distance = offset.magnitude();
        let step = distance / self.dash_duration as f32 * self.dash_speed_multiplier;
        player.dash = Some(Dash {
            remaining: self.dash_duration,
            target: input.target,
            velocity: offset.normalize().scale(step),
        });

        info!("{} ({}) charges", player.nickname, caster);
        state.notify(ServerMessage::PlayerDashed {
            id: caster,
            target_x: input.target.x,
            target_y: input.target.y,
            duration: self.dash_duration,
        });
    }

    fn skill2(&self, state: &mut GameState, caster: PlayerId, _input: SkillInput) {
        let Some(player) = state.get_player_mut(caster) else {
            return;
        };
        player.shield = Some(Shield {
            remaining: self.shield_duration,
            damage_reduction: self.damage_reduction,
        });

        info!("{} ({}) raises a barrier", player.nickname, caster);
        state.notify(ServerMessage::PlayerShielded {
            id: caster,
            duration: self.shield_duration,
        });
    }
}

impl RoleBehavior for RangedTuning {
    fn basic_attack(
        &self,
        state: &mut GameState,
        attacker: PlayerId,
        params: &RoleParameters,
        input: AttackInput,
    ) {
        let Some(player) = state.get_player(attacker) else {
            return;
        };
        let origin = player.position;
        let damage = params.basic_attack.damage * player.attack_multiplier();
        let explosive = player.enhanced_attack.is_some();

        state.fire_arrow(attacker, origin, input.aim(), damage, explosive);
    }

    fn skill1(&self, state: &mut GameState, caster: PlayerId, input: SkillInput) {
        let Some(player) = state.get_player_mut(caster) else {
            return;
        };
        player.piercing_shot_mode = Some(PiercingShotMode {
            remaining: self.piercing_mode_duration,
            fire_timer: self.piercing_shot_interval,
        });
        let origin = player.position;

        state.notify(ServerMessage::PlayerPiercingShotMode {
            id: caster,
            duration: self.piercing_mode_duration,
        });
        state.fire_piercing_arrow(
            caster,
            origin,
            Vector2::from_angle(input.angle),
            self.piercing_arrow_damage,
        );
    }

    fn skill2(&self, state: &mut GameState, caster: PlayerId, _input: SkillInput) {
        let Some(player) = state.get_player_mut(caster) else {
            return;
        };
        player.enhanced_attack = Some(EnhancedAttack {
            remaining: self.enhanced_duration,
            multiplier: self.enhanced_multiplier,
        });

        info!("{} ({}) readies explosive arrows", player.nickname, caster);
        state.notify(ServerMessage::PlayerEnhancedAttack {
            id: caster,
            duration: self.enhanced_duration,
        });
    }
}

impl RoleBehavior for AssassinTuning {
    fn basic_attack(
        &self,
        state: &mut GameState,
        attacker: PlayerId,
        params: &RoleParameters,
        input: AttackInput,
    ) {
        let Some(player) = state.get_player(attacker) else {
            return;
        };
        let (position, reach) = (player.position, player.radius + STAB_REACH);

        let stab = AssassinStab {
            id: state.next_entity_id(),
            owner_id: attacker,
            position,
            angle: input.angle,
            width: STAB_WIDTH,
            height: STAB_HEIGHT,
            duration: VISUAL_EFFECT_TICKS,
        };
        state.assassin_stabs.push(stab);
        state.strike_area(attacker, position, reach, params.basic_attack.damage);
    }

    fn skill1(&self, state: &mut GameState, caster: PlayerId, _input: SkillInput) {
        let Some(player) = state.get_player_mut(caster) else {
            return;
        };
        player.invisibility = Some(Invisibility {
            remaining: self.invisibility_duration,
        });

        info!("{} ({}) vanishes", player.nickname, caster);
        state.notify(ServerMessage::PlayerInvisible {
            id: caster,
            duration: self.invisibility_duration,
        });
    }

    /// Blinks toward the target, never further than the target itself.
    fn skill2(&self, state: &mut GameState, caster: PlayerId, input: SkillInput) {
        let Some(player) = state.get_player_mut(caster) else {
            return;
        };

        let offset = input.target.sub(&player.position);
        let distance = offset.magnitude().min(self.teleport_distance);
        player.set_position(player.position.add(&offset.normalize().scale(distance)));
        let position = player.position;

        state.notify(ServerMessage::PlayerTeleported {
            id: caster,
            x: position.x,
            y: position.y,
        });
    }
}

impl RoleBehavior for Passive {
    fn basic_attack(
        &self,
        _state: &mut GameState,
        attacker: PlayerId,
        params: &RoleParameters,
        _input: AttackInput,
    ) {
        debug!("{} basic attack of {} has no effect", params.role, attacker);
    }

    fn skill1(&self, _state: &mut GameState, caster: PlayerId, _input: SkillInput) {
        debug!("Skill 1 of {} has no effect", caster);
    }

    fn skill2(&self, _state: &mut GameState, caster: PlayerId, _input: SkillInput) {
        debug!("Skill 2 of {} has no effect", caster);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use shared::{ARENA_WIDTH, ARROW_SPEED, PIERCING_ARROW_SPEED};

    fn spawn(state: &mut GameState, id: PlayerId, role: Role, x: f32, y: f32) {
        state.add_player(Player::new(id, format!("p{}", id), role, Vector2::new(x, y)));
    }

    fn aim_right() -> AttackInput {
        AttackInput {
            direction: Vector2::new(1.0, 0.0),
            angle: 0.0,
        }
    }

    fn skill_at(x: f32, y: f32) -> SkillInput {
        SkillInput {
            target: Vector2::new(x, y),
            angle: 0.0,
        }
    }

    #[test]
    fn test_init_defaults() {
        let mut state = GameState::with_seed(3);
        let player = handle_init(&mut state, 4, None, Some("druid"));
        assert_eq!(player.nickname, "Guest_4");
        assert_eq!(player.role, Role::Melee);
        assert_eq!(state.get_player(4), Some(&player));
    }

    #[test]
    fn test_init_with_role() {
        let mut state = GameState::with_seed(3);
        let outcome = handle_message(
            &mut state,
            1,
            ClientMessage::Init {
                nickname: Some("yuna".into()),
                role: Some("assassin".into()),
            },
        );
        match outcome {
            Outcome::Joined(player) => {
                assert_eq!(player.nickname, "yuna");
                assert_eq!(player.role, Role::Assassin);
                assert_eq!(player.health, 3500.0);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_actions_for_unknown_player_are_ignored() {
        let mut state = GameState::with_seed(3);
        let outcome = handle_message(
            &mut state,
            77,
            ClientMessage::BasicAttack {
                direction_x: 1.0,
                direction_y: 0.0,
                angle: 0.0,
            },
        );
        assert_eq!(outcome, Outcome::Ignored);
        assert!(!handle_movement(&mut state, 77, MovementInput::default()));
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_movement_diagonal_is_not_normalized() {
        let mut state = GameState::with_seed(3);
        spawn(&mut state, 1, Role::Melee, 100.0, 100.0);
        handle_movement(
            &mut state,
            1,
            MovementInput {
                up: true,
                left: true,
                ..Default::default()
            },
        );
        let position = state.get_player(1).unwrap().position;
        assert_eq!(position, Vector2::new(97.0, 97.0));
    }

    #[test]
    fn test_movement_clamped_to_arena() {
        let mut state = GameState::with_seed(3);
        spawn(&mut state, 1, Role::Assassin, ARENA_WIDTH - 16.0, 16.0);
        handle_movement(
            &mut state,
            1,
            MovementInput {
                up: true,
                right: true,
                ..Default::default()
            },
        );
        let player = state.get_player(1).unwrap();
        assert_eq!(player.position, Vector2::new(ARENA_WIDTH - 15.0, 15.0));
    }

    #[test]
    fn test_movement_ignored_while_dashing() {
        let mut state = GameState::with_seed(3);
        spawn(&mut state, 1, Role::Melee, 100.0, 100.0);
        assert!(handle_skill1(&mut state, 1, skill_at(400.0, 100.0)));
        assert!(!handle_movement(
            &mut state,
            1,
            MovementInput {
                down: true,
                ..Default::default()
            }
        ));
        assert_eq!(state.get_player(1).unwrap().position.y, 100.0);
    }

    #[test]
    fn test_basic_attack_pays_mana_and_sets_cooldown() {
        let mut state = GameState::with_seed(3);
        spawn(&mut state, 1, Role::Ranged, 100.0, 100.0);

        assert!(handle_basic_attack(&mut state, 1, aim_right()));
        let player = state.get_player(1).unwrap();
        assert_eq!(player.mana, 195.0);
        assert_eq!(player.basic_attack_cooldown, 20);
        assert_eq!(state.projectiles.len(), 1);

        // On cooldown: nothing changes.
        assert!(!handle_basic_attack(&mut state, 1, aim_right()));
        let player = state.get_player(1).unwrap();
        assert_eq!(player.mana, 195.0);
        assert_eq!(player.basic_attack_cooldown, 20);
        assert_eq!(state.projectiles.len(), 1);
    }

    #[test]
    fn test_attack_without_mana_is_ignored() {
        let mut state = GameState::with_seed(3);
        spawn(&mut state, 1, Role::Melee, 100.0, 100.0);
        spawn(&mut state, 2, Role::Ranged, 120.0, 100.0);
        state.get_player_mut(1).unwrap().mana = 9.5;

        assert!(!handle_basic_attack(&mut state, 1, aim_right()));
        assert_eq!(state.get_player(1).unwrap().basic_attack_cooldown, 0);
        assert_eq!(state.get_player(2).unwrap().health, 3300.0);
        assert!(state.melee_attacks.is_empty());
    }

    #[test]
    fn test_ranged_arrow_uses_direction() {
        let mut state = GameState::with_seed(3);
        spawn(&mut state, 1, Role::Ranged, 100.0, 100.0);
        handle_basic_attack(
            &mut state,
            1,
            AttackInput {
                direction: Vector2::new(0.0, -4.0),
                angle: 0.0,
            },
        );
        let arrow = &state.projectiles[0];
        assert_eq!(arrow.direction, Vector2::new(0.0, -1.0));
        assert_eq!(arrow.velocity(), Vector2::new(0.0, -ARROW_SPEED));
        assert_eq!(arrow.damage, 30.0);
        assert!(!arrow.explosive);
        assert_eq!(arrow.owner_id, 1);
    }

    #[test]
    fn test_ranged_arrow_falls_back_to_angle() {
        let mut state = GameState::with_seed(3);
        spawn(&mut state, 1, Role::Ranged, 100.0, 100.0);
        handle_basic_attack(
            &mut state,
            1,
            AttackInput {
                direction: Vector2::ZERO,
                angle: std::f32::consts::PI,
            },
        );
        let arrow = &state.projectiles[0];
        assert_approx_eq!(arrow.direction.x, -1.0, 1e-6);
    }

    #[test]
    fn test_enhanced_arrow_is_explosive_and_stronger() {
        let mut state = GameState::with_seed(3);
        spawn(&mut state, 1, Role::Ranged, 100.0, 100.0);
        assert!(handle_skill2(&mut state, 1, skill_at(0.0, 0.0)));
        assert!(handle_basic_attack(&mut state, 1, aim_right()));

        let arrow = &state.projectiles[0];
        assert_approx_eq!(arrow.damage, 45.0);
        assert!(arrow.explosive);

        let notifications = state.drain_notifications();
        assert_eq!(
            notifications,
            vec![ServerMessage::PlayerEnhancedAttack { id: 1, duration: 480 }]
        );
    }

    #[test]
    fn test_melee_swing_hits_within_reach() {
        let mut state = GameState::with_seed(3);
        spawn(&mut state, 1, Role::Melee, 100.0, 100.0);
        spawn(&mut state, 2, Role::Ranged, 150.0, 100.0);
        spawn(&mut state, 3, Role::Ranged, 100.0, 174.0);
        spawn(&mut state, 4, Role::Ranged, 176.0, 100.0);

        assert!(handle_basic_attack(&mut state, 1, aim_right()));
        assert_eq!(state.get_player(2).unwrap().health, 3300.0 - 1300.0);
        assert_eq!(state.get_player(3).unwrap().health, 3300.0 - 1300.0);
        assert_eq!(state.get_player(4).unwrap().health, 3300.0);
        assert_eq!(state.get_player(1).unwrap().health, 8000.0);

        assert_eq!(state.melee_attacks.len(), 1);
        assert_eq!(state.melee_attacks[0].owner_id, 1);

        let updates = state
            .drain_notifications()
            .into_iter()
            .filter(|m| matches!(m, ServerMessage::PlayerHealthUpdate { .. }))
            .count();
        assert_eq!(updates, 2);
    }

    #[test]
    fn test_assassin_stab_has_short_reach() {
        let mut state = GameState::with_seed(3);
        spawn(&mut state, 1, Role::Assassin, 100.0, 100.0);
        spawn(&mut state, 2, Role::Melee, 130.0, 100.0);
        spawn(&mut state, 3, Role::Melee, 140.0, 100.0);

        assert!(handle_basic_attack(&mut state, 1, aim_right()));
        assert_eq!(state.get_player(2).unwrap().health, 7900.0);
        assert_eq!(state.get_player(3).unwrap().health, 8000.0);
        assert_eq!(state.assassin_stabs.len(), 1);
    }

    #[test]
    fn test_melee_dash_velocity() {
        let mut state = GameState::with_seed(3);
        spawn(&mut state, 1, Role::Melee, 100.0, 100.0);
        assert!(handle_skill1(&mut state, 1, skill_at(400.0, 100.0)));

        let player = state.get_player(1).unwrap();
        let dash = player.dash.unwrap();
        assert_eq!(dash.remaining, 60);
        assert_eq!(dash.target, Vector2::new(400.0, 100.0));
        assert_approx_eq!(dash.velocity.x, 300.0 / 60.0 * 1.5, 1e-4);
        assert_approx_eq!(dash.velocity.y, 0.0, 1e-6);
        assert_eq!(player.mana, 160.0);
        assert_eq!(player.skill1_cooldown, 1200);
    }

    #[test]
    fn test_melee_dash_onto_self_is_brief() {
        let mut state = GameState::with_seed(3);
        spawn(&mut state, 1, Role::Melee, 100.0, 100.0);
        assert!(handle_skill1(&mut state, 1, skill_at(100.0, 100.0)));
        assert_eq!(state.get_player(1).unwrap().dash.unwrap().velocity, Vector2::ZERO);

        let mut ticks = 0;
        while state.get_player(1).unwrap().is_dashing() {
            crate::simulation::tick(&mut state);
            ticks += 1;
        }
        assert_eq!(ticks, 1);
        assert!(handle_movement(
            &mut state,
            1,
            MovementInput {
                up: true,
                ..MovementInput::default()
            },
        ));
    }

    #[test]
    fn test_melee_shield() {
        let mut state = GameState::with_seed(3);
        spawn(&mut state, 1, Role::Melee, 100.0, 100.0);
        assert!(handle_skill2(&mut state, 1, skill_at(0.0, 0.0)));
        let shield = state.get_player(1).unwrap().shield.unwrap();
        assert_eq!(shield.remaining, 420);
        assert_eq!(shield.damage_reduction, 0.5);
    }

    #[test]
    fn test_skill_retrigger_overwrites_effect() {
        let mut state = GameState::with_seed(3);
        spawn(&mut state, 1, Role::Melee, 100.0, 100.0);
        handle_skill2(&mut state, 1, skill_at(0.0, 0.0));
        {
            let player = state.get_player_mut(1).unwrap();
            player.shield.as_mut().unwrap().remaining = 3;
            player.skill2_cooldown = 0;
        }
        handle_skill2(&mut state, 1, skill_at(0.0, 0.0));
        assert_eq!(state.get_player(1).unwrap().shield.unwrap().remaining, 420);
    }

    #[test]
    fn test_ranged_piercing_mode_fires_immediately() {
        let mut state = GameState::with_seed(3);
        spawn(&mut state, 1, Role::Ranged, 100.0, 100.0);
        assert!(handle_skill1(
            &mut state,
            1,
            SkillInput {
                target: Vector2::ZERO,
                angle: std::f32::consts::FRAC_PI_2,
            }
        ));

        let mode = state.get_player(1).unwrap().piercing_shot_mode.unwrap();
        assert_eq!(mode.remaining, 600);
        assert_eq!(mode.fire_timer, 30);

        assert_eq!(state.projectiles.len(), 1);
        let arrow = &state.projectiles[0];
        assert!(arrow.piercing);
        assert_eq!(arrow.speed, PIERCING_ARROW_SPEED);
        assert_eq!(arrow.damage, 50.0);
        assert_approx_eq!(arrow.direction.y, 1.0, 1e-6);
    }

    #[test]
    fn test_assassin_invisibility() {
        let mut state = GameState::with_seed(3);
        spawn(&mut state, 1, Role::Assassin, 100.0, 100.0);
        assert!(handle_skill1(&mut state, 1, skill_at(0.0, 0.0)));
        assert_eq!(
            state.get_player(1).unwrap().invisibility,
            Some(Invisibility { remaining: 480 })
        );
        assert_eq!(
            state.drain_notifications(),
            vec![ServerMessage::PlayerInvisible { id: 1, duration: 480 }]
        );
    }

    #[test]
    fn test_assassin_teleport_full_distance() {
        let mut state = GameState::with_seed(3);
        spawn(&mut state, 1, Role::Assassin, 100.0, 100.0);
        assert!(handle_skill2(&mut state, 1, skill_at(400.0, 500.0)));
        let position = state.get_player(1).unwrap().position;
        assert_approx_eq!(position.x, 160.0, 1e-3);
        assert_approx_eq!(position.y, 180.0, 1e-3);
    }

    #[test]
    fn test_assassin_teleport_stops_at_close_target() {
        let mut state = GameState::with_seed(3);
        spawn(&mut state, 1, Role::Assassin, 100.0, 100.0);
        handle_skill2(&mut state, 1, skill_at(130.0, 140.0));
        let position = state.get_player(1).unwrap().position;
        assert_approx_eq!(position.x, 130.0, 1e-3);
        assert_approx_eq!(position.y, 140.0, 1e-3);
    }

    #[test]
    fn test_assassin_teleport_clamped() {
        let mut state = GameState::with_seed(3);
        spawn(&mut state, 1, Role::Assassin, 40.0, 300.0);
        handle_skill2(&mut state, 1, skill_at(-500.0, 300.0));
        assert_eq!(state.get_player(1).unwrap().position, Vector2::new(15.0, 300.0));
    }

    #[test]
    fn test_passive_roles_pay_but_do_nothing() {
        let mut state = GameState::with_seed(3);
        spawn(&mut state, 1, Role::Healer, 100.0, 100.0);
        spawn(&mut state, 2, Role::Melee, 110.0, 100.0);

        assert!(handle_basic_attack(&mut state, 1, aim_right()));
        assert!(handle_skill1(&mut state, 1, skill_at(0.0, 0.0)));
        let healer = state.get_player(1).unwrap();
        assert_eq!(healer.mana, 200.0 - 5.0 - 30.0);
        assert_eq!(healer.skill1_cooldown, 900);
        assert_eq!(state.get_player(2).unwrap().health, 8000.0);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_defeated_player_cannot_act() {
        let mut state = GameState::with_seed(3);
        spawn(&mut state, 1, Role::Ranged, 100.0, 100.0);
        state.damage_player(1, 1_000_000.0, None);

        assert!(!handle_basic_attack(&mut state, 1, aim_right()));
        assert!(!handle_movement(
            &mut state,
            1,
            MovementInput {
                up: true,
                ..Default::default()
            }
        ));
        assert!(state.projectiles.is_empty());
    }
}
