use crate::geometry::{clamp_to_arena, Vector2};
use crate::roles::Role;
use crate::{MAX_MANA, PLAYER_RADIUS};
use serde::{Deserialize, Serialize};

pub type PlayerId = u32;
pub type ProjectileId = u32;

/// Melee charge in progress.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dash {
    pub remaining: u32,
    pub target: Vector2,
    /// Displacement applied every tick.
    pub velocity: Vector2,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shield {
    pub remaining: u32,
    pub damage_reduction: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedAttack {
    pub remaining: u32,
    pub multiplier: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PiercingShotMode {
    pub remaining: u32,
    /// Ticks until the next automatic piercing arrow.
    pub fire_timer: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invisibility {
    pub remaining: u32,
}

/// Authoritative player state, also sent verbatim to clients for rendering.
///
/// Each timed effect is `Some` exactly while it is active; an active effect
/// always has `remaining > 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub nickname: String,
    pub role: Role,
    pub position: Vector2,
    pub radius: f32,
    pub speed: f32,
    pub health: f32,
    pub max_health: f32,
    pub mana: f32,
    pub max_mana: f32,
    pub basic_attack_cooldown: u32,
    pub skill1_cooldown: u32,
    pub skill2_cooldown: u32,
    pub dash: Option<Dash>,
    pub shield: Option<Shield>,
    pub enhanced_attack: Option<EnhancedAttack>,
    pub piercing_shot_mode: Option<PiercingShotMode>,
    pub invisibility: Option<Invisibility>,
    /// Ticks left before a defeated player re-enters the arena.
    pub respawn_timer: u32,
}

impl Player {
    pub fn new(id: PlayerId, nickname: String, role: Role, position: Vector2) -> Self {
        let params = role.parameters();
        Self {
            id,
            nickname,
            role,
            position: clamp_to_arena(position, PLAYER_RADIUS),
            radius: PLAYER_RADIUS,
            speed: params.speed,
            health: params.health,
            max_health: params.health,
            mana: MAX_MANA,
            max_mana: MAX_MANA,
            basic_attack_cooldown: 0,
            skill1_cooldown: 0,
            skill2_cooldown: 0,
            dash: None,
            shield: None,
            enhanced_attack: None,
            piercing_shot_mode: None,
            invisibility: None,
            respawn_timer: 0,
        }
    }

    pub fn is_defeated(&self) -> bool {
        self.health <= 0.0
    }

    pub fn is_dashing(&self) -> bool {
        self.dash.is_some()
    }

    pub fn damage_reduction(&self) -> f32 {
        self.shield.map_or(0.0, |shield| shield.damage_reduction)
    }

    pub fn attack_multiplier(&self) -> f32 {
        self.enhanced_attack.map_or(1.0, |enhanced| enhanced.multiplier)
    }

    /// Applies incoming damage after shield reduction and returns the amount dealt.
    ///
    /// Health never drops below zero.
    pub fn take_damage(&mut self, raw: f32) -> f32 {
        let dealt = raw * (1.0 - self.damage_reduction());
        self.health = (self.health - dealt).clamp(0.0, self.max_health);
        dealt
    }

    pub fn restore_mana(&mut self, amount: f32) {
        self.mana = (self.mana + amount).clamp(0.0, self.max_mana);
    }

    /// Deducts `cost` if affordable. Returns false without touching mana otherwise.
    pub fn spend_mana(&mut self, cost: f32) -> bool {
        if self.mana < cost {
            return false;
        }
        self.mana = (self.mana - cost).clamp(0.0, self.max_mana);
        true
    }

    pub fn tick_cooldowns(&mut self) {
        self.basic_attack_cooldown = self.basic_attack_cooldown.saturating_sub(1);
        self.skill1_cooldown = self.skill1_cooldown.saturating_sub(1);
        self.skill2_cooldown = self.skill2_cooldown.saturating_sub(1);
    }

    pub fn clear_effects(&mut self) {
        self.dash = None;
        self.shield = None;
        self.enhanced_attack = None;
        self.piercing_shot_mode = None;
        self.invisibility = None;
    }

    pub fn set_position(&mut self, position: Vector2) {
        self.position = clamp_to_arena(position, self.radius);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Projectile {
    pub id: ProjectileId,
    pub owner_id: PlayerId,
    pub position: Vector2,
    pub radius: f32,
    pub speed: f32,
    /// Unit vector.
    pub direction: Vector2,
    pub damage: f32,
    /// Piercing projectiles survive hits and leaving the arena.
    pub piercing: bool,
    /// Emits an explosion notification when it leaves the arena.
    pub explosive: bool,
}

impl Projectile {
    pub fn velocity(&self) -> Vector2 {
        self.direction.scale(self.speed)
    }

    pub fn advance(&mut self) {
        self.position = self.position.add(&self.velocity());
    }
}

/// Client-side animation of a melee swing. Not authoritative state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeleeSwing {
    pub id: u32,
    pub owner_id: PlayerId,
    pub position: Vector2,
    pub angle: f32,
    pub radius: f32,
    pub duration: u32,
}

/// Client-side animation of an assassin stab. Not authoritative state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssassinStab {
    pub id: u32,
    pub owner_id: PlayerId,
    pub position: Vector2,
    pub angle: f32,
    pub width: f32,
    pub height: f32,
    pub duration: u32,
}
