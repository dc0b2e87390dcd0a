//! Types and constants shared by the arena server and its clients.

pub mod entities;
pub mod geometry;
pub mod protocol;
pub mod roles;

pub use entities::{
    AssassinStab, Dash, EnhancedAttack, Invisibility, MeleeSwing, PiercingShotMode, Player,
    PlayerId, Projectile, ProjectileId, Shield,
};
pub use geometry::Vector2;
pub use protocol::{ClientMessage, GameSnapshot, ProtocolError, ServerMessage};
pub use roles::{ConfigError, Role, RoleParameters, RoleTuning};

pub const ARENA_WIDTH: f32 = 800.0;
pub const ARENA_HEIGHT: f32 = 600.0;
pub const TICK_RATE: u32 = 60;

pub const PLAYER_RADIUS: f32 = 15.0;
pub const MAX_MANA: f32 = 200.0;
pub const MANA_REGEN_PER_TICK: f32 = 10.0 / 60.0;
pub const RESPAWN_TICKS: u32 = 3 * TICK_RATE;
pub const MAX_NICKNAME_LEN: usize = 20;

/// Extra reach added to the attacker's radius.
pub const MELEE_REACH: f32 = 60.0;
pub const STAB_REACH: f32 = 20.0;
pub const STAB_WIDTH: f32 = 10.0;
pub const STAB_HEIGHT: f32 = 25.0;
/// Animation length of swing/stab visuals, in client frames.
pub const VISUAL_EFFECT_TICKS: u32 = 5;

pub const ARROW_SPEED: f32 = 10.0;
pub const ARROW_RADIUS: f32 = 3.0;
pub const PIERCING_ARROW_SPEED: f32 = 15.0;
pub const PIERCING_ARROW_RADIUS: f32 = 4.0;
/// Piercing projectiles are retired once this far outside the arena.
pub const PROJECTILE_CULL_MARGIN: f32 = 200.0;
