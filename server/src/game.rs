//! Authoritative entity store.
//!
//! `GameState` owns every connected player, every live projectile, the
//! transient visual events of the current tick and the queue of outbound
//! notifications produced while mutating them. It is owned by exactly one
//! task; input handling and ticking both borrow it mutably, which serializes
//! every mutation.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::{
    AssassinStab, MeleeSwing, Player, PlayerId, Projectile, ProjectileId, ServerMessage, Vector2,
    ARENA_HEIGHT, ARENA_WIDTH, ARROW_RADIUS, ARROW_SPEED, PIERCING_ARROW_RADIUS,
    PIERCING_ARROW_SPEED, PLAYER_RADIUS, RESPAWN_TICKS,
};
use std::collections::BTreeMap;

/// Hands out identifiers for projectiles and visual events.
///
/// Identifiers increase monotonically and skip zero on wrap-around.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn allocate(&mut self) -> u32 {
        let id = self.next;
        self.next = self.next.wrapping_add(1).max(1);
        id
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct GameState {
    pub tick: u64,
    pub players: BTreeMap<PlayerId, Player>,
    pub projectiles: Vec<Projectile>,
    pub melee_attacks: Vec<MeleeSwing>,
    pub assassin_stabs: Vec<AssassinStab>,
    ids: IdAllocator,
    rng: StdRng,
    notifications: Vec<ServerMessage>,
}

impl GameState {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic spawn points and piercing-shot targets, for tests and replays.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            tick: 0,
            players: BTreeMap::new(),
            projectiles: Vec::new(),
            melee_attacks: Vec::new(),
            assassin_stabs: Vec::new(),
            ids: IdAllocator::new(),
            rng,
            notifications: Vec::new(),
        }
    }

    pub fn add_player(&mut self, player: Player) {
        info!(
            "Added player {} '{}' ({}) at ({:.1}, {:.1})",
            player.id, player.nickname, player.role, player.position.x, player.position.y
        );
        self.players.insert(player.id, player);
    }

    /// Removes a player. Removing an absent identifier is a no-op.
    pub fn remove_player(&mut self, id: PlayerId) -> Option<Player> {
        let removed = self.players.remove(&id);
        if removed.is_some() {
            info!("Removed player {}", id);
        }
        removed
    }

    pub fn get_player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn get_player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn next_entity_id(&mut self) -> u32 {
        self.ids.allocate()
    }

    /// Uniformly random centre with the whole player circle inside the arena.
    pub fn random_spawn_point(&mut self) -> Vector2 {
        Vector2::new(
            self.rng.gen_range(PLAYER_RADIUS..=ARENA_WIDTH - PLAYER_RADIUS),
            self.rng.gen_range(PLAYER_RADIUS..=ARENA_HEIGHT - PLAYER_RADIUS),
        )
    }

    pub fn random_arena_point(&mut self) -> Vector2 {
        Vector2::new(
            self.rng.gen_range(0.0..ARENA_WIDTH),
            self.rng.gen_range(0.0..ARENA_HEIGHT),
        )
    }

    /// Queues a message for every connected client.
    pub fn notify(&mut self, message: ServerMessage) {
        self.notifications.push(message);
    }

    pub fn drain_notifications(&mut self) -> Vec<ServerMessage> {
        std::mem::take(&mut self.notifications)
    }

    /// Spawns a regular arrow. A zero direction produces no projectile.
    pub fn fire_arrow(
        &mut self,
        owner_id: PlayerId,
        origin: Vector2,
        direction: Vector2,
        damage: f32,
        explosive: bool,
    ) -> Option<ProjectileId> {
        self.spawn_projectile(Projectile {
            id: 0,
            owner_id,
            position: origin,
            radius: ARROW_RADIUS,
            speed: ARROW_SPEED,
            direction: direction.normalize(),
            damage,
            piercing: false,
            explosive,
        })
    }

    pub fn fire_piercing_arrow(
        &mut self,
        owner_id: PlayerId,
        origin: Vector2,
        direction: Vector2,
        damage: f32,
    ) -> Option<ProjectileId> {
        self.spawn_projectile(Projectile {
            id: 0,
            owner_id,
            position: origin,
            radius: PIERCING_ARROW_RADIUS,
            speed: PIERCING_ARROW_SPEED,
            direction: direction.normalize(),
            damage,
            piercing: true,
            explosive: false,
        })
    }

    fn spawn_projectile(&mut self, mut projectile: Projectile) -> Option<ProjectileId> {
        if projectile.direction == Vector2::ZERO {
            debug!("Dropping projectile from {} with no direction", projectile.owner_id);
            return None;
        }
        projectile.id = self.ids.allocate();
        let id = projectile.id;
        self.projectiles.push(projectile);
        Some(id)
    }

    /// Applies damage to a live player, broadcasting the new health.
    ///
    /// Returns the damage actually dealt, or `None` when the target is absent
    /// or already defeated.
    pub fn damage_player(
        &mut self,
        target_id: PlayerId,
        raw_damage: f32,
        attacker: Option<PlayerId>,
    ) -> Option<f32> {
        let target = self.players.get_mut(&target_id)?;
        if target.is_defeated() {
            return None;
        }

        let dealt = target.take_damage(raw_damage);
        let health = target.health;
        debug!(
            "{} ({}) took {:.0} damage, {:.0} health left",
            target.nickname, target_id, dealt, health
        );
        self.notifications.push(ServerMessage::PlayerHealthUpdate {
            id: target_id,
            health,
        });

        if target.is_defeated() {
            target.clear_effects();
            target.respawn_timer = RESPAWN_TICKS;
            info!("Player {} defeated by {:?}", target_id, attacker);
            self.notifications.push(ServerMessage::PlayerDefeated {
                id: target_id,
                by: attacker,
            });
        }
        Some(dealt)
    }

    /// Damages every other live player whose centre lies within `reach` of `center`.
    pub fn strike_area(
        &mut self,
        attacker_id: PlayerId,
        center: Vector2,
        reach: f32,
        damage: f32,
    ) -> Vec<PlayerId> {
        let targets: Vec<PlayerId> = self
            .players
            .values()
            .filter(|p| p.id != attacker_id && !p.is_defeated())
            .filter(|p| p.position.distance(&center) < reach)
            .map(|p| p.id)
            .collect();

        for target in &targets {
            self.damage_player(*target, damage, Some(attacker_id));
        }
        targets
    }

    /// Brings a defeated player back at a fresh spawn point with full resources.
    pub fn respawn_player(&mut self, id: PlayerId) {
        let position = self.random_spawn_point();
        let Some(player) = self.players.get_mut(&id) else {
            return;
        };

        player.set_position(position);
        player.health = player.max_health;
        player.mana = player.max_mana;
        player.basic_attack_cooldown = 0;
        player.skill1_cooldown = 0;
        player.skill2_cooldown = 0;
        player.respawn_timer = 0;
        player.clear_effects();

        let position = player.position;
        info!("Player {} respawned", id);
        self.notifications.push(ServerMessage::PlayerRespawned {
            id,
            x: position.x,
            y: position.y,
        });
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
