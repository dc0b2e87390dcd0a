//! Static per-role gameplay parameters.
//!
//! Every value measured in time is expressed in simulation ticks (60 per second
//! at the reference tick rate). The table is built at compile time and never
//! mutated.

use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown role '{0}'")]
    UnknownRole(String),
}

/// Closed set of playable roles.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Melee,
    Ranged,
    Assassin,
    Healer,
    Support,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Melee,
        Role::Ranged,
        Role::Assassin,
        Role::Healer,
        Role::Support,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Melee => "melee",
            Role::Ranged => "ranged",
            Role::Assassin => "assassin",
            Role::Healer => "healer",
            Role::Support => "support",
        }
    }

    /// Resolves a role name received from a client.
    ///
    /// Missing or unrecognised names fall back to [`Role::Melee`].
    pub fn parse_or_default(name: Option<&str>) -> Role {
        match name.map(str::trim).filter(|n| !n.is_empty()) {
            None => Role::default(),
            Some(name) => name.parse().unwrap_or_else(|e: ConfigError| {
                warn!("{}, falling back to {}", e, Role::default());
                Role::default()
            }),
        }
    }

    pub fn parameters(&self) -> &'static RoleParameters {
        parameters_for(*self)
    }
}

impl FromStr for Role {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownRole(s.to_string()))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasicAttackDefinition {
    pub damage: f32,
    pub cooldown: u32,
    pub mana_cost: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkillDefinition {
    pub name: &'static str,
    pub cooldown: u32,
    pub mana_cost: f32,
}

/// Charge and barrier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeleeTuning {
    pub dash_duration: u32,
    pub dash_speed_multiplier: f32,
    pub shield_duration: u32,
    /// Fraction of incoming damage absorbed while shielded.
    pub damage_reduction: f32,
}

/// Piercing-shot mode and explosive arrows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangedTuning {
    pub piercing_mode_duration: u32,
    pub piercing_arrow_damage: f32,
    pub piercing_shot_interval: u32,
    pub enhanced_duration: u32,
    pub enhanced_multiplier: f32,
}

/// Stealth and blink.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssassinTuning {
    pub invisibility_duration: u32,
    pub teleport_distance: f32,
}

/// Skill-specific parameters, one variant per behaviour family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoleTuning {
    Melee(MeleeTuning),
    Ranged(RangedTuning),
    Assassin(AssassinTuning),
    /// Roles whose skills have no gameplay effect yet.
    Passive,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoleParameters {
    pub role: Role,
    pub health: f32,
    pub speed: f32,
    pub basic_attack: BasicAttackDefinition,
    pub skill1: SkillDefinition,
    pub skill2: SkillDefinition,
    pub tuning: RoleTuning,
}

const SECOND: u32 = 60;

static MELEE: RoleParameters = RoleParameters {
    role: Role::Melee,
    health: 8000.0,
    speed: 3.0,
    basic_attack: BasicAttackDefinition {
        damage: 1300.0,
        cooldown: 30,
        mana_cost: 10.0,
    },
    skill1: SkillDefinition {
        name: "Charge",
        cooldown: 20 * SECOND,
        mana_cost: 40.0,
    },
    skill2: SkillDefinition {
        name: "Barrier",
        cooldown: 25 * SECOND,
        mana_cost: 50.0,
    },
    tuning: RoleTuning::Melee(MeleeTuning {
        dash_duration: SECOND,
        dash_speed_multiplier: 1.5,
        shield_duration: 7 * SECOND,
        damage_reduction: 0.5,
    }),
};

static RANGED: RoleParameters = RoleParameters {
    role: Role::Ranged,
    health: 3300.0,
    speed: 3.0,
    basic_attack: BasicAttackDefinition {
        damage: 30.0,
        cooldown: 20,
        mana_cost: 5.0,
    },
    skill1: SkillDefinition {
        name: "Piercing Shot",
        cooldown: 15 * SECOND,
        mana_cost: 30.0,
    },
    skill2: SkillDefinition {
        name: "Explosive Arrows",
        cooldown: 17 * SECOND,
        mana_cost: 40.0,
    },
    tuning: RoleTuning::Ranged(RangedTuning {
        piercing_mode_duration: 10 * SECOND,
        piercing_arrow_damage: 50.0,
        piercing_shot_interval: SECOND / 2,
        enhanced_duration: 8 * SECOND,
        enhanced_multiplier: 1.5,
    }),
};

static ASSASSIN: RoleParameters = RoleParameters {
    role: Role::Assassin,
    health: 3500.0,
    speed: 5.0,
    basic_attack: BasicAttackDefinition {
        damage: 100.0,
        cooldown: 15,
        mana_cost: 5.0,
    },
    skill1: SkillDefinition {
        name: "Stealth",
        cooldown: 18 * SECOND,
        mana_cost: 60.0,
    },
    skill2: SkillDefinition {
        name: "Blink",
        cooldown: SECOND,
        mana_cost: 20.0,
    },
    tuning: RoleTuning::Assassin(AssassinTuning {
        invisibility_duration: 8 * SECOND,
        teleport_distance: 100.0,
    }),
};

static HEALER: RoleParameters = RoleParameters {
    role: Role::Healer,
    health: 6000.0,
    speed: 3.0,
    basic_attack: BasicAttackDefinition {
        damage: 30.0,
        cooldown: 25,
        mana_cost: 5.0,
    },
    skill1: SkillDefinition {
        name: "Healing Wave",
        cooldown: 15 * SECOND,
        mana_cost: 30.0,
    },
    skill2: SkillDefinition {
        name: "Ward",
        cooldown: 18 * SECOND,
        mana_cost: 40.0,
    },
    tuning: RoleTuning::Passive,
};

static SUPPORT: RoleParameters = RoleParameters {
    role: Role::Support,
    health: 7000.0,
    speed: 3.0,
    basic_attack: BasicAttackDefinition {
        damage: 40.0,
        cooldown: 20,
        mana_cost: 5.0,
    },
    skill1: SkillDefinition {
        name: "Haste",
        cooldown: 10 * SECOND,
        mana_cost: 15.0,
    },
    skill2: SkillDefinition {
        name: "Binding Trap",
        cooldown: 12 * SECOND,
        mana_cost: 25.0,
    },
    tuning: RoleTuning::Passive,
};

pub fn parameters_for(role: Role) -> &'static RoleParameters {
    match role {
        Role::Melee => &MELEE,
        Role::Ranged => &RANGED,
        Role::Assassin => &ASSASSIN,
        Role::Healer => &HEALER,
        Role::Support => &SUPPORT,
    }
}

/// Looks up parameters by wire name, failing on names outside the closed set.
pub fn lookup(name: &str) -> Result<&'static RoleParameters, ConfigError> {
    name.parse::<Role>().map(parameters_for)
}
