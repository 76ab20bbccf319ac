//! Team prototypes, team instances, and the registry that owns them.
//!
//! The scenario owns every [`TeamPrototype`] and [`Team`]; players hold
//! non-owning ids into the [`TeamRegistry`] and a prototype holds at most a
//! back-reference to its owning player. Destroying a player detaches those
//! back-references without touching the registry's records, and persisted
//! snapshots store bare ids resolved through the registry on load.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::player::PlayerIndex;

/// Unique identifier for a live team instance.
///
/// Id 0 is reserved: snapshots use it to mean "no team".
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct TeamId(pub u32);

impl TeamId {
    /// Sentinel meaning "no team" in persisted streams.
    pub const NONE: Self = Self(0);

    /// Whether this id refers to an actual team.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

/// Unique identifier for a team prototype.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct TeamPrototypeId(pub u32);

/// Unique identifier for a game object owned by a team.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct ObjectId(pub u64);

/// A template describing a team composition.
///
/// Owned by the scenario. The `owner` field is the weak back-reference a
/// player detaches at teardown; it never affects the prototype's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamPrototype {
    /// Registry id of this prototype.
    pub id: TeamPrototypeId,
    /// Scenario-unique prototype name.
    pub name: String,
    /// Player currently owning this prototype, if any.
    pub owner: Option<PlayerIndex>,
    /// Live team instances spawned from this prototype, in spawn order.
    pub instances: Vec<TeamId>,
}

/// A live team instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    /// Registry id of this team.
    pub id: TeamId,
    /// Prototype this team was spawned from.
    pub prototype: TeamPrototypeId,
    /// Composed team name (used by scripted lookups).
    pub name: String,
    /// Player controlling this team, if any.
    pub controller: Option<PlayerIndex>,
    /// Member objects, in join order.
    pub members: Vec<ObjectId>,
    /// Whether the team has been activated.
    pub active: bool,
}

impl Team {
    /// The player controlling this team, if any.
    #[must_use]
    pub const fn controlling_player(&self) -> Option<PlayerIndex> {
        self.controller
    }
}

/// Owning registry for team prototypes and team instances.
///
/// The single source of truth for cross-reference resolution: persisted
/// snapshots store prototype/team ids and resolve them here on load.
/// `BTreeMap` storage keeps iteration deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamRegistry {
    prototypes: BTreeMap<TeamPrototypeId, TeamPrototype>,
    teams: BTreeMap<TeamId, Team>,
    next_prototype_id: u32,
    next_team_id: u32,
}

impl TeamRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            prototypes: BTreeMap::new(),
            teams: BTreeMap::new(),
            next_prototype_id: 1,
            next_team_id: 1,
        }
    }

    /// Register a new prototype and return its id.
    pub fn create_prototype(
        &mut self,
        name: impl Into<String>,
        owner: Option<PlayerIndex>,
    ) -> TeamPrototypeId {
        let id = TeamPrototypeId(self.next_prototype_id);
        self.next_prototype_id += 1;
        self.prototypes.insert(
            id,
            TeamPrototype {
                id,
                name: name.into(),
                owner,
                instances: Vec::new(),
            },
        );
        id
    }

    /// Spawn a team instance from a prototype.
    ///
    /// The new team inherits the prototype's owning player as its
    /// controller. Returns `None` if the prototype does not exist.
    pub fn create_team(
        &mut self,
        prototype: TeamPrototypeId,
        name: impl Into<String>,
    ) -> Option<TeamId> {
        let controller = self.prototypes.get(&prototype)?.owner;
        let id = TeamId(self.next_team_id);
        self.next_team_id += 1;
        self.teams.insert(
            id,
            Team {
                id,
                prototype,
                name: name.into(),
                controller,
                members: Vec::new(),
                active: false,
            },
        );
        if let Some(proto) = self.prototypes.get_mut(&prototype) {
            proto.instances.push(id);
        }
        Some(id)
    }

    /// Look up a prototype by id.
    #[must_use]
    pub fn find_prototype(&self, id: TeamPrototypeId) -> Option<&TeamPrototype> {
        self.prototypes.get(&id)
    }

    /// Look up a prototype by id, mutably.
    pub fn prototype_mut(&mut self, id: TeamPrototypeId) -> Option<&mut TeamPrototype> {
        self.prototypes.get_mut(&id)
    }

    /// Look up a team by id.
    #[must_use]
    pub fn find_team(&self, id: TeamId) -> Option<&Team> {
        self.teams.get(&id)
    }

    /// Look up a team by id, mutably.
    pub fn team_mut(&mut self, id: TeamId) -> Option<&mut Team> {
        self.teams.get_mut(&id)
    }

    /// Look up a team by its composed name.
    #[must_use]
    pub fn find_team_by_name(&self, name: &str) -> Option<&Team> {
        self.teams.values().find(|team| team.name == name)
    }

    /// Clear a prototype's owning-player back-reference.
    ///
    /// The prototype itself is untouched; only the weak reference dies.
    pub fn detach_owner(&mut self, id: TeamPrototypeId) {
        if let Some(proto) = self.prototypes.get_mut(&id) {
            proto.owner = None;
        }
    }

    /// Add an object to a team's member list.
    pub fn add_member(&mut self, team: TeamId, object: ObjectId) {
        if let Some(team) = self.teams.get_mut(&team) {
            if !team.members.contains(&object) {
                team.members.push(object);
            }
        }
    }

    /// Remove an object from a team's member list.
    pub fn remove_member(&mut self, team: TeamId, object: ObjectId) {
        if let Some(team) = self.teams.get_mut(&team) {
            team.members.retain(|m| *m != object);
        }
    }

    /// Number of registered prototypes.
    #[must_use]
    pub fn prototype_count(&self) -> usize {
        self.prototypes.len()
    }

    /// Number of live teams.
    #[must_use]
    pub fn team_count(&self) -> usize {
        self.teams.len()
    }
}
