use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::types::{PlayerName, WeaponName};

/// One frag. The same record is filed in the global kill history, under the
/// killer's victims and weapons, and under the victim's deaths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KillRecord {
    pub killer: PlayerName,
    pub victim: PlayerName,
    pub weapon: WeaponName,
    pub at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuicideRecord {
    pub player: PlayerName,
    pub weapon: WeaponName,
    pub at: NaiveDateTime,
}

/// Everything known about one player, keyed by display name.
#[derive(Debug, Clone)]
pub struct PlayerState {
    name: PlayerName,
    connects: Vec<NaiveDateTime>,
    disconnects: Vec<NaiveDateTime>,
    kill_count: usize,
    suicide_count: usize,
    kills_of_player: HashMap<PlayerName, Vec<KillRecord>>,
    kills_with_weapon: HashMap<WeaponName, Vec<KillRecord>>,
    deaths_from_weapon: HashMap<WeaponName, Vec<KillRecord>>,
}

impl PlayerState {
    pub(crate) fn new(name: PlayerName) -> Self {
        Self {
            name,
            connects: Vec::new(),
            disconnects: Vec::new(),
            kill_count: 0,
            suicide_count: 0,
            kills_of_player: HashMap::new(),
            kills_with_weapon: HashMap::new(),
            deaths_from_weapon: HashMap::new(),
        }
    }

    pub fn name(&self) -> &PlayerName {
        &self.name
    }

    /// Connect timestamps in log order.
    pub fn connects(&self) -> &[NaiveDateTime] {
        &self.connects
    }

    /// Disconnect timestamps in log order. May be shorter than [`Self::connects`].
    pub fn disconnects(&self) -> &[NaiveDateTime] {
        &self.disconnects
    }

    pub fn kill_count(&self) -> usize {
        self.kill_count
    }

    pub fn suicide_count(&self) -> usize {
        self.suicide_count
    }

    /// Number of times this player was fragged by someone else.
    pub fn death_count(&self) -> usize {
        self.deaths_from_weapon.values().map(Vec::len).sum()
    }

    pub fn kills_of_player(&self) -> &HashMap<PlayerName, Vec<KillRecord>> {
        &self.kills_of_player
    }

    pub fn kills_with_weapon(&self) -> &HashMap<WeaponName, Vec<KillRecord>> {
        &self.kills_with_weapon
    }

    pub fn deaths_from_weapon(&self) -> &HashMap<WeaponName, Vec<KillRecord>> {
        &self.deaths_from_weapon
    }

    /// Kills of `victim` by this player.
    pub fn kills_of(&self, victim: &str) -> &[KillRecord] {
        self.kills_of_player
            .get(victim)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Kills this player made with `weapon`.
    pub fn kills_with(&self, weapon: &str) -> &[KillRecord] {
        self.kills_with_weapon
            .get(weapon)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Deaths this player suffered from `weapon`.
    pub fn deaths_from(&self, weapon: &str) -> &[KillRecord] {
        self.deaths_from_weapon
            .get(weapon)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub(super) fn push_connect(&mut self, at: NaiveDateTime) {
        self.connects.push(at);
    }

    pub(super) fn push_disconnect(&mut self, at: NaiveDateTime) {
        self.disconnects.push(at);
    }

    pub(super) fn file_kill(&mut self, record: &KillRecord) {
        self.kill_count += 1;
        self.kills_of_player
            .entry(record.victim.clone())
            .or_default()
            .push(record.clone());
        self.kills_with_weapon
            .entry(record.weapon.clone())
            .or_default()
            .push(record.clone());
    }

    pub(super) fn file_death(&mut self, record: &KillRecord) {
        self.deaths_from_weapon
            .entry(record.weapon.clone())
            .or_default()
            .push(record.clone());
    }

    pub(super) fn count_suicide(&mut self) {
        self.suicide_count += 1;
    }
}
