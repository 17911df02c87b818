use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};

use chrono::{NaiveDateTime, TimeDelta};
use tracing::{debug, warn};

use crate::analyzer::analyzer::Analyzer;
use crate::analyzer::playtime::playtime;
use crate::error::Anomaly;
use crate::extractor::{EventKind, LogEvent};
use crate::types::{PlayerName, WeaponName};

use super::state::{KillRecord, PlayerState, SuicideRecord};

/// In-memory aggregate of one server session log.
///
/// Events are absorbed one at a time through [`Analyzer::process`]. Once the input
/// is exhausted, [`Analyzer::finish`] derives the weapon listing used by the
/// weapon matrices.
#[derive(Debug, Default)]
pub struct SessionModel {
    map_name: Option<String>,
    players: HashMap<PlayerName, PlayerState>,
    /// Player names in the order their records were created
    player_order: Vec<PlayerName>,
    kills: Vec<KillRecord>,
    suicides: Vec<SuicideRecord>,
    weapons: Vec<WeaponName>,
    last_timestamp: Option<NaiveDateTime>,
    anomalies: Vec<Anomaly>,
    events_processed: usize,
}

impl SessionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently loaded map.
    pub fn map_name(&self) -> Option<&str> {
        self.map_name.as_deref()
    }

    pub fn player(&self, name: &str) -> Option<&PlayerState> {
        self.players.get(name)
    }

    /// Player names in first-seen order.
    pub fn player_names(&self) -> &[PlayerName] {
        &self.player_order
    }

    /// Player records in first-seen order.
    pub fn players(&self) -> impl Iterator<Item = &PlayerState> {
        self.player_order
            .iter()
            .filter_map(|name| self.players.get(name))
    }

    /// Every kill in log order, including ones involving unknown players.
    pub fn kills(&self) -> &[KillRecord] {
        &self.kills
    }

    /// Every suicide in log order, including ones by unknown players.
    pub fn suicides(&self) -> &[SuicideRecord] {
        &self.suicides
    }

    /// Sorted weapons that appear in any player's kills. Empty until `finish`.
    pub fn weapons(&self) -> &[WeaponName] {
        &self.weapons
    }

    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.last_timestamp
    }

    /// Fallback end for sessions whose disconnect was never logged.
    pub fn session_end(&self) -> NaiveDateTime {
        self.last_timestamp.unwrap_or_default()
    }

    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    pub fn events_processed(&self) -> usize {
        self.events_processed
    }

    /// Connected time of `name`, closing an open session at the last logged timestamp.
    pub fn playtime_of(&self, name: &str) -> Option<TimeDelta> {
        self.player(name)
            .map(|player| playtime(player, self.session_end()))
    }

    pub fn on_connect(&mut self, player: &PlayerName, at: NaiveDateTime) {
        let state = match self.players.entry(player.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                debug!("new player {player}");
                self.player_order.push(player.clone());
                entry.insert(PlayerState::new(player.clone()))
            }
        };
        state.push_connect(at);
    }

    pub fn on_disconnect(&mut self, player: &PlayerName, at: NaiveDateTime) {
        match self.players.get_mut(player) {
            Some(state) => state.push_disconnect(at),
            None => self.unknown_player(EventKind::PlayerDisconnected, player),
        }
    }

    /// Files a kill in the global history and, where the players are known, in
    /// the killer's and victim's indices. A missing killer does not prevent the
    /// victim's death from being filed, and vice versa.
    pub fn on_kill(
        &mut self,
        killer: &PlayerName,
        victim: &PlayerName,
        weapon: &WeaponName,
        at: NaiveDateTime,
    ) {
        let record = KillRecord {
            killer: killer.clone(),
            victim: victim.clone(),
            weapon: weapon.clone(),
            at,
        };

        match self.players.get_mut(killer) {
            Some(state) => state.file_kill(&record),
            None => self.unknown_player(EventKind::PlayerKilled, killer),
        }

        match self.players.get_mut(victim) {
            Some(state) => state.file_death(&record),
            None => self.unknown_player(EventKind::PlayerKilled, victim),
        }

        self.kills.push(record);
    }

    pub fn on_suicide(&mut self, player: &PlayerName, weapon: &WeaponName, at: NaiveDateTime) {
        self.suicides.push(SuicideRecord {
            player: player.clone(),
            weapon: weapon.clone(),
            at,
        });

        match self.players.get_mut(player) {
            Some(state) => state.count_suicide(),
            None => self.unknown_player(EventKind::PlayerSuicided, player),
        }
    }

    pub fn on_map_loaded(&mut self, map: &str) {
        if let Some(previous) = self.map_name.as_deref() {
            debug!("map changed from {previous} to {map}");
        }
        self.map_name = Some(map.to_owned());
    }

    /// Log lines are trusted to be chronological, so the latest line always wins.
    pub fn on_timestamp_observed(&mut self, at: NaiveDateTime) {
        self.last_timestamp = Some(at);
    }

    fn unknown_player(&mut self, event: EventKind, name: &PlayerName) {
        let anomaly = Anomaly::UnknownPlayer {
            event,
            name: name.clone(),
        };
        warn!("{anomaly}");
        self.anomalies.push(anomaly);
    }

    fn collect_weapons(&mut self) {
        let weapons: BTreeSet<&WeaponName> = self
            .players
            .values()
            .flat_map(|player| player.kills_with_weapon().keys())
            .collect();
        self.weapons = weapons.into_iter().cloned().collect();
    }
}

impl Analyzer for SessionModel {
    fn process(&mut self, event: &LogEvent) {
        self.events_processed += 1;

        match event {
            LogEvent::MapLoaded { map, .. } => self.on_map_loaded(map),
            LogEvent::PlayerConnected { at, player } => self.on_connect(player, *at),
            LogEvent::PlayerDisconnected { at, player } => self.on_disconnect(player, *at),
            LogEvent::PlayerKilled {
                at,
                killer,
                victim,
                weapon,
            } => self.on_kill(killer, victim, weapon, *at),
            LogEvent::PlayerSuicided { at, player, weapon } => {
                self.on_suicide(player, weapon, *at)
            }
            LogEvent::TimestampObserved { .. } => {}
        }

        // Every variant comes from a preamble-carrying line.
        self.on_timestamp_observed(event.timestamp());
    }

    fn finish(&mut self) {
        self.collect_weapons();
        debug!(
            "session finished: {} events, {} players, {} kills, {} suicides, {} weapons, {} anomalies",
            self.events_processed,
            self.players.len(),
            self.kills.len(),
            self.suicides.len(),
            self.weapons.len(),
            self.anomalies.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 2, 26)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn name(s: &str) -> PlayerName {
        PlayerName::from(s)
    }

    fn kill(killer: &str, victim: &str, weapon: &str, ts: NaiveDateTime) -> LogEvent {
        LogEvent::PlayerKilled {
            at: ts,
            killer: name(killer),
            victim: name(victim),
            weapon: WeaponName::from(weapon),
        }
    }

    fn connect(player: &str, ts: NaiveDateTime) -> LogEvent {
        LogEvent::PlayerConnected {
            at: ts,
            player: name(player),
        }
    }

    fn run(events: &[LogEvent]) -> SessionModel {
        let mut model = SessionModel::new();
        for event in events {
            model.process(event);
        }
        model.finish();
        model
    }

    #[test]
    fn first_connect_creates_player_once() {
        let model = run(&[
            connect("gordon", at(20, 0, 0)),
            connect("barney", at(20, 0, 1)),
            connect("gordon", at(20, 5, 0)),
        ]);
        assert_eq!(model.player_names(), &[name("gordon"), name("barney")]);
        assert_eq!(
            model.player("gordon").unwrap().connects(),
            &[at(20, 0, 0), at(20, 5, 0)]
        );
    }

    #[test]
    fn kill_is_filed_in_every_index() {
        let model = run(&[
            connect("gordon", at(20, 0, 0)),
            connect("barney", at(20, 0, 1)),
            kill("gordon", "barney", "crowbar", at(20, 1, 0)),
        ]);

        let record = &model.kills()[0];
        let gordon = model.player("gordon").unwrap();
        let barney = model.player("barney").unwrap();

        assert_eq!(gordon.kill_count(), 1);
        assert_eq!(gordon.kills_of("barney"), std::slice::from_ref(record));
        assert_eq!(gordon.kills_with("crowbar"), std::slice::from_ref(record));
        assert_eq!(barney.deaths_from("crowbar"), std::slice::from_ref(record));
        assert_eq!(barney.death_count(), 1);
        assert_eq!(barney.kill_count(), 0);
        assert!(model.anomalies().is_empty());
    }

    #[test]
    fn unknown_killer_keeps_history_and_victim_death() {
        let model = run(&[
            connect("barney", at(20, 0, 1)),
            kill("ghost", "barney", "gauss", at(20, 1, 0)),
        ]);

        assert_eq!(model.kills().len(), 1);
        assert!(model.player("ghost").is_none());
        assert_eq!(model.player("barney").unwrap().deaths_from("gauss").len(), 1);
        assert_eq!(
            model.anomalies(),
            &[Anomaly::UnknownPlayer {
                event: EventKind::PlayerKilled,
                name: name("ghost"),
            }]
        );
        assert!(model.weapons().is_empty());
    }

    #[test]
    fn unknown_victim_keeps_killer_stats() {
        let model = run(&[
            connect("gordon", at(20, 0, 0)),
            kill("gordon", "ghost", "gauss", at(20, 1, 0)),
        ]);

        let gordon = model.player("gordon").unwrap();
        assert_eq!(gordon.kill_count(), 1);
        assert_eq!(gordon.kills_of("ghost").len(), 1);
        assert_eq!(model.weapons(), &[WeaponName::from("gauss")]);
        assert_eq!(model.anomalies().len(), 1);
    }

    #[test]
    fn disconnect_and_suicide_of_unknown_player() {
        let model = run(&[
            LogEvent::PlayerDisconnected {
                at: at(20, 0, 0),
                player: name("ghost"),
            },
            LogEvent::PlayerSuicided {
                at: at(20, 0, 1),
                player: name("ghost"),
                weapon: WeaponName::from("worldspawn"),
            },
        ]);

        assert!(model.player_names().is_empty());
        assert_eq!(model.suicides().len(), 1);
        assert_eq!(
            model.anomalies(),
            &[
                Anomaly::UnknownPlayer {
                    event: EventKind::PlayerDisconnected,
                    name: name("ghost"),
                },
                Anomaly::UnknownPlayer {
                    event: EventKind::PlayerSuicided,
                    name: name("ghost"),
                },
            ]
        );
        assert_eq!(
            model.anomalies()[0].to_string(),
            "got disconnected event for an unknown player: ghost"
        );
    }

    #[test]
    fn suicide_counts_for_known_player() {
        let model = run(&[
            connect("gordon", at(20, 0, 0)),
            LogEvent::PlayerSuicided {
                at: at(20, 0, 1),
                player: name("gordon"),
                weapon: WeaponName::from("satchel"),
            },
        ]);
        let gordon = model.player("gordon").unwrap();
        assert_eq!(gordon.suicide_count(), 1);
        assert_eq!(gordon.kill_count(), 0);
        // suicides never reach the weapon listing
        assert!(model.weapons().is_empty());
    }

    #[test]
    fn last_map_wins() {
        let model = run(&[
            LogEvent::MapLoaded {
                at: at(20, 0, 0),
                map: "crossfire".to_owned(),
            },
            LogEvent::MapLoaded {
                at: at(20, 30, 0),
                map: "stalkyard".to_owned(),
            },
        ]);
        assert_eq!(model.map_name(), Some("stalkyard"));
    }

    #[test]
    fn last_timestamp_follows_line_order() {
        let model = run(&[
            LogEvent::TimestampObserved { at: at(20, 10, 0) },
            connect("gordon", at(20, 5, 0)),
        ]);
        assert_eq!(model.last_timestamp(), Some(at(20, 5, 0)));
        assert_eq!(model.events_processed(), 2);
    }

    #[test]
    fn weapons_are_exactly_the_kill_weapons() {
        let model = run(&[
            connect("gordon", at(20, 0, 0)),
            connect("barney", at(20, 0, 0)),
            kill("gordon", "barney", "mp5", at(20, 1, 0)),
            kill("barney", "gordon", "crossbow", at(20, 2, 0)),
            kill("gordon", "barney", "mp5", at(20, 3, 0)),
            kill("ghost", "barney", "rpg", at(20, 4, 0)),
        ]);

        let from_indices: BTreeSet<WeaponName> = model
            .players()
            .flat_map(|p| p.kills_with_weapon().keys().cloned())
            .collect();
        let listed: BTreeSet<WeaponName> = model.weapons().iter().cloned().collect();
        assert_eq!(listed, from_indices);
        assert_eq!(
            model.weapons(),
            &[WeaponName::from("crossbow"), WeaponName::from("mp5")]
        );
    }

    #[test]
    fn victim_index_sums_to_kill_count() {
        let model = run(&[
            connect("gordon", at(20, 0, 0)),
            connect("barney", at(20, 0, 0)),
            connect("otis", at(20, 0, 0)),
            kill("gordon", "barney", "mp5", at(20, 1, 0)),
            kill("gordon", "otis", "glock", at(20, 2, 0)),
            kill("gordon", "barney", "crowbar", at(20, 3, 0)),
            kill("gordon", "ghost", "crowbar", at(20, 4, 0)),
        ]);

        let gordon = model.player("gordon").unwrap();
        let filed: usize = gordon.kills_of_player().values().map(Vec::len).sum();
        assert_eq!(filed, gordon.kill_count());
        assert_eq!(gordon.kill_count(), 4);
    }
}
