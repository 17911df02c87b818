//! Cross-reference matrices and per-player summaries built from a finished
//! [`SessionModel`].

use std::borrow::Cow;
use std::fmt;
use std::io::{self, Write};

use chrono::{NaiveDateTime, TimeDelta};
use serde::Deserialize;
use strum_macros::{Display, EnumString};
use tracing::info;

use crate::analyzer::playtime::playtime;
use crate::analyzer::session::{PlayerState, SessionModel};
use crate::types::PlayerName;

/// Column and row order of players in every report.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum PlayerOrder {
    /// Order in which player records were created while reading the log
    #[default]
    FirstSeen,
    Alphabetical,
}

impl PlayerOrder {
    pub fn arrange(self, model: &SessionModel) -> Vec<&PlayerName> {
        let mut names: Vec<&PlayerName> = model.player_names().iter().collect();
        if self == PlayerOrder::Alphabetical {
            names.sort();
        }
        names
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixRow {
    pub label: String,
    pub cells: Vec<usize>,
}

/// A grid of counts with a header row and a header column.
///
/// `Display` renders it as CSV, one record per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    corner: &'static str,
    columns: Vec<String>,
    rows: Vec<MatrixRow>,
}

impl Matrix {
    /// Label of the top-left cell.
    pub fn corner(&self) -> &str {
        self.corner
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[MatrixRow] {
        &self.rows
    }

    pub fn cell(&self, row: &str, column: &str) -> Option<usize> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.rows
            .iter()
            .find(|r| r.label == row)
            .and_then(|r| r.cells.get(index).copied())
    }

    pub fn write_csv<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write!(writer, "{self}")
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = std::iter::once(Cow::Borrowed(self.corner))
            .chain(self.columns.iter().map(|c| Cow::Borrowed(c.as_str())));
        write_record(f, header)?;

        for row in &self.rows {
            let record = std::iter::once(Cow::Borrowed(row.label.as_str()))
                .chain(row.cells.iter().map(|n| Cow::Owned(n.to_string())));
            write_record(f, record)?;
        }
        Ok(())
    }
}

fn write_record<'a>(
    f: &mut fmt::Formatter<'_>,
    fields: impl Iterator<Item = Cow<'a, str>>,
) -> fmt::Result {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        f.write_str(&escape_field(&field))?;
    }
    f.write_str("\n")
}

/// Quotes a CSV field when it would otherwise be ambiguous.
fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\r', '\n']) || field.starts_with([' ', '\t']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

fn player_columns(players: &[&PlayerName]) -> Vec<String> {
    players.iter().map(|p| p.to_string()).collect()
}

/// Killers down the side, victims across the top.
///
/// A player cannot frag themselves, so the diagonal holds suicide counts instead.
pub fn kill_matrix(model: &SessionModel, players: &[&PlayerName]) -> Matrix {
    let rows = players
        .iter()
        .filter_map(|killer| {
            let state = model.player(killer.as_str())?;
            let cells = players
                .iter()
                .map(|victim| {
                    if victim == killer {
                        state.suicide_count()
                    } else {
                        state.kills_of(victim.as_str()).len()
                    }
                })
                .collect();
            Some(MatrixRow {
                label: killer.to_string(),
                cells,
            })
        })
        .collect();

    Matrix {
        corner: "who",
        columns: player_columns(players),
        rows,
    }
}

fn weapon_matrix(
    model: &SessionModel,
    players: &[&PlayerName],
    count: impl Fn(&PlayerState, &str) -> usize,
) -> Matrix {
    let rows = model
        .weapons()
        .iter()
        .map(|weapon| MatrixRow {
            label: weapon.to_string(),
            cells: players
                .iter()
                .map(|player| {
                    model
                        .player(player.as_str())
                        .map_or(0, |state| count(state, weapon.as_str()))
                })
                .collect(),
        })
        .collect();

    Matrix {
        corner: "what",
        columns: player_columns(players),
        rows,
    }
}

/// Weapons down the side, players across the top, kills made in each cell.
pub fn kills_by_weapon_matrix(model: &SessionModel, players: &[&PlayerName]) -> Matrix {
    weapon_matrix(model, players, |state, weapon| state.kills_with(weapon).len())
}

/// Weapons down the side, players across the top, deaths suffered in each cell.
pub fn deaths_by_weapon_matrix(model: &SessionModel, players: &[&PlayerName]) -> Matrix {
    weapon_matrix(model, players, |state, weapon| state.deaths_from(weapon).len())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSummary {
    pub name: PlayerName,
    pub playtime: TimeDelta,
    pub kills: usize,
    pub deaths: usize,
    pub suicides: usize,
}

impl PlayerSummary {
    fn from_state(state: &PlayerState, session_end: NaiveDateTime) -> Self {
        Self {
            name: state.name().clone(),
            playtime: playtime(state, session_end),
            kills: state.kill_count(),
            deaths: state.death_count(),
            suicides: state.suicide_count(),
        }
    }
}

/// Everything printed at the end of a run.
#[derive(Debug, Clone)]
pub struct SessionReport {
    map_name: Option<String>,
    players: Vec<PlayerSummary>,
    who_kills_whom: Matrix,
    who_kills_with_what: Matrix,
    who_is_killed_by_what: Matrix,
}

impl SessionReport {
    /// Builds the report. `model` must already be finished, otherwise the weapon
    /// matrices have no rows.
    pub fn build(model: &SessionModel, order: PlayerOrder) -> Self {
        let players = order.arrange(model);
        let session_end = model.session_end();

        let summaries = players
            .iter()
            .filter_map(|name| model.player(name.as_str()))
            .map(|state| PlayerSummary::from_state(state, session_end))
            .collect();

        Self {
            map_name: model.map_name().map(str::to_owned),
            players: summaries,
            who_kills_whom: kill_matrix(model, &players),
            who_kills_with_what: kills_by_weapon_matrix(model, &players),
            who_is_killed_by_what: deaths_by_weapon_matrix(model, &players),
        }
    }

    pub fn map_name(&self) -> Option<&str> {
        self.map_name.as_deref()
    }

    pub fn players(&self) -> &[PlayerSummary] {
        &self.players
    }

    pub fn who_kills_whom(&self) -> &Matrix {
        &self.who_kills_whom
    }

    pub fn who_kills_with_what(&self) -> &Matrix {
        &self.who_kills_with_what
    }

    pub fn who_is_killed_by_what(&self) -> &Matrix {
        &self.who_is_killed_by_what
    }

    /// The three matrices with their labels, in output order.
    pub fn matrices(&self) -> [(&'static str, &Matrix); 3] {
        [
            ("who kills whom", &self.who_kills_whom),
            ("who kills with what", &self.who_kills_with_what),
            ("who is killed by what", &self.who_is_killed_by_what),
        ]
    }

    pub fn log_summary(&self) {
        info!("map played: {}", self.map_name().unwrap_or("<none>"));
        for player in &self.players {
            info!("{} summary:", player.name);
            info!("\t playtime: {}s", player.playtime.num_seconds());
            info!("\t frags: {}", player.kills);
            info!("\t deaths: {}", player.deaths);
            info!("\t suicides: {}", player.suicides);
        }
    }

    /// Writes the matrices as CSV, logging each label before its table.
    pub fn write_matrices<W: Write>(&self, writer: &mut W) -> crate::Result<()> {
        for (label, matrix) in self.matrices() {
            info!("{label}:");
            matrix.write_csv(writer)?;
            writer.flush()?;
        }
        Ok(())
    }
}
