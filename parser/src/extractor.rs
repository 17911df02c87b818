//! Line classification for Half-Life dedicated server logs.
//!
//! Every recognized line starts with the preamble `L MM/DD/YYYY - HH:MM:SS: `.
//! Player tokens look like `"name<17><STEAM_0:1:2345><team>"`; only the name is
//! kept.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::{Captures, Regex};
use strum_macros::{Display, EnumIter};

use crate::types::{PlayerName, WeaponName, parse_log_timestamp};

const PREAMBLE: &str = r"^L (?P<date>\d{2}/\d{2}/\d{4}) - (?P<time>\d{2}:\d{2}:\d{2}): ";

/// Quoted player token capturing the display name into `group`.
fn player_token(group: &str) -> String {
    format!(r#""(?P<{group}>[^"]+?)<\d+><[^>]*><[^>]*>""#)
}

/// The shape a line was recognized as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum EventKind {
    #[strum(serialize = "map load")]
    MapLoaded,
    #[strum(serialize = "connected")]
    PlayerConnected,
    #[strum(serialize = "disconnected")]
    PlayerDisconnected,
    #[strum(serialize = "kill")]
    PlayerKilled,
    #[strum(serialize = "suicide")]
    PlayerSuicided,
    #[strum(serialize = "timestamp")]
    TimestampObserved,
}

/// A typed event extracted from one log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    MapLoaded {
        at: NaiveDateTime,
        map: String,
    },
    PlayerConnected {
        at: NaiveDateTime,
        player: PlayerName,
    },
    PlayerDisconnected {
        at: NaiveDateTime,
        player: PlayerName,
    },
    PlayerKilled {
        at: NaiveDateTime,
        killer: PlayerName,
        victim: PlayerName,
        weapon: WeaponName,
    },
    PlayerSuicided {
        at: NaiveDateTime,
        player: PlayerName,
        weapon: WeaponName,
    },
    /// Any preamble-carrying line, recognized or not.
    TimestampObserved { at: NaiveDateTime },
}

impl LogEvent {
    /// Timestamp from the line preamble.
    pub fn timestamp(&self) -> NaiveDateTime {
        match self {
            Self::MapLoaded { at, .. }
            | Self::PlayerConnected { at, .. }
            | Self::PlayerDisconnected { at, .. }
            | Self::PlayerKilled { at, .. }
            | Self::PlayerSuicided { at, .. }
            | Self::TimestampObserved { at } => *at,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Self::MapLoaded { .. } => EventKind::MapLoaded,
            Self::PlayerConnected { .. } => EventKind::PlayerConnected,
            Self::PlayerDisconnected { .. } => EventKind::PlayerDisconnected,
            Self::PlayerKilled { .. } => EventKind::PlayerKilled,
            Self::PlayerSuicided { .. } => EventKind::PlayerSuicided,
            Self::TimestampObserved { .. } => EventKind::TimestampObserved,
        }
    }
}

struct LineMatcher {
    kind: EventKind,
    regex: Regex,
    build: fn(&Captures<'_>, NaiveDateTime) -> LogEvent,
}

impl LineMatcher {
    fn new(
        kind: EventKind,
        payload: &str,
        build: fn(&Captures<'_>, NaiveDateTime) -> LogEvent,
    ) -> Self {
        let pattern = format!("{PREAMBLE}{payload}");
        let regex = Regex::new(&pattern)
            .unwrap_or_else(|e| panic!("invalid {kind} line pattern {pattern:?}: {e}"));
        Self { kind, regex, build }
    }

    fn extract(&self, line: &str) -> Option<LogEvent> {
        let caps = self.regex.captures(line)?;
        let at = parse_log_timestamp(&caps["date"], &caps["time"]);
        Some((self.build)(&caps, at))
    }
}

/// Matchers in priority order. The bare preamble matcher is always last.
static MATCHERS: LazyLock<Vec<LineMatcher>> = LazyLock::new(|| {
    vec![
        LineMatcher::new(EventKind::MapLoaded, r#"Loading map "(?P<map>[^"]+)""#, |caps, at| {
            LogEvent::MapLoaded {
                at,
                map: caps["map"].to_owned(),
            }
        }),
        LineMatcher::new(
            EventKind::PlayerConnected,
            &format!("{} connected, address ", player_token("nick")),
            |caps, at| LogEvent::PlayerConnected {
                at,
                player: PlayerName::from(&caps["nick"]),
            },
        ),
        LineMatcher::new(
            EventKind::PlayerDisconnected,
            &format!("{} disconnected", player_token("nick")),
            |caps, at| LogEvent::PlayerDisconnected {
                at,
                player: PlayerName::from(&caps["nick"]),
            },
        ),
        LineMatcher::new(
            EventKind::PlayerKilled,
            &format!(
                r#"{} killed {} with "(?P<weapon>[^"]+)""#,
                player_token("nick"),
                player_token("victim")
            ),
            |caps, at| LogEvent::PlayerKilled {
                at,
                killer: PlayerName::from(&caps["nick"]),
                victim: PlayerName::from(&caps["victim"]),
                weapon: WeaponName::from(&caps["weapon"]),
            },
        ),
        LineMatcher::new(
            EventKind::PlayerSuicided,
            &format!(
                r#"{} committed suicide with "(?P<weapon>[^"]+)""#,
                player_token("nick")
            ),
            |caps, at| LogEvent::PlayerSuicided {
                at,
                player: PlayerName::from(&caps["nick"]),
                weapon: WeaponName::from(&caps["weapon"]),
            },
        ),
        LineMatcher::new(EventKind::TimestampObserved, "", |_, at| {
            LogEvent::TimestampObserved { at }
        }),
    ]
});

/// Runs every matcher against `line` and returns all hits in priority order.
///
/// A timestamped line always yields a trailing [`LogEvent::TimestampObserved`].
pub fn classify_all(line: &str) -> Vec<LogEvent> {
    MATCHERS
        .iter()
        .filter_map(|matcher| matcher.extract(line))
        .collect()
}

/// Classifies one log line.
///
/// Returns the most specific event the line matches, a bare
/// [`LogEvent::TimestampObserved`] when only the preamble is recognized, or
/// `None` for lines without a preamble. Every returned event carries the line
/// timestamp, so the caller can track the latest one from any variant.
pub fn classify(line: &str) -> Option<LogEvent> {
    classify_all(line).into_iter().next()
}

/// Kinds of all matchers, in the order they are tried.
pub fn matcher_order() -> impl Iterator<Item = EventKind> {
    MATCHERS.iter().map(|matcher| matcher.kind)
}
