use chrono::NaiveDateTime;
use std::borrow::Borrow;
use std::fmt;
use tracing::trace;

/// Layout of the combined `date time` captures of a log line preamble.
pub const LOG_TIMESTAMP_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// A player's display name as it appears in quoted log tokens.
///
/// This is the only key a player is tracked by. The numeric session id and the
/// account id printed next to it in the log are not stable across reconnects, so
/// two players sharing a name are merged and a renamed player is split.
#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlayerName(pub String);

impl PlayerName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for PlayerName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerName {
    fn from(v: &str) -> Self {
        PlayerName(v.to_owned())
    }
}

impl From<String> for PlayerName {
    fn from(v: String) -> Self {
        PlayerName(v)
    }
}

/// Weapon identifier from a kill or suicide line (`crossbow`, `worldspawn`, ...).
#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeaponName(pub String);

impl WeaponName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WeaponName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for WeaponName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WeaponName {
    fn from(v: &str) -> Self {
        WeaponName(v.to_owned())
    }
}

impl From<String> for WeaponName {
    fn from(v: String) -> Self {
        WeaponName(v)
    }
}

/// Parses the `MM/DD/YYYY` and `HH:MM:SS` parts of a line preamble.
///
/// The result is a wall-clock instant in whatever zone the server wrote the log in.
/// Unparseable input (e.g. `02/30/2024`) degrades to the zero instant instead of
/// dropping the line.
pub fn parse_log_timestamp(date: &str, time: &str) -> NaiveDateTime {
    let combined = format!("{date} {time}");
    match NaiveDateTime::parse_from_str(&combined, LOG_TIMESTAMP_FORMAT) {
        Ok(ts) => ts,
        Err(e) => {
            trace!("unparseable log timestamp {combined:?}: {e}");
            NaiveDateTime::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn parses_preamble_timestamp() {
        let ts = parse_log_timestamp("02/26/2024", "21:04:59");
        let expected = NaiveDate::from_ymd_opt(2024, 2, 26)
            .unwrap()
            .and_hms_opt(21, 4, 59)
            .unwrap();
        assert_eq!(ts, expected);
    }

    #[test]
    fn bad_timestamp_is_zero_instant() {
        assert_eq!(
            parse_log_timestamp("02/30/2024", "10:00:00"),
            NaiveDateTime::default()
        );
        assert_eq!(
            parse_log_timestamp("02/26/2024", "25:00:00"),
            NaiveDateTime::default()
        );
    }

    #[test]
    fn names_lookup_by_str() {
        let mut players = std::collections::HashMap::new();
        players.insert(PlayerName::from("gordon"), 1);
        assert_eq!(players.get("gordon"), Some(&1));
        assert_eq!(PlayerName::from("gordon").to_string(), "gordon");
    }
}
