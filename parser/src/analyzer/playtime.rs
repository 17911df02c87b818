use chrono::{NaiveDateTime, TimeDelta};

use crate::analyzer::session::PlayerState;

/// Total connected time of `player`.
///
/// The i-th connect is paired with the i-th disconnect. The first connect without
/// a matching disconnect runs until `session_end` and stops the walk: once a
/// disconnect went unlogged, later reconnects cannot be paired reliably.
pub fn playtime(player: &PlayerState, session_end: NaiveDateTime) -> TimeDelta {
    let disconnects = player.disconnects();
    let mut total = TimeDelta::zero();

    for (i, connected) in player.connects().iter().enumerate() {
        match disconnects.get(i) {
            Some(disconnected) => total += *disconnected - *connected,
            None => {
                total += session_end - *connected;
                break;
            }
        }
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::Analyzer;
    use crate::analyzer::session::SessionModel;
    use crate::extractor::LogEvent;
    use crate::types::PlayerName;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 2, 26)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn session(events: &[(bool, NaiveDateTime)], last: NaiveDateTime) -> SessionModel {
        let mut model = SessionModel::new();
        let player = PlayerName::from("gordon");
        for (connect, ts) in events {
            let event = if *connect {
                LogEvent::PlayerConnected {
                    at: *ts,
                    player: player.clone(),
                }
            } else {
                LogEvent::PlayerDisconnected {
                    at: *ts,
                    player: player.clone(),
                }
            };
            model.process(&event);
        }
        model.process(&LogEvent::TimestampObserved { at: last });
        model.finish();
        model
    }

    #[test]
    fn paired_sessions_sum_up() {
        let model = session(
            &[
                (true, at(20, 0, 0)),
                (false, at(20, 10, 0)),
                (true, at(20, 20, 0)),
                (false, at(20, 25, 30)),
            ],
            at(23, 0, 0),
        );
        assert_eq!(
            model.playtime_of("gordon"),
            Some(TimeDelta::seconds(10 * 60 + 5 * 60 + 30))
        );
    }

    #[test]
    fn open_session_ends_at_last_timestamp() {
        let model = session(&[(true, at(20, 0, 0))], at(20, 45, 0));
        assert_eq!(model.playtime_of("gordon"), Some(TimeDelta::minutes(45)));
    }

    #[test]
    fn walk_stops_at_first_open_session() {
        // two connects logged back to back, one disconnect
        let model = session(
            &[
                (true, at(20, 0, 0)),
                (false, at(20, 10, 0)),
                (true, at(20, 20, 0)),
                (true, at(20, 40, 0)),
            ],
            at(21, 0, 0),
        );
        assert_eq!(
            model.playtime_of("gordon"),
            Some(TimeDelta::minutes(10 + 40))
        );
    }

    #[test]
    fn no_connects_is_zero() {
        let player = PlayerState::new(PlayerName::from("gordon"));
        assert_eq!(playtime(&player, at(21, 0, 0)), TimeDelta::zero());
    }

    #[test]
    fn unknown_player_has_no_playtime() {
        let model = session(&[(true, at(20, 0, 0))], at(20, 1, 0));
        assert_eq!(model.playtime_of("barney"), None);
    }
}
