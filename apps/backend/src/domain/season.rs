//! Toronto Tempo 2026 home schedule, seeded into every new room.

use time::macros::{date, time};
use time::{Date, Time};

pub const COLISEUM: &str = "Coca-Cola Coliseum";
pub const ARENA: &str = "Scotiabank Arena";

/// Games starting before this hour are family friendly.
const FAMILY_CUTOFF_HOUR: u8 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogGame {
    pub opponent: &'static str,
    pub venue: &'static str,
    pub date: Date,
    pub time: Time,
    pub is_marquee: bool,
}

impl CatalogGame {
    pub fn is_family(&self) -> bool {
        self.time.hour() < FAMILY_CUTOFF_HOUR
    }
}

const fn game(
    opponent: &'static str,
    venue: &'static str,
    date: Date,
    time: Time,
    is_marquee: bool,
) -> CatalogGame {
    CatalogGame {
        opponent,
        venue,
        date,
        time,
        is_marquee,
    }
}

pub const SEASON_2026: [CatalogGame; 18] = [
    game("Las Vegas Aces", COLISEUM, date!(2026 - 05 - 15), time!(19:00), true),
    game("Seattle Storm", COLISEUM, date!(2026 - 05 - 22), time!(19:00), true),
    game("Indiana Fever", COLISEUM, date!(2026 - 05 - 29), time!(15:00), false),
    game("Chicago Sky", COLISEUM, date!(2026 - 06 - 05), time!(19:00), false),
    game("New York Liberty", COLISEUM, date!(2026 - 06 - 12), time!(19:00), true),
    game("Atlanta Dream", COLISEUM, date!(2026 - 06 - 19), time!(15:00), false),
    game("Washington Mystics", COLISEUM, date!(2026 - 06 - 26), time!(19:00), false),
    game("New York Liberty", ARENA, date!(2026 - 06 - 28), time!(19:00), true),
    game("Phoenix Mercury", COLISEUM, date!(2026 - 07 - 03), time!(19:00), true),
    game("Dallas Wings", COLISEUM, date!(2026 - 07 - 10), time!(15:00), false),
    game("Connecticut Sun", COLISEUM, date!(2026 - 07 - 17), time!(19:00), true),
    game("Minnesota Lynx", COLISEUM, date!(2026 - 07 - 24), time!(19:00), false),
    game("Los Angeles Sparks", COLISEUM, date!(2026 - 07 - 31), time!(15:00), false),
    game("Seattle Storm", ARENA, date!(2026 - 08 - 02), time!(15:00), true),
    game("Golden State Valkyries", COLISEUM, date!(2026 - 08 - 07), time!(19:00), false),
    game("Las Vegas Aces", COLISEUM, date!(2026 - 08 - 14), time!(19:00), true),
    game("Chicago Sky", COLISEUM, date!(2026 - 08 - 21), time!(15:00), false),
    game("Connecticut Sun", ARENA, date!(2026 - 08 - 28), time!(19:00), true),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::turn::TOTAL_TURNS;

    #[test]
    fn one_game_per_turn() {
        assert_eq!(SEASON_2026.len(), TOTAL_TURNS);
    }

    #[test]
    fn venues_split_fifteen_and_three() {
        let arena = SEASON_2026.iter().filter(|g| g.venue == ARENA).count();
        assert_eq!(arena, 3);
        assert_eq!(SEASON_2026.len() - arena, 15);
    }

    #[test]
    fn schedule_is_chronological() {
        for pair in SEASON_2026.windows(2) {
            assert!((pair[0].date, pair[0].time) < (pair[1].date, pair[1].time));
        }
    }

    #[test]
    fn afternoon_games_are_family_friendly() {
        let fever = &SEASON_2026[2];
        assert_eq!(fever.opponent, "Indiana Fever");
        assert!(fever.is_family());
        assert!(!SEASON_2026[0].is_family());
        assert_eq!(SEASON_2026.iter().filter(|g| g.is_family()).count(), 6);
    }
}
