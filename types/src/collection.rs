use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub type TournamentId = i64;
pub type PlayerId = i64;

/// Named collections on the remote store.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Results,
    TournamentPlayers,
    Announcements,
    Matches,
    Players,
    Tournaments,
}

impl Collection {
    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Results => "results",
            Collection::TournamentPlayers => "tournament_players",
            Collection::Announcements => "announcements",
            Collection::Matches => "matches",
            Collection::Players => "players",
            Collection::Tournaments => "tournaments",
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Datasets the client mirrors locally, one cache record each per tournament.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    Players,
    Results,
    Matches,
    Pairings,
    Announcements,
    Tournament,
}

impl Dataset {
    pub const ALL: [Dataset; 6] = [
        Dataset::Players,
        Dataset::Results,
        Dataset::Matches,
        Dataset::Pairings,
        Dataset::Announcements,
        Dataset::Tournament,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Dataset::Players => "players",
            Dataset::Results => "results",
            Dataset::Matches => "matches",
            Dataset::Pairings => "pairings",
            Dataset::Announcements => "announcements",
            Dataset::Tournament => "tournament",
        }
    }
}

impl Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Dataset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dataset::ALL
            .into_iter()
            .find(|dataset| dataset.as_str() == s)
            .ok_or_else(|| format!("unknown dataset: {s}"))
    }
}

/// Row id of a player's entry in `tournament_players`.
pub fn tournament_player_row_id(tournament_id: TournamentId, player_id: PlayerId) -> String {
    format!("{tournament_id}:{player_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_parses_its_own_name() {
        for dataset in Dataset::ALL {
            assert_eq!(dataset.as_str().parse::<Dataset>(), Ok(dataset));
        }
        assert!("standings".parse::<Dataset>().is_err());
    }

    #[test]
    fn test_collection_serializes_snake_case() {
        let json = serde_json::to_string(&Collection::TournamentPlayers).unwrap();
        assert_eq!(json, "\"tournament_players\"");
    }
}
