use serde::{Deserialize, Serialize};
use types::{tournament_player_row_id, PlayerId, PlayerStats, PlayerStatus, TournamentId};

/// A row of `tournament_players`: a player's registration and stored stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentPlayerRecord {
    pub id: String,
    pub tournament_id: TournamentId,
    pub player_id: PlayerId,
    #[serde(default)]
    pub status: Option<PlayerStatus>,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub ties: u32,
    #[serde(default)]
    pub spread: i64,
}

impl TournamentPlayerRecord {
    pub fn new(tournament_id: TournamentId, player_id: PlayerId, status: PlayerStatus) -> Self {
        Self {
            id: tournament_player_row_id(tournament_id, player_id),
            tournament_id,
            player_id,
            status: Some(status),
            wins: 0,
            losses: 0,
            ties: 0,
            spread: 0,
        }
    }

    pub fn stats(&self) -> PlayerStats {
        PlayerStats {
            wins: self.wins,
            losses: self.losses,
            ties: self.ties,
            spread: self.spread,
        }
    }
}

/// Patch that overwrites every stats field of a `tournament_players` row.
pub fn stats_patch(
    tournament_id: TournamentId,
    player_id: PlayerId,
    stats: &PlayerStats,
) -> serde_json::Value {
    serde_json::json!({
        "tournament_id": tournament_id,
        "player_id": player_id,
        "wins": stats.wins,
        "losses": stats.losses,
        "ties": stats.ties,
        "spread": stats.spread,
    })
}
