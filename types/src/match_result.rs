use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{PlayerId, TournamentId};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
    Tie,
}

/// One scored game between two players. The authoritative input to standings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub id: Uuid,
    pub tournament_id: TournamentId,
    pub player1_id: PlayerId,
    pub player2_id: PlayerId,
    pub score1: i32,
    pub score2: i32,
    pub round: u32,
    pub created_at: DateTime<Utc>,
}

impl MatchResult {
    pub fn new(
        tournament_id: TournamentId,
        round: u32,
        (player1_id, score1): (PlayerId, i32),
        (player2_id, score2): (PlayerId, i32),
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            player1_id,
            player2_id,
            score1,
            score2,
            round,
            created_at: Utc::now(),
        }
    }

    pub fn involves(&self, player_id: PlayerId) -> bool {
        self.player1_id == player_id || self.player2_id == player_id
    }

    /// Own and opponent score from `player_id`'s side, if they played in it.
    pub fn scores_for(&self, player_id: PlayerId) -> Option<(i32, i32)> {
        if self.player1_id == player_id {
            Some((self.score1, self.score2))
        } else if self.player2_id == player_id {
            Some((self.score2, self.score1))
        } else {
            None
        }
    }

    pub fn outcome_for(&self, player_id: PlayerId) -> Option<Outcome> {
        self.scores_for(player_id)
            .map(|(own, opponent)| match own.cmp(&opponent) {
                std::cmp::Ordering::Greater => Outcome::Win,
                std::cmp::Ordering::Less => Outcome::Loss,
                std::cmp::Ordering::Equal => Outcome::Tie,
            })
    }
}

impl Display for MatchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "R{} {} {}-{} {}",
            self.round, self.player1_id, self.score1, self.score2, self.player2_id
        )
    }
}

/// Partial update to a result. Absent fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player1_id: Option<PlayerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player2_id: Option<PlayerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score1: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score2: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round: Option<u32>,
}

impl ResultPatch {
    pub fn scores(score1: i32, score2: i32) -> Self {
        Self {
            score1: Some(score1),
            score2: Some(score2),
            ..Default::default()
        }
    }
}
