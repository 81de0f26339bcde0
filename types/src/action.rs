use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{tournament_player_row_id, Collection, MatchResult, PlayerId, ResultPatch, TournamentId};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    AddResult,
    UpdateResult,
    AddAnnouncement,
    UpdatePlayerStatus,
}

impl ActionKind {
    /// Collection the action writes to when replayed.
    pub fn collection(self) -> Collection {
        match self {
            ActionKind::AddResult | ActionKind::UpdateResult => Collection::Results,
            ActionKind::AddAnnouncement => Collection::Announcements,
            ActionKind::UpdatePlayerStatus => Collection::TournamentPlayers,
        }
    }
}

impl Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionKind::AddResult => write!(f, "ADD_RESULT"),
            ActionKind::UpdateResult => write!(f, "UPDATE_RESULT"),
            ActionKind::AddAnnouncement => write!(f, "ADD_ANNOUNCEMENT"),
            ActionKind::UpdatePlayerStatus => write!(f, "UPDATE_PLAYER_STATUS"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStatus {
    Active,
    Paused,
    Withdrawn,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: Uuid,
    pub tournament_id: TournamentId,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Announcement {
    pub fn new(tournament_id: TournamentId, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            message: message.into(),
            created_at: Utc::now(),
        }
    }
}

/// A mutation intent before the queue has stamped it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewAction {
    pub kind: ActionKind,
    pub payload: serde_json::Value,
    /// Row id for the update kinds.
    pub target_id: Option<String>,
}

impl NewAction {
    pub fn add_result(result: &MatchResult) -> Result<Self, serde_json::Error> {
        Ok(Self {
            kind: ActionKind::AddResult,
            payload: serde_json::to_value(result)?,
            target_id: None,
        })
    }

    pub fn update_result(result_id: Uuid, patch: &ResultPatch) -> Result<Self, serde_json::Error> {
        Ok(Self {
            kind: ActionKind::UpdateResult,
            payload: serde_json::to_value(patch)?,
            target_id: Some(result_id.to_string()),
        })
    }

    pub fn add_announcement(announcement: &Announcement) -> Result<Self, serde_json::Error> {
        Ok(Self {
            kind: ActionKind::AddAnnouncement,
            payload: serde_json::to_value(announcement)?,
            target_id: None,
        })
    }

    pub fn update_player_status(
        tournament_id: TournamentId,
        player_id: PlayerId,
        status: PlayerStatus,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            kind: ActionKind::UpdatePlayerStatus,
            payload: serde_json::json!({ "status": serde_json::to_value(status)? }),
            target_id: Some(tournament_player_row_id(tournament_id, player_id)),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PendingAction {
    /// Creation time in milliseconds, strictly increasing within a queue.
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: ActionKind,
    pub payload: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    /// Failed replay attempts so far.
    #[serde(default)]
    pub attempts: u32,
}

impl PendingAction {
    pub fn stamp(action: NewAction, id: i64, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            timestamp,
            kind: action.kind,
            payload: action.payload,
            target_id: action.target_id,
            attempts: 0,
        }
    }
}

impl Display for PendingAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} {}", self.id, self.kind)?;
        if let Some(target) = &self.target_id {
            write!(f, " -> {target}")?;
        }
        if self.attempts > 0 {
            write!(f, " (attempts: {})", self.attempts)?;
        }
        Ok(())
    }
}
