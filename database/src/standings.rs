use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use types::{
    tally, tournament_player_row_id, Collection, MatchResult, PlayerId, PlayerStats, ResultPatch,
    TournamentId,
};

use crate::models::{stats_patch, TournamentPlayerRecord};
use crate::stores::{Filter, RemoteStore};
use crate::DatabaseError;

pub type TournamentStats = BTreeMap<PlayerId, PlayerStats>;

/// Applies result mutations and rebuilds the tournament's stats from its
/// complete result set afterwards.
pub struct ResultService {
    store: Arc<dyn RemoteStore>,
}

impl ResultService {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    /// Inserts `result` and recomputes its tournament. A result whose id is
    /// already stored counts as recorded, so replaying an insert that
    /// committed before its recomputation failed only reruns the recompute.
    pub async fn add_result(&self, result: &MatchResult) -> Result<TournamentStats, DatabaseError> {
        let row = serde_json::to_value(result)?;
        match self.store.insert(Collection::Results, row).await {
            Ok(_) => tracing::info!(
                "Recorded result {} for tournament {}",
                result.id,
                result.tournament_id
            ),
            Err(DatabaseError::DuplicateRow { .. }) => tracing::info!(
                "Result {} already recorded for tournament {}",
                result.id,
                result.tournament_id
            ),
            Err(e) => return Err(e),
        }
        self.recompute(result.tournament_id).await
    }

    pub async fn update_result(
        &self,
        result_id: &str,
        patch: &ResultPatch,
    ) -> Result<TournamentStats, DatabaseError> {
        self.update_result_raw(result_id, serde_json::to_value(patch)?)
            .await
    }

    /// Update with an untyped patch, as carried by queued actions. A patch
    /// that moves the result to another tournament recomputes both.
    pub async fn update_result_raw(
        &self,
        result_id: &str,
        patch: Value,
    ) -> Result<TournamentStats, DatabaseError> {
        let previous_tournament = match patch.get("tournament_id") {
            Some(_) => self.tournament_of(result_id).await?,
            None => None,
        };
        let updated = self
            .store
            .update(Collection::Results, result_id, patch)
            .await?;
        let result: MatchResult = serde_json::from_value(updated)?;
        tracing::info!(
            "Updated result {} for tournament {}",
            result.id,
            result.tournament_id
        );
        if let Some(previous) = previous_tournament.filter(|t| *t != result.tournament_id) {
            tracing::info!("Result {} moved out of tournament {previous}", result.id);
            self.recompute(previous).await?;
        }
        self.recompute(result.tournament_id).await
    }

    async fn tournament_of(&self, result_id: &str) -> Result<Option<TournamentId>, DatabaseError> {
        let rows = self
            .store
            .select(Collection::Results, &Filter::eq("id", result_id))
            .await?;
        Ok(rows
            .first()
            .and_then(|row| row.get("tournament_id"))
            .and_then(Value::as_i64))
    }

    pub async fn results(&self, tournament_id: TournamentId) -> Result<Vec<MatchResult>, DatabaseError> {
        self.store
            .select(Collection::Results, &Filter::eq("tournament_id", tournament_id))
            .await?
            .into_iter()
            .map(|row| serde_json::from_value(row).map_err(DatabaseError::from))
            .collect()
    }

    pub async fn stored_stats(&self, tournament_id: TournamentId) -> Result<TournamentStats, DatabaseError> {
        let records = self.tournament_players(tournament_id).await?;
        Ok(records
            .into_iter()
            .map(|record| (record.player_id, record.stats()))
            .collect())
    }

    async fn tournament_players(
        &self,
        tournament_id: TournamentId,
    ) -> Result<Vec<TournamentPlayerRecord>, DatabaseError> {
        self.store
            .select(
                Collection::TournamentPlayers,
                &Filter::eq("tournament_id", tournament_id),
            )
            .await?
            .into_iter()
            .map(|row| serde_json::from_value(row).map_err(DatabaseError::from))
            .collect()
    }

    /// Rebuilds every player's stats for the tournament from scratch and
    /// overwrites the stored values. Registered players with no remaining
    /// results are reset to zero.
    ///
    /// Rows are written one at a time; if a write fails the earlier ones stay
    /// written and the next recomputation brings everything back in line.
    pub async fn recompute(&self, tournament_id: TournamentId) -> Result<TournamentStats, DatabaseError> {
        let results = self.results(tournament_id).await?;
        let mut stats = tally(&results);

        for record in self.tournament_players(tournament_id).await? {
            stats.entry(record.player_id).or_default();
        }

        for (player_id, player_stats) in &stats {
            self.store
                .upsert(
                    Collection::TournamentPlayers,
                    &tournament_player_row_id(tournament_id, *player_id),
                    stats_patch(tournament_id, *player_id, player_stats),
                )
                .await?;
        }

        tracing::info!(
            "Recomputed stats for {} players from {} results in tournament {}",
            stats.len(),
            results.len(),
            tournament_id
        );
        Ok(stats)
    }
}
