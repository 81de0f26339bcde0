use std::collections::BTreeMap;
use std::fmt::Display;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{MatchResult, Outcome, PlayerId};

/// A player's aggregate record in one tournament. Only ever produced by
/// [`tally`], never adjusted in place.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub spread: i64,
}

impl PlayerStats {
    pub fn games(&self) -> u32 {
        self.wins + self.losses + self.ties
    }

    fn record(&mut self, outcome: Outcome, own: i32, opponent: i32) {
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Loss => self.losses += 1,
            Outcome::Tie => self.ties += 1,
        }
        self.spread += i64::from(own) - i64::from(opponent);
    }
}

impl Display for PlayerStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}-{} ({:+})",
            self.wins, self.losses, self.ties, self.spread
        )
    }
}

/// Folds the complete result set of a tournament into per-player stats.
///
/// Every player appearing in `results` gets an entry, so the output depends
/// only on the set of results and is safe to recompute any number of times.
pub fn tally(results: &[MatchResult]) -> BTreeMap<PlayerId, PlayerStats> {
    let mut stats: BTreeMap<PlayerId, PlayerStats> = BTreeMap::new();
    for result in results {
        for player_id in [result.player1_id, result.player2_id] {
            let (Some(outcome), Some((own, opponent))) =
                (result.outcome_for(player_id), result.scores_for(player_id))
            else {
                continue;
            };
            stats
                .entry(player_id)
                .or_default()
                .record(outcome, own, opponent);
        }
    }
    log::debug!(
        "Tallied {} results for {} players",
        results.len(),
        stats.len()
    );
    stats
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingRow {
    pub player_id: PlayerId,
    pub stats: PlayerStats,
}

/// Ranked view of tallied stats: wins, then ties, then spread, all descending.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standings {
    pub rows: Vec<StandingRow>,
}

impl Standings {
    pub fn from_stats(stats: &BTreeMap<PlayerId, PlayerStats>) -> Self {
        let rows = stats
            .iter()
            .map(|(player_id, stats)| StandingRow {
                player_id: *player_id,
                stats: *stats,
            })
            .sorted_by(|a, b| {
                b.stats
                    .wins
                    .cmp(&a.stats.wins)
                    .then(b.stats.ties.cmp(&a.stats.ties))
                    .then(b.stats.spread.cmp(&a.stats.spread))
                    .then(a.player_id.cmp(&b.player_id))
            })
            .collect();
        Self { rows }
    }

    pub fn get(&self, player_id: PlayerId) -> Option<&PlayerStats> {
        self.rows
            .iter()
            .find(|row| row.player_id == player_id)
            .map(|row| &row.stats)
    }
}

impl Display for Standings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lines = self
            .rows
            .iter()
            .enumerate()
            .map(|(rank, row)| format!("{:>3}. player {}: {}", rank + 1, row.player_id, row.stats))
            .join("\n");
        write!(f, "{lines}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: PlayerId = 1;
    const B: PlayerId = 2;

    fn sample_results() -> Vec<MatchResult> {
        vec![
            MatchResult::new(7, 1, (A, 10), (B, 8)),
            MatchResult::new(7, 2, (A, 8), (B, 8)),
            MatchResult::new(7, 3, (B, 5), (A, 7)),
        ]
    }

    #[test]
    fn test_tally_counts_wins_ties_and_spread() {
        let stats = tally(&sample_results());

        assert_eq!(
            stats[&A],
            PlayerStats {
                wins: 2,
                losses: 0,
                ties: 1,
                spread: 4
            }
        );
        assert_eq!(
            stats[&B],
            PlayerStats {
                wins: 0,
                losses: 2,
                ties: 1,
                spread: -4
            }
        );
    }

    #[test]
    fn test_tally_is_repeatable() {
        let results = sample_results();
        assert_eq!(tally(&results), tally(&results));
    }

    #[test]
    fn test_games_matches_results_involving_player() {
        let mut results = sample_results();
        results.push(MatchResult::new(7, 4, (3, 400), (A, 390)));
        let stats = tally(&results);

        for (player_id, player_stats) in &stats {
            let played = results.iter().filter(|r| r.involves(*player_id)).count();
            assert_eq!(player_stats.games() as usize, played);
        }
        let spread_total: i64 = stats.values().map(|s| s.spread).sum();
        assert_eq!(spread_total, 0);
    }

    #[test]
    fn test_tally_of_nothing_is_empty() {
        assert!(tally(&[]).is_empty());
    }

    #[test]
    fn test_standings_order() {
        let mut results = sample_results();
        results.push(MatchResult::new(7, 4, (3, 500), (B, 300)));
        let standings = Standings::from_stats(&tally(&results));

        let order: Vec<PlayerId> = standings.rows.iter().map(|r| r.player_id).collect();
        assert_eq!(order, vec![A, 3, B]);
        assert_eq!(standings.get(3).map(|s| s.spread), Some(200));
    }
}
