use types::{Dataset, TournamentId};

/// Namespace for everything one client stores about one tournament.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Scope {
    tournament_id: TournamentId,
}

impl Scope {
    pub fn new(tournament_id: TournamentId) -> Self {
        Self { tournament_id }
    }

    pub fn tournament_id(&self) -> TournamentId {
        self.tournament_id
    }

    pub fn dataset_key(&self, dataset: Dataset) -> String {
        format!("tournament_{}_{}", self.tournament_id, dataset)
    }

    pub fn queue_key(&self) -> String {
        format!("tournament_{}_pending_actions", self.tournament_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_namespaced_by_tournament() {
        let scope = Scope::new(42);
        assert_eq!(scope.dataset_key(Dataset::Results), "tournament_42_results");
        assert_eq!(scope.queue_key(), "tournament_42_pending_actions");
        assert_ne!(
            Scope::new(43).dataset_key(Dataset::Results),
            scope.dataset_key(Dataset::Results)
        );
    }
}
