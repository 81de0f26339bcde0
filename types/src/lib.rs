pub mod action;
pub mod cache_entry;
pub mod clock;
pub mod collection;
pub mod match_result;
pub mod stats;

pub use action::{ActionKind, Announcement, NewAction, PendingAction, PlayerStatus};
pub use cache_entry::CacheEntry;
pub use clock::{Clock, ManualClock, SystemClock};
pub use collection::{tournament_player_row_id, Collection, Dataset, PlayerId, TournamentId};
pub use match_result::{MatchResult, Outcome, ResultPatch};
pub use stats::{tally, PlayerStats, StandingRow, Standings};
