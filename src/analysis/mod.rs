pub mod builds;
pub mod parser;
pub mod part_stats;
pub mod players;
pub mod sort;

pub use builds::{builds_for_part, matches_for_build, BuildMatch, BuildStat, MatchOutcome};
pub use parser::{parse_build, BuildParser, ParsedBuild};
pub use part_stats::{aggregate, wilson, MetaReport, PartStat};
pub use players::{player_stats, registered_player_stats, PlayerStat};
pub use sort::{sort_rows, SortDirection, SortState};
