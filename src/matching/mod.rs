pub mod classifier;
pub mod heuristic;

pub use classifier::{parse_duplicate_ids, RemoteClassifier};
pub use heuristic::{strip_cherry_pick_marker, HeuristicMatcher, HeuristicPolicy};
