//! Persisted breeding data: scans, rules, per-wipe progress and history.

mod history;
pub use history::*;
mod modes;
pub use modes::*;
mod persist;
mod progress;
pub use progress::*;
mod rules;
pub use rules::*;
mod species;
pub use species::*;
mod stats;
pub use stats::*;
pub mod stat_list;
pub mod wipe;
pub use wipe::Wipe;
