//! Services module
//!
//! Business logic services that coordinate between a host UI and the
//! repository plus the pure scheduling core.

pub mod board;
pub mod chores;
pub mod score;

pub use board::{BoardItem, BoardService, CompleteOutcome, PlanBoard, TodayBoard};
pub use chores::ChoresService;
pub use score::ScoreService;
