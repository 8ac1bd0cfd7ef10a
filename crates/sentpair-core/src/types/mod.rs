pub mod query;
pub mod scores;
pub mod task;

pub use query::QueryId;
pub use scores::EvalScores;
pub use task::Task;
