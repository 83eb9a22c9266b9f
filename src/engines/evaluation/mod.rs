pub mod port;
pub mod command;

pub use port::CandidateEvaluator;
pub use command::CommandEvaluator;
