pub mod port;
pub mod chat;

pub use port::CandidateGenerator;
pub use chat::ChatCompletionGenerator;
