//! `Veracity` Core — worker wire message schemas and typed analysis results.

pub mod messages;
pub mod types;

pub use messages::{Action, WorkerRequest, WorkerResponse, WORKER_TARGET};
pub use types::{
    Article, ClickbaitResult, ComplexityResult, ExtractArticleRequest, ExtractOptions,
    SentimentLabel, SentimentResult, TextRequest,
};

#[cfg(test)]
mod tests {
    #[test]
    fn crate_loads() {
        // Empty body: if this test runs, the crate compiles and loads.
    }
}
