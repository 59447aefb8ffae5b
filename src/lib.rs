//! # Steamsnap
//!
//! A CLI that turns Steam reviews into short LLM-written snapshots.
//!
//! ## Features
//!
//! - **Contract-checked summaries**: every review becomes a `pos`/`neg`/`mixed`
//!   sentiment plus a tldr of about ten words, with one repair request for
//!   far-off answers and retry with backoff for failed calls
//! - **Content-hash cache**: identical review text is only summarised once
//! - **Table or JSON output**, with author and recommendation merged in

pub mod agent;
pub mod config;
pub mod gemini;
pub mod logging;
pub mod pipeline;
pub mod render;
pub mod steam;
pub mod storage;
pub mod summary;

pub use agent::{Generate, SummariseOptions, Summariser};
pub use config::Config;
pub use gemini::GeminiClient;
pub use steam::SteamClient;
pub use storage::ReviewCache;
pub use summary::{Review, Sentiment, Snapshot, Summary};
