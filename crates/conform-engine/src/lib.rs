//! Engine loop (§4.6, C6): drives `conform_parser::ParserState` against an
//! LLM oracle, plus the `Oracle`/`Tokenizer` traits at the boundary (§6) and
//! the config layer (`EngineConfig`).

pub mod config;
pub mod engine;
pub mod error;
pub mod oracle;
pub mod tokenizer;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::EngineError;
pub use oracle::Oracle;
pub use tokenizer::Tokenizer;
