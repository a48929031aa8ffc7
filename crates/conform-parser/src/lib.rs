//! Stepwise token-parser engine over the `conform-ir` byte grammar: masks,
//! fast-forwarding, token healing, and captures (§4.5).
//!
//! The frontier is represented as a single residual grammar [`Node`],
//! stepped byte-at-a-time by [`derivative::derivative`] (a Brzozowski
//! derivative) rather than as an explicit Earley chart — see
//! `derivative`'s module docs and DESIGN.md for why that's equivalent here
//! and considerably simpler to get right. Everything else in this crate
//! (`mask`, `heal`, `capture`, `state`) is built on top of that one
//! primitive.

pub mod capture;
pub mod derivative;
pub mod error;
pub mod heal;
pub mod mask;
pub mod response;
pub mod state;
pub mod trie;

pub use error::ParseError;
pub use response::EngineResponse;
pub use response::GenData;
pub use state::ParserState;
pub use trie::VocabEntry;
pub use trie::VocabTrie;
