//! Compiles a small JSON Schema and runs it through the engine loop against
//! a toy byte-level "oracle" (no real model: it always prefers the lowest
//! grammar-consistent byte, so the output is deterministic). Prints every
//! response chunk and the time it took.
//!
//! cargo run --example generate_json -p conform-engine

use std::rc::Rc;
use std::time::Instant;

use conform_engine::Engine;
use conform_engine::EngineConfig;
use conform_engine::Oracle;
use conform_engine::Tokenizer;
use conform_parser::VocabEntry;
use conform_parser::VocabTrie;

struct ByteTokenizer;

impl Tokenizer for ByteTokenizer {
    fn encode(&self, bytes: &[u8]) -> Vec<u32> {
        bytes.iter().map(|&b| b as u32).collect()
    }
    fn decode(&self, token_ids: &[u32]) -> Vec<u8> {
        token_ids.iter().map(|&t| t as u8).collect()
    }
    fn bos_token_id(&self) -> Option<u32> {
        None
    }
    fn eos_token_id(&self) -> u32 {
        256
    }
}

/// Deterministic stand-in for a real model: always samples the
/// lowest-valued token the mask allows.
struct FirstAllowedOracle;

impl Oracle for FirstAllowedOracle {
    type Error = std::convert::Infallible;

    fn get_logits(&mut self, _token_ids: &[u32]) -> Result<Vec<f32>, Self::Error> {
        Ok(vec![0.0; 257])
    }

    fn sample_with_temperature(&mut self, _logits: &[f32], mask: &[u8], _temperature: f32) -> Result<u32, Self::Error> {
        Ok(mask.iter().position(|&allowed| allowed != 0).expect("mask must allow something") as u32)
    }
}

fn byte_vocab() -> Vec<VocabEntry> {
    (0u32..256).map(|b| VocabEntry { token_id: b, bytes: vec![b as u8] }).collect()
}

fn main() {
    let schema = serde_json::json!({
        "type": "object",
        "properties": {
            "name": { "type": "string" },
            "age": { "type": "integer", "minimum": 0, "maximum": 150 },
        },
        "required": ["name", "age"],
        "additionalProperties": false,
    });

    let (grammar, diagnostics) = conform_schema::compile_schema(&schema, true).expect("schema should compile");
    for warning in diagnostics.warnings() {
        println!("warning: {warning}");
    }

    let trie = Rc::new(VocabTrie::build(&byte_vocab(), 256));
    let mut engine = Engine::new(FirstAllowedOracle, ByteTokenizer, EngineConfig::default());

    let start = Instant::now();
    let chunks = engine.generate(grammar, trie, 257, b"", false).expect("generation should not fail");
    println!("generated in {:.3} ms over {} chunks", start.elapsed().as_secs_f32() * 1_000.0, chunks.len());

    let committed: Vec<u8> = chunks.iter().flat_map(|c| c.new_bytes.iter().copied()).collect();
    println!("{}", String::from_utf8_lossy(&committed));
}
