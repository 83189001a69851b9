pub mod jsonl;
pub mod memory;

pub use jsonl::JsonLinesSink;
pub use memory::InMemorySink;
