pub mod jsonl_source;
pub mod text_source;

pub use jsonl_source::{read_news, read_news_file};
pub use text_source::{InMemoryTextSource, NoopTextSource};
