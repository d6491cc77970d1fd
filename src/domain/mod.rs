// Static lookup tables (registry, rules, polarity lexicon)
pub mod lexicon;

// Input news items and the text the analyzers scan
pub mod news;

// Classifier output
pub mod sentiment;

// Graded analysis quality
pub mod quality;

// Matches, hits, decisions and the final verdict record
pub mod verdict;

// Port interfaces
pub mod ports;

// Domain-specific error types
pub mod errors;
