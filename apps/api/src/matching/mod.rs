pub mod aggregation;
pub mod dedup;
pub mod engine;
pub mod keywords;
pub mod normalizer;
pub mod similarity;
