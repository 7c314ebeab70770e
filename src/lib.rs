pub mod config;
pub mod errors;
pub mod inference;
pub mod model;
pub mod normalizer;
pub mod pipeline;
pub mod prompt;
pub mod source;
pub mod translator;
pub mod utils;
