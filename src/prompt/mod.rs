pub mod builder;
pub mod strategy;

pub use builder::PromptBuilder;
pub use strategy::{Strategy, select_instruction};
