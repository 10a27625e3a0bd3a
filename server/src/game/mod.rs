pub mod bracket;
pub mod types;
