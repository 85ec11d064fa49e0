pub mod evaluator;
pub mod indicators;
