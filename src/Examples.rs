//! examples of usage of RustedCalcLayout
/// Symbolic operations examples: parsing, reduction, evaluation, signs
pub mod symbolic_examples;
/// Layout and editing field examples
pub mod editing_examples;
