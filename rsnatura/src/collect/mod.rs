pub mod global_variables;
pub mod layer_reader;
