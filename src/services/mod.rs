// Service exports
pub mod explainer;

pub use explainer::{ChatExplainer, DisabledExplainer};
