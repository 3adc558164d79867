pub mod loader;

pub use loader::{load_rule_source, parse_rule_source, RuleSourceDoc, RuleSourceEntry};
