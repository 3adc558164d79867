mod compiled;
mod matcher;

// 对外只导出具体内容，不导出模块名
pub use compiled::{ClassifierSummary, CompiledClassifier, GroupSummary};
