// 核心数据模型：字段布局、规则、位集
pub mod core;
// 构建期编译逻辑：归一化+组trie+合并表
pub mod compiler;
// 编译产物与批量分类热路径
pub mod classifier;
// 内核错误定义
pub mod error;

// 顶层导出常用类型
pub use crate::classifier::{ClassifierSummary, CompiledClassifier, GroupSummary};
pub use crate::compiler::{BuildConfig, ClassifierBuilder};
pub use crate::core::{
    AclRule, FieldConstraint, FieldDef, FieldKind, FieldLayout, GroupSpan, RuleBitSet, RuleData,
    RuleSet, MAX_CATEGORIES,
};
pub use crate::error::{EngineError, EngineResult};
