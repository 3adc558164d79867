//! rsacl - 高性能多字段ACL规则分类库

pub mod config;
pub mod context;
pub mod error;
pub mod rule;

// 导出全局错误类型
pub use self::error::{AclError, AclResult};

// 导出配置模块核心结构体
pub use crate::config::{BuildOptions, ContextParam, DEFAULT_MAX_RULE_NUM};

// 导出上下文模块核心接口（含全局默认注册表的便捷接口）
pub use crate::context::{
    create_context, find_existing, global_registry, list_dump, AclContext, ContextRegistry,
    ContextState,
};

// 导出规则源加载接口
pub use crate::rule::{load_rule_source, parse_rule_source, RuleSourceDoc, RuleSourceEntry};

// 导出内核核心类型（规则数据模型与编译产物）
pub use rsacl_engine::{
    AclRule, BuildConfig, ClassifierBuilder, ClassifierSummary, CompiledClassifier, EngineError,
    EngineResult, FieldConstraint, FieldDef, FieldKind, FieldLayout, GroupSummary, RuleData,
    RuleSet, MAX_CATEGORIES,
};
