mod bitset;
mod enums;
mod field;
mod rule;

// 对外只导出具体内容，不导出模块名
pub use bitset::RuleBitSet;
pub use enums::FieldKind;
pub use field::{FieldDef, FieldLayout, GroupSpan, FIELD_SIZES, GROUP_SPAN_BYTES};
pub use rule::{AclRule, FieldConstraint, RuleData, RuleSet};

/// 最大优先级类别数（类别掩码为u32，每个bit对应一个独立类别）
pub const MAX_CATEGORIES: u32 = 32;
