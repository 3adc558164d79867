use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// 字段匹配类型枚举，定义单个字段约束的解释方式
#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// 位掩码匹配：(input & mask) == (value & mask)
    Bitmask,
    /// 前缀掩码匹配：输入高prefix_len位与value一致（CIDR风格）
    Mask,
    /// 数值区间匹配：input ∈ [lo, hi]（闭区间）
    Range,
}

impl Display for FieldKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::Bitmask => write!(f, "bitmask"),
            FieldKind::Mask => write!(f, "mask"),
            FieldKind::Range => write!(f, "range"),
        }
    }
}
