//! 规则数据模型与待编译规则集
//! 规则在加入时只做形状校验（元数与元数据），字段类型与布局的一致性在Build阶段校验

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// 单字段约束（带类型标签）
/// 必须与对应FieldDef的kind一致，Build阶段发现不一致返回InvalidArgument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldConstraint {
    /// 位掩码约束：(input & mask) == (value & mask)
    Bitmask { value: u64, mask: u64 },
    /// 前缀约束：输入高len位与value的高len位一致
    Prefix { value: u64, len: u8 },
    /// 闭区间约束：input ∈ [lo, hi]
    Range { lo: u64, hi: u64 },
}

/// 规则元数据
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleData {
    /// 类别掩码：bit c置位表示规则参与类别c的优先级竞争，不可为0
    pub category_mask: u32,
    /// 优先级：同类别内数值大者胜出
    pub priority: i32,
    /// 结果标签：命中时返回给调用方的不透明标识，0保留为"未命中"
    pub userdata: u32,
}

/// 完整规则：元数据 + 与布局等长的字段约束序列
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclRule {
    pub data: RuleData,
    pub fields: Vec<FieldConstraint>,
}

/// 待编译规则集（append-only多重集）
/// add_rules按批原子生效：整批校验通过才追加，任一失败则规则集保持不变
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<AclRule>,
    num_fields: usize,
    max_rule_num: usize,
}

impl RuleSet {
    /// 创建空规则集
    /// 参数：
    /// - num_fields: 每条规则的字段约束数量（与布局元数一致）
    /// - max_rule_num: 规则总数上限
    pub fn new(num_fields: usize, max_rule_num: usize) -> EngineResult<Self> {
        if num_fields == 0 {
            return Err(EngineError::InvalidArgument(
                "num_fields must be non-zero".into(),
            ));
        }
        if max_rule_num == 0 {
            return Err(EngineError::InvalidArgument(
                "max_rule_num must be non-zero".into(),
            ));
        }
        Ok(Self {
            rules: Vec::new(),
            num_fields,
            max_rule_num,
        })
    }

    /// 批量追加规则（原子：全部接受或全部拒绝）
    /// 校验项：字段约束数量、userdata非0、category_mask非0、总量上限
    pub fn add_rules(&mut self, rules: &[AclRule]) -> EngineResult<()> {
        for (i, rule) in rules.iter().enumerate() {
            if rule.fields.len() != self.num_fields {
                return Err(EngineError::InvalidArgument(format!(
                    "rule {} has {} field constraints (layout arity is {})",
                    i,
                    rule.fields.len(),
                    self.num_fields
                )));
            }
            if rule.data.userdata == 0 {
                return Err(EngineError::InvalidArgument(format!(
                    "rule {} has zero userdata (0 is reserved for no-match)",
                    i
                )));
            }
            if rule.data.category_mask == 0 {
                return Err(EngineError::InvalidArgument(format!(
                    "rule {} has empty category mask",
                    i
                )));
            }
        }

        if self.rules.len() + rules.len() > self.max_rule_num {
            return Err(EngineError::ResourceExhausted(format!(
                "rule capacity exceeded: {} accepted + {} new > max {}",
                self.rules.len(),
                rules.len(),
                self.max_rule_num
            )));
        }

        self.rules.extend_from_slice(rules);
        Ok(())
    }

    /// 丢弃全部待编译规则
    pub fn reset(&mut self) {
        self.rules.clear();
    }

    #[inline]
    pub fn rules(&self) -> &[AclRule] {
        &self.rules
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    #[inline]
    pub fn num_fields(&self) -> usize {
        self.num_fields
    }

    #[inline]
    pub fn max_rule_num(&self) -> usize {
        self.max_rule_num
    }
}
