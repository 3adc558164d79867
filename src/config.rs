//! 上下文创建参数与构建选项

use rsacl_engine::FieldDef;

/// 默认规则容量上限
pub const DEFAULT_MAX_RULE_NUM: usize = 1 << 16;

/// 上下文创建参数
#[derive(Debug, Clone)]
pub struct ContextParam {
    /// 上下文名称（注册表按名查找的key）
    pub name: String,
    /// 每条规则的字段约束数量（与构建期布局元数一致）
    pub num_fields: usize,
    /// 规则总数上限
    pub max_rule_num: usize,
    /// NUMA亲和性提示：目标socket编号，-1表示无偏好
    /// 仅作为内存放置建议，引擎允许在功能上忽略
    pub socket_id: i32,
}

impl ContextParam {
    /// 创建参数（max_rule_num取默认值，socket_id无偏好）
    pub fn new(name: impl Into<String>, num_fields: usize) -> Self {
        Self {
            name: name.into(),
            num_fields,
            max_rule_num: DEFAULT_MAX_RULE_NUM,
            socket_id: -1,
        }
    }

    pub fn with_max_rule_num(mut self, max_rule_num: usize) -> Self {
        self.max_rule_num = max_rule_num;
        self
    }

    pub fn with_socket_id(mut self, socket_id: i32) -> Self {
        self.socket_id = socket_id;
        self
    }
}

/// 构建选项
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// 字段定义（构建期校验为FieldLayout）
    pub defs: Vec<FieldDef>,
    /// 类别数量（1..=32）
    pub categories: u32,
    /// 编译产物软内存预算（字节），0表示不设上限
    pub max_size: usize,
}

impl BuildOptions {
    pub fn new(defs: Vec<FieldDef>, categories: u32) -> Self {
        Self {
            defs,
            categories,
            max_size: 0,
        }
    }

    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }
}
