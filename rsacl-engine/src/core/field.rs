//! 字段布局定义与一次性校验
//! FieldLayout是整个引擎的输入格式契约：构建后只读，可被多个规则集/分类器共享

use serde::{Deserialize, Serialize};

use super::enums::FieldKind;
use crate::error::{EngineError, EngineResult};

/// 合法的字段宽度（字节）
pub const FIELD_SIZES: [usize; 4] = [1, 2, 4, 8];

/// 单个查找组的可寻址跨度上限（字节）
/// 组内全部字段拼接为一个u64宽比较键，因此上限为8字节
pub const GROUP_SPAN_BYTES: usize = 8;

/// 单字段描述符
/// 对输入记录中一个固定偏移、固定宽度片段的匹配方式声明
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// 字段匹配类型
    pub kind: FieldKind,
    /// 字段宽度（字节，1/2/4/8）
    pub size: usize,
    /// 字段在输入记录中的字节偏移
    pub offset: usize,
    /// 字段序号（必须等于其在布局中的位置）
    pub field_index: usize,
    /// 查找组序号（同组字段共享一棵决策trie）
    pub group_index: usize,
}

/// 查找组跨度（由布局校验阶段推导）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupSpan {
    /// 组起始字节偏移（记录内）
    pub start: usize,
    /// 组总宽度（字节）
    pub width: usize,
    /// 组内第一个字段在布局中的下标
    pub first_field: usize,
    /// 组内字段数量
    pub field_count: usize,
}

/// 字段布局：有序字段描述符集合，构建后不可变
/// 校验规则：
/// 1. 字段宽度必须为1/2/4/8字节
/// 2. field_index与位置一致，group_index从0开始且连续
/// 3. 同组字段在布局中相邻，字节区间连续递增、互不重叠
/// 4. 组总宽度不超过GROUP_SPAN_BYTES
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLayout {
    defs: Vec<FieldDef>,
    groups: Vec<GroupSpan>,
    min_record_len: usize,
}

impl FieldLayout {
    /// 构建并校验字段布局
    /// 返回：校验通过的布局 | InvalidArgument
    pub fn new(defs: Vec<FieldDef>) -> EngineResult<Self> {
        if defs.is_empty() {
            return Err(EngineError::InvalidArgument(
                "field layout must contain at least one field".into(),
            ));
        }

        let mut groups: Vec<GroupSpan> = Vec::new();
        let mut min_record_len = 0usize;

        for (idx, def) in defs.iter().enumerate() {
            if !FIELD_SIZES.contains(&def.size) {
                return Err(EngineError::InvalidArgument(format!(
                    "field {} has unsupported size {} (expected 1/2/4/8)",
                    idx, def.size
                )));
            }
            if def.field_index != idx {
                return Err(EngineError::InvalidArgument(format!(
                    "field {} has field_index {} (must equal its position)",
                    idx, def.field_index
                )));
            }

            if def.group_index == groups.len() {
                // 新组：组号必须恰好递增1（首组为0）
                groups.push(GroupSpan {
                    start: def.offset,
                    width: def.size,
                    first_field: idx,
                    field_count: 1,
                });
            } else if def.group_index + 1 == groups.len() {
                // 延续当前组：字节区间必须紧邻前一字段
                let g = def.group_index;
                if def.offset != groups[g].start + groups[g].width {
                    return Err(EngineError::InvalidArgument(format!(
                        "field {} at offset {} breaks group {} contiguity (expected offset {})",
                        idx,
                        def.offset,
                        g,
                        groups[g].start + groups[g].width
                    )));
                }
                groups[g].width += def.size;
                groups[g].field_count += 1;
                if groups[g].width > GROUP_SPAN_BYTES {
                    return Err(EngineError::InvalidArgument(format!(
                        "group {} spans {} bytes (max {})",
                        g, groups[g].width, GROUP_SPAN_BYTES
                    )));
                }
            } else {
                return Err(EngineError::InvalidArgument(format!(
                    "field {} has group_index {} (groups must be consecutive and adjacent)",
                    idx, def.group_index
                )));
            }

            min_record_len = min_record_len.max(def.offset + def.size);
        }

        Ok(Self {
            defs,
            groups,
            min_record_len,
        })
    }

    /// 字段数量（规则约束列表必须与之等长）
    #[inline]
    pub fn arity(&self) -> usize {
        self.defs.len()
    }

    /// 查找组数量
    #[inline]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// 输入记录的最小合法长度（max(offset+size)）
    #[inline]
    pub fn min_record_len(&self) -> usize {
        self.min_record_len
    }

    #[inline]
    pub fn defs(&self) -> &[FieldDef] {
        &self.defs
    }

    #[inline]
    pub fn groups(&self) -> &[GroupSpan] {
        &self.groups
    }

    /// 某组内的字段描述符切片
    #[inline]
    pub fn group_fields(&self, group: usize) -> &[FieldDef] {
        let span = &self.groups[group];
        &self.defs[span.first_field..span.first_field + span.field_count]
    }
}
