//! 编译后的分类器产物
//! 构建成功后只读：独占持有各组trie与合并表（一次构建整体分配，释放时整体
//! 回收），除整体重建外没有任何变更操作。

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::compiler::{GroupTrie, MergeTable};
use crate::core::FieldLayout;

/// 单组诊断摘要
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSummary {
    pub width: usize,
    pub states: usize,
    pub heap_bytes: usize,
}

/// 分类器诊断摘要（dump用，只读）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierSummary {
    pub rule_count: usize,
    pub group_count: usize,
    pub categories: u32,
    pub heap_bytes: usize,
    pub groups: Vec<GroupSummary>,
}

impl Display for ClassifierSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "rules={} groups={} categories={} heap_bytes={}",
            self.rule_count, self.group_count, self.categories, self.heap_bytes
        )?;
        for (i, g) in self.groups.iter().enumerate() {
            write!(
                f,
                " | group{}: width={} states={} bytes={}",
                i, g.width, g.states, g.heap_bytes
            )?;
        }
        Ok(())
    }
}

/// 编译后的分类器
/// 批量分类入口见matcher模块；多线程只读共享安全
#[derive(Debug, Clone)]
pub struct CompiledClassifier {
    layout: Arc<FieldLayout>,
    tries: Vec<GroupTrie>,
    merge: MergeTable,
    categories: u32,
    heap_bytes: usize,
}

impl CompiledClassifier {
    pub(crate) fn new(
        layout: Arc<FieldLayout>,
        tries: Vec<GroupTrie>,
        merge: MergeTable,
        categories: u32,
        heap_bytes: usize,
    ) -> Self {
        Self {
            layout,
            tries,
            merge,
            categories,
            heap_bytes,
        }
    }

    #[inline]
    pub fn categories(&self) -> u32 {
        self.categories
    }

    #[inline]
    pub fn rule_count(&self) -> usize {
        self.merge.len()
    }

    #[inline]
    pub fn layout(&self) -> &FieldLayout {
        &self.layout
    }

    #[inline]
    pub(crate) fn tries(&self) -> &[GroupTrie] {
        &self.tries
    }

    #[inline]
    pub(crate) fn merge(&self) -> &MergeTable {
        &self.merge
    }

    /// 生成诊断摘要（不改变任何状态）
    pub fn summary(&self) -> ClassifierSummary {
        ClassifierSummary {
            rule_count: self.merge.len(),
            group_count: self.tries.len(),
            categories: self.categories,
            heap_bytes: self.heap_bytes,
            groups: self
                .tries
                .iter()
                .map(|t| GroupSummary {
                    width: t.width(),
                    states: t.state_count(),
                    heap_bytes: t.heap_bytes(),
                })
                .collect(),
        }
    }
}
