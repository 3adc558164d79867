//! 合并/优先级裁决表
//! 规则在构建期重排为合并序：优先级降序、同优先级按插入序升序（稳定排序）。
//! 由此分类期的裁决退化为：在累积候选位集中自低位起找第一个类别掩码覆盖
//! 目标类别的置位，即该类别的胜者。同优先级并列时先插入者胜，且对固定的
//! 编译产物完全确定。

use crate::core::{AclRule, RuleBitSet};

/// 合并序上单条规则的裁决信息
#[derive(Debug, Clone, Copy)]
pub(crate) struct MergeEntry {
    pub userdata: u32,
    pub category_mask: u32,
}

/// 合并表：合并序 → (userdata, category_mask)
#[derive(Debug, Clone)]
pub(crate) struct MergeTable {
    entries: Vec<MergeEntry>,
}

impl MergeTable {
    /// 构建合并表
    /// 返回：(合并表, 合并序下标 → 原始插入序下标)
    pub(crate) fn from_rules(rules: &[AclRule]) -> (Self, Vec<u32>) {
        let mut order: Vec<u32> = (0..rules.len() as u32).collect();
        // 稳定排序：优先级降序，同优先级保持插入序
        order.sort_by(|&a, &b| {
            rules[b as usize]
                .data
                .priority
                .cmp(&rules[a as usize].data.priority)
        });

        let entries = order
            .iter()
            .map(|&orig| MergeEntry {
                userdata: rules[orig as usize].data.userdata,
                category_mask: rules[orig as usize].data.category_mask,
            })
            .collect();

        (Self { entries }, order)
    }

    /// 裁决：对每个请求类别取累积候选集中的最高优先级规则
    /// 参数：
    /// - hits: 全组AND后的候选规则位集（合并序）
    /// - categories: 请求的类别数（1..=32，调用方已校验）
    /// - out: 长度为categories的结果槽，未命中类别写0
    #[inline]
    pub(crate) fn resolve(&self, hits: &RuleBitSet, categories: u32, out: &mut [u32]) {
        out.fill(0);
        let mut remaining: u32 = if categories >= 32 {
            u32::MAX
        } else {
            (1u32 << categories) - 1
        };

        for (wi, &word) in hits.words().iter().enumerate() {
            let mut w = word;
            while w != 0 {
                let idx = wi * 64 + w.trailing_zeros() as usize;
                let entry = &self.entries[idx];
                let mut won = entry.category_mask & remaining;
                while won != 0 {
                    let c = won.trailing_zeros();
                    out[c as usize] = entry.userdata;
                    won &= won - 1;
                }
                remaining &= !entry.category_mask;
                if remaining == 0 {
                    return;
                }
                w &= w - 1;
            }
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// 堆占用估算（字节）
    pub(crate) fn heap_bytes(&self) -> usize {
        self.entries.len() * std::mem::size_of::<MergeEntry>()
    }
}
