//! 查找组决策trie（逐字节DFA）
//! 对一个查找组内出现的全部组模式做子集构造：每层消费输入记录的一个字节，
//! 状态为"仍可满足的组模式集合"（FxHashMap去重），末层状态直接给出该组的
//! 候选规则位集。查询代价固定为组宽度次表查，与规则数量无关。
//!
//! 可靠性约束：查表只允许收窄候选集，绝不允许漏掉真实命中的规则。

use rustc_hash::FxHashMap;

use super::normalize::GroupPattern;
use crate::core::{GroupSpan, RuleBitSet};

/// 单个查找组编译产物
#[derive(Debug, Clone)]
pub(crate) struct GroupTrie {
    /// 组在输入记录中的起始字节偏移
    start: usize,
    /// 组宽度（字节，即trie深度）
    width: usize,
    /// 逐层转移表：levels[d][state * 256 + byte] → 下一层状态号
    levels: Vec<Vec<u32>>,
    /// 末层状态 → 候选规则位集（合并序下标）
    leaves: Vec<RuleBitSet>,
    /// 全部层的状态总数（诊断用）
    state_count: usize,
}

impl GroupTrie {
    /// 子集构造编译
    /// 参数：
    /// - patterns: 该组内全部规则的组模式
    /// - span: 组跨度
    /// - rule_count: 规则总数（位集宽度）
    pub(crate) fn build(patterns: &[GroupPattern], span: GroupSpan, rule_count: usize) -> Self {
        let width = span.width;
        // 根状态：全部组模式存活
        let mut level_sets: Vec<Vec<u32>> = vec![(0..patterns.len() as u32).collect()];
        let mut levels: Vec<Vec<u32>> = Vec::with_capacity(width);
        let mut state_count = 1usize;

        for d in 0..width {
            let mut next_sets: Vec<Vec<u32>> = Vec::new();
            let mut memo: FxHashMap<Vec<u32>, u32> = FxHashMap::default();
            let mut trans = vec![0u32; level_sets.len() * 256];

            for (si, set) in level_sets.iter().enumerate() {
                for b in 0..256usize {
                    let mut sub: Vec<u32> = Vec::with_capacity(set.len());
                    for &p in set {
                        let pat = &patterns[p as usize];
                        if b as u8 & pat.mask[d] == pat.value[d] {
                            sub.push(p);
                        }
                    }
                    let id = match memo.get(&sub) {
                        Some(&id) => id,
                        None => {
                            let id = next_sets.len() as u32;
                            memo.insert(sub.clone(), id);
                            next_sets.push(sub);
                            id
                        }
                    };
                    trans[si * 256 + b] = id;
                }
            }

            state_count += next_sets.len();
            levels.push(trans);
            level_sets = next_sets;
        }

        // 末层：存活模式集合折叠为规则位集
        let leaves = level_sets
            .iter()
            .map(|set| {
                let mut bs = RuleBitSet::empty(rule_count);
                for &p in set {
                    bs.set(patterns[p as usize].rule as usize);
                }
                bs
            })
            .collect();

        Self {
            start: span.start,
            width,
            levels,
            leaves,
            state_count,
        }
    }

    /// 查找：沿记录的组字节走trie，返回该组的候选规则位集
    /// 调用方保证record长度已校验
    #[inline(always)]
    pub(crate) fn lookup<'a>(&'a self, record: &[u8]) -> &'a RuleBitSet {
        let mut state = 0u32;
        for d in 0..self.width {
            let b = record[self.start + d] as usize;
            state = self.levels[d][state as usize * 256 + b];
        }
        &self.leaves[state as usize]
    }

    #[inline]
    pub(crate) fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub(crate) fn state_count(&self) -> usize {
        self.state_count
    }

    /// 堆占用估算（字节）
    pub(crate) fn heap_bytes(&self) -> usize {
        let trans: usize = self
            .levels
            .iter()
            .map(|l| l.len() * std::mem::size_of::<u32>())
            .sum();
        let leaves: usize = self.leaves.iter().map(RuleBitSet::heap_bytes).sum();
        trans + leaves
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GroupSpan;

    fn span(start: usize, width: usize) -> GroupSpan {
        GroupSpan {
            start,
            width,
            first_field: 0,
            field_count: 1,
        }
    }

    fn pat(value: &[u8], mask: &[u8], rule: u32) -> GroupPattern {
        GroupPattern {
            value: value.to_vec(),
            mask: mask.to_vec(),
            rule,
        }
    }

    #[test]
    fn test_exact_and_wildcard_patterns() {
        // 规则0：两字节精确匹配 [1,2]；规则1：首字节1，次字节任意
        let patterns = vec![
            pat(&[1, 2], &[0xff, 0xff], 0),
            pat(&[1, 0], &[0xff, 0x00], 1),
        ];
        let trie = GroupTrie::build(&patterns, span(0, 2), 2);

        let hits = trie.lookup(&[1, 2]);
        assert!(hits.get(0) && hits.get(1));

        let hits = trie.lookup(&[1, 9]);
        assert!(!hits.get(0) && hits.get(1));

        let hits = trie.lookup(&[2, 2]);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_lookup_respects_group_offset() {
        // 组从记录偏移3开始
        let patterns = vec![pat(&[0xaa], &[0xff], 0)];
        let trie = GroupTrie::build(&patterns, span(3, 1), 1);
        assert!(trie.lookup(&[0, 0, 0, 0xaa]).get(0));
        assert!(trie.lookup(&[0xaa, 0, 0, 0]).is_empty());
    }

    #[test]
    fn test_masked_low_bits() {
        // 仅匹配高4位=0x5x
        let patterns = vec![pat(&[0x50], &[0xf0], 0)];
        let trie = GroupTrie::build(&patterns, span(0, 1), 1);
        assert!(trie.lookup(&[0x5f]).get(0));
        assert!(trie.lookup(&[0x50]).get(0));
        assert!(trie.lookup(&[0x60]).is_empty());
    }

    #[test]
    fn test_empty_pattern_set() {
        let patterns: Vec<GroupPattern> = Vec::new();
        let trie = GroupTrie::build(&patterns, span(0, 2), 0);
        assert!(trie.lookup(&[0, 0]).is_empty());
        assert_eq!(trie.width(), 2);
    }

    #[test]
    fn test_shared_rule_bit_across_alternatives() {
        // 同一规则的两个前缀块备选：任一命中都应置位同一规则bit
        let patterns = vec![
            pat(&[0x10], &[0xf0], 0),
            pat(&[0x20], &[0xf0], 0),
        ];
        let trie = GroupTrie::build(&patterns, span(0, 1), 1);
        assert!(trie.lookup(&[0x15]).get(0));
        assert!(trie.lookup(&[0x2a]).get(0));
        assert!(trie.lookup(&[0x35]).is_empty());
    }
}
