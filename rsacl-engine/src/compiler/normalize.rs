//! 构建期约束归一化
//! 核心职责：
//! 1. 将带类型标签的字段约束归一化为统一的(value, mask)形式，热路径只处理
//!    预归一化的组键（类型擦除）
//! 2. 区间约束展开为最小前缀块集合
//! 3. 组内字段约束做笛卡尔组合，展开为逐字节(value, mask)组模式（大端字节序）

use crate::core::{AclRule, FieldConstraint, FieldDef, FieldKind, FieldLayout};
use crate::error::{EngineError, EngineResult};

/// 单条规则在单个组内的前缀展开上限
/// 多区间字段笛卡尔组合可能爆炸，超限判定为资源耗尽而不是悄悄截断
pub(crate) const MAX_GROUP_ALTERNATIVES: usize = 4096;

/// 组模式：一条规则在一个查找组上的一种逐字节匹配形态
/// value已按mask预先归一（value[i] & mask[i] == value[i]）
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GroupPattern {
    pub value: Vec<u8>,
    pub mask: Vec<u8>,
    /// 规则的合并序下标（优先级降序、插入序升序）
    pub rule: u32,
}

/// 宽度为bits的全1掩码
#[inline]
pub(crate) fn width_mask(bits: u32) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

/// 高len位置1的前缀掩码（bits为字段总位宽）
#[inline]
pub(crate) fn prefix_mask(bits: u32, len: u32) -> u64 {
    if len == 0 {
        0
    } else if len >= bits {
        width_mask(bits)
    } else {
        (!0u64 << (bits - len)) & width_mask(bits)
    }
}

/// 校验数值在字段位宽内
fn check_fits(what: &str, v: u64, bits: u32, field: usize) -> EngineResult<()> {
    if bits < 64 && v > width_mask(bits) {
        return Err(EngineError::InvalidArgument(format!(
            "field {} {} {:#x} exceeds {}-bit width",
            field, what, v, bits
        )));
    }
    Ok(())
}

/// 闭区间[lo, hi]展开为最小前缀块集合
/// 每个块表示为(起始值, 前缀掩码)，块内任意值满足 (x & mask) == 起始值的高位部分
/// 经典贪心：从lo出发，每次取对齐允许且不越过hi的最大2^k块
fn range_to_prefixes(lo: u64, hi: u64, bits: u32) -> Vec<(u64, u64)> {
    let mut out = Vec::new();
    let mut cur = lo;
    loop {
        let align = if cur == 0 {
            bits
        } else {
            cur.trailing_zeros().min(bits)
        };
        let mut order = align;
        loop {
            let span = if order >= 64 {
                u64::MAX
            } else {
                (1u64 << order) - 1
            };
            // order=0时span=0，cur<=hi恒成立，循环必然终止
            if cur.checked_add(span).is_some_and(|end| end <= hi) {
                break;
            }
            order -= 1;
        }
        let span = if order >= 64 {
            u64::MAX
        } else {
            (1u64 << order) - 1
        };
        out.push((cur, prefix_mask(bits, bits - order)));
        let end = cur.wrapping_add(span);
        if end >= hi {
            break;
        }
        cur = end + 1;
    }
    out
}

/// 单字段约束归一化为(value, mask)备选列表
/// 约束类型必须与布局声明的字段类型一致，否则InvalidArgument（构建阶段统一校验）
pub(crate) fn expand_field(
    constraint: &FieldConstraint,
    def: &FieldDef,
) -> EngineResult<Vec<(u64, u64)>> {
    let bits = (def.size * 8) as u32;
    let idx = def.field_index;
    match (def.kind, constraint) {
        (FieldKind::Bitmask, FieldConstraint::Bitmask { value, mask }) => {
            check_fits("value", *value, bits, idx)?;
            check_fits("mask", *mask, bits, idx)?;
            Ok(vec![(value & mask, *mask)])
        }
        (FieldKind::Mask, FieldConstraint::Prefix { value, len }) => {
            if u32::from(*len) > bits {
                return Err(EngineError::InvalidArgument(format!(
                    "field {} prefix length {} exceeds {}-bit width",
                    idx, len, bits
                )));
            }
            check_fits("value", *value, bits, idx)?;
            let mask = prefix_mask(bits, u32::from(*len));
            Ok(vec![(value & mask, mask)])
        }
        (FieldKind::Range, FieldConstraint::Range { lo, hi }) => {
            check_fits("range low", *lo, bits, idx)?;
            check_fits("range high", *hi, bits, idx)?;
            if lo > hi {
                return Err(EngineError::InvalidArgument(format!(
                    "field {} has inverted range [{:#x}, {:#x}]",
                    idx, lo, hi
                )));
            }
            Ok(range_to_prefixes(*lo, *hi, bits))
        }
        (kind, _) => Err(EngineError::InvalidArgument(format!(
            "field {} constraint does not match declared kind {}",
            idx, kind
        ))),
    }
}

/// 将(value, mask)按大端字节序写入组模式的局部区间
fn write_be(bytes: &mut [u8], local: usize, size: usize, v: u64) {
    for k in 0..size {
        bytes[local + k] = (v >> (8 * (size - 1 - k))) as u8;
    }
}

/// 一条规则在一个查找组上的全部组模式
/// 组内各字段的备选列表做笛卡尔组合；超出MAX_GROUP_ALTERNATIVES返回ResourceExhausted
pub(crate) fn expand_rule_group(
    rule: &AclRule,
    layout: &FieldLayout,
    group: usize,
    merge_idx: u32,
) -> EngineResult<Vec<GroupPattern>> {
    let span = layout.groups()[group];
    let mut patterns = vec![GroupPattern {
        value: vec![0u8; span.width],
        mask: vec![0u8; span.width],
        rule: merge_idx,
    }];

    for def in layout.group_fields(group) {
        let alts = expand_field(&rule.fields[def.field_index], def)?;
        let local = def.offset - span.start;

        if patterns.len() * alts.len() > MAX_GROUP_ALTERNATIVES {
            return Err(EngineError::ResourceExhausted(format!(
                "group {} prefix expansion exceeds {} alternatives",
                group, MAX_GROUP_ALTERNATIVES
            )));
        }

        let mut expanded = Vec::with_capacity(patterns.len() * alts.len());
        for pat in &patterns {
            for (value, mask) in &alts {
                let mut next = pat.clone();
                write_be(&mut next.value, local, def.size, *value);
                write_be(&mut next.mask, local, def.size, *mask);
                expanded.push(next);
            }
        }
        patterns = expanded;
    }

    Ok(patterns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RuleData;

    #[test]
    fn test_prefix_mask_boundaries() {
        assert_eq!(prefix_mask(16, 0), 0);
        assert_eq!(prefix_mask(16, 8), 0xff00);
        assert_eq!(prefix_mask(16, 16), 0xffff);
        assert_eq!(prefix_mask(64, 64), u64::MAX);
        assert_eq!(prefix_mask(64, 1), 1u64 << 63);
    }

    /// 前缀块集合应精确覆盖原区间：逐值校验成员关系
    fn assert_covers(lo: u64, hi: u64, bits: u32) {
        let blocks = range_to_prefixes(lo, hi, bits);
        for x in 0..=width_mask(bits).min(hi + 64) {
            let in_range = x >= lo && x <= hi;
            let in_blocks = blocks.iter().any(|(v, m)| x & m == *v);
            assert_eq!(in_range, in_blocks, "value {:#x} in [{:#x},{:#x}]", x, lo, hi);
        }
    }

    #[test]
    fn test_range_expansion_exact_coverage() {
        assert_covers(0, 255, 8);
        assert_covers(1, 1, 8);
        assert_covers(3, 200, 8);
        assert_covers(0x50, 0x250, 16);
        assert_covers(0, 0xffff, 16);
    }

    #[test]
    fn test_range_single_value_is_full_prefix() {
        let blocks = range_to_prefixes(7, 7, 8);
        assert_eq!(blocks, vec![(7u64, 0xffu64)]);
    }

    #[test]
    fn test_range_full_width_is_single_open_block() {
        let blocks = range_to_prefixes(0, u64::MAX, 64);
        assert_eq!(blocks, vec![(0u64, 0u64)]);
    }

    fn def(kind: FieldKind, size: usize, offset: usize, field: usize, group: usize) -> FieldDef {
        FieldDef {
            kind,
            size,
            offset,
            field_index: field,
            group_index: group,
        }
    }

    #[test]
    fn test_expand_field_kind_mismatch() {
        let d = def(FieldKind::Bitmask, 1, 0, 0, 0);
        let err = expand_field(&FieldConstraint::Range { lo: 0, hi: 1 }, &d).unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
    }

    #[test]
    fn test_expand_field_rejects_oversized_value() {
        let d = def(FieldKind::Bitmask, 1, 0, 0, 0);
        let err = expand_field(
            &FieldConstraint::Bitmask {
                value: 0x100,
                mask: 0xff,
            },
            &d,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
    }

    #[test]
    fn test_expand_rule_group_big_endian_layout() {
        // 组0：1字节bitmask + 2字节prefix/8，共3字节
        let layout = FieldLayout::new(vec![
            def(FieldKind::Bitmask, 1, 0, 0, 0),
            def(FieldKind::Mask, 2, 1, 1, 0),
        ])
        .unwrap();
        let rule = AclRule {
            data: RuleData {
                category_mask: 1,
                priority: 1,
                userdata: 1,
            },
            fields: vec![
                FieldConstraint::Bitmask {
                    value: 0xab,
                    mask: 0xff,
                },
                FieldConstraint::Prefix {
                    value: 0x0102,
                    len: 8,
                },
            ],
        };
        let pats = expand_rule_group(&rule, &layout, 0, 0).unwrap();
        assert_eq!(pats.len(), 1);
        // 大端：0x0102的高字节0x01落在组内偏移1，掩码只保留高8位
        assert_eq!(pats[0].value, vec![0xab, 0x01, 0x00]);
        assert_eq!(pats[0].mask, vec![0xff, 0xff, 0x00]);
    }

    #[test]
    fn test_expand_rule_group_cartesian_product() {
        // 两个区间字段同组，各自展开多个前缀块后做笛卡尔组合
        let layout = FieldLayout::new(vec![
            def(FieldKind::Range, 1, 0, 0, 0),
            def(FieldKind::Range, 1, 1, 1, 0),
        ])
        .unwrap();
        let rule = AclRule {
            data: RuleData {
                category_mask: 1,
                priority: 1,
                userdata: 1,
            },
            fields: vec![
                FieldConstraint::Range { lo: 1, hi: 2 },
                FieldConstraint::Range { lo: 4, hi: 5 },
            ],
        };
        let pats = expand_rule_group(&rule, &layout, 0, 3).unwrap();
        // [1,2]→2块（1/8 + 2/8），[4,5]→1块（4/7）
        assert_eq!(pats.len(), 2);
        assert!(pats.iter().all(|p| p.rule == 3));
    }
}
