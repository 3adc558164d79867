//! 分类器构建器
//! 核心职责：
//! 1. 校验布局/规则集/构建配置的一致性
//! 2. 规则重排为合并序，逐组归一化约束并编译决策trie
//! 3. 组装合并表与编译产物，并执行内存预算检查

use std::sync::Arc;

use super::merge::MergeTable;
use super::normalize::expand_rule_group;
use super::trie::GroupTrie;
use crate::classifier::CompiledClassifier;
use crate::core::{FieldLayout, RuleSet, MAX_CATEGORIES};
use crate::error::{EngineError, EngineResult};

/// 构建配置
/// max_size为编译产物的软内存预算（字节），0表示不设上限
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub layout: Arc<FieldLayout>,
    pub categories: u32,
    pub max_size: usize,
}

/// 规则集编译器
/// 输入规则集+布局，产出只读的CompiledClassifier；失败不产生部分状态
pub struct ClassifierBuilder;

impl ClassifierBuilder {
    /// 编译规则集
    /// 返回：编译后的分类器 | InvalidArgument/ResourceExhausted
    pub fn build(rules: &RuleSet, config: &BuildConfig) -> EngineResult<CompiledClassifier> {
        if config.categories == 0 || config.categories > MAX_CATEGORIES {
            return Err(EngineError::InvalidArgument(format!(
                "categories {} out of range 1..={}",
                config.categories, MAX_CATEGORIES
            )));
        }
        if config.layout.arity() != rules.num_fields() {
            return Err(EngineError::InvalidArgument(format!(
                "layout arity {} does not match rule set arity {}",
                config.layout.arity(),
                rules.num_fields()
            )));
        }

        let layout = &config.layout;
        let rule_slice = rules.rules();

        // 1. 合并序重排（优先级降序、插入序升序）
        let (merge, order) = MergeTable::from_rules(rule_slice);
        let mut merge_of = vec![0u32; rule_slice.len()];
        for (merge_idx, &orig) in order.iter().enumerate() {
            merge_of[orig as usize] = merge_idx as u32;
        }

        // 2. 逐组归一化 + trie编译
        let mut tries = Vec::with_capacity(layout.group_count());
        for group in 0..layout.group_count() {
            let mut patterns = Vec::new();
            for (orig, rule) in rule_slice.iter().enumerate() {
                patterns.extend(expand_rule_group(
                    rule,
                    layout,
                    group,
                    merge_of[orig],
                )?);
            }
            let trie = GroupTrie::build(&patterns, layout.groups()[group], rule_slice.len());
            log::debug!(
                "group {} compiled: {} patterns, {} states, {} bytes",
                group,
                patterns.len(),
                trie.state_count(),
                trie.heap_bytes()
            );
            tries.push(trie);
        }

        if merge.len() != rule_slice.len() {
            return Err(EngineError::InvariantViolation(
                "merge table size diverged from rule count",
            ));
        }

        // 3. 内存预算检查（软预算：超出即拒绝本次构建，旧产物由调用方保留）
        let heap_bytes =
            tries.iter().map(GroupTrie::heap_bytes).sum::<usize>() + merge.heap_bytes();
        if config.max_size != 0 && heap_bytes > config.max_size {
            return Err(EngineError::ResourceExhausted(format!(
                "compiled structure {} bytes exceeds max_size {}",
                heap_bytes, config.max_size
            )));
        }

        log::debug!(
            "classifier built: {} rules, {} groups, {} categories, {} bytes",
            rule_slice.len(),
            layout.group_count(),
            config.categories,
            heap_bytes
        );

        Ok(CompiledClassifier::new(
            Arc::clone(&config.layout),
            tries,
            merge,
            config.categories,
            heap_bytes,
        ))
    }
}
