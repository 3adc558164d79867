//! 批量分类热路径
//! 纯函数：对(编译产物, 记录批)求值，不改变分类器状态，可多线程并发调用。
//! 每条记录：逐组走trie取候选位集，逐组AND累积（候选清空即提前短路），
//! 最后按合并表裁决每个请求类别的胜者。全程不做跨组笛卡尔展开。

use super::compiled::CompiledClassifier;
use crate::core::RuleBitSet;
use crate::error::{EngineError, EngineResult};

impl CompiledClassifier {
    /// 批量分类
    /// 参数：
    /// - records: 输入记录批，每条长度不小于布局的min_record_len
    /// - results: 调用方预分配的结果缓冲，长度必须等于 records.len() * categories，
    ///   槽位[i * categories + c]写入记录i在类别c下胜者的userdata，未命中写0
    /// - categories: 请求的前categories个类别（1..=构建时的类别数）
    pub fn classify(
        &self,
        records: &[&[u8]],
        results: &mut [u32],
        categories: u32,
    ) -> EngineResult<()> {
        if categories == 0 || categories > self.categories() {
            return Err(EngineError::InvalidArgument(format!(
                "requested categories {} out of range 1..={}",
                categories,
                self.categories()
            )));
        }
        let want = records.len() * categories as usize;
        if results.len() != want {
            return Err(EngineError::InvalidArgument(format!(
                "result buffer holds {} slots, need {} ({} records x {} categories)",
                results.len(),
                want,
                records.len(),
                categories
            )));
        }
        let min_len = self.layout().min_record_len();
        for (i, record) in records.iter().enumerate() {
            if record.len() < min_len {
                return Err(EngineError::InvalidArgument(format!(
                    "record {} is {} bytes, layout requires at least {}",
                    i,
                    record.len(),
                    min_len
                )));
            }
        }

        let tries = self.tries();
        let cat = categories as usize;
        // 批内复用一块候选位集暂存，热路径零分配
        let mut candidates = RuleBitSet::empty(self.rule_count());

        for (i, record) in records.iter().enumerate() {
            candidates.copy_from(tries[0].lookup(record));
            let mut alive = !candidates.is_empty();
            for trie in &tries[1..] {
                if !alive {
                    break;
                }
                alive = candidates.and_assign(trie.lookup(record));
            }

            let out = &mut results[i * cat..(i + 1) * cat];
            if alive {
                self.merge().resolve(&candidates, categories, out);
            } else {
                out.fill(0);
            }
        }

        Ok(())
    }
}
