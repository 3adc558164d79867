//! 规则位集：每条规则（合并序下标）对应一个bit
//! 分类热路径上的候选集合并即按字逐词AND，不分配内存

/// 固定宽度的u64字位集
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleBitSet {
    words: Vec<u64>,
    nbits: usize,
}

impl RuleBitSet {
    /// 全0位集
    pub fn empty(nbits: usize) -> Self {
        Self {
            words: vec![0u64; nbits.div_ceil(64)],
            nbits,
        }
    }

    /// 置位指定下标
    #[inline]
    pub fn set(&mut self, idx: usize) {
        debug_assert!(idx < self.nbits);
        self.words[idx / 64] |= 1u64 << (idx % 64);
    }

    /// 读取指定下标
    #[inline]
    pub fn get(&self, idx: usize) -> bool {
        debug_assert!(idx < self.nbits);
        (self.words[idx / 64] >> (idx % 64)) & 1 != 0
    }

    /// 按位或合并（用于叶子集合构建）
    pub fn or_assign(&mut self, other: &RuleBitSet) {
        debug_assert_eq!(self.nbits, other.nbits);
        for (w, o) in self.words.iter_mut().zip(&other.words) {
            *w |= o;
        }
    }

    /// 按位与合并，返回结果是否仍有置位（热路径，零分配）
    #[inline]
    pub fn and_assign(&mut self, other: &RuleBitSet) -> bool {
        debug_assert_eq!(self.nbits, other.nbits);
        let mut any = 0u64;
        for (w, o) in self.words.iter_mut().zip(&other.words) {
            *w &= o;
            any |= *w;
        }
        any != 0
    }

    /// 从另一位集整体拷贝（复用已分配的字存储）
    #[inline]
    pub fn copy_from(&mut self, other: &RuleBitSet) {
        debug_assert_eq!(self.nbits, other.nbits);
        self.words.copy_from_slice(&other.words);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    #[inline]
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nbits
    }

    /// 堆占用估算（字节）
    #[inline]
    pub fn heap_bytes(&self) -> usize {
        self.words.len() * std::mem::size_of::<u64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_across_word_boundary() {
        let mut bs = RuleBitSet::empty(130);
        bs.set(0);
        bs.set(63);
        bs.set(64);
        bs.set(129);
        assert!(bs.get(0) && bs.get(63) && bs.get(64) && bs.get(129));
        assert!(!bs.get(1) && !bs.get(128));
    }

    #[test]
    fn test_and_assign_reports_emptiness() {
        let mut a = RuleBitSet::empty(70);
        let mut b = RuleBitSet::empty(70);
        a.set(3);
        a.set(69);
        b.set(69);
        assert!(a.and_assign(&b));
        assert!(a.get(69) && !a.get(3));

        let c = RuleBitSet::empty(70);
        assert!(!a.and_assign(&c));
        assert!(a.is_empty());
    }

    #[test]
    fn test_zero_width_bitset() {
        let mut a = RuleBitSet::empty(0);
        let b = RuleBitSet::empty(0);
        assert!(a.is_empty());
        assert!(!a.and_assign(&b));
    }
}
