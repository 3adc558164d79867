//! ACL上下文生命周期管理
//! 核心职责：
//! 1. 维护规则集与编译产物的生命周期状态机（RulesPending → Built → Freed）
//! 2. 读写锁隔离：Build/Reset独占写，Classify共享读
//! 3. 编译产物以Arc快照交给读者，重建期间在途Classify看到的是完整旧产物
//! 4. 诊断dump（只读，经log输出，无日志sink时等效no-op）

use std::sync::{Arc, RwLock};

use rsacl_engine::{
    AclRule, BuildConfig, ClassifierBuilder, CompiledClassifier, EngineError, FieldLayout, RuleSet,
};

use crate::config::{BuildOptions, ContextParam};
use crate::error::AclResult;

/// 上下文生命周期状态
/// Classify仅在Built合法；Build成功后追加规则或重置会退回RulesPending
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    /// 规则待编译（含空规则集的初始态）
    RulesPending,
    /// 编译完成，可分类
    Built,
    /// 已释放（终态，任何操作返回InvalidState）
    Freed,
}

impl std::fmt::Display for ContextState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContextState::RulesPending => write!(f, "rules_pending"),
            ContextState::Built => write!(f, "built"),
            ContextState::Freed => write!(f, "freed"),
        }
    }
}

/// 锁内状态
#[derive(Debug)]
struct ContextInner {
    rules: RuleSet,
    compiled: Option<Arc<CompiledClassifier>>,
    state: ContextState,
}

/// ACL上下文
/// 设计说明：
/// - RwLock：多Classify读者并发，Build/Reset/Free独占
/// - compiled以Option<Arc>持有：成功构建原子替换，旧快照由在途读者自然持有到用完
#[derive(Debug)]
pub struct AclContext {
    name: String,
    socket_id: i32,
    inner: RwLock<ContextInner>,
}

impl AclContext {
    /// 创建上下文（初始态RulesPending，空规则集）
    pub fn new(param: &ContextParam) -> AclResult<Self> {
        if param.name.is_empty() {
            return Err(EngineError::InvalidArgument("context name is empty".into()).into());
        }
        if param.socket_id >= 0 {
            // 亲和性提示仅记录，不影响功能行为
            log::debug!(
                "context [{}] created with socket hint {} (advisory only)",
                param.name,
                param.socket_id
            );
        }
        Ok(Self {
            name: param.name.clone(),
            socket_id: param.socket_id,
            inner: RwLock::new(ContextInner {
                rules: RuleSet::new(param.num_fields, param.max_rule_num)?,
                compiled: None,
                state: ContextState::RulesPending,
            }),
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn socket_id(&self) -> i32 {
        self.socket_id
    }

    /// 当前生命周期状态
    pub fn state(&self) -> ContextState {
        self.inner.read().unwrap().state
    }

    /// 批量追加规则（原子：整批接受或整批拒绝）
    /// 成功后状态回到RulesPending：已有编译产物保留但需重建后才能再Classify
    pub fn add_rules(&self, rules: &[AclRule]) -> AclResult<()> {
        let mut inner = self.inner.write().unwrap();
        Self::ensure_not_freed(&inner, &self.name)?;
        inner.rules.add_rules(rules)?;
        inner.state = ContextState::RulesPending;
        Ok(())
    }

    /// 编译当前规则集
    /// 成功：原子替换编译产物并进入Built；失败：规则集、旧产物与状态均保持不变
    pub fn build(&self, options: &BuildOptions) -> AclResult<()> {
        let mut inner = self.inner.write().unwrap();
        Self::ensure_not_freed(&inner, &self.name)?;

        let layout = Arc::new(FieldLayout::new(options.defs.clone())?);
        let config = BuildConfig {
            layout,
            categories: options.categories,
            max_size: options.max_size,
        };
        let compiled = ClassifierBuilder::build(&inner.rules, &config)?;

        log::info!(
            "context [{}] built: {} rules, {} categories",
            self.name,
            inner.rules.len(),
            options.categories
        );
        inner.compiled = Some(Arc::new(compiled));
        inner.state = ContextState::Built;
        Ok(())
    }

    /// 批量分类
    /// 仅在Built合法；持读锁期间只取产物快照，求值在锁外进行
    pub fn classify(
        &self,
        records: &[&[u8]],
        results: &mut [u32],
        categories: u32,
    ) -> AclResult<()> {
        let compiled = {
            let inner = self.inner.read().unwrap();
            Self::ensure_not_freed(&inner, &self.name)?;
            if inner.state != ContextState::Built {
                return Err(EngineError::NotBuilt.into());
            }
            match &inner.compiled {
                Some(compiled) => Arc::clone(compiled),
                None => {
                    return Err(EngineError::InvariantViolation(
                        "context in Built state without compiled structure",
                    )
                    .into())
                }
            }
        };

        compiled.classify(records, results, categories)?;
        Ok(())
    }

    /// 丢弃全部规则与编译产物，回到空的RulesPending
    pub fn reset_rules(&self) -> AclResult<()> {
        let mut inner = self.inner.write().unwrap();
        Self::ensure_not_freed(&inner, &self.name)?;
        inner.rules.reset();
        inner.compiled = None;
        inner.state = ContextState::RulesPending;
        Ok(())
    }

    /// 完整重置（与reset_rules同义，作为独立入口保留）
    pub fn reset(&self) -> AclResult<()> {
        self.reset_rules()
    }

    /// 诊断dump：经log::info输出规则量与编译结构摘要，不改变任何状态
    pub fn dump(&self) -> AclResult<()> {
        let inner = self.inner.read().unwrap();
        Self::ensure_not_freed(&inner, &self.name)?;
        match &inner.compiled {
            Some(compiled) => log::info!(
                "acl context [{}] state={} pending_rules={} | {}",
                self.name,
                inner.state,
                inner.rules.len(),
                compiled.summary()
            ),
            None => log::info!(
                "acl context [{}] state={} pending_rules={} | not built",
                self.name,
                inner.state,
                inner.rules.len()
            ),
        }
        Ok(())
    }

    /// 释放上下文（终态）：丢弃规则与编译产物，此后任何操作返回InvalidState
    pub fn free(&self) -> AclResult<()> {
        let mut inner = self.inner.write().unwrap();
        Self::ensure_not_freed(&inner, &self.name)?;
        inner.rules.reset();
        inner.compiled = None;
        inner.state = ContextState::Freed;
        log::debug!("acl context [{}] freed", self.name);
        Ok(())
    }

    fn ensure_not_freed(inner: &ContextInner, name: &str) -> AclResult<()> {
        if inner.state == ContextState::Freed {
            return Err(
                EngineError::InvalidState(format!("context [{}] already freed", name)).into(),
            );
        }
        Ok(())
    }
}
