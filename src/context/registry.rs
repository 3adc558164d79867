//! 上下文注册表
//! 核心职责：
//! 1. 名称 → 存活上下文的进程内映射（显式可注入的服务对象，引擎内核不持有它）
//! 2. 提供全局默认注册表便捷层（Lazy单例，进程内唯一）
//! 3. list_dump：遍历输出全部存活上下文的诊断摘要

use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use rsacl_engine::EngineError;

use super::context::AclContext;
use crate::config::ContextParam;
use crate::error::{AclError, AclResult};

/// 上下文注册表 - 线程安全
/// 设计说明：注册表只负责名字到实例的映射，不介入上下文自身的生命周期状态机；
/// 持有Arc意味着已释放(Freed)的上下文在注销前仍可被查到，查到后的操作会以
/// InvalidState失败，这与"按名查找"与"实例状态"彼此正交的语义一致
#[derive(Debug, Default)]
pub struct ContextRegistry {
    inner: RwLock<FxHashMap<String, Arc<AclContext>>>,
}

impl ContextRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册上下文（重名返回InvalidArgument）
    pub fn register(&self, ctx: Arc<AclContext>) -> AclResult<()> {
        let mut map = self.inner.write().unwrap();
        if map.contains_key(ctx.name()) {
            return Err(EngineError::InvalidArgument(format!(
                "context name [{}] already registered",
                ctx.name()
            ))
            .into());
        }
        log::debug!("context [{}] registered", ctx.name());
        map.insert(ctx.name().to_string(), ctx);
        Ok(())
    }

    /// 按名查找存活上下文
    /// 未命中返回NotFound（与其它错误类别严格区分）
    pub fn find_existing(&self, name: &str) -> AclResult<Arc<AclContext>> {
        self.inner
            .read()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| AclError::NotFound(name.to_string()))
    }

    /// 注销并返回上下文（未命中返回NotFound）
    pub fn unregister(&self, name: &str) -> AclResult<Arc<AclContext>> {
        self.inner
            .write()
            .unwrap()
            .remove(name)
            .ok_or_else(|| AclError::NotFound(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().unwrap().is_empty()
    }

    /// 遍历输出全部已注册上下文的诊断摘要
    /// 已释放的上下文跳过dump（其任何操作都返回InvalidState）
    pub fn list_dump(&self) {
        let map = self.inner.read().unwrap();
        log::info!("acl registry: {} context(s)", map.len());
        for ctx in map.values() {
            if let Err(e) = ctx.dump() {
                log::debug!("skip dump for context [{}]: {}", ctx.name(), e);
            }
        }
    }
}

/// 全局默认注册表 - 进程生命周期内唯一，懒初始化
static GLOBAL_REGISTRY: Lazy<ContextRegistry> = Lazy::new(ContextRegistry::new);

/// 获取全局默认注册表
pub fn global_registry() -> &'static ContextRegistry {
    &GLOBAL_REGISTRY
}

/// 创建上下文并注册进全局默认注册表（一步完成的便捷面）
pub fn create_context(param: &ContextParam) -> AclResult<Arc<AclContext>> {
    let ctx = Arc::new(AclContext::new(param)?);
    global_registry().register(Arc::clone(&ctx))?;
    Ok(ctx)
}

/// 在全局默认注册表中按名查找存活上下文
pub fn find_existing(name: &str) -> AclResult<Arc<AclContext>> {
    global_registry().find_existing(name)
}

/// 输出全局默认注册表中全部上下文的诊断摘要
pub fn list_dump() {
    global_registry().list_dump()
}
