//! rsacl-engine 内核错误定义
//! 封装内核层所有核心错误，与外层上下文错误解耦，基于thiserror实现类型安全处理
use thiserror::Error;

/// 内核核心错误枚举
/// 全部错误以显式Result返回，内核不做静默降级；同输入下错误确定可复现
#[derive(Error, Debug)]
pub enum EngineError {
    /// 非法参数（规则形状/字段布局/记录长度/类别数量等校验失败）
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// 资源耗尽（规则数量超限/前缀展开超限/编译结构超出内存预算）
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    /// 分类器尚未构建（Build成功前调用Classify）
    #[error("Classifier not built yet, call build first")]
    NotBuilt,

    /// 非法状态操作（已释放实例上的任何操作）
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// 内核逻辑不变量被破坏（核心算法约束违反，属于严重错误）
    #[error("Engine invariant violation: {0}")]
    InvariantViolation(&'static str),
}

/// 内核层全局Result类型别名
/// 统一使用EngineError作为内核层错误类型
pub type EngineResult<T> = Result<T, EngineError>;
