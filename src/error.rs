//! 全局错误类型定义
//! 内核错误（EngineError）原样透传，外层只补充注册表/IO/规则源相关错误
use thiserror::Error;

use rsacl_engine::EngineError;
use serde_json::Error as SerdeJsonError;
use std::io::Error as IoError;

#[derive(Error, Debug)]
pub enum AclError {
    // 内核错误透传（InvalidArgument/ResourceExhausted/NotBuilt/InvalidState等）
    #[error("引擎错误：{0}")]
    Engine(#[from] EngineError),

    // 注册表相关错误
    #[error("按名查找未命中：{0}")]
    NotFound(String),

    // 规则源加载错误
    #[error("规则源解析失败：{0}")]
    RuleSourceError(String),

    // 基础错误
    #[error("IO操作失败：{0}")]
    IoError(#[from] IoError),
    #[error("JSON解析失败：{0}")]
    JsonError(#[from] SerdeJsonError),
}

// 全局Result类型
pub type AclResult<T> = Result<T, AclError>;
