mod context;
mod registry;

// 对外只导出具体内容，不导出模块名
pub use context::{AclContext, ContextState};
pub use registry::{
    create_context, find_existing, global_registry, list_dump, ContextRegistry,
};
