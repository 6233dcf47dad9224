//! 工作单元存储抽象
//!
//! 工作单元（例如一次请求）范围内的键值存储，用于持有工作单元容器。

use std::any::Any;
use std::sync::Arc;

/// 工作单元存储项
pub type UnitItem = Arc<dyn Any + Send + Sync>;

/// 工作单元存储 trait
pub trait UnitStorage: Send + Sync {
    /// 获取存储项
    fn get(&self, key: &str) -> Option<UnitItem>;

    /// 是否包含键
    fn contains_key(&self, key: &str) -> bool;

    /// 写入存储项，返回被替换的旧值
    fn insert(&self, key: &str, item: UnitItem) -> Option<UnitItem>;

    /// 原子地获取或创建存储项
    ///
    /// 同一工作单元内并发调用时 `create` 至多执行一次。
    fn get_or_insert_with(&self, key: &str, create: &mut dyn FnMut() -> UnitItem) -> UnitItem;
}
