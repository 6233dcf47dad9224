//! 工作单元实现
//!
//! 宿主为每个工作单元（例如一次请求）创建一个 [`UnitOfWork`]，解析时显式传入。

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use di_abstractions::{UnitItem, UnitStorage};
use std::fmt;
use tracing::debug;
use uuid::Uuid;

/// 工作单元
pub struct UnitOfWork {
    id: Uuid,
    name: String,
    started_at: DateTime<Utc>,
    items: DashMap<String, UnitItem>,
}

impl UnitOfWork {
    /// 开始新的工作单元
    pub fn new(name: impl Into<String>) -> Self {
        let unit = Self {
            id: Uuid::new_v4(),
            name: name.into(),
            started_at: Utc::now(),
            items: DashMap::new(),
        };
        debug!("开始工作单元: {} ({})", unit.name, unit.id);
        unit
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// 存储项数量
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 结束工作单元，释放其中的全部存储项
    pub fn end(self) {
        // 清理在 Drop 中完成
    }
}

impl UnitStorage for UnitOfWork {
    fn get(&self, key: &str) -> Option<UnitItem> {
        self.items.get(key).map(|item| item.value().clone())
    }

    fn contains_key(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    fn insert(&self, key: &str, item: UnitItem) -> Option<UnitItem> {
        self.items.insert(key.to_string(), item)
    }

    fn get_or_insert_with(&self, key: &str, create: &mut dyn FnMut() -> UnitItem) -> UnitItem {
        self.items
            .entry(key.to_string())
            .or_insert_with(|| create())
            .value()
            .clone()
    }
}

impl fmt::Debug for UnitOfWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitOfWork")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("started_at", &self.started_at)
            .field(
                "keys",
                &self.items.iter().map(|e| e.key().clone()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Drop for UnitOfWork {
    fn drop(&mut self) {
        let elapsed = Utc::now() - self.started_at;
        debug!(
            "结束工作单元: {} ({}), 持续 {} ms, 释放 {} 个存储项",
            self.name,
            self.id,
            elapsed.num_milliseconds(),
            self.items.len()
        );
        self.items.clear();
    }
}
