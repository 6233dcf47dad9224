//! 部件目录抽象接口
//!
//! 提供部件来源和部件过滤条件

use crate::part::PartDefinition;
use infrastructure_common::{CompositionError, PartCreationScope};
use std::sync::Arc;

/// 部件目录 trait
///
/// 目录内容不可变；底层资源可以延迟加载，因此读取可能失败。
pub trait PartCatalog: Send + Sync {
    /// 目录中的全部部件，顺序即导出枚举顺序
    fn parts(&self) -> Result<Vec<Arc<PartDefinition>>, CompositionError>;

    /// 目录名称
    fn name(&self) -> &str;
}

/// 部件过滤器 trait
pub trait PartFilter: Send + Sync {
    /// 检查部件是否通过过滤条件
    fn matches(&self, part: &PartDefinition) -> bool;

    /// 过滤器名称
    fn name(&self) -> &str {
        "PartFilter"
    }
}

impl<F> PartFilter for F
where
    F: Fn(&PartDefinition) -> bool + Send + Sync,
{
    fn matches(&self, part: &PartDefinition) -> bool {
        self(part)
    }
}

/// 基于创建作用域的过滤器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HasCreationScope {
    pub scope: PartCreationScope,
}

impl HasCreationScope {
    pub fn new(scope: PartCreationScope) -> Self {
        Self { scope }
    }
}

impl PartFilter for HasCreationScope {
    fn matches(&self, part: &PartDefinition) -> bool {
        part.scope == self.scope
    }

    fn name(&self) -> &str {
        match self.scope {
            PartCreationScope::Global => "HasCreationScope(global)",
            PartCreationScope::PerUnit => "HasCreationScope(per_unit)",
        }
    }
}
