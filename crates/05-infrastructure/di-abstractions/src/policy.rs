//! 组合错误处理策略

use infrastructure_common::CompositionError;

/// 错误处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorOutcome {
    /// 已处理 - 解析器返回空结果
    Handled,
    /// 继续传播给调用方
    Propagate,
}

/// 错误处理策略 trait
///
/// 决定解析或注入过程中出现的组合错误是被吞掉还是向上传播。
pub trait ErrorPolicy: Send + Sync {
    /// 处理组合错误
    fn handle(&self, error: &CompositionError) -> ErrorOutcome;

    /// 策略名称
    fn name(&self) -> &str;
}
