//! 错误处理策略实现

use di_abstractions::{ErrorOutcome, ErrorPolicy};
use infrastructure_common::CompositionError;
use std::fmt;

/// 传播全部组合错误（默认策略）
#[derive(Debug, Clone, Copy, Default)]
pub struct PropagateErrors;

impl ErrorPolicy for PropagateErrors {
    fn handle(&self, _error: &CompositionError) -> ErrorOutcome {
        ErrorOutcome::Propagate
    }

    fn name(&self) -> &str {
        "PropagateErrors"
    }
}

/// 吞掉全部组合错误，解析器返回空结果
#[derive(Debug, Clone, Copy, Default)]
pub struct SuppressErrors;

impl ErrorPolicy for SuppressErrors {
    fn handle(&self, _error: &CompositionError) -> ErrorOutcome {
        ErrorOutcome::Handled
    }

    fn name(&self) -> &str {
        "SuppressErrors"
    }
}

/// 基于闭包的错误处理策略
pub struct FnErrorPolicy<F> {
    name: String,
    handler: F,
}

impl<F> FnErrorPolicy<F>
where
    F: Fn(&CompositionError) -> ErrorOutcome + Send + Sync,
{
    pub fn new(name: impl Into<String>, handler: F) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }
}

impl<F> ErrorPolicy for FnErrorPolicy<F>
where
    F: Fn(&CompositionError) -> ErrorOutcome + Send + Sync,
{
    fn handle(&self, error: &CompositionError) -> ErrorOutcome {
        (self.handler)(error)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<F> fmt::Debug for FnErrorPolicy<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnErrorPolicy")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
