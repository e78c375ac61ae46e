//! 重试策略 - 业务能力层
//!
//! 把"最多尝试 N 次、失败后固定等待"从具体调用中剥离出来，
//! 策略本身可以脱离外部服务独立测试。不做退避，不看耗时，
//! 只对失败本身做出反应。

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use tracing::warn;

/// 固定间隔重试策略
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// 最大尝试次数（含首次）
    pub max_attempts: u32,
    /// 两次尝试之间的固定等待时长
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// 按策略执行操作，直到成功或尝试次数耗尽
    ///
    /// 闭包参数是当前尝试序号（从 1 开始）。
    /// 耗尽后原样返回最后一次的错误。
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut last_err = None;

        for attempt in 1..=self.max_attempts {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    if attempt < self.max_attempts {
                        warn!(
                            "  调用失败 (尝试 {}/{}): {}",
                            attempt, self.max_attempts, e
                        );
                        last_err = Some(e);
                        tokio::time::sleep(self.delay).await;
                    } else {
                        warn!("  已尝试 {} 次仍然失败: {}", self.max_attempts, e);
                        last_err = Some(e);
                    }
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("重试策略未执行任何尝试")))
    }
}
