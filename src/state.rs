//! # 元素状态模块
//!
//! ## 设计思路
//!
//! 每个元素的控制状态是一条显式记录，保存在引擎持有的映射表里，
//! 不再寄生于 UI 元素的数据属性。加载流程用显式状态机表达：
//! 事件（可见、加载成功、加载失败、定时器触发）能否生效由
//! 当前阶段的守卫决定，而不是靠安装/卸载回调。

use serde::Serialize;
use tokio::task::JoinHandle;

use crate::params::LoadParams;

/// 元素所处的加载阶段。
///
/// `Idle` 仅用于描述“没有状态记录”的元素；持有记录的元素从
/// `PlaceholderShown` 或 `Registered` 起步。`RetryScheduled` 表示
/// 重试定时器已挂起，`Failed` 是重试耗尽或未启用重试后的终态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPhase {
    Idle,
    PlaceholderShown,
    Registered,
    Loading,
    RetryScheduled,
    Failed,
    Loaded,
}

impl LoadPhase {
    /// 失败事件守卫：仅占位展示与真实加载两个阶段接受失败。
    pub(crate) fn accepts_failure(self) -> bool {
        matches!(self, Self::PlaceholderShown | Self::Loading)
    }
}

/// 单个元素的完整控制状态。
#[derive(Debug)]
pub(crate) struct ElementRecord {
    /// 目标资源地址；与新一次指令调用的 `src` 比较决定是否重置。
    pub(crate) intended_src: String,
    /// 占位资源地址，空串表示无占位阶段。
    pub(crate) loading_src: String,
    /// 是否启用失败重试。
    pub(crate) reload: bool,
    /// 当前阶段。
    pub(crate) phase: LoadPhase,
    /// 最近一次实际尝试的地址，重试计数经由它在查询串中往返。
    pub(crate) attempted_src: String,
    /// 重置代际。定时任务触发时校验代际，过期任务不得写入状态。
    pub(crate) epoch: u64,
    /// 挂起中的重试定时任务，重置/卸载时中止。
    pub(crate) retry_timer: Option<JoinHandle<()>>,
}

impl ElementRecord {
    pub(crate) fn new(params: &LoadParams, epoch: u64) -> Self {
        Self {
            intended_src: params.src.clone(),
            loading_src: params.loading.clone(),
            reload: params.reload,
            phase: LoadPhase::Idle,
            attempted_src: params.src.clone(),
            epoch,
            retry_timer: None,
        }
    }

    pub(crate) fn has_loading(&self) -> bool {
        !self.loading_src.is_empty()
    }

    /// 中止挂起的重试定时任务；无任务时为空操作。
    pub(crate) fn abort_retry_timer(&mut self) {
        if let Some(timer) = self.retry_timer.take() {
            timer.abort();
        }
    }
}

impl Drop for ElementRecord {
    fn drop(&mut self) {
        self.abort_retry_timer();
    }
}
