//! # 服务层（面向宿主框架）
//!
//! ## 设计思路
//!
//! `LazyLoadService` 是宿主框架唯一需要接触的类型，替代全局单例式的
//! 指令注册。好处：
//! 1. 生命周期清晰（由宿主应用统一创建并持有）
//! 2. 测试可创建独立实例，减少共享状态副作用
//! 3. 观察器可注入替身，阈值可按实例配置
//!
//! ## 实现思路
//!
//! 对外仅暴露少量稳定 API：
//! - `attach` / `detach`：指令的挂载（含更新）与卸载入口
//! - `report_visibility` / `report_load_success` / `report_load_failure`：
//!   宿主把环境事件喂回引擎
//! - `load_phase`：状态自省（调试与测试用）
//! - `config` / `set_config`：运行时读取与调整策略

use std::sync::Arc;

use serde_json::Value;

use crate::config::LazyConfig;
use crate::engine::LazyLoadEngine;
use crate::error::LazyError;
use crate::host::{ElementHost, ElementId};
use crate::observer::{VisibilityEntry, VisibilityObserver};
use crate::params::LoadParams;
use crate::state::LoadPhase;

/// 懒加载服务。
///
/// 宿主应用启动时创建一个实例，作为指令三个生命周期钩子的共同后端。
pub struct LazyLoadService {
    engine: LazyLoadEngine,
}

impl LazyLoadService {
    /// 使用默认配置创建服务。
    ///
    /// # 示例
    /// ```rust,ignore
    /// use image_lazyload::LazyLoadService;
    ///
    /// let service = LazyLoadService::new(host)?;
    /// # Ok::<(), image_lazyload::LazyError>(())
    /// ```
    pub fn new(host: Arc<dyn ElementHost>) -> Result<Self, LazyError> {
        Self::with_config(LazyConfig::default(), host)
    }

    /// 使用自定义配置创建服务。
    ///
    /// 主要用于测试或按场景注入不同策略；非法配置直接拒绝。
    ///
    /// # 示例
    /// ```rust,ignore
    /// use image_lazyload::{LazyConfig, LazyLoadService};
    ///
    /// let mut config = LazyConfig::default();
    /// config.reload_interval_ms = 500;
    /// let service = LazyLoadService::with_config(config, host)?;
    /// # Ok::<(), image_lazyload::LazyError>(())
    /// ```
    pub fn with_config(config: LazyConfig, host: Arc<dyn ElementHost>) -> Result<Self, LazyError> {
        config.validate()?;

        Ok(Self {
            engine: LazyLoadEngine::new(config, host),
        })
    }

    /// 指令挂载/更新入口：解析绑定值并启动元素的懒加载流程。
    ///
    /// 绑定值为字符串或 `{ src, loading, reload }` 结构，解析规则见
    /// [`LoadParams::parse`]。目标地址未变化时本调用为空操作。
    pub fn attach(&self, element: ElementId, binding: &Value) -> Result<(), LazyError> {
        let params = LoadParams::parse(binding);
        self.engine.start(element, &params)
    }

    /// 以已解析参数挂载，供不经过 JSON 绑定值的宿主直接调用。
    pub fn attach_params(&self, element: ElementId, params: &LoadParams) -> Result<(), LazyError> {
        self.engine.start(element, params)
    }

    /// 指令卸载入口：清空元素状态并中止挂起的重试定时器。幂等。
    pub fn detach(&self, element: ElementId) -> Result<(), LazyError> {
        self.engine.reset(element)
    }

    /// 宿主可见性原语的一批交叉条目。
    pub fn report_visibility(&self, entries: &[VisibilityEntry]) -> Result<(), LazyError> {
        self.engine.on_visibility(entries)
    }

    /// 元素当前资源加载成功。
    pub fn report_load_success(&self, element: ElementId) -> Result<(), LazyError> {
        self.engine.on_load_success(element)
    }

    /// 元素当前资源加载失败。
    ///
    /// 启用重试的元素会在此挂起延时定时器，因此必须在 Tokio
    /// 运行时上下文内调用。
    pub fn report_load_failure(&self, element: ElementId) -> Result<(), LazyError> {
        self.engine.on_load_failure(element)
    }

    /// 查询元素当前阶段；未接管的元素返回 [`LoadPhase::Idle`]。
    pub fn load_phase(&self, element: ElementId) -> Result<LoadPhase, LazyError> {
        self.engine.phase_of(element)
    }

    /// 可见性观察器句柄，宿主据其阈值配置可见性原语。
    pub fn observer(&self) -> Arc<VisibilityObserver> {
        self.engine.observer()
    }

    /// 当前生效配置快照。
    pub fn config(&self) -> Result<LazyConfig, LazyError> {
        self.engine.config_snapshot()
    }

    /// 更新运行时配置；校验失败时保持原配置不变。
    pub fn set_config(&self, config: LazyConfig) -> Result<(), LazyError> {
        self.engine.set_config(config)
    }
}
