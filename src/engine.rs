//! # 生命周期引擎模块
//!
//! ## 设计思路
//!
//! `LazyLoadEngine` 只负责流程编排与状态维护，不直接与任何 UI 框架绑定。
//! 单个元素的链路固定为：
//! 1. 指令启动：比对目标地址，决定跳过或重置重建
//! 2. 占位阶段（可选）：先展示占位图，占位就绪后再进入观察
//! 3. 可见触发：赋值真实地址，交给宿主隐式加载
//! 4. 失败重试（可选）：重新展示占位图，延时后用改写地址再试
//!
//! ## 实现思路
//!
//! - 配置通过 `Arc<RwLock<LazyConfig>>` 支持运行时调整；
//!   单次失败处理使用“同一配置快照”，避免一轮重试中途配置漂移。
//! - 元素状态集中在 `Mutex<HashMap<ElementId, ElementRecord>>`，
//!   事件能否生效由状态机守卫决定。
//! - 重试定时器是可中止的 Tokio 任务；重置/卸载会中止任务并递增代际，
//!   已醒来的过期任务在校验代际后放弃写入，杜绝脏写。
//! - 对宿主的回写统一收集到锁外执行，宿主同步回调不会造成死锁。

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Duration;

use crate::config::LazyConfig;
use crate::error::LazyError;
use crate::host::{ElementHost, ElementId};
use crate::observer::{VisibilityEntry, VisibilityObserver};
use crate::params::LoadParams;
use crate::reload::{next_reload_url, redact_url_for_log};
use crate::state::{ElementRecord, LoadPhase};

/// 懒加载引擎。
///
/// 封装配置状态、可见性观察器与元素状态表，并编排完整生命周期。
pub(crate) struct LazyLoadEngine {
    config: Arc<RwLock<LazyConfig>>,
    observer: Arc<VisibilityObserver>,
    host: Arc<dyn ElementHost>,
    elements: Arc<Mutex<HashMap<ElementId, ElementRecord>>>,
    epochs: AtomicU64,
}

impl LazyLoadEngine {
    /// 根据初始配置创建引擎；观察器阈值在此刻固定。
    pub(crate) fn new(config: LazyConfig, host: Arc<dyn ElementHost>) -> Self {
        let observer = Arc::new(VisibilityObserver::new(config.thresholds.clone()));

        Self {
            config: Arc::new(RwLock::new(config)),
            observer,
            host,
            elements: Arc::new(Mutex::new(HashMap::new())),
            epochs: AtomicU64::new(0),
        }
    }

    pub(crate) fn observer(&self) -> Arc<VisibilityObserver> {
        Arc::clone(&self.observer)
    }

    /// 获取配置快照，保证单次事件处理链路使用一致参数。
    pub(crate) fn config_snapshot(&self) -> Result<LazyConfig, LazyError> {
        self.config
            .read()
            .map(|config| config.clone())
            .map_err(|_| LazyError::State("配置读取锁已中毒".to_string()))
    }

    /// 更新运行时配置（需先通过校验）。
    ///
    /// 阈值字段只影响之后创建的观察器，已有观察器保持原档位。
    pub(crate) fn set_config(&self, next: LazyConfig) -> Result<(), LazyError> {
        next.validate()?;

        let mut config = self
            .config
            .write()
            .map_err(|_| LazyError::State("配置写入锁已中毒".to_string()))?;
        *config = next;

        log::info!(
            "⚙️ 已更新懒加载配置：interval={}ms max_reload={} query={}",
            config.reload_interval_ms,
            config.max_reload_times,
            config.reload_query_name
        );

        Ok(())
    }

    /// 指令启动入口（挂载与更新共用）。
    ///
    /// 目标地址未变化时为空操作；变化时先重置旧状态再按新参数重建。
    pub(crate) fn start(&self, element: ElementId, params: &LoadParams) -> Result<(), LazyError> {
        let mut assign: Option<String> = None;
        {
            let mut elements = self.lock_elements()?;

            if let Some(record) = elements.get(&element) {
                if record.intended_src == params.src {
                    log::debug!("⏭️ 目标地址未变化，跳过 - {}", element);
                    return Ok(());
                }
                log::debug!("🧹 目标地址变化，重置旧状态 - {}", element);
            }

            elements.remove(&element);
            self.observer.unobserve(element)?;

            let mut record = ElementRecord::new(params, self.next_epoch());
            if record.has_loading() {
                record.phase = LoadPhase::PlaceholderShown;
                assign = Some(record.loading_src.clone());
            } else {
                record.phase = LoadPhase::Registered;
                self.observer.observe(element)?;
            }
            elements.insert(element, record);
        }

        log::debug!(
            "🐢 开始懒加载 - {} src={} reload={}",
            element,
            redact_url_for_log(&params.src),
            params.reload
        );

        if let Some(src) = assign {
            self.host.assign_source(element, &src);
        }

        Ok(())
    }

    /// 元素重置（卸载时亦走此入口）：中止重试定时器、退出观察、移除记录。
    /// 幂等，对未接管元素调用安全。
    pub(crate) fn reset(&self, element: ElementId) -> Result<(), LazyError> {
        {
            let mut elements = self.lock_elements()?;
            if let Some(mut record) = elements.remove(&element) {
                record.abort_retry_timer();
                log::debug!("🧹 已重置元素 - {}", element);
            }
        }

        self.observer.unobserve(element)
    }

    /// 处理宿主上报的一批可见性交叉条目。
    ///
    /// 可见度大于零的已注册元素被摘出观察，赋值真实地址进入加载阶段。
    pub(crate) fn on_visibility(&self, entries: &[VisibilityEntry]) -> Result<(), LazyError> {
        let visible = self.observer.take_visible(entries)?;
        if visible.is_empty() {
            return Ok(());
        }

        let mut assignments: Vec<(ElementId, String)> = Vec::new();
        {
            let mut elements = self.lock_elements()?;
            for element in visible {
                let Some(record) = elements.get_mut(&element) else {
                    log::warn!("⚠️ 可见元素缺少状态记录，忽略 - {}", element);
                    continue;
                };

                if record.phase != LoadPhase::Registered {
                    log::debug!(
                        "⏭️ 非注册阶段的可见事件，忽略 - {} phase={:?}",
                        element,
                        record.phase
                    );
                    continue;
                }

                record.attempted_src = record.intended_src.clone();
                record.phase = LoadPhase::Loading;
                assignments.push((element, record.intended_src.clone()));
            }
        }

        for (element, src) in assignments {
            log::info!(
                "👁️ 元素进入视口，开始加载 - {} src={}",
                element,
                redact_url_for_log(&src)
            );
            self.host.assign_source(element, &src);
        }

        Ok(())
    }

    /// 处理加载成功事件。
    ///
    /// 占位阶段的成功把元素送入可见性观察（一次性转移，重复成功事件
    /// 不会重复注册）；加载阶段的成功进入终态 `Loaded`。
    pub(crate) fn on_load_success(&self, element: ElementId) -> Result<(), LazyError> {
        let mut elements = self.lock_elements()?;
        let Some(record) = elements.get_mut(&element) else {
            log::debug!("⏭️ 未接管元素的加载成功事件，忽略 - {}", element);
            return Ok(());
        };

        match record.phase {
            LoadPhase::PlaceholderShown => {
                record.phase = LoadPhase::Registered;
                self.observer.observe(element)?;
                log::debug!("🖼️ 占位图就绪，进入可见性观察 - {}", element);
            }
            LoadPhase::Loading => {
                record.phase = LoadPhase::Loaded;
                log::info!(
                    "✅ 图片加载完成 - {} src={}",
                    element,
                    redact_url_for_log(&record.attempted_src)
                );
            }
            phase => {
                log::debug!(
                    "⏭️ 当前阶段不处理加载成功事件 - {} phase={:?}",
                    element,
                    phase
                );
            }
        }

        Ok(())
    }

    /// 处理加载失败事件。
    ///
    /// 未启用重试时记录终态；启用时立即回显占位图，并挂起一枚延时
    /// 定时器，在触发时用改写后的地址重新尝试。
    /// 注意：启用重试的失败事件必须在 Tokio 运行时上下文内上报。
    pub(crate) fn on_load_failure(&self, element: ElementId) -> Result<(), LazyError> {
        let config = self.config_snapshot()?;
        let mut assign: Option<String> = None;
        {
            let mut elements = self.lock_elements()?;
            let Some(record) = elements.get_mut(&element) else {
                log::debug!("⏭️ 未接管元素的加载失败事件，忽略 - {}", element);
                return Ok(());
            };

            if !record.phase.accepts_failure() {
                log::debug!(
                    "⏭️ 当前阶段不处理加载失败事件 - {} phase={:?}",
                    element,
                    record.phase
                );
                return Ok(());
            }

            if !record.reload {
                record.phase = LoadPhase::Failed;
                log::warn!(
                    "⚠️ 图片加载失败（未启用重试）- {} src={}",
                    element,
                    redact_url_for_log(&record.attempted_src)
                );
                return Ok(());
            }

            if record.has_loading() {
                assign = Some(record.loading_src.clone());
            }

            record.phase = LoadPhase::RetryScheduled;
            record.abort_retry_timer();

            let epoch = record.epoch;
            let elements_map = Arc::clone(&self.elements);
            let host = Arc::clone(&self.host);
            let interval = config.reload_interval_ms;
            let query_name = config.reload_query_name.clone();
            let max_reload_times = config.max_reload_times;

            record.retry_timer = Some(tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(interval)).await;
                Self::fire_retry(
                    &elements_map,
                    host.as_ref(),
                    element,
                    epoch,
                    &query_name,
                    max_reload_times,
                );
            }));

            log::warn!(
                "⚠️ 图片加载失败，{}ms 后重试 - {} src={}",
                interval,
                element,
                redact_url_for_log(&record.attempted_src)
            );
        }

        if let Some(src) = assign {
            self.host.assign_source(element, &src);
        }

        Ok(())
    }

    /// 查询元素当前阶段；未接管的元素返回 `Idle`。
    pub(crate) fn phase_of(&self, element: ElementId) -> Result<LoadPhase, LazyError> {
        let elements = self.lock_elements()?;
        Ok(elements
            .get(&element)
            .map(|record| record.phase)
            .unwrap_or(LoadPhase::Idle))
    }

    /// 重试定时器触发：校验代际与阶段后改写地址并发起下一次尝试。
    fn fire_retry(
        elements: &Mutex<HashMap<ElementId, ElementRecord>>,
        host: &dyn ElementHost,
        element: ElementId,
        epoch: u64,
        query_name: &str,
        max_reload_times: u32,
    ) {
        let mut assign: Option<String> = None;
        {
            let Ok(mut elements) = elements.lock() else {
                log::error!("❌ 重试定时器无法获取元素表锁 - {}", element);
                return;
            };
            let Some(record) = elements.get_mut(&element) else {
                return;
            };
            if record.epoch != epoch || record.phase != LoadPhase::RetryScheduled {
                log::debug!("⏭️ 过期的重试定时器，忽略 - {}", element);
                return;
            }

            record.retry_timer = None;

            match next_reload_url(&record.attempted_src, query_name, max_reload_times) {
                Some(next) => {
                    record.attempted_src = next.clone();
                    record.phase = LoadPhase::Loading;
                    assign = Some(next);
                }
                None => {
                    record.phase = LoadPhase::Failed;
                    if record.has_loading() {
                        assign = Some(record.loading_src.clone());
                        log::warn!("⛔ 重试结束，回退占位图 - {}", element);
                    } else {
                        log::warn!("⛔ 重试结束，保持当前状态 - {}", element);
                    }
                }
            }
        }

        if let Some(src) = assign {
            host.assign_source(element, &src);
        }
    }

    fn lock_elements(&self) -> Result<MutexGuard<'_, HashMap<ElementId, ElementRecord>>, LazyError> {
        self.elements
            .lock()
            .map_err(|_| LazyError::State("元素表锁已中毒".to_string()))
    }

    fn next_epoch(&self) -> u64 {
        self.epochs.fetch_add(1, Ordering::Relaxed)
    }
}
