//! # 可见性观察模块
//!
//! ## 设计思路
//!
//! 观察器是可注入的服务实例（由引擎构建、随服务生命周期存在），
//! 不再是进程级单例：测试可以直接替换或并行创建多个互不干扰的实例。
//! 它只维护“哪些元素在被观察”这一份状态；阈值档位对外暴露，
//! 供宿主环境用同样的档位配置其可见性原语。
//!
//! ## 实现思路
//!
//! 宿主把一批交叉条目喂进来，`take_visible` 过滤出可见度严格大于零
//! 且仍在观察中的元素，摘除并一次性上报；可见度为零的条目保持观察。
//! 观察与取消观察均幂等，可从任意回调安全调用。

use std::collections::HashSet;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::LazyError;
use crate::host::ElementId;

/// 宿主可见性原语上报的单条交叉记录。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisibilityEntry {
    /// 对应元素标识。
    pub element: ElementId,
    /// 元素可见面积占比，0.0~1.0。
    pub intersection_ratio: f64,
}

/// 元素可见性观察器。
pub struct VisibilityObserver {
    thresholds: Vec<f64>,
    watched: Mutex<HashSet<ElementId>>,
}

impl VisibilityObserver {
    /// 以给定阈值档位创建观察器。
    pub(crate) fn new(thresholds: Vec<f64>) -> Self {
        Self {
            thresholds,
            watched: Mutex::new(HashSet::new()),
        }
    }

    /// 阈值档位，供宿主配置其可见性原语。
    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    /// 开始观察元素；重复调用幂等。
    pub fn observe(&self, element: ElementId) -> Result<(), LazyError> {
        let mut watched = self
            .watched
            .lock()
            .map_err(|_| LazyError::State("观察集合锁已中毒".to_string()))?;

        if watched.insert(element) {
            log::debug!("👁️ 开始观察 - {}", element);
        }

        Ok(())
    }

    /// 停止观察元素；对未观察元素调用安全。
    pub fn unobserve(&self, element: ElementId) -> Result<(), LazyError> {
        let mut watched = self
            .watched
            .lock()
            .map_err(|_| LazyError::State("观察集合锁已中毒".to_string()))?;

        if watched.remove(&element) {
            log::debug!("🙈 停止观察 - {}", element);
        }

        Ok(())
    }

    /// 元素当前是否在观察中。
    pub fn is_watched(&self, element: ElementId) -> Result<bool, LazyError> {
        let watched = self
            .watched
            .lock()
            .map_err(|_| LazyError::State("观察集合锁已中毒".to_string()))?;

        Ok(watched.contains(&element))
    }

    /// 从一批交叉条目中摘取已可见的元素。
    ///
    /// 可见度严格大于零且仍在观察中的元素被移出观察集合并返回，
    /// 每个元素至多上报一次；可见度为零的条目不做处理，继续挂起。
    pub fn take_visible(
        &self,
        entries: &[VisibilityEntry],
    ) -> Result<Vec<ElementId>, LazyError> {
        let mut watched = self
            .watched
            .lock()
            .map_err(|_| LazyError::State("观察集合锁已中毒".to_string()))?;

        let mut visible = Vec::new();
        for entry in entries {
            if entry.intersection_ratio > 0.0 && watched.remove(&entry.element) {
                visible.push(entry.element);
            }
        }

        Ok(visible)
    }
}
