//! # 宿主接缝模块
//!
//! ## 设计思路
//!
//! 引擎不直接触碰任何 UI 元素：宿主框架用 `ElementId` 标识元素，
//! 引擎通过 `ElementHost` 这一个窄接口把“设置元素当前资源地址”的
//! 副作用交还给宿主。资源的实际抓取由宿主环境在地址被赋值时隐式发起。

use std::fmt;

use serde::{Deserialize, Serialize};

/// 宿主侧元素的稳定标识。
///
/// 引擎内部以它为键维护元素状态表，含义由宿主自行定义（DOM 节点句柄、
/// 组件实例编号等），引擎只要求同一元素在其生命周期内标识不变。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element#{}", self.0)
    }
}

/// 引擎回写宿主的唯一通道。
///
/// 实现方负责把 `src` 设置为元素的当前资源地址，并在宿主环境的
/// 加载结束后通过服务层的 `report_load_success` / `report_load_failure`
/// 把结果喂回来。实现必须可跨线程共享：重试定时任务也会经由它回写。
pub trait ElementHost: Send + Sync {
    /// 将 `src` 设为元素当前资源地址（触发宿主的隐式异步加载）。
    fn assign_source(&self, element: ElementId, src: &str);
}
