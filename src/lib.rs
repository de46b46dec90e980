//! # 图片懒加载引擎 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   宿主视图框架（指令层）                   │
//! │                                                          │
//! │   bind/update ──── unbind ──── 可见性原语 ──── load/error │
//! └───────┼──────────────┼────────────┼─────────────┼────────┘
//!         ↕ attach       ↕ detach     ↕ report_*    ↕ report_*
//! ┌───────┼──────────────┼────────────┼─────────────┼────────┐
//! │       ↕           服务层 (LazyLoadService)               │
//! │                                                          │
//! │  ┌─ params ───── 绑定值解析（string | {src,loading,reload}）│
//! │  │                                                       │
//! │  ├─ engine ───── 生命周期编排 + 元素状态表 + 重试定时器    │
//! │  │   ├─ state        显式状态机（阶段 + 事件守卫）         │
//! │  │   ├─ observer     可见性观察（阈值档位、一次性上报）     │
//! │  │   └─ reload       重试地址改写（查询串计数、上限 10）    │
//! │  │                                                       │
//! │  ├─ config ───── 可调策略（间隔、上限、计数键、阈值）       │
//! │  ├─ error ────── 统一错误类型 LazyError                   │
//! │  └─ host ─────── ElementId + ElementHost 回写接缝         │
//! └──────────┼───────────────────────────────────────────────┘
//!            ↕ assign_source（触发宿主隐式加载）
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`service`] | 宿主框架入口：挂载/卸载、事件上报、配置读写 |
//! | [`params`] | 绑定值解析，缺失/错型字段落回默认值 |
//! | [`observer`] | 可见性观察：阈值档位、幂等注册、一次性可见上报 |
//! | [`reload`] | 重试地址改写：查询串计数往返、上限与解析失败哨兵 |
//! | [`config`] | 集中可调策略与范围校验 |
//! | [`error`] | 统一错误类型 `LazyError` |
//! | [`host`] | 元素标识与宿主回写接缝 |
//! | [`state`] | 加载阶段状态机与元素状态记录 |

pub mod config;
mod engine;
pub mod error;
pub mod host;
pub mod observer;
pub mod params;
pub mod reload;
pub mod service;
pub mod state;

pub use config::LazyConfig;
pub use error::LazyError;
pub use host::{ElementHost, ElementId};
pub use observer::{VisibilityEntry, VisibilityObserver};
pub use params::LoadParams;
pub use reload::next_reload_url;
pub use service::LazyLoadService;
pub use state::LoadPhase;
