//! FEAST Server - 餐厅点餐平台
//!
//! # 架构概述
//!
//! 本模块是点餐平台的主入口，核心是桌台会话生命周期与订单聚合工作流：
//!
//! - **会话工作流** (`sessions`): 开台、延长、关台，缓存与持久双写
//! - **订单工作流** (`orders`): 每会话至多一单、加菜、菜品状态流转
//! - **结账工作流** (`payments`): 全部菜品终态后结账并关闭会话
//! - **事件通道** (`events`): 新菜品发布/消费
//! - **广播枢纽** (`hub`): 厨房显示连接的单写者 actor
//!
//! # 模块结构
//!
//! ```text
//! feast-server/src/
//! ├── core/          # 配置、状态、服务器、后台任务
//! ├── api/           # HTTP 路由和处理器
//! ├── cache/         # 会话缓存 (TTL)
//! ├── store/         # 持久存储 (trait + SQLite)
//! ├── sessions/      # 桌台会话工作流
//! ├── orders/        # 订单工作流
//! ├── payments/      # 结账工作流
//! ├── events/        # 事件通道
//! ├── hub/           # 厨房广播枢纽
//! └── utils/         # 日志等工具
//! ```

pub mod api;
pub mod cache;
pub mod core;
pub mod events;
pub mod hub;
pub mod orders;
pub mod payments;
pub mod sessions;
pub mod store;
pub mod utils;

// Re-export 公共类型
pub use crate::core::{Config, Server, ServerState};
pub use crate::utils::init_logger;

/// 设置运行环境 (dotenv + 日志)
pub fn setup_environment() {
    dotenv::dotenv().ok();
    init_logger();
}
