use std::time::Duration;

use shared::error::{AppError, ErrorCode};
use shared::util::MAX_NODE_ID;

/// 服务器配置 - 订餐平台的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | HTTP_PORT | 8080 | HTTP 服务端口 |
/// | DATABASE_PATH | feast.db | SQLite 数据库路径 |
/// | NODE_ID | 1 | 雪花 ID 节点号 (1..=1023) |
/// | SESSION_DURATION_MINUTES | 90 | 桌台会话时长 |
/// | SESSION_EXTENSION_CAP_MINUTES | 60 | 会话延长总上限 |
/// | FRONTEND_BASE_URL | http://localhost:5173 | 前端地址（扫码加入链接） |
/// | EVENT_CHANNEL_CAPACITY | 1024 | 事件通道容量 |
/// | KITCHEN_CONSUMER_GROUP | kitchen-display | 厨房消费组名 |
/// | ENVIRONMENT | development | 运行环境 |
///
/// # 示例
///
/// ```ignore
/// HTTP_PORT=9000 NODE_ID=2 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API 服务端口
    pub http_port: u16,
    /// SQLite 数据库路径
    pub database_path: String,
    /// 雪花 ID 节点号
    pub node_id: i64,
    /// 桌台会话时长（分钟）
    pub session_duration_minutes: u64,
    /// 会话延长总上限（分钟）
    pub session_extension_cap_minutes: i64,
    /// 前端地址，用于生成扫码加入链接
    pub frontend_base_url: String,
    /// 事件通道容量
    pub event_channel_capacity: usize,
    /// 厨房显示消费组名
    pub kitchen_consumer_group: String,
    /// 运行环境: development | staging | production
    pub environment: String,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database_path: std::env::var("DATABASE_PATH").unwrap_or_else(|_| "feast.db".into()),
            node_id: std::env::var("NODE_ID")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(1),
            session_duration_minutes: std::env::var("SESSION_DURATION_MINUTES")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(90),
            session_extension_cap_minutes: std::env::var("SESSION_EXTENSION_CAP_MINUTES")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(60),
            frontend_base_url: std::env::var("FRONTEND_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
            event_channel_capacity: std::env::var("EVENT_CHANNEL_CAPACITY")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(1024),
            kitchen_consumer_group: std::env::var("KITCHEN_CONSUMER_GROUP")
                .unwrap_or_else(|_| "kitchen-display".into()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// 启动前校验配置
    ///
    /// 校验失败进程不得启动
    pub fn validate(&self) -> Result<(), AppError> {
        if !(1..=MAX_NODE_ID).contains(&self.node_id) {
            return Err(AppError::with_message(
                ErrorCode::ConfigError,
                format!("NODE_ID {} out of range (1..={})", self.node_id, MAX_NODE_ID),
            ));
        }
        if self.session_duration_minutes == 0 {
            return Err(AppError::with_message(
                ErrorCode::ConfigError,
                "SESSION_DURATION_MINUTES must be positive",
            ));
        }
        if self.event_channel_capacity == 0 {
            return Err(AppError::with_message(
                ErrorCode::ConfigError,
                "EVENT_CHANNEL_CAPACITY must be positive",
            ));
        }
        Ok(())
    }

    /// 会话时长
    pub fn session_duration(&self) -> Duration {
        Duration::from_secs(self.session_duration_minutes * 60)
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
