//! Core: 配置、状态、服务器、后台任务

mod config;
mod server;
mod state;
mod tasks;

pub use config::Config;
pub use server::Server;
pub use state::ServerState;
pub use tasks::{BackgroundTasks, TaskKind};
