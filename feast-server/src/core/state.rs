use std::sync::Arc;
use std::time::Duration;

use shared::error::{AppError, AppResult, ErrorCode};
use shared::util::IdGenerator;

use crate::cache::{MemoryCache, SessionCache};
use crate::core::{BackgroundTasks, Config, TaskKind};
use crate::events::{EventChannel, ItemProducer, KitchenConsumer};
use crate::hub::{HubHandle, KitchenHub};
use crate::orders::OrderWorkflow;
use crate::payments::PaymentWorkflow;
use crate::sessions::{SessionConfig, SessionWorkflow};
use crate::store::{SqliteStore, Store};

/// 缓存清扫间隔
const CACHE_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// 服务器状态 - 持有所有组件的共享引用
///
/// ServerState 是平台的核心数据结构。所有组件都以显式依赖注入的方式
/// 构造并传入传输层，不存在包级可变单例。
///
/// # 组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | ids | Arc<IdGenerator> | 雪花 ID 生成器 |
/// | store | Arc<dyn Store> | 持久存储 |
/// | cache | Arc<MemoryCache> | 会话缓存 |
/// | events | Arc<EventChannel> | 事件通道 |
/// | hub | HubHandle | 厨房广播枢纽句柄 |
/// | sessions | Arc<SessionWorkflow> | 桌台会话工作流 |
/// | orders | Arc<OrderWorkflow> | 订单工作流 |
/// | payments | Arc<PaymentWorkflow> | 结账工作流 |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub ids: Arc<IdGenerator>,
    pub store: Arc<dyn Store>,
    pub cache: Arc<MemoryCache>,
    pub events: Arc<EventChannel>,
    pub hub: HubHandle,
    pub sessions: Arc<SessionWorkflow>,
    pub orders: Arc<OrderWorkflow>,
    pub payments: Arc<PaymentWorkflow>,
}

impl ServerState {
    /// 初始化服务器状态和后台任务
    ///
    /// 按顺序初始化：
    /// 1. 配置校验（节点号越界时进程不得启动）
    /// 2. ID 生成器、数据库、缓存、事件通道
    /// 3. 后台任务：厨房枢纽、厨房消费者、缓存清扫
    /// 4. 工作流（会话、订单、结账）
    pub async fn initialize(config: &Config) -> AppResult<(Self, BackgroundTasks)> {
        config.validate()?;

        let ids = Arc::new(IdGenerator::new(config.node_id).map_err(|e| {
            AppError::with_message(ErrorCode::ConfigError, e.to_string())
        })?);

        let sqlite = SqliteStore::new(&config.database_path, ids.clone()).await?;
        let store: Arc<dyn Store> = Arc::new(sqlite);

        let cache = Arc::new(MemoryCache::new());
        let cache_dyn: Arc<dyn SessionCache> = cache.clone();

        let events = Arc::new(EventChannel::new(config.event_channel_capacity));

        let mut tasks = BackgroundTasks::new();
        let shutdown = tasks.shutdown_token();

        let (hub, hub_actor) = KitchenHub::new(shutdown.clone());
        tasks.spawn("kitchen_hub", TaskKind::Worker, hub_actor.run());

        let consumer = KitchenConsumer::new(
            config.kitchen_consumer_group.clone(),
            events.subscribe(),
            hub.clone(),
            shutdown.clone(),
        );
        tasks.spawn("kitchen_consumer", TaskKind::Worker, consumer.run());

        {
            let cache = cache.clone();
            let shutdown = shutdown.clone();
            tasks.spawn("cache_sweeper", TaskKind::Periodic, async move {
                cache.run_sweeper(CACHE_SWEEP_INTERVAL, shutdown).await;
            });
        }

        let sessions = Arc::new(SessionWorkflow::new(
            store.clone(),
            cache_dyn.clone(),
            SessionConfig::from_config(config),
        ));
        let orders = Arc::new(OrderWorkflow::new(
            store.clone(),
            cache_dyn,
            ItemProducer::new(events.clone()),
        ));
        let payments = Arc::new(PaymentWorkflow::new(store.clone(), sessions.clone()));

        let state = Self {
            config: config.clone(),
            ids,
            store,
            cache,
            events,
            hub,
            sessions,
            orders,
            payments,
        };

        Ok((state, tasks))
    }
}
