//! 事件通道核心实现
//!
//! # 消息流
//!
//! ```text
//! OrderWorkflow ──▶ publish() ──▶ broadcast::Sender ──▶ KitchenConsumer ──▶ Hub
//! ```

use shared::error::{AppError, ErrorCode};
use shared::message::ChannelMessage;
use tokio::sync::broadcast;

/// 事件通道 - 负责消息路由和转发
///
/// Topic 信息携带在 [`ChannelMessage`] 内；订阅方自行按 topic 过滤。
/// 消费者的生命周期由其自身的取消令牌管理。
#[derive(Debug)]
pub struct EventChannel {
    tx: broadcast::Sender<ChannelMessage>,
}

impl EventChannel {
    /// 创建指定容量的事件通道
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// 发布消息，等待通道确认
    ///
    /// 没有任何活跃订阅者时返回错误
    pub fn publish(&self, msg: ChannelMessage) -> Result<(), AppError> {
        self.tx.send(msg).map_err(|e| {
            AppError::with_message(
                ErrorCode::EventChannelError,
                format!("No active subscriber accepted the message: {e}"),
            )
        })?;
        Ok(())
    }

    /// 订阅事件流
    pub fn subscribe(&self) -> broadcast::Receiver<ChannelMessage> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::message::topics;
    use uuid::Uuid;

    #[test]
    fn publish_without_subscriber_errors() {
        let channel = EventChannel::new(8);
        let msg = ChannelMessage {
            id: Uuid::new_v4(),
            topic: topics::ORDER_ITEMS_CREATED.to_string(),
            payload: b"{}".to_vec(),
        };
        assert!(channel.publish(msg).is_err());
    }

    #[tokio::test]
    async fn subscriber_receives_published_message() {
        let channel = EventChannel::new(8);
        let mut rx = channel.subscribe();

        let msg = ChannelMessage {
            id: Uuid::new_v4(),
            topic: topics::ORDER_ITEMS_CREATED.to_string(),
            payload: b"[1,2,3]".to_vec(),
        };
        channel.publish(msg.clone()).unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received, msg);
    }
}
