#[cfg(test)]
use std::collections::VecDeque;

use async_trait::async_trait;

#[async_trait]
pub trait ReceiverWrapper<T>
where
    T: Send,
{
    async fn receive(&mut self) -> Option<T>;
}

#[async_trait]
impl<T> ReceiverWrapper<T> for tokio::sync::mpsc::Receiver<T>
where
    T: Send,
{
    async fn receive(&mut self) -> Option<T> {
        self.recv().await
    }
}

/// Replays a fixed queue of messages, then reports the channel as closed.
#[cfg(test)]
pub struct FakeChannelReceiver<T>
where
    T: Send,
{
    pub faked_messages: Box<VecDeque<T>>,
    pub receive_count: i32,
}

#[cfg(test)]
#[async_trait]
impl<T> ReceiverWrapper<T> for FakeChannelReceiver<T>
where
    T: Send,
{
    async fn receive(&mut self) -> Option<T> {
        self.receive_count += 1;
        self.faked_messages.pop_front()
    }
}
