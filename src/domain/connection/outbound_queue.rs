//! Outbound queue - FIFO buffer for frames sent while the transport is down.
//!
//! Frames are stored already serialized. The queue is flushed once when the
//! connection reaches Open; a send failure part-way through leaves the unsent
//! remainder in place, in order.
//!
//! The queue is bounded. What happens on overflow is decided by
//! [`OverflowPolicy`]; either way the caller learns which frame was dropped.

use std::collections::VecDeque;

use serde::Deserialize;

use crate::domain::foundation::Timestamp;

/// A serialized frame waiting for an open transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedMessage {
    pub payload: String,
    pub enqueued_at: Timestamp,
}

impl QueuedMessage {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            enqueued_at: Timestamp::now(),
        }
    }
}

/// What to do when a full queue receives another frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Evict the head to make room for the new frame.
    #[default]
    DropOldest,
    /// Keep the queue as is and drop the new frame.
    Reject,
}

/// Result of an enqueue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enqueued {
    /// Stored without loss.
    Stored,
    /// Stored; the oldest frame was evicted to make room.
    Evicted(QueuedMessage),
    /// Not stored; the queue was full.
    Rejected(QueuedMessage),
}

/// Flush interrupted by a failing send.
#[derive(Debug)]
pub struct FlushInterrupted<E> {
    /// Frames sent before the failure.
    pub sent: usize,
    /// Error returned by the send function.
    pub source: E,
}

/// Bounded FIFO of serialized outbound frames.
#[derive(Debug, Clone)]
pub struct OutboundQueue {
    items: VecDeque<QueuedMessage>,
    capacity: usize,
    overflow: OverflowPolicy,
}

impl OutboundQueue {
    /// Create a queue holding at most `capacity` frames (minimum 1).
    pub fn new(capacity: usize, overflow: OverflowPolicy) -> Self {
        Self {
            items: VecDeque::new(),
            capacity: capacity.max(1),
            overflow,
        }
    }

    /// Append a frame to the tail.
    pub fn enqueue(&mut self, payload: impl Into<String>) -> Enqueued {
        let message = QueuedMessage::new(payload);

        if self.items.len() < self.capacity {
            self.items.push_back(message);
            return Enqueued::Stored;
        }

        match self.overflow {
            OverflowPolicy::DropOldest => {
                let evicted = self.items.pop_front();
                self.items.push_back(message);
                match evicted {
                    Some(evicted) => Enqueued::Evicted(evicted),
                    None => Enqueued::Stored,
                }
            }
            OverflowPolicy::Reject => Enqueued::Rejected(message),
        }
    }

    /// Send every frame head-to-tail through `send`.
    ///
    /// A frame is removed only after `send` accepted it. On the first error
    /// the flush stops and the failed frame stays at the head.
    pub fn flush<F, E>(&mut self, mut send: F) -> Result<usize, FlushInterrupted<E>>
    where
        F: FnMut(&str) -> Result<(), E>,
    {
        let mut sent = 0;
        while let Some(head) = self.items.front() {
            if let Err(source) = send(&head.payload) {
                return Err(FlushInterrupted { sent, source });
            }
            self.items.pop_front();
            sent += 1;
        }
        Ok(sent)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Queued frames, head first.
    pub fn iter(&self) -> impl Iterator<Item = &QueuedMessage> {
        self.items.iter()
    }
}
