//! Notification sinks
//!
//! Implementations of [`NotificationSink`], the outbound hook the ledger uses
//! to tell users about lifecycle events. Delivery is at most once and best
//! effort: the ledger has already committed by the time a sink is called.
//!
//! - [`LogSink`] writes each event to the `tracing` log
//! - [`ChannelSink`] hands events to a tokio task for delivery off the caller's thread
//! - [`NoopSink`] drops everything

use crate::core::traits::NotificationSink;
use crate::types::{AccountId, LedgerEvent};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

/// Why an event could not be handed over
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NotifyError {
    /// The delivery side has shut down
    #[error("notification channel closed")]
    ChannelClosed,

    /// The recipient cannot be reached (blocked messages, unknown user, ...)
    #[error("recipient {recipient} unreachable: {reason}")]
    Unreachable {
        recipient: AccountId,
        reason: String,
    },
}

/// An event addressed to one user
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub recipient: AccountId,
    pub event: LedgerEvent,
}

/// Sink that drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl NotificationSink for NoopSink {
    fn notify(&self, _recipient: AccountId, _event: &LedgerEvent) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Sink that records each event in the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, recipient: AccountId, event: &LedgerEvent) -> Result<(), NotifyError> {
        info!(recipient, event = event.kind(), "{}", event);
        Ok(())
    }
}

/// Sink that forwards events over an unbounded tokio channel
///
/// Sending never blocks, so it is safe to call from inside the ledger's
/// synchronous operations. Once the receiving side is dropped every send fails
/// with [`NotifyError::ChannelClosed`].
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<Notification>,
}

impl ChannelSink {
    /// Create a sink and the receiver its events arrive on
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl NotificationSink for ChannelSink {
    fn notify(&self, recipient: AccountId, event: &LedgerEvent) -> Result<(), NotifyError> {
        self.sender
            .send(Notification {
                recipient,
                event: event.clone(),
            })
            .map_err(|_| NotifyError::ChannelClosed)
    }
}

/// Spawn a task draining `receiver` into `deliver`
///
/// Delivery failures are logged and discarded. The task ends once every
/// `ChannelSink` feeding the channel has been dropped, and returns the number
/// of notifications it delivered.
pub fn spawn_dispatcher<D>(
    mut receiver: mpsc::UnboundedReceiver<Notification>,
    deliver: D,
) -> JoinHandle<usize>
where
    D: NotificationSink + 'static,
{
    tokio::spawn(async move {
        let mut delivered = 0;
        while let Some(notification) = receiver.recv().await {
            match deliver.notify(notification.recipient, &notification.event) {
                Ok(()) => delivered += 1,
                Err(error) => tracing::warn!(
                    recipient = notification.recipient,
                    event = notification.event.kind(),
                    %error,
                    "notification delivery failed"
                ),
            }
        }
        delivered
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Delivers to everyone except one unreachable recipient
    struct Flaky {
        unreachable: AccountId,
        seen: Arc<Mutex<Vec<AccountId>>>,
    }

    impl NotificationSink for Flaky {
        fn notify(&self, recipient: AccountId, _event: &LedgerEvent) -> Result<(), NotifyError> {
            if recipient == self.unreachable {
                return Err(NotifyError::Unreachable {
                    recipient,
                    reason: "direct messages disabled".to_string(),
                });
            }
            self.seen.lock().push(recipient);
            Ok(())
        }
    }

    #[test]
    fn test_channel_sink_reports_closed_channel() {
        let (sink, receiver) = ChannelSink::new();
        drop(receiver);

        let result = sink.notify(1, &LedgerEvent::AccountRegistered);

        assert_eq!(result, Err(NotifyError::ChannelClosed));
    }

    #[tokio::test]
    async fn test_dispatcher_delivers_and_skips_failures() {
        let (sink, receiver) = ChannelSink::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = spawn_dispatcher(
            receiver,
            Flaky {
                unreachable: 2,
                seen: Arc::clone(&seen),
            },
        );

        for recipient in [1, 2, 3] {
            sink.notify(recipient, &LedgerEvent::AccountRegistered).unwrap();
        }
        drop(sink);

        let delivered = dispatcher.await.unwrap();

        assert_eq!(delivered, 2);
        assert_eq!(*seen.lock(), vec![1, 3]);
    }
}
