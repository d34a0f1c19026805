//! ConnectionHub - per-user live push registry
//!
//! ```text
//! NotificationService::notify
//!       │ LiveMessage
//!       ▼
//! ConnectionHub
//!   └── users: user_id → UserChannel
//!         ├── tx: broadcast::Sender<LiveMessage> (fan-out to every tab)
//!         └── connections: open sockets for this user
//!               │
//!               ▼
//!         /api/live/ws session (recv → socket)
//! ```

use dashmap::DashMap;
use shared::live::LiveMessage;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Per-user broadcast capacity
const BROADCAST_CAPACITY: usize = 256;

struct UserChannel {
    tx: broadcast::Sender<LiveMessage>,
    connections: usize,
}

/// One open socket's subscription
pub struct Connection {
    pub user_id: i64,
    pub rx: broadcast::Receiver<LiveMessage>,
}

/// Registry of live connections keyed by user
#[derive(Clone, Default)]
pub struct ConnectionHub {
    users: Arc<DashMap<i64, UserChannel>>,
}

impl ConnectionHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new connection for the user
    pub fn register(&self, user_id: i64) -> Connection {
        let mut channel = self.users.entry(user_id).or_insert_with(|| {
            let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
            UserChannel { tx, connections: 0 }
        });
        channel.connections += 1;
        let rx = channel.tx.subscribe();

        tracing::debug!(user_id, connections = channel.connections, "Live connection registered");
        Connection { user_id, rx }
    }

    /// Drop a connection; the user entry goes away with the last one
    pub fn unregister(&self, connection: Connection) {
        let user_id = connection.user_id;
        drop(connection);

        self.users.remove_if_mut(&user_id, |_, channel| {
            channel.connections = channel.connections.saturating_sub(1);
            channel.connections == 0
        });
        tracing::debug!(user_id, "Live connection unregistered");
    }

    /// Push to every connection of the user
    ///
    /// Returns the number of receivers reached; 0 when offline.
    pub fn send_to(&self, user_id: i64, message: LiveMessage) -> usize {
        match self.users.get(&user_id) {
            // Err only when no receiver is subscribed
            Some(channel) => channel.tx.send(message).unwrap_or(0),
            None => 0,
        }
    }

    pub fn is_online(&self, user_id: i64) -> bool {
        self.users.contains_key(&user_id)
    }

    /// Number of open connections for the user
    pub fn connection_count(&self, user_id: i64) -> usize {
        self.users
            .get(&user_id)
            .map(|channel| channel.connections)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unread(count: i64) -> LiveMessage {
        LiveMessage::Unread { count }
    }

    #[test]
    fn test_offline_send_is_noop() {
        let hub = ConnectionHub::new();
        assert_eq!(hub.send_to(1, unread(1)), 0);
        assert!(!hub.is_online(1));
    }

    #[tokio::test]
    async fn test_fan_out_to_every_tab() {
        let hub = ConnectionHub::new();
        let mut tab_a = hub.register(7);
        let mut tab_b = hub.register(7);
        let mut other = hub.register(8);

        assert_eq!(hub.send_to(7, unread(3)), 2);

        assert_eq!(tab_a.rx.recv().await.unwrap(), unread(3));
        assert_eq!(tab_b.rx.recv().await.unwrap(), unread(3));
        assert!(other.rx.try_recv().is_err());
    }

    #[test]
    fn test_unregister_last_connection_removes_user() {
        let hub = ConnectionHub::new();
        let first = hub.register(7);
        let second = hub.register(7);
        assert_eq!(hub.connection_count(7), 2);

        hub.unregister(first);
        assert!(hub.is_online(7));
        assert_eq!(hub.send_to(7, unread(1)), 1);

        hub.unregister(second);
        assert!(!hub.is_online(7));
        assert_eq!(hub.send_to(7, unread(1)), 0);
    }
}
