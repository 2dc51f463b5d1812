use std::{net::SocketAddr, sync::Arc};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::motd::MotdProvider;

pub const PROTOCOL_LEVEL: &str = "1";
pub const MAX_NICK_LEN: usize = 12;
pub const MAX_GROUP_LEN: usize = 7;
pub const DEFAULT_BRICKS: u32 = 5;
pub const DEFAULT_TOPIC: &str = "(None)";

#[derive(Clone)]
pub struct ServerContext {
    pub start_time: DateTime<Utc>,
    pub server_host: String,
    pub server_id: String,
    pub motd: Arc<dyn MotdProvider>,
}

/// Per-connection attributes. A connection is active (logged in) once it
/// holds a nickname.
#[derive(Debug, Clone)]
pub struct ConnectionContext {
    pub connection_id: Uuid,
    pub login_id: Option<String>,
    pub nick: Option<String>,
    pub group: Option<String>,
    pub client_host: Option<SocketAddr>,
    pub login_time: i64,
    pub idle_since: i64,
    pub bricks: u32,
}

impl ConnectionContext {
    pub fn new(connection_id: Uuid, client_host: Option<SocketAddr>) -> Self {
        ConnectionContext {
            connection_id,
            login_id: None,
            nick: None,
            group: None,
            client_host,
            login_time: 0,
            idle_since: 0,
            bricks: DEFAULT_BRICKS,
        }
    }

    pub fn is_active(&self) -> bool {
        self.nick.is_some()
    }

    pub fn nick(&self) -> &str {
        self.nick.as_deref().unwrap_or_default()
    }

    pub fn login_id(&self) -> &str {
        self.login_id.as_deref().unwrap_or_default()
    }

    pub fn host(&self) -> String {
        match self.client_host {
            Some(addr) => addr.ip().to_string(),
            None => "unknown".to_string(),
        }
    }

    /// `nick (login@host)`, as shown in sign-on and sign-off notices.
    pub fn address(&self) -> String {
        format!("{} ({}@{})", self.nick(), self.login_id(), self.host())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupContext {
    pub topic: String,
    pub moderator: Option<Uuid>,
}

impl GroupContext {
    pub fn new(moderator: Option<Uuid>) -> Self {
        GroupContext {
            topic: DEFAULT_TOPIC.to_string(),
            moderator,
        }
    }
}
