use uuid::Uuid;

use crate::{
    context::ServerContext,
    delivery::{unicast, Replies},
    registry::Registry,
    replies::Reply,
};

pub fn handle_motd(server_context: &ServerContext, registry: &Registry, connection_id: Uuid) -> Replies {
    let mut replies = Replies::new();

    if let Some(conn_context) = registry.get(&connection_id) {
        for line in server_context.motd.lines(conn_context) {
            unicast(&mut replies, connection_id, Reply::output(line));
        }
    }

    replies
}
