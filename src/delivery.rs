use std::collections::HashMap;

use uuid::Uuid;

use crate::{registry::Registry, replies::Reply};

/// Packets produced by one command, queued per recipient in send order.
pub type Replies = HashMap<Uuid, Vec<Reply>>;

pub fn unicast(replies: &mut Replies, connection_id: Uuid, reply: Reply) {
    replies.entry(connection_id).or_default().push(reply);
}

/// Every member of `group` except `sender`.
pub fn broadcast_others(
    replies: &mut Replies,
    registry: &Registry,
    group: &str,
    sender: Uuid,
    reply: Reply,
) {
    for member in registry.members(group) {
        if member == sender {
            continue;
        }
        unicast(replies, member, reply.clone());
    }
}

pub fn broadcast_all(replies: &mut Replies, registry: &Registry, group: &str, reply: Reply) {
    for member in registry.members(group) {
        unicast(replies, member, reply.clone());
    }
}

/// The sender's whole group, or just the sender when it has none.
pub fn broadcast_group_of(
    replies: &mut Replies,
    registry: &Registry,
    sender: Uuid,
    group: Option<&str>,
    reply: Reply,
) {
    match group {
        Some(group) => broadcast_all(replies, registry, group, reply),
        None => unicast(replies, sender, reply),
    }
}
