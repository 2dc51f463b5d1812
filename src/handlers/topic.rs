use uuid::Uuid;

use crate::{
    delivery::{broadcast_all, unicast, Replies},
    registry::Registry,
    replies::Reply,
};

pub fn handle_topic(registry: &mut Registry, connection_id: Uuid, topic: &Option<String>) -> Replies {
    let mut replies = Replies::new();

    let conn_context = match registry.get(&connection_id) {
        Some(c) => c,
        None => return replies,
    };

    let nick = conn_context.nick().to_string();
    let group = match conn_context.group.clone() {
        Some(g) => g,
        None => {
            unicast(&mut replies, connection_id, Reply::error("You aren't in a group."));
            return replies;
        }
    };

    let topic = match topic {
        Some(t) => t,
        None => {
            unicast(&mut replies, connection_id, Reply::error("Topic may not be null."));
            return replies;
        }
    };

    if let Some(group_context) = registry.group_mut(&group) {
        group_context.topic = topic.to_string();
    }

    broadcast_all(
        &mut replies,
        registry,
        &group,
        Reply::status("Topic", format!("{} changed the topic to \"{}\"", nick, topic)),
    );

    replies
}
