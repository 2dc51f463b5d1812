use tracing::info;
use uuid::Uuid;

use crate::{
    context::MAX_NICK_LEN,
    delivery::{broadcast_group_of, unicast, Replies},
    registry::Registry,
    replies::Reply,
};

pub fn handle_name(registry: &mut Registry, connection_id: Uuid, nick: &Option<String>) -> Replies {
    let mut replies = Replies::new();

    let nick = match nick {
        Some(n) => n,
        None => {
            unicast(
                &mut replies,
                connection_id,
                Reply::error("Nickname may not be null."),
            );
            return replies;
        }
    };

    if nick.chars().count() > MAX_NICK_LEN {
        unicast(
            &mut replies,
            connection_id,
            Reply::error(format!("Nickname must be 1-{} characters.", MAX_NICK_LEN)),
        );
        return replies;
    }

    let current = registry.get(&connection_id).map(|c| c.nick());
    if current == Some(nick.as_str()) {
        return replies;
    }

    if registry.nick_in_use(nick) {
        unicast(&mut replies, connection_id, Reply::error("Nickname already in use."));
        return replies;
    }

    let conn_context = match registry.get_mut(&connection_id) {
        Some(c) => c,
        None => return replies,
    };

    let old_nick = conn_context.nick().to_string();
    conn_context.nick = Some(nick.to_string());
    let group = conn_context.group.clone();

    info!("{} is now known as {}", old_nick, nick);

    broadcast_group_of(
        &mut replies,
        registry,
        connection_id,
        group.as_deref(),
        Reply::status("Name", format!("{} changed nickname to {}", old_nick, nick)),
    );

    replies
}
