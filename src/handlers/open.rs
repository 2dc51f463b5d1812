use uuid::Uuid;

use crate::{
    delivery::{broadcast_others, unicast, Replies},
    registry::Registry,
    replies::Reply,
};

pub fn handle_open(registry: &mut Registry, connection_id: Uuid, text: &str, now: i64) -> Replies {
    let mut replies = Replies::new();

    let conn_context = match registry.get_mut(&connection_id) {
        Some(c) => c,
        None => return replies,
    };

    conn_context.idle_since = now;
    let nick = conn_context.nick().to_string();
    let group = conn_context.group.clone();

    match group {
        Some(group) if registry.member_count(&group) > 1 => broadcast_others(
            &mut replies,
            registry,
            &group,
            connection_id,
            Reply::Open {
                nick,
                text: text.to_string(),
            },
        ),
        _ => unicast(
            &mut replies,
            connection_id,
            Reply::error("No-one else in group!"),
        ),
    }

    replies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing::{login, rendered};

    #[test]
    fn open_message_reaches_everyone_else_in_group() {
        let mut registry = Registry::new();
        let a = login(&mut registry, "alice", Some("lobby"), 100);
        let b = login(&mut registry, "bob", Some("lobby"), 100);
        let c = login(&mut registry, "carol", Some("lobby"), 100);
        let d = login(&mut registry, "dave", Some("den"), 100);

        let replies = handle_open(&mut registry, a, "hi all", 150);

        assert!(!replies.contains_key(&a));
        assert_eq!(vec!["balice^Ahi all"], rendered(&replies, b));
        assert_eq!(vec!["balice^Ahi all"], rendered(&replies, c));
        assert!(!replies.contains_key(&d));
        assert_eq!(150, registry.get(&a).unwrap().idle_since);
    }

    #[test]
    fn open_message_alone_in_group_is_rejected() {
        let mut registry = Registry::new();
        let a = login(&mut registry, "alice", Some("lobby"), 100);
        login(&mut registry, "bob", Some("den"), 100);

        let replies = handle_open(&mut registry, a, "anyone?", 150);

        assert_eq!(vec!["eNo-one else in group!"], rendered(&replies, a));
        assert_eq!(1, replies.len());
    }
}
