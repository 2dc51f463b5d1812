use uuid::Uuid;

use crate::{
    delivery::{unicast, Replies},
    handlers::not_signed_on,
    registry::Registry,
    replies::Reply,
};

pub fn handle_beep(registry: &Registry, connection_id: Uuid, target: &Option<String>) -> Replies {
    let mut replies = Replies::new();

    let conn_context = match registry.get(&connection_id) {
        Some(c) => c,
        None => return replies,
    };

    let target = match target {
        Some(t) => t,
        None => {
            unicast(
                &mut replies,
                connection_id,
                Reply::error("You must specify a nickname to beep."),
            );
            return replies;
        }
    };

    match registry.find_by_nick(target) {
        Some(other_user) => unicast(
            &mut replies,
            other_user.connection_id,
            Reply::Beep {
                nick: conn_context.nick().to_string(),
            },
        ),
        None => unicast(&mut replies, connection_id, Reply::error(not_signed_on(target))),
    }

    replies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing::{login, rendered};

    #[test]
    fn beep_reaches_target_in_any_group() {
        let mut registry = Registry::new();
        let a = login(&mut registry, "alice", Some("lobby"), 100);
        let b = login(&mut registry, "bob", Some("den"), 100);

        let replies = handle_beep(&registry, a, &Some("bob".to_string()));

        assert_eq!(vec!["kalice"], rendered(&replies, b));
        assert!(!replies.contains_key(&a));
    }

    #[test]
    fn beep_unknown_target_is_rejected() {
        let mut registry = Registry::new();
        let a = login(&mut registry, "alice", Some("lobby"), 100);

        let replies = handle_beep(&registry, a, &Some("ghost".to_string()));

        assert_eq!(vec!["eghost not signed on."], rendered(&replies, a));
    }
}
