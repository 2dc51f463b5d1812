use uuid::Uuid;

use crate::{
    delivery::{broadcast_all, unicast, Replies},
    handlers::not_signed_on,
    registry::Registry,
    replies::Reply,
};

pub fn handle_pass(registry: &mut Registry, connection_id: Uuid, target: &Option<String>) -> Replies {
    let mut replies = Replies::new();

    let conn_context = match registry.get(&connection_id) {
        Some(c) => c,
        None => return replies,
    };

    let nick = conn_context.nick().to_string();
    let group = match conn_context.group.clone() {
        Some(g) if registry.is_moderator(&connection_id, &g) => g,
        _ => {
            unicast(
                &mut replies,
                connection_id,
                Reply::error("You aren't the moderator."),
            );
            return replies;
        }
    };

    let (successor, notice) = match target {
        None => (None, format!("{} just relinquished moderation of group {}", nick, group)),
        Some(target) => match registry.find_by_nick(target) {
            Some(other_user) => (
                Some(other_user.connection_id),
                format!("{} has passed moderation to {}", nick, target),
            ),
            None => {
                unicast(&mut replies, connection_id, Reply::error(not_signed_on(target)));
                return replies;
            }
        },
    };

    if let Some(group_context) = registry.group_mut(&group) {
        group_context.moderator = successor;
    }

    let notice = Reply::status("Pass", notice);
    broadcast_all(&mut replies, registry, &group, notice.clone());

    // The new moderator may be sitting in another group.
    if let Some(successor) = successor {
        if !replies.contains_key(&successor) {
            unicast(&mut replies, successor, notice);
        }
    }

    replies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing::{login, rendered};

    #[test]
    fn pass_moves_moderation_and_notifies_group() {
        let mut registry = Registry::new();
        let a = login(&mut registry, "alice", Some("lobby"), 100);
        let b = login(&mut registry, "bob", Some("lobby"), 101);

        let replies = handle_pass(&mut registry, a, &Some("bob".to_string()));

        assert!(registry.is_moderator(&b, "lobby"));
        for id in [a, b] {
            assert_eq!(
                vec!["dPass^Aalice has passed moderation to bob"],
                rendered(&replies, id)
            );
        }
    }

    #[test]
    fn pass_to_member_of_other_group() {
        let mut registry = Registry::new();
        let a = login(&mut registry, "alice", Some("lobby"), 100);
        let b = login(&mut registry, "bob", Some("den"), 101);

        let replies = handle_pass(&mut registry, a, &Some("bob".to_string()));

        assert!(registry.is_moderator(&b, "lobby"));
        assert!(registry.is_moderator(&b, "den"));
        assert_eq!(
            vec!["dPass^Aalice has passed moderation to bob"],
            rendered(&replies, b)
        );
    }

    #[test]
    fn pass_without_target_vacates() {
        let mut registry = Registry::new();
        let a = login(&mut registry, "alice", Some("lobby"), 100);

        let replies = handle_pass(&mut registry, a, &None);

        assert_eq!(None, registry.group("lobby").unwrap().moderator);
        assert_eq!(
            vec!["dPass^Aalice just relinquished moderation of group lobby"],
            rendered(&replies, a)
        );
    }

    #[test]
    fn pass_by_non_moderator_is_rejected() {
        let mut registry = Registry::new();
        let a = login(&mut registry, "alice", Some("lobby"), 100);
        let b = login(&mut registry, "bob", Some("lobby"), 101);

        let replies = handle_pass(&mut registry, b, &Some("bob".to_string()));

        assert_eq!(vec!["eYou aren't the moderator."], rendered(&replies, b));
        assert!(registry.is_moderator(&a, "lobby"));
    }

    #[test]
    fn pass_to_offline_nick_is_rejected() {
        let mut registry = Registry::new();
        let a = login(&mut registry, "alice", Some("lobby"), 100);

        let replies = handle_pass(&mut registry, a, &Some("ghost".to_string()));

        assert_eq!(vec!["eghost not signed on."], rendered(&replies, a));
        assert!(registry.is_moderator(&a, "lobby"));
    }
}
