use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    delivery::{broadcast_others, Replies},
    registry::Registry,
    replies::Reply,
};

/// Accounts for a departing connection, then hands each group it moderated
/// to the longest signed-on remaining member before dropping the connection.
pub fn handle_disconnect(registry: &mut Registry, connection_id: Uuid) -> Replies {
    let mut replies = Replies::new();

    let conn_context = match registry.get(&connection_id) {
        Some(c) => c.clone(),
        None => return replies,
    };

    if !conn_context.is_active() {
        registry.remove(&connection_id);
        return replies;
    }

    if let Some(group) = &conn_context.group {
        if registry.member_count(group) > 1 {
            broadcast_others(
                &mut replies,
                registry,
                group,
                connection_id,
                Reply::status(
                    "Sign-off",
                    format!("{} has signed off.", conn_context.address()),
                ),
            );
        } else {
            registry.remove_group(group);
        }
    }

    for group in registry.group_names() {
        if !registry.is_moderator(&connection_id, &group) {
            continue;
        }

        let successor = registry
            .active()
            .filter(|c| c.connection_id != connection_id)
            .filter(|c| c.group.as_deref() == Some(group.as_str()))
            .min_by_key(|c| c.login_time)
            .map(|c| (c.connection_id, c.nick().to_string()));

        if conn_context.group.as_deref() != Some(group.as_str()) {
            broadcast_others(
                &mut replies,
                registry,
                &group,
                connection_id,
                Reply::status("Sign-off", "Your group moderator signed off."),
            );
        }

        if let Some(group_context) = registry.group_mut(&group) {
            group_context.moderator = successor.as_ref().map(|(id, _)| *id);
        }

        match successor {
            Some((_, nick)) => broadcast_others(
                &mut replies,
                registry,
                &group,
                connection_id,
                Reply::status("Pass", format!("{} is now mod.", nick)),
            ),
            None => debug!("Group {} left without a moderator", group),
        }
    }

    registry.remove(&connection_id);
    info!("{} signed off", conn_context.address());

    replies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{
        group::handle_group,
        pass::handle_pass,
        testing::{connect, login, rendered},
    };

    #[test]
    fn sole_member_leaving_deletes_group_and_rejoin_recreates_it() {
        let mut registry = Registry::new();
        let a = login(&mut registry, "alice", Some("x"), 100);
        registry.group_mut("x").unwrap().topic = "old".to_string();

        let replies = handle_disconnect(&mut registry, a);

        assert!(replies.is_empty());
        assert!(registry.group("x").is_none());
        assert!(!registry.contains(&a));

        let b = login(&mut registry, "bob", Some("x"), 200);
        assert_eq!("(None)", registry.group("x").unwrap().topic);
        assert!(registry.is_moderator(&b, "x"));
    }

    #[test]
    fn moderator_leaving_hands_over_to_earliest_login() {
        let mut registry = Registry::new();
        let a = login(&mut registry, "alice", Some("lobby"), 100);
        let b = login(&mut registry, "bob", Some("lobby"), 300);
        let c = login(&mut registry, "carol", Some("lobby"), 200);

        let replies = handle_disconnect(&mut registry, a);

        assert!(registry.is_moderator(&c, "lobby"));
        for id in [b, c] {
            assert_eq!(
                vec![
                    "dSign-off^Aalice (alice@127.0.0.1) has signed off.",
                    "dPass^Acarol is now mod.",
                ],
                rendered(&replies, id)
            );
        }
    }

    #[test]
    fn login_time_tie_goes_to_first_accepted() {
        let mut registry = Registry::new();
        let a = login(&mut registry, "alice", Some("lobby"), 100);
        let b = login(&mut registry, "bob", Some("lobby"), 150);
        login(&mut registry, "carol", Some("lobby"), 150);

        handle_disconnect(&mut registry, a);

        assert!(registry.is_moderator(&b, "lobby"));
    }

    #[test]
    fn absent_moderator_is_succeeded_in_every_group() {
        let mut registry = Registry::new();
        let a = login(&mut registry, "alice", Some("lobby"), 100);
        let b = login(&mut registry, "bob", Some("lobby"), 110);
        handle_group(&mut registry, a, &Some("den".to_string()));
        let c = login(&mut registry, "carol", Some("den"), 120);

        let replies = handle_disconnect(&mut registry, a);

        assert!(registry.is_moderator(&b, "lobby"));
        assert!(registry.is_moderator(&c, "den"));
        assert_eq!(
            vec![
                "dSign-off^AYour group moderator signed off.",
                "dPass^Abob is now mod.",
            ],
            rendered(&replies, b)
        );
        assert_eq!(
            vec![
                "dSign-off^Aalice (alice@127.0.0.1) has signed off.",
                "dPass^Acarol is now mod.",
            ],
            rendered(&replies, c)
        );
    }

    #[test]
    fn no_moderator_reference_survives_disconnect() {
        let mut registry = Registry::new();
        let a = login(&mut registry, "alice", Some("lobby"), 100);
        login(&mut registry, "bob", Some("lobby"), 110);
        login(&mut registry, "carol", Some("den"), 120);
        handle_pass(&mut registry, a, &Some("carol".to_string()));
        login(&mut registry, "dave", Some("den"), 130);

        let carol = registry.find_by_nick("carol").unwrap().connection_id;
        handle_disconnect(&mut registry, carol);
        handle_disconnect(&mut registry, a);

        for (_, group) in registry.groups() {
            if let Some(moderator) = &group.moderator {
                assert!(registry.contains(moderator));
            }
        }
        assert_eq!(registry.groups().count(), 2);
    }

    #[test]
    fn connection_that_never_logged_in_is_just_removed() {
        let mut registry = Registry::new();
        login(&mut registry, "alice", Some("lobby"), 100);
        let w = connect(&mut registry);

        let replies = handle_disconnect(&mut registry, w);

        assert!(replies.is_empty());
        assert!(!registry.contains(&w));
        assert_eq!(1, registry.user_count());
    }
}
