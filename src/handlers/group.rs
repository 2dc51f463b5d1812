use uuid::Uuid;

use crate::{
    context::MAX_GROUP_LEN,
    delivery::{broadcast_all, broadcast_others, unicast, Replies},
    registry::Registry,
    replies::Reply,
};

pub fn handle_group(registry: &mut Registry, connection_id: Uuid, group: &Option<String>) -> Replies {
    let mut replies = Replies::new();

    match group {
        Some(group) => join_group(registry, connection_id, group, &mut replies),
        None => unicast(
            &mut replies,
            connection_id,
            Reply::error("Group name may not be null."),
        ),
    }

    replies
}

/// Moves a connection into `group`, creating it (with the connection as
/// moderator) if needed and dropping the old group once it is empty.
pub fn join_group(registry: &mut Registry, connection_id: Uuid, group: &str, replies: &mut Replies) {
    if group.chars().count() > MAX_GROUP_LEN {
        unicast(
            replies,
            connection_id,
            Reply::error(format!(
                "Group name must be at most {} characters.",
                MAX_GROUP_LEN
            )),
        );
        return;
    }

    let conn_context = match registry.get(&connection_id) {
        Some(c) => c,
        None => return,
    };

    let old_group = conn_context.group.clone();
    let address = conn_context.address();

    if old_group.as_deref() == Some(group) {
        unicast(
            replies,
            connection_id,
            Reply::error(format!("You are already in group {}.", group)),
        );
        return;
    }

    registry.create_group(group, connection_id);

    if let Some(conn_context) = registry.get_mut(&connection_id) {
        conn_context.group = Some(group.to_string());
    }

    if let Some(old_group) = &old_group {
        if registry.member_count(old_group) > 0 {
            broadcast_all(
                replies,
                registry,
                old_group,
                Reply::status("Depart", format!("{} just left", address)),
            );
        } else {
            registry.remove_group(old_group);
        }
    }

    let status = if registry.is_moderator(&connection_id, group) {
        format!("You are now in group {} as moderator", group)
    } else {
        format!("You are now in group {}", group)
    };
    unicast(replies, connection_id, Reply::status("Status", status));

    broadcast_others(
        replies,
        registry,
        group,
        connection_id,
        Reply::status("Sign-on", format!("{} entered group", address)),
    );

    if let Some(old_group) = &old_group {
        if registry.is_moderator(&connection_id, old_group) {
            unicast(
                replies,
                connection_id,
                Reply::status(
                    "Mod",
                    format!("You are still moderator of group {}", old_group),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing::{login, rendered};
    use test_case::test_case;

    #[test]
    fn join_new_group_creates_it_with_joiner_as_moderator() {
        let mut registry = Registry::new();
        let a = login(&mut registry, "alice", Some("lobby"), 100);
        login(&mut registry, "bob", Some("lobby"), 101);

        let replies = handle_group(&mut registry, a, &Some("den".to_string()));

        assert!(registry.is_moderator(&a, "den"));
        assert_eq!(Some("den"), registry.get(&a).unwrap().group.as_deref());
        assert_eq!(
            vec![
                "dStatus^AYou are now in group den as moderator",
                "dMod^AYou are still moderator of group lobby",
            ],
            rendered(&replies, a)
        );
    }

    #[test]
    fn last_member_leaving_deletes_group() {
        let mut registry = Registry::new();
        let a = login(&mut registry, "alice", Some("lobby"), 100);

        let replies = handle_group(&mut registry, a, &Some("den".to_string()));

        assert!(registry.group("lobby").is_none());
        assert_eq!(
            vec!["dStatus^AYou are now in group den as moderator"],
            rendered(&replies, a)
        );
    }

    #[test]
    fn join_existing_group_notifies_both_groups() {
        let mut registry = Registry::new();
        let a = login(&mut registry, "alice", Some("lobby"), 100);
        let b = login(&mut registry, "bob", Some("lobby"), 101);
        let c = login(&mut registry, "carol", Some("den"), 102);

        let replies = handle_group(&mut registry, b, &Some("den".to_string()));

        assert_eq!(
            vec!["dDepart^Abob (bob@127.0.0.1) just left"],
            rendered(&replies, a)
        );
        assert_eq!(
            vec!["dSign-on^Abob (bob@127.0.0.1) entered group"],
            rendered(&replies, c)
        );
        assert_eq!(vec!["dStatus^AYou are now in group den"], rendered(&replies, b));
        assert!(registry.is_moderator(&c, "den"));
        assert_eq!(1, registry.member_count("lobby"));
    }

    #[test]
    fn moderator_keeps_status_after_leaving() {
        let mut registry = Registry::new();
        let a = login(&mut registry, "alice", Some("lobby"), 100);
        let b = login(&mut registry, "bob", Some("lobby"), 101);

        handle_group(&mut registry, a, &Some("den".to_string()));
        let replies = handle_group(&mut registry, a, &Some("lobby".to_string()));

        assert!(registry.is_moderator(&a, "lobby"));
        assert!(registry.group("den").is_none());
        assert_eq!(
            vec!["dStatus^AYou are now in group lobby as moderator"],
            rendered(&replies, a)
        );
        assert_eq!(
            vec!["dSign-on^Aalice (alice@127.0.0.1) entered group"],
            rendered(&replies, b)
        );
    }

    #[test_case("abcdefg", true ; "seven characters is accepted")]
    #[test_case("abcdefgh", false ; "eight characters is rejected")]
    fn group_name_length_is_enforced(group: &str, accepted: bool) {
        let mut registry = Registry::new();
        let a = login(&mut registry, "alice", Some("lobby"), 100);

        let replies = handle_group(&mut registry, a, &Some(group.to_string()));

        assert_eq!(accepted, registry.group(group).is_some());
        if !accepted {
            assert_eq!(
                vec!["eGroup name must be at most 7 characters."],
                rendered(&replies, a)
            );
            assert_eq!(Some("lobby"), registry.get(&a).unwrap().group.as_deref());
        }
    }

    #[test]
    fn rejoining_current_group_is_rejected() {
        let mut registry = Registry::new();
        let a = login(&mut registry, "alice", Some("lobby"), 100);

        let replies = handle_group(&mut registry, a, &Some("lobby".to_string()));

        assert_eq!(vec!["eYou are already in group lobby."], rendered(&replies, a));
        assert!(registry.group("lobby").is_some());
    }

    #[test]
    fn missing_group_name_is_rejected() {
        let mut registry = Registry::new();
        let a = login(&mut registry, "alice", Some("lobby"), 100);

        let replies = handle_group(&mut registry, a, &None);

        assert_eq!(vec!["eGroup name may not be null."], rendered(&replies, a));
    }
}
