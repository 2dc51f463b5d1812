use uuid::Uuid;

use crate::{
    delivery::{unicast, Replies},
    registry::Registry,
    replies::Reply,
};

pub fn handle_who(registry: &Registry, connection_id: Uuid, now: i64) -> Replies {
    let mut replies = Replies::new();

    for reply in who_listing(registry, now) {
        unicast(&mut replies, connection_id, reply);
    }

    replies
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

/// One summary line per group followed by its members, then the totals.
pub fn who_listing(registry: &Registry, now: i64) -> Vec<Reply> {
    let mut replies = vec![Reply::output("")];

    for (name, group) in registry.groups() {
        let moderator = registry.moderator_of(name);

        replies.push(Reply::output(format!(
            "Group: {:<8} ({}) Mod: {:<13} Topic: {}",
            name,
            if moderator.is_some() { "m" } else { "-" },
            moderator.map(|m| m.nick()).unwrap_or("(None)"),
            group.topic
        )));

        for member in registry.members(name) {
            let member = match registry.get(&member) {
                Some(m) => m,
                None => continue,
            };

            replies.push(Reply::WhoListing {
                moderator: group.moderator == Some(member.connection_id),
                nick: member.nick().to_string(),
                idle_secs: (now - member.idle_since).max(0),
                login_time: member.login_time,
                login_id: member.login_id().to_string(),
                host: member.host(),
            });
        }
    }

    let groups = registry.groups().count();
    replies.push(Reply::output(format!(
        "Total: {} in {}",
        plural(registry.user_count(), "user"),
        plural(groups, "group")
    )));

    replies
}
