use uuid::Uuid;

use crate::{
    delivery::{broadcast_group_of, unicast, Replies},
    registry::Registry,
    replies::Reply,
};

pub fn handle_brick(registry: &mut Registry, connection_id: Uuid, target: &Option<String>) -> Replies {
    let mut replies = Replies::new();

    let conn_context = match registry.get(&connection_id) {
        Some(c) => c,
        None => return replies,
    };

    let bricks = conn_context.bricks;
    let group = conn_context.group.clone();

    let target = match target {
        Some(t) => t,
        None => {
            let text = match bricks {
                1 => "You have 1 brick remaining.".to_string(),
                n => format!("You have {} bricks remaining.", n),
            };
            unicast(&mut replies, connection_id, Reply::status("FYI", text));
            return replies;
        }
    };

    if bricks == 0 {
        unicast(
            &mut replies,
            connection_id,
            Reply::error("You have no bricks remaining."),
        );
        return replies;
    }

    if let Some(conn_context) = registry.get_mut(&connection_id) {
        conn_context.bricks -= 1;
    }

    let victim = registry
        .find_by_nick(target)
        .filter(|v| v.connection_id != connection_id)
        .filter(|v| group.is_some() && v.group == group)
        .map(|v| v.connection_id);

    let notice = match victim.and_then(|v| registry.get_mut(&v)) {
        Some(victim) => {
            victim.bricks += 1;
            format!("{} has been bricked.", target)
        }
        None => "A brick flies off into the ether.".to_string(),
    };

    broadcast_group_of(
        &mut replies,
        registry,
        connection_id,
        group.as_deref(),
        Reply::status("FYI", notice),
    );

    replies
}
