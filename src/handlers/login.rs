use tracing::info;
use uuid::Uuid;

use crate::{
    context::{ServerContext, DEFAULT_BRICKS, MAX_NICK_LEN},
    delivery::{unicast, Replies},
    handlers::{group::join_group, who::who_listing},
    registry::Registry,
    replies::Reply,
};

#[allow(clippy::too_many_arguments)]
pub fn handle_login(
    server_context: &ServerContext,
    registry: &mut Registry,
    connection_id: Uuid,
    login_id: &str,
    nick: &str,
    group: Option<&str>,
    mode: &str,
    now: i64,
) -> Replies {
    let mut replies = Replies::new();

    let conn_context = match registry.get(&connection_id) {
        Some(c) => c,
        None => return replies,
    };

    if conn_context.is_active() {
        unicast(&mut replies, connection_id, Reply::error("Already logged in."));
        return replies;
    }

    // "w" logins only want the listing, then they go away.
    if mode == "w" {
        unicast(&mut replies, connection_id, Reply::LoginOk);
        for reply in who_listing(registry, now) {
            unicast(&mut replies, connection_id, reply);
        }
        unicast(&mut replies, connection_id, Reply::Exit);
        return replies;
    }

    let nick_len = nick.chars().count();
    if nick_len == 0 || nick_len > MAX_NICK_LEN {
        unicast(
            &mut replies,
            connection_id,
            Reply::error(format!("Nickname must be 1-{} characters.", MAX_NICK_LEN)),
        );
        unicast(&mut replies, connection_id, Reply::Exit);
        return replies;
    }

    if registry.nick_in_use(nick) {
        unicast(&mut replies, connection_id, Reply::error("Nickname already in use."));
        unicast(&mut replies, connection_id, Reply::Exit);
        return replies;
    }

    unicast(&mut replies, connection_id, Reply::LoginOk);
    for line in server_context.motd.lines(conn_context) {
        unicast(&mut replies, connection_id, Reply::output(line));
    }

    if let Some(conn_context) = registry.get_mut(&connection_id) {
        conn_context.nick = Some(nick.to_string());
        conn_context.login_id = Some(login_id.to_string());
        conn_context.login_time = now;
        conn_context.idle_since = now;
        conn_context.bricks = DEFAULT_BRICKS;

        info!("{} logged in", conn_context.address());
    }

    if let Some(group) = group {
        join_group(registry, connection_id, group, &mut replies);
    }

    replies
}
