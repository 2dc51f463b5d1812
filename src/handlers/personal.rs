use uuid::Uuid;

use crate::{
    delivery::{unicast, Replies},
    handlers::not_signed_on,
    registry::Registry,
    replies::Reply,
};

pub fn handle_personal(
    registry: &Registry,
    connection_id: Uuid,
    target: &Option<String>,
    text: &Option<String>,
) -> Replies {
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
                Reply::error("You must specify a nickname to message."),
            );
            return replies;
        }
    };

    let other_user = match registry.find_by_nick(target) {
        Some(o) => o,
        None => {
            unicast(&mut replies, connection_id, Reply::error(not_signed_on(target)));
            return replies;
        }
    };

    match text {
        Some(text) => unicast(
            &mut replies,
            other_user.connection_id,
            Reply::Personal {
                nick: conn_context.nick().to_string(),
                text: text.to_string(),
            },
        ),
        None => unicast(&mut replies, connection_id, Reply::error("Empty message.")),
    }

    replies
}
