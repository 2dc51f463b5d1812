use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::mpsc::{error::TrySendError, Receiver};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    channels::ReceiverWrapper,
    context::{ConnectionContext, ServerContext, PROTOCOL_LEVEL},
    delivery::{unicast, Replies},
    handlers::{
        beep::handle_beep, brick::handle_brick, disconnect::handle_disconnect,
        group::handle_group, login::handle_login, motd::handle_motd, name::handle_name,
        open::handle_open, pass::handle_pass, personal::handle_personal, topic::handle_topic,
        who::handle_who,
    },
    message_parsing::{Command, Message, ReplySender},
    registry::Registry,
    replies::Reply,
};

use crate::result::Result;

/// The registry task. Owns every connection and group and processes one
/// message at a time, so each command is applied and delivered atomically.
pub async fn run<T>(
    server_context: &ServerContext,
    receiver_channel: &mut T,
    mut shutdown_receiver: Receiver<()>,
) -> Result<()>
where
    T: ReceiverWrapper<Message>,
{
    let mut registry = Registry::new();
    let mut sender_channels: HashMap<Uuid, ReplySender> = HashMap::new();

    loop {
        let received = tokio::select! {
            received = receiver_channel.receive() => match received {
                Some(r) => r,
                None => {
                    return Ok(());
                }
            },
            _ = shutdown_receiver.recv() => {
                return Ok(());
            }
        };

        let connection_id = received.connection_id;
        let mut closing = vec![];

        let replies = match received.command {
            // Always the first message for a connection, so it is the only one
            // handled without a connection context.
            Command::Connected { sender, client_ip } => {
                registry.insert(ConnectionContext::new(connection_id, client_ip));
                sender_channels.insert(connection_id, sender);
                info!("Connection {} accepted from {:?}", connection_id, client_ip);

                let mut replies = Replies::new();
                unicast(
                    &mut replies,
                    connection_id,
                    Reply::ProtocolBanner {
                        protocol_level: PROTOCOL_LEVEL.to_string(),
                        server_host: server_context.server_host.clone(),
                        server_id: server_context.server_id.clone(),
                    },
                );
                replies
            }
            Command::Disconnected => {
                closing.push(connection_id);
                Replies::new()
            }
            command => dispatch(
                server_context,
                &mut registry,
                connection_id,
                command,
                Utc::now().timestamp(),
            ),
        };

        deliver(&mut registry, &mut sender_channels, replies, closing);
    }
}

pub fn dispatch(
    server_context: &ServerContext,
    registry: &mut Registry,
    connection_id: Uuid,
    command: Command,
    now: i64,
) -> Replies {
    let conn_context = match registry.get(&connection_id) {
        Some(c) => c,
        None => {
            debug!(
                "Unexpected message sequence, received a command for {} which is not connected",
                connection_id
            );
            return Replies::new();
        }
    };

    if let Command::Login {
        login_id,
        nick,
        group,
        mode,
        password,
        group_status,
        protocol_level,
    } = &command
    {
        debug!(
            "Login from {} as {} (mode {}, password given: {}, group status {:?}, protocol level {:?})",
            login_id,
            nick,
            mode,
            password.is_some(),
            group_status,
            protocol_level
        );

        return handle_login(
            server_context,
            registry,
            connection_id,
            login_id,
            nick,
            group.as_deref(),
            mode,
            now,
        );
    }

    if !conn_context.is_active() {
        debug!("Ignoring command from {} before login", connection_id);
        return Replies::new();
    }

    match &command {
        Command::Open { text } => handle_open(registry, connection_id, text, now),
        Command::Beep { target } => handle_beep(registry, connection_id, target),
        Command::Brick { target } => handle_brick(registry, connection_id, target),
        Command::Group { group } => handle_group(registry, connection_id, group),
        Command::Personal { target, text } => handle_personal(registry, connection_id, target, text),
        Command::Motd => handle_motd(server_context, registry, connection_id),
        Command::Name { nick } => handle_name(registry, connection_id, nick),
        Command::Pass { target } => handle_pass(registry, connection_id, target),
        Command::Topic { topic } => handle_topic(registry, connection_id, topic),
        Command::Who => handle_who(registry, connection_id, now),
        Command::Noop => Replies::new(),
        Command::Unhandled { code, name } => {
            debug!(
                "Unsupported client command {} {:?} from {}",
                code,
                name,
                conn_context.nick()
            );
            Replies::new()
        }
        Command::Login { .. } | Command::Connected { .. } | Command::Disconnected => {
            Replies::new()
        }
    }
}

/// Queues replies and closes every connection that was sent an exit packet or
/// whose outbound queue overflowed. Closing runs the full disconnect handling,
/// whose own notices are delivered the same way.
pub fn deliver(
    registry: &mut Registry,
    sender_channels: &mut HashMap<Uuid, ReplySender>,
    replies: Replies,
    mut closing: Vec<Uuid>,
) {
    let mut pending = replies;

    loop {
        closing.extend(send_replies(pending, sender_channels));

        let connection_id = match closing.pop() {
            Some(c) => c,
            None => return,
        };

        // Dropping the sender lets the writer drain what is queued and hang up.
        sender_channels.remove(&connection_id);

        if !registry.contains(&connection_id) {
            debug!("Connection {} already removed", connection_id);
            pending = Replies::new();
            continue;
        }

        pending = handle_disconnect(registry, connection_id);
    }
}

fn send_replies(
    replies_per_user: Replies,
    sender_channels: &HashMap<Uuid, ReplySender>,
) -> Vec<Uuid> {
    let mut closing = vec![];

    for (connection_id, replies) in replies_per_user {
        let sender = match sender_channels.get(&connection_id) {
            Some(sender) => sender,
            None => continue,
        };

        for reply in replies {
            let exit = reply == Reply::Exit;

            match sender.queue.try_send(reply) {
                Ok(()) => {
                    if exit {
                        closing.push(connection_id);
                    }
                }
                Err(TrySendError::Full(_)) => {
                    warn!(
                        "Outbound queue for {} is full, disconnecting",
                        connection_id
                    );
                    sender.abort.cancel();
                    closing.push(connection_id);
                    break;
                }
                Err(TrySendError::Closed(_)) => {
                    debug!("Writer for {} has already gone away", connection_id);
                    break;
                }
            }
        }
    }

    closing
}
