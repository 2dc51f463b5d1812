use std::net::SocketAddr;

use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{codec::Packet, replies::Reply};

#[derive(Debug)]
pub struct Message {
    pub connection_id: Uuid,
    pub command: Command,
}

/// The registry's handle on a connection's writer. Dropping `queue` lets the
/// writer flush and hang up; cancelling `abort` makes it hang up at once.
#[derive(Debug, Clone)]
pub struct ReplySender {
    pub queue: Sender<Reply>,
    pub abort: CancellationToken,
}

impl ReplySender {
    pub fn new(queue: Sender<Reply>, abort: CancellationToken) -> Self {
        ReplySender { queue, abort }
    }
}

#[derive(Debug, Clone)]
pub enum Command {
    Connected {
        sender: ReplySender,
        client_ip: Option<SocketAddr>,
    },
    Disconnected,
    Login {
        login_id: String,
        nick: String,
        group: Option<String>,
        mode: String,
        password: Option<String>,
        group_status: Option<String>,
        protocol_level: Option<String>,
    },
    Open {
        text: String,
    },
    Beep {
        target: Option<String>,
    },
    Brick {
        target: Option<String>,
    },
    Group {
        group: Option<String>,
    },
    Personal {
        target: Option<String>,
        text: Option<String>,
    },
    Motd,
    Name {
        nick: Option<String>,
    },
    Pass {
        target: Option<String>,
    },
    Topic {
        topic: Option<String>,
    },
    Who,
    Noop,
    Unhandled {
        code: char,
        name: Option<String>,
    },
}

fn field(fields: &[String], index: usize) -> Option<String> {
    fields
        .get(index)
        .filter(|f| !f.is_empty())
        .map(|f| f.to_string())
}

fn word(fields: &[String], index: usize) -> Option<String> {
    field(fields, index)
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
}

impl From<Packet> for Command {
    fn from(packet: Packet) -> Self {
        let fields = &packet.fields;

        match packet.code {
            // aLoginid^ANickname^ADefaultGroup^ACommand^APassword[^AGroupStatus][^AProtocolLevel]
            'a' => Command::Login {
                login_id: field(fields, 0).unwrap_or_default(),
                nick: field(fields, 1).unwrap_or_default(),
                group: word(fields, 2),
                mode: field(fields, 3).unwrap_or_else(|| "login".to_string()),
                password: field(fields, 4),
                group_status: field(fields, 5),
                protocol_level: field(fields, 6),
            },
            'b' => Command::Open {
                text: fields.join("\x01"),
            },
            // hCommand[^AArguments][^AMessageID]
            'h' => match field(fields, 0).as_deref() {
                Some("beep") => Command::Beep {
                    target: word(fields, 1),
                },
                Some("brick") => Command::Brick {
                    target: word(fields, 1),
                },
                Some("g") => Command::Group {
                    group: word(fields, 1),
                },
                Some("m") => {
                    let (target, text) = match field(fields, 1) {
                        Some(args) => {
                            let args = args.trim_start();
                            match args.split_once(char::is_whitespace) {
                                Some((target, text)) => (
                                    Some(target.to_string()),
                                    Some(text.trim_start().to_string()).filter(|t| !t.is_empty()),
                                ),
                                None => (Some(args.to_string()).filter(|t| !t.is_empty()), None),
                            }
                        }
                        None => (None, None),
                    };
                    Command::Personal { target, text }
                }
                Some("motd") => Command::Motd,
                Some("name") => Command::Name {
                    nick: word(fields, 1),
                },
                Some("pass") => Command::Pass {
                    target: word(fields, 1),
                },
                Some("topic") => Command::Topic {
                    topic: field(fields, 1),
                },
                Some("w") => Command::Who,
                name => Command::Unhandled {
                    code: 'h',
                    name: name.map(str::to_string),
                },
            },
            'n' => Command::Noop,
            code => Command::Unhandled { code, name: None },
        }
    }
}
