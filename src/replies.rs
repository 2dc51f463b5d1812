use crate::codec::Packet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    ProtocolBanner {
        protocol_level: String,
        server_host: String,
        server_id: String,
    },
    LoginOk,
    Open {
        nick: String,
        text: String,
    },
    Personal {
        nick: String,
        text: String,
    },
    Status {
        category: String,
        text: String,
    },
    Error {
        text: String,
    },
    Exit,
    CommandOutput {
        text: String,
    },
    WhoListing {
        moderator: bool,
        nick: String,
        idle_secs: i64,
        login_time: i64,
        login_id: String,
        host: String,
    },
    Beep {
        nick: String,
    },
}

impl Reply {
    pub fn status(category: &str, text: impl Into<String>) -> Reply {
        Reply::Status {
            category: category.to_string(),
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Reply {
        Reply::Error { text: text.into() }
    }

    pub fn output(text: impl Into<String>) -> Reply {
        Reply::CommandOutput { text: text.into() }
    }

    pub fn to_packet(&self) -> Packet {
        match self {
            Reply::ProtocolBanner {
                protocol_level,
                server_host,
                server_id,
            } => Packet::new('j', [protocol_level, server_host, server_id]),
            Reply::LoginOk => Packet::new('a', Vec::<String>::new()),
            Reply::Open { nick, text } => Packet::new('b', [nick, text]),
            Reply::Personal { nick, text } => Packet::new('c', [nick, text]),
            Reply::Status { category, text } => Packet::new('d', [category, text]),
            Reply::Error { text } => Packet::new('e', [text]),
            Reply::Exit => Packet::new('g', Vec::<String>::new()),
            Reply::CommandOutput { text } => Packet::new('i', ["co", text.as_str()]),
            Reply::WhoListing {
                moderator,
                nick,
                idle_secs,
                login_time,
                login_id,
                host,
            } => Packet::new(
                'i',
                [
                    "wl".to_string(),
                    if *moderator { "m" } else { " " }.to_string(),
                    nick.clone(),
                    idle_secs.to_string(),
                    "0".to_string(),
                    login_time.to_string(),
                    login_id.clone(),
                    host.clone(),
                    "(nr)".to_string(),
                ],
            ),
            Reply::Beep { nick } => Packet::new('k', [nick]),
        }
    }
}

#[test]
fn protocolbanner_encodes_correctly() {
    let reply = Reply::ProtocolBanner {
        protocol_level: "1".to_string(),
        server_host: "localhost".to_string(),
        server_id: "icbd 0.1.0".to_string(),
    };
    assert_eq!(Packet::new('j', ["1", "localhost", "icbd 0.1.0"]), reply.to_packet());
}

#[test]
fn loginok_encodes_correctly() {
    let packet = Reply::LoginOk.to_packet();
    assert_eq!('a', packet.code);
    assert!(packet.fields.is_empty());
}

#[test]
fn open_encodes_correctly() {
    let reply = Reply::Open {
        nick: "JIM".to_string(),
        text: "hello world".to_string(),
    };
    assert_eq!(Packet::new('b', ["JIM", "hello world"]), reply.to_packet());
}

#[test]
fn status_encodes_correctly() {
    let reply = Reply::status("Status", "You are now in group lobby");
    assert_eq!(
        Packet::new('d', ["Status", "You are now in group lobby"]),
        reply.to_packet()
    );
}

#[test]
fn error_encodes_correctly() {
    let reply = Reply::error("Nickname already in use.");
    assert_eq!(Packet::new('e', ["Nickname already in use."]), reply.to_packet());
}

#[test]
fn commandoutput_encodes_correctly() {
    let reply = Reply::output("Total: 1 user in 1 group");
    assert_eq!(
        Packet::new('i', ["co", "Total: 1 user in 1 group"]),
        reply.to_packet()
    );
}

#[test]
fn wholisting_encodes_correctly() {
    let reply = Reply::WhoListing {
        moderator: true,
        nick: "JIM".to_string(),
        idle_secs: 42,
        login_time: 1600000000,
        login_id: "jim".to_string(),
        host: "127.0.0.1".to_string(),
    };
    assert_eq!(
        Packet::new(
            'i',
            ["wl", "m", "JIM", "42", "0", "1600000000", "jim", "127.0.0.1", "(nr)"]
        ),
        reply.to_packet()
    );
}

#[test]
fn beep_encodes_correctly() {
    let reply = Reply::Beep {
        nick: "JIM".to_string(),
    };
    assert_eq!(Packet::new('k', ["JIM"]), reply.to_packet());
}
