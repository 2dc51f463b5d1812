use std::net::SocketAddr;

use futures_util::StreamExt;
use tokio::{
    io::AsyncRead,
    sync::{mpsc::Sender, oneshot},
};
use tokio_util::codec::FramedRead;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::{
    codec::IcbCodec,
    message_parsing::{Command, Message, ReplySender},
};

/// Reads packets off the socket and forwards them to the registry task until
/// the peer hangs up, the stream fails, or the writer reports the connection
/// closed. The registry always sees `Connected` first and `Disconnected` last.
pub async fn run_listener<R>(
    connection_id: Uuid,
    reader: R,
    server_sender: Sender<Message>,
    client_sender: ReplySender,
    client_ip: Option<SocketAddr>,
    mut closed: oneshot::Receiver<()>,
) where
    R: AsyncRead + Unpin,
{
    let mut framed = FramedRead::new(reader, IcbCodec);

    let connected = Message {
        connection_id,
        command: Command::Connected {
            sender: client_sender,
            client_ip,
        },
    };
    if server_sender.send(connected).await.is_err() {
        debug!("Registry has shut down, dropping connection {}", connection_id);
        return;
    }

    loop {
        tokio::select! {
            packet = framed.next() => match packet {
                Some(Ok(packet)) => {
                    trace!("Received {} from {}", packet, connection_id);
                    let message = Message {
                        connection_id,
                        command: Command::from(packet),
                    };
                    if server_sender.send(message).await.is_err() {
                        debug!("Registry has shut down, stopping listener for {}", connection_id);
                        return;
                    }
                }
                Some(Err(e)) => {
                    warn!("Error reading from {}: {}", connection_id, e);
                    break;
                }
                None => {
                    debug!("Connection {} closed by peer", connection_id);
                    break;
                }
            },
            _ = &mut closed => {
                debug!("Connection {} closed by server", connection_id);
                break;
            }
        }
    }

    let disconnected = Message {
        connection_id,
        command: Command::Disconnected,
    };
    if let Err(e) = server_sender.send(disconnected).await {
        debug!("Could not report disconnect of {}: {}", connection_id, e);
    }
}
