use futures_util::SinkExt;
use tokio::{
    io::AsyncWrite,
    sync::{mpsc::Receiver, oneshot},
};
use tokio_util::{codec::FramedWrite, sync::CancellationToken};
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::{codec::IcbCodec, replies::Reply};

use crate::result::Result;

/// Writes queued replies to the socket in order. Once the registry drops its
/// end of the queue everything still queued is flushed, the socket is shut
/// down and the listener is told to stop. Cancelling `abort` skips the flush,
/// so a peer that stopped reading cannot hold the connection open.
pub async fn run_sender<W>(
    connection_id: Uuid,
    writer: W,
    mut receiver: Receiver<Reply>,
    abort: CancellationToken,
    closed: oneshot::Sender<()>,
) where
    W: AsyncWrite + Unpin,
{
    let mut framed = FramedWrite::new(writer, IcbCodec);

    let aborted = tokio::select! {
        result = write_replies(connection_id, &mut framed, &mut receiver) => {
            if let Err(e) = result {
                warn!("Error writing to {}: {}", connection_id, e);
            }
            false
        }
        _ = abort.cancelled() => true,
    };

    if !aborted {
        tokio::select! {
            result = framed.close() => {
                if let Err(e) = result {
                    debug!("Error closing {}: {}", connection_id, e);
                }
            }
            _ = abort.cancelled() => {}
        }
    }

    if abort.is_cancelled() {
        warn!("Dropping unsent replies to {}", connection_id);
    }

    // Dropping the write half shuts the socket down for writing.
    drop(framed);

    if closed.send(()).is_err() {
        debug!("Listener for {} already stopped", connection_id);
    }
}

async fn write_replies<W>(
    connection_id: Uuid,
    framed: &mut FramedWrite<W, IcbCodec>,
    receiver: &mut Receiver<Reply>,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(reply) = receiver.recv().await {
        let packet = reply.to_packet();
        trace!("Sending {} to {}", packet, connection_id);
        framed.send(packet).await?;
    }

    Ok(())
}
