mod channels;
mod client_listener;
mod client_sender;
mod codec;
mod context;
mod delivery;
mod error;
mod handlers;
mod message_handler;
mod message_parsing;
mod motd;
mod registry;
mod replies;
mod result;
mod settings;

use std::sync::Arc;

use chrono::Utc;
use tokio::{
    net::TcpListener,
    sync::{mpsc, oneshot},
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::{
    client_listener::run_listener,
    client_sender::run_sender,
    context::ServerContext,
    message_parsing::ReplySender,
    motd::{FileMotd, MotdProvider, StaticMotd},
    settings::Settings,
};

use crate::result::Result;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::new()?;

    let motd: Arc<dyn MotdProvider> = match &settings.motd_path {
        Some(path) => Arc::new(FileMotd::new(path.as_str())),
        None => Arc::new(StaticMotd(vec![])),
    };

    let server_context = ServerContext {
        start_time: Utc::now(),
        server_host: settings.server_host(),
        server_id: settings.server_id.clone(),
        motd,
    };

    let listener = TcpListener::bind((settings.host.as_str(), settings.port)).await?;
    info!(
        "{} listening on {}:{}",
        server_context.server_id, settings.host, settings.port
    );

    let (server_sender, mut server_receiver) = mpsc::channel(settings.inbound_queue_len);
    let (shutdown_sender, shutdown_receiver) = mpsc::channel(1);

    let registry_context = server_context.clone();
    let registry_handle = tokio::spawn(async move {
        message_handler::run(&registry_context, &mut server_receiver, shutdown_receiver).await
    });

    loop {
        let (stream, client_ip) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(a) => a,
                Err(e) => {
                    warn!("Error accepting connection: {}", e);
                    continue;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!(
                    "Shutting down after {}s",
                    (Utc::now() - server_context.start_time).num_seconds()
                );
                break;
            }
        };

        let connection_id = Uuid::new_v4();
        let (reader, writer) = stream.into_split();
        let (reply_sender, reply_receiver) = mpsc::channel(settings.outbound_queue_len);
        let (closed_sender, closed_receiver) = oneshot::channel();
        let abort = CancellationToken::new();

        tokio::spawn(run_sender(
            connection_id,
            writer,
            reply_receiver,
            abort.clone(),
            closed_sender,
        ));
        tokio::spawn(run_listener(
            connection_id,
            reader,
            server_sender.clone(),
            ReplySender::new(reply_sender, abort),
            Some(client_ip),
            closed_receiver,
        ));
    }

    if shutdown_sender.send(()).await.is_err() {
        warn!("Registry task had already stopped");
    }

    match registry_handle.await {
        Ok(result) => result,
        Err(e) => {
            error!("Registry task failed: {}", e);
            Ok(())
        }
    }
}
