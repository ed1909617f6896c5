use crate::config::RelayConfig;
use crate::room::RoomManager;
use crate::signaling::ws_handler;
use anyhow::{Context, Result};
use axum::Router;
use axum::routing::get;
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::info;

/// Relay целиком: слушающий сокет и принадлежащая ему карта комнат.
/// Никакого глобального состояния, поэтому в тестах можно поднять сколько угодно серверов.
pub struct RelayServer {
    listener: TcpListener,
    rooms: RoomManager,
}

impl RelayServer {
    pub async fn bind(config: &RelayConfig) -> Result<Self> {
        let listener = TcpListener::bind(config.addr())
            .await
            .with_context(|| format!("Failed to bind relay to {}", config.addr()))?;

        Ok(Self {
            listener,
            rooms: RoomManager::new(config.supersede),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn rooms(&self) -> RoomManager {
        self.rooms.clone()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.room_count()
    }

    pub fn router(rooms: RoomManager) -> Router {
        Router::new()
            .route("/", get(ws_handler))
            .route("/ws", get(ws_handler))
            .with_state(rooms)
    }

    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.local_addr()?;
        info!("Signaling server running on ws://{}", addr);

        axum::serve(self.listener, Self::router(self.rooms))
            .with_graceful_shutdown(shutdown)
            .await
            .context("Relay server failed")?;

        info!("Signaling server on {} stopped", addr);
        Ok(())
    }

    pub fn spawn(self) -> Result<RelayHandle> {
        let addr = self.local_addr()?;
        let rooms = self.rooms();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(self.run_until(async move {
            let _ = shutdown_rx.await;
        }));

        Ok(RelayHandle {
            addr,
            rooms,
            shutdown_tx: Some(shutdown_tx),
            task,
        })
    }
}

pub struct RelayHandle {
    pub addr: SocketAddr,
    pub rooms: RoomManager,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<Result<()>>,
}

impl RelayHandle {
    pub fn url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        self.task.await.context("Relay task panicked")?
    }
}
