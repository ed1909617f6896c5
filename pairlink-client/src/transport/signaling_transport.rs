use crate::error::TransportError;
use crate::transport::{
    LinkFrame, RelayDialer, RelayLink, SignalingEvent, SignalingOutput, TransportConfig, WsDialer,
};
use async_trait::async_trait;
use pairlink_core::SignalMessage;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

pub const USER_CLOSE_CODE: u16 = 1000;
pub const USER_CLOSE_REASON: &str = "User disconnected";

/// Как закончилось одно соединение с relay.
#[derive(Debug)]
enum LinkEnd {
    /// Relay закрыл соединение штатно: переподключаться не нужно.
    ClosedByRelay { code: u16, reason: String },
    /// Обрыв сети, ошибка сокета или таймаут чтения.
    Abnormal,
    /// Пользователь вызвал `disconnect()`.
    Cancelled,
}

/// Сигнальный канал до relay с автоматическим переподключением.
pub struct SignalingTransport {
    url: Url,
    config: TransportConfig,
    dialer: Arc<dyn RelayDialer>,
    events: mpsc::UnboundedSender<SignalingEvent>,
    wanted: watch::Sender<bool>,
    outbound: Arc<Mutex<Option<mpsc::UnboundedSender<LinkFrame>>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SignalingTransport {
    pub fn new(
        config: TransportConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<SignalingEvent>), TransportError> {
        let dialer = Arc::new(WsDialer::new(config.ping_interval));
        Self::with_dialer(config, dialer)
    }

    pub fn with_dialer(
        config: TransportConfig,
        dialer: Arc<dyn RelayDialer>,
    ) -> Result<(Self, mpsc::UnboundedReceiver<SignalingEvent>), TransportError> {
        let url = config.request_url()?;
        let (events, events_rx) = mpsc::unbounded_channel();
        let (wanted, _) = watch::channel(false);

        let transport = Self {
            url,
            config,
            dialer,
            events,
            wanted,
            outbound: Arc::new(Mutex::new(None)),
            task: Mutex::new(None),
        };

        Ok((transport, events_rx))
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub async fn is_open(&self) -> bool {
        self.outbound.lock().await.is_some()
    }

    async fn run(
        url: Url,
        config: TransportConfig,
        dialer: Arc<dyn RelayDialer>,
        events: mpsc::UnboundedSender<SignalingEvent>,
        mut wanted: watch::Receiver<bool>,
        outbound: Arc<Mutex<Option<mpsc::UnboundedSender<LinkFrame>>>>,
    ) {
        loop {
            info!("Connecting to relay: {}", url);

            let dialed = tokio::select! {
                dialed = dialer.dial(&url) => dialed,
                _ = unwanted(&mut wanted) => break,
            };

            let end = match dialed {
                Ok(RelayLink {
                    outbound: link_tx,
                    inbound,
                }) => {
                    {
                        let mut slot = outbound.lock().await;
                        // disconnect() flips the flag under the same lock
                        if !*wanted.borrow() {
                            debug!("Dial to {} completed after disconnect, discarding", url);
                            break;
                        }
                        *slot = Some(link_tx);
                    }

                    info!("Relay connection open: {}", url);
                    let _ = events.send(SignalingEvent::Connected);

                    let end = Self::pump(inbound, &config, &events, &mut wanted).await;
                    outbound.lock().await.take();
                    end
                }
                Err(e) => {
                    warn!("Relay connection failed: {}", e);
                    LinkEnd::Abnormal
                }
            };

            match end {
                LinkEnd::Cancelled => break,
                LinkEnd::ClosedByRelay { code, reason } => {
                    info!("Relay closed connection: {} {}", code, reason);
                    let _ = events.send(SignalingEvent::Disconnected);
                    break;
                }
                LinkEnd::Abnormal => {
                    let _ = events.send(SignalingEvent::Disconnected);
                }
            }

            info!("Reconnecting in {:?}", config.reconnect_delay);
            tokio::select! {
                _ = tokio::time::sleep(config.reconnect_delay) => {}
                _ = unwanted(&mut wanted) => break,
            }
        }

        debug!("Relay supervisor for {} stopped", url);
    }

    async fn pump(
        mut inbound: mpsc::UnboundedReceiver<LinkFrame>,
        config: &TransportConfig,
        events: &mpsc::UnboundedSender<SignalingEvent>,
        wanted: &mut watch::Receiver<bool>,
    ) -> LinkEnd {
        loop {
            let frame = tokio::select! {
                frame = tokio::time::timeout(config.read_timeout, inbound.recv()) => frame,
                _ = unwanted(wanted) => return LinkEnd::Cancelled,
            };

            match frame {
                Err(_) => {
                    warn!(
                        "No frame from relay within {:?}, connection presumed dead",
                        config.read_timeout
                    );
                    return LinkEnd::Abnormal;
                }
                Ok(None) => return LinkEnd::Abnormal,
                Ok(Some(LinkFrame::Alive)) => {}
                Ok(Some(LinkFrame::Close { code, reason })) => {
                    return LinkEnd::ClosedByRelay { code, reason };
                }
                Ok(Some(LinkFrame::Text(text))) => match SignalMessage::decode(&text) {
                    Ok(msg) => {
                        debug!("Received {} from relay", msg.kind());
                        let _ = events.send(SignalingEvent::Message(msg));
                    }
                    Err(e) => warn!("Dropping malformed signaling message: {}. Text: {}", e, text),
                },
            }
        }
    }
}

async fn unwanted(wanted: &mut watch::Receiver<bool>) {
    let _ = wanted.wait_for(|wanted| !*wanted).await;
}

#[async_trait]
impl SignalingOutput for SignalingTransport {
    async fn connect(&self) {
        let mut task = self.task.lock().await;
        let already_wanted = self.wanted.send_replace(true);

        if already_wanted && task.as_ref().is_some_and(|t| !t.is_finished()) {
            debug!("Relay connection already requested");
            return;
        }

        if let Some(old) = task.take() {
            old.abort();
        }

        *task = Some(tokio::spawn(Self::run(
            self.url.clone(),
            self.config.clone(),
            self.dialer.clone(),
            self.events.clone(),
            self.wanted.subscribe(),
            self.outbound.clone(),
        )));
    }

    async fn disconnect(&self) {
        let mut slot = self.outbound.lock().await;
        self.wanted.send_replace(false);

        if let Some(tx) = slot.take() {
            info!("Closing relay connection");
            let _ = tx.send(LinkFrame::Close {
                code: USER_CLOSE_CODE,
                reason: USER_CLOSE_REASON.to_owned(),
            });
        }
    }

    async fn send_signal(&self, msg: SignalMessage) {
        let slot = self.outbound.lock().await;
        let Some(tx) = slot.as_ref() else {
            debug!("Relay not connected, dropping {}", msg.kind());
            return;
        };

        match msg.encode() {
            Ok(text) => {
                debug!("Sending {} to relay", msg.kind());
                let _ = tx.send(LinkFrame::Text(text));
            }
            Err(e) => warn!("Failed to encode {}: {}", msg.kind(), e),
        }
    }
}
