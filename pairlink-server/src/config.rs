use clap::{Parser, ValueEnum};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Что делать со старым соединением, когда тот же (room, role) подключается заново.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SupersedePolicy {
    /// Старый сокет остается открытым, сервер просто перестает ему писать.
    #[default]
    Keep,
    /// Сервер закрывает старый сокет с кодом 1008 и игнорирует его сообщения.
    Close,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "pairlink-relay", about = "Two-party WebRTC signaling relay")]
pub struct RelayConfig {
    #[arg(long, env = "PAIRLINK_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    #[arg(short, long, env = "PAIRLINK_PORT", default_value_t = 8080)]
    pub port: u16,

    #[arg(long, env = "PAIRLINK_SUPERSEDE", value_enum, default_value_t = SupersedePolicy::Keep)]
    pub supersede: SupersedePolicy,
}

impl RelayConfig {
    /// Loopback on an ephemeral port.
    pub fn local() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            supersede: SupersedePolicy::default(),
        }
    }

    pub fn with_supersede(mut self, supersede: SupersedePolicy) -> Self {
        self.supersede = supersede;
        self
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            supersede: SupersedePolicy::default(),
        }
    }
}
