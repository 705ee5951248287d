use anyhow::{Context, Result};
use redis::aio::ConnectionManager;
use redis::{Client, ConnectionAddr, ConnectionInfo, IntoConnectionInfo};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{timeout, Duration};
use tracing::{info, warn};

/// Shared Redis connection manager guarded by a Tokio mutex.
pub type SharedConnectionManager = Arc<Mutex<ConnectionManager>>;

/// Upper bound for the initial handshake so a dead Redis fails startup fast.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Redis connection pool backed by a single auto-reconnecting manager.
pub struct RedisPool {
    manager: SharedConnectionManager,
}

impl RedisPool {
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let info: ConnectionInfo = redis_url
            .into_connection_info()
            .context("failed to parse REDIS_URL connection string")?;

        let label = describe_addr(&info.addr);
        let client = Client::open(info).context("failed to construct Redis client")?;

        let connection_manager = timeout(CONNECT_TIMEOUT, ConnectionManager::new(client))
            .await
            .context("timed out connecting to Redis")?
            .context("failed to initialize Redis connection manager")?;

        info!(addr = %label, "Redis connection manager ready");

        Ok(Self {
            manager: Arc::new(Mutex::new(connection_manager)),
        })
    }

    pub fn manager(&self) -> SharedConnectionManager {
        self.manager.clone()
    }
}

/// Round-trip a PING through the shared manager.
pub async fn ping(manager: &SharedConnectionManager) -> bool {
    let mut conn = manager.lock().await;
    match redis::cmd("PING").query_async::<_, String>(&mut *conn).await {
        Ok(reply) => reply == "PONG",
        Err(err) => {
            warn!(error = %err, "Redis PING failed");
            false
        }
    }
}

fn describe_addr(addr: &ConnectionAddr) -> String {
    match addr {
        ConnectionAddr::Tcp(host, port) => format!("{}:{}", host, port),
        ConnectionAddr::TcpTls { host, port, .. } => format!("{}:{} (tls)", host, port),
        _ => "unix socket".to_string(),
    }
}
