//! Server lifecycle manager
//!
//! [`GrpcServer`] binds the listening socket, registers the embedding services
//! together with the standard health service and drives graceful shutdown.
//! Shutdown can be requested programmatically through [`GrpcServer::stop`] or
//! by a termination signal; the signal path only cancels a token and a
//! background task reacts to it by running the same shutdown sequence.

use std::fmt;
use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tonic::codec::CompressionEncoding;
use tonic::transport::Server;
use tonic_health::server::HealthReporter;
use tonic_health::ServingStatus;
use tracing::{debug, error, info, warn};

use super::proto::embeddings_server::EmbeddingsServer;
use super::proto::sentence_transformers_server::SentenceTransformersServer;
use super::service::EmbeddingsGrpcService;

/// Default bind address (all interfaces)
pub const DEFAULT_HOST: &str = "[::]";

/// Default bind port
pub const DEFAULT_PORT: u16 = 50051;

/// Default worker pool size
pub const DEFAULT_WORKER_THREADS: usize = 10;

/// Default shutdown grace period
pub const DEFAULT_SHUTDOWN_PERIOD: Duration = Duration::from_secs(5);

/// Time allowed for aborted calls to flush their status before the
/// transport task is cancelled
const ABORT_DRAIN_PERIOD: Duration = Duration::from_secs(1);

/// Result type for lifecycle operations
pub type ServerResult<T> = Result<T, ServerError>;

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configured host does not resolve to a socket address
    #[error("Invalid bind address: {0}")]
    InvalidAddress(String),

    /// The socket could not be bound
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The operation is not allowed in the current state
    #[error("Server cannot start from state {0}")]
    InvalidState(ServerState),
}

/// Lifecycle state of a [`GrpcServer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Constructed, nothing bound yet
    Created,
    /// Accepting calls
    Serving,
    /// No longer accepting calls, draining in-flight work
    ShuttingDown,
    /// Listener closed and all work finished or dropped
    Stopped,
}

impl fmt::Display for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServerState::Created => "created",
            ServerState::Serving => "serving",
            ServerState::ShuttingDown => "shutting_down",
            ServerState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Lifecycle manager configuration
#[derive(Debug, Clone)]
pub struct GrpcServerConfig {
    /// Bind host, IP literal (brackets allowed) or resolvable name
    pub host: String,

    /// Bind port, 0 picks an ephemeral port
    pub port: u16,

    /// Maximum concurrent calls per connection
    pub worker_threads: usize,

    /// Grace period for in-flight calls on shutdown
    pub shutdown_period: Duration,

    /// Accept and send gzip-compressed messages
    pub enable_compression: bool,

    /// Listen for SIGINT and SIGTERM
    pub handle_signals: bool,
}

impl Default for GrpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            worker_threads: DEFAULT_WORKER_THREADS,
            shutdown_period: DEFAULT_SHUTDOWN_PERIOD,
            enable_compression: true,
            handle_signals: true,
        }
    }
}

impl GrpcServerConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bind host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the bind port
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the worker pool size
    pub fn worker_threads(mut self, worker_threads: usize) -> Self {
        self.worker_threads = worker_threads.max(1);
        self
    }

    /// Set the shutdown grace period
    pub fn shutdown_period(mut self, period: Duration) -> Self {
        self.shutdown_period = period;
        self
    }

    /// Enable or disable gzip compression
    pub fn enable_compression(mut self, enable: bool) -> Self {
        self.enable_compression = enable;
        self
    }

    /// Enable or disable termination signal handling
    pub fn handle_signals(mut self, enable: bool) -> Self {
        self.handle_signals = enable;
        self
    }

    /// Resolve host and port into a socket address
    pub async fn resolve(&self) -> ServerResult<SocketAddr> {
        let literal = self.host.trim_start_matches('[').trim_end_matches(']');
        if let Ok(ip) = literal.parse::<IpAddr>() {
            return Ok(SocketAddr::new(ip, self.port));
        }

        tokio::net::lookup_host((self.host.as_str(), self.port))
            .await
            .map_err(|e| ServerError::InvalidAddress(format!("{}: {}", self.host, e)))?
            .next()
            .ok_or_else(|| ServerError::InvalidAddress(self.host.clone()))
    }
}

/// Mutable part of the lifecycle, guarded so start and stop never interleave
#[derive(Default)]
struct Lifecycle {
    local_addr: Option<SocketAddr>,
    health: Option<HealthReporter>,
    drain: CancellationToken,
    task: Option<JoinHandle<Result<(), tonic::transport::Error>>>,
}

/// State shared between the server handle and its background tasks
struct Inner {
    config: GrpcServerConfig,
    service: EmbeddingsGrpcService,
    state: watch::Sender<ServerState>,
    termination: CancellationToken,
    lifecycle: Mutex<Lifecycle>,
}

/// gRPC server with health reporting and graceful shutdown
pub struct GrpcServer {
    inner: Arc<Inner>,
}

impl GrpcServer {
    /// Create a server that is not yet bound
    pub fn new(config: GrpcServerConfig, service: EmbeddingsGrpcService) -> Self {
        let (state, _) = watch::channel(ServerState::Created);
        Self {
            inner: Arc::new(Inner {
                config,
                service,
                state,
                termination: CancellationToken::new(),
                lifecycle: Mutex::new(Lifecycle::default()),
            }),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> ServerState {
        self.inner.state()
    }

    /// Subscribe to lifecycle state changes
    pub fn subscribe(&self) -> watch::Receiver<ServerState> {
        self.inner.state.subscribe()
    }

    /// Address the listener is bound to, once started
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        self.inner.lifecycle.lock().await.local_addr
    }

    /// Token cancelled when termination is requested
    ///
    /// Cancelling it on a serving instance shuts the server down.
    pub fn termination_token(&self) -> CancellationToken {
        self.inner.termination.clone()
    }

    /// Bind, report SERVING and start accepting calls
    ///
    /// With `wait_for_termination` the call returns only after a termination
    /// signal (or [`GrpcServer::stop`]) has been handled. Without it the call
    /// returns once bound; termination is still handled in the background.
    pub async fn start(&self, wait_for_termination: bool) -> ServerResult<SocketAddr> {
        let local_addr = self.bind_and_serve().await?;

        if wait_for_termination {
            self.wait_for_termination().await;
        }

        Ok(local_addr)
    }

    async fn bind_and_serve(&self) -> ServerResult<SocketAddr> {
        let inner = &self.inner;
        let mut lifecycle = inner.lifecycle.lock().await;

        let state = inner.state();
        if state != ServerState::Created {
            return Err(ServerError::InvalidState(state));
        }

        let addr = inner.config.resolve().await?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ServerError::Bind { addr, source })?;

        let (mut health, health_service) = tonic_health::server::health_reporter();
        health.set_service_status("", ServingStatus::Serving).await;
        for name in EmbeddingsGrpcService::service_names() {
            health.set_service_status(name, ServingStatus::Serving).await;
        }

        let mut sentence_transformers = SentenceTransformersServer::new(inner.service.clone());
        let mut embeddings = EmbeddingsServer::new(inner.service.clone());
        if inner.config.enable_compression {
            sentence_transformers = sentence_transformers
                .accept_compressed(CompressionEncoding::Gzip)
                .send_compressed(CompressionEncoding::Gzip);
            embeddings = embeddings
                .accept_compressed(CompressionEncoding::Gzip)
                .send_compressed(CompressionEncoding::Gzip);
        }

        let router = Server::builder()
            .concurrency_limit_per_connection(inner.config.worker_threads)
            .add_service(health_service)
            .add_service(sentence_transformers)
            .add_service(embeddings);

        let drain = CancellationToken::new();
        let drained = drain.clone();
        let termination = inner.termination.clone();
        let task = tokio::spawn(async move {
            let result = router
                .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async move {
                    drained.cancelled().await
                })
                .await;
            if let Err(e) = &result {
                error!(error = %e, "gRPC transport failed");
                termination.cancel();
            }
            result
        });

        if inner.config.handle_signals {
            let signal = shutdown_signal();
            let termination = inner.termination.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = signal => termination.cancel(),
                    _ = termination.cancelled() => {}
                }
            });
        }

        {
            let inner = Arc::clone(inner);
            tokio::spawn(async move {
                inner.termination.cancelled().await;
                inner.stop().await;
            });
        }

        lifecycle.local_addr = Some(local_addr);
        lifecycle.health = Some(health);
        lifecycle.drain = drain;
        lifecycle.task = Some(task);
        inner.state.send_replace(ServerState::Serving);

        info!("serving on {} port {}", inner.config.host, local_addr.port());
        Ok(local_addr)
    }

    /// Wait until termination is requested and shutdown has finished
    pub async fn wait_for_termination(&self) {
        self.inner.termination.cancelled().await;
        self.inner.stop().await;
    }

    /// Stop accepting calls and drain in-flight work within the grace period
    ///
    /// Safe to call repeatedly and from several tasks.
    pub async fn stop(&self) {
        self.inner.stop().await;
    }
}

impl Inner {
    fn state(&self) -> ServerState {
        *self.state.borrow()
    }

    async fn stop(&self) {
        let mut lifecycle = self.lifecycle.lock().await;

        match self.state() {
            ServerState::Stopped => return,
            ServerState::Created => {
                self.termination.cancel();
                self.state.send_replace(ServerState::Stopped);
                return;
            }
            ServerState::Serving | ServerState::ShuttingDown => {}
        }

        debug!("server stopping...");
        self.state.send_replace(ServerState::ShuttingDown);

        if let Some(health) = lifecycle.health.as_mut() {
            health.set_service_status("", ServingStatus::NotServing).await;
            for name in EmbeddingsGrpcService::service_names() {
                health.set_service_status(name, ServingStatus::NotServing).await;
            }
        }

        self.termination.cancel();
        lifecycle.drain.cancel();

        if let Some(mut task) = lifecycle.task.take() {
            match tokio::time::timeout(self.config.shutdown_period, &mut task).await {
                Ok(Ok(Ok(()))) => {}
                Ok(Ok(Err(e))) => error!(error = %e, "gRPC transport error during shutdown"),
                Ok(Err(e)) => error!(error = %e, "gRPC server task failed"),
                Err(_) => {
                    warn!(
                        "grace period of {:?} elapsed with calls in flight, aborting",
                        self.config.shutdown_period
                    );
                    self.service.abort_in_flight();
                    if tokio::time::timeout(ABORT_DRAIN_PERIOD, &mut task).await.is_err() {
                        task.abort();
                    }
                }
            }
        }

        lifecycle.health = None;
        self.state.send_replace(ServerState::Stopped);
        info!("server shutdown safely");
    }
}

impl fmt::Debug for GrpcServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrpcServer")
            .field("config", &self.inner.config)
            .field("state", &self.state())
            .finish()
    }
}

/// Wait for SIGTERM or SIGINT (Ctrl+C)
///
/// The SIGTERM handler is installed before the returned future is first
/// polled.
fn shutdown_signal() -> impl Future<Output = ()> {
    #[cfg(unix)]
    let terminate = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate());

    async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match terminate {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    error!(error = %e, "failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received Ctrl+C, starting graceful shutdown");
            },
            _ = terminate => {
                info!("Received SIGTERM, starting graceful shutdown");
            },
        }
    }
}
