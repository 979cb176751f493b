//! OS signal handling.
//!
//! SIGTERM and SIGINT request shutdown. SIGHUP requests a config reload
//! and never shuts down. On non-Unix targets only Ctrl-C is observed.
//!
//! Handlers are registered once in [`SignalListener::new`] and kept for the
//! life of the listener, so signals arriving between `recv` calls are
//! buffered rather than lost.

/// What the daemon was asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Shutdown,
    Reload,
}

#[cfg(unix)]
pub struct SignalListener {
    streams: Option<UnixStreams>,
}

#[cfg(unix)]
struct UnixStreams {
    int: tokio::signal::unix::Signal,
    term: tokio::signal::unix::Signal,
    hup: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl SignalListener {
    /// Register handlers. Must be called from within a Tokio runtime.
    pub fn new() -> Self {
        use tokio::signal::unix::{signal, SignalKind};

        let streams = match (
            signal(SignalKind::interrupt()),
            signal(SignalKind::terminate()),
            signal(SignalKind::hangup()),
        ) {
            (Ok(int), Ok(term), Ok(hup)) => Some(UnixStreams { int, term, hup }),
            (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => {
                tracing::error!(error = %e, "Could not install signal handlers, falling back to Ctrl-C only");
                None
            }
        };
        Self { streams }
    }

    pub async fn recv(&mut self) -> Signal {
        let Some(streams) = self.streams.as_mut() else {
            return ctrl_c().await;
        };

        tokio::select! {
            _ = streams.int.recv() => {
                tracing::info!("Received SIGINT");
                Signal::Shutdown
            }
            _ = streams.term.recv() => {
                tracing::info!("Received SIGTERM");
                Signal::Shutdown
            }
            _ = streams.hup.recv() => {
                tracing::info!("Received SIGHUP");
                Signal::Reload
            }
        }
    }
}

#[cfg(not(unix))]
pub struct SignalListener;

#[cfg(not(unix))]
impl SignalListener {
    pub fn new() -> Self {
        Self
    }

    pub async fn recv(&mut self) -> Signal {
        ctrl_c().await
    }
}

impl Default for SignalListener {
    fn default() -> Self {
        Self::new()
    }
}

async fn ctrl_c() -> Signal {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    Signal::Shutdown
}
