//! Supervision of the hop listeners.
//!
//! # Responsibilities
//! - Run every hop on its own task
//! - Treat the first hop that stops on its own as fatal for the chain
//! - Stop the remaining hops and wait for all of them
//!
//! # Design Decisions
//! - No restart policy: a dead hop would leave the chain half-working
//! - The supervisor owns the only `Shutdown`; hops only hold receivers

use std::future::Future;
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::{JoinError, JoinSet};

use crate::hop::HopRole;
use crate::http::HopServer;
use crate::lifecycle::shutdown::Shutdown;

/// Why the chain stopped without being asked to.
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("{role} listener exited unexpectedly")]
    ListenerExited { role: HopRole },

    #[error("{role} listener failed: {source}")]
    ListenerFailed {
        role: HopRole,
        #[source]
        source: std::io::Error,
    },

    #[error("listener task panicked: {0}")]
    Panicked(#[from] JoinError),
}

/// Runs hops until a signal arrives or one of them dies.
pub struct Supervisor {
    shutdown: Shutdown,
    tasks: JoinSet<(HopRole, std::io::Result<()>)>,
    addresses: Vec<(HopRole, SocketAddr)>,
}

impl Supervisor {
    pub fn new() -> Self {
        Self {
            shutdown: Shutdown::new(),
            tasks: JoinSet::new(),
            addresses: Vec::new(),
        }
    }

    /// Start `server` on an already bound `listener`.
    pub fn spawn(&mut self, server: HopServer, listener: TcpListener) -> std::io::Result<()> {
        let role = server.role();
        self.addresses.push((role, listener.local_addr()?));

        let shutdown = self.shutdown.subscribe();
        self.tasks
            .spawn(async move { (role, server.run(listener, shutdown).await) });
        Ok(())
    }

    /// Bound address of each started hop, in start order.
    pub fn addresses(&self) -> &[(HopRole, SocketAddr)] {
        &self.addresses
    }

    /// Handle that stops every hop when triggered.
    pub fn shutdown(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Wait for `signal` or the first hop exit, then stop and join everything.
    pub async fn run_until<F>(mut self, signal: F) -> Result<(), SupervisorError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(signal);

        let first = tokio::select! {
            _ = &mut signal => None,
            Some(joined) = self.tasks.join_next() => Some(joined),
        };

        // Exits caused by an earlier `Shutdown::trigger` are orderly.
        let failure = match first {
            Some(joined) if !self.shutdown.is_triggered() => Some(Self::classify(joined)),
            _ => None,
        };

        if let Some(err) = &failure {
            tracing::error!(error = %err, "Hop stopped, shutting down the chain");
        }
        self.shutdown.trigger();

        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok((role, Ok(()))) => tracing::debug!(role = %role, "Hop stopped"),
                Ok((role, Err(e))) => tracing::warn!(role = %role, error = %e, "Hop stopped with error"),
                Err(e) => tracing::warn!(error = %e, "Hop task panicked during shutdown"),
            }
        }

        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn classify(joined: Result<(HopRole, std::io::Result<()>), JoinError>) -> SupervisorError {
        match joined {
            Ok((role, Ok(()))) => SupervisorError::ListenerExited { role },
            Ok((role, Err(source))) => SupervisorError::ListenerFailed { role, source },
            Err(e) => SupervisorError::Panicked(e),
        }
    }
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// A hop that runs until the supervisor's shutdown fires.
    fn spawn_waiting(supervisor: &mut Supervisor, role: HopRole) -> Arc<AtomicBool> {
        let stopped = Arc::new(AtomicBool::new(false));
        let flag = stopped.clone();
        let mut shutdown = supervisor.shutdown.subscribe();
        supervisor.tasks.spawn(async move {
            let _ = shutdown.recv().await;
            flag.store(true, Ordering::SeqCst);
            (role, Ok(()))
        });
        stopped
    }

    #[tokio::test]
    async fn unexpected_exit_stops_the_chain() {
        let mut supervisor = Supervisor::new();
        let origin_stopped = spawn_waiting(&mut supervisor, HopRole::Origin);
        supervisor.tasks.spawn(async { (HopRole::Relay, Ok(())) });
        let shutdown = supervisor.shutdown();

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            supervisor.run_until(std::future::pending()),
        )
        .await
        .expect("supervisor hung");

        assert!(matches!(
            result,
            Err(SupervisorError::ListenerExited {
                role: HopRole::Relay
            })
        ));
        assert!(shutdown.is_triggered());
        assert!(origin_stopped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn listener_error_is_reported_with_its_role() {
        let mut supervisor = Supervisor::new();
        let relay_stopped = spawn_waiting(&mut supervisor, HopRole::Relay);
        supervisor.tasks.spawn(async {
            (
                HopRole::Edge,
                Err(std::io::Error::new(std::io::ErrorKind::Other, "accept failed")),
            )
        });

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            supervisor.run_until(std::future::pending()),
        )
        .await
        .expect("supervisor hung");

        match result {
            Err(SupervisorError::ListenerFailed { role, source }) => {
                assert_eq!(role, HopRole::Edge);
                assert_eq!(source.to_string(), "accept failed");
            }
            other => panic!("expected listener failure, got {:?}", other),
        }
        assert!(relay_stopped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn signal_is_an_orderly_stop() {
        let mut supervisor = Supervisor::new();
        let edge_stopped = spawn_waiting(&mut supervisor, HopRole::Edge);

        let result = supervisor.run_until(async {}).await;

        assert!(result.is_ok());
        assert!(edge_stopped.load(Ordering::SeqCst));
    }
}
