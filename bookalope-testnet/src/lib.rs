//! An in-memory Bookalope server for local development and tests.
//!
//! [`EphemeralServer`] binds a random local port, serves the Bookalope
//! endpoints from memory and accepts exactly one randomly generated token.
//! It stops when dropped.

mod app;
mod auth;
mod http_error;
mod routes;
mod state;

use std::net::SocketAddr;

use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};
use url::Url;

use crate::state::{AppState, random_hex32};

// Re-export the client crate
pub use bookalope;

/// A running test server.
///
/// # Example
/// ```no_run
/// # async fn run() -> anyhow::Result<()> {
/// let server = bookalope_testnet::EphemeralServer::start().await?;
/// let client = server.client()?;
/// let book = client.create_book().await?;
/// assert_eq!(book.bookflows().len(), 1);
/// # Ok(()) }
/// ```
pub struct EphemeralServer {
    socket: SocketAddr,
    url: Url,
    token: String,
    shutdown: Option<oneshot::Sender<()>>,
    join_handle: JoinHandle<()>,
}

impl EphemeralServer {
    /// Start a server on `127.0.0.1` with a random port and token.
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_on(SocketAddr::from(([127, 0, 0, 1], 0))).await
    }

    /// Start a server on a specific socket address.
    pub async fn start_on(addr: SocketAddr) -> anyhow::Result<Self> {
        let token = random_hex32();
        let app = app::create_app(AppState::new(token.clone()));

        let listener = TcpListener::bind(addr).await?;
        let socket = listener.local_addr()?;
        let url = Url::parse(&format!("http://{socket}"))?;
        let (shutdown, stop) = oneshot::channel::<()>();

        let join_handle = tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = stop.await;
            });
            if let Err(error) = server.await {
                tracing::error!(?error, "Bookalope test server stopped");
            }
        });
        tracing::info!(%socket, "Bookalope test server listening");

        Ok(Self {
            socket,
            url,
            token,
            shutdown: Some(shutdown),
            join_handle,
        })
    }

    /// Socket the server listens on.
    pub fn listen_socket(&self) -> SocketAddr {
        self.socket
    }

    /// Base URL to configure clients with.
    pub fn url(&self) -> Url {
        self.url.clone()
    }

    /// The only token this server accepts.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// A client pointed at this server, already holding the token.
    pub fn client(&self) -> anyhow::Result<bookalope::BookalopeClient> {
        Ok(bookalope::BookalopeClient::builder()
            .host(self.url().as_str())
            .token(&self.token)
            .build()?)
    }
}

impl Drop for EphemeralServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        self.join_handle.abort();
    }
}
