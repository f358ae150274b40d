//! Listener lifecycle: binding, serving in the background and graceful shutdown.

use crate::config::ServerConfig;
use anyhow::{Context, Result};
use axum::Router;
use std::{net::SocketAddr, time::Duration};
use tokio::{net::TcpListener, sync::oneshot};

/// Serves a `Router` on a socket until stopped.
///
/// - **Idempotent start/stop:** starting twice stops the previous instance; stopping twice is a no-op.
/// - **Graceful shutdown:** in-flight requests finish before `stop()` returns (up to a timeout).
pub struct TileServer {
	config: ServerConfig,
	router: Router,
	/// One-shot channel to signal graceful shutdown to the serving task.
	exit_signal: Option<oneshot::Sender<()>>,
	/// Join handle for the serving task; awaited in `stop()`.
	join: Option<tokio::task::JoinHandle<()>>,
	local_addr: Option<SocketAddr>,
}

impl TileServer {
	pub fn new(config: ServerConfig, router: Router) -> TileServer {
		TileServer {
			config,
			router,
			exit_signal: None,
			join: None,
			local_addr: None,
		}
	}

	/// Start listening and serving requests in a spawned task.
	pub async fn start(&mut self) -> Result<()> {
		if self.exit_signal.is_some() || self.join.is_some() {
			self.stop().await;
		}

		let addr = self.config.address();
		log::info!("server binding on {addr}");

		let listener = TcpListener::bind(&addr)
			.await
			.with_context(|| format!("binding to {addr}"))?;
		self.local_addr = Some(listener.local_addr()?);

		let router = self.router.clone();
		let (tx, rx) = oneshot::channel::<()>();

		let handle = tokio::spawn(async move {
			if let Err(err) = axum::serve(listener, router.into_make_service())
				.with_graceful_shutdown(async {
					rx.await.ok();
				})
				.await
			{
				log::error!("server task exited with error: {err}");
			}
		});

		self.exit_signal = Some(tx);
		self.join = Some(handle);

		Ok(())
	}

	/// Address the server is bound to, once started. Differs from the configured one
	/// when port 0 was requested.
	pub fn local_addr(&self) -> Option<SocketAddr> {
		self.local_addr
	}

	/// Trigger graceful shutdown and wait for the server task to finish.
	pub async fn stop(&mut self) {
		if self.exit_signal.is_none() && self.join.is_none() {
			return;
		}

		log::info!("stopping server");

		if let Some(tx) = self.exit_signal.take() {
			let _ = tx.send(());
		}

		if let Some(handle) = self.join.take() {
			match tokio::time::timeout(Duration::from_secs(10), handle).await {
				Ok(Err(join_err)) => log::warn!("server task join error: {join_err}"),
				Ok(Ok(())) => {}
				Err(_) => log::warn!("server task did not shutdown within timeout; continuing"),
			}
		}
		self.local_addr = None;
	}

	/// Start, then serve until Ctrl-C is pressed.
	pub async fn run_until_ctrl_c(&mut self) -> Result<()> {
		self.start().await?;
		tokio::signal::ctrl_c().await.context("waiting for Ctrl-C")?;
		self.stop().await;
		Ok(())
	}
}
