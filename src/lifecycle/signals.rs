//! OS signal handling.
//!
//! Only the interrupt signal (SIGINT / Ctrl-C) is handled; it starts the
//! graceful shutdown. Everything else keeps its default disposition.

/// Wait for an interrupt signal.
pub async fn interrupt() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Interrupt signal received"),
        Err(e) => {
            // Without a handler there is nothing to wait for; park forever so
            // the server keeps running until killed.
            tracing::error!(error = %e, "Failed to install interrupt handler");
            std::future::pending::<()>().await;
        }
    }
}
