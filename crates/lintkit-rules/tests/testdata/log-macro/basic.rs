// want: import from `tracing` instead of `log`
use log::warn;

fn start(port: u16) {
    // want: use `tracing::info!` instead of `log::info!`
    log::info!("listening on {}", port);
    tracing::info!(port, "listening");
}

fn fail() {
    // want: use `tracing::error!` instead of `log::error!`
    log::error!("failed");
    warn!("imported macros are reported at the import");
}
