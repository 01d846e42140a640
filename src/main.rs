mod shell;

fn main() -> anyhow::Result<()> {
    simple_logger::SimpleLogger::new()
        .with_colors(true)
        .with_threads(true)
        .with_local_timestamps()
        .init()
        .expect("failed to build logger instance");

    let channels = copicom_bridge::BridgeChannels::default();
    copicom_backend::run(channels.backend_rx, channels.backend_tx);
    shell::run(channels.frontend_rx, channels.frontend_tx)
}
