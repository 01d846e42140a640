//! Backend runtime setup and orchestration.
//!
//! This module wires together configuration, storage, shared state, and the
//! message dispatch loop that listens to frontend bridge requests.

use std::{path::PathBuf, sync::Arc, thread};

use chrono::Utc;
use copicom_bridge::{
    MessageFromBackend, MessageToBackend,
    config::{ApiConfig, Config},
    toast::ToastKind,
};
use tokio::sync::{
    RwLock,
    mpsc::{self, Receiver, Sender},
};

use crate::api::{ApiClient, ApiError};
use crate::app::AppContext;
use crate::navigation::Navigator;
use crate::state::State;
use crate::store::LocalStore;

/// Initialize backend state from `config` and process frontend messages
/// until the frontend closes its side of the bridge.
///
/// On start the stored list is published right away, so the frontend has
/// something to show before the server answers. An unusable `api.base_url`
/// is replaced by the default one and reported with an error toast.
pub async fn serve(
    mut config: Config,
    data_dir: PathBuf,
    rx: Receiver<MessageToBackend>,
    tx: Sender<MessageFromBackend>,
) -> Result<(), ApiError> {
    let (api, config_problem) = match ApiClient::from_config(&config.api) {
        Ok(api) => (api, None),
        Err(e) => {
            let fallback = ApiConfig::default().base_url;
            log::error!("Unusable API configuration ({e}), falling back to {fallback}");
            config.api.base_url = fallback;
            (ApiClient::from_config(&config.api)?, Some(e))
        }
    };
    let store = LocalStore::new(data_dir);
    log::info!("Keeping notification state in {:?}", store.dir());

    let install_time = store.install_time(Utc::now()).await;
    let notifications = store.load().await;
    log::info!(
        "Loaded {} stored notifications, install time {install_time}",
        notifications.len()
    );

    let refresh_on_start = config.sync.refresh_on_start;
    let navigator = Navigator::new(tx.clone(), config.navigation.pending_capacity);
    let state = Arc::new(RwLock::new(State {
        config,
        api,
        store,
        install_time,
        notifications,
        navigator,
    }));

    let (events_tx, events_rx) = mpsc::channel(16);
    let context = Arc::new(AppContext {
        state,
        tx,
        events: events_tx,
    });

    if let Some(e) = config_problem {
        context
            .send_toast(ToastKind::Error, format!("{e}, using the default server address"))
            .await;
    }
    context.publish_notifications().await;
    if refresh_on_start {
        crate::services::notification_service::handle_refresh_request(context.clone()).await;
    }

    context.consume_bridge_messages(rx, events_rx).await;
    Ok(())
}

async fn setup_backend(rx: Receiver<MessageToBackend>, tx: Sender<MessageFromBackend>) {
    let (config, data_dir) = crate::config::load_config()
        .await
        .expect("failed to load config");

    if let Err(e) = serve(config, data_dir, rx, tx).await {
        log::error!("Notification backend failed to start: {e}");
    }
}

/// Spawn the backend runtime and begin processing bridge messages.
pub fn run(rx: Receiver<MessageToBackend>, tx: Sender<MessageFromBackend>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .expect("failed to build tokio runtime");
        runtime.block_on(async { setup_backend(rx, tx).await });
    })
}
