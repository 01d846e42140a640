/// Handles [`copicom_bridge::MessageToBackend::NavigationReady`]: routes held
/// while the container was not mounted are delivered now.
pub async fn handle_navigation_ready(context: super::AppContextHandle) {
    let mut state = context.state.write().await;
    state.navigator.mark_ready();
}

/// Handles [`copicom_bridge::MessageToBackend::NavigationUnavailable`].
pub async fn handle_navigation_unavailable(context: super::AppContextHandle) {
    let mut state = context.state.write().await;
    state.navigator.mark_unavailable();
}
