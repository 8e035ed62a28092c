//! Page lifecycle hooks: connect on load, disconnect on sign-out.

use tracing::{debug, warn};

use examhub_core::types::Participant;

use super::session::RealtimeClient;

/// What a page knows about itself when it loads.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    /// Id of the signed-in user, as templated into the page.
    pub user_id: Option<String>,
    /// Kind of the signed-in user; `student` when absent.
    pub user_type: Option<String>,
    /// Pages with their own realtime toggle manage the connection themselves.
    pub has_realtime_toggle: bool,
}

/// Connect the client for a freshly loaded page.
///
/// Anonymous pages and pages with their own toggle are left alone.
/// Returns whether a connection is open afterwards. Failures are logged.
pub async fn on_page_load(client: &RealtimeClient, page: &PageContext) -> bool {
    if page.has_realtime_toggle {
        debug!("Page manages its own realtime connection");
        return client.is_connected();
    }

    let Some(participant) =
        Participant::from_page(page.user_id.as_deref(), page.user_type.as_deref())
    else {
        debug!("Anonymous page, not connecting");
        return false;
    };

    if !client.is_connected() {
        if let Err(e) = client.connect_as(participant).await {
            warn!(error = %e, "Realtime connection unavailable for this page");
        }
    }
    client.is_connected()
}

/// Tear the session down when the page is navigating to a sign-out URL.
pub fn on_page_unload(client: &RealtimeClient, location: &str) {
    if is_sign_out_location(location) {
        client.disconnect();
    }
}

/// Whether a URL is the sign-out action.
pub fn is_sign_out_location(location: &str) -> bool {
    location.contains("/logout")
}
