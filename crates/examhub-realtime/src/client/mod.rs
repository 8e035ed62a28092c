//! Real-time client: one session per page, typed events, and the admin
//! display panel fed by inbound events.

pub mod bootstrap;
pub mod panel;
pub mod render;
pub mod session;
pub mod state;

pub use panel::{AdminPanel, DisplayTarget, NotificationEntry, PanelUpdate, StatsView};
pub use session::RealtimeClient;
pub use state::ConnectionState;
