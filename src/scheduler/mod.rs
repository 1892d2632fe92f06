pub mod decision;
pub mod monitor;
pub mod slots;
pub mod state;
pub mod window;

pub use decision::{decide, CheckDecision};
pub use monitor::{GameMonitor, MonitorSnapshot};
pub use slots::{group_into_slots, Slot};
pub use state::MonitorState;
pub use window::{check_window, CheckWindow};
