pub mod draft;
pub mod notify;
pub mod rooms;
pub mod snapshot;
