pub mod collector;
pub mod platform;
pub mod policy;
pub mod process;
pub mod snapshot;
pub mod source;
pub mod users;
