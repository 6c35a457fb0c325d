pub mod error;
pub mod record;
pub mod handler;
pub mod json;
pub mod ecs;
pub mod trace;
pub mod logger;
pub mod layer;

pub mod init;

pub use init::logger;
pub use logger::Logger;
