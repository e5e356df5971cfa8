//! Steam community profile integration
//!
//! - `request`: URL and header construction
//! - `client`: HTTP transport
//! - `parser`: XML field extraction
//! - `mapper`: presence mapping

pub mod client;
pub mod mapper;
pub mod parser;
pub mod request;

pub use client::{ProfileSource, SteamClient};
pub use mapper::map_snapshot;
pub use parser::parse_profile;
pub use request::ProfileRequest;
