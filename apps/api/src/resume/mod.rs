pub mod analysis;
pub mod ats;
pub mod extract;
pub mod handlers;
pub mod optimize;
pub mod resolver;
