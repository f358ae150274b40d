//! Settings handed from the command line to the servers.

mod server;
pub use server::*;
