//! The render engine and the source database it queries.

mod error;
pub use error::*;

mod mock;
pub use mock::*;

mod postgres;
pub use postgres::*;

mod renderer;
pub use renderer::*;

mod source;
pub use source::*;
