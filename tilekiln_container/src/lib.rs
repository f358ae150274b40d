//! Rendering, caching and exporting of tilekiln tilesets.
//!
//! - [`Kiln`] turns a tile into MVT bytes by running the layer queries of a
//!   [`Config`](tilekiln_core::Config) against a [`SourceDatabase`].
//! - [`Storage`] is the tile cache, backed by PostgreSQL ([`PgStorage`]) or memory
//!   ([`MemoryStorage`]).
//! - [`Tileset`] ties a tileset's metadata to a storage.
//! - [`generate_tiles`], [`MBTilesDump`] and [`DirectoryDump`] render many tiles at once.

mod database;
pub use database::*;

mod dump;
pub use dump::*;

mod generate;
pub use generate::*;

mod kiln;
pub use kiln::*;

mod storage;
pub use storage::*;

mod tileset;
pub use tileset::*;
