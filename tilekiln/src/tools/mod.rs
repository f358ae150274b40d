pub mod args;
pub mod config;
pub mod dev;
pub mod generate;
pub mod live;
pub mod mbtilesdump;
pub mod prometheus;
pub mod serve;
pub mod sql;
pub mod storage;
pub mod tilesdump;
