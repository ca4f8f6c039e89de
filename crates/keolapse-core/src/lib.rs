pub mod config;
pub mod consts;
pub mod encode;
pub mod error;
pub mod frame;
pub mod io;
pub mod pipeline;
pub mod ring;
pub mod schedule;
