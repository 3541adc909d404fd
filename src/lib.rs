#![forbid(unsafe_code)]

pub mod assets;
pub mod cli;
pub mod config;
pub mod effect;
pub mod formats;
pub mod gallery;
pub mod input;
pub mod logging;
pub mod manifest;
pub mod prefetch;
pub mod progress;
pub mod reader;
pub mod replay;
pub mod route;
pub mod router;
pub mod storage;
pub mod viewer;
pub mod zoom;
