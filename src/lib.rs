pub mod api;
pub mod channel_config;
pub mod chrono_util;
pub mod cli;
pub mod configure;
pub mod grab;
pub mod grabber_trait;
pub mod norway;
pub mod progress;
pub mod reunion;
pub mod schedule;
pub mod schema;
pub mod xmltv;
