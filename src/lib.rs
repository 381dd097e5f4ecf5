pub mod config;
pub mod db;
pub mod server;
pub mod telemetry;
pub mod transfer;

#[cfg(test)]
pub(crate) mod test_utils;
