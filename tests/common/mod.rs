#![allow(dead_code)]

pub mod mock;
#[cfg(feature = "sqlite")]
pub mod sqlite;
