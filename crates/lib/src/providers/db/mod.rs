#[cfg(feature = "postgres")]
pub mod postgres;
pub mod sqlite;
pub mod storage;
