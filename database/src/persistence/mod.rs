pub mod migration;
pub mod storage;
