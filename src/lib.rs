pub mod config;
pub mod current;
pub mod export;
pub mod navigation;
pub mod planner;
pub mod route;
pub mod storage;
