pub mod config;
pub mod domain;
pub mod error;
pub mod id;
pub mod repository;
pub mod selectors;
pub mod service;
pub mod storage;
pub mod store;
