pub mod calculator;
pub mod catalog;
pub mod config;
pub mod core;
pub mod models;
pub mod rates;
