pub mod api;
pub mod aws;
pub mod callback;
pub mod config;
pub mod handlers;
pub mod hashing;
pub mod images;
pub mod observability;
pub mod pwgen;
