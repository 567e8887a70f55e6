pub mod db;
pub mod export;
pub mod models;
pub mod projection;
pub mod score;
pub mod service;
pub mod suggest;
pub mod weekly;
