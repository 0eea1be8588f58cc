pub mod binder;
pub mod eraser;
pub mod errors;
pub mod models;
pub mod ports;
pub mod service;
