pub mod config;
pub mod engine;
pub mod job_controller;
pub mod services;
