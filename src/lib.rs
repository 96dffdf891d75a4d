pub mod annotation;
pub mod app;
pub mod backend;
pub mod canvas;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod input;
pub mod nav;
pub mod store;
pub mod tool;
