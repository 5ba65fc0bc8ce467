pub mod check;
pub mod config;
pub mod form;
pub mod plugins;
