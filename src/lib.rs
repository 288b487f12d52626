pub mod cli;
pub mod config;
pub mod cursor;
pub mod fetch;
pub mod kube;
pub mod source;
pub mod web;
