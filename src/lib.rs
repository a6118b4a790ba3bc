//! # Shopping List Telegram Bot
//!
//! A Telegram bot that keeps a personal shopping list organized into
//! categories. Items are added by typing their names and checked off by
//! tapping them.

pub mod bot;
pub mod config;
pub mod db;
pub mod errors;
pub mod ids;
pub mod launcher;
pub mod localization;
pub mod memory_store;
pub mod model;
pub mod repository;
pub mod services;
pub mod session;
