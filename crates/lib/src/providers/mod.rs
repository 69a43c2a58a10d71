//! # Providers
//!
//! Adapters for the two external collaborators: the completion service (`ai`)
//! and the relational store (`db`).

pub mod ai;
pub mod db;
pub mod factory;
