//! Replacement reminders for recurring maintenance supplies.
//!
//! A small local-only engine: supplies persist in SQLite at
//! `~/.resupply/resupply.db`, each carries a replacement interval and a
//! notify time-of-day, and at most one outstanding one-shot alert per supply
//! fires when a replacement comes due. This crate ships the store, the
//! due-date computation, the reschedule sequencing, and an in-process alert
//! backend; the surface that edits supplies is up to the embedding shell.

pub mod alerts;
pub mod config;
pub mod db;
pub mod due;
mod migrations;
pub mod notification;
pub mod reminders;
pub mod seeds;
