//! # Ladysauna Backend
//!
//! Location-based social directory for sauna facilities: venues,
//! community-reported "ladies-only" time windows with trust voting,
//! reviews, and favorites. The backend exposes a REST API via Axum for
//! the mobile frontend.
//!
//! ## Features
//!
//! - **Schedule entries**: weekly or one-off ladies-only windows per venue
//! - **Community trust**: one live vote per user per entry; a 0–5 score
//!   rebuilt from the full vote ledger after every vote
//! - **Directory**: venue search, facilities, nearest-first sorting
//! - **Reviews & favorites**: peer resources with derived venue ratings
//! - **HTTP API**: RESTful endpoints for frontend integration
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: Identifier newtypes and the public type surface
//! - [`models`]: Domain records and enums
//! - [`db`]: Database operations, repository pattern, and persistence layer
//! - [`services`]: High-level business logic
//! - [`http`]: Axum-based HTTP server and request handlers

pub mod api;

pub mod db;
pub mod models;

pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
