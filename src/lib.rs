//! Retail sales reporting core: load a transaction sheet once, filter it by
//! categorical selections, and derive KPIs and chart descriptions.
//!
//! ```text
//!  loader ─▶ cache ─▶ filter ─▶ aggregate ─▶ chart
//!                        └──────── dashboard::compute ───────┘
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod report;
