//! Bookkeeping engine for small-business payroll, invoicing and reporting.
//!
//! This crate aggregates employee time into pay periods, runs payroll with
//! weekly overtime and configurable deductions, totals invoice line items,
//! tracks invoices through their lifecycle, and rolls everything up into
//! financial summaries. An axum router exposes the engine over HTTP on top
//! of in-memory record stores.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod storage;
