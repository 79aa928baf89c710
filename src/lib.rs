//! # Mastro Dashboard
//!
//! A terminal dashboard over the Mastro data platform: the asset catalogue,
//! the feature store, the metric store, Kafka Connect and the Kafka Schema
//! Registry.
//!
//! Every list view is backed by a [`store::Store`], an async handle over a
//! pure [`state::ListState`] machine that tracks the current query, page
//! window, loading phase and selection. Stores fetch through a
//! [`sources::Source`], which turns a page request into HTTP calls against a
//! service resolved by the [`locator::ServiceLocator`].
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌────────────┐   ┌──────────┐   ┌─────────────┐
//! │   CLI    │──▶│   Store    │──▶│  Source  │──▶│   Fetcher   │──▶ services
//! │ (mastro) │   │ ListState  │   │ per kind │   │  (reqwest)  │
//! └──────────┘   └─────┬──────┘   └──────────┘   └─────────────┘
//!                      │
//!                      ▼
//!                 ┌──────────┐
//!                 │   view   │
//!                 └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! mastro services                     # where each service resolves to
//! mastro search "#sales, #daily"      # tag search
//! mastro asset orders                 # detail with lineage
//! mastro metricsets orders --page 2
//! mastro connectors --limit 10
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`locator`] | Logical service name to base URL |
//! | [`fetch`] | HTTP fetch adapter and its error type |
//! | [`models`] | Wire records and the response envelope |
//! | [`paging`] | Page windows, summaries and the page selector |
//! | [`query`] | Search query classification |
//! | [`state`] | The list state machine |
//! | [`sources`] | One data source per resource kind |
//! | [`store`] | Async store handles |
//! | [`dashboard`] | All stores wired together |
//! | [`lineage`] | Asset dependency graph |
//! | [`view`] | Text rendering |
//! | [`commands`] | CLI entry points |
//! | [`logging`] | `tracing` subscriber setup |

pub mod commands;
pub mod config;
pub mod dashboard;
pub mod fetch;
pub mod lineage;
pub mod locator;
pub mod logging;
pub mod models;
pub mod paging;
pub mod query;
pub mod sources;
pub mod state;
pub mod store;
pub mod view;
