//! # minifrag
//!
//! A query coordinator over a horizontally fragmented academic-records
//! database:
//! - Students, courses and enrollments split across two fragment sites by
//!   year, credit count and enrollment status
//! - Faculty replicated on both sites
//! - Rule-based routing: one site, either replica, or scatter-gather
//! - Concurrent fan-out with per-site timeouts and fixed-order merging
//!
//! ## Architecture
//!
//! ```text
//!                ┌──────────────────────────────────┐
//!   client ────▶ │           Coordinator            │
//!                │  classifier → router → aggregator │
//!                └───────┬───────────────────┬──────┘
//!                        │ HTTP              │ HTTP
//!              ┌─────────▼────────┐ ┌────────▼─────────┐
//!              │ Site A (advanced)│ │ Site B (basic)   │
//!              │ year > 2         │ │ year <= 2        │
//!              │ credits > 2      │ │ credits <= 2     │
//!              │ DONE             │ │ NOT DONE         │
//!              │ + faculty        │ │ + faculty        │
//!              └──────────────────┘ └──────────────────┘
//! ```
//!
//! ## Usage
//!
//! ### Start the fragment sites
//! ```bash
//! minifrag-site serve --partition advanced --bind 0.0.0.0:3001 --data ./data
//! minifrag-site serve --partition basic --bind 0.0.0.0:3002 --data ./data
//! ```
//!
//! ### Start the coordinator
//! ```bash
//! minifrag-coord serve \
//!   --bind 0.0.0.0:3000 \
//!   --site-a http://localhost:3001 \
//!   --site-b http://localhost:3002
//! ```
//!
//! ### Query
//! ```bash
//! minifrag query course-enrollments --course-id 10 --credits 3
//! minifrag query faculty-students --faculty-id 7
//! ```

pub mod common;
pub mod coordinator;
pub mod site;

// Re-export commonly used types
pub use common::{Config, Error, Result};
pub use coordinator::{Coordinator, DecisionRouter};
pub use site::FragmentSite;

/// Current version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
