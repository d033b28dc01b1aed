//! Query coordinator
//!
//! The coordinator is responsible for:
//! - Classifying inbound queries into routing plans
//! - Dispatching them to one fragment site, or to both concurrently
//! - Merging scatter-gather partial results
//!
//! It keeps no state between requests.

pub mod aggregator;
pub mod classifier;
pub mod http;
pub mod router;
pub mod server;
pub mod site_client;

pub use classifier::{Classifier, QueryRequest, QueryType, RoutingPlan, SiteQuery};
pub use router::{DecisionRouter, QueryResponse};
pub use server::Coordinator;
pub use site_client::{FragmentClient, HttpSiteClient};
