//! Fragment site
//!
//! One template serves either slice of the database; the partition it is
//! started with decides which rows it imports and answers for:
//! - Advanced (Site-A): senior students, advanced courses, completed enrollments
//! - Basic (Site-B): junior students, basic courses, pending enrollments
//!
//! Faculty is replicated on both.

pub mod http;
pub mod import;
pub mod server;
pub mod store;

pub use import::{import, Dataset, ImportReport};
pub use server::{serve_store, FragmentSite};
pub use store::FragmentStore;
