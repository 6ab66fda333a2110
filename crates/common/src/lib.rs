//! Types shared by every record service: the wire page shape, page requests,
//! health payloads and logging bootstrap.

pub mod types;
pub mod pagination;
pub mod utils {
    pub mod logging;
}

pub use pagination::{to_page, Page, PageRequest, PageRequestError, Slice};
