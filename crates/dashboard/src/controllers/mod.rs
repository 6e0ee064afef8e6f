//! Screen and dialog state machines.
//!
//! Controllers never perform I/O. Operations that need data return a request
//! value carrying a generation; the app runs the fetch inside the owning task
//! scope and hands the outcome back through the matching `apply_*` method.

pub mod client_details;
pub mod debounce;
pub mod filters;
pub mod health;
pub mod list;
pub mod process_details;
pub mod process_info;
pub mod upload;

pub use client_details::{ClientDetailsController, ClientFetch, ClientRequest};
pub use debounce::{Debouncer, FILTER_QUIET};
pub use filters::{ClientFilter, ErrorFilter, NoFilter, ProcessFilter, RowFilter};
pub use health::{HealthMonitor, HealthPoller, Probe};
pub use list::{ListController, ListScope, PAGE_SIZE_OPTIONS, PageRequest, PagedList};
pub use process_details::{ProcessDetailsController, ProcessRequest};
pub use process_info::{InfoFilter, InfoPane, InfoRequest, ProcessInfoController};
pub use upload::{UploadController, UploadTicket, validate_file};
