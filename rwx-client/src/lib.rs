//! RWX client: discover resources, fetch their capability documents and
//! send REST documents to them.

pub mod mock;
pub mod request;
pub mod service;
pub mod transport;

pub use mock::MockService;
pub use request::{ActionRequest, MethodRequest};
pub use service::{ClientError, XmppService};
pub use transport::TransportService;
