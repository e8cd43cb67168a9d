// Remote backend access: student lookup and slip submission

pub mod backend;
pub mod errors;
pub mod http;

pub use backend::SlipBackend;
#[cfg(any(test, feature = "testing"))]
pub use backend::MockSlipBackend;
pub use errors::{ClientError, LookupError, UploadError};
pub use http::HttpSlipBackend;
