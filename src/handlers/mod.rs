//! Custom resource handlers
//!
//! Each supported resource type has a [`ResourceHandler`] that validates
//! the event's properties and computes the data to report. The
//! [`Dispatcher`] routes an incoming [`LifecycleEvent`] to the matching
//! handler, turns every outcome (data, error or panic) into a
//! [`ResultEnvelope`], and delivers it through a
//! [`ResponseSink`](crate::callback::ResponseSink).
//!
//! ## Resource types
//!
//! - `Custom::ApiGatewayBinary` - [`ApiGatewayBinaryHandler`]
//! - `Custom::FindImage` - [`FindImageHandler`]
//! - `Custom::GeneratePassword` - [`GeneratePasswordHandler`]
//! - `Custom::HashPassword` - [`HashPasswordHandler`]
//! - `Custom::SecureRandom` - [`SecureRandomHandler`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use cfntoolkit::aws::Backends;
//! use cfntoolkit::handlers::{Dispatcher, HandlerSettings, ResourceHandlers};
//!
//! let handlers = ResourceHandlers::new(&Backends::in_memory(), HandlerSettings::default());
//! let dispatcher = Dispatcher::new(handlers, sink, metrics);
//! let outcome = dispatcher.handle(&event).await;
//! ```

mod api_gateway;
mod find_image;
mod generate_password;
mod hash_password;
mod properties;
mod registry;
mod secure_random;
mod traits;
pub(crate) mod types;

pub use api_gateway::ApiGatewayBinaryHandler;
pub use find_image::FindImageHandler;
pub use generate_password::GeneratePasswordHandler;
pub use hash_password::HashPasswordHandler;
pub use properties::Properties;
pub use registry::{Dispatcher, HandlerSettings, Outcome, ResourceHandlers};
pub use secure_random::SecureRandomHandler;
pub use traits::{ErrorKind, HandlerError, HandlerResult, ResourceHandler};
pub use types::{
    HandlerOutput, LifecycleEvent, RequestType, ResourceKind, ResultEnvelope, Status,
};
