pub mod endpoint;
pub mod event;

pub use endpoint::EndpointConfig;
pub use event::Event;
