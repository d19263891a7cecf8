//! Network Module
//!
//! Blocking HTTP/1.1 client used to reach the store.
//!
//! ## Architecture
//! - One TCP connection per request (`Connection: close`)
//! - Buffered request writer / response reader per connection
//! - No pooling, no retries

mod url;
mod message;
mod connection;
mod client;

pub use url::{encode_query_component, BaseUrl};
pub use message::{HttpRequest, HttpResponse, Method};
pub use connection::Connection;
pub use client::HttpClient;
