//! Client data layer.
//!
//! [`ApiClient::fetch`] is the single request helper; the typed namespaces
//! map one domain operation onto one call with a fixed endpoint template.

mod error;
mod fetch;
mod messages;
mod models;
mod rooms;
mod streams;
mod users;

use std::borrow::Cow;

pub use error::{ClientError, ClientResult};
pub use fetch::{ApiClient, RequestOptions, decode_envelope};
pub use messages::MessageApi;
pub use models::{
    Credentials, Id, Message, NewRoom, NewStream, OutgoingMessage, ProfileUpdate, Registration,
    Room, Stream, UserProfile,
};
pub use rooms::RoomsApi;
pub use streams::StreamApi;
pub use users::UserApi;

/// Percent-encode a value interpolated into an endpoint path.
fn segment(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}
