//! Core request, response and entity types.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`QuipRequest`] | Reusable request descriptor (method, URL, query, body) |
//! | [`RequestBody`] | Form pairs, multipart parts, or nothing |
//! | [`QuipResponse`] | Status, headers and body of one exchange |
//! | [`Outcome`] | Decoded value or a server-reported error envelope |
//! | [`ErrorEnvelope`] | `{error, error_code, error_description}` |
//! | [`Thread`], [`Message`], [`User`] | Thin typed views over decoded JSON |

mod entity;
mod outcome;
mod request;
mod response;

pub use entity::{Message, Thread, ThreadType, User};
pub use outcome::{ErrorEnvelope, Outcome};
pub use request::{MultipartPart, QuipRequest, RequestBody};
pub use response::QuipResponse;
