//! # Server Module
//!
//! Binds a [`crate::Dispatcher`] to `may_minihttp`.
//!
//! - [`ParsedRequest`] / [`HandlerResponse`] are the transport-neutral request
//!   and response the pipeline works on
//! - [`FeatherService`] converts between them and the wire, catching panics
//! - [`HttpServer`] starts the listener and hands back a [`ServerHandle`]

pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle, MAX_REQUEST_HEADERS};
pub use request::{
    decode_path, parse_cookies, parse_query_params, parse_request, HeaderVec, ParsedRequest,
};
pub use response::{write_handler_response, HandlerResponse, MAX_HEADER_LINES};
pub use service::FeatherService;
