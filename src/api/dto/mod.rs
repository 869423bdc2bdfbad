//! Data Transfer Objects for REST request/response serialization.
//!
//! Reply payloads from the plant are passed through as raw JSON, so the
//! DTO surface is small: only the request side is typed.

pub mod command_dto;

pub use command_dto::*;
