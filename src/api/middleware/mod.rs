//! API middleware.
//!
//! Only the request audit log runs today; it wraps every route.

pub mod audit;
