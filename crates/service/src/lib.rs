//! Service layer for mysqlc
//!
//! Ties the classifier, history store, schema cache, translator and
//! connection manager into one interactive session.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(missing_debug_implementations, reason = "Internal types")]

mod error;
mod session;


pub use error::ServiceError;
pub use session::{Session, SessionEvent};
