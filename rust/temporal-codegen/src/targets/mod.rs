//! Language targets.
//!
//! Only Go is generated today; the vocabulary and sink types keep the target
//! specifics out of the model and name resolver.

pub mod go;
