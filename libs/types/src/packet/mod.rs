//! Signed-document packet shapes.
//!
//! `raw` mirrors the legacy XML tree exactly as the wire delivers it
//! (Cyrillic element names, single-or-list positions, three mutually
//! exclusive signer tags). `model` is the normalized flat description the
//! packet parser in `codec` produces from it.

pub mod model;
pub mod raw;
