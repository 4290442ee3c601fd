//! Vector search for lectern.
//!
//! Stores post embeddings next to the posts and ranks them by cosine
//! distance. The distance itself is computed inside SQLite by the
//! `vec_distance_cosine` function registered in [`functions`].

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod embedding;
pub mod error;
pub mod functions;
pub mod search;

pub use error::{SearchError, SearchResult};
pub use search::{SimilarPost, VectorSearch};
