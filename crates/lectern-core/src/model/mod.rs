pub mod author;
pub mod ids;
pub mod post;

pub use author::Author;
pub use ids::{AuthorId, PostId};
pub use post::Post;
