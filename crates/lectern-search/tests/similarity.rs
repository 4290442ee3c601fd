//! Vector search against an on-disk database.

use lectern_core::model::{Author, Post, PostId};
use lectern_core::schema::Database;
use lectern_search::{SearchError, VectorSearch};
use tempfile::TempDir;

struct Fixture {
    db: Database,
    posts: Vec<PostId>,
    _dir: TempDir,
}

fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let db = Database::open(dir.path().join("lectern.db")).unwrap();

    let author = Author::new("Ada");
    db.insert_author(&author).unwrap();

    let mut posts = Vec::new();
    for title in ["Engines", "Looms", "Poetry", "Flat"] {
        let post = Post::new(author.id, title, "...");
        db.insert_post(&post).unwrap();
        posts.push(post.id);
    }

    Fixture {
        db,
        posts,
        _dir: dir,
    }
}

#[test]
fn test_search_orders_by_distance() {
    let f = fixture();
    let search = VectorSearch::new(&f.db).unwrap();

    search.upsert_embedding(f.posts[0], &[1.0, 0.0, 0.0]).unwrap();
    search.upsert_embedding(f.posts[1], &[0.8, 0.6, 0.0]).unwrap();
    search.upsert_embedding(f.posts[2], &[0.0, 0.0, 1.0]).unwrap();
    // Different dimension: never a candidate
    search.upsert_embedding(f.posts[3], &[1.0, 0.0]).unwrap();

    let hits = search.search_similar(&[1.0, 0.0, 0.0], 10).unwrap();
    let titles: Vec<&str> = hits.iter().map(|h| h.title.as_str()).collect();
    assert_eq!(titles, vec!["Engines", "Looms", "Poetry"]);

    assert!(hits[0].distance.abs() < 1e-6);
    assert!((hits[1].distance - 0.2).abs() < 1e-6);
    assert!((hits[2].distance - 1.0).abs() < 1e-6);
}

#[test]
fn test_search_limit() {
    let f = fixture();
    let search = VectorSearch::new(&f.db).unwrap();
    search.upsert_embedding(f.posts[0], &[1.0, 0.0]).unwrap();
    search.upsert_embedding(f.posts[1], &[0.0, 1.0]).unwrap();

    assert_eq!(search.search_similar(&[1.0, 0.0], 1).unwrap().len(), 1);
    assert!(search.search_similar(&[1.0, 0.0], 0).unwrap().is_empty());
}

#[test]
fn test_zero_norm_embedding_is_skipped() {
    let f = fixture();
    let search = VectorSearch::new(&f.db).unwrap();
    search.upsert_embedding(f.posts[0], &[0.0, 0.0]).unwrap();
    search.upsert_embedding(f.posts[1], &[0.0, 1.0]).unwrap();

    let hits = search.search_similar(&[0.0, 1.0], 10).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].post_id, f.posts[1]);
}

#[test]
fn test_upsert_replaces_embedding() {
    let f = fixture();
    let search = VectorSearch::new(&f.db).unwrap();

    search.upsert_embedding(f.posts[0], &[1.0, 0.0]).unwrap();
    search.upsert_embedding(f.posts[0], &[0.0, 1.0, 0.5]).unwrap();

    assert_eq!(search.embedding(f.posts[0]).unwrap(), Some(vec![0.0, 1.0, 0.5]));
    assert_eq!(search.embedding(f.posts[1]).unwrap(), None);
}

#[test]
fn test_invalid_vectors_rejected() {
    let f = fixture();
    let search = VectorSearch::new(&f.db).unwrap();

    assert!(matches!(
        search.upsert_embedding(f.posts[0], &[]),
        Err(SearchError::InvalidVector(_))
    ));
    assert!(matches!(
        search.search_similar(&[f32::INFINITY], 5),
        Err(SearchError::InvalidVector(_))
    ));
}

#[test]
fn test_embedding_for_unknown_post_fails() {
    let f = fixture();
    let search = VectorSearch::new(&f.db).unwrap();
    let missing = PostId::new();
    assert!(matches!(
        search.upsert_embedding(missing, &[1.0]),
        Err(SearchError::UnknownPost(id)) if id == missing
    ));
    assert_eq!(search.embedding(missing).unwrap(), None);
}
