use anyhow::{Context, Result};
use lectern_core::model::PostId;
use lectern_search::VectorSearch;

use super::{open_database, print_json, Output};
use crate::config::Config;

/// Parse "0.1, 0.2,0.3" into a vector.
pub fn parse_vector(input: &str) -> Result<Vec<f32>> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f32>()
                .with_context(|| format!("Invalid vector component: {s:?}"))
        })
        .collect()
}

pub fn search(config: &Config, vector: &str, limit: usize, output: Output) -> Result<()> {
    let query = parse_vector(vector)?;
    let db = open_database(config)?;
    let search = VectorSearch::new(&db)?;
    let hits = search.search_similar(&query, limit)?;

    if output == Output::Json {
        return print_json(&hits);
    }

    if hits.is_empty() {
        println!("No posts with {}-dimensional embeddings", query.len());
        return Ok(());
    }
    for hit in &hits {
        println!("{:.4}  {}  {}", hit.distance, hit.post_id, hit.title);
    }
    Ok(())
}

pub fn embed(config: &Config, post_id: &str, vector: &str) -> Result<()> {
    let post_id: PostId = post_id
        .parse()
        .with_context(|| format!("Invalid post id: {post_id}"))?;
    let vector = parse_vector(vector)?;

    let db = open_database(config)?;
    VectorSearch::new(&db)?.upsert_embedding(post_id, &vector)?;
    println!("Stored {}-dimensional embedding for {post_id}", vector.len());
    Ok(())
}
