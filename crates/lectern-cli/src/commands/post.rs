use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use lectern_core::model::{Author, Post};

use super::{open_database, print_json, Output};
use crate::config::Config;

/// Arguments of `lectern post add`.
#[derive(Debug)]
pub struct NewPost {
    pub author: String,
    pub title: String,
    pub body: String,
    pub summary: Option<String>,
    pub views: u64,
    pub published: Option<String>,
}

/// Accepts RFC 3339 or the literal "now".
pub fn parse_published(input: &str) -> Result<DateTime<Utc>> {
    if input.eq_ignore_ascii_case("now") {
        return Ok(Utc::now());
    }
    let at = DateTime::parse_from_rfc3339(input)
        .with_context(|| format!("Invalid publication time (expected RFC 3339): {input}"))?;
    Ok(at.with_timezone(&Utc))
}

pub fn add_author(config: &Config, name: String, bio: Option<String>) -> Result<()> {
    let db = open_database(config)?;
    let mut author = Author::new(name);
    if let Some(bio) = bio {
        author = author.with_bio(bio);
    }
    db.insert_author(&author)
        .with_context(|| format!("Failed to add author {:?}", author.name))?;
    println!("Added author {} ({})", author.name, author.id);
    Ok(())
}

pub fn list_authors(config: &Config, output: Output) -> Result<()> {
    let db = open_database(config)?;
    let authors = db.list_authors()?;
    if output == Output::Json {
        return print_json(&authors);
    }
    for author in &authors {
        println!("{}  {}", author.id, author.name);
    }
    Ok(())
}

pub fn add_post(config: &Config, new: &NewPost) -> Result<()> {
    let db = open_database(config)?;
    let author = db
        .find_author_by_name(&new.author)?
        .with_context(|| format!("No author named {:?}", new.author))?;

    let mut post = Post::new(author.id, new.title.clone(), new.body.clone()).with_views(new.views);
    if let Some(summary) = &new.summary {
        post = post.with_summary(summary.clone());
    }
    if let Some(published) = &new.published {
        post = post.published(parse_published(published)?);
    }

    db.insert_post(&post)?;
    println!("Added post {} ({})", post.title, post.id);
    Ok(())
}

pub fn list_posts(config: &Config, author: &str, output: Output) -> Result<()> {
    let db = open_database(config)?;
    let author = db
        .find_author_by_name(author)?
        .with_context(|| format!("No author named {author:?}"))?;
    let posts = db.list_posts_by_author(author.id)?;

    if output == Output::Json {
        return print_json(&posts);
    }
    for post in &posts {
        let status = post
            .published_at
            .map_or_else(|| String::from("draft"), |at| at.format("%Y-%m-%d").to_string());
        println!("{}  {:>8} views  {:<10}  {}", post.id, post.views, status, post.title);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_published() {
        let at = parse_published("2024-03-01T12:00:00+02:00").unwrap();
        assert_eq!(at.to_rfc3339(), "2024-03-01T10:00:00+00:00");
        assert!(parse_published("now").is_ok());
        assert!(parse_published("yesterday").is_err());
    }
}
