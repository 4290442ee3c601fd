use anyhow::Result;
use lectern_core::catalog;

use super::{open_invoker, print_json, Output};
use crate::config::Config;

pub fn show_stats(config: &Config, output: Output) -> Result<()> {
    let invoker = open_invoker(config)?;
    let stats = catalog::author_post_stats(&invoker)?;

    if output == Output::Json {
        return print_json(&stats);
    }

    if stats.is_empty() {
        println!("No authors yet. Add one with `lectern author add <NAME>`.");
        return Ok(());
    }

    println!(
        "{:<24} {:>6} {:>10} {:>10}  {}",
        "AUTHOR", "POSTS", "VIEWS", "AVG", "LAST PUBLISHED"
    );
    for row in &stats {
        println!(
            "{:<24} {:>6} {:>10} {:>10.2}  {}",
            row.author_name,
            row.total_posts,
            row.total_views,
            row.avg_views_per_post,
            row.last_published_at
                .map_or_else(|| String::from("-"), |at| at.format("%Y-%m-%d").to_string()),
        );
    }
    Ok(())
}

pub fn show_popular(config: &Config, author: &str, output: Output) -> Result<()> {
    let invoker = open_invoker(config)?;
    let post = catalog::most_popular_post(&invoker, author)?;

    if output == Output::Json {
        return print_json(&post);
    }

    match post {
        Some(post) => {
            println!("{} ({} views)", post.title, post.views);
            println!("  by {}", post.author_name);
            if let Some(at) = post.published_at {
                println!("  published {}", at.to_rfc3339());
            }
            if let Some(summary) = post.summary {
                println!("\n  {summary}");
            }
        }
        None => println!("No posts found for {author:?}"),
    }
    Ok(())
}
