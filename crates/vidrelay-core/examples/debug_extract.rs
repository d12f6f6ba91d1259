//! Debug script to see what each extraction rule finds on a page
//!
//! Run with: cargo run --example debug_extract -p vidrelay-core -- <page-url>

use vidrelay_core::parser::{EXTRACTION_RULES, parse_media};
use vidrelay_core::{MediaClient, Result, VidrelayError};

#[tokio::main]
async fn main() -> Result<()> {
    let Some(page) = std::env::args().nth(1) else {
        eprintln!("usage: debug_extract <page-url>");
        return Ok(());
    };
    let page = url::Url::parse(&page).map_err(|e| VidrelayError::invalid_input(e.to_string()))?;

    let client = MediaClient::new()?;
    println!("Fetching {}...\n", page);
    let html = client.fetch_page(&page).await?;
    println!("Got {} bytes of HTML\n", html.len());

    for rule in EXTRACTION_RULES {
        let hits = (rule.scan)(&html);
        println!("=== {} ({} hits) ===", rule.name, hits.len());
        for hit in hits {
            println!("  {}", hit);
        }
    }

    match parse_media(&html) {
        Ok(result) => {
            println!("\nSelected ({:?}): {}", result.kind, result.selected);
            println!("mp4:  {:?}", result.found.mp4);
            println!("m3u8: {:?}", result.found.m3u8);
        }
        Err(e) => println!("\n{}", e),
    }

    Ok(())
}
