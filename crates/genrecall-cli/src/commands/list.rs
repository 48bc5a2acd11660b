use crate::output::{Output, OutputFormat};
use color_eyre::Result;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use genrecall_config::PathManager;
use genrecall_core::MovieCache;
use genrecall_models::MovieRecord;
use serde_json::json;

pub fn run_list(paths: &PathManager, genre: Option<&str>, output: &Output) -> Result<()> {
    let cache = MovieCache::load(&paths.cache_file());
    if cache.is_empty() {
        output.info(format!("No cached titles in {}", cache.path().display()));
        return Ok(());
    }

    let records = select(&cache, genre);
    tracing::debug!("Listing {} of {} cached titles", records.len(), cache.len());

    match output.format() {
        OutputFormat::Human => {
            if records.is_empty() {
                output.info(format!("No cached titles tagged {}", genre.unwrap_or_default()));
                return Ok(());
            }
            output.println(render_table(&records).to_string());
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!(records));
        }
    }
    Ok(())
}

/// Cached records in rank order, narrowed to one genre when asked
fn select<'a>(cache: &'a MovieCache, genre: Option<&str>) -> Vec<&'a MovieRecord> {
    cache
        .ranked()
        .into_iter()
        .filter(|record| genre.map(|g| record.has_genre(g)).unwrap_or(true))
        .collect()
}

fn render_table(records: &[&MovieRecord]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Rank", "Title", "Catalog id", "Genres"]);

    for record in records {
        let title = match &record.found_title {
            Some(found) if record.is_mismatch() => Cell::new(format!("{}\n-> {}", record.title, found)).fg(Color::Yellow),
            _ => Cell::new(&record.title),
        };
        let genres = match &record.genres {
            Some(genres) if genres.is_empty() => Cell::new("(none)").fg(Color::DarkGrey),
            Some(genres) => Cell::new(genres.join(", ")),
            None => Cell::new("-").fg(Color::DarkGrey),
        };
        table.add_row(vec![
            Cell::new(record.rank),
            title,
            Cell::new(record.catalog_id.as_deref().unwrap_or("-")),
            genres,
        ]);
    }
    table
}
