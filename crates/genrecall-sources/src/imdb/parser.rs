use crate::error::SourceError;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

const SECTION_SELECTOR: &str = "div.findSection";
const SECTION_HEADER_SELECTOR: &str = ".findSectionHeader";
const RESULT_ROW_SELECTOR: &str = "table.findList > tbody > tr.findResult > td.result_text";
const STORY_LINE_SELECTOR: &str = "#titleStoryLine > div";
const LINK_SELECTOR: &str = "a";

/// One row of the title search results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// Text of the result link
    pub short_title: String,
    /// Whole cell text, link plus year and other annotations
    pub found_title: String,
    /// Link target, usually relative to the site root
    pub href: String,
}

fn selector(css: &str) -> Result<Selector, SourceError> {
    Selector::parse(css).map_err(|e| SourceError::parse(format!("selector '{}'", css), e))
}

fn text_of(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

/// Parse a title search page
///
/// Exactly one results section must carry `section_label` as its header,
/// otherwise the layout changed or the search found nothing.
pub fn parse_search_results(html: &str, section_label: &str) -> Result<Vec<SearchResult>, SourceError> {
    let document = Html::parse_document(html);
    let section_selector = selector(SECTION_SELECTOR)?;
    let header_selector = selector(SECTION_HEADER_SELECTOR)?;
    let row_selector = selector(RESULT_ROW_SELECTOR)?;
    let link_selector = selector(LINK_SELECTOR)?;

    let sections: Vec<ElementRef<'_>> = document
        .select(&section_selector)
        .filter(|section| {
            section
                .select(&header_selector)
                .next()
                .map(|header| text_of(&header).trim() == section_label)
                .unwrap_or(false)
        })
        .collect();

    if sections.len() != 1 {
        return Err(SourceError::SectionCount {
            section: section_label.to_string(),
            found: sections.len(),
        });
    }

    let mut results = Vec::new();
    for cell in sections[0].select(&row_selector) {
        let Some(link) = cell.select(&link_selector).next() else {
            debug!("Skipping result row without a link");
            continue;
        };
        let Some(href) = link.value().attr("href") else {
            debug!("Skipping result row whose link has no href");
            continue;
        };

        results.push(SearchResult {
            short_title: text_of(&link),
            found_title: text_of(&cell).trim().to_string(),
            href: href.to_string(),
        });
    }

    debug!("Parsed {} result rows from '{}' section", results.len(), section_label);
    Ok(results)
}

/// Parse the genre links of a title detail page, in document order
pub fn parse_genres(html: &str) -> Result<Vec<String>, SourceError> {
    let document = Html::parse_document(html);
    let story_line_selector = selector(STORY_LINE_SELECTOR)?;
    let link_selector = selector(LINK_SELECTOR)?;

    let blocks: Vec<ElementRef<'_>> = document
        .select(&story_line_selector)
        .filter(|div| div.value().attr("itemprop") == Some("genre"))
        .collect();

    if blocks.len() != 1 {
        return Err(SourceError::SectionCount {
            section: "genre".to_string(),
            found: blocks.len(),
        });
    }

    Ok(blocks[0]
        .select(&link_selector)
        .map(|link| text_of(&link).trim().to_string())
        .collect())
}
