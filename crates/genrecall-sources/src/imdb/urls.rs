use crate::error::SourceError;
use reqwest::Url;

/// Title search URL, e.g. `https://www.imdb.com/find?ref=nv_sr_fn&q=Inception+%282010%29&s=tt`
pub fn search_url(base_url: &str, query: &str) -> Result<String, SourceError> {
    let mut url = parse_base(base_url)?
        .join("/find")
        .map_err(|e| SourceError::parse("search url", e))?;
    url.query_pairs_mut()
        .append_pair("ref", "nv_sr_fn")
        .append_pair("q", query)
        .append_pair("s", "tt");
    Ok(url.into())
}

/// Absolute detail page URL for a search result link, without tracking query or fragment
pub fn canonical_title_url(base_url: &str, href: &str) -> Result<String, SourceError> {
    let mut url = parse_base(base_url)?
        .join(href)
        .map_err(|e| SourceError::parse(format!("result link '{}'", href), e))?;
    url.set_query(None);
    url.set_fragment(None);
    Ok(url.into())
}

fn parse_base(base_url: &str) -> Result<Url, SourceError> {
    Url::parse(base_url).map_err(|e| SourceError::parse(format!("base url '{}'", base_url), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url_encodes_title() {
        let url = search_url("https://www.imdb.com", "Jean de Florette (1986)").unwrap();
        assert_eq!(
            url,
            "https://www.imdb.com/find?ref=nv_sr_fn&q=Jean+de+Florette+%281986%29&s=tt"
        );
    }

    #[test]
    fn test_canonical_title_url_drops_tracking() {
        let url = canonical_title_url("https://www.imdb.com", "/title/tt1375666/?ref_=fn_al_tt_1").unwrap();
        assert_eq!(url, "https://www.imdb.com/title/tt1375666/");
    }

    #[test]
    fn test_canonical_title_url_keeps_absolute_links() {
        let url = canonical_title_url("https://www.imdb.com", "http://localhost:9000/title/tt1/").unwrap();
        assert_eq!(url, "http://localhost:9000/title/tt1/");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            search_url("not a url", "x"),
            Err(SourceError::Parse { .. })
        ));
    }
}
