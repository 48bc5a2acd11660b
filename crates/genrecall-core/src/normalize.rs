use crate::error::ResolveError;
use genrecall_models::MovieRecord;

/// Pieces of a ranked title such as `"Jean de Florette (1986) (France)"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleParts {
    pub short_title: String,
    pub year: String,
}

/// Start offset and contents of every `( ... )` group, left to right
fn paren_groups(raw: &str) -> Vec<(usize, &str)> {
    let mut groups = Vec::new();
    let mut open: Option<usize> = None;
    for (index, c) in raw.char_indices() {
        match c {
            '(' => open = Some(index),
            ')' => {
                if let Some(start) = open.take() {
                    groups.push((start, &raw[start + 1..index]));
                }
            }
            _ => {}
        }
    }
    groups
}

fn is_year(group: &str) -> bool {
    !group.is_empty() && group.chars().all(|c| c.is_ascii_digit())
}

/// Split a raw title on its last all-digit parenthesized group
pub fn split_title(raw: &str) -> Result<TitleParts, ResolveError> {
    let groups = paren_groups(raw);
    let year_index = groups
        .iter()
        .rposition(|(_, content)| is_year(content))
        .ok_or_else(|| ResolveError::MalformedTitle {
            title: raw.to_string(),
        })?;

    let (start, year) = groups[year_index];
    Ok(TitleParts {
        short_title: raw[..start].trim().to_string(),
        year: year.to_string(),
    })
}

/// Fill `year` and `short_title` from the raw title where they are missing
///
/// Annotations after the year are dropped; `flags` stays as it was.
pub fn normalize(mut record: MovieRecord) -> Result<MovieRecord, ResolveError> {
    if record.year.is_some() && record.short_title.is_some() {
        return Ok(record);
    }

    let parts = split_title(&record.title)?;
    if record.year.is_none() {
        record.year = Some(parts.year);
    }
    if record.short_title.is_none() {
        record.short_title = Some(parts.short_title);
    }
    Ok(record)
}
