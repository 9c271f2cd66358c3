use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::{
    error::{PipelineError, PipelineResult},
    models::{Behaviour, Event},
};

/// Reads the raw event log
///
/// The file is headerless delimited text with columns in fixed order:
/// user, item, behaviour, hours. Extra trailing columns are ignored.
/// An empty or non-finite hours value is kept as `None` so the row can be
/// dropped later in the pipeline; anything else that is not a non-negative
/// number aborts the read.
pub fn read_events(path: &Path) -> PipelineResult<Vec<Event>> {
    let file = std::fs::File::open(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut events = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| PipelineError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        events.push(parse_record(&record, line)?);
    }

    tracing::info!(path = %path.display(), events = events.len(), "Raw event log read");

    Ok(events)
}

fn parse_record(record: &csv::StringRecord, line: u64) -> PipelineResult<Event> {
    if record.len() < 4 {
        return Err(PipelineError::MalformedRow {
            line,
            reason: format!("expected at least 4 columns, found {}", record.len()),
        });
    }

    let hours =
        parse_hours(&record[3]).map_err(|reason| PipelineError::MalformedRow { line, reason })?;

    // User ids are numeric in the source data, so padding is not part of the
    // id; item names are display strings and stay verbatim.
    Ok(Event::new(
        record[0].trim(),
        &record[1],
        Behaviour::from_label(record[2].trim()),
        hours,
    ))
}

fn parse_hours(raw: &str) -> Result<Option<f64>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    let hours: f64 = raw
        .parse()
        .map_err(|_| format!("hours value {:?} is not a number", raw))?;

    if !hours.is_finite() {
        return Ok(None);
    }
    if hours < 0.0 {
        return Err(format!("hours value {} is negative", hours));
    }

    Ok(Some(hours))
}

/// Item × user matrix of normalized play-time ratings
///
/// Storage is sparse per item; any (item, user) pair without a rating reads
/// as 0.0. Rows follow the order in which items first appear in the raw log,
/// columns the order in which users first appear among retained ratings.
#[derive(Debug, Clone, Default)]
pub struct RatingMatrix {
    items: Vec<String>,
    users: Vec<String>,
    item_index: HashMap<String, usize>,
    user_index: HashMap<String, usize>,
    /// Per item row: (user column, rating), in column order of insertion
    rows: Vec<Vec<(usize, f64)>>,
}

impl RatingMatrix {
    /// Builds the matrix from raw events
    ///
    /// 1. keep only play events
    /// 2. sum each user's hours over all their play events
    /// 3. rating = hours / user total
    /// 4. keep the first event per (user, item), discard later ones
    /// 5. drop ratings that are undefined (missing hours or zero total)
    /// 6. pivot into item rows
    pub fn from_events(events: &[Event]) -> Self {
        let plays: Vec<&Event> = events.iter().filter(|event| event.is_play()).collect();

        let mut totals: HashMap<&str, f64> = HashMap::new();
        for event in &plays {
            let total = totals.entry(event.user_id.as_str()).or_insert(0.0);
            if let Some(hours) = event.hours {
                *total += hours;
            }
        }

        let mut seen: HashSet<(&str, &str)> = HashSet::new();
        let mut duplicates = 0usize;
        let mut undefined = 0usize;
        let mut ratings: Vec<(&str, &str, f64)> = Vec::with_capacity(plays.len());

        for event in &plays {
            if !seen.insert((event.user_id.as_str(), event.item_id.as_str())) {
                duplicates += 1;
                continue;
            }

            let total = totals.get(event.user_id.as_str()).copied().unwrap_or(0.0);
            match event.hours.map(|hours| hours / total) {
                Some(rating) if rating.is_finite() => {
                    ratings.push((event.user_id.as_str(), event.item_id.as_str(), rating))
                }
                _ => undefined += 1,
            }
        }

        // Rows are laid out by first appearance across the whole log so the
        // similarity table shares the catalog's ordering.
        let mut first_seen: HashMap<&str, usize> = HashMap::new();
        for event in events {
            let next = first_seen.len();
            first_seen.entry(event.item_id.as_str()).or_insert(next);
        }
        let mut rated_items: Vec<&str> = ratings
            .iter()
            .map(|(_, item, _)| *item)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        rated_items.sort_by_key(|item| first_seen[item]);

        let item_index: HashMap<&str, usize> = rated_items
            .iter()
            .enumerate()
            .map(|(idx, item)| (*item, idx))
            .collect();

        let mut users: Vec<String> = Vec::new();
        let mut user_index: HashMap<&str, usize> = HashMap::new();
        let mut rows: Vec<Vec<(usize, f64)>> = vec![Vec::new(); rated_items.len()];

        for (user, item, rating) in &ratings {
            let column = *user_index.entry(*user).or_insert_with(|| {
                users.push(user.to_string());
                users.len() - 1
            });
            rows[item_index[item]].push((column, *rating));
        }

        tracing::info!(
            events = events.len(),
            play_events = plays.len(),
            duplicates,
            undefined,
            items = rated_items.len(),
            users = users.len(),
            ratings = ratings.len(),
            "Rating matrix built"
        );

        Self {
            item_index: item_index
                .into_iter()
                .map(|(item, idx)| (item.to_string(), idx))
                .collect(),
            user_index: user_index
                .into_iter()
                .map(|(user, idx)| (user.to_string(), idx))
                .collect(),
            items: rated_items.into_iter().map(str::to_string).collect(),
            users,
            rows,
        }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn users(&self) -> &[String] {
        &self.users
    }

    /// Number of item rows
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of stored (nonzero-or-explicit) ratings
    pub fn nnz(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Rating for an (item, user) pair, 0.0 when there was no interaction
    pub fn rating(&self, item_id: &str, user_id: &str) -> f64 {
        let Some(&row) = self.item_index.get(item_id) else {
            return 0.0;
        };
        let Some(&column) = self.user_index.get(user_id) else {
            return 0.0;
        };
        self.rows[row]
            .iter()
            .find(|(col, _)| *col == column)
            .map(|(_, rating)| *rating)
            .unwrap_or(0.0)
    }

    /// All retained ratings of one user, in item row order
    pub fn user_ratings(&self, user_id: &str) -> Vec<(String, f64)> {
        let Some(&column) = self.user_index.get(user_id) else {
            return Vec::new();
        };
        self.rows
            .iter()
            .zip(&self.items)
            .filter_map(|(row, item)| {
                row.iter()
                    .find(|(col, _)| *col == column)
                    .map(|(_, rating)| (item.clone(), *rating))
            })
            .collect()
    }

    /// Sparse row of one item by index: (user column, rating)
    pub(crate) fn row(&self, index: usize) -> &[(usize, f64)] {
        &self.rows[index]
    }
}
