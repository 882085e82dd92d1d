use polars::prelude::*;
use serde::Serialize;

use crate::barriers::BarrierVocabulary;
use crate::error::{Result, SurveyError};

/// Name of the count column produced by group-by aggregations.
const COUNT: &str = "count";

// ── Result records ──────────────────────────────────────────────────────────

/// Count of one distinct value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frequency {
    pub value: String,
    pub count: u32,
}

/// Ordered (value, count) pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FrequencyTable {
    entries: Vec<Frequency>,
}

/// Most frequent value of a column in a row subset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopChoice {
    pub value: String,
    pub count: u32,
    pub pct: f64,
}

/// Rows matching a set of answers, out of all rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Share {
    pub count: u32,
    pub total: u32,
    pub pct: f64,
}

/// Two-dimensional count table keyed by (group, category).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Crosstab {
    pub groups: Vec<String>,
    pub categories: Vec<String>,
    pub counts: Vec<Vec<u32>>,
}

/// Row-normalized crosstab, each cell a percentage of its group's total.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PercentCrosstab {
    pub groups: Vec<String>,
    pub categories: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

// ── Arithmetic helpers ──────────────────────────────────────────────────────

/// `count / total * 100`, or 0 when there is nothing to divide by.
pub fn percent(count: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// ── Column access ───────────────────────────────────────────────────────────

pub(crate) fn str_column<'a>(df: &'a DataFrame, field: &str) -> Result<&'a StringChunked> {
    let column = df
        .column(field)
        .map_err(|_| SurveyError::ColumnNotFound(field.to_string()))?;
    Ok(column.str()?)
}

pub(crate) fn bool_column<'a>(df: &'a DataFrame, field: &str) -> Result<&'a BooleanChunked> {
    let column = df
        .column(field)
        .map_err(|_| SurveyError::ColumnNotFound(field.to_string()))?;
    Ok(column.bool()?)
}

/// Height of a frame as a count. Survey exports never approach `u32::MAX`.
pub(crate) fn row_count(df: &DataFrame) -> u32 {
    u32::try_from(df.height()).unwrap_or(u32::MAX)
}

// ── FrequencyTable ──────────────────────────────────────────────────────────

impl FrequencyTable {
    pub fn entries(&self) -> &[Frequency] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> u32 {
        self.entries.iter().map(|e| e.count).sum()
    }

    pub fn count(&self, value: &str) -> u32 {
        self.entries
            .iter()
            .find(|e| e.value == value)
            .map_or(0, |e| e.count)
    }

    /// First entry holding the maximum non-zero count.
    pub fn top(&self) -> Option<&Frequency> {
        let mut best: Option<&Frequency> = None;
        for entry in &self.entries {
            if entry.count > best.map_or(0, |b| b.count) {
                best = Some(entry);
            }
        }
        best
    }

    /// Entries with a non-zero count.
    pub fn non_zero(&self) -> impl Iterator<Item = &Frequency> {
        self.entries.iter().filter(|e| e.count > 0)
    }
}

impl FromIterator<(String, u32)> for FrequencyTable {
    fn from_iter<T: IntoIterator<Item = (String, u32)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(value, count)| Frequency { value, count })
                .collect(),
        }
    }
}

// ── Crosstab ────────────────────────────────────────────────────────────────

impl Crosstab {
    /// Build from a frame of `(group, value, count)` rows. Groups and
    /// categories are sorted lexicographically.
    fn from_counts(counts: &DataFrame, group_field: &str, value_field: &str) -> Result<Self> {
        let group_keys = str_column(counts, group_field)?;
        let value_keys = str_column(counts, value_field)?;
        let n = counts.column(COUNT)?.u32()?;

        let groups = sorted_unique(group_keys);
        let categories = sorted_unique(value_keys);
        let mut matrix = vec![vec![0u32; categories.len()]; groups.len()];
        for ((g, v), n) in group_keys
            .into_no_null_iter()
            .zip(value_keys.into_no_null_iter())
            .zip(n.into_no_null_iter())
        {
            let row = groups.binary_search_by(|k| k.as_str().cmp(g));
            let column = categories.binary_search_by(|k| k.as_str().cmp(v));
            if let (Ok(i), Ok(j)) = (row, column) {
                matrix[i][j] += n;
            }
        }

        Ok(Self {
            groups,
            categories,
            counts: matrix,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn group_index(&self, group: &str) -> Option<usize> {
        self.groups.iter().position(|g| g == group)
    }

    pub fn count(&self, group: &str, category: &str) -> u32 {
        let Some(g) = self.group_index(group) else {
            return 0;
        };
        self.categories
            .iter()
            .position(|c| c == category)
            .map_or(0, |c| self.counts[g][c])
    }

    /// Per-group totals (the "All" column).
    pub fn row_totals(&self) -> Vec<u32> {
        self.counts.iter().map(|row| row.iter().sum()).collect()
    }

    /// Per-category totals (the "All" row).
    pub fn column_totals(&self) -> Vec<u32> {
        (0..self.categories.len())
            .map(|c| self.counts.iter().map(|row| row[c]).sum())
            .collect()
    }

    pub fn grand_total(&self) -> u32 {
        self.counts.iter().flatten().sum()
    }

    /// Divide each cell by its group's total, scale to 100 and round to
    /// one decimal. A group whose total is zero yields zeros.
    pub fn percentages(&self) -> PercentCrosstab {
        let values = self
            .counts
            .iter()
            .map(|row| {
                let total: u32 = row.iter().sum();
                row.iter().map(|&n| round1(percent(n, total))).collect()
            })
            .collect();

        PercentCrosstab {
            groups: self.groups.clone(),
            categories: self.categories.clone(),
            values,
        }
    }

    /// Export as a frame: one row per group, one column per category, plus
    /// an `All` margin column and an `All` margin row.
    pub fn to_frame(&self, group_field: &str) -> Result<DataFrame> {
        let mut groups: Vec<&str> = self.groups.iter().map(String::as_str).collect();
        groups.push("All");

        let column_totals = self.column_totals();
        let mut columns: Vec<Column> = vec![Column::new(group_field.into(), &groups)];
        for (c, category) in self.categories.iter().enumerate() {
            let mut values: Vec<u32> = self.counts.iter().map(|row| row[c]).collect();
            values.push(column_totals[c]);
            columns.push(Column::new(category.as_str().into(), &values));
        }
        let mut totals = self.row_totals();
        totals.push(self.grand_total());
        columns.push(Column::new("All".into(), &totals));

        Ok(DataFrame::new(columns)?)
    }
}

impl PercentCrosstab {
    pub fn row(&self, group: &str) -> Option<&[f64]> {
        self.groups
            .iter()
            .position(|g| g == group)
            .map(|i| self.values[i].as_slice())
    }
}

// ── Aggregator ──────────────────────────────────────────────────────────────

fn sorted_unique(values: &StringChunked) -> Vec<String> {
    let mut keys: Vec<String> = values.into_no_null_iter().map(str::to_string).collect();
    keys.sort_unstable();
    keys.dedup();
    keys
}

fn count_descending() -> SortMultipleOptions {
    SortMultipleOptions::default()
        .with_order_descending(true)
        .with_maintain_order(true)
}

/// Count each distinct non-null value of `field`. Sorted by count
/// descending; values sharing a count keep the order they were first seen.
pub fn frequency_table(rows: &DataFrame, field: &str) -> Result<FrequencyTable> {
    str_column(rows, field)?;

    let counts = rows
        .clone()
        .lazy()
        .filter(col(field).is_not_null())
        .group_by_stable([col(field)])
        .agg([len().cast(DataType::UInt32).alias(COUNT)])
        .sort([COUNT], count_descending())
        .collect()?;

    let values = str_column(&counts, field)?;
    let n = counts.column(COUNT)?.u32()?;
    Ok(values
        .into_no_null_iter()
        .zip(n.into_no_null_iter())
        .map(|(value, count)| (value.to_string(), count))
        .collect())
}

/// Number of distinct non-null values of `field`.
pub fn distinct_count(rows: &DataFrame, field: &str) -> Result<usize> {
    str_column(rows, field)?;
    let values = rows.column(field)?.as_materialized_series().drop_nulls();
    Ok(values.n_unique()?)
}

/// Distinct non-null values of `field` in first-seen order.
pub fn distinct_values(rows: &DataFrame, field: &str) -> Result<Vec<String>> {
    str_column(rows, field)?;
    let unique = rows
        .column(field)?
        .as_materialized_series()
        .drop_nulls()
        .unique_stable()?;
    Ok(unique.str()?.into_no_null_iter().map(str::to_string).collect())
}

/// Cross-tabulate `value_field` against `group_field`. Rows with a null
/// in either column are left out.
pub fn grouped_crosstab(
    rows: &DataFrame,
    group_field: &str,
    value_field: &str,
) -> Result<Crosstab> {
    str_column(rows, group_field)?;
    str_column(rows, value_field)?;

    let counts = rows
        .clone()
        .lazy()
        .filter(
            col(group_field)
                .is_not_null()
                .and(col(value_field).is_not_null()),
        )
        .group_by_stable([col(group_field), col(value_field)])
        .agg([len().cast(DataType::UInt32).alias(COUNT)])
        .collect()?;

    Crosstab::from_counts(&counts, group_field, value_field)
}

/// Sum of each barrier indicator over `rows`, in vocabulary order.
pub fn barrier_frequency(
    rows: &DataFrame,
    vocabulary: &BarrierVocabulary,
) -> Result<FrequencyTable> {
    vocabulary
        .tokens()
        .iter()
        .map(|token| {
            let flags = bool_column(rows, &token.column)?;
            let count = flags.into_iter().filter(|f| *f == Some(true)).count();
            Ok((token.label.clone(), u32::try_from(count).unwrap_or(u32::MAX)))
        })
        .collect()
}

/// Barrier indicator sums per group. Every vocabulary token is a category,
/// including those with zero count.
pub fn barrier_crosstab(
    rows: &DataFrame,
    group_field: &str,
    vocabulary: &BarrierVocabulary,
) -> Result<Crosstab> {
    str_column(rows, group_field)?;
    let sums: Vec<Expr> = vocabulary
        .tokens()
        .iter()
        .map(|t| {
            col(t.column.as_str())
                .cast(DataType::UInt32)
                .sum()
                .cast(DataType::UInt32)
        })
        .collect();

    let by_group = rows
        .clone()
        .lazy()
        .filter(col(group_field).is_not_null())
        .group_by([col(group_field)])
        .agg(sums)
        .sort([group_field], SortMultipleOptions::default())
        .collect()?;

    let groups = str_column(&by_group, group_field)?
        .into_no_null_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    let mut counts = vec![Vec::with_capacity(vocabulary.len()); groups.len()];
    for token in vocabulary.tokens() {
        let sums = by_group.column(&token.column)?.u32()?;
        for (row, n) in counts.iter_mut().zip(sums.into_iter()) {
            row.push(n.unwrap_or(0));
        }
    }

    Ok(Crosstab {
        groups,
        categories: vocabulary.labels().map(str::to_string).collect(),
        counts,
    })
}

/// Most frequent value of `field`; ties go to the value seen first.
pub fn top_choice(rows: &DataFrame, field: &str) -> Result<Option<TopChoice>> {
    let table = frequency_table(rows, field)?;
    Ok(top_of(&table, row_count(rows)))
}

/// Top entry of a frequency table as a share of `total` rows.
pub fn top_of(table: &FrequencyTable, total: u32) -> Option<TopChoice> {
    table.top().map(|f| TopChoice {
        value: f.value.clone(),
        count: f.count,
        pct: percent(f.count, total),
    })
}

/// Rows whose `field` equals one of `answers`.
pub fn share(rows: &DataFrame, field: &str, answers: &[&str]) -> Result<Share> {
    str_column(rows, field)?;
    let answers = Series::new("answers".into(), answers);
    let matching = rows
        .clone()
        .lazy()
        .filter(col(field).is_in(lit(answers), false))
        .collect()?;

    let count = row_count(&matching);
    let total = row_count(rows);
    Ok(Share {
        count,
        total,
        pct: percent(count, total),
    })
}

/// Split `rows` by the values of `group_field`, sorted by group. Rows with
/// a null group are dropped.
pub fn partition_groups(rows: &DataFrame, group_field: &str) -> Result<Vec<(String, DataFrame)>> {
    str_column(rows, group_field)?;
    let keyed = rows
        .clone()
        .lazy()
        .filter(col(group_field).is_not_null())
        .collect()?;
    if keyed.height() == 0 {
        return Ok(Vec::new());
    }

    let mut groups = keyed
        .partition_by_stable([group_field], true)?
        .into_iter()
        .map(|part| {
            let key = str_column(&part, group_field)?
                .get(0)
                .unwrap_or_default()
                .to_string();
            Ok((key, part))
        })
        .collect::<Result<Vec<_>>>()?;
    groups.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(groups)
}
