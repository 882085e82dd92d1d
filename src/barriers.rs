//! Multi-select "Barriers" field: tokenization, vocabulary and one-hot
//! indicator columns.

use std::collections::{BTreeSet, HashSet};

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SurveyError};
use crate::schema::{derived, survey};

pub const DELIMITER: char = ';';

/// How a vocabulary token is matched against a response's raw field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarrierMatch {
    /// Token occurs anywhere in the raw value. A token that is a substring of
    /// another label ("Cost" in "Cost of Living") also matches that label.
    #[default]
    Substring,
    /// Token equals one of the trimmed entries of the raw value.
    Exact,
}

/// One distinct barrier and the indicator column that carries it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BarrierToken {
    pub label: String,
    pub column: String,
}

/// Distinct barrier tokens observed across the full, unfiltered dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BarrierVocabulary {
    tokens: Vec<BarrierToken>,
}

/// Split a raw field on `;`, trim each piece and drop the empty ones.
pub fn tokenize(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(DELIMITER).map(str::trim).filter(|piece| {
        if piece.is_empty() {
            tracing::trace!("skipping empty barrier fragment");
        }
        !piece.is_empty()
    })
}

/// Indicator column name for a token: `/` and spaces become underscores.
pub fn column_name(label: &str) -> String {
    format!(
        "{}{}",
        derived::BARRIER_PREFIX,
        label.replace('/', "_").replace(' ', "_")
    )
}

impl BarrierVocabulary {
    /// Collect the vocabulary from raw `Barriers` values. Nulls contribute
    /// nothing. Tokens are kept sorted so the column layout is stable.
    pub fn from_values<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let labels: BTreeSet<&str> = values.into_iter().flatten().flat_map(tokenize).collect();

        let mut used: HashSet<String> = HashSet::new();
        let tokens = labels
            .into_iter()
            .map(|label| {
                let base = column_name(label);
                let mut column = base.clone();
                let mut n = 2;
                while !used.insert(column.clone()) {
                    column = format!("{base}_{n}");
                    n += 1;
                }
                BarrierToken {
                    label: label.to_string(),
                    column,
                }
            })
            .collect();

        Self { tokens }
    }

    /// Build the vocabulary from the `Barriers` column of a frame.
    pub fn from_frame(df: &DataFrame) -> Result<Self> {
        let raw = df
            .column(survey::BARRIERS)
            .map_err(|_| SurveyError::ColumnNotFound(survey::BARRIERS.to_string()))?
            .str()?;
        Ok(Self::from_values(raw.into_iter()))
    }

    pub fn tokens(&self) -> &[BarrierToken] {
        &self.tokens
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(|t| t.label.as_str())
    }

    pub fn get(&self, label: &str) -> Option<&BarrierToken> {
        self.tokens.iter().find(|t| t.label == label)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// One indicator column per token for the given raw values.
    pub fn indicator_columns(&self, raw: &StringChunked, mode: BarrierMatch) -> Vec<Column> {
        let split: Vec<Option<Vec<&str>>> = match mode {
            BarrierMatch::Substring => Vec::new(),
            BarrierMatch::Exact => raw
                .into_iter()
                .map(|v| v.map(|s| tokenize(s).collect()))
                .collect(),
        };

        self.tokens
            .iter()
            .map(|token| {
                let flags: Vec<bool> = match mode {
                    BarrierMatch::Substring => raw
                        .into_iter()
                        .map(|v| v.is_some_and(|s| s.contains(token.label.as_str())))
                        .collect(),
                    BarrierMatch::Exact => split
                        .iter()
                        .map(|entries| {
                            entries
                                .as_ref()
                                .is_some_and(|e| e.contains(&token.label.as_str()))
                        })
                        .collect(),
                };
                Column::new(token.column.as_str().into(), flags)
            })
            .collect()
    }
}
