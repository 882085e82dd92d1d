use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::aggregation::{distinct_values, str_column};
use crate::error::Result;
use crate::schema::survey;

/// Allowed Programs and Sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub programs: Vec<String>,
    pub sections: Vec<String>,
}

impl Selection {
    pub fn new<P, S>(programs: P, sections: S) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        Self {
            programs: programs.into_iter().map(Into::into).collect(),
            sections: sections.into_iter().map(Into::into).collect(),
        }
    }

    /// Every Program and Section present in `rows`, in first-seen order.
    /// Rows with a null Program or Section match no selection, this one
    /// included.
    pub fn all(rows: &DataFrame) -> Result<Self> {
        Ok(Self {
            programs: distinct_values(rows, survey::PROGRAM)?,
            sections: distinct_values(rows, survey::SECTION)?,
        })
    }
}

/// Rows whose Program and Section are both selected, in input order.
/// An empty list on either side selects nothing.
pub fn filter_responses(rows: &DataFrame, selection: &Selection) -> Result<DataFrame> {
    str_column(rows, survey::PROGRAM)?;
    str_column(rows, survey::SECTION)?;

    let programs = Series::new("programs".into(), selection.programs.as_slice());
    let sections = Series::new("sections".into(), selection.sections.as_slice());
    let filtered = rows
        .clone()
        .lazy()
        .filter(
            col(survey::PROGRAM)
                .is_in(lit(programs), false)
                .and(col(survey::SECTION).is_in(lit(sections), false)),
        )
        .collect()?;

    tracing::debug!(
        "Selection kept {} of {} responses ({} programs, {} sections)",
        filtered.height(),
        rows.height(),
        selection.programs.len(),
        selection.sections.len()
    );
    Ok(filtered)
}
