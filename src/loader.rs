use std::path::Path;

use polars::prelude::*;

use crate::aggregation::str_column;
use crate::barriers::{BarrierMatch, BarrierVocabulary};
use crate::error::{Result, SurveyError};
use crate::schema::{derived, survey};

/// The normalized survey table and its barrier vocabulary.
///
/// Built once from the full export; filters select rows from `frame` but
/// never touch the vocabulary.
#[derive(Debug, Clone)]
pub struct SurveyDataset {
    frame: DataFrame,
    vocabulary: BarrierVocabulary,
    matching: BarrierMatch,
}

impl SurveyDataset {
    /// Semantic columns, `Program_Section` and one `Barrier_*` flag column
    /// per vocabulary token.
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn vocabulary(&self) -> &BarrierVocabulary {
        &self.vocabulary
    }

    pub fn matching(&self) -> BarrierMatch {
        self.matching
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }
}

/// Load and normalize the survey export at `path`.
///
/// Fails with `DataFormat` if the file is missing or unreadable, or if it
/// does not have exactly the 14 survey columns.
pub fn load_survey(path: impl AsRef<Path>, matching: BarrierMatch) -> Result<SurveyDataset> {
    let path = path.as_ref();
    let raw = read_csv_as_strings(path)?;
    let dataset = normalize(raw, matching)?;
    tracing::info!(
        "Loaded {} survey responses from {} ({} distinct barriers)",
        dataset.height(),
        path.display(),
        dataset.vocabulary.len()
    );
    Ok(dataset)
}

/// Rename the positional columns, add `Program_Section` and explode
/// `Barriers` into indicator columns.
pub fn normalize(raw: DataFrame, matching: BarrierMatch) -> Result<SurveyDataset> {
    if raw.width() != survey::ALL.len() {
        return Err(SurveyError::DataFormat(format!(
            "expected {} columns, found {}",
            survey::ALL.len(),
            raw.width()
        )));
    }

    let mut df = raw;
    df.set_column_names(survey::ALL)?;

    let program_section = program_section_column(&df)?;
    let vocabulary = BarrierVocabulary::from_frame(&df)?;
    let indicators = vocabulary.indicator_columns(str_column(&df, survey::BARRIERS)?, matching);

    df.with_column(program_section)?;
    df.hstack_mut(&indicators)?;

    Ok(SurveyDataset {
        frame: df,
        vocabulary,
        matching,
    })
}

/// `"<Program> <Section>"`, null when either part is null.
fn program_section_column(df: &DataFrame) -> Result<Column> {
    let programs = str_column(df, survey::PROGRAM)?;
    let sections = str_column(df, survey::SECTION)?;
    let keys: Vec<Option<String>> = programs
        .into_iter()
        .zip(sections.into_iter())
        .map(|(p, s)| Some(format!("{} {}", p?, s?)))
        .collect();
    Ok(Column::new(derived::PROGRAM_SECTION.into(), &keys))
}

/// Read a CSV file with all columns as String dtype.
fn read_csv_as_strings(path: &Path) -> Result<DataFrame> {
    if !path.is_file() {
        return Err(SurveyError::DataFormat(format!(
            "survey export not found: {}",
            path.display()
        )));
    }

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0)) // all columns as String
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|e| {
            SurveyError::DataFormat(format!("unreadable survey export {}: {e}", path.display()))
        })
}
