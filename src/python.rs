use pyo3::prelude::*;
use pyo3::types::PyModule;
use pyo3_polars::PyDataFrame;

use crate::config::ReportConfig;
use crate::filter::Selection;
use crate::model::SurveyModel;
use crate::schema;

#[pyclass(name = "SurveyModel")]
pub struct PySurveyModel {
    inner: SurveyModel,
}

impl PySurveyModel {
    /// Explicit lists win; a missing side means "everything in the export".
    fn selection(
        &self,
        programs: Option<Vec<String>>,
        sections: Option<Vec<String>>,
    ) -> PyResult<Selection> {
        if let (Some(programs), Some(sections)) = (&programs, &sections) {
            return Ok(Selection::new(programs.clone(), sections.clone()));
        }
        let all = self.inner.full_selection()?;
        Ok(Selection::new(
            programs.unwrap_or(all.programs),
            sections.unwrap_or(all.sections),
        ))
    }
}

#[pymethods]
impl PySurveyModel {
    /// Create a model from a TOML config file, or from built-in defaults
    /// when no path is given.
    #[new]
    #[pyo3(signature = (config_path=None))]
    fn new(config_path: Option<&str>) -> PyResult<Self> {
        let inner = match config_path {
            Some(path) => SurveyModel::from_config_file(path)?,
            None => SurveyModel::new(ReportConfig::default()),
        };
        Ok(Self { inner })
    }

    // ── Session ─────────────────────────────────────────────────────────────

    fn login(&mut self, password: &str) -> PyResult<()> {
        Ok(self.inner.login(password)?)
    }

    fn logout(&mut self) {
        self.inner.logout();
    }

    fn is_authenticated(&self) -> bool {
        self.inner.is_authenticated()
    }

    // ── Data ────────────────────────────────────────────────────────────────

    fn programs(&self) -> PyResult<Vec<String>> {
        Ok(self.inner.full_selection()?.programs)
    }

    fn sections(&self) -> PyResult<Vec<String>> {
        Ok(self.inner.full_selection()?.sections)
    }

    fn barrier_vocabulary(&self) -> PyResult<Vec<String>> {
        Ok(self
            .inner
            .dataset()?
            .vocabulary()
            .labels()
            .map(str::to_string)
            .collect())
    }

    /// Normalized responses (with `Program_Section` and `Barrier_*` columns)
    /// for the selected Programs and Sections.
    #[pyo3(signature = (programs=None, sections=None))]
    fn responses(
        &self,
        programs: Option<Vec<String>>,
        sections: Option<Vec<String>>,
    ) -> PyResult<PyDataFrame> {
        let selection = self.selection(programs, sections)?;
        Ok(PyDataFrame(self.inner.responses(&selection)?))
    }

    /// Two columns: `value` and `count`, most frequent first.
    #[pyo3(signature = (field, programs=None, sections=None))]
    fn frequency_table(
        &self,
        field: &str,
        programs: Option<Vec<String>>,
        sections: Option<Vec<String>>,
    ) -> PyResult<PyDataFrame> {
        let selection = self.selection(programs, sections)?;
        let table = self.inner.frequency_table(&selection, field)?;
        Ok(PyDataFrame(frequency_frame(&table)?))
    }

    #[pyo3(signature = (programs=None, sections=None))]
    fn barrier_frequency(
        &self,
        programs: Option<Vec<String>>,
        sections: Option<Vec<String>>,
    ) -> PyResult<PyDataFrame> {
        let selection = self.selection(programs, sections)?;
        let table = self.inner.barrier_frequency(&selection)?;
        Ok(PyDataFrame(frequency_frame(&table)?))
    }

    /// Counts of `field` per Program-Section with `All` margins.
    #[pyo3(signature = (field, programs=None, sections=None))]
    fn crosstab(
        &self,
        field: &str,
        programs: Option<Vec<String>>,
        sections: Option<Vec<String>>,
    ) -> PyResult<PyDataFrame> {
        let selection = self.selection(programs, sections)?;
        let ct = self.inner.crosstab(&selection, field)?;
        Ok(PyDataFrame(ct.to_frame(schema::derived::PROGRAM_SECTION)?))
    }

    #[pyo3(signature = (programs=None, sections=None))]
    fn report_json(
        &self,
        programs: Option<Vec<String>>,
        sections: Option<Vec<String>>,
    ) -> PyResult<String> {
        let selection = self.selection(programs, sections)?;
        Ok(self.inner.report_json(&selection)?)
    }

    /// Self-contained HTML report, suitable for `IPython.display.HTML`.
    #[pyo3(signature = (programs=None, sections=None))]
    fn report_html(
        &self,
        programs: Option<Vec<String>>,
        sections: Option<Vec<String>>,
    ) -> PyResult<String> {
        let selection = self.selection(programs, sections)?;
        Ok(self.inner.report_html(&selection)?)
    }
}

fn frequency_frame(
    table: &crate::aggregation::FrequencyTable,
) -> crate::error::Result<polars::prelude::DataFrame> {
    use polars::prelude::*;

    let values: Vec<&str> = table.entries().iter().map(|e| e.value.as_str()).collect();
    let counts: Vec<u32> = table.entries().iter().map(|e| e.count).collect();
    Ok(DataFrame::new(vec![
        Column::new("value".into(), values),
        Column::new("count".into(), counts),
    ])?)
}

/// Export schema constants as Python submodules
fn add_schema_exports(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Survey columns
    let survey = PyModule::new(m.py(), "survey")?;
    for name in schema::survey::ALL {
        survey.add(name.to_uppercase(), name)?;
    }
    m.add_submodule(&survey)?;

    // Derived
    let derived = PyModule::new(m.py(), "derived")?;
    derived.add("PROGRAM_SECTION", schema::derived::PROGRAM_SECTION)?;
    derived.add("BARRIER_PREFIX", schema::derived::BARRIER_PREFIX)?;
    m.add_submodule(&derived)?;

    Ok(())
}

#[pymodule]
fn survey_report(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PySurveyModel>()?;
    add_schema_exports(m)?;
    Ok(())
}
