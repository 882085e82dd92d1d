use std::path::Path;

use polars::prelude::DataFrame;

use crate::aggregation::{self, Crosstab, FrequencyTable};
use crate::cache::DatasetCache;
use crate::config::ReportConfig;
use crate::error::Result;
use crate::filter::{filter_responses, Selection};
use crate::loader::SurveyDataset;
use crate::report::{build_report, SurveyReport};
use crate::schema::derived;
use crate::session::{AccessGate, Session};
use crate::visualization;

/// One viewer's handle on the survey: configuration, the cached dataset and
/// the session that must be unlocked before any data is returned.
#[derive(Debug)]
pub struct SurveyModel {
    config: ReportConfig,
    gate: AccessGate,
    session: Session,
    cache: DatasetCache,
}

impl SurveyModel {
    pub fn new(config: ReportConfig) -> Self {
        Self {
            gate: AccessGate::new(config.access_secret.clone()),
            cache: DatasetCache::from_config(&config),
            session: Session::new(),
            config,
        }
    }

    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(ReportConfig::from_file(path)?))
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    // ── Session ─────────────────────────────────────────────────────────────

    pub fn login(&mut self, attempt: &str) -> Result<()> {
        self.session.login(&self.gate, attempt)
    }

    pub fn logout(&mut self) {
        self.session.logout();
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    // ── Data access ─────────────────────────────────────────────────────────

    /// The loaded dataset, reading the export on first use.
    pub fn dataset(&self) -> Result<&SurveyDataset> {
        self.session.require()?;
        self.cache.get_dataset()
    }

    /// Every Program and Section in the export.
    pub fn full_selection(&self) -> Result<Selection> {
        Selection::all(self.dataset()?.frame())
    }

    pub fn responses(&self, selection: &Selection) -> Result<DataFrame> {
        filter_responses(self.dataset()?.frame(), selection)
    }

    pub fn frequency_table(&self, selection: &Selection, field: &str) -> Result<FrequencyTable> {
        aggregation::frequency_table(&self.responses(selection)?, field)
    }

    /// `field` against Program-Section over the selected rows.
    pub fn crosstab(&self, selection: &Selection, field: &str) -> Result<Crosstab> {
        aggregation::grouped_crosstab(&self.responses(selection)?, derived::PROGRAM_SECTION, field)
    }

    pub fn barrier_frequency(&self, selection: &Selection) -> Result<FrequencyTable> {
        let dataset = self.dataset()?;
        let rows = filter_responses(dataset.frame(), selection)?;
        aggregation::barrier_frequency(&rows, dataset.vocabulary())
    }

    pub fn report(&self, selection: &Selection) -> Result<SurveyReport> {
        build_report(self.dataset()?, selection, &self.config)
    }

    pub fn report_json(&self, selection: &Selection) -> Result<String> {
        self.report(selection)?.to_json()
    }

    pub fn report_html(&self, selection: &Selection) -> Result<String> {
        visualization::render_report_html(&self.report(selection)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SurveyError;
    use crate::schema::survey;

    const CSV: &str = "\
ts,name,email,program,section,loc,afford,factor,vote,ns,will,barriers,comments,package
09/01/2025 08:15:00,Ana,ana@x,BSIT,A,Manila,Expensive,Cost,Disagree,Yes,\"Yes, definitely\",Cost; Time,,Basic
09/01/2025 09:00:00,Ben,ben@x,BSCS,A,Baguio,Affordable,Safety,Agree,No,No,,ok,Premium
";

    fn model(dir: &tempfile::TempDir) -> SurveyModel {
        let path = dir.path().join("survey.csv");
        std::fs::write(&path, CSV).unwrap();
        SurveyModel::new(ReportConfig {
            data_path: path,
            ..ReportConfig::default()
        })
    }

    #[test]
    fn locked_model_returns_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let model = model(&dir);
        assert!(matches!(model.dataset(), Err(SurveyError::AccessDenied)));
        assert!(matches!(
            model.report(&Selection::default()),
            Err(SurveyError::AccessDenied)
        ));
    }

    #[test]
    fn unlocked_model_answers_queries() {
        let dir = tempfile::tempdir().unwrap();
        let mut model = model(&dir);
        model.login("admin123").unwrap();

        let all = model.full_selection().unwrap();
        assert_eq!(all.programs, vec!["BSIT", "BSCS"]);

        let locations = model
            .frequency_table(&all, survey::TOUR_LOCATION_PREFERENCE)
            .unwrap();
        assert_eq!(locations.count("Manila"), 1);

        let ct = model.crosstab(&all, survey::AFFORDABILITY_RATING).unwrap();
        assert_eq!(ct.groups, vec!["BSCS A", "BSIT A"]);

        let barriers = model.barrier_frequency(&all).unwrap();
        assert_eq!(barriers.count("Cost"), 1);

        let only_it = Selection::new(["BSIT"], ["A"]);
        assert_eq!(model.responses(&only_it).unwrap().height(), 1);

        let html = model.report_html(&all).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("BSIT A"));
    }

    #[test]
    fn logout_locks_again() {
        let dir = tempfile::tempdir().unwrap();
        let mut model = model(&dir);
        model.login("admin123").unwrap();
        model.logout();
        assert!(model.full_selection().is_err());
    }
}
