use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;

use crate::barriers::BarrierMatch;
use crate::config::ReportConfig;
use crate::error::Result;
use crate::loader::{load_survey, SurveyDataset};

/// Read-through cache owning the loaded survey.
///
/// The export is read on the first `get_dataset` call and reused for the
/// rest of the process. There is no invalidation. A failed load is not
/// stored, so a later call tries again.
#[derive(Debug)]
pub struct DatasetCache {
    path: PathBuf,
    matching: BarrierMatch,
    dataset: OnceCell<SurveyDataset>,
}

impl DatasetCache {
    pub fn new(path: impl Into<PathBuf>, matching: BarrierMatch) -> Self {
        Self {
            path: path.into(),
            matching,
            dataset: OnceCell::new(),
        }
    }

    pub fn from_config(config: &ReportConfig) -> Self {
        Self::new(config.data_path.clone(), config.barrier_matching)
    }

    pub fn get_dataset(&self) -> Result<&SurveyDataset> {
        self.dataset
            .get_or_try_init(|| load_survey(&self.path, self.matching))
    }

    pub fn is_loaded(&self) -> bool {
        self.dataset.get().is_some()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "ts,name,email,program,section,loc,afford,factor,vote,ns,will,\
                          barriers,comments,package\n";

    #[test]
    fn loads_once_and_ignores_later_file_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("survey.csv");
        let row = "t,Ana,a@x,BSIT,A,Manila,Expensive,Cost,Agree,No,\
                   \"Yes, definitely\",Cost,,Basic\n";
        std::fs::write(&path, format!("{HEADER}{row}")).unwrap();

        let cache = DatasetCache::new(&path, BarrierMatch::Substring);
        assert!(!cache.is_loaded());
        let first = cache.get_dataset().unwrap();
        assert_eq!(first.height(), 1);

        std::fs::write(&path, format!("{HEADER}{row}{row}")).unwrap();
        let second = cache.get_dataset().unwrap();
        assert_eq!(second.height(), 1);
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn failed_load_is_retried() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("late.csv");
        let cache = DatasetCache::new(&path, BarrierMatch::Substring);
        assert!(cache.get_dataset().is_err());
        assert!(!cache.is_loaded());

        std::fs::write(&path, HEADER).unwrap();
        assert_eq!(cache.get_dataset().unwrap().height(), 0);
    }
}
