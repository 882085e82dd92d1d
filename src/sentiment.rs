//! Threshold labels and the composite sentiment score.

use polars::prelude::DataFrame;
use serde::{Deserialize, Deserializer, Serialize};

use crate::aggregation::share;
use crate::error::Result;
use crate::schema::{affordability, survey, vote, willingness};

/// How a percentage is compared against a band's threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cutoff {
    /// `pct > threshold`
    #[default]
    Above,
    /// `pct >= threshold`
    AtLeast,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelBand {
    pub threshold: f64,
    pub label: String,
}

/// Ordered set of labels selected by percentage thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScale {
    pub bands: Vec<LabelBand>,
    pub fallback: String,
    #[serde(default)]
    pub cutoff: Cutoff,
}

impl LabelScale {
    pub fn new(bands: &[(f64, &str)], fallback: &str) -> Self {
        Self {
            bands: bands
                .iter()
                .map(|&(threshold, label)| LabelBand {
                    threshold,
                    label: label.to_string(),
                })
                .collect(),
            fallback: fallback.to_string(),
            cutoff: Cutoff::Above,
        }
    }

    pub fn with_cutoff(mut self, cutoff: Cutoff) -> Self {
        self.cutoff = cutoff;
        self
    }

    /// Label for `pct`, checking the highest threshold first.
    pub fn label(&self, pct: f64) -> &str {
        let mut bands: Vec<&LabelBand> = self.bands.iter().collect();
        bands.sort_by(|a, b| b.threshold.total_cmp(&a.threshold));

        bands
            .into_iter()
            .find(|band| match self.cutoff {
                Cutoff::Above => pct > band.threshold,
                Cutoff::AtLeast => pct >= band.threshold,
            })
            .map_or(self.fallback.as_str(), |band| band.label.as_str())
    }
}

/// Map a percentage to its label on `scale`.
pub fn qualitative_label(pct: f64, scale: &LabelScale) -> &str {
    scale.label(pct)
}

/// Willingness is judged on two numbers: the share who will definitely
/// join, then the share answering definitely or probably.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WillingnessScale {
    pub definitely_threshold: f64,
    pub definitely_label: String,
    pub positive: LabelScale,
}

impl WillingnessScale {
    pub fn label(&self, definitely_pct: f64, positive_pct: f64) -> &str {
        if definitely_pct > self.definitely_threshold {
            &self.definitely_label
        } else {
            self.positive.label(positive_pct)
        }
    }
}

pub fn willingness_label<'a>(
    definitely_pct: f64,
    positive_pct: f64,
    scale: &'a WillingnessScale,
) -> &'a str {
    scale.label(definitely_pct, positive_pct)
}

/// Per-question label scales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelScales {
    /// Applied to the share finding the package expensive.
    pub affordability: LabelScale,
    /// Applied to the share who feel their previous vote did not matter.
    pub voting_confidence: LabelScale,
    /// Applied to the share who believe non-student factors drove the change.
    pub trust: LabelScale,
    pub willingness: WillingnessScale,
    /// Applied to the overall composite score. Inclusive unless the
    /// override names another `cutoff`.
    #[serde(deserialize_with = "inclusive_scale")]
    pub overall: LabelScale,
}

/// A `LabelScale` whose `cutoff` defaults to `AtLeast` when left out.
fn inclusive_scale<'de, D>(deserializer: D) -> std::result::Result<LabelScale, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Raw {
        bands: Vec<LabelBand>,
        fallback: String,
        cutoff: Option<Cutoff>,
    }

    let raw = Raw::deserialize(deserializer)?;
    Ok(LabelScale {
        bands: raw.bands,
        fallback: raw.fallback,
        cutoff: raw.cutoff.unwrap_or(Cutoff::AtLeast),
    })
}

impl Default for LabelScales {
    fn default() -> Self {
        Self {
            affordability: LabelScale::new(&[(50.0, "Concerned"), (25.0, "Mixed")], "Positive"),
            voting_confidence: LabelScale::new(
                &[(50.0, "Low Confidence"), (25.0, "Mixed Confidence")],
                "High Confidence",
            ),
            trust: LabelScale::new(&[(60.0, "Low Trust"), (30.0, "Mixed Trust")], "High Trust"),
            willingness: WillingnessScale {
                definitely_threshold: 60.0,
                definitely_label: "Very Positive".to_string(),
                positive: LabelScale::new(&[(60.0, "Positive"), (40.0, "Mixed")], "Concerning"),
            },
            overall: LabelScale::new(
                &[(70.0, "Very Positive"), (50.0, "Positive"), (30.0, "Mixed")],
                "Concerning",
            )
            .with_cutoff(Cutoff::AtLeast),
        }
    }
}

/// Three sub-scores and their mean, each in `[0, 100]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SentimentScore {
    /// 100 minus the share finding the package expensive.
    pub financial: f64,
    /// Share definitely willing to join.
    pub participation: f64,
    /// 100 minus the share who feel their vote did not matter.
    pub process: f64,
    pub overall: f64,
}

/// Composite sentiment over `rows`. Zero rows score zero everywhere.
pub fn composite_sentiment(rows: &DataFrame) -> Result<SentimentScore> {
    if rows.height() == 0 {
        return Ok(SentimentScore::default());
    }

    let expensive = share(
        rows,
        survey::AFFORDABILITY_RATING,
        &affordability::EXPENSIVE_ANSWERS,
    )?;
    let willing = share(
        rows,
        survey::MANILA_WILLINGNESS,
        &willingness::DEFINITELY_ANSWERS,
    )?;
    let dissatisfied = share(
        rows,
        survey::PREVIOUS_VOTE_MATTERED,
        &vote::DISSATISFIED_ANSWERS,
    )?;

    let financial = 100.0 - expensive.pct;
    let participation = willing.pct;
    let process = 100.0 - dissatisfied.pct;

    Ok(SentimentScore {
        financial,
        participation,
        process,
        overall: (financial + participation + process) / 3.0,
    })
}
