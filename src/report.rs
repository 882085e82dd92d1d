//! The twelve report views, assembled from the aggregator for one
//! filtered selection.
//!
//! Everything here is plain data (strings, counts, percentages) so any
//! presentation layer can consume it.

use std::fmt;

use chrono::NaiveDateTime;
use polars::prelude::DataFrame;
use serde::Serialize;

use crate::aggregation::{
    barrier_crosstab, barrier_frequency, bool_column, distinct_count, frequency_table,
    grouped_crosstab, partition_groups, percent, round1, row_count, share, str_column, top_of,
    Crosstab, FrequencyTable, PercentCrosstab, Share, TopChoice,
};
use crate::barriers::BarrierVocabulary;
use crate::config::{InsightThresholds, ReportConfig};
use crate::error::Result;
use crate::filter::{filter_responses, Selection};
use crate::loader::SurveyDataset;
use crate::schema::{affordability, derived, non_student, survey, vote, willingness};
use crate::sentiment::{composite_sentiment, LabelScales, SentimentScore};

const NO_BARRIER: &str = "None reported";

// ── Questions ───────────────────────────────────────────────────────────────

/// Single-choice questions that get a distribution and crosstab view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Question {
    Location,
    Affordability,
    ImportantFactor,
    VoteMattered,
    NonStudentFactors,
    ManilaWillingness,
    PreferredPackage,
}

impl Question {
    pub const ALL: [Question; 7] = [
        Question::Location,
        Question::Affordability,
        Question::ImportantFactor,
        Question::VoteMattered,
        Question::NonStudentFactors,
        Question::ManilaWillingness,
        Question::PreferredPackage,
    ];

    pub fn field(self) -> &'static str {
        match self {
            Question::Location => survey::TOUR_LOCATION_PREFERENCE,
            Question::Affordability => survey::AFFORDABILITY_RATING,
            Question::ImportantFactor => survey::MOST_IMPORTANT_FACTOR,
            Question::VoteMattered => survey::PREVIOUS_VOTE_MATTERED,
            Question::NonStudentFactors => survey::NON_STUDENT_FACTORS,
            Question::ManilaWillingness => survey::MANILA_WILLINGNESS,
            Question::PreferredPackage => survey::PREFERRED_PACKAGE,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Question::Location => "Tour Location Preference",
            Question::Affordability => "Affordability",
            Question::ImportantFactor => "Most Important Factors",
            Question::VoteMattered => "Voting Power",
            Question::NonStudentFactors => "Non-Student Factors",
            Question::ManilaWillingness => "Manila Willingness",
            Question::PreferredPackage => "Preferred Package",
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            Question::Location => "Where do you personally want to have the educational tour?",
            Question::Affordability => {
                "How would you rate the affordability of the Manila package for you and your family?"
            }
            Question::ImportantFactor => {
                "If given a choice, which factor is MOST important in your tour decision?"
            }
            Question::VoteMattered => {
                "Do you feel your previous vote for the tour location/package mattered?"
            }
            Question::NonStudentFactors => {
                "Is the re-evaluation happening because of factors other than student preference?"
            }
            Question::ManilaWillingness => {
                "If Manila remains the final destination, are you still willing and able to join?"
            }
            Question::PreferredPackage => "Select the package you prefer.",
        }
    }
}

// ── Records ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Respondent {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupRespondents {
    pub group: String,
    pub respondents: Vec<Respondent>,
}

/// Who gave one answer, split by Program-Section. Groups without anyone
/// giving the answer are left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerRespondents {
    pub answer: String,
    pub groups: Vec<GroupRespondents>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyMetrics {
    pub total_responses: u32,
    pub programs: usize,
    pub sections: usize,
    pub expensive_pct: f64,
    pub definitely_willing_pct: f64,
    pub first_response: Option<NaiveDateTime>,
    pub last_response: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub responses_by_program: FrequencyTable,
    pub respondents: Vec<GroupRespondents>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionView {
    pub question: Question,
    pub distribution: FrequencyTable,
    pub crosstab: Crosstab,
    pub percentages: PercentCrosstab,
    pub respondents: Vec<AnswerRespondents>,
}

/// A question view plus its per-group summary rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionTab<R> {
    #[serde(flatten)]
    pub view: QuestionView,
    pub by_group: Vec<R>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AffordabilityRow {
    pub group: String,
    pub total: u32,
    pub expensive: Share,
    pub affordable: Share,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopChoiceRow {
    pub group: String,
    pub total: u32,
    pub top: Option<TopChoice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidenceRow {
    pub group: String,
    pub total: u32,
    pub dissatisfied: Share,
    pub satisfied: Share,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrustRow {
    pub group: String,
    pub total: u32,
    pub believes_external: Share,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WillingnessRow {
    pub group: String,
    pub total: u32,
    pub definitely: Share,
    pub positive: Share,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarrierRow {
    pub group: String,
    pub total: u32,
    /// `None` when nobody in the group reported a barrier.
    pub top: Option<TopChoice>,
    pub total_reported: u32,
}

impl BarrierRow {
    pub fn top_label(&self) -> &str {
        self.top.as_ref().map_or(NO_BARRIER, |t| t.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarriersView {
    pub frequency: FrequencyTable,
    pub crosstab: Crosstab,
    pub by_group: Vec<BarrierRow>,
    pub respondents: Vec<AnswerRespondents>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub name: Option<String>,
    pub group: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    pub group: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentsView {
    pub comments: Vec<Comment>,
    pub count_by_group: Vec<GroupCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentRow {
    pub group: String,
    pub total: u32,
    pub score: SentimentScore,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentView {
    pub overall: SentimentScore,
    pub label: String,
    pub by_group: Vec<SentimentRow>,
    pub concerning: Vec<String>,
    pub very_positive: Vec<String>,
    pub highest: Option<f64>,
    pub lowest: Option<f64>,
    pub average: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Insight {
    LocationPreference { location: String, pct: f64 },
    FinancialConcern { pct: f64 },
    ParticipationRisk { pct: f64 },
    TrustIssue { pct: f64 },
    MainBarrier { barrier: String, count: u32 },
}

impl fmt::Display for Insight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Insight::LocationPreference { location, pct } => {
                write!(f, "Location preference: {pct:.1}% prefer {location}")
            }
            Insight::FinancialConcern { pct } => write!(
                f,
                "Financial concern: {pct:.1}% find the tour expensive, consider financial assistance"
            ),
            Insight::ParticipationRisk { pct } => write!(
                f,
                "Participation risk: only {pct:.1}% are definitely willing to join the Manila tour"
            ),
            Insight::TrustIssue { pct } => {
                write!(f, "Trust issue: {pct:.1}% feel their votes didn't matter")
            }
            Insight::MainBarrier { barrier, count } => {
                write!(f, "Main barrier: {barrier} affects {count} students")
            }
        }
    }
}

/// Everything known about one Program-Section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionDetail {
    pub group: String,
    pub students: Vec<Respondent>,
    pub location: FrequencyTable,
    pub affordability: AffordabilityRow,
    pub affordability_ratings: FrequencyTable,
    pub factors: FrequencyTable,
    pub priority: TopChoiceRow,
    pub confidence: ConfidenceRow,
    pub trust: TrustRow,
    pub willingness: WillingnessRow,
    pub barriers: BarrierRow,
    pub barrier_frequency: FrequencyTable,
    pub comments: Vec<Comment>,
    pub packages: FrequencyTable,
    pub package: TopChoiceRow,
    pub sentiment: SentimentRow,
    pub insights: Vec<Insight>,
}

/// One Program-Section in the cross-group comparison table.
///
/// `preferred_location` and `preferred_package` break ties by first
/// appearance in the group, the same rule as `top_choice`, not
/// alphabetically.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub group: String,
    pub total: u32,
    pub expensive_pct: f64,
    pub definitely_willing_pct: f64,
    pub preferred_location: Option<String>,
    pub preferred_package: Option<String>,
}

/// All report views for one selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurveyReport {
    pub selection: Selection,
    pub key_metrics: KeyMetrics,
    pub overview: Overview,
    pub location: QuestionView,
    pub affordability: QuestionTab<AffordabilityRow>,
    pub important_factors: QuestionTab<TopChoiceRow>,
    pub voting_power: QuestionTab<ConfidenceRow>,
    pub non_student_factors: QuestionTab<TrustRow>,
    pub manila_willingness: QuestionTab<WillingnessRow>,
    pub barriers: BarriersView,
    pub comments: CommentsView,
    pub preferred_package: QuestionTab<TopChoiceRow>,
    pub sentiment: SentimentView,
    pub sections: Vec<SectionDetail>,
    pub comparison: Vec<ComparisonRow>,
}

impl SurveyReport {
    pub fn section(&self, group: &str) -> Option<&SectionDetail> {
        self.sections.iter().find(|s| s.group == group)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ── Builders ────────────────────────────────────────────────────────────────

/// Filter the dataset by `selection` and build every view.
pub fn build_report(
    dataset: &SurveyDataset,
    selection: &Selection,
    config: &ReportConfig,
) -> Result<SurveyReport> {
    let rows = filter_responses(dataset.frame(), selection)?;
    let vocabulary = dataset.vocabulary();
    let groups = partition_groups(&rows, derived::PROGRAM_SECTION)?;
    let scales = &config.scales;
    tracing::debug!(
        "Building report over {} responses in {} program-sections",
        rows.height(),
        groups.len()
    );

    let affordability = QuestionTab {
        view: question_view(&rows, &groups, Question::Affordability)?,
        by_group: per_group(&groups, |g, df| affordability_row(g, df, scales))?,
    };
    let important_factors = QuestionTab {
        view: question_view(&rows, &groups, Question::ImportantFactor)?,
        by_group: per_group(&groups, |g, df| top_choice_row(g, df, survey::MOST_IMPORTANT_FACTOR))?,
    };
    let voting_power = QuestionTab {
        view: question_view(&rows, &groups, Question::VoteMattered)?,
        by_group: per_group(&groups, |g, df| confidence_row(g, df, scales))?,
    };
    let non_student_factors = QuestionTab {
        view: question_view(&rows, &groups, Question::NonStudentFactors)?,
        by_group: per_group(&groups, |g, df| trust_row(g, df, scales))?,
    };
    let manila_willingness = QuestionTab {
        view: question_view(&rows, &groups, Question::ManilaWillingness)?,
        by_group: per_group(&groups, |g, df| willingness_row(g, df, scales))?,
    };
    let preferred_package = QuestionTab {
        view: question_view(&rows, &groups, Question::PreferredPackage)?,
        by_group: per_group(&groups, |g, df| top_choice_row(g, df, survey::PREFERRED_PACKAGE))?,
    };

    Ok(SurveyReport {
        selection: selection.clone(),
        key_metrics: key_metrics(&rows, &config.timestamp_formats)?,
        overview: overview(&rows, &groups)?,
        location: question_view(&rows, &groups, Question::Location)?,
        affordability,
        important_factors,
        voting_power,
        non_student_factors,
        manila_willingness,
        barriers: barriers_view(&rows, &groups, vocabulary)?,
        comments: comments_view(&rows)?,
        preferred_package,
        sentiment: sentiment_view(&rows, &groups, scales, &config.insights)?,
        sections: per_group(&groups, |g, df| section_detail(g, df, vocabulary, config))?,
        comparison: per_group(&groups, |g, df| comparison_row(g, df))?,
    })
}

fn per_group<T>(
    groups: &[(String, DataFrame)],
    f: impl Fn(&str, &DataFrame) -> Result<T>,
) -> Result<Vec<T>> {
    groups.iter().map(|(g, df)| f(g, df)).collect()
}

pub fn key_metrics(rows: &DataFrame, timestamp_formats: &[String]) -> Result<KeyMetrics> {
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

    let timestamps: Vec<NaiveDateTime> = str_column(rows, survey::TIMESTAMP)?
        .into_iter()
        .flatten()
        .filter_map(|raw| parse_timestamp(raw, timestamp_formats))
        .collect();

    Ok(KeyMetrics {
        total_responses: row_count(rows),
        programs: distinct_count(rows, survey::PROGRAM)?,
        sections: distinct_count(rows, survey::SECTION)?,
        expensive_pct: expensive.pct,
        definitely_willing_pct: willing.pct,
        first_response: timestamps.iter().min().copied(),
        last_response: timestamps.iter().max().copied(),
    })
}

fn parse_timestamp(raw: &str, formats: &[String]) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

pub fn respondents(rows: &DataFrame) -> Result<Vec<Respondent>> {
    let names = str_column(rows, survey::NAME)?;
    let emails = str_column(rows, survey::EMAIL)?;
    Ok(names
        .into_iter()
        .zip(emails.into_iter())
        .map(|(name, email)| Respondent {
            name: name.map(str::to_string),
            email: email.map(str::to_string),
        })
        .collect())
}

/// Respondents of the rows whose flag is set.
fn flagged_respondents(
    rows: &DataFrame,
    flags: impl Iterator<Item = bool>,
) -> Result<Vec<Respondent>> {
    Ok(respondents(rows)?
        .into_iter()
        .zip(flags)
        .filter_map(|(r, keep)| keep.then_some(r))
        .collect())
}

fn overview(rows: &DataFrame, groups: &[(String, DataFrame)]) -> Result<Overview> {
    Ok(Overview {
        responses_by_program: frequency_table(rows, survey::PROGRAM)?,
        respondents: groups
            .iter()
            .map(|(g, df)| {
                Ok(GroupRespondents {
                    group: g.clone(),
                    respondents: respondents(df)?,
                })
            })
            .collect::<Result<_>>()?,
    })
}

/// Distribution, Program-Section crosstab and respondent lists for one
/// question.
pub fn question_view(
    rows: &DataFrame,
    groups: &[(String, DataFrame)],
    question: Question,
) -> Result<QuestionView> {
    let field = question.field();
    let distribution = frequency_table(rows, field)?;
    let crosstab = grouped_crosstab(rows, derived::PROGRAM_SECTION, field)?;
    let percentages = crosstab.percentages();

    let mut answers = Vec::with_capacity(distribution.len());
    for entry in distribution.entries() {
        let mut found = Vec::new();
        for (g, df) in groups {
            let values = str_column(df, field)?;
            let matched = flagged_respondents(
                df,
                values.into_iter().map(|v| v == Some(entry.value.as_str())),
            )?;
            if !matched.is_empty() {
                found.push(GroupRespondents {
                    group: g.clone(),
                    respondents: matched,
                });
            }
        }
        answers.push(AnswerRespondents {
            answer: entry.value.clone(),
            groups: found,
        });
    }

    Ok(QuestionView {
        question,
        distribution,
        crosstab,
        percentages,
        respondents: answers,
    })
}

pub fn affordability_row(
    group: &str,
    rows: &DataFrame,
    scales: &LabelScales,
) -> Result<AffordabilityRow> {
    let expensive = share(
        rows,
        survey::AFFORDABILITY_RATING,
        &affordability::EXPENSIVE_ANSWERS,
    )?;
    let affordable = share(
        rows,
        survey::AFFORDABILITY_RATING,
        &affordability::AFFORDABLE_ANSWERS,
    )?;
    Ok(AffordabilityRow {
        group: group.to_string(),
        total: row_count(rows),
        label: scales.affordability.label(expensive.pct).to_string(),
        expensive,
        affordable,
    })
}

pub fn top_choice_row(group: &str, rows: &DataFrame, field: &str) -> Result<TopChoiceRow> {
    let total = row_count(rows);
    Ok(TopChoiceRow {
        group: group.to_string(),
        total,
        top: top_of(&frequency_table(rows, field)?, total),
    })
}

pub fn confidence_row(
    group: &str,
    rows: &DataFrame,
    scales: &LabelScales,
) -> Result<ConfidenceRow> {
    let dissatisfied = share(
        rows,
        survey::PREVIOUS_VOTE_MATTERED,
        &vote::DISSATISFIED_ANSWERS,
    )?;
    let satisfied = share(
        rows,
        survey::PREVIOUS_VOTE_MATTERED,
        &vote::SATISFIED_ANSWERS,
    )?;
    Ok(ConfidenceRow {
        group: group.to_string(),
        total: row_count(rows),
        label: scales.voting_confidence.label(dissatisfied.pct).to_string(),
        dissatisfied,
        satisfied,
    })
}

pub fn trust_row(group: &str, rows: &DataFrame, scales: &LabelScales) -> Result<TrustRow> {
    let believes_external = share(
        rows,
        survey::NON_STUDENT_FACTORS,
        &non_student::EXTERNAL_ANSWERS,
    )?;
    Ok(TrustRow {
        group: group.to_string(),
        total: row_count(rows),
        label: scales.trust.label(believes_external.pct).to_string(),
        believes_external,
    })
}

pub fn willingness_row(
    group: &str,
    rows: &DataFrame,
    scales: &LabelScales,
) -> Result<WillingnessRow> {
    let definitely = share(
        rows,
        survey::MANILA_WILLINGNESS,
        &willingness::DEFINITELY_ANSWERS,
    )?;
    let positive = share(
        rows,
        survey::MANILA_WILLINGNESS,
        &willingness::POSITIVE_ANSWERS,
    )?;
    Ok(WillingnessRow {
        group: group.to_string(),
        total: row_count(rows),
        label: scales
            .willingness
            .label(definitely.pct, positive.pct)
            .to_string(),
        definitely,
        positive,
    })
}

pub fn barrier_row(
    group: &str,
    rows: &DataFrame,
    vocabulary: &BarrierVocabulary,
) -> Result<BarrierRow> {
    let total = row_count(rows);
    let frequency = barrier_frequency(rows, vocabulary)?;
    Ok(BarrierRow {
        group: group.to_string(),
        total,
        top: top_of(&frequency, total),
        total_reported: frequency.total(),
    })
}

fn barriers_view(
    rows: &DataFrame,
    groups: &[(String, DataFrame)],
    vocabulary: &BarrierVocabulary,
) -> Result<BarriersView> {
    let mut respondents = Vec::with_capacity(vocabulary.len());
    for token in vocabulary.tokens() {
        let mut found = Vec::new();
        for (g, df) in groups {
            let flags = bool_column(df, &token.column)?;
            let matched = flagged_respondents(df, flags.into_iter().map(|f| f == Some(true)))?;
            if !matched.is_empty() {
                found.push(GroupRespondents {
                    group: g.clone(),
                    respondents: matched,
                });
            }
        }
        respondents.push(AnswerRespondents {
            answer: token.label.clone(),
            groups: found,
        });
    }

    Ok(BarriersView {
        frequency: barrier_frequency(rows, vocabulary)?,
        crosstab: barrier_crosstab(rows, derived::PROGRAM_SECTION, vocabulary)?,
        by_group: per_group(groups, |g, df| barrier_row(g, df, vocabulary))?,
        respondents,
    })
}

/// Non-blank comments with their author and group, in input order.
pub fn comments(rows: &DataFrame) -> Result<Vec<Comment>> {
    let names = str_column(rows, survey::NAME)?;
    let groups = str_column(rows, derived::PROGRAM_SECTION)?;
    let texts = str_column(rows, survey::ADDITIONAL_COMMENTS)?;

    Ok(names
        .into_iter()
        .zip(groups.into_iter())
        .zip(texts.into_iter())
        .filter_map(|((name, group), text)| {
            let text = text.filter(|t| !t.trim().is_empty())?;
            Some(Comment {
                name: name.map(str::to_string),
                group: group.map(str::to_string),
                text: text.to_string(),
            })
        })
        .collect())
}

fn comments_view(rows: &DataFrame) -> Result<CommentsView> {
    let comments = comments(rows)?;

    let mut count_by_group: Vec<GroupCount> = Vec::new();
    let mut keys: Vec<&str> = comments.iter().filter_map(|c| c.group.as_deref()).collect();
    keys.sort_unstable();
    for key in keys {
        match count_by_group.last_mut() {
            Some(last) if last.group == key => last.count += 1,
            _ => count_by_group.push(GroupCount {
                group: key.to_string(),
                count: 1,
            }),
        }
    }

    Ok(CommentsView {
        comments,
        count_by_group,
    })
}

pub fn sentiment_row(group: &str, rows: &DataFrame, scales: &LabelScales) -> Result<SentimentRow> {
    let score = composite_sentiment(rows)?;
    Ok(SentimentRow {
        group: group.to_string(),
        total: row_count(rows),
        label: scales.overall.label(score.overall).to_string(),
        score,
    })
}

fn sentiment_view(
    rows: &DataFrame,
    groups: &[(String, DataFrame)],
    scales: &LabelScales,
    thresholds: &InsightThresholds,
) -> Result<SentimentView> {
    let overall = composite_sentiment(rows)?;
    let by_group = per_group(groups, |g, df| sentiment_row(g, df, scales))?;

    // highlights compare the one-decimal scores that get displayed
    let scores: Vec<f64> = by_group.iter().map(|r| round1(r.score.overall)).collect();
    let pick = |keep: &dyn Fn(f64) -> bool| -> Vec<String> {
        by_group
            .iter()
            .zip(&scores)
            .filter(|(_, s)| keep(**s))
            .map(|(r, _)| r.group.clone())
            .collect()
    };
    let concerning = pick(&|s| s < thresholds.concerning_below);
    let very_positive = pick(&|s| s >= thresholds.very_positive_from);

    let average = if scores.is_empty() {
        None
    } else {
        Some(scores.iter().sum::<f64>() / scores.len() as f64)
    };

    Ok(SentimentView {
        label: scales.overall.label(overall.overall).to_string(),
        overall,
        concerning,
        very_positive,
        highest: scores.iter().copied().reduce(f64::max),
        lowest: scores.iter().copied().reduce(f64::min),
        average,
        by_group,
    })
}

/// Detailed view of one Program-Section's rows.
pub fn section_detail(
    group: &str,
    rows: &DataFrame,
    vocabulary: &BarrierVocabulary,
    config: &ReportConfig,
) -> Result<SectionDetail> {
    let scales = &config.scales;
    let total = row_count(rows);

    let location = frequency_table(rows, survey::TOUR_LOCATION_PREFERENCE)?;
    let affordability = affordability_row(group, rows, scales)?;
    let confidence = confidence_row(group, rows, scales)?;
    let willingness = willingness_row(group, rows, scales)?;
    let barriers = barrier_row(group, rows, vocabulary)?;
    let barrier_frequency: FrequencyTable = barrier_frequency(rows, vocabulary)?
        .non_zero()
        .map(|f| (f.value.clone(), f.count))
        .collect();

    let insights = section_insights(
        &location,
        total,
        &affordability,
        &willingness,
        &confidence,
        &barriers,
        &config.insights,
    );

    Ok(SectionDetail {
        group: group.to_string(),
        students: respondents(rows)?,
        affordability_ratings: frequency_table(rows, survey::AFFORDABILITY_RATING)?,
        factors: frequency_table(rows, survey::MOST_IMPORTANT_FACTOR)?,
        priority: top_choice_row(group, rows, survey::MOST_IMPORTANT_FACTOR)?,
        trust: trust_row(group, rows, scales)?,
        comments: comments(rows)?,
        packages: frequency_table(rows, survey::PREFERRED_PACKAGE)?,
        package: top_choice_row(group, rows, survey::PREFERRED_PACKAGE)?,
        sentiment: sentiment_row(group, rows, scales)?,
        location,
        affordability,
        confidence,
        willingness,
        barriers,
        barrier_frequency,
        insights,
    })
}

fn section_insights(
    location: &FrequencyTable,
    total: u32,
    affordability: &AffordabilityRow,
    willingness: &WillingnessRow,
    confidence: &ConfidenceRow,
    barriers: &BarrierRow,
    thresholds: &InsightThresholds,
) -> Vec<Insight> {
    let mut insights = Vec::new();

    if let Some(top) = location.top() {
        insights.push(Insight::LocationPreference {
            location: top.value.clone(),
            pct: percent(top.count, total),
        });
    }
    if total == 0 {
        return insights;
    }
    if affordability.expensive.pct > thresholds.financial_concern_above {
        insights.push(Insight::FinancialConcern {
            pct: affordability.expensive.pct,
        });
    }
    if willingness.definitely.pct < thresholds.participation_risk_below {
        insights.push(Insight::ParticipationRisk {
            pct: willingness.definitely.pct,
        });
    }
    if confidence.dissatisfied.pct > thresholds.trust_issue_above {
        insights.push(Insight::TrustIssue {
            pct: confidence.dissatisfied.pct,
        });
    }
    if let Some(top) = &barriers.top {
        insights.push(Insight::MainBarrier {
            barrier: top.value.clone(),
            count: top.count,
        });
    }

    insights
}

pub fn comparison_row(group: &str, rows: &DataFrame) -> Result<ComparisonRow> {
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
    let top = |field: &str| -> Result<Option<String>> {
        Ok(frequency_table(rows, field)?.top().map(|f| f.value.clone()))
    };

    Ok(ComparisonRow {
        group: group.to_string(),
        total: row_count(rows),
        expensive_pct: expensive.pct,
        definitely_willing_pct: willing.pct,
        preferred_location: top(survey::TOUR_LOCATION_PREFERENCE)?,
        preferred_package: top(survey::PREFERRED_PACKAGE)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::barriers::BarrierMatch;
    use crate::loader::normalize;
    use polars::prelude::*;

    fn dataset(rows: &[[&str; 14]]) -> SurveyDataset {
        let columns: Vec<Column> = survey::ALL
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let values: Vec<Option<&str>> = rows
                    .iter()
                    .map(|r| Some(r[i]).filter(|v| !v.is_empty()))
                    .collect();
                Column::new((*name).into(), &values)
            })
            .collect();
        normalize(DataFrame::new(columns).unwrap(), BarrierMatch::Substring).unwrap()
    }

    fn sample() -> SurveyDataset {
        dataset(&[
            [
                "09/01/2025 08:15:00", "Ana", "ana@x", "BSIT", "A", "Manila", "Expensive",
                "Cost", "Disagree", "Yes", "Yes, definitely", "Cost; Time conflict",
                "Too pricey", "Basic",
            ],
            [
                "09/01/2025 09:00:00", "Ben", "ben@x", "BSIT", "A", "Baguio", "Very Expensive",
                "Cost", "Agree", "No", "Yes, probably", "Cost", "", "Premium",
            ],
            [
                "08/31/2025 18:30:00", "Cy", "cy@x", "BSCS", "B", "Manila", "Affordable",
                "Location", "Strongly Agree", "Unsure", "Yes, definitely", "", "   ", "Basic",
            ],
        ])
    }

    #[test]
    fn key_metrics_over_full_selection() {
        let ds = sample();
        let config = ReportConfig::default();
        let selection = Selection::all(ds.frame()).unwrap();
        let report = build_report(&ds, &selection, &config).unwrap();

        let m = &report.key_metrics;
        assert_eq!(m.total_responses, 3);
        assert_eq!((m.programs, m.sections), (2, 2));
        assert_eq!(round1(m.expensive_pct), 66.7);
        assert_eq!(round1(m.definitely_willing_pct), 66.7);
        assert_eq!(
            m.first_response.unwrap().to_string(),
            "2025-08-31 18:30:00"
        );
        assert_eq!(m.last_response.unwrap().to_string(), "2025-09-01 09:00:00");
    }

    #[test]
    fn per_group_summaries() {
        let ds = sample();
        let report = build_report(
            &ds,
            &Selection::all(ds.frame()).unwrap(),
            &ReportConfig::default(),
        )
        .unwrap();

        let afford = &report.affordability.by_group;
        assert_eq!(afford.len(), 2);
        assert_eq!(afford[0].group, "BSCS B");
        assert_eq!(afford[0].label, "Positive");
        assert_eq!(afford[1].group, "BSIT A");
        assert_eq!(afford[1].expensive.count, 2);
        assert_eq!(afford[1].label, "Concerned");

        let confidence = &report.voting_power.by_group[1];
        assert_eq!(confidence.dissatisfied.pct, 50.0);
        assert_eq!(confidence.label, "Mixed Confidence");

        let willingness = &report.manila_willingness.by_group[1];
        assert_eq!(willingness.positive.count, 2);
        assert_eq!(willingness.label, "Positive");

        let package = &report.preferred_package.by_group[1];
        assert_eq!(package.top.as_ref().unwrap().value, "Basic");
    }

    #[test]
    fn barrier_views_use_full_vocabulary() {
        let ds = sample();
        let selection = Selection::new(["BSCS"], ["B"]);
        let report = build_report(&ds, &selection, &ReportConfig::default()).unwrap();

        let labels: Vec<&str> = report
            .barriers
            .frequency
            .entries()
            .iter()
            .map(|e| e.value.as_str())
            .collect();
        assert_eq!(labels, vec!["Cost", "Time conflict"]);
        assert_eq!(report.barriers.frequency.total(), 0);
        assert_eq!(report.barriers.by_group[0].top_label(), NO_BARRIER);
        assert_eq!(report.barriers.by_group[0].total_reported, 0);
    }

    #[test]
    fn blank_comments_are_skipped() {
        let ds = sample();
        let report = build_report(
            &ds,
            &Selection::all(ds.frame()).unwrap(),
            &ReportConfig::default(),
        )
        .unwrap();
        assert_eq!(report.comments.comments.len(), 1);
        assert_eq!(report.comments.comments[0].text, "Too pricey");
        assert_eq!(
            report.comments.count_by_group,
            vec![GroupCount {
                group: "BSIT A".to_string(),
                count: 1
            }]
        );
    }

    #[test]
    fn section_detail_raises_insights() {
        let ds = sample();
        let report = build_report(
            &ds,
            &Selection::all(ds.frame()).unwrap(),
            &ReportConfig::default(),
        )
        .unwrap();

        let detail = report.section("BSIT A").unwrap();
        assert_eq!(detail.students.len(), 2);
        assert_eq!(detail.barriers.top_label(), "Cost");
        assert_eq!(detail.barriers.total_reported, 3);
        assert!(detail
            .insights
            .contains(&Insight::FinancialConcern { pct: 100.0 }));
        assert!(detail
            .insights
            .contains(&Insight::ParticipationRisk { pct: 50.0 }));
        assert!(detail.insights.contains(&Insight::TrustIssue { pct: 50.0 }));
        assert!(detail.insights.contains(&Insight::MainBarrier {
            barrier: "Cost".to_string(),
            count: 2
        }));
    }

    #[test]
    fn respondents_grouped_by_answer() {
        let ds = sample();
        let report = build_report(
            &ds,
            &Selection::all(ds.frame()).unwrap(),
            &ReportConfig::default(),
        )
        .unwrap();

        let manila = &report.location.respondents[0];
        assert_eq!(manila.answer, "Manila");
        let groups: Vec<&str> = manila.groups.iter().map(|g| g.group.as_str()).collect();
        assert_eq!(groups, vec!["BSCS B", "BSIT A"]);
    }

    #[test]
    fn empty_selection_degrades_to_empty_report() {
        let ds = sample();
        let selection = Selection::new(["BSED"], ["A"]);
        let report = build_report(&ds, &selection, &ReportConfig::default()).unwrap();

        assert_eq!(report.key_metrics.total_responses, 0);
        assert_eq!(report.key_metrics.expensive_pct, 0.0);
        assert!(report.location.distribution.is_empty());
        assert!(report.affordability.view.crosstab.is_empty());
        assert_eq!(report.sentiment.overall, SentimentScore::default());
        assert_eq!(report.sentiment.label, "Concerning");
        assert!(report.sentiment.average.is_none());
        assert!(report.sections.is_empty());
        assert!(report.to_json().is_ok());
    }

    #[test]
    fn comparison_ties_go_to_first_seen_answer() {
        let ds = sample();
        let report = build_report(
            &ds,
            &Selection::all(ds.frame()).unwrap(),
            &ReportConfig::default(),
        )
        .unwrap();

        // BSIT A: Manila then Baguio, one vote each
        let row = report
            .comparison
            .iter()
            .find(|r| r.group == "BSIT A")
            .unwrap();
        assert_eq!(row.preferred_location.as_deref(), Some("Manila"));
        assert_eq!(row.preferred_package.as_deref(), Some("Basic"));
    }

    #[test]
    fn rows_without_program_stay_out_of_full_report() {
        let ds = dataset(&[
            [
                "09/01/2025 08:15:00", "Ana", "ana@x", "BSIT", "A", "Manila", "Expensive",
                "Cost", "Agree", "No", "Yes, definitely", "", "", "Basic",
            ],
            [
                "09/01/2025 08:20:00", "Nil", "nil@x", "", "A", "Manila", "Expensive",
                "Cost", "Agree", "No", "Yes, definitely", "", "", "Basic",
            ],
        ]);
        let selection = Selection::all(ds.frame()).unwrap();
        assert_eq!(selection.programs, vec!["BSIT"]);

        let report = build_report(&ds, &selection, &ReportConfig::default()).unwrap();
        assert_eq!(report.key_metrics.total_responses, 1);
        assert_eq!(report.overview.respondents.len(), 1);
    }
}
