use survey_report::aggregation::{
    barrier_frequency, frequency_table, grouped_crosstab, round1, share, top_choice,
};
use survey_report::schema::{affordability, derived, survey};
use survey_report::visualization::render_report_html;
use survey_report::{
    build_report, filter_responses, load_survey, BarrierMatch, DatasetCache, ReportConfig,
    Selection, SurveyDataset,
};

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/survey_sample.csv");

fn fixture() -> SurveyDataset {
    load_survey(FIXTURE, BarrierMatch::Substring).unwrap()
}

fn full_report() -> survey_report::SurveyReport {
    let ds = fixture();
    let selection = Selection::all(ds.frame()).unwrap();
    build_report(&ds, &selection, &ReportConfig::default()).unwrap()
}

#[test]
fn test_fixture_loads_with_barrier_columns() {
    let ds = fixture();
    assert_eq!(ds.height(), 10);

    let labels: Vec<&str> = ds.vocabulary().labels().collect();
    assert_eq!(
        labels,
        vec!["Cost", "Health", "Parental permission", "Time conflict"]
    );
    assert_eq!(ds.frame().width(), 14 + 1 + 4);
    assert!(ds.frame().column("Barrier_Parental_permission").is_ok());
}

#[test]
fn test_loader_is_idempotent() {
    let first = fixture();
    let second = fixture();
    assert!(first.frame().equals_missing(second.frame()));
    assert_eq!(first.vocabulary(), second.vocabulary());
}

#[test]
fn test_cache_serves_the_fixture() {
    let cache = DatasetCache::new(FIXTURE, BarrierMatch::Exact);
    let ds = cache.get_dataset().unwrap();
    assert_eq!(ds.matching(), BarrierMatch::Exact);
    assert_eq!(ds.height(), 10);
}

#[test]
fn test_barrier_frequency_matches_substring_counts() {
    let ds = fixture();
    let freq = barrier_frequency(ds.frame(), ds.vocabulary()).unwrap();

    let raw: Vec<Option<&str>> = ds
        .frame()
        .column(survey::BARRIERS)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .collect();
    for entry in freq.entries() {
        let expected = raw
            .iter()
            .filter(|v| v.is_some_and(|s| s.contains(entry.value.as_str())))
            .count() as u32;
        assert_eq!(entry.count, expected, "barrier {}", entry.value);
    }
    assert_eq!(freq.count("Cost"), 5);
    assert_eq!(freq.count("Time conflict"), 3);
}

#[test]
fn test_affordability_share_of_sample() {
    let ds = fixture();
    let rows = filter_responses(ds.frame(), &Selection::new(["BSIT", "BSCS"], ["A"])).unwrap();
    // Ana, Ben, Eva, Fred
    assert_eq!(rows.height(), 4);
    let s = share(
        &rows,
        survey::AFFORDABILITY_RATING,
        &affordability::EXPENSIVE_ANSWERS,
    )
    .unwrap();
    assert_eq!(s.count, 2);
    assert_eq!(s.pct, 50.0);
}

#[test]
fn test_crosstab_rows_sum_to_group_sizes() {
    let ds = fixture();
    let ct = grouped_crosstab(ds.frame(), derived::PROGRAM_SECTION, survey::MANILA_WILLINGNESS)
        .unwrap();
    assert_eq!(
        ct.groups,
        vec!["BSCS A", "BSCS B", "BSED A", "BSIT A", "BSIT B"]
    );
    assert!(ct.row_totals().iter().all(|&n| n == 2));
    assert_eq!(ct.grand_total(), 10);

    for row in &ct.percentages().values {
        let sum: f64 = row.iter().sum();
        assert!((sum - 100.0).abs() <= 0.1 + 1e-9, "row sums to {sum}");
    }
}

#[test]
fn test_top_location() {
    let ds = fixture();
    let top = top_choice(ds.frame(), survey::TOUR_LOCATION_PREFERENCE)
        .unwrap()
        .unwrap();
    assert_eq!((top.value.as_str(), top.count), ("Manila", 5));
    assert_eq!(top.pct, 50.0);

    let dist = frequency_table(ds.frame(), survey::TOUR_LOCATION_PREFERENCE).unwrap();
    let order: Vec<&str> = dist.entries().iter().map(|e| e.value.as_str()).collect();
    assert_eq!(order, vec!["Manila", "Baguio", "Cebu"]);
}

#[test]
fn test_full_report_key_metrics() {
    let report = full_report();
    let m = &report.key_metrics;
    assert_eq!(m.total_responses, 10);
    assert_eq!((m.programs, m.sections), (3, 2));
    assert_eq!(m.expensive_pct, 60.0);
    assert_eq!(m.definitely_willing_pct, 50.0);
    assert_eq!(
        m.first_response.unwrap().to_string(),
        "2025-09-01 08:15:02"
    );
    assert_eq!(m.last_response.unwrap().to_string(), "2025-09-03 08:05:45");
}

#[test]
fn test_full_report_sentiment() {
    let report = full_report();
    let s = &report.sentiment;
    assert_eq!(round1(s.overall.overall), 46.7);
    assert_eq!(s.label, "Mixed");
    assert_eq!(s.concerning, vec!["BSCS B", "BSIT A"]);
    assert_eq!(s.very_positive, vec!["BSCS A"]);
    assert_eq!(s.highest, Some(100.0));
    assert_eq!(s.lowest, Some(0.0));
}

#[test]
fn test_full_report_comments_and_barriers() {
    let report = full_report();
    assert_eq!(report.comments.comments.len(), 4);
    assert!(report
        .comments
        .comments
        .iter()
        .any(|c| c.text == "Hotel should be near, please"));
    assert_eq!(report.comments.count_by_group.len(), 4);

    let bsit_b = report
        .barriers
        .by_group
        .iter()
        .find(|r| r.group == "BSIT B")
        .unwrap();
    assert_eq!(bsit_b.total_reported, 2);
    assert_eq!(bsit_b.top_label(), "Cost");

    let bscs_a = report.section("BSCS A").unwrap();
    assert_eq!(bscs_a.barriers.top_label(), "Health");
    assert_eq!(bscs_a.sentiment.label, "Very Positive");
}

#[test]
fn test_empty_selection_report() {
    let ds = fixture();
    let selection = Selection::new(Vec::<String>::new(), ["A", "B"]);
    let report = build_report(&ds, &selection, &ReportConfig::default()).unwrap();

    assert_eq!(report.key_metrics.total_responses, 0);
    assert!(report.key_metrics.first_response.is_none());
    assert!(report.location.distribution.is_empty());
    assert!(report.barriers.crosstab.is_empty());
    // vocabulary stays fixed, every barrier counted zero
    assert_eq!(report.barriers.frequency.len(), 4);
    assert_eq!(report.barriers.frequency.total(), 0);
    assert_eq!(report.sentiment.overall.overall, 0.0);
    assert!(report.comparison.is_empty());

    let html = render_report_html(&report).unwrap();
    assert!(html.contains("No responses in this selection."));
}

#[test]
fn test_html_embeds_json_payload() {
    let report = full_report();
    let html = render_report_html(&report).unwrap();
    assert!(html.contains(r#"<script type="application/json" id="survey-report-data">"#));
    assert!(html.contains("Educational Tour Survey Report"));
    assert!(html.contains("Parental permission"));

    let json = report.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["key_metrics"]["total_responses"], 10);
    assert_eq!(value["location"]["question"], "location");
}

#[test]
fn test_html_renders_metrics_insights_and_group_headers() {
    let html = render_report_html(&full_report()).unwrap();
    assert!(html.contains("Responses from 2025-09-01 08:15 to 2025-09-03 08:05"));
    assert!(html.contains("Concerning: BSCS B, BSIT A"));
    assert!(html.contains("Very positive: BSCS A"));
    assert!(html.contains("<th>Definitely or Probably</th>"));
    assert!(html.contains("<th>Total Reported</th>"));
    assert!(html.contains("<th>Definitely Willing</th><th>Top Location</th>"));
}
