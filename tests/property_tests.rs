use polars::prelude::*;
use proptest::prelude::*;

use survey_report::aggregation::{barrier_frequency, grouped_crosstab, partition_groups, top_choice};
use survey_report::barriers::{tokenize, BarrierMatch};
use survey_report::loader::normalize;
use survey_report::schema::{derived, survey};

const BARRIERS: [&str; 5] = ["Cost", "Cost of Living", "Health", "Time conflict", "Work/Job"];

fn raw_frame(rows: &[(String, String, String, Option<String>)]) -> DataFrame {
    let columns: Vec<Column> = survey::ALL
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let values: Vec<Option<String>> = rows
                .iter()
                .map(|(program, section, answer, barriers)| match i {
                    3 => Some(program.clone()),
                    4 => Some(section.clone()),
                    6 => Some(answer.clone()),
                    11 => barriers.clone(),
                    _ => Some(format!("v{i}")),
                })
                .collect();
            Column::new((*name).into(), values)
        })
        .collect();
    DataFrame::new(columns).unwrap()
}

fn barrier_field() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop::collection::vec(prop::sample::select(BARRIERS.to_vec()), 0..4))
        .prop_map(|picked| picked.map(|p| p.join("; ")))
}

fn responses() -> impl Strategy<Value = Vec<(String, String, String, Option<String>)>> {
    prop::collection::vec(
        (
            prop::sample::select(vec!["BSIT", "BSCS"]).prop_map(str::to_string),
            prop::sample::select(vec!["A", "B", "C"]).prop_map(str::to_string),
            prop::sample::select(vec!["Expensive", "Affordable"]).prop_map(str::to_string),
            barrier_field(),
        ),
        0..40,
    )
}

proptest! {
    #[test]
    fn prop_crosstab_rows_sum_to_group_sizes(rows in responses()) {
        let ds = normalize(raw_frame(&rows), BarrierMatch::Substring).unwrap();
        let ct = grouped_crosstab(
            ds.frame(),
            derived::PROGRAM_SECTION,
            survey::AFFORDABILITY_RATING,
        )
        .unwrap();
        let groups = partition_groups(ds.frame(), derived::PROGRAM_SECTION).unwrap();

        prop_assert_eq!(ct.groups.len(), groups.len());
        for ((group, df), total) in groups.iter().zip(ct.row_totals()) {
            prop_assert_eq!(ct.group_index(group).is_some(), true);
            prop_assert_eq!(total as usize, df.height());
        }
    }

    #[test]
    fn prop_percentage_rows_sum_to_hundred(rows in responses()) {
        let ds = normalize(raw_frame(&rows), BarrierMatch::Substring).unwrap();
        let pct = grouped_crosstab(
            ds.frame(),
            derived::PROGRAM_SECTION,
            survey::AFFORDABILITY_RATING,
        )
        .unwrap()
        .percentages();
        for row in &pct.values {
            let sum: f64 = row.iter().sum();
            prop_assert!((sum - 100.0).abs() <= 0.1 + 1e-9, "row sums to {}", sum);
        }
    }

    #[test]
    fn prop_barrier_frequency_counts_containing_rows(rows in responses()) {
        let ds = normalize(raw_frame(&rows), BarrierMatch::Substring).unwrap();
        let freq = barrier_frequency(ds.frame(), ds.vocabulary()).unwrap();
        for entry in freq.entries() {
            let expected = rows
                .iter()
                .filter(|r| r.3.as_deref().is_some_and(|b| b.contains(entry.value.as_str())))
                .count();
            prop_assert_eq!(entry.count as usize, expected);
        }
    }

    #[test]
    fn prop_exact_matching_never_exceeds_substring(rows in responses()) {
        let loose = normalize(raw_frame(&rows), BarrierMatch::Substring).unwrap();
        let strict = normalize(raw_frame(&rows), BarrierMatch::Exact).unwrap();
        let loose = barrier_frequency(loose.frame(), loose.vocabulary()).unwrap();
        let strict = barrier_frequency(strict.frame(), strict.vocabulary()).unwrap();
        for (l, s) in loose.entries().iter().zip(strict.entries()) {
            prop_assert_eq!(&l.value, &s.value);
            prop_assert!(s.count <= l.count);
        }
    }

    #[test]
    fn prop_normalize_is_idempotent(rows in responses()) {
        let first = normalize(raw_frame(&rows), BarrierMatch::Substring).unwrap();
        let second = normalize(raw_frame(&rows), BarrierMatch::Substring).unwrap();
        prop_assert!(first.frame().equals_missing(second.frame()));
        prop_assert_eq!(first.vocabulary(), second.vocabulary());
    }
}

#[test]
fn test_tokenize_collapses_duplicates() {
    let rows = vec![(
        "BSIT".to_string(),
        "A".to_string(),
        "Expensive".to_string(),
        Some("Cost; Time conflict ; Cost".to_string()),
    )];
    let ds = normalize(raw_frame(&rows), BarrierMatch::Substring).unwrap();
    let labels: Vec<&str> = ds.vocabulary().labels().collect();
    assert_eq!(labels, vec!["Cost", "Time conflict"]);
    assert_eq!(tokenize("Cost; Time conflict ; Cost").count(), 3);
}

#[test]
fn test_top_choice_majority_and_tie() {
    let df = DataFrame::new(vec![Column::new("x".into(), &["A", "B", "A"])]).unwrap();
    let top = top_choice(&df, "x").unwrap().unwrap();
    assert_eq!((top.value.as_str(), top.count), ("A", 2));

    let df = DataFrame::new(vec![Column::new("x".into(), &["A", "B"])]).unwrap();
    assert_eq!(top_choice(&df, "x").unwrap().unwrap().value, "A");
}
