use std::collections::BTreeMap;

use devtrack_app_lib::db::DbPool;
use devtrack_app_lib::models::developer::DeveloperCreateInput;
use devtrack_app_lib::models::evaluation::EvaluationSchema;
use devtrack_app_lib::models::report::ReportSubmitInput;
use devtrack_app_lib::state::AppState;
use tempfile::tempdir;

fn scores(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), *value))
        .collect()
}

fn uniform_scores(value: f64) -> BTreeMap<String, f64> {
    EvaluationSchema::builtin()
        .all_questions()
        .into_iter()
        .map(|question| (question.key, value))
        .collect()
}

#[test]
fn reporting_flow_from_submission_to_stats() {
    let dir = tempdir().expect("temp dir");
    let db_path = dir.path().join("reporting.sqlite");
    let pool = DbPool::new(&db_path).expect("db pool");
    let state = AppState::new(pool).expect("app state");

    let developers = state.developers();
    let reports = state.reports();

    let ana = developers
        .create_developer(DeveloperCreateInput {
            name: "Ana".into(),
            role: "Backend".into(),
            team_id: None,
        })
        .expect("create ana");
    let bruno = developers
        .create_developer(DeveloperCreateInput {
            name: "Bruno".into(),
            role: "Frontend".into(),
            team_id: None,
        })
        .expect("create bruno");

    // Worked example from the product sheet: every question at 10 lands a
    // perfect category set and a perfect overall score.
    let perfect = reports
        .submit_report(ReportSubmitInput {
            developer_id: ana.id.clone(),
            month: "2024-05".into(),
            question_scores: uniform_scores(10.0),
            highlights: Some("Entregou o gateway de pagamentos".into()),
            points_to_develop: None,
        })
        .expect("submit perfect report");

    assert_eq!(perfect.weighted_average_score, 10.0);
    assert_eq!(perfect.category_scores["commitment"], 10.0);
    assert_eq!(perfect.category_scores["technicalQuality"], 10.0);
    assert_eq!(perfect.category_scores["collaboration"], 10.0);

    let fetched = reports.get_report(&perfect.id).expect("fetch by id");
    assert_eq!(fetched, perfect);

    // The schema the service computed against is exposed for label
    // rendering; the input form lists every question exactly once.
    assert_eq!(reports.schema().all_questions().len(), 8);

    let flat = reports
        .submit_report(ReportSubmitInput {
            developer_id: ana.id.clone(),
            month: "2024-06".into(),
            question_scores: uniform_scores(5.0),
            highlights: None,
            points_to_develop: Some("Revisões de PR mais detalhadas".into()),
        })
        .expect("submit flat report");
    assert_eq!(flat.weighted_average_score, 5.0);

    // Partial submission: missing questions count as zero, they are not an
    // error.
    let partial = reports
        .submit_report(ReportSubmitInput {
            developer_id: bruno.id.clone(),
            month: "2024-06".into(),
            question_scores: scores(&[("deliveryQuality", 10.0)]),
            highlights: None,
            points_to_develop: None,
        })
        .expect("submit partial report");
    assert_eq!(partial.category_scores["technicalQuality"], 5.71);
    assert_eq!(partial.category_scores["commitment"], 0.0);
    assert_eq!(partial.weighted_average_score, 2.29);

    // A second report for the same developer and month is rejected, the
    // first one stays untouched.
    let duplicate = reports
        .submit_report(ReportSubmitInput {
            developer_id: ana.id.clone(),
            month: "2024-06".into(),
            question_scores: uniform_scores(9.0),
            highlights: None,
            points_to_develop: None,
        })
        .expect_err("duplicate month rejected");
    assert!(duplicate.is_conflict());

    let by_ana = reports
        .reports_by_developer(&ana.id)
        .expect("reports by ana");
    assert_eq!(by_ana.len(), 2);
    assert_eq!(by_ana[0].month, "2024-06");
    assert_eq!(by_ana[1].month, "2024-05");

    let latest = reports
        .latest_report(&ana.id)
        .expect("latest report")
        .expect("ana has reports");
    assert_eq!(latest.month, "2024-06");

    // The denormalized developer score tracks the most recent month.
    let ana_after = developers.get_developer(&ana.id).expect("get ana");
    assert_eq!(ana_after.latest_performance_score, 5.0);

    // Back-filling an older month never lowers the cached latest score.
    reports
        .submit_report(ReportSubmitInput {
            developer_id: ana.id.clone(),
            month: "2024-01".into(),
            question_scores: uniform_scores(2.0),
            highlights: None,
            points_to_develop: None,
        })
        .expect("backfill january");
    let ana_after_backfill = developers.get_developer(&ana.id).expect("get ana again");
    assert_eq!(ana_after_backfill.latest_performance_score, 5.0);

    // Explicit refresh recomputes the same value from report history.
    let refreshed = developers
        .refresh_latest_score(&ana.id)
        .expect("refresh latest score");
    assert_eq!(refreshed.latest_performance_score, 5.0);

    let june = reports
        .reports_by_month("2024-06")
        .expect("reports for june");
    assert_eq!(june.len(), 2);

    let months = reports.available_months().expect("available months");
    assert_eq!(months, vec!["2024-01", "2024-05", "2024-06"]);

    let stats = reports.stats().expect("stats");
    assert_eq!(stats.total_reports, 4);
    assert_eq!(stats.developers_evaluated, 2);
    assert_eq!(stats.months_covered, 3);
    // (10.0 + 5.0 + 2.29 + 2.0) / 4
    assert_eq!(stats.average_score, Some(4.82));
}

#[test]
fn empty_store_reports_no_data_stats() {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("empty.sqlite")).expect("db pool");
    let state = AppState::new(pool).expect("app state");

    let stats = state.reports().stats().expect("stats");
    assert_eq!(stats.total_reports, 0);
    assert_eq!(stats.developers_evaluated, 0);
    assert_eq!(stats.months_covered, 0);
    assert_eq!(stats.average_score, None);

    let months = state.reports().available_months().expect("months");
    assert!(months.is_empty());
}
