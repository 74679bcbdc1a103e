use std::collections::BTreeMap;

use devtrack_app_lib::db::DbPool;
use devtrack_app_lib::models::developer::DeveloperCreateInput;
use devtrack_app_lib::models::evaluation::EvaluationSchema;
use devtrack_app_lib::models::report::ReportSubmitInput;
use devtrack_app_lib::models::team::TeamCreateInput;
use devtrack_app_lib::state::AppState;
use tempfile::tempdir;

fn uniform_scores(value: f64) -> BTreeMap<String, f64> {
    EvaluationSchema::builtin()
        .all_questions()
        .into_iter()
        .map(|question| (question.key, value))
        .collect()
}

fn create_developer(state: &AppState, name: &str, team_id: Option<String>) -> String {
    state
        .developers()
        .create_developer(DeveloperCreateInput {
            name: name.into(),
            role: "Engineer".into(),
            team_id,
        })
        .expect("create developer")
        .id
}

fn submit(state: &AppState, developer_id: &str, month: &str, value: f64) {
    state
        .reports()
        .submit_report(ReportSubmitInput {
            developer_id: developer_id.into(),
            month: month.into(),
            question_scores: uniform_scores(value),
            highlights: None,
            points_to_develop: None,
        })
        .expect("submit report");
}

#[test]
fn time_series_is_ascending_with_one_point_per_report() {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("series.sqlite")).expect("db pool");
    let state = AppState::new(pool).expect("app state");

    let developer_id = create_developer(&state, "Ana", None);

    // Submitted out of chronological order on purpose.
    submit(&state, &developer_id, "2024-06", 8.0);
    submit(&state, &developer_id, "2024-02", 5.0);
    submit(&state, &developer_id, "2024-04", 6.5);

    let series = state
        .analytics()
        .time_series(&developer_id)
        .expect("time series");

    assert_eq!(series.len(), 3);
    assert_eq!(series[0].month, "2024-02");
    assert_eq!(series[0].score, 5.0);
    assert_eq!(series[1].month, "2024-04");
    assert_eq!(series[1].score, 6.5);
    assert_eq!(series[2].month, "2024-06");
    assert_eq!(series[2].score, 8.0);

    // Restartable: a second pass sees the same points.
    let again = state
        .analytics()
        .time_series(&developer_id)
        .expect("time series again");
    assert_eq!(series, again);

    let unknown = state.analytics().time_series("missing-developer");
    assert!(unknown.expect_err("unknown developer").is_not_found());
}

#[test]
fn category_breakdown_follows_the_stored_report() {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("breakdown.sqlite")).expect("db pool");
    let state = AppState::new(pool).expect("app state");

    let developer_id = create_developer(&state, "Bruno", None);
    submit(&state, &developer_id, "2024-05", 7.0);

    let report = state
        .reports()
        .latest_report(&developer_id)
        .expect("latest report")
        .expect("report exists");

    let breakdown = state.analytics().category_breakdown(&report);
    assert_eq!(breakdown.len(), 3);
    assert_eq!(breakdown[0].key, "commitment");
    assert_eq!(breakdown[1].key, "technicalQuality");
    assert_eq!(breakdown[2].key, "collaboration");
    for entry in &breakdown {
        assert_eq!(entry.score, 7.0);
    }
}

#[test]
fn team_rollup_averages_active_members_only() {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("team_rollup.sqlite")).expect("db pool");
    let state = AppState::new(pool).expect("app state");

    let team = state
        .teams()
        .create_team(TeamCreateInput {
            name: "Plataforma".into(),
            description: None,
            color: Some("violet".into()),
        })
        .expect("create team");

    let empty = state.analytics().team_rollup(&team.id).expect("empty rollup");
    assert_eq!(empty.average_score, None);
    assert_eq!(empty.developer_count, 0);

    let ana = create_developer(&state, "Ana", Some(team.id.clone()));
    let bruno = create_developer(&state, "Bruno", Some(team.id.clone()));
    let carla = create_developer(&state, "Carla", Some(team.id.clone()));

    submit(&state, &ana, "2024-05", 9.0);
    submit(&state, &bruno, "2024-05", 6.0);
    submit(&state, &carla, "2024-05", 3.0);

    let full = state.analytics().team_rollup(&team.id).expect("full rollup");
    assert_eq!(full.developer_count, 3);
    assert_eq!(full.average_score, Some(6.0));

    // Archiving a member pulls it out of the rollup without touching its
    // report history.
    state
        .developers()
        .set_archived(&carla, true)
        .expect("archive carla");

    let active_only = state
        .analytics()
        .team_rollup(&team.id)
        .expect("active rollup");
    assert_eq!(active_only.developer_count, 2);
    assert_eq!(active_only.average_score, Some(7.5));

    let missing = state.analytics().team_rollup("missing-team");
    assert!(missing.expect_err("unknown team").is_not_found());
}

#[test]
fn consolidated_rollup_excludes_developers_without_a_report() {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("consolidated.sqlite")).expect("db pool");
    let state = AppState::new(pool).expect("app state");

    let ana = create_developer(&state, "Ana", None);
    let bruno = create_developer(&state, "Bruno", None);
    let _carla = create_developer(&state, "Carla", None);

    submit(&state, &ana, "2024-05", 8.0);
    submit(&state, &bruno, "2024-05", 6.0);

    // Three developers, two reports: the average covers the two who
    // reported, never the silent third.
    let rollup = state
        .analytics()
        .consolidated_rollup("2024-05")
        .expect("consolidated rollup");
    assert_eq!(rollup.month, "2024-05");
    assert_eq!(rollup.report_count, 2);
    assert_eq!(rollup.average_score, Some(7.0));

    let empty = state
        .analytics()
        .consolidated_rollup("2024-07")
        .expect("empty month rollup");
    assert_eq!(empty.report_count, 0);
    assert_eq!(empty.average_score, None);

    let malformed = state.analytics().consolidated_rollup("2024/05");
    assert!(malformed.is_err());
}
