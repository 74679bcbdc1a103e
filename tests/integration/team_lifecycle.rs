use devtrack_app_lib::db::DbPool;
use devtrack_app_lib::models::developer::{DeveloperCreateInput, DeveloperUpdateInput};
use devtrack_app_lib::models::team::{TeamCreateInput, TeamUpdateInput};
use devtrack_app_lib::state::AppState;
use tempfile::tempdir;

fn new_state(name: &str) -> (AppState, tempfile::TempDir) {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join(name)).expect("db pool");
    let state = AppState::new(pool).expect("app state");
    (state, dir)
}

#[test]
fn team_crud_round_trip() {
    let (state, _dir) = new_state("team_crud.sqlite");
    let teams = state.teams();

    let created = teams
        .create_team(TeamCreateInput {
            name: "Mobile".into(),
            description: Some("Aplicativos iOS e Android".into()),
            color: Some("teal".into()),
        })
        .expect("create team");
    assert_eq!(created.color, "teal");

    let updated = teams
        .update_team(
            &created.id,
            TeamUpdateInput {
                name: Some("Mobile Core".into()),
                description: None,
                color: Some("indigo".into()),
            },
        )
        .expect("update team");
    assert_eq!(updated.name, "Mobile Core");
    assert_eq!(updated.color, "indigo");
    assert_eq!(updated.description, "Aplicativos iOS e Android");

    let listed = teams.list_teams().expect("list teams");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Mobile Core");

    teams.delete_team(&created.id).expect("delete team");
    assert!(teams.get_team(&created.id).is_err());
}

#[test]
fn deleting_a_team_detaches_its_developers() {
    let (state, _dir) = new_state("team_delete.sqlite");

    let team = state
        .teams()
        .create_team(TeamCreateInput {
            name: "Plataforma".into(),
            description: None,
            color: None,
        })
        .expect("create team");

    let developers = state.developers();
    let ana = developers
        .create_developer(DeveloperCreateInput {
            name: "Ana".into(),
            role: "Backend".into(),
            team_id: Some(team.id.clone()),
        })
        .expect("create ana");
    let bruno = developers
        .create_developer(DeveloperCreateInput {
            name: "Bruno".into(),
            role: "Frontend".into(),
            team_id: Some(team.id.clone()),
        })
        .expect("create bruno");

    let members = state.teams().team_developers(&team.id).expect("members");
    assert_eq!(members.len(), 2);

    state.teams().delete_team(&team.id).expect("delete team");

    // Developers survive their team: still active, reference cleared.
    for id in [&ana.id, &bruno.id] {
        let developer = developers.get_developer(id).expect("get developer");
        assert_eq!(developer.team_id, None);
        assert!(developer.archived_at.is_none());
    }
}

#[test]
fn developer_team_assignment_can_be_changed_and_cleared() {
    let (state, _dir) = new_state("assignment.sqlite");

    let team = state
        .teams()
        .create_team(TeamCreateInput {
            name: "Dados".into(),
            description: None,
            color: Some("grape".into()),
        })
        .expect("create team");

    let developer = state
        .developers()
        .create_developer(DeveloperCreateInput {
            name: "Carla".into(),
            role: "Data Engineer".into(),
            team_id: None,
        })
        .expect("create developer");
    assert_eq!(developer.team_id, None);

    let assigned = state
        .developers()
        .update_developer(
            &developer.id,
            DeveloperUpdateInput {
                name: None,
                role: None,
                team_id: Some(Some(team.id.clone())),
            },
        )
        .expect("assign team");
    assert_eq!(assigned.team_id, Some(team.id.clone()));

    let cleared = state
        .developers()
        .update_developer(
            &developer.id,
            DeveloperUpdateInput {
                name: None,
                role: None,
                team_id: Some(None),
            },
        )
        .expect("clear team");
    assert_eq!(cleared.team_id, None);

    let unknown_team = state.developers().update_developer(
        &developer.id,
        DeveloperUpdateInput {
            name: None,
            role: None,
            team_id: Some(Some("missing-team".into())),
        },
    );
    assert!(unknown_team.expect_err("unknown team").is_not_found());
}

#[test]
fn archive_and_restore_move_developers_between_views() {
    let (state, _dir) = new_state("archive.sqlite");
    let developers = state.developers();

    let ana = developers
        .create_developer(DeveloperCreateInput {
            name: "Ana".into(),
            role: "Backend".into(),
            team_id: None,
        })
        .expect("create ana");

    assert_eq!(developers.list_developers(false).expect("active").len(), 1);
    assert!(developers.list_archived().expect("archived").is_empty());

    developers.set_archived(&ana.id, true).expect("archive");
    assert!(developers.list_developers(false).expect("active").is_empty());
    assert_eq!(developers.list_developers(true).expect("all").len(), 1);
    assert_eq!(developers.list_archived().expect("archived").len(), 1);

    // Restoring an active developer (or archiving an archived one) is the
    // losing side of the exclusive transition.
    let conflict = developers.set_archived(&ana.id, true);
    assert!(conflict.expect_err("double archive").is_conflict());

    developers.set_archived(&ana.id, false).expect("restore");
    assert_eq!(developers.list_developers(false).expect("active").len(), 1);
    assert!(developers.list_archived().expect("archived").is_empty());
}
