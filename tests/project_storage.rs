use schemaway::project::{
    DatabaseManager, NewProject, Owner, ProjectError, ProjectPatch, ProjectService, ProjectStorage,
};
use schemaway::schema::canvas::{NodeKind, NodeMove};
use schemaway::schema::defaults::{new_column, new_relation, new_table};
use schemaway::schema::{Engine, Position};
use schemaway::workspace::{WorkspaceError, WorkspaceRole, WorkspaceService, WorkspaceStorage};
use tempfile::TempDir;

async fn services() -> (TempDir, ProjectService, WorkspaceService) {
    let dir = tempfile::tempdir().expect("temp dir");
    let database = DatabaseManager::open(dir.path()).await.expect("open database");
    let projects = ProjectService::new(ProjectStorage::new(database.pool().clone()));
    let workspaces = WorkspaceService::new(WorkspaceStorage::new(database.pool().clone()));
    (dir, projects, workspaces)
}

fn blog_schema() -> NewProject {
    let engine = Engine::Postgresql;
    let mut users = new_table(engine, &[], Position::new(0.0, 0.0));
    users.name = "users".into();
    let mut posts = new_table(engine, &[users.clone()], Position::new(320.0, 0.0));
    posts.name = "posts".into();
    let mut author = new_column(engine, &posts);
    author.name = "author_id".into();
    author.sql_type = "INTEGER".into();
    author.length = None;
    posts.columns.push(author.clone());
    let relation = new_relation(&posts.id, &author.id, &users.id, &users.columns[0].id);

    let mut project = NewProject::empty("Blog", engine);
    project.tables = vec![users, posts];
    project.relations = vec![relation];
    project
}

#[tokio::test]
async fn create_get_list_and_delete_round_trip() {
    let (_dir, projects, _) = services().await;
    let owner = Owner::User("alice".into());

    let created = projects.create(&owner, blog_schema()).await.expect("create");
    assert_eq!(created.user_id.as_deref(), Some("alice"));
    assert_eq!(created.created_at, created.updated_at);

    let loaded = projects.get(&owner, &created.id).await.expect("get");
    assert_eq!(loaded, created);

    let listed = projects.list(&owner).await.expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Blog");
    assert_eq!(listed[0].table_count, 2);
    assert_eq!(listed[0].engine, Engine::Postgresql);

    projects.delete(&owner, &created.id).await.expect("delete");
    assert!(matches!(
        projects.get(&owner, &created.id).await,
        Err(ProjectError::NotFound(_))
    ));
    assert!(matches!(
        projects.delete(&owner, &created.id).await,
        Err(ProjectError::NotFound(_))
    ));
}

#[tokio::test]
async fn projects_are_invisible_outside_their_owner() {
    let (_dir, projects, workspaces) = services().await;
    let alice = Owner::User("alice".into());
    let bob = Owner::User("bob".into());

    let project = projects.create(&alice, blog_schema()).await.expect("create");

    assert!(matches!(projects.get(&bob, &project.id).await, Err(ProjectError::NotFound(_))));
    assert!(projects.list(&bob).await.expect("list").is_empty());
    let patch = ProjectPatch {
        name: Some("Hijacked".into()),
        ..ProjectPatch::default()
    };
    assert!(matches!(
        projects.update(&bob, &project.id, patch).await,
        Err(ProjectError::NotFound(_))
    ));
    assert!(matches!(projects.delete(&bob, &project.id).await, Err(ProjectError::NotFound(_))));

    // A workspace of alice's is its own scope too
    let team = workspaces.create("alice", "Team").await.expect("workspace");
    let team_owner = Owner::Workspace(team.workspace.id.clone());
    assert!(projects.list(&team_owner).await.expect("list").is_empty());
    assert_eq!(projects.list(&alice).await.expect("list").len(), 1);
}

#[tokio::test]
async fn update_validates_merged_document_and_bumps_updated_at() {
    let (_dir, projects, _) = services().await;
    let owner = Owner::User("alice".into());
    let project = projects.create(&owner, blog_schema()).await.expect("create");

    let rename = ProjectPatch {
        name: Some("  Blog v2 ".into()),
        ..ProjectPatch::default()
    };
    let renamed = projects.update(&owner, &project.id, rename).await.expect("rename");
    assert_eq!(renamed.name, "Blog v2");
    assert_eq!(renamed.created_at, project.created_at);
    assert!(renamed.updated_at >= project.updated_at);
    assert_eq!(renamed.schema.relations, project.schema.relations);

    // Dropping the tables but keeping relations leaves dangling references
    let broken = ProjectPatch {
        tables: Some(Vec::new()),
        ..ProjectPatch::default()
    };
    match projects.update(&owner, &project.id, broken).await {
        Err(ProjectError::Invalid(report)) => {
            assert!(report.issues.iter().any(|i| i.path == "relations[0].sourceTableId"));
        }
        other => panic!("expected validation failure, got {other:?}"),
    }

    let stored = projects.get(&owner, &project.id).await.expect("get");
    assert_eq!(stored.schema.tables.len(), 2);
    assert_eq!(stored.name, "Blog v2");
}

#[tokio::test]
async fn switching_engine_revalidates_types() {
    let (_dir, projects, _) = services().await;
    let owner = Owner::User("alice".into());
    let project = projects.create(&owner, blog_schema()).await.expect("create");

    // SERIAL keys are PostgreSQL-only
    let patch = ProjectPatch {
        engine: Some(Engine::Sqlite),
        ..ProjectPatch::default()
    };
    let err = projects.update(&owner, &project.id, patch).await.expect_err("SERIAL is not SQLite");
    assert!(matches!(err, ProjectError::Invalid(_)));
}

#[tokio::test]
async fn create_rejects_blank_names_and_invalid_schemas() {
    let (_dir, projects, _) = services().await;
    let owner = Owner::User("alice".into());

    let blank = NewProject::empty("   ", Engine::Mysql);
    assert!(matches!(
        projects.create(&owner, blank).await,
        Err(ProjectError::InvalidName(_))
    ));

    let mut dangling = blog_schema();
    dangling.tables.truncate(1);
    assert!(matches!(
        projects.create(&owner, dangling).await,
        Err(ProjectError::Invalid(_))
    ));
    assert!(projects.list(&owner).await.expect("list").is_empty());
}

#[tokio::test]
async fn list_orders_by_most_recent_update() {
    let (_dir, projects, _) = services().await;
    let owner = Owner::User("alice".into());

    let first = projects
        .create(&owner, NewProject::empty("First", Engine::Sqlite))
        .await
        .expect("create");
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = projects
        .create(&owner, NewProject::empty("Second", Engine::Sqlite))
        .await
        .expect("create");
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    let names: Vec<String> = projects
        .list(&owner)
        .await
        .expect("list")
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["Second", "First"]);

    let touch = ProjectPatch {
        name: Some("First again".into()),
        ..ProjectPatch::default()
    };
    projects.update(&owner, &first.id, touch).await.expect("update");

    let ids: Vec<String> = projects
        .list(&owner)
        .await
        .expect("list")
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, vec![first.id, second.id]);
}

#[tokio::test]
async fn duplicate_and_move_nodes() {
    let (_dir, projects, _) = services().await;
    let owner = Owner::User("alice".into());
    let project = projects.create(&owner, blog_schema()).await.expect("create");

    let copy = projects.duplicate(&owner, &project.id).await.expect("duplicate");
    assert_ne!(copy.id, project.id);
    assert_eq!(copy.name, "Blog (copy)");
    assert_eq!(copy.schema, project.schema);
    assert_eq!(projects.list(&owner).await.expect("list").len(), 2);

    let table_id = project.schema.tables[0].id.clone();
    let moved = projects
        .move_nodes(
            &owner,
            &project.id,
            &[NodeMove {
                id: table_id.clone(),
                kind: NodeKind::Table,
                position: Position::new(42.0, 7.0),
            }],
        )
        .await
        .expect("move");
    assert_eq!(moved.schema.table(&table_id).map(|t| t.position), Some(Position::new(42.0, 7.0)));

    let unknown = projects
        .move_nodes(
            &owner,
            &project.id,
            &[NodeMove {
                id: "ghost".into(),
                kind: NodeKind::Note,
                position: Position::default(),
            }],
        )
        .await;
    assert!(matches!(unknown, Err(ProjectError::UnknownNodes(ids)) if ids == vec!["ghost".to_string()]));
}

#[tokio::test]
async fn deleting_a_workspace_removes_its_projects() {
    let (_dir, projects, workspaces) = services().await;
    let team = workspaces.create("alice", "Team").await.expect("workspace");
    let owner = Owner::Workspace(team.workspace.id.clone());

    let project = projects.create(&owner, blog_schema()).await.expect("create");
    assert_eq!(project.workspace_id.as_deref(), Some(team.workspace.id.as_str()));
    assert_eq!(project.user_id, None);

    workspaces.add_member(&team.workspace.id, "alice", "bob", WorkspaceRole::Member)
        .await
        .expect("add member");
    workspaces.delete(&team.workspace.id, "alice").await.expect("delete workspace");

    assert!(projects.list(&owner).await.expect("list").is_empty());
    assert!(workspaces.list_for_user("bob").await.expect("list").is_empty());
}

#[tokio::test]
async fn the_last_owner_cannot_be_demoted_or_leave() {
    let (_dir, _, workspaces) = services().await;
    let team = workspaces.create("alice", "Team").await.expect("workspace");
    let id = team.workspace.id.as_str();

    let demote = workspaces.add_member(id, "alice", "alice", WorkspaceRole::Member).await;
    assert!(matches!(demote, Err(WorkspaceError::LastOwner(_))));
    let leave = workspaces.remove_member(id, "alice", "alice").await;
    assert!(matches!(leave, Err(WorkspaceError::LastOwner(_))));

    // With a second owner in place the demotion goes through
    workspaces.add_member(id, "alice", "bob", WorkspaceRole::Owner).await.expect("add owner");
    let members = workspaces
        .add_member(id, "bob", "alice", WorkspaceRole::Member)
        .await
        .expect("demote");
    let roles: Vec<(String, WorkspaceRole)> =
        members.into_iter().map(|m| (m.user_id, m.role)).collect();
    assert!(roles.contains(&("alice".to_string(), WorkspaceRole::Member)));
    assert!(roles.contains(&("bob".to_string(), WorkspaceRole::Owner)));

    // A plain member may leave on their own but not remove others
    assert!(matches!(
        workspaces.remove_member(id, "alice", "bob").await,
        Err(WorkspaceError::OwnerRequired(_))
    ));
    assert!(workspaces.remove_member(id, "alice", "alice").await.expect("leave"));
    assert!(workspaces.list_for_user("alice").await.expect("list").is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_owner_removals_keep_an_owner() {
    let (_dir, _, workspaces) = services().await;

    for round in 0..20 {
        let team = workspaces.create("alice", &format!("Team {round}")).await.expect("workspace");
        let id = team.workspace.id.clone();
        workspaces.add_member(&id, "alice", "bob", WorkspaceRole::Owner).await.expect("add owner");

        let (alice_removes_bob, bob_removes_alice) = tokio::join!(
            workspaces.remove_member(&id, "alice", "bob"),
            workspaces.remove_member(&id, "bob", "alice"),
        );
        let removed = [&alice_removes_bob, &bob_removes_alice]
            .iter()
            .filter(|result| matches!(result, Ok(true)))
            .count();
        assert_eq!(removed, 1, "round {round}: {alice_removes_bob:?} / {bob_removes_alice:?}");

        let survivor = if matches!(alice_removes_bob, Ok(true)) { "alice" } else { "bob" };
        let details = workspaces.details(&id, survivor).await.expect("details");
        let owners = details.members.iter().filter(|m| m.role == WorkspaceRole::Owner).count();
        assert_eq!(owners, 1, "round {round}");
    }
}

#[tokio::test]
async fn reopening_the_database_keeps_data() {
    let dir = tempfile::tempdir().expect("temp dir");
    let owner = Owner::User("alice".into());

    let id = {
        let database = DatabaseManager::open(dir.path()).await.expect("open");
        let projects = ProjectService::new(ProjectStorage::new(database.pool().clone()));
        let project = projects.create(&owner, blog_schema()).await.expect("create");
        database.close().await;
        project.id
    };

    let database = DatabaseManager::open(dir.path()).await.expect("reopen");
    assert!(database.db_path().ends_with("schemaway.db"));
    let projects = ProjectService::new(ProjectStorage::new(database.pool().clone()));
    let project = projects.get(&owner, &id).await.expect("get");
    assert_eq!(project.schema.tables.len(), 2);
}
