use chrono::NaiveDate;
use sprintboard_core::{SprintboardError, SprintboardResult};
use sprintboard_domain::commands::*;
use sprintboard_domain::query::board;
use sprintboard_domain::*;
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn create_project(ws: &mut Workspace, title: &str) -> Uuid {
    ws.apply(&CreateProject {
        draft: ProjectDraft {
            title: title.to_string(),
            ..Default::default()
        },
        owner_id: "owner-1".to_string(),
    })
    .unwrap();
    ws.projects.last().unwrap().id
}

fn create_sprint(ws: &mut Workspace, project_id: Uuid, title: &str, seed: bool) -> Uuid {
    ws.apply(&CreateSprint {
        project_id,
        draft: SprintDraft {
            title: title.to_string(),
            description: String::new(),
            start_date: date(2024, 1, 1),
            end_date: date(2024, 1, 14),
        },
        seed_default_columns: seed,
    })
    .unwrap();
    ws.sprints.last().unwrap().id
}

fn create_task(ws: &mut Workspace, sprint_id: Uuid, title: &str, points: u32) -> Uuid {
    ws.apply(&CreateTask {
        sprint_id,
        column_id: None,
        draft: TaskDraft {
            title: title.to_string(),
            story_points: points,
            ..Default::default()
        },
    })
    .unwrap();
    ws.tasks.last().unwrap().id
}

fn column_id(ws: &Workspace, sprint_id: Uuid, title: &str) -> Uuid {
    ws.columns
        .iter()
        .find(|c| c.sprint_id == sprint_id && c.title == title)
        .unwrap()
        .id
}

fn membership(ws: &Workspace, column_id: Uuid) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = ws
        .tasks
        .iter()
        .filter(|t| t.column_id == column_id)
        .map(|t| t.id)
        .collect();
    ids.sort();
    ids
}

#[test]
fn test_delete_project_cascades_only_its_own_rows() {
    let mut ws = Workspace::new();
    let doomed = create_project(&mut ws, "Doomed");
    let kept = create_project(&mut ws, "Kept");

    let doomed_sprint = create_sprint(&mut ws, doomed, "Sprint A", true);
    let kept_sprint = create_sprint(&mut ws, kept, "Sprint B", true);
    create_task(&mut ws, doomed_sprint, "goes away", 3);
    create_task(&mut ws, doomed_sprint, "also goes", 1);
    let survivor = create_task(&mut ws, kept_sprint, "stays", 2);
    ws.apply(&CreateBacklogItem {
        project_id: doomed,
        draft: BacklogItemDraft {
            title: "later".into(),
            ..Default::default()
        },
    })
    .unwrap();

    ws.apply(&DeleteProject { project_id: doomed }).unwrap();

    assert!(ws.project(doomed).is_none());
    assert!(ws.sprints.iter().all(|s| s.project_id != doomed));
    assert!(ws.tasks.iter().all(|t| t.sprint_id != doomed_sprint));
    assert!(ws.columns.iter().all(|c| c.sprint_id != doomed_sprint));
    assert!(ws.backlog_of(doomed).is_empty());

    assert!(ws.project(kept).is_some());
    assert!(ws.task(survivor).is_some());
    assert_eq!(ws.columns.len(), 3);
}

#[test]
fn test_move_task_same_column_changes_nothing() {
    let mut ws = Workspace::new();
    let project = create_project(&mut ws, "P");
    let sprint = create_sprint(&mut ws, project, "S", true);
    let task = create_task(&mut ws, sprint, "t", 1);
    let todo = column_id(&ws, sprint, "TO DO");

    let before = ws.clone();
    ws.apply(&MoveTask {
        task_id: task,
        source_column_id: todo,
        destination_column_id: todo,
    })
    .unwrap();

    assert_eq!(ws, before);
}

#[test]
fn test_move_task_round_trip_restores_membership() {
    let mut ws = Workspace::new();
    let project = create_project(&mut ws, "P");
    let sprint = create_sprint(&mut ws, project, "S", true);
    let moved = create_task(&mut ws, sprint, "moved", 1);
    create_task(&mut ws, sprint, "still", 2);
    let todo = column_id(&ws, sprint, "TO DO");
    let doing = column_id(&ws, sprint, "IN PROGRESS");

    let todo_before = membership(&ws, todo);
    let doing_before = membership(&ws, doing);

    ws.apply(&MoveTask {
        task_id: moved,
        source_column_id: todo,
        destination_column_id: doing,
    })
    .unwrap();
    assert_eq!(membership(&ws, doing), vec![moved]);

    ws.apply(&MoveTask {
        task_id: moved,
        source_column_id: doing,
        destination_column_id: todo,
    })
    .unwrap();

    assert_eq!(membership(&ws, todo), todo_before);
    assert_eq!(membership(&ws, doing), doing_before);
}

#[test]
fn test_complete_sprint_twice_is_fine() {
    let mut ws = Workspace::new();
    let project = create_project(&mut ws, "P");
    let sprint = create_sprint(&mut ws, project, "S", true);

    ws.apply(&CompleteSprint { sprint_id: sprint }).unwrap();
    ws.apply(&CompleteSprint { sprint_id: sprint }).unwrap();

    let sprint = ws.sprint(sprint).unwrap();
    assert!(sprint.is_completed);
    assert_eq!(sprint.status(), SprintStatus::Completed);
}

#[test]
fn test_duplicate_column_title_is_rejected() {
    let mut ws = Workspace::new();
    let project = create_project(&mut ws, "P");
    let sprint = create_sprint(&mut ws, project, "S", true);

    ws.apply(&CreateColumn {
        sprint_id: sprint,
        title: "Review".into(),
    })
    .unwrap();
    let count = ws.columns.len();

    let err = ws
        .apply(&CreateColumn {
            sprint_id: sprint,
            title: "  review ".into(),
        })
        .unwrap_err();

    assert!(matches!(err, SprintboardError::Duplicate(_)));
    assert_eq!(ws.columns.len(), count);
}

#[test]
fn test_same_column_title_allowed_in_another_sprint() {
    let mut ws = Workspace::new();
    let project = create_project(&mut ws, "P");
    let first = create_sprint(&mut ws, project, "S1", true);
    let second = create_sprint(&mut ws, project, "S2", true);

    for sprint_id in [first, second] {
        ws.apply(&CreateColumn {
            sprint_id,
            title: "Review".into(),
        })
        .unwrap();
    }
    assert_eq!(ws.columns.iter().filter(|c| c.title == "Review").count(), 2);
}

#[test]
fn test_website_relaunch_move_to_done() {
    let mut ws = Workspace::new();
    let project = create_project(&mut ws, "Website Relaunch");
    let sprint = create_sprint(&mut ws, project, "Sprint 1", true);
    let task = create_task(&mut ws, sprint, "Design homepage", 5);

    let todo = column_id(&ws, sprint, "TO DO");
    let done = column_id(&ws, sprint, "DONE");
    assert_eq!(ws.task(task).unwrap().column_id, todo);

    ws.apply(&MoveTask {
        task_id: task,
        source_column_id: todo,
        destination_column_id: done,
    })
    .unwrap();

    let lanes = board(&ws, sprint);
    let todo_lane = lanes.iter().find(|l| l.column.id == todo).unwrap();
    let done_lane = lanes.iter().find(|l| l.column.id == done).unwrap();
    assert!(todo_lane.tasks.is_empty());
    assert_eq!(done_lane.tasks.len(), 1);
    assert_eq!(done_lane.tasks[0].id, task);
    assert_eq!(done_lane.tasks[0].column_id, done);
    assert_eq!(done_lane.tasks[0].story_points, 5);
    assert!(done_lane.tasks[0].completion_date.is_some());
}

#[test]
fn test_backlog_move_without_todo_column_keeps_item() {
    let mut ws = Workspace::new();
    let project = create_project(&mut ws, "P");
    let sprint = create_sprint(&mut ws, project, "Bare", false);
    ws.apply(&CreateColumn {
        sprint_id: sprint,
        title: "Doing".into(),
    })
    .unwrap();
    ws.apply(&CreateBacklogItem {
        project_id: project,
        draft: BacklogItemDraft {
            title: "Write docs".into(),
            story_points: 3,
            ..Default::default()
        },
    })
    .unwrap();
    let item = ws.backlog_items[0].id;
    let backlog_before = ws.backlog_items.clone();

    let err = ws
        .apply(&MoveBacklogItemToSprint {
            item_id: item,
            sprint_id: sprint,
        })
        .unwrap_err();

    assert!(matches!(err, SprintboardError::NotFound(_)));
    assert_eq!(ws.backlog_items, backlog_before);
    assert!(ws.tasks.is_empty());
}

#[test]
fn test_backlog_move_creates_equivalent_task() {
    let mut ws = Workspace::new();
    let project = create_project(&mut ws, "P");
    let sprint = create_sprint(&mut ws, project, "S", true);
    ws.apply(&CreateBacklogItem {
        project_id: project,
        draft: BacklogItemDraft {
            title: "Write docs".into(),
            priority: Priority::High,
            story_points: 3,
            ..Default::default()
        },
    })
    .unwrap();
    let item = ws.backlog_items[0].id;

    ws.apply(&MoveBacklogItemToSprint {
        item_id: item,
        sprint_id: sprint,
    })
    .unwrap();

    assert!(ws.backlog_items.is_empty());
    let task = &ws.tasks[0];
    assert_eq!(task.title, "Write docs");
    assert_eq!(task.priority, Priority::High);
    assert_eq!(task.story_points, 3);
    assert_eq!(task.column_id, column_id(&ws, sprint, "TO DO"));
}

#[test]
fn test_delete_column_with_tasks_is_refused() {
    let mut ws = Workspace::new();
    let project = create_project(&mut ws, "P");
    let sprint = create_sprint(&mut ws, project, "S", true);
    ws.apply(&CreateColumn {
        sprint_id: sprint,
        title: "Review".into(),
    })
    .unwrap();
    let review = column_id(&ws, sprint, "Review");
    ws.apply(&CreateTask {
        sprint_id: sprint,
        column_id: Some(review),
        draft: TaskDraft {
            title: "check".into(),
            ..Default::default()
        },
    })
    .unwrap();

    let err = ws.apply(&DeleteColumn { column_id: review }).unwrap_err();
    assert!(matches!(err, SprintboardError::Validation(_)));
    assert!(ws.column(review).is_some());

    let todo = column_id(&ws, sprint, "TO DO");
    assert!(ws.apply(&DeleteColumn { column_id: todo }).is_err());
}

#[test]
fn test_change_set_of_command_matches_touched_rows() {
    let mut ws = Workspace::new();
    let project = create_project(&mut ws, "P");
    let sprint = create_sprint(&mut ws, project, "S", true);
    let task = create_task(&mut ws, sprint, "t", 1);

    let before = ws.clone();
    ws.apply(&MoveTask {
        task_id: task,
        source_column_id: column_id(&ws, sprint, "TO DO"),
        destination_column_id: column_id(&ws, sprint, "DONE"),
    })
    .unwrap();

    let set = ChangeSet::between(&before, &ws).unwrap();
    assert_eq!(set.entity_ids(), vec![task]);
    assert_eq!(set.changes[0].table(), Table::Tasks);
}

fn create_backlog_item(ws: &mut Workspace, project_id: Uuid, title: &str) -> Uuid {
    ws.apply(&CreateBacklogItem {
        project_id,
        draft: BacklogItemDraft {
            title: title.to_string(),
            ..Default::default()
        },
    })
    .unwrap();
    ws.backlog_items.last().unwrap().id
}

fn invite(ws: &mut Workspace, project_id: Uuid, email: &str) -> SprintboardResult<()> {
    ws.apply(&InviteCollaborator {
        project_id,
        draft: InvitationDraft {
            email: email.to_string(),
            role: Role::Viewer,
        },
        invited_by: "owner-1".to_string(),
    })
}

fn too_long_title() -> String {
    "x".repeat(validation::MAX_TITLE_LEN + 1)
}

#[test]
fn test_update_project_rejects_overlong_title() {
    let mut ws = Workspace::new();
    let project = create_project(&mut ws, "Website Relaunch");

    let err = ws
        .apply(&UpdateProject {
            project_id: project,
            updates: ProjectUpdate {
                title: Some(too_long_title()),
                ..Default::default()
            },
        })
        .unwrap_err();

    assert!(matches!(err, SprintboardError::Validation(_)));
    assert_eq!(ws.project(project).unwrap().title, "Website Relaunch");
}

#[test]
fn test_update_sprint_rejects_overlong_title() {
    let mut ws = Workspace::new();
    let project = create_project(&mut ws, "P");
    let sprint = create_sprint(&mut ws, project, "Sprint 1", true);

    let err = ws
        .apply(&UpdateSprint {
            sprint_id: sprint,
            updates: SprintUpdate {
                title: Some(too_long_title()),
                ..Default::default()
            },
        })
        .unwrap_err();

    assert!(matches!(err, SprintboardError::Validation(_)));
    assert_eq!(ws.sprint(sprint).unwrap().title, "Sprint 1");
}

#[test]
fn test_update_task_rejects_overlong_title() {
    let mut ws = Workspace::new();
    let project = create_project(&mut ws, "P");
    let sprint = create_sprint(&mut ws, project, "S", true);
    let task = create_task(&mut ws, sprint, "Design homepage", 3);

    let err = ws
        .apply(&UpdateTask {
            task_id: task,
            updates: TaskUpdate {
                title: Some(too_long_title()),
                ..Default::default()
            },
        })
        .unwrap_err();

    assert!(matches!(err, SprintboardError::Validation(_)));
    assert_eq!(ws.task(task).unwrap().title, "Design homepage");
}

#[test]
fn test_update_backlog_item_rejects_overlong_title() {
    let mut ws = Workspace::new();
    let project = create_project(&mut ws, "P");
    let item = create_backlog_item(&mut ws, project, "Write docs");

    let err = ws
        .apply(&UpdateBacklogItem {
            item_id: item,
            updates: BacklogItemUpdate {
                title: Some(too_long_title()),
                ..Default::default()
            },
        })
        .unwrap_err();

    assert!(matches!(err, SprintboardError::Validation(_)));
    assert_eq!(ws.backlog_item(item).unwrap().title, "Write docs");
}

#[test]
fn test_delete_sprint_removes_its_columns_and_tasks() {
    let mut ws = Workspace::new();
    let project = create_project(&mut ws, "P");
    let doomed = create_sprint(&mut ws, project, "Doomed", true);
    let kept = create_sprint(&mut ws, project, "Kept", true);
    create_task(&mut ws, doomed, "goes away", 2);
    let survivor = create_task(&mut ws, kept, "stays", 1);

    ws.apply(&DeleteSprint { sprint_id: doomed }).unwrap();

    assert!(ws.sprint(doomed).is_none());
    assert!(ws.columns.iter().all(|c| c.sprint_id != doomed));
    assert!(ws.tasks.iter().all(|t| t.sprint_id != doomed));
    assert_eq!(ws.columns.len(), 3);
    assert!(ws.task(survivor).is_some());
    assert!(ws.project(project).is_some());
}

#[test]
fn test_update_sprint_rejects_merged_dates_out_of_order() {
    let mut ws = Workspace::new();
    let project = create_project(&mut ws, "P");
    let sprint = create_sprint(&mut ws, project, "S", true);

    // Only the start moves, past the existing end
    let err = ws
        .apply(&UpdateSprint {
            sprint_id: sprint,
            updates: SprintUpdate {
                start_date: Some(date(2024, 1, 20)),
                ..Default::default()
            },
        })
        .unwrap_err();
    assert!(matches!(err, SprintboardError::Validation(_)));

    let err = ws
        .apply(&UpdateSprint {
            sprint_id: sprint,
            updates: SprintUpdate {
                end_date: Some(date(2024, 1, 1)),
                ..Default::default()
            },
        })
        .unwrap_err();
    assert!(matches!(err, SprintboardError::Validation(_)));

    let sprint = ws.sprint(sprint).unwrap();
    assert_eq!(sprint.start_date, date(2024, 1, 1));
    assert_eq!(sprint.end_date, date(2024, 1, 14));
}

#[test]
fn test_rename_column_guards() {
    let mut ws = Workspace::new();
    let project = create_project(&mut ws, "P");
    let sprint = create_sprint(&mut ws, project, "S", true);
    for title in ["Review", "QA"] {
        ws.apply(&CreateColumn {
            sprint_id: sprint,
            title: title.into(),
        })
        .unwrap();
    }
    let review = column_id(&ws, sprint, "Review");
    let todo = column_id(&ws, sprint, "TO DO");

    let err = ws
        .apply(&RenameColumn {
            column_id: todo,
            title: "Backlog".into(),
        })
        .unwrap_err();
    assert!(matches!(err, SprintboardError::Validation(_)));
    assert_eq!(ws.column(todo).unwrap().title, "TO DO");

    let err = ws
        .apply(&RenameColumn {
            column_id: review,
            title: " done ".into(),
        })
        .unwrap_err();
    assert!(matches!(err, SprintboardError::Validation(_)));

    let err = ws
        .apply(&RenameColumn {
            column_id: review,
            title: "qa".into(),
        })
        .unwrap_err();
    assert!(matches!(err, SprintboardError::Duplicate(_)));
    assert_eq!(ws.column(review).unwrap().title, "Review");

    ws.apply(&RenameColumn {
        column_id: review,
        title: "Code Review".into(),
    })
    .unwrap();
    assert_eq!(ws.column(review).unwrap().title, "Code Review");
}

#[test]
fn test_revoke_collaborator_marks_rejected() {
    let mut ws = Workspace::new();
    let project = create_project(&mut ws, "P");
    invite(&mut ws, project, "bo@example.com").unwrap();
    let collaborator = ws.collaborators[0].id;

    ws.apply(&RevokeCollaborator {
        collaborator_id: collaborator,
    })
    .unwrap();

    assert_eq!(
        ws.collaborator(collaborator).unwrap().status,
        InvitationStatus::Rejected
    );
}

#[test]
fn test_update_collaborator_role() {
    let mut ws = Workspace::new();
    let project = create_project(&mut ws, "P");
    invite(&mut ws, project, "bo@example.com").unwrap();
    let collaborator = ws.collaborators[0].id;

    ws.apply(&UpdateCollaboratorRole {
        collaborator_id: collaborator,
        role: Role::Admin,
    })
    .unwrap();

    assert_eq!(ws.collaborator(collaborator).unwrap().role, Role::Admin);
}

#[test]
fn test_duplicate_live_invitation_is_rejected() {
    let mut ws = Workspace::new();
    let project = create_project(&mut ws, "P");
    let other = create_project(&mut ws, "Other");
    invite(&mut ws, project, "bo@example.com").unwrap();

    let err = invite(&mut ws, project, " BO@example.com").unwrap_err();
    assert!(matches!(err, SprintboardError::Duplicate(_)));
    assert_eq!(ws.collaborators.len(), 1);

    // Another project, or a revoked invitation, leaves room for a new one
    invite(&mut ws, other, "bo@example.com").unwrap();
    let first = ws.collaborators[0].id;
    ws.apply(&RevokeCollaborator {
        collaborator_id: first,
    })
    .unwrap();
    invite(&mut ws, project, "bo@example.com").unwrap();
    assert_eq!(ws.collaborators.len(), 3);
}
