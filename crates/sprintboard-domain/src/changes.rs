//! Row-level difference between two workspaces.
//!
//! A command runs against a copy of the workspace; diffing the copy with
//! the original yields the writes the data store has to see. Upserts are
//! ordered parents first and deletes children first, so a store with
//! foreign keys never sees a dangling reference.

use serde::Serialize;
use serde_json::Value;
use sprintboard_core::SprintboardResult;
use std::collections::HashMap;
use uuid::Uuid;

use crate::wire::{Table, WireRecord};
use crate::Workspace;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RowChange {
    Upsert { table: Table, id: Uuid, row: Value },
    Delete { table: Table, id: Uuid },
}

impl RowChange {
    pub fn table(&self) -> Table {
        match self {
            Self::Upsert { table, .. } | Self::Delete { table, .. } => *table,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Self::Upsert { id, .. } | Self::Delete { id, .. } => *id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChangeSet {
    pub changes: Vec<RowChange>,
}

fn diff_table<T: WireRecord + PartialEq>(
    before: &[T],
    after: &[T],
    upserts: &mut Vec<RowChange>,
    deletes: &mut Vec<RowChange>,
) -> SprintboardResult<()> {
    let old: HashMap<Uuid, &T> = before.iter().map(|e| (e.id(), e)).collect();
    for entity in after {
        if old.get(&entity.id()) != Some(&entity) {
            upserts.push(RowChange::Upsert {
                table: T::TABLE,
                id: entity.id(),
                row: entity.to_wire()?,
            });
        }
    }

    let new: HashMap<Uuid, &T> = after.iter().map(|e| (e.id(), e)).collect();
    for entity in before {
        if !new.contains_key(&entity.id()) {
            deletes.push(RowChange::Delete {
                table: T::TABLE,
                id: entity.id(),
            });
        }
    }
    Ok(())
}

impl ChangeSet {
    pub fn between(before: &Workspace, after: &Workspace) -> SprintboardResult<Self> {
        let mut upserts = Vec::new();
        // Collected parents first, reversed below so children go first.
        let mut deletes = Vec::new();

        diff_table(&before.projects, &after.projects, &mut upserts, &mut deletes)?;
        diff_table(&before.sprints, &after.sprints, &mut upserts, &mut deletes)?;
        diff_table(&before.columns, &after.columns, &mut upserts, &mut deletes)?;
        diff_table(&before.tasks, &after.tasks, &mut upserts, &mut deletes)?;
        diff_table(
            &before.backlog_items,
            &after.backlog_items,
            &mut upserts,
            &mut deletes,
        )?;
        diff_table(
            &before.collaborators,
            &after.collaborators,
            &mut upserts,
            &mut deletes,
        )?;

        deletes.reverse();
        let mut changes = upserts;
        changes.extend(deletes);
        Ok(Self { changes })
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Ids of every entity touched, in change order.
    pub fn entity_ids(&self) -> Vec<Uuid> {
        self.changes.iter().map(RowChange::id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{CreateProject, CreateSprint, DeleteProject};
    use crate::validation::{ProjectDraft, SprintDraft};
    use chrono::NaiveDate;

    fn seeded() -> Workspace {
        let mut ws = Workspace::new();
        ws.apply(&CreateProject {
            draft: ProjectDraft {
                title: "Website Relaunch".into(),
                ..Default::default()
            },
            owner_id: "ana".into(),
        })
        .unwrap();
        let project_id = ws.projects[0].id;
        ws.apply(&CreateSprint {
            project_id,
            draft: SprintDraft {
                title: "Sprint 1".into(),
                description: String::new(),
                start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2024, 1, 14).unwrap(),
            },
            seed_default_columns: true,
        })
        .unwrap();
        ws
    }

    #[test]
    fn test_identical_workspaces_have_no_changes() {
        let ws = seeded();
        assert!(ChangeSet::between(&ws, &ws.clone()).unwrap().is_empty());
    }

    #[test]
    fn test_upserts_go_parents_first() {
        let after = seeded();
        let set = ChangeSet::between(&Workspace::new(), &after).unwrap();

        let tables: Vec<Table> = set.changes.iter().map(RowChange::table).collect();
        assert_eq!(
            tables,
            vec![Table::Projects, Table::Sprints, Table::Columns, Table::Columns, Table::Columns]
        );
    }

    #[test]
    fn test_deletes_go_children_first() {
        let before = seeded();
        let mut after = before.clone();
        after
            .apply(&DeleteProject {
                project_id: before.projects[0].id,
            })
            .unwrap();

        let set = ChangeSet::between(&before, &after).unwrap();
        assert!(set
            .changes
            .iter()
            .all(|c| matches!(c, RowChange::Delete { .. })));
        assert_eq!(set.changes.first().unwrap().table(), Table::Columns);
        assert_eq!(set.changes.last().unwrap().table(), Table::Projects);
    }
}
