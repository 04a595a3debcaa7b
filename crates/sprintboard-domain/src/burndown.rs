//! Burndown series for a sprint.
//!
//! One point per calendar day from the sprint's start to its end, both
//! included. The ideal line falls linearly from the sprint's total points
//! to zero; the actual line subtracts points of tasks completed on or
//! before each day and stops at `today`.

use chrono::NaiveDate;
use serde::Serialize;

use crate::{Sprint, Task};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BurndownPoint {
    pub date: NaiveDate,
    pub ideal: f64,
    /// `None` for days that have not happened yet.
    pub remaining: Option<u32>,
}

pub fn burndown(sprint: &Sprint, tasks: &[Task], today: NaiveDate) -> Vec<BurndownPoint> {
    let sprint_tasks: Vec<&Task> = tasks.iter().filter(|t| t.sprint_id == sprint.id).collect();
    let total: u32 = sprint_tasks.iter().map(|t| t.story_points).sum();

    let days = sprint.duration_days().max(1);
    let steps = (days - 1).max(1) as f64;

    sprint
        .start_date
        .iter_days()
        .take(days as usize)
        .enumerate()
        .map(|(i, date)| {
            let ideal = f64::from(total) * (1.0 - i as f64 / steps);
            let remaining = (date <= today).then(|| {
                let burned: u32 = sprint_tasks
                    .iter()
                    .filter(|t| {
                        t.completion_date
                            .is_some_and(|done| done.date_naive() <= date)
                    })
                    .map(|t| t.story_points)
                    .sum();
                total.saturating_sub(burned)
            });
            BurndownPoint {
                date,
                ideal: ideal.max(0.0),
                remaining,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{SprintDraft, TaskDraft};
    use chrono::TimeZone;
    use uuid::Uuid;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn sprint() -> Sprint {
        Sprint::new(
            Uuid::new_v4(),
            SprintDraft {
                title: "Sprint 1".into(),
                description: String::new(),
                start_date: date(1),
                end_date: date(5),
            },
        )
    }

    fn task(sprint: &Sprint, points: u32, completed_on: Option<u32>) -> Task {
        let mut task = Task::new(
            sprint.id,
            Uuid::new_v4(),
            TaskDraft {
                title: "work".into(),
                story_points: points,
                ..Default::default()
            },
            0,
        );
        task.completion_date =
            completed_on.map(|d| chrono::Utc.with_ymd_and_hms(2024, 1, d, 15, 0, 0).unwrap());
        task
    }

    #[test]
    fn test_one_point_per_day_inclusive() {
        let sprint = sprint();
        let points = burndown(&sprint, &[], date(5));
        assert_eq!(points.len(), 5);
        assert_eq!(points.first().unwrap().date, date(1));
        assert_eq!(points.last().unwrap().date, date(5));
    }

    #[test]
    fn test_ideal_line_falls_to_zero() {
        let sprint = sprint();
        let tasks = vec![task(&sprint, 8, None)];
        let points = burndown(&sprint, &tasks, date(5));
        assert_eq!(points[0].ideal, 8.0);
        assert_eq!(points[2].ideal, 4.0);
        assert_eq!(points[4].ideal, 0.0);
    }

    #[test]
    fn test_actual_line_counts_completions() {
        let sprint = sprint();
        let other_sprint = Sprint::new(Uuid::new_v4(), SprintDraft {
            title: "Other".into(),
            description: String::new(),
            start_date: date(1),
            end_date: date(5),
        });
        let tasks = vec![
            task(&sprint, 5, Some(2)),
            task(&sprint, 3, Some(4)),
            task(&sprint, 2, None),
            task(&other_sprint, 13, None),
        ];
        let points = burndown(&sprint, &tasks, date(3));

        let remaining: Vec<Option<u32>> = points.iter().map(|p| p.remaining).collect();
        assert_eq!(remaining, vec![Some(10), Some(5), Some(5), None, None]);
    }
}
