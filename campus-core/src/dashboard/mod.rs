//! Views assembled for the admin, trainer and student dashboards.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::ScheduleStatus;
use crate::catalog::{CourseSchedule, Student, Trainer};
use crate::is_default;
use crate::store::{RecordStore, StoreResult};

const UPCOMING_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub upcoming: usize,
    pub ongoing: usize,
    pub completed: usize,
}

impl StatusCounts {
    fn count<'a, I: IntoIterator<Item = &'a ScheduleCard>>(cards: I) -> Self {
        let mut counts = Self::default();
        for card in cards {
            match card.status {
                ScheduleStatus::Upcoming => counts.upcoming += 1,
                ScheduleStatus::Ongoing => counts.ongoing += 1,
                ScheduleStatus::Completed => counts.completed += 1,
            }
        }
        counts
    }
}

/// A schedule joined with its course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleCard {
    pub schedule_id: String,
    pub course_id: String,
    pub course_title: String,
    #[serde(default, skip_serializing_if = "is_default")]
    pub trainer_id: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: ScheduleStatus,
    /// Working days of the course.
    pub duration: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub courses: usize,
    pub schedules: usize,
    pub trainers: usize,
    pub students: usize,
    pub holidays: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminDashboard {
    pub today: NaiveDate,
    pub totals: Totals,
    pub statuses: StatusCounts,
    pub upcoming: Vec<ScheduleCard>,
    pub ongoing: Vec<ScheduleCard>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainerDashboard {
    pub today: NaiveDate,
    pub trainer: Trainer,
    pub statuses: StatusCounts,
    pub schedules: Vec<ScheduleCard>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentDashboard {
    pub today: NaiveDate,
    pub student: Student,
    pub statuses: StatusCounts,
    pub schedules: Vec<ScheduleCard>,
    /// Sum of the working days of every enrolled course.
    pub enrolled_working_days: u32,
}

/// Cards for the schedules matching `filter`, ordered by start date.
fn cards<F: Fn(&CourseSchedule) -> bool>(
    store: &RecordStore,
    today: NaiveDate,
    filter: F,
) -> Vec<ScheduleCard> {
    store
        .schedule_records()
        .into_iter()
        .filter(|s| filter(s))
        .map(|s| {
            let (course_title, duration) = store
                .course(&s.course_id)
                .map(|c| (c.title, c.duration))
                .unwrap_or_default();
            ScheduleCard {
                status: s.status(today),
                schedule_id: s.id,
                course_id: s.course_id,
                course_title,
                trainer_id: s.trainer_id,
                start_date: s.start_date,
                end_date: s.end_date,
                duration,
            }
        })
        .collect()
}

pub fn admin(store: &RecordStore) -> StoreResult<AdminDashboard> {
    let today = store.today()?;
    let all = cards(store, today, |_| true);
    let statuses = StatusCounts::count(&all);
    let totals = Totals {
        courses: store.courses().len(),
        schedules: all.len(),
        trainers: store.trainers().len(),
        students: store.students().len(),
        holidays: store.holidays().len(),
    };
    let upcoming = all
        .iter()
        .filter(|c| c.status == ScheduleStatus::Upcoming)
        .take(UPCOMING_LIMIT)
        .cloned()
        .collect();
    let ongoing = all
        .into_iter()
        .filter(|c| c.status == ScheduleStatus::Ongoing)
        .collect();
    Ok(AdminDashboard {
        today,
        totals,
        statuses,
        upcoming,
        ongoing,
    })
}

pub fn trainer(store: &RecordStore, id: &str) -> StoreResult<TrainerDashboard> {
    let trainer = store.trainer(id)?;
    let today = store.today()?;
    let schedules = cards(store, today, |s| s.trainer_id.as_deref() == Some(id));
    Ok(TrainerDashboard {
        today,
        trainer,
        statuses: StatusCounts::count(&schedules),
        schedules,
    })
}

pub fn student(store: &RecordStore, id: &str) -> StoreResult<StudentDashboard> {
    let student = store.student(id)?;
    let today = store.today()?;
    let schedules = cards(store, today, |s| student.schedule_ids.contains(&s.id));
    Ok(StudentDashboard {
        today,
        statuses: StatusCounts::count(&schedules),
        enrolled_working_days: schedules.iter().map(|c| c.duration).sum(),
        student,
        schedules,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::app_ctx::AppContext;
    use crate::blueprint::Blueprint;
    use crate::config::Config;
    use crate::forms::{CourseForm, ScheduleForm, StudentForm, TrainerForm};
    use crate::runtime::tests::init;
    use crate::store::StoreError;

    async fn store() -> RecordStore {
        let blueprint = Blueprint::try_from(crate::config::config_module::ConfigModule::from(
            Config::default(),
        ))
        .unwrap();
        let app_ctx = Arc::new(AppContext {
            blueprint,
            runtime: init(),
        });
        RecordStore::init(app_ctx).await.unwrap()
    }

    async fn course(store: &RecordStore, title: &str, duration: i64) -> String {
        store
            .create_course(CourseForm {
                title: title.to_string(),
                description: "About".to_string(),
                duration: Some(duration),
                mode: "Remote".to_string(),
                course_type: "Part time".to_string(),
                curriculum: None,
            })
            .await
            .unwrap()
            .id
    }

    async fn schedule(store: &RecordStore, course_id: &str, start: &str, trainer: Option<&str>) -> String {
        store
            .create_schedule(ScheduleForm {
                course_id: course_id.to_string(),
                start_date: start.to_string(),
                trainer_id: trainer.map(str::to_string),
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_dashboards() {
        // today is 2024-03-15
        let store = store().await;
        let rust = course(&store, "Rust", 5).await;
        let go = course(&store, "Go", 2).await;
        let trainer = store
            .create_trainer(TrainerForm {
                name: "Grace".to_string(),
                email: "grace@example.org".to_string(),
                phone: None,
                expertise: vec![],
            })
            .await
            .unwrap();

        let past = schedule(&store, &go, "2024-01-08", Some(&trainer.id)).await;
        let current = schedule(&store, &rust, "2024-03-13", Some(&trainer.id)).await;
        let next = schedule(&store, &go, "2024-04-01", None).await;

        let admin = admin(&store).unwrap();
        assert_eq!(admin.totals.courses, 2);
        assert_eq!(admin.totals.schedules, 3);
        assert_eq!(
            admin.statuses,
            StatusCounts {
                upcoming: 1,
                ongoing: 1,
                completed: 1
            }
        );
        assert_eq!(admin.upcoming[0].schedule_id, next);
        assert_eq!(admin.ongoing[0].schedule_id, current);
        assert_eq!(admin.ongoing[0].course_title, "Rust");

        let dashboard = super::trainer(&store, &trainer.id).unwrap();
        let ids = dashboard
            .schedules
            .iter()
            .map(|c| c.schedule_id.clone())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![past.clone(), current.clone()]);
        assert_eq!(dashboard.statuses.completed, 1);

        let student = store
            .create_student(StudentForm {
                name: "Ada".to_string(),
                email: "ada@example.org".to_string(),
                phone: None,
                schedule_ids: vec![current, next],
            })
            .await
            .unwrap();
        let dashboard = super::student(&store, &student.id).unwrap();
        assert_eq!(dashboard.enrolled_working_days, 7);
        assert_eq!(dashboard.statuses.ongoing, 1);
        assert_eq!(dashboard.statuses.upcoming, 1);
    }

    #[tokio::test]
    async fn test_unknown_people() {
        let store = store().await;
        assert!(matches!(
            super::trainer(&store, "nobody"),
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            super::student(&store, "nobody"),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_upcoming_is_limited() {
        let store = store().await;
        let go = course(&store, "Go", 1).await;
        for day in 1..=12 {
            schedule(&store, &go, &format!("2024-04-{:02}", day), None).await;
        }
        let admin = admin(&store).unwrap();
        assert_eq!(admin.statuses.upcoming, 12);
        assert_eq!(admin.upcoming.len(), UPCOMING_LIMIT);
        assert!(admin
            .upcoming
            .windows(2)
            .all(|w| w[0].start_date <= w[1].start_date));
    }
}
