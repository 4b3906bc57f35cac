use std::sync::Arc;

use anyhow::{anyhow, Context};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::error::{StoreError, StoreResult};
use super::tables::{sorted, Tables};
use crate::app_ctx::AppContext;
use crate::calendar::{ScheduleSpan, ScheduleStatus, WorkCalendar};
use crate::catalog::{Course, CourseSchedule, Holiday, ScheduleView, Student, Trainer};
use crate::file_db::file_config::{CurriculumUpload, FileHolder, Metadata};
use crate::file_db::request_handler::FileRequestHandler;
use crate::forms::{
    CourseForm, HolidayForm, ScheduleDraft, ScheduleForm, SchedulePreviewForm, StudentForm,
    TrainerForm, ValidationErrors,
};
use crate::runtime::TargetRuntime;
use crate::uid_gen::UidGenerator;

/// Record store for courses, schedules, trainers, students and holidays.
///
/// Reads go straight to the in-memory tables. Mutations are serialised by
/// `writer`, and each one writes a full snapshot to the configured location
/// (a local file or a remote http store) before returning.
pub struct RecordStore {
    app_ctx: Arc<AppContext>,
    tables: Tables,
    files: FileRequestHandler,
    writer: Mutex<()>,
}

/// Result of a schedule calculation that is not stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulePreview {
    #[serde(flatten)]
    pub span: ScheduleSpan,
    pub status: ScheduleStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCurriculum {
    pub id: String,
    pub metadata: Metadata,
}

impl RecordStore {
    pub async fn init(app_ctx: Arc<AppContext>) -> anyhow::Result<Self> {
        let location = app_ctx.blueprint.storage.records.clone();
        let snapshot = fetch_snapshot(&location, &app_ctx.runtime)
            .await
            .with_context(|| format!("Unable to load records from {}", location))?;
        let tables = match snapshot {
            Some(snapshot) => {
                let tables = Tables::from_json(snapshot)
                    .with_context(|| format!("Records in {} are corrupt", location))?;
                log::info!(
                    "Loaded {} courses and {} schedules from {}",
                    tables.courses.len(),
                    tables.schedules.len(),
                    location
                );
                tables
            }
            None => {
                log::warn!("No records found at {}, starting empty", location);
                Tables::default()
            }
        };

        for holiday in app_ctx.blueprint.calendar.holidays.iter() {
            tables
                .holidays
                .entry(holiday.key())
                .or_insert_with(|| holiday.clone());
        }

        let files = FileRequestHandler::new(
            app_ctx.runtime.clone(),
            app_ctx.blueprint.storage.curriculum.clone(),
        );
        let store = Self {
            app_ctx,
            tables,
            files,
            writer: Mutex::new(()),
        };
        let changed = store.reschedule()?;
        if changed > 0 {
            log::info!("Recomputed {} schedule end dates for the current calendar", changed);
        }
        Ok(store)
    }

    /// Configured weekend with every stored holiday.
    pub fn calendar(&self) -> WorkCalendar {
        self.app_ctx
            .blueprint
            .calendar
            .work
            .replace_holidays(self.tables.holidays.iter().map(|h| h.value().date))
    }

    pub fn today(&self) -> StoreResult<NaiveDate> {
        Ok(self.app_ctx.today()?)
    }

    // Courses

    pub fn courses(&self) -> Vec<Course> {
        sorted(&self.tables.courses, |c| (c.created_at, c.id.clone()))
    }

    pub fn course(&self, id: &str) -> StoreResult<Course> {
        self.tables
            .courses
            .get(id)
            .map(|c| c.value().clone())
            .ok_or_else(|| StoreError::not_found("Course", id))
    }

    pub async fn create_course(&self, form: CourseForm) -> StoreResult<Course> {
        let draft = form.validate()?;
        let _guard = self.writer.lock().await;
        self.check_curriculum(draft.curriculum.as_deref()).await?;

        let course = Course {
            id: self.next_id()?,
            title: draft.title,
            description: draft.description,
            duration: draft.duration,
            mode: draft.mode,
            course_type: draft.course_type,
            curriculum: draft.curriculum,
            created_at: self.now()?,
        };
        self.tables.courses.insert(course.id.clone(), course.clone());
        self.persist().await?;
        log::info!("Created course {} ({})", course.id, course.title);
        Ok(course)
    }

    /// Replaces a course. A new duration moves the end date of every
    /// schedule of the course.
    pub async fn update_course(&self, id: &str, form: CourseForm) -> StoreResult<Course> {
        let draft = form.validate()?;
        let _guard = self.writer.lock().await;
        let existing = self.course(id)?;
        self.check_curriculum(draft.curriculum.as_deref()).await?;

        let course = Course {
            id: existing.id,
            title: draft.title,
            description: draft.description,
            duration: draft.duration,
            mode: draft.mode,
            course_type: draft.course_type,
            curriculum: draft.curriculum,
            created_at: existing.created_at,
        };
        let moves = if existing.duration != course.duration {
            self.plan_end_dates(&self.calendar(), |s| {
                (s.course_id == course.id).then_some(course.duration)
            })?
        } else {
            Vec::new()
        };
        self.tables.courses.insert(course.id.clone(), course.clone());
        if !moves.is_empty() {
            let changed = self.apply_end_dates(moves);
            log::info!("Course {} duration changed, moved {} schedules", course.id, changed);
        }
        self.persist().await?;
        Ok(course)
    }

    pub async fn delete_course(&self, id: &str) -> StoreResult<Course> {
        let _guard = self.writer.lock().await;
        let course = self.course(id)?;
        let used_by = self
            .tables
            .schedules
            .iter()
            .find(|s| s.course_id == id)
            .map(|s| s.key().clone());
        if let Some(schedule_id) = used_by {
            return Err(StoreError::Conflict(format!(
                "Course {} is scheduled in {}",
                id, schedule_id
            )));
        }
        self.tables.courses.remove(id);
        self.persist().await?;
        log::info!("Deleted course {}", id);
        Ok(course)
    }

    async fn check_curriculum(&self, curriculum: Option<&str>) -> StoreResult<()> {
        if let Some(content_id) = curriculum {
            if let Err(e) = self.files.get_metadata(content_id).await {
                log::debug!("Curriculum lookup for {} failed: {}", content_id, e);
                return Err(ValidationErrors::single(
                    "curriculum",
                    format!("Curriculum file {} does not exist", content_id),
                )
                .into());
            }
        }
        Ok(())
    }

    // Schedules

    pub fn schedule_records(&self) -> Vec<CourseSchedule> {
        sorted(&self.tables.schedules, |s| (s.start_date, s.id.clone()))
    }

    pub fn schedules(&self) -> StoreResult<Vec<ScheduleView>> {
        let today = self.today()?;
        Ok(self
            .schedule_records()
            .iter()
            .map(|s| s.view(today))
            .collect())
    }

    pub fn schedule(&self, id: &str) -> StoreResult<ScheduleView> {
        let schedule = self
            .tables
            .schedules
            .get(id)
            .map(|s| s.value().clone())
            .ok_or_else(|| StoreError::not_found("Schedule", id))?;
        Ok(schedule.view(self.today()?))
    }

    pub async fn create_schedule(&self, form: ScheduleForm) -> StoreResult<ScheduleView> {
        let draft = form.validate()?;
        let _guard = self.writer.lock().await;
        let end_date = self.end_date_for(&draft)?;

        let schedule = CourseSchedule {
            id: self.next_id()?,
            course_id: draft.course_id,
            trainer_id: draft.trainer_id,
            start_date: draft.start_date,
            end_date,
            created_at: self.now()?,
        };
        self.tables
            .schedules
            .insert(schedule.id.clone(), schedule.clone());
        self.persist().await?;
        log::info!(
            "Scheduled course {} from {} to {}",
            schedule.course_id,
            schedule.start_date,
            schedule.end_date
        );
        Ok(schedule.view(self.today()?))
    }

    pub async fn update_schedule(&self, id: &str, form: ScheduleForm) -> StoreResult<ScheduleView> {
        let draft = form.validate()?;
        let _guard = self.writer.lock().await;
        let existing = self
            .tables
            .schedules
            .get(id)
            .map(|s| s.value().clone())
            .ok_or_else(|| StoreError::not_found("Schedule", id))?;
        let end_date = self.end_date_for(&draft)?;

        let schedule = CourseSchedule {
            id: existing.id,
            course_id: draft.course_id,
            trainer_id: draft.trainer_id,
            start_date: draft.start_date,
            end_date,
            created_at: existing.created_at,
        };
        self.tables
            .schedules
            .insert(schedule.id.clone(), schedule.clone());
        self.persist().await?;
        Ok(schedule.view(self.today()?))
    }

    /// Removes the schedule and every enrolment in it.
    pub async fn delete_schedule(&self, id: &str) -> StoreResult<ScheduleView> {
        let _guard = self.writer.lock().await;
        let (_, schedule) = self
            .tables
            .schedules
            .remove(id)
            .ok_or_else(|| StoreError::not_found("Schedule", id))?;
        for mut student in self.tables.students.iter_mut() {
            student.schedule_ids.retain(|s| s != id);
        }
        self.persist().await?;
        log::info!("Deleted schedule {}", id);
        Ok(schedule.view(self.today()?))
    }

    pub fn preview(&self, form: SchedulePreviewForm) -> StoreResult<SchedulePreview> {
        let (start, duration) = form.validate()?;
        let span = self
            .calendar()
            .span(start, duration)
            .map_err(|e| ValidationErrors::single("start_date", e.to_string()))?;
        let status = ScheduleStatus::classify(self.today()?, span.start, span.end);
        Ok(SchedulePreview { span, status })
    }

    fn end_date_for(&self, draft: &ScheduleDraft) -> StoreResult<NaiveDate> {
        let mut errors = ValidationErrors::default();
        let course = self
            .tables
            .courses
            .get(&draft.course_id)
            .map(|c| c.value().clone());
        if course.is_none() {
            errors.push(
                "course_id",
                format!("Course {} does not exist", draft.course_id),
            );
        }
        if let Some(trainer_id) = &draft.trainer_id {
            if !self.tables.trainers.contains_key(trainer_id) {
                errors.push(
                    "trainer_id",
                    format!("Trainer {} does not exist", trainer_id),
                );
            }
        }
        let course = match course {
            Some(course) if errors.is_empty() => course,
            _ => return Err(errors.into()),
        };

        let end_date = self
            .calendar()
            .end_date(draft.start_date, course.duration)
            .map_err(|e| ValidationErrors::single("start_date", e.to_string()))?;
        Ok(end_date)
    }

    /// Recomputes every end date against the current calendar and returns
    /// how many moved.
    fn reschedule(&self) -> StoreResult<usize> {
        let moves = self.plan_end_dates(&self.calendar(), |s| self.duration_of(s))?;
        Ok(self.apply_end_dates(moves))
    }

    fn duration_of(&self, schedule: &CourseSchedule) -> Option<u32> {
        let duration = self.tables.courses.get(&schedule.course_id).map(|c| c.duration);
        if duration.is_none() {
            log::warn!(
                "Schedule {} refers to missing course {}",
                schedule.id,
                schedule.course_id
            );
        }
        duration
    }

    /// End dates that change under `calendar`. `duration` picks the schedules
    /// to recompute and their length in working days. Nothing is modified, so
    /// a failure leaves the tables as they were.
    fn plan_end_dates<F>(
        &self,
        calendar: &WorkCalendar,
        duration: F,
    ) -> StoreResult<Vec<(String, NaiveDate)>>
    where
        F: Fn(&CourseSchedule) -> Option<u32>,
    {
        let mut moves = Vec::new();
        for schedule in self.schedule_records() {
            let Some(days) = duration(&schedule) else {
                continue;
            };
            let end_date = calendar.end_date(schedule.start_date, days)?;
            if end_date != schedule.end_date {
                moves.push((schedule.id, end_date));
            }
        }
        Ok(moves)
    }

    fn apply_end_dates(&self, moves: Vec<(String, NaiveDate)>) -> usize {
        let mut changed = 0;
        for (id, end_date) in moves {
            if let Some(mut schedule) = self.tables.schedules.get_mut(&id) {
                schedule.end_date = end_date;
                changed += 1;
            }
        }
        changed
    }

    // Trainers

    pub fn trainers(&self) -> Vec<Trainer> {
        sorted(&self.tables.trainers, |t| (t.name.clone(), t.id.clone()))
    }

    pub fn trainer(&self, id: &str) -> StoreResult<Trainer> {
        self.tables
            .trainers
            .get(id)
            .map(|t| t.value().clone())
            .ok_or_else(|| StoreError::not_found("Trainer", id))
    }

    pub async fn create_trainer(&self, form: TrainerForm) -> StoreResult<Trainer> {
        let draft = form.validate()?;
        let _guard = self.writer.lock().await;
        self.check_unique_email(&self.tables.trainers, &draft.email, None, |t| &t.email)?;

        let trainer = Trainer {
            id: self.next_id()?,
            name: draft.name,
            email: draft.email,
            phone: draft.phone,
            expertise: draft.tags,
            created_at: self.now()?,
        };
        self.tables
            .trainers
            .insert(trainer.id.clone(), trainer.clone());
        self.persist().await?;
        log::info!("Created trainer {}", trainer.id);
        Ok(trainer)
    }

    pub async fn update_trainer(&self, id: &str, form: TrainerForm) -> StoreResult<Trainer> {
        let draft = form.validate()?;
        let _guard = self.writer.lock().await;
        let existing = self.trainer(id)?;
        self.check_unique_email(&self.tables.trainers, &draft.email, Some(id), |t| &t.email)?;

        let trainer = Trainer {
            id: existing.id,
            name: draft.name,
            email: draft.email,
            phone: draft.phone,
            expertise: draft.tags,
            created_at: existing.created_at,
        };
        self.tables
            .trainers
            .insert(trainer.id.clone(), trainer.clone());
        self.persist().await?;
        Ok(trainer)
    }

    pub async fn delete_trainer(&self, id: &str) -> StoreResult<Trainer> {
        let _guard = self.writer.lock().await;
        let trainer = self.trainer(id)?;
        let assigned = self
            .tables
            .schedules
            .iter()
            .find(|s| s.trainer_id.as_deref() == Some(id))
            .map(|s| s.key().clone());
        if let Some(schedule_id) = assigned {
            return Err(StoreError::Conflict(format!(
                "Trainer {} is assigned to schedule {}",
                id, schedule_id
            )));
        }
        self.tables.trainers.remove(id);
        self.persist().await?;
        log::info!("Deleted trainer {}", id);
        Ok(trainer)
    }

    // Students

    pub fn students(&self) -> Vec<Student> {
        sorted(&self.tables.students, |s| (s.name.clone(), s.id.clone()))
    }

    pub fn student(&self, id: &str) -> StoreResult<Student> {
        self.tables
            .students
            .get(id)
            .map(|s| s.value().clone())
            .ok_or_else(|| StoreError::not_found("Student", id))
    }

    pub async fn create_student(&self, form: StudentForm) -> StoreResult<Student> {
        let draft = form.validate()?;
        let _guard = self.writer.lock().await;
        self.check_unique_email(&self.tables.students, &draft.email, None, |s| &s.email)?;
        self.check_enrolments(&draft.tags)?;

        let student = Student {
            id: self.next_id()?,
            name: draft.name,
            email: draft.email,
            phone: draft.phone,
            schedule_ids: draft.tags,
            created_at: self.now()?,
        };
        self.tables
            .students
            .insert(student.id.clone(), student.clone());
        self.persist().await?;
        log::info!("Created student {}", student.id);
        Ok(student)
    }

    pub async fn update_student(&self, id: &str, form: StudentForm) -> StoreResult<Student> {
        let draft = form.validate()?;
        let _guard = self.writer.lock().await;
        let existing = self.student(id)?;
        self.check_unique_email(&self.tables.students, &draft.email, Some(id), |s| &s.email)?;
        self.check_enrolments(&draft.tags)?;

        let student = Student {
            id: existing.id,
            name: draft.name,
            email: draft.email,
            phone: draft.phone,
            schedule_ids: draft.tags,
            created_at: existing.created_at,
        };
        self.tables
            .students
            .insert(student.id.clone(), student.clone());
        self.persist().await?;
        Ok(student)
    }

    pub async fn delete_student(&self, id: &str) -> StoreResult<Student> {
        let _guard = self.writer.lock().await;
        let (_, student) = self
            .tables
            .students
            .remove(id)
            .ok_or_else(|| StoreError::not_found("Student", id))?;
        self.persist().await?;
        log::info!("Deleted student {}", id);
        Ok(student)
    }

    fn check_enrolments(&self, schedule_ids: &[String]) -> StoreResult<()> {
        let mut errors = ValidationErrors::default();
        for schedule_id in schedule_ids {
            if !self.tables.schedules.contains_key(schedule_id) {
                errors.push(
                    "schedule_ids",
                    format!("Schedule {} does not exist", schedule_id),
                );
            }
        }
        Ok(errors.into_result(())?)
    }

    fn check_unique_email<T, F>(
        &self,
        table: &dashmap::DashMap<String, T>,
        email: &str,
        own_id: Option<&str>,
        email_of: F,
    ) -> StoreResult<()>
    where
        F: Fn(&T) -> &String,
    {
        let taken = table
            .iter()
            .any(|e| email_of(e.value()) == email && Some(e.key().as_str()) != own_id);
        if taken {
            return Err(StoreError::Conflict(format!(
                "Email {} is already registered",
                email
            )));
        }
        Ok(())
    }

    // Holidays

    pub fn holidays(&self) -> Vec<Holiday> {
        sorted(&self.tables.holidays, |h| h.date)
    }

    /// Adds a holiday and moves every schedule it affects.
    pub async fn create_holiday(&self, form: HolidayForm) -> StoreResult<Holiday> {
        let holiday = form.validate()?;
        let _guard = self.writer.lock().await;
        if self.tables.holidays.contains_key(&holiday.key()) {
            return Err(StoreError::Conflict(format!(
                "Holiday {} already exists",
                holiday.date
            )));
        }
        let calendar = self.calendar().with_holidays([holiday.date]);
        let moves = self.plan_end_dates(&calendar, |s| self.duration_of(s))?;
        self.tables.holidays.insert(holiday.key(), holiday.clone());
        let changed = self.apply_end_dates(moves);
        self.persist().await?;
        log::info!("Added holiday {}, moved {} schedules", holiday.date, changed);
        Ok(holiday)
    }

    pub async fn delete_holiday(&self, date: &str) -> StoreResult<Holiday> {
        let _guard = self.writer.lock().await;
        let holiday = self
            .tables
            .holidays
            .get(date)
            .map(|h| h.value().clone())
            .ok_or_else(|| StoreError::not_found("Holiday", date))?;
        let calendar = self.app_ctx.blueprint.calendar.work.replace_holidays(
            self.tables
                .holidays
                .iter()
                .map(|h| h.value().date)
                .filter(|d| *d != holiday.date),
        );
        let moves = self.plan_end_dates(&calendar, |s| self.duration_of(s))?;
        self.tables.holidays.remove(date);
        let changed = self.apply_end_dates(moves);
        self.persist().await?;
        log::info!("Removed holiday {}, moved {} schedules", holiday.date, changed);
        Ok(holiday)
    }

    // Curriculum files

    pub async fn upload_curriculum(&self, upload: CurriculumUpload) -> StoreResult<StoredCurriculum> {
        let id = self
            .files
            .insert(upload.title, upload.file)
            .await
            .map_err(|e| ValidationErrors::single("file", e.to_string()))?;
        let metadata = self.files.get_metadata(&id).await?;
        Ok(StoredCurriculum { id, metadata })
    }

    pub async fn curriculum(&self, id: &str) -> StoreResult<StoredCurriculum> {
        let metadata = self.files.get_metadata(id).await.map_err(|e| {
            log::debug!("Curriculum lookup for {} failed: {}", id, e);
            StoreError::not_found("Curriculum", id)
        })?;
        Ok(StoredCurriculum {
            id: id.to_string(),
            metadata,
        })
    }

    pub async fn curriculum_content(&self, id: &str) -> StoreResult<FileHolder> {
        self.files.get(id).await.map_err(|e| {
            log::debug!("Curriculum content for {} failed: {}", id, e);
            StoreError::not_found("Curriculum", id)
        })
    }

    fn now(&self) -> StoreResult<u128> {
        Ok(self.app_ctx.runtime.instance.now()?)
    }

    fn next_id(&self) -> StoreResult<String> {
        Ok(UidGenerator::default().generate(self.now()?))
    }

    async fn persist(&self) -> StoreResult<()> {
        let location = &self.app_ctx.blueprint.storage.records;
        let snapshot = self.tables.to_json()?;
        let result = if location.starts_with("http") {
            push_remote(location, snapshot, &self.app_ctx.runtime).await
        } else {
            self.app_ctx.runtime.file.write(location, &snapshot).await
        };
        result.map_err(|e| {
            log::error!("Unable to persist records to {}: {}", location, e);
            StoreError::Backend(e)
        })
    }
}

/// `None` when nothing has been stored at `location` yet. Any other failure
/// is an error so existing records are never replaced by an empty table.
async fn fetch_snapshot(
    location: &str,
    target_runtime: &TargetRuntime,
) -> anyhow::Result<Option<Vec<u8>>> {
    if location.starts_with("http") {
        let url = url::Url::parse(location)?;
        let req = reqwest::Request::new(reqwest::Method::GET, url);
        let resp = match target_runtime.http.execute(req).await {
            Ok(resp) => resp,
            Err(e) if is_not_found(&e) => return Ok(None),
            Err(e) => return Err(e),
        };
        if resp.status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status.is_success() {
            return Err(anyhow!("Remote record store answered with {}", resp.status));
        }
        Ok(Some(resp.body.to_vec()))
    } else {
        match target_runtime.file.read(location).await {
            Ok(content) => Ok(Some(content.into_bytes())),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

fn is_not_found(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        cause
            .downcast_ref::<std::io::Error>()
            .is_some_and(|e| e.kind() == std::io::ErrorKind::NotFound)
            || cause
                .downcast_ref::<reqwest::Error>()
                .and_then(|e| e.status())
                == Some(reqwest::StatusCode::NOT_FOUND)
    })
}

async fn push_remote(
    location: &str,
    snapshot: Vec<u8>,
    target_runtime: &TargetRuntime,
) -> anyhow::Result<()> {
    let url = url::Url::parse(location)?;
    let mut req = reqwest::Request::new(reqwest::Method::POST, url);
    req.headers_mut().insert(
        reqwest::header::CONTENT_TYPE,
        reqwest::header::HeaderValue::from_static("application/json"),
    );
    *req.body_mut() = Some(reqwest::Body::from(snapshot));
    let response = target_runtime.http.execute(req).await?;
    if !response.status.is_success() {
        return Err(anyhow!(
            "Remote record store answered with {}",
            response.status
        ));
    }
    Ok(())
}
