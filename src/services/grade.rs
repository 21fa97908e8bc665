use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
    prelude::Date,
};
use tracing::{debug, info};

use crate::auth::AuthenticatedUser;
use crate::entities::{
    assessment_stage, class, grade, prelude::*, semester, student, subject,
};
use crate::error::{DbResultExt, ServiceError, ServiceResult};
use crate::services::assignment::subject_open_to_teacher;
use crate::services::class::find_class;
use crate::services::semester::{find_semester, require_active_semester};
use crate::services::stage::find_stage;
use crate::services::subject::find_subject;

pub const MIN_GRADE: f64 = 0.0;
pub const MAX_GRADE: f64 = 100.0;

#[derive(Clone)]
pub struct GradeService {
    db: DatabaseConnection,
}

/// One batch of grades for a single (subject, semester, stage). Values line
/// up with `student_ids` by position.
#[derive(Debug, Clone)]
pub struct GradeBatch {
    pub subject_id: i32,
    pub semester_id: i32,
    pub stage_id: i32,
    pub student_ids: Vec<i32>,
    pub values: Vec<f64>,
    pub note: Option<String>,
}

/// A student row on the entry sheet, with any grade already recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeSheetRow {
    pub student_id: i32,
    pub nisn: i64,
    pub name: String,
    pub grade_id: Option<i32>,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct GradeHistoryFilter {
    pub class_id: Option<i32>,
    pub subject_id: Option<i32>,
    pub semester_id: Option<i32>,
    pub stage_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, FromQueryResult)]
pub struct GradeHistoryEntry {
    pub grade_id: i32,
    pub student_id: i32,
    pub nisn: i64,
    pub student_name: String,
    pub class_name: Option<String>,
    pub class_level: Option<String>,
    pub subject_id: i32,
    pub subject_name: String,
    pub semester_id: i32,
    pub semester_name: String,
    pub stage_id: i32,
    pub stage_name: String,
    pub value: f64,
    pub entry_date: Date,
    pub note: Option<String>,
}

pub fn validate_grade_value(value: f64) -> ServiceResult<f64> {
    if !value.is_finite() || !(MIN_GRADE..=MAX_GRADE).contains(&value) {
        return Err(ServiceError::validation(format!(
            "Grade {value} is outside the allowed range {MIN_GRADE}..={MAX_GRADE}"
        )));
    }
    Ok(value)
}

fn normalize_note(note: Option<String>) -> Option<String> {
    note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

fn today() -> Date {
    Utc::now().date_naive()
}

impl GradeBatch {
    fn validate(&self) -> ServiceResult<()> {
        if self.student_ids.is_empty() {
            return Err(ServiceError::validation("No grades to record"));
        }
        if self.student_ids.len() != self.values.len() {
            return Err(ServiceError::validation(format!(
                "Got {} students but {} grade values",
                self.student_ids.len(),
                self.values.len()
            )));
        }
        let distinct: BTreeSet<i32> = self.student_ids.iter().copied().collect();
        if distinct.len() != self.student_ids.len() {
            return Err(ServiceError::validation(
                "A student appears more than once in the batch",
            ));
        }
        for value in &self.values {
            validate_grade_value(*value)?;
        }
        Ok(())
    }
}

impl GradeService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Students of the class with any grade already recorded for the
    /// subject and stage in the active semester.
    pub async fn grade_sheet(
        &self,
        caller: &AuthenticatedUser,
        class_id: i32,
        subject_id: i32,
        stage_id: i32,
    ) -> ServiceResult<Vec<GradeSheetRow>> {
        caller.require_teacher()?;
        let active = require_active_semester(&self.db).await?;
        let class = find_class(&self.db, class_id).await?;
        let subject = find_subject(&self.db, subject_id).await?;
        find_stage(&self.db, stage_id).await?;

        if !subject_open_to_teacher(&self.db, caller.id, subject.id, class.id, active.id).await? {
            return Err(ServiceError::forbidden(format!(
                "{} is not open to you for {} in {}",
                subject.name,
                class.display_name(),
                active.name
            )));
        }

        let students = Student::find()
            .filter(student::Column::ClassId.eq(class.id))
            .order_by_asc(student::Column::Name)
            .all(&self.db)
            .await?;
        let student_ids: Vec<i32> = students.iter().map(|s| s.id).collect();

        let recorded: HashMap<i32, grade::Model> = Grade::find()
            .filter(grade::Column::StudentId.is_in(student_ids))
            .filter(grade::Column::SubjectId.eq(subject.id))
            .filter(grade::Column::SemesterId.eq(active.id))
            .filter(grade::Column::StageId.eq(stage_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|g| (g.student_id, g))
            .collect();

        let rows = students
            .into_iter()
            .map(|s| {
                let existing = recorded.get(&s.id);
                GradeSheetRow {
                    student_id: s.id,
                    nisn: s.nisn,
                    name: s.name,
                    grade_id: existing.map(|g| g.id),
                    value: existing.map(|g| g.value),
                }
            })
            .collect();
        Ok(rows)
    }

    /// Records the whole batch or nothing. Any student that already has a
    /// grade for the same (subject, semester, stage) rejects the batch.
    pub async fn enter_grades(
        &self,
        caller: &AuthenticatedUser,
        batch: GradeBatch,
    ) -> ServiceResult<u64> {
        caller.require_teacher()?;
        batch.validate()?;

        let tx = self.db.begin().await?;

        let semester = find_semester(&tx, batch.semester_id).await?;
        if !semester.is_active {
            return Err(ServiceError::validation(format!(
                "{} is not the active semester; grades can only be entered for the active semester",
                semester.name
            )));
        }
        let subject = find_subject(&tx, batch.subject_id).await?;
        let stage = find_stage(&tx, batch.stage_id).await?;

        let students = Student::find()
            .filter(student::Column::Id.is_in(batch.student_ids.clone()))
            .all(&tx)
            .await?;
        if students.len() != batch.student_ids.len() {
            let found: BTreeSet<i32> = students.iter().map(|s| s.id).collect();
            let missing: Vec<String> = batch
                .student_ids
                .iter()
                .filter(|id| !found.contains(id))
                .map(|id| id.to_string())
                .collect();
            return Err(ServiceError::not_found(format!(
                "Unknown student id(s): {}",
                missing.join(", ")
            )));
        }

        let mut classes = BTreeSet::new();
        for s in &students {
            match s.class_id {
                Some(class_id) => {
                    classes.insert(class_id);
                }
                None => {
                    return Err(ServiceError::validation(format!(
                        "{} is not placed in a class",
                        s.name
                    )));
                }
            }
        }
        for class_id in classes {
            if !subject_open_to_teacher(&tx, caller.id, subject.id, class_id, semester.id).await? {
                return Err(ServiceError::forbidden(format!(
                    "{} is not open to you for class {} in {}",
                    subject.name, class_id, semester.name
                )));
            }
        }

        let already = Grade::find()
            .filter(grade::Column::StudentId.is_in(batch.student_ids.clone()))
            .filter(grade::Column::SubjectId.eq(subject.id))
            .filter(grade::Column::SemesterId.eq(semester.id))
            .filter(grade::Column::StageId.eq(stage.id))
            .all(&tx)
            .await?;
        if !already.is_empty() {
            let names: Vec<&str> = students
                .iter()
                .filter(|s| already.iter().any(|g| g.student_id == s.id))
                .map(|s| s.name.as_str())
                .collect();
            return Err(ServiceError::Duplicate(format!(
                "{} already graded for {} ({}) in {}: {}",
                names.len(),
                subject.name,
                stage.name,
                semester.name,
                names.join(", ")
            )));
        }

        let entry_date = today();
        let note = normalize_note(batch.note);
        let rows: Vec<grade::ActiveModel> = batch
            .student_ids
            .iter()
            .zip(&batch.values)
            .map(|(student_id, value)| grade::ActiveModel {
                student_id: Set(*student_id),
                subject_id: Set(subject.id),
                semester_id: Set(semester.id),
                stage_id: Set(stage.id),
                value: Set(*value),
                entry_date: Set(entry_date),
                teacher_id: Set(caller.id),
                note: Set(note.clone()),
                ..Default::default()
            })
            .collect();
        let count = rows.len() as u64;

        Grade::insert_many(rows)
            .exec(&tx)
            .await
            .or_duplicate(|| {
                format!(
                    "Some students already have a {} grade for {} in {}",
                    stage.name, subject.name, semester.name
                )
            })?;

        tx.commit().await?;

        info!(
            teacher_id = caller.id,
            subject_id = subject.id,
            semester_id = semester.id,
            stage_id = stage.id,
            count,
            "Recorded grades"
        );
        Ok(count)
    }

    async fn find_own_grade(
        &self,
        caller: &AuthenticatedUser,
        id: i32,
    ) -> ServiceResult<grade::Model> {
        caller.require_teacher()?;

        let existing = Grade::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Grade {id} not found")))?;
        if existing.teacher_id != caller.id {
            debug!(grade_id = id, owner = existing.teacher_id, "Grade belongs to another teacher");
            return Err(ServiceError::forbidden(
                "You can only change grades you recorded yourself",
            ));
        }
        Ok(existing)
    }

    /// Overwrites value and note and stamps today's date.
    pub async fn update_grade(
        &self,
        caller: &AuthenticatedUser,
        id: i32,
        value: f64,
        note: Option<String>,
    ) -> ServiceResult<grade::Model> {
        let value = validate_grade_value(value)?;
        let existing = self.find_own_grade(caller, id).await?;

        let mut grade_active: grade::ActiveModel = existing.into();
        grade_active.value = Set(value);
        grade_active.note = Set(normalize_note(note));
        grade_active.entry_date = Set(today());
        let updated = grade_active.update(&self.db).await?;

        info!(grade_id = id, value, "Updated grade");
        Ok(updated)
    }

    pub async fn delete_grade(&self, caller: &AuthenticatedUser, id: i32) -> ServiceResult<()> {
        let existing = self.find_own_grade(caller, id).await?;
        Grade::delete_by_id(existing.id).exec(&self.db).await?;

        info!(grade_id = id, "Deleted grade");
        Ok(())
    }

    /// Grades the caller recorded, newest entry first then by student name.
    pub async fn grade_history(
        &self,
        caller: &AuthenticatedUser,
        filter: GradeHistoryFilter,
    ) -> ServiceResult<Vec<GradeHistoryEntry>> {
        caller.require_teacher()?;

        let mut query = Grade::find()
            .select_only()
            .column_as(grade::Column::Id, "grade_id")
            .column(grade::Column::StudentId)
            .column_as(student::Column::Nisn, "nisn")
            .column_as(student::Column::Name, "student_name")
            .column_as(class::Column::Name, "class_name")
            .column_as(class::Column::Level, "class_level")
            .column(grade::Column::SubjectId)
            .column_as(subject::Column::Name, "subject_name")
            .column(grade::Column::SemesterId)
            .column_as(semester::Column::Name, "semester_name")
            .column(grade::Column::StageId)
            .column_as(assessment_stage::Column::Name, "stage_name")
            .column(grade::Column::Value)
            .column(grade::Column::EntryDate)
            .column(grade::Column::Note)
            .join(JoinType::InnerJoin, grade::Relation::Student.def())
            .join(JoinType::LeftJoin, student::Relation::Class.def())
            .join(JoinType::InnerJoin, grade::Relation::Subject.def())
            .join(JoinType::InnerJoin, grade::Relation::Semester.def())
            .join(JoinType::InnerJoin, grade::Relation::AssessmentStage.def())
            .filter(grade::Column::TeacherId.eq(caller.id));

        if let Some(class_id) = filter.class_id {
            query = query.filter(student::Column::ClassId.eq(class_id));
        }
        if let Some(subject_id) = filter.subject_id {
            query = query.filter(grade::Column::SubjectId.eq(subject_id));
        }
        if let Some(semester_id) = filter.semester_id {
            query = query.filter(grade::Column::SemesterId.eq(semester_id));
        }
        if let Some(stage_id) = filter.stage_id {
            query = query.filter(grade::Column::StageId.eq(stage_id));
        }

        let entries = query
            .order_by_desc(grade::Column::EntryDate)
            .order_by_asc(student::Column::Name)
            .order_by_asc(grade::Column::Id)
            .into_model::<GradeHistoryEntry>()
            .all(&self.db)
            .await?;
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(ids: Vec<i32>, values: Vec<f64>) -> GradeBatch {
        GradeBatch {
            subject_id: 1,
            semester_id: 1,
            stage_id: 1,
            student_ids: ids,
            values,
            note: None,
        }
    }

    #[test]
    fn bounds_are_inclusive() {
        assert!(validate_grade_value(0.0).is_ok());
        assert!(validate_grade_value(100.0).is_ok());
        assert!(validate_grade_value(-0.1).is_err());
        assert!(validate_grade_value(100.1).is_err());
        assert!(validate_grade_value(f64::NAN).is_err());
    }

    #[test]
    fn batch_shape_is_checked_before_touching_the_store() {
        assert!(batch(vec![], vec![]).validate().is_err());
        assert!(batch(vec![1, 2], vec![80.0]).validate().is_err());
        assert!(batch(vec![1, 1], vec![80.0, 90.0]).validate().is_err());
        assert!(batch(vec![1, 2], vec![80.0, 101.0]).validate().is_err());
        assert!(batch(vec![1, 2], vec![80.0, 90.5]).validate().is_ok());
    }

    #[test]
    fn empty_notes_are_not_stored() {
        assert_eq!(normalize_note(Some("   ".into())), None);
        assert_eq!(normalize_note(Some(" remedial ".into())), Some("remedial".into()));
    }
}
