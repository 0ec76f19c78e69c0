//! Text and JSON rendering for command results.

use anyhow::Result;
use chrono::NaiveDate;
use schoolplanner_core::model::date::{format_due_date, format_long_date};
use schoolplanner_core::model::reminder::{describe_reminder, ReminderOffset};
use schoolplanner_core::service::home_service::HomeBoard;
use schoolplanner_core::{Exam, PlannerItem, Subject, SubjectId, Task};
use serde::Serialize;
use std::collections::HashMap;

/// Subjects by id for rendering item lines.
pub struct SubjectIndex {
    subjects: HashMap<SubjectId, Subject>,
}

impl SubjectIndex {
    pub fn new(subjects: Vec<Subject>) -> Self {
        Self {
            subjects: subjects
                .into_iter()
                .map(|subject| (subject.id, subject))
                .collect(),
        }
    }

    fn name(&self, id: SubjectId) -> &str {
        self.subjects
            .get(&id)
            .map_or("unknown subject", |subject| subject.name.as_str())
    }

    fn abbreviation(&self, id: SubjectId) -> &str {
        self.subjects
            .get(&id)
            .map_or("?", |subject| subject.abbreviation.as_str())
    }
}

/// Renders results either as human-readable text or pretty JSON.
pub struct Output {
    json: bool,
    today: NaiveDate,
}

impl Output {
    pub fn new(json: bool, today: NaiveDate) -> Self {
        Self { json, today }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// Prints `message` in text mode, or `value` as JSON.
    pub fn done<T: Serialize + ?Sized>(&self, message: &str, value: &T) -> Result<()> {
        if self.json {
            return self.json(value);
        }
        println!("{message}");
        Ok(())
    }

    pub fn subjects(&self, subjects: &[Subject]) -> Result<()> {
        if self.json {
            return self.json(subjects);
        }
        if subjects.is_empty() {
            println!("No subjects yet.");
        }
        for subject in subjects {
            println!(
                "#{:<4} {:<6} {} {}",
                subject.id, subject.abbreviation, subject.color, subject.name
            );
        }
        Ok(())
    }

    pub fn tasks(&self, tasks: &[Task], subjects: &SubjectIndex) -> Result<()> {
        if self.json {
            return self.json(tasks);
        }
        if tasks.is_empty() {
            println!("No tasks.");
        }
        for task in tasks {
            let mark = if task.completed { "x" } else { " " };
            println!("[{mark}] {}", self.item_line(task, subjects));
        }
        Ok(())
    }

    pub fn exams(&self, exams: &[Exam], subjects: &SubjectIndex) -> Result<()> {
        if self.json {
            return self.json(exams);
        }
        if exams.is_empty() {
            println!("No exams.");
        }
        for exam in exams {
            println!("{}", self.item_line(exam, subjects));
        }
        Ok(())
    }

    pub fn task_detail(&self, task: &Task, subjects: &SubjectIndex) -> Result<()> {
        if self.json {
            return self.json(task);
        }
        self.item_detail(task, task.description.as_deref(), subjects);
        println!(
            "Status:      {}",
            if task.completed { "completed" } else { "open" }
        );
        Ok(())
    }

    pub fn exam_detail(&self, exam: &Exam, subjects: &SubjectIndex) -> Result<()> {
        if self.json {
            return self.json(exam);
        }
        self.item_detail(exam, exam.description.as_deref(), subjects);
        Ok(())
    }

    pub fn home(&self, board: &HomeBoard, subjects: &SubjectIndex) -> Result<()> {
        let view = HomeView::build(board, subjects, self.today);
        if self.json {
            return self.json(&view);
        }
        if view.buckets.is_empty() {
            println!("Nothing due. Enjoy the free time.");
        }
        for bucket in &view.buckets {
            println!("{}", bucket.label);
            for group in &bucket.groups {
                println!("  {}", group.subject);
                for task in group.tasks {
                    let mark = if task.completed { "x" } else { " " };
                    println!("    [{mark}] #{} {}", task.id, task.title);
                }
                for exam in group.exams {
                    println!("    (exam) #{} {}", exam.id, exam.title);
                }
            }
        }
        Ok(())
    }

    /// Lists the reminder palette, with concrete dates when `due` is given.
    pub fn reminder_palette(&self, due: Option<NaiveDate>) -> Result<()> {
        let rows: Vec<PaletteRow> = ReminderOffset::ALL
            .iter()
            .map(|offset| PaletteRow {
                index: offset.index(),
                label: offset.label(),
                date: due.map(|due| offset.reminder_date(due)),
            })
            .collect();
        if self.json {
            return self.json(&rows);
        }
        for row in rows {
            match row.date {
                Some(date) => println!("{}  {:<15} {}", row.index, row.label, format_long_date(date)),
                None => println!("{}  {}", row.index, row.label),
            }
        }
        Ok(())
    }

    fn item_line<I: PlannerItem>(&self, item: &I, subjects: &SubjectIndex) -> String {
        format!(
            "#{} {} ({}) due {}",
            item.id(),
            item.title(),
            subjects.abbreviation(item.subject_id()),
            format_due_date(item.due_date(), self.today, false)
        )
    }

    fn item_detail<I: PlannerItem>(
        &self,
        item: &I,
        description: Option<&str>,
        subjects: &SubjectIndex,
    ) {
        println!("#{} {}", item.id(), item.title());
        println!("Subject:     {}", subjects.name(item.subject_id()));
        println!(
            "Due:         {} ({})",
            format_due_date(item.due_date(), self.today, false),
            format_long_date(item.due_date())
        );
        println!(
            "Reminder:    {}",
            describe_reminder(item.due_date(), item.reminder())
        );
        if let Some(description) = description.filter(|text| !text.is_empty()) {
            println!("Description: {description}");
        }
    }
}

#[derive(Serialize)]
struct PaletteRow {
    index: i32,
    label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
struct HomeView<'a> {
    buckets: Vec<HomeBucket<'a>>,
}

#[derive(Debug, Serialize)]
struct HomeBucket<'a> {
    date: NaiveDate,
    label: String,
    groups: Vec<HomeGroup<'a>>,
}

#[derive(Debug, Serialize)]
struct HomeGroup<'a> {
    subject_id: SubjectId,
    subject: &'a str,
    tasks: &'a [Task],
    exams: &'a [Exam],
}

impl<'a> HomeView<'a> {
    fn build(board: &'a HomeBoard, subjects: &'a SubjectIndex, today: NaiveDate) -> Self {
        let buckets = board
            .buckets()
            .map(|(date, groups)| HomeBucket {
                date,
                label: format_due_date(date, today, false),
                groups: groups
                    .iter()
                    .map(|group| HomeGroup {
                        subject_id: group.subject_id,
                        subject: subjects.name(group.subject_id),
                        tasks: &group.tasks,
                        exams: &group.exams,
                    })
                    .collect(),
            })
            .collect();
        Self { buckets }
    }
}
