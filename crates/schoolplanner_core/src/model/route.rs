//! Deep-link route strings consumed by the host navigation layer.
//!
//! Notification tap actions carry a [`Route`]; its `Display` output is the
//! exact string the navigation layer expects.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

static ID_ROUTE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<name>edit_task|edit_test|view_task|view_test|settings/edit_subject)/(?P<id>-?\d+)$")
        .expect("valid id route regex")
});
static SUBJECT_SELECT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^subject_select_dialog(\?id=(?P<id>-?\d+))?$").expect("valid subject select regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    AddTask,
    AddExam,
    EditTask(i64),
    EditExam(i64),
    ViewTask(i64),
    ViewExam(i64),
    Settings,
    Subjects,
    AddSubject,
    EditSubject(i64),
    NotificationSettings,
    /// Subject picker, optionally preselecting a subject.
    SubjectSelect(Option<i64>),
}

impl Display for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Home => f.write_str("home_screen"),
            Self::AddTask => f.write_str("add_task"),
            Self::AddExam => f.write_str("add_test"),
            Self::EditTask(id) => write!(f, "edit_task/{id}"),
            Self::EditExam(id) => write!(f, "edit_test/{id}"),
            Self::ViewTask(id) => write!(f, "view_task/{id}"),
            Self::ViewExam(id) => write!(f, "view_test/{id}"),
            Self::Settings => f.write_str("settings"),
            Self::Subjects => f.write_str("settings/subjects"),
            Self::AddSubject => f.write_str("settings/add_subject"),
            Self::EditSubject(id) => write!(f, "settings/edit_subject/{id}"),
            Self::NotificationSettings => f.write_str("settings/notifications"),
            Self::SubjectSelect(None) => f.write_str("subject_select_dialog"),
            Self::SubjectSelect(Some(id)) => write!(f, "subject_select_dialog?id={id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteParseError(pub String);

impl Display for RouteParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown route `{}`", self.0)
    }
}

impl Error for RouteParseError {}

/// Serialized as the route string.
impl Serialize for Route {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl FromStr for Route {
    type Err = RouteParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let fixed = match value {
            "home_screen" => Some(Self::Home),
            "add_task" => Some(Self::AddTask),
            "add_test" => Some(Self::AddExam),
            "settings" => Some(Self::Settings),
            "settings/subjects" => Some(Self::Subjects),
            "settings/add_subject" => Some(Self::AddSubject),
            "settings/notifications" => Some(Self::NotificationSettings),
            _ => None,
        };
        if let Some(route) = fixed {
            return Ok(route);
        }

        let unknown = || RouteParseError(value.to_string());

        if let Some(captures) = ID_ROUTE_RE.captures(value) {
            let id = captures["id"].parse::<i64>().map_err(|_| unknown())?;
            return match &captures["name"] {
                "edit_task" => Ok(Self::EditTask(id)),
                "edit_test" => Ok(Self::EditExam(id)),
                "view_task" => Ok(Self::ViewTask(id)),
                "view_test" => Ok(Self::ViewExam(id)),
                "settings/edit_subject" => Ok(Self::EditSubject(id)),
                _ => Err(unknown()),
            };
        }

        if let Some(captures) = SUBJECT_SELECT_RE.captures(value) {
            let id = match captures.name("id") {
                Some(id) => Some(id.as_str().parse::<i64>().map_err(|_| unknown())?),
                None => None,
            };
            return Ok(Self::SubjectSelect(id));
        }

        Err(unknown())
    }
}
