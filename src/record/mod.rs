// src/record/mod.rs

pub mod build;

pub use build::{build, lookup};

use serde::Serialize;
use serde_json::{Map, Value};
use std::{collections::BTreeMap, fmt, str::FromStr};
use thiserror::Error;

use crate::extract::text::{clean, split_list};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RecordError {
    #[error("`{field}` is not numeric: {value:?}")]
    NotNumeric { field: &'static str, value: String },
    #[error("credits must be a whole number, got {0}")]
    FractionalCredits(f64),
    #[error("credits must not be negative, got {0}")]
    NegativeCredits(f64),
    #[error("credits out of range: {0}")]
    CreditsOutOfRange(f64),
    #[error("required field `{0}` is missing")]
    MissingField(&'static str),
    #[error("field `{field}` cannot hold a {got} value")]
    KindMismatch { field: &'static str, got: &'static str },
    #[error("unknown field `{0}`")]
    UnknownField(String),
}

/// Credit count of a subject. Always a whole, non-negative number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Credits(u32);

impl Credits {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Credits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<f64> for Credits {
    type Error = RecordError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(RecordError::CreditsOutOfRange(value));
        }
        if value < 0.0 {
            return Err(RecordError::NegativeCredits(value));
        }
        if value.fract() != 0.0 {
            return Err(RecordError::FractionalCredits(value));
        }
        if value > f64::from(u32::MAX) {
            return Err(RecordError::CreditsOutOfRange(value));
        }
        Ok(Self(value as u32))
    }
}

impl FromStr for Credits {
    type Err = RecordError;

    /// Accepts `2`, `2.0`, `(2)`, `（２）`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw
            .trim()
            .trim_start_matches(['(', '（'])
            .trim_end_matches([')', '）'])
            .trim();
        let folded: String = trimmed
            .chars()
            .map(|c| match c {
                '０'..='９' => char::from_u32(c as u32 - '０' as u32 + '0' as u32).unwrap_or(c),
                '．' => '.',
                other => other,
            })
            .collect();
        let value: f64 = folded.parse().map_err(|_| RecordError::NotNumeric {
            field: "credits",
            value: raw.to_string(),
        })?;
        Credits::try_from(value)
    }
}

/// A loosely-typed value handed to [`Record::from_values`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    Number(f64),
}

impl FieldValue {
    fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::List(_) => "list",
            FieldValue::Number(_) => "number",
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(v: Vec<String>) -> Self {
        FieldValue::List(v)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

pub type FieldValues = BTreeMap<String, FieldValue>;

/// One syllabus entry. Field order is the schema order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub year: String,
    pub faculty: String,
    pub lecture_code: String,
    pub category: String,
    pub subject_name: String,
    pub subject_name_kana: String,
    pub english_subject_name: String,
    pub instructor_name: String,
    pub instructor_name_kana: String,
    pub campus: String,
    pub term: String,
    pub day_time_room: String,
    pub lecture_type: String,
    pub lecture_type_detail: String,
    pub credits: Credits,
    pub weekly_hours: String,
    pub language: String,
    pub learning_stage: String,
    pub discipline_field: String,
    pub discipline_subfield: String,
    pub target_students: String,
    pub keywords: Vec<String>,
    pub teacher_professional: String,
    pub subject_professional: String,
    pub liberal_education_position: String,
    pub learning_outcomes: String,
    pub overview: String,
    pub plan: String,
    pub textbooks: String,
    pub media_equipment: Vec<String>,
    pub media_equipment_detail: String,
    pub learning_methods: Vec<String>,
    pub advice: String,
    pub enrollment_notes: String,
    pub grading: String,
    pub practical_experience: String,
    pub practical_experience_detail: String,
    pub message: String,
    pub other: String,
}

impl Record {
    /// Build a record from key → value pairs, coercing and validating each
    /// field. Absent text fields become `""` and absent lists `[]`; `credits`
    /// is required and must be integral.
    pub fn from_values(values: FieldValues) -> Result<Self, RecordError> {
        let mut f = FieldTaker(values);
        let record = Record {
            year: f.text("year")?,
            faculty: f.text("faculty")?,
            lecture_code: f.text("lecture_code")?,
            category: f.text("category")?,
            subject_name: f.text("subject_name")?,
            subject_name_kana: f.text("subject_name_kana")?,
            english_subject_name: f.text("english_subject_name")?,
            instructor_name: f.text("instructor_name")?,
            instructor_name_kana: f.text("instructor_name_kana")?,
            campus: f.text("campus")?,
            term: f.text("term")?,
            day_time_room: f.text("day_time_room")?,
            lecture_type: f.text("lecture_type")?,
            lecture_type_detail: f.text("lecture_type_detail")?,
            credits: f.credits("credits")?,
            weekly_hours: f.text("weekly_hours")?,
            language: f.text("language")?,
            learning_stage: f.text("learning_stage")?,
            discipline_field: f.text("discipline_field")?,
            discipline_subfield: f.text("discipline_subfield")?,
            target_students: f.text("target_students")?,
            keywords: f.list("keywords")?,
            teacher_professional: f.text("teacher_professional")?,
            subject_professional: f.text("subject_professional")?,
            liberal_education_position: f.text("liberal_education_position")?,
            learning_outcomes: f.text("learning_outcomes")?,
            overview: f.text("overview")?,
            plan: f.text("plan")?,
            textbooks: f.text("textbooks")?,
            media_equipment: f.list("media_equipment")?,
            media_equipment_detail: f.text("media_equipment_detail")?,
            learning_methods: f.list("learning_methods")?,
            advice: f.text("advice")?,
            enrollment_notes: f.text("enrollment_notes")?,
            grading: f.text("grading")?,
            practical_experience: f.text("practical_experience")?,
            practical_experience_detail: f.text("practical_experience_detail")?,
            message: f.text("message")?,
            other: f.text("other")?,
        };
        f.finish()?;
        Ok(record)
    }

    /// Ordered key → value view used by writers. Never contains nulls.
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => unreachable!("Record always serializes to a JSON object"),
        }
    }
}

/// Drains a [`FieldValues`] map one field at a time.
struct FieldTaker(FieldValues);

impl FieldTaker {
    fn text(&mut self, key: &'static str) -> Result<String, RecordError> {
        match self.0.remove(key) {
            None => Ok(String::new()),
            Some(FieldValue::Text(s)) => Ok(s),
            Some(other) => Err(RecordError::KindMismatch {
                field: key,
                got: other.kind_name(),
            }),
        }
    }

    fn list(&mut self, key: &'static str) -> Result<Vec<String>, RecordError> {
        match self.0.remove(key) {
            None => Ok(Vec::new()),
            Some(FieldValue::List(items)) => Ok(items
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()),
            Some(FieldValue::Text(s)) => {
                Ok(split_list(clean(Some(&s)).as_deref()).unwrap_or_default())
            }
            Some(other) => Err(RecordError::KindMismatch {
                field: key,
                got: other.kind_name(),
            }),
        }
    }

    fn credits(&mut self, key: &'static str) -> Result<Credits, RecordError> {
        match self.0.remove(key) {
            None => Err(RecordError::MissingField(key)),
            Some(FieldValue::Text(s)) if s.trim().is_empty() => Err(RecordError::MissingField(key)),
            Some(FieldValue::Text(s)) => s.parse(),
            Some(FieldValue::Number(n)) => Credits::try_from(n),
            Some(other) => Err(RecordError::KindMismatch {
                field: key,
                got: other.kind_name(),
            }),
        }
    }

    fn finish(self) -> Result<(), RecordError> {
        match self.0.into_keys().next() {
            Some(extra) => Err(RecordError::UnknownField(extra)),
            None => Ok(()),
        }
    }
}
