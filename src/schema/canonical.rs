// src/schema/canonical.rs

use once_cell::sync::Lazy;
use std::collections::HashMap;
use thiserror::Error;

use super::fields::{FieldSpec, FIELDS};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AliasTableError {
    #[error("label `{label}` is registered for both `{first}` and `{second}`")]
    Conflict {
        label: String,
        first: &'static str,
        second: &'static str,
    },
}

/// Resolves observed header labels to field table entries.
#[derive(Debug)]
pub struct Canonicalizer {
    by_label: HashMap<String, &'static FieldSpec>,
}

impl Canonicalizer {
    /// Index every accepted label of `fields`. The same label may not point at
    /// two different fields.
    pub fn new(fields: &'static [FieldSpec]) -> Result<Self, AliasTableError> {
        let mut by_label: HashMap<String, &'static FieldSpec> = HashMap::new();
        for spec in fields {
            for label in spec.accepted_labels() {
                match by_label.get(&label) {
                    Some(existing) if existing.key != spec.key => {
                        return Err(AliasTableError::Conflict {
                            label,
                            first: existing.key,
                            second: spec.key,
                        });
                    }
                    Some(_) => {}
                    None => {
                        by_label.insert(label, spec);
                    }
                }
            }
        }
        Ok(Self { by_label })
    }

    /// Exact match only.
    pub fn canonicalize(&self, observed: &str) -> Option<&'static FieldSpec> {
        self.by_label.get(observed).copied()
    }
}

static CANONICALIZER: Lazy<Canonicalizer> =
    Lazy::new(|| Canonicalizer::new(FIELDS).expect("field alias table must be consistent"));

/// Look `observed` up in the process-wide index over [`FIELDS`].
pub fn canonicalize(observed: &str) -> Option<&'static FieldSpec> {
    CANONICALIZER.canonicalize(observed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::fields::{FieldKind, BREAK_TAGS};

    #[test]
    fn primary_labels_resolve_to_themselves() {
        for spec in FIELDS {
            let got = canonicalize(spec.label).expect("primary label must resolve");
            assert_eq!(got.key, spec.key);
        }
    }

    #[test]
    fn historical_spellings_resolve() {
        assert_eq!(canonicalize("授業科目名 （フリガナ）").unwrap().key, "subject_name_kana");
        assert_eq!(canonicalize("担当教員名 (フリガナ)").unwrap().key, "instructor_name_kana");
        assert_eq!(
            canonicalize("授業の方法<BR> 【詳細情報】").unwrap().key,
            "lecture_type_detail"
        );
        assert_eq!(
            canonicalize("教養教育での\n この授業の位置づけ").unwrap().key,
            "liberal_education_position"
        );
        assert_eq!(canonicalize("【詳細情報】").unwrap().key, "media_equipment_detail");
    }

    #[test]
    fn every_spaced_label_accepts_all_break_tags() {
        for spec in FIELDS {
            for label in std::iter::once(spec.label).chain(spec.aliases.iter().copied()) {
                if !label.contains(' ') {
                    continue;
                }
                for tag in BREAK_TAGS {
                    let variant = label.replace(' ', tag);
                    let got = canonicalize(&variant)
                        .unwrap_or_else(|| panic!("variant `{}` not accepted", variant));
                    assert_eq!(got.key, spec.key);
                }
            }
        }
    }

    #[test]
    fn unknown_and_fuzzy_labels_do_not_resolve() {
        assert!(canonicalize("間違った年度").is_none());
        assert!(canonicalize(" 年度").is_none());
        assert!(canonicalize("").is_none());
    }

    #[test]
    fn conflicting_table_is_rejected() {
        static BAD: &[FieldSpec] = &[
            FieldSpec {
                key: "a",
                label: "見出し",
                aliases: &[],
                kind: FieldKind::Text,
            },
            FieldSpec {
                key: "b",
                label: "別見出し",
                aliases: &["見出し"],
                kind: FieldKind::Text,
            },
        ];
        let err = Canonicalizer::new(BAD).unwrap_err();
        assert_eq!(
            err,
            AliasTableError::Conflict {
                label: "見出し".to_string(),
                first: "a",
                second: "b",
            }
        );
    }
}
