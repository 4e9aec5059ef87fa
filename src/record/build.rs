// src/record/build.rs

use tracing::debug;

use super::{FieldValue, FieldValues, Record, RecordError};
use crate::extract::table::HeaderDataMap;
use crate::extract::text::{clean, split_list};
use crate::schema::{FieldKind, FieldSpec, FIELDS};

/// Raw value for `spec`: the first accepted label present in `map`, primary
/// label first.
pub fn lookup<'m>(map: &'m HeaderDataMap, spec: &FieldSpec) -> Option<&'m str> {
    spec.accepted_labels()
        .iter()
        .find_map(|label| map.get(label))
}

/// Map one page's header/data pairs onto a [`Record`].
///
/// For each field in schema order: lookup, `clean`, then list splitting for
/// list fields. Credits coercion and record-level validation happen in
/// [`Record::from_values`]; any failure rejects the whole record.
pub fn build(map: &HeaderDataMap, source_id: &str) -> Result<Record, RecordError> {
    let mut values = FieldValues::new();
    for spec in FIELDS {
        let cleaned = clean(lookup(map, spec));
        let value = match spec.kind {
            FieldKind::Text => FieldValue::Text(cleaned.unwrap_or_default()),
            FieldKind::List => {
                FieldValue::List(split_list(cleaned.as_deref()).unwrap_or_default())
            }
            FieldKind::Integer => match cleaned {
                Some(s) => FieldValue::Text(s),
                None => continue,
            },
        };
        values.insert(spec.key.to_string(), value);
    }

    let record = Record::from_values(values)?;
    debug!(source = %source_id, lecture_code = %record.lecture_code, "record built");
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Credits;
    use crate::schema::field;

    fn full_map() -> HeaderDataMap {
        FIELDS
            .iter()
            .map(|f| {
                let data = match f.key {
                    "credits" => "2.0",
                    "keywords" => "大学での学び、持続可能性",
                    _ => "値",
                };
                (f.label, data)
            })
            .collect()
    }

    #[test]
    fn builds_every_field() {
        let rec = build(&full_map(), "full").unwrap();
        assert_eq!(rec.credits, Credits::new(2));
        assert_eq!(rec.keywords, vec!["大学での学び", "持続可能性"]);
        assert_eq!(rec.media_equipment, vec!["値"]);
        assert_eq!(rec.other, "値");
    }

    #[test]
    fn lookup_prefers_primary_label() {
        let spec = field("subject_name_kana").unwrap();
        let map: HeaderDataMap = [
            ("授業科目名 （フリガナ）", "alias"),
            ("授業科目名（フリガナ）", "primary"),
        ]
        .into_iter()
        .collect();
        assert_eq!(lookup(&map, spec), Some("primary"));
    }

    #[test]
    fn lookup_falls_back_to_break_tag_variant() {
        let spec = field("enrollment_notes").unwrap();
        let map: HeaderDataMap = [("履修上の注意<br>受講条件等", "特になし")].into_iter().collect();
        assert_eq!(lookup(&map, spec), Some("特になし"));
    }

    #[test]
    fn parenthesized_credits_parse() {
        let map: HeaderDataMap = full_map()
            .iter()
            .map(|c| {
                if c.header == "単位" {
                    (c.header.clone(), "(2)".to_string())
                } else {
                    (c.header.clone(), c.data.clone())
                }
            })
            .collect();
        assert_eq!(build(&map, "paren").unwrap().credits.get(), 2);
    }

    #[test]
    fn fractional_credits_reject_the_record() {
        let map: HeaderDataMap = [("年度", "2025年度"), ("単位", "1.5")].into_iter().collect();
        assert_eq!(
            build(&map, "fractional").unwrap_err(),
            RecordError::FractionalCredits(1.5)
        );
    }

    #[test]
    fn blank_fields_are_empty_not_absent() {
        let map: HeaderDataMap = [("単位", "2"), ("その他", "\u{00a0}"), ("授業のキーワード", " ")]
            .into_iter()
            .collect();
        let rec = build(&map, "blank").unwrap();
        assert_eq!(rec.other, "");
        assert!(rec.keywords.is_empty());
        assert_eq!(rec.to_map().len(), FIELDS.len());
    }

    #[test]
    fn text_fields_keep_commas() {
        let map: HeaderDataMap = [("単位", "2"), ("授業の方法【詳細情報】", "対面，\nオンライン（オンデマンド型）")]
            .into_iter()
            .collect();
        let rec = build(&map, "commas").unwrap();
        assert_eq!(rec.lecture_type_detail, "対面， オンライン(オンデマンド型)");
    }
}
