// src/schema/fields.rs

use serde::Serialize;

/// Bumped whenever a field is added, removed, renamed or retyped.
pub const SCHEMA_VERSION: &str = "2025.1";

/// What a field turns into once the cell text has been normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    List,
    Integer,
}

impl FieldKind {
    /// JSON type name written into the exported schema.
    pub fn json_type(self) -> &'static str {
        match self {
            FieldKind::Text => "string",
            FieldKind::List => "array",
            FieldKind::Integer => "integer",
        }
    }
}

/// One row of the static field table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    /// Record key, also the key in JSON/CSV output.
    pub key: &'static str,
    /// Canonical header label as printed on current pages.
    pub label: &'static str,
    /// Historical spellings seen on older pages.
    pub aliases: &'static [&'static str],
    pub kind: FieldKind,
}

impl FieldSpec {
    const fn text(key: &'static str, label: &'static str) -> Self {
        Self { key, label, aliases: &[], kind: FieldKind::Text }
    }

    const fn list(key: &'static str, label: &'static str) -> Self {
        Self { key, label, aliases: &[], kind: FieldKind::List }
    }

    const fn with_aliases(self, aliases: &'static [&'static str]) -> Self {
        Self {
            key: self.key,
            label: self.label,
            aliases,
            kind: self.kind,
        }
    }

    /// Every label this field answers to: primary first, then aliases, then
    /// the break-tag variants of any label containing a space.
    pub fn accepted_labels(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::with_capacity(1 + self.aliases.len() * 5);
        for base in std::iter::once(self.label).chain(self.aliases.iter().copied()) {
            if !out.iter().any(|l| l == base) {
                out.push(base.to_string());
            }
        }

        let explicit = out.len();
        for i in 0..explicit {
            for variant in break_tag_variants(&out[i]) {
                if !out.contains(&variant) {
                    out.push(variant);
                }
            }
        }
        out
    }
}

/// Textual break tags that sometimes survive extraction in place of a space.
pub const BREAK_TAGS: [&str; 4] = ["<br>", "<BR>", "<br/>", "<BR/>"];

/// For a label containing a plain space, the same label with its spaces
/// replaced by each break tag. Empty for labels without a space.
pub fn break_tag_variants(label: &str) -> Vec<String> {
    if !label.contains(' ') {
        return Vec::new();
    }
    BREAK_TAGS.iter().map(|tag| label.replace(' ', tag)).collect()
}

/// The field table, in schema order. Labels double as the canonical header set.
pub static FIELDS: &[FieldSpec] = &[
    // 基本情報
    FieldSpec::text("year", "年度"),
    FieldSpec::text("faculty", "開講部局"),
    FieldSpec::text("lecture_code", "講義コード"),
    FieldSpec::text("category", "科目区分"),
    FieldSpec::text("subject_name", "授業科目名"),
    FieldSpec::text("subject_name_kana", "授業科目名（フリガナ）")
        .with_aliases(&["授業科目名 （フリガナ）"]),
    FieldSpec::text("english_subject_name", "英文授業科目名"),
    FieldSpec::text("instructor_name", "担当教員名"),
    FieldSpec::text("instructor_name_kana", "担当教員名(フリガナ)")
        .with_aliases(&["担当教員名 (フリガナ)"]),
    FieldSpec::text("campus", "開講キャンパス"),
    FieldSpec::text("term", "開設期"),
    FieldSpec::text("day_time_room", "曜日・時限・講義室"),
    FieldSpec::text("lecture_type", "授業の方法"),
    FieldSpec::text("lecture_type_detail", "授業の方法【詳細情報】").with_aliases(&[
        "授業の方法 <BR> 【詳細情報】",
        "授業の方法<BR> 【詳細情報】",
        "授業の方法 【詳細情報】",
    ]),
    FieldSpec {
        key: "credits",
        label: "単位",
        aliases: &[],
        kind: FieldKind::Integer,
    },
    FieldSpec::text("weekly_hours", "週時間"),
    FieldSpec::text("language", "使用言語"),
    FieldSpec::text("learning_stage", "学習の段階"),
    FieldSpec::text("discipline_field", "学問分野（分野）"),
    FieldSpec::text("discipline_subfield", "学問分野（分科）"),
    FieldSpec::text("target_students", "対象学生"),
    FieldSpec::list("keywords", "授業のキーワード"),
    FieldSpec::text("teacher_professional", "教職専門科目"),
    FieldSpec::text("subject_professional", "教科専門科目"),
    FieldSpec::text("liberal_education_position", "教養教育でのこの授業の位置づけ")
        .with_aliases(&["教養教育での\n この授業の位置づけ", "教養教育での この授業の位置づけ"]),
    FieldSpec::text("learning_outcomes", "学習の成果"),
    FieldSpec::text("overview", "授業の目標・概要等"),
    FieldSpec::text("plan", "授業計画"),
    FieldSpec::text("textbooks", "教科書・参考書等"),
    FieldSpec::list("media_equipment", "授業で使用するメディア・機器等")
        .with_aliases(&["授業で使用する メディア・機器等"]),
    FieldSpec::text("media_equipment_detail", "【詳細情報】"),
    FieldSpec::list("learning_methods", "授業で取り入れる学習手法")
        .with_aliases(&["授業で取り入れる 学習手法"]),
    FieldSpec::text("advice", "予習・復習へのアドバイス")
        .with_aliases(&["予習・復習への アドバイス"]),
    FieldSpec::text("enrollment_notes", "履修上の注意受講条件等")
        .with_aliases(&["履修上の注意<BR> 受講条件等", "履修上の注意 受講条件等"]),
    FieldSpec::text("grading", "成績評価の基準等"),
    FieldSpec::text("practical_experience", "実務経験"),
    FieldSpec::text("practical_experience_detail", "実務経験の概要とそれに基づく授業内容")
        .with_aliases(&["実務経験の概要と それに基づく授業内容"]),
    FieldSpec::text("message", "メッセージ"),
    FieldSpec::text("other", "その他"),
];

/// Canonical header labels in schema order.
pub fn canonical_headers() -> impl Iterator<Item = &'static str> {
    FIELDS.iter().map(|f| f.label)
}

/// Look a field up by its record key.
pub fn field(key: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|f| f.key == key)
}
