use std::sync::Arc;

use formfill_engine::render::{DateMode, MatrixRowView, OptionView, TextInputKind};
use formfill_engine::{ResponseStore, Widget, render};
use formfill_types::{
    AddressValue, DateRangeValue, DocumentFile, Field, FieldKind, FormStyling, PageId, ResponseValue,
};
use formfill_util::InMemoryDraftStore;
use serde_json::Number;

fn options(labels: &[&str], selected: &[usize]) -> Vec<OptionView> {
    labels
        .iter()
        .enumerate()
        .map(|(index, label)| OptionView {
            index,
            label: label.to_string(),
            image_url: None,
            selected: selected.contains(&index),
        })
        .collect()
}

fn cases() -> Vec<(Field, ResponseValue, Widget)> {
    let address = AddressValue {
        address: "1 Main St".into(),
        city: "Springfield".into(),
        state: "IL".into(),
        zip: "62701".into(),
    };
    let range = DateRangeValue {
        from: "2026-10-01".into(),
        to: "2026-10-18".into(),
    };

    vec![
        (
            Field::new("short", FieldKind::ShortAnswer),
            ResponseValue::Text("Ada".into()),
            Widget::TextInput {
                input: TextInputKind::Text,
                value: "Ada".into(),
                placeholder: None,
            },
        ),
        (
            Field::new("email", FieldKind::Email),
            ResponseValue::Text("ada@example.com".into()),
            Widget::TextInput {
                input: TextInputKind::Email,
                value: "ada@example.com".into(),
                placeholder: None,
            },
        ),
        (
            Field::new("number", FieldKind::Number),
            ResponseValue::Number(Number::from(12)),
            Widget::TextInput {
                input: TextInputKind::Number,
                value: "12".into(),
                placeholder: None,
            },
        ),
        (
            Field::new("paragraph", FieldKind::Paragraph),
            ResponseValue::Text("line one\nline two".into()),
            Widget::TextArea {
                value: "line one\nline two".into(),
                placeholder: None,
                lines: 4,
            },
        ),
        (
            Field::new("checkbox", FieldKind::Checkbox),
            ResponseValue::Flag(true),
            Widget::Checkbox { checked: true },
        ),
        (
            Field::new("switch", FieldKind::Switch),
            ResponseValue::Flag(true),
            Widget::Switch { on: true },
        ),
        (
            Field::new("radio", FieldKind::MultipleChoice).with_options(["Yes", "No"]),
            ResponseValue::Text("No".into()),
            Widget::RadioGroup {
                options: options(&["Yes", "No"], &[1]),
            },
        ),
        (
            Field::new("dropdown", FieldKind::Dropdown).with_options(["Red", "Blue"]),
            ResponseValue::Text("Red".into()),
            Widget::Dropdown {
                options: options(&["Red", "Blue"], &[0]),
                placeholder: None,
            },
        ),
        (
            Field::new("multi", FieldKind::MultipleSelect).with_options(["A", "B", "C"]),
            ResponseValue::Selections(vec!["A".into(), "C".into()]),
            Widget::MultiSelect {
                options: options(&["A", "B", "C"], &[0, 2]),
            },
        ),
        (
            Field::new("boxes", FieldKind::MultipleSelectCheckboxes).with_options(["A", "B", "C"]),
            ResponseValue::Selections(vec!["B".into()]),
            Widget::CheckboxGroup {
                options: options(&["A", "B", "C"], &[1]),
            },
        ),
        (
            Field::new("matrix", FieldKind::ChoiceMatrix).with_matrix(["Row A", "Row B"], ["Col 1", "Col 2"]),
            ResponseValue::matrix([("Row A", "Col 2"), ("Row B", "Col 1")]),
            Widget::ChoiceMatrix {
                rows: vec![
                    MatrixRowView {
                        label: "Row A".into(),
                        selected_column: Some(1),
                    },
                    MatrixRowView {
                        label: "Row B".into(),
                        selected_column: Some(0),
                    },
                ],
                columns: vec!["Col 1".into(), "Col 2".into()],
            },
        ),
        (
            Field::new("ranking", FieldKind::Ranking).with_options(["Speed", "Price", "Support"]),
            ResponseValue::Selections(vec!["Support".into(), "Speed".into(), "Price".into()]),
            Widget::Ranking {
                items: vec!["Support".into(), "Speed".into(), "Price".into()],
            },
        ),
        (
            Field::new("stars", FieldKind::StarRating),
            ResponseValue::Number(Number::from(4)),
            Widget::StarRating { max: 5, value: Some(4) },
        ),
        (
            Field::new("slider", FieldKind::Slider),
            ResponseValue::Number(Number::from(42)),
            Widget::Slider {
                min: 0.0,
                max: 100.0,
                value: Some(42.0),
            },
        ),
        (
            Field::new("opinion", FieldKind::OpinionScale),
            ResponseValue::Number(Number::from(7)),
            Widget::OpinionScale {
                min: 0,
                max: 10,
                selected: Some(7),
            },
        ),
        (
            Field::new("date", FieldKind::DatePicker),
            ResponseValue::Text("2026-10-18".into()),
            Widget::DatePicker {
                mode: DateMode::Date,
                value: "2026-10-18".into(),
            },
        ),
        (
            Field::new("time", FieldKind::TimePicker),
            ResponseValue::Text("09:30".into()),
            Widget::DatePicker {
                mode: DateMode::Time,
                value: "09:30".into(),
            },
        ),
        (
            Field::new("datetime", FieldKind::DateTimePicker),
            ResponseValue::Text("2026-10-18T09:30".into()),
            Widget::DatePicker {
                mode: DateMode::DateTime,
                value: "2026-10-18T09:30".into(),
            },
        ),
        (
            Field::new("range", FieldKind::DateRange),
            ResponseValue::DateRange(range.clone()),
            Widget::DateRange {
                from: range.from,
                to: range.to,
            },
        ),
        (
            Field::new("address", FieldKind::Address),
            ResponseValue::Address(address.clone()),
            Widget::Address { parts: address },
        ),
    ]
}

#[test]
fn every_answer_kind_survives_draft_restore() {
    let drafts = Arc::new(InMemoryDraftStore::new());
    let page = PageId::from("1");
    let cases = cases();

    let mut writer = ResponseStore::new("5", drafts.clone());
    writer.switch_page(Some(page.clone()));
    for (field, value, _) in &cases {
        writer
            .set(field.id.clone(), field.kind.clone(), value.clone())
            .unwrap_or_else(|error| panic!("set {}: {error}", field.id));
    }

    let mut reader = ResponseStore::new("5", drafts);
    let restored = reader.restore("5", &page).unwrap();
    assert_eq!(restored, cases.len());

    let styling = FormStyling::default();
    for (field, _, expected) in &cases {
        let rendered = render(field, &reader, &styling);
        assert_eq!(rendered.widget, *expected, "widget for {} after restore", field.kind);
    }
}

#[test]
fn restored_document_renders_metadata_without_content() {
    let drafts = Arc::new(InMemoryDraftStore::new());
    let page = PageId::from("1");
    let field = Field::new("cv", FieldKind::DocumentType);

    let mut writer = ResponseStore::new("5", drafts.clone());
    writer.switch_page(Some(page.clone()));
    writer
        .set(
            field.id.clone(),
            field.kind.clone(),
            ResponseValue::Document(DocumentFile::attached("cv.pdf", "application/pdf", vec![1; 2048])),
        )
        .unwrap();

    let mut reader = ResponseStore::new("5", drafts);
    reader.restore("5", &page).unwrap();

    let Widget::FileUpload { file: Some(file) } = render(&field, &reader, &FormStyling::default()).widget else {
        panic!("expected attached file");
    };
    assert_eq!(file.name, "cv.pdf");
    assert_eq!(file.mime_type, "application/pdf");
    assert_eq!(file.size, 2048);
    assert!(!file.content_available);
}
