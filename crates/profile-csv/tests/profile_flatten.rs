use profile_csv::workflows::profile::{
    flatten, flatten_with, ColumnSchema, ProfileRecord, SlotCapacity,
};
use serde_json::{json, Value};

fn record(value: Value) -> ProfileRecord {
    serde_json::from_value(value).expect("record parses")
}

fn experiences(count: usize) -> Value {
    Value::Array(
        (0..count)
            .map(|n| json!({ "company": format!("Company {n}"), "title": format!("Title {n}") }))
            .collect(),
    )
}

#[test]
fn row_width_is_fixed_regardless_of_entry_count() {
    for count in [0, 1, 10, 14] {
        let row = flatten(&record(json!({ "experience": experiences(count) })));
        assert_eq!(row.len(), 104, "row width with {count} experiences");

        let filled = (1..=10)
            .filter(|slot| {
                row.get(&format!("organization_{slot}"))
                    .is_some_and(|value| !value.is_empty())
            })
            .count();
        assert_eq!(filled, count.min(10));
    }
}

#[test]
fn slot_codes_count_up_from_one_thousand() {
    let row = flatten(&record(json!({ "experience": experiences(10) })));
    for slot in 1..=10 {
        assert_eq!(
            row.get(&format!("organization_id_{slot}")),
            Some(format!("{}", 999 + slot).as_str())
        );
    }
}

#[test]
fn header_lists_every_column_in_order() {
    let schema = ColumnSchema::standard();
    let header = schema.header();
    let columns: Vec<&str> = header.split(',').collect();

    assert_eq!(columns.len(), 104);
    assert_eq!(&columns[..4], &["id", "id_type", "public_id", "profile_url"]);
    assert_eq!(columns[11], "organization_1");
    assert_eq!(columns[80], "organization_description_10");
    assert_eq!(columns[81], "education_1");
    assert_eq!(columns[96], "language_1");
    assert_eq!(&columns[102..], &["languages", "skills"]);
}

#[test]
fn csv_output_parses_back_to_the_same_cells() {
    let row = flatten(&record(json!({
        "linkedin_num_id": "42",
        "name": "Grace \"Amazing\" Hopper",
        "about": "Line one,\nline two",
        "experience": [{ "company": "Navy, US", "title": "Rear Admiral" }],
        "skills": [{ "name": "COBOL" }, { "name": "Compilers" }]
    })));
    let csv_text = row.to_csv().expect("csv renders");

    assert_eq!(csv_text.lines().count(), 2);
    assert!(!csv_text.ends_with('\n'));

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_text.as_bytes());
    let headers = reader.headers().expect("headers").clone();
    assert_eq!(headers.len(), 104);

    let records: Vec<csv::StringRecord> = reader
        .records()
        .collect::<Result<_, _>>()
        .expect("records parse");
    assert_eq!(records.len(), 1);
    let parsed = &records[0];

    let cell = |name: &str| {
        let index = headers.iter().position(|h| h == name).expect("column exists");
        parsed.get(index).expect("cell exists").to_string()
    };
    assert_eq!(cell("id"), "42");
    assert_eq!(cell("full_name"), "Grace \"Amazing\" Hopper");
    assert_eq!(cell("first_name"), "Grace");
    assert_eq!(cell("last_name"), "\"Amazing\" Hopper");
    assert_eq!(cell("summary"), "Line one, line two");
    assert_eq!(cell("organization_1"), "Navy, US");
    assert_eq!(cell("organization_id_1"), "1000");
    assert_eq!(cell("organization_2"), "");
    assert_eq!(cell("skills"), "COBOL, Compilers");
}

#[test]
fn every_data_cell_is_quoted() {
    let csv_text = flatten(&ProfileRecord::default()).to_csv().expect("csv renders");
    let (header, data) = csv_text.split_once('\n').expect("two lines");

    assert!(!header.contains('"'));
    assert_eq!(data, vec!["\"\""; 104].join(","));
}

#[test]
fn custom_capacity_changes_the_layout() {
    let schema = ColumnSchema::build(SlotCapacity {
        experience: 2,
        education: 1,
        languages: 1,
    });
    assert_eq!(schema.len(), 11 + 2 * 7 + 5 + 2 + 2);

    let row = flatten_with(&record(json!({ "experience": experiences(5) })), &schema);
    assert_eq!(row.len(), schema.len());
    assert_eq!(row.get("organization_2"), Some("Company 1"));
    assert_eq!(row.get("organization_3"), None);
}
