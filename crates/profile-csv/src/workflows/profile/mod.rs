//! Flattens a scraped profile into the fixed-width spreadsheet row.

mod normalizer;
mod record;
mod row;
mod schema;

pub use record::{
    CurrentOrganization, EducationEntry, ExperienceEntry, FieldValue, LanguageEntry,
    PositionEntry, ProfileRecord, SkillEntry,
};
pub use row::FlatRow;
pub use schema::{ColumnSchema, SlotCapacity, EDUCATION_SLOTS, EXPERIENCE_SLOTS, LANGUAGE_SLOTS};

use normalizer::{flatten_text, slot_code, split_name};
use schema::slot_column;

/// Flattens `record` into the standard 104-column row.
pub fn flatten(record: &ProfileRecord) -> FlatRow<'static> {
    flatten_with(record, ColumnSchema::standard())
}

/// Flattens `record` into `schema`. Entries beyond the schema's slot capacity are
/// dropped; unfilled slots stay empty.
pub fn flatten_with<'s>(record: &ProfileRecord, schema: &'s ColumnSchema) -> FlatRow<'s> {
    let mut row = FlatRow::empty(schema);
    let capacity = schema.capacity();

    let full_name = record.display_name.text();
    let (first_name, last_name) = split_name(&full_name);

    row.set("id", record.identifier.text());
    row.set("public_id", record.handle.text());
    row.set(
        "profile_url",
        record.canonical_url.or(&record.source_url).text(),
    );
    row.set("first_name", first_name);
    row.set("last_name", last_name);
    row.set("full_name", full_name);
    row.set("avatar", record.avatar_url.text());
    row.set("headline", record.headline.text());
    row.set("location_name", record.location_label.text());
    row.set("summary", flatten_text(&record.summary.text()));

    for (index, position) in expand_positions(record)
        .into_iter()
        .take(capacity.experience)
        .enumerate()
    {
        let slot = index + 1;
        row.set(&slot_column("organization", slot), position.organization);
        row.set(&slot_column("organization_id", slot), slot_code(index));
        row.set(&slot_column("organization_url", slot), position.organization_url);
        row.set(&slot_column("organization_title", slot), position.title);
        row.set(&slot_column("organization_start", slot), position.start);
        row.set(&slot_column("organization_end", slot), position.end);
        row.set(
            &slot_column("organization_description", slot),
            flatten_text(&position.description),
        );
    }

    for (index, education) in record.education.iter().take(capacity.education).enumerate() {
        let slot = index + 1;
        row.set(&slot_column("education", slot), education.title.text());
        row.set(&slot_column("education_degree", slot), education.degree.text());
        row.set(&slot_column("education_fos", slot), education.field_of_study.text());
        row.set(&slot_column("education_start", slot), education.start_year.text());
        row.set(&slot_column("education_end", slot), education.end_year.text());
    }

    for (index, language) in record.languages.iter().take(capacity.languages).enumerate() {
        let slot = index + 1;
        row.set(&slot_column("language", slot), language.title.text());
        row.set(
            &slot_column("language_proficiency", slot),
            language.proficiency.text(),
        );
    }

    row.set(
        "languages",
        join_texts(record.languages.iter().map(|language| &language.title)),
    );
    row.set(
        "skills",
        join_texts(record.skills.iter().map(|skill| &skill.name)),
    );

    row
}

/// One experience slot's worth of data, before slot assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PositionSlot {
    organization: String,
    organization_url: String,
    title: String,
    start: String,
    end: String,
    description: String,
}

/// Expands nested positions in source order; an entry without positions is a
/// position of its own.
fn expand_positions(record: &ProfileRecord) -> Vec<PositionSlot> {
    let fallback_url = record
        .current_organization
        .as_ref()
        .map(|current| current.link.clone())
        .unwrap_or_default();
    let mut slots = Vec::new();

    for entry in &record.experience {
        let organization = entry.organization_name.text();
        let organization_url = entry.organization_url.or(&fallback_url).text();

        if entry.positions.is_empty() {
            slots.push(PositionSlot {
                organization,
                organization_url,
                title: entry.title.text(),
                start: entry.start_date.text(),
                end: entry.end_date.text(),
                description: entry.description.or(&entry.description_html).text(),
            });
            continue;
        }

        for position in &entry.positions {
            slots.push(PositionSlot {
                organization: organization.clone(),
                organization_url: organization_url.clone(),
                title: position.title.text(),
                start: position.start_date.text(),
                end: position.end_date.text(),
                description: position
                    .description
                    .or(&position.description_html)
                    .or(&entry.description)
                    .text(),
            });
        }
    }

    slots
}

fn join_texts<'a>(values: impl Iterator<Item = &'a FieldValue>) -> String {
    values.map(FieldValue::text).collect::<Vec<_>>().join(", ")
}
