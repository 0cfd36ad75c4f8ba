use std::collections::HashMap;
use std::sync::OnceLock;

pub const EXPERIENCE_SLOTS: usize = 10;
pub const EDUCATION_SLOTS: usize = 3;
pub const LANGUAGE_SLOTS: usize = 3;

pub(crate) const PROFILE_COLUMNS: &[&str] = &[
    "id",
    "id_type",
    "public_id",
    "profile_url",
    "full_name",
    "first_name",
    "last_name",
    "avatar",
    "headline",
    "location_name",
    "summary",
];

pub(crate) const EXPERIENCE_COLUMNS: &[&str] = &[
    "organization",
    "organization_id",
    "organization_url",
    "organization_title",
    "organization_start",
    "organization_end",
    "organization_description",
];

pub(crate) const EDUCATION_COLUMNS: &[&str] = &[
    "education",
    "education_degree",
    "education_fos",
    "education_start",
    "education_end",
];

pub(crate) const LANGUAGE_COLUMNS: &[&str] = &["language", "language_proficiency"];

pub(crate) const AGGREGATE_COLUMNS: &[&str] = &["languages", "skills"];

static STANDARD_SCHEMA: OnceLock<ColumnSchema> = OnceLock::new();

/// How many fixed-position slots each repeating section reserves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotCapacity {
    pub experience: usize,
    pub education: usize,
    pub languages: usize,
}

impl Default for SlotCapacity {
    fn default() -> Self {
        Self {
            experience: EXPERIENCE_SLOTS,
            education: EDUCATION_SLOTS,
            languages: LANGUAGE_SLOTS,
        }
    }
}

/// Ordered column list of a flattened profile row.
#[derive(Debug, Clone)]
pub struct ColumnSchema {
    capacity: SlotCapacity,
    columns: Vec<String>,
    positions: HashMap<String, usize>,
}

impl ColumnSchema {
    pub fn build(capacity: SlotCapacity) -> Self {
        let mut columns: Vec<String> = PROFILE_COLUMNS.iter().map(|c| c.to_string()).collect();
        push_slots(&mut columns, EXPERIENCE_COLUMNS, capacity.experience);
        push_slots(&mut columns, EDUCATION_COLUMNS, capacity.education);
        push_slots(&mut columns, LANGUAGE_COLUMNS, capacity.languages);
        columns.extend(AGGREGATE_COLUMNS.iter().map(|c| c.to_string()));

        let positions = columns
            .iter()
            .enumerate()
            .map(|(position, name)| (name.clone(), position))
            .collect();

        Self {
            capacity,
            columns,
            positions,
        }
    }

    /// Schema for the standard 10/3/3 slot layout, built once.
    pub fn standard() -> &'static ColumnSchema {
        STANDARD_SCHEMA.get_or_init(|| ColumnSchema::build(SlotCapacity::default()))
    }

    pub fn capacity(&self) -> SlotCapacity {
        self.capacity
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.positions.get(column).copied()
    }

    /// Header line: column names joined by a bare comma.
    pub fn header(&self) -> String {
        self.columns.join(",")
    }
}

fn push_slots(columns: &mut Vec<String>, group: &[&str], slots: usize) {
    for slot in 1..=slots {
        columns.extend(group.iter().map(|name| slot_column(name, slot)));
    }
}

/// Column name of `base` in the 1-indexed `slot`.
pub(crate) fn slot_column(base: &str, slot: usize) -> String {
    format!("{base}_{slot}")
}
