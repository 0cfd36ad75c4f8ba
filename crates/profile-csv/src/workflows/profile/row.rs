use super::schema::ColumnSchema;

/// A flattened profile: one string value per schema column, never fewer.
#[derive(Debug, Clone)]
pub struct FlatRow<'s> {
    schema: &'s ColumnSchema,
    values: Vec<String>,
}

impl<'s> FlatRow<'s> {
    pub(crate) fn empty(schema: &'s ColumnSchema) -> Self {
        Self {
            schema,
            values: vec![String::new(); schema.len()],
        }
    }

    /// Writes `value` into `column`; names outside the schema are ignored.
    pub(crate) fn set(&mut self, column: &str, value: String) {
        if let Some(position) = self.schema.position(column) {
            self.values[position] = value;
        }
    }

    pub fn schema(&self) -> &ColumnSchema {
        self.schema
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.schema
            .position(column)
            .map(|position| self.values[position].as_str())
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.schema
            .columns()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }

    /// Two-line CSV document: the bare header, then every value double-quoted.
    /// No trailing newline.
    pub fn to_csv(&self) -> Result<String, csv::Error> {
        let mut writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Always)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        writer.write_record(&self.values)?;
        let bytes = writer
            .into_inner()
            .map_err(|err| csv::Error::from(err.into_error()))?;

        let data = String::from_utf8_lossy(&bytes);
        let data = data.strip_suffix('\n').unwrap_or(&data);
        Ok(format!("{}\n{}", self.schema.header(), data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::profile::schema::SlotCapacity;

    fn tiny_schema() -> ColumnSchema {
        ColumnSchema::build(SlotCapacity {
            experience: 0,
            education: 0,
            languages: 0,
        })
    }

    #[test]
    fn empty_row_serializes_quoted_empties() {
        let schema = tiny_schema();
        let row = FlatRow::empty(&schema);
        let csv = row.to_csv().expect("encode");
        let lines: Vec<&str> = csv.split('\n').collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], schema.header());
        assert_eq!(lines[1], vec!["\"\""; schema.len()].join(","));
    }

    #[test]
    fn quotes_are_doubled_and_no_trailing_newline() {
        let schema = tiny_schema();
        let mut row = FlatRow::empty(&schema);
        row.set("headline", "Builder of \"engines\", mostly".to_string());
        row.set("not_a_column", "ignored".to_string());

        let csv = row.to_csv().expect("encode");
        assert!(!csv.ends_with('\n'));
        assert!(csv.contains("\"Builder of \"\"engines\"\", mostly\""));
        assert_eq!(row.get("not_a_column"), None);
        assert_eq!(row.get("headline"), Some("Builder of \"engines\", mostly"));
    }
}
