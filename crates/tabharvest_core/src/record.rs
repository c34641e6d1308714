/// Number of positional fields in every extracted row.
pub const FIELD_COUNT: usize = 8;

/// Column names written as the first line of every chunk file.
pub const HEADER: [&str; FIELD_COUNT] = [
    "Name", "Acronym", "Founded", "City", "Country", "Type I", "Type II", "UID",
];

/// One extracted table row.
///
/// Fields are positional and never validated. A cell missing from the source
/// row becomes an empty string; cells past the eighth are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Record {
    fields: [String; FIELD_COUNT],
}

impl Record {
    pub fn from_cells<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut fields: [String; FIELD_COUNT] = Default::default();
        for (slot, cell) in fields.iter_mut().zip(cells) {
            *slot = cell.into();
        }
        Self { fields }
    }

    pub fn fields(&self) -> &[String; FIELD_COUNT] {
        &self.fields
    }

    pub fn name(&self) -> &str {
        &self.fields[0]
    }

    pub fn uid(&self) -> &str {
        &self.fields[FIELD_COUNT - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_rows_are_padded_and_long_rows_truncated() {
        let short = Record::from_cells(["Acme", "ACM"]);
        assert_eq!(short.name(), "Acme");
        assert_eq!(short.fields()[1], "ACM");
        assert!(short.fields()[2..].iter().all(String::is_empty));

        let long = Record::from_cells((0..10).map(|i| i.to_string()));
        assert_eq!(long.uid(), "7");
    }
}
