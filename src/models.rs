/// One CSV record; field position is bound to column identity by the header.
pub type Row = Vec<String>;

/// Parsed input: the header row and every non-empty data row after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub header: Row,
    pub rows: Vec<Row>,
}

impl Table {
    /// Header and data rows counted together, as read from disk.
    pub fn total_rows(&self) -> usize {
        self.rows.len() + 1
    }
}

/// Final output of a pipeline run: augmented header first, then data rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultMatrix {
    pub header: Row,
    pub rows: Vec<Row>,
}

impl ResultMatrix {
    /// Iterates the header followed by every data row.
    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        std::iter::once(&self.header).chain(self.rows.iter())
    }

    /// Header included.
    pub fn row_count(&self) -> usize {
        self.rows.len() + 1
    }
}

/// Output row ordering of the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputOrder {
    /// Rows appear in the order workers finished them.
    #[default]
    Completion,
    /// Rows are slotted back into their input positions.
    Input,
}
