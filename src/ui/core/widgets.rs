use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableRow {
    Cells(Vec<String>),
    /// One cell spanning `colspan` columns (placeholders and notices).
    Spanning { text: String, colspan: usize },
}

impl TableRow {
    pub fn cells<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TableRow::Cells(cells.into_iter().map(Into::into).collect())
    }

    pub fn spanning(text: impl Into<String>, colspan: usize) -> Self {
        TableRow::Spanning {
            text: text.into(),
            colspan,
        }
    }
}

/// Contents of every widget, keyed by widget id.
#[derive(Debug, Default, Clone)]
pub struct WidgetBoard {
    status: HashMap<String, String>,
    loading: HashMap<String, bool>,
    tables: HashMap<String, Vec<TableRow>>,
    texts: HashMap<String, String>,
}

/// Saved contents of a set of tables and text slots.
#[derive(Debug, Default, Clone)]
pub struct WidgetSnapshot {
    tables: Vec<(String, Option<Vec<TableRow>>)>,
    texts: Vec<(String, Option<String>)>,
}

impl WidgetBoard {
    pub fn set_status(&mut self, id: &str, text: impl Into<String>) {
        self.status.insert(id.to_string(), text.into());
    }

    pub fn status(&self, id: &str) -> Option<&str> {
        self.status.get(id).map(String::as_str)
    }

    pub fn set_loading(&mut self, id: &str, visible: bool) {
        self.loading.insert(id.to_string(), visible);
    }

    pub fn is_loading(&self, id: &str) -> bool {
        self.loading.get(id).copied().unwrap_or(false)
    }

    pub fn set_rows(&mut self, id: &str, rows: Vec<TableRow>) {
        self.tables.insert(id.to_string(), rows);
    }

    pub fn rows(&self, id: &str) -> Option<&[TableRow]> {
        self.tables.get(id).map(Vec::as_slice)
    }

    pub fn set_text(&mut self, id: &str, text: impl Into<String>) {
        self.texts.insert(id.to_string(), text.into());
    }

    pub fn clear_text(&mut self, id: &str) {
        self.texts.remove(id);
    }

    pub fn text(&self, id: &str) -> Option<&str> {
        self.texts.get(id).map(String::as_str)
    }

    pub fn capture(&self, tables: &[&str], texts: &[&str]) -> WidgetSnapshot {
        WidgetSnapshot {
            tables: tables
                .iter()
                .map(|id| (id.to_string(), self.tables.get(*id).cloned()))
                .collect(),
            texts: texts
                .iter()
                .map(|id| (id.to_string(), self.texts.get(*id).cloned()))
                .collect(),
        }
    }

    pub fn restore(&mut self, snapshot: WidgetSnapshot) {
        for (id, rows) in snapshot.tables {
            match rows {
                Some(rows) => self.tables.insert(id, rows),
                None => self.tables.remove(&id),
            };
        }
        for (id, text) in snapshot.texts {
            match text {
                Some(text) => self.texts.insert(id, text),
                None => self.texts.remove(&id),
            };
        }
    }
}
