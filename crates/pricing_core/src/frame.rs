//! Single-row frame of named cells flowing through the encoding stages

/// One cell value: text until it is encoded, then a number
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            Cell::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            Cell::Number(_) => None,
        }
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

/// Ordered, uniquely named columns of a single sample
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureFrame {
    columns: Vec<(String, Cell)>,
}

impl FeatureFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Cell> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Replace the value of `name` in place, or append it as a new column
    pub fn set(&mut self, name: impl Into<String>, cell: impl Into<Cell>) {
        let name = name.into();
        let cell = cell.into();
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = cell,
            None => self.columns.push((name, cell)),
        }
    }

    /// Remove `name` and return its value
    pub fn remove(&mut self, name: &str) -> Option<Cell> {
        let pos = self.columns.iter().position(|(n, _)| n == name)?;
        Some(self.columns.remove(pos).1)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.columns.iter().map(|(n, c)| (n.as_str(), c))
    }

    /// Names of columns still holding text
    pub fn text_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|(_, c)| matches!(c, Cell::Text(_)))
            .map(|(n, _)| n.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_in_place() {
        let mut frame = FeatureFrame::new();
        frame.set("Category", "jewelry.ring");
        frame.set("Year", 2020.0);
        frame.set("Category", 3.0);

        let names: Vec<_> = frame.names().collect();
        assert_eq!(names, vec!["Category", "Year"]);
        assert_eq!(frame.get("Category"), Some(&Cell::Number(3.0)));
    }

    #[test]
    fn test_remove_and_text_columns() {
        let mut frame = FeatureFrame::new();
        frame.set("Main_Metal", "gold");
        frame.set("Month", 5.0);
        frame.set("Main_Gem", "ruby");

        assert_eq!(frame.text_columns(), vec!["Main_Metal", "Main_Gem"]);
        assert_eq!(frame.remove("Main_Metal"), Some(Cell::Text("gold".into())));
        assert_eq!(frame.remove("Main_Metal"), None);
        assert_eq!(frame.len(), 2);
    }

    #[test]
    fn test_cell_accessors() {
        assert_eq!(Cell::from(1.5).as_number(), Some(1.5));
        assert_eq!(Cell::from("f").as_text(), Some("f"));
        assert_eq!(Cell::from("f").as_number(), None);
    }
}
