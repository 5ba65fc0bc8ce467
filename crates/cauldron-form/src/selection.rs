//! Click and shift-click handling for multi-valued fields

use std::collections::BTreeMap;

/// Last clicked option index per multi-valued field
#[derive(Debug, Clone, Default)]
pub struct SelectionCursors {
    cursors: BTreeMap<String, usize>,
}

impl SelectionCursors {
    pub fn cursor(&self, field: &str) -> Option<usize> {
        self.cursors.get(field).copied()
    }

    pub fn clear(&mut self) {
        self.cursors.clear();
    }

    /// Apply one click on `value` to `selected`, given the field's full
    /// ordered option list.
    ///
    /// A plain click toggles `value`. A shift-click with an existing cursor
    /// adds every option between the cursor and `value` (inclusive) and
    /// never removes anything. Shift without a cursor is a plain click.
    pub fn click(&mut self, field: &str, options: &[String], selected: &mut Vec<String>, value: &str, shift: bool) {
        let index = options.iter().position(|option| option == value);

        match (shift, self.cursor(field), index) {
            (true, Some(cursor), Some(index)) => {
                let start = cursor.min(index);
                let end = cursor.max(index).min(options.len().saturating_sub(1));
                for option in &options[start..=end] {
                    if !selected.contains(option) {
                        selected.push(option.clone());
                    }
                }
            }
            _ => {
                if let Some(existing) = selected.iter().position(|s| s == value) {
                    selected.remove(existing);
                } else {
                    selected.push(value.to_string());
                }
            }
        }

        match index {
            Some(index) => {
                self.cursors.insert(field.to_string(), index);
            }
            None => {
                self.cursors.remove(field);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<String> {
        (0..10).map(|i| format!("S{i}")).collect()
    }

    fn range_from(cursor: &str, click: &str) -> Vec<String> {
        let options = options();
        let mut cursors = SelectionCursors::default();
        let mut selected = Vec::new();
        cursors.click("samples", &options, &mut selected, cursor, false);
        cursors.click("samples", &options, &mut selected, click, true);
        selected.sort();
        selected
    }

    #[test]
    fn test_plain_click_toggles() {
        let options = options();
        let mut cursors = SelectionCursors::default();
        let mut selected = Vec::new();
        cursors.click("samples", &options, &mut selected, "S3", false);
        assert_eq!(selected, vec!["S3"]);
        assert_eq!(cursors.cursor("samples"), Some(3));

        cursors.click("samples", &options, &mut selected, "S3", false);
        assert!(selected.is_empty());
        assert_eq!(cursors.cursor("samples"), Some(3));
    }

    #[test]
    fn test_shift_range_is_commutative() {
        let forward = range_from("S2", "S7");
        let backward = range_from("S7", "S2");
        assert_eq!(forward, backward);
        assert_eq!(forward.len(), 6);
    }

    #[test]
    fn test_shift_never_removes() {
        let options = options();
        let mut cursors = SelectionCursors::default();
        let mut selected = vec!["S4".to_string()];
        cursors.click("samples", &options, &mut selected, "S3", false);
        cursors.click("samples", &options, &mut selected, "S5", true);
        assert_eq!(selected, vec!["S4", "S3", "S5"]);
        assert_eq!(cursors.cursor("samples"), Some(5));
    }

    #[test]
    fn test_shift_without_cursor_is_plain_click() {
        let options = options();
        let mut cursors = SelectionCursors::default();
        let mut selected = vec!["S1".to_string()];
        cursors.click("samples", &options, &mut selected, "S1", true);
        assert!(selected.is_empty());
        assert_eq!(cursors.cursor("samples"), Some(1));
    }
}
