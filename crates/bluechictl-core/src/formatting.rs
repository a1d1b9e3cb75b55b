//! Table rendering for unit lists
//!
//! Columns are sized to their widest cell, measured in bytes. Padding is
//! byte-based as well, so multi-byte text may look misaligned in a terminal
//! even though every row has the same byte length.

use crate::constants::{COLUMN_SEPARATOR, SEPARATOR_LINE_CHAR, headers};
use crate::filter::UnitFilter;
use crate::unit_list::UnitList;
use bluechi_rs::UnitInfo;
use std::io::{self, Write};
use std::rc::Rc;

/// Byte widths of the four table columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnWidths {
    pub node: usize,
    pub id: usize,
    pub active: usize,
    pub sub: usize,
}

impl Default for ColumnWidths {
    /// Widths of the header labels alone
    fn default() -> Self {
        Self {
            node: headers::NODE.len(),
            id: headers::ID.len(),
            active: headers::ACTIVE.len(),
            sub: headers::SUB.len(),
        }
    }
}

impl ColumnWidths {
    /// Widest cell per column over the header and all units
    ///
    /// Filtering does not narrow the columns.
    pub fn measure(units: &[Rc<UnitInfo>]) -> Self {
        units.iter().fold(Self::default(), |widths, unit| Self {
            node: widths.node.max(unit.node_name().len()),
            id: widths.id.max(unit.id.len()),
            active: widths.active.max(unit.active_state.len()),
            sub: widths.sub.max(unit.sub_state.len()),
        })
    }

    /// Length of one full row, separators included
    pub fn line_len(&self) -> usize {
        self.node + self.id + self.active + self.sub + 3 * COLUMN_SEPARATOR.len()
    }

    fn row(&self, node: &str, id: &str, active: &str, sub: &str) -> String {
        let mut line = String::with_capacity(self.line_len());
        push_padded(&mut line, node, self.node);
        line.push_str(COLUMN_SEPARATOR);
        push_padded(&mut line, id, self.id);
        line.push_str(COLUMN_SEPARATOR);
        push_padded(&mut line, active, self.active);
        line.push_str(COLUMN_SEPARATOR);
        push_padded(&mut line, sub, self.sub);
        line
    }
}

/// Append `value` left-aligned in a field of `width` bytes
fn push_padded(line: &mut String, value: &str, width: usize) {
    line.push_str(value);
    for _ in value.len()..width {
        line.push(' ');
    }
}

/// Write the unit table: header, separator line, then one row per matching unit
/// in insertion order
pub fn write_unit_list<W: Write>(
    out: &mut W,
    unit_list: &UnitList,
    glob_filter: Option<&str>,
) -> io::Result<()> {
    let units = unit_list.units();
    let widths = ColumnWidths::measure(&units);
    let filter = UnitFilter::new(glob_filter);

    writeln!(
        out,
        "{}",
        widths.row(headers::NODE, headers::ID, headers::ACTIVE, headers::SUB)
    )?;
    let separator: String = std::iter::repeat_n(SEPARATOR_LINE_CHAR, widths.line_len()).collect();
    writeln!(out, "{}", separator)?;

    for unit in units.iter().filter(|unit| filter.matches(&unit.id)) {
        writeln!(
            out,
            "{}",
            widths.row(
                unit.node_name(),
                &unit.id,
                &unit.active_state,
                &unit.sub_state
            )
        )?;
    }
    Ok(())
}

/// Render the unit table into a string
///
/// # Examples
///
/// ```
/// use bluechictl_core::formatting::format_unit_list;
/// use bluechictl_core::unit_list::UnitList;
///
/// let table = format_unit_list(&UnitList::new(), None);
/// assert_eq!(table, "NODE | ID | ACTIVE | SUB\n========================\n");
/// ```
pub fn format_unit_list(unit_list: &UnitList, glob_filter: Option<&str>) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail
    let _ = write_unit_list(&mut buf, unit_list, glob_filter);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Print the unit table to stdout
pub fn print_unit_list_simple(unit_list: &UnitList, glob_filter: Option<&str>) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = write_unit_list(&mut out, unit_list, glob_filter).and_then(|_| out.flush()) {
        // Closed pipes (e.g. `| head`) are not worth failing over
        tracing::debug!("Failed to write unit table: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(node: &str, id: &str, active: &str, sub: &str) -> Rc<UnitInfo> {
        Rc::new(UnitInfo {
            node: Some(node.to_string()),
            id: id.to_string(),
            active_state: active.to_string(),
            sub_state: sub.to_string(),
            ..Default::default()
        })
    }

    fn list_of(units: Vec<Rc<UnitInfo>>) -> UnitList {
        let list = UnitList::new();
        for unit in units {
            list.append(unit);
        }
        list
    }

    #[test]
    fn test_column_widths() {
        let list = list_of(vec![
            unit("n1", "a", "active", "running"),
            unit("node-long-name", "b", "inactive", "dead"),
        ]);
        let widths = ColumnWidths::measure(&list.units());
        assert_eq!(
            widths,
            ColumnWidths {
                node: 14,
                id: 2,
                active: 8,
                sub: 7
            }
        );
        assert_eq!(widths.line_len(), 14 + 2 + 8 + 7 + 3 * 3);
    }

    #[test]
    fn test_header_and_separator_lengths() {
        let list = list_of(vec![
            unit("n1", "a", "active", "running"),
            unit("node-long-name", "b", "inactive", "dead"),
        ]);
        let table = format_unit_list(&list, None);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "NODE           | ID | ACTIVE   | SUB    ");
        assert_eq!(lines[1], "=".repeat(40));
        assert_eq!(lines[2], "n1             | a  | active   | running");
        assert_eq!(lines[3], "node-long-name | b  | inactive | dead   ");
        assert!(lines.iter().all(|l| l.len() == 40));
    }

    #[test]
    fn test_filter_rows() {
        let list = list_of(vec![
            unit("n", "foo.service", "active", "running"),
            unit("n", "bar.service", "active", "running"),
            unit("n", "foobar.timer", "active", "waiting"),
        ]);

        let table = format_unit_list(&list, Some("foo*"));
        let rows: Vec<&str> = table.lines().skip(2).collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].contains("foo.service"));
        assert!(rows[1].contains("foobar.timer"));

        let table = format_unit_list(&list, None);
        assert_eq!(table.lines().skip(2).count(), 3);
    }

    #[test]
    fn test_filter_does_not_narrow_columns() {
        let list = list_of(vec![
            unit("n", "a", "active", "running"),
            unit("n", "very-long-unit-name.service", "active", "running"),
        ]);
        let table = format_unit_list(&list, Some("a"));
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].len(), lines[2].len());
        assert!(lines[0].len() > "NODE | ID | ACTIVE | SUB".len());
    }

    #[test]
    fn test_filter_matches_id_only() {
        let list = list_of(vec![unit("foo-node", "bar.service", "active", "running")]);
        let table = format_unit_list(&list, Some("foo*"));
        assert_eq!(table.lines().count(), 2);
    }

    #[test]
    fn test_empty_list() {
        let table = format_unit_list(&UnitList::new(), None);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines, vec!["NODE | ID | ACTIVE | SUB", "========================"]);
        assert_eq!(lines[1].len(), 4 + 2 + 6 + 3 + 3 * 3);
    }

    #[test]
    fn test_insertion_order_kept() {
        let list = list_of(vec![
            unit("n", "zeta.service", "active", "running"),
            unit("n", "alpha.service", "active", "running"),
        ]);
        let table = format_unit_list(&list, None);
        let rows: Vec<&str> = table.lines().skip(2).collect();
        assert!(rows[0].contains("zeta.service"));
        assert!(rows[1].contains("alpha.service"));
    }

    #[test]
    fn test_widths_are_bytes() {
        let list = list_of(vec![unit("nœud", "ü.service", "active", "running")]);
        let widths = ColumnWidths::measure(&list.units());
        assert_eq!(widths.node, 5);
        assert_eq!(widths.id, "ü.service".len());

        let table = format_unit_list(&list, None);
        assert!(table.lines().all(|l| l.len() == widths.line_len()));
    }

    #[test]
    fn test_unset_node_renders_empty() {
        let list = UnitList::new();
        list.append(Rc::new(UnitInfo {
            id: "a".to_string(),
            active_state: "active".to_string(),
            sub_state: "running".to_string(),
            ..Default::default()
        }));
        let table = format_unit_list(&list, None);
        assert_eq!(table.lines().nth(2), Some("     | a  | active | running"));
    }
}
