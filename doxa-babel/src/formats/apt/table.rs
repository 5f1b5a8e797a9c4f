//! Table blocks.
//!
//! ```text
//! *----------+--------------*-------------:
//! || Left    || Centered    || Right      |
//! *----------+--------------*-------------:
//! | cell     | cell         | cell        |
//! *----------+--------------*-------------:
//! Caption
//! ```
//!
//! The character ending each column of a separator line gives its justification:
//! `+` left, `*` centered, `:` right. Rows are the content lines between two
//! separators; lines of one row are joined per cell, with a space unless the cell's
//! previous line ends in the `\` line-break escape, which keeps the line break. A `||`
//! boundary before a cell makes it a header cell for that row. Text after the last
//! separator is the caption.

use crate::sink::Justification;

/// Stands in for `\|` while cells are split on `|`.
const ESCAPED_BAR: char = '\u{F8FF}';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    pub header: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub cells: Vec<Cell>,
    /// Offset of the row's first line within the block.
    pub line_offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub justification: Vec<Justification>,
    pub grid: bool,
    pub rows: Vec<Row>,
    pub caption: Option<String>,
}

fn is_separator(line: &str) -> bool {
    line.trim_start().starts_with("*--")
}

/// Justification per column, read from a separator line.
pub fn parse_justification(separator: &str) -> Vec<Justification> {
    let justification: Vec<_> = separator
        .trim()
        .chars()
        .skip(1)
        .filter_map(|c| match c {
            '+' => Some(Justification::Left),
            '*' => Some(Justification::Center),
            ':' => Some(Justification::Right),
            _ => None,
        })
        .collect();
    if justification.is_empty() {
        vec![Justification::Center]
    } else {
        justification
    }
}

/// Splits one content line into cells.
fn split_cells(line: &str, grid: bool) -> Vec<Cell> {
    let protected = line.trim().replace("\\|", &ESCAPED_BAR.to_string());
    let mut chars = protected.chars().peekable();
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut header = false;

    if grid && chars.peek() == Some(&'|') {
        chars.next();
        if chars.peek() == Some(&'|') {
            chars.next();
            header = true;
        }
    }

    while let Some(c) = chars.next() {
        if c == '|' {
            cells.push(Cell {
                text: restore(&current),
                header,
            });
            current.clear();
            header = chars.peek() == Some(&'|');
            if header {
                chars.next();
            }
        } else {
            current.push(c);
        }
    }
    if !grid || !current.trim().is_empty() {
        cells.push(Cell {
            text: restore(&current),
            header,
        });
    }
    cells
}

fn restore(text: &str) -> String {
    text.trim().replace(ESCAPED_BAR, "|")
}

/// Whether `text` ends in a backslash that is not itself escaped.
fn ends_with_line_break(text: &str) -> bool {
    text.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

fn merge_line(row: &mut Vec<Cell>, cells: Vec<Cell>) {
    for (index, cell) in cells.into_iter().enumerate() {
        match row.get_mut(index) {
            Some(existing) => {
                if !cell.text.is_empty() {
                    if ends_with_line_break(&existing.text) {
                        existing.text.push('\n');
                    } else if !existing.text.is_empty() {
                        existing.text.push(' ');
                    }
                    existing.text.push_str(&cell.text);
                }
                existing.header |= cell.header;
            }
            None => row.push(cell),
        }
    }
}

/// Parses the raw lines of a table block. The block must start with a separator line.
pub fn parse_table(text: &str) -> Table {
    let lines: Vec<&str> = text.lines().collect();
    let Some(first) = lines.first() else {
        return Table {
            justification: Vec::new(),
            grid: false,
            rows: Vec::new(),
            caption: None,
        };
    };
    let justification = parse_justification(first);
    let last_separator = lines.iter().rposition(|line| is_separator(line)).unwrap_or(0);
    let grid = lines[..last_separator]
        .iter()
        .any(|line| !is_separator(line) && line.trim_start().starts_with('|'));

    let mut rows = Vec::new();
    let mut current: Vec<Cell> = Vec::new();
    let mut row_start = 0;
    for (offset, line) in lines.iter().enumerate().take(last_separator + 1) {
        if is_separator(line) {
            let cells = std::mem::take(&mut current);
            if cells.iter().any(|cell| !cell.text.is_empty()) {
                rows.push(Row {
                    cells,
                    line_offset: row_start,
                });
            }
            row_start = offset + 1;
        } else {
            merge_line(&mut current, split_cells(line, grid));
        }
    }

    let caption = lines[last_separator + 1..]
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    Table {
        justification,
        grid,
        rows,
        caption: (!caption.is_empty()).then_some(caption),
    }
}
