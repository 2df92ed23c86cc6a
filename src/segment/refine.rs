//! HTML table refinement
//!
//! comrak ends a raw HTML block at the first blank line, so a hand-written
//! `<table>` is often reported as several HTML fragments, and an HTML block
//! may also carry unrelated markup before or after a table. These passes make
//! every `<table>...</table>` exactly one atom.

use super::atom::Atom;
use super::formula::fill_gap;
use super::lines::LineIndex;
use crate::document::BlockKind;
use crate::markdown::LineSpan;

/// Largest line distance between consecutive HTML fragments of one table.
pub const TABLE_MERGE_GAP: usize = 2;

const TABLE_OPEN: &str = "<table";
const TABLE_CLOSE: &str = "</table>";

/// Whether trimmed text starts with a `<table` open tag.
///
/// Accepts `<table`, `<table>` and `<table attr=...>`, but not `<tablex>`.
pub fn is_table_open(trimmed: &str) -> bool {
    match trimmed.strip_prefix(TABLE_OPEN) {
        Some(rest) => rest.is_empty() || rest.starts_with('>') || rest.starts_with(char::is_whitespace),
        None => false,
    }
}

fn has_table_tag(text: &str) -> bool {
    text.contains(TABLE_OPEN) || text.contains(TABLE_CLOSE)
}

/// Split HTML atoms so that tables start and end on atom boundaries.
///
/// Markup before a table's open tag and after its close tag is re-split into
/// ordinary line atoms.
pub fn split_html_tables(atoms: Vec<Atom>, lines: &LineIndex) -> Vec<Atom> {
    let mut refined = Vec::with_capacity(atoms.len());

    for atom in atoms {
        if !atom.is_html() {
            refined.push(atom);
            continue;
        }

        let node_lines = lines.slice(atom.span);
        if node_lines.is_empty() || !has_table_tag(&node_lines.join("\n")) {
            refined.push(atom);
            continue;
        }

        let base = atom.start();
        let mut current = 0;
        for (k, line) in node_lines.iter().enumerate() {
            if k > current && is_table_open(line.trim()) {
                refined.extend(fill_gap(lines, LineSpan::new(base + current, base + k - 1)));
                current = k;
            }
            if line.contains(TABLE_CLOSE) && k + 1 < node_lines.len() {
                refined.push(Atom::new(LineSpan::new(base + current, base + k), BlockKind::Html));
                current = k + 1;
            }
        }

        if current < node_lines.len() {
            let rest = LineSpan::new(base + current, base + node_lines.len() - 1);
            if has_table_tag(&node_lines[current..].join("\n")) {
                refined.push(Atom::new(rest, BlockKind::Html));
            } else {
                refined.extend(fill_gap(lines, rest));
            }
        }
    }

    refined
}

/// Merge consecutive HTML atoms that together form one table.
///
/// An HTML atom that opens a table without closing it absorbs the following
/// HTML atoms (each starting within [`TABLE_MERGE_GAP`] lines of the previous
/// one) up to the first that contains `</table>`. If no close tag is reached
/// the atoms are left as they were.
pub fn merge_html_tables(atoms: Vec<Atom>, lines: &LineIndex) -> Vec<Atom> {
    let mut merged = Vec::with_capacity(atoms.len());
    let mut i = 0;

    while i < atoms.len() {
        let atom = atoms[i];
        if atom.is_html() {
            let content = lines.join(atom.span);
            if is_table_open(content.trim()) {
                let mut last_line = atom.end();
                let mut found_close = content.contains(TABLE_CLOSE);
                let mut j = i + 1;

                while !found_close
                    && j < atoms.len()
                    && atoms[j].is_html()
                    && atoms[j].start() <= last_line + TABLE_MERGE_GAP
                {
                    last_line = atoms[j].end();
                    found_close = lines.join(atoms[j].span).contains(TABLE_CLOSE);
                    j += 1;
                }

                if found_close && j > i + 1 {
                    merged.push(Atom::new(
                        LineSpan::new(atom.start(), last_line),
                        BlockKind::Html,
                    ));
                    i = j;
                    continue;
                }
            }
        }

        merged.push(atom);
        i += 1;
    }

    merged
}

/// Run both table passes.
pub fn refine_html_tables(atoms: Vec<Atom>, lines: &LineIndex) -> Vec<Atom> {
    let split = split_html_tables(atoms, lines);
    merge_html_tables(split, lines)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
