//! Plain-text rendering of the control table and form.

use client_core::{ControlForm, ControlTable, FormAction, FormField};

const ACTIONS_HEADER: &str = "Actions";

/// Fixed-width table. The edited row is marked with `*`; unavailable actions
/// are shown as `-`.
pub fn render_table(table: &ControlTable) -> String {
    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for row in &table.rows {
        for (width, cell) in widths.iter_mut().zip(&row.cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, ' ', &table.headers, &widths, ACTIONS_HEADER);
    for row in &table.rows {
        let marker = if row.highlighted { '*' } else { ' ' };
        let actions = format!(
            "{} {}",
            if row.edit_enabled { "edit" } else { "-" },
            if row.delete_enabled { "delete" } else { "-" },
        );
        push_line(&mut out, marker, &row.cells, &widths, &actions);
    }
    if table.rows.is_empty() {
        out.push_str("  (no controls)\n");
    }
    out.push_str(match table.form_action {
        FormAction::Add => "form: add\n",
        FormAction::Update => "form: update\n",
    });
    out
}

fn push_line(out: &mut String, marker: char, cells: &[String], widths: &[usize], tail: &str) {
    out.push(marker);
    for (cell, width) in cells.iter().zip(widths) {
        out.push(' ');
        out.push_str(cell);
        out.extend(std::iter::repeat(' ').take(width - cell.chars().count()));
        out.push_str(" |");
    }
    out.push(' ');
    out.push_str(tail);
    out.push('\n');
}

pub fn render_form(form: &ControlForm) -> String {
    let mut out = String::new();
    for field in FormField::ALL {
        let locked = if field == FormField::MainId && form.is_main_id_locked() {
            " (locked)"
        } else {
            ""
        };
        out.push_str(&format!("{:<16}{}{locked}\n", field.wire_name(), form.get(field)));
    }
    out
}
