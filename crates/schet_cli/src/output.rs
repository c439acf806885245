//! Output formatting utilities.

use schet_core::{temporal, EventView};
use std::fmt::Write;

/// Formats an event view as pretty JSON.
pub fn format_json(view: &EventView) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(view)
}

/// Formats an event for reading: terms in display order with local times,
/// one attendance line per participant, then comments.
pub fn format_event(view: &EventView, offset: i32) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "#{} {}", view.id, view.title);
    if !view.description.is_empty() {
        let _ = writeln!(out, "{}", view.description);
    }

    let sorted = view.sorted_terms();
    let _ = writeln!(out, "\nTERMS");
    for (term_id, term) in &sorted {
        let marker = if view.fixed == Some(*term_id) { "*" } else { " " };
        let _ = writeln!(out, "{marker} [{term_id}] {}", pretty_or_raw(term, offset));
    }

    let _ = writeln!(out, "\nPARTICIPANTS");
    for (participant_id, name) in &view.participants {
        let cells = view
            .record
            .get(participant_id)
            .map(|row| {
                sorted
                    .iter()
                    .map(|(term_id, _)| row.get(term_id).map_or("-", |cell| cell.as_str()))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default();
        let _ = writeln!(out, "  [{participant_id}] {name}: {cells}");
    }

    if !view.comments.is_empty() {
        let _ = writeln!(out, "\nCOMMENTS");
        for (comment_id, comment) in &view.comments {
            let _ = writeln!(out, "  [{comment_id}] {}: {}", comment.name, comment.body);
        }
    }

    out
}

fn pretty_or_raw(term: &str, offset: i32) -> String {
    temporal::prettify(term, offset).unwrap_or_else(|_| term.to_string())
}

#[cfg(test)]
mod tests {
    use super::format_event;
    use schet_core::{Attendance, Event, EventView};

    #[test]
    fn format_event_orders_terms_and_marks_fixed() {
        let mut event = Event::new(3, "offsite", "");
        let late = event.terms.insert_next("2014-01-02".to_string());
        let early = event
            .terms
            .insert_next("2014-01-01T00:00Z/2014-01-01T01:00Z".to_string());
        let alice = event.participants.insert_next("alice".to_string());
        event.record.insert(
            alice,
            [(late, Attendance::Absence), (early, Attendance::Presence)]
                .into_iter()
                .collect(),
        );
        event.fixed = Some(late);

        let text = format_event(&EventView::from(&event), 540);
        let early_line = text.find("[2] 2014/01/01 09:00 - 10:00").expect("early term");
        let late_line = text.find("* [1] 2014/01/02").expect("fixed late term");
        assert!(early_line < late_line);
        assert!(text.contains("[1] alice: presence absence"));
    }
}
