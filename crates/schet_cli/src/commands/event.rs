//! Event subcommands.

use crate::output;
use clap::Subcommand;
use schet_core::{
    open_db, open_db_in_memory, Attendance, CommentId, CommentPatch, CoreConfig, EventId,
    EventPatch, EventService, EventView, ParticipantId, ParticipantPatch, SqliteDocumentStore,
    TermId,
};
use std::collections::BTreeMap;

#[derive(Subcommand)]
pub enum EventCommand {
    /// Create an open event
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Show one event
    Show {
        id: EventId,
        /// Output the raw view as JSON
        #[arg(long)]
        json: bool,
        /// Local UTC offset in minutes for term display
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        offset: i32,
    },
    /// Change title and/or description
    Update {
        id: EventId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Lock the event to one term
    Fix { id: EventId, term_id: TermId },
    /// Reopen a fixed event
    Unfix { id: EventId },
    /// Delete an event
    Delete { id: EventId },
    /// Propose a term (ISO form, e.g. 2014-01-01T09:00Z/2014-01-01T10:00Z)
    AddTerm { id: EventId, term: String },
    /// Replace a term value
    UpdateTerm {
        id: EventId,
        term_id: TermId,
        term: String,
    },
    /// Remove a term
    DeleteTerm { id: EventId, term_id: TermId },
    /// Register a participant
    AddParticipant {
        id: EventId,
        name: String,
        /// Attendance cell as TERM_ID=presence|absence|uncertain
        #[arg(long = "cell", value_parser = parse_cell)]
        cells: Vec<(TermId, Attendance)>,
    },
    /// Rename a participant or change cells
    UpdateParticipant {
        id: EventId,
        participant_id: ParticipantId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "cell", value_parser = parse_cell)]
        cells: Vec<(TermId, Attendance)>,
    },
    /// Remove a participant
    DeleteParticipant {
        id: EventId,
        participant_id: ParticipantId,
    },
    /// Leave a comment
    Comment {
        id: EventId,
        #[arg(long)]
        name: String,
        #[arg(long)]
        body: String,
    },
    /// Edit a comment
    UpdateComment {
        id: EventId,
        comment_id: CommentId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        body: Option<String>,
    },
    /// Remove a comment
    DeleteComment { id: EventId, comment_id: CommentId },
}

pub fn run(command: EventCommand, config: &CoreConfig) -> Result<(), Box<dyn std::error::Error>> {
    let conn = match config.db_path.as_deref() {
        Some(path) => open_db(path)?,
        None => {
            log::warn!("event=cli_db module=cli status=ok mode=memory");
            open_db_in_memory()?
        }
    };
    let service = EventService::new(SqliteDocumentStore::try_new(&conn)?);

    let view: EventView = match command {
        EventCommand::Create { title, description } => service.create(title, description)?,
        EventCommand::Show { id, json, offset } => {
            let view = service.get(id)?;
            if json {
                println!("{}", output::format_json(&view)?);
            } else {
                print!("{}", output::format_event(&view, offset));
            }
            return Ok(());
        }
        EventCommand::Update {
            id,
            title,
            description,
        } => service.update(
            id,
            EventPatch {
                title,
                description,
                fixed: None,
            },
        )?,
        EventCommand::Fix { id, term_id } => service.fix(id, term_id)?,
        EventCommand::Unfix { id } => service.unfix(id)?,
        EventCommand::Delete { id } => {
            service.delete(id)?;
            println!("deleted event {id}");
            return Ok(());
        }
        EventCommand::AddTerm { id, term } => service.add_term(id, term)?,
        EventCommand::UpdateTerm { id, term_id, term } => {
            service.update_term(id, term_id, term)?
        }
        EventCommand::DeleteTerm { id, term_id } => service.delete_term(id, term_id)?,
        EventCommand::AddParticipant { id, name, cells } => {
            let cells: BTreeMap<TermId, Attendance> = cells.into_iter().collect();
            service.add_participant(id, name, &cells)?
        }
        EventCommand::UpdateParticipant {
            id,
            participant_id,
            name,
            cells,
        } => service.update_participant(
            id,
            participant_id,
            ParticipantPatch {
                name,
                cells: cells.into_iter().collect(),
            },
        )?,
        EventCommand::DeleteParticipant { id, participant_id } => {
            service.delete_participant(id, participant_id)?
        }
        EventCommand::Comment { id, name, body } => service.add_comment(id, name, body)?,
        EventCommand::UpdateComment {
            id,
            comment_id,
            name,
            body,
        } => service.update_comment(id, comment_id, CommentPatch { name, body })?,
        EventCommand::DeleteComment { id, comment_id } => {
            service.delete_comment(id, comment_id)?
        }
    };

    println!("{}", output::format_json(&view)?);
    Ok(())
}

fn parse_cell(value: &str) -> Result<(TermId, Attendance), String> {
    let (term_id, attendance) = value
        .split_once('=')
        .ok_or_else(|| format!("expected TERM_ID=STATE, got `{value}`"))?;
    let term_id = term_id
        .trim()
        .parse::<TermId>()
        .map_err(|err| format!("invalid term id `{term_id}`: {err}"))?;
    Ok((term_id, attendance.trim().parse()?))
}

#[cfg(test)]
mod tests {
    use super::parse_cell;
    use schet_core::Attendance;

    #[test]
    fn parse_cell_reads_term_and_state() {
        assert_eq!(
            parse_cell("2=uncertain").expect("cell should parse"),
            (2, Attendance::Uncertain)
        );
        assert!(parse_cell("2").is_err());
        assert!(parse_cell("x=presence").is_err());
        assert!(parse_cell("1=late").is_err());
    }
}
