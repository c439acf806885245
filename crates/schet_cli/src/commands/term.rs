//! Term subcommands.

use clap::Subcommand;
use schet_core::temporal;

#[derive(Subcommand)]
pub enum TermCommand {
    /// Exit non-zero unless TERM is a valid ISO term
    Validate {
        term: String,
    },
    /// Convert human-entry local text into an ISO term
    Normalize {
        /// e.g. "2014/01/01 09:00 - 10:00"
        text: String,
        /// Local UTC offset in minutes (e.g. 540 for +09:00)
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        offset: i32,
    },
    /// Render an ISO term as local display text
    Prettify {
        term: String,
        /// Local UTC offset in minutes
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        offset: i32,
    },
    /// Print terms in chronological display order
    Sort {
        #[arg(required = true)]
        terms: Vec<String>,
    },
}

pub fn run(command: TermCommand) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        TermCommand::Validate { term } => {
            if !temporal::validate(&term) {
                return Err(format!("invalid term: {term}").into());
            }
            println!("valid");
        }
        TermCommand::Normalize { text, offset } => {
            println!("{}", temporal::normalize(&text, offset)?);
        }
        TermCommand::Prettify { term, offset } => {
            println!("{}", temporal::prettify(&term, offset)?);
        }
        TermCommand::Sort { mut terms } => {
            terms.sort_by(|left, right| temporal::compare(left, right));
            for term in terms {
                println!("{term}");
            }
        }
    }
    Ok(())
}
