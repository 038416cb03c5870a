use anyhow::Result;
use tasknote_core::recurrence::{expand, RecurrenceRule};

use crate::cli::ExpandCommand;
use crate::commands::Context;

pub fn expand_rule(ctx: &Context, command: ExpandCommand) -> Result<()> {
    let from = ctx.parse_date(&command.from)?;
    let to = ctx.parse_date(&command.to)?;
    let rule = RecurrenceRule::parse(&command.rule, Some(from))?;

    for date in expand(&rule, from, to)? {
        println!("{}", date);
    }
    Ok(())
}
