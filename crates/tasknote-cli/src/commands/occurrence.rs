use anyhow::{Context as _, Result};
use owo_colors::OwoColorize;
use tasknote_core::materialization::CalendarMaterializer;
use tasknote_core::resolver::OccurrenceAction;

use crate::cli::MarkCommand;
use crate::commands::Context;
use crate::util::resolve_task;

/// Completes or skips one occurrence and stores the result. The tasks file is
/// only rewritten once the whole update has been computed.
pub fn mark(ctx: &Context, command: MarkCommand, action: OccurrenceAction) -> Result<()> {
    let mut tasks = ctx.store.load()?;
    let index = resolve_task(&tasks, &command.task)?;
    let explicit = command.date.as_deref().map(|raw| ctx.parse_date(raw)).transpose()?;

    let materializer = CalendarMaterializer::new();
    let update = materializer.mark_occurrence(&tasks[index], action, explicit, ctx.today)?;
    update.apply_to(&mut tasks[index])?;
    ctx.store
        .save(&tasks)
        .with_context(|| format!("Failed to record {} for '{}'", action, tasks[index].title))?;

    let verb = match action {
        OccurrenceAction::Complete => "Completed",
        OccurrenceAction::Skip => "Skipped",
    };
    println!(
        "{} '{}' for {}",
        verb.green().bold(),
        tasks[index].title,
        update.target.to_string().cyan()
    );
    match update.next_anchor {
        Some(next) => println!("Next occurrence: {}", next.to_string().cyan()),
        None => println!("{}", "No pending occurrences left in this series.".yellow()),
    }
    Ok(())
}
