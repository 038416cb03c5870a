use anyhow::Result;
use tasknote_core::materialization::{CalendarMaterializer, MaterializeOptions};

use crate::cli::CalendarCommand;
use crate::commands::Context;
use crate::views::table::display_events;

pub fn show_calendar(ctx: &Context, command: CalendarCommand) -> Result<()> {
    let tasks = ctx.store.load()?;

    let from = command.from.as_deref().map(|raw| ctx.parse_date(raw)).transpose()?;
    let to = command.to.as_deref().map(|raw| ctx.parse_date(raw)).transpose()?;
    let range = ctx.config.calendar.window.window(ctx.today, from, to)?;

    let options = options_for(&ctx.config.calendar.display, &command, ctx);
    let materializer = CalendarMaterializer::new();
    let (events, summary) = materializer.materialize_with_summary(&tasks, range, &options, ctx.today);

    if command.json {
        println!("{}", serde_json::to_string_pretty(&events)?);
    } else {
        println!("Calendar {} to {}", range.start, range.end);
        display_events(&events, &ctx.tz);
        if summary.tasks_with_errors > 0 {
            println!(
                "{} task(s) could not be fully read; run with -v for details.",
                summary.tasks_with_errors
            );
        }
    }
    Ok(())
}

/// Config defaults, with each flag able to turn its kind off.
fn options_for(defaults: &MaterializeOptions, command: &CalendarCommand, ctx: &Context) -> MaterializeOptions {
    MaterializeOptions {
        show_scheduled: defaults.show_scheduled && !command.no_scheduled,
        show_due: defaults.show_due && !command.no_due,
        show_recurring: defaults.show_recurring && !command.no_recurring,
        show_time_entries: defaults.show_time_entries && !command.no_time_entries,
        show_completed_instances: defaults.show_completed_instances && !command.hide_completed,
        show_skipped_instances: defaults.show_skipped_instances && !command.hide_skipped,
        timezone: ctx.tz,
    }
}
