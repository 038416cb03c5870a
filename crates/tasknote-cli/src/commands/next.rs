use anyhow::Result;
use owo_colors::OwoColorize;
use tasknote_core::models::TimeCategory;
use tasknote_core::recurrence::RecurrenceManager;
use tasknote_core::resolver::resolve_target;

use crate::cli::NextCommand;
use crate::commands::Context;
use crate::util::resolve_task;
use crate::views::table::display_occurrences;

pub fn show_next(ctx: &Context, command: NextCommand) -> Result<()> {
    let tasks = ctx.store.load()?;
    let task = &tasks[resolve_task(&tasks, &command.task)?];
    let manager = RecurrenceManager::from_record(task)?;

    println!("Task: {}", task.title.cyan());
    println!("Rule: {}", manager.rule());

    let anchor = manager.anchor().map(|value| value.date);
    let target = resolve_target(None, anchor, manager.ledger(), ctx.today);
    if target < ctx.today {
        println!(
            "{} {} is still pending",
            TimeCategory::Overdue.red().bold(),
            target
        );
    }

    match manager.ledger().next_pending_on_or_after(manager.rule(), ctx.today) {
        Some(next) => println!(
            "Next pending: {} ({})",
            next.to_string().green().bold(),
            TimeCategory::classify(next, ctx.today)
        ),
        None => println!("{}", "No pending occurrences (series may have ended)".yellow()),
    }

    if let Some(count) = command.count {
        println!();
        display_occurrences(&manager.preview_occurrences(ctx.today, count), ctx.today);
    }
    Ok(())
}
