use anyhow::Result;
use owo_colors::OwoColorize;
use tasknote_core::ledger::InstanceLedger;

use crate::cli::PruneCommand;
use crate::commands::Context;

/// Trims every recurring task's ledger to `keep_days` back from today. The
/// newest entry of each list always survives.
pub fn prune_ledgers(ctx: &Context, command: PruneCommand) -> Result<()> {
    let mut tasks = ctx.store.load()?;
    let cutoff = ctx.today.saturating_add_days(-i64::from(command.keep_days));
    let mut removed_total = 0;
    let mut tasks_touched = 0;

    for task in tasks.iter_mut().filter(|task| task.is_recurring()) {
        let (mut ledger, _warnings) =
            InstanceLedger::from_serialized(&task.completed_instances, &task.skipped_instances);
        let removed = ledger.prune_older_than(cutoff);
        if removed == 0 {
            continue;
        }
        removed_total += removed;
        tasks_touched += 1;
        task.completed_instances = ledger.completed_instances();
        task.skipped_instances = ledger.skipped_instances();
    }

    if removed_total == 0 {
        println!("Nothing to prune before {}.", cutoff);
        return Ok(());
    }
    if command.dry_run {
        println!(
            "Would remove {} entr{} from {} task(s) before {}.",
            removed_total,
            if removed_total == 1 { "y" } else { "ies" },
            tasks_touched,
            cutoff
        );
        return Ok(());
    }

    ctx.store.save(&tasks)?;
    println!(
        "{} {} entr{} from {} task(s) before {}.",
        "Pruned".green().bold(),
        removed_total,
        if removed_total == 1 { "y" } else { "ies" },
        tasks_touched,
        cutoff
    );
    Ok(())
}
