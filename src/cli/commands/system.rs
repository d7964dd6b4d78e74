use crate::cli::commands::CommandDefinition;
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::utils::build_info;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new("help", "Show available commands", "help [command]", cmd_help),
        CommandDefinition::new("version", "Show build metadata", "version", cmd_version),
        CommandDefinition::new(
            "save",
            "Write the ledger to a named snapshot",
            "save [name]",
            cmd_save,
        ),
        CommandDefinition::new(
            "load",
            "Replace the ledger with a named snapshot",
            "load [name]",
            cmd_load,
        ),
        CommandDefinition::new("exit", "Exit the shell", "exit", cmd_exit),
    ]
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let registry = context.registry();
    if let Some(name) = args.first() {
        let name = name.to_ascii_lowercase();
        let entry = registry
            .get(&name)
            .ok_or_else(|| CommandError::InvalidArguments(format!("unknown command `{}`", name)))?;
        output::section(format!("Help: {}", entry.name));
        output::info(format!("  Description: {}", entry.description));
        output::info(format!("  Usage: {}", entry.usage));
        return Ok(());
    }

    output::section("Available commands");
    for entry in registry.iter() {
        output::info(format!("  {:<14} {}", entry.name, entry.description));
    }
    output::info("Use `help <command>` for details.");
    Ok(())
}

fn cmd_version(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output::info(build_info::current().summary());
    Ok(())
}

fn cmd_save(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = context.snapshot_name(args);
    context.store().save_to(context.snapshots(), &name)?;
    context.remember_snapshot(&name)?;
    output::success(format!(
        "Saved snapshot `{}` to {}.",
        name,
        context.snapshots().snapshot_path(&name).display()
    ));
    Ok(())
}

fn cmd_load(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = context.snapshot_name(args);
    let snapshots = context.snapshots().clone();
    let warnings = context.store_mut().load_from(&snapshots, &name)?;
    for warning in &warnings {
        output::warning(warning);
    }
    context.remember_snapshot(&name)?;
    output::success(format!(
        "Loaded snapshot `{}` ({} transactions, {} budgets).",
        name,
        context.store().transactions().len(),
        context.store().budgets().len()
    ));
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output::info("Exiting shell.");
    Err(CommandError::ExitRequested)
}
