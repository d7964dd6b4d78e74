use crate::cli::commands::CommandDefinition;
use crate::cli::core::{
    parse_amount, parse_assignments, parse_date, CommandError, CommandResult, ShellContext,
};
use crate::cli::output;
use crate::domain::{format_date, BudgetPatch, Displayable};

const BUDGET_USAGE: &str = "budget <category> <amount> <start YYYY-MM-DD> <end YYYY-MM-DD>";
const EDIT_USAGE: &str = "edit-budget <id> <category|amount|start|end>=<value>...";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new("budget", "Create a category budget", BUDGET_USAGE, cmd_budget),
        CommandDefinition::new("edit-budget", "Edit a budget", EDIT_USAGE, cmd_edit_budget),
        CommandDefinition::new(
            "delete-budget",
            "Delete a budget",
            "delete-budget <id>",
            cmd_delete_budget,
        ),
        CommandDefinition::new(
            "budgets",
            "Show budget progress and totals",
            "budgets",
            cmd_budgets,
        ),
    ]
}

fn cmd_budget(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [category, amount, start, end] = args else {
        return Err(CommandError::InvalidArguments(format!("usage: {}", BUDGET_USAGE)));
    };
    let amount = parse_amount(amount)?;
    let start = parse_date(start)?;
    let end = parse_date(end)?;

    let id = context
        .store_mut()
        .create_budget(*category, amount, start, end)?;
    let spent = context
        .store()
        .budget(&id)
        .map(|budget| budget.spent_amount)
        .unwrap_or_default();
    output::success(format!(
        "Created budget `{}` for {} ({} to {}), already spent {}.",
        id,
        category,
        format_date(start),
        format_date(end),
        output::format_amount(spent)
    ));
    Ok(())
}

fn cmd_edit_budget(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((id, rest)) = args.split_first() else {
        return Err(CommandError::InvalidArguments(format!("usage: {}", EDIT_USAGE)));
    };

    let mut patch = BudgetPatch::default();
    for (field, value) in parse_assignments(rest, EDIT_USAGE)? {
        match field.as_str() {
            "category" => patch.category = Some(value.to_string()),
            "amount" => patch.amount = Some(parse_amount(value)?),
            "start" | "start_date" => patch.start_date = Some(parse_date(value)?),
            "end" | "end_date" => patch.end_date = Some(parse_date(value)?),
            other => {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown budget field `{}`",
                    other
                )))
            }
        }
    }

    context.store_mut().update_budget(id, patch)?;
    output::success(format!("Updated budget `{}`.", id));
    Ok(())
}

fn cmd_delete_budget(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [id] = args else {
        return Err(CommandError::InvalidArguments("usage: delete-budget <id>".into()));
    };
    match context.store_mut().delete_budget(id) {
        Some(removed) => output::success(format!("Deleted {}.", removed.display_label())),
        None => output::info(format!("No budget `{}`; nothing to delete.", id)),
    }
    Ok(())
}

fn cmd_budgets(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let store = context.store();
    output::section("Budgets");
    let progress = store.budget_progress();
    if progress.is_empty() {
        output::info("No budgets.");
    } else {
        let rows: Vec<Vec<String>> = progress
            .iter()
            .map(|row| {
                let mut percent = format!("{:.0}%", row.progress);
                if row.is_over() {
                    percent.push_str(" over");
                }
                vec![
                    row.id.clone(),
                    row.category.clone(),
                    format!("{}..{}", format_date(row.start_date), format_date(row.end_date)),
                    output::format_amount(row.spent_amount),
                    output::format_amount(row.amount),
                    percent,
                ]
            })
            .collect();
        output::render_table(&["ID", "CATEGORY", "RANGE", "SPENT", "BUDGET", "PROGRESS"], &rows);
    }
    output::info(format!(
        "Total budget: {}  spent: {}  remaining: {}",
        output::format_amount(store.total_budget_amount()),
        output::format_amount(store.total_spent_amount()),
        output::format_amount(store.remaining_amount())
    ));
    Ok(())
}
