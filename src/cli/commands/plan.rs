use crate::cli::commands::CommandDefinition;
use crate::cli::core::{
    parse_amount, parse_assignments, parse_date, CommandError, CommandResult, ShellContext,
};
use crate::cli::output;
use crate::domain::{format_date, Plan, PlanPatch};

const PLAN_USAGE: &str = "plan <add|edit|delete|list>";
const ADD_USAGE: &str = "plan add <title> <target> <deadline YYYY-MM-DD> [current]";
const EDIT_USAGE: &str = "plan edit <id> <title|current|target|deadline>=<value>...";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "plan",
        "Manage savings plans",
        PLAN_USAGE,
        cmd_plan,
    )]
}

fn cmd_plan(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((subcommand, rest)) = args.split_first() else {
        return list_plans(context);
    };
    match subcommand.to_ascii_lowercase().as_str() {
        "add" => add_plan(context, rest),
        "edit" => edit_plan(context, rest),
        "delete" | "remove" => delete_plan(context, rest),
        "list" => list_plans(context),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown plan subcommand `{}`; usage: {}",
            other, PLAN_USAGE
        ))),
    }
}

fn add_plan(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (title, target, deadline, current) = match args {
        [title, target, deadline] => (*title, target, deadline, 0),
        [title, target, deadline, current] => (*title, target, deadline, parse_amount(current)?),
        _ => return Err(CommandError::InvalidArguments(format!("usage: {}", ADD_USAGE))),
    };
    let target = parse_amount(target)?;
    let deadline = parse_date(deadline)?;

    let store = context.store_mut();
    let id = store.next_id();
    let plan = Plan::new(id, title, current, target, deadline);
    let id = store.add_plan(plan)?;
    output::success(format!("Created plan `{}` ({}).", title, id));
    Ok(())
}

fn edit_plan(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((id, rest)) = args.split_first() else {
        return Err(CommandError::InvalidArguments(format!("usage: {}", EDIT_USAGE)));
    };

    let mut patch = PlanPatch::default();
    for (field, value) in parse_assignments(rest, EDIT_USAGE)? {
        match field.as_str() {
            "title" => patch.title = Some(value.to_string()),
            "current" => patch.current = Some(parse_amount(value)?),
            "target" => patch.target = Some(parse_amount(value)?),
            "deadline" => patch.deadline = Some(parse_date(value)?),
            other => {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown plan field `{}`",
                    other
                )))
            }
        }
    }

    context.store_mut().update_plan(id, patch)?;
    output::success(format!("Updated plan `{}`.", id));
    Ok(())
}

fn delete_plan(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [id] = args else {
        return Err(CommandError::InvalidArguments("usage: plan delete <id>".into()));
    };
    match context.store_mut().delete_plan(id) {
        Some(removed) => output::success(format!("Deleted plan `{}`.", removed.title)),
        None => output::info(format!("No plan `{}`; nothing to delete.", id)),
    }
    Ok(())
}

fn list_plans(context: &mut ShellContext) -> CommandResult {
    output::section("Plans");
    let plans = context.store().plans();
    if plans.is_empty() {
        output::info("No plans.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = plans
        .iter()
        .map(|plan| {
            vec![
                plan.id.clone(),
                plan.title.clone(),
                output::format_amount(plan.current),
                output::format_amount(plan.target),
                format!("{:.0}%", plan.progress()),
                format_date(plan.deadline),
            ]
        })
        .collect();
    output::render_table(&["ID", "TITLE", "SAVED", "TARGET", "PROGRESS", "DEADLINE"], &rows);
    Ok(())
}
