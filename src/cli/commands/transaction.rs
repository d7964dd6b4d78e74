use crate::cli::commands::CommandDefinition;
use crate::cli::core::{
    parse_amount, parse_assignments, parse_date, parse_month, parse_optional, CommandError,
    CommandResult, ShellContext,
};
use crate::cli::output;
use crate::domain::{format_date, Displayable, Transaction, TransactionKind, TransactionPatch};

const INCOME_USAGE: &str = "income <title> <amount> [YYYY-MM-DD] [category]";
const EXPENSE_USAGE: &str = "expense <title> <amount> [YYYY-MM-DD] [category]";
const EDIT_USAGE: &str =
    "edit <id> <type|title|amount|date|category>=<value>... (category=none clears)";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new("income", "Record an income", INCOME_USAGE, cmd_income),
        CommandDefinition::new("expense", "Record an expense", EXPENSE_USAGE, cmd_expense),
        CommandDefinition::new("edit", "Edit a transaction", EDIT_USAGE, cmd_edit),
        CommandDefinition::new("delete", "Delete a transaction", "delete <id>", cmd_delete),
        CommandDefinition::new(
            "list",
            "List transactions, optionally for one month or day",
            "list [YYYY-MM|YYYY-MM-DD]",
            cmd_list,
        ),
        CommandDefinition::new(
            "search",
            "Search transactions by title, amount or date",
            "search [query]",
            cmd_search,
        ),
    ]
}

fn cmd_income(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    record(context, TransactionKind::Income, args, INCOME_USAGE)
}

fn cmd_expense(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    record(context, TransactionKind::Expense, args, EXPENSE_USAGE)
}

fn record(
    context: &mut ShellContext,
    kind: TransactionKind,
    args: &[&str],
    usage: &str,
) -> CommandResult {
    let (title, amount, rest) = match args {
        [title, amount, rest @ ..] if rest.len() <= 2 => (*title, parse_amount(amount)?, rest),
        _ => return Err(CommandError::InvalidArguments(format!("usage: {}", usage))),
    };

    // A lone third argument without digits is the category, anything else must be a date.
    let (date, category) = match rest {
        [] => (context.store().today(), None),
        [single] if single.chars().any(|ch| ch.is_ascii_digit()) => (parse_date(single)?, None),
        [single] => (context.store().today(), parse_optional(single)),
        [date, category, ..] => (parse_date(date)?, parse_optional(category)),
    };

    let id = context
        .store_mut()
        .record(kind, title, amount, date, category)?;
    output::success(format!(
        "Recorded {} `{}` ({}) on {}.",
        kind,
        title,
        output::format_amount(amount),
        format_date(date)
    ));
    output::info(format!("  id: {}", id));
    Ok(())
}

fn cmd_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((id, rest)) = args.split_first() else {
        return Err(CommandError::InvalidArguments(format!("usage: {}", EDIT_USAGE)));
    };

    let mut patch = TransactionPatch::default();
    for (field, value) in parse_assignments(rest, EDIT_USAGE)? {
        match field.as_str() {
            "type" | "kind" => patch.kind = Some(value.parse::<TransactionKind>()?),
            "title" => patch.title = Some(value.to_string()),
            "amount" => patch.amount = Some(parse_amount(value)?),
            "date" => patch.date = Some(parse_date(value)?),
            "category" => patch.category = Some(parse_optional(value)),
            other => {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown transaction field `{}`",
                    other
                )))
            }
        }
    }

    context.store_mut().update_transaction(id, patch)?;
    output::success(format!("Updated transaction `{}`.", id));
    Ok(())
}

fn cmd_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [id] = args else {
        return Err(CommandError::InvalidArguments("usage: delete <id>".into()));
    };
    match context.store_mut().delete_transaction(id) {
        Some(removed) => output::success(format!("Deleted {}.", removed.display_label())),
        None => output::info(format!("No transaction `{}`; nothing to delete.", id)),
    }
    Ok(())
}

fn cmd_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let store = context.store();
    let (heading, rows) = match args.first() {
        None => ("All transactions".to_string(), store.filtered_transactions("")),
        Some(raw) if raw.len() == 7 => {
            let month = parse_month(raw)?;
            (format!("Transactions in {}", month), store.transactions_in_month(month))
        }
        Some(raw) => {
            let date = parse_date(raw)?;
            (
                format!("Transactions on {}", format_date(date)),
                store.transactions_on(date),
            )
        }
    };
    output::section(heading);
    print_transactions(&rows);
    Ok(())
}

fn cmd_search(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let query = args.join(" ");
    context.store_mut().set_search_query(query.as_str());
    let results = context.store().search_results();
    output::section(format!("Search `{}`", query));
    print_transactions(&results);
    Ok(())
}

fn print_transactions(rows: &[&Transaction]) {
    if rows.is_empty() {
        output::info("No transactions.");
        return;
    }
    let table: Vec<Vec<String>> = rows
        .iter()
        .map(|txn| {
            vec![
                txn.id.clone(),
                format_date(txn.date),
                txn.kind.to_string(),
                txn.title.clone(),
                output::format_amount(txn.signed_amount()),
                txn.category.clone().unwrap_or_else(|| "-".into()),
            ]
        })
        .collect();
    output::render_table(&["ID", "DATE", "TYPE", "TITLE", "AMOUNT", "CATEGORY"], &table);
}
