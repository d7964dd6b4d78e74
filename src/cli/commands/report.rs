use crate::cli::commands::CommandDefinition;
use crate::cli::core::{parse_month, CommandResult, ShellContext};
use crate::cli::output;

const CHART_WIDTH: i64 = 40;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "summary",
            "Show balance, income, expense and budget totals",
            "summary",
            cmd_summary,
        ),
        CommandDefinition::new(
            "chart",
            "Daily expense chart for a month (default: current month)",
            "chart [YYYY-MM]",
            cmd_chart,
        ),
    ]
}

fn cmd_summary(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let store = context.store();
    let config = context.config();
    output::section("Summary");
    output::info(format!(
        "Balance: {} {}",
        output::format_amount(store.balance()),
        config.currency
    ));
    output::info(format!("Income:  {}", output::format_amount(store.income())));
    output::info(format!("Expense: {}", output::format_amount(store.expense())));
    output::info(format!(
        "Budgets: {} total, {} spent, {} remaining",
        output::format_amount(store.total_budget_amount()),
        output::format_amount(store.total_spent_amount()),
        output::format_amount(store.remaining_amount())
    ));
    output::info(format!(
        "Records: {} transactions, {} budgets, {} plans",
        store.transactions().len(),
        store.budgets().len(),
        store.plans().len()
    ));
    Ok(())
}

fn cmd_chart(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let store = context.store();
    let month = match args.first() {
        Some(raw) => parse_month(raw)?,
        None => store.default_chart_month(),
    };
    let series = store.daily_expenses(month);
    let peak = series.iter().map(|day| day.total).max().unwrap_or(0);

    output::section(format!("Expenses in {}", month));
    for day in &series {
        let width = if peak > 0 {
            i128::from(day.total) * i128::from(CHART_WIDTH) / i128::from(peak)
        } else {
            0
        };
        let bar = "#".repeat(usize::try_from(width).unwrap_or(0));
        output::info(format!(
            "{} | {:<w$} {}",
            day.date.format("%d"),
            bar,
            output::format_amount(day.total),
            w = CHART_WIDTH as usize
        ));
    }
    output::info(format!(
        "Total: {}",
        output::format_amount(store.monthly_expense_total(month))
    ));
    Ok(())
}
