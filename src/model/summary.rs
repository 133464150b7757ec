//! Monthly totals and the expense breakdown by category.

use crate::model::{Amount, Transaction};
use rust_decimal::Decimal;
use serde::Serialize;

/// The totals for one calendar month.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Summary {
    year: i32,
    month: u32,
    income: Amount,
    expense: Amount,
    balance: Amount,
    /// Expense totals per category, largest first.
    categories: Vec<CategoryTotal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    budget: Option<BudgetProgress>,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct CategoryTotal {
    name: String,
    total: Amount,
    /// Percentage of the month's expenses, one decimal place.
    share: Decimal,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct BudgetProgress {
    goal: Amount,
    spent: Amount,
    remaining: Amount,
    /// Percentage of the goal already spent, one decimal place. Zero when the goal is zero.
    used: Decimal,
}

impl Summary {
    /// Builds the summary of `year`/`month` from `transactions`, ignoring every other month.
    pub fn for_month<'a>(
        transactions: impl IntoIterator<Item = &'a Transaction>,
        year: i32,
        month: u32,
        budget_goal: Option<Amount>,
    ) -> Self {
        let mut income = Amount::ZERO;
        let mut expense = Amount::ZERO;
        let mut categories: Vec<(String, Amount)> = Vec::new();

        for t in transactions
            .into_iter()
            .filter(|t| t.year_month() == Some((year, month)))
        {
            if t.is_income() {
                income += t.amount();
                continue;
            }
            expense += t.amount();
            match categories.iter_mut().find(|(name, _)| name == t.category()) {
                Some((_, total)) => *total += t.amount(),
                None => categories.push((t.category().to_string(), t.amount())),
            }
        }

        // Stable, so equal totals keep the order in which they were first seen.
        categories.sort_by(|a, b| b.1.cmp(&a.1));
        let categories = categories
            .into_iter()
            .map(|(name, total)| CategoryTotal {
                share: percent(total, expense),
                name,
                total,
            })
            .collect();

        let budget = budget_goal.map(|goal| BudgetProgress {
            goal,
            spent: expense,
            remaining: goal - expense,
            used: percent(expense, goal),
        });

        Self {
            year,
            month,
            income,
            expense,
            balance: income - expense,
            categories,
            budget,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn income(&self) -> Amount {
        self.income
    }

    pub fn expense(&self) -> Amount {
        self.expense
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn categories(&self) -> &[CategoryTotal] {
        &self.categories
    }

    pub fn budget(&self) -> Option<&BudgetProgress> {
        self.budget.as_ref()
    }
}

impl CategoryTotal {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn total(&self) -> Amount {
        self.total
    }

    pub fn share(&self) -> Decimal {
        self.share
    }
}

impl BudgetProgress {
    pub fn goal(&self) -> Amount {
        self.goal
    }

    pub fn spent(&self) -> Amount {
        self.spent
    }

    pub fn remaining(&self) -> Amount {
        self.remaining
    }

    pub fn used(&self) -> Decimal {
        self.used
    }
}

fn percent(part: Amount, whole: Amount) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    (part.value() * Decimal::ONE_HUNDRED / whole.value()).round_dp(1)
}
