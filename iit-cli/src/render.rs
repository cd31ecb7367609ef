//! Text and JSON rendering of engine results.
//!
//! Text views wrap a borrowed result and implement [`Display`] by building
//! [`tabled`] tables; JSON uses the serde derives on the core types directly.

use std::fmt::{self, Display};

use clap::ValueEnum;
use iit_core::calculations::MonthlyWithholding;
use iit_core::{BonusElection, BonusPlan, CategoryTax, Contributions, Scenario, TaxResult};
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::Table;
use tabled::builder::Builder;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};

use crate::utils::format_money;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Renders `value` as pretty JSON, or `view` as text.
pub fn render<T: Serialize>(
    format: OutputFormat,
    value: &T,
    view: impl Display,
) -> serde_json::Result<String> {
    match format {
        OutputFormat::Text => Ok(view.to_string()),
        OutputFormat::Json => serde_json::to_string_pretty(value),
    }
}

/// Finishes a table: psql borders, every column after the first right-aligned.
fn finish(builder: Builder) -> Table {
    let mut table = Table::from(builder);
    table
        .with(Style::psql())
        .modify(Columns::new(1..), Alignment::right());
    table
}

/// Two-column table of labelled amounts under `title`.
fn amount_table(
    title: &str,
    rows: Vec<(String, Decimal)>,
) -> Table {
    let mut builder = Builder::default();
    builder.push_record([title, "Amount"]);
    for (label, value) in rows {
        builder.push_record([label, format_money(value)]);
    }
    finish(builder)
}

fn percent(rate: Decimal) -> String {
    format!("{}%", (rate * Decimal::ONE_HUNDRED).normalize())
}

// ─── annual report ───────────────────────────────────────────────────────────

pub struct ReportView<'a>(pub &'a TaxResult);

fn flat_rate_categories(r: &TaxResult) -> [(&'static str, &CategoryTax); 3] {
    [
        ("Labor remuneration", &r.labor),
        ("Author's remuneration", &r.manuscript),
        ("Royalties", &r.license),
    ]
}

fn is_blank(category: &CategoryTax) -> bool {
    category.taxable_income.is_zero() && category.tax.is_zero()
}

impl ReportView<'_> {
    fn income(&self) -> Table {
        let r = self.0;
        let mut rows = vec![("Salary".to_string(), r.annual_salary)];
        if !r.bonus.taxable_income.is_zero() {
            rows.push((format!("Bonus ({})", r.bonus_election), r.bonus.taxable_income));
        }
        for (label, category) in flat_rate_categories(r) {
            if !category.taxable_income.is_zero() {
                rows.push((label.to_string(), category.taxable_income));
            }
        }
        rows.push(("Total income".to_string(), r.total_income));
        amount_table("Income", rows)
    }

    fn deductions(&self) -> Table {
        let r = self.0;
        amount_table(
            "Deductions",
            vec![
                ("Basic deduction".to_string(), r.basic_deduction),
                ("Contributions".to_string(), r.contributions.total()),
                ("Supplementary deductions".to_string(), r.supplementary_deductions),
                ("Total deductions".to_string(), r.total_deductions),
                ("Taxable income".to_string(), r.total_taxable_income),
            ],
        )
    }

    fn tax(&self) -> Table {
        let r = self.0;
        let mut rows = vec![("Salary".to_string(), r.salary.tax)];
        if !is_blank(&r.bonus) {
            rows.push((format!("Bonus ({})", r.bonus_election), r.bonus.tax));
        }
        for (label, category) in flat_rate_categories(r) {
            if !is_blank(category) {
                rows.push((label.to_string(), category.tax));
            }
        }
        rows.push(("Total tax".to_string(), r.total_tax));
        amount_table("Tax", rows)
    }
}

impl Display for ReportView<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let r = self.0;

        writeln!(f, "{}", self.income())?;
        writeln!(f)?;
        if !r.contributions.total().is_zero() {
            writeln!(f, "{}", ContributionsView(&r.contributions))?;
            writeln!(f)?;
        }
        writeln!(f, "{}", self.deductions())?;
        writeln!(f)?;
        writeln!(f, "{}", self.tax())?;
        writeln!(f)?;
        writeln!(f, "Net income: {}", format_money(r.net_income))?;

        if let Some(plan) = &r.bonus_plan {
            writeln!(f)?;
            write!(f, "{}", BonusPlanView(plan))?;
        }
        Ok(())
    }
}

// ─── contributions ───────────────────────────────────────────────────────────

pub struct ContributionsView<'a>(pub &'a Contributions);

impl Display for ContributionsView<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let c = self.0;
        let table = amount_table(
            "Contributions",
            vec![
                ("Pension insurance".to_string(), c.pension),
                ("Medical insurance".to_string(), c.medical),
                ("Unemployment insurance".to_string(), c.unemployment),
                (
                    format!("Housing fund ({})", percent(c.housing_fund_rate)),
                    c.housing_fund,
                ),
                ("Total contributions".to_string(), c.total()),
            ],
        );
        write!(f, "{table}")
    }
}

// ─── bonus comparison ────────────────────────────────────────────────────────

pub struct BonusPlanView<'a>(pub &'a BonusPlan);

fn scenario_record(
    election: BonusElection,
    scenario: &Scenario,
) -> [String; 3] {
    [
        election.as_str().to_string(),
        format_money(scenario.tax),
        format_money(scenario.net_income),
    ]
}

impl Display for BonusPlanView<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let plan = self.0;

        let mut builder = Builder::default();
        builder.push_record(["Bonus election", "Tax", "Net income"]);
        builder.push_record(scenario_record(BonusElection::Merged, &plan.merged));
        builder.push_record(scenario_record(BonusElection::Separate, &plan.separate));

        writeln!(f, "{}", finish(builder))?;
        writeln!(
            f,
            "Recommended: {} (saves {})",
            plan.recommendation,
            format_money(plan.tax_savings())
        )
    }
}

// ─── withholding ─────────────────────────────────────────────────────────────

fn schedule_table(
    rows: &[MonthlyWithholding],
    total: Option<Decimal>,
) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["Month", "Income YTD", "Deduction YTD", "Tax YTD", "Withheld"]);
    for row in rows {
        builder.push_record([
            row.month.to_string(),
            format_money(row.cumulative_income),
            format_money(row.cumulative_deduction),
            format_money(row.cumulative_tax),
            format_money(row.withheld),
        ]);
    }
    if let Some(total) = total {
        builder.push_record([
            "Total".to_string(),
            String::new(),
            String::new(),
            String::new(),
            format_money(total),
        ]);
    }
    finish(builder)
}

pub struct ScheduleView<'a>(pub &'a [MonthlyWithholding]);

impl Display for ScheduleView<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let total: Decimal = self.0.iter().map(|row| row.withheld).sum();
        writeln!(f, "{}", schedule_table(self.0, Some(total)))
    }
}

pub struct MonthView<'a>(pub &'a MonthlyWithholding);

impl Display for MonthView<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(f, "{}", schedule_table(std::slice::from_ref(self.0), None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iit_core::calculations::{BonusPlanOptimizer, CumulativeTaxCalculator, TaxReportBuilder};
    use iit_core::{TaxInput, TaxYearConfig};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn report(input: &TaxInput) -> TaxResult {
        TaxReportBuilder::new(&TaxYearConfig::default()).build(input)
    }

    // =========================================================================
    // ReportView tests
    // =========================================================================

    #[test]
    fn report_view_shows_totals() {
        let result = report(&TaxInput {
            wage: dec!(10000),
            ..Default::default()
        });

        let text = ReportView(&result).to_string();

        assert!(text.contains("Total tax"), "{text}");
        assert!(text.contains("3,480.00"), "{text}");
        assert!(text.contains("Net income: 116,520.00"), "{text}");
        assert!(!text.contains("Bonus"), "{text}");
    }

    #[test]
    fn report_view_lists_gross_salary() {
        let result = report(&TaxInput {
            wage: dec!(10000),
            ..Default::default()
        });

        let text = ReportView(&result).to_string();
        let salary_line = text
            .lines()
            .find(|line| line.contains("Salary"))
            .expect("salary line");

        assert!(salary_line.trim_end().ends_with("120,000.00"), "{text}");
    }

    #[test]
    fn report_view_breaks_down_contributions() {
        let result = report(&TaxInput {
            wage: dec!(20000),
            social_insurance_base: dec!(10000),
            housing_fund_rate: dec!(0.07),
            ..Default::default()
        });

        let text = ReportView(&result).to_string();

        assert!(text.contains("Pension insurance"), "{text}");
        assert!(text.contains("9,600.00"), "{text}");
        assert!(text.contains("Housing fund (7%)"), "{text}");
        assert!(text.contains("8,400.00"), "{text}");
        assert!(text.contains("21,000.00"), "{text}");
    }

    #[test]
    fn report_view_omits_contributions_without_base() {
        let result = report(&TaxInput {
            wage: dec!(10000),
            ..Default::default()
        });

        let text = ReportView(&result).to_string();

        assert!(!text.contains("Pension insurance"), "{text}");
    }

    #[test]
    fn report_view_includes_bonus_plan() {
        let result = report(&TaxInput {
            wage: dec!(20000),
            bonus: dec!(60000),
            ..Default::default()
        });

        let text = ReportView(&result).to_string();

        assert!(text.contains("Bonus (separate)"), "{text}");
        assert!(text.contains("Recommended: separate"), "{text}");
    }

    // =========================================================================
    // BonusPlanView tests
    // =========================================================================

    #[test]
    fn bonus_plan_view_lists_both_scenarios() {
        let config = TaxYearConfig::default();
        let plan = BonusPlanOptimizer::new(&config).optimize(dec!(20000), dec!(50000), dec!(60000));

        let text = BonusPlanView(&plan).to_string();

        assert!(text.contains("merged"), "{text}");
        assert!(text.contains("separate"), "{text}");
        assert!(text.contains("Recommended: merged (saves 2,180.00)"), "{text}");
    }

    // =========================================================================
    // ScheduleView tests
    // =========================================================================

    #[test]
    fn schedule_view_has_twelve_month_rows_and_total() {
        let config = TaxYearConfig::default();
        let schedule = CumulativeTaxCalculator::new(&config).withholding_schedule(dec!(10000), dec!(0));

        let text = ScheduleView(&schedule).to_string();
        let month_rows = text
            .lines()
            .filter(|line| line.trim_start().starts_with(|c: char| c.is_ascii_digit()))
            .count();
        let last = text.lines().last().expect("total row");

        assert_eq!(month_rows, 12);
        assert!(last.contains("Total"), "{text}");
        assert!(last.trim_end().ends_with("3,480.00"), "{text}");
    }

    #[test]
    fn month_view_has_single_row() {
        let config = TaxYearConfig::default();
        let row = CumulativeTaxCalculator::new(&config)
            .monthly_withholding(1, dec!(10000), dec!(0))
            .expect("valid month");

        let text = MonthView(&row).to_string();

        assert!(text.contains("Withheld"), "{text}");
        assert!(text.contains("150.00"), "{text}");
        assert!(!text.contains("Total"), "{text}");
    }

    // =========================================================================
    // render tests
    // =========================================================================

    #[test]
    fn render_json_uses_serde() {
        let config = TaxYearConfig::default();
        let plan = BonusPlanOptimizer::new(&config).optimize(dec!(20000), dec!(50000), dec!(60000));

        let json = render(OutputFormat::Json, &plan, BonusPlanView(&plan)).expect("serializable");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");

        assert_eq!(value["recommendation"], "merged");
    }

    #[test]
    fn render_text_uses_view() {
        let config = TaxYearConfig::default();
        let plan = BonusPlanOptimizer::new(&config).optimize(dec!(20000), dec!(50000), dec!(60000));

        let text = render(OutputFormat::Text, &plan, BonusPlanView(&plan)).expect("text");

        assert_eq!(text, BonusPlanView(&plan).to_string());
    }

    #[test]
    fn percent_drops_trailing_zeros() {
        assert_eq!(percent(dec!(0.07)), "7%");
        assert_eq!(percent(dec!(0.125)), "12.5%");
    }
}
