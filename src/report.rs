use crate::models::{Transaction, TransactionAnalysis};

pub fn render_analysis(description: &str, analysis: &TransactionAnalysis) -> String {
    let mut report = String::new();

    report.push_str(&format!("# Transaction Analysis ({})\n\n", analysis.risk_level));
    if !description.is_empty() {
        report.push_str(&format!("> {}\n\n", description));
    }

    report.push_str(&format!("From:        {}\n", analysis.sender));
    report.push_str(&format!("To:          {}\n", analysis.receiver));
    report.push_str(&format!(
        "Amount:      {} {}\n",
        analysis.amount, analysis.currency
    ));
    report.push_str(&format!("Type:        {}\n", analysis.transaction_type));
    report.push_str(&format!("Date:        {}\n", analysis.transaction_date));
    report.push_str(&format!("Category:    {}\n", analysis.category));
    report.push_str(&format!(
        "Risk:        {} ({}%)\n",
        analysis.risk_level.label(),
        analysis.risk_score
    ));
    report.push_str(&format!(
        "Confidence:  {:.0}%\n",
        analysis.confidence_percent()
    ));

    if !analysis.notes.is_empty() {
        report.push_str("\n**Notes:**\n");
        for note in &analysis.notes {
            report.push_str(&format!("- {}\n", note));
        }
    }

    report
}

pub fn render_history(transactions: &[Transaction]) -> String {
    if transactions.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let mut report = String::new();
    for transaction in transactions {
        report.push_str(&format!(
            "{}  {}\n    {}\n",
            transaction.display_timestamp(),
            transaction.id,
            transaction.description
        ));
    }
    report
}
