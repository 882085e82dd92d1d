/// Visualization module: the survey report as one HTML document.
///
/// Produces a self-contained HTML string with:
/// - Key metric cards
/// - One section per report tab (distribution, percentage crosstab and
///   per-group summary tables)
/// - Per Program-Section detail blocks with their insights
/// - The full report as an embedded JSON payload for client-side use
///
/// No scripts are emitted; the payload sits in a
/// `<script type="application/json">` block.
use crate::aggregation::{round1, FrequencyTable, PercentCrosstab, Share, TopChoice};
use crate::error::Result;
use crate::report::{
    AnswerRespondents, QuestionView, Respondent, SectionDetail, SentimentView, SurveyReport,
};

const STYLE: &str = r#"
body { font-family: sans-serif; color: #212529; margin: 24px; }
h1 { font-size: 22px; }
h2 { font-size: 17px; border-bottom: 1px solid #dee2e6; padding-bottom: 4px; margin-top: 32px; }
h3 { font-size: 14px; color: #495057; }
table { border-collapse: collapse; margin: 8px 0 16px; font-size: 12px; }
th, td { border: 1px solid #dee2e6; padding: 3px 8px; text-align: left; }
th { background: #f1f3f5; }
td.num { text-align: right; }
.cards { display: flex; gap: 12px; flex-wrap: wrap; }
.card { border: 1px solid #dee2e6; border-radius: 4px; padding: 8px 16px; min-width: 140px; }
.card .value { font-size: 20px; font-weight: 600; }
.card .title { font-size: 11px; color: #868e96; }
.insight { margin: 2px 0; font-size: 12px; }
.empty { color: #868e96; font-style: italic; }
"#;

// ── Table building ──────────────────────────────────────────────────────────

struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

enum Cell {
    Text(String),
    Num(String),
}

impl Cell {
    fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    fn count(n: u32) -> Self {
        Cell::Num(n.to_string())
    }

    fn pct(p: f64) -> Self {
        Cell::Num(format!("{:.1}%", round1(p)))
    }
}

impl Table {
    fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    fn row(&mut self, cells: Vec<Cell>) {
        self.rows.push(cells);
    }

    fn render(&self, out: &mut String) {
        if self.rows.is_empty() {
            out.push_str(r#"<p class="empty">No responses in this selection.</p>"#);
            return;
        }
        out.push_str("<table><thead><tr>");
        for h in &self.headers {
            out.push_str(&format!("<th>{}</th>", escape_html(h)));
        }
        out.push_str("</tr></thead><tbody>");
        for row in &self.rows {
            out.push_str("<tr>");
            for cell in row {
                match cell {
                    Cell::Text(s) => out.push_str(&format!("<td>{}</td>", escape_html(s))),
                    Cell::Num(s) => out.push_str(&format!(r#"<td class="num">{}</td>"#, s)),
                }
            }
            out.push_str("</tr>");
        }
        out.push_str("</tbody></table>");
    }
}

fn frequency_table(title: &str, table: &FrequencyTable, out: &mut String) {
    let total = table.total();
    let mut t = Table::new([title, "Count", "Share"]);
    for e in table.entries() {
        t.row(vec![
            Cell::text(&e.value),
            Cell::count(e.count),
            Cell::pct(crate::aggregation::percent(e.count, total)),
        ]);
    }
    t.render(out);
}

fn percent_crosstab(ct: &PercentCrosstab, out: &mut String) {
    let mut headers = vec!["Program-Section".to_string()];
    headers.extend(ct.categories.iter().cloned());
    let mut t = Table::new(headers);
    for (group, values) in ct.groups.iter().zip(&ct.values) {
        let mut cells = vec![Cell::text(group)];
        cells.extend(values.iter().map(|&v| Cell::pct(v)));
        t.row(cells);
    }
    t.render(out);
}

fn share_cells(s: &Share) -> [Cell; 2] {
    [Cell::count(s.count), Cell::pct(s.pct)]
}

fn top_cells(top: Option<&TopChoice>, none: &str) -> [Cell; 3] {
    match top {
        Some(t) => [Cell::text(&t.value), Cell::count(t.count), Cell::pct(t.pct)],
        None => [Cell::text(none), Cell::count(0), Cell::pct(0.0)],
    }
}

fn respondent_name(r: &Respondent) -> String {
    match (&r.name, &r.email) {
        (Some(n), Some(e)) => format!("{n} <{e}>"),
        (Some(n), None) => n.clone(),
        (None, Some(e)) => e.clone(),
        (None, None) => "(anonymous)".to_string(),
    }
}

fn answer_respondents(answers: &[AnswerRespondents], out: &mut String) {
    let mut t = Table::new(["Answer", "Program-Section", "Respondents"]);
    for a in answers {
        for g in &a.groups {
            let names: Vec<String> = g.respondents.iter().map(respondent_name).collect();
            t.row(vec![
                Cell::text(&a.answer),
                Cell::text(&g.group),
                Cell::text(names.join(", ")),
            ]);
        }
    }
    t.render(out);
}

// ── Sections ────────────────────────────────────────────────────────────────

fn key_metrics(report: &SurveyReport, out: &mut String) {
    let m = &report.key_metrics;
    let card = |title: &str, value: String| {
        format!(
            r#"<div class="card"><div class="value">{}</div><div class="title">{}</div></div>"#,
            escape_html(&value),
            escape_html(title)
        )
    };
    out.push_str(r#"<div class="cards">"#);
    out.push_str(&card("Total Responses", m.total_responses.to_string()));
    out.push_str(&card("Programs", m.programs.to_string()));
    out.push_str(&card("Sections", m.sections.to_string()));
    out.push_str(&card("Find Expensive", format!("{:.1}%", round1(m.expensive_pct))));
    out.push_str(&card(
        "Definitely Willing",
        format!("{:.1}%", round1(m.definitely_willing_pct)),
    ));
    out.push_str("</div>");
    if let (Some(first), Some(last)) = (m.first_response, m.last_response) {
        out.push_str(&format!(
            r#"<p class="insight">Responses from {} to {}</p>"#,
            first.format("%Y-%m-%d %H:%M"),
            last.format("%Y-%m-%d %H:%M")
        ));
    }
}

fn question_section(view: &QuestionView, out: &mut String) {
    out.push_str(&format!(
        "<h2>{}</h2><p>{}</p>",
        escape_html(view.question.title()),
        escape_html(view.question.prompt())
    ));
    frequency_table("Answer", &view.distribution, out);
    out.push_str("<h3>By Program-Section (% of group)</h3>");
    percent_crosstab(&view.percentages, out);
    out.push_str("<h3>Respondents</h3>");
    answer_respondents(&view.respondents, out);
}

fn sentiment_section(view: &SentimentView, out: &mut String) {
    out.push_str(&format!(
        "<h2>Sentiment</h2><p>Overall: {:.1} ({})</p>",
        round1(view.overall.overall),
        escape_html(&view.label)
    ));
    let mut t = Table::new([
        "Program-Section",
        "Responses",
        "Financial",
        "Participation",
        "Process",
        "Overall",
        "Sentiment",
    ]);
    for r in &view.by_group {
        t.row(vec![
            Cell::text(&r.group),
            Cell::count(r.total),
            Cell::pct(r.score.financial),
            Cell::pct(r.score.participation),
            Cell::pct(r.score.process),
            Cell::pct(r.score.overall),
            Cell::text(&r.label),
        ]);
    }
    t.render(out);
    if !view.concerning.is_empty() {
        out.push_str(&format!(
            r#"<p class="insight">Concerning: {}</p>"#,
            escape_html(&view.concerning.join(", "))
        ));
    }
    if !view.very_positive.is_empty() {
        out.push_str(&format!(
            r#"<p class="insight">Very positive: {}</p>"#,
            escape_html(&view.very_positive.join(", "))
        ));
    }
}

fn section_detail(detail: &SectionDetail, out: &mut String) {
    out.push_str(&format!(
        "<h3>{} ({} students)</h3>",
        escape_html(&detail.group),
        detail.students.len()
    ));
    for insight in &detail.insights {
        out.push_str(&format!(
            r#"<p class="insight">{}</p>"#,
            escape_html(&insight.to_string())
        ));
    }
    let mut t = Table::new(["Measure", "Value", "Label"]);
    t.row(vec![
        Cell::text("Find expensive"),
        Cell::pct(detail.affordability.expensive.pct),
        Cell::text(&detail.affordability.label),
    ]);
    t.row(vec![
        Cell::text("Vote didn't matter"),
        Cell::pct(detail.confidence.dissatisfied.pct),
        Cell::text(&detail.confidence.label),
    ]);
    t.row(vec![
        Cell::text("Believe external factors"),
        Cell::pct(detail.trust.believes_external.pct),
        Cell::text(&detail.trust.label),
    ]);
    t.row(vec![
        Cell::text("Definitely willing"),
        Cell::pct(detail.willingness.definitely.pct),
        Cell::text(&detail.willingness.label),
    ]);
    t.row(vec![
        Cell::text("Sentiment"),
        Cell::pct(detail.sentiment.score.overall),
        Cell::text(&detail.sentiment.label),
    ]);
    t.render(out);
    frequency_table("Barrier", &detail.barrier_frequency, out);
}

// ── HTML generation ─────────────────────────────────────────────────────────

/// Main entry point: renders every tab of `report` into one HTML document
/// and embeds the report itself as JSON.
pub fn render_report_html(report: &SurveyReport) -> Result<String> {
    let mut body = String::new();

    // ── Overview ────────────────────────────────────────────────────────
    body.push_str("<h2>Key Metrics</h2>");
    key_metrics(report, &mut body);
    body.push_str("<h2>Overview</h2>");
    frequency_table("Program", &report.overview.responses_by_program, &mut body);

    // ── Question tabs ───────────────────────────────────────────────────
    question_section(&report.location, &mut body);

    question_section(&report.affordability.view, &mut body);
    let mut t = Table::new([
        "Program-Section",
        "Responses",
        "Expensive",
        "%",
        "Affordable",
        "%",
        "Sentiment",
    ]);
    for r in &report.affordability.by_group {
        let mut cells = vec![Cell::text(&r.group), Cell::count(r.total)];
        cells.extend(share_cells(&r.expensive));
        cells.extend(share_cells(&r.affordable));
        cells.push(Cell::text(&r.label));
        t.row(cells);
    }
    t.render(&mut body);

    question_section(&report.important_factors.view, &mut body);
    let mut t = Table::new(["Program-Section", "Responses", "Top Priority", "Count", "%"]);
    for r in &report.important_factors.by_group {
        let mut cells = vec![Cell::text(&r.group), Cell::count(r.total)];
        cells.extend(top_cells(r.top.as_ref(), "-"));
        t.row(cells);
    }
    t.render(&mut body);

    question_section(&report.voting_power.view, &mut body);
    let mut t = Table::new([
        "Program-Section",
        "Responses",
        "Dissatisfied",
        "%",
        "Satisfied",
        "%",
        "Confidence",
    ]);
    for r in &report.voting_power.by_group {
        let mut cells = vec![Cell::text(&r.group), Cell::count(r.total)];
        cells.extend(share_cells(&r.dissatisfied));
        cells.extend(share_cells(&r.satisfied));
        cells.push(Cell::text(&r.label));
        t.row(cells);
    }
    t.render(&mut body);

    question_section(&report.non_student_factors.view, &mut body);
    let mut t = Table::new(["Program-Section", "Responses", "Believe External", "%", "Trust"]);
    for r in &report.non_student_factors.by_group {
        let mut cells = vec![Cell::text(&r.group), Cell::count(r.total)];
        cells.extend(share_cells(&r.believes_external));
        cells.push(Cell::text(&r.label));
        t.row(cells);
    }
    t.render(&mut body);

    question_section(&report.manila_willingness.view, &mut body);
    let mut t = Table::new([
        "Program-Section",
        "Responses",
        "Definitely",
        "%",
        "Definitely or Probably",
        "%",
        "Willingness",
    ]);
    for r in &report.manila_willingness.by_group {
        let mut cells = vec![Cell::text(&r.group), Cell::count(r.total)];
        cells.extend(share_cells(&r.definitely));
        cells.extend(share_cells(&r.positive));
        cells.push(Cell::text(&r.label));
        t.row(cells);
    }
    t.render(&mut body);

    // ── Barriers ────────────────────────────────────────────────────────
    body.push_str("<h2>Barriers</h2>");
    frequency_table("Barrier", &report.barriers.frequency, &mut body);
    let mut t = Table::new([
        "Program-Section",
        "Responses",
        "Top Barrier",
        "Count",
        "%",
        "Total Reported",
    ]);
    for r in &report.barriers.by_group {
        let mut cells = vec![Cell::text(&r.group), Cell::count(r.total)];
        cells.extend(top_cells(r.top.as_ref(), r.top_label()));
        cells.push(Cell::count(r.total_reported));
        t.row(cells);
    }
    t.render(&mut body);
    body.push_str("<h3>Respondents</h3>");
    answer_respondents(&report.barriers.respondents, &mut body);

    // ── Comments ────────────────────────────────────────────────────────
    body.push_str("<h2>Additional Comments</h2>");
    let mut t = Table::new(["Name", "Program-Section", "Comment"]);
    for c in &report.comments.comments {
        t.row(vec![
            Cell::text(c.name.as_deref().unwrap_or("-")),
            Cell::text(c.group.as_deref().unwrap_or("-")),
            Cell::text(&c.text),
        ]);
    }
    t.render(&mut body);

    question_section(&report.preferred_package.view, &mut body);
    let mut t = Table::new(["Program-Section", "Responses", "Preferred Package", "Count", "%"]);
    for r in &report.preferred_package.by_group {
        let mut cells = vec![Cell::text(&r.group), Cell::count(r.total)];
        cells.extend(top_cells(r.top.as_ref(), "-"));
        t.row(cells);
    }
    t.render(&mut body);

    sentiment_section(&report.sentiment, &mut body);

    // ── Per-section detail and comparison ───────────────────────────────
    body.push_str("<h2>Section Details</h2>");
    for detail in &report.sections {
        section_detail(detail, &mut body);
    }

    body.push_str("<h2>Section Comparison</h2>");
    let mut t = Table::new([
        "Program-Section",
        "Responses",
        "Find Expensive",
        "Definitely Willing",
        "Top Location",
        "Top Package",
    ]);
    for r in &report.comparison {
        t.row(vec![
            Cell::text(&r.group),
            Cell::count(r.total),
            Cell::pct(r.expensive_pct),
            Cell::pct(r.definitely_willing_pct),
            Cell::text(r.preferred_location.as_deref().unwrap_or("-")),
            Cell::text(r.preferred_package.as_deref().unwrap_or("-")),
        ]);
    }
    t.render(&mut body);

    // ── Emit HTML ───────────────────────────────────────────────────────
    let payload = serde_json::to_string(report)?.replace("</", "<\\/");
    let html = format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Educational Tour Survey Report</title>
<style>{style}</style>
</head>
<body>
<h1>Educational Tour Survey Report</h1>
<p>Programs: {programs} | Sections: {sections}</p>
{body}
<script type="application/json" id="survey-report-data">{payload}</script>
</body>
</html>"##,
        style = STYLE,
        programs = escape_html(&report.selection.programs.join(", ")),
        sections = escape_html(&report.selection.sections.join(", ")),
        body = body,
        payload = payload,
    );

    Ok(html)
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
