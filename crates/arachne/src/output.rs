//! Terminal rendering for listings, comparisons, and chains.

use arachne_api::{
    CaseRecord, CaseState, Category, CompRecord, Envelope, FileRecord, HistoryRow, ParmRecord,
};
use arachne_core::{Chain, OutputIndex};
use owo_colors::OwoColorize;
use serde_json::Value;

/// Width-pad before coloring. Padding a colored string would count the
/// escape bytes toward the width and misalign the columns.
fn pad(text: &str, width: usize) -> String {
    format!("{text:width$}")
}

/// Color a case state the way the views label them: informational while
/// editable, settled when paused, warning while occupied. Padded to its
/// column width.
fn state_label(state: CaseState) -> String {
    let text = pad(&state.to_string(), 9);
    match state {
        CaseState::Prep => text.cyan().to_string(),
        CaseState::Paused => text.green().to_string(),
        CaseState::Busy | CaseState::Running => text.yellow().to_string(),
        CaseState::Unknown => text.dimmed().to_string(),
    }
}

/// Color a significance score by how loudly it should read.
fn score_label(score: f64) -> String {
    let text = format!("{score:5.1}");
    if score >= 80.0 {
        text.red().bold().to_string()
    } else if score >= 50.0 {
        text.yellow().to_string()
    } else if score >= 20.0 {
        text
    } else {
        text.dimmed().to_string()
    }
}

pub fn render_cases(cases: &[CaseRecord]) -> String {
    let mut output = String::new();

    if cases.is_empty() {
        output.push_str("No cases loaded.\n");
        return output;
    }

    for case in cases {
        output.push_str(&format!(
            "{} {} week {:4}  {}\n",
            pad(&case.id, 10).cyan().bold(),
            state_label(case.state),
            case.tick,
            case.longname
        ));
    }

    output
}

pub fn render_files(files: &[FileRecord]) -> String {
    let mut output = String::new();

    if files.is_empty() {
        output.push_str("No scenario files on the server.\n");
        return output;
    }

    for file in files {
        output.push_str(&format!(
            "{} {:>10}  {}\n",
            pad(&file.id, 30).cyan(),
            file.size,
            file.date.dimmed()
        ));
    }

    output
}

pub fn render_comps(comps: &[CompRecord]) -> String {
    let mut output = String::new();

    if comps.is_empty() {
        output.push_str("No comparisons computed.\n");
        return output;
    }

    for comp in comps {
        let cases = match &comp.case2 {
            Some(case2) => format!("{} vs {}", comp.case1, case2),
            None => format!("{} vs its start", comp.case1),
        };
        output.push_str(&format!(
            "{} {:24} {} outputs\n",
            pad(&comp.id, 16).cyan().bold(),
            cases,
            comp.outputs.len()
        ));
    }

    output
}

/// One comparison's outputs, grouped by category and type.
pub fn render_outputs(index: &OutputIndex<'_>) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{} {} significant outputs\n",
        "##".bold(),
        index.len()
    ));

    for cat in Category::ALL {
        let size = index.cat_size(cat);
        if size == 0 {
            continue;
        }

        output.push('\n');
        output.push_str(&format!("{} ({})\n", cat.name().cyan().bold(), size));

        for diff_type in index.types_in(cat) {
            for record in index.of_type(diff_type) {
                output.push_str(&format!(
                    "  {} {:24} {}\n",
                    score_label(record.score),
                    record.name,
                    record.diff_type.dimmed()
                ));
            }
        }
    }

    output
}

pub fn render_parms(parms: &[ParmRecord], changed_only: bool) -> String {
    let mut output = String::new();

    for parm in parms {
        let Some(value) = &parm.value else {
            continue;
        };
        if changed_only && !parm.changed() {
            continue;
        }

        let marker = if parm.changed() {
            "*".yellow().to_string()
        } else {
            " ".to_string()
        };
        output.push_str(&format!("{} {:40} {}\n", marker, parm.name, value));
    }

    if output.is_empty() {
        output.push_str("No parameters to show.\n");
    }

    output
}

/// One history variable's time series as a fixed-width table. The column
/// set comes from the first row, with the time column leading.
pub fn render_history(rows: &[HistoryRow]) -> String {
    let mut output = String::new();

    let Some(first) = rows.first() else {
        output.push_str("No history rows in that range.\n");
        return output;
    };

    let mut columns: Vec<&str> = first.keys().map(String::as_str).collect();
    if let Some(pos) = columns.iter().position(|c| *c == "t") {
        columns.remove(pos);
        columns.insert(0, "t");
    }

    for column in &columns {
        output.push_str(&pad(column, 12).bold().to_string());
        output.push(' ');
    }
    output.push('\n');

    for row in rows {
        for column in &columns {
            let cell = match row.get(*column) {
                Some(Value::String(text)) => text.clone(),
                Some(value) => value.to_string(),
                None => String::new(),
            };
            output.push_str(&pad(&cell, 12));
            output.push(' ');
        }
        output.push('\n');
    }

    output
}

/// The causal chain for one output, filtered to the significance level.
/// Each node is indented by its depth; hidden subtrees are summarized in
/// the footer count.
pub fn render_chain(chain: &Chain, sig_level: f64) -> String {
    let mut output = String::new();
    let visible = chain.visible_items(sig_level);

    output.push_str(&format!(
        "{} Causal chain for {}\n\n",
        "##".bold(),
        chain.root().name.cyan().bold()
    ));

    for node in &visible {
        output.push_str(&format!(
            "{}{} {}  {}\n",
            "  ".repeat(node.level),
            score_label(node.score),
            node.name,
            format!("{}/{}", node.category, node.diff_type).dimmed()
        ));
    }

    output.push_str(&format!(
        "\nShowing {} of {} contributors at significance level {}\n",
        visible.len(),
        chain.len(),
        sig_level
    ));

    output
}

/// One-line report of an operation's outcome.
pub fn render_envelope(envelope: &Envelope) -> String {
    match envelope {
        Envelope::Ok(_) => format!("{} {}\n", "OK".green().bold(), envelope.message()),
        Envelope::Reject(errors) => {
            let mut output = format!("{} Request rejected:\n", "!".yellow().bold());
            for (parm, msg) in errors {
                output.push_str(&format!("  {} {}\n", parm.yellow(), msg));
            }
            output
        }
        Envelope::Error(message) => {
            format!("{} {}\n", "ERROR".red().bold(), message)
        }
        Envelope::Exception { message, stack } => {
            let mut output = format!("{} {}\n", "EXCEPTION".red().bold(), message);
            if !stack.is_empty() {
                output.push_str(&format!("{}\n", stack.dimmed()));
            }
            output
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arachne_core::DiffRecord;
    use std::collections::BTreeMap;

    fn record(name: &str, score: f64, inputs: &[(&str, f64)]) -> DiffRecord {
        DiffRecord {
            name: name.to_string(),
            category: Category::Social,
            diff_type: "nbmood".to_string(),
            score,
            inputs: inputs.iter().map(|(n, w)| (n.to_string(), *w)).collect(),
            leaf: inputs.is_empty(),
        }
    }

    #[test]
    fn chain_rendering_respects_the_significance_level() {
        let records = vec![
            record("nbmood.N1", 64.0, &[("sat.N1.AUT", 80.0), ("sat.N1.SFT", 10.0)]),
            record("sat.N1.AUT", 80.0, &[]),
            record("sat.N1.SFT", 10.0, &[]),
        ];
        let chain = Chain::build(&records, "nbmood.N1").unwrap();

        let text = render_chain(&chain, 20.0);
        assert!(text.contains("nbmood.N1"));
        assert!(text.contains("sat.N1.AUT"));
        assert!(!text.contains("sat.N1.SFT"));
        assert!(text.contains("Showing 2 of 3"));
    }

    #[test]
    fn empty_listings_say_so() {
        assert!(render_cases(&[]).contains("No cases"));
        assert!(render_files(&[]).contains("No scenario files"));
        assert!(render_comps(&[]).contains("No comparisons"));
        assert!(render_history(&[]).contains("No history rows"));
    }

    #[test]
    fn case_columns_pad_the_bare_text() {
        let cases = vec![
            CaseRecord {
                id: "case00".to_string(),
                longname: "Base".to_string(),
                state: CaseState::Paused,
                tick: 52,
            },
            CaseRecord {
                id: "case1".to_string(),
                longname: "Odd one".to_string(),
                state: CaseState::Unknown,
                tick: 0,
            },
        ];
        let text = render_cases(&cases);

        // Padding lands inside the color escapes, so the plain padded
        // column text is present regardless of which color wraps it.
        assert!(text.contains("case00    "));
        assert!(text.contains("case1     "));
        assert!(text.contains("PAUSED   "));
        assert!(text.contains("UNKNOWN  "));
    }

    #[test]
    fn history_table_leads_with_time() {
        let rows: Vec<HistoryRow> = vec![
            [
                ("n".to_string(), serde_json::json!("N1")),
                ("nbmood".to_string(), serde_json::json!(27.4)),
                ("t".to_string(), serde_json::json!(0)),
            ]
            .into_iter()
            .collect(),
            [
                ("n".to_string(), serde_json::json!("N1")),
                ("nbmood".to_string(), serde_json::json!(31.9)),
                ("t".to_string(), serde_json::json!(1)),
            ]
            .into_iter()
            .collect(),
        ];

        let text = render_history(&rows);
        let header = text.lines().next().unwrap();
        assert!(header.contains("t "));
        assert!(header.find('t').unwrap() < header.find('n').unwrap());
        assert!(text.contains("27.4"));
        assert!(text.contains("N1"));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn parm_rendering_marks_changed_values() {
        let parms = vec![
            ParmRecord {
                name: "sim.tickSize".to_string(),
                value: Some("1 week".to_string()),
                default: Some("1 week".to_string()),
            },
            ParmRecord {
                name: "attitude.SFT.gamma".to_string(),
                value: Some("2.0".to_string()),
                default: Some("1.0".to_string()),
            },
            ParmRecord {
                name: "attitude".to_string(),
                value: None,
                default: None,
            },
        ];

        let all = render_parms(&parms, false);
        assert!(all.contains("sim.tickSize"));
        assert!(all.contains("attitude.SFT.gamma"));
        // The valueless grouping node is skipped.
        assert_eq!(all.lines().count(), 2);

        let changed = render_parms(&parms, true);
        assert!(!changed.contains("sim.tickSize"));
        assert!(changed.contains("attitude.SFT.gamma"));
    }

    #[test]
    fn envelope_rendering_keeps_the_exception_identity() {
        let envelope = Envelope::Exception {
            message: "div by zero".to_string(),
            stack: "at strategy.tcl:14".to_string(),
        };
        let text = render_envelope(&envelope);
        assert!(text.contains("EXCEPTION"));
        assert!(text.contains("div by zero"));

        let mut errors = BTreeMap::new();
        errors.insert("longname".to_string(), "Duplicate name".to_string());
        let text = render_envelope(&Envelope::Reject(errors));
        assert!(text.contains("longname"));
    }
}
