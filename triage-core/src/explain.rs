//! Human-readable rationale for a task's score.

use crate::components::ScoreComponents;
use crate::task::TaskRecord;

/// Build the "; "-joined explanation for one scored task.
pub fn build_explanation(task: &TaskRecord, c: &ScoreComponents, cycle_issue: bool) -> String {
    let mut parts: Vec<String> = Vec::new();

    // days_left is present exactly when the task has a due date.
    match c.days_left {
        Some(days_left) => {
            let due_text = if days_left < 0 {
                format!("overdue by {} day(s)", days_left.unsigned_abs())
            } else if days_left == 0 {
                "due today".to_string()
            } else {
                format!("due in {days_left} day(s)")
            };
            parts.push(format!("{} ({due_text})", urgency_tier(c.urgency)));
        }
        None => parts.push("No deadline (low urgency)".to_string()),
    }

    parts.push(format!("Importance {}/10", task.importance));

    if c.quick_win >= 0.7 {
        parts.push(format!("Quick win ({}h)", format_hours(task.estimated_hours)));
    } else if c.quick_win <= 0.3 {
        parts.push(format!("Higher effort ({}h)", format_hours(task.estimated_hours)));
    }

    if c.num_dependents > 0 {
        parts.push(format!("Blocks {} other task(s)", c.num_dependents));
    }

    if cycle_issue {
        parts.push("Part of dependency cycle".to_string());
    }

    parts.join("; ")
}

/// Six significant digits, trailing zeros dropped, scientific notation outside
/// `1e-4..1e6`: `2.0 -> "2"`, `4/3 -> "1.33333"`, `1e7 -> "1e+07"`.
fn format_hours(hours: f64) -> String {
    const PRECISION: i32 = 6;

    if !hours.is_finite() {
        return hours.to_string();
    }

    // Round to the target precision first; the exponent can move (9.999995 -> 1e1).
    let sci = format!("{:.*e}", (PRECISION - 1) as usize, hours);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exp: i32 = exp.parse().unwrap_or(0);

    if (-4..PRECISION).contains(&exp) {
        let decimals = (PRECISION - 1 - exp) as usize;
        trim_fraction(&format!("{hours:.decimals$}")).to_string()
    } else {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", trim_fraction(mantissa), exp.abs())
    }
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

fn urgency_tier(urgency: f64) -> &'static str {
    if urgency >= 0.8 {
        "Very urgent"
    } else if urgency >= 0.5 {
        "Moderately urgent"
    } else {
        "Low urgency"
    }
}
