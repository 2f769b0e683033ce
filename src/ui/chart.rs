//! Horizontal bar chart for small categorical series

use owo_colors::OwoColorize;

use crate::ui::theme;

const BAR: char = '█';

/// Bars scaled so the largest value spans `width` cells. Every positive
/// value gets at least one cell.
pub fn bar_chart(series: &[(String, i64)], width: usize) -> String {
    let max = series.iter().map(|(_, v)| *v).max().unwrap_or(0);
    let label_width = series.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);

    let mut out = String::new();
    for (label, value) in series {
        let cells = bar_cells(*value, max, width);
        let bar: String = std::iter::repeat_n(BAR, cells).collect();
        out.push_str(&format!(
            "{:<lw$} │ {} {}\n",
            label,
            bar.style(theme().bar.clone()),
            value,
            lw = label_width
        ));
    }
    out
}

fn bar_cells(value: i64, max: i64, width: usize) -> usize {
    if value <= 0 || max <= 0 {
        return 0;
    }
    let scaled = (value as f64 / max as f64 * width as f64).round() as usize;
    scaled.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_scaling() {
        assert_eq!(bar_cells(10, 10, 40), 40);
        assert_eq!(bar_cells(5, 10, 40), 20);
        assert_eq!(bar_cells(1, 1000, 40), 1);
        assert_eq!(bar_cells(0, 10, 40), 0);
    }

    #[test]
    fn test_chart_has_one_line_per_entry() {
        let series = vec![("Completed".to_string(), 4), ("Pending".to_string(), 2)];
        let chart = bar_chart(&series, 10);
        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Completed │"));
        assert!(lines[1].starts_with("Pending   │"));
        assert!(lines[0].ends_with(" 4"));
    }
}
