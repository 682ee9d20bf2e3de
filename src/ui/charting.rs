use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Chart, Dataset, GraphType, LegendPosition, Paragraph},
    Frame,
};

use crate::app::App;
use crate::format::format_duration;
use crate::record::Category;
use crate::stats::ChartSeries;

/// Compute X (run number) and Y (seconds) bounds for the trend chart
pub fn compute_chart_params(chart: &ChartSeries) -> (f64, f64) {
    let mut highest = 0.0;
    for point in chart.series.iter().flat_map(|s| s.points.iter()) {
        if point.seconds > highest {
            highest = point.seconds;
        }
    }

    let overall_runs = (chart.len as f64).max(1.0);
    // a little headroom so the top point is not drawn on the border
    (overall_runs, (highest + highest / 10.0).ceil().max(1.0))
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.1}")
    }
}

fn series_color(category: Category) -> Color {
    match category {
        Category::Forest => Color::Rgb(136, 132, 216),
        Category::Road => Color::Rgb(130, 202, 157),
    }
}

fn average_color(category: Option<Category>) -> Color {
    match category {
        Some(Category::Forest) => Color::Blue,
        Some(Category::Road) => Color::Green,
        None => Color::Red,
    }
}

/// Render the charts tab: per-route trend lines, average references, totals
pub fn render_charts(app: &App, f: &mut Frame, area: Rect) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);

    let chart_data = app.chart();
    let snapshot = app.snapshot();

    if chart_data.len == 0 {
        let empty = Paragraph::new(Span::styled(
            "No runs to chart yet.",
            Style::default().fg(Color::DarkGray),
        ))
        .alignment(Alignment::Center);
        f.render_widget(empty, chunks[0]);
    } else {
        let (x_max, y_max) = compute_chart_params(&chart_data);

        let series: Vec<(Category, Vec<(f64, f64)>)> = chart_data
            .series
            .iter()
            .map(|s| (s.category, s.points.iter().map(|p| <(f64, f64)>::from(*p)).collect()))
            .collect();
        let references: Vec<(String, Color, Vec<(f64, f64)>)> = chart_data
            .references
            .iter()
            .map(|r| {
                (
                    r.label(),
                    average_color(r.category),
                    r.points.iter().map(|p| <(f64, f64)>::from(*p)).collect(),
                )
            })
            .collect();

        let mut datasets = series
            .iter()
            .map(|(category, points)| {
                Dataset::default()
                    .name(format!("{category} route"))
                    .marker(Marker::Braille)
                    .style(Style::default().fg(series_color(*category)))
                    .graph_type(GraphType::Line)
                    .data(points)
            })
            .collect::<Vec<_>>();
        datasets.extend(references.iter().map(|(label, color, points)| {
            Dataset::default()
                .name(label.clone())
                .marker(Marker::Dot)
                .style(Style::default().fg(*color))
                .graph_type(GraphType::Line)
                .data(points)
        }));

        let chart = Chart::new(datasets)
            .legend_position(Some(LegendPosition::TopRight))
            .x_axis(
                Axis::default()
                    .title("run")
                    .bounds([0.5, x_max + 0.5])
                    .labels(vec![
                        Span::styled("1", bold_style),
                        Span::styled(format_label(x_max), bold_style),
                    ]),
            )
            .y_axis(
                Axis::default()
                    .title("seconds")
                    .bounds([0.0, y_max])
                    .labels(vec![
                        Span::styled("0", bold_style),
                        Span::styled(format_label(y_max), bold_style),
                    ]),
            );
        f.render_widget(chart, chunks[0]);
    }

    let mut spans = Vec::new();
    for category in Category::ALL {
        spans.push(Span::styled(
            format!(
                "{category} : {}",
                format_duration(snapshot.average_for(category))
            ),
            Style::default()
                .patch(bold_style)
                .fg(average_color(Some(category))),
        ));
        spans.push(Span::raw("    "));
    }
    spans.push(Span::styled(
        format!("Global : {}", format_duration(snapshot.global_average)),
        Style::default().patch(bold_style).fg(average_color(None)),
    ));
    let averages = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    f.render_widget(averages, chunks[1]);
}
