//! TUI layout and widget rendering.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, Gauge, Paragraph};

use super::runtime::App;
use super::style;
use crate::sim::GridState;

/// Renders the full TUI frame.
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Min(10),   // chart
            Constraint::Length(3), // battery gauge + gas
            Constraint::Length(6), // status panel
            Constraint::Length(1), // footer
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_chart(frame, app, chunks[1]);
    render_storage(frame, app, chunks[2]);
    render_status(frame, app, chunks[3]);
    render_footer(frame, app, chunks[4]);
}

/// Header bar: scenario label, simulated clock, speed, run state.
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let (state_icon, state_label) = if app.paused {
        ("‖", "PAUSED")
    } else {
        ("▶", "RUNNING")
    };

    let clock = app.last_state().map_or_else(
        || "day 1 00:00".to_string(),
        |s| format!("day {} {}", s.simulation_day, clock_label(s.time_of_day())),
    );

    let header = Line::from(vec![
        Span::styled(
            " GRID-SIM ",
            Style::default()
                .fg(style::HEADER_FG)
                .bg(style::HEADER_BG)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(&app.label, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!(
            " │ {clock} │ {}ms │ {state_icon} {state_label} ",
            app.tick_interval_ms(),
        )),
    ]);
    frame.render_widget(Paragraph::new(header), area);
}

/// Demand vs total supply vs renewable output.
fn render_chart(frame: &mut Frame, app: &App, area: Rect) {
    let demand = series(app, GridState::total_demand_mw);
    let supply = series(app, |s| s.grid.total_generation_mw);
    let renewable = series(app, |s| s.wind.output_mw + s.solar.output_mw);

    let y_bounds = style::auto_bounds_y(&[&demand[..], &supply[..], &renewable[..]]);
    let x_lo = demand.first().map_or(0.0, |p| p.0);
    let x_hi = demand.last().map_or(1.0, |p| p.0).max(x_lo + 1.0);

    let datasets = vec![
        Dataset::default()
            .name("Demand")
            .marker(symbols::Marker::Braille)
            .style(Style::default().fg(style::DEMAND_COLOR))
            .data(&demand),
        Dataset::default()
            .name("Supply")
            .marker(symbols::Marker::Braille)
            .style(Style::default().fg(style::SUPPLY_COLOR))
            .data(&supply),
        Dataset::default()
            .name("Wind+Solar")
            .marker(symbols::Marker::Dot)
            .style(Style::default().fg(style::RENEWABLE_COLOR))
            .data(&renewable),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(" Demand vs Supply ")
                .borders(Borders::ALL),
        )
        .x_axis(
            Axis::default()
                .title("tick")
                .bounds([x_lo, x_hi])
                .labels(vec![format!("{}", x_lo as u64), format!("{}", x_hi as u64)]),
        )
        .y_axis(
            Axis::default()
                .title("MW")
                .bounds(y_bounds)
                .labels(vec![
                    format!("{:.0}", y_bounds[0]),
                    format!("{:.0}", y_bounds[1]),
                ]),
        );

    frame.render_widget(chart, area);
}

/// Chart points `(tick, value)` over the rolling history.
fn series(app: &App, value: impl Fn(&GridState) -> f64) -> Vec<(f64, f64)> {
    app.history.iter().map(|s| (s.tick as f64, value(s))).collect()
}

/// Battery charge gauge with the gas plant indicator beside it.
fn render_storage(frame: &mut Frame, app: &App, area: Rect) {
    let pct = app.battery_pct();

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(18)])
        .split(area);

    let gauge = Gauge::default()
        .block(Block::default().title(" Battery ").borders(Borders::ALL))
        .gauge_style(Style::default().fg(style::charge_color(pct)))
        .ratio((pct / 100.0).clamp(0.0, 1.0))
        .label(format!("{pct:.0}%"));
    frame.render_widget(gauge, chunks[0]);

    let (gas_label, gas_color) = match app.last_state() {
        Some(s) if s.gas.is_running => (format!("GAS {:.0} MW", s.gas.output_mw), style::GAS_ACTIVE),
        _ => ("gas idle".to_string(), style::FOOTER_FG),
    };
    let gas_widget = Paragraph::new(Line::from(Span::styled(
        gas_label,
        Style::default().fg(gas_color).add_modifier(Modifier::BOLD),
    )))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(gas_widget, chunks[1]);
}

/// Latest weather, source outputs and cumulative metrics.
fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let lines = if let Some(s) = app.last_state() {
        let stability = if s.grid.stable {
            Span::raw("stable")
        } else {
            Span::styled(
                "UNSTABLE",
                Style::default()
                    .fg(style::UNSTABLE)
                    .add_modifier(Modifier::BOLD),
            )
        };
        vec![
            Line::from(format!(
                "  wind={:>5.1} m/s  cloud={:>4.2}  temp={:>5.1} °C  industrial={}",
                s.weather.wind_speed,
                s.weather.cloud_cover,
                s.weather.temperature,
                if app.industrial_enabled() { "on" } else { "off" },
            )),
            Line::from(format!(
                "  demand={:>6.1}  wind={:>6.1} ({})  solar={:>6.1} ({})",
                s.demand.total_mw, s.wind.output_mw, s.wind.status, s.solar.output_mw, s.solar.status,
            )),
            Line::from(vec![
                Span::raw(format!(
                    "  battery={:>6.1}  gas={:>6.1}  balance={:>7.1}  ",
                    s.battery.output_mw, s.gas.output_mw, s.grid.balance_mw,
                )),
                stability,
            ]),
            Line::from(format!(
                "  renewable={:>5.1}%  co2={:.1} t  cost=€{:.0}  uptime={:.1}%",
                s.metrics.renewable_share_pct,
                s.metrics.co2_kg / 1000.0,
                s.metrics.cost_eur,
                s.metrics.uptime_pct,
            )),
        ]
    } else {
        vec![Line::from("  Waiting for first tick...")]
    };

    let block = Block::default().title(" Status ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Footer with keybinding hints, or the last control action.
fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let hints = " q:Quit  Space:Pause  +/-:Speed  s:Storm  c:Calm  i:Industrial  w/W:Wind  r:Reset";
    let text = match &app.last_action {
        Some(action) => format!("{hints}  │ {action}"),
        None => hints.to_string(),
    };
    let footer = Paragraph::new(Line::from(Span::styled(
        text,
        Style::default().fg(style::FOOTER_FG),
    )));
    frame.render_widget(footer, area);
}

/// Formats a fractional hour as `HH:MM`.
fn clock_label(hour: f64) -> String {
    let minutes = (hour * 60.0).round() as u32;
    format!("{:02}:{:02}", (minutes / 60) % 24, minutes % 60)
}
