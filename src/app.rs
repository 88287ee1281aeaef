use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, BorderType, Borders, Chart, Dataset, GraphType, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};
use tracing::error;

use crate::animation::AnimationAsset;
use crate::dashboard::{
    self, Dashboard, TemperatureChart, BACKGROUND, GRID_COLOR, LINE_COLOR, SERIES_NAME,
};
use crate::driver::{
    normalize_city, run_pass, should_refresh, Outcome, Pass, WeatherSource, NOT_FOUND,
};

const TITLE: &str = " SkyWatch Dashboard ";
const CAPTION: &str = "Powered by OpenWeatherMap API | Built with ratatui";
const MISSING: &str = "--";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Refresh,
    Quit,
}

#[derive(Debug)]
pub struct App {
    pub input: String,
    pub pass: Option<Result<Pass, String>>,
    pub hover: usize,
    pub tick: usize,
    pub updating: Option<String>,
    refresh_every: Option<Duration>,
    last_refresh: Option<Instant>,
}

impl App {
    pub fn new(city: String, refresh_every: Option<Duration>) -> Self {
        Self {
            input: city,
            pass: None,
            hover: 0,
            tick: 0,
            updating: None,
            refresh_every,
            last_refresh: None,
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Esc => Action::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
            KeyCode::Enter => Action::Refresh,
            KeyCode::Backspace => {
                self.input.pop();
                Action::None
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.push(c);
                Action::None
            }
            KeyCode::Left => {
                self.hover = self.hover.saturating_sub(1);
                Action::None
            }
            KeyCode::Right => {
                let last = self.chart().map_or(0, |c| c.len().saturating_sub(1));
                self.hover = (self.hover + 1).min(last);
                Action::None
            }
            _ => Action::None,
        }
    }

    pub fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    pub fn refresh_due(&self, now: Instant) -> bool {
        match (self.refresh_every, self.last_refresh) {
            (Some(every), Some(last)) => now.duration_since(last) >= every,
            _ => false,
        }
    }

    pub fn refresh<S: WeatherSource + ?Sized>(&mut self, source: &S) {
        self.last_refresh = Some(Instant::now());
        self.pass = Some(run_pass(source, &self.input).map_err(|err| {
            error!(%err, "render pass aborted");
            err.to_string()
        }));
        self.updating = None;
        let last = self.chart().map_or(0, |c| c.len().saturating_sub(1));
        self.hover = self.hover.min(last);
    }

    fn dashboard(&self) -> Option<&Dashboard> {
        match &self.pass {
            Some(Ok(Pass {
                outcome: Outcome::Dashboard(dashboard),
                ..
            })) => Some(dashboard),
            _ => None,
        }
    }

    fn chart(&self) -> Option<&TemperatureChart> {
        self.dashboard().map(|d| &d.chart)
    }
}

pub fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    source: &dyn WeatherSource,
    tick_rate: Duration,
) -> io::Result<()> {
    let mut pending = should_refresh(false, &app.input);
    let mut last_tick = Instant::now();
    loop {
        if pending {
            app.updating = Some(format!(
                "Updating dashboard for {}...",
                normalize_city(&app.input)
            ));
            terminal.draw(|f| ui(f, app))?;
            app.refresh(source);
            pending = false;
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match app.on_key(key) {
                        Action::Quit => return Ok(()),
                        Action::Refresh => pending = should_refresh(true, &app.input),
                        Action::None => {}
                    }
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
            app.on_tick();
            if app.refresh_due(last_tick) {
                pending = should_refresh(false, &app.input);
            }
        }
    }
}

fn bordered(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(title, Style::default().fg(Color::Yellow)))
        .title_alignment(Alignment::Left)
        .border_style(Style::default().fg(Color::Cyan))
        .border_type(BorderType::Rounded)
}

fn display_input(app: &App) -> Paragraph<'_> {
    Paragraph::new(Line::from(vec![
        Span::raw(" "),
        Span::styled(app.input.as_str(), Style::default().fg(Color::Green)),
        Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
    ]))
    .block(bordered(" Enter City Name "))
}

fn display_condition(app: &App) -> Paragraph<'_> {
    let block = bordered(" Current Condition ");
    let Some(dashboard) = app.dashboard() else {
        return Paragraph::new(format!("\n {MISSING}")).block(block);
    };

    let mut lines = vec![Line::from("")];
    let asset = &dashboard.animation;
    match asset {
        AnimationAsset::Loaded { meta, .. } => {
            for row in asset.animation().frame(app.tick) {
                lines.push(Line::from(Span::styled(
                    format!("  {row}"),
                    Style::default().fg(LINE_COLOR),
                )));
            }
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!(" {}", meta.summary()),
                Style::default().fg(Color::DarkGray),
            )));
        }
        AnimationAsset::Failed { .. } => {
            lines.push(Line::from(Span::styled(
                " Animation failed to load",
                Style::default().fg(Color::Red),
            )));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!(" {}", dashboard.condition),
        Style::default().fg(Color::Yellow),
    )));
    Paragraph::new(lines).block(block)
}

fn metric<'a>(title: &'a str, value: &'a str, detail: Option<&'a str>) -> Paragraph<'a> {
    let mut lines = vec![Line::from(Span::styled(
        format!(" {value}"),
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
    ))];
    if let Some(detail) = detail {
        lines.push(Line::from(Span::styled(
            format!(" {detail}"),
            Style::default().fg(Color::Gray),
        )));
    }
    Paragraph::new(lines).block(bordered(title))
}

fn display_chart(chart: &TemperatureChart, hover: usize, area: Rect, f: &mut Frame) {
    if chart.is_empty() {
        let text = Paragraph::new(format!("\n {MISSING}")).block(bordered(dashboard::CHART_TITLE));
        f.render_widget(text, area);
        return;
    }

    let coords = chart.coordinates();
    let selected: Vec<(f64, f64)> = coords.get(hover).copied().into_iter().collect();

    let datasets = vec![
        Dataset::default()
            .name(SERIES_NAME)
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(LINE_COLOR))
            .data(&coords),
        Dataset::default()
            .marker(Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(LINE_COLOR))
            .data(&coords),
        Dataset::default()
            .marker(Marker::Block)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(Color::Yellow))
            .data(&selected),
    ];

    // The axis needs at least two labels to lay them out.
    let labels = chart.labels();
    let x_labels: Vec<Span> = if labels.len() >= 2 {
        labels.into_iter().map(Span::raw).collect()
    } else {
        Vec::new()
    };
    let [low, high] = chart.y_bounds();
    let y_labels = vec![
        Span::raw(format!("{low:.0}")),
        Span::raw(format!("{:.0}", (low + high) / 2.0)),
        Span::raw(format!("{high:.0}")),
    ];

    let widget = Chart::new(datasets)
        .block(bordered(dashboard::CHART_TITLE))
        .style(Style::default().bg(BACKGROUND))
        .x_axis(
            Axis::default()
                .title(dashboard::X_TITLE)
                .style(Style::default().fg(GRID_COLOR))
                .bounds(chart.x_bounds())
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title(dashboard::Y_TITLE)
                .style(Style::default().fg(GRID_COLOR))
                .bounds([low, high])
                .labels(y_labels),
        );
    f.render_widget(widget, area);
}

fn display_dashboard(dashboard: &Dashboard, hover: usize, area: Rect, f: &mut Frame) {
    let block = bordered("").title(Span::styled(
        format!(" {} ", dashboard.heading),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .split(inner);

    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(rows[0]);

    let metrics = &dashboard.metrics;
    f.render_widget(
        metric(" Temperature ", &metrics.temperature, Some(metrics.feels_like.as_str())),
        cells[0],
    );
    f.render_widget(metric(" Humidity ", &metrics.humidity, None), cells[1]);
    f.render_widget(metric(" Wind Speed ", &metrics.wind_speed, None), cells[2]);

    let direction = format!("{} {}", metrics.wind_direction, metrics.compass);
    let arrow = metrics.arrow().to_string();
    f.render_widget(
        metric(" Wind Direction ", &direction, Some(arrow.as_str())),
        cells[3],
    );

    display_chart(&dashboard.chart, hover, rows[1], f);

    let hover_text = dashboard
        .chart
        .hover(hover)
        .unwrap_or_else(|| MISSING.to_string());
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(" ◀ ", Style::default().fg(GRID_COLOR)),
            Span::raw(hover_text),
            Span::styled(" ▶", Style::default().fg(GRID_COLOR)),
        ])),
        rows[2],
    );
}

fn display_main(app: &App, area: Rect, f: &mut Frame) {
    if let Some(message) = &app.updating {
        let text = Paragraph::new(format!("\n {message}")).block(bordered(""));
        f.render_widget(text, area);
        return;
    }

    match &app.pass {
        Some(Ok(Pass {
            outcome: Outcome::Dashboard(dashboard),
            ..
        })) => display_dashboard(dashboard, app.hover, area, f),
        Some(Ok(Pass {
            city,
            outcome: Outcome::NotFound,
            ..
        })) => {
            let title = format!(" {city} ");
            let text = Paragraph::new(Line::from(Span::styled(
                format!(" {NOT_FOUND}"),
                Style::default().fg(Color::Red),
            )))
            .block(bordered(&title));
            f.render_widget(text, area);
        }
        Some(Err(err)) => {
            let text = Paragraph::new(Line::from(Span::styled(
                format!(" Error: {err}"),
                Style::default().fg(Color::Red),
            )))
            .wrap(Wrap { trim: false })
            .block(bordered(""));
            f.render_widget(text, area);
        }
        None => {
            let text = Paragraph::new(" Press Enter to get the dashboard").block(bordered(""));
            f.render_widget(text, area);
        }
    }
}

fn display_footer(app: &App) -> Paragraph<'_> {
    let debug = match &app.pass {
        Some(Ok(pass)) => pass.debug_line.as_deref().unwrap_or(""),
        _ => "",
    };
    Paragraph::new(vec![
        Line::from(Span::styled(
            format!(" {CAPTION}"),
            Style::default().fg(Color::Gray),
        )),
        Line::from(Span::styled(
            format!(" {debug}"),
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(Color::Cyan)),
    )
}

fn ui(f: &mut Frame, app: &App) {
    let vert_layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(
                TITLE,
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "Enter: Get Dashboard  ←/→: inspect chart  Esc: quit",
                Style::default().fg(Color::DarkGray),
            ),
        ])),
        vert_layout[0],
    );

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(0)])
        .split(vert_layout[1]);

    let lchunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(chunks[0]);

    f.render_widget(display_input(app), lchunks[0]);
    f.render_widget(display_condition(app), lchunks[1]);

    display_main(app, chunks[1], f);

    f.render_widget(display_footer(app), vert_layout[2]);
}
