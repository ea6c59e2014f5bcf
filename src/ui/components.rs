//! Panels for the terminal dashboard

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, LineGauge, List, ListItem, Paragraph, Row, Table};
use ratatui::Frame;
use std::collections::VecDeque;

use super::{Phase, Progress};
use crate::writer::StepOutcome;

const BORDER: Style = Style::new().fg(Color::Blue);

/// Current phase, detail line and progress gauge
pub struct StatusPanel {
    phase: Phase,
    info: String,
    progress: Option<Progress>,
}

impl StatusPanel {
    pub fn new() -> Self {
        Self {
            phase: Phase::Fetching,
            info: String::new(),
            progress: None,
        }
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub fn set_info(&mut self, info: impl Into<String>) {
        self.info = info.into();
    }

    pub fn set_progress(&mut self, progress: Option<Progress>) {
        self.progress = progress;
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Meteorite Regions ")
            .border_style(BORDER);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Length(1)])
            .split(inner);

        let color = if self.phase == Phase::Complete {
            Color::Green
        } else {
            Color::Cyan
        };
        let lines = vec![
            Line::from(Span::styled(
                format!(" {}", self.phase),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!(" {}", self.info),
                Style::default().fg(Color::Gray),
            )),
        ];
        frame.render_widget(Paragraph::new(lines), rows[0]);

        if let Some(progress) = &self.progress {
            let gauge = LineGauge::default()
                .filled_style(Style::default().fg(Color::Cyan))
                .ratio(progress.ratio().clamp(0.0, 1.0))
                .label(format!(" {} {}/{}", progress.label, progress.current, progress.total));
            frame.render_widget(gauge, rows[1]);
        }
    }
}

/// One line per refreshed table with its row count or failure
pub struct StepsPanel {
    steps: Vec<StepOutcome>,
}

impl StepsPanel {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn push(&mut self, outcome: StepOutcome) {
        self.steps.push(outcome);
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let rows: Vec<Row> = self
            .steps
            .iter()
            .map(|step| match &step.result {
                Ok(count) => Row::new(vec![step.table.to_string(), count.to_string()])
                    .style(Style::default().fg(Color::White)),
                Err(message) => Row::new(vec![step.table.to_string(), format!("failed: {}", message)])
                    .style(Style::default().fg(Color::Red)),
            })
            .collect();

        let table = Table::new(rows, [Constraint::Length(30), Constraint::Min(10)])
            .header(
                Row::new(vec!["Table", "Rows"])
                    .style(Style::default().add_modifier(Modifier::BOLD)),
            )
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Tables ")
                    .border_style(BORDER),
            );
        frame.render_widget(table, area);
    }
}

/// Most recent status lines, oldest dropped first
pub struct LogPanel {
    entries: VecDeque<String>,
    capacity: usize,
}

impl LogPanel {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: 100,
        }
    }

    pub fn add(&mut self, message: impl Into<String>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(message.into());
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let visible = area.height.saturating_sub(2) as usize;
        let skip = self.entries.len().saturating_sub(visible);

        let items: Vec<ListItem> = self
            .entries
            .iter()
            .skip(skip)
            .map(|entry| ListItem::new(format!(" {}", entry)))
            .collect();

        let list = List::new(items)
            .style(Style::default().fg(Color::Gray))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Activity ")
                    .border_style(BORDER),
            );
        frame.render_widget(list, area);
    }
}
