use std::io;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout},
    text::Line,
    widgets::{Cell, Paragraph, Row, Table, TableState},
    DefaultTerminal, Frame,
};

use crate::models::{CATEGORY, COMMENTS, IN_OUT, LOCATION};
use crate::session::{Dashboard, TablePage};
use crate::tui::{self, CURSOR_HEADER_STYLE, FOOTER_STYLE, HEADER_STYLE, SELECTED_STYLE};

const COLUMN_WIDTH: u16 = 16;

enum BrowseMode {
    Normal,
    Search { input: String, previous: Option<String> },
    GotoPage(String),
}

pub enum BrowseAction {
    Continue,
    Close,
}

/// Interactive view over a dashboard's table page. Every key that changes the
/// filter or sort re-runs the whole pipeline through the session.
pub struct TableBrowser<'a> {
    dashboard: &'a mut Dashboard,
    selected: usize,
    column_cursor: usize,
    column_offset: usize,
    visible_columns: usize,
    mode: BrowseMode,
    status_message: Option<String>,
    table_state: TableState,
}

impl<'a> TableBrowser<'a> {
    pub fn new(dashboard: &'a mut Dashboard) -> Self {
        Self {
            dashboard,
            selected: 0,
            column_cursor: 0,
            column_offset: 0,
            visible_columns: 1,
            mode: BrowseMode::Normal,
            status_message: None,
            table_state: TableState::default(),
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        if self.dashboard.is_empty() {
            println!("No records to browse.");
            return Ok(());
        }

        let hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            ratatui::restore();
            hook(info);
        }));

        let mut terminal = ratatui::init();
        let result = self.event_loop(&mut terminal);
        ratatui::restore();
        result
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> io::Result<()> {
        loop {
            terminal.draw(|frame| self.draw_frame(frame))?;

            if let Event::Key(KeyEvent {
                code,
                modifiers,
                kind,
                ..
            }) = event::read()?
            {
                if kind != KeyEventKind::Press {
                    continue;
                }
                if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
                    break;
                }
                if let BrowseAction::Close = self.handle_key_event(code) {
                    break;
                }
            }
        }
        Ok(())
    }

    pub fn draw_frame(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let areas = Layout::vertical([
            Constraint::Length(1), // title
            Constraint::Fill(1),   // table
            Constraint::Length(1), // status
            Constraint::Length(1), // keys
        ])
        .split(area);

        let page = self.dashboard.table_page();
        let columns: Vec<String> = self.dashboard.columns().to_vec();

        self.visible_columns = ((area.width / COLUMN_WIDTH) as usize).max(1);
        self.scroll_columns_to_cursor(columns.len());
        let shown: Vec<(usize, &String)> = columns
            .iter()
            .enumerate()
            .skip(self.column_offset)
            .take(self.visible_columns)
            .collect();

        frame.render_widget(
            Paragraph::new(format!(
                "Drone Inventory ({} of {} records)",
                page.total_count,
                self.dashboard.records().len()
            ))
            .style(HEADER_STYLE),
            areas[0],
        );

        let wrap_width = COLUMN_WIDTH.saturating_sub(1) as usize;
        let rows: Vec<Row> = page
            .rows
            .iter()
            .map(|record| {
                let mut height = 1u16;
                let cells: Vec<Cell> = shown
                    .iter()
                    .map(|(_, column)| {
                        let text = if column.as_str() == IN_OUT {
                            self.dashboard.effective_status(record)
                        } else {
                            record.display(column)
                        };
                        if column.as_str() == COMMENTS {
                            let (wrapped, lines) = tui::wrap_text(&text, wrap_width);
                            height = height.max(lines);
                            Cell::from(wrapped)
                        } else {
                            Cell::from(tui::cell_span(column, text))
                        }
                    })
                    .collect();
                Row::new(cells).height(height)
            })
            .collect();

        let sort = self.dashboard.sort_state();
        let header: Vec<Cell> = shown
            .iter()
            .map(|(i, column)| {
                let mut label = column.to_string();
                if sort.column.as_deref() == Some(column.as_str()) {
                    label.push(' ');
                    label.push_str(sort.direction.arrow());
                }
                let style = if *i == self.column_cursor {
                    CURSOR_HEADER_STYLE
                } else {
                    HEADER_STYLE
                };
                Cell::from(label).style(style)
            })
            .collect();
        let widths = vec![Constraint::Length(COLUMN_WIDTH); shown.len()];

        if page.rows.is_empty() {
            self.table_state.select(None);
        } else {
            self.selected = self.selected.min(page.rows.len() - 1);
            self.table_state.select(Some(self.selected));
        }
        let table = Table::new(rows, widths)
            .header(Row::new(header).bottom_margin(1))
            .column_spacing(1)
            .row_highlight_style(SELECTED_STYLE);
        frame.render_stateful_widget(table, areas[1], &mut self.table_state);

        frame.render_widget(
            Paragraph::new(self.status_line(&page)).style(FOOTER_STYLE),
            areas[2],
        );

        let keys = match &self.mode {
            BrowseMode::Normal => Paragraph::new(
                "\u{2191}/\u{2193}:select  n/p:page  [/]:column  s:sort  /:search  f/l:category/location  c:clear  g:page  q:quit",
            )
            .style(FOOTER_STYLE),
            BrowseMode::Search { input, .. } => {
                Paragraph::new(Line::from(format!("Search: {input}\u{2588}")))
            }
            BrowseMode::GotoPage(input) => Paragraph::new(format!("Go to page: {input}\u{2588}")),
        };
        frame.render_widget(keys, areas[3]);
    }

    fn status_line(&self, page: &TablePage) -> String {
        let mut parts = vec![format!(
            "Page {} of {} | {} rows",
            page.page, page.page_count, page.total_count
        )];
        let spec = self.dashboard.filter_spec();
        if !spec.is_empty() {
            let noun = if spec.active_count() == 1 { "filter" } else { "filters" };
            parts.push(format!("{} {noun}: {}", spec.active_count(), spec.describe()));
        }
        if let Some(column) = &self.dashboard.sort_state().column {
            parts.push(format!(
                "sort: {column} {}",
                self.dashboard.sort_state().direction.arrow()
            ));
        }
        if let Some(msg) = &self.status_message {
            parts.push(msg.clone());
        }
        parts.join(" | ")
    }

    fn scroll_columns_to_cursor(&mut self, total: usize) {
        if total == 0 {
            return;
        }
        self.column_cursor = self.column_cursor.min(total - 1);
        if self.column_cursor < self.column_offset {
            self.column_offset = self.column_cursor;
        } else if self.column_cursor >= self.column_offset + self.visible_columns {
            self.column_offset = self.column_cursor + 1 - self.visible_columns;
        }
    }

    fn page_len(&self) -> usize {
        self.dashboard.table_page().rows.len()
    }

    /// Handle a key event. Returns a BrowseAction indicating what the caller should do.
    pub fn handle_key_event(&mut self, code: KeyCode) -> BrowseAction {
        self.status_message = None;

        match &self.mode {
            BrowseMode::Normal => match code {
                KeyCode::Char('q') | KeyCode::Esc => return BrowseAction::Close,
                KeyCode::Down => {
                    if self.selected + 1 < self.page_len() {
                        self.selected += 1;
                    }
                }
                KeyCode::Up => {
                    self.selected = self.selected.saturating_sub(1);
                }
                KeyCode::Char('n') | KeyCode::Right | KeyCode::PageDown => {
                    let before = self.dashboard.page();
                    self.dashboard.next_page();
                    if self.dashboard.page() == before {
                        self.status_message = Some("Already on the last page".to_string());
                    } else {
                        self.selected = 0;
                    }
                }
                KeyCode::Char('p') | KeyCode::Left | KeyCode::PageUp => {
                    let before = self.dashboard.page();
                    self.dashboard.prev_page();
                    if self.dashboard.page() == before {
                        self.status_message = Some("Already on the first page".to_string());
                    } else {
                        self.selected = 0;
                    }
                }
                KeyCode::Home => {
                    self.dashboard.set_page(1);
                    self.selected = 0;
                }
                KeyCode::Char(']') => {
                    let last = self.dashboard.columns().len().saturating_sub(1);
                    self.column_cursor = (self.column_cursor + 1).min(last);
                }
                KeyCode::Char('[') => {
                    self.column_cursor = self.column_cursor.saturating_sub(1);
                }
                KeyCode::Char('s') => {
                    if let Some(column) = self.dashboard.columns().get(self.column_cursor).cloned() {
                        self.dashboard.toggle_sort(&column);
                        self.selected = 0;
                    }
                }
                KeyCode::Char('f') => self.cycle_filter(CATEGORY),
                KeyCode::Char('l') => self.cycle_filter(LOCATION),
                KeyCode::Char('c') => {
                    self.dashboard.clear_filters();
                    self.selected = 0;
                    self.status_message = Some("Filters cleared".to_string());
                }
                KeyCode::Char('/') => {
                    let previous = self.dashboard.filter_spec().free_text.clone();
                    self.mode = BrowseMode::Search {
                        input: previous.clone().unwrap_or_default(),
                        previous,
                    };
                }
                KeyCode::Char('g') => {
                    self.mode = BrowseMode::GotoPage(String::new());
                }
                _ => {}
            },
            BrowseMode::Search { .. } => self.handle_search_key(code),
            BrowseMode::GotoPage(_) => match code {
                KeyCode::Esc => self.mode = BrowseMode::Normal,
                KeyCode::Enter => self.submit_goto_page(),
                KeyCode::Backspace => {
                    if let BrowseMode::GotoPage(s) = &mut self.mode {
                        s.pop();
                    }
                }
                KeyCode::Char(c) => {
                    if let BrowseMode::GotoPage(s) = &mut self.mode {
                        s.push(c);
                    }
                }
                _ => {}
            },
        }
        BrowseAction::Continue
    }

    /// Search applies on every keystroke; Esc restores the term from before.
    fn handle_search_key(&mut self, code: KeyCode) {
        let BrowseMode::Search { input, previous } = &mut self.mode else {
            return;
        };
        match code {
            KeyCode::Char(c) => {
                input.push(c);
                let term = input.clone();
                self.dashboard.set_search(&term);
                self.selected = 0;
            }
            KeyCode::Backspace => {
                input.pop();
                let term = input.clone();
                self.dashboard.set_search(&term);
                self.selected = 0;
            }
            KeyCode::Enter => self.mode = BrowseMode::Normal,
            KeyCode::Esc => {
                let previous = previous.take();
                self.dashboard.set_search(previous.as_deref().unwrap_or(""));
                self.mode = BrowseMode::Normal;
                self.selected = 0;
            }
            _ => {}
        }
    }

    /// Step an equality filter through the dataset's distinct values, then
    /// back to no constraint.
    fn cycle_filter(&mut self, field: &str) {
        let options = self.dashboard.filter_options();
        let choices = if field == CATEGORY {
            options.categories
        } else {
            options.locations
        };
        if choices.is_empty() {
            self.status_message = Some(format!("No {field} values to filter on"));
            return;
        }
        let mut spec = self.dashboard.filter_spec().clone();
        let position = spec
            .equality
            .get(field)
            .and_then(|current| choices.iter().position(|c| c == current));
        let next = match position {
            None => choices.first(),
            Some(i) => choices.get(i + 1),
        };
        match next {
            Some(value) => {
                spec.equality.insert(field.to_string(), value.clone());
            }
            None => {
                spec.equality.remove(field);
            }
        }
        self.dashboard.set_filter(spec);
        self.selected = 0;
    }

    fn submit_goto_page(&mut self) {
        let mode = std::mem::replace(&mut self.mode, BrowseMode::Normal);
        if let BrowseMode::GotoPage(input) = mode {
            let last = self.dashboard.table_page().page_count;
            match input.trim().parse::<usize>() {
                Ok(page) if (1..=last).contains(&page) => {
                    self.dashboard.set_page(page);
                    self.selected = 0;
                }
                _ => {
                    self.status_message = Some(format!("Page must be between 1 and {last}"));
                }
            }
        }
    }
}
