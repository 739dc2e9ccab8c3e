use std::{io, time::Duration};

use anyhow::{Context, Result};
use bustui_core::{
    models, Bus, BusInfo, FleetRegistry, PassengerMatch, RegistryError, SEAT_COLS, SEAT_ROWS,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use tracing::{debug, info};

use crate::block_font;

const TICK_RATE: Duration = Duration::from_millis(250);
const MAX_FIELD_LEN: usize = 64;

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    muted: Color,
    success: Color,
    warning: Color,
    danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Menu,
    Fleet,
    BusDetail,
    Passengers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormKind {
    InstallBus,
    ReserveSeat,
    CancelSeat,
    MoveSeat,
    FindPassenger,
    RouteFilter,
}

#[derive(Debug, Clone)]
struct FormField {
    label: &'static str,
    value: String,
}

impl FormField {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
        }
    }
}

/// Modal form collecting one value per field, edited inline.
#[derive(Debug, Clone)]
struct FormPrompt {
    kind: FormKind,
    title: &'static str,
    fields: Vec<FormField>,
    current: usize,
    cursor: usize,
}

impl FormPrompt {
    fn new(kind: FormKind, title: &'static str, labels: &[&'static str]) -> Self {
        Self {
            kind,
            title,
            fields: labels.iter().map(|label| FormField::new(label)).collect(),
            current: 0,
            cursor: 0,
        }
    }

    fn value(&self, index: usize) -> &str {
        self.fields
            .get(index)
            .map(|field| field.value.trim())
            .unwrap_or("")
    }

    fn active_value(&self) -> &str {
        &self.fields[self.current].value
    }

    fn insert(&mut self, ch: char) {
        let field = &mut self.fields[self.current];
        if field.value.len() >= MAX_FIELD_LEN {
            return;
        }
        if ch.is_ascii() && !ch.is_ascii_control() {
            field.value.insert(self.cursor, ch);
            self.cursor += ch.len_utf8();
        }
    }

    fn backspace(&mut self) {
        let field = &mut self.fields[self.current];
        if self.cursor > 0 && self.cursor <= field.value.len() {
            self.cursor -= 1;
            field.value.remove(self.cursor);
        }
    }

    fn delete(&mut self) {
        let field = &mut self.fields[self.current];
        if self.cursor < field.value.len() {
            field.value.remove(self.cursor);
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.fields[self.current].value.len() as isize;
        let mut next = self.cursor as isize + delta;
        if next < 0 {
            next = 0;
        } else if next > len {
            next = len;
        }
        self.cursor = next as usize;
    }

    fn select_field(&mut self, index: usize) {
        if index < self.fields.len() {
            self.current = index;
            self.cursor = self.fields[self.current].value.len();
        }
    }

    fn is_last_field(&self) -> bool {
        self.current + 1 == self.fields.len()
    }
}

/// Pending y/N question before a cancellation mutates the registry.
#[derive(Debug, Clone)]
struct ConfirmCancel {
    bus_number: String,
    seat: usize,
    occupant: String,
}

/// Cursor/scroll state for a vertical list.
#[derive(Debug, Default)]
struct ListCursor {
    cursor: usize,
    offset: usize,
    list_height: usize,
}

impl ListCursor {
    fn move_cursor(&mut self, delta: isize, total: usize) {
        if total == 0 {
            self.cursor = 0;
            self.offset = 0;
            return;
        }
        let len = total as isize;
        let mut idx = self.cursor as isize + delta;
        if idx < 0 {
            idx = 0;
        } else if idx >= len {
            idx = len - 1;
        }
        self.cursor = idx as usize;
        self.ensure_visible(total);
    }

    fn clamp(&mut self, total: usize) {
        if total == 0 {
            self.cursor = 0;
            self.offset = 0;
        } else if self.cursor >= total {
            self.cursor = total - 1;
        }
    }

    fn ensure_visible(&mut self, total: usize) {
        if total == 0 || self.list_height == 0 {
            self.offset = 0;
            return;
        }
        let height = self.list_height;
        let max_offset = total.saturating_sub(height);

        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.cursor >= self.offset + height {
            self.offset = self.cursor + 1 - height;
        }

        if self.offset > max_offset {
            self.offset = max_offset;
        }
    }
}

/// High-level application state for the reservation TUI.
pub struct BusTuiApp {
    registry: FleetRegistry,
    screen: Screen,
    menu_cursor: usize,
    fleet: ListCursor,
    route_filter: Option<(String, String)>,
    selected_bus: Option<String>,
    passenger_hits: Vec<PassengerMatch>,
    passengers: ListCursor,
    form: Option<FormPrompt>,
    confirm: Option<ConfirmCancel>,
    status: String,
    should_quit: bool,
    theme: Theme,
}

const MENU_ITEMS: [&str; 4] = ["Fleet Overview", "Install Bus", "Find Passenger", "Quit"];

impl BusTuiApp {
    pub fn new(registry: FleetRegistry) -> Self {
        Self {
            registry,
            screen: Screen::Menu,
            menu_cursor: 0,
            fleet: ListCursor::default(),
            route_filter: None,
            selected_bus: None,
            passenger_hits: Vec::new(),
            passengers: ListCursor::default(),
            form: None,
            confirm: None,
            status: "Ready".to_string(),
            should_quit: false,
            theme: Theme::default(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.should_quit {
                break;
            }

            if event::poll(TICK_RATE).context("failed to poll terminal events")? {
                match event::read().context("failed to read terminal event")? {
                    Event::Key(key) => self.handle_key(key),
                    Event::Resize(_, _) => {}
                    _ => {}
                }
            }

            if self.should_quit {
                break;
            }
        }

        restore_terminal(&mut terminal)
    }

    /// Buses currently shown in the fleet list, route filter applied.
    fn visible_buses(&self) -> Vec<&Bus> {
        match &self.route_filter {
            Some((origin, destination)) => {
                self.registry.list_by_route(origin, destination).collect()
            }
            None => self.registry.list_all_buses().iter().collect(),
        }
    }

    fn current_bus_number(&self) -> Option<String> {
        self.visible_buses()
            .get(self.fleet.cursor)
            .map(|bus| bus.number.clone())
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
    }

    fn report_error(&mut self, err: &RegistryError) {
        debug!(%err, "registry operation rejected");
        self.set_status(err.to_string());
    }

    // ----- key handling -----

    fn handle_key(&mut self, key: KeyEvent) {
        if self.confirm.is_some() {
            self.handle_confirm_key(key);
            return;
        }
        if self.form.is_some() {
            self.handle_form_key(key);
            return;
        }
        match self.screen {
            Screen::Menu => self.handle_menu_key(key),
            Screen::Fleet => self.handle_fleet_key(key),
            Screen::BusDetail => self.handle_detail_key(key),
            Screen::Passengers => self.handle_passengers_key(key),
        }
    }

    fn handle_menu_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => {
                self.menu_cursor = (self.menu_cursor + 1).min(MENU_ITEMS.len() - 1);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.menu_cursor = self.menu_cursor.saturating_sub(1);
            }
            KeyCode::Enter => match self.menu_cursor {
                0 => {
                    self.screen = Screen::Fleet;
                    self.set_status(format!("{} buses installed", self.registry.len()));
                }
                1 => self.open_install_form(),
                2 => self.open_find_form(),
                _ => self.should_quit = true,
            },
            _ => {}
        }
    }

    fn handle_fleet_key(&mut self, key: KeyEvent) {
        let total = self.visible_buses().len();
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.screen = Screen::Menu,
            KeyCode::Char('j') | KeyCode::Down => self.fleet.move_cursor(1, total),
            KeyCode::Char('k') | KeyCode::Up => self.fleet.move_cursor(-1, total),
            KeyCode::Char('i') if key.modifiers.is_empty() => self.open_install_form(),
            KeyCode::Char('f') if key.modifiers.is_empty() => self.open_find_form(),
            KeyCode::Char('/') => self.open_route_filter_form(),
            KeyCode::Char('x') if key.modifiers.is_empty() => {
                if self.route_filter.take().is_some() {
                    self.fleet.clamp(self.registry.len());
                    self.set_status("Route filter cleared");
                }
            }
            KeyCode::Enter => {
                if let Some(number) = self.current_bus_number() {
                    self.selected_bus = Some(number.clone());
                    self.screen = Screen::BusDetail;
                    self.set_status(format!("Bus {number}"));
                } else {
                    self.set_status("No buses installed yet");
                }
            }
            _ => {}
        }
    }

    fn handle_detail_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.screen = Screen::Fleet,
            KeyCode::Char('r') if key.modifiers.is_empty() => {
                self.form = Some(FormPrompt::new(
                    FormKind::ReserveSeat,
                    "Reserve Seat",
                    &["Seat number (1-32)", "Passenger name"],
                ));
            }
            KeyCode::Char('c') if key.modifiers.is_empty() => {
                self.form = Some(FormPrompt::new(
                    FormKind::CancelSeat,
                    "Cancel Reservation",
                    &["Seat number (1-32)"],
                ));
            }
            KeyCode::Char('m') if key.modifiers.is_empty() => {
                self.form = Some(FormPrompt::new(
                    FormKind::MoveSeat,
                    "Move Reservation",
                    &["Current seat (1-32)", "New seat (1-32)"],
                ));
            }
            _ => {}
        }
    }

    fn handle_passengers_key(&mut self, key: KeyEvent) {
        let total = self.passenger_hits.len();
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.screen = Screen::Fleet,
            KeyCode::Char('j') | KeyCode::Down => self.passengers.move_cursor(1, total),
            KeyCode::Char('k') | KeyCode::Up => self.passengers.move_cursor(-1, total),
            KeyCode::Char('f') if key.modifiers.is_empty() => self.open_find_form(),
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let mut submit = false;
        let mut cancelled = None;
        if let Some(form) = self.form.as_mut() {
            match key.code {
                KeyCode::Esc => cancelled = Some(form.title),
                KeyCode::Enter => {
                    if form.is_last_field() {
                        submit = true;
                    } else {
                        let next = form.current + 1;
                        form.select_field(next);
                    }
                }
                KeyCode::Up | KeyCode::BackTab => {
                    let previous = form.current.saturating_sub(1);
                    form.select_field(previous);
                }
                KeyCode::Down | KeyCode::Tab => {
                    let next = form.current + 1;
                    form.select_field(next);
                }
                KeyCode::Left => form.move_cursor(-1),
                KeyCode::Right => form.move_cursor(1),
                KeyCode::Home => form.cursor = 0,
                KeyCode::End => form.cursor = form.active_value().len(),
                KeyCode::Backspace => form.backspace(),
                KeyCode::Delete => form.delete(),
                KeyCode::Char(ch) => {
                    if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                        form.insert(ch);
                    }
                }
                _ => {}
            }
        }

        if let Some(title) = cancelled {
            self.form = None;
            self.set_status(format!("{title} cancelled"));
        } else if submit {
            if let Some(form) = self.form.take() {
                self.submit_form(form);
            }
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        let Some(pending) = self.confirm.take() else {
            return;
        };
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self
                    .registry
                    .cancel_seat(&pending.bus_number, pending.seat)
                {
                    Ok(vacated) => {
                        info!(bus = %pending.bus_number, seat = pending.seat, "reservation cancelled");
                        self.set_status(format!(
                            "Reservation for {vacated} (seat {}) cancelled",
                            pending.seat
                        ));
                    }
                    Err(err) => self.report_error(&err),
                }
            }
            _ => self.set_status("Cancelled by user"),
        }
    }

    // ----- forms -----

    fn open_install_form(&mut self) {
        if self.registry.len() >= self.registry.capacity() {
            let limit = self.registry.capacity();
            self.set_status(format!("Cannot install more than {limit} buses"));
            return;
        }
        self.form = Some(FormPrompt::new(
            FormKind::InstallBus,
            "Install Bus",
            &[
                "Bus number",
                "Driver's name",
                "Arrival time (e.g. 10:00)",
                "Departure time (e.g. 14:00)",
                "From",
                "To",
            ],
        ));
    }

    fn open_find_form(&mut self) {
        self.form = Some(FormPrompt::new(
            FormKind::FindPassenger,
            "Find Passenger",
            &["Passenger name (partial match ok)"],
        ));
    }

    fn open_route_filter_form(&mut self) {
        self.form = Some(FormPrompt::new(
            FormKind::RouteFilter,
            "Filter by Route",
            &["From (empty for any)", "To (empty for any)"],
        ));
    }

    fn submit_form(&mut self, form: FormPrompt) {
        match form.kind {
            FormKind::InstallBus => self.submit_install(&form),
            FormKind::ReserveSeat => self.submit_reserve(&form),
            FormKind::CancelSeat => self.submit_cancel(&form),
            FormKind::MoveSeat => self.submit_move(&form),
            FormKind::FindPassenger => self.submit_find(&form),
            FormKind::RouteFilter => self.submit_route_filter(&form),
        }
    }

    fn submit_install(&mut self, form: &FormPrompt) {
        let info = BusInfo {
            number: form.value(0).to_string(),
            driver: form.value(1).to_string(),
            arrival: form.value(2).to_string(),
            departure: form.value(3).to_string(),
            origin: form.value(4).to_string(),
            destination: form.value(5).to_string(),
        };
        let number = info.number.clone();
        match self.registry.install_bus(info) {
            Ok(()) => {
                self.screen = Screen::Fleet;
                self.fleet.clamp(self.registry.len());
                self.set_status(format!("Bus {number} installed successfully"));
            }
            Err(err) => self.report_error(&err),
        }
    }

    fn submit_reserve(&mut self, form: &FormPrompt) {
        let Some(bus_number) = self.selected_bus.clone() else {
            self.set_status("No bus selected");
            return;
        };
        let Some(seat) = parse_seat(form.value(0)) else {
            self.reject_seat_input(form.clone(), 0);
            return;
        };
        let passenger = form.value(1).to_string();
        match self.registry.reserve_seat(&bus_number, seat, &passenger) {
            Ok(()) => {
                info!(bus = %bus_number, seat, "seat reserved");
                self.set_status(format!("Seat {seat} reserved for {passenger}"));
            }
            Err(err) => self.report_error(&err),
        }
    }

    fn submit_cancel(&mut self, form: &FormPrompt) {
        let Some(bus_number) = self.selected_bus.clone() else {
            self.set_status("No bus selected");
            return;
        };
        let Some(seat) = parse_seat(form.value(0)) else {
            self.reject_seat_input(form.clone(), 0);
            return;
        };

        // Look up the occupant first so the y/N prompt can name them;
        // the registry itself cancels unconditionally.
        let occupant = match self.registry.get_bus_details(&bus_number) {
            Ok(bus) => match bus.seat(seat) {
                Some(state) => state.occupant().map(str::to_string),
                None => {
                    self.report_error(&RegistryError::InvalidSeat(seat));
                    return;
                }
            },
            Err(err) => {
                self.report_error(&err);
                return;
            }
        };
        let Some(occupant) = occupant else {
            self.report_error(&RegistryError::SeatAlreadyEmpty(seat));
            return;
        };

        self.confirm = Some(ConfirmCancel {
            bus_number,
            seat,
            occupant,
        });
    }

    fn submit_move(&mut self, form: &FormPrompt) {
        let Some(bus_number) = self.selected_bus.clone() else {
            self.set_status("No bus selected");
            return;
        };
        let Some(from_seat) = parse_seat(form.value(0)) else {
            self.reject_seat_input(form.clone(), 0);
            return;
        };
        let Some(to_seat) = parse_seat(form.value(1)) else {
            self.reject_seat_input(form.clone(), 1);
            return;
        };
        match self.registry.move_seat(&bus_number, from_seat, to_seat) {
            Ok(()) => {
                info!(bus = %bus_number, from = from_seat, to = to_seat, "reservation moved");
                self.set_status(format!("Moved to seat {to_seat} successfully"));
            }
            Err(err) => self.report_error(&err),
        }
    }

    fn submit_find(&mut self, form: &FormPrompt) {
        let pattern = form.value(0);
        let result = self
            .registry
            .find_passengers(pattern)
            .map(|hits| hits.collect::<Vec<_>>());
        match result {
            Ok(hits) => {
                self.passenger_hits = hits;
                self.passengers = ListCursor::default();
                self.screen = Screen::Passengers;
                if self.passenger_hits.is_empty() {
                    self.set_status(format!("No passenger matched \"{pattern}\""));
                } else {
                    self.set_status(format!(
                        "{} passenger(s) matched \"{pattern}\"",
                        self.passenger_hits.len()
                    ));
                }
            }
            Err(err) => self.report_error(&err),
        }
    }

    fn submit_route_filter(&mut self, form: &FormPrompt) {
        let origin = form.value(0).to_string();
        let destination = form.value(1).to_string();
        if origin.is_empty() && destination.is_empty() {
            self.route_filter = None;
            self.set_status("Route filter cleared");
        } else {
            self.route_filter = Some((origin.clone(), destination.clone()));
            let shown = self.visible_buses().len();
            self.fleet.clamp(shown);
            self.set_status(format!(
                "Route filter: \"{origin}\" -> \"{destination}\" ({shown} matching)"
            ));
        }
        self.screen = Screen::Fleet;
    }

    /// Re-opens the form on the offending field after a failed parse,
    /// the TUI equivalent of reprompting.
    fn reject_seat_input(&mut self, mut form: FormPrompt, field: usize) {
        let entered = form.value(field).to_string();
        form.select_field(field);
        self.form = Some(form);
        self.set_status(format!(
            "'{entered}' is not a number between 1 and {}",
            models::SEATS_PER_BUS
        ));
    }

    // ----- drawing -----

    fn draw(&mut self, frame: &mut Frame) {
        match self.screen {
            Screen::Menu => self.draw_menu(frame),
            Screen::Fleet => self.draw_fleet(frame),
            Screen::BusDetail => self.draw_bus_detail(frame),
            Screen::Passengers => self.draw_passengers(frame),
        }
        if let Some(form) = &self.form {
            self.render_form(frame, form);
        }
        if let Some(pending) = &self.confirm {
            self.render_confirm(frame, pending);
        }
    }

    fn draw_menu(&mut self, frame: &mut Frame) {
        let area = frame.size();
        let banner_lines = block_font::render("BUSTUI");
        let banner_height = banner_lines.len() as u16;
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length((banner_height + 2).min(area.height)),
                Constraint::Min(3),
            ])
            .split(area);

        let banner_content: Vec<Line> = banner_lines
            .into_iter()
            .map(|line| {
                Line::from(Span::styled(
                    line,
                    Style::default()
                        .fg(self.theme.accent)
                        .add_modifier(Modifier::BOLD),
                ))
            })
            .collect();
        let banner = Paragraph::new(banner_content).alignment(Alignment::Center);
        frame.render_widget(banner, layout[0]);

        let menu_height = (MENU_ITEMS.len() as u16)
            .saturating_mul(2)
            .saturating_add(2)
            .min(layout[1].height);
        let menu_width = 32.min(layout[1].width.max(1));
        let menu_area = centered_rect(menu_width, menu_height, layout[1]);

        let menu_lines: Vec<Line> = MENU_ITEMS
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                if idx == self.menu_cursor {
                    Line::from(Span::styled(
                        format!("▶ {item}"),
                        Style::default()
                            .fg(self.theme.accent)
                            .add_modifier(Modifier::BOLD),
                    ))
                } else {
                    Line::from(Span::styled(
                        format!("  {item}"),
                        Style::default().fg(self.theme.primary_fg),
                    ))
                }
            })
            .collect();

        let menu = Paragraph::new(menu_lines)
            .block(Block::default().borders(Borders::ALL).title("Bus Reservation"))
            .alignment(Alignment::Center);
        frame.render_widget(menu, menu_area);
    }

    fn draw_fleet(&mut self, frame: &mut Frame) {
        let size = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(8), Constraint::Length(3)])
            .split(size);

        let body_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(chunks[0]);

        self.render_bus_list(frame, body_chunks[0]);
        self.render_bus_info(frame, body_chunks[1]);
        self.render_status(frame, chunks[1]);
    }

    fn render_bus_list(&mut self, frame: &mut Frame, area: Rect) {
        let entries: Vec<(String, String)> = self
            .visible_buses()
            .iter()
            .map(|bus| (bus.number.clone(), bus.route_label()))
            .collect();
        let total = entries.len();
        self.fleet.list_height = area.height.saturating_sub(2) as usize;
        self.fleet.clamp(total);
        self.fleet.ensure_visible(total);

        let mut list_state = ListState::default();
        let end = (self.fleet.offset + self.fleet.list_height).min(total);
        let visible = &entries[self.fleet.offset.min(total)..end];
        if !visible.is_empty() {
            let selected = self
                .fleet
                .cursor
                .saturating_sub(self.fleet.offset)
                .min(visible.len().saturating_sub(1));
            list_state.select(Some(selected));
        }

        let items: Vec<ListItem> = visible
            .iter()
            .enumerate()
            .map(|(idx, (number, route))| {
                let global_index = self.fleet.offset + idx;
                let marker = if self.fleet.cursor == global_index {
                    Span::styled(
                        "▶ ",
                        Style::default()
                            .fg(self.theme.accent)
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::raw("  ")
                };
                let number = Span::styled(
                    number.clone(),
                    Style::default()
                        .fg(self.theme.primary_fg)
                        .add_modifier(Modifier::BOLD),
                );
                let route = Span::styled(
                    format!("  {route}"),
                    Style::default().fg(self.theme.muted),
                );
                ListItem::new(Line::from(vec![marker, number, route]))
            })
            .collect();

        let title = match &self.route_filter {
            Some(_) => format!("Fleet ({total} matching)"),
            None => format!("Fleet ({total}/{})", self.registry.capacity()),
        };
        let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn render_bus_info(&mut self, frame: &mut Frame, area: Rect) {
        let buses = self.visible_buses();
        let lines = match buses.get(self.fleet.cursor) {
            Some(bus) => bus_info_lines(bus, &self.theme),
            None => vec![Line::from(Span::styled(
                "No buses installed yet. Press 'i' to install one.",
                Style::default().fg(self.theme.muted),
            ))],
        };

        let info = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Details"))
            .wrap(Wrap { trim: true });
        frame.render_widget(info, area);
    }

    fn draw_bus_detail(&mut self, frame: &mut Frame) {
        let size = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(6),
                Constraint::Min(SEAT_ROWS as u16 + 2),
                Constraint::Length(3),
                Constraint::Length(3),
            ])
            .split(size);

        let Some(number) = self.selected_bus.clone() else {
            self.screen = Screen::Fleet;
            return;
        };
        let bus = match self.registry.get_bus_details(&number) {
            Ok(bus) => bus.clone(),
            Err(err) => {
                self.report_error(&err);
                self.screen = Screen::Fleet;
                return;
            }
        };

        let header = Paragraph::new(bus_info_lines(&bus, &self.theme)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Bus {}", bus.number)),
        );
        frame.render_widget(header, chunks[0]);

        self.render_seat_map(frame, chunks[1], &bus);

        let free: Vec<String> = bus.free_seats().map(|seat| seat.to_string()).collect();
        let free_line = if free.is_empty() {
            Line::from(Span::styled(
                format!("No free seats on bus {}", bus.number),
                Style::default().fg(self.theme.warning),
            ))
        } else {
            Line::from(vec![
                Span::styled("Free seats: ", Style::default().fg(self.theme.muted)),
                Span::styled(free.join(", "), Style::default().fg(self.theme.success)),
            ])
        };
        let free_seats = Paragraph::new(free_line)
            .block(Block::default().borders(Borders::ALL).title("Availability"))
            .wrap(Wrap { trim: true });
        frame.render_widget(free_seats, chunks[2]);

        self.render_status(frame, chunks[3]);
    }

    fn render_seat_map(&mut self, frame: &mut Frame, area: Rect, bus: &Bus) {
        let mut lines = Vec::with_capacity(SEAT_ROWS);
        for row in 0..SEAT_ROWS {
            let mut spans = Vec::with_capacity(SEAT_COLS * 2);
            for col in 0..SEAT_COLS {
                let seat_no = models::seat_number(row, col);
                let state = bus.seat(seat_no).expect("grid positions are in range");
                spans.push(Span::styled(
                    format!("{seat_no:>3}. "),
                    Style::default().fg(self.theme.muted),
                ));
                match state.occupant() {
                    Some(name) => spans.push(Span::styled(
                        format!("{name:<12}"),
                        Style::default()
                            .fg(self.theme.accent)
                            .add_modifier(Modifier::BOLD),
                    )),
                    None => spans.push(Span::styled(
                        format!("{:<12}", "-"),
                        Style::default().fg(self.theme.muted),
                    )),
                }
            }
            lines.push(Line::from(spans));
        }

        let title = format!(
            "Seats ({} free) - r reserve, c cancel, m move",
            bus.free_seat_count()
        );
        let map = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(title))
            .alignment(Alignment::Center);
        frame.render_widget(map, area);
    }

    fn draw_passengers(&mut self, frame: &mut Frame) {
        let size = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(3)])
            .split(size);

        let total = self.passenger_hits.len();
        self.passengers.list_height = chunks[0].height.saturating_sub(2) as usize;
        self.passengers.clamp(total);
        self.passengers.ensure_visible(total);

        let mut list_state = ListState::default();
        let end = (self.passengers.offset + self.passengers.list_height).min(total);
        let visible = &self.passenger_hits[self.passengers.offset.min(total)..end];
        if !visible.is_empty() {
            let selected = self
                .passengers
                .cursor
                .saturating_sub(self.passengers.offset)
                .min(visible.len().saturating_sub(1));
            list_state.select(Some(selected));
        }

        let items: Vec<ListItem> = visible
            .iter()
            .map(|hit| {
                let line = Line::from(vec![
                    Span::styled(
                        hit.passenger.clone(),
                        Style::default()
                            .fg(self.theme.primary_fg)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!(
                            "  bus {} seat {} ({} -> {})",
                            hit.bus_number, hit.seat, hit.origin, hit.destination
                        ),
                        Style::default().fg(self.theme.muted),
                    ),
                ]);
                ListItem::new(line)
            })
            .collect();

        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Passengers ({total})")),
        );
        frame.render_stateful_widget(list, chunks[0], &mut list_state);

        self.render_status(frame, chunks[1]);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let status = Paragraph::new(Line::from(self.status.clone()))
            .block(Block::default().borders(Borders::ALL).title("Status"));
        frame.render_widget(status, area);
    }

    fn render_form(&self, frame: &mut Frame, form: &FormPrompt) {
        let frame_area = frame.size();
        let width = 60.min(frame_area.width.saturating_sub(4)).max(24);
        let height = (form.fields.len() as u16 + 4)
            .min(frame_area.height.saturating_sub(2))
            .max(5);
        let area = centered_rect(width, height, frame_area);

        frame.render_widget(Clear, area);

        let mut lines: Vec<Line> = form
            .fields
            .iter()
            .enumerate()
            .map(|(idx, field)| {
                let marker = if idx == form.current { "> " } else { "  " };
                let label_style = if idx == form.current {
                    Style::default()
                        .fg(self.theme.accent)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(self.theme.muted)
                };
                Line::from(vec![
                    Span::styled(format!("{marker}{}: ", field.label), label_style),
                    Span::raw(field.value.clone()),
                ])
            })
            .collect();
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" next/submit  "),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" cancel"),
        ]));

        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(form.title))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);

        let field = &form.fields[form.current];
        let prefix = field.label.len() as u16 + 5;
        let cursor_x =
            (area.x + prefix + form.cursor as u16).min(area.x + area.width.saturating_sub(2));
        let cursor_y = area.y + 1 + form.current as u16;
        frame.set_cursor(cursor_x, cursor_y);
    }

    fn render_confirm(&self, frame: &mut Frame, pending: &ConfirmCancel) {
        let frame_area = frame.size();
        let width = 56.min(frame_area.width.saturating_sub(4)).max(24);
        let area = centered_rect(width, 6, frame_area);

        frame.render_widget(Clear, area);

        let message = format!(
            "Cancel reservation of {} (seat {})?",
            pending.occupant, pending.seat
        );
        let paragraph = Paragraph::new(vec![
            Line::from(message),
            Line::from(""),
            Line::from(vec![
                Span::styled(
                    "y",
                    Style::default()
                        .fg(self.theme.danger)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(" confirm  "),
                Span::styled("any other key", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" abort"),
            ]),
        ])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Bus {}", pending.bus_number)),
        )
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
    }
}

fn bus_info_lines(bus: &Bus, theme: &Theme) -> Vec<Line<'static>> {
    let label = Style::default().fg(theme.muted);
    let value = Style::default().fg(theme.primary_fg);
    vec![
        Line::from(vec![
            Span::styled("Driver: ", label),
            Span::styled(bus.driver.clone(), value),
        ]),
        Line::from(vec![
            Span::styled("Arrival: ", label),
            Span::styled(bus.arrival.clone(), value),
            Span::styled("  Departure: ", label),
            Span::styled(bus.departure.clone(), value),
        ]),
        Line::from(vec![
            Span::styled("Route: ", label),
            Span::styled(bus.route_label(), value),
        ]),
        Line::from(vec![
            Span::styled("Free seats: ", label),
            Span::styled(bus.free_seat_count().to_string(), value),
        ]),
        Line::from(vec![
            Span::styled("Installed: ", label),
            Span::styled(
                bus.installed_at.format("%Y-%m-%d %H:%M UTC").to_string(),
                value,
            ),
        ]),
    ]
}

fn parse_seat(input: &str) -> Option<usize> {
    input.trim().parse::<usize>().ok()
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_prompt_edits_the_active_field() {
        let mut form = FormPrompt::new(FormKind::FindPassenger, "Find", &["Name"]);
        for ch in "Anna".chars() {
            form.insert(ch);
        }
        assert_eq!(form.value(0), "Anna");

        form.move_cursor(-1);
        form.backspace();
        assert_eq!(form.value(0), "Ana");

        form.delete();
        assert_eq!(form.value(0), "An");
    }

    #[test]
    fn form_prompt_tracks_fields() {
        let mut form = FormPrompt::new(FormKind::MoveSeat, "Move", &["From", "To"]);
        assert!(!form.is_last_field());
        form.insert('3');
        form.select_field(1);
        form.insert('4');
        assert!(form.is_last_field());
        assert_eq!(form.value(0), "3");
        assert_eq!(form.value(1), "4");
    }

    #[test]
    fn list_cursor_scrolls_within_bounds() {
        let mut cursor = ListCursor {
            list_height: 3,
            ..ListCursor::default()
        };
        cursor.move_cursor(10, 5);
        assert_eq!(cursor.cursor, 4);
        assert_eq!(cursor.offset, 2);

        cursor.move_cursor(-10, 5);
        assert_eq!(cursor.cursor, 0);
        assert_eq!(cursor.offset, 0);

        cursor.clamp(0);
        assert_eq!(cursor.cursor, 0);
    }

    #[test]
    fn parse_seat_accepts_plain_numbers_only() {
        assert_eq!(parse_seat(" 12 "), Some(12));
        assert_eq!(parse_seat("12a"), None);
        assert_eq!(parse_seat(""), None);
        assert_eq!(parse_seat("-3"), None);
    }
}
