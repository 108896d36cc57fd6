use ratatui::{
    layout::{Alignment, Constraint, Layout, Position, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::app::{App, InputMode, ItineraryTab, Screen, LANDING_MENU, PAW_STEPS};
use crate::chat::ChatRole;
use crate::plan::{PlannerField, BUDGET_MAX, BUDGET_MIN};

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.screen {
        Screen::Landing => render_landing_screen(app, frame, body_area),
        Screen::Chat => render_chat_screen(app, frame, body_area),
        Screen::Planner => render_planner_screen(app, frame, body_area),
        Screen::Itinerary => render_itinerary_screen(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let usage = app
        .chat
        .as_ref()
        .and_then(|chat| chat.usage())
        .map(|(used, remaining)| format!(" [{used} tokens used, {remaining} left]"))
        .unwrap_or_default();

    let title = Line::from(vec![
        Span::styled(
            " Wanderlust - Your AI Trip Planner ",
            Style::default().fg(Color::Magenta).bold(),
        ),
        Span::styled(usage, Style::default().fg(Color::DarkGray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match app.screen {
        Screen::Landing => " HOME ",
        Screen::Chat => " CHAT ",
        Screen::Planner => " PLAN ",
        Screen::Itinerary => " TRIP ",
    };

    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = match app.screen {
        Screen::Landing => vec![
            Span::styled(" j/k ", key_style),
            Span::styled(" choose ", label_style),
            Span::styled(" Enter ", key_style),
            Span::styled(" open ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ],
        Screen::Chat => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" ↑/↓ ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" leave chat ", label_style),
        ],
        Screen::Planner => vec![
            Span::styled(" Tab ", key_style),
            Span::styled(" next field ", label_style),
            Span::styled(" Enter ", key_style),
            Span::styled(" add/submit ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" back ", label_style),
        ],
        Screen::Itinerary => vec![
            Span::styled(" Tab ", key_style),
            Span::styled(" next tab ", label_style),
            Span::styled(" j/k ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" back to form ", label_style),
        ],
    };

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    spans.extend(hints);
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_landing_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [title_area, paw_area, features_area, menu_area, note_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(2),
        Constraint::Length(8),
        Constraint::Min(7),
        Constraint::Length(1),
    ])
    .areas(area);

    let title = Paragraph::new(Line::from(Span::styled(
        "Wanderlust - Your AI Trip Planner",
        Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(title, title_area);

    // One paw lights up at a time, strolling across the strip.
    let mut paw_spans = Vec::with_capacity(PAW_STEPS * 2);
    for step in 0..PAW_STEPS {
        let style = if step == app.paw_step {
            Style::default().fg(Color::Yellow).bold()
        } else {
            Style::default().fg(Color::DarkGray)
        };
        paw_spans.push(Span::styled("●", style));
        paw_spans.push(Span::raw("  "));
    }
    frame.render_widget(
        Paragraph::new(Line::from(paw_spans)).alignment(Alignment::Center),
        paw_area,
    );

    let features = [
        "🌍 Personalized trip plans based on your vibe.",
        "🧠 Messy Mind mode - know the dates, not the details.",
        "🏕️ Hotels, Airbnbs, camping - tailored for you.",
        "💰 Daily budgeting & smart suggestions.",
        "🔎 Search Instagram + YouTube for inspo.",
        "🧳 Save & refine your travel taste over time.",
    ];
    let feature_lines: Vec<Line> = features
        .iter()
        .map(|feature| Line::from(Span::raw(*feature)))
        .collect();
    let feature_block = Paragraph::new(feature_lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::NONE));
    frame.render_widget(feature_block, features_area);

    let items: Vec<ListItem> = LANDING_MENU
        .iter()
        .enumerate()
        .map(|(i, (label, hint, enabled))| {
            let selected = i == app.landing_selected;
            let label_style = match (selected, enabled) {
                (true, true) => Style::default().fg(Color::Black).bg(Color::Magenta).bold(),
                (false, true) => Style::default().fg(Color::White),
                (_, false) => Style::default().fg(Color::DarkGray),
            };
            ListItem::new(vec![
                Line::from(Span::styled(format!("  {label}  "), label_style)),
                Line::from(Span::styled(
                    format!("    {hint}"),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();
    frame.render_widget(
        List::new(items).block(Block::default().borders(Borders::NONE)),
        menu_area,
    );

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            "Built by Ritika. Work in progress. ⌛",
            Style::default().fg(Color::DarkGray),
        )))
        .alignment(Alignment::Center),
        note_area,
    );
}

fn render_chat_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, input_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(area);

    // Remember geometry for wrap-aware scrolling
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    let mut lines: Vec<Line> = Vec::new();
    if let Some(chat) = &app.chat {
        for message in chat.messages() {
            match message.role {
                ChatRole::System => {
                    lines.push(Line::from(Span::styled(
                        "system",
                        Style::default().fg(Color::DarkGray).italic(),
                    )));
                    lines.push(Line::from(Span::styled(
                        message.content.clone(),
                        Style::default().fg(Color::DarkGray).italic(),
                    )));
                }
                ChatRole::User => {
                    lines.push(Line::from(Span::styled(
                        "You:",
                        Style::default().fg(Color::Green).bold(),
                    )));
                    for content_line in message.content.lines() {
                        lines.push(Line::from(Span::raw(content_line.to_string())));
                    }
                }
                ChatRole::Assistant => {
                    lines.push(Line::from(Span::styled(
                        "Wanderlust:",
                        Style::default().fg(Color::Magenta).bold(),
                    )));
                    for content_line in message.content.lines() {
                        lines.push(Line::from(Span::raw(content_line.to_string())));
                    }
                }
            }
            lines.push(Line::default());
        }

        if chat.is_busy() {
            lines.push(Line::from(Span::styled(
                "Wanderlust:",
                Style::default().fg(Color::Magenta).bold(),
            )));
            let dots = ".".repeat(app.animation_frame as usize + 1);
            lines.push(Line::from(Span::styled(
                format!("Typing{dots}"),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    let chat_box = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0))
        .block(Block::default().borders(Borders::ALL).title(" Chat "));
    frame.render_widget(chat_box, chat_area);

    let busy = app.chat.as_ref().is_some_and(|chat| chat.is_busy());
    let input_style = if busy {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Yellow)
    };
    let input = Paragraph::new(app.chat_input.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(input_style)
            .title(" Type your travel question... "),
    );
    frame.render_widget(input, input_area);

    if !busy {
        let cursor_x = input_area.x + 1 + app.chat_cursor.min(u16::MAX as usize) as u16;
        let max_x = input_area.x + input_area.width.saturating_sub(2);
        frame.set_cursor_position(Position::new(cursor_x.min(max_x), input_area.y + 1));
    }
}

fn render_planner_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let showing_suggestions =
        app.form.field == PlannerField::Destination && !app.suggestions.is_empty();
    let suggestion_height = if showing_suggestions {
        (app.suggestions.len() as u16 + 2).min(7)
    } else {
        0
    };

    let [dest_area, suggest_area, dates_area, stay_budget_area, prefs_area, submit_area, error_area] =
        Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(suggestion_height),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .areas(area);

    let focused = |field: PlannerField| {
        if app.form.field == field {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::White)
        }
    };

    // Destinations: committed entries, then the live input
    let mut dest_spans: Vec<Span> = Vec::new();
    for destination in &app.form.destinations {
        dest_spans.push(Span::styled(
            format!("[{destination}] "),
            Style::default().fg(Color::Cyan),
        ));
    }
    dest_spans.push(Span::raw(app.form.destination_input.clone()));
    let destinations = Paragraph::new(Line::from(dest_spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focused(PlannerField::Destination))
            .title(" Destination(s) - search city or country "),
    );
    frame.render_widget(destinations, dest_area);

    if showing_suggestions {
        let items: Vec<ListItem> = app
            .suggestions
            .iter()
            .map(|suggestion| ListItem::new(suggestion.as_str()))
            .collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(" Suggestions "))
            .highlight_style(Style::default().bg(Color::Magenta).fg(Color::Black));
        frame.render_stateful_widget(list, suggest_area, &mut app.suggestion_state);
    }

    let [start_area, end_area] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
            .areas(dates_area);
    let start = Paragraph::new(app.form.start_date.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focused(PlannerField::StartDate))
            .title(" Start Date (YYYY-MM-DD) "),
    );
    frame.render_widget(start, start_area);
    let end = Paragraph::new(app.form.end_date.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focused(PlannerField::EndDate))
            .title(" End Date (YYYY-MM-DD) "),
    );
    frame.render_widget(end, end_area);

    let [stay_area, budget_area] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
            .areas(stay_budget_area);
    let stay = Paragraph::new(Line::from(vec![
        Span::raw("◂ "),
        Span::styled(app.form.stay_type(), Style::default().fg(Color::Cyan).bold()),
        Span::raw(" ▸"),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focused(PlannerField::StayType))
            .title(" Stay Type "),
    );
    frame.render_widget(stay, stay_area);

    let budget_ratio = (app.form.budget - BUDGET_MIN) as f64 / (BUDGET_MAX - BUDGET_MIN) as f64;
    let track_width = budget_area.width.saturating_sub(12).max(4) as usize;
    let filled = (budget_ratio * track_width as f64).round() as usize;
    let budget = Paragraph::new(Line::from(vec![
        Span::styled(format!("${} ", app.form.budget), Style::default().bold()),
        Span::styled("▰".repeat(filled), Style::default().fg(Color::Magenta)),
        Span::styled(
            "▱".repeat(track_width.saturating_sub(filled)),
            Style::default().fg(Color::DarkGray),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focused(PlannerField::Budget))
            .title(" Budget "),
    );
    frame.render_widget(budget, budget_area);

    let preferences = Paragraph::new(app.form.preferences.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focused(PlannerField::Preferences))
            .title(" Preferences - e.g. beach, culture, adventure... "),
    );
    frame.render_widget(preferences, prefs_area);

    let submit_label = if app.is_submitting() {
        let dots = ".".repeat(app.animation_frame as usize + 1);
        format!("Generating{dots}")
    } else {
        "Generate Plan".to_string()
    };
    let submit_style = if app.form.can_submit() && !app.is_submitting() {
        Style::default().fg(Color::Black).bg(Color::Magenta).bold()
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let submit = Paragraph::new(Line::from(Span::styled(
        format!("  {submit_label}  "),
        submit_style,
    )))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focused(PlannerField::Submit)),
    );
    frame.render_widget(submit, submit_area);

    let mut notices: Vec<Line> = Vec::new();
    if let Some(error) = app.form.date_error() {
        notices.push(Line::from(Span::styled(
            format!("⚠ {error}"),
            Style::default().fg(Color::Red),
        )));
    }
    if let Some(error) = &app.submit_error {
        notices.push(Line::from(Span::styled(
            format!("⚠ {error}"),
            Style::default().fg(Color::Red),
        )));
    }
    frame.render_widget(Paragraph::new(notices), error_area);
}

fn render_itinerary_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let Some(plan) = &app.plan else {
        // Reached without a plan (should not happen): point back at the form
        frame.render_widget(
            Paragraph::new("No plan yet. Press Esc to go back to the planner."),
            area,
        );
        return;
    };

    let [heading_area, tabs_area, body_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(area);

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            plan.heading(),
            Style::default().fg(Color::Magenta).bold(),
        ))),
        heading_area,
    );

    let titles: Vec<Line> = ItineraryTab::ALL
        .iter()
        .map(|tab| Line::from(tab.label()))
        .collect();
    let tabs = Tabs::new(titles)
        .select(app.itinerary_tab.index())
        .highlight_style(Style::default().fg(Color::Yellow).bold());
    frame.render_widget(tabs, tabs_area);

    let lines = match app.itinerary_tab {
        ItineraryTab::Summary => summary_lines(plan),
        ItineraryTab::Flights => flight_lines(plan),
        ItineraryTab::Hotels => stay_lines(plan),
        ItineraryTab::Shopping => shopping_lines(plan),
    };

    let body = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((app.itinerary_scroll, 0))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(body, body_area);
}

// Days are renumbered D1..Dn in display order, whatever the backend sent.
fn summary_lines(plan: &crate::plan::TripPlan) -> Vec<Line<'static>> {
    let mut lines: Vec<Line> = Vec::new();
    for (i, day) in plan.day_plans.iter().enumerate() {
        lines.push(Line::from(vec![
            Span::styled(
                format!(" D{} ", i + 1),
                Style::default().fg(Color::Black).bg(Color::Yellow).bold(),
            ),
            Span::styled(
                format!(" {} ", day.title),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(day.date.clone(), Style::default().fg(Color::DarkGray)),
        ]));
        if !day.summary.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("   {}", day.summary),
                Style::default().fg(Color::DarkGray),
            )));
        }
        for (j, activity) in day.activities.iter().enumerate() {
            lines.push(Line::from(Span::raw(format!("   {}. {}", j + 1, activity))));
        }
        lines.push(Line::default());
    }
    if plan.day_plans.is_empty() {
        lines.push(Line::from("No day plans available."));
    }
    lines
}

fn flight_lines(plan: &crate::plan::TripPlan) -> Vec<Line<'static>> {
    let mut lines: Vec<Line> = vec![Line::from(Span::styled(
        "Flight Options",
        Style::default().bold(),
    ))];
    for flight in &plan.flights {
        lines.push(Line::from(Span::styled(
            flight.summary_line(),
            Style::default().fg(Color::Cyan),
        )));
        lines.push(Line::from(Span::styled(
            format!("   {}", flight.route_line()),
            Style::default().fg(Color::DarkGray),
        )));
        if let Some(link) = &flight.link {
            lines.push(Line::from(Span::styled(
                format!("   {link}"),
                Style::default().fg(Color::Blue),
            )));
        }
        lines.push(Line::default());
    }
    if plan.flights.is_empty() {
        lines.push(Line::from("No flight data available."));
    }
    lines
}

fn stay_lines(plan: &crate::plan::TripPlan) -> Vec<Line<'static>> {
    let mut lines: Vec<Line> = vec![Line::from(Span::styled(
        "Hotel & Stay Options",
        Style::default().bold(),
    ))];
    for stay in &plan.stays {
        lines.push(Line::from(Span::styled(
            stay.summary_line(),
            Style::default().fg(Color::Cyan),
        )));
        lines.push(Line::from(Span::styled(
            format!("   {}", stay.kind),
            Style::default().fg(Color::DarkGray),
        )));
        if let Some(link) = &stay.link {
            lines.push(Line::from(Span::styled(
                format!("   {link}"),
                Style::default().fg(Color::Blue),
            )));
        }
        lines.push(Line::default());
    }
    if plan.stays.is_empty() {
        lines.push(Line::from("No accommodations available."));
    }
    lines
}

fn shopping_lines(plan: &crate::plan::TripPlan) -> Vec<Line<'static>> {
    let mut lines: Vec<Line> = vec![Line::from(Span::styled(
        "Shopping Suggestions",
        Style::default().bold(),
    ))];
    for item in &plan.shopping {
        lines.push(Line::from(Span::styled(
            item.item.clone(),
            Style::default().fg(Color::Cyan),
        )));
        lines.push(Line::from(Span::styled(
            format!("   {}", item.detail_line()),
            Style::default().fg(Color::DarkGray),
        )));
        if let Some(link) = &item.link {
            lines.push(Line::from(Span::styled(
                format!("   {link}"),
                Style::default().fg(Color::Blue),
            )));
        }
        lines.push(Line::default());
    }
    if plan.shopping.is_empty() {
        lines.push(Line::from("No shopping suggestions."));
    }
    lines
}
