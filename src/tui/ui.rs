use crate::posts::browser::PAGE_SIZE;
use crate::storage::SlotStore;
use crate::theme::Palette;
use crate::tui::app::{App, InputMode, Tab};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
};

pub fn draw<S: SlotStore>(frame: &mut Frame, app: &App<S>) {
    let palette = app.theme.palette();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Tabs
            Constraint::Length(3), // Input / controls
            Constraint::Min(0),    // Main content
            Constraint::Length(3), // Footer
        ])
        .split(frame.size());

    draw_tabs(frame, chunks[0], app, &palette);
    match app.tab {
        Tab::Tasks => {
            draw_task_controls(frame, chunks[1], app, &palette);
            draw_task_list(frame, chunks[2], app, &palette);
        }
        Tab::Posts => {
            draw_search_box(frame, chunks[1], app, &palette);
            draw_posts(frame, chunks[2], app, &palette);
        }
    }
    draw_footer(frame, chunks[3], app, &palette);

    if app.help_mode {
        draw_help_window(frame, &palette);
    }
}

fn bordered(title: &str, palette: &Palette) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border))
        .title(title.to_string())
}

fn draw_tabs<S: SlotStore>(frame: &mut Frame, area: Rect, app: &App<S>, palette: &Palette) {
    let selected = match app.tab {
        Tab::Tasks => 0,
        Tab::Posts => 1,
    };
    let tabs = Tabs::new(vec!["1 Tasks", "2 Posts"])
        .block(bordered(&format!("Taskpad ({} theme)", app.theme), palette))
        .select(selected)
        .style(Style::default().fg(palette.muted))
        .highlight_style(
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, area);
}

fn input_line<S: SlotStore>(app: &App<S>, placeholder: &str, active: bool, palette: &Palette) -> Line<'static> {
    if active {
        let (before, after) = app.input.split_at_cursor();
        Line::from(vec![
            Span::styled(before.to_string(), Style::default().fg(palette.text)),
            Span::styled("█", Style::default().fg(palette.accent)),
            Span::styled(after.to_string(), Style::default().fg(palette.text)),
        ])
    } else {
        Line::from(Span::styled(placeholder.to_string(), Style::default().fg(palette.muted)))
    }
}

fn draw_task_controls<S: SlotStore>(frame: &mut Frame, area: Rect, app: &App<S>, palette: &Palette) {
    let adding = app.input_mode == InputMode::AddingTask;
    let line = input_line(app, "Add a new task... (a)", adding, palette);
    let title = format!("New task | Filter: {} (f)", app.filter);

    frame.render_widget(Paragraph::new(line).block(bordered(&title, palette)), area);
}

fn draw_task_list<S: SlotStore>(frame: &mut Frame, area: Rect, app: &App<S>, palette: &Palette) {
    let visible = app.visible_tasks();
    if visible.is_empty() {
        let empty = Paragraph::new("No tasks found")
            .alignment(Alignment::Center)
            .style(Style::default().fg(palette.muted))
            .block(bordered("Tasks", palette));
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = visible
        .iter()
        .map(|task| {
            let checkbox = if task.completed { "☑" } else { "☐" };
            let style = if task.completed {
                Style::default()
                    .fg(palette.muted)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default().fg(palette.text)
            };
            let created = task.created_at.format("%Y-%m-%d %H:%M");
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} {}", checkbox, task.text), style),
                Span::styled(format!("  {}", created), Style::default().fg(palette.muted)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(bordered("Tasks", palette))
        .highlight_style(
            Style::default()
                .bg(palette.highlight_bg)
                .fg(palette.highlight_fg)
                .add_modifier(Modifier::BOLD),
        );

    let mut list_state = ListState::default();
    list_state.select(Some(app.selected_index));

    frame.render_stateful_widget(list, area, &mut list_state);
}

fn draw_search_box<S: SlotStore>(frame: &mut Frame, area: Rect, app: &App<S>, palette: &Palette) {
    let searching = app.input_mode == InputMode::Searching;
    let term = &app.listing.state().search_term;
    let line = if searching || term.is_empty() {
        input_line(app, "Search posts... (/)", searching, palette)
    } else {
        Line::from(Span::styled(term.clone(), Style::default().fg(palette.text)))
    };

    frame.render_widget(Paragraph::new(line).block(bordered("Search", palette)), area);
}

fn draw_posts<S: SlotStore>(frame: &mut Frame, area: Rect, app: &App<S>, palette: &Palette) {
    let state = app.listing.state();
    let block = bordered("Posts", palette);

    if state.loading {
        let loading = Paragraph::new("Loading...")
            .alignment(Alignment::Center)
            .style(Style::default().fg(palette.muted))
            .block(block);
        frame.render_widget(loading, area);
        return;
    }

    if let Some(message) = &state.error_message {
        let error = Paragraph::new(format!("Error: {}", message))
            .alignment(Alignment::Center)
            .style(Style::default().fg(palette.error))
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(error, area);
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    for post in app.listing.visible_page() {
        lines.push(Line::from(Span::styled(
            post.title.clone(),
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            post.body.replace('\n', " "),
            Style::default().fg(palette.text),
        )));
        lines.push(Line::from(""));
    }

    if app.listing.show_pager() {
        lines.push(Line::from(Span::styled(
            format!(
                "◀ p   Page {} of {}   n ▶",
                state.current_page,
                app.listing.total_pages()
            ),
            Style::default().fg(palette.muted),
        )));
    } else if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "No posts match your search",
            Style::default().fg(palette.muted),
        )));
    }

    let posts = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(block);
    frame.render_widget(posts, area);
}

fn draw_footer<S: SlotStore>(frame: &mut Frame, area: Rect, app: &App<S>, palette: &Palette) {
    let footer_text = match (app.input_mode, app.tab) {
        (InputMode::AddingTask, _) => "ADD TASK | Enter: add | Esc: cancel | ←→: cursor".to_string(),
        (InputMode::Searching, _) => "SEARCH | typing filters live | Enter: done | Esc: clear".to_string(),
        (InputMode::Normal, Tab::Tasks) => format!(
            "{} tasks remaining | Total tasks: {} | a: add | Enter: toggle | d: delete | ?: help | q: quit",
            app.tasks.remaining(),
            app.tasks.total()
        ),
        (InputMode::Normal, Tab::Posts) => format!(
            "{} matching posts, {} per page | /: search | n/p: page | ?: help | q: quit",
            app.listing.filtered().len(),
            PAGE_SIZE
        ),
    };

    let footer = Paragraph::new(footer_text)
        .block(bordered("", palette))
        .style(Style::default().fg(palette.accent));

    frame.render_widget(footer, area);
}

fn draw_help_window(frame: &mut Frame, palette: &Palette) {
    let help_text = [
        "Taskpad - Keyboard Commands",
        "",
        "GENERAL:",
        "  Tab / 1 / 2       Switch between Tasks and Posts",
        "  t                 Toggle light/dark theme",
        "  ?                 Show this help (press ? or Esc to close)",
        "  q / Ctrl+C        Quit application",
        "",
        "TASKS:",
        "  ↑↓ / j/k          Navigate up/down",
        "  a                 Add a new task",
        "  Enter / Space     Toggle task completion",
        "  d                 Delete selected task",
        "  f                 Cycle filter: All, Active, Completed",
        "",
        "POSTS:",
        "  /                 Search titles and bodies",
        "  n / →             Next page",
        "  p / ←             Previous page",
        "  Esc               Clear search",
    ];

    let help_paragraph = Paragraph::new(help_text.join("\n"))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help - Keyboard Commands ")
                .style(Style::default().fg(palette.accent))
        )
        .style(Style::default().fg(palette.text))
        .wrap(Wrap { trim: false });

    let area = centered_rect(80, 70, frame.size());

    frame.render_widget(Clear, area);
    frame.render_widget(help_paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::posts::source::fake::{sample_posts, FakePostSource};
    use crate::storage::memory::MemorySlotStore;
    use crate::tasks::store::TaskStore;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn render(app: &App<MemorySlotStore>) -> String {
        let backend = TestBackend::new(120, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn app() -> App<MemorySlotStore> {
        let tasks = TaskStore::load(MemorySlotStore::new());
        App::new(tasks, MemorySlotStore::new(), Arc::new(FakePostSource::ok(sample_posts(12))))
    }

    #[test]
    fn test_empty_task_tab() {
        let screen = render(&app());
        assert!(screen.contains("No tasks found"));
        assert!(screen.contains("0 tasks remaining"));
        assert!(screen.contains("Total tasks: 0"));
    }

    #[test]
    fn test_task_rows_and_stats() {
        let mut app = app();
        app.tasks.add_task("walk the dog");
        app.tasks.add_task("write report");
        let first = app.tasks.tasks()[0].id;
        app.tasks.toggle_task(first);

        let screen = render(&app);
        assert!(screen.contains("☑ walk the dog"));
        assert!(screen.contains("☐ write report"));
        assert!(screen.contains("1 tasks remaining"));
        assert!(screen.contains("Total tasks: 2"));
    }

    #[test]
    fn test_posts_loading_then_pager() {
        let mut app = app();
        app.tab = Tab::Posts;
        let ticket = app.listing.mount().unwrap();
        assert!(render(&app).contains("Loading..."));

        app.listing.apply(ticket, Ok(sample_posts(12)));
        let screen = render(&app);
        assert!(screen.contains("Post title 1"));
        assert!(screen.contains("Page 1 of 3"));
    }

    #[test]
    fn test_pager_hidden_for_single_page() {
        let mut app = app();
        app.tab = Tab::Posts;
        let ticket = app.listing.mount().unwrap();
        app.listing.apply(ticket, Ok(sample_posts(5)));

        assert!(!render(&app).contains("Page 1 of 1"));
    }
}
