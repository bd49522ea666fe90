use crate::domain::Filter;
use crate::presentation::view::{CalculatorView, TodoView};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

pub fn render_calculator(f: &mut Frame, view: &CalculatorView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(4),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    let header = Paragraph::new("pocket - Calculator").style(Style::default().fg(Color::Cyan));
    f.render_widget(header, chunks[0]);

    render_display(f, view, chunks[1]);
    render_history(f, view, chunks[2]);

    let status = view.status.clone().unwrap_or_else(|| {
        "0-9 . + - * / % | Enter/=: equals | Esc: clear | Backspace: delete | Ctrl+L: clear history | Ctrl+Y: copy | F1/?: help | q: quit".to_string()
    });
    let status_bar =
        Paragraph::new(status).block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(status_bar, chunks[3]);

    if view.show_help {
        render_help_popup(f, "Calculator Help", CALCULATOR_HELP);
    }
}

fn render_display(f: &mut Frame, view: &CalculatorView, area: Rect) {
    let current_style = if view.is_error {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    };
    let previous_style = if view.is_error {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let lines = vec![
        Line::from(Span::styled(view.previous.clone(), previous_style)),
        Line::from(Span::styled(view.current.clone(), current_style)),
    ];
    let display = Paragraph::new(lines)
        .alignment(Alignment::Right)
        .block(Block::default().borders(Borders::ALL).title("Display"));
    f.render_widget(display, area);
}

fn render_history(f: &mut Frame, view: &CalculatorView, area: Rect) {
    let items: Vec<ListItem> = view
        .history
        .iter()
        .map(|line| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    line.expression.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!(" = {}", line.result)),
                Span::styled(format!("  {}", line.timestamp), Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("History"));
    f.render_widget(list, area);
}

pub fn render_todo(f: &mut Frame, view: &TodoView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_filter_tabs(f, view.filter, chunks[0]);
    render_task_input(f, view, chunks[1]);
    render_task_list(f, view, chunks[2]);

    let counters = Paragraph::new(format!(
        "{} | {} | {}",
        view.total, view.completed, view.pending
    ))
    .style(Style::default().fg(Color::Yellow));
    f.render_widget(counters, chunks[3]);

    render_todo_status(f, view, chunks[4]);

    if view.show_help {
        render_help_popup(f, "Task List Help", TODO_HELP);
    }
}

fn render_filter_tabs(f: &mut Frame, active: Filter, area: Rect) {
    let mut spans = vec![Span::styled("pocket - Tasks  ", Style::default().fg(Color::Cyan))];
    for (key, filter) in [('1', Filter::All), ('2', Filter::Pending), ('3', Filter::Completed)] {
        let style = if filter == active {
            Style::default().bg(Color::LightBlue).fg(Color::Black)
        } else {
            Style::default().fg(Color::Yellow)
        };
        spans.push(Span::styled(format!(" {key}:{} ", filter.label()), style));
        spans.push(Span::raw(" "));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_task_input(f: &mut Frame, view: &TodoView, area: Rect) {
    match &view.input {
        Some(input) => {
            let widget = Paragraph::new(input.text.clone())
                .style(Style::default().fg(Color::Green))
                .block(Block::default().borders(Borders::ALL).title(input.title));
            f.render_widget(widget, area);
            let column = cursor_column(area, &input.text, input.cursor);
            f.set_cursor_position((column, area.y + 1));
        }
        None => {
            let widget = Paragraph::new("Press a to add a task")
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL).title("New task"));
            f.render_widget(widget, area);
        }
    }
}

/// Screen column for a cursor `cursor` chars into `text`, measured in
/// display width and kept inside the bordered box.
fn cursor_column(area: Rect, text: &str, cursor: usize) -> u16 {
    let before: String = text.chars().take(cursor).collect();
    let offset = u16::try_from(Span::raw(before).width()).unwrap_or(u16::MAX);
    area.x
        .saturating_add(1)
        .saturating_add(offset)
        .min(area.right().saturating_sub(2))
}

fn render_task_list(f: &mut Frame, view: &TodoView, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Tasks");

    if let Some(message) = view.empty_message {
        let banner = Paragraph::new(message)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(banner, area);
        return;
    }

    let items: Vec<ListItem> = view
        .rows
        .iter()
        .map(|row| {
            let marker = if row.completed { "[x]" } else { "[ ]" };
            let mut style = if row.completed {
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default()
            };
            if row.selected {
                style = style.bg(Color::Blue).fg(Color::White);
            }
            ListItem::new(format!("{marker} {}", row.text)).style(style)
        })
        .collect();

    let mut state = ListState::default().with_selected(view.rows.iter().position(|r| r.selected));
    f.render_stateful_widget(List::new(items).block(block), area, &mut state);
}

fn render_todo_status(f: &mut Frame, view: &TodoView, area: Rect) {
    let (text, style) = if let Some(prompt) = &view.prompt {
        (format!("{prompt} (y/n)"), Style::default().fg(Color::Yellow))
    } else if let Some(warning) = &view.warning {
        (warning.clone(), Style::default().fg(Color::Red))
    } else if let Some(status) = &view.status {
        (status.clone(), Style::default())
    } else if view.input.is_some() {
        (
            "Enter: save | Esc: cancel".to_string(),
            Style::default().fg(Color::Green),
        )
    } else {
        (
            "a: add | Space: toggle | e: edit | d: delete | c: clear completed | C: clear all | f/1-3: filter | Ctrl+E: export | F1/?: help | q: quit".to_string(),
            Style::default(),
        )
    };

    let status = Paragraph::new(text)
        .style(style)
        .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(status, area);
}

fn render_help_popup(f: &mut Frame, title: &str, text: &str) {
    let area = f.area();
    let popup_area = Rect {
        x: area.width / 10,
        y: area.height / 10,
        width: area.width * 4 / 5,
        height: area.height * 4 / 5,
    };

    f.render_widget(Clear, popup_area);

    let help_widget = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{title} (Esc to close)"))
                .style(Style::default().fg(Color::Cyan)),
        )
        .style(Style::default().fg(Color::White));

    f.render_widget(help_widget, popup_area);
}

const CALCULATOR_HELP: &str = r#"CALCULATOR

=== INPUT ===
0-9 .           Type a number (one decimal point per number)
+ - * /         Add, subtract, multiply, divide
%               Alone: divide the number by 100. With an operation
                pending: evaluate it and use % next (a % b = a * b / 100)
Enter or =      Evaluate
Backspace       Delete the last character
Esc or Delete   Clear the calculator

=== HISTORY ===
The last 10 calculations are kept, newest first, and saved between runs.
Ctrl+L          Clear history

=== OTHER ===
Ctrl+Y          Copy the displayed value to the clipboard
F1 or ?         Toggle this help
q or Ctrl+C     Quit

Errors (invalid input, division by zero) clear themselves after two
seconds, or as soon as you press another key."#;

const TODO_HELP: &str = r#"TASK LIST

=== ADDING ===
a or i          Focus the input field
Enter           Add the typed task (blank tasks are rejected)
Esc             Leave the input field

=== WORKING WITH TASKS ===
Up/Down, j/k    Move the selection
Space or x      Mark done / not done
e or Enter      Edit (Enter or Tab saves, Esc discards)
d or Delete     Delete (asks first)
c               Clear completed tasks (asks first)
C               Clear all tasks (asks first)

=== FILTERS ===
f               Cycle All / Pending / Completed
1 2 3           All, Pending, Completed

=== OTHER ===
Ctrl+E          Export all tasks to CSV
F1 or ?         Toggle this help
q or Ctrl+C     Quit

Tasks are saved after every change."#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::view::TodoRow;
    use ratatui::{Terminal, backend::TestBackend};

    fn todo_view(count: u64, selected: u64) -> TodoView {
        TodoView {
            filter: Filter::All,
            rows: (1..=count)
                .map(|id| TodoRow {
                    id,
                    text: format!("task {id}"),
                    completed: false,
                    selected: id == selected,
                })
                .collect(),
            empty_message: None,
            total: format!("Total: {count}"),
            completed: "Completed: 0".to_string(),
            pending: format!("Pending: {count}"),
            input: None,
            prompt: None,
            warning: None,
            status: None,
            show_help: false,
        }
    }

    #[test]
    fn test_cursor_column_uses_display_width() {
        let area = Rect::new(0, 0, 40, 3);
        assert_eq!(cursor_column(area, "", 0), 1);
        assert_eq!(cursor_column(area, "abc", 2), 3);
        // Wide characters take two columns each
        assert_eq!(cursor_column(area, "\u{65e5}\u{672c}x", 2), 5);
    }

    #[test]
    fn test_cursor_column_stays_inside_box() {
        let area = Rect::new(2, 0, 20, 3);
        let long = "x".repeat(100_000);
        assert_eq!(cursor_column(area, &long, 100_000), area.right() - 2);
    }

    #[test]
    fn test_selected_task_scrolls_into_view() {
        let view = todo_view(40, 35);
        let mut terminal = Terminal::new(TestBackend::new(60, 16)).unwrap();
        terminal.draw(|f| render_todo(f, &view)).unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("task 35"));
        assert!(!text.contains("task 1 "));
    }
}
