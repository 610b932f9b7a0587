use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};

use crate::app::{App, AuthModal, ImageField, InputMode, Screen, Sender, FEATURES};
use crate::quiz::QuizMode;
use crate::tutor::{self, WritingMode};

const ELLIPSIS_FRAMES: [&str; 3] = [".", "..", "..."];

fn loading_label(base: &str, frame: u8) -> String {
    format!("{}{}", base, ELLIPSIS_FRAMES[(frame % 3) as usize])
}

/// Split `**bold**` markers in a line into styled spans. Unclosed markers
/// are kept as literal text.
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut rest = text;
    let mut bold = false;

    while let Some(pos) = rest.find("**") {
        let (before, after) = rest.split_at(pos);
        if !before.is_empty() {
            let style = if bold {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            spans.push(Span::styled(before.to_string(), style));
        }
        rest = &after[2..];
        bold = !bold;
    }

    if !rest.is_empty() {
        // A dangling opener renders its marker literally
        if bold {
            spans.push(Span::raw(format!("**{}", rest)));
        } else {
            spans.push(Span::raw(rest.to_string()));
        }
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

/// Character-based line wrapping so scroll offsets match rendered lines.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut out = Vec::new();
    for line in text.lines() {
        let chars: Vec<char> = line.chars().collect();
        if chars.is_empty() {
            out.push(String::new());
            continue;
        }
        for chunk in chars.chunks(width) {
            out.push(chunk.iter().collect());
        }
    }
    if out.is_empty() {
        out.push(String::new());
    }
    out
}

fn markdown_lines(text: &str, width: usize) -> Vec<Line<'static>> {
    wrap_text(text, width)
        .into_iter()
        .map(|l| parse_markdown_line(&l))
        .collect()
}

fn clamp_scroll(scroll: u16, total_lines: usize, height: u16) -> u16 {
    let max = (total_lines as u16).saturating_sub(height);
    scroll.min(max)
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.screen {
        Screen::Home => render_home(app, frame, body_area),
        Screen::Chat => render_chat(app, frame, body_area),
        Screen::Image => render_image(app, frame, body_area),
        Screen::Writing => render_writing(app, frame, body_area),
        Screen::Reading => render_reading(app, frame, body_area),
        Screen::Vocabulary => render_vocabulary(app, frame, body_area),
        Screen::Grammar => render_grammar(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);

    if app.auth_modal != AuthModal::None {
        render_auth_modal(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let session = match &app.user_email {
        Some(email) => format!(" [{}]", email),
        None => " [guest]".to_string(),
    };

    let title = Line::from(vec![
        Span::styled(" IntelliLearn ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(app.screen.title(), Style::default().fg(Color::White)),
        Span::styled(session, Style::default().fg(Color::DarkGray)),
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
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hint = |key: &'static str, label: &'static str| {
        [
            Span::styled(format!(" {} ", key), key_style),
            Span::styled(format!(" {} ", label), label_style),
        ]
    };

    let mut hints: Vec<Span> = Vec::new();

    if app.auth_modal != AuthModal::None {
        for s in hint("Tab", "field") {
            hints.push(s);
        }
        for s in hint("Enter", "submit") {
            hints.push(s);
        }
        for s in hint("Ctrl-s", "switch") {
            hints.push(s);
        }
        for s in hint("Esc", "close") {
            hints.push(s);
        }
    } else if app.input_mode == InputMode::Editing {
        let enter_label = match app.screen {
            Screen::Writing => "newline",
            Screen::Image => "attach",
            _ => "send",
        };
        for s in hint("Enter", enter_label) {
            hints.push(s);
        }
        for s in hint("Esc", "done") {
            hints.push(s);
        }
    } else {
        let screen_hints: Vec<[Span; 2]> = match app.screen {
            Screen::Home => {
                let mut v = vec![hint("j/k", "nav"), hint("Enter", "open")];
                if app.logged_in {
                    v.push(hint("o", "log out"));
                } else {
                    v.push(hint("l", "log in"));
                    v.push(hint("n", "sign up"));
                }
                v.push(hint("q", "quit"));
                v
            }
            Screen::Chat => vec![
                hint("i", "type"),
                hint("j/k", "scroll"),
                hint("Esc", "home"),
                hint("q", "quit"),
            ],
            Screen::Image => vec![
                hint("Tab", "field"),
                hint("i", "edit"),
                hint("a", "analyze"),
                hint("j/k", "scroll"),
                hint("Esc", "home"),
            ],
            Screen::Writing => vec![
                hint("i", "write"),
                hint("m", "mode"),
                hint("s", "analyze"),
                hint("j/k", "scroll"),
                hint("Esc", "home"),
            ],
            Screen::Reading | Screen::Vocabulary => vec![
                hint("i", "type"),
                hint("j/k", "scroll"),
                hint("Esc", "home"),
                hint("q", "quit"),
            ],
            Screen::Grammar => grammar_hints(app, hint),
        };
        for pair in screen_hints {
            for s in pair {
                hints.push(s);
            }
        }
    }

    let footer = Paragraph::new(Line::from(hints));
    frame.render_widget(footer, area);
}

fn grammar_hints(
    app: &App,
    hint: impl Fn(&'static str, &'static str) -> [Span<'static>; 2],
) -> Vec<[Span<'static>; 2]> {
    match app.grammar.quiz.as_ref().map(|q| q.mode()) {
        Some(QuizMode::Active) => vec![
            hint("1-4", "answer"),
            hint("Enter", "next"),
            hint("Esc", "home"),
        ],
        Some(QuizMode::Finished) => vec![hint("r", "try again"), hint("Esc", "home")],
        _ => {
            let mut v = vec![hint("j/k", "topics"), hint("Enter", "lesson")];
            if app.grammar.quiz.is_some() {
                v.push(hint("s", "start quiz"));
            }
            v.push(hint("d/u", "scroll"));
            v.push(hint("Esc", "home"));
            v
        }
    }
}

fn render_home(app: &mut App, frame: &mut Frame, area: Rect) {
    let [welcome_area, list_area] =
        Layout::vertical([Constraint::Length(4), Constraint::Min(0)]).areas(area);

    let welcome = Paragraph::new(vec![
        Line::from(Span::styled(
            "Welcome to IntelliLearn",
            Style::default().fg(Color::White).bold(),
        )),
        Line::from(Span::styled(
            "Your personal AI-powered platform for mastering the English language.",
            Style::default().fg(Color::Gray),
        )),
        Line::from(Span::styled(
            "Select a tool below to get started.",
            Style::default().fg(Color::Gray),
        )),
    ])
    .block(Block::default().borders(Borders::NONE));
    frame.render_widget(welcome, welcome_area);

    let items: Vec<ListItem> = FEATURES
        .iter()
        .map(|(_, name, description)| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<24}", name), Style::default().fg(Color::White).bold()),
                Span::styled(*description, Style::default().fg(Color::Gray)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Tools "))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    frame.render_stateful_widget(list, list_area, &mut app.home_state);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let [messages_area, input_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(area);

    let wrap_width = messages_area.width.saturating_sub(2).max(10) as usize;
    let mut lines: Vec<Line> = Vec::new();

    for message in &app.chat.messages {
        let (label, style) = match message.sender {
            Sender::User => ("You:", Style::default().fg(Color::Blue).bold()),
            Sender::Ai => ("Tutor:", Style::default().fg(Color::Green).bold()),
        };
        lines.push(Line::from(Span::styled(label, style)));
        lines.extend(markdown_lines(&message.text, wrap_width));
        lines.push(Line::default());
    }

    if app.chat.loading {
        lines.push(Line::from(Span::styled(
            "Tutor:",
            Style::default().fg(Color::Green).bold(),
        )));
        lines.push(Line::from(Span::styled(
            loading_label("Thinking", app.animation_frame),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let inner_height = messages_area.height.saturating_sub(2);
    app.chat.scroll = clamp_scroll(app.chat.scroll, lines.len(), inner_height);

    let messages = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(" Conversation "))
        .scroll((app.chat.scroll, 0));
    frame.render_widget(messages, messages_area);

    render_input_line(
        frame,
        input_area,
        " Message ",
        &app.chat.input,
        Some(app.chat.cursor),
        app.input_mode == InputMode::Editing,
        app.chat.loading,
    );
}

fn render_input_line(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    value: &str,
    cursor: Option<usize>,
    editing: bool,
    disabled: bool,
) {
    let border_style = if disabled {
        Style::default().fg(Color::DarkGray)
    } else if editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    };

    let input = Paragraph::new(value)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(title.to_string()),
        )
        .style(Style::default().fg(Color::White));
    frame.render_widget(input, area);

    if editing && !disabled {
        if let Some(cursor) = cursor {
            let x = area.x + 1 + cursor.min(value.chars().count()) as u16;
            let y = area.y + 1;
            if x < area.x + area.width.saturating_sub(1) {
                frame.set_cursor_position((x, y));
            }
        }
    }
}

fn render_image(app: &mut App, frame: &mut Frame, area: Rect) {
    let [left_area, right_area] =
        Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)]).areas(area);

    let [path_area, prompt_area, status_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(left_area);

    let path_focused = app.image.field == ImageField::Path;
    render_input_line(
        frame,
        path_area,
        " Image file (PNG, JPG, WEBP, max 4MB) ",
        &app.image.path_input,
        None,
        app.input_mode == InputMode::Editing && path_focused,
        app.image.loading,
    );
    render_input_line(
        frame,
        prompt_area,
        " Your Prompt ",
        &app.image.prompt_input,
        None,
        app.input_mode == InputMode::Editing && !path_focused,
        app.image.loading,
    );

    let mut status_lines: Vec<Line> = Vec::new();
    if let Some(attachment) = &app.image.attachment {
        status_lines.push(Line::from(vec![
            Span::styled("Attached: ", Style::default().fg(Color::Gray)),
            Span::styled(
                attachment.file_name.clone(),
                Style::default().fg(Color::Green),
            ),
            Span::styled(
                format!(" ({} KB, {})", attachment.size_bytes / 1024, attachment.mime_type),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
    } else {
        status_lines.push(Line::from(Span::styled(
            "Enter a file path above to attach an image.",
            Style::default().fg(Color::DarkGray),
        )));
    }
    if !app.image.error.is_empty() {
        status_lines.push(Line::from(Span::styled(
            app.image.error.clone(),
            Style::default().fg(Color::Red),
        )));
    }
    let status = Paragraph::new(Text::from(status_lines))
        .block(Block::default().borders(Borders::ALL).title(" Upload "));
    frame.render_widget(status, status_area);

    let wrap_width = right_area.width.saturating_sub(2).max(10) as usize;
    let lines = if app.image.loading {
        vec![Line::from(Span::styled(
            loading_label("Generating analysis", app.animation_frame),
            Style::default().fg(Color::DarkGray),
        ))]
    } else if app.image.analysis.is_empty() {
        vec![Line::from(Span::styled(
            "The analysis will appear here once you attach an image and press 'a'.",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        markdown_lines(&app.image.analysis, wrap_width)
    };

    let inner_height = right_area.height.saturating_sub(2);
    app.image.scroll = clamp_scroll(app.image.scroll, lines.len(), inner_height);

    let analysis = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(" AI Analysis "))
        .scroll((app.image.scroll, 0));
    frame.render_widget(analysis, right_area);
}

fn render_writing(app: &mut App, frame: &mut Frame, area: Rect) {
    let [left_area, right_area] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(area);

    let [mode_area, text_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(left_area);

    let mode_line = Line::from(vec![
        Span::styled("Mode: ", Style::default().fg(Color::Gray)),
        Span::styled(
            app.writing.mode.display_name(),
            Style::default().fg(Color::Cyan).bold(),
        ),
        Span::styled(
            match app.writing.mode {
                WritingMode::Quick => "  (fast proofread)",
                WritingMode::Deep => "  (comprehensive, slower)",
            },
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(mode_line), mode_area);

    let editing = app.input_mode == InputMode::Editing;
    let border_style = if editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    };
    let text_input = Paragraph::new(app.writing.text.as_str())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(" Your Text "),
        )
        .wrap(ratatui::widgets::Wrap { trim: false });
    frame.render_widget(text_input, text_area);

    let wrap_width = right_area.width.saturating_sub(2).max(10) as usize;
    let lines = if app.writing.loading {
        vec![Line::from(Span::styled(
            loading_label("Analyzing your writing", app.animation_frame),
            Style::default().fg(Color::DarkGray),
        ))]
    } else if app.writing.feedback.is_empty() {
        vec![Line::from(Span::styled(
            "Feedback will appear here. Press 'i' to write, 's' to analyze.",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        markdown_lines(&app.writing.feedback, wrap_width)
    };

    let inner_height = right_area.height.saturating_sub(2);
    app.writing.scroll = clamp_scroll(app.writing.scroll, lines.len(), inner_height);

    let feedback = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(" Feedback "))
        .scroll((app.writing.scroll, 0));
    frame.render_widget(feedback, right_area);
}

fn render_reading(app: &mut App, frame: &mut Frame, area: Rect) {
    let [passage_area, question_area, answer_area] = Layout::vertical([
        Constraint::Percentage(45),
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(area);

    let passage = Paragraph::new(app.reading.passage)
        .block(Block::default().borders(Borders::ALL).title(" Passage "))
        .wrap(ratatui::widgets::Wrap { trim: false })
        .style(Style::default().fg(Color::Gray));
    frame.render_widget(passage, passage_area);

    render_input_line(
        frame,
        question_area,
        " Ask a question about the passage ",
        &app.reading.question,
        None,
        app.input_mode == InputMode::Editing,
        app.reading.loading,
    );

    let wrap_width = answer_area.width.saturating_sub(2).max(10) as usize;
    let lines = if app.reading.loading {
        vec![Line::from(Span::styled(
            loading_label("Thinking", app.animation_frame),
            Style::default().fg(Color::DarkGray),
        ))]
    } else if app.reading.answer.is_empty() {
        vec![Line::from(Span::styled(
            "The answer will appear here.",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        markdown_lines(&app.reading.answer, wrap_width)
    };

    let inner_height = answer_area.height.saturating_sub(2);
    app.reading.scroll = clamp_scroll(app.reading.scroll, lines.len(), inner_height);

    let answer = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(" Answer "))
        .scroll((app.reading.scroll, 0));
    frame.render_widget(answer, answer_area);
}

fn render_vocabulary(app: &mut App, frame: &mut Frame, area: Rect) {
    let [input_area, definition_area] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(area);

    render_input_line(
        frame,
        input_area,
        " Word ",
        &app.vocabulary.word,
        None,
        app.input_mode == InputMode::Editing,
        app.vocabulary.loading,
    );

    let wrap_width = definition_area.width.saturating_sub(2).max(10) as usize;
    let lines = if app.vocabulary.loading {
        vec![Line::from(Span::styled(
            loading_label("Looking it up", app.animation_frame),
            Style::default().fg(Color::DarkGray),
        ))]
    } else if app.vocabulary.definition.is_empty() {
        vec![Line::from(Span::styled(
            "Enter a word to get its definition, an example sentence, synonyms, and antonyms.",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        markdown_lines(&app.vocabulary.definition, wrap_width)
    };

    let inner_height = definition_area.height.saturating_sub(2);
    app.vocabulary.scroll = clamp_scroll(app.vocabulary.scroll, lines.len(), inner_height);

    let definition = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(" Definition "))
        .scroll((app.vocabulary.scroll, 0));
    frame.render_widget(definition, definition_area);
}

fn render_grammar(app: &mut App, frame: &mut Frame, area: Rect) {
    let [topics_area, content_area] =
        Layout::horizontal([Constraint::Length(28), Constraint::Min(0)]).areas(area);

    let items: Vec<ListItem> = tutor::GRAMMAR_TOPICS
        .iter()
        .map(|t| ListItem::new(*t))
        .collect();
    let topics = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Topics "))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");
    frame.render_stateful_widget(topics, topics_area, &mut app.grammar.topics_state);

    match app.grammar.quiz.as_ref().map(|q| q.mode()) {
        Some(QuizMode::Active) => render_quiz_question(app, frame, content_area),
        Some(QuizMode::Finished) => render_quiz_result(app, frame, content_area),
        _ => render_lesson(app, frame, content_area),
    }
}

fn render_lesson(app: &mut App, frame: &mut Frame, area: Rect) {
    let [lesson_area, quiz_bar_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);

    let topic = app.grammar.selected_topic.clone().unwrap_or_default();
    let title = if topic.is_empty() {
        " Lesson ".to_string()
    } else {
        format!(" Lesson: {} ", topic)
    };

    let wrap_width = lesson_area.width.saturating_sub(2).max(10) as usize;
    let lines = if app.grammar.lesson_loading {
        vec![Line::from(Span::styled(
            loading_label(&format!("Generating lesson for \"{}\"", topic), app.animation_frame),
            Style::default().fg(Color::DarkGray),
        ))]
    } else if app.grammar.explanation.is_empty() {
        vec![Line::from(Span::styled(
            "Select a topic from the left to start learning.",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        markdown_lines(&app.grammar.explanation, wrap_width)
    };

    let inner_height = lesson_area.height.saturating_sub(2);
    app.grammar.scroll = clamp_scroll(app.grammar.scroll, lines.len(), inner_height);

    let lesson = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(title))
        .scroll((app.grammar.scroll, 0));
    frame.render_widget(lesson, lesson_area);

    // Quiz availability line under the lesson: the Start Quiz control only
    // appears when a quiz was successfully generated.
    let quiz_bar = if app.grammar.quiz_loading {
        Line::from(Span::styled(
            loading_label("Generating Quiz", app.animation_frame),
            Style::default().fg(Color::DarkGray),
        ))
    } else if app.grammar.quiz.is_some() {
        Line::from(Span::styled(
            "Quiz ready. Press 's' to start.",
            Style::default().fg(Color::Green).bold(),
        ))
    } else {
        Line::default()
    };
    frame.render_widget(Paragraph::new(quiz_bar), quiz_bar_area);
}

fn render_quiz_question(app: &mut App, frame: &mut Frame, area: Rect) {
    let Some(quiz) = app.grammar.quiz.as_ref() else {
        return;
    };
    let Some(question) = quiz.current_question() else {
        return;
    };

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(Span::styled(
        format!("Question {} of {}", quiz.current_index() + 1, quiz.len()),
        Style::default().fg(Color::Gray),
    )));
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        question.question.clone(),
        Style::default().fg(Color::White).bold(),
    )));
    lines.push(Line::default());

    let selected = quiz.selected_answer();
    for (i, option) in question.options.iter().enumerate() {
        let is_selected = selected == Some(i);
        let is_correct = i == question.correct_answer_index;

        // After the first pick, reveal the correct answer like the original
        let style = if is_selected && is_correct {
            Style::default().fg(Color::Green).bold()
        } else if is_selected {
            Style::default().fg(Color::Red).bold()
        } else if selected.is_some() && is_correct {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::White)
        };

        lines.push(Line::from(Span::styled(
            format!("  {}. {}", i + 1, option),
            style,
        )));
    }

    lines.push(Line::default());
    if selected.is_some() {
        let next_label = if quiz.is_last_question() {
            "Press Enter to finish the quiz."
        } else {
            "Press Enter for the next question."
        };
        lines.push(Line::from(Span::styled(
            next_label,
            Style::default().fg(Color::Cyan),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "Press 1-4 to answer.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let topic = app.grammar.selected_topic.clone().unwrap_or_default();
    let quiz_widget = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Quiz: {} ", topic)),
        )
        .wrap(ratatui::widgets::Wrap { trim: false });
    frame.render_widget(quiz_widget, area);
}

fn render_quiz_result(app: &mut App, frame: &mut Frame, area: Rect) {
    let Some(quiz) = app.grammar.quiz.as_ref() else {
        return;
    };

    let lines = vec![
        Line::default(),
        Line::from(Span::styled(
            "Quiz Complete!",
            Style::default().fg(Color::White).bold(),
        )),
        Line::default(),
        Line::from(vec![
            Span::raw("You scored "),
            Span::styled(
                quiz.score().to_string(),
                Style::default().fg(Color::Blue).bold(),
            ),
            Span::raw(" out of "),
            Span::styled(quiz.len().to_string(), Style::default().bold()),
            Span::raw("."),
        ]),
        Line::default(),
        Line::from(Span::styled(
            "Press 'r' to try again.",
            Style::default().fg(Color::Cyan),
        )),
    ];

    let result = Paragraph::new(Text::from(lines))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(" Quiz "));
    frame.render_widget(result, area);
}

fn render_auth_modal(app: &App, frame: &mut Frame, area: Rect) {
    let is_signup = app.auth_modal == AuthModal::Signup;
    let height = if is_signup { 11 } else { 9 };
    let popup = centered_rect(46, height, area);

    frame.render_widget(Clear, popup);

    let title = if is_signup { " Sign Up " } else { " Log In " };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title);
    frame.render_widget(block, popup);

    let inner = Rect {
        x: popup.x + 2,
        y: popup.y + 1,
        width: popup.width.saturating_sub(4),
        height: popup.height.saturating_sub(2),
    };

    let field_line = |label: &str, value: &str, focused: bool, masked: bool| {
        let shown = if masked {
            "*".repeat(value.chars().count())
        } else {
            value.to_string()
        };
        let style = if focused {
            Style::default().fg(Color::Yellow).bold()
        } else {
            Style::default().fg(Color::White)
        };
        Line::from(vec![
            Span::styled(format!("{:<10}", label), Style::default().fg(Color::Gray)),
            Span::styled(shown, style),
            Span::styled(if focused { "▏" } else { "" }, style),
        ])
    };

    let mut lines: Vec<Line> = Vec::new();
    let focus = app.auth_form.field;
    if is_signup {
        lines.push(field_line("Name", &app.auth_form.name, focus == 0, false));
        lines.push(Line::default());
        lines.push(field_line("Email", &app.auth_form.email, focus == 1, false));
        lines.push(Line::default());
        lines.push(field_line("Password", &app.auth_form.password, focus == 2, true));
    } else {
        lines.push(field_line("Email", &app.auth_form.email, focus == 0, false));
        lines.push(Line::default());
        lines.push(field_line("Password", &app.auth_form.password, focus == 1, true));
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        if is_signup {
            "Ctrl-s: already have an account? Log in"
        } else {
            "Ctrl-s: need an account? Sign up"
        },
        Style::default().fg(Color::DarkGray),
    )));

    let form = Paragraph::new(Text::from(lines));
    frame.render_widget(form, inner);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_text_splits_long_lines_by_chars() {
        let wrapped = wrap_text("abcdefghij", 4);
        assert_eq!(wrapped, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn wrap_text_preserves_empty_lines() {
        let wrapped = wrap_text("a\n\nb", 10);
        assert_eq!(wrapped, vec!["a", "", "b"]);
    }

    #[test]
    fn parse_markdown_line_styles_bold_sections() {
        let line = parse_markdown_line("plain **bold** tail");
        assert_eq!(line.spans.len(), 3);
        assert_eq!(line.spans[1].content, "bold");
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn parse_markdown_line_keeps_unclosed_marker_literal() {
        let line = parse_markdown_line("oops **dangling");
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "oops **dangling");
    }

    #[test]
    fn clamp_scroll_limits_to_content() {
        assert_eq!(clamp_scroll(u16::MAX, 50, 20), 30);
        assert_eq!(clamp_scroll(5, 10, 20), 0);
    }
}
