//! Main gallery screen: header readouts, the record list and a status bar.

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use tui_dispatch::EventKind;
use tui_dispatch_components::style::BorderStyle;
use tui_dispatch_components::{
    BaseStyle, Padding, SelectList, SelectListBehavior, SelectListProps, SelectListStyle,
    SelectionStyle, StatusBar, StatusBarHint, StatusBarItem, StatusBarProps, StatusBarSection,
    StatusBarStyle,
};

use super::Component;
use crate::action::Action;
use crate::locale::{type_color, type_label};
use crate::state::AppState;

pub(crate) const BG_BASE: Color = Color::Rgb(12, 18, 28);
pub(crate) const BG_PANEL: Color = Color::Rgb(20, 32, 46);
pub(crate) const BG_HIGHLIGHT: Color = Color::Rgb(28, 92, 110);
pub(crate) const TEXT_MAIN: Color = Color::Rgb(232, 242, 244);
pub(crate) const TEXT_DIM: Color = Color::Rgb(176, 195, 207);
pub(crate) const ACCENT_TEAL: Color = Color::Rgb(72, 204, 184);
pub(crate) const ACCENT_GOLD: Color = Color::Rgb(228, 176, 88);

pub struct GalleryView {
    list: SelectList,
    status_bar: StatusBar,
}

impl Default for GalleryView {
    fn default() -> Self {
        Self {
            list: SelectList::new(),
            status_bar: StatusBar::new(),
        }
    }
}

impl GalleryView {
    pub fn new() -> Self {
        Self::default()
    }
}

pub struct GalleryViewProps<'a> {
    pub state: &'a AppState,
    pub is_focused: bool,
}

impl Component<Action> for GalleryView {
    type Props<'a> = GalleryViewProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused {
            return Vec::new();
        }
        match event {
            EventKind::Key(key) => match key.code {
                KeyCode::Enter => vec![Action::DetailOpen],
                KeyCode::Char('/') => vec![Action::SearchStart],
                KeyCode::Char('m') => vec![Action::PageLoadMore],
                KeyCode::Char('s') => vec![Action::SortToggle],
                KeyCode::Char('[') => vec![Action::TypeFilterPrev],
                KeyCode::Char(']') => vec![Action::TypeFilterNext],
                KeyCode::Char('t') => vec![Action::TypeFilterClear],
                KeyCode::Char('g') => vec![Action::SelectionJumpTop],
                KeyCode::Char('G') => vec![Action::SelectionJumpBottom],
                KeyCode::PageDown => vec![Action::SelectionPage(1)],
                KeyCode::PageUp => vec![Action::SelectionPage(-1)],
                KeyCode::Char('q') => vec![Action::Quit],
                _ => {
                    let items = gallery_items(props.state);
                    let list_props = SelectListProps {
                        items: &items,
                        count: items.len(),
                        selected: props
                            .state
                            .selected_index
                            .min(items.len().saturating_sub(1)),
                        is_focused: true,
                        style: gallery_list_style(),
                        behavior: SelectListBehavior {
                            show_scrollbar: true,
                            wrap_navigation: false,
                        },
                        on_select: Action::GallerySelect,
                        render_item: &|item| item.clone(),
                    };
                    self.list.handle_event(event, list_props).into_iter().collect()
                }
            },
            EventKind::Scroll { delta, .. } => vec![Action::SelectionMove((*delta * 3) as i16)],
            _ => Vec::new(),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let GalleryView { list, status_bar } = self;
        frame.render_widget(Block::default().style(Style::default().bg(BG_BASE)), area);
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(5),
                Constraint::Length(3),
            ])
            .split(area);
        render_header(frame, layout[0], props.state);
        render_list(frame, layout[1], props.state, list, props.is_focused);
        render_footer(frame, layout[2], props.state, status_bar);
    }
}

/// Keys routed here while the search prompt is active. Every printable
/// character lands in the query, so gallery shortcuts stay usable as
/// search text.
pub fn handle_search_keys(event: &EventKind) -> Vec<Action> {
    match event {
        EventKind::Key(key) => match key.code {
            KeyCode::Esc => vec![Action::SearchCancel],
            KeyCode::Enter => vec![Action::SearchSubmit],
            KeyCode::Backspace => vec![Action::SearchBackspace],
            KeyCode::Char(ch) => vec![Action::SearchInput(ch)],
            _ => vec![],
        },
        _ => vec![],
    }
}

fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let title_style = Style::default()
        .fg(ACCENT_TEAL)
        .add_modifier(Modifier::BOLD);
    let filter = state.type_filter.as_deref().map(type_label).unwrap_or("ALL");
    let search = if state.search.active {
        format!("/{}_", state.search.query)
    } else if state.search.query.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", state.search.query)
    };
    let mut counts = vec![
        Span::raw("Showing "),
        Span::styled(
            state.visible_indices.len().to_string(),
            Style::default().fg(ACCENT_TEAL),
        ),
        Span::raw(" of "),
        Span::styled(
            state.loaded_count().to_string(),
            Style::default().fg(ACCENT_TEAL),
        ),
        Span::raw(" loaded"),
    ];
    if state.absent_count() > 0 {
        counts.push(Span::styled(
            format!("  ({} failed)", state.absent_count()),
            Style::default().fg(TEXT_DIM),
        ));
    }
    let header_text = Text::from(vec![
        Line::from(vec![
            Span::styled("GALLERY", title_style),
            Span::raw("  |  Sort: "),
            Span::styled(state.sort_key.label(), Style::default().fg(ACCENT_GOLD)),
            Span::raw("  |  Type: "),
            Span::styled(filter, Style::default().fg(ACCENT_GOLD)),
            Span::raw("  |  Search: "),
            Span::styled(search, Style::default().fg(ACCENT_TEAL)),
        ]),
        Line::from(counts),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(Style::default().fg(TEXT_DIM))
        .title("POKEDEX");
    let paragraph = Paragraph::new(header_text)
        .block(block)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(TEXT_MAIN));
    frame.render_widget(paragraph, area);
}

fn render_list(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    list: &mut SelectList,
    is_focused: bool,
) {
    let border_style = if is_focused {
        Style::default().fg(ACCENT_TEAL)
    } else {
        Style::default().fg(TEXT_DIM)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title("DEX")
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(border_style);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let items = gallery_items(state);
    if items.is_empty() {
        let notice = if state.list_loading && state.records.is_empty() {
            "Loading page..."
        } else {
            "No results."
        };
        let paragraph = Paragraph::new(notice).style(Style::default().fg(TEXT_DIM));
        frame.render_widget(paragraph, inner);
        return;
    }

    let props = SelectListProps {
        items: &items,
        count: items.len(),
        selected: state.selected_index.min(items.len().saturating_sub(1)),
        is_focused,
        style: gallery_list_style(),
        behavior: SelectListBehavior {
            show_scrollbar: true,
            wrap_navigation: false,
        },
        on_select: Action::GallerySelect,
        render_item: &|item| item.clone(),
    };
    list.render(frame, inner, props);
}

fn render_footer(frame: &mut Frame, area: Rect, state: &AppState, status_bar: &mut StatusBar) {
    let status = state.message.clone().unwrap_or_else(|| {
        if state.list_loading {
            format!("Loading page{}", loading_dots(state.tick))
        } else if state.ability_texts.is_loading() {
            format!("Loading abilities{}", loading_dots(state.tick))
        } else {
            String::new()
        }
    });
    let (left_hints, center_hints) = status_hints(state);
    let status_span = Span::styled(status.as_str(), Style::default().fg(ACCENT_GOLD));
    let status_items = [StatusBarItem::span(status_span)];

    let style = StatusBarStyle {
        base: BaseStyle {
            border: Some(BorderStyle {
                borders: Borders::ALL,
                style: Style::default().fg(TEXT_DIM),
                focused_style: Some(Style::default().fg(ACCENT_TEAL)),
            }),
            padding: Padding::xy(1, 0),
            bg: Some(BG_PANEL),
            fg: Some(TEXT_MAIN),
        },
        text: Style::default().fg(TEXT_DIM),
        hint_key: Style::default()
            .fg(ACCENT_TEAL)
            .add_modifier(Modifier::BOLD),
        hint_label: Style::default().fg(TEXT_DIM),
        separator: Style::default().fg(TEXT_DIM),
    };

    let props = StatusBarProps {
        left: StatusBarSection::hints(&left_hints).with_separator("  "),
        center: StatusBarSection::hints(&center_hints).with_separator("  "),
        right: StatusBarSection::items(&status_items).with_separator("  "),
        style,
        is_focused: false,
    };
    Component::<Action>::render(status_bar, frame, area, props);
}

fn status_hints(state: &AppState) -> (Vec<StatusBarHint<'static>>, Vec<StatusBarHint<'static>>) {
    if state.search.active {
        let left = vec![
            StatusBarHint::new("Enter", "Apply"),
            StatusBarHint::new("Esc", "Cancel"),
            StatusBarHint::new("Bksp", "Delete"),
        ];
        return (left, Vec::new());
    }
    if state.detail_index.is_some() {
        let left = vec![StatusBarHint::new("Esc/q", "Close")];
        return (left, Vec::new());
    }

    let mut left = vec![
        StatusBarHint::new("j/k", "Move"),
        StatusBarHint::new("Enter", "Detail"),
        StatusBarHint::new("/", "Search"),
        StatusBarHint::new("s", "Sort"),
        StatusBarHint::new("[/]", "Type"),
    ];
    if state.has_more && !state.list_loading {
        left.push(StatusBarHint::new("m", "More"));
    }
    (left, vec![StatusBarHint::new("q", "Quit")])
}

fn gallery_items(state: &AppState) -> Vec<Line<'static>> {
    state
        .visible_records()
        .map(|record| {
            let mut spans = vec![
                Span::styled(
                    format!("#{} ", record.number),
                    Style::default().fg(ACCENT_GOLD),
                ),
                Span::raw(format!("{:<16}", format_name(&record.name))),
            ];
            for slug in &record.types {
                spans.push(Span::styled(
                    format!(" {}", type_label(slug)),
                    Style::default().fg(type_color(slug)),
                ));
            }
            Line::from(spans)
        })
        .collect()
}

fn gallery_list_style() -> SelectListStyle {
    SelectListStyle {
        base: BaseStyle {
            border: None,
            padding: Padding::xy(1, 0),
            bg: None,
            fg: Some(TEXT_MAIN),
        },
        selection: SelectionStyle {
            style: Some(
                Style::default()
                    .bg(BG_HIGHLIGHT)
                    .fg(TEXT_MAIN)
                    .add_modifier(Modifier::BOLD),
            ),
            marker: None,
            disabled: false,
        },
        ..SelectListStyle::default()
    }
}

fn loading_dots(tick: u64) -> String {
    ".".repeat(1 + (tick % 3) as usize)
}

pub(crate) fn format_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
