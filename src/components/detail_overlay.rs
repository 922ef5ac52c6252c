//! Detail overlay: profile, stats, abilities and the evolution chain.

use crossterm::event::KeyCode;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Paragraph, Wrap},
    Frame,
};
use tui_dispatch::{DataResource, EventKind};
use tui_dispatch_components::{
    centered_rect, BaseStyle, Modal, ModalBehavior, ModalProps, ModalStyle, Padding,
};

use super::gallery::{format_name, ACCENT_GOLD, ACCENT_TEAL, BG_PANEL, TEXT_DIM, TEXT_MAIN};
use super::Component;
use crate::action::Action;
use crate::locale::{stat_label, type_color, type_label};
use crate::state::{AbilityDescription, EvolutionEntry, PokemonRecord, StatValue};

/// Largest bar drawn for a base stat; 255 is the API ceiling.
const STAT_BAR_WIDTH: usize = 20;
const STAT_CEILING: usize = 255;

pub struct DetailOverlay {
    modal: Modal,
}

impl Default for DetailOverlay {
    fn default() -> Self {
        Self {
            modal: Modal::new(),
        }
    }
}

impl DetailOverlay {
    pub fn new() -> Self {
        Self::default()
    }
}

pub struct DetailOverlayProps<'a> {
    pub record: Option<&'a PokemonRecord>,
    pub ability_texts: &'a DataResource<Vec<AbilityDescription>>,
    pub is_focused: bool,
}

impl Component<Action> for DetailOverlay {
    type Props<'a> = DetailOverlayProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused || props.record.is_none() {
            return Vec::new();
        }
        match event {
            EventKind::Key(key) => match key.code {
                KeyCode::Esc | KeyCode::Char('q') => vec![Action::DetailClose],
                _ => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let Some(record) = props.record else {
            return;
        };
        if area.width < 40 || area.height < 14 {
            return;
        }

        let modal_area = centered_rect(64, 20, area);
        let lines = detail_lines(record, props.ability_texts);
        let mut render_content = |frame: &mut Frame, content_area: Rect| {
            let paragraph = Paragraph::new(Text::from(lines.clone()))
                .wrap(Wrap { trim: false })
                .style(Style::default().fg(TEXT_MAIN));
            frame.render_widget(paragraph, content_area);
        };

        self.modal.render(
            frame,
            area,
            ModalProps {
                is_open: true,
                is_focused: props.is_focused,
                area: modal_area,
                style: ModalStyle {
                    base: BaseStyle {
                        bg: Some(BG_PANEL),
                        padding: Padding::xy(2, 1),
                        border: None,
                        fg: None,
                    },
                    ..Default::default()
                },
                behavior: ModalBehavior::default(),
                on_close: || Action::DetailClose,
                render_content: &mut render_content,
            },
        );
    }
}

fn detail_lines(
    record: &PokemonRecord,
    ability_texts: &DataResource<Vec<AbilityDescription>>,
) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                format_name(&record.name),
                Style::default()
                    .fg(ACCENT_TEAL)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  #{}", record.number),
                Style::default().fg(ACCENT_GOLD),
            ),
        ]),
        type_line(record),
        Line::default(),
    ];

    if !record.description.is_empty() {
        lines.push(Line::from(record.description.clone()));
        lines.push(Line::default());
    }

    let base_xp = record
        .base_experience
        .map(|xp| xp.to_string())
        .unwrap_or_else(|| "--".to_string());
    lines.push(Line::from(format!(
        "Height: {:.1} m   Weight: {:.1} kg   Base XP: {}",
        record.height_m, record.weight_kg, base_xp
    )));
    let cry = if record.cry_latest.is_some() || record.cry_legacy.is_some() {
        "available"
    } else {
        "--"
    };
    lines.push(Line::from(format!("Cry: {cry}")));
    lines.push(Line::default());

    lines.push(section_title("STATS"));
    for stat in &record.stats {
        lines.push(stat_line(stat));
    }
    lines.push(Line::default());

    lines.push(section_title("ABILITIES"));
    match ability_texts {
        DataResource::Loading => lines.push(Line::from(Span::styled(
            "Loading abilities...",
            Style::default().fg(TEXT_DIM),
        ))),
        DataResource::Loaded(texts) => {
            for text in texts {
                let mut title = vec![Span::styled(
                    format_name(&text.name),
                    Style::default().fg(TEXT_MAIN).add_modifier(Modifier::BOLD),
                )];
                if text.is_hidden {
                    title.push(Span::styled(" (Oculta)", Style::default().fg(ACCENT_GOLD)));
                }
                lines.push(Line::from(title));
                lines.push(Line::from(Span::styled(
                    format!("  {}", text.description),
                    Style::default().fg(TEXT_DIM),
                )));
            }
        }
        DataResource::Empty | DataResource::Failed(_) => {}
    }

    if record.evolution.len() > 1 {
        lines.push(Line::default());
        lines.push(section_title("EVOLUTION"));
        for entry in &record.evolution {
            lines.push(evolution_line(entry, &record.name));
        }
    }

    lines
}

fn type_line(record: &PokemonRecord) -> Line<'static> {
    let spans = record
        .types
        .iter()
        .map(|slug| {
            Span::styled(
                format!("[{}] ", type_label(slug)),
                Style::default()
                    .fg(type_color(slug))
                    .add_modifier(Modifier::BOLD),
            )
        })
        .collect::<Vec<_>>();
    Line::from(spans)
}

fn stat_line(stat: &StatValue) -> Line<'static> {
    let bar_len = (stat.value as usize * STAT_BAR_WIDTH / STAT_CEILING)
        .min(STAT_BAR_WIDTH)
        .max(1);
    Line::from(vec![
        Span::styled(
            format!("{:>12} ", stat_label(&stat.name)),
            Style::default().fg(TEXT_DIM),
        ),
        Span::styled(format!("{:>3} ", stat.value), Style::default().fg(TEXT_MAIN)),
        Span::styled("#".repeat(bar_len), Style::default().fg(ACCENT_TEAL)),
    ])
}

fn evolution_line(entry: &EvolutionEntry, current: &str) -> Line<'static> {
    let id = entry
        .url
        .trim_end_matches('/')
        .split('/')
        .last()
        .unwrap_or("unknown");
    let name_style = if entry.name == current {
        Style::default()
            .fg(ACCENT_TEAL)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(TEXT_MAIN)
    };
    Line::from(vec![
        Span::styled(format!("#{id:>4} "), Style::default().fg(ACCENT_GOLD)),
        Span::styled(format_name(&entry.name), name_style),
    ])
}

fn section_title(title: &'static str) -> Line<'static> {
    Line::from(Span::styled(
        title,
        Style::default()
            .fg(ACCENT_GOLD)
            .add_modifier(Modifier::BOLD),
    ))
}
