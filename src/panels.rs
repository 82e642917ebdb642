use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span, Text};

use crate::model::PrimaryView;
use crate::query::{QueryRequest, ResourceQuery};
use crate::resolver::selected_namespace;
use crate::selection::SelectionStore;

#[derive(Debug, Clone, Default)]
pub struct DetailPane {
    content: String,
    highlight: Option<String>,
    origin: (u16, u16),
}

impl DetailPane {
    pub fn clear(&mut self) {
        self.content.clear();
        self.highlight = None;
    }

    pub fn write(&mut self, text: &str) {
        self.content.push_str(text);
    }

    pub fn paint(&mut self, text: &str, highlight: Option<&str>) {
        self.write(text);
        self.highlight = highlight.map(str::to_string);
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn origin(&self) -> (u16, u16) {
        self.origin
    }

    pub fn set_origin(&mut self, x: u16, y: u16) {
        self.origin = (x, y);
    }

    pub fn scroll_by(&mut self, delta: isize) {
        let max = self.content.lines().count().saturating_sub(1) as isize;
        let next = (self.origin.1 as isize + delta).clamp(0, max.max(0));
        self.origin.1 = next as u16;
    }

    pub fn text(&self) -> Text<'static> {
        highlight_first(&self.content, self.highlight.as_deref())
    }
}

#[derive(Debug, Clone, Default)]
pub struct PanelListing {
    content: String,
    cursor: usize,
}

impl PanelListing {
    pub fn set_content(&mut self, content: String) {
        self.content = content;
        self.cursor = self.cursor.min(self.row_count().saturating_sub(1));
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn rows(&self) -> Vec<&str> {
        self.content
            .lines()
            .skip(1)
            .filter(|line| !line.trim().is_empty())
            .collect()
    }

    pub fn row_count(&self) -> usize {
        self.rows().len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let max = self.row_count().saturating_sub(1) as isize;
        self.cursor = (self.cursor as isize + delta).clamp(0, max.max(0)) as usize;
    }

    pub fn set_cursor(&mut self, row: usize) -> bool {
        if row >= self.row_count() {
            return false;
        }
        self.cursor = row;
        true
    }

    pub fn row_at_cursor(&self) -> Option<String> {
        self.rows().get(self.cursor).map(|row| row.to_string())
    }
}

pub async fn listing_text<Q: ResourceQuery>(
    view: PrimaryView,
    store: &SelectionStore,
    context: &str,
    query: &Q,
) -> String {
    let Some(kind) = view.listing_kind() else {
        return format!("Current Context: {context}");
    };
    if view == PrimaryView::Namespace {
        return query.execute(&QueryRequest::get(kind)).await;
    }

    let mut request = QueryRequest::get(kind);
    if view == PrimaryView::Pod {
        request = request.flag("output", "wide");
    }
    request = match store.namespace_selection().map(selected_namespace) {
        Some(namespace) if !namespace.is_empty() => request.in_namespace(&namespace),
        _ => request.flag("all-namespaces", "true"),
    };
    query.execute(&request).await
}

/// Renders `content`, recoloring the first occurrence of `needle` green.
pub fn highlight_first(content: &str, needle: Option<&str>) -> Text<'static> {
    let target = needle
        .filter(|needle| !needle.is_empty() && !needle.contains('\n'))
        .and_then(|needle| content.find(needle).map(|start| (start, start + needle.len())));

    let mut lines = Vec::new();
    let mut offset = 0usize;
    for raw in content.split('\n') {
        let line_start = offset;
        let line_end = offset + raw.len();
        offset = line_end + 1;
        let raw = raw.strip_suffix('\r').unwrap_or(raw);

        match target {
            Some((start, end)) if start >= line_start && end <= line_end => {
                let local_start = (start - line_start).min(raw.len());
                let local_end = (end - line_start).min(raw.len());
                lines.push(Line::from(vec![
                    Span::raw(raw[..local_start].to_string()),
                    Span::styled(
                        raw[local_start..local_end].to_string(),
                        Style::default().fg(Color::Green),
                    ),
                    Span::raw(raw[local_end..].to_string()),
                ]));
            }
            _ => lines.push(Line::from(raw.to_string())),
        }
    }
    Text::from(lines)
}
