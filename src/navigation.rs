use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use tracing::{debug, info};

use crate::model::{NavigationPath, PrimaryView, SecondaryOption};

pub const OPTION_SEPARATOR: &str = "   ";

#[derive(Debug, Clone, Default)]
pub struct NavigationController {
    active_view: Option<PrimaryView>,
    active_index: usize,
    active_option: Option<SecondaryOption>,
}

impl NavigationController {
    pub fn active_view(&self) -> Option<PrimaryView> {
        self.active_view
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn active_option(&self) -> Option<SecondaryOption> {
        self.active_option
    }

    pub fn active_path(&self) -> Option<NavigationPath> {
        Some(NavigationPath::new(self.active_view?, self.active_option?))
    }

    pub fn on_focus_change(&mut self, view: PrimaryView) -> bool {
        if self.active_view == Some(view) {
            return false;
        }
        info!("navigation switched to {view}");
        self.active_view = Some(view);
        self.active_index = 0;
        self.active_option = view.options().first().copied();
        true
    }

    pub fn ensure_active(&mut self) -> PrimaryView {
        match self.active_view {
            Some(view) => view,
            None => {
                self.on_focus_change(PrimaryView::ClusterInfo);
                PrimaryView::ClusterInfo
            }
        }
    }

    pub fn options(&self) -> &'static [SecondaryOption] {
        self.active_view.map(PrimaryView::options).unwrap_or(&[])
    }

    pub fn select_option(&mut self, index: usize) -> Option<SecondaryOption> {
        let option = *self.options().get(index)?;
        self.active_index = index;
        self.active_option = Some(option);
        Some(option)
    }

    pub fn select_offset(&mut self, offset: isize) -> Option<SecondaryOption> {
        let len = self.options().len();
        if len == 0 {
            return None;
        }
        let next = (self.active_index as isize + offset).rem_euclid(len as isize) as usize;
        self.select_option(next)
    }

    pub fn render(&self) -> Line<'static> {
        let mut spans = Vec::new();
        for (index, option) in self.options().iter().enumerate() {
            if index > 0 {
                spans.push(Span::raw(OPTION_SEPARATOR));
            }
            let color = if index == self.active_index {
                Color::Green
            } else {
                Color::White
            };
            spans.push(Span::styled(option.label(), Style::default().fg(color)));
        }
        Line::from(spans)
    }

    pub fn render_plain(&self) -> String {
        self.options()
            .iter()
            .map(|option| option.label())
            .collect::<Vec<_>>()
            .join(OPTION_SEPARATOR)
    }

    /// Half of the separator on each side of an option counts as part of it.
    /// When widened ranges overlap, the earlier option wins.
    pub fn hit_test(&self, column: usize) -> Option<usize> {
        let half_sep = (OPTION_SEPARATOR.chars().count() / 2) as isize;
        let column = column as isize;

        let starts = self.option_columns();
        for (index, (option, start)) in self.options().iter().zip(starts).enumerate() {
            let left = start as isize;
            let right = left + option.label().chars().count() as isize - 1;
            if column >= left - half_sep && column <= right + half_sep {
                debug!("navigation hit column {column} in option {index} [{left}, {right}]");
                return Some(index);
            }
        }

        debug!("navigation hit column {column} matched no option");
        None
    }

    pub fn option_columns(&self) -> Vec<usize> {
        let sep = OPTION_SEPARATOR.chars().count();
        let mut columns = Vec::new();
        let mut left = 0usize;
        for option in self.options() {
            columns.push(left);
            left += option.label().chars().count() + sep;
        }
        columns
    }
}

#[cfg(test)]
mod tests {
    use super::NavigationController;
    use crate::model::{PrimaryView, SecondaryOption};
    use ratatui::style::Color;

    fn focused(view: PrimaryView) -> NavigationController {
        let mut nav = NavigationController::default();
        nav.on_focus_change(view);
        nav
    }

    #[test]
    fn hit_test_recovers_every_option_across_its_span() {
        for view in PrimaryView::ALL {
            let nav = focused(view);
            for (index, start) in nav.option_columns().into_iter().enumerate() {
                let width = view.options()[index].label().chars().count();
                for column in start..start + width {
                    assert_eq!(nav.hit_test(column), Some(index), "{view} column {column}");
                }
            }
        }
    }

    #[test]
    fn hit_test_splits_separator_around_its_middle() {
        let nav = focused(PrimaryView::Pod);
        // "Log   Config   Top   Describe"
        assert_eq!(nav.hit_test(0), Some(0));
        assert_eq!(nav.hit_test(3), Some(0));
        assert_eq!(nav.hit_test(4), None);
        assert_eq!(nav.hit_test(5), Some(1));
        assert_eq!(nav.hit_test(200), None);
    }

    #[test]
    fn focus_change_resets_option_only_when_view_changes() {
        let mut nav = focused(PrimaryView::Deployment);
        assert_eq!(nav.select_option(3), Some(SecondaryOption::Describe));

        assert!(!nav.on_focus_change(PrimaryView::Deployment));
        assert_eq!(nav.active_index(), 3);

        assert!(nav.on_focus_change(PrimaryView::Service));
        assert_eq!(nav.active_index(), 0);
        assert_eq!(nav.active_option(), Some(SecondaryOption::Config));
    }

    #[test]
    fn out_of_range_option_is_ignored() {
        let mut nav = focused(PrimaryView::ClusterInfo);
        assert_eq!(nav.select_option(2), None);
        assert_eq!(nav.active_option(), Some(SecondaryOption::Nodes));

        let mut idle = NavigationController::default();
        assert_eq!(idle.select_option(0), None);
    }

    #[test]
    fn ensure_active_defaults_to_cluster_info() {
        let mut nav = NavigationController::default();
        assert_eq!(nav.ensure_active(), PrimaryView::ClusterInfo);
        assert_eq!(nav.active_option(), Some(SecondaryOption::Nodes));
    }

    #[test]
    fn render_emphasizes_active_option() {
        let mut nav = focused(PrimaryView::Service);
        nav.select_option(1);

        assert_eq!(nav.render_plain(), "Config   Pods   Pods Log   Top Pods");
        let line = nav.render();
        let colored = line
            .spans
            .iter()
            .filter(|span| span.style.fg == Some(Color::Green))
            .map(|span| span.content.to_string())
            .collect::<Vec<_>>();
        assert_eq!(colored, vec!["Pods".to_string()]);
    }

    #[test]
    fn offset_wraps_around_options() {
        let mut nav = focused(PrimaryView::ClusterInfo);
        assert_eq!(nav.select_offset(-1), Some(SecondaryOption::TopNodes));
        assert_eq!(nav.select_offset(1), Some(SecondaryOption::Nodes));
    }
}
