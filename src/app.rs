use chrono::{DateTime, Local};
use ratatui::layout::{Position, Rect};
use tracing::{debug, info};

use crate::dispatch::DetailDispatcher;
use crate::input::Action;
use crate::model::PrimaryView;
use crate::navigation::NavigationController;
use crate::panels::{DetailPane, PanelListing, listing_text};
use crate::query::ResourceQuery;
use crate::selection::SelectionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    None,
    RefreshDetail,
    RefreshAll,
}

impl AppCommand {
    fn merge(self, other: Self) -> Self {
        match (self, other) {
            (Self::RefreshAll, _) | (_, Self::RefreshAll) => Self::RefreshAll,
            (Self::RefreshDetail, _) | (_, Self::RefreshDetail) => Self::RefreshDetail,
            _ => Self::None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScreenRegions {
    pub panels: [Rect; 5],
    pub strip: Rect,
}

pub struct App {
    running: bool,
    show_help: bool,
    cluster: String,
    context: String,
    focused: PrimaryView,
    panels: [PanelListing; 5],
    panel_offsets: [usize; 5],
    nav: NavigationController,
    store: SelectionStore,
    detail: DetailPane,
    dispatcher: DetailDispatcher,
    regions: ScreenRegions,
    status: String,
    last_refresh: Option<DateTime<Local>>,
}

impl App {
    pub fn new(cluster: String, context: String, dispatcher: DetailDispatcher) -> Self {
        let mut app = Self {
            running: true,
            show_help: false,
            cluster,
            context,
            focused: PrimaryView::ClusterInfo,
            panels: Default::default(),
            panel_offsets: [0; 5],
            nav: NavigationController::default(),
            store: SelectionStore::default(),
            detail: DetailPane::default(),
            dispatcher,
            regions: ScreenRegions::default(),
            status: "Ready".to_string(),
            last_refresh: None,
        };
        app.nav.ensure_active();
        app
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn mode(&self) -> InputMode {
        if self.show_help {
            InputMode::Help
        } else {
            InputMode::Normal
        }
    }

    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn focused(&self) -> PrimaryView {
        self.focused
    }

    pub fn panel(&self, view: PrimaryView) -> &PanelListing {
        &self.panels[view.index()]
    }

    pub fn panel_offset(&self, view: PrimaryView) -> usize {
        self.panel_offsets[view.index()]
    }

    pub fn nav(&self) -> &NavigationController {
        &self.nav
    }

    pub fn store(&self) -> &SelectionStore {
        &self.store
    }

    pub fn detail(&self) -> &DetailPane {
        &self.detail
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    pub fn last_refresh(&self) -> Option<DateTime<Local>> {
        self.last_refresh
    }

    pub fn set_regions(&mut self, regions: ScreenRegions) {
        self.regions = regions;
    }

    pub fn sync_panel_viewport(&mut self, view: PrimaryView, visible: usize) {
        let cursor = self.panels[view.index()].cursor();
        let offset = &mut self.panel_offsets[view.index()];
        if visible == 0 || cursor < *offset {
            *offset = cursor;
        } else if cursor >= *offset + visible {
            *offset = cursor + 1 - visible;
        }
    }

    pub fn preselect_namespace(&mut self, namespace: &str) {
        let namespace = namespace.trim();
        if namespace.is_empty() {
            return;
        }
        self.store
            .set_selection(PrimaryView::Namespace, Some(namespace.to_string()));
        self.status = format!("Namespace: {namespace}");
    }

    pub fn apply_action(&mut self, action: Action) -> AppCommand {
        if self.show_help && !matches!(action, Action::ToggleHelp | Action::Quit) {
            self.show_help = false;
            if action == Action::CloseHelp {
                return AppCommand::None;
            }
        }

        match action {
            Action::Quit => {
                self.running = false;
                self.status = "Exit requested".to_string();
                AppCommand::None
            }
            Action::NextPanel => self.focus_by_offset(1),
            Action::PrevPanel => self.focus_by_offset(-1),
            Action::FocusPanel(index) => match PrimaryView::from_index(index) {
                Some(view) => self.focus(view),
                None => AppCommand::None,
            },
            Action::Down => {
                self.panels[self.focused.index()].move_cursor(1);
                AppCommand::None
            }
            Action::Up => {
                self.panels[self.focused.index()].move_cursor(-1);
                AppCommand::None
            }
            Action::Select => self.select_at_cursor(),
            Action::ClearSelection => {
                self.store.clear(self.focused);
                self.status = format!("Cleared {} selection", self.focused.resource_label());
                self.selection_changed()
            }
            Action::NextOption => self.step_option(1),
            Action::PrevOption => self.step_option(-1),
            Action::ScrollDetail(delta) => {
                self.detail.scroll_by(delta);
                AppCommand::None
            }
            Action::Refresh => {
                self.status = "Refreshing".to_string();
                AppCommand::RefreshAll
            }
            Action::ToggleHelp => {
                self.show_help = !self.show_help;
                AppCommand::None
            }
            Action::CloseHelp => AppCommand::None,
            Action::Click { column, row } => self.handle_click(column, row),
        }
    }

    pub fn focus(&mut self, view: PrimaryView) -> AppCommand {
        self.focused = view;
        if self.nav.on_focus_change(view) {
            self.detail.set_origin(0, 0);
            debug!("options for {view}: {}", self.nav.render_plain());
        }
        self.store.clear_on_focus(view);
        self.status = format!("Focused {}", view.title());
        AppCommand::RefreshDetail
    }

    pub fn click_navigation(&mut self, column: usize) -> AppCommand {
        let Some(index) = self.nav.hit_test(column) else {
            return AppCommand::None;
        };
        let Some(option) = self.nav.select_option(index) else {
            return AppCommand::None;
        };
        self.detail.set_origin(0, 0);
        self.status = format!("Showing {option}");
        AppCommand::RefreshDetail
    }

    pub async fn refresh_panels<Q: ResourceQuery>(&mut self, query: &Q) {
        for view in PrimaryView::ALL {
            let text = listing_text(view, &self.store, &self.context, query).await;
            self.panels[view.index()].set_content(text);
        }
        self.last_refresh = Some(Local::now());
    }

    pub async fn refresh_detail<Q: ResourceQuery>(&mut self, query: &Q) {
        self.dispatcher
            .refresh(&self.nav, &self.store, query, &mut self.detail)
            .await;
    }

    pub async fn on_tick<Q: ResourceQuery>(&mut self, query: &Q) {
        self.refresh_panels(query).await;
        if self.nav.active_option().is_some_and(|option| option.is_live()) {
            self.refresh_detail(query).await;
        }
    }

    pub async fn execute<Q: ResourceQuery>(&mut self, command: AppCommand, query: &Q) {
        match command {
            AppCommand::None => {}
            AppCommand::RefreshDetail => self.refresh_detail(query).await,
            AppCommand::RefreshAll => {
                self.refresh_panels(query).await;
                self.refresh_detail(query).await;
            }
        }
    }

    fn focus_by_offset(&mut self, offset: isize) -> AppCommand {
        let len = PrimaryView::ALL.len() as isize;
        let next = (self.focused.index() as isize + offset).rem_euclid(len) as usize;
        match PrimaryView::from_index(next) {
            Some(view) => self.focus(view),
            None => AppCommand::None,
        }
    }

    fn step_option(&mut self, offset: isize) -> AppCommand {
        match self.nav.select_offset(offset) {
            Some(option) => {
                self.detail.set_origin(0, 0);
                self.status = format!("Showing {option}");
                AppCommand::RefreshDetail
            }
            None => AppCommand::None,
        }
    }

    fn select_at_cursor(&mut self) -> AppCommand {
        let view = self.focused;
        let Some(row) = self.panels[view.index()].row_at_cursor() else {
            debug!("nothing to select in {view}");
            self.status = format!("No {} to select", view.resource_label());
            return AppCommand::None;
        };
        info!("selected {view} row: {}", row.trim());
        self.store.set_selection(view, Some(row));
        self.detail.set_origin(0, 0);
        self.status = format!("Selected {}", view.resource_label());
        self.selection_changed()
    }

    fn selection_changed(&self) -> AppCommand {
        if self.focused == PrimaryView::Namespace {
            AppCommand::RefreshAll
        } else {
            AppCommand::RefreshDetail
        }
    }

    fn handle_click(&mut self, column: u16, row: u16) -> AppCommand {
        let position = Position::new(column, row);
        let regions = self.regions;

        if regions.strip.contains(position) {
            return self.click_navigation(usize::from(column - regions.strip.x));
        }

        for view in PrimaryView::ALL {
            let area = regions.panels[view.index()];
            if !area.contains(position) {
                continue;
            }
            let command = if self.focused == view {
                AppCommand::None
            } else {
                self.focus(view)
            };
            // First inner line is the column header.
            if row == area.y {
                return command;
            }
            let target = self.panel_offsets[view.index()] + usize::from(row - area.y - 1);
            if !self.panels[view.index()].set_cursor(target) {
                debug!("click on {view} row {target} is past the listing");
                return command;
            }
            return command.merge(self.select_at_cursor());
        }

        AppCommand::None
    }
}

#[cfg(test)]
mod tests {
    use super::{App, AppCommand, InputMode, ScreenRegions};
    use crate::dispatch::DetailDispatcher;
    use crate::input::Action;
    use crate::model::{PrimaryView, SecondaryOption};
    use crate::query::QueryVerb;
    use crate::query::testing::RecordingQuery;
    use ratatui::layout::Rect;

    fn app() -> App {
        App::new(
            "https://cluster".to_string(),
            "dev".to_string(),
            DetailDispatcher::default(),
        )
    }

    #[test]
    fn starts_on_cluster_info_nodes() {
        let app = app();
        assert_eq!(app.focused(), PrimaryView::ClusterInfo);
        assert_eq!(app.nav().active_option(), Some(SecondaryOption::Nodes));
    }

    #[test]
    fn refocusing_same_panel_keeps_option() {
        let mut app = app();
        app.apply_action(Action::NextOption);
        assert_eq!(app.nav().active_index(), 1);

        let cmd = app.apply_action(Action::FocusPanel(0));
        assert_eq!(cmd, AppCommand::RefreshDetail);
        assert_eq!(app.nav().active_index(), 1);

        app.apply_action(Action::FocusPanel(4));
        assert_eq!(app.nav().active_index(), 0);
        assert_eq!(app.nav().active_option(), Some(SecondaryOption::Log));
    }

    #[test]
    fn tab_wraps_around_panels() {
        let mut app = app();
        app.apply_action(Action::PrevPanel);
        assert_eq!(app.focused(), PrimaryView::Pod);
        app.apply_action(Action::NextPanel);
        assert_eq!(app.focused(), PrimaryView::ClusterInfo);
    }

    #[test]
    fn strip_click_selects_option_and_resets_scroll() {
        let mut app = app();
        app.set_regions(ScreenRegions {
            strip: Rect::new(30, 1, 60, 1),
            ..ScreenRegions::default()
        });

        let cmd = app.apply_action(Action::Click { column: 39, row: 1 });
        assert_eq!(cmd, AppCommand::RefreshDetail);
        assert_eq!(app.nav().active_option(), Some(SecondaryOption::TopNodes));
        assert_eq!(app.detail().origin(), (0, 0));

        let cmd = app.apply_action(Action::Click { column: 36, row: 1 });
        assert_eq!(cmd, AppCommand::None);
        assert_eq!(app.nav().active_index(), 1);
    }

    #[tokio::test]
    async fn panel_click_focuses_and_selects_row() {
        let query = RecordingQuery::default().respond(
            QueryVerb::Get,
            None,
            "NAME   STATUS   AGE\ndefault   Active   1d\nops   Active   2d\n",
        );
        let mut app = app();
        app.refresh_panels(&query).await;

        let mut panels = [Rect::default(); 5];
        panels[1] = Rect::new(1, 10, 28, 6);
        app.set_regions(ScreenRegions {
            panels,
            ..ScreenRegions::default()
        });

        let cmd = app.apply_action(Action::Click { column: 4, row: 12 });
        assert_eq!(cmd, AppCommand::RefreshAll);
        assert_eq!(app.focused(), PrimaryView::Namespace);
        assert_eq!(
            app.store().namespace_selection(),
            Some("ops   Active   2d")
        );
    }

    #[test]
    fn focusing_a_panel_clears_other_row_picks() {
        let mut app = app();
        app.preselect_namespace("team-a");
        app.apply_action(Action::FocusPanel(3));
        app.store.set_selection(PrimaryView::Deployment, Some("web".to_string()));

        app.apply_action(Action::FocusPanel(4));
        assert_eq!(app.store().selection(PrimaryView::Deployment), None);
        assert_eq!(app.store().namespace_selection(), Some("team-a"));
    }

    #[test]
    fn help_swallows_next_key() {
        let mut app = app();
        app.apply_action(Action::ToggleHelp);
        assert_eq!(app.mode(), InputMode::Help);
        assert_eq!(app.apply_action(Action::CloseHelp), AppCommand::None);
        assert_eq!(app.mode(), InputMode::Normal);
    }

    #[tokio::test]
    async fn tick_refreshes_detail_only_for_live_options() {
        let query = RecordingQuery::default();
        let mut app = app();

        app.on_tick(&query).await;
        let static_count = query.recorded().len();

        app.apply_action(Action::NextOption);
        app.on_tick(&query).await;
        let requests = query.recorded();
        assert_eq!(requests.len(), static_count * 2 + 1);
        assert_eq!(requests.last().map(|r| r.verb), Some(QueryVerb::TopNode));
    }

    #[test]
    fn viewport_follows_cursor() {
        let mut app = app();
        app.panels[4].set_content(
            (0..10)
                .map(|index| format!("pod-{index}"))
                .fold("NAME".to_string(), |acc, row| format!("{acc}\n{row}")),
        );
        for _ in 0..6 {
            app.panels[4].move_cursor(1);
        }
        app.sync_panel_viewport(PrimaryView::Pod, 4);
        assert_eq!(app.panel_offset(PrimaryView::Pod), 3);
    }
}
