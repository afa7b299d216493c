use crate::router::Tab;
use crate::state::View;
use crate::ui::format;
use crate::ui::markup::{Node, el};
use crate::ui::{UiComponent, UiContext, region};

#[derive(Default)]
pub struct HistoryPanel;

impl UiComponent for HistoryPanel {
    fn visible(&self, ui: &UiContext) -> bool {
        ui.active_tab == Tab::History
    }

    fn show(&self, ui: &UiContext) -> Node {
        el("main").class("history-panel").child(grid(ui)).into()
    }
}

pub(super) fn grid(ui: &UiContext) -> Node {
    let history = ui.state.history();
    let section = region(View::History).class("history-grid");
    if history.is_empty() {
        return section
            .child(el("p").class("muted").text("No videos generated yet"))
            .into();
    }

    let projects = ui.state.projects();
    let cards = history.iter().map(|entry| {
        let mut card = el("article")
            .class("history-item")
            .attr("data-path", entry.path.as_str())
            .child(el("video").attr("controls", "controls").attr("data-path", entry.path.as_str()))
            .child(el("h4").text(&entry.name))
            .child(el("small").text(format!(
                "{} · {}",
                format::file_size(entry.size),
                format::date(entry.created_at)
            )))
            .child(
                el("button")
                    .class("download")
                    .attr("data-path", entry.path.as_str())
                    .text("⬇ Download"),
            );
        if !projects.is_empty() {
            card = card.child(
                el("select")
                    .attr("name", "add-to-project")
                    .attr("data-path", entry.path.as_str())
                    .child(el("option").attr("value", "").text("Add to project..."))
                    .children(projects.iter().map(|p| {
                        el("option").attr("value", p.id.as_str()).text(&p.name)
                    })),
            );
        }
        card
    });
    section.children(cards).into()
}
