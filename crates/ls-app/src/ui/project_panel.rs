use crate::router::Tab;
use crate::state::View;
use crate::ui::format;
use crate::ui::markup::{Node, el};
use crate::ui::{UiComponent, UiContext, region};
use ls_core::project::Project;

#[derive(Default)]
pub struct ProjectPanel;

impl UiComponent for ProjectPanel {
    fn visible(&self, ui: &UiContext) -> bool {
        ui.active_tab == Tab::Projects
    }

    fn show(&self, ui: &UiContext) -> Node {
        el("main")
            .class("project-panel")
            .child(
                el("form")
                    .class("create-project")
                    .child(el("input").attr("type", "text").attr("name", "project_name").attr("placeholder", "Project name"))
                    .child(el("textarea").attr("name", "project_description").attr("placeholder", "Description"))
                    .child(el("input").attr("type", "text").attr("name", "project_tags").attr("placeholder", "Tags, comma separated"))
                    .child(el("button").attr("type", "submit").text("➕ Create project")),
            )
            .child(projects(ui))
            .into()
    }
}

fn detail(ui: &UiContext, project: &Project) -> Node {
    let tag_color = |name: &str| {
        ui.state
            .tags()
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.color.clone())
    };
    let tags = project.tags.iter().map(|name| {
        let chip = el("span").class("tag-chip").text(name);
        match tag_color(name) {
            Some(color) => chip.attr("style", format!("background: {color}")),
            None => chip,
        }
    });
    let videos = project.videos.iter().map(|video| {
        let name = if video.name.is_empty() { video.path.file_name() } else { video.name.as_str() };
        el("li")
            .attr("data-path", video.path.as_str())
            .text(format!("🎞 {name} · {}", format::duration(video.duration)))
    });
    el("div")
        .class("project-detail")
        .child(el("div").class("tags").children(tags))
        .child(el("ul").class("project-videos").children(videos))
        .into()
}

pub(super) fn projects(ui: &UiContext) -> Node {
    let list = ui.state.projects();
    let section = region(View::Projects);
    if list.is_empty() {
        let message = match ui.state.selected_tag() {
            Some(tag) => format!("No projects tagged \"{tag}\""),
            None => "No projects yet".to_string(),
        };
        return section.child(el("p").class("muted").text(message)).into();
    }
    let selected = ui.state.selected_project();
    let cards = list.iter().map(|project| {
        let is_selected = selected == Some(&project.id);
        let mut card = el("article")
            .class(if is_selected { "project-card selected" } else { "project-card" })
            .attr("data-project-id", project.id.as_str())
            .child(el("h4").text(&project.name))
            .child(el("small").text(format!(
                "{} videos · updated {}",
                project.videos.len(),
                format::date(project.updated_at.or(project.created_at))
            )));
        if let Some(description) = project.description() {
            card = card.child(el("p").text(description));
        }
        if is_selected {
            card = card.child(detail(ui, project));
        }
        card.child(
            el("button")
                .class("delete danger")
                .attr("data-project-id", project.id.as_str())
                .text("🗑 Delete"),
        )
    });
    section.children(cards).into()
}
