use crate::state::View;
use crate::ui::markup::{Node, el};
use crate::ui::{UiComponent, UiContext, region};

const SERVICES: [(&str, &str); 4] = [
    ("elevenlabs", "ElevenLabs"),
    ("minimax", "MiniMax"),
    ("gemini", "Gemini"),
    ("wavespeed", "WaveSpeed"),
];

#[derive(Default)]
pub struct SidePanel;

impl UiComponent for SidePanel {
    fn show(&self, ui: &UiContext) -> Node {
        el("aside")
            .class("side-panel")
            .child(config_status(ui))
            .child(tags(ui))
            .child(sidebar_projects(ui))
            .into()
    }
}

pub(super) fn config_status(ui: &UiContext) -> Node {
    let Some(status) = ui.state.config_status() else {
        return region(View::ConfigStatus)
            .child(el("p").class("muted").text("Checking API keys..."))
            .into();
    };
    let rows = SERVICES.iter().map(|(key, label)| {
        let configured = status.is_configured(key);
        let detail = match status.masked(key) {
            Some(masked) if configured => masked.to_string(),
            _ if configured => "configured".to_string(),
            _ => "not configured".to_string(),
        };
        el("li")
            .class(if configured { "key ok" } else { "key missing" })
            .child(el("span").text(if configured { "✅" } else { "⚠️" }))
            .child(el("strong").text(*label))
            .child(el("small").text(detail))
    });
    region(View::ConfigStatus)
        .child(el("h3").text("API keys"))
        .child(el("ul").children(rows))
        .into()
}

pub(super) fn tags(ui: &UiContext) -> Node {
    let selected = ui.state.selected_tag();
    let all = el("button")
        .class(if selected.is_none() { "tag active" } else { "tag" })
        .attr("data-tag", "")
        .text("All");
    let chips = ui.state.tags().iter().map(|tag| {
        let active = selected == Some(tag.name.as_str());
        el("span")
            .class("tag-chip")
            .child(
                el("button")
                    .class(if active { "tag active" } else { "tag" })
                    .attr("data-tag", &tag.name)
                    .attr("style", format!("border-color: {}", tag.color))
                    .text(&tag.name),
            )
            .child(
                el("button")
                    .class("delete-tag")
                    .attr("data-tag-id", tag.id.as_str())
                    .text("×"),
            )
    });
    region(View::Tags)
        .child(el("h3").text("Tags"))
        .child(all)
        .children(chips)
        .into()
}

pub(super) fn sidebar_projects(ui: &UiContext) -> Node {
    let selected = ui.state.selected_project();
    let items = ui.state.projects().iter().map(|project| {
        let class = if selected == Some(&project.id) { "project active" } else { "project" };
        el("li")
            .class(class)
            .attr("data-project-id", project.id.as_str())
            .text(format!("📁 {} ({})", project.name, project.videos.len()))
    });
    let mut section = region(View::SidebarProjects).child(el("h3").text("Projects"));
    section = if ui.state.projects().is_empty() {
        section.child(el("p").class("muted").text("No projects yet"))
    } else {
        section.child(el("ul").children(items))
    };
    section.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::Tab;
    use crate::state::ViewState;
    use crate::ui::tests::with_ui;
    use ls_core::Provider;
    use ls_core::credentials::ConfigStatus;
    use ls_core::ids::TagId;
    use ls_core::project::Tag;

    #[test]
    fn masked_key_is_shown_for_configured_services() {
        let mut state = ViewState::new(20, Provider::ElevenLabs);
        let mut status = ConfigStatus::default();
        status.keys.insert("elevenlabs".into(), true);
        status
            .masked_keys
            .insert("elevenlabs".into(), Some("sk-1****abcd".into()));
        let _ = state.set_config_status(status);

        let html = with_ui(&state, Tab::Single, |ui| config_status(ui).render());
        assert!(html.contains("sk-1****abcd"));
        assert_eq!(html.matches("not configured").count(), 3);
    }

    #[test]
    fn selected_tag_is_highlighted() {
        let mut state = ViewState::new(20, Provider::ElevenLabs);
        let _ = state.replace_tags(vec![
            Tag { id: TagId::new("tag_1"), name: "ads".into(), color: "#ff0000".into() },
            Tag { id: TagId::new("tag_2"), name: "promo".into(), color: "#00ff00".into() },
        ]);
        let _ = state.set_selected_tag(Some("promo".into()));
        let html = with_ui(&state, Tab::Projects, |ui| tags(ui).render());
        assert!(html.contains("class=\"tag active\" data-tag=\"promo\""));
        assert!(html.contains("class=\"tag\" data-tag=\"\""));
    }
}
