use crate::router::Tab;
use crate::state::{DestructiveAction, View};
use crate::ui::markup::{Node, el};
use crate::ui::{UiComponent, UiContext, region};

/// Header: tab bar, status messages and the pending confirmation
#[derive(Default)]
pub struct TopPanel;

impl UiComponent for TopPanel {
    fn show(&self, ui: &UiContext) -> Node {
        el("header")
            .class("top-panel")
            .child(el("h1").text("🎬 Lip-sync Studio"))
            .child(tabs(ui))
            .child(notifications(ui))
            .child(confirmation(ui))
            .into()
    }
}

pub(super) fn tabs(ui: &UiContext) -> Node {
    let buttons = Tab::all().into_iter().map(|tab| {
        let class = if tab == ui.active_tab { "tab active" } else { "tab" };
        el("button")
            .class(class)
            .attr("data-tab", tab.id())
            .text(tab.label())
    });
    region(View::Tabs).child(el("nav").children(buttons)).into()
}

pub(super) fn notifications(ui: &UiContext) -> Node {
    let items = ui.state.notifications().items().iter().map(|notice| {
        el("div")
            .class(format!("notice {}", notice.level.as_str()))
            .attr("data-notice-id", notice.id.to_string())
            .child(el("span").text(&notice.message))
            .child(
                el("button")
                    .class("dismiss")
                    .attr("data-notice-id", notice.id.to_string())
                    .text("×"),
            )
    });
    region(View::Notifications).children(items).into()
}

pub(super) fn confirmation(ui: &UiContext) -> Node {
    let Some(action) = ui.state.confirmation() else {
        return region(View::Confirmation).class("hidden").into();
    };
    let question = match action {
        DestructiveAction::DeleteAvatar(id) => {
            let name = ui.state.avatar(id).map_or(id.as_str(), |a| a.name.as_str());
            format!("Delete avatar \"{name}\"?")
        }
        DestructiveAction::DeleteProject(id) => {
            let name = ui
                .state
                .projects()
                .iter()
                .find(|p| &p.id == id)
                .map_or(id.as_str(), |p| p.name.as_str());
            format!("Delete project \"{name}\" and its video list?")
        }
        DestructiveAction::DeleteTag(id) => {
            let name = ui
                .state
                .tags()
                .iter()
                .find(|t| &t.id == id)
                .map_or(id.as_str(), |t| t.name.as_str());
            format!("Delete tag \"{name}\"?")
        }
    };
    region(View::Confirmation)
        .class("dialog")
        .child(el("p").text(question))
        .child(el("button").class("confirm danger").text("Delete"))
        .child(el("button").class("cancel").text("Cancel"))
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::fake::avatar;
    use crate::notifications::Level;
    use crate::state::ViewState;
    use crate::ui::tests::with_ui;
    use ls_core::Provider;
    use ls_core::ids::AvatarId;

    #[test]
    fn active_tab_is_marked() {
        let state = ViewState::new(20, Provider::ElevenLabs);
        let html = with_ui(&state, Tab::History, |ui| tabs(ui).render());
        assert!(html.contains("<button class=\"tab active\" data-tab=\"history\">History</button>"));
        assert_eq!(html.matches("tab active").count(), 1);
    }

    #[test]
    fn confirmation_names_the_target() {
        let mut state = ViewState::new(20, Provider::ElevenLabs);
        let _ = state.replace_avatars(vec![avatar("avatar_1", "Ana")]);
        let _ = state.request_confirmation(DestructiveAction::DeleteAvatar(AvatarId::new("avatar_1")));
        let html = with_ui(&state, Tab::Avatars, |ui| confirmation(ui).render());
        assert!(html.contains("Delete avatar &quot;Ana&quot;?"));
    }

    #[test]
    fn notices_carry_their_level() {
        let mut state = ViewState::new(20, Provider::ElevenLabs);
        let _ = state.notify(Level::Error, "Saldo insuficiente");
        let html = with_ui(&state, Tab::Single, |ui| notifications(ui).render());
        assert!(html.contains("notice error"));
        assert!(html.contains("Saldo insuficiente"));
    }
}
