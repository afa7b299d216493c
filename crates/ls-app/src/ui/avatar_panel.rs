use crate::router::Tab;
use crate::state::{Thumbnail, View};
use crate::ui::format;
use crate::ui::markup::{Node, el};
use crate::ui::{UiComponent, UiContext, region};
use ls_core::avatar::Avatar;

#[derive(Default)]
pub struct AvatarPanel;

impl UiComponent for AvatarPanel {
    fn visible(&self, ui: &UiContext) -> bool {
        ui.active_tab == Tab::Avatars
    }

    fn show(&self, ui: &UiContext) -> Node {
        el("main")
            .class("avatar-panel")
            .child(
                el("form")
                    .class("create-avatar")
                    .child(el("input").attr("type", "text").attr("name", "avatar_name").attr("placeholder", "Avatar name"))
                    .child(el("input").attr("type", "file").attr("name", "avatar_image").attr("accept", "image/*"))
                    .child(el("button").attr("type", "submit").text("➕ Create avatar")),
            )
            .child(gallery(ui))
            .into()
    }
}

/// Cached picture of `avatar`, or a placeholder while it loads or when it failed
pub(super) fn thumbnail(ui: &UiContext, avatar: &Avatar) -> Node {
    match ui.thumbnails.get(&avatar.id) {
        Some(Thumbnail::Ready(uri)) => el("img")
            .class("thumb")
            .attr("src", uri)
            .attr("alt", &avatar.name)
            .into(),
        Some(Thumbnail::Loading) => el("div").class("thumb loading").into(),
        Some(Thumbnail::Failed) | None => {
            let initial = avatar
                .name
                .chars()
                .next()
                .map(|c| c.to_uppercase().to_string())
                .unwrap_or_else(|| "?".to_string());
            el("div").class("thumb placeholder").text(initial).into()
        }
    }
}

pub(super) fn gallery(ui: &UiContext) -> Node {
    let avatars = ui.state.avatars();
    let section = region(View::AvatarGallery).class("avatar-gallery");
    if avatars.is_empty() {
        return section
            .child(el("p").class("muted").text("No avatars yet"))
            .into();
    }
    let cards = avatars.iter().map(|avatar| {
        let variants = avatar.images.len().max(1);
        el("article")
            .class("avatar-card")
            .attr("data-avatar-id", avatar.id.as_str())
            .child(thumbnail(ui, avatar))
            .child(el("h4").text(&avatar.name))
            .child(el("small").text(format!(
                "{} · {} image{}",
                format::date(avatar.created_at),
                variants,
                if variants == 1 { "" } else { "s" }
            )))
            .child(
                el("button")
                    .class("delete danger")
                    .attr("data-avatar-id", avatar.id.as_str())
                    .text("🗑 Delete"),
            )
    });
    section.children(cards).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::fake::{PNG_1X1, avatar};
    use crate::state::{ThumbnailCache, ViewState};
    use crate::ui::UiContext;
    use chrono::Utc;
    use ls_core::Provider;
    use ls_core::ids::AvatarId;

    #[test]
    fn thumbnails_fall_back_to_placeholder() {
        let mut state = ViewState::new(20, Provider::ElevenLabs);
        let _ = state.replace_avatars(vec![
            avatar("avatar_1", "ana"),
            avatar("avatar_2", "Bia"),
            avatar("avatar_3", "Caio"),
        ]);
        let mut thumbnails = ThumbnailCache::default();
        let claimed = thumbnails.claim_missing(state.avatars().iter().map(|a| &a.id));
        assert_eq!(claimed.len(), 3);
        thumbnails.store(AvatarId::new("avatar_1"), Ok(PNG_1X1.to_vec()));
        thumbnails.store(AvatarId::new("avatar_2"), Ok(b"not an image".to_vec()));

        let ui = UiContext {
            state: &state,
            thumbnails: &thumbnails,
            active_tab: Tab::Avatars,
            now: Utc::now(),
        };
        let html = gallery(&ui).render();
        assert!(html.contains("src=\"data:image/png;base64,"));
        assert!(html.contains("<div class=\"thumb placeholder\">B</div>"));
        assert!(html.contains("<div class=\"thumb loading\"></div>"));
    }
}
