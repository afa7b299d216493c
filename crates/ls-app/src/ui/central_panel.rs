use crate::router::Tab;
use crate::state::{BatchImage, Context, ImageSource, View};
use crate::ui::avatar_panel::thumbnail;
use crate::ui::format;
use crate::ui::markup::{Element, Node, el};
use crate::ui::{UiComponent, UiContext, region};
use ls_core::Provider;
use ls_core::script::{BatchImageMode, BatchKey, excerpt};

/// The two generation tabs
#[derive(Default)]
pub struct CentralPanel;

impl UiComponent for CentralPanel {
    fn visible(&self, ui: &UiContext) -> bool {
        matches!(ui.active_tab, Tab::Single | Tab::Multi)
    }

    fn show(&self, ui: &UiContext) -> Node {
        let main = el("main").class("central-panel");
        match ui.active_tab {
            Tab::Multi => main
                .child(image_source(ui, Context::Multi))
                .child(voices(ui, Context::Multi))
                .child(
                    el("textarea")
                        .attr("name", "scripts_text")
                        .attr("placeholder", "One script per block, separated by ---")
                        .text(ui.state.scripts_text()),
                )
                .child(el("button").class("estimate").text("💰 Estimate cost"))
                .child(el("button").class("preview").text("👁 Preview scripts"))
                .child(estimate(ui))
                .child(preview(ui))
                .child(batch_results(ui))
                .into(),
            _ => main
                .child(image_source(ui, Context::Single))
                .child(voices(ui, Context::Single))
                .child(single_form(ui))
                .child(estimate(ui))
                .child(single_result(ui))
                .into(),
        }
    }
}

fn image_source(ui: &UiContext, ctx: Context) -> Node {
    let source = ui.state.context(ctx).image_source();
    let option = |value: ImageSource, label: &str| {
        el("label").child(
            el("input")
                .attr("type", "radio")
                .attr("name", format!("image-source-{}", ctx.as_str()))
                .attr("value", match value {
                    ImageSource::Upload => "upload",
                    ImageSource::Avatar => "avatar",
                })
                .flag("checked", source == value),
        )
        .text(label)
    };
    el("div")
        .class("image-source")
        .child(option(ImageSource::Upload, "Upload images"))
        .child(option(ImageSource::Avatar, "Use an avatar"))
        .child(image_previews(ui, ctx))
        .child(avatar_selector(ui, ctx))
        .into()
}

pub(super) fn image_previews(ui: &UiContext, ctx: Context) -> Node {
    let context = ui.state.context(ctx);
    let mut section = region(View::ImagePreviews(ctx));
    if context.image_source() != ImageSource::Upload {
        return section.class("hidden").into();
    }
    if context.images().is_empty() {
        section = section.child(el("p").class("muted").text("No images selected"));
    }
    let previews = context.images().iter().map(|img| {
        el("figure")
            .class("image-preview")
            .child(el("img").attr("src", &img.preview_data_uri).attr("alt", &img.file_name))
            .child(el("figcaption").text(format!(
                "{} ({})",
                img.file_name,
                format::file_size(img.size() as u64)
            )))
            .child(
                el("button")
                    .class("remove-image")
                    .attr("data-image-id", img.id.to_string())
                    .text("×"),
            )
    });
    section.children(previews).into()
}

pub(super) fn avatar_selector(ui: &UiContext, ctx: Context) -> Node {
    let context = ui.state.context(ctx);
    let section = region(View::AvatarSelector(ctx));
    if context.image_source() != ImageSource::Avatar {
        return section.class("hidden").into();
    }
    if ui.state.avatars().is_empty() {
        return section
            .child(el("p").class("muted").text("No avatars yet. Create one in the Avatars tab."))
            .into();
    }
    let selected = context.selected_avatar();
    let cards = ui.state.avatars().iter().map(|avatar| {
        let class = if selected == Some(&avatar.id) { "avatar-option selected" } else { "avatar-option" };
        el("button")
            .class(class)
            .attr("data-avatar-id", avatar.id.as_str())
            .child(thumbnail(ui, avatar))
            .child(el("span").text(&avatar.name))
    });
    section.class("avatar-grid").children(cards).into()
}

fn provider_select(ctx: Context, current: Provider) -> Element {
    el("select")
        .attr("name", format!("provider-{}", ctx.as_str()))
        .children(Provider::all().into_iter().map(|p| {
            el("option")
                .attr("value", p.id())
                .flag("selected", p == current)
                .text(p.name())
        }))
}

fn voice_options<'a>(voices: &'a [String], selected: Option<&'a str>) -> impl Iterator<Item = Element> + 'a {
    voices.iter().map(move |voice| {
        el("option")
            .attr("value", voice)
            .flag("selected", selected == Some(voice.as_str()))
            .text(voice)
    })
}

pub(super) fn voices(ui: &UiContext, ctx: Context) -> Node {
    let context = ui.state.context(ctx);
    let mut section = region(View::Voices(ctx))
        .class("voices")
        .child(provider_select(ctx, context.provider()));
    if context.voices().is_empty() {
        return section
            .child(el("p").class("muted").text(format!(
                "No voices available for {}",
                context.provider().name()
            )))
            .into();
    }
    section = match ctx {
        Context::Single => section.child(
            el("select")
                .attr("name", "voice")
                .children(voice_options(context.voices(), ui.state.single_voice())),
        ),
        Context::Multi => section.child(el("small").text(format!(
            "{} voices available",
            context.voices().len()
        ))),
    };
    section.into()
}

pub(super) fn single_form(ui: &UiContext) -> Node {
    let text = ui.state.single_text();
    region(View::SingleForm)
        .child(
            el("textarea")
                .attr("name", "single_text")
                .attr("placeholder", "Text to be spoken")
                .text(text),
        )
        .child(el("small").text(format!("{} characters", text.chars().count())))
        .child(
            el("button")
                .class("generate")
                .flag("disabled", text.trim().is_empty())
                .text("🎬 Generate video"),
        )
        .into()
}

fn video(path: &str) -> Element {
    el("video")
        .attr("controls", "controls")
        .attr("data-path", path)
}

pub(super) fn single_result(ui: &UiContext) -> Node {
    let section = region(View::SingleResult);
    let Some(entry) = ui.state.single_result() else {
        return section.into();
    };
    section
        .class("result")
        .child(el("h3").text("✅ Video ready"))
        .child(video(entry.video_path.as_str()))
        .child(el("p").text(format!(
            "{} · {}",
            entry.video_path.file_name(),
            format::duration(entry.duration)
        )))
        .child(
            el("button")
                .class("download")
                .attr("data-path", entry.video_path.as_str())
                .text("⬇ Download"),
        )
        .into()
}

pub(super) fn estimate(ui: &UiContext) -> Node {
    let ctx = if ui.active_tab == Tab::Multi { Context::Multi } else { Context::Single };
    let section = region(View::Estimate);
    let Some(est) = ui.state.context(ctx).estimate() else {
        return section.into();
    };
    let row = |label: &str, value: String| {
        el("tr")
            .child(el("th").text(label))
            .child(el("td").text(value))
    };
    section
        .class("estimate-card")
        .child(
            el("table")
                .child(row("Videos", est.num_videos.to_string()))
                .child(row("Batches", est.num_batches.to_string()))
                .child(row("Characters", est.num_chars.to_string()))
                .child(row("Estimated time", est.estimated_time.clone()))
                .child(row("Estimated cost", est.estimated_cost.total.clone())),
        )
        .into()
}

fn batch_image_select(ui: &UiContext, key: BatchKey) -> Element {
    let assigned = ui.state.batch_image(key);
    let option = |value: String, label: String, selected: bool| {
        el("option")
            .attr("value", value)
            .flag("selected", selected)
            .text(label)
    };
    let mut select = el("select")
        .attr("name", "batch-image")
        .attr("data-batch", key.to_string())
        .child(option(String::new(), "Choose an image".into(), assigned.is_none()))
        .child(option(
            "shared".into(),
            "Shared image".into(),
            assigned == Some(&BatchImage::Shared),
        ));
    for avatar in ui.state.avatars() {
        let selected = matches!(assigned, Some(BatchImage::Avatar(id)) if id == &avatar.id);
        select = select.child(option(
            format!("avatar:{}", avatar.id),
            format!("👤 {}", avatar.name),
            selected,
        ));
    }
    for img in ui.state.context(Context::Multi).images() {
        let selected = assigned == Some(&BatchImage::Upload(img.id));
        select = select.child(option(
            format!("upload:{}", img.id),
            format!("🖼 {}", img.file_name),
            selected,
        ));
    }
    select
}

pub(super) fn preview(ui: &UiContext) -> Node {
    let section = region(View::Preview);
    let Some(preview) = ui.state.preview() else {
        return section
            .child(el("p").class("muted").text("Run a preview to see how the scripts are split"))
            .into();
    };
    let mode = ui.state.batch_image_mode();
    let individual = mode == BatchImageMode::Individual;
    let voices = ui.state.context(Context::Multi).voices();

    let mode_toggle = el("div").class("batch-image-mode").children(
        [BatchImageMode::Fixed, BatchImageMode::Individual].map(|m| {
            el("label")
                .child(
                    el("input")
                        .attr("type", "radio")
                        .attr("name", "batch-image-mode")
                        .attr("value", m.as_str())
                        .flag("checked", m == mode),
                )
                .text(match m {
                    BatchImageMode::Fixed => "Same image for every batch",
                    BatchImageMode::Individual => "One image per batch",
                })
        }),
    );

    let scripts = preview.scripts.iter().enumerate().map(|(idx, script)| {
        let selected = ui
            .state
            .voice_selections()
            .get(idx)
            .and_then(|v| v.as_deref());
        let batches = script.batches.iter().map(|batch| {
            let key = BatchKey::new(script.id, batch.batch_number);
            let mut item = el("li")
                .class("batch")
                .attr("data-batch", key.to_string())
                .child(el("strong").text(format!("Batch {}", batch.batch_number)))
                .child(el("span").text(excerpt(&batch.text, 120)))
                .child(el("small").text(format!("{} chars", batch.char_count)));
            if individual {
                item = item.child(batch_image_select(ui, key));
            }
            item
        });
        el("article")
            .class("script")
            .attr("data-script-id", script.id.to_string())
            .child(el("h4").text(format!(
                "Script {} · {} chars · {} batches",
                script.id,
                script.total_chars,
                script.batches.len()
            )))
            .child(
                el("select")
                    .attr("name", "script-voice")
                    .attr("data-script-index", idx.to_string())
                    .children(voice_options(voices, selected)),
            )
            .child(el("ol").children(batches))
    });

    section
        .child(el("p").class("summary").text(format!(
            "{} scripts · {} batches · {} characters",
            preview.summary.total_scripts, preview.summary.total_batches, preview.summary.total_chars
        )))
        .child(mode_toggle)
        .children(scripts)
        .child(el("button").class("generate").text("🎬 Generate all videos"))
        .into()
}

pub(super) fn batch_results(ui: &UiContext) -> Node {
    let results = ui.state.batch_results();
    let section = region(View::BatchResults);
    if results.is_empty() {
        return section.into();
    }
    let items = results.iter().map(|result| {
        let item = el("li").attr("data-script-id", result.script_id.to_string());
        match (&result.video_path, result.success) {
            (Some(path), true) => item
                .class("result ok")
                .child(el("strong").text(format!("✅ Script {}", result.script_id)))
                .child(video(path.as_str()))
                .child(el("small").text(format::duration(result.duration.unwrap_or_default()))),
            _ => item
                .class("result failed")
                .child(el("strong").text(format!("❌ Script {}", result.script_id)))
                .child(el("span").text(result.error_message())),
        }
    });
    section.child(el("ul").children(items)).into()
}
