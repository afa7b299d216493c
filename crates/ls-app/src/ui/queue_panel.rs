use crate::router::Tab;
use crate::state::{PendingStatus, View};
use crate::ui::format;
use crate::ui::markup::{Node, el};
use crate::ui::{UiComponent, UiContext, region};

/// Loading tab: requests in flight, what finished here, and the backend's jobs
#[derive(Default)]
pub struct QueuePanel;

impl UiComponent for QueuePanel {
    fn visible(&self, ui: &UiContext) -> bool {
        ui.active_tab == Tab::Loading
    }

    fn show(&self, ui: &UiContext) -> Node {
        el("main").class("queue-panel").child(timeline(ui)).into()
    }
}

pub(super) fn timeline(ui: &UiContext) -> Node {
    let state = ui.state;
    let section = region(View::Jobs).class("jobs");
    if state.pending().is_empty() && state.completed().is_empty() && state.jobs().is_empty() {
        return section
            .child(el("p").class("muted").text("No videos are being generated"))
            .into();
    }

    let pending = state.pending().iter().map(|job| {
        let elapsed = (ui.now - job.started_at).num_seconds().max(0) as f64;
        let card = el("article")
            .attr("data-correlation", job.correlation.to_string())
            .child(el("h4").text(&job.title))
            .child(el("p").class("excerpt").text(&job.excerpt));
        match &job.status {
            PendingStatus::Processing => card
                .class("job processing")
                .child(el("span").class("spinner"))
                .child(el("small").text(format!("Elapsed: {}", format::duration(elapsed)))),
            PendingStatus::Failed(error) => card
                .class("job failed")
                .child(el("span").text("❌"))
                .child(el("small").class("error").text(error)),
        }
    });

    let completed = state.completed().iter().map(|entry| {
        el("article")
            .class("job completed")
            .child(el("h4").text(format!("✅ {}", entry.title)))
            .child(el("small").text(format!(
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
    });

    let jobs = state.jobs().iter().map(|job| {
        let mut card = el("article")
            .class(format!("job backend {}", job.status.as_str()))
            .attr("data-job-id", job.id.as_str())
            .child(el("span").class("icon").text(job.status.icon()))
            .child(el("strong").text(job.status.label()))
            .child(
                el("progress")
                    .attr("max", "100")
                    .attr("value", format!("{:.0}", job.progress)),
            );
        if let Some(secs) = job.elapsed_secs(ui.now) {
            let label = if job.status.is_complete() { "Finished in" } else { "Elapsed:" };
            card = card.child(el("small").text(format!("{label} {}", format::duration(secs as f64))));
        }
        card
    });

    let has_failed = state
        .pending()
        .iter()
        .any(|p| matches!(p.status, PendingStatus::Failed(_)));
    let mut section = section
        .children(pending)
        .children(completed)
        .child(el("h3").text("Server jobs"))
        .children(jobs);
    if has_failed {
        section = section.child(el("button").class("clear-failed").text("Clear failed"));
    }
    section.into()
}
