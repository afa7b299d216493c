use anyhow::{Context as _, bail};
use ls_app::app::App;
use ls_app::config::{ClientConfig, TransportKind};
use ls_app::gateway::{Gateway, HttpGateway};
use ls_app::router::Tab;
use ls_app::runtime::{Effect, Runtime};
use ls_app::ui::UiEvent;
use ls_core::ids::StoredVideoPath;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: ls-app [single|multi|loading|history|avatars|projects] [--watch] [--download PATH]";

struct Args {
    tab: Tab,
    watch: bool,
    download: Option<StoredVideoPath>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Args> {
    let mut parsed = Args {
        tab: Tab::default(),
        watch: false,
        download: None,
    };
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--watch" => parsed.watch = true,
            "--download" => {
                let path = args.next().context(USAGE)?;
                parsed.download = Some(StoredVideoPath::new(path));
            }
            "-h" | "--help" => bail!(USAGE),
            other => parsed.tab = other.parse()?,
        }
    }
    Ok(parsed)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ClientConfig::load()?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1))?;

    let gateway: Arc<dyn Gateway> = match config.transport {
        TransportKind::Http => Arc::new(HttpGateway::new(&config.api_url, config.request_timeout)?),
        TransportKind::Bridge => {
            bail!("the bridge transport needs a host application; set LIPSYNC_TRANSPORT=http")
        }
    };
    info!(url = %config.api_url, tab = %args.tab, watch = args.watch, "Starting");

    let mut runtime = Runtime::new(config.poll_interval);
    let mut app = App::new(gateway, config);
    let watch = args.watch;
    // Without --watch only gateway work runs, so the loop ends once every
    // reply has been applied
    let dispatch = |runtime: &mut Runtime, effects: Vec<Effect>| {
        runtime.dispatch(
            effects
                .into_iter()
                .filter(|e| watch || matches!(e, Effect::Task(_)))
                .collect(),
        );
    };

    let effects = app.bootstrap();
    dispatch(&mut runtime, effects);
    let effects = app.handle(UiEvent::ActivateTab(args.tab).into());
    dispatch(&mut runtime, effects);
    if let Some(path) = args.download {
        let effects = app.handle(UiEvent::DownloadVideo(path).into());
        dispatch(&mut runtime, effects);
    }

    while let Some(event) = runtime.next_event().await {
        let effects = app.handle(event);
        dispatch(&mut runtime, effects);
        if watch {
            for (id, html) in app.take_patches() {
                println!("<!-- #{id} -->{html}");
            }
        }
        for download in app.take_downloads() {
            let target = Path::new(&download.file_name);
            std::fs::write(target, &download.bytes)
                .with_context(|| format!("writing {}", target.display()))?;
            info!(file = %target.display(), bytes = download.bytes.len(), "Saved download");
        }
    }

    println!("{}", app.render());
    Ok(())
}
