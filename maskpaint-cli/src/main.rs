//! # Maskpaint
//!
//! Headless mask editing: load, replay, preview, spool.

use anyhow::Context;
use clap::Parser;
use maskpaint_cli::{CliArgs, DirectoryInpaintService, FileImageProvider, Script, StudioConfig};
use maskpaint_renderer::{
    EditorSession, MaskExporter, PngRasterEncoder, SourceImage, SubmitOutcome, UNTOUCHED_MESSAGE,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,maskpaint_core=debug,maskpaint_renderer=debug")
    });

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true);

    // JSON lines when RUST_LOG_FORMAT=json
    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = StudioConfig::from(CliArgs::parse());
    tracing::info!(
        "Container {}px at dpr {}, output {:?}",
        config.container_width,
        config.device_pixel_ratio,
        config.output
    );

    tokio::fs::create_dir_all(&config.output)
        .await
        .with_context(|| format!("creating {}", config.output.display()))?;

    let mut session = EditorSession::new(config.editor, config.preview)
        .with_exporter(MaskExporter::new(Box::new(PngRasterEncoder::new(
            config.compression,
        ))));
    session.resize_container(config.container_width, config.device_pixel_ratio);

    if config.input.starts_with("data:") {
        let source = SourceImage::from_data_uri(&config.input)?;
        session.load_source(source)?;
    } else {
        session.load_from(&FileImageProvider, &config.input).await?;
    }

    if let Some(path) = &config.script {
        let script = Script::load(path)
            .await
            .with_context(|| format!("loading {}", path.display()))?;
        let service = DirectoryInpaintService::new(&config.output);
        let report = script.run(&mut session, &service, &config.cover_id).await;

        tracing::info!(
            "Replayed {} steps: {} repaints, {} refused, {} submitted, {} failed",
            script.steps.len(),
            report.repaints,
            report.rejected,
            report.submissions.len(),
            report.failed_submissions
        );
        for outcome in &report.submissions {
            match outcome {
                SubmitOutcome::Untouched => println!("{UNTOUCHED_MESSAGE}"),
                SubmitOutcome::Edited { image_url } => println!("{image_url}"),
            }
        }
    }

    let surface = session.render();
    let preview = config.preview_path();
    surface
        .pixels()
        .save(&preview)
        .with_context(|| format!("writing {}", preview.display()))?;
    tracing::info!("Preview written to {:?}", preview);

    Ok(())
}
