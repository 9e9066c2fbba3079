use anyhow::{Context, Result, bail};
use clearpath_core::input::require_prompt;
use clearpath_core::{DeficiencyType, Dictation, STEPS_PER_GUIDE};
use clearpath_media::{load_image, write_image};
use std::path::Path;

use crate::app::App;

pub fn score(app: &App) -> Result<()> {
    let progress = app.progress();
    for (task, entry) in progress.entries() {
        if entry.total_points == 0 && entry.completed_steps.is_empty() {
            continue;
        }
        let steps = if entry.has_steps() { entry.steps.len() } else { STEPS_PER_GUIDE };
        println!(
            "{task}: {} points ({}/{steps} steps)",
            entry.total_points,
            entry.completed_count()
        );
    }
    println!("Total points: {}", progress.aggregate_points());
    Ok(())
}

pub fn list_deficiencies() {
    for d in DeficiencyType::ALL {
        println!("{d}");
    }
}

pub async fn recolor(app: &App, image: &Path, deficiency: &str, out: &Path) -> Result<()> {
    let deficiency: DeficiencyType = deficiency.parse()?;
    let original = load_image(image)?;

    println!("Adjusting colors for {deficiency}...");
    let result = app
        .gateway
        .recolor_image(&original, deficiency)
        .await
        .context("Failed to adjust image")?;

    let path = write_image(out, &result.image)?;
    if !result.description.is_empty() {
        println!("{}", result.description);
    }
    println!("Saved {}", path.display());
    Ok(())
}

pub async fn imagine(
    app: &App,
    prompt: Option<String>,
    listen: bool,
    style: Option<String>,
    out: &Path,
) -> Result<()> {
    let mut description = Dictation::new(prompt.unwrap_or_default());

    if listen {
        if !app.capabilities.speech_capture {
            bail!("Voice control not supported");
        }
        let resolver = app.resolver();
        let mut status = app.status();
        resolver.listen(&mut description, &mut status).await;
        if !description.is_blank() {
            println!("Description: {}", description.text());
        }
    }

    let prompt = require_prompt(description.text())?;
    println!("Generating image...");
    let image = app
        .gateway
        .generate_image(prompt, style.as_deref())
        .await
        .context("Failed to generate image")?;
    let path = write_image(out, &image)?;
    println!("Saved {}", path.display());
    Ok(())
}
