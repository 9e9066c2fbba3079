use anyhow::{Context, Result, bail};
use clap::Subcommand;
use clearpath_core::guide::GuideCommand as StepCommand;
use clearpath_core::{
    GuideAction, GuideSession, ListenOutcome, ProgressPatch, ProgressStore, StepCompletion,
    TaskStep,
};
use clearpath_media::write_image;
use std::path::PathBuf;
use std::sync::Arc;

use crate::app::App;

#[derive(Subcommand, Debug)]
pub enum GuideCommand {
    /// Show a task's steps and points (generates the guide on first use)
    Show { task: String },

    /// Mark a step (1-based) as done
    Complete { task: String, step: usize },

    /// Run a typed guide command, e.g. "next" or "read step 2"
    Command {
        task: String,

        #[arg(required = true, num_args = 1..)]
        words: Vec<String>,
    },

    /// Navigate the guide by voice until "go back" (Ctrl-C stops listening)
    Listen { task: String },

    /// Generate the illustration for a step
    Image {
        task: String,
        step: usize,

        /// Where to write the image (extension added from its type if missing)
        #[arg(long)]
        out: PathBuf,
    },

    /// Read a step aloud
    Read { task: String, step: usize },
}

pub async fn run(app: &App, command: GuideCommand) -> Result<()> {
    let mut progress = app.progress();

    match command {
        GuideCommand::Show { task } => {
            app.catalog().select_task(&task);
            ensure_steps(app, &mut progress, &task).await?;
            let focus = progress.next_incomplete(&task);
            print_guide(&progress, &task, focus);
        }

        GuideCommand::Complete { task, step } => {
            ensure_steps(app, &mut progress, &task).await?;
            let index = step_index(&progress, &task, step)?;
            match progress.complete_step(&task, index)? {
                StepCompletion::Awarded { points, task_total } => {
                    println!("+{points} points! Great job!");
                    println!("Points for this task: {task_total}");
                    if progress.get(&task).is_some_and(|p| p.is_finished()) {
                        println!("All steps are completed!");
                    }
                }
                StepCompletion::AlreadyDone => println!("Step {step} is already done."),
            }
        }

        GuideCommand::Command { task, words } => {
            ensure_steps(app, &mut progress, &task).await?;
            let transcript = words.join(" ");
            let resolver = app.resolver();
            let mut status = app.status();

            let (messages, action) = {
                let mut session = GuideSession::new(&task, &mut progress, app.speaker.as_ref());
                match StepCommand::parse(&transcript) {
                    Some(cmd) => {
                        session.execute(cmd);
                    }
                    None => {
                        resolver
                            .resolve_transcript(&transcript, &mut session, &mut status)
                            .await;
                    }
                }
                (session.take_messages(), session.last_action())
            };
            report(&progress, &task, &messages, action);
            if matches!(action, Some(GuideAction::Read { .. })) {
                app.speaker.wait().await?;
            }
        }

        GuideCommand::Listen { task } => {
            ensure_steps(app, &mut progress, &task).await?;
            listen(app, &mut progress, &task).await?;
        }

        GuideCommand::Image { task, step, out } => {
            ensure_steps(app, &mut progress, &task).await?;
            let index = step_index(&progress, &task, step)?;
            let prompt = step_at(&progress, &task, index)?.image_prompt.clone();

            println!("Generating the image for step {step}...");
            let image = app
                .gateway
                .generate_image(&prompt, None)
                .await
                .with_context(|| format!("Failed to generate the image for step {step}"))?;
            let path = write_image(&out, &image)?;
            println!("Saved {}", path.display());
        }

        GuideCommand::Read { task, step } => {
            ensure_steps(app, &mut progress, &task).await?;
            step_index(&progress, &task, step)?;
            let (messages, action) = {
                let mut session = GuideSession::new(&task, &mut progress, app.speaker.as_ref());
                let action = session.execute(StepCommand::ReadStep(step));
                (session.take_messages(), Some(action))
            };
            report(&progress, &task, &messages, action);
            app.speaker.wait().await?;
        }
    }

    Ok(())
}

/// Load the task's steps, asking the AI service for them on first use.
async fn ensure_steps(app: &App, progress: &mut ProgressStore, task: &str) -> Result<()> {
    if progress.get(task).is_some_and(|p| p.has_steps()) {
        return Ok(());
    }
    progress.ensure(task);

    println!("Generating a guide for \"{task}\"...");
    match app.gateway.generate_steps(task).await {
        Ok(steps) => {
            tracing::info!(task, steps = steps.len(), "guide generated");
            progress.update(task, ProgressPatch::steps(steps));
            Ok(())
        }
        Err(e) => {
            tracing::warn!(task, error = %e, "guide generation failed");
            bail!("Could not load the guide: {e}\nRetry with: clearpath guide show \"{task}\"")
        }
    }
}

fn step_index(progress: &ProgressStore, task: &str, step: usize) -> Result<usize> {
    let count = progress.get(task).map_or(0, |p| p.steps.len());
    if step == 0 || step > count {
        bail!("Step {step} does not exist; \"{task}\" has {count} steps.");
    }
    Ok(step - 1)
}

fn step_at<'p>(progress: &'p ProgressStore, task: &str, index: usize) -> Result<&'p TaskStep> {
    progress
        .get(task)
        .and_then(|p| p.steps.get(index))
        .with_context(|| format!("no step {} for \"{task}\"", index + 1))
}

fn print_guide(progress: &ProgressStore, task: &str, focus: Option<usize>) {
    let Some(entry) = progress.get(task) else {
        return;
    };
    println!("# {task}");
    println!(
        "Points: {} (all tasks: {})",
        entry.total_points,
        progress.aggregate_points()
    );
    println!();
    for (i, step) in entry.steps.iter().enumerate() {
        let done = if entry.is_completed(i) { "x" } else { " " };
        let cursor = if focus == Some(i) { ">" } else { " " };
        println!("{cursor}[{done}] {}. {}", i + 1, step.title);
        println!("      {}", step.description);
    }
    if entry.is_finished() {
        println!();
        println!("All steps are completed!");
    }
}

fn print_step(progress: &ProgressStore, task: &str, index: usize) {
    if let Ok(step) = step_at(progress, task, index) {
        println!("Step {}: {}", index + 1, step.title);
        println!("  {}", step.description);
    }
}

fn report(progress: &ProgressStore, task: &str, messages: &[String], action: Option<GuideAction>) {
    for m in messages {
        println!("{m}");
    }
    match action {
        Some(GuideAction::Read { index }) | Some(GuideAction::Focus { index }) => {
            print_step(progress, task, index);
        }
        Some(GuideAction::GoBack) => println!("Back to task selection."),
        Some(GuideAction::Ignored) if messages.is_empty() => {
            println!("Nothing to do for that command.");
        }
        _ => {}
    }
}

async fn listen(app: &App, progress: &mut ProgressStore, task: &str) -> Result<()> {
    if !app.capabilities.speech_capture {
        bail!("Voice control not supported");
    }
    let resolver = Arc::new(app.resolver());
    let mut status = app.status();

    let watcher = {
        let resolver = resolver.clone();
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if !resolver.stop() {
                    std::process::exit(130);
                }
            }
        })
    };

    loop {
        let (outcome, messages, action) = {
            let mut session = GuideSession::new(task, progress, app.speaker.as_ref());
            println!("Commands: {}", session.commands().join(", "));
            let outcome = resolver.listen(&mut session, &mut status).await;
            (outcome, session.take_messages(), session.last_action())
        };
        report(progress, task, &messages, action);

        if action == Some(GuideAction::GoBack) {
            break;
        }
        if matches!(
            outcome,
            ListenOutcome::Cancelled | ListenOutcome::Failed | ListenOutcome::Unsupported
        ) {
            break;
        }
    }

    watcher.abort();
    status.clear();
    app.speaker.wait().await
}
