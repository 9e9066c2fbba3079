use anyhow::{Result, bail};
use clap::Subcommand;
use clearpath_core::{Dictation, ListenOutcome, SelectionVoice, TaskCatalog};

use crate::app::App;

#[derive(Subcommand, Debug)]
pub enum TasksCommand {
    /// List tasks (all, favorites or recently used)
    List {
        #[arg(long, conflicts_with = "recent")]
        favorites: bool,

        #[arg(long)]
        recent: bool,
    },

    /// Add a custom task from a description and select it
    Add {
        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,
    },

    /// Select a task (moves it to the front of the recent list)
    Select { name: String },

    /// Toggle a task's favorite mark
    Favorite { name: String },

    /// Delete a task together with its progress
    Delete { name: String },

    /// Pick a task by voice, or dictate a custom one
    Listen,
}

pub async fn run(app: &App, command: TasksCommand) -> Result<()> {
    match command {
        TasksCommand::List { favorites, recent } => list(&app.catalog(), favorites, recent),

        TasksCommand::Add { description } => {
            let mut catalog = app.catalog();
            let name = catalog.add_custom(&description.join(" "))?;
            app.progress().ensure(&name);
            println!("Selected: {name}");
            print_next(&name);
            Ok(())
        }

        TasksCommand::Select { name } => {
            let mut catalog = app.catalog();
            catalog.select_task(&name);
            app.progress().ensure(&name);
            println!("Selected: {name}");
            print_next(&name);
            Ok(())
        }

        TasksCommand::Favorite { name } => {
            let mut catalog = app.catalog();
            if !catalog.contains(&name) {
                bail!("Unknown task: \"{name}\"");
            }
            if catalog.toggle_favorite(&name) {
                println!("Added to favorites: {name}");
            } else {
                println!("Removed from favorites: {name}");
            }
            Ok(())
        }

        TasksCommand::Delete { name } => {
            let mut catalog = app.catalog();
            if !catalog.contains(&name) {
                bail!("Unknown task: \"{name}\"");
            }
            catalog.delete_task(&name);
            app.progress().delete(&name);
            println!("Deleted: {name}");
            Ok(())
        }

        TasksCommand::Listen => listen(app).await,
    }
}

fn list(catalog: &TaskCatalog, favorites: bool, recent: bool) -> Result<()> {
    let names: Vec<&str> = if favorites {
        catalog.favorite_tasks()
    } else if recent {
        catalog.recent_tasks()
    } else {
        catalog.all_tasks().iter().map(String::as_str).collect()
    };

    if names.is_empty() {
        if favorites {
            println!("No favorite tasks yet.");
        } else if recent {
            println!("No recent tasks yet.");
        }
        return Ok(());
    }
    for name in names {
        let mark = if catalog.is_favorite(name) { "*" } else { " " };
        println!("{mark} {name}");
    }
    Ok(())
}

async fn listen(app: &App) -> Result<()> {
    if !app.capabilities.speech_capture {
        bail!("Voice control not supported");
    }
    let mut catalog = app.catalog();
    let resolver = app.resolver();
    let mut status = app.status();

    let mut voice = SelectionVoice::new(&mut catalog, Dictation::default());
    let outcome = resolver.listen(&mut voice, &mut status).await;

    if let Some(name) = voice.selected().map(str::to_string) {
        app.progress().ensure(&name);
        println!("Selected: {name}");
        print_next(&name);
        return Ok(());
    }
    if matches!(outcome, ListenOutcome::NoMatch(_)) && !voice.description().is_blank() {
        let text = voice.description().text().to_string();
        println!("Description: {text}");
        println!("Add it with: clearpath tasks add \"{text}\"");
    }
    Ok(())
}

fn print_next(name: &str) {
    println!("Next: clearpath guide show \"{name}\"");
}
