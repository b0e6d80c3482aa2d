//! Line-oriented front end for [`TableSyncClient`].

use std::io::{self, BufRead, Write};

use anyhow::Result;
use client_core::{ClientError, ControlsApi, FormField, Outcome, Prompt, TableSyncClient};
use tracing::debug;

use crate::view::{render_form, render_table};

const HELP: &str = "\
commands:
  list                     fetch and show the table
  show <mainID>            print one control
  set <field> <value>      fill a form field (mainID, mainDescription, domain, scope)
  form                     print the form
  add                      create a control from the form
  edit <mainID>            load a control into the form
  update                   submit the active edit
  cancel                   abandon the active edit
  delete <mainID>          delete a control
  export                   write the table as CSV
  quit                     leave the shell";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Help,
    List,
    Show(String),
    Set { field: FormField, value: String },
    Form,
    Add,
    Edit(String),
    Update,
    Cancel,
    Delete(String),
    Export,
    Quit,
}

impl ShellCommand {
    /// `Ok(None)` for a blank line.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "help" | "?" => Self::Help,
            "list" | "ls" => Self::List,
            "show" => Self::Show(required_id(verb, rest)?),
            "set" => {
                let (field, value) = match rest.split_once(char::is_whitespace) {
                    Some((field, value)) => (field, value.trim()),
                    None => (rest, ""),
                };
                if field.is_empty() {
                    return Err("usage: set <field> <value>".into());
                }
                Self::Set {
                    field: field.parse()?,
                    value: value.to_string(),
                }
            }
            "form" => Self::Form,
            "add" => Self::Add,
            "edit" => Self::Edit(required_id(verb, rest)?),
            "update" => Self::Update,
            "cancel" => Self::Cancel,
            "delete" | "rm" => Self::Delete(required_id(verb, rest)?),
            "export" => Self::Export,
            "quit" | "exit" => Self::Quit,
            other => return Err(format!("unknown command '{other}'; try 'help'")),
        };
        Ok(Some(command))
    }
}

fn required_id(verb: &str, rest: &str) -> Result<String, String> {
    if rest.is_empty() {
        Err(format!("usage: {verb} <mainID>"))
    } else {
        Ok(rest.to_string())
    }
}

pub async fn run<A, P>(client: &mut TableSyncClient<A, P>) -> Result<()>
where
    A: ControlsApi,
    P: Prompt,
{
    if client.fetch_and_render().await.is_ok() {
        print!("{}", render_table(&client.table()));
    }
    println!("type 'help' for commands");

    let stdin = io::stdin();
    loop {
        print!("controls> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let command = match ShellCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                eprintln!("{message}");
                continue;
            }
        };
        if command == ShellCommand::Quit {
            break;
        }
        execute(client, command).await;
    }
    Ok(())
}

/// Runs one command. Failures have already been shown through the prompt, so
/// only errors the client does not alert on are printed here.
pub async fn execute<A, P>(client: &mut TableSyncClient<A, P>, command: ShellCommand)
where
    A: ControlsApi,
    P: Prompt,
{
    let result = match command {
        ShellCommand::Help => {
            println!("{HELP}");
            Ok(())
        }
        ShellCommand::List => client.fetch_and_render().await.map(|()| show_table(client)),
        ShellCommand::Show(main_id) => match client.fetch_control(&main_id).await {
            Ok(Some(control)) => {
                println!(
                    "{}\t{}\t{}\t{}",
                    control.main_id, control.main_description, control.domain, control.scope
                );
                Ok(())
            }
            Ok(None) => Err(ClientError::NotFound(main_id)),
            Err(error) => Err(error),
        },
        ShellCommand::Set { field, value } => client.form_mut().set(field, value),
        ShellCommand::Form => {
            print!("{}", render_form(client.form()));
            Ok(())
        }
        ShellCommand::Add => client.create().await.map(|()| show_table(client)),
        ShellCommand::Edit(main_id) => client.enter_edit(&main_id).await.map(|outcome| {
            if outcome == Outcome::Completed {
                show_table(client);
                print!("{}", render_form(client.form()));
            }
        }),
        ShellCommand::Update => client.submit_edit().await.map(|()| show_table(client)),
        ShellCommand::Cancel => {
            if client.cancel_edit() {
                show_table(client);
            } else {
                println!("no edit in progress");
            }
            Ok(())
        }
        ShellCommand::Delete(main_id) => client.delete(&main_id).await.map(|outcome| {
            if outcome == Outcome::Completed {
                show_table(client);
            }
        }),
        ShellCommand::Export => client.export_csv().map(|path| {
            println!("exported {}", path.display());
        }),
        ShellCommand::Quit => Ok(()),
    };

    if let Err(error) = result {
        debug!(%error, "shell command failed");
        if !is_alerted(&error) {
            eprintln!("{error}");
        }
    }
}

fn show_table<A: ControlsApi, P: Prompt>(client: &TableSyncClient<A, P>) {
    print!("{}", render_table(&client.table()));
}

/// Errors the client reports through [`Prompt::alert`] itself.
pub fn is_alerted(error: &ClientError) -> bool {
    !matches!(
        error,
        ClientError::MainIdLocked(_)
            | ClientError::NotFound(_)
            | ClientError::Export(_)
            | ClientError::InvalidUrl { .. }
    )
}
