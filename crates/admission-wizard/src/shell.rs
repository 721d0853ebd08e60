//! Line-oriented shell for filling in one step at a time.

use std::{io::Write as _, path::Path};

use admission_core::{FieldErrors, STEP_COUNT};
use admission_wizard::{
  Advance, DraftStore, StepForm, Submitter, Wizard, WizardError,
};
use anyhow::{Context, Result};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Commands:
  show                     show the current step and its answers
  set <path> <value>       set a field, e.g. `set currentAddress.city Nairobi`
  add <field> <json>       append an entry to a list field
  remove <field> <index>   remove a list entry
  load <file>              merge answers from a JSON file
  check                    validate the answers without moving on
  next                     save this step and continue (submits on the last)
  back                     return to the previous step
  quit                     leave; completed steps stay saved";

/// Run the shell until the application is submitted or the user quits.
pub async fn run<D, S>(mut wizard: Wizard<D>, submitter: &S) -> Result<()>
where
  D: DraftStore,
  S: Submitter,
{
  let mut form = wizard.form()?;
  println!("{HELP}\n");
  show(&wizard, &form);

  let mut lines = BufReader::new(tokio::io::stdin()).lines();
  loop {
    print!("{}> ", form.step().as_ref());
    std::io::stdout().flush().ok();

    let Some(line) = lines.next_line().await.context("reading stdin")? else {
      break;
    };
    let line = line.trim();
    let (command, rest) = line
      .split_once(char::is_whitespace)
      .map(|(c, r)| (c, r.trim()))
      .unwrap_or((line, ""));

    match command {
      "" => {}
      "help" | "?" => println!("{HELP}"),
      "show" => show(&wizard, &form),
      "set" => match rest.split_once(char::is_whitespace) {
        Some((path, raw)) => report(form.set(path, parse_value(raw.trim()))),
        None => println!("usage: set <path> <value>"),
      },
      "add" => match rest.split_once(char::is_whitespace) {
        Some((field, raw)) => match form.push(field, parse_value(raw.trim())) {
          Ok(index) => println!("Added {field}.{index}."),
          Err(e) => println!("{e}"),
        },
        None => println!("usage: add <field> <json>"),
      },
      "remove" => {
        match rest
          .split_once(char::is_whitespace)
          .and_then(|(field, index)| Some((field, index.trim().parse::<usize>().ok()?)))
        {
          Some((field, index)) => report(form.remove(field, index).map(drop)),
          None => println!("usage: remove <field> <index>"),
        }
      }
      "load" => match load(&mut form, Path::new(rest)) {
        Ok(()) => println!("Loaded {rest}."),
        Err(e) => println!("{e:#}"),
      },
      "check" => match form.validate() {
        Ok(_) => println!("Looks good."),
        Err(fields) => print_errors(&fields),
      },
      "next" => match wizard.submit_step(form.data().clone(), submitter).await {
        Ok(Advance::Next(_)) => {
          form = wizard.form()?;
          show(&wizard, &form);
        }
        Ok(Advance::Submitted(receipt)) => {
          println!(
            "Application submitted. Your reference number is {}.",
            receipt.reference_number
          );
          return Ok(());
        }
        Err(WizardError::Validation(fields)) => print_errors(&fields),
        Err(e @ WizardError::Submission(_)) => {
          println!("{e}\nYour answers are saved; type `next` to try again.");
        }
        Err(e) => println!("{e}"),
      },
      "back" => match wizard.back() {
        Ok(_) => {
          form = wizard.form()?;
          show(&wizard, &form);
        }
        Err(e) => println!("{e}"),
      },
      "quit" | "exit" => break,
      other => println!("unknown command {other:?}; type `help`"),
    }
  }

  println!(
    "Saved {} of {STEP_COUNT} steps. Run `admission fill` to continue.",
    wizard.completed_steps().len()
  );
  Ok(())
}

fn show<D: DraftStore>(wizard: &Wizard<D>, form: &StepForm) {
  let step = form.step();
  println!(
    "Step {} of {STEP_COUNT}: {} ({})",
    step.index() + 1,
    step.title(),
    step.description()
  );
  let done: Vec<&str> = wizard.completed_steps().iter().map(|s| s.title()).collect();
  if !done.is_empty() {
    println!("Completed: {}", done.join(", "));
  }
  let fields: Vec<&str> = step.fields().iter().map(|f| f.name).collect();
  println!("Fields: {}", fields.join(", "));
  match serde_json::to_string_pretty(form.data()) {
    Ok(json) => println!("{json}"),
    Err(e) => println!("{e}"),
  }
}

fn print_errors(fields: &FieldErrors) {
  for error in fields.iter() {
    println!("  {}: {}", error.path, error.message);
  }
}

fn report<E: std::fmt::Display>(result: Result<(), E>) {
  if let Err(e) = result {
    println!("{e}");
  }
}

/// JSON if it parses, otherwise the raw text as a string.
fn parse_value(raw: &str) -> Value {
  serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
}

fn load(form: &mut StepForm, path: &Path) -> Result<()> {
  let raw = std::fs::read_to_string(path)
    .with_context(|| format!("reading {}", path.display()))?;
  let Value::Object(fields) = serde_json::from_str(&raw)
    .with_context(|| format!("parsing {}", path.display()))?
  else {
    anyhow::bail!("{} does not hold a JSON object", path.display());
  };
  form.merge(fields);
  Ok(())
}
