//! Interactive mode selection, used when no subcommand is given.

use crate::cli::Mode;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

fn ask<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
) -> io::Result<Option<String>> {
    write!(output, "{}", question)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Ask for a mode until a valid one is given, then for the target path.
///
/// Returns `None` if input ends first.
pub fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<Option<Mode>> {
    writeln!(output, "\nWelcome to reposnap!")?;
    writeln!(output, "--------------------")?;

    let choice = loop {
        writeln!(output, "\nPlease select an option:")?;
        writeln!(output, "1. Extract project code (for AI tools)")?;
        writeln!(output, "2. Diff the current branch against the base branch")?;
        writeln!(output, "3. Diff uncommitted (unstaged) changes")?;

        let Some(choice) = ask(input, output, "Enter your choice (1, 2 or 3): ")? else {
            return Ok(None);
        };
        if matches!(choice.as_str(), "1" | "2" | "3") {
            break choice;
        }
        writeln!(output, "Invalid option. Please enter 1, 2 or 3.")?;
    };

    let Some(path) = ask(
        input,
        output,
        "\nEnter the full path of the folder/repository to process: ",
    )?
    else {
        return Ok(None);
    };

    Ok(Mode::from_choice(&choice, PathBuf::from(path)))
}
