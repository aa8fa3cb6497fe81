//! Interactive workload selection.

use std::io::{self, BufRead, Write};

use crate::pool::config::{Workload, LARGE_WORKLOAD_EQUATIONS, SMALL_WORKLOAD_EQUATIONS};

/// Stream the interactive menu is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuStream {
    Stdout,
    /// Keeps stdout free for a machine-readable report.
    Stderr,
}

impl MenuStream {
    pub fn for_report(json: bool) -> Self {
        if json {
            MenuStream::Stderr
        } else {
            MenuStream::Stdout
        }
    }
}

/// Reads the workload from stdin, showing the menu on `stream`.
pub fn read_workload_interactive(stream: MenuStream) -> io::Result<Workload> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    match stream {
        MenuStream::Stdout => read_workload(&mut input, &mut io::stdout()),
        MenuStream::Stderr => read_workload(&mut input, &mut io::stderr()),
    }
}

/// Shows the workload menu on `output` and reads choices from `input`
/// until a valid one is entered.
///
/// Returns `UnexpectedEof` if the input ends before a valid choice.
pub fn read_workload<R, W>(input: &mut R, output: &mut W) -> io::Result<Workload>
where
    R: BufRead,
    W: Write,
{
    let mut line = String::new();
    loop {
        writeln!(output)?;
        writeln!(output, "Choose an option:")?;
        writeln!(
            output,
            "Enter 1 to generate and solve for the roots for {} randomly generated sets of coefficients.",
            SMALL_WORKLOAD_EQUATIONS
        )?;
        writeln!(
            output,
            "Enter 2 to generate and solve for the roots for {} randomly generated sets of coefficients.",
            LARGE_WORKLOAD_EQUATIONS
        )?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed before a workload was chosen",
            ));
        }

        match Workload::from_choice(&line) {
            Some(workload) => return Ok(workload),
            None => writeln!(output, "Invalid choice, please try again.")?,
        }
    }
}
