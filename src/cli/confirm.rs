//! Yes/no prompt for destructive commands.

use std::io::{self, BufRead, Write};

/// Print `question` with a `[y/N]` hint and read one line of answer.
///
/// Only `y`/`yes` (any case) confirms; anything else, including end of
/// input, declines.
pub fn confirm<R: BufRead, W: Write>(question: &str, input: &mut R, out: &mut W) -> io::Result<bool> {
    write!(out, "{} [y/N] ", question)?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    let answer = answer.trim();
    Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
}

/// [`confirm`] on the process's stdin and stdout.
pub fn confirm_stdin(question: &str) -> io::Result<bool> {
    confirm(question, &mut io::stdin().lock(), &mut io::stdout())
}
