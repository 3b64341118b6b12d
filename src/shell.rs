// SPDX: CC0-1.0

use crate::{eval::Program, lex::SubStr};
use anyhow::Context;
use core::fmt;
use std::{
    io::{self, stdin, BufRead, Write},
    sync::Arc,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    SetExpr,
    Draw,
    Next,
    Resize,
    PrintProg,
}

impl Command {
    pub const fn exhaustive() -> &'static [Command] {
        &[
            Self::Help,
            Self::Quit,
            Self::SetExpr,
            Self::Draw,
            Self::Next,
            Self::Resize,
            Self::PrintProg,
        ]
    }

    pub const fn help(&self) -> &'static str {
        match self {
            Self::Help => "display help for each command",
            Self::Quit => "quit the shell",
            Self::SetExpr => "set the x(t) and y(t) expressions",
            Self::Draw => "draw the current expressions on both surfaces",
            Self::Next => "load and draw the next example curve",
            Self::Resize => "set the size of both surfaces (takes effect on the next draw)",
            Self::PrintProg => "print programs compiled from the expressions (for debugging)",
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Quit => "quit",
            Self::SetExpr => "set",
            Self::Draw => "draw",
            Self::Next => "next",
            Self::Resize => "resize",
            Self::PrintProg => "prog",
        }
    }
}

impl core::str::FromStr for Command {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::exhaustive()
            .iter()
            .find(|c| c.name() == s)
            .copied()
            .ok_or(())
    }
}

/// Prints `prompt` and reads one trimmed line. `None` at end of input.
pub fn input<W: Write>(out: W, prompt: impl fmt::Display) -> anyhow::Result<Option<String>> {
    fn inner<W: Write>(mut out: W, prompt: impl fmt::Display) -> io::Result<Option<String>> {
        write!(out, "{prompt}")?;
        out.flush()?;
        let mut s = String::new();
        if stdin().lock().read_line(&mut s)? == 0 {
            return Ok(None);
        }
        Ok(Some(s.trim().to_string()))
    }

    let s = inner(out, prompt).context("read from standard input failed")?;
    Ok(s)
}

pub fn read_fromstr<W: Write, T: core::str::FromStr>(
    mut out: W,
    prompt: impl fmt::Display,
) -> anyhow::Result<Result<Option<T>, <T as core::str::FromStr>::Err>>
where
    <T as core::str::FromStr>::Err: fmt::Display,
{
    let input = match input(&mut out, prompt)? {
        Some(input) if !input.is_empty() => Arc::new(input),
        _ => return Ok(Ok(None)),
    };
    match input.parse::<T>() {
        Ok(new) => Ok(Ok(Some(new))),
        Err(err) => {
            writeln!(out)?;
            underline(&mut out, &SubStr::all(input))?;
            writeln!(out, "parse error: {err}")?;
            Ok(Err(err))
        }
    }
}

/// Prints the source of `span` with carets under it. Columns are counted
/// in chars, not bytes.
pub fn underline<W: Write>(mut out: W, span: &SubStr) -> io::Result<()> {
    let src = span.src();
    let indent = src[..span.start()].chars().count();
    let width = span.get().chars().count().max(1);
    writeln!(out, "{src}")?;
    writeln!(out, "{}{}", " ".repeat(indent), "^".repeat(width))?;
    Ok(())
}

pub fn dump_program<W: Write>(
    mut out: W,
    prog: &Program,
    title: core::fmt::Arguments,
) -> io::Result<()> {
    writeln!(out, "{title}: ")?;
    if prog.ops().len() == 0 {
        writeln!(out, "  (empty)")?;
    }
    for op in prog.ops() {
        writeln!(out, "  {op}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn command_names_round_trip() {
        for c in Command::exhaustive() {
            assert_eq!(c.name().parse::<Command>(), Ok(*c));
        }
        assert!("plot".parse::<Command>().is_err());
    }

    #[test_log::test]
    fn underline_marks_span() {
        let src = Arc::new(String::from("sin(t"));
        let mut out = Vec::new();
        underline(&mut out, &SubStr::new(src, 3, 1)).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "sin(t\n   ^\n");
    }

    #[test_log::test]
    fn underline_counts_chars() {
        let src = Arc::new(String::from("θ + é"));
        // 'é' starts at byte 5 but column 4
        let mut out = Vec::new();
        underline(&mut out, &SubStr::new(src, 5, 2)).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "θ + é\n    ^\n");
    }

    #[test_log::test]
    fn dump() {
        let src = Arc::new(String::from("t/2"));
        let prog = crate::parse::parse(
            crate::lex::Lexer::new(&src),
            &crate::stdlib::standard_idents(),
        )
        .unwrap();
        let mut out = Vec::new();
        dump_program(&mut out, &prog, format_args!("x(t)")).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "x(t): \n  load 't'\n  push 2\n  call 'div'\n"
        );
    }
}
