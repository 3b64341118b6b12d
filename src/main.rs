// SPDX: CC0-1.0

use anyhow::Context;
use chrono::{DateTime, Local};
use log::{debug, info};
use parametric_plot::{
    config::Config,
    eval::EvalErrTyp,
    expr::{Evaluator, Expr},
    gallery::{self, Gallery},
    gfx::Pipeline,
    lex::{LexErrTyp, Reserved},
    parse::{ParseErr, ParseErrTyp},
    raster::Canvas,
    sample::{self, Curve, Projection, SampleErr},
    shell::{self, Command},
};
use std::{
    fs::OpenOptions,
    io::{stdout, BufWriter, Write},
    path::Path,
    process::ExitCode,
};

fn output_filename(projection: Projection, now: DateTime<Local>) -> String {
    format!(
        "{}_{}-{}.{}",
        env!("CARGO_PKG_NAME"),
        projection,
        now.format("%Y-%m-%d_%H-%M-%S%.3f"),
        "ppm"
    )
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("unexpected error: {err}");
            let chain = err.chain();
            if chain.len() > 1 {
                eprintln!();
                eprintln!("context:");
                for it in chain.skip(1) {
                    eprintln!("  {it}");
                }
            }
            ExitCode::FAILURE
        }
    }
}

#[derive(Debug)]
struct State {
    x: String,
    y: String,
    evaluator: Evaluator,
    cartesian: Pipeline<Canvas>,
    polar: Pipeline<Canvas>,
    gallery: Gallery,
    config: Config,
}

fn try_main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    debug!("{config:?}");

    // both surfaces must be available before either pipeline is set up
    let (width, height) = (config.surface.width, config.surface.height);
    let cartesian = Canvas::new(width, height)
        .context("sorry, your system doesn't seem to support drawing")?;
    let polar = Canvas::new(width, height)
        .context("sorry, your system doesn't seem to support drawing")?;

    let mut state = State {
        x: String::new(),
        y: String::new(),
        evaluator: Evaluator::new(),
        cartesian: Pipeline::init(cartesian, Projection::Cartesian, config.units_per_axe),
        polar: Pipeline::init(polar, Projection::Polar, config.units_per_axe),
        gallery: Gallery::new(),
        config,
    };

    let mut stdout = BufWriter::new(stdout());
    set_and_draw(&mut stdout, &mut state, gallery::DEFAULT)?;
    writeln!(stdout)?;

    loop {
        writeln!(stdout, "x(t) = {}", state.x)?;
        writeln!(stdout, "y(t) = {}", state.y)?;

        let Some(mut try_cmd) = shell::input(&mut stdout, "> ")? else {
            break;
        };
        try_cmd.make_ascii_lowercase();
        writeln!(stdout)?;

        if let Ok(cmd) = try_cmd.parse::<Command>() {
            debug!("command: {cmd:?}");
            match cmd {
                Command::Help => {
                    for c in Command::exhaustive() {
                        writeln!(stdout, "{name}: {help}", name = c.name(), help = c.help())?;
                    }
                }

                Command::Quit => break,

                Command::SetExpr => set_expr(&mut stdout, &mut state)?,

                Command::Draw => draw(&mut stdout, &mut state)?,

                Command::Next => {
                    let example = state.gallery.advance();
                    set_and_draw(&mut stdout, &mut state, example)?;
                }

                Command::Resize => resize(&mut stdout, &mut state)?,

                Command::PrintProg => {
                    if let Some((x, y)) = compile_exprs(&mut stdout, &state)? {
                        shell::dump_program(&mut stdout, x.program(), format_args!("x(t)"))?;
                        shell::dump_program(&mut stdout, y.program(), format_args!("y(t)"))?;
                    }
                }
            }
        } else {
            writeln!(stdout, r#"Unknown command, try "help" for help"#)?;
        }

        writeln!(stdout)?;
    }
    stdout.flush()?;
    Ok(())
}

fn set_and_draw<W: Write>(
    out: W,
    state: &mut State,
    (x, y): (&str, &str),
) -> anyhow::Result<()> {
    state.x = String::from(x);
    state.y = String::from(y);
    draw(out, state)
}

fn set_expr<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    writeln!(out, "note: leave blank to keep the current expression")?;
    for (name, dst) in [("x(t)", &mut state.x), ("y(t)", &mut state.y)] {
        match shell::input(&mut out, format_args!("{name} = "))? {
            Some(input) if !input.is_empty() => *dst = input,
            _ => {}
        }
    }
    writeln!(out)?;
    draw(out, state)
}

fn resize<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    let (cur_width, cur_height) = (state.config.surface.width, state.config.surface.height);
    writeln!(out, "note: leave blank to skip")?;

    let mut width = cur_width;
    let mut height = cur_height;
    for (name, dst) in [("width", &mut width), ("height", &mut height)] {
        match shell::read_fromstr::<_, u32>(
            &mut out,
            format_args!("?{name} (is {cur}) = ", cur = *dst),
        )? {
            Ok(Some(new)) => *dst = new,
            Ok(None) => {}
            Err(_) => return Ok(()),
        }
    }

    for pipeline in [&mut state.cartesian, &mut state.polar] {
        if let Err(err) = pipeline.resize(width, height) {
            writeln!(out, "error: {err}")?;
            return Ok(());
        }
    }
    state.config.surface.width = width;
    state.config.surface.height = height;
    info!("surfaces resized to {width}x{height}");
    writeln!(out, "surfaces are now {width}x{height}, draw to refresh them")?;
    Ok(())
}

/// Compiles, samples for both projections, and only then renders. A failure
/// at any step leaves the previous images alone.
fn draw<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    let (x, y) = match compile_exprs(&mut out, state)? {
        Some(exprs) => exprs,
        None => return Ok(()),
    };

    let mut curves: Vec<Curve> = Vec::with_capacity(Projection::exhaustive().len());
    for &projection in Projection::exhaustive() {
        let sweep = match projection {
            Projection::Cartesian => &state.config.cartesian,
            Projection::Polar => &state.config.polar,
        };
        match sample::sample_exprs(&mut state.evaluator, &x, &y, sweep, projection) {
            Ok(curve) => curves.push(curve),
            Err(err) => {
                report_sample_err(&mut out, &state.evaluator, &err)?;
                return Ok(());
            }
        }
    }

    let now = Local::now();
    for (pipeline, curve) in [&mut state.cartesian, &mut state.polar]
        .into_iter()
        .zip(&curves)
    {
        pipeline.draw(curve);
        let path = state
            .config
            .output_dir
            .join(output_filename(pipeline.projection(), now));
        save(pipeline.context(), &path)?;
        writeln!(
            out,
            "{projection}: {n} points, saved to {path}",
            projection = pipeline.projection(),
            n = curve.len(),
            path = path.display()
        )?;
    }

    Ok(())
}

fn save(canvas: &Canvas, path: &Path) -> anyhow::Result<()> {
    let mut file = BufWriter::new(
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .with_context(|| format!("failed to open output image {}", path.display()))?,
    );
    canvas
        .write_ppm(&mut file)
        .context("failed to write output image")?;
    file.get_mut().sync_data()?;
    info!("wrote {}", path.display());
    Ok(())
}

fn compile_exprs<W: Write>(mut out: W, state: &State) -> anyhow::Result<Option<(Expr, Expr)>> {
    let mut compile = |name: &str, src: &str| -> anyhow::Result<Option<Expr>> {
        match state.evaluator.compile(src) {
            Ok(expr) => Ok(Some(expr)),
            Err(err) => {
                writeln!(out, "in {name}:")?;
                report_parse_err(&mut out, &err)?;
                Ok(None)
            }
        }
    };
    let x = compile("x(t)", &state.x)?;
    let y = compile("y(t)", &state.y)?;
    Ok(x.zip(y))
}

fn report_parse_err<W: Write>(mut out: W, err: &ParseErr) -> anyhow::Result<()> {
    shell::underline(&mut out, &err.loc)?;
    writeln!(out, "parse error: {}", err.typ)?;
    match err.typ {
        ParseErrTyp::LexErr(lex_err) => match lex_err {
            LexErrTyp::InvalidChar => {
                writeln!(
                    out,
                    "note: available tokens are numbers, alphabetic identifiers, and symbols +-*/^,()"
                )?;
            }
            LexErrTyp::Reserved(Reserved::Comparison) => {
                writeln!(out, "note: expected an expression but found an inequality")?;
            }
            LexErrTyp::Reserved(Reserved::Equals) => {
                writeln!(out, "note: expected an expression but found an equation")?;
            }
            LexErrTyp::Reserved(Reserved::Pipe) => {
                writeln!(out, "note: use the 'abs' function to compute absolute value")?;
            }
            LexErrTyp::Reserved(Reserved::Bracket) => {
                writeln!(out, "note: only round parentheses can group expressions")?;
            }
        },

        ParseErrTyp::ParseNum(_) => writeln!(out, "note: parsing as floating point number")?,

        ParseErrTyp::ParenMismatch => {}

        ParseErrTyp::MissingCall => {
            writeln!(out, "note: function arguments go in parentheses, e.g. 'cos(t)'")?
        }

        ParseErrTyp::Empty => writeln!(out, "note: both x(t) and y(t) need an expression")?,
    }
    Ok(())
}

fn report_sample_err<W: Write>(
    mut out: W,
    evaluator: &Evaluator,
    err: &SampleErr,
) -> anyhow::Result<()> {
    match err.err.op {
        Some(ref op) => shell::underline(&mut out, &op.loc)?,
        None => {
            writeln!(out, "{}", err.src)?;
            writeln!(out, "{}^", " ".repeat(err.src.len()))?;
        }
    }
    writeln!(out, "evaluation error at t = {}: {}", err.t, err.err)?;
    writeln!(out, "note: nothing was drawn")?;

    match err.err.typ {
        EvalErrTyp::MissingArgs { .. } => {}

        EvalErrTyp::StackMismatch { .. } => {
            writeln!(
                out,
                "note: implicit multiplication is not supported, so for example '5t' would be '5*t'",
            )?;
        }

        EvalErrTyp::NullVar { .. } => {}

        EvalErrTyp::UndefinedIdent { ref text } => {
            writeln!(out, "note: the only variable is 't'")?;
            if let Some((key, ident)) = evaluator.similar_ident(text.get()) {
                writeln!(
                    out,
                    "note: {kind} '{key}' has a similar name",
                    kind = ident.kind()
                )?;
            }
        }
    }
    Ok(())
}
