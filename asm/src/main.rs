use color_print::ceprintln;
use hackasm::{util, Assembled, Error};
use std::io::{BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

const USAGE: &str = "Usage: hackasm <INPUT> [-o <OUTPUT> | --stdout] [--dump] [--symbols]";

#[derive(Debug, clap::Parser)]
#[clap(author, version, about, help_template = HELP_TEMPLATE)]
struct Args {
    /// Input file
    input: PathBuf,

    /// Output file [default: input with `.hack` extension]
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Write binary to standard output instead of a file
    #[clap(long, conflicts_with = "output")]
    stdout: bool,

    /// Dump assembly listing
    #[clap(short, long)]
    dump: bool,

    /// Print label and variable addresses
    #[clap(short, long)]
    symbols: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    use clap::Parser;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Args = Args::parse();
    let path = args.input.display().to_string();
    ceprintln!("<s>Hack Assembler</>");

    ceprintln!("1. Read File and Classify Lines");
    eprintln!("  < {}", path);
    let lines = match read_lines(&args.input) {
        Ok(lines) => lines,
        Err(err) => return fail(&err, &path, &[]),
    };

    ceprintln!("2. Resolve Symbols & Generate Binary");
    let assembled = match hackasm::assemble(&lines).await {
        Ok(assembled) => assembled,
        Err(err) => return fail(&err, &path, &lines),
    };

    if let Err(err) = emit(&args, &assembled) {
        return fail(&err, &path, &lines);
    }

    if args.dump {
        for line in util::format_dump(&path, &lines, &assembled) {
            report(&args, &line);
        }
    }
    if args.symbols {
        for line in util::format_symbols(&assembled.symbols) {
            report(&args, &line);
        }
    }

    ExitCode::SUCCESS
}

fn read_lines(path: &Path) -> Result<Vec<String>, Error> {
    let file = std::fs::File::open(path)
        .map_err(|e| Error::FileOpen(path.display().to_string(), e))?;
    std::io::BufReader::new(file)
        .lines()
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::FileRead)
}

fn emit(args: &Args, assembled: &Assembled) -> Result<(), Error> {
    if args.stdout {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        for word in &assembled.words {
            writeln!(out, "{}", word.to_bin_string())
                .map_err(|e| Error::FileWrite("<stdout>".to_string(), e))?;
        }
        return Ok(());
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.with_extension("hack"));
    let name = output.display().to_string();
    eprintln!("  > {}", name);

    let file = std::fs::File::create(&output).map_err(|e| Error::FileCreate(name.clone(), e))?;
    let mut out = BufWriter::new(file);
    for word in &assembled.words {
        writeln!(out, "{}", word.to_bin_string()).map_err(|e| Error::FileWrite(name.clone(), e))?;
    }
    out.flush().map_err(|e| Error::FileWrite(name, e))
}

/// Listings go to stderr when stdout carries the binary.
fn report(args: &Args, line: &str) {
    if args.stdout {
        eprintln!("{}", line);
    } else {
        println!("{}", line);
    }
}

fn fail(err: &Error, path: &str, lines: &[String]) -> ExitCode {
    ceprintln!("<r,s>Failed to assemble target</>");
    eprintln!("{}", USAGE);
    err.print_diag(path, lines);
    ExitCode::FAILURE
}
