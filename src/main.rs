use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};

use hack_ensemble::asm::encoding::{BinaryFormat, ObjFileFormat, TextFormat};
use hack_ensemble::asm::{assemble, assemble_debug, ObjectFile, SourceInfo, SymbolKind};
use hack_ensemble::err::report;
use hack_ensemble::parse::parse_ast;

/// Hack Assembler
#[derive(Parser)]
#[command(about)]
struct Args {
    /// Input assembly file (must end in .asm)
    input: PathBuf,

    /// File name to output to (defaults to the input with a .hack extension)
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Print the labels and variables of the program
    #[arg(long)]
    symbols: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// One instruction per line, as 16 binary digits
    Text,
    /// Two big-endian bytes per instruction
    Binary,
}

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let input = &args.input;
    check_input(input)?;

    let src = fs::read_to_string(input)
        .with_context(|| format!("could not read {}", input.display()))?;

    let Some(obj) = assemble_src(&src, args.symbols) else {
        bail!("could not assemble {}", input.display());
    };

    if let Some(sym) = obj.symbol_table() {
        for (name, addr, kind) in sym.label_iter() {
            match kind {
                SymbolKind::Predefined => {},
                SymbolKind::Label    => println!("{addr:5}  label     {name}"),
                SymbolKind::Variable => println!("{addr:5}  variable  {name}"),
            }
        }
    }

    let output = output_path(args);
    write_obj(&obj, &output, args.format)?;

    log::info!("wrote {} instructions to {}", obj.len(), output.display());
    Ok(())
}

/// Checks that the input is an existing `.asm` file.
fn check_input(input: &Path) -> anyhow::Result<()> {
    if !input.exists() {
        bail!("{} does not exist", input.display());
    }
    if !input.is_file() {
        bail!("{} is not a file", input.display());
    }
    if input.extension().map_or(true, |ext| ext != "asm") {
        bail!("{} is not an .asm file", input.display());
    }
    Ok(())
}

/// The path to write to, which is the input with a `.hack` extension unless `-o` is given.
fn output_path(args: &Args) -> PathBuf {
    args.output.clone().unwrap_or_else(|| args.input.with_extension("hack"))
}

/// Parses and assembles the source, printing any error against the source.
fn assemble_src(src: &str, debug: bool) -> Option<ObjectFile> {
    let src_info = SourceInfo::new(src);

    let ast = parse_ast(src)
        .map_err(|e| eprint!("{}", report(&e, &src_info)))
        .ok()?;

    let result = match debug {
        true  => assemble_debug(ast, src),
        false => assemble(ast),
    };
    result
        .map_err(|e| eprint!("{}", report(&e, &src_info)))
        .ok()
}

fn write_obj(obj: &ObjectFile, path: &Path, format: Format) -> anyhow::Result<()> {
    let result = match format {
        Format::Text   => fs::write(path, TextFormat::serialize(obj)),
        Format::Binary => fs::write(path, BinaryFormat::serialize(obj)),
    };

    result.with_context(|| format!("could not write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::{Path, PathBuf};

    use clap::Parser;

    use super::{check_input, output_path, Args};

    /// A fresh scratch directory for one test.
    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("hackasm-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }
    fn check_err(path: &Path) -> String {
        check_input(path).unwrap_err().to_string()
    }

    #[test]
    fn test_check_input() {
        let dir = scratch_dir("check");

        let asm = dir.join("Prog.asm");
        fs::write(&asm, "@0\n").unwrap();
        assert!(check_input(&asm).is_ok());

        let missing = dir.join("Missing.asm");
        assert!(check_err(&missing).ends_with("does not exist"));

        let subdir = dir.join("Dir.asm");
        fs::create_dir(&subdir).unwrap();
        assert!(check_err(&subdir).ends_with("is not a file"));

        let txt = dir.join("Prog.txt");
        fs::write(&txt, "@0\n").unwrap();
        assert!(check_err(&txt).ends_with("is not an .asm file"));

        let bare = dir.join("Prog");
        fs::write(&bare, "@0\n").unwrap();
        assert!(check_err(&bare).ends_with("is not an .asm file"));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_output_path() {
        let args = Args::parse_from(["hackasm", "dir/Prog.asm"]);
        assert_eq!(output_path(&args), Path::new("dir/Prog.hack"));

        let args = Args::parse_from(["hackasm", "dir/Prog.asm", "-o", "out.bin", "--format", "binary"]);
        assert_eq!(output_path(&args), Path::new("out.bin"));
    }
}
