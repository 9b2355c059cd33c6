//! xmlstream -- walk XML files with the cursor and print what it sees.
//!
//! One line per node (`depth type name value`), or only the elements, or
//! the outer markup of every element with a given name.

use std::fs;
use std::io::{self, BufWriter, Read, Write};
use std::process::ExitCode;

use clap::Parser;

use xmlcursor::{ReadState, XmlCursor, XmlNodeType};

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// xmlstream -- print the node stream of XML files.
#[derive(Parser, Debug)]
#[command(name = "xmlstream", version, about, long_about = None)]
struct Cli {
    /// XML files to process (use `-` for stdin).
    #[arg(required = true)]
    files: Vec<String>,

    /// Decode input with this encoding label instead of sniffing it.
    #[arg(long, value_name = "LABEL")]
    encoding: Option<String>,

    /// Print element start tags only.
    #[arg(long)]
    elements: bool,

    /// Print the outer XML of every element with this qualified name.
    #[arg(long, value_name = "NAME", conflicts_with = "elements")]
    outer: Option<String>,

    /// Also print the attributes of each element.
    #[arg(long)]
    attributes: bool,

    /// Print tokenizer diagnostics to stderr.
    #[arg(long)]
    verbose: bool,
}

const EXIT_SUCCESS: u8 = 0;
const EXIT_PARSE_ERROR: u8 = 1;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut worst_exit = EXIT_SUCCESS;

    for file in &cli.files {
        let exit = process_file(&cli, file);
        if exit > worst_exit {
            worst_exit = exit;
        }
    }

    ExitCode::from(worst_exit)
}

/// Processes a single input file and returns an exit code.
fn process_file(cli: &Cli, filename: &str) -> u8 {
    let bytes = match read_input(filename) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("{filename}: failed to read: {e}");
            return EXIT_PARSE_ERROR;
        }
    };

    let cursor = match &cli.encoding {
        Some(label) => XmlCursor::create_with_label(&bytes, label),
        None => XmlCursor::from_bytes(&bytes),
    };
    let mut cursor = match cursor {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{filename}: {e}");
            return EXIT_PARSE_ERROR;
        }
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let written = match &cli.outer {
        Some(name) => dump_outer(&mut cursor, name, &mut out),
        None => dump_nodes(cli, &mut cursor, &mut out),
    };
    if let Err(e) = written.and_then(|()| out.flush()) {
        if e.kind() != io::ErrorKind::BrokenPipe {
            eprintln!("{filename}: failed to write output: {e}");
        }
        return EXIT_PARSE_ERROR;
    }

    if cli.verbose {
        for diag in cursor.diagnostics() {
            eprintln!("{filename}: {diag}");
        }
    }
    if cursor.read_state() == ReadState::Error {
        if let Some(err) = cursor.error() {
            eprintln!("{filename}: {err}");
        }
        return EXIT_PARSE_ERROR;
    }
    EXIT_SUCCESS
}

/// Reads a file, or stdin for `-`.
fn read_input(filename: &str) -> io::Result<Vec<u8>> {
    if filename == "-" {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        fs::read(filename)
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn dump_nodes(cli: &Cli, cursor: &mut XmlCursor, out: &mut impl Write) -> io::Result<()> {
    loop {
        let advanced = if cli.elements {
            cursor.read_element()
        } else {
            cursor.read()
        };
        if !advanced {
            return Ok(());
        }
        write_node_line(cursor, out)?;
        if cli.attributes && cursor.node_type() == XmlNodeType::Element {
            while cursor.move_to_next_attribute() {
                write_node_line(cursor, out)?;
            }
            cursor.move_to_element();
        }
    }
}

fn dump_outer(cursor: &mut XmlCursor, name: &str, out: &mut impl Write) -> io::Result<()> {
    let mut advanced = cursor.read_element();
    while advanced {
        if cursor.element_has_qname(name) {
            writeln!(out, "{}", cursor.read_outer_xml())?;
            // The capture already moved to the next node, which may be a match.
            advanced = cursor.node_type() == XmlNodeType::Element || cursor.read_element();
        } else {
            advanced = cursor.read_element();
        }
    }
    Ok(())
}

fn write_node_line(cursor: &XmlCursor, out: &mut impl Write) -> io::Result<()> {
    write!(
        out,
        "{} {} {}",
        cursor.depth(),
        cursor.node_type(),
        cursor.name().unwrap_or("#")
    )?;
    if let Some(value) = cursor.value() {
        write!(out, " {value:?}")?;
    }
    writeln!(out)
}
