use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "parzip")]
#[command(version)]
#[command(about = "A memory-mapped unzip utility with parallel CRC checking", long_about = None)]
#[command(after_help = "Examples:\n  \
  parzip data1.zip -x joe        extract all files except joe from data1.zip\n  \
  parzip -p foo.zip | more       send contents of foo.zip via pipe into more\n  \
  parzip -t -T 8 big.zip         verify all CRCs using 8 threads")]
pub struct Cli {
    /// ZIP file path
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Files to extract (default: all)
    #[arg(value_name = "FILES")]
    pub files: Vec<String>,

    /// List files (short format)
    #[arg(short = 'l')]
    pub list: bool,

    /// List verbosely
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Test archive integrity (verify CRC-32 of every entry)
    #[arg(short = 't')]
    pub test: bool,

    /// Threads for integrity testing (default: available parallelism)
    #[arg(short = 'T', long = "threads", value_name = "N")]
    pub threads: Option<usize>,

    /// Extract files to pipe, no messages
    #[arg(short = 'p')]
    pub pipe: bool,

    /// Extract files into exdir
    #[arg(short = 'd', value_name = "DIR")]
    pub extract_dir: Option<PathBuf>,

    /// Exclude files that follow
    #[arg(short = 'x', value_name = "FILE", num_args = 1..)]
    pub exclude: Vec<String>,

    /// Never overwrite existing files
    #[arg(short = 'n')]
    pub never_overwrite: bool,

    /// Overwrite files WITHOUT prompting
    #[arg(short = 'o')]
    pub overwrite: bool,

    /// Junk paths (do not make directories)
    #[arg(short = 'j')]
    pub junk_paths: bool,

    /// Quiet mode
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    pub fn is_quiet(&self) -> bool {
        self.quiet > 0 || self.pipe
    }
}
